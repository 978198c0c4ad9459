use crate::behavior::{GuidFormat, MetadataSettings};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use std::{env, path::PathBuf, str::FromStr};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub metadata: MetadataSettings,
}

/// What the process does after configuration is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    Migrate,
    /// Load pages from a JSON file in the batch context, then exit.
    Import(PathBuf),
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Record metadata service")]
pub struct Args {
    /// Host to bind to (overrides RECORD_META_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides RECORD_META_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides RECORD_META_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Role that bypasses read filtering (overrides RECORD_META_SUPERUSER_ROLE)
    #[arg(long)]
    pub superuser_role: Option<String>,

    /// User recorded on metadata written in batch mode (overrides RECORD_META_SYSTEM_USER_ID)
    #[arg(long)]
    pub system_user_id: Option<i64>,

    /// Format of generated guids (overrides RECORD_META_GUID_FORMAT)
    #[arg(long, value_enum)]
    pub guid_format: Option<GuidFormat>,

    /// Seed update/delete roles of new metadata with the creator's first role
    #[arg(long)]
    pub assign_primary_role: bool,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,

    /// Import pages from a JSON file as the system user and exit
    #[arg(long, conflicts_with = "migrate")]
    pub import: Option<PathBuf>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and run mode.
    pub fn from_env_and_args() -> Result<(Self, RunMode)> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<(Self, RunMode)> {
        // --- Environment fallback ---
        let defaults = MetadataSettings::default();
        let env_host = env::var("RECORD_META_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = env_parse("RECORD_META_PORT", 3000u16)?;
        let env_db = env::var("RECORD_META_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/record_meta.db?mode=rwc".into());
        let env_superuser =
            env::var("RECORD_META_SUPERUSER_ROLE").unwrap_or(defaults.superuser_role);
        let env_system_user = env_parse("RECORD_META_SYSTEM_USER_ID", defaults.system_user_id)?;
        let env_guid = match env::var("RECORD_META_GUID_FORMAT") {
            Ok(value) => <GuidFormat as ValueEnum>::from_str(&value, true)
                .map_err(|err| anyhow!("parsing RECORD_META_GUID_FORMAT value `{}`: {}", value, err))?,
            Err(_) => defaults.guid_format,
        };
        let env_assign = env_parse("RECORD_META_ASSIGN_PRIMARY_ROLE", false)?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            metadata: MetadataSettings {
                superuser_role: args.superuser_role.unwrap_or(env_superuser),
                system_user_id: args.system_user_id.unwrap_or(env_system_user),
                guid_format: args.guid_format.unwrap_or(env_guid),
                assign_primary_role: args.assign_primary_role || env_assign,
                default_language: defaults.default_language,
            },
        };

        let mode = match (args.migrate, args.import) {
            (true, _) => RunMode::Migrate,
            (false, Some(path)) => RunMode::Import(path),
            (false, None) => RunMode::Serve,
        };

        Ok((cfg, mode))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
