use clap::ValueEnum;
use uuid::Uuid;

/// Language value meaning "not bound to a locale".
pub const ALL_LANGUAGES: &str = "_ALL_";

/// How `guid` values are rendered for new metadata rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GuidFormat {
    /// Lower-case RFC 4122 v4.
    #[default]
    Uuid,
    /// Upper-case dash-grouped hex, matching guids stored by older installations.
    Legacy,
}

impl GuidFormat {
    pub fn generate(self) -> String {
        let id = Uuid::new_v4().hyphenated().to_string();
        match self {
            GuidFormat::Uuid => id,
            GuidFormat::Legacy => id.to_uppercase(),
        }
    }
}

/// Knobs of the metadata behavior.
#[derive(Debug, Clone)]
pub struct MetadataSettings {
    pub superuser_role: String,
    /// Identity recorded as creator/modifier in the batch context.
    pub system_user_id: i64,
    pub default_language: String,
    pub guid_format: GuidFormat,
    /// Seed `check_access_update`/`check_access_delete` with the creator's
    /// primary role.
    pub assign_primary_role: bool,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            superuser_role: "Superuser".into(),
            system_user_id: 1,
            default_language: ALL_LANGUAGES.into(),
            guid_format: GuidFormat::Uuid,
            assign_primary_role: false,
        }
    }
}
