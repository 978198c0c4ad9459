//! Who is performing an operation, and the role check collaborator.

/// Role compared against `check_access_read` for unauthenticated callers.
pub const GUEST_ROLE: &str = "Guest";

/// Identity and roles of the caller, passed explicitly into every hook.
///
/// `Batch` is the trusted non-interactive context (imports, maintenance jobs):
/// reads are unfiltered, update checks are skipped and new metadata is
/// attributed to the configured system user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerContext {
    Guest,
    User {
        id: i64,
        roles: Vec<String>,
        superuser: bool,
    },
    Batch,
}

impl CallerContext {
    /// Build an authenticated caller, flagging it as superuser when it holds
    /// `superuser_role`.
    pub fn user(id: i64, roles: Vec<String>, superuser_role: &str) -> Self {
        let superuser = roles.iter().any(|role| role == superuser_role);
        CallerContext::User {
            id,
            roles,
            superuser,
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, CallerContext::Batch)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, CallerContext::User { .. })
    }

    pub fn is_superuser(&self) -> bool {
        matches!(self, CallerContext::User { superuser: true, .. })
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            CallerContext::User { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn roles(&self) -> &[String] {
        match self {
            CallerContext::User { roles, .. } => roles,
            _ => &[],
        }
    }

    /// First role in the caller's role list.
    pub fn primary_role(&self) -> Option<&str> {
        self.roles().first().map(String::as_str)
    }
}

/// Answers whether a caller may act under a named role.
pub trait Authorizer: Send + Sync {
    fn check_access(&self, caller: &CallerContext, role: &str) -> bool;
}

/// Plain role-membership check.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleAuthorizer;

impl Authorizer for RoleAuthorizer {
    fn check_access(&self, caller: &CallerContext, role: &str) -> bool {
        match caller {
            CallerContext::Batch => true,
            CallerContext::Guest => role == GUEST_ROLE,
            CallerContext::User { roles, .. } => roles.iter().any(|held| held == role),
        }
    }
}
