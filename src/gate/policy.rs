use crate::config::AdminConfig;

/// Redirect target for a failed path-token check. The token variant always
/// bounced to the site root rather than the login page.
pub const HOME_PATH: &str = "/";

/// Single policy for the admin surface. The source system grew three
/// divergent gates (session+role, token-in-path, role-only) with different
/// redirect targets; they collapse into these four knobs.
#[derive(Clone, Debug)]
pub struct GatePolicy {
    /// Redirect for requests with no session at all.
    pub login_path: String,

    /// Redirect for every other denial: whitelist, role check, store failure.
    pub denied_path: String,

    /// When set, gated paths carry the token as the segment after the admin
    /// prefix (`/admin/<token>/...`) and it must match before any session
    /// work happens.
    pub path_token: Option<String>,

    /// Whether a whitelisted principal without an active ADMIN record gets
    /// one written on the fly. Matches the source behavior when on; turn off
    /// to require explicit provisioning.
    pub auto_provision: bool,
}

impl GatePolicy {
    pub fn from_config(cfg: &AdminConfig) -> Self {
        Self {
            login_path: cfg.login_path.clone(),
            denied_path: cfg.denied_path.clone(),
            path_token: cfg.path_token.clone(),
            auto_provision: cfg.auto_provision,
        }
    }
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".to_string(),
            denied_path: "/auth/login".to_string(),
            path_token: None,
            auto_provision: true,
        }
    }
}
