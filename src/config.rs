use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use zeroize::Zeroizing;

/// Application-level constants
pub const APP_NAME: &str = "Accredit";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DATA_DIR_ENV: &str = "ACCREDIT_DATA_DIR";
pub const BIND_ENV: &str = "ACCREDIT_BIND";
pub const ADMIN_TOKEN_ENV: &str = "ACCREDIT_ADMIN_TOKEN";
pub const SESSION_IDLE_ENV: &str = "ACCREDIT_SESSION_IDLE_SECS";

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default session inactivity timeout: 30 minutes.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// How often idle sessions are swept.
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "accredit_lib=info,accredit=info"
}

/// Get the application data directory.
/// `$ACCREDIT_DATA_DIR` if set, otherwise `~/Accredit/`.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Archive database inside the data directory.
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join("accredit.db")
}

/// Root of the blob store.
pub fn uploads_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("uploads")
}

/// Parse a listen address, falling back to `DEFAULT_BIND` for empty input.
pub fn parse_bind(value: Option<&str>) -> Result<SocketAddr, String> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(DEFAULT_BIND);
    raw.parse()
        .map_err(|e| format!("Invalid {BIND_ENV} value '{raw}': {e}"))
}

pub fn bind_addr() -> Result<SocketAddr, String> {
    parse_bind(std::env::var(BIND_ENV).ok().as_deref())
}

/// Parse the session inactivity timeout in seconds. Empty input falls back
/// to `DEFAULT_SESSION_IDLE_SECS`; zero is refused.
pub fn parse_session_idle(value: Option<&str>) -> Result<Duration, String> {
    let raw = match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw,
        None => return Ok(Duration::from_secs(DEFAULT_SESSION_IDLE_SECS)),
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(format!("{SESSION_IDLE_ENV} must be greater than zero")),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(format!("Invalid {SESSION_IDLE_ENV} value '{raw}': {e}")),
    }
}

pub fn session_idle_timeout() -> Result<Duration, String> {
    parse_session_idle(std::env::var(SESSION_IDLE_ENV).ok().as_deref())
}

/// Admin bearer token. `None` disables the admin surface.
pub fn admin_token() -> Option<Zeroizing<String>> {
    std::env::var(ADMIN_TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .map(Zeroizing::new)
}

/// Runtime configuration resolved from the environment.
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind: SocketAddr,
    pub admin_token: Option<Zeroizing<String>>,
    pub session_idle_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            data_dir: app_data_dir(),
            bind: bind_addr()?,
            admin_token: admin_token(),
            session_idle_timeout: session_idle_timeout()?,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("data_dir", &self.data_dir)
            .field("bind", &self.bind)
            .field("admin_enabled", &self.admin_token.is_some())
            .field("session_idle_timeout", &self.session_idle_timeout)
            .finish()
    }
}
