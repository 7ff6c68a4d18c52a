use std::path::PathBuf;
use std::str::FromStr;

use forge_mail::MailConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Request body ceiling. Inline images travel in JSON bodies.
    pub max_body_bytes: usize,
    /// Directory served statically; uploads live under `<public_dir>/uploads`.
    pub public_dir: PathBuf,
    /// Base URL of the web client, used to build emailed links.
    pub app_base_url: String,
    pub password_reset_expiry_mins: i64,
    pub jwt: JwtConfig,
    /// `None` when `SMTP_HOST` is unset.
    pub mail: Option<MailConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `MAX_BODY_BYTES`             | `33554432` (32 MiB)        |
    /// | `PUBLIC_DIR`                 | `public`                   |
    /// | `APP_BASE_URL`               | `http://localhost:5173`    |
    /// | `PASSWORD_RESET_EXPIRY_MINS` | `60`                       |
    ///
    /// JWT settings come from [`JwtConfig::from_env`] and SMTP settings from
    /// [`MailConfig::from_env`].
    pub fn from_env() -> Self {
        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            max_body_bytes: env_parse("MAX_BODY_BYTES", 32 * 1024 * 1024),
            public_dir: std::env::var("PUBLIC_DIR")
                .unwrap_or_else(|_| "public".into())
                .into(),
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            password_reset_expiry_mins: env_parse("PASSWORD_RESET_EXPIRY_MINS", 60),
            jwt: JwtConfig::from_env(),
            mail: MailConfig::from_env(),
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset.
///
/// # Panics
///
/// Panics if the variable is set but does not parse.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
