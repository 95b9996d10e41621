use serde::Deserialize;

/// Execution mode of the service.
///
/// Development relaxes the cookie `Secure` attribute, enables the `debug`
/// field on error responses and switches visitor-IP resolution to synthetic
/// addresses (see `visitors::service`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_hours: i64,
    pub reaper_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub environment: Environment,
    pub session: SessionConfig,
    /// Credentials for the super admin created when the users table is empty.
    pub bootstrap_admin: Option<(String, String)>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "session".into()),
            ttl_hours: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
            reaper_interval_secs: std::env::var("SESSION_REAPER_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(3600),
        };
        let bootstrap_admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some((email, password)),
            // Seed credentials are only assumed outside production.
            _ if !environment.is_production() => {
                Some(("admin@example.com".into(), "admin123".into()))
            }
            _ => None,
        };
        Ok(Self {
            database_url,
            environment,
            session,
            bootstrap_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_detection() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Development.is_production());
    }
}
