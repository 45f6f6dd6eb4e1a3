use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Allowed CORS origins. Defaults to the local frontend dev server.
    /// Set CAMPUS__API__CORS_ALLOWED_ORIGINS in production.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_hours: u64,
}

fn default_bind() -> String { "0.0.0.0".to_string() }
fn default_api_port() -> u16 { 3000 }
fn default_db_path() -> String { "./campus.db".to_string() }
fn default_jwt_expiry() -> u64 { 24 }
fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3001".to_string()]
}

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

pub fn validate(cfg: &Config) -> Result<()> {
    if cfg.auth.jwt_secret == DEFAULT_JWT_SECRET {
        anyhow::bail!(
            "SECURITY ERROR: JWT secret must be changed from default value '{}'. \
            Set CAMPUS__AUTH__JWT_SECRET environment variable with a strong random value.",
            DEFAULT_JWT_SECRET
        );
    }

    if cfg.auth.jwt_secret.len() < 32 {
        anyhow::bail!(
            "CONFIG ERROR: JWT secret must be at least 32 characters (current: {})",
            cfg.auth.jwt_secret.len()
        );
    }

    if let Some(parent) = std::path::Path::new(&cfg.database.path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            anyhow::bail!(
                "CONFIG ERROR: Database directory does not exist: {}",
                parent.display()
            );
        }
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}

pub fn load() -> Result<Config> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("CAMPUS")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("api.cors_allowed_origins")
                .try_parsing(true),
        )
        .set_default("api.bind", default_bind())?
        .set_default("api.port", 3000)?
        .set_default("api.cors_allowed_origins", default_cors_allowed_origins())?
        .set_default("database.path", default_db_path())?
        .set_default("auth.jwt_secret", DEFAULT_JWT_SECRET)?
        .set_default("auth.jwt_expiry_hours", 24)?
        .build()?
        .try_deserialize()?;

    validate(&cfg)?;

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(secret: &str) -> Config {
        Config {
            api: ApiConfig {
                port: 3000,
                bind: "127.0.0.1".to_string(),
                cors_allowed_origins: vec![],
            },
            database: DatabaseConfig {
                path: "campus.db".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: secret.to_string(),
                jwt_expiry_hours: 1,
            },
        }
    }

    #[test]
    fn test_default_secret_rejected() {
        assert!(validate(&sample(DEFAULT_JWT_SECRET)).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(validate(&sample("too-short")).is_err());
    }

    #[test]
    fn test_strong_secret_accepted() {
        assert!(validate(&sample("a-sufficiently-long-secret-for-campus-api")).is_ok());
    }

    #[test]
    fn test_missing_database_directory_rejected() {
        let mut cfg = sample("a-sufficiently-long-secret-for-campus-api");
        cfg.database.path = "/definitely/not/a/real/dir/campus.db".to_string();
        assert!(validate(&cfg).is_err());
    }
}
