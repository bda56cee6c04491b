/// Configuration management for engagement-service
///
/// Everything comes from environment variables (a `.env` file is loaded first
/// by `main`). Database pool settings live in `db_pool::DbConfig`.
use db_pool::env::{env_flag, env_or, env_string_or};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, or `*`
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> Vec<&str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect()
    }

    pub fn allows_any(&self) -> bool {
        self.allowed_origins.trim() == "*"
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret used to verify access tokens
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

/// Which store backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Whether a user may subscribe to their own channel
    pub allow_self_subscription: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = env_string_or("APP_ENV", "development");
        let production = app_env.eq_ignore_ascii_case("production");

        let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(value) => value,
            Err(_) if production => {
                return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
            }
            Err(_) => "http://localhost:3000".to_string(),
        };
        if production && allowed_origins.trim() == "*" {
            return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
        }

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET environment variable not set".to_string())?;
        if jwt_secret.trim().is_empty() {
            return Err("JWT_SECRET must not be empty".to_string());
        }

        let backend = match env_string_or("STORE_BACKEND", "postgres")
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => return Err(format!("Unsupported STORE_BACKEND: {}", other)),
        };

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: env_string_or("ENGAGEMENT_SERVICE_HOST", "0.0.0.0"),
                port: env_or("ENGAGEMENT_SERVICE_PORT", 8000),
            },
            cors: CorsConfig { allowed_origins },
            auth: AuthConfig { jwt_secret },
            store: StoreConfig { backend },
            policy: PolicyConfig {
                allow_self_subscription: env_flag("ALLOW_SELF_SUBSCRIPTION", false),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        for key in [
            "APP_ENV",
            "CORS_ALLOWED_ORIGINS",
            "JWT_SECRET",
            "STORE_BACKEND",
            "ENGAGEMENT_SERVICE_HOST",
            "ENGAGEMENT_SERVICE_PORT",
            "ALLOW_SELF_SUBSCRIPTION",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply() {
        clear();
        std::env::set_var("JWT_SECRET", "test-secret");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.port, 8000);
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert!(!config.policy.allow_self_subscription);
        assert_eq!(config.cors.origins(), vec!["http://localhost:3000"]);

        clear();
    }

    #[test]
    #[serial]
    fn jwt_secret_is_required() {
        clear();
        assert!(Config::from_env().is_err());
    }

    #[test]
    #[serial]
    fn production_rejects_wildcard_cors() {
        clear();
        std::env::set_var("JWT_SECRET", "test-secret");
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");

        assert!(Config::from_env().is_err());
        clear();
    }

    #[test]
    #[serial]
    fn overrides_are_read() {
        clear();
        std::env::set_var("JWT_SECRET", "test-secret");
        std::env::set_var("STORE_BACKEND", "Memory");
        std::env::set_var("ALLOW_SELF_SUBSCRIPTION", "true");
        std::env::set_var("ENGAGEMENT_SERVICE_PORT", "9100");

        let config = Config::from_env().unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.policy.allow_self_subscription);
        assert_eq!(config.app.port, 9100);

        clear();
    }

    #[test]
    #[serial]
    fn unknown_backend_is_rejected() {
        clear();
        std::env::set_var("JWT_SECRET", "test-secret");
        std::env::set_var("STORE_BACKEND", "mongo");
        assert!(Config::from_env().is_err());
        clear();
    }
}
