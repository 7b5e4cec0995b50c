use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api";
pub const DEFAULT_COOKIE_NAME: &str = "loginToken";

/// Fallback token secret used when neither `SECRET1` nor `auth.secret` is set.
pub const FALLBACK_TOKEN_SECRET: &str = "secret-puk-1234";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub view_throttle: ViewThrottleConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    /// Directory holding `bug.json`, `toy.json` and `user.json`.
    pub data_dir: String,
    /// Flushes slower than this are logged as warnings.
    pub write_timeout_ms: u64,
    /// Create missing data files as empty collections instead of failing ignition.
    pub create_if_missing: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl_seconds: i64,
    pub cookie_name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ViewThrottleConfig {
    pub max_views: usize,
    pub window_seconds: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3030,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
                "http://localhost:5174".to_string(),
                "http://127.0.0.1:5174".to_string(),
            ],
            allow_credentials: true,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            enable_swagger: true,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            write_timeout_ms: 5000,
            create_if_missing: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: FALLBACK_TOKEN_SECRET.to_string(),
            token_ttl_seconds: 60 * 60 * 24 * 7,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

impl Default for ViewThrottleConfig {
    fn default() -> Self {
        Self {
            max_views: 3,
            window_seconds: 7,
        }
    }
}

impl AuthConfig {
    pub fn uses_fallback_secret(&self) -> bool {
        self.secret == FALLBACK_TOKEN_SECRET
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Catalog.toml (base configuration file)
    /// 3. Environment variables prefixed with CATALOG_, nested with `__`
    ///    (e.g. CATALOG_STORE__DATA_DIR)
    /// 4. SECRET1 for the token secret
    pub fn load() -> Result<Self, figment::Error> {
        let defaults = toml::to_string(&Config::default()).map_err(|e| figment::Error::from(e.to_string()))?;

        let figment = Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file("Catalog.toml"))
            .merge(Env::prefixed("CATALOG_").split("__"))
            .merge(Env::raw().only(&["SECRET1"]).map(|_| "auth.secret".into()));

        figment.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_service() {
        let config = Config::default();
        assert_eq!(config.server.port, 3030);
        assert_eq!(config.auth.cookie_name, "loginToken");
        assert_eq!(config.view_throttle.max_views, 3);
        assert_eq!(config.view_throttle.window_seconds, 7);
        assert!(config.auth.uses_fallback_secret());
        assert!(!config.store.create_if_missing);
    }

    #[test]
    fn load_reads_secret_and_prefixed_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SECRET1", "from-env");
            jail.set_env("CATALOG_STORE__DATA_DIR", "/tmp/catalog");
            jail.set_env("CATALOG_VIEW_THROTTLE__MAX_VIEWS", "5");
            jail.set_env("CATALOG_STORE__CREATE_IF_MISSING", "true");

            let config = Config::load()?;
            assert_eq!(config.auth.secret, "from-env");
            assert_eq!(config.store.data_dir, "/tmp/catalog");
            assert_eq!(config.view_throttle.max_views, 5);
            assert!(config.store.create_if_missing);
            assert!(!config.auth.uses_fallback_secret());
            Ok(())
        });
    }

    #[test]
    fn load_layers_catalog_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "Catalog.toml",
                r#"
                [server]
                port = 8080

                [logging]
                json_format = true
                "#,
            )?;

            let config = Config::load()?;
            assert_eq!(config.server.port, 8080);
            assert!(config.logging.json_format);
            assert_eq!(config.logging.level, "info");
            Ok(())
        });
    }
}
