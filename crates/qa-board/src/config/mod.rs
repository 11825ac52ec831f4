use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub moderation: ModerationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let backend = StorageBackend::parse(
            &env::var("APP_STORAGE").unwrap_or_else(|_| "file".to_string()),
        )?;
        let data_dir = PathBuf::from(env::var("APP_DATA_DIR").unwrap_or_else(|_| "db".to_string()));

        let require_existing_question = match env::var("APP_REQUIRE_EXISTING_QUESTION") {
            Ok(raw) => parse_flag("APP_REQUIRE_EXISTING_QUESTION", &raw)?,
            Err(_) => false,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig { backend, data_dir },
            moderation: ModerationConfig {
                extra_terms: term_list("APP_FILTER_EXTRA_TERMS"),
                allowed_terms: term_list("APP_FILTER_ALLOWED_TERMS"),
                require_existing_question,
            },
        })
    }
}

fn parse_flag(variable: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            variable,
            value: raw.to_string(),
        }),
    }
}

fn term_list(variable: &str) -> Vec<String> {
    env::var(variable)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where record collections live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// JSON-lines files under `data_dir`, reloaded on start.
    File,
    /// Process memory only; everything is lost on exit.
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" | "disk" => Ok(Self::File),
            "memory" | "mem" => Ok(Self::Memory),
            _ => Err(ConfigError::InvalidStorage(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn questions_path(&self) -> PathBuf {
        self.data_dir.join("questions.db")
    }

    pub fn answers_path(&self) -> PathBuf {
        self.data_dir.join("answers.db")
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.db")
    }
}

/// Profanity screening and answer linkage knobs.
#[derive(Debug, Clone, Default)]
pub struct ModerationConfig {
    /// Terms appended to the built-in denylist.
    pub extra_terms: Vec<String>,
    /// Terms removed from the effective denylist.
    pub allowed_terms: Vec<String>,
    /// Reject answers whose `questionId` does not name a stored question.
    pub require_existing_question: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidStorage(String),
    InvalidFlag { variable: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStorage(value) => {
                write!(f, "APP_STORAGE must be 'file' or 'memory' (found '{value}')")
            }
            ConfigError::InvalidFlag { variable, value } => {
                write!(f, "{variable} must be true or false (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidStorage(_)
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
