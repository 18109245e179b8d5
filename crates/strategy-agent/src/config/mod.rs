use crate::workflows::recommendation::adjudicator::ReasoningConfig;
use crate::workflows::recommendation::embedding::EmbeddingConfig;
use crate::workflows::recommendation::PipelineConfig;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

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
    pub data: DataConfig,
    pub output: OutputConfig,
    pub embedding: EmbeddingConfig,
    pub reasoning: ReasoningConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Loads `.env` and `api_keys.env` (both optional) and then reads the
    /// process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        dotenvy::from_filename("api_keys.env").ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup: &lookup };

        let environment = AppEnvironment::from_str(&vars.string("APP_ENV", "development"));

        let host = vars.string("APP_HOST", "127.0.0.1");
        let port = vars
            .string("APP_PORT", "8001")
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = vars.string("APP_LOG_LEVEL", "info");

        let data = DataConfig {
            dir: PathBuf::from(vars.string("DATA_DIR", "data")),
        };
        let output = OutputConfig {
            report_dir: PathBuf::from(vars.string("REPORT_DIR", "recommendations")),
        };

        let embedding_defaults = EmbeddingConfig::default();
        let embedding = EmbeddingConfig {
            endpoint: vars.string("EMBEDDING_ENDPOINT", &embedding_defaults.endpoint),
            model: vars.string("EMBEDDING_MODEL", &embedding_defaults.model),
        };

        let reasoning_defaults = ReasoningConfig::default();
        let reasoning = ReasoningConfig {
            api_key: vars.optional("PERPLEXITY_API_KEY"),
            endpoint: vars.string("REASONING_ENDPOINT", &reasoning_defaults.endpoint),
            model: vars.string("REASONING_MODEL", &reasoning_defaults.model),
            max_tokens: vars.parse("REASONING_MAX_TOKENS", reasoning_defaults.max_tokens)?,
            temperature: vars.parse("REASONING_TEMPERATURE", reasoning_defaults.temperature)?,
            timeout: Duration::from_secs(
                vars.parse("REASONING_TIMEOUT_SECS", reasoning_defaults.timeout.as_secs())?,
            ),
        };

        let pipeline_defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            similarity_threshold: vars
                .parse("SIMILARITY_THRESHOLD", pipeline_defaults.similarity_threshold)?,
            top_k: vars.parse("SIMILARITY_TOP_K", pipeline_defaults.top_k)?,
            upsell_enabled: vars.flag("UPSELL_ENABLED", pipeline_defaults.upsell_enabled)?,
            upsell_margin: vars.parse("UPSELL_MARGIN", pipeline_defaults.upsell_margin)?,
            adjudication_concurrency: vars.parse(
                "ADJUDICATION_CONCURRENCY",
                pipeline_defaults.adjudication_concurrency,
            )?,
        };

        if !(0.0..=1.0).contains(&pipeline.similarity_threshold) {
            return Err(ConfigError::OutOfRange {
                key: "SIMILARITY_THRESHOLD",
                detail: "must be within 0.0..=1.0",
            });
        }
        if pipeline.top_k == 0 {
            return Err(ConfigError::OutOfRange {
                key: "SIMILARITY_TOP_K",
                detail: "must be at least 1",
            });
        }
        if pipeline.adjudication_concurrency == 0 {
            return Err(ConfigError::OutOfRange {
                key: "ADJUDICATION_CONCURRENCY",
                detail: "must be at least 1",
            });
        }
        if pipeline.upsell_margin < 0.0 {
            return Err(ConfigError::OutOfRange {
                key: "UPSELL_MARGIN",
                detail: "must not be negative",
            });
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            data,
            output,
            embedding,
            reasoning,
            pipeline,
        })
    }
}

struct Vars<'a, F> {
    lookup: &'a F,
}

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
            None => Ok(default),
        }
    }

    fn flag(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.optional(key) {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue { key, value: raw }),
            },
            None => Ok(default),
        }
    }
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

/// Location of the customer, catalogue, product, sales and store tables.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub dir: PathBuf,
}

/// Where persisted report artifacts are written.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub report_dir: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValue { key: &'static str, value: String },
    OutOfRange { key: &'static str, detail: &'static str },
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "{key} has an unparseable value '{value}'")
            }
            ConfigError::OutOfRange { key, detail } => write!(f, "{key} {detail}"),
            ConfigError::MissingApiKey => write!(
                f,
                "PERPLEXITY_API_KEY is required to reach the reasoning service"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidValue { .. }
            | ConfigError::OutOfRange { .. }
            | ConfigError::MissingApiKey => None,
        }
    }
}
