use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub slack: SlackConfig,
    pub distribution: DistributionConfig,
    pub security: SecurityConfig,
}

/// Deployment environment, controls log verbosity and security presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Slack Web API configuration
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Bot token used for `chat.postMessage`
    pub token: String,
    /// Channel every notification is posted to
    pub channel: String,
    /// Slack app signing secret, for requests that originate from Slack
    pub signing_secret: String,
    /// Base URL of the Web API, overridable for tests
    pub api_base_url: String,
}

/// Distribution platform configuration
#[derive(Debug, Clone)]
pub struct DistributionConfig {
    pub project_id: String,
    pub region: String,
    /// Host used to synthesize fallback download links
    pub download_host: String,
    /// JSON document listing tester groups per platform
    pub tester_groups_path: Option<PathBuf>,
}

/// Webhook admission configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// When false the signature gate admits every request
    pub enable_signature_validation: bool,
    /// Fixed-window ceiling per client
    pub rate_limit_per_minute: u32,
    /// HMAC key shared with the distribution platform (empty = not verified)
    pub webhook_secret: String,
}

impl Environment {
    /// Reads `APP_ENV`, falling back to `NODE_ENV`.
    ///
    /// Unset means development; a name that is set but unknown is an error
    /// rather than a silent switch to the development preset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let name = ["APP_ENV", "NODE_ENV"]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|v| !v.trim().is_empty());

        match name {
            Some(name) => name.parse(),
            None => Ok(Environment::Development),
        }
    }

    /// Default log filter for this environment
    pub fn log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Staging | Environment::Production => "info",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env()?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            environment,
            slack: SlackConfig::from_env(environment)?,
            distribution: DistributionConfig::from_env(),
            security: SecurityConfig::from_env(environment),
        })
    }
}

impl SlackConfig {
    /// Load Slack configuration, applying the environment's channel preset
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        let token = env::var("SLACK_TOKEN").unwrap_or_default();
        if token.is_empty() && environment != Environment::Development {
            return Err(ConfigError::MissingSlackToken);
        }

        let channel = env::var("SLACK_CHANNEL").unwrap_or_else(|_| match environment {
            Environment::Staging => "#app-releases-staging".to_string(),
            _ => "#app-releases".to_string(),
        });

        let api_base_url =
            env::var("SLACK_API_BASE_URL").unwrap_or_else(|_| "https://slack.com/api".to_string());
        url::Url::parse(&api_base_url).map_err(|_| ConfigError::InvalidSlackApiUrl)?;

        Ok(Self {
            token,
            channel,
            signing_secret: env::var("SLACK_SIGNING_SECRET").unwrap_or_default(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl DistributionConfig {
    /// Load distribution platform configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            project_id: env::var("FIREBASE_PROJECT_ID").unwrap_or_default(),
            region: env::var("FIREBASE_REGION").unwrap_or_else(|_| "us-central1".to_string()),
            download_host: env::var("DISTRIBUTION_HOST")
                .unwrap_or_else(|_| "appdistribution.firebase.dev".to_string()),
            tester_groups_path: env::var("TESTER_GROUPS_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }
}

impl SecurityConfig {
    /// Preset for an environment, before any overrides
    pub fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                enable_signature_validation: false,
                rate_limit_per_minute: 100,
                webhook_secret: String::new(),
            },
            Environment::Staging | Environment::Production => Self {
                enable_signature_validation: true,
                rate_limit_per_minute: 60,
                webhook_secret: String::new(),
            },
        }
    }

    /// Load security configuration; unparseable overrides keep the preset
    pub fn from_env(environment: Environment) -> Self {
        let preset = Self::preset(environment);

        Self {
            enable_signature_validation: env::var("ENABLE_SIGNATURE_VALIDATION")
                .ok()
                .and_then(|v| match v.trim() {
                    "true" | "1" => Some(true),
                    "false" | "0" => Some(false),
                    _ => None,
                })
                .unwrap_or(preset.enable_signature_validation),
            rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(preset.rate_limit_per_minute),
            webhook_secret: env::var("WEBHOOK_SIGNING_SECRET").unwrap_or_default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidEnvironment(String),
    MissingSlackToken,
    InvalidSlackApiUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::InvalidEnvironment(value) => write!(
                f,
                "unknown environment '{}', expected development, staging or production",
                value
            ),
            ConfigError::MissingSlackToken => write!(
                f,
                "SLACK_TOKEN environment variable is required outside development"
            ),
            ConfigError::InvalidSlackApiUrl => {
                write!(f, "SLACK_API_BASE_URL must be a valid URL")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
