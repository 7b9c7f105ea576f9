use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as number: {source}")]
    ParseFloat {
        name: String,
        #[source]
        source: std::num::ParseFloatError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // MongoDB
    pub mongo_uri: String,
    pub mongo_db: String,

    // Run behaviour
    pub dry_run: bool,
    pub sleep_between: Duration,
    pub logos_dir: PathBuf,
}

/// Credentials and target for the R2 bucket.
///
/// Kept apart from [`Config`] because the download-only run never talks to
/// the object store and must not require these variables.
#[derive(Clone)]
pub struct StoreConfig {
    pub access_key: String,
    pub secret_key: String,
    pub account_id: String,
    pub bucket: String,
    pub public_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongo_uri = optional_env("MONGO_URI")
            .ok_or_else(|| ConfigError::MissingEnvVars(vec!["MONGO_URI".to_string()]))?;

        Ok(Self {
            mongo_uri,
            mongo_db: env_or_default("MONGO_DB", "gsoc_archive"),

            dry_run: parse_env_bool("DRY_RUN", false),
            sleep_between: parse_env_seconds("SLEEP_SECONDS", 0.6)?,
            logos_dir: PathBuf::from(env_or_default("LOGOS_DIR", "./logos")),
        })
    }

    /// Load the run settings together with the R2 settings.
    ///
    /// Missing variables from both are reported in a single error.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is missing or a value is invalid.
    pub fn with_store_from_env() -> Result<(Self, StoreConfig), ConfigError> {
        match (Self::from_env(), StoreConfig::from_env()) {
            (Ok(config), Ok(store)) => Ok((config, store)),
            (
                Err(ConfigError::MissingEnvVars(mut missing)),
                Err(ConfigError::MissingEnvVars(more)),
            ) => {
                missing.extend(more);
                Err(ConfigError::MissingEnvVars(missing))
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }
}

impl StoreConfig {
    /// Load the R2 settings from environment variables.
    ///
    /// Every missing variable is reported in a single error.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the required R2 variables is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut required = |name: &str| {
            optional_env(name).unwrap_or_else(|| {
                missing.push(name.to_string());
                String::new()
            })
        };

        let access_key = required("R2_ACCESS_KEY_ID");
        let secret_key = required("R2_SECRET_ACCESS_KEY");
        let account_id = required("R2_ACCOUNT_ID");
        let bucket = required("R2_BUCKET_NAME");

        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvVars(missing));
        }

        Ok(Self {
            access_key,
            secret_key,
            account_id,
            bucket,
            public_url: optional_env("R2_PUBLIC_URL").map(|u| u.trim_end_matches('/').to_string()),
        })
    }

    /// The account-scoped R2 endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("https://{}.r2.cloudflarestorage.com", self.account_id)
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("account_id", &self.account_id)
            .field("bucket", &self.bucket)
            .field("public_url", &self.public_url)
            .finish_non_exhaustive()
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_seconds(name: &str, default: f64) -> Result<Duration, ConfigError> {
    let secs = match std::env::var(name) {
        Ok(val) if !val.is_empty() => {
            val.trim()
                .parse::<f64>()
                .map_err(|e| ConfigError::ParseFloat {
                    name: name.to_string(),
                    source: e,
                })?
        }
        _ => default,
    };

    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        message: format!("must be a non-negative number of seconds, got {secs}"),
    })
}

fn parse_env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                warn!(name, value = %val, "Unrecognised boolean, treating as false");
                false
            }
        },
        _ => default,
    }
}
