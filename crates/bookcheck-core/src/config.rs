//! Run configuration
//!
//! Built once at startup and passed down to the runner; nothing here is global.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::Credentials;

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the booking service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Credentials exchanged for a session token
    #[serde(default)]
    pub credentials: Credentials,

    /// Per-call timeout in seconds; expiry fails the call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Scenarios executed in parallel
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Fixture files for the data-driven scenarios
    #[serde(default)]
    pub fixtures: FixturePaths,

    /// Booking schema override (bundled schema when unset)
    #[serde(default)]
    pub schema: Option<PathBuf>,

    /// Error texts asserted by the negative scenarios
    #[serde(default)]
    pub errors: ExpectedErrors,

    /// Directory for saved run reports (default: ".bookcheck/reports")
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturePaths {
    #[serde(default = "default_csv")]
    pub csv: PathBuf,
    #[serde(default = "default_json")]
    pub json: PathBuf,
}

/// Error texts the service is expected to return on negative paths.
///
/// An empty string skips the text comparison; the status is still checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedErrors {
    #[serde(default = "default_invalid_input")]
    pub invalid_input: String,
    #[serde(default = "default_missing_fields")]
    pub missing_fields: String,
    #[serde(default = "default_forbidden")]
    pub forbidden: String,
    #[serde(default = "default_not_found")]
    pub not_found: String,
}

fn default_base_url() -> String {
    "https://restful-booker.herokuapp.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_workers() -> usize {
    4
}

fn default_csv() -> PathBuf {
    PathBuf::from("data/bookings.csv")
}

fn default_json() -> PathBuf {
    PathBuf::from("data/bookings.json")
}

fn default_invalid_input() -> String {
    "Invalid input".to_string()
}

fn default_missing_fields() -> String {
    "Missing required fields".to_string()
}

fn default_forbidden() -> String {
    "Forbidden".to_string()
}

fn default_not_found() -> String {
    "Not Found".to_string()
}

impl Default for FixturePaths {
    fn default() -> Self {
        Self {
            csv: default_csv(),
            json: default_json(),
        }
    }
}

impl Default for ExpectedErrors {
    fn default() -> Self {
        Self {
            invalid_input: default_invalid_input(),
            missing_fields: default_missing_fields(),
            forbidden: default_forbidden(),
            not_found: default_not_found(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            credentials: Credentials::default(),
            timeout_secs: default_timeout_secs(),
            workers: default_workers(),
            fixtures: FixturePaths::default(),
            schema: None,
            errors: ExpectedErrors::default(),
            report_dir: None,
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from default location (.bookcheck.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".bookcheck.toml", ".bookcheck.json", "bookcheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Reject values no run could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    #[must_use]
    pub fn report_dir(&self) -> PathBuf {
        self.report_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".bookcheck/reports"))
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# bookcheck configuration

# Booking service under test
base_url = "https://restful-booker.herokuapp.com"

# Per-call timeout (seconds) and parallel scenarios
timeout_secs = 10
workers = 4

# Credentials exchanged for a session token (POST /auth)
[credentials]
username = "admin"
password = "password123"

# Data-driven fixtures
[fixtures]
csv = "data/bookings.csv"
json = "data/bookings.json"

# Booking schema override (bundled schema when unset)
# schema = "schemas/booking-schema.json"

# Error texts the negative scenarios expect.
# Set one to "" to check only the status code.
[errors]
invalid_input = "Invalid input"
missing_fields = "Missing required fields"
forbidden = "Forbidden"
not_found = "Not Found"

# Where run reports are saved (default: .bookcheck/reports)
# report_dir = ".bookcheck/reports"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
