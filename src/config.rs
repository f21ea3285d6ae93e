use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_POSTMAN_API_URL: &str = "https://api.getpostman.com";

/// Credentials known before any prompt. Missing values are asked for interactively.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub github_token: Option<String>,
    pub postman_api_key: Option<String>,
}

/// Setup configuration, resolved once at startup
#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub credentials: Credentials,
    pub github_api_url: String,
    pub postman_api_url: String,
    /// Local checkout the workflow and collection files are written to and read from
    pub work_dir: PathBuf,
    /// How many times to list workflows before giving up
    pub verify_attempts: u32,
    /// Pause before each workflow listing
    pub verify_interval: Duration,
    pub http_timeout: Duration,
}

impl SetupConfig {
    /// Load config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let work_dir = env::current_dir()
            .map_err(|e| format!("Failed to resolve working directory: {}", e))?;
        Self::from_lookup(|name| env::var(name).ok(), work_dir)
    }

    /// Load config through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F, work_dir: PathBuf) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let verify_attempts = match non_empty("SETUP_VERIFY_ATTEMPTS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("SETUP_VERIFY_ATTEMPTS must be a positive integer, got '{}'", v))?,
            None => 3,
        };

        let verify_interval = Duration::from_secs(parse_secs(non_empty("SETUP_VERIFY_INTERVAL_SECS"), "SETUP_VERIFY_INTERVAL_SECS", 10)?);
        // A zero timeout would fail every request immediately
        let http_timeout = match parse_secs(non_empty("SETUP_HTTP_TIMEOUT_SECS"), "SETUP_HTTP_TIMEOUT_SECS", 30)? {
            0 => return Err("SETUP_HTTP_TIMEOUT_SECS must be a positive number of seconds, got '0'".to_string()),
            secs => Duration::from_secs(secs),
        };

        Ok(Self {
            credentials: Credentials {
                github_token: non_empty("GITHUB_TOKEN"),
                postman_api_key: non_empty("POSTMAN_API_KEY"),
            },
            github_api_url: non_empty("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            postman_api_url: non_empty("POSTMAN_API_URL").unwrap_or_else(|| DEFAULT_POSTMAN_API_URL.to_string()),
            work_dir,
            verify_attempts,
            verify_interval,
            http_timeout,
        })
    }
}

fn parse_secs(value: Option<String>, name: &str, default: u64) -> Result<u64, String> {
    match value {
        Some(v) => v
            .parse::<u64>()
            .map_err(|_| format!("{} must be a number of seconds, got '{}'", name, v)),
        None => Ok(default),
    }
}
