use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Contents of the TOML configuration file
///
/// Every key is optional. Values absent here fall back to the defaults in
/// [`crate::config::resolve_settings`]; command-line flags override them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub crawler: CrawlerSection,
    pub http: HttpSection,
    pub filter: FilterSection,
    pub output: OutputSection,
}

/// Crawl behavior
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CrawlerSection {
    /// Re-crawl the seed even if it is in the visited cache
    pub force: Option<bool>,

    /// Maximum link depth from the seed; absent means unbounded
    pub max_depth: Option<u32>,

    /// Pause before every request (milliseconds)
    pub delay_ms: Option<u64>,

    /// Additional attempts after the first failed fetch
    pub max_retries: Option<u32>,

    /// Base of the exponential backoff (milliseconds)
    pub backoff_base_ms: Option<u64>,

    /// Upper bound of the random jitter added to each backoff (milliseconds)
    pub jitter_ms: Option<u64>,
}

/// HTTP client behavior
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct HttpSection {
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,

    /// Refuse requests for scripts
    pub block_scripts: Option<bool>,

    /// Hosts whose scripts are fetched even when scripts are blocked
    pub script_hosts: Vec<String>,

    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
}

/// URL filtering
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilterSection {
    /// Exclusion patterns, appended to the ignore file's patterns
    pub ignore: Vec<String>,

    /// Query parameters dropped during normalization
    pub tracking_params: Option<Vec<String>>,

    /// URL substrings identifying structured JSON API resources
    pub api_patterns: Option<Vec<String>>,
}

/// Output locations
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputSection {
    pub directory: Option<PathBuf>,
    pub visited_cache: Option<PathBuf>,
    pub ignore_file: Option<PathBuf>,
}

/// Logging configuration handed to the subscriber setup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Verbosity level (0 = info, 1 = debug, 2 = trace for this crate, 3+ = trace everywhere)
    pub verbosity: u8,

    /// Only log errors
    pub quiet: bool,
}

impl LoggingConfig {
    /// Returns the `EnvFilter` directive for this configuration
    pub fn filter_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "site_mirror=info,warn",
            1 => "site_mirror=debug,info",
            2 => "site_mirror=trace,debug",
            _ => "trace",
        }
    }
}

/// Values supplied on the command line
///
/// `None` (or `false` for switches) means "not given", letting the config
/// file or the built-in default decide.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub seed: String,
    pub force: bool,
    pub max_depth: Option<u32>,
    pub delay_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub visited_cache: Option<PathBuf>,
    pub ignore_file: Option<PathBuf>,
    pub logging: LoggingConfig,
}

/// Retry and backoff parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub jitter_max: Duration,
}

/// HTTP client parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
    pub block_scripts: bool,
    pub script_hosts: Vec<String>,
}

/// Fully resolved, immutable run settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub seed: Url,
    pub force: bool,
    pub max_depth: Option<u32>,
    pub delay: Duration,
    pub retry: RetrySettings,
    pub http: HttpSettings,
    pub ignore_patterns: Vec<String>,
    pub tracking_params: Vec<String>,
    pub api_patterns: Vec<String>,
    pub output_dir: PathBuf,
    pub visited_cache: PathBuf,
    pub logging: LoggingConfig,
}
