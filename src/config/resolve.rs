use crate::config::types::{
    CliOverrides, FileConfig, HttpSettings, RetrySettings, Settings,
};
use crate::config::validation::{validate_max_retries, validate_seed};
use crate::url::DEFAULT_TRACKING_PARAMS;
use crate::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;
pub const DEFAULT_JITTER_MS: u64 = 250;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = "mirror";
pub const DEFAULT_VISITED_CACHE: &str = ".visited-urls";
pub const DEFAULT_IGNORE_FILE: &str = ".mirrorignore";
pub const DEFAULT_API_PATTERNS: &[&str] = &["api.github.com/repos/"];

/// Default user agent string
pub fn default_user_agent() -> String {
    format!("site-mirror/{}", env!("CARGO_PKG_VERSION"))
}

/// Picks the ignore file: command line, then config file, then default
pub fn ignore_file_path(cli: &CliOverrides, file: Option<&FileConfig>) -> PathBuf {
    cli.ignore_file
        .clone()
        .or_else(|| file.and_then(|f| f.output.ignore_file.clone()))
        .unwrap_or_else(|| Path::new(DEFAULT_IGNORE_FILE).to_path_buf())
}

/// Resolves the run settings
///
/// Precedence, highest first: command-line flags, the config file, built-in
/// defaults. Exclusion patterns are the ignore file's patterns followed by
/// the config file's `ignore` list.
///
/// # Returns
///
/// * `Ok(Settings)` - One immutable settings value for the run
/// * `Err(ConfigError)` - The seed is not a crawlable URL or a value is out of range
pub fn resolve_settings(
    cli: &CliOverrides,
    file: Option<&FileConfig>,
    ignore_file_patterns: Vec<String>,
) -> Result<Settings, ConfigError> {
    let defaults = FileConfig::default();
    let file = file.unwrap_or(&defaults);

    let seed = validate_seed(&cli.seed)?;

    let max_retries = cli
        .max_retries
        .or(file.crawler.max_retries)
        .unwrap_or(DEFAULT_MAX_RETRIES);
    validate_max_retries(max_retries)?;

    let retry = RetrySettings {
        max_retries,
        backoff_base: Duration::from_millis(
            file.crawler.backoff_base_ms.unwrap_or(DEFAULT_BACKOFF_BASE_MS),
        ),
        jitter_max: Duration::from_millis(file.crawler.jitter_ms.unwrap_or(DEFAULT_JITTER_MS)),
    };

    let http = HttpSettings {
        user_agent: file
            .http
            .user_agent
            .clone()
            .unwrap_or_else(default_user_agent),
        timeout: Duration::from_secs(file.http.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        headers: file
            .http
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        block_scripts: file.http.block_scripts.unwrap_or(false),
        script_hosts: file
            .http
            .script_hosts
            .iter()
            .map(|h| h.to_lowercase())
            .collect(),
    };

    let mut ignore_patterns = ignore_file_patterns;
    ignore_patterns.extend(file.filter.ignore.iter().cloned());

    let tracking_params = file.filter.tracking_params.clone().unwrap_or_else(|| {
        DEFAULT_TRACKING_PARAMS
            .iter()
            .map(|p| p.to_string())
            .collect()
    });

    let api_patterns = file.filter.api_patterns.clone().unwrap_or_else(|| {
        DEFAULT_API_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect()
    });

    Ok(Settings {
        seed,
        force: cli.force || file.crawler.force.unwrap_or(false),
        max_depth: cli.max_depth.or(file.crawler.max_depth),
        delay: Duration::from_millis(
            cli.delay_ms
                .or(file.crawler.delay_ms)
                .unwrap_or(DEFAULT_DELAY_MS),
        ),
        retry,
        http,
        ignore_patterns,
        tracking_params,
        api_patterns,
        output_dir: cli
            .output_dir
            .clone()
            .or_else(|| file.output.directory.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        visited_cache: cli
            .visited_cache
            .clone()
            .or_else(|| file.output.visited_cache.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VISITED_CACHE)),
        logging: cli.logging,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(seed: &str) -> CliOverrides {
        CliOverrides {
            seed: seed.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = resolve_settings(&cli("https://example.com/"), None, vec![]).unwrap();
        assert!(!settings.force);
        assert_eq!(settings.max_depth, None);
        assert_eq!(settings.delay, Duration::from_millis(DEFAULT_DELAY_MS));
        assert_eq!(settings.retry.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(settings.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(settings.api_patterns, vec!["api.github.com/repos/".to_string()]);
        assert!(settings.http.user_agent.starts_with("site-mirror/"));
        assert!(settings.ignore_patterns.is_empty());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = FileConfig::default();
        file.crawler.max_depth = Some(2);
        file.crawler.delay_ms = Some(50);
        file.crawler.force = Some(true);
        file.http.user_agent = Some("Custom/1.0".to_string());

        let settings =
            resolve_settings(&cli("https://example.com/"), Some(&file), vec![]).unwrap();
        assert_eq!(settings.max_depth, Some(2));
        assert_eq!(settings.delay, Duration::from_millis(50));
        assert!(settings.force);
        assert_eq!(settings.http.user_agent, "Custom/1.0");
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = FileConfig::default();
        file.crawler.max_depth = Some(2);
        file.crawler.max_retries = Some(5);
        file.output.directory = Some(PathBuf::from("from-file"));

        let mut overrides = cli("https://example.com/");
        overrides.max_depth = Some(7);
        overrides.max_retries = Some(1);
        overrides.output_dir = Some(PathBuf::from("from-cli"));

        let settings = resolve_settings(&overrides, Some(&file), vec![]).unwrap();
        assert_eq!(settings.max_depth, Some(7));
        assert_eq!(settings.retry.max_retries, 1);
        assert_eq!(settings.output_dir, PathBuf::from("from-cli"));
    }

    #[test]
    fn test_ignore_patterns_concatenated() {
        let mut file = FileConfig::default();
        file.filter.ignore = vec!["/from-config".to_string()];

        let settings = resolve_settings(
            &cli("https://example.com/"),
            Some(&file),
            vec!["/from-ignore-file".to_string()],
        )
        .unwrap();
        assert_eq!(
            settings.ignore_patterns,
            vec!["/from-ignore-file".to_string(), "/from-config".to_string()]
        );
    }

    #[test]
    fn test_invalid_seed_is_config_error() {
        let result = resolve_settings(&cli("nope"), None, vec![]);
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn test_cli_retry_limit_validated() {
        let mut overrides = cli("https://example.com/");
        overrides.max_retries = Some(99);
        assert!(resolve_settings(&overrides, None, vec![]).is_err());
    }

    #[test]
    fn test_ignore_file_path_precedence() {
        let mut file = FileConfig::default();
        assert_eq!(
            ignore_file_path(&cli("https://example.com"), Some(&file)),
            PathBuf::from(DEFAULT_IGNORE_FILE)
        );
        file.output.ignore_file = Some(PathBuf::from("file.ignore"));
        assert_eq!(
            ignore_file_path(&cli("https://example.com"), Some(&file)),
            PathBuf::from("file.ignore")
        );
        let mut overrides = cli("https://example.com");
        overrides.ignore_file = Some(PathBuf::from("cli.ignore"));
        assert_eq!(
            ignore_file_path(&overrides, Some(&file)),
            PathBuf::from("cli.ignore")
        );
    }
}
