use crate::config::types::{CrawlerSection, FileConfig, FilterSection, HttpSection};
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Upper bound on `max_retries`
const MAX_RETRIES_LIMIT: u32 = 10;

/// Validates the entire configuration file
pub fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    validate_crawler_section(&config.crawler)?;
    validate_http_section(&config.http)?;
    validate_filter_section(&config.filter)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_section(config: &CrawlerSection) -> Result<(), ConfigError> {
    if let Some(retries) = config.max_retries {
        validate_max_retries(retries)?;
    }
    Ok(())
}

/// Validates a retry count from either the file or the command line
pub fn validate_max_retries(retries: u32) -> Result<(), ConfigError> {
    if retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_retries must be at most {}, got {}",
            MAX_RETRIES_LIMIT, retries
        )));
    }
    Ok(())
}

/// Validates HTTP configuration
fn validate_http_section(config: &HttpSection) -> Result<(), ConfigError> {
    if let Some(user_agent) = &config.user_agent {
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be empty".to_string(),
            ));
        }
        if HeaderValue::from_str(user_agent).is_err() {
            return Err(ConfigError::Validation(format!(
                "user_agent '{}' is not a valid header value",
                user_agent
            )));
        }
    }

    if config.timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    for (name, value) in &config.headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid header name '{}'", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
    }

    for host in &config.script_hosts {
        validate_host(host)?;
    }

    Ok(())
}

/// Validates filter configuration
fn validate_filter_section(config: &FilterSection) -> Result<(), ConfigError> {
    if let Some(patterns) = &config.api_patterns {
        if patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "api_patterns cannot contain empty patterns".to_string(),
            ));
        }
    }

    if let Some(params) = &config.tracking_params {
        if params.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "tracking_params cannot contain empty names".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates a bare host name such as `cdn.example.com`
fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host.is_empty()
        || host.starts_with('.')
        || host.ends_with('.')
        || !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "Invalid host name '{}'",
            host
        )));
    }
    Ok(())
}

/// Validates the seed URL given on the command line
pub fn validate_seed(seed: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(seed.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(url)
}
