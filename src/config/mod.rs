//! Configuration module for Site-Mirror
//!
//! This module handles loading and validating the TOML configuration file,
//! reading the ignore file, and resolving everything (command line, file,
//! defaults) into one immutable [`Settings`] value.
//!
//! # Example
//!
//! ```no_run
//! use site_mirror::config::{load_config, resolve_settings, CliOverrides};
//! use std::path::Path;
//!
//! let file = load_config(Path::new("mirror.toml")).unwrap();
//! let cli = CliOverrides { seed: "https://example.com/".into(), ..Default::default() };
//! let settings = resolve_settings(&cli, Some(&file), vec![]).unwrap();
//! println!("Crawler will use max depth: {:?}", settings.max_depth);
//! ```

mod parser;
mod resolve;
mod types;
mod validation;

pub use types::{
    CliOverrides, CrawlerSection, FileConfig, FilterSection, HttpSection, HttpSettings,
    LoggingConfig, OutputSection, RetrySettings, Settings,
};

pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_ignore_file, parse_ignore_list,
};
pub use resolve::{default_user_agent, ignore_file_path, resolve_settings};
pub use validation::validate_seed;
