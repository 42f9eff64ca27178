//! URL handling module for Site-Mirror
//!
//! This module provides URL normalization, link resolution, same-host checks
//! and the exclusion filter.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, is_same_host};
pub use matcher::{matches_path, ExclusionFilter};
pub use normalize::{
    normalize_url, resolve_link, NormalizedUrl, UrlNormalizer, DEFAULT_TRACKING_PARAMS,
};
