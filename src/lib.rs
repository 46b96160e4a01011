//! purgewire: evicts stale CDN pages by surrogate key when CMS content changes.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod purge;
