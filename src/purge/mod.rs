//! Surrogate-key purge engine.
//!
//! Turns content-lifecycle transitions into CDN purges:
//!
//! - **Classifier**: decides whether a transition can affect cached pages and
//!   which content item it concerns
//! - **Dispatcher**: re-checks the item's current status, derives its
//!   surrogate key and issues exactly one purge call
//!
//! [`PurgeTrigger`] composes both and is the single entry point for event
//! sources. Outcomes are reported as [`PurgeOutcome`] values; a failed purge
//! never fails the content operation that caused it.
//!
//! ## Configuration
//!
//! ```toml
//! [purge]
//! enabled = true
//! purge_timeout_ms = 3000
//! status_timeout_ms = 2000
//! negative_ids = "reject"   # or "absolute"
//! ```

mod classifier;
mod config;
mod dispatcher;
mod keys;
mod outcome;
#[cfg(test)]
mod testing;
mod transition;
mod trigger;

pub use classifier::{classify, warrants_purge};
pub use config::PurgeConfig;
pub use dispatcher::PurgeDispatcher;
pub use keys::{CONTENT_KEY_PREFIX, SurrogateKey};
pub use outcome::{PurgeFailure, PurgeOutcome, SuppressReason};
pub use transition::{CommentEvent, ContentTransition, TransitionKind};
pub use trigger::PurgeTrigger;
