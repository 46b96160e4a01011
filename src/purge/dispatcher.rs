//! Purge dispatcher.
//!
//! Re-reads the current status of a content item, and only when the item is
//! published or trashed derives its surrogate key and issues one purge call.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::application::cdn::SurrogatePurger;
use crate::application::repos::{ContentStore, RepoError};
use crate::domain::ids::{ContentId, RawContentId};
use crate::domain::types::ContentStatus;

use super::config::PurgeConfig;
use super::keys::SurrogateKey;
use super::outcome::{PurgeFailure, PurgeOutcome, SuppressReason};

const METRIC_PURGE_TOTAL: &str = "purgewire_purge_total";
const METRIC_PURGE_MS: &str = "purgewire_purge_ms";

/// Issues surrogate-key purges for content items in a cache-relevant state.
///
/// The dispatcher is stateless between calls: concurrent dispatches for the
/// same id each make their own purge call.
pub struct PurgeDispatcher {
    config: PurgeConfig,
    content: Arc<dyn ContentStore>,
    purger: Arc<dyn SurrogatePurger>,
}

impl PurgeDispatcher {
    pub fn new(
        config: PurgeConfig,
        content: Arc<dyn ContentStore>,
        purger: Arc<dyn SurrogatePurger>,
    ) -> Self {
        Self {
            config,
            content,
            purger,
        }
    }

    /// Purge `content_id` if its current status allows it.
    ///
    /// Makes at most one purge call and never retries.
    #[instrument(skip_all, fields(content_id = %content_id))]
    pub async fn dispatch(&self, content_id: &RawContentId) -> PurgeOutcome {
        let started_at = Instant::now();
        let outcome = self.dispatch_inner(content_id).await;

        counter!(METRIC_PURGE_TOTAL, "outcome" => outcome.label()).increment(1);
        histogram!(METRIC_PURGE_MS, "outcome" => outcome.label())
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        outcome
    }

    async fn dispatch_inner(&self, raw: &RawContentId) -> PurgeOutcome {
        let content_id = match ContentId::from_raw(raw, self.config.negative_ids) {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "Purge rejected: invalid content id");
                return PurgeOutcome::Failed(err.into());
            }
        };

        let status = match self.current_status(content_id).await {
            Ok(Some(status)) => status,
            Ok(None) => {
                debug!("Purge suppressed: content not found");
                return PurgeOutcome::Suppressed(SuppressReason::ContentMissing);
            }
            Err(err) => {
                warn!(error = %err, "Purge aborted: status lookup failed");
                return PurgeOutcome::Failed(PurgeFailure::StatusLookupFailed(err));
            }
        };

        if !status.is_cache_relevant() {
            debug!(status = %status, "Purge suppressed by status gate");
            return PurgeOutcome::Suppressed(SuppressReason::StatusGate(status));
        }

        let key = SurrogateKey::for_content(content_id);
        let purge_timeout = self.config.purge_timeout();

        match timeout(purge_timeout, self.purger.purge_surrogate_key(&key)).await {
            Ok(Ok(())) => {
                info!(surrogate_key = %key, status = %status, "Surrogate key purge sent");
                PurgeOutcome::Sent(key)
            }
            Ok(Err(err)) => {
                warn!(surrogate_key = %key, error = %err, "Surrogate key purge failed");
                PurgeOutcome::Failed(PurgeFailure::PurgeCallFailed(err))
            }
            Err(_) => {
                warn!(
                    surrogate_key = %key,
                    timeout_ms = purge_timeout.as_millis() as u64,
                    "Surrogate key purge timed out"
                );
                PurgeOutcome::Failed(PurgeFailure::Timeout(purge_timeout))
            }
        }
    }

    /// Status at dispatch time, not at event time.
    async fn current_status(&self, id: ContentId) -> Result<Option<ContentStatus>, RepoError> {
        timeout(self.config.status_timeout(), self.content.status(id))
            .await
            .map_err(|_| RepoError::Timeout)?
    }
}
