//! Local driver for the two activities.
//!
//! Production deployments hand the activities to an external orchestrator.
//! `PipelineRunner` plays that role for the CLI and for tests: it runs Extract
//! followed by Store for one blob and retries an activity only when its error
//! kind is retryable.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::dto::{ExtractRequest, MetadataRecord};
use crate::application::errors::{Classify, ErrorKind};
use crate::application::ports::WriteOutcome;
use crate::application::use_cases::{
    ExtractError, ExtractMetadataUseCase, StoreError, StoreMetadataUseCase,
};

/// Attempt budget and backoff shape for each activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Self::default()
        }
    }

    /// Delay before the attempt following `failed_attempt` (1-based).
    ///
    /// `min(base * 2^(n-1) + jitter, max)` with 0-25% jitter.
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        if failed_attempt == 0 {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;
        let delay_ms = base_ms.saturating_mul(2u64.saturating_pow(failed_attempt - 1));

        let jitter = if delay_ms > 0 {
            rand::rng().random_range(0..=delay_ms / 4)
        } else {
            0
        };

        Duration::from_millis(delay_ms.saturating_add(jitter).min(max_ms))
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Extract failed after {attempts} attempt(s): {source}")]
    Extract {
        #[source]
        source: ExtractError,
        attempts: u32,
    },

    #[error("Store failed after {attempts} attempt(s): {source}")]
    Store {
        #[source]
        source: StoreError,
        attempts: u32,
    },
}

impl PipelineError {
    pub fn attempts(&self) -> u32 {
        match self {
            PipelineError::Extract { attempts, .. } | PipelineError::Store { attempts, .. } => {
                *attempts
            }
        }
    }
}

impl Classify for PipelineError {
    fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Extract { source, .. } => source.kind(),
            PipelineError::Store { source, .. } => source.kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub record: MetadataRecord,
    pub write: WriteOutcome,
    pub extract_attempts: u32,
    pub store_attempts: u32,
}

pub struct PipelineRunner {
    extract: Arc<ExtractMetadataUseCase>,
    store: Arc<StoreMetadataUseCase>,
    policy: RetryPolicy,
}

impl PipelineRunner {
    pub fn new(
        extract: Arc<ExtractMetadataUseCase>,
        store: Arc<StoreMetadataUseCase>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            extract,
            store,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run Extract then Store for one blob name.
    ///
    /// Store only starts after Extract succeeded; its input is exactly the
    /// record Extract returned.
    pub async fn run(&self, blob_name: &str) -> Result<PipelineOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        info!(%run_id, blob_name, "Pipeline run started");

        let (record, extract_attempts) = self
            .with_retry(run_id, "extract", || {
                self.extract.execute(ExtractRequest::for_blob(blob_name))
            })
            .await
            .map_err(|(source, attempts)| PipelineError::Extract { source, attempts })?;

        let (write, store_attempts) = self
            .with_retry(run_id, "store", || self.store.execute(record.clone()))
            .await
            .map_err(|(source, attempts)| PipelineError::Store { source, attempts })?;

        info!(
            %run_id,
            file_name = %record.file_name,
            extract_attempts,
            store_attempts,
            ?write,
            "Pipeline run completed"
        );

        Ok(PipelineOutcome {
            run_id,
            record,
            write,
            extract_attempts,
            store_attempts,
        })
    }

    async fn with_retry<T, E, F, Fut>(
        &self,
        run_id: Uuid,
        activity: &'static str,
        mut op: F,
    ) -> Result<(T, u32), (E, u32)>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok((value, attempt)),
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        %run_id,
                        activity,
                        attempt,
                        kind = %e.kind(),
                        "Activity failed, retrying in {:?}: {}",
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        %run_id,
                        activity,
                        attempt,
                        kind = %e.kind(),
                        "Activity failed permanently: {}",
                        e
                    );
                    return Err((e, attempt));
                }
            }
        }
    }
}
