//! Support utilities for [`keen_retry`]'s retry API.
//!
//! The OCR provider and the extractor both make a single outbound HTTP
//! call per attempt; this module gives them a uniform way to classify an
//! error as transient (worth retrying with backoff) or fatal (surface
//! immediately), and to run the retry loop itself.

use std::ops::RangeInclusive;

use async_openai::error::OpenAIError;
use keen_retry::{ExponentialJitter, ResolvedResult, RetryResult};
use reqwest::StatusCode;

use crate::prelude::*;

/// Parameters for the exponential-backoff-with-jitter retry policy
/// described in spec §4.6.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Initial delay, in milliseconds.
    pub initial_delay_millis: u64,
    /// Max delay between attempts, in milliseconds.
    pub max_delay_millis: u64,
    /// Maximum number of retry attempts (not counting the first try).
    pub max_attempts: u32,
    /// Jitter ratio applied to each computed delay.
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_millis: 500,
            max_delay_millis: 8_000,
            max_attempts: 5,
            jitter_ratio: 0.2,
        }
    }
}

impl RetryPolicy {
    fn backoff_range_millis(&self) -> RangeInclusive<u32> {
        self.initial_delay_millis as u32..=self.max_delay_millis as u32
    }

    fn jitter<E>(&self) -> ExponentialJitter<E> {
        ExponentialJitter::FromBackoffRange {
            backoff_range_millis: self.backoff_range_millis(),
            re_attempts: self.max_attempts as u8,
            jitter_ratio: self.jitter_ratio as f32,
        }
    }
}

/// Run `attempt` with retries per `policy`, classifying each error via
/// [`IsKnownTransient`]. Used by both the OCR provider and the extractor.
pub(crate) async fn retry_with_policy<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> std::result::Result<T, E>
where
    E: IsKnownTransient + std::fmt::Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let jitter = policy.jitter();
    let first = attempt().await.into_retry_result(E::is_known_transient);
    let resolved = first
        .retry_with_async(|_| {
            let fut = attempt();
            async move { fut.await.into_retry_result(E::is_known_transient) }
        })
        .with_exponential_jitter(|| jitter)
        .await
        .inspect_fatal(|_, fatal_error| {
            error!(?fatal_error, "request failed with a fatal error");
        })
        .inspect_recovered(|_, _, retry_errors_list| {
            warn!(
                retries = retry_errors_list.len(),
                "request succeeded after retrying"
            );
        })
        .inspect_given_up(|_, retry_errors_list, fatal_error| {
            error!(
                retries = retry_errors_list.len(),
                ?fatal_error,
                "request failed after exhausting all retries"
            );
        });
    into_result(resolved)
}

/// Flatten a [`ResolvedResult`] into a plain [`Result`].
fn into_result<T, E>(resolved: ResolvedResult<(), (), T, E>) -> std::result::Result<T, E> {
    match resolved {
        ResolvedResult::Ok { output, .. } => Ok(output),
        ResolvedResult::Recovered { output, .. } => Ok(output),
        ResolvedResult::Fatal { error, .. } => Err(error),
        ResolvedResult::GivenUp { fatal_error, .. } => Err(fatal_error),
        ResolvedResult::Unrecoverable { fatal_error, .. } => Err(fatal_error),
    }
}

/// Convert a [`Result`] into a [`RetryResult`].
pub(crate) trait IntoRetryResult<T, E> {
    /// Convert into an appropriate [`RetryResult`], using `is_transient`
    /// to decide whether a failure should be retried.
    fn into_retry_result<F>(self, is_transient: F) -> RetryResult<(), (), T, E>
    where
        F: FnOnce(&E) -> bool;
}

impl<T, E> IntoRetryResult<T, E> for std::result::Result<T, E> {
    fn into_retry_result<F>(self, is_transient: F) -> RetryResult<(), (), T, E>
    where
        F: FnOnce(&E) -> bool,
    {
        match self {
            Ok(value) => RetryResult::Ok {
                reported_input: (),
                output: value,
            },
            Err(error) if is_transient(&error) => {
                RetryResult::Transient { input: (), error }
            }
            Err(error) => RetryResult::Fatal { input: (), error },
        }
    }
}

/// Is this error a known transient error?
///
/// By default, we assume errors are not transient until they've been
/// observed and determined to be so. This prevents large numbers of
/// retries-with-backoff on errors that will never resolve.
pub trait IsKnownTransient {
    /// Is this error likely to be transient?
    fn is_known_transient(&self) -> bool;
}

impl IsKnownTransient for OpenAIError {
    fn is_known_transient(&self) -> bool {
        match self {
            OpenAIError::Reqwest(error) => error.is_known_transient(),
            _ => false,
        }
    }
}

impl IsKnownTransient for reqwest::Error {
    fn is_known_transient(&self) -> bool {
        if let Some(status) = self.status() {
            is_transient_status(status)
        } else {
            // Connection-level errors (no status at all) are assumed
            // transient; `reqwest` doesn't expose enough detail to be
            // certain otherwise.
            true
        }
    }
}

/// Is this HTTP status one we should retry on? Per spec §4.6: retry on
/// connection errors and 5xx/429; never on other 4xx.
pub fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}
