use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use url::Url;

use super::prelude::*;
use super::result::truncate_body;

/// Worst-case UTF-8 width, used to bound how much body is read.
const MAX_UTF8_CHAR_BYTES: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// One request at a time, in variant order.
    #[default]
    Sequential,
    /// All requests in flight at once; results still come back in variant order.
    Concurrent,
}

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Bound on each individual request.
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub body_preview_chars: usize,
    pub strategy: Strategy,
    /// Bound on the whole run. Requests still pending when it passes are
    /// recorded as cancelled.
    pub deadline: Option<Duration>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            follow_redirects: true,
            body_preview_chars: 200,
            strategy: Strategy::Sequential,
            deadline: None,
        }
    }
}

/// Requests one base URL under several encodings and collects what came back.
pub struct ProbeRunner<C> {
    client: Arc<C>,
    options: RunnerOptions,
}

impl<C: HttpClient> ProbeRunner<C> {
    pub fn new(client: C, options: RunnerOptions) -> Self {
        Self {
            client: Arc::new(client),
            options,
        }
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Probe every variant of `base_url`, returning one result per variant in
    /// the order given. Only bad input fails the run; network faults and error
    /// statuses are reported inside the results.
    pub async fn run(
        &self,
        base_url: &str,
        variants: &[EncodingTransform],
    ) -> Result<Vec<ProbeResult>, ConfigurationError> {
        if variants.is_empty() {
            return Err(ConfigurationError::NoVariants);
        }
        validate_base_url(base_url)?;

        let targets = build_targets(base_url, variants);
        // A deadline past the end of the clock is no deadline at all.
        let deadline = self
            .options
            .deadline
            .and_then(|d| Instant::now().checked_add(d));

        log::debug!(
            "Probing {} variants of {} ({:?})",
            targets.len(),
            base_url,
            self.options.strategy
        );

        let results = match self.options.strategy {
            Strategy::Sequential => self.run_sequential(targets, deadline).await,
            Strategy::Concurrent => self.run_concurrent(targets, deadline).await,
        };
        Ok(results)
    }

    async fn run_sequential(
        &self,
        targets: Vec<ProbeTarget>,
        deadline: Option<Instant>,
    ) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(targets.len());

        for target in targets {
            let Some(deadline) = deadline else {
                results.push(probe_target(self.client.as_ref(), target, &self.options).await);
                continue;
            };

            if Instant::now() >= deadline {
                results.push(cancelled(target, Duration::ZERO));
                continue;
            }

            let start = Instant::now();
            let pending = probe_target(self.client.as_ref(), target.clone(), &self.options);
            let result = match timeout_at(deadline, pending).await {
                Ok(result) => result,
                Err(_) => cancelled(target, start.elapsed()),
            };
            results.push(result);
        }

        results
    }

    async fn run_concurrent(
        &self,
        targets: Vec<ProbeTarget>,
        deadline: Option<Instant>,
    ) -> Vec<ProbeResult> {
        let start = Instant::now();
        let mut handles = Vec::with_capacity(targets.len());

        for target in targets {
            let client = Arc::clone(&self.client);
            let options = self.options.clone();
            let task_target = target.clone();

            let handle = tokio::spawn(async move {
                probe_target(client.as_ref(), task_target, &options).await
            });
            handles.push((target, AbortOnDrop(handle)));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (target, mut handle) in handles {
            let joined = match deadline {
                Some(deadline) => match timeout_at(deadline, &mut handle.0).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        handle.0.abort();
                        results.push(cancelled(target, start.elapsed()));
                        continue;
                    }
                },
                None => (&mut handle.0).await,
            };

            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    log::error!("Probe task for {} did not finish: {}", target.url, e);
                    results.push(cancelled(target, start.elapsed()));
                }
            }
        }

        results
    }
}

/// Aborts the probe task when dropped, so abandoning a run stops its requests.
struct AbortOnDrop(JoinHandle<ProbeResult>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Apply each transform to `base_url`, preserving variant order.
pub fn build_targets(base_url: &str, variants: &[EncodingTransform]) -> Vec<ProbeTarget> {
    variants
        .iter()
        .map(|variant| ProbeTarget {
            variant_name: variant.name().to_string(),
            url: variant.apply(base_url),
        })
        .collect()
}

/// The base URL needs a scheme and a host; anything past that is fair game.
pub fn validate_base_url(base_url: &str) -> Result<Url, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if !url.has_host() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

async fn probe_target<C: HttpClient>(
    client: &C,
    target: ProbeTarget,
    options: &RunnerOptions,
) -> ProbeResult {
    let request = ProbeRequest {
        method: Method::GET,
        url: target.url.clone(),
        follow_redirects: options.follow_redirects,
        timeout: options.timeout,
        max_body_bytes: options
            .body_preview_chars
            .saturating_mul(MAX_UTF8_CHAR_BYTES),
    };

    log::debug!("[{}] GET {}", target.variant_name, target.url);
    let start = Instant::now();
    let response = client.send(request).await;
    let elapsed = start.elapsed();

    let outcome = match response {
        Ok(raw) => {
            log::info!(
                "[{}] {} -> {} in {:.2}ms",
                target.variant_name,
                target.url,
                raw.status_code,
                elapsed.as_secs_f64() * 1000.0
            );
            let body = String::from_utf8_lossy(&raw.body);
            ProbeOutcome::Success {
                status_code: raw.status_code,
                headers: raw.headers,
                body_preview: truncate_body(&body, options.body_preview_chars),
            }
        }
        Err(e) => {
            log::warn!("[{}] {} failed: {}", target.variant_name, target.url, e);
            ProbeOutcome::TransportFailure { message: e.message }
        }
    };

    ProbeResult {
        variant_name: target.variant_name,
        requested_url: target.url,
        outcome,
        elapsed,
    }
}

fn cancelled(target: ProbeTarget, elapsed: Duration) -> ProbeResult {
    log::warn!("[{}] {} cancelled by deadline", target.variant_name, target.url);
    ProbeResult {
        variant_name: target.variant_name,
        requested_url: target.url,
        outcome: ProbeOutcome::TransportFailure {
            message: TransportError::cancelled().message,
        },
        elapsed,
    }
}
