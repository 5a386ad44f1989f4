use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time;

use crate::error::{PingError, PingResult};

/// Raw answer of a network probe for one echo attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReply {
    pub success: bool,
    pub resolved_address: String,
    pub round_trip_millis: i64,
}

/// A transport able to send a single echo request and time it.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, address: &str, timeout: Duration) -> Result<ProbeReply, PingError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Success { rtt_millis: u64 },
    Failure { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeAttempt {
    /// The address actually reached. Equals the requested endpoint on failure.
    pub resolved_address: String,
    pub outcome: ProbeOutcome,
}

impl ProbeAttempt {
    pub fn success(resolved_address: impl Into<String>, rtt_millis: u64) -> Self {
        Self {
            resolved_address: resolved_address.into(),
            outcome: ProbeOutcome::Success { rtt_millis },
        }
    }

    pub fn failure(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            resolved_address: endpoint.into(),
            outcome: ProbeOutcome::Failure {
                reason: reason.into(),
            },
        }
    }

    pub fn rtt_millis(&self) -> Option<u64> {
        match self.outcome {
            ProbeOutcome::Success { rtt_millis } => Some(rtt_millis),
            ProbeOutcome::Failure { .. } => None,
        }
    }

    /// Legacy encoding: -1 marks an unreachable attempt.
    pub fn round_trip_millis(&self) -> i64 {
        self.rtt_millis().map_or(-1, |rtt| rtt as i64)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            ProbeOutcome::Success { .. } => None,
            ProbeOutcome::Failure { reason } => Some(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.rtt_millis().is_some()
    }
}

/// All attempts against one endpoint, in attempt order.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResult {
    pub endpoint: String,
    pub attempts: Vec<ProbeAttempt>,
}

/// Per-endpoint attempt sequences in endpoint input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbeResult {
    pub endpoints: Vec<EndpointResult>,
}

impl ProbeResult {
    pub fn iter(&self) -> impl Iterator<Item = &EndpointResult> {
        self.endpoints.iter()
    }
}

pub struct ProbeRunner<P> {
    probe: P,
    initial_delay: Duration,
    parallel: usize,
}

impl<P: Probe> ProbeRunner<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            initial_delay: Duration::ZERO,
            parallel: 1,
        }
    }

    /// Delay awaited once before the first probe of a run.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Number of endpoints probed concurrently. Attempts of one endpoint are
    /// always sequential, and results keep input order.
    pub fn with_parallelism(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    pub async fn run(
        &self,
        endpoints: &[String],
        timeout: Duration,
        attempts: i64,
    ) -> PingResult<ProbeResult> {
        if attempts < 1 {
            return Err(PingError::AttemptsOutOfRange(attempts));
        }
        let attempts = usize::try_from(attempts).unwrap_or(usize::MAX);

        if !self.initial_delay.is_zero() {
            log::debug!("waiting {:?} before probing", self.initial_delay);
            time::sleep(self.initial_delay).await;
        }

        log::info!(
            "probing {} endpoint(s), {} attempt(s) each, timeout {:?}",
            endpoints.len(),
            attempts,
            timeout
        );

        let results = stream::iter(endpoints)
            .map(|endpoint| self.probe_endpoint(endpoint, timeout, attempts))
            .buffered(self.parallel)
            .collect::<Vec<_>>()
            .await;

        Ok(ProbeResult { endpoints: results })
    }

    async fn probe_endpoint(&self, endpoint: &str, timeout: Duration, attempts: usize) -> EndpointResult {
        let mut results = Vec::new();
        for seq in 0..attempts {
            let attempt = match self.probe.probe(endpoint, timeout).await {
                Ok(reply) if reply.success && reply.round_trip_millis >= 0 => {
                    log::debug!(
                        "{} attempt {}: reply from {} in {} ms",
                        endpoint,
                        seq + 1,
                        reply.resolved_address,
                        reply.round_trip_millis
                    );
                    ProbeAttempt::success(reply.resolved_address, reply.round_trip_millis as u64)
                }
                Ok(_) => {
                    log::debug!("{} attempt {}: no success reply", endpoint, seq + 1);
                    ProbeAttempt::failure(endpoint, "unsuccessful reply")
                }
                Err(e) => {
                    log::debug!("{} attempt {}: {}", endpoint, seq + 1, e);
                    ProbeAttempt::failure(endpoint, e.to_string())
                }
            };
            results.push(attempt);
        }

        EndpointResult {
            endpoint: endpoint.to_string(),
            attempts: results,
        }
    }
}
