use crate::probe::{EndpointResult, ProbeAttempt, ProbeResult};

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointStats {
    pub endpoint: String,
    /// Mean RTT in milliseconds over successful attempts, `None` if there were none.
    pub avg_rtt: Option<f64>,
    pub failures: usize,
}

impl EndpointStats {
    pub fn from_result(result: &EndpointResult) -> Self {
        Self {
            endpoint: result.endpoint.clone(),
            avg_rtt: avg_rtt(&result.attempts),
            failures: failure_count(&result.attempts),
        }
    }

    /// True when at least one attempt did not reach the endpoint.
    pub fn has_failures(&self) -> bool {
        self.failures > 0
    }
}

pub fn avg_rtt(attempts: &[ProbeAttempt]) -> Option<f64> {
    let (sum, count) = attempts
        .iter()
        .filter_map(ProbeAttempt::rtt_millis)
        .fold((0u64, 0u32), |(sum, count), rtt| (sum + rtt, count + 1));

    if count > 0 {
        Some(sum as f64 / f64::from(count))
    } else {
        None
    }
}

pub fn failure_count(attempts: &[ProbeAttempt]) -> usize {
    attempts.iter().filter(|a| !a.is_success()).count()
}

/// Mean of the per-endpoint averages that have data.
pub fn global_avg(stats: &[EndpointStats]) -> Option<f64> {
    let (sum, count) = stats
        .iter()
        .filter_map(|s| s.avg_rtt)
        .fold((0.0, 0u32), |(sum, count), avg| (sum + avg, count + 1));

    if count > 0 {
        Some(sum / f64::from(count))
    } else {
        None
    }
}

/// Aggregated view of a whole run, endpoints in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub endpoints: Vec<EndpointStats>,
    pub global_avg: Option<f64>,
}

impl RunStats {
    pub fn from_result(result: &ProbeResult) -> Self {
        let endpoints: Vec<EndpointStats> = result.iter().map(EndpointStats::from_result).collect();
        let global_avg = global_avg(&endpoints);
        Self {
            endpoints,
            global_avg,
        }
    }
}
