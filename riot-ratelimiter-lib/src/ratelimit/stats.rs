use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeStruct};
use tokio::time::Instant;

use super::Scope;

/// Number of request durations kept for the latency figures
const LATENCY_SAMPLES: usize = 100;

/// A [`HashMap`] mapping scopes to their [`ScopeStats`]
#[derive(Debug, Default, Clone)]
pub struct ScopeStatsMap(HashMap<Scope, ScopeStats>);

impl ScopeStatsMap {
    /// Sort scope statistics by request count (descending order)
    #[must_use]
    pub fn sorted(&self) -> Vec<(Scope, ScopeStats)> {
        let mut sorted: Vec<_> = self.0.clone().into_iter().collect();
        sorted.sort_by(|(a_scope, a), (b_scope, b)| {
            b.total_requests
                .cmp(&a.total_requests)
                .then_with(|| a_scope.cmp(b_scope))
        });
        sorted
    }

    /// Statistics of a single scope
    #[must_use]
    pub fn get(&self, scope: &Scope) -> Option<&ScopeStats> {
        self.0.get(scope)
    }

    /// Number of scopes with statistics
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no request was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<Scope, ScopeStats>> for ScopeStatsMap {
    fn from(value: HashMap<Scope, ScopeStats>) -> Self {
        Self(value)
    }
}

impl Serialize for ScopeStatsMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let sorted = self.sorted();
        let mut map = serializer.serialize_map(Some(sorted.len()))?;
        for (scope, stats) in &sorted {
            map.serialize_entry(&scope.to_string(), stats)?;
        }
        map.end()
    }
}

/// Responses seen for one scope
#[derive(Debug, Clone, Default)]
pub struct ScopeStats {
    /// Total number of responses
    pub total_requests: u64,
    /// Number of successful responses (2xx status)
    pub successful_requests: u64,
    /// Number of rate limited responses (429)
    pub rate_limited: u64,
    /// Number of server error responses (5xx)
    pub server_errors: u64,
    /// Number of client error responses (4xx, excluding 429)
    pub client_errors: u64,
    /// Timestamp of the last rate limit response
    pub last_rate_limit: Option<Instant>,
    /// Durations of the most recent requests
    pub request_times: VecDeque<Duration>,
    /// Status code counts
    pub status_codes: HashMap<u16, u64>,
}

impl ScopeStats {
    /// Record a response with status code and request duration
    pub fn record_response(&mut self, status_code: u16, request_time: Duration) {
        self.total_requests += 1;
        *self.status_codes.entry(status_code).or_insert(0) += 1;

        match status_code {
            200..=299 => self.successful_requests += 1,
            429 => {
                self.rate_limited += 1;
                self.last_rate_limit = Some(Instant::now());
            }
            400..=499 => self.client_errors += 1,
            500..=599 => self.server_errors += 1,
            _ => {}
        }

        if self.request_times.len() >= LATENCY_SAMPLES {
            self.request_times.pop_front();
        }
        self.request_times.push_back(request_time);
    }

    /// Get median request time
    #[must_use]
    pub fn median_request_time(&self) -> Option<Duration> {
        if self.request_times.is_empty() {
            return None;
        }

        let mut times: Vec<_> = self.request_times.iter().copied().collect();
        times.sort();
        let mid = times.len() / 2;

        if times.len().is_multiple_of(2) {
            Some((times[mid - 1] + times[mid]) / 2)
        } else {
            Some(times[mid])
        }
    }

    /// Get average request time
    #[must_use]
    pub fn average_request_time(&self) -> Option<Duration> {
        if self.request_times.is_empty() {
            return None;
        }

        let total: Duration = self.request_times.iter().sum();
        #[allow(clippy::cast_possible_truncation)]
        Some(total / (self.request_times.len() as u32))
    }

    /// Get the current success rate (0.0 to 1.0)
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            1.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let success_rate = self.successful_requests as f64 / self.total_requests as f64;
            success_rate
        }
    }

    /// Share of rate limited responses (0.0 to 1.0)
    #[must_use]
    pub fn rate_limited_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.rate_limited as f64 / self.total_requests as f64;
        rate
    }

    /// Returns `true` if a 429 arrived within the last `period`
    #[must_use]
    pub fn was_rate_limited_within(&self, period: Duration) -> bool {
        self.last_rate_limit
            .is_some_and(|last| last.elapsed() < period)
    }

    /// Get human-readable summary of the stats
    #[must_use]
    pub fn summary(&self) -> String {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let success_pct = (self.success_rate() * 100.0) as u64;

        let avg_time = self
            .average_request_time()
            .map_or_else(|| "N/A".to_string(), |d| format!("{:.0}ms", d.as_millis()));

        format!(
            "{} requests ({}% success, {} rate limited), avg: {}",
            self.total_requests, success_pct, self.rate_limited, avg_time
        )
    }
}

impl Serialize for ScopeStats {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let median_request_time_ms = self
            .median_request_time()
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));

        let mut s = serializer.serialize_struct("ScopeStats", 8)?;
        s.serialize_field("total_requests", &self.total_requests)?;
        s.serialize_field("successful_requests", &self.successful_requests)?;
        s.serialize_field("success_rate", &self.success_rate())?;
        s.serialize_field("rate_limited", &self.rate_limited)?;
        s.serialize_field("client_errors", &self.client_errors)?;
        s.serialize_field("server_errors", &self.server_errors)?;
        s.serialize_field("median_request_time_ms", &median_request_time_ms)?;
        s.serialize_field("status_codes", &self.status_codes)?;
        s.end()
    }
}
