// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timing configuration for the transition engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::PowerTarget;
use crate::error::{ParseError, ValueError};

/// How to poll for a state: one query per interval until the deadline.
///
/// The interval is never zero, so polling always paces itself.
///
/// # Examples
///
/// ```
/// use cec_hub::engine::PollPolicy;
/// use std::time::Duration;
///
/// let policy = PollPolicy::new(Duration::from_millis(500), Duration::from_secs(4)).unwrap();
/// assert_eq!(policy.deadline(), Duration::from_secs(4));
///
/// assert!(PollPolicy::new(Duration::ZERO, Duration::from_secs(4)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PollPolicyMillis", into = "PollPolicyMillis")]
pub struct PollPolicy {
    query_interval: Duration,
    deadline: Duration,
}

impl PollPolicy {
    /// Creates a policy.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::ZeroDuration` if `query_interval` is zero.
    pub fn new(query_interval: Duration, deadline: Duration) -> Result<Self, ValueError> {
        if query_interval.is_zero() {
            return Err(ValueError::ZeroDuration {
                field: "query_interval",
            });
        }
        Ok(Self::paced(query_interval, deadline))
    }

    const fn paced(query_interval: Duration, deadline: Duration) -> Self {
        Self {
            query_interval,
            deadline,
        }
    }

    /// Longest wait for the reply to any single query.
    #[must_use]
    pub const fn query_interval(&self) -> Duration {
        self.query_interval
    }

    /// Overall time budget for reaching the state.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Delays, deadlines and retry budget of the staged protocol.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use cec_hub::engine::TimingConfig;
/// use std::time::Duration;
///
/// let config = TimingConfig::from_json(r#"{ "settle_delay_ms": 1500, "retry_budget": 5 }"#).unwrap();
/// assert_eq!(config.settle_delay(), Duration::from_millis(1500));
/// assert_eq!(config.retry_budget(), 5);
/// assert_eq!(config.retry_delay(), TimingConfig::DEFAULT_RETRY_DELAY);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    #[serde(rename = "settle_delay_ms", with = "millis")]
    settle_delay: Duration,
    #[serde(rename = "retry_delay_ms", with = "millis")]
    retry_delay: Duration,
    retry_budget: u32,
    #[serde(rename = "query_timeout_ms", with = "millis")]
    query_timeout: Duration,
    power_on: PollPolicy,
    power_off: PollPolicy,
    active_source: PollPolicy,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
            retry_budget: Self::DEFAULT_RETRY_BUDGET,
            query_timeout: Self::DEFAULT_QUERY_TIMEOUT,
            power_on: PollPolicy::paced(Duration::from_secs(1), Duration::from_secs(15)),
            power_off: PollPolicy::paced(Duration::from_secs(1), Duration::from_secs(8)),
            active_source: PollPolicy::paced(Duration::from_secs(1), Duration::from_secs(5)),
        }
    }
}

impl TimingConfig {
    /// Default wait after the optimistic commands.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);
    /// Default wait between a retried command and its verification.
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
    /// Default retries per sub-goal.
    pub const DEFAULT_RETRY_BUDGET: u32 = 3;
    /// Default wait for the reply to a single-shot query.
    pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Sets the settle delay.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the delay between a retried command and its verification.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the retry budget per sub-goal.
    #[must_use]
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Sets the single-shot query timeout.
    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Sets the polling policy for power-on verification.
    #[must_use]
    pub fn with_power_on_policy(mut self, policy: PollPolicy) -> Self {
        self.power_on = policy;
        self
    }

    /// Sets the polling policy for standby verification.
    #[must_use]
    pub fn with_power_off_policy(mut self, policy: PollPolicy) -> Self {
        self.power_off = policy;
        self
    }

    /// Sets the polling policy for active-source verification.
    #[must_use]
    pub fn with_active_source_policy(mut self, policy: PollPolicy) -> Self {
        self.active_source = policy;
        self
    }

    /// Returns the settle delay.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Returns the retry delay.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Returns the retry budget per sub-goal.
    #[must_use]
    pub const fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Returns the single-shot query timeout.
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Returns the polling policy for reaching `target`.
    #[must_use]
    pub const fn power_policy(&self, target: PowerTarget) -> PollPolicy {
        match target {
            PowerTarget::On => self.power_on,
            PowerTarget::Standby => self.power_off,
        }
    }

    /// Returns the polling policy for active-source verification.
    #[must_use]
    pub const fn active_source_policy(&self) -> PollPolicy {
        self.active_source
    }
}

/// Wire form of [`PollPolicy`].
#[derive(Serialize, Deserialize)]
struct PollPolicyMillis {
    #[serde(with = "millis")]
    query_interval_ms: Duration,
    #[serde(with = "millis")]
    deadline_ms: Duration,
}

impl TryFrom<PollPolicyMillis> for PollPolicy {
    type Error = ValueError;

    fn try_from(wire: PollPolicyMillis) -> Result<Self, Self::Error> {
        Self::new(wire.query_interval_ms, wire.deadline_ms)
    }
}

impl From<PollPolicy> for PollPolicyMillis {
    fn from(policy: PollPolicy) -> Self {
        Self {
            query_interval_ms: policy.query_interval,
            deadline_ms: policy.deadline,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        #[allow(clippy::cast_possible_truncation)]
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
