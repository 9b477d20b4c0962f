// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded waits on asynchronously delivered status reports.
//!
//! Replies to a status query arrive on the adapter's notification path, not
//! as a return value of the query. A [`StatusOracle`] keeps the most recent
//! report in a `watch` slot so that a waiter can park until the listener
//! delivers one, or give up when its timeout elapses.
//!
//! The protocol for a single query is always:
//!
//! 1. [`clear`](StatusOracle::clear) the slot,
//! 2. transmit the query,
//! 3. [`await_report`](StatusOracle::await_report).
//!
//! Reports carry the [`Arrival`] stamp taken when the adapter handed them
//! over. Clearing records the latest stamp handed out so far, and any
//! report stamped at or before it is refused, even if it was still queued
//! for delivery when the clear ran.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::protocol::{Arrival, ArrivalClock};

/// One report received from the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport<S> {
    observed: S,
    arrival: Arrival,
}

impl<S: Copy> StatusReport<S> {
    /// Creates a report for a message that arrived at `arrival`.
    #[must_use]
    pub const fn new(observed: S, arrival: Arrival) -> Self {
        Self { observed, arrival }
    }

    /// Returns the reported value.
    #[must_use]
    pub const fn observed(&self) -> S {
        self.observed
    }

    /// Returns when the underlying message was received.
    #[must_use]
    pub const fn arrival(&self) -> Arrival {
        self.arrival
    }

    /// Returns the instant the underlying message was received.
    #[must_use]
    pub const fn timestamp(&self) -> Instant {
        self.arrival.received_at()
    }
}

#[derive(Debug)]
struct Slot<S> {
    floor: u64,
    report: Option<StatusReport<S>>,
}

/// Latest-report slot with a timeout-bounded wait.
pub struct StatusOracle<S> {
    slot: watch::Sender<Slot<S>>,
    clock: Arc<ArrivalClock>,
}

impl<S: Copy + Send + Sync> StatusOracle<S> {
    /// Creates an empty oracle with its own arrival clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(ArrivalClock::new()))
    }

    /// Creates an empty oracle judging staleness by `clock`.
    ///
    /// `clock` must be the one stamping the notifications this oracle is fed.
    #[must_use]
    pub fn with_clock(clock: Arc<ArrivalClock>) -> Self {
        let (slot, _) = watch::channel(Slot {
            floor: 0,
            report: None,
        });
        Self { slot, clock }
    }

    /// Returns the arrival clock.
    #[must_use]
    pub fn clock(&self) -> &ArrivalClock {
        &self.clock
    }

    /// Discards the current report and refuses every report received so far.
    pub fn clear(&self) {
        self.slot.send_modify(|slot| {
            slot.floor = self.clock.last();
            slot.report = None;
        });
    }

    /// Stores `report` as the current one and wakes any waiter.
    ///
    /// Returns `false` if the report was received before the last
    /// [`clear`](Self::clear) and was dropped.
    pub fn deliver(&self, report: StatusReport<S>) -> bool {
        let sequence = report.arrival.sequence();
        let accepted = self.slot.send_if_modified(|slot| {
            if sequence <= slot.floor {
                return false;
            }
            slot.report = Some(report);
            true
        });
        if !accepted {
            tracing::trace!(sequence, "Dropping report received before clear");
        }
        accepted
    }

    /// Returns the current report without waiting.
    #[must_use]
    pub fn current(&self) -> Option<StatusReport<S>> {
        self.slot.borrow().report
    }

    /// Waits until a report is present or `timeout` elapses.
    ///
    /// Returns immediately if a report was delivered since the last
    /// [`clear`](Self::clear). Returns `None` on timeout.
    pub async fn await_report(&self, timeout: Duration) -> Option<StatusReport<S>> {
        let mut rx = self.slot.subscribe();
        let waited = tokio::time::timeout(timeout, async {
            // The sender lives in `self`, so the channel cannot close while we wait.
            rx.wait_for(|slot| slot.report.is_some())
                .await
                .ok()
                .and_then(|slot| slot.report)
        })
        .await;

        match waited {
            Ok(report) => report,
            Err(_) => {
                tracing::trace!(?timeout, "No report before timeout");
                None
            }
        }
    }
}

impl<S: Copy + Send + Sync> Default for StatusOracle<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> fmt::Debug for StatusOracle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("StatusOracle")
            .field("floor", &slot.floor)
            .field("current", &slot.report)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PowerState;

    fn report(oracle: &StatusOracle<PowerState>, power: PowerState) -> StatusReport<PowerState> {
        StatusReport::new(power, oracle.clock().stamp())
    }

    #[tokio::test(start_paused = true)]
    async fn report_before_clear_is_not_returned() {
        let oracle = StatusOracle::new();
        oracle.deliver(report(&oracle, PowerState::On));
        oracle.clear();

        let report = oracle.await_report(Duration::from_millis(100)).await;
        assert!(report.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn report_received_before_clear_but_delivered_after_is_refused() {
        let oracle = StatusOracle::new();
        let queued = report(&oracle, PowerState::On);
        oracle.clear();

        assert!(!oracle.deliver(queued));
        assert!(oracle.current().is_none());
        let report = oracle.await_report(Duration::from_millis(100)).await;
        assert!(report.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn report_after_clear_is_returned() {
        let oracle = StatusOracle::new();
        oracle.deliver(report(&oracle, PowerState::On));
        oracle.clear();
        assert!(oracle.deliver(report(&oracle, PowerState::Standby)));

        let report = oracle.await_report(Duration::from_millis(100)).await.unwrap();
        assert_eq!(report.observed(), PowerState::Standby);
    }

    #[tokio::test(start_paused = true)]
    async fn same_instant_report_after_clear_is_returned() {
        // On a paused clock the clear and the reply share an instant;
        // receipt order alone decides.
        let oracle = StatusOracle::new();
        let before = Instant::now();
        oracle.clear();
        let reply = report(&oracle, PowerState::On);
        assert_eq!(reply.timestamp(), before);

        assert!(oracle.deliver(reply));
        assert!(oracle.await_report(Duration::from_millis(100)).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_wakes_on_delivery() {
        let oracle = Arc::new(StatusOracle::new());
        oracle.clear();

        let writer = Arc::clone(&oracle);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            writer.deliver(report(&writer, PowerState::TransitioningToOn));
        });

        let start = Instant::now();
        let report = oracle.await_report(Duration::from_secs(5)).await.unwrap();
        assert_eq!(report.observed(), PowerState::TransitioningToOn);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_elapses_without_delivery() {
        let oracle = StatusOracle::<PowerState>::new();
        let start = Instant::now();
        assert!(oracle.await_report(Duration::from_millis(250)).await.is_none());
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[test]
    fn newer_report_supersedes_older() {
        let oracle = StatusOracle::new();
        oracle.deliver(report(&oracle, PowerState::TransitioningToOn));
        oracle.deliver(report(&oracle, PowerState::On));
        assert_eq!(oracle.current().unwrap().observed(), PowerState::On);
    }

    #[test]
    fn shared_clock_orders_both_oracles() {
        let clock = Arc::new(ArrivalClock::new());
        let power = StatusOracle::<PowerState>::with_clock(Arc::clone(&clock));
        let stale = clock.stamp();
        power.clear();
        assert!(!power.deliver(StatusReport::new(PowerState::On, stale)));
        assert!(power.deliver(StatusReport::new(PowerState::On, clock.stamp())));
    }
}
