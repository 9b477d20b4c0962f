// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The verified transition engine.
//!
//! A CEC command is fire-and-forget: the bus acknowledges the frame, not
//! its effect. [`TransitionEngine`] turns "turn on", "turn off" and
//! "switch input" into confirmed transitions:
//!
//! 1. **Optimistic**: send every primary command back to back, wait one
//!    settle delay, and check every sub-goal once. The common case ends here.
//! 2. **Troubleshooting**: for the first unmet sub-goal, re-send only its
//!    command, wait the retry delay and poll until its deadline, up to the
//!    retry budget. Later sub-goals are then checked once and retried the
//!    same way if needed.
//!
//! The bus is held for the whole run, so two callers never interleave.
//! Every loop is bounded by an attempt count or a deadline.
//!
//! # Examples
//!
//! ```no_run
//! use cec_hub::engine::TransitionEngine;
//! use cec_hub::types::InputPort;
//! # use cec_hub::protocol::{BusTransport, NotificationSink, Opcode};
//! # use cec_hub::types::LogicalAddress;
//! # use cec_hub::TransportFault;
//! # struct Adapter;
//! # impl BusTransport for Adapter {
//! #     async fn send(&self, _: LogicalAddress, _: Opcode, _: &[u8]) -> Result<(), TransportFault> { Ok(()) }
//! #     fn subscribe(&self, _: NotificationSink) -> Result<(), TransportFault> { Ok(()) }
//! # }
//! # fn open_adapter() -> Result<Adapter, TransportFault> { Ok(Adapter) }
//!
//! #[tokio::main]
//! async fn main() -> cec_hub::Result<()> {
//!     let engine = TransitionEngine::builder().bind(open_adapter);
//!
//!     let outcome = engine.turn_on(Some(InputPort::new(2)?)).await;
//!     println!("{}: {}", outcome.success, outcome.message);
//!     Ok(())
//! }
//! ```

mod config;
mod machine;
mod outcome;

pub use config::{PollPolicy, TimingConfig};
pub use machine::{Event, PowerTarget, Stage, SubGoal, TransitionPlan};
pub use outcome::{TransitionOutcome, TransitionRequest};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::command::{Command, CommandExecutor, PowerCommand, RoutingCommand};
use crate::device::Device;
use crate::error::{Error, Result, TransportFault};
use crate::protocol::{ArrivalClock, BusChannel, BusTransport, NotificationSink};
use crate::state::{StatusOracle, TvState};
use crate::telemetry::NotificationRouter;
use crate::types::{InputPort, PhysicalAddress, PowerState};

/// Default buffer between the adapter and the listener task.
const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

/// Builder for [`TransitionEngine`].
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    device: Device,
    timing: TimingConfig,
    notification_capacity: usize,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            device: Device::television(),
            timing: TimingConfig::default(),
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }
}

impl EngineBuilder {
    /// Creates a builder targeting the television with default timing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the controlled device.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Sets the timing configuration.
    #[must_use]
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Sets the notification buffer size (at least 1).
    #[must_use]
    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity.max(1);
        self
    }

    /// Runs the one-time initialization: open the adapter, register the
    /// notification sink, start the listener task.
    ///
    /// Any failure is logged and yields an engine that answers every
    /// operation with [`Error::NotInitialized`] for its whole lifetime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn bind<T, F>(self, open: F) -> TransitionEngine<T>
    where
        T: BusTransport,
        F: FnOnce() -> std::result::Result<T, TransportFault>,
    {
        let transport = match open() {
            Ok(transport) => transport,
            Err(fault) => {
                tracing::error!(error = %fault, "Failed to open CEC adapter");
                return self.uninitialized();
            }
        };

        let clock = Arc::new(ArrivalClock::new());
        let (tx, rx) = mpsc::channel(self.notification_capacity);
        if let Err(fault) = transport.subscribe(NotificationSink::new(tx, Arc::clone(&clock))) {
            tracing::error!(error = %fault, "Failed to subscribe to CEC notifications");
            return self.uninitialized();
        }

        let mut engine = self.assemble(BusChannel::new(transport), &clock);
        let router = NotificationRouter::new(
            engine.device.logical_address(),
            Arc::clone(&engine.power),
            Arc::clone(&engine.active_source),
            Arc::clone(&engine.state),
        );
        engine.listener = Mutex::new(Some(tokio::spawn(router.run(rx))));
        tracing::info!(
            device = %engine.device.logical_address(),
            "CEC engine initialized"
        );
        engine
    }

    /// Builds an engine with no adapter behind it.
    #[must_use]
    pub fn uninitialized<T: BusTransport>(self) -> TransitionEngine<T> {
        self.assemble(BusChannel::uninitialized(), &Arc::new(ArrivalClock::new()))
    }

    fn assemble<T: BusTransport>(
        self,
        channel: BusChannel<T>,
        clock: &Arc<ArrivalClock>,
    ) -> TransitionEngine<T> {
        TransitionEngine {
            device: self.device,
            timing: self.timing,
            channel,
            power: Arc::new(StatusOracle::with_clock(Arc::clone(clock))),
            active_source: Arc::new(StatusOracle::with_clock(Arc::clone(clock))),
            state: Arc::new(RwLock::new(TvState::new())),
            listener: Mutex::new(None),
        }
    }
}

/// Confirmed power and input control of one device.
///
/// Construct once at startup with [`TransitionEngine::builder`] and share by
/// reference (or `Arc`) with request handlers.
pub struct TransitionEngine<T> {
    device: Device,
    timing: TimingConfig,
    channel: BusChannel<T>,
    power: Arc<StatusOracle<PowerState>>,
    active_source: Arc<StatusOracle<PhysicalAddress>>,
    state: Arc<RwLock<TvState>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl TransitionEngine<()> {
    /// Creates an engine builder.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }
}

impl<T: BusTransport> TransitionEngine<T> {
    /// Returns the controlled device.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Returns the timing configuration.
    #[must_use]
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Returns true if an adapter was bound at startup.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.channel.is_initialized()
    }

    /// Returns the best-known state without touching the bus.
    #[must_use]
    pub fn state(&self) -> TvState {
        *self.state.read()
    }

    /// Stops the notification listener. Later waits will time out.
    pub fn shutdown(&self) {
        if let Some(listener) = self.listener.lock().take() {
            listener.abort();
            tracing::debug!("Notification listener stopped");
        }
    }

    // ========== Outcome API ==========

    /// Turns the TV on and, if `input` is given, selects it.
    pub async fn turn_on(&self, input: Option<InputPort>) -> TransitionOutcome {
        self.run(TransitionRequest::PowerOn { input }).await
    }

    /// Puts the TV into standby.
    pub async fn turn_off(&self) -> TransitionOutcome {
        self.run(TransitionRequest::PowerOff).await
    }

    /// Makes sure the TV is on and showing `input`.
    pub async fn switch_input(&self, input: InputPort) -> TransitionOutcome {
        self.run(TransitionRequest::SwitchInput { input }).await
    }

    /// Asks the TV for its power status once, without retrying.
    pub async fn query_state(&self) -> TransitionOutcome {
        match self.query_power_state().await {
            Ok(power) => TransitionOutcome::success(power.as_str()).with_state(power),
            Err(err @ Error::Timeout { .. }) => {
                TransitionOutcome::failure(&err).with_state(PowerState::Unknown)
            }
            Err(err) => TransitionOutcome::failure(&err),
        }
    }

    async fn run(&self, request: TransitionRequest) -> TransitionOutcome {
        match self.execute(request).await {
            Ok(()) => {
                TransitionOutcome::success(request.success_message()).with_state(self.state().power())
            }
            Err(err) => {
                tracing::warn!(%request, error = %err, "Transition failed");
                TransitionOutcome::failure(&err)
            }
        }
    }

    // ========== Fallible API ==========

    /// Runs `request` to a confirmed state or a terminal failure.
    ///
    /// # Errors
    ///
    /// - `Error::NotInitialized` if no adapter was bound
    /// - `Error::UnsupportedCapability` if the device cannot do it
    /// - `Error::Transport` if a send fails
    /// - `Error::SubgoalUnmet` if a sub-goal exhausts its retry budget
    pub async fn execute(&self, request: TransitionRequest) -> Result<()> {
        let bus = self.channel.acquire().await?;
        self.device.capabilities().ensure_supports(&request)?;
        let exec = CommandExecutor::new(&bus, self.device.logical_address());
        let plan = TransitionPlan::new(&request, self.timing.retry_budget());

        let mut stage = Stage::Idle;
        loop {
            let event = match stage {
                Stage::Idle => Event::Start,
                Stage::Optimistic => {
                    for goal in plan.goals() {
                        self.issue(&exec, *goal).await?;
                    }
                    tokio::time::sleep(self.timing.settle_delay()).await;
                    Event::Assessed {
                        first_unmet: self.assess(&exec, &plan).await?,
                    }
                }
                Stage::Diagnosing { goal } => Event::Checked {
                    met: self.check(&exec, plan.goals()[goal]).await?,
                },
                Stage::Troubleshooting { goal, attempt } => {
                    let sub_goal = plan.goals()[goal];
                    tracing::warn!(%request, %sub_goal, attempt, "Retrying sub-goal");
                    self.issue(&exec, sub_goal).await?;
                    tokio::time::sleep(self.timing.retry_delay()).await;
                    Event::Checked {
                        met: self.verify(&exec, sub_goal).await?,
                    }
                }
                Stage::Confirmed => {
                    tracing::debug!(%request, "Transition confirmed");
                    return Ok(());
                }
                Stage::Failed { goal } => return Err(Error::SubgoalUnmet(plan.goals()[goal])),
            };

            let next = plan.advance(stage, event);
            tracing::trace!(%request, ?stage, ?event, ?next, "Stage transition");
            stage = next;
        }
    }

    /// Queries the power status once and waits up to the query timeout.
    ///
    /// # Errors
    ///
    /// - `Error::NotInitialized` if no adapter was bound
    /// - `Error::Transport` if the query cannot be sent
    /// - `Error::Timeout` if no report arrives in time
    pub async fn query_power_state(&self) -> Result<PowerState> {
        let bus = self.channel.acquire().await?;
        self.device.capabilities().ensure_power_query()?;
        let exec = CommandExecutor::new(&bus, self.device.logical_address());
        let timeout = self.timing.query_timeout();

        self.query(&exec, self.power.as_ref(), &PowerCommand::Query, timeout)
            .await?
            .ok_or(Error::Timeout {
                waited_ms: millis(timeout),
                awaiting: "power status",
            })
    }

    // ========== Stage I/O ==========

    /// Sends the command that drives `goal`.
    async fn issue(&self, exec: &CommandExecutor<'_, '_, T>, goal: SubGoal) -> Result<()> {
        match goal {
            SubGoal::Power(PowerTarget::On) => exec.power_on().await,
            SubGoal::Power(PowerTarget::Standby) => exec.standby().await,
            SubGoal::ActiveSource(port) => exec.select_input(port).await,
        }
    }

    /// Checks sub-goals in order and returns the first one not met.
    async fn assess(
        &self,
        exec: &CommandExecutor<'_, '_, T>,
        plan: &TransitionPlan,
    ) -> Result<Option<usize>> {
        for (index, goal) in plan.goals().iter().enumerate() {
            if !self.check(exec, *goal).await? {
                tracing::debug!(sub_goal = %goal, "Sub-goal not met after settle delay");
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// One query, one bounded wait.
    async fn check(&self, exec: &CommandExecutor<'_, '_, T>, goal: SubGoal) -> Result<bool> {
        let timeout = self.timing.query_timeout();
        let met = match goal {
            SubGoal::Power(target) => self
                .query(exec, self.power.as_ref(), &PowerCommand::Query, timeout)
                .await?
                .is_some_and(|power| target.is_reached_by(power)),
            SubGoal::ActiveSource(port) => self
                .query(exec, self.active_source.as_ref(), &RoutingCommand::RequestActiveSource, timeout)
                .await?
                .is_some_and(|address| address == port.physical_address()),
        };
        Ok(met)
    }

    /// Polls until `goal` is observed or its deadline passes.
    async fn verify(&self, exec: &CommandExecutor<'_, '_, T>, goal: SubGoal) -> Result<bool> {
        let polled = match goal {
            SubGoal::Power(target) => self
                .poll_until(
                    exec,
                    self.power.as_ref(),
                    &PowerCommand::Query,
                    self.timing.power_policy(target),
                    "power status",
                    |power| target.is_reached_by(power),
                )
                .await
                .map(drop),
            SubGoal::ActiveSource(port) => self
                .poll_until(
                    exec,
                    self.active_source.as_ref(),
                    &RoutingCommand::RequestActiveSource,
                    self.timing.active_source_policy(),
                    "active source",
                    |address| address == port.physical_address(),
                )
                .await
                .map(drop),
        };

        match polled {
            Ok(()) => Ok(true),
            Err(Error::Timeout { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Clears `oracle`, sends `query` and waits up to `timeout` for a report.
    async fn query<S, C>(
        &self,
        exec: &CommandExecutor<'_, '_, T>,
        oracle: &StatusOracle<S>,
        query: &C,
        timeout: Duration,
    ) -> Result<Option<S>>
    where
        S: Copy + Send + Sync,
        C: Command + Sync,
    {
        oracle.clear();
        exec.send(query).await?;
        Ok(oracle.await_report(timeout).await.map(|report| report.observed()))
    }

    /// Queries once per interval until `reached` accepts a report.
    ///
    /// Transitional or unexpected reports and missing replies just lead to
    /// the next query. Queries are paced by the interval even when replies
    /// come back early.
    async fn poll_until<S, C>(
        &self,
        exec: &CommandExecutor<'_, '_, T>,
        oracle: &StatusOracle<S>,
        query: &C,
        policy: PollPolicy,
        awaiting: &'static str,
        reached: impl Fn(S) -> bool,
    ) -> Result<S>
    where
        S: Copy + Send + Sync + fmt::Debug,
        C: Command + Sync,
    {
        let started = Instant::now();
        let deadline = started + policy.deadline();

        loop {
            let now = Instant::now();
            let remaining = deadline.saturating_duration_since(now);
            if remaining.is_zero() {
                tracing::debug!(awaiting, waited = ?policy.deadline(), "Polling deadline elapsed");
                return Err(Error::Timeout {
                    waited_ms: millis(policy.deadline()),
                    awaiting,
                });
            }

            let wait = policy.query_interval().min(remaining);
            match self.query(exec, oracle, query, wait).await? {
                Some(observed) if reached(observed) => return Ok(observed),
                Some(observed) => {
                    tracing::trace!(awaiting, ?observed, "Not there yet, polling again");
                }
                None => tracing::trace!(awaiting, "No reply to query"),
            }

            tokio::time::sleep_until((now + policy.query_interval()).min(deadline)).await;
        }
    }
}

impl<T> Drop for TransitionEngine<T> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
    }
}

impl<T> fmt::Debug for TransitionEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("device", &self.device)
            .field("timing", &self.timing)
            .field("channel", &self.channel)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
