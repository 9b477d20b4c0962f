// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `cec_hub` - verified television control over HDMI-CEC.
//!
//! CEC commands are fire-and-forget: the bus gives no answer to "did the TV
//! actually turn on?", status replies arrive asynchronously and can be lost,
//! and only one exchange may be in flight at a time. This library wraps
//! those commands in a command-and-verify engine that reports success only
//! once the target state has been observed.
//!
//! # Components
//!
//! - [`protocol::BusChannel`]: exclusive, serialized access to the bus
//! - [`state::StatusOracle`]: bounded waits on asynchronously reported state
//! - [`command::CommandExecutor`]: one-shot sends of single commands
//! - [`engine::TransitionEngine`]: the staged optimistic/troubleshooting protocol
//!
//! The adapter binding itself lives outside this crate; it implements
//! [`protocol::BusTransport`].
//!
//! # Quick Start
//!
//! ```no_run
//! use cec_hub::{Device, TransitionEngine, TimingConfig};
//! # use cec_hub::protocol::{BusTransport, NotificationSink, Opcode};
//! # use cec_hub::types::LogicalAddress;
//! # use cec_hub::TransportFault;
//! # struct CecClient;
//! # impl BusTransport for CecClient {
//! #     async fn send(&self, _: LogicalAddress, _: Opcode, _: &[u8]) -> Result<(), TransportFault> { Ok(()) }
//! #     fn subscribe(&self, _: NotificationSink) -> Result<(), TransportFault> { Ok(()) }
//! # }
//! # fn open_cec_client() -> Result<CecClient, TransportFault> { Ok(CecClient) }
//!
//! #[tokio::main]
//! async fn main() -> cec_hub::Result<()> {
//!     let timing = TimingConfig::from_json(r#"{ "settle_delay_ms": 2000 }"#)?;
//!     let engine = TransitionEngine::builder()
//!         .with_device(Device::television())
//!         .with_timing(timing)
//!         .bind(open_cec_client);
//!
//!     let outcome = engine.turn_off().await;
//!     assert!(outcome.success, "{}", outcome.message);
//!
//!     let status = engine.query_state().await;
//!     println!("TV is {}", status.message);
//!     Ok(())
//! }
//! ```

mod capabilities;
pub mod command;
mod device;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod state;
pub mod telemetry;
pub mod types;

pub use capabilities::{Capabilities, CapabilitiesBuilder};
pub use command::{Command, CommandExecutor, PowerCommand, RoutingCommand};
pub use device::Device;
pub use engine::{
    EngineBuilder, PollPolicy, TimingConfig, TransitionEngine, TransitionOutcome,
    TransitionRequest,
};
pub use error::{Error, ParseError, Result, TransportFault, ValueError};
pub use protocol::{
    Arrival, ArrivalClock, BusChannel, BusMessage, BusTransport, NotificationSink, Opcode,
};
pub use state::{StatusOracle, StatusReport, TvState};
pub use types::{InputPort, LogicalAddress, PhysicalAddress, PowerState};
