// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus transport abstraction and serialized bus access.
//!
//! The library does not bind a CEC adapter itself. An adapter binding
//! implements [`BusTransport`]: a fire-and-forget `send` and a one-time
//! `subscribe` that hands the binding a [`NotificationSink`] for incoming
//! messages. All outgoing traffic goes through a [`BusChannel`], which
//! allows one logical operation on the bus at a time.

mod channel;
mod opcode;

pub use channel::{BusAccess, BusChannel};
pub use opcode::Opcode;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::TransportFault;
use crate::types::LogicalAddress;

/// A message observed on the bus, as delivered by the adapter binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Sender of the message.
    pub initiator: LogicalAddress,
    /// Addressee; [`LogicalAddress::BROADCAST`] for broadcasts.
    pub destination: LogicalAddress,
    /// Raw opcode byte. Unknown opcodes are passed through and filtered later.
    pub opcode: u8,
    /// Operand bytes following the opcode.
    pub payload: Vec<u8>,
}

impl BusMessage {
    /// Creates a message with a known opcode.
    #[must_use]
    pub fn new(
        initiator: LogicalAddress,
        destination: LogicalAddress,
        opcode: Opcode,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            initiator,
            destination,
            opcode: opcode.value(),
            payload,
        }
    }
}

/// When a bus message reached the library, in receipt order.
///
/// Sequence numbers are strictly increasing per [`ArrivalClock`], so two
/// messages received within the same clock tick still compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrival {
    sequence: u64,
    received_at: Instant,
}

impl Arrival {
    /// Position in receipt order.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Instant of receipt.
    #[must_use]
    pub const fn received_at(&self) -> Instant {
        self.received_at
    }
}

/// Source of [`Arrival`] stamps shared by a sink and the oracles it feeds.
#[derive(Debug, Default)]
pub struct ArrivalClock {
    last: AtomicU64,
}

impl ArrivalClock {
    /// Creates a clock that has stamped nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps a message received now.
    pub fn stamp(&self) -> Arrival {
        Arrival {
            sequence: self.last.fetch_add(1, Ordering::SeqCst) + 1,
            received_at: Instant::now(),
        }
    }

    /// Sequence number of the latest stamp, 0 if none.
    #[must_use]
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

/// Receiving end handed to the adapter binding at subscription time.
///
/// Each message is stamped on receipt, before it is queued, so a report
/// still sitting in the buffer keeps the time it actually arrived.
/// Delivery never blocks the adapter's own thread: when the engine's
/// listener falls behind and the buffer is full, the message is dropped.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    tx: mpsc::Sender<(Arrival, BusMessage)>,
    clock: Arc<ArrivalClock>,
}

impl NotificationSink {
    pub(crate) fn new(tx: mpsc::Sender<(Arrival, BusMessage)>, clock: Arc<ArrivalClock>) -> Self {
        Self { tx, clock }
    }

    /// Forwards a bus message to the engine.
    ///
    /// Returns `false` if the message was dropped.
    pub fn notify(&self, message: BusMessage) -> bool {
        match self.tx.try_send((self.clock.stamp(), message)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full((_, message))) => {
                tracing::warn!(opcode = message.opcode, "Notification buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Notification listener gone, dropping message");
                false
            }
        }
    }

    /// Returns true once the engine's listener has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// An adapter binding that can put frames on the bus.
///
/// Implementations are expected to be thin: no retries and no
/// interpretation of replies. Replies arrive through the
/// [`NotificationSink`] registered with [`subscribe`](Self::subscribe).
pub trait BusTransport: Send + Sync {
    /// Transmits one message to `destination`.
    ///
    /// # Errors
    ///
    /// Returns `TransportFault` if the adapter fails to transmit.
    fn send(
        &self,
        destination: LogicalAddress,
        opcode: Opcode,
        payload: &[u8],
    ) -> impl Future<Output = Result<(), TransportFault>> + Send;

    /// Registers the sink that receives every incoming bus message.
    ///
    /// Called exactly once, during engine initialization.
    ///
    /// # Errors
    ///
    /// Returns `TransportFault` if the binding cannot deliver notifications.
    fn subscribe(&self, sink: NotificationSink) -> Result<(), TransportFault>;
}
