// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exclusive access to the physical bus.

use std::fmt;

use tokio::sync::{Mutex, MutexGuard};

use crate::error::Error;
use crate::protocol::{BusTransport, Opcode};
use crate::types::LogicalAddress;

/// Serializes all traffic to one bus.
///
/// The transport is only reachable through a [`BusAccess`] token obtained
/// from [`acquire`](Self::acquire); holding the token is holding the bus.
/// Callers queue in FIFO order on the underlying Tokio mutex.
pub struct BusChannel<T> {
    transport: Option<Mutex<T>>,
}

impl<T: BusTransport> BusChannel<T> {
    /// Creates a channel over a bound transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport: Some(Mutex::new(transport)),
        }
    }

    /// Creates a channel with no adapter behind it.
    ///
    /// Every acquisition fails with [`Error::NotInitialized`].
    #[must_use]
    pub fn uninitialized() -> Self {
        Self { transport: None }
    }

    /// Returns true if an adapter was bound.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    /// Waits for the bus to become free and takes it.
    ///
    /// The bus is released when the returned token is dropped, on every
    /// exit path of the holder.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` immediately if no adapter was bound.
    pub async fn acquire(&self) -> Result<BusAccess<'_, T>, Error> {
        let transport = self.transport.as_ref().ok_or(Error::NotInitialized)?;
        let guard = transport.lock().await;
        tracing::trace!("Bus acquired");
        Ok(BusAccess { guard })
    }
}

impl<T> fmt::Debug for BusChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusChannel")
            .field("initialized", &self.transport.is_some())
            .finish()
    }
}

/// Proof of exclusive bus ownership.
pub struct BusAccess<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T: BusTransport> BusAccess<'_, T> {
    /// Transmits one message while holding the bus.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the adapter fails the transmit.
    pub async fn transmit(
        &self,
        destination: LogicalAddress,
        opcode: Opcode,
        payload: &[u8],
    ) -> Result<(), Error> {
        tracing::trace!(%destination, %opcode, ?payload, "Transmitting");
        self.guard
            .send(destination, opcode, payload)
            .await
            .map_err(|fault| {
                tracing::warn!(%destination, %opcode, error = %fault, "Transmit failed");
                Error::Transport(fault)
            })
    }
}

impl<T> Drop for BusAccess<'_, T> {
    fn drop(&mut self) {
        tracing::trace!("Bus released");
    }
}

impl<T> fmt::Debug for BusAccess<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusAccess").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex as SyncMutex;

    use super::*;
    use crate::error::TransportFault;
    use crate::protocol::NotificationSink;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Arc<SyncMutex<Vec<(u8, Opcode)>>>,
        fail: bool,
    }

    impl BusTransport for RecordingTransport {
        async fn send(
            &self,
            destination: LogicalAddress,
            opcode: Opcode,
            _payload: &[u8],
        ) -> Result<(), TransportFault> {
            if self.fail {
                return Err(TransportFault::Nack { destination });
            }
            self.sent.lock().push((destination.value(), opcode));
            Ok(())
        }

        fn subscribe(&self, _sink: NotificationSink) -> Result<(), TransportFault> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn uninitialized_channel_refuses_access() {
        let channel = BusChannel::<RecordingTransport>::uninitialized();
        assert!(!channel.is_initialized());
        assert!(matches!(
            channel.acquire().await,
            Err(Error::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn transmit_reaches_transport() {
        let transport = RecordingTransport::default();
        let sent = Arc::clone(&transport.sent);
        let channel = BusChannel::new(transport);

        let access = channel.acquire().await.unwrap();
        access
            .transmit(LogicalAddress::TV, Opcode::Standby, &[])
            .await
            .unwrap();

        assert_eq!(sent.lock().as_slice(), &[(0, Opcode::Standby)]);
    }

    #[tokio::test]
    async fn transport_fault_is_surfaced() {
        let channel = BusChannel::new(RecordingTransport {
            fail: true,
            ..Default::default()
        });
        let access = channel.acquire().await.unwrap();
        let err = access
            .transmit(LogicalAddress::TV, Opcode::ImageViewOn, &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportFault::Nack { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn second_holder_waits_for_release() {
        let channel = BusChannel::new(RecordingTransport::default());
        let first = channel.acquire().await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(50), channel.acquire()).await;
        assert!(blocked.is_err());

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(50), channel.acquire()).await;
        assert!(second.is_ok());
    }
}
