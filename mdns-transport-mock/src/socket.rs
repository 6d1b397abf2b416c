// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Mock datagram socket

use crate::transport::{MockTransport, RecvSlot, ResponseDelivery};
use mdns_transport::{
    BindError, Completion, DatagramSocket, Endpoint, MulticastError, RecvCallback, RecvOutcome,
    SendCallback, SocketError,
};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::trace;

/// Deterministic in-memory socket created by [`MockTransport`]
///
/// Sends are logged on the shared transport and complete synchronously with
/// the full payload length. Receives are fulfilled from the transport's
/// canned response or by [`MockTransport::simulate_receive`]. All trait
/// invariants match the real UDP socket.
pub struct MockDatagramSocket {
    transport: MockTransport,
    slot: Arc<RecvSlot>,
    local: Option<Endpoint>,
    groups: HashSet<IpAddr>,
}

impl MockDatagramSocket {
    pub(crate) fn new(transport: MockTransport) -> Self {
        let slot = transport.register_slot();
        Self {
            transport,
            slot,
            local: None,
            groups: HashSet::new(),
        }
    }
}

impl DatagramSocket for MockDatagramSocket {
    fn listen(&mut self, local: Endpoint) -> Result<(), BindError> {
        if self.local.is_some() {
            return Err(BindError::AlreadyBound);
        }
        // Port 0 gets a fake ephemeral assignment, like a real bind would.
        let port = if local.port() == 0 {
            self.transport.assign_ephemeral_port()
        } else {
            local.port()
        };
        let bound = Endpoint::new(local.addr(), port);
        trace!(%bound, "mock socket bound");
        self.local = Some(bound);
        Ok(())
    }

    fn local_endpoint(&self) -> Option<Endpoint> {
        self.local
    }

    fn send_to(
        &mut self,
        payload: &[u8],
        dest: Endpoint,
        _on_complete: SendCallback,
    ) -> Result<Completion<usize>, SocketError> {
        if self.local.is_none() {
            return Err(SocketError::NotBound);
        }
        self.transport.record_send(crate::SentPacket {
            payload: payload.to_vec(),
            destination: dest,
        });
        // Synchronous success with the full length; the callback is dropped
        // uninvoked, as on the real fast path.
        Ok(Completion::Ready(payload.len()))
    }

    fn recv_from(
        &mut self,
        mut buffer: Vec<u8>,
        on_complete: RecvCallback,
    ) -> Result<Completion<RecvOutcome>, SocketError> {
        if self.local.is_none() {
            return Err(SocketError::NotBound);
        }
        if self.slot.is_pending() {
            return Err(SocketError::OperationInProgress);
        }

        match (self.transport.delivery(), self.transport.canned_response()) {
            (ResponseDelivery::Immediate, Some((payload, source))) => {
                let len = payload.len().min(buffer.len());
                buffer[..len].copy_from_slice(&payload[..len]);
                Ok(Completion::Ready(RecvOutcome {
                    buffer,
                    len,
                    source,
                }))
            }
            (ResponseDelivery::Deferred, Some(_)) => {
                self.transport.park_receive(&self.slot, buffer, on_complete);
                let transport = self.transport.clone();
                let slot = Arc::clone(&self.slot);
                // Post the completion to the runtime so it fires on a later
                // turn, never reentrantly from this call.
                tokio::spawn(async move {
                    transport.fulfill_from_canned(&slot);
                });
                Ok(Completion::Pending)
            }
            _ => {
                self.transport.park_receive(&self.slot, buffer, on_complete);
                Ok(Completion::Pending)
            }
        }
    }

    fn join_group(&mut self, group: IpAddr) -> Result<(), MulticastError> {
        if self.local.is_none() {
            return Err(MulticastError::NotBound);
        }
        if !group.is_multicast() {
            return Err(MulticastError::InvalidGroupAddress(group));
        }
        if self.groups.insert(group) {
            trace!(%group, "mock socket joined multicast group");
        }
        Ok(())
    }

    fn leave_group(&mut self, group: IpAddr) -> Result<(), MulticastError> {
        if self.local.is_none() {
            return Err(MulticastError::NotBound);
        }
        if !self.groups.remove(&group) {
            return Err(MulticastError::NotAMember(group));
        }
        trace!(%group, "mock socket left multicast group");
        Ok(())
    }
}

impl Drop for MockDatagramSocket {
    fn drop(&mut self) {
        // A dead socket's callback must never fire: empty the slot before
        // the transport could fulfill it, then forget the slot entirely.
        self.slot.clear();
        self.transport.unregister_slot(&self.slot);
    }
}

impl std::fmt::Debug for MockDatagramSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDatagramSocket")
            .field("local", &self.local)
            .field("groups", &self.groups)
            .field("recv_pending", &self.slot.is_pending())
            .finish()
    }
}
