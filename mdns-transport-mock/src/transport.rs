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

//! Shared mock transport state and factory

use crate::socket::MockDatagramSocket;
use mdns_transport::{DatagramSocket, Endpoint, RecvCallback, RecvOutcome, SocketFactory};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// How the mock fulfills a `recv_from` when a canned response is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseDelivery {
    /// Park the receive until [`MockTransport::simulate_receive`]
    #[default]
    Manual,

    /// Complete `recv_from` synchronously with the canned packet
    Immediate,

    /// Return pending and post the canned completion to the running tokio
    /// runtime, so the callback fires on a later turn
    Deferred,
}

/// A payload captured by the mock instead of being transmitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPacket {
    /// Exactly the bytes submitted to `send_to`
    pub payload: Vec<u8>,

    /// The destination the caller addressed
    pub destination: Endpoint,
}

#[derive(Clone)]
struct CannedResponse {
    payload: Vec<u8>,
    source: Endpoint,
}

/// One in-flight receive parked on a mock socket.
pub(crate) struct PendingRecv {
    seq: u64,
    buffer: Vec<u8>,
    on_complete: RecvCallback,
}

/// Per-socket slot holding at most one pending receive.
///
/// Shared between the socket (which parks and clears it) and the transport
/// (which fulfills it on simulated delivery). A dropped socket empties its
/// slot first, so delivery can never reach a dead socket's callback.
#[derive(Default)]
pub(crate) struct RecvSlot {
    pending: Mutex<Option<PendingRecv>>,
}

struct MockTransportInner {
    response: Mutex<Option<CannedResponse>>,
    delivery: Mutex<ResponseDelivery>,
    sent: Mutex<Vec<SentPacket>>,
    slots: Mutex<Vec<Arc<RecvSlot>>>,
    next_port: AtomicU16,
    next_seq: AtomicU64,
}

/// Shared handle over the mock transport: socket factory, canned-response
/// store, and inspection surface
///
/// Clones share the same state, so a test harness keeps one handle while
/// code under test receives sockets through the [`SocketFactory`] trait.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<MockTransportInner>,
}

impl MockTransport {
    /// Create a transport with no canned response and manual delivery.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MockTransportInner {
                response: Mutex::new(None),
                delivery: Mutex::new(ResponseDelivery::default()),
                sent: Mutex::new(Vec::new()),
                slots: Mutex::new(Vec::new()),
                // Fake ephemeral range, matching what a real bind to port 0
                // would hand out.
                next_port: AtomicU16::new(49152),
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Configure the canned response packet and its apparent sender.
    pub fn set_response_packet(&self, payload: impl Into<Vec<u8>>, source: Endpoint) {
        *self.inner.response.lock() = Some(CannedResponse {
            payload: payload.into(),
            source,
        });
    }

    /// Choose how receives are fulfilled from the canned response.
    ///
    /// `Immediate` and `Deferred` fall back to `Manual` while no canned
    /// response is configured.
    pub fn set_delivery(&self, delivery: ResponseDelivery) {
        *self.inner.delivery.lock() = delivery;
    }

    /// Inject an inbound packet, fulfilling the most recently registered
    /// pending receive across this transport's sockets.
    ///
    /// Copies `min(packet.len(), buffer.len())` bytes and invokes the
    /// receive's callback with that count and `source` as the sender,
    /// exactly as a real I/O completion would. Returns `false` if no
    /// receive was pending.
    pub fn simulate_receive(&self, packet: &[u8], source: Endpoint) -> bool {
        let slots: Vec<Arc<RecvSlot>> = self.inner.slots.lock().clone();
        let mut newest: Option<(u64, Arc<RecvSlot>)> = None;
        for slot in slots {
            let seq = slot.pending.lock().as_ref().map(|p| p.seq);
            if let Some(seq) = seq {
                if newest.as_ref().is_none_or(|(best, _)| seq > *best) {
                    newest = Some((seq, slot));
                }
            }
        }
        match newest {
            Some((_, slot)) => Self::fulfill(&slot, packet, source),
            None => {
                trace!("simulated receive with no pending receive to fulfill");
                false
            }
        }
    }

    /// Every payload submitted to `send_to` on any of this transport's
    /// sockets, in submission order. Nothing is ever transmitted.
    pub fn sent_packets(&self) -> Vec<SentPacket> {
        self.inner.sent.lock().clone()
    }

    /// Clear the sent-packet log.
    pub fn clear_sent_packets(&self) {
        self.inner.sent.lock().clear();
    }

    pub(crate) fn record_send(&self, packet: SentPacket) {
        trace!(dest = %packet.destination, len = packet.payload.len(), "mock send recorded");
        self.inner.sent.lock().push(packet);
    }

    pub(crate) fn assign_ephemeral_port(&self) -> u16 {
        self.inner.next_port.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn delivery(&self) -> ResponseDelivery {
        *self.inner.delivery.lock()
    }

    pub(crate) fn canned_response(&self) -> Option<(Vec<u8>, Endpoint)> {
        self.inner
            .response
            .lock()
            .as_ref()
            .map(|r| (r.payload.clone(), r.source))
    }

    pub(crate) fn register_slot(&self) -> Arc<RecvSlot> {
        let slot = Arc::new(RecvSlot::default());
        self.inner.slots.lock().push(Arc::clone(&slot));
        slot
    }

    pub(crate) fn unregister_slot(&self, slot: &Arc<RecvSlot>) {
        self.inner
            .slots
            .lock()
            .retain(|other| !Arc::ptr_eq(other, slot));
    }

    pub(crate) fn park_receive(
        &self,
        slot: &RecvSlot,
        buffer: Vec<u8>,
        on_complete: RecvCallback,
    ) {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        *slot.pending.lock() = Some(PendingRecv {
            seq,
            buffer,
            on_complete,
        });
    }

    /// Deliver the canned response to a specific slot's pending receive.
    /// Used by the deferred delivery path.
    pub(crate) fn fulfill_from_canned(&self, slot: &RecvSlot) -> bool {
        match self.canned_response() {
            Some((payload, source)) => Self::fulfill(slot, &payload, source),
            None => false,
        }
    }

    fn fulfill(slot: &RecvSlot, packet: &[u8], source: Endpoint) -> bool {
        let Some(PendingRecv {
            mut buffer,
            on_complete,
            ..
        }) = slot.pending.lock().take()
        else {
            return false;
        };
        let len = packet.len().min(buffer.len());
        buffer[..len].copy_from_slice(&packet[..len]);
        trace!(len, %source, "mock receive fulfilled");
        on_complete(Ok(RecvOutcome {
            buffer,
            len,
            source,
        }));
        true
    }
}

impl RecvSlot {
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Drop any parked receive without invoking its callback.
    pub(crate) fn clear(&self) {
        self.pending.lock().take();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketFactory for MockTransport {
    fn create_socket(&self) -> Box<dyn DatagramSocket> {
        Box::new(MockDatagramSocket::new(self.clone()))
    }
}
