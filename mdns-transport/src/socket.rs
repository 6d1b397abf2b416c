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

//! Datagram socket and factory traits

use crate::completion::{Completion, RecvCallback, RecvOutcome, SendCallback};
use crate::endpoint::Endpoint;
use crate::error::{BindError, MulticastError, SocketError};
use std::net::IpAddr;

/// A single bound UDP-like endpoint with asynchronous send/receive and
/// multicast group membership
///
/// A socket is driven by one logical execution context; implementations do
/// not need internal locking for the caller-facing surface. Typical mDNS
/// usage issues a `recv_from` before the first query is sent, so no reply is
/// missed, and fires sends as independent one-shot operations.
///
/// Dropping a socket releases its port and memberships and silently drops
/// any pending operation's callback — a callback is never invoked after the
/// socket it was registered on is gone.
pub trait DatagramSocket: Send {
    /// Bind the socket to a local endpoint.
    ///
    /// Must be called exactly once, before any send or receive. Port 0
    /// requests an ephemeral port; read the assignment back with
    /// [`local_endpoint`](Self::local_endpoint). Never suspends.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::AlreadyBound`] on a second call, or the
    /// platform's refusal mapped onto the remaining variants.
    fn listen(&mut self, local: Endpoint) -> Result<(), BindError>;

    /// The bound local endpoint, or `None` before a successful `listen`.
    fn local_endpoint(&self) -> Option<Endpoint>;

    /// Send `payload` to `dest`.
    ///
    /// May complete synchronously with the byte count
    /// ([`Completion::Ready`], `on_complete` dropped uninvoked) or return
    /// [`Completion::Pending`] and invoke `on_complete` exactly once later.
    /// The payload is copied if the operation goes asynchronous; the caller's
    /// slice is never retained past this call. Multiple sends may be in
    /// flight at once, each addressed independently.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::NotBound`] before `listen`, or an immediate
    /// transport failure. Asynchronous failures arrive through
    /// `on_complete`; a failed send is not fatal to the socket.
    fn send_to(
        &mut self,
        payload: &[u8],
        dest: Endpoint,
        on_complete: SendCallback,
    ) -> Result<Completion<usize>, SocketError>;

    /// Receive one datagram into `buffer`.
    ///
    /// The buffer is owned by the operation until it completes and comes
    /// back in the [`RecvOutcome`] with the byte count and sender endpoint.
    /// A datagram larger than the buffer is truncated to fit, without error.
    ///
    /// At most one receive may be outstanding per socket.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::OperationInProgress`] if a receive is already
    /// pending (the pending one is undisturbed), or
    /// [`SocketError::NotBound`] before `listen`.
    fn recv_from(
        &mut self,
        buffer: Vec<u8>,
        on_complete: RecvCallback,
    ) -> Result<Completion<RecvOutcome>, SocketError>;

    /// Join a multicast group. Idempotent: joining a group the socket is
    /// already a member of is a no-op success. Never suspends.
    ///
    /// # Errors
    ///
    /// Returns [`MulticastError::InvalidGroupAddress`] for a non-multicast
    /// address, [`MulticastError::NotBound`] before `listen`, or
    /// [`MulticastError::PlatformRejected`] if the platform refuses.
    fn join_group(&mut self, group: IpAddr) -> Result<(), MulticastError>;

    /// Leave a multicast group previously joined. Never suspends.
    ///
    /// # Errors
    ///
    /// Returns [`MulticastError::NotAMember`] if the socket never joined
    /// `group`; otherwise the same failures as
    /// [`join_group`](Self::join_group).
    fn leave_group(&mut self, group: IpAddr) -> Result<(), MulticastError>;
}

/// Creates datagram sockets, abstracting their construction from callers
///
/// Each returned socket is unbound (callers must `listen` before use) and
/// fully independent: no buffers or callback state are shared between
/// sockets from the same factory. A factory may allocate OS resources on
/// every call; it never caches or pools sockets.
pub trait SocketFactory {
    /// Create a new, unbound socket.
    fn create_socket(&self) -> Box<dyn DatagramSocket>;
}
