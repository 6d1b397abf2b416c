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

//! Completion-callback contract for asynchronous socket operations
//!
//! Send and receive may finish in one of two ways:
//!
//! - **Synchronously**: the call returns [`Completion::Ready`] with the
//!   result and the registered callback is dropped without being invoked.
//! - **Asynchronously**: the call returns [`Completion::Pending`] and the
//!   callback is invoked exactly once later, from the execution context that
//!   drives the transport — never reentrantly from the registering call.
//!
//! The synchronous path is a performance optimization, not a correctness
//! requirement; callers must handle both paths identically in effect.
//!
//! Cancellation is silence: if the socket is dropped while an operation is
//! pending, its callback is dropped uninvoked. Callers must not rely on
//! drain semantics during teardown.

use crate::endpoint::Endpoint;
use crate::error::SocketError;
use tokio::sync::oneshot;

/// Outcome of issuing an asynchronous operation
#[derive(Debug)]
pub enum Completion<T> {
    /// The operation finished during the call; the callback was not invoked
    Ready(T),

    /// The operation is in flight; the callback fires exactly once later
    Pending,
}

impl<T> Completion<T> {
    /// Whether the operation is still in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, Completion::Pending)
    }
}

/// Result of a completed receive
///
/// Ownership of the buffer passed to `recv_from` returns to the caller here.
/// Only the first `len` bytes were written; the rest of the buffer is
/// untouched.
#[derive(Debug)]
pub struct RecvOutcome {
    /// The caller's buffer, returned with the datagram written at the front
    pub buffer: Vec<u8>,

    /// Number of bytes received (may be a truncated datagram if the buffer
    /// was smaller than the packet)
    pub len: usize,

    /// The sender's endpoint
    pub source: Endpoint,
}

/// Continuation for an asynchronous send: bytes sent, or the failure.
pub type SendCallback = Box<dyn FnOnce(Result<usize, SocketError>) + Send + 'static>;

/// Continuation for an asynchronous receive.
pub type RecvCallback = Box<dyn FnOnce(Result<RecvOutcome, SocketError>) + Send + 'static>;

/// Create a [`SendCallback`] wired to a one-shot channel.
///
/// Lets async callers await a send completion instead of supplying a
/// closure. If the socket is dropped before completion the receiver yields
/// a [`oneshot::error::RecvError`], mirroring the dropped-callback
/// cancellation contract.
///
/// A synchronous completion ([`Completion::Ready`]) drops the callback
/// without invoking it, so the receiver yields the same `RecvError` in
/// that case: consume the `Ready` value from the call itself and only
/// await the receiver when the call returned [`Completion::Pending`].
pub fn send_completion() -> (SendCallback, oneshot::Receiver<Result<usize, SocketError>>) {
    let (tx, rx) = oneshot::channel();
    let callback: SendCallback = Box::new(move |result| {
        // Receiver may have been dropped; completion is best-effort.
        let _ = tx.send(result);
    });
    (callback, rx)
}

/// Create a [`RecvCallback`] wired to a one-shot channel.
///
/// Same contract as [`send_completion`]: await the receiver only when the
/// registering call returned [`Completion::Pending`]; a `Ready` return or
/// a dropped socket both leave the channel closed.
pub fn recv_completion() -> (
    RecvCallback,
    oneshot::Receiver<Result<RecvOutcome, SocketError>>,
) {
    let (tx, rx) = oneshot::channel();
    let callback: RecvCallback = Box::new(move |result| {
        let _ = tx.send(result);
    });
    (callback, rx)
}
