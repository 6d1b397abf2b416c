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

//! Asynchronous multicast datagram transport for mDNS discovery
//!
//! This crate defines the interface contract a network layer must satisfy so
//! that mDNS service discovery can send one-shot queries, receive
//! asynchronous responses, and manage multicast group membership without
//! blocking the event loop that drives it.
//!
//! ## Architecture
//!
//! - **Address types**: [`Endpoint`] — an IP address plus port with stable
//!   string and byte representations
//! - **Completion contract**: [`Completion`], [`SendCallback`],
//!   [`RecvCallback`] — how asynchronous operations report results without
//!   blocking the caller
//! - **Core traits**: [`DatagramSocket`] and [`SocketFactory`] — implemented
//!   by the production UDP transport (`mdns-transport-udp`) and the
//!   deterministic test double (`mdns-transport-mock`)
//!
//! The wire protocol carried over a socket is opaque payload to this layer;
//! nothing here is mDNS-specific beyond the shape of the contract. The
//! caller supplies the well-known multicast group and port.
//!
//! ## Completion model
//!
//! [`DatagramSocket::send_to`] and [`DatagramSocket::recv_from`] may complete
//! synchronously ([`Completion::Ready`], callback dropped uninvoked) or
//! asynchronously ([`Completion::Pending`], callback invoked exactly once
//! later from the context driving the transport). Callers must handle both
//! paths identically in effect. Dropping a socket drops any pending
//! operation's callback without invoking it.

pub mod completion;
pub mod endpoint;
pub mod error;
pub mod socket;

pub use completion::{
    recv_completion, send_completion, Completion, RecvCallback, RecvOutcome, SendCallback,
};
pub use endpoint::Endpoint;
pub use error::{AddressError, BindError, MulticastError, SocketError};
pub use socket::{DatagramSocket, SocketFactory};
