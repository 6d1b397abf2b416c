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

//! Tokio UDP implementation of the mdns-transport socket contract
//!
//! [`UdpDatagramSocket`] wraps a nonblocking `tokio::net::UdpSocket`. Send
//! and receive take the nonblocking fast path when the OS can complete them
//! immediately; otherwise the operation is parked on a per-socket task set
//! and its callback fires when the I/O finishes. Dropping the socket aborts
//! all in-flight operations, so callbacks never outlive the socket.
//!
//! Sockets must be created and used inside a tokio runtime.
//!
//! # Example
//!
//! ```no_run
//! use mdns_transport::{recv_completion, DatagramSocket, SocketFactory};
//! use mdns_transport_udp::UdpSocketFactory;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = UdpSocketFactory::new();
//! let mut socket = factory.create_socket();
//! socket.listen("0.0.0.0:0".parse()?)?;
//! socket.join_group("224.0.0.251".parse()?)?;
//!
//! let (callback, completion) = recv_completion();
//! socket.recv_from(vec![0u8; 1500], callback)?;
//! # Ok(())
//! # }
//! ```

mod factory;
mod socket;

pub use factory::UdpSocketFactory;
pub use socket::UdpDatagramSocket;
