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

//! In-memory double for the mdns-transport socket contract
//!
//! This crate provides a deterministic implementation of [`DatagramSocket`]
//! and [`SocketFactory`] for testing discovery code without real
//! networking. Sends are recorded for inspection instead of transmitted;
//! receives are fulfilled from a canned response packet, either immediately,
//! on the next runtime turn, or when the harness injects a packet with
//! [`MockTransport::simulate_receive`].
//!
//! The double preserves the same pending-operation invariants as the real
//! transport — single outstanding receive, bound-before-use, idempotent
//! group join, no callback after the socket is dropped — so code under test
//! cannot tell real from fake through observable protocol violations.
//!
//! [`DatagramSocket`]: mdns_transport::DatagramSocket
//! [`SocketFactory`]: mdns_transport::SocketFactory
//!
//! # Example
//!
//! ```
//! use mdns_transport::{recv_completion, DatagramSocket, SocketFactory};
//! use mdns_transport_mock::MockTransport;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = MockTransport::new();
//! let mut socket = transport.create_socket();
//! socket.listen("0.0.0.0:0".parse()?)?;
//!
//! let (callback, completion) = recv_completion();
//! socket.recv_from(vec![0u8; 32], callback)?;
//!
//! // Inject an inbound packet as though it arrived off the network.
//! transport.simulate_receive(b"hello", "192.168.1.2:5353".parse()?);
//!
//! let outcome = completion.await??;
//! assert_eq!(&outcome.buffer[..outcome.len], b"hello");
//! # Ok(())
//! # }
//! ```

mod socket;
mod transport;

pub use socket::MockDatagramSocket;
pub use transport::{MockTransport, ResponseDelivery, SentPacket};
