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

//! Factory producing real UDP sockets

use crate::socket::UdpDatagramSocket;
use mdns_transport::{DatagramSocket, SocketFactory};

/// Produces independent, unbound [`UdpDatagramSocket`]s
///
/// Stateless: every call hands out a fresh socket with nothing shared
/// between them, and no socket is cached or pooled. OS resources are not
/// allocated until the socket's `listen`.
#[derive(Debug, Default)]
pub struct UdpSocketFactory;

impl UdpSocketFactory {
    /// Create a factory.
    pub fn new() -> Self {
        Self
    }
}

impl SocketFactory for UdpSocketFactory {
    fn create_socket(&self) -> Box<dyn DatagramSocket> {
        Box::new(UdpDatagramSocket::new())
    }
}
