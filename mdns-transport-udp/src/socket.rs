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

//! UDP datagram socket backed by tokio

use mdns_transport::{
    BindError, Completion, DatagramSocket, Endpoint, MulticastError, RecvCallback, RecvOutcome,
    SendCallback, SocketError,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

/// A bound UDP socket with asynchronous send/receive and multicast
/// membership
///
/// Operations that cannot complete immediately are parked on an internal
/// task set. Dropping the socket cancels them: by the time `drop` returns,
/// no completion callback is running and none will ever run. The socket
/// must live inside a tokio runtime.
pub struct UdpDatagramSocket {
    socket: Option<Arc<UdpSocket>>,
    local: Option<Endpoint>,
    groups: HashSet<IpAddr>,
    recv_pending: Arc<AtomicBool>,
    // Tasks may only run a completion callback while holding this lock and
    // finding it true; Drop locks it and flips it to false. Abort alone is
    // not enough: a task that already passed its last await point keeps
    // running, so this lock is what makes drop synchronize with an
    // in-flight completion.
    alive: Arc<Mutex<bool>>,
    // Dropping the set aborts every operation still parked at an await.
    ops: JoinSet<()>,
}

impl UdpDatagramSocket {
    /// Create an unbound socket. No OS resources are held until `listen`.
    pub fn new() -> Self {
        Self {
            socket: None,
            local: None,
            groups: HashSet::new(),
            recv_pending: Arc::new(AtomicBool::new(false)),
            alive: Arc::new(Mutex::new(true)),
            ops: JoinSet::new(),
        }
    }

    /// Drop bookkeeping for operations that already completed.
    fn reap_finished(&mut self) {
        while self.ops.try_join_next().is_some() {}
    }
}

impl Default for UdpDatagramSocket {
    fn default() -> Self {
        Self::new()
    }
}

fn map_bind_error(endpoint: Endpoint, e: io::Error) -> BindError {
    match e.kind() {
        io::ErrorKind::AddrInUse => BindError::AddressInUse(endpoint),
        io::ErrorKind::PermissionDenied => BindError::PermissionDenied(endpoint),
        _ => BindError::InvalidAddress {
            endpoint,
            source: e,
        },
    }
}

impl DatagramSocket for UdpDatagramSocket {
    fn listen(&mut self, local: Endpoint) -> Result<(), BindError> {
        if self.socket.is_some() {
            return Err(BindError::AlreadyBound);
        }

        // Bind through std so listen never suspends, then hand the
        // nonblocking fd to tokio.
        let std_socket =
            std::net::UdpSocket::bind(SocketAddr::from(local)).map_err(|e| map_bind_error(local, e))?;
        std_socket
            .set_nonblocking(true)
            .map_err(|e| map_bind_error(local, e))?;
        let socket = UdpSocket::from_std(std_socket).map_err(|e| map_bind_error(local, e))?;

        let bound: Endpoint = socket
            .local_addr()
            .map_err(|e| map_bind_error(local, e))?
            .into();
        debug!(%bound, "datagram socket bound");

        self.socket = Some(Arc::new(socket));
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
        on_complete: SendCallback,
    ) -> Result<Completion<usize>, SocketError> {
        let socket = Arc::clone(self.socket.as_ref().ok_or(SocketError::NotBound)?);
        self.reap_finished();

        let dest_addr = SocketAddr::from(dest);
        match socket.try_send_to(payload, dest_addr) {
            Ok(sent) => {
                trace!(%dest, sent, "send completed synchronously");
                return Ok(Completion::Ready(sent));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(e.into()),
        }

        // The caller's slice is not retained; the in-flight copy belongs to
        // the operation.
        let data = payload.to_vec();
        let alive = Arc::clone(&self.alive);
        self.ops.spawn(async move {
            let result = socket
                .send_to(&data, dest_addr)
                .await
                .map_err(SocketError::from);
            if let Err(e) = &result {
                warn!(%dest, error = %e, "asynchronous send failed");
            }
            let alive = alive.lock();
            if !*alive {
                return;
            }
            on_complete(result);
        });
        trace!(%dest, len = payload.len(), "send pending");
        Ok(Completion::Pending)
    }

    fn recv_from(
        &mut self,
        mut buffer: Vec<u8>,
        on_complete: RecvCallback,
    ) -> Result<Completion<RecvOutcome>, SocketError> {
        let socket = Arc::clone(self.socket.as_ref().ok_or(SocketError::NotBound)?);
        if self.recv_pending.load(Ordering::Acquire) {
            return Err(SocketError::OperationInProgress);
        }
        self.reap_finished();

        match socket.try_recv_from(&mut buffer) {
            Ok((len, from)) => {
                trace!(%from, len, "receive completed synchronously");
                return Ok(Completion::Ready(RecvOutcome {
                    buffer,
                    len,
                    source: from.into(),
                }));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(e.into()),
        }

        self.recv_pending.store(true, Ordering::Release);
        let pending = Arc::clone(&self.recv_pending);
        let alive = Arc::clone(&self.alive);
        self.ops.spawn(async move {
            let result = socket.recv_from(&mut buffer).await;
            let alive = alive.lock();
            if !*alive {
                return;
            }
            // Clear the slot before the callback so the continuation may
            // immediately issue the next receive.
            pending.store(false, Ordering::Release);
            match result {
                Ok((len, from)) => on_complete(Ok(RecvOutcome {
                    buffer,
                    len,
                    source: from.into(),
                })),
                Err(e) => {
                    warn!(error = %e, "asynchronous receive failed");
                    on_complete(Err(e.into()));
                }
            }
        });
        trace!("receive pending");
        Ok(Completion::Pending)
    }

    fn join_group(&mut self, group: IpAddr) -> Result<(), MulticastError> {
        let socket = self.socket.as_ref().ok_or(MulticastError::NotBound)?;
        if !group.is_multicast() {
            return Err(MulticastError::InvalidGroupAddress(group));
        }
        if self.groups.contains(&group) {
            return Ok(());
        }

        match group {
            IpAddr::V4(g) => socket.join_multicast_v4(g, Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(g) => socket.join_multicast_v6(&g, 0),
        }
        .map_err(MulticastError::PlatformRejected)?;

        self.groups.insert(group);
        debug!(%group, "joined multicast group");
        Ok(())
    }

    fn leave_group(&mut self, group: IpAddr) -> Result<(), MulticastError> {
        let socket = self.socket.as_ref().ok_or(MulticastError::NotBound)?;
        if !self.groups.contains(&group) {
            return Err(MulticastError::NotAMember(group));
        }

        match group {
            IpAddr::V4(g) => socket.leave_multicast_v4(g, Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(g) => socket.leave_multicast_v6(&g, 0),
        }
        .map_err(MulticastError::PlatformRejected)?;

        self.groups.remove(&group);
        debug!(%group, "left multicast group");
        Ok(())
    }
}

impl Drop for UdpDatagramSocket {
    fn drop(&mut self) {
        // Taking the lock waits out any completion that is mid-callback;
        // everything else sees false and returns without invoking. Tasks
        // still parked at an await are then aborted by the JoinSet drop.
        *self.alive.lock() = false;
    }
}

impl std::fmt::Debug for UdpDatagramSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpDatagramSocket")
            .field("local", &self.local)
            .field("groups", &self.groups)
            .field("recv_pending", &self.recv_pending.load(Ordering::Relaxed))
            .finish()
    }
}
