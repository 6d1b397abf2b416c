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

//! Transport error types
//!
//! Every failure is reported through the same channel as success — a return
//! value or a completion callback — never as a panic. This layer never
//! swallows errors; retry and fallback policy belong to the discovery layer.

use crate::endpoint::Endpoint;
use std::net::IpAddr;

/// Errors constructing or parsing an [`Endpoint`]
///
/// These are local validation failures and are never worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    /// Raw address bytes were neither 4 (IPv4) nor 16 (IPv6) bytes long
    #[error("address must be 4 or 16 bytes, got {0}")]
    InvalidLength(usize),

    /// A string failed to parse as an endpoint
    #[error("malformed endpoint string: {0:?}")]
    Parse(String),
}

/// Errors binding a socket to a local endpoint
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// `listen` was called more than once on the same socket
    #[error("socket is already bound")]
    AlreadyBound,

    /// The requested port is taken by another socket
    #[error("address already in use: {0}")]
    AddressInUse(Endpoint),

    /// The platform refused the bind (e.g. privileged port)
    #[error("permission denied binding {0}")]
    PermissionDenied(Endpoint),

    /// The local endpoint is not assignable on this host
    #[error("invalid local address {endpoint}: {source}")]
    InvalidAddress {
        /// The endpoint that was rejected
        endpoint: Endpoint,
        /// The underlying platform error
        source: std::io::Error,
    },
}

/// Errors from send and receive operations
///
/// Returned both synchronously and through completion callbacks, so callers
/// handle the two completion paths identically.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// A receive was issued while another receive is still pending
    ///
    /// At most one receive may be outstanding per socket. This is a
    /// programming error in the caller; the pending receive is untouched.
    #[error("a receive is already in progress on this socket")]
    OperationInProgress,

    /// The socket has not been bound; call `listen` first
    #[error("socket is not bound")]
    NotBound,

    /// Transport-level I/O failure
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors changing multicast group membership
#[derive(Debug, thiserror::Error)]
pub enum MulticastError {
    /// The address is not in the multicast range
    #[error("{0} is not a multicast group address")]
    InvalidGroupAddress(IpAddr),

    /// Membership requires a bound socket
    #[error("socket is not bound")]
    NotBound,

    /// `leave_group` for a group this socket never joined
    ///
    /// This is local validation, not a transport fault.
    #[error("socket is not a member of group {0}")]
    NotAMember(IpAddr),

    /// The platform rejected the membership change
    #[error("platform rejected multicast membership change: {0}")]
    PlatformRejected(#[source] std::io::Error),
}
