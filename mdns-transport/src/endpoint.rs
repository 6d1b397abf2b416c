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

//! Endpoint address type

use crate::error::AddressError;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

/// An IP address plus port number
///
/// Used both as a socket's local binding and as a send destination. Equality
/// is byte-wise on the address and port. The canonical string form is
/// `a.b.c.d:port` for IPv4 and `[addr]:port` for IPv6, and round-trips
/// losslessly through [`FromStr`]/[`fmt::Display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    addr: IpAddr,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint from an address and port.
    pub fn new(addr: IpAddr, port: u16) -> Self {
        Self { addr, port }
    }

    /// Create an endpoint from a raw address in network byte order.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidLength`] unless `bytes` is 4 bytes
    /// (IPv4) or 16 bytes (IPv6) long.
    pub fn from_bytes(bytes: &[u8], port: u16) -> Result<Self, AddressError> {
        let addr = match bytes.len() {
            4 => {
                let mut octets = [0u8; 4];
                octets.copy_from_slice(bytes);
                IpAddr::V4(Ipv4Addr::from(octets))
            }
            16 => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(bytes);
                IpAddr::V6(Ipv6Addr::from(octets))
            }
            len => return Err(AddressError::InvalidLength(len)),
        };
        Ok(Self { addr, port })
    }

    /// The IP address component.
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// The port component.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The raw address bytes in network byte order (4 or 16 bytes).
    pub fn address_bytes(&self) -> Vec<u8> {
        match self.addr {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        }
    }

    /// Whether the address is a multicast group address.
    ///
    /// Joining a group requires a multicast address (224.0.0.0/4 for IPv4,
    /// ff00::/8 for IPv6). The transport validates this on `join_group`;
    /// send destinations are not restricted.
    pub fn is_multicast(&self) -> bool {
        self.addr.is_multicast()
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(sa: SocketAddr) -> Self {
        Self {
            addr: sa.ip(),
            port: sa.port(),
        }
    }
}

impl From<Endpoint> for SocketAddr {
    fn from(ep: Endpoint) -> Self {
        SocketAddr::new(ep.addr, ep.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SocketAddr::new(self.addr, self.port).fmt(f)
    }
}

impl FromStr for Endpoint {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sa = SocketAddr::from_str(s).map_err(|_| AddressError::Parse(s.to_string()))?;
        Ok(sa.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v4_string_round_trip() {
        let ep = Endpoint::from_bytes(&[192, 168, 1, 10], 5353).unwrap();
        assert_eq!(ep.to_string(), "192.168.1.10:5353");
        assert_eq!(ep.to_string().parse::<Endpoint>().unwrap(), ep);
    }

    #[test]
    fn test_v6_string_round_trip() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0xff;
        bytes[1] = 0x02;
        bytes[15] = 0xfb;
        let ep = Endpoint::from_bytes(&bytes, 5353).unwrap();
        assert_eq!(ep.to_string(), "[ff02::fb]:5353");
        assert_eq!(ep.to_string().parse::<Endpoint>().unwrap(), ep);
    }

    #[test]
    fn test_address_bytes_round_trip() {
        let ep = Endpoint::from_bytes(&[224, 0, 0, 251], 5353).unwrap();
        assert_eq!(
            Endpoint::from_bytes(&ep.address_bytes(), ep.port()).unwrap(),
            ep
        );
    }

    #[test]
    fn test_invalid_byte_length() {
        assert!(matches!(
            Endpoint::from_bytes(&[1, 2, 3, 4, 5], 80),
            Err(AddressError::InvalidLength(5))
        ));
        assert!(matches!(
            Endpoint::from_bytes(&[], 80),
            Err(AddressError::InvalidLength(0))
        ));
    }

    #[test]
    fn test_parse_failure() {
        assert!(matches!(
            "not-an-endpoint".parse::<Endpoint>(),
            Err(AddressError::Parse(_))
        ));
        // Missing port is not a valid endpoint.
        assert!("192.168.1.1".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_multicast_detection() {
        let mdns_v4: Endpoint = "224.0.0.251:5353".parse().unwrap();
        assert!(mdns_v4.is_multicast());

        let unicast: Endpoint = "192.168.1.1:5353".parse().unwrap();
        assert!(!unicast.is_multicast());

        let mdns_v6: Endpoint = "[ff02::fb]:5353".parse().unwrap();
        assert!(mdns_v6.is_multicast());
    }

    #[test]
    fn test_socket_addr_conversion() {
        let ep: Endpoint = "10.0.0.1:4433".parse().unwrap();
        let sa: SocketAddr = ep.into();
        assert_eq!(sa.port(), 4433);
        assert_eq!(Endpoint::from(sa), ep);
    }
}
