//! Socket addresses shared by listeners and cluster hosts.

use serde::Serialize;

/// An address wrapping a socket address, proto-JSON shaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// The socket address.
    pub socket_address: SocketAddress,
}

impl Address {
    /// Create an address from host and port.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            socket_address: SocketAddress {
                address: address.into(),
                port_value: port,
            },
        }
    }
}

/// Host and port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketAddress {
    /// Hostname or IP.
    pub address: String,
    /// Port number.
    pub port_value: u16,
}
