//! Error types for Encoding/Decoding
use std::io;

use thiserror::Error;

/// Convenience type for decode errors
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Returned from types that decode
#[derive(Error, Debug)]
pub enum DecodeError {
    /// ran out of bytes
    #[error("parser ran out of data-- not enough bytes")]
    NotEnoughBytes,

    /// datagram shorter than the fixed header + message type option
    #[error("packet too small ({len} < {min})")]
    TooSmall {
        /// received length
        len: usize,
        /// minimum accepted length
        min: usize,
    },

    /// op is not BOOTREQUEST; server-to-server ingress is unsupported
    #[error("packet op {op} is not a boot request")]
    NotBootRequest {
        /// op byte received
        op: u8,
    },

    /// hardware type/length other than 6-byte Ethernet
    #[error("unsupported hardware htype {htype} hlen {hlen}, expected ethernet (1/6)")]
    UnsupportedHardware {
        /// htype byte received
        htype: u8,
        /// hlen byte received
        hlen: u8,
    },

    /// magic cookie mismatch; plain BOOTP is rejected
    #[error("no DHCP magic cookie, cannot do BOOTP")]
    NotDhcp,

    /// message type option missing, malformed, or out of range
    #[error("unknown or badly formed DHCP message type")]
    UnknownMessageType,

    /// client interface MTU below the minimum reply size
    #[error("client interface MTU {mtu} is smaller than the minimum permitted {min}")]
    MtuTooSmall {
        /// MTU announced by the client
        mtu: u16,
        /// minimum permitted by the specification
        min: u16,
    },

    /// error converting from slice
    #[error("error converting from slice {0}")]
    SliceError(#[from] core::array::TryFromSliceError),

    /// socket-level failure
    #[error("io error {0}")]
    Io(#[from] io::Error),
}

/// Returned from types that encode
#[derive(Error, Debug)]
pub enum EncodeError {
    /// addition overflow
    #[error("encoder checked_add failed")]
    AddOverflow,

    /// write past the buffer limit
    #[error("write would exceed the packet buffer limit of {limit}")]
    BufferFull {
        /// buffer limit in bytes
        limit: usize,
    },

    /// value exceeds what its wire representation can carry
    #[error("value of {len} bytes exceeds the max size of {max}")]
    ValueTooLong {
        /// size of value
        len: usize,
        /// maximum the field can hold
        max: usize,
    },

    /// reply encoding requires the originating request
    #[error("cannot encode a reply without the original request")]
    MissingOriginal,

    /// socket-level failure
    #[error("io error {0}")]
    Io(#[from] io::Error),
}

/// Convenience type for encode errors
pub type EncodeResult<T> = Result<T, EncodeError>;
