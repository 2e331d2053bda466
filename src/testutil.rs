//! Shared fixtures for the unit tests.
use std::net::SocketAddrV4;

use crate::{
    error::DecodeResult,
    packet::{MAGIC, MIN_PACKET_SIZE, Packet},
};

/// Hardware address used by every fixture request.
pub(crate) const CHADDR: &[u8] = &[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];

/// Address the fixture requests are "received from".
pub(crate) fn client_addr() -> SocketAddrV4 {
    "192.0.2.1:68".parse().unwrap()
}

/// Address of the receiving socket.
pub(crate) fn server_addr() -> SocketAddrV4 {
    "192.0.2.254:67".parse().unwrap()
}

/// A valid BOOTREQUEST frame with the given option bytes appended at
/// offset 240, padded out to the minimum packet size.
pub(crate) fn request_bytes(opts: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; 240];
    buf[0] = 1; // BOOTREQUEST
    buf[1] = 1; // ethernet
    buf[2] = 6;
    buf[4..8].copy_from_slice(&0xdead_c0de_u32.to_be_bytes());
    buf[28..34].copy_from_slice(CHADDR);
    buf[236..240].copy_from_slice(&MAGIC);
    buf.extend_from_slice(opts);
    if buf.len() < MIN_PACKET_SIZE {
        buf.resize(MIN_PACKET_SIZE, 0);
    }
    buf
}

/// Validate fixture bytes into a `Packet`.
pub(crate) fn packet(bytes: &[u8]) -> DecodeResult<Packet> {
    Packet::from_bytes(bytes, client_addr(), server_addr())
}
