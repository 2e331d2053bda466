//! Wire buffer: a bounded datagram plus its addressing.
//!
//! A [`Packet`] owns the raw bytes of one ingress or egress datagram, the
//! source and destination socket addresses, and (when it came off a socket)
//! a shared handle to that socket so the reply can be sent without the
//! caller re-threading it. All ingress validation happens here, before any
//! attribute decoding is attempted.
use std::{
    fmt, io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket},
    sync::Arc,
};

use tracing::trace;

use crate::{
    error::{DecodeError, DecodeResult},
    flags::Flags,
    msgtype::MessageType,
};

/// Magic cookie distinguishing DHCP from plain BOOTP, network byte order.
pub const MAGIC: [u8; 4] = [99, 130, 83, 99];

/// Smallest datagram the codec accepts: fixed header, cookie, and a
/// message-type option.
pub const MIN_PACKET_SIZE: usize = 244;

/// Replies are padded up to this size; some clients silently drop anything
/// smaller.
pub const DEFAULT_PACKET_SIZE: usize = 576;

/// Largest datagram carried: an Ethernet MTU minus IP and UDP headers.
pub const MAX_PACKET_SIZE: usize = 1500 - 40;

/// default dhcpv4 server port
pub const SERVER_PORT: u16 = 67;
/// default dhcpv4 client port
pub const CLIENT_PORT: u16 = 68;

/// Offset of the first option, right after the magic cookie.
pub(crate) const OPTIONS_OFFSET: usize = 240;

/// A received or constructed DHCPv4 datagram.
pub struct Packet {
    socket: Option<Arc<UdpSocket>>,
    data: Vec<u8>,
    src: SocketAddrV4,
    dst: SocketAddrV4,
    xid: u32,
    msg_type: MessageType,
    key: [u8; 16],
}

impl Packet {
    /// Block on `socket` for one datagram and validate it as a DHCPv4
    /// request. The socket handle is retained so the eventual reply can be
    /// sent through it.
    pub fn recv(socket: &Arc<UdpSocket>) -> DecodeResult<Self> {
        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        let (len, src) = socket.recv_from(&mut buf)?;
        buf.truncate(len);

        let src = require_v4(src)?;
        let dst = require_v4(socket.local_addr()?)?;

        let mut packet = Self::from_bytes(&buf, src, dst)?;
        packet.socket = Some(Arc::clone(socket));
        trace!(src = %src, len, "received {}", hex::encode(packet.data()));
        Ok(packet)
    }

    /// Validate raw bytes as an ingress DHCPv4 request.
    ///
    /// Accepted datagrams are BOOTREQUESTs from 6-byte-Ethernet clients,
    /// carry the DHCP magic cookie, and hold a single-byte message-type
    /// option in `1..=7`. Note the range: a DHCPINFORM (8) is rejected
    /// here, matching the servers this codec interoperates with.
    pub fn from_bytes(bytes: &[u8], src: SocketAddrV4, dst: SocketAddrV4) -> DecodeResult<Self> {
        if bytes.len() < MIN_PACKET_SIZE {
            return Err(DecodeError::TooSmall {
                len: bytes.len(),
                min: MIN_PACKET_SIZE,
            });
        }
        if bytes[0] != 1 {
            return Err(DecodeError::NotBootRequest { op: bytes[0] });
        }
        if bytes[1] != 1 || bytes[2] != 6 {
            return Err(DecodeError::UnsupportedHardware {
                htype: bytes[1],
                hlen: bytes[2],
            });
        }
        if bytes[236..OPTIONS_OFFSET] != MAGIC {
            return Err(DecodeError::NotDhcp);
        }

        let mtype = match find_option(bytes, 53) {
            Some(&[t]) if (1..=7).contains(&t) => t,
            _ => return Err(DecodeError::UnknownMessageType),
        };

        // request identifier, host byte order
        let xid = u32::from_be_bytes(bytes[4..8].try_into()?);

        // dedup key: hardware address then message type. hlen was checked
        // against the chaddr slot above.
        let hlen = bytes[2] as usize;
        let mut key = [0u8; 16];
        key[..hlen].copy_from_slice(&bytes[28..28 + hlen]);
        key[hlen] = mtype;

        Ok(Self {
            socket: None,
            data: bytes.to_vec(),
            src,
            dst,
            xid,
            msg_type: mtype.into(),
            key,
        })
    }

    /// Write this datagram to its destination through the socket it was
    /// received on (or that its originating request was received on).
    pub fn send(&self) -> io::Result<usize> {
        let socket = self.socket.as_ref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "packet has no socket handle")
        })?;
        trace!(dst = %self.dst, len = self.data.len(), "sending {}", hex::encode(&self.data));
        socket.send_to(&self.data, SocketAddr::V4(self.dst))
    }

    pub(crate) fn from_parts(
        data: Vec<u8>,
        src: SocketAddrV4,
        dst: SocketAddrV4,
        xid: u32,
        msg_type: MessageType,
        key: [u8; 16],
        socket: Option<Arc<UdpSocket>>,
    ) -> Self {
        Self {
            socket,
            data,
            src,
            dst,
            xid,
            msg_type,
            key,
        }
    }

    pub(crate) fn socket(&self) -> Option<Arc<UdpSocket>> {
        self.socket.clone()
    }

    /// Raw datagram bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Source socket address.
    pub fn src(&self) -> SocketAddrV4 {
        self.src
    }

    /// Destination socket address.
    pub fn dst(&self) -> SocketAddrV4 {
        self.dst
    }

    /// Override the destination computed by the reply router.
    pub fn set_dst(&mut self, dst: SocketAddrV4) {
        self.dst = dst;
    }

    /// Transaction id, host byte order.
    pub fn xid(&self) -> u32 {
        self.xid
    }

    /// Validated message type from option 53.
    pub fn msg_type(&self) -> MessageType {
        self.msg_type
    }

    /// 16-byte request key: `chaddr[..hlen]` then the message type. Used
    /// upstream to deduplicate retransmissions.
    pub fn key(&self) -> &[u8; 16] {
        &self.key
    }

    /// Hardware address length field.
    pub fn hlen(&self) -> u8 {
        self.data[2]
    }

    /// Client hardware address, `hlen` bytes.
    pub fn chaddr(&self) -> &[u8] {
        let hlen = (self.hlen() as usize).min(16);
        &self.data[28..28 + hlen]
    }

    /// `flags` header field.
    pub fn flags(&self) -> Flags {
        Flags::new(u16::from_be_bytes([self.data[10], self.data[11]]))
    }

    /// Client IP address field.
    pub fn ciaddr(&self) -> Ipv4Addr {
        self.header_ip(12)
    }

    /// Offered ("your") IP address field.
    pub fn yiaddr(&self) -> Ipv4Addr {
        self.header_ip(16)
    }

    /// Next-server IP address field.
    pub fn siaddr(&self) -> Ipv4Addr {
        self.header_ip(20)
    }

    /// Gateway/relay IP address field.
    pub fn giaddr(&self) -> Ipv4Addr {
        self.header_ip(24)
    }

    fn header_ip(&self, offset: usize) -> Ipv4Addr {
        // can't panic-- every accepted datagram covers the fixed header
        let octets: [u8; 4] = self.data[offset..offset + 4].try_into().unwrap();
        octets.into()
    }

    /// Payload of the first option with `code`, scanning the TLV area.
    pub fn find_option(&self, code: u8) -> Option<&[u8]> {
        find_option(&self.data, code)
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("msg_type", &self.msg_type)
            .field("xid", &self.xid)
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("len", &self.data.len())
            .field("broadcast", &self.flags().broadcast())
            .field("chaddr", &hex::encode(self.chaddr()))
            .finish()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} id {} from {} to {}",
            self.msg_type, self.xid, self.src, self.dst
        )
    }
}

fn require_v4(addr: SocketAddr) -> DecodeResult<SocketAddrV4> {
    match addr {
        SocketAddr::V4(v4) => Ok(v4),
        SocketAddr::V6(_) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DHCPv4 requires an IPv4 socket",
        )
        .into()),
    }
}

/// Scan the option area of `data` for the first TLV with `code` and return
/// its payload. Stops at a pad byte, the end marker, or a truncated TLV.
pub(crate) fn find_option(data: &[u8], code: u8) -> Option<&[u8]> {
    let mut p = OPTIONS_OFFSET;
    while p < data.len() {
        let c = data[p];
        if c == 0 || c == 255 {
            break;
        }
        if p + 1 >= data.len() {
            break;
        }
        let len = data[p + 1] as usize;
        let start = p + 2;
        let end = start.checked_add(len)?;
        if end > data.len() {
            break;
        }
        if c == code {
            return Some(&data[start..end]);
        }
        p = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn minimal_discover_is_accepted() -> anyhow::Result<()> {
        let bytes = testutil::request_bytes(&[53, 1, 1, 255]);
        assert_eq!(bytes.len(), MIN_PACKET_SIZE);
        let packet = testutil::packet(&bytes)?;
        assert_eq!(packet.msg_type(), MessageType::Discover);
        assert_eq!(packet.xid(), 0xdead_c0de);
        Ok(())
    }

    #[test]
    fn rejects_short_packet() {
        let bytes = testutil::request_bytes(&[53, 1, 1, 255]);
        let err = testutil::packet(&bytes[..200]).unwrap_err();
        assert!(matches!(err, DecodeError::TooSmall { len: 200, .. }));
    }

    #[test]
    fn rejects_server_message() {
        let mut bytes = testutil::request_bytes(&[53, 1, 2, 255]);
        bytes[0] = 2;
        let err = testutil::packet(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::NotBootRequest { op: 2 }));
    }

    #[test]
    fn rejects_non_ethernet() {
        let mut bytes = testutil::request_bytes(&[53, 1, 1, 255]);
        bytes[1] = 6; // token ring et al
        assert!(matches!(
            testutil::packet(&bytes).unwrap_err(),
            DecodeError::UnsupportedHardware { htype: 6, hlen: 6 }
        ));

        let mut bytes = testutil::request_bytes(&[53, 1, 1, 255]);
        bytes[2] = 8;
        assert!(matches!(
            testutil::packet(&bytes).unwrap_err(),
            DecodeError::UnsupportedHardware { htype: 1, hlen: 8 }
        ));
    }

    #[test]
    fn rejects_plain_bootp() {
        let mut bytes = testutil::request_bytes(&[53, 1, 1, 255]);
        bytes[236] = 0;
        assert!(matches!(
            testutil::packet(&bytes).unwrap_err(),
            DecodeError::NotDhcp
        ));
    }

    #[test]
    fn rejects_bad_message_type() {
        // missing option 53 entirely
        let bytes = testutil::request_bytes(&[12, 4, b'h', b'o', b's', b't', 255]);
        assert!(matches!(
            testutil::packet(&bytes).unwrap_err(),
            DecodeError::UnknownMessageType
        ));

        // wrong length
        let bytes = testutil::request_bytes(&[53, 2, 1, 1, 255]);
        assert!(matches!(
            testutil::packet(&bytes).unwrap_err(),
            DecodeError::UnknownMessageType
        ));

        // zero and inform are both out of range on ingress
        for t in [0u8, 8, 9] {
            let bytes = testutil::request_bytes(&[53, 1, t, 255]);
            assert!(matches!(
                testutil::packet(&bytes).unwrap_err(),
                DecodeError::UnknownMessageType
            ));
        }
    }

    #[test]
    fn message_type_found_past_other_options() -> anyhow::Result<()> {
        let bytes = testutil::request_bytes(&[12, 2, b'p', b'c', 53, 1, 3, 255]);
        let packet = testutil::packet(&bytes)?;
        assert_eq!(packet.msg_type(), MessageType::Request);
        Ok(())
    }

    #[test]
    fn dedup_key_holds_chaddr_and_type() -> anyhow::Result<()> {
        let bytes = testutil::request_bytes(&[53, 1, 3, 255]);
        let packet = testutil::packet(&bytes)?;
        let mut expected = [0u8; 16];
        expected[..6].copy_from_slice(testutil::CHADDR);
        expected[6] = 3;
        assert_eq!(packet.key(), &expected);
        Ok(())
    }

    #[test]
    fn find_option_stops_at_end_marker() {
        let bytes = testutil::request_bytes(&[53, 1, 1, 255, 12, 2, b'p', b'c']);
        let packet = testutil::packet(&bytes).unwrap();
        assert_eq!(packet.find_option(53), Some(&[1u8][..]));
        // option 12 sits past the end marker and must not be found
        assert_eq!(packet.find_option(12), None);
    }

    #[test]
    fn header_field_accessors() -> anyhow::Result<()> {
        let mut bytes = testutil::request_bytes(&[53, 1, 3, 255]);
        bytes[10] = 0x80; // broadcast
        bytes[12..16].copy_from_slice(&[192, 0, 2, 5]);
        bytes[24..28].copy_from_slice(&[10, 0, 0, 1]);
        let packet = testutil::packet(&bytes)?;
        assert!(packet.flags().broadcast());
        assert_eq!(packet.ciaddr(), Ipv4Addr::new(192, 0, 2, 5));
        assert_eq!(packet.giaddr(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(packet.yiaddr(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(packet.chaddr(), testutil::CHADDR);
        Ok(())
    }
}
