//! Top-level decode/encode: ties the header codec, option codec and reply
//! router together behind the two calls a server loop needs.
use std::{
    net::{Ipv4Addr, SocketAddrV4},
    time::SystemTime,
};

use crate::{
    attr::AttrList,
    dictionary::Dictionary,
    encoder::Encoder,
    error::{DecodeResult, EncodeError, EncodeResult},
    header,
    msgtype::MessageType,
    options,
    packet::{CLIENT_PORT, DEFAULT_PACKET_SIZE, MAX_PACKET_SIZE, Packet, SERVER_PORT},
    route,
};

/// Decode a validated ingress datagram into its attribute list: fourteen
/// header pseudo-attributes, one attribute per recognized option value,
/// then the vendor quirks and size-negotiation clamps.
///
/// The packet is borrowed mutably: the MSFT 98 broadcast fix-up writes the
/// broadcast bit back into the raw datagram so a later reply copies it.
pub fn decode(packet: &mut Packet, dict: &Dictionary) -> DecodeResult<AttrList> {
    let mut attrs = AttrList::new();
    header::decode(packet.data(), &mut attrs)?;
    options::decode(packet.data(), dict, &mut attrs)?;
    options::apply_vendor_quirks(packet, &mut attrs);
    options::clamp_negotiation(&mut attrs)?;
    Ok(attrs)
}

/// Serialize an attribute list into a datagram.
///
/// Replies (`Offer`/`Ack`/`Nak`) require the originating request: its
/// header fields are echoed, its socket inherited, and the destination
/// computed by the reply router. Client messages may be encoded without
/// one and are addressed to the local broadcast on the server port.
///
/// The client may grow the reply past the 576-byte default with option 57,
/// never beyond what the wire carries; writes past that cap fail with
/// [`EncodeError::BufferFull`].
pub fn encode(
    mut attrs: AttrList,
    msg_type: MessageType,
    original: Option<&Packet>,
) -> EncodeResult<Packet> {
    if msg_type.is_reply() && original.is_none() {
        return Err(EncodeError::MissingOriginal);
    }

    let mms = original
        .and_then(|req| req.find_option(57))
        .and_then(|p| <[u8; 2]>::try_from(p).ok())
        .map(u16::from_be_bytes)
        .map(|m| (m as usize).clamp(DEFAULT_PACKET_SIZE, MAX_PACKET_SIZE))
        .unwrap_or(DEFAULT_PACKET_SIZE);

    let mut buf = Vec::with_capacity(DEFAULT_PACKET_SIZE);
    let mut e = Encoder::with_limit(&mut buf, mms);
    header::encode(&attrs, original, &mut e)?;
    options::encode(&mut attrs, msg_type, SystemTime::now(), &mut e)?;
    if e.len_filled() < DEFAULT_PACKET_SIZE {
        let fill = DEFAULT_PACKET_SIZE - e.len_filled();
        e.pad(fill)?;
    }

    match original {
        Some(req) => {
            let dst_ip = route::reply_destination(req, msg_type, Ipv4Addr::UNSPECIFIED);
            Ok(Packet::from_parts(
                buf,
                req.dst(),
                SocketAddrV4::new(dst_ip, req.src().port()),
                req.xid(),
                msg_type,
                *req.key(),
                req.socket(),
            ))
        }
        None => {
            // can't panic-- the header writer always emits the fixed header
            let xid = u32::from_be_bytes(buf[4..8].try_into().unwrap());
            let hlen = (buf[2] as usize).min(15);
            let mut key = [0u8; 16];
            key[..hlen].copy_from_slice(&buf[28..28 + hlen]);
            key[hlen] = msg_type.into();
            Ok(Packet::from_parts(
                buf,
                SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, CLIENT_PORT),
                SocketAddrV4::new(Ipv4Addr::BROADCAST, SERVER_PORT),
                xid,
                msg_type,
                key,
                None,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        attr::{AttrCode, AttrValue, Attribute, HeaderField},
        packet::MAGIC,
        testutil,
    };

    fn offer_attrs() -> AttrList {
        let mut attrs = AttrList::new();
        attrs.push(Attribute::new(
            AttrCode::Header(HeaderField::YourIpAddr),
            AttrValue::IpAddr([192, 0, 2, 99].into()),
        ));
        attrs.push(Attribute::new(
            AttrCode::Option(54),
            AttrValue::IpAddr([192, 0, 2, 254].into()),
        ));
        attrs.push(Attribute::new(
            AttrCode::Option(51),
            AttrValue::Date(3600),
        ));
        attrs
    }

    #[test]
    fn encoded_reply_invariants() -> anyhow::Result<()> {
        let bytes = testutil::request_bytes(&[53, 1, 1, 255]);
        let req = testutil::packet(&bytes)?;
        let reply = encode(offer_attrs(), MessageType::Offer, Some(&req))?;

        let data = reply.data();
        assert_eq!(data[0], 2);
        assert_eq!(&data[236..240], &MAGIC);
        assert_eq!(&data[240..242], &[53, 1]);
        assert_eq!(data[242], u8::from(MessageType::Offer));
        assert!(data.len() >= DEFAULT_PACKET_SIZE);

        // options terminate with the end marker, then only padding
        let end = data
            .windows(2)
            .position(|w| w == [255, 0])
            .expect("end marker");
        assert!(data[end + 2..].iter().all(|&b| b == 0));
        Ok(())
    }

    #[test]
    fn short_reply_is_padded_to_the_floor() -> anyhow::Result<()> {
        let bytes = testutil::request_bytes(&[53, 1, 1, 255]);
        let req = testutil::packet(&bytes)?;
        let reply = encode(offer_attrs(), MessageType::Offer, Some(&req))?;
        assert_eq!(reply.data().len(), DEFAULT_PACKET_SIZE);
        Ok(())
    }

    #[test]
    fn nak_routes_to_broadcast() -> anyhow::Result<()> {
        let mut bytes = testutil::request_bytes(&[53, 1, 3, 255]);
        bytes[12..16].copy_from_slice(&[192, 0, 2, 5]);
        let req = testutil::packet(&bytes)?;
        let reply = encode(AttrList::new(), MessageType::Nak, Some(&req))?;
        assert_eq!(*reply.dst().ip(), Ipv4Addr::BROADCAST);
        // ports swap and the source address is the receiving socket's
        assert_eq!(reply.dst().port(), testutil::client_addr().port());
        assert_eq!(reply.src(), testutil::server_addr());
        Ok(())
    }

    #[test]
    fn relayed_reply_routes_to_the_relay() -> anyhow::Result<()> {
        let mut bytes = testutil::request_bytes(&[53, 1, 1, 255]);
        bytes[24..28].copy_from_slice(&[10, 0, 0, 1]);
        let req = testutil::packet(&bytes)?;
        let reply = encode(offer_attrs(), MessageType::Offer, Some(&req))?;
        assert_eq!(*reply.dst().ip(), Ipv4Addr::new(10, 0, 0, 1));
        Ok(())
    }

    #[test]
    fn msft98_request_gets_a_broadcast_reply() -> anyhow::Result<()> {
        let opts = [
            53, 1, 3, //
            60, 7, b'M', b'S', b'F', b'T', b' ', b'9', b'8', //
            255,
        ];
        let mut req = testutil::packet(&testutil::request_bytes(&opts))?;
        let attrs = decode(&mut req, &Dictionary::standard())?;
        assert_eq!(
            attrs
                .first(AttrCode::Header(HeaderField::Flags))
                .unwrap()
                .value,
            AttrValue::Short(0x8000)
        );
        assert_eq!(req.data()[10] & 0x80, 0x80);

        // the reply copies the patched flags and goes to broadcast
        let reply = encode(offer_attrs(), MessageType::Ack, Some(&req))?;
        assert_eq!(reply.data()[10] & 0x80, 0x80);
        assert_eq!(*reply.dst().ip(), Ipv4Addr::BROADCAST);
        Ok(())
    }

    #[test]
    fn reply_to_reply_round_trips_options() -> anyhow::Result<()> {
        let opts = [
            53, 1, 3, //
            12, 2, b'p', b'c', // hostname
            6, 8, 8, 8, 8, 8, 1, 1, 1, 1, // dns servers
            61, 7, 1, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, // client id
            82, 4, 1, 2, 0x10, 0x20, // relay circuit id
            255,
        ];
        let mut req = testutil::packet(&testutil::request_bytes(&opts))?;
        let dict = Dictionary::standard();
        let attrs = decode(&mut req, &dict)?;

        // echo the decoded options back into a reply, then re-decode the
        // wire image and check every option survived intact
        let reply = encode(attrs.clone(), MessageType::Ack, Some(&req))?;
        let mut again = AttrList::new();
        crate::header::decode(reply.data(), &mut again)?;
        crate::options::decode(reply.data(), &dict, &mut again)?;

        for attr in attrs.iter() {
            match attr.code {
                // header pseudo-attributes are rewritten by the reply
                // rules, and the message type is re-inserted
                AttrCode::Header(_) | AttrCode::Option(53) => continue,
                _ => assert!(
                    again.iter().any(|a| a == attr),
                    "{attr} lost in the round trip"
                ),
            }
        }
        // and the reply's message type reflects the response code
        assert_eq!(
            again.first(AttrCode::Option(53)).unwrap().value,
            AttrValue::Byte(5)
        );
        Ok(())
    }

    #[test]
    fn reply_needs_the_original() {
        assert!(matches!(
            encode(AttrList::new(), MessageType::Offer, None),
            Err(EncodeError::MissingOriginal)
        ));
    }

    #[test]
    fn request_encodes_without_an_original() -> anyhow::Result<()> {
        let mut attrs = AttrList::new();
        attrs.push(Attribute::new(
            AttrCode::Header(HeaderField::ClientHwAddr),
            AttrValue::Ethernet([1, 2, 3, 4, 5, 6]),
        ));
        attrs.push(Attribute::new(
            AttrCode::Option(55),
            AttrValue::Byte(1),
        ));
        let discover = encode(attrs, MessageType::Discover, None)?;
        assert_eq!(*discover.dst().ip(), Ipv4Addr::BROADCAST);
        assert_eq!(discover.dst().port(), SERVER_PORT);

        // the produced datagram passes ingress validation
        let parsed = testutil::packet(discover.data())?;
        assert_eq!(parsed.msg_type(), MessageType::Discover);
        assert_eq!(parsed.chaddr(), &[1, 2, 3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn reply_respects_the_negotiated_size_cap() -> anyhow::Result<()> {
        // no option 57: the reply may not exceed 576 bytes
        let req = testutil::packet(&testutil::request_bytes(&[53, 1, 3, 255]))?;
        let mut attrs = AttrList::new();
        attrs.push(Attribute::new(
            AttrCode::Option(43),
            AttrValue::Octets(vec![0x5a; 200]),
        ));
        attrs.push(Attribute::new(
            AttrCode::Option(60),
            AttrValue::String("x".repeat(200)),
        ));
        assert!(matches!(
            encode(attrs.clone(), MessageType::Ack, Some(&req)),
            Err(EncodeError::BufferFull { limit: 576 })
        ));

        // the same reply fits once the client raises its message size
        let big = testutil::packet(&testutil::request_bytes(&[
            53, 1, 3, 57, 2, 0x04, 0x00, 255,
        ]))?;
        let reply = encode(attrs, MessageType::Ack, Some(&big))?;
        assert!(reply.data().len() > DEFAULT_PACKET_SIZE);
        Ok(())
    }
}
