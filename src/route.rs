//! Reply routing per RFC 2131 §4.1.
//!
//! A reply is never sent to the source address of the request: the request
//! may have crossed several relays and must travel back through the relay
//! closest to the client.
use std::net::Ipv4Addr;

use crate::{msgtype::MessageType, packet::Packet};

/// Destination of a reply to `original`, first match wins:
///
/// 1. a relayed request goes back to the relay (`giaddr`),
/// 2. a NAK is broadcast, the client may not have an address to hear it on,
/// 3. a bound client (`ciaddr`) is unicast,
/// 4. a client that asked for broadcast gets broadcast,
/// 5. an unset `preset` destination falls back to broadcast,
/// 6. otherwise unicast to the address being offered (`yiaddr`).
///
/// `preset` is the destination the caller may have put on the egress packet
/// before encoding; leaving it unspecified selects between broadcast and
/// `yiaddr` in steps 5 and 6.
pub fn reply_destination(original: &Packet, msg_type: MessageType, preset: Ipv4Addr) -> Ipv4Addr {
    if original.giaddr() != Ipv4Addr::UNSPECIFIED {
        original.giaddr()
    } else if msg_type == MessageType::Nak {
        Ipv4Addr::BROADCAST
    } else if original.ciaddr() != Ipv4Addr::UNSPECIFIED {
        original.ciaddr()
    } else if original.flags().broadcast() {
        Ipv4Addr::BROADCAST
    } else if preset == Ipv4Addr::UNSPECIFIED {
        Ipv4Addr::BROADCAST
    } else {
        original.yiaddr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn request(edit: impl FnOnce(&mut Vec<u8>)) -> Packet {
        let mut bytes = testutil::request_bytes(&[53, 1, 3, 255]);
        edit(&mut bytes);
        testutil::packet(&bytes).unwrap()
    }

    #[test]
    fn relayed_request_returns_to_relay() {
        let req = request(|b| {
            b[24..28].copy_from_slice(&[10, 0, 0, 1]);
            b[12..16].copy_from_slice(&[192, 0, 2, 5]); // giaddr still wins
        });
        assert_eq!(
            reply_destination(&req, MessageType::Offer, Ipv4Addr::UNSPECIFIED),
            Ipv4Addr::new(10, 0, 0, 1)
        );
    }

    #[test]
    fn nak_is_broadcast() {
        let req = request(|b| b[12..16].copy_from_slice(&[192, 0, 2, 5]));
        assert_eq!(
            reply_destination(&req, MessageType::Nak, Ipv4Addr::UNSPECIFIED),
            Ipv4Addr::BROADCAST
        );
    }

    #[test]
    fn bound_client_is_unicast() {
        let req = request(|b| b[12..16].copy_from_slice(&[192, 0, 2, 5]));
        assert_eq!(
            reply_destination(&req, MessageType::Ack, Ipv4Addr::UNSPECIFIED),
            Ipv4Addr::new(192, 0, 2, 5)
        );
    }

    #[test]
    fn broadcast_flag_is_honored() {
        let req = request(|b| b[10] = 0x80);
        assert_eq!(
            reply_destination(&req, MessageType::Offer, Ipv4Addr::UNSPECIFIED),
            Ipv4Addr::BROADCAST
        );
    }

    #[test]
    fn unset_destination_broadcasts() {
        let req = request(|_| {});
        assert_eq!(
            reply_destination(&req, MessageType::Offer, Ipv4Addr::UNSPECIFIED),
            Ipv4Addr::BROADCAST
        );
    }

    #[test]
    fn preset_destination_selects_yiaddr() {
        let req = request(|b| b[16..20].copy_from_slice(&[192, 0, 2, 99]));
        assert_eq!(
            reply_destination(&req, MessageType::Offer, Ipv4Addr::new(192, 0, 2, 50)),
            Ipv4Addr::new(192, 0, 2, 99)
        );
    }
}
