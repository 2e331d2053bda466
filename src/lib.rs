//! # dhcpwire
//!
//! A DHCPv4 wire codec for dictionary-driven servers. The codec turns a raw
//! BOOTP/DHCPv4 datagram into an ordered list of typed attributes — the
//! fixed header fields and every recognized option — hands that list to
//! host policy, serializes the edited list back into a reply datagram, and
//! computes where the reply must be sent under the RFC 2131 forwarding
//! rules (relay, broadcast, or unicast).
//!
//! What an option *is* comes from a [`Dictionary`]: a read-only map from
//! wire code to `{name, type, array}`. Options the dictionary does not know
//! are skipped; payloads that disagree with their declared type degrade to
//! raw octets. Neither condition aborts a decode.
//!
//! ## Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dhcpwire::{AttrCode, AttrValue, Attribute, Dictionary, HeaderField, MessageType};
//!
//! // a minimal DHCPDISCOVER: fixed header, magic cookie, message type
//! let mut bytes = vec![0u8; 240];
//! bytes[0] = 1; // BOOTREQUEST
//! bytes[1] = 1; // ethernet
//! bytes[2] = 6;
//! bytes[28..34].copy_from_slice(&[0xde, 0xad, 0xc0, 0xde, 0xca, 0xfe]);
//! bytes[236..240].copy_from_slice(&dhcpwire::MAGIC);
//! bytes.extend_from_slice(&[53, 1, 1, 255]);
//!
//! let mut request = dhcpwire::Packet::from_bytes(
//!     &bytes,
//!     "192.0.2.1:68".parse()?,
//!     "192.0.2.254:67".parse()?,
//! )?;
//!
//! let dict = Dictionary::standard();
//! let attrs = dhcpwire::decode(&mut request, &dict)?;
//! assert_eq!(request.msg_type(), MessageType::Discover);
//!
//! // host policy builds the reply list
//! let mut reply = dhcpwire::AttrList::new();
//! reply.push(Attribute::new(
//!     AttrCode::Header(HeaderField::YourIpAddr),
//!     AttrValue::IpAddr([192, 0, 2, 99].into()),
//! ));
//! reply.push(Attribute::new(
//!     AttrCode::Option(51),
//!     AttrValue::Date(3600),
//! ));
//! let _ = attrs;
//!
//! let offer = dhcpwire::encode(reply, MessageType::Offer, Some(&request))?;
//! assert_eq!(offer.data()[0], 2); // BOOTREPLY
//! # Ok(()) }
//! ```
#![warn(
    missing_debug_implementations,
    // missing_docs,
    missing_copy_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::cognitive_complexity)]

pub mod attr;
mod codec;
pub mod decoder;
pub mod dictionary;
pub mod encoder;
pub mod error;
pub mod flags;
mod header;
pub mod msgtype;
mod options;
pub mod packet;
pub mod route;
#[cfg(test)]
pub(crate) mod testutil;

pub use crate::{
    attr::{AttrCode, AttrList, AttrType, AttrValue, Attribute, HeaderField},
    codec::{decode, encode},
    decoder::{Decodable, Decoder},
    dictionary::{AttrDescriptor, Dictionary},
    encoder::{Encodable, Encoder},
    error::{DecodeError, DecodeResult, EncodeError, EncodeResult},
    flags::Flags,
    msgtype::MessageType,
    options::MAX_OPTION_LEN,
    packet::{
        CLIENT_PORT, DEFAULT_PACKET_SIZE, MAGIC, MAX_PACKET_SIZE, MIN_PACKET_SIZE, Packet,
        SERVER_PORT,
    },
    route::reply_destination,
};
