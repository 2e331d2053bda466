//! Fixed-header codec: the 236-byte BOOTP header as fourteen attributes.
use std::net::Ipv4Addr;

use crate::{
    attr::{AttrCode, AttrList, AttrValue, Attribute, HeaderField},
    decoder::Decoder,
    encoder::Encoder,
    error::{DecodeResult, EncodeResult},
    packet::{MAGIC, Packet},
};

/// Decode every header field of `data` into `attrs`, one attribute per
/// field. The hardware address is re-typed to `Ethernet` when `hlen` is 6;
/// empty server-name and boot-file strings are suppressed.
pub(crate) fn decode(data: &[u8], attrs: &mut AttrList) -> DecodeResult<()> {
    let hlen = (data[2] as usize).min(16);

    for field in HeaderField::ALL {
        let slot = &data[field.offset()..field.offset() + field.size()];
        let mut d = Decoder::new(slot);

        let value = match field {
            HeaderField::ClientHwAddr => {
                if hlen == 6 {
                    AttrValue::Ethernet(d.read::<6>()?)
                } else {
                    AttrValue::Octets(d.read_slice(hlen)?.to_vec())
                }
            }
            HeaderField::ServerHostName => match d.read_nul_string::<64>()? {
                Some(s) => AttrValue::String(s),
                None => continue,
            },
            HeaderField::BootFilename => match d.read_nul_string::<128>()? {
                Some(s) => AttrValue::String(s),
                None => continue,
            },
            _ => AttrValue::decode(field.ty(), &mut d, field.size())?,
        };

        attrs.push(Attribute::new(AttrCode::Header(field), value));
    }
    Ok(())
}

/// Write the fixed header and magic cookie.
///
/// With an originating request this produces a server reply: `op` 2, the
/// request's xid/flags/ciaddr/chaddr copied byte for byte, hops, secs,
/// siaddr and giaddr zeroed, and `yiaddr` taken from the Your-IP-Address
/// attribute. Without one it produces a client message from the header
/// attributes alone, synthesizing a random transaction id if none is given.
/// The legacy sname/file area is zero-filled either way.
pub(crate) fn encode(
    attrs: &AttrList,
    original: Option<&Packet>,
    e: &mut Encoder<'_>,
) -> EncodeResult<()> {
    let field = |f: HeaderField| attrs.first(AttrCode::Header(f)).map(|a| &a.value);
    let ip = |f: HeaderField| {
        field(f)
            .and_then(AttrValue::as_ipv4)
            .unwrap_or(Ipv4Addr::UNSPECIFIED)
    };

    match original {
        Some(req) => {
            e.write_u8(2)?; // BOOTREPLY
            e.write_u8(1)?; // ethernet
            e.write_u8(req.hlen())?;
            e.write_u8(0)?; // hops
            e.write_slice(&req.data()[4..8])?; // xid
            e.write_u16(0)?; // secs
            e.write_slice(&req.data()[10..16])?; // flags and ciaddr
            e.write(ip(HeaderField::YourIpAddr).octets())?;
            e.write_u32(0)?; // siaddr
            e.write_u32(0)?; // giaddr
            e.write_slice(&req.data()[28..44])?; // chaddr
        }
        None => {
            let chaddr: Vec<u8> = match field(HeaderField::ClientHwAddr) {
                Some(AttrValue::Ethernet(mac)) => mac.to_vec(),
                Some(AttrValue::Octets(v)) => v.clone(),
                _ => Vec::new(),
            };
            let xid = match field(HeaderField::TransactionId) {
                Some(AttrValue::Integer(xid)) => *xid,
                _ => rand::random(),
            };

            e.write_u8(byte(field(HeaderField::Opcode)).unwrap_or(1))?;
            e.write_u8(byte(field(HeaderField::HardwareType)).unwrap_or(1))?;
            e.write_u8(byte(field(HeaderField::HardwareAddrLen)).unwrap_or(chaddr.len() as u8))?;
            e.write_u8(byte(field(HeaderField::HopCount)).unwrap_or(0))?;
            e.write_u32(xid)?;
            e.write_u16(short(field(HeaderField::Seconds)).unwrap_or(0))?;
            e.write_u16(short(field(HeaderField::Flags)).unwrap_or(0))?;
            e.write(ip(HeaderField::ClientIpAddr).octets())?;
            e.write(ip(HeaderField::YourIpAddr).octets())?;
            e.write(ip(HeaderField::ServerIpAddr).octets())?;
            e.write(ip(HeaderField::GatewayIpAddr).octets())?;
            e.write_fill_bytes(&chaddr[..chaddr.len().min(16)], 16)?;
        }
    }

    // legacy BOOTP sname/file area is never echoed in replies
    e.pad(192)?;
    e.write(MAGIC)?;
    Ok(())
}

fn byte(v: Option<&AttrValue>) -> Option<u8> {
    match v {
        Some(AttrValue::Byte(n)) => Some(*n),
        _ => None,
    }
}

fn short(v: Option<&AttrValue>) -> Option<u16> {
    match v {
        Some(AttrValue::Short(n)) => Some(*n),
        _ => None,
    }
}
