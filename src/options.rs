//! Option codec: the variadic TLV area after the fixed header.
//!
//! Decoding walks the TLV section and resolves each code against the
//! dictionary; unknown and malformed options degrade locally (skip or raw
//! octets) without aborting the walk. Encoding re-packs the attribute list:
//! the message type leads, relay-agent information trails, runs of equal
//! codes share one TLV.
use std::{
    borrow::Cow,
    net::Ipv4Addr,
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::{debug, warn};

use crate::{
    attr::{AttrCode, AttrList, AttrValue, Attribute, HeaderField},
    decoder::Decoder,
    dictionary::{AttrDescriptor, Dictionary},
    encoder::Encoder,
    error::{DecodeError, DecodeResult, EncodeResult},
    flags,
    msgtype::MessageType,
    packet::{DEFAULT_PACKET_SIZE, OPTIONS_OFFSET, Packet},
};

/// Longest option payload the codec will accept or produce. The TLV length
/// byte could name up to 255, but lengths of 253 and above cannot fit a
/// whole option inside the trailing window of a full datagram.
pub const MAX_OPTION_LEN: usize = 253;

/// Walk the TLV area of `data` and append one attribute per recognized
/// value to `attrs`. Stops at a pad byte, the end marker, or truncation.
pub(crate) fn decode(data: &[u8], dict: &Dictionary, attrs: &mut AttrList) -> DecodeResult<()> {
    let mut d = Decoder::new(data.get(OPTIONS_OFFSET..).unwrap_or(&[]));

    loop {
        let code = match d.peek_u8() {
            Ok(c) => c,
            Err(_) => break,
        };
        if code == 0 || code == 255 {
            break;
        }
        // a TLV missing its length byte ends the walk
        let Ok([_, len]) = d.peek::<2>() else { break };
        d.read::<2>()?;
        let len = len as usize;

        if len >= MAX_OPTION_LEN {
            warn!(code, len, "attribute too long, skipping option");
            if d.read_slice(len).is_err() {
                break;
            }
            continue;
        }
        let Ok(payload) = d.read_slice(len) else {
            // truncated payload
            break;
        };

        let Some(desc) = dict.lookup(AttrCode::Option(code)) else {
            debug!(code, "attribute not in our dictionary, skipping option");
            continue;
        };

        if code == 82 {
            decode_relay(payload, dict, attrs);
        } else {
            decode_values(code, desc, payload, attrs)?;
        }
    }
    Ok(())
}

/// Decode one option payload into typed values, falling back to raw octets
/// when the payload disagrees with the declared type.
fn decode_values(
    code: u8,
    desc: AttrDescriptor,
    payload: &[u8],
    attrs: &mut AttrList,
) -> DecodeResult<()> {
    // client identifiers of the form [hw-type|mac] surface as a MAC
    if code == 61 && !desc.array && payload.len() == 7 && payload[0] == 1 {
        let mac: [u8; 6] = payload[1..7].try_into()?;
        attrs.push(Attribute::new(
            AttrCode::Option(code),
            AttrValue::Ethernet(mac),
        ));
        return Ok(());
    }

    let (num_entries, width) = match (desc.ty.width(), desc.array) {
        (Some(w), true) => {
            if payload.len() % w != 0 {
                warn!(code, len = payload.len(), "array length is not a multiple of {w}, keeping raw");
                attrs.push(Attribute::new(
                    AttrCode::Option(code),
                    AttrValue::Octets(payload.to_vec()),
                ));
                return Ok(());
            }
            (payload.len() / w, w)
        }
        (Some(w), false) => {
            if payload.len() != w {
                warn!(code, len = payload.len(), "expected a {w} byte value, keeping raw");
                attrs.push(Attribute::new(
                    AttrCode::Option(code),
                    AttrValue::Octets(payload.to_vec()),
                ));
                return Ok(());
            }
            (1, w)
        }
        // variable-length types take the payload whole
        (None, _) => (1, payload.len()),
    };

    let mut d = Decoder::new(payload);
    for _ in 0..num_entries {
        let value = AttrValue::decode(desc.ty, &mut d, width)?;
        attrs.push(Attribute::new(AttrCode::Option(code), value));
    }
    Ok(())
}

/// Walk the sub-option TLVs inside a relay-agent option. Unknown
/// sub-options are kept as raw octets so the whole container re-encodes.
fn decode_relay(payload: &[u8], dict: &Dictionary, attrs: &mut AttrList) {
    let mut d = Decoder::new(payload);
    while let Ok([sub, len]) = d.peek::<2>() {
        let _ = d.read::<2>();
        let Ok(data) = d.read_slice(len as usize) else {
            warn!(sub, "truncated relay agent sub-option");
            break;
        };

        let typed = dict.lookup(AttrCode::Relay(sub)).and_then(|desc| {
            match desc.ty.width() {
                Some(w) if w != data.len() => None,
                _ => AttrValue::decode(desc.ty, &mut Decoder::new(data), data.len()).ok(),
            }
        });
        let value = typed.unwrap_or_else(|| AttrValue::Octets(data.to_vec()));
        attrs.push(Attribute::new(AttrCode::Relay(sub), value));
    }
}

/// Broadcast-flag fix-up for "MSFT 98" clients: on a non-relayed
/// DHCPREQUEST carrying that vendor class, force the broadcast bit in both
/// the flags attribute and the raw datagram so the reply header copies it.
pub(crate) fn apply_vendor_quirks(packet: &mut Packet, attrs: &mut AttrList) {
    if packet.giaddr() != Ipv4Addr::UNSPECIFIED {
        return;
    }
    let is_request = matches!(
        attrs.first(AttrCode::Option(53)).map(|a| &a.value),
        Some(AttrValue::Byte(3))
    );
    if !is_request {
        return;
    }
    let msft98 = matches!(
        attrs
            .first(AttrCode::Option(60))
            .and_then(|a| a.value.as_str()),
        Some("MSFT 98")
    );
    if !msft98 {
        return;
    }

    debug!("MSFT 98 vendor class, reply will be broadcast");
    if let Some(attr) = attrs.first_mut(AttrCode::Header(HeaderField::Flags)) {
        if let AttrValue::Short(f) = &mut attr.value {
            *f |= flags::BROADCAST;
        }
    }
    packet.data_mut()[10] |= 0x80;
}

/// Clamp the size-negotiation options. A client may ask for a larger reply
/// than the minimum, never a smaller one, and never more than its own MTU.
pub(crate) fn clamp_negotiation(attrs: &mut AttrList) -> DecodeResult<()> {
    let min = DEFAULT_PACKET_SIZE as u16;

    let mtu = attrs
        .first(AttrCode::Option(26))
        .and_then(|a| a.value.as_u16());
    if let Some(mtu) = mtu {
        if mtu < min {
            return Err(DecodeError::MtuTooSmall { mtu, min });
        }
    }

    if let Some(attr) = attrs.first_mut(AttrCode::Option(57)) {
        if let AttrValue::Short(mms) = &mut attr.value {
            if *mms < min {
                warn!(mms = *mms, min, "maximum message size below the permitted minimum, fixing it");
                *mms = min;
            }
            if let Some(mtu) = mtu {
                if *mms > mtu {
                    warn!(mms = *mms, mtu, "maximum message size exceeds the interface MTU, fixing it");
                    *mms = mtu;
                }
            }
        }
    }
    Ok(())
}

/// Serialize `attrs` into the option area: message type first, then sorted
/// TLVs with equal-code runs packed together, then the end marker.
pub(crate) fn encode(
    attrs: &mut AttrList,
    msg_type: MessageType,
    now: SystemTime,
    e: &mut Encoder<'_>,
) -> EncodeResult<()> {
    fixup_authentication(attrs, now);

    // the message type option always leads; a stale copy in the list is
    // dropped after a consistency check
    if let Some(attr) = attrs.first(AttrCode::Option(53)) {
        if attr.value != AttrValue::Byte(msg_type.into()) {
            warn!(%msg_type, "message type attribute disagrees with the reply code");
        }
        attrs.remove(AttrCode::Option(53));
    }
    e.write([53, 1, msg_type.into()])?;

    attrs.sort_by(|a, b| emit_order(a.code).cmp(&emit_order(b.code)));

    let list = attrs.as_slice();
    let mut i = 0;
    while i < list.len() {
        let head = &list[i];
        let run = list[i..].iter().take_while(|a| a.code == head.code).count();
        let (code, sub) = match head.code {
            AttrCode::Option(c) => (c, None),
            AttrCode::Relay(s) => (82, Some(s)),
            // header pseudo-attributes and host secrets never hit the wire
            _ => {
                i += run;
                continue;
            }
        };

        e.write_u8(code)?;
        let len_at = e.len_filled();
        e.write_u8(0)?;
        let mut outer = 0usize;
        if let Some(sub) = sub {
            e.write_u8(sub)?;
            e.write_u8(0)?;
            outer = 2;
        }

        for attr in &list[i..i + run] {
            let value = emit_value(attr, code, run);
            let len = value.wire_len();
            if outer + len > 255 {
                warn!(code, "attribute run does not fit a single option, dropping the rest");
                break;
            }
            value.encode(e)?;
            outer += len;
        }

        e.patch_u8(len_at, outer as u8)?;
        if sub.is_some() {
            // inner length excludes the sub-option's own two-byte header
            e.patch_u8(len_at + 2, (outer - 2) as u8)?;
        }
        i += run;
    }

    e.write([255, 0])?;
    Ok(())
}

/// A lone MAC-typed client identifier re-folds to its wire form with the
/// hardware-type marker prepended.
fn emit_value<'a>(attr: &'a Attribute, code: u8, run: usize) -> Cow<'a, AttrValue> {
    if code == 61 && run == 1 {
        if let AttrValue::Ethernet(mac) = &attr.value {
            let mut bytes = Vec::with_capacity(7);
            bytes.push(1);
            bytes.extend_from_slice(mac);
            return Cow::Owned(AttrValue::Octets(bytes));
        }
    }
    Cow::Borrowed(&attr.value)
}

/// Emission order: message type first, relay-agent information last,
/// everything else by numeric code. Header pseudo-attributes keep their
/// synthesized codes past 255 so they sort after the true options.
fn emit_order(code: AttrCode) -> (u8, u32) {
    match code {
        AttrCode::Option(53) => (0, 53),
        AttrCode::Option(c) => (1, c as u32),
        AttrCode::Header(f) => (1, 256 + f as u32),
        AttrCode::CleartextPassword => (1, 1024),
        AttrCode::Relay(s) => (2, s as u32),
    }
}

/// seconds between the NTP era and the unix epoch
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

fn ntp_timestamp(t: SystemTime) -> [u8; 8] {
    let since = t.duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = since.as_secs().wrapping_add(NTP_UNIX_OFFSET) as u32;
    let frac = (((since.subsec_micros() as u64) << 32) / 1_000_000) as u32;
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&secs.to_be_bytes());
    out[4..].copy_from_slice(&frac.to_be_bytes());
    out
}

/// RFC 3118 authentication option. Completes a bare or partial option 90
/// into an 11-byte header (protocol, algorithm, RDM, replay timestamp) and,
/// for the configuration-token protocol, appends the host's cleartext
/// password as the token.
fn fixup_authentication(attrs: &mut AttrList, now: SystemTime) {
    let password: Option<Vec<u8>> =
        attrs
            .first(AttrCode::CleartextPassword)
            .and_then(|a| match &a.value {
                AttrValue::String(s) => Some(s.clone().into_bytes()),
                AttrValue::Octets(v) => Some(v.clone()),
                _ => None,
            });

    let Some(attr) = attrs.first_mut(AttrCode::Option(90)) else {
        return;
    };
    let AttrValue::Octets(buf) = &mut attr.value else {
        warn!("authentication option is not raw octets, leaving it unchanged");
        return;
    };

    if buf.len() < 2 {
        buf.resize(2, 0);
    }
    if buf.len() < 3 {
        buf.push(0); // algorithm
        buf.extend_from_slice(&ntp_timestamp(now)); // replay detection
    }

    match buf[0] {
        0 => {
            // configuration token: RDM is zero, the token is the password
            buf[1] = 0;
            if buf.len() < 11 {
                buf.resize(11, 0);
            } else {
                buf.truncate(11);
            }
            if let Some(pass) = password {
                let room = MAX_OPTION_LEN - 11;
                let take = pass.len().min(room);
                buf.extend_from_slice(&pass[..take]);
            }
        }
        proto => {
            warn!(proto, "authentication protocol unsupported");
        }
    }
}
