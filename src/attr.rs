//! Attribute triples and the ordered list the codec produces and consumes.
use std::{fmt, net::Ipv4Addr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    decoder::Decoder,
    encoder::Encoder,
    error::{DecodeResult, EncodeResult},
};

/// Wire type of an attribute value, as declared by the dictionary.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Hash, Clone, PartialEq, Eq)]
pub enum AttrType {
    /// single octet
    Byte,
    /// 16-bit big-endian integer
    Short,
    /// 32-bit big-endian integer
    Integer,
    /// IPv4 address, 4 octets
    IpAddr,
    /// 32-bit seconds value
    Date,
    /// printable string, variable length
    String,
    /// opaque bytes, variable length
    Octets,
    /// 6-octet MAC address
    Ethernet,
}

impl AttrType {
    /// Fixed wire width, or `None` for the variable-length types.
    pub fn width(&self) -> Option<usize> {
        use AttrType::*;
        match self {
            Byte => Some(1),
            Short => Some(2),
            Integer | IpAddr | Date => Some(4),
            Ethernet => Some(6),
            String | Octets => None,
        }
    }
}

/// The fourteen fixed BOOTP header fields, exposed by the codec as
/// pseudo-attributes alongside the true options.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Hash, Clone, PartialEq, Eq)]
pub enum HeaderField {
    /// message op code (1 request / 2 reply)
    Opcode,
    /// hardware address type
    HardwareType,
    /// hardware address length
    HardwareAddrLen,
    /// relay hop count
    HopCount,
    /// transaction id
    TransactionId,
    /// seconds since the client began acquisition
    Seconds,
    /// flags field
    Flags,
    /// client IP address (when bound)
    ClientIpAddr,
    /// "your" IP address, the one being offered
    YourIpAddr,
    /// next-server IP address
    ServerIpAddr,
    /// gateway/relay IP address
    GatewayIpAddr,
    /// client hardware address
    ClientHwAddr,
    /// server host name
    ServerHostName,
    /// boot file name
    BootFilename,
}

impl HeaderField {
    /// All fields in wire order.
    pub const ALL: [HeaderField; 14] = [
        HeaderField::Opcode,
        HeaderField::HardwareType,
        HeaderField::HardwareAddrLen,
        HeaderField::HopCount,
        HeaderField::TransactionId,
        HeaderField::Seconds,
        HeaderField::Flags,
        HeaderField::ClientIpAddr,
        HeaderField::YourIpAddr,
        HeaderField::ServerIpAddr,
        HeaderField::GatewayIpAddr,
        HeaderField::ClientHwAddr,
        HeaderField::ServerHostName,
        HeaderField::BootFilename,
    ];

    /// Offset of the field in the fixed header.
    pub fn offset(&self) -> usize {
        use HeaderField::*;
        match self {
            Opcode => 0,
            HardwareType => 1,
            HardwareAddrLen => 2,
            HopCount => 3,
            TransactionId => 4,
            Seconds => 8,
            Flags => 10,
            ClientIpAddr => 12,
            YourIpAddr => 16,
            ServerIpAddr => 20,
            GatewayIpAddr => 24,
            ClientHwAddr => 28,
            ServerHostName => 44,
            BootFilename => 108,
        }
    }

    /// Size of the field slot in the fixed header.
    pub fn size(&self) -> usize {
        use HeaderField::*;
        match self {
            Opcode | HardwareType | HardwareAddrLen | HopCount => 1,
            Seconds | Flags => 2,
            TransactionId | ClientIpAddr | YourIpAddr | ServerIpAddr | GatewayIpAddr => 4,
            ClientHwAddr => 16,
            ServerHostName => 64,
            BootFilename => 128,
        }
    }

    /// Declared value type of the field.
    pub fn ty(&self) -> AttrType {
        use HeaderField::*;
        match self {
            Opcode | HardwareType | HardwareAddrLen | HopCount => AttrType::Byte,
            Seconds | Flags => AttrType::Short,
            TransactionId => AttrType::Integer,
            ClientIpAddr | YourIpAddr | ServerIpAddr | GatewayIpAddr => AttrType::IpAddr,
            ClientHwAddr => AttrType::Octets,
            ServerHostName | BootFilename => AttrType::String,
        }
    }

    /// Symbolic field name.
    pub fn name(&self) -> &'static str {
        use HeaderField::*;
        match self {
            Opcode => "Opcode",
            HardwareType => "Hardware-Type",
            HardwareAddrLen => "Hardware-Address-Length",
            HopCount => "Hop-Count",
            TransactionId => "Transaction-Id",
            Seconds => "Number-of-Seconds",
            Flags => "Flags",
            ClientIpAddr => "Client-IP-Address",
            YourIpAddr => "Your-IP-Address",
            ServerIpAddr => "Server-IP-Address",
            GatewayIpAddr => "Gateway-IP-Address",
            ClientHwAddr => "Client-Hardware-Address",
            ServerHostName => "Server-Host-Name",
            BootFilename => "Boot-Filename",
        }
    }
}

/// Attribute identity. Header pseudo-attributes, true options and
/// relay-agent sub-options live in disjoint namespaces; the mapping to and
/// from the wire is invertible by construction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Hash, Clone, PartialEq, Eq)]
pub enum AttrCode {
    /// a fixed-header field
    Header(HeaderField),
    /// a DHCP option, by wire code
    Option(u8),
    /// an option-82 sub-option, by sub-option number
    Relay(u8),
    /// host-supplied secret consumed by the authentication option;
    /// never emitted on the wire
    CleartextPassword,
}

impl fmt::Display for AttrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrCode::Header(h) => write!(f, "{}", h.name()),
            AttrCode::Option(c) => write!(f, "Option-{c}"),
            AttrCode::Relay(s) => write!(f, "Relay-Agent-82.{s}"),
            AttrCode::CleartextPassword => write!(f, "Cleartext-Password"),
        }
    }
}

/// A decoded attribute value. The variant carries the type tag.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// single octet
    Byte(u8),
    /// 16-bit integer
    Short(u16),
    /// 32-bit integer
    Integer(u32),
    /// IPv4 address
    IpAddr(Ipv4Addr),
    /// seconds value
    Date(u32),
    /// printable string
    String(String),
    /// opaque bytes, up to 253
    Octets(Vec<u8>),
    /// MAC address
    Ethernet([u8; 6]),
}

impl AttrValue {
    /// Type tag of this value.
    pub fn ty(&self) -> AttrType {
        use AttrValue::*;
        match self {
            Byte(_) => AttrType::Byte,
            Short(_) => AttrType::Short,
            Integer(_) => AttrType::Integer,
            IpAddr(_) => AttrType::IpAddr,
            Date(_) => AttrType::Date,
            String(_) => AttrType::String,
            Octets(_) => AttrType::Octets,
            Ethernet(_) => AttrType::Ethernet,
        }
    }

    /// Number of bytes this value occupies on the wire.
    pub fn wire_len(&self) -> usize {
        use AttrValue::*;
        match self {
            Byte(_) => 1,
            Short(_) => 2,
            Integer(_) | IpAddr(_) | Date(_) => 4,
            Ethernet(_) => 6,
            String(s) => s.len(),
            Octets(v) => v.len(),
        }
    }

    /// Read one value of type `ty` spanning `len` bytes.
    pub fn decode(ty: AttrType, decoder: &mut Decoder<'_>, len: usize) -> DecodeResult<Self> {
        Ok(match ty {
            AttrType::Byte => AttrValue::Byte(decoder.read_u8()?),
            AttrType::Short => AttrValue::Short(decoder.read_u16()?),
            AttrType::Integer => AttrValue::Integer(decoder.read_u32()?),
            AttrType::IpAddr => AttrValue::IpAddr(decoder.read_ipv4(4)?),
            AttrType::Date => AttrValue::Date(decoder.read_u32()?),
            AttrType::Ethernet => AttrValue::Ethernet(decoder.read::<6>()?),
            AttrType::String => AttrValue::String(decoder.read_string(len)?),
            AttrType::Octets => AttrValue::Octets(decoder.read_slice(len)?.to_vec()),
        })
    }

    /// Serialize the value, width-exact big-endian for the numeric types.
    pub fn encode(&self, e: &mut Encoder<'_>) -> EncodeResult<()> {
        use AttrValue::*;
        match self {
            Byte(n) => e.write_u8(*n),
            Short(n) => e.write_u16(*n),
            Integer(n) | Date(n) => e.write_u32(*n),
            IpAddr(ip) => e.write(ip.octets()),
            Ethernet(mac) => e.write(*mac),
            String(s) => e.write_slice(s.as_bytes()),
            Octets(v) => e.write_slice(v),
        }
    }

    /// value as u16, for `Short` only
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            AttrValue::Short(n) => Some(*n),
            _ => None,
        }
    }

    /// value as u32, for the 32-bit numeric variants
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            AttrValue::Integer(n) | AttrValue::Date(n) => Some(*n),
            _ => None,
        }
    }

    /// value as an IPv4 address
    pub fn as_ipv4(&self) -> Option<Ipv4Addr> {
        match self {
            AttrValue::IpAddr(ip) => Some(*ip),
            _ => None,
        }
    }

    /// value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AttrValue::*;
        match self {
            Byte(n) => write!(f, "{n}"),
            Short(n) => write!(f, "{n}"),
            Integer(n) => write!(f, "{n}"),
            Date(n) => write!(f, "{n}"),
            IpAddr(ip) => write!(f, "{ip}"),
            String(s) => write!(f, "\"{s}\""),
            Octets(v) => write!(f, "0x{}", hex::encode(v)),
            Ethernet(mac) => {
                let hexed = hex::encode(mac);
                let mut parts = hexed.as_bytes().chunks(2);
                if let Some(first) = parts.next() {
                    // chunks of a hex string stay valid utf-8
                    write!(f, "{}", std::str::from_utf8(first).unwrap())?;
                }
                for part in parts {
                    write!(f, ":{}", std::str::from_utf8(part).unwrap())?;
                }
                Ok(())
            }
        }
    }
}

/// One (code, value) pair.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// attribute identity
    pub code: AttrCode,
    /// typed payload
    pub value: AttrValue,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(code: AttrCode, value: AttrValue) -> Self {
        Self { code, value }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.code, self.value)
    }
}

/// Ordered, mutable attribute sequence. Duplicate codes are permitted and
/// meaningful: arrayed options and relay-agent sub-options decode to several
/// attributes sharing a code.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttrList(Vec<Attribute>);

impl AttrList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute at the end
    pub fn push(&mut self, attr: Attribute) {
        self.0.push(attr);
    }

    /// First attribute with the given code
    pub fn first(&self, code: AttrCode) -> Option<&Attribute> {
        self.0.iter().find(|a| a.code == code)
    }

    /// First attribute with the given code, mutably
    pub fn first_mut(&mut self, code: AttrCode) -> Option<&mut Attribute> {
        self.0.iter_mut().find(|a| a.code == code)
    }

    /// Remove every attribute with the given code, returning how many
    /// were removed
    pub fn remove(&mut self, code: AttrCode) -> usize {
        let before = self.0.len();
        self.0.retain(|a| a.code != code);
        before - self.0.len()
    }

    /// iterate over attributes in order
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }

    /// iterate mutably over attributes in order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Attribute> {
        self.0.iter_mut()
    }

    /// Retain only the attributes matching the predicate
    pub fn retain<F>(&mut self, pred: F)
    where
        F: FnMut(&Attribute) -> bool,
    {
        self.0.retain(pred)
    }

    /// Stable sort by the given comparator; relative order of equal
    /// attributes is preserved
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&Attribute, &Attribute) -> std::cmp::Ordering,
    {
        self.0.sort_by(cmp)
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when the list holds no attributes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// attributes as a slice
    pub fn as_slice(&self) -> &[Attribute] {
        &self.0
    }
}

impl IntoIterator for AttrList {
    type Item = Attribute;
    type IntoIter = std::vec::IntoIter<Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Attribute> for AttrList {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        AttrList(iter.into_iter().collect())
    }
}
