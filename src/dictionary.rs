//! Attribute dictionary: maps wire codes to typed descriptors.
//!
//! Decoding is dictionary-driven: an option whose code has no entry is
//! skipped, one whose payload disagrees with the declared type falls back to
//! raw octets. The built-in table covers the RFC 2132 options this codec is
//! normally deployed with; hosts may extend it before handing it to
//! [`decode`].
//!
//! [`decode`]: crate::decode
use std::collections::HashMap;

use dhcpwire_macros::declare_dictionary;

use crate::attr::{AttrCode, AttrType};

/// A dictionary entry: symbolic name, wire type, and whether the option is
/// the concatenation of several same-type values.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttrDescriptor {
    /// symbolic attribute name
    pub name: &'static str,
    /// declared value type
    pub ty: AttrType,
    /// option payload is an array of same-type values
    pub array: bool,
}

declare_dictionary!(BUILTIN_OPTIONS,
    {1, "Subnet-Mask", IpAddr},
    {2, "Time-Offset", Integer},
    {3, "Router-Address", IpAddr, array},
    {4, "Time-Server", IpAddr, array},
    {5, "IEN-116-Name-Server", IpAddr, array},
    {6, "Domain-Name-Server", IpAddr, array},
    {7, "Log-Server", IpAddr, array},
    {8, "Quotes-Server", IpAddr, array},
    {9, "LPR-Server", IpAddr, array},
    {10, "Impress-Server", IpAddr, array},
    {11, "RLP-Server", IpAddr, array},
    {12, "Hostname", String},
    {13, "Boot-Size", Short},
    {14, "Merit-Dump-File", String},
    {15, "Domain-Name", String},
    {16, "Swap-Server", IpAddr},
    {17, "Root-Path", String},
    {18, "Bootp-Extensions-Path", String},
    {19, "IP-Forward-Enable", Byte},
    {20, "Source-Route-Enable", Byte},
    {22, "Max-Datagram-Reassembly-Size", Short},
    {23, "Default-IP-TTL", Byte},
    {24, "Path-MTU-Aging-Timeout", Integer},
    {25, "Path-MTU-Plateau-Table", Short, array},
    {26, "Interface-MTU-Size", Short},
    {27, "All-Subnets-Local", Byte},
    {28, "Broadcast-Address", IpAddr},
    {29, "Perform-Mask-Discovery", Byte},
    {30, "Mask-Supplier", Byte},
    {31, "Perform-Router-Discovery", Byte},
    {32, "Router-Solicitation-Address", IpAddr},
    {33, "Static-Routes", IpAddr, array},
    {35, "ARP-Cache-Timeout", Integer},
    {36, "Ethernet-Encapsulation", Byte},
    {37, "Default-TCP-TTL", Byte},
    {38, "Keep-Alive-Interval", Integer},
    {39, "Keep-Alive-Garbage", Byte},
    {40, "NIS-Domain-Name", String},
    {41, "NIS-Server-Address", IpAddr, array},
    {42, "NTP-Servers", IpAddr, array},
    {43, "Vendor-Specific-Information", Octets},
    {44, "NETBIOS-Name-Servers", IpAddr, array},
    {45, "NETBIOS-Dgm-Dist-Servers", IpAddr, array},
    {46, "NETBIOS-Node-Type", Byte},
    {47, "NETBIOS-Scope", String},
    {48, "X-Window-Font-Server", IpAddr, array},
    {49, "X-Window-Display-Manager", IpAddr, array},
    {50, "Requested-IP-Address", IpAddr},
    {51, "IP-Address-Lease-Time", Date},
    {52, "Overload", Byte},
    {53, "Message-Type", Byte},
    {54, "Server-Identifier", IpAddr},
    {55, "Parameter-Request-List", Byte, array},
    {56, "Error-Message", String},
    {57, "Maximum-Msg-Size", Short},
    {58, "Renewal-Time", Date},
    {59, "Rebinding-Time", Date},
    {60, "Vendor-Class-Identifier", String},
    {61, "Client-Identifier", Octets},
    {64, "NIS-Client-Domain-Name", String},
    {65, "NIS-Server-Address", IpAddr, array},
    {66, "TFTP-Server-Name", String},
    {67, "Boot-Filename", String},
    {82, "Relay-Agent-Information", Octets},
    {90, "Authentication", Octets},
    {91, "Client-Last-Transaction-Time", Date},
    {92, "Associated-IP", IpAddr, array},
    {116, "Auto-Configure", Byte},
    {118, "Subnet-Selection-Option", IpAddr},
);

declare_dictionary!(BUILTIN_RELAY,
    {1, "Agent-Circuit-Id", Octets},
    {2, "Agent-Remote-Id", Octets},
    {4, "Docsis-Device-Class", Integer},
    {5, "Link-Selection", IpAddr},
    {6, "Subscriber-Id", String},
    {11, "Server-Identifier-Override", IpAddr},
);

/// Read-only attribute dictionary. Built once at startup and shared by
/// reference; lookups never mutate, so concurrent readers need no locking.
#[derive(Debug, Clone)]
pub struct Dictionary {
    options: HashMap<u8, AttrDescriptor>,
    relay: HashMap<u8, AttrDescriptor>,
}

impl Dictionary {
    /// An empty dictionary: every option is unknown and skipped on decode.
    pub fn new() -> Self {
        Self {
            options: HashMap::new(),
            relay: HashMap::new(),
        }
    }

    /// The built-in RFC 2132 table plus the common relay-agent sub-options.
    pub fn standard() -> Self {
        let mut dict = Self::new();
        for (code, desc) in BUILTIN_OPTIONS {
            dict.options.insert(*code, *desc);
        }
        for (code, desc) in BUILTIN_RELAY {
            dict.relay.insert(*code, *desc);
        }
        dict
    }

    /// Register (or replace) an option descriptor.
    pub fn insert_option(&mut self, code: u8, desc: AttrDescriptor) {
        self.options.insert(code, desc);
    }

    /// Register (or replace) a relay-agent sub-option descriptor.
    pub fn insert_relay(&mut self, sub: u8, desc: AttrDescriptor) {
        self.relay.insert(sub, desc);
    }

    /// Resolve an attribute code to its descriptor. Header pseudo-attributes
    /// are always resolvable; their descriptors are synthesized from the
    /// fixed-header table.
    pub fn lookup(&self, code: AttrCode) -> Option<AttrDescriptor> {
        match code {
            AttrCode::Header(field) => Some(AttrDescriptor {
                name: field.name(),
                ty: field.ty(),
                array: false,
            }),
            AttrCode::Option(c) => self.options.get(&c).copied(),
            AttrCode::Relay(s) => self.relay.get(&s).copied(),
            AttrCode::CleartextPassword => Some(AttrDescriptor {
                name: "Cleartext-Password",
                ty: AttrType::String,
                array: false,
            }),
        }
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::HeaderField;

    #[test]
    fn standard_lookups() {
        let dict = Dictionary::standard();
        let dns = dict.lookup(AttrCode::Option(6)).unwrap();
        assert_eq!(dns.name, "Domain-Name-Server");
        assert_eq!(dns.ty, AttrType::IpAddr);
        assert!(dns.array);

        let mtype = dict.lookup(AttrCode::Option(53)).unwrap();
        assert_eq!(mtype.ty, AttrType::Byte);
        assert!(!mtype.array);

        let circuit = dict.lookup(AttrCode::Relay(1)).unwrap();
        assert_eq!(circuit.ty, AttrType::Octets);

        assert!(dict.lookup(AttrCode::Option(200)).is_none());
    }

    #[test]
    fn header_fields_always_resolve() {
        let dict = Dictionary::new();
        for field in HeaderField::ALL {
            let desc = dict.lookup(AttrCode::Header(field)).unwrap();
            assert_eq!(desc.ty, field.ty());
            assert!(!desc.array);
        }
    }

    #[test]
    fn host_extension() {
        let mut dict = Dictionary::new();
        assert!(dict.lookup(AttrCode::Option(224)).is_none());
        dict.insert_option(
            224,
            AttrDescriptor {
                name: "Site-Local-Tag",
                ty: AttrType::Short,
                array: false,
            },
        );
        assert_eq!(
            dict.lookup(AttrCode::Option(224)).unwrap().ty,
            AttrType::Short
        );
    }
}
