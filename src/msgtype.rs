use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// DHCP message type carried in option 53.
///
/// Ingress validation accepts only `Discover..=Release`; an `Inform` is
/// rejected at the socket boundary even though the code is defined here.
/// See [`Packet::from_bytes`].
///
/// [`Packet::from_bytes`]: crate::packet::Packet::from_bytes
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Hash, Clone, PartialEq, Eq)]
pub enum MessageType {
    /// 1 client broadcast to locate available servers
    Discover,
    /// 2 server offer of configuration parameters
    Offer,
    /// 3 client request of offered parameters
    Request,
    /// 4 client declines the offered address
    Decline,
    /// 5 server acknowledgement with committed parameters
    Ack,
    /// 6 server refusal of the client's notion of its address
    Nak,
    /// 7 client relinquishes its lease
    Release,
    /// 8 client asks for local configuration only
    Inform,
    /// unknown or vendor message type
    Unknown(u8),
}

impl MessageType {
    /// true for the server-originated types which need the original request
    /// to encode
    pub fn is_reply(&self) -> bool {
        matches!(self, MessageType::Offer | MessageType::Ack | MessageType::Nak)
    }
}

impl From<u8> for MessageType {
    fn from(n: u8) -> Self {
        use MessageType::*;
        match n {
            1 => Discover,
            2 => Offer,
            3 => Request,
            4 => Decline,
            5 => Ack,
            6 => Nak,
            7 => Release,
            8 => Inform,
            n => Unknown(n),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(m: MessageType) -> Self {
        use MessageType::*;
        match m {
            Discover => 1,
            Offer => 2,
            Request => 3,
            Decline => 4,
            Ack => 5,
            Nak => 6,
            Release => 7,
            Inform => 8,
            Unknown(n) => n,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use MessageType::*;
        match self {
            Discover => write!(f, "DHCP-Discover"),
            Offer => write!(f, "DHCP-Offer"),
            Request => write!(f, "DHCP-Request"),
            Decline => write!(f, "DHCP-Decline"),
            Ack => write!(f, "DHCP-Ack"),
            Nak => write!(f, "DHCP-NAK"),
            Release => write!(f, "DHCP-Release"),
            Inform => write!(f, "DHCP-Inform"),
            Unknown(n) => write!(f, "DHCP-Type-{n}"),
        }
    }
}
