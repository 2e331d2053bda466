//! A toy reply loop: offers the same address to anyone who asks.
//!
//! Run with `cargo run --example reply_server` (needs a bindable port 67,
//! so usually root or a netns).
use std::{net::UdpSocket, sync::Arc};

use anyhow::Result;
use tracing::{info, warn};

use dhcpwire::{
    AttrCode, AttrList, AttrValue, Attribute, Dictionary, HeaderField, MessageType, Packet,
    SERVER_PORT,
};

const OFFERED_IP: [u8; 4] = [192, 0, 2, 99];

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let socket = Arc::new(UdpSocket::bind(("0.0.0.0", SERVER_PORT))?);
    socket.set_broadcast(true)?;
    let dict = Dictionary::standard();
    info!("listening on port {SERVER_PORT}");

    loop {
        let mut request = match Packet::recv(&socket) {
            Ok(packet) => packet,
            Err(err) => {
                warn!(%err, "dropping packet");
                continue;
            }
        };

        let attrs = match dhcpwire::decode(&mut request, &dict) {
            Ok(attrs) => attrs,
            Err(err) => {
                warn!(%err, "undecodable packet");
                continue;
            }
        };
        info!(request = %request, attrs = attrs.len(), "handling");

        let response = match request.msg_type() {
            MessageType::Discover => MessageType::Offer,
            MessageType::Request => MessageType::Ack,
            other => {
                info!(%other, "ignored");
                continue;
            }
        };

        let mut reply = AttrList::new();
        reply.push(Attribute::new(
            AttrCode::Header(HeaderField::YourIpAddr),
            AttrValue::IpAddr(OFFERED_IP.into()),
        ));
        reply.push(Attribute::new(
            AttrCode::Option(1),
            AttrValue::IpAddr([255, 255, 255, 0].into()),
        ));
        reply.push(Attribute::new(AttrCode::Option(51), AttrValue::Date(3600)));

        match dhcpwire::encode(reply, response, Some(&request)) {
            Ok(packet) => {
                if let Err(err) = packet.send() {
                    warn!(%err, "send failed");
                }
            }
            Err(err) => warn!(%err, "encode failed"),
        }
    }
}
