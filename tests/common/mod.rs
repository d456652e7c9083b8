//! Shared test infrastructure for end-to-end query tests.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use novacrab::inventory::{AddressRecord, Instance};
use novacrab::{Config, SharedConfig};
use trust_dns_proto::op::{Message, MessageType, OpCode, Query};
use trust_dns_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use trust_dns_proto::serialize::binary::{BinDecodable, BinDecoder, BinEncoder};
use trust_dns_server::authority::{MessageRequest, MessageResponse};
use trust_dns_server::server::{Protocol, Request, ResponseHandler, ResponseInfo};

pub const ZONE: &str = "cloud.example.com";

/// Captures the serialized DNS response for inspection in tests.
#[derive(Clone)]
pub struct TestResponseHandler {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl TestResponseHandler {
    pub fn new() -> Self {
        Self {
            buf: Arc::new(Mutex::new(Vec::with_capacity(512))),
        }
    }

    /// Parse the captured wire bytes into a `Message` for assertions.
    pub fn into_message(self) -> Message {
        let buf = self.buf.lock().unwrap();
        assert!(!buf.is_empty(), "no response was captured");
        Message::from_vec(&buf).expect("failed to parse captured DNS response")
    }
}

#[async_trait]
impl ResponseHandler for TestResponseHandler {
    async fn send_response<'a>(
        &mut self,
        response: MessageResponse<
            '_,
            'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
        >,
    ) -> io::Result<ResponseInfo> {
        let mut buf = self.buf.lock().unwrap();
        buf.clear();
        let mut encoder = BinEncoder::new(&mut *buf);
        encoder.set_max_size(u16::MAX);
        response
            .destructive_emit(&mut encoder)
            .map(Into::into)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

pub fn config(wildcard: bool) -> SharedConfig {
    let json = format!(
        r#"{{
            "zone": "{ZONE}",
            "auth_url": "https://keystone.example.com:5000/v3",
            "wildcard": {wildcard},
            "ttl": 30,
            "dns_udp_bind_addr": "127.0.0.1:5353",
            "dns_tcp_bind_addr": "127.0.0.1:5353",
            "dns_tcp_timeout": 5,
            "api_bind_addr": "127.0.0.1:3000",
            "api_timeout": 5
        }}"#
    );
    Arc::new(Config::try_from_str(&json).expect("test config is valid"))
}

pub fn instance(name: &str, tenant: &str, floating: &[&str]) -> Instance {
    Instance::new(
        name,
        tenant,
        floating
            .iter()
            .map(|addr| AddressRecord::floating_v4(addr))
            .collect(),
    )
}

/// Build a `Request` as the server would hand it to the handler.
pub fn build_request(name: &str, record_type: RecordType, id: u16) -> Request {
    let mut msg = Message::new();
    msg.set_id(id);
    msg.set_message_type(MessageType::Query);
    msg.set_op_code(OpCode::Query);
    msg.set_recursion_desired(true);
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);
    msg.add_query(query);

    let bytes = msg.to_vec().unwrap();
    let mut decoder = BinDecoder::new(&bytes);
    let request = MessageRequest::read(&mut decoder).expect("failed to parse MessageRequest");
    let src: SocketAddr = "127.0.0.1:12345".parse().unwrap();
    Request::new(request, src, Protocol::Udp)
}

pub fn extract_a_ips(msg: &Message) -> Vec<Ipv4Addr> {
    msg.answers()
        .iter()
        .filter_map(|r| match r.data() {
            Some(RData::A(ip)) => Some(*ip),
            _ => None,
        })
        .collect()
}
