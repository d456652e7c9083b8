use crate::config::SharedConfig;
use crate::error::Error;
use crate::resolver::{self, MatchPolicy};
use crate::table::SharedTable;
use std::net::Ipv4Addr;
use tracing::error;
use trust_dns_server::authority::MessageResponseBuilder;
use trust_dns_server::client::op::{Header, MessageType, OpCode, ResponseCode};
use trust_dns_server::client::rr::{LowerName, RData, Record, RecordType};
use trust_dns_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

#[derive(Clone)]
pub struct Handler {
    config: SharedConfig,
    zone: String,
    policy: MatchPolicy,
    table: SharedTable,
}

impl Handler {
    pub fn new(config: SharedConfig, table: SharedTable) -> Self {
        let zone = config.zone.to_string();
        let policy = config.match_policy();
        Handler {
            config,
            zone,
            policy,
            table,
        }
    }

    async fn dispatch_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response: R,
    ) -> Result<ResponseInfo, Error> {
        // If it isn't a query, return NOTIMPL.
        if request.op_code() != OpCode::Query || request.message_type() != MessageType::Query {
            return self.handle_notimpl(request, response).await;
        }

        // Only A queries are answered, everything else is NXDOMAIN.
        match request.query().query_type() {
            RecordType::A => self.handle_request_a(request, response).await,
            _ => self.send_nxdomain(request, response).await,
        }
    }

    async fn handle_notimpl<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let response = MessageResponseBuilder::from_message_request(request);
        Ok(response_handle
            .send_response(response.error_msg(request.header(), ResponseCode::NotImp))
            .await?)
    }

    async fn handle_request_a<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        match self.lookup(request.query().name()).await {
            None => self.send_nxdomain(request, response_handle).await,
            Some(addr) => {
                self.send_auth_resp(request, response_handle, RData::A(addr))
                    .await
            }
        }
    }

    /// The single address served for a query name, if any. Only the first address of a
    /// multi-address entry is ever returned.
    pub async fn lookup(&self, query_name: &LowerName) -> Option<Ipv4Addr> {
        let query_name = query_name.to_string();
        let relative_name = resolver::relative_name(&query_name, &self.zone)?;
        let table = self.table.snapshot().await;
        resolver::resolve(relative_name, &table, self.policy)
            .and_then(|addrs| addrs.first().copied())
    }

    async fn send_auth_resp<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
        rdata: RData,
    ) -> Result<ResponseInfo, Error> {
        let record = Record::from_rdata(request.query().name().into(), self.config.ttl, rdata);
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(header, std::iter::once(&record), &[], &[], &[]);
        Ok(response_handle.send_response(response).await?)
    }

    async fn send_nxdomain<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let builder = MessageResponseBuilder::from_message_request(request);
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        header.set_response_code(ResponseCode::NXDomain);
        let response = builder.build_no_records(header);
        Ok(response_handle.send_response(response).await?)
    }
}

#[async_trait::async_trait]
impl RequestHandler for Handler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        match self.dispatch_request(request, response_handle).await {
            Ok(info) => info,
            Err(error) => {
                error!("error in RequestHandler: {:?}", error);
                let mut header = Header::new();
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}
