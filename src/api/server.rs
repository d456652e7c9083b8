use crate::api::routes;
use crate::config::SharedConfig;
use crate::refresh::SharedStatus;
use crate::table::SharedTable;
use std::future::Future;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub table: SharedTable,
    pub status: SharedStatus,
}

pub fn new(
    config: SharedConfig,
    table: SharedTable,
    status: SharedStatus,
) -> impl Future<Output = hyper::Result<()>> {
    axum::Server::bind(&config.api_bind_addr).serve(
        routes::new(AppState {
            config,
            table,
            status,
        })
        .into_make_service(),
    )
}
