use crate::api::api_error::APIError;
use crate::api::model::{LookupResult, StatusResult};
use crate::api::server::AppState;
use crate::error::Error;
use crate::resolver;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/status", get(status))
        .route("/lookup/:name", get(lookup))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusResult>, APIError> {
    let entries = state.table.snapshot().await.len();
    let refresh_status = state.status.read().await;
    Ok(Json(StatusResult::new(entries, &refresh_status)?))
}

async fn lookup(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<LookupResult>, APIError> {
    let table = state.table.snapshot().await;
    let address = resolver::resolve(&name, &table, state.config.match_policy())
        .and_then(|addrs| addrs.first().copied());
    match address {
        Some(address) => Ok(Json(LookupResult { name, address })),
        None => {
            tracing::debug!("lookup miss for \"{name}\"");
            Err(Error::NameNotFound(name).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::refresh::SharedStatus;
    use crate::table::{NameTable, SharedTable};
    use axum::http::StatusCode;
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    fn state() -> AppState {
        let config = Config::try_from_str(
            r#"{
                "zone": "cloud.example.com",
                "auth_url": "https://keystone.example.com:5000/v3",
                "wildcard": true,
                "dns_udp_bind_addr": "127.0.0.1:5353",
                "dns_tcp_bind_addr": "127.0.0.1:5353",
                "dns_tcp_timeout": 5,
                "api_bind_addr": "127.0.0.1:3000",
                "api_timeout": 5
            }"#,
        )
        .unwrap();
        AppState {
            config: Arc::new(config),
            table: SharedTable::new(NameTable::from([(
                "web1.acme",
                vec![Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 6)],
            )])),
            status: SharedStatus::default(),
        }
    }

    #[tokio::test]
    async fn lookup_hit_returns_first_address() {
        let Ok(Json(result)) = lookup(State(state()), Path("sub.web1.acme".to_string())).await
        else {
            panic!("expected a lookup hit");
        };
        assert_eq!(result.name, "sub.web1.acme");
        assert_eq!(result.address, Ipv4Addr::new(10, 0, 0, 5));
    }

    #[tokio::test]
    async fn lookup_miss_is_not_found() {
        let Err(err) = lookup(State(state()), Path("web2.acme".to_string())).await else {
            panic!("expected a lookup miss");
        };
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_reports_table_size() {
        let Ok(Json(result)) = status(State(state())).await else {
            panic!("expected a status result");
        };
        assert_eq!(result.entries, 1);
        assert_eq!(result.refresh_cycles, 0);
        assert!(result.last_success.is_none());
    }
}
