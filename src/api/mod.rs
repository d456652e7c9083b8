//! HTTP API for operators.
//!
//! The API exposes tenant and instance names, so its bind address must be a loopback or
//! private address (see [`Config::api_bind_addr`][`crate::config::Config::api_bind_addr`]).
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/status` (GET)
//!
//!   Returns HTTP 200 (OK) and a JSON body describing the inventory refresh loop:
//!
//!   ```json
//!   {
//!     "entries": 42,
//!     "refresh_cycles": 1337,
//!     "consecutive_failures": 0,
//!     "last_success": "2023-03-12T10:00:00Z",
//!     "last_error": null
//!   }
//!   ```
//!
//!   `entries` is the number of names in the table currently being served. `last_success` is
//!   `null` until the first refresh succeeds. `last_error` holds the error of the most recent
//!   cycle if it failed.
//!
//! ## `/lookup/:name` (GET)
//!
//!   Resolves a relative name (`<instance>.<tenant>`, without the zone) the same way the
//!   [DNS server][crate::dns] would, honouring the wildcard setting:
//!
//!   ```json
//!   { "name": "web1.acme", "address": "203.0.113.5" }
//!   ```
//!
//!   Returns HTTP 404 (Not Found) with an `{"error": ...}` body if nothing matches.

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
