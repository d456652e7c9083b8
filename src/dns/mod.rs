//! Authoritative DNS server for compute instances.
//!
//! # A Records
//!
//! novacrab serves a response to `A` class queries for `<instance>.<tenant>.<zone>`, where
//! `<zone>` is the configured [`Config::zone`][`crate::config::Config::zone`], for every
//! instance that has at least one floating IPv4 address in the most recently fetched
//! [inventory][crate::inventory]. Only the first floating address is ever returned.
//!
//! E.g. with config:
//! ```json
//! {
//!   "zone": "cloud.example.com",
//!   ...
//! }
//! ```
//!
//! And an instance `web1` owned by tenant `acme` with floating IP `203.0.113.5`, an `A` class
//! query would return:
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5353 web1.acme.cloud.example.com +short A
//! 203.0.113.5
//! ```
//!
//! Names that aren't in the inventory, and queries of any other type, get an authoritative
//! `NXDOMAIN`. Until the first inventory refresh succeeds, every name is unknown.
//!
//! ## Wildcards
//!
//! With [`Config::wildcard`][`crate::config::Config::wildcard`] set, any name below an instance
//! resolves to that instance, so `www.web1.acme.cloud.example.com` answers with the address of
//! `web1.acme`. If several suffixes of the query name are known, the longest one wins. See
//! [`resolver`][crate::resolver].
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5353 www.web1.acme.cloud.example.com +short A
//! 203.0.113.5
//! ```

mod handlers;
pub mod server;

pub use handlers::Handler;
pub use server::new;
