//! novacrab
//!
//! An authoritative DNS responder for [OpenStack] compute instances.
//!
//! Every instance with a floating IPv4 address is served as `<instance>.<tenant>.<zone>`.
//! The inventory is fetched from the OpenStack [identity] and [compute] APIs by a background
//! [refresh loop][refresh] and published as an immutable [name table][table]. DNS queries are
//! answered from whatever table was published last, so a flaky cloud API never stalls or fails
//! a query; at worst it serves a stale answer.
//!
//! Optionally, [wildcard matching][resolver] lets any name below an instance resolve to it.
//!
//! [OpenStack]: https://www.openstack.org
//! [identity]: https://docs.openstack.org/api-ref/identity/v3/
//! [compute]: https://docs.openstack.org/api-ref/compute/
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod dns;
pub mod error;
pub mod inventory;
pub mod refresh;
pub mod resolver;
pub mod table;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use dns::new as new_dns;
pub use inventory::{InMemoryInventory, OpenStackInventory};
pub use refresh::{Refresher, SharedStatus};
pub use table::{NameTable, SharedTable};
