//! Compute inventory sources.
//!
//! An [`InventorySource`] reports every compute instance together with the name of the tenant
//! that owns it and the raw list of addresses attached to it. The
//! [refresh loop][crate::refresh] turns that list into a [`NameTable`][crate::table::NameTable]
//! once per cycle.
//!
//! Two implementations are provided, [`openstack::OpenStackInventory`] and
//! [`memory::InMemoryInventory`]. The former talks to the OpenStack identity and compute APIs.
//! The latter serves a scripted instance list and is handy for tests and for running without a
//! cloud.

use crate::error::Error;
use std::sync::Arc;

pub mod memory;
pub mod openstack;

#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryInventory;
#[allow(clippy::module_name_repetitions)]
pub use openstack::OpenStackInventory;

/// `DynInventorySource` is a type alias for an [`InventorySource`] shared between the refresh
/// loop and whoever else needs to poke at it.
#[allow(clippy::module_name_repetitions)]
pub type DynInventorySource = Arc<dyn InventorySource + Send + Sync>;

/// An async trait describing a source of compute instances.
#[async_trait::async_trait]
pub trait InventorySource {
    /// Fetch the current set of instances, or fail as a whole.
    async fn fetch(&self) -> Result<Vec<Instance>, Error>;
}

/// One compute instance as reported by an [`InventorySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub name: String,
    pub tenant_name: String,
    /// Addresses in the order the source reported them.
    pub addresses: Vec<AddressRecord>,
}

impl Instance {
    pub fn new(name: &str, tenant_name: &str, addresses: Vec<AddressRecord>) -> Self {
        Instance {
            name: name.to_string(),
            tenant_name: tenant_name.to_string(),
            addresses,
        }
    }

    /// The relative name the instance is served under, `<name>.<tenant_name>`.
    pub fn relative_name(&self) -> String {
        format!("{}.{}", self.name, self.tenant_name)
    }
}

/// A single address attached to an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    pub addr: String,
    pub version: u8,
    pub kind: AddressKind,
}

impl AddressRecord {
    pub fn floating_v4(addr: &str) -> Self {
        AddressRecord {
            addr: addr.to_string(),
            version: 4,
            kind: AddressKind::Floating,
        }
    }

    pub fn fixed_v4(addr: &str) -> Self {
        AddressRecord {
            addr: addr.to_string(),
            version: 4,
            kind: AddressKind::Fixed,
        }
    }

    pub fn is_floating_v4(&self) -> bool {
        self.kind == AddressKind::Floating && self.version == 4
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressKind {
    Floating,
    Fixed,
    Other(String),
}

impl From<&str> for AddressKind {
    fn from(s: &str) -> Self {
        match s {
            "floating" => AddressKind::Floating,
            "fixed" => AddressKind::Fixed,
            other => AddressKind::Other(other.to_string()),
        }
    }
}
