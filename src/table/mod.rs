//! The name table served to DNS queries.
//!
//! A [`NameTable`] maps relative names of the form `<instance>.<tenant>` to the floating IPv4
//! addresses of that instance. Tables are built in full by the [refresh loop][crate::refresh]
//! and then published through a [`SharedTable`], which swaps them in as a whole.

use crate::inventory::Instance;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use tracing::warn;

pub mod shared;

pub use shared::SharedTable;

/// An immutable mapping from relative name to an ordered, non-empty list of IPv4 addresses.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct NameTable {
    entries: HashMap<String, Vec<Ipv4Addr>>,
}

impl NameTable {
    /// Build a table from one cycle's worth of instances.
    ///
    /// Only floating IPv4 addresses are kept, in the order the source reported them. Instances
    /// left without any such address get no entry. Addresses that don't parse are logged and
    /// skipped.
    ///
    /// When two instances map to the same relative name, the later one wins.
    pub fn build(instances: impl IntoIterator<Item = Instance>) -> Self {
        let mut entries: HashMap<String, Vec<Ipv4Addr>> = HashMap::new();
        for instance in instances {
            let key = instance.relative_name();
            let addrs = floating_v4(&key, &instance);
            if addrs.is_empty() {
                continue;
            }
            match entries.entry(key) {
                Entry::Occupied(mut e) => {
                    warn!(
                        "duplicate name \"{}\": replacing {:?} with {:?}",
                        e.key(),
                        e.get(),
                        addrs
                    );
                    e.insert(addrs);
                }
                Entry::Vacant(e) => {
                    e.insert(addrs);
                }
            }
        }
        NameTable { entries }
    }

    /// The addresses for an exact relative name, if any.
    pub fn get(&self, relative_name: &str) -> Option<&[Ipv4Addr]> {
        self.entries
            .get(relative_name)
            .map(Vec::as_slice)
            .filter(|addrs| !addrs.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Ipv4Addr])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<const N: usize> From<[(&str, Vec<Ipv4Addr>); N]> for NameTable {
    fn from(entries: [(&str, Vec<Ipv4Addr>); N]) -> Self {
        NameTable {
            entries: entries
                .into_iter()
                .filter(|(_, addrs)| !addrs.is_empty())
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

fn floating_v4(key: &str, instance: &Instance) -> Vec<Ipv4Addr> {
    instance
        .addresses
        .iter()
        .filter(|record| record.is_floating_v4())
        .filter_map(|record| match record.addr.parse::<Ipv4Addr>() {
            Ok(addr) => Some(addr),
            Err(err) => {
                warn!("skipping address \"{}\" of \"{key}\": {err}", record.addr);
                None
            }
        })
        .collect()
}
