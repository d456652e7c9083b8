use crate::refresh::RefreshStatus;
use serde::Serialize;
use std::net::Ipv4Addr;
use time::format_description::well_known::Rfc3339;

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct StatusResult {
    pub entries: usize,
    pub refresh_cycles: u64,
    pub consecutive_failures: u64,
    pub last_success: Option<String>,
    pub last_error: Option<String>,
}

impl StatusResult {
    pub fn new(entries: usize, status: &RefreshStatus) -> Result<Self, time::error::Format> {
        let last_success = match status.last_success {
            Some(when) => Some(when.format(&Rfc3339)?),
            None => None,
        };
        Ok(StatusResult {
            entries,
            refresh_cycles: status.cycles,
            consecutive_failures: status.consecutive_failures,
            last_success,
            last_error: status.last_error.clone(),
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(super) struct LookupResult {
    pub name: String,
    pub address: Ipv4Addr,
}
