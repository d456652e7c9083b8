//! Error types.

use std::net::IpAddr;
use trust_dns_server::proto::error::ProtoError;

/// Error enumerates the possible novacrab error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when the inventory source rejects the configured credentials, or when the
    /// identity endpoint can't be reached or answers with something other than a token.
    #[error("unable to authenticate: {0}")]
    Auth(String),

    /// Returned when listing tenants or instances from the inventory source fails. A refresh
    /// cycle that hits this error is abandoned and the previously published table is kept.
    #[error("unable to fetch {what}: {reason}")]
    Fetch {
        /// What was being listed, e.g. `"tenants"` or `"servers"`.
        what: &'static str,
        /// Why it failed.
        reason: String,
    },

    /// Returned when the configuration file holds an unknown option, an option with the wrong
    /// type or arity, or is missing a required option.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Returned when the [`Config::api_bind_addr`][`crate::config::Config::api_bind_addr`] is
    /// not a loopback address, or an address within a private network space. The
    /// [operator API][crate::api] exposes tenant and instance names and is only meant to be
    /// reachable from private networks.
    #[error("API bind address ({0}) must be a loopback or private IP")]
    InsecureAPIBind(IpAddr),

    /// Returned by the [`/lookup` API endpoint][crate::api] when no table
    /// entry matches the requested name.
    #[error("no address for \"{0}\"")]
    NameNotFound(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when the DNS server encounters a generic DNS protocol error.
    #[error("DNS error")]
    DNSError(#[from] ProtoError),
}

impl Error {
    pub(crate) fn fetch(what: &'static str, reason: impl ToString) -> Self {
        Error::Fetch {
            what,
            reason: reason.to_string(),
        }
    }
}
