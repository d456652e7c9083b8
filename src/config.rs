use crate::error::Error;
use crate::resolver::MatchPolicy;
use ipnetwork::IpNetwork;
use lazy_static::lazy_static;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use trust_dns_server::client::rr::LowerName;

pub type SharedConfig = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub zone: LowerName,
    pub auth_url: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: Password,
    #[serde(default = "default_domain_name")]
    pub domain_name: String,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub wildcard: bool,
    #[serde(default)]
    pub ttl: u32,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: Duration,
    pub dns_udp_bind_addr: SocketAddr,
    pub dns_tcp_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub dns_tcp_timeout: Duration,
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
}

/// A password that never shows up in `Debug` output.
#[derive(Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Password(s.to_string())
    }
}

fn default_username() -> String {
    "coredns".to_string()
}

fn default_domain_name() -> String {
    "default".to_string()
}

fn default_region() -> String {
    "RegionOne".to_string()
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(1)
}

lazy_static! {
    // NOTE(XXX): Once the "ip" feature has stabilized we can use Ipv6Addr.is_unique_local[0].
    //            Presently this feature is unstable so we home-roll. See also RFC 4193[1].
    // [0]: https://doc.rust-lang.org/std/net/struct.Ipv6Addr.html#method.is_unique_local
    // [1]: https://www.rfc-editor.org/rfc/rfc4193.html
    static ref IPV6_UNIQUE_LOCAL_NETWORK: IpNetwork = IpNetwork::from_str("fc00::/7").unwrap();
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config =
            serde_json::from_reader(reader).map_err(|err| Error::Config(err.to_string()))?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn try_from_str(s: &str) -> Result<Self, Error> {
        let conf: Config = serde_json::from_str(s).map_err(|err| Error::Config(err.to_string()))?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy::from(self.wildcard)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.auth_url.trim().is_empty() {
            return Err(Error::Config("auth_url must not be empty".to_string()));
        }
        if self.refresh_interval.is_zero() {
            return Err(Error::Config(
                "refresh_interval must be at least one second".to_string(),
            ));
        }
        self.bind_addr_is_secure()
    }

    fn bind_addr_is_secure(&self) -> Result<(), Error> {
        match self.api_bind_addr {
            SocketAddr::V4(v4_addr) => {
                let ip = v4_addr.ip();
                if !ip.is_loopback() && !ip.is_private() {
                    return Err(Error::InsecureAPIBind(IpAddr::V4(*ip)));
                }
                Ok(())
            }
            SocketAddr::V6(v6_addr) => {
                let ip = v6_addr.ip();
                if !ip.is_loopback() && !IPV6_UNIQUE_LOCAL_NETWORK.contains(IpAddr::V6(*ip)) {
                    return Err(Error::InsecureAPIBind(IpAddr::V6(*ip)));
                }
                Ok(())
            }
        }
    }
}
