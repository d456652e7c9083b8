//! An OpenStack implementation of the [`InventorySource`][super::InventorySource] trait.
//!
//! Each fetch authenticates against Keystone v3 with the password method, lists every project
//! to map tenant IDs to names, then lists the servers of all tenants through Nova, following
//! pagination links until the last page.
//!
//! Servers and address records are parsed one at a time. A malformed record is logged and
//! skipped so that one odd server can't take the whole inventory down with it.

use crate::config::{Config, Password};
use crate::error::Error;
use crate::inventory::{AddressKind, AddressRecord, Instance, InventorySource};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// What's needed to obtain a token from Keystone.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub auth_url: String,
    pub username: String,
    pub password: Password,
    pub domain_name: String,
    pub project_name: Option<String>,
    pub region: String,
}

impl From<&Config> for Credentials {
    fn from(config: &Config) -> Self {
        Credentials {
            auth_url: config.auth_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            domain_name: config.domain_name.clone(),
            project_name: config.project_name.clone(),
            region: config.region.clone(),
        }
    }
}

/// An authenticated session: the token plus the service catalog it came with.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    identity_url: String,
    catalog: Vec<CatalogEntry>,
}

/// A server as listed by Nova, before its tenant ID has been mapped to a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawServer {
    pub name: String,
    pub tenant_id: String,
    pub addresses: Vec<AddressRecord>,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    token: Token,
}

#[derive(Deserialize, Debug)]
struct Token {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Deserialize, Debug, Clone)]
struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Deserialize, Debug, Clone)]
struct Endpoint {
    interface: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    region_id: Option<String>,
    url: String,
}

#[derive(Deserialize, Debug)]
struct ProjectsPage {
    projects: Vec<Value>,
    #[serde(default)]
    links: PageLinks,
}

#[derive(Deserialize, Debug, Default)]
struct PageLinks {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Project {
    id: String,
    name: String,
}

#[derive(Deserialize, Debug)]
struct ServersPage {
    servers: Vec<Value>,
    #[serde(default)]
    servers_links: Vec<Link>,
}

#[derive(Deserialize, Debug)]
struct Link {
    rel: String,
    href: String,
}

#[derive(Deserialize, Debug)]
struct ServerRecord {
    name: String,
    tenant_id: String,
    #[serde(default)]
    addresses: Map<String, Value>,
}

#[derive(Deserialize, Debug)]
struct AddressEntry {
    addr: String,
    version: u8,
    #[serde(rename = "OS-EXT-IPS:type", default)]
    kind: Option<String>,
}

#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct OpenStackInventory {
    client: reqwest::Client,
    credentials: Credentials,
}

impl OpenStackInventory {
    /// Build an inventory for the given credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client can't be initialized.
    pub fn new(credentials: Credentials) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| Error::Config(format!("unable to build HTTP client: {err}")))?;
        Ok(OpenStackInventory {
            client,
            credentials,
        })
    }

    /// Obtain a token for the configured user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if Keystone can't be reached, rejects the credentials, or
    /// answers without a token.
    pub async fn authenticate(&self) -> Result<Session, Error> {
        let identity_url = identity_url(&self.credentials.auth_url);
        let url = format!("{identity_url}/auth/tokens");
        let response = self
            .client
            .post(&url)
            .json(&auth_body(&self.credentials))
            .send()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("{status}: {body}")));
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::Auth(format!("response carries no {SUBJECT_TOKEN_HEADER}")))?;
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;

        debug!(
            "authenticated as \"{}\" ({} catalog entries)",
            self.credentials.username,
            body.token.catalog.len()
        );
        Ok(Session {
            token,
            identity_url,
            catalog: body.token.catalog,
        })
    }

    /// Map every project ID visible to the session to its name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] if any page of the listing can't be fetched.
    pub async fn list_tenants(&self, session: &Session) -> Result<HashMap<String, String>, Error> {
        let mut tenants = HashMap::new();
        let mut next = Some(format!("{}/projects", session.identity_url));
        while let Some(url) = next.take() {
            let page: ProjectsPage = self.get_page("tenants", &url, session).await?;
            for project in parse_each::<Project>("tenant", page.projects) {
                tenants.insert(project.id, project.name);
            }
            next = page.links.next.filter(|n| *n != url);
        }
        Ok(tenants)
    }

    /// List the servers of every tenant in the configured region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] if the session has no compute endpoint for the region, or if
    /// any page of the listing can't be fetched.
    pub async fn list_instances(&self, session: &Session) -> Result<Vec<RawServer>, Error> {
        let compute_url = compute_url(&session.catalog, &self.credentials.region)?;
        let mut servers = Vec::new();
        let mut next = Some(format!("{compute_url}/servers/detail?all_tenants=true"));
        while let Some(url) = next.take() {
            let page: ServersPage = self.get_page("servers", &url, session).await?;
            servers.extend(page.servers.into_iter().filter_map(parse_server));
            next = page
                .servers_links
                .into_iter()
                .find(|link| link.rel == "next")
                .map(|link| link.href)
                .filter(|n| *n != url);
        }
        Ok(servers)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        what: &'static str,
        url: &str,
        session: &Session,
    ) -> Result<T, Error> {
        let response = self
            .client
            .get(url)
            .header(AUTH_TOKEN_HEADER, &session.token)
            .send()
            .await
            .map_err(|err| Error::fetch(what, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::fetch(what, format!("{status}: {body}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| Error::fetch(what, err))
    }
}

#[async_trait::async_trait]
impl InventorySource for OpenStackInventory {
    async fn fetch(&self) -> Result<Vec<Instance>, Error> {
        let session = self.authenticate().await?;
        let tenants = self.list_tenants(&session).await?;
        let servers = self.list_instances(&session).await?;
        debug!(
            "listed {} servers across {} tenants",
            servers.len(),
            tenants.len()
        );
        Ok(attach_tenant_names(servers, &tenants))
    }
}

/// Normalize the configured auth URL to the Keystone v3 root.
fn identity_url(auth_url: &str) -> String {
    let trimmed = auth_url.trim_end_matches('/');
    if trimmed.ends_with("/v3") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v3")
    }
}

fn auth_body(credentials: &Credentials) -> Value {
    let mut body = json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": credentials.username,
                        "domain": { "name": credentials.domain_name },
                        "password": credentials.password.expose(),
                    }
                }
            }
        }
    });
    if let Some(project_name) = &credentials.project_name {
        body["auth"]["scope"] = json!({
            "project": {
                "name": project_name,
                "domain": { "name": credentials.domain_name },
            }
        });
    }
    body
}

fn compute_url(catalog: &[CatalogEntry], region: &str) -> Result<String, Error> {
    catalog
        .iter()
        .filter(|entry| entry.service_type == "compute")
        .flat_map(|entry| entry.endpoints.iter())
        .find(|endpoint| {
            endpoint.interface == "public"
                && (endpoint.region.as_deref() == Some(region)
                    || endpoint.region_id.as_deref() == Some(region))
        })
        .map(|endpoint| endpoint.url.trim_end_matches('/').to_string())
        .ok_or_else(|| {
            Error::fetch(
                "servers",
                format!("no public compute endpoint in region \"{region}\""),
            )
        })
}

fn parse_each<T: DeserializeOwned>(what: &str, values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!("skipping malformed {what} record: {err}");
                None
            }
        })
        .collect()
}

fn parse_server(value: Value) -> Option<RawServer> {
    let record: ServerRecord = match serde_json::from_value(value) {
        Ok(record) => record,
        Err(err) => {
            warn!("skipping malformed server record: {err}");
            return None;
        }
    };

    let mut addresses = Vec::new();
    for (network, entries) in record.addresses {
        match entries {
            Value::Array(entries) => {
                addresses.extend(
                    parse_each::<AddressEntry>("address", entries)
                        .into_iter()
                        .map(|entry| AddressRecord {
                            addr: entry.addr,
                            version: entry.version,
                            kind: entry
                                .kind
                                .as_deref()
                                .map_or(AddressKind::Other(String::new()), AddressKind::from),
                        }),
                );
            }
            _ => warn!(
                "skipping network \"{network}\" of server \"{}\": addresses are not a list",
                record.name
            ),
        }
    }

    Some(RawServer {
        name: record.name,
        tenant_id: record.tenant_id,
        addresses,
    })
}

fn attach_tenant_names(
    servers: Vec<RawServer>,
    tenants: &HashMap<String, String>,
) -> Vec<Instance> {
    servers
        .into_iter()
        .filter_map(|server| match tenants.get(&server.tenant_id) {
            Some(tenant_name) => Some(Instance {
                name: server.name,
                tenant_name: tenant_name.clone(),
                addresses: server.addresses,
            }),
            None => {
                warn!(
                    "skipping server \"{}\": unknown tenant \"{}\"",
                    server.name, server.tenant_id
                );
                None
            }
        })
        .collect()
}
