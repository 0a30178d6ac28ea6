use crate::{
    config::Config,
    errors::WhoisError,
    referral::extract_server,
    target::{self, TargetKind},
    transport::{TcpTransport, WhoisTransport},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Raw text of one resolution and the servers that produced it, in query order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisResponse {
    pub target: String,
    pub servers: Vec<String>,
    pub raw_data: String,
}

pub struct WhoisResolver {
    config: Arc<Config>,
    transport: Arc<dyn WhoisTransport>,
}

impl WhoisResolver {
    pub fn new(config: Arc<Config>) -> Self {
        let transport = Arc::new(TcpTransport::new(&config));
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: Arc<Config>, transport: Arc<dyn WhoisTransport>) -> Self {
        info!(
            "WhoisResolver initialized (root server: {}, port: {})",
            config.root_server, config.whois_port
        );
        Self { config, transport }
    }

    /// Resolve a target, discovering its server through the root when needed.
    pub async fn resolve(&self, target: &str) -> Result<WhoisResponse, WhoisError> {
        self.lookup(target, None).await
    }

    /// Resolve a target against a fixed server, skipping root discovery.
    pub async fn resolve_with_server(&self, target: &str, server: &str) -> Result<WhoisResponse, WhoisError> {
        self.lookup(target, Some(server)).await
    }

    /// Perform a lookup. A blank `server` counts as no server.
    pub async fn lookup(&self, target: &str, server: Option<&str>) -> Result<WhoisResponse, WhoisError> {
        let target = target::normalize(target)?;
        let explicit = server.map(str::trim).filter(|s| !s.is_empty());

        let server = match explicit {
            Some(server) => server.to_lowercase(),
            None => {
                if target::classify(&target) == TargetKind::RootLabel {
                    debug!("{} is a bare label, asking {} directly", target, self.config.root_server);
                    let raw_data = self.transport.query(&target, &self.config.root_server).await?;
                    return Ok(WhoisResponse {
                        target,
                        servers: vec![self.config.root_server.clone()],
                        raw_data,
                    });
                }
                self.discover_server(&target).await?
            }
        };

        let mut raw_data = self.transport.query(&target, &server).await?;
        let mut servers = vec![server];

        if let Some(referral) = self.next_hop(&servers[0], &raw_data) {
            debug!("Following referral from {} to {}", servers[0], referral);
            match self.transport.query(&target, &referral).await {
                Ok(data) => {
                    raw_data.push_str(&data);
                    servers.push(referral);
                }
                Err(e) => {
                    warn!("Failed to query referral server {}: {}", referral, e);
                }
            }
        }

        Ok(WhoisResponse { target, servers, raw_data })
    }

    /// Ask the root server which registry is authoritative for the target's extension.
    async fn discover_server(&self, target: &str) -> Result<String, WhoisError> {
        let ext = target::extension(target);
        debug!("Querying root server {} for extension: {}", self.config.root_server, ext);

        let response = self.transport.query(ext, &self.config.root_server).await?;
        match extract_server(&response) {
            Some(server) => {
                debug!("Root server referred {} to {}", ext, server);
                Ok(server)
            }
            None => Err(WhoisError::NoServerFound(target.to_string())),
        }
    }

    fn next_hop(&self, queried: &str, data: &str) -> Option<String> {
        extract_server(data).filter(|referral| referral != queried)
    }
}
