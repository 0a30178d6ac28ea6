//! # Whois Resolver Library
//!
//! Resolves registration records for domains, IP addresses and AS numbers
//! over the plain WHOIS protocol (TCP port 43).
//!
//! ## Features
//!
//! - Authoritative server discovery through the IANA root
//! - Pinned lookups against a fixed server (e.g. RADB)
//! - Single-hop referral following, best effort
//! - Independent connect, write and read deadlines per query
//! - Raw response text, no field parsing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use whois_resolver::{Config, WhoisResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = WhoisResolver::new(Arc::new(Config::load()?));
//!
//!     let result = resolver.resolve("example.com").await?;
//!     println!("{}", result.raw_data);
//!
//!     let radb = resolver.resolve_with_server("AS15169", "whois.radb.net").await?;
//!     println!("{}", radb.raw_data);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod referral;
pub mod target;
pub mod transport;
pub mod whois;

// Re-export main types for easy access
pub use config::Config;
pub use errors::WhoisError;
pub use transport::{TcpTransport, WhoisTransport};
pub use whois::{WhoisResolver, WhoisResponse};
