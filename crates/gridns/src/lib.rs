// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # gridns - Name Service lookup client for clustered data grids
//!
//! Speaks the grid's multiplexed TCP protocol just far enough to open a
//! Name Service channel, resolve well-known names, and enumerate the
//! clusters sharing a Name Service port.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridns::{LookupConfig, Session, CLUSTER_NAME};
//!
//! fn main() -> Result<(), gridns::NsError> {
//!     let config = LookupConfig::default().with_timeout_secs(5);
//!     let mut session = Session::open("localhost:7574", &config)?;
//!
//!     println!("cluster: {}", session.lookup(CLUSTER_NAME)?);
//!     for port in session.discover_name_service_ports()? {
//!         println!("{} -> {}:{}", port.cluster_name, port.host, port.port);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! ```text
//! +-------------------------------------------------------------+
//! |  discovery   discover_clusters / cluster info / NS ports    |
//! +-------------------------------------------------------------+
//! |  session     Unconnected -> Negotiated -> Closed            |
//! +-------------------------------------------------------------+
//! |  lookup      request build / reply parse                    |
//! |  negotiate   connection + channel open, channel id          |
//! +-------------------------------------------------------------+
//! |  transport   framed TCP with an absolute deadline           |
//! |  codec       packed ints, frames, wire constants            |
//! +-------------------------------------------------------------+
//! ```

pub mod address;
pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod lookup;
pub mod negotiate;
pub mod session;
pub mod transport;

pub use address::{NsAddress, DEFAULT_HOST, DEFAULT_PORT};
pub use config::{ConfigError, LookupConfig, MAX_TIMEOUT_SECS};
pub use discovery::{
    discover_clusters, parse_results, sanitize_connection_name, ClusterNsPort, DiscoveredCluster,
    DiscoveryFailure, DiscoveryOptions, DiscoveryReport,
};
pub use error::NsError;
pub use lookup::{
    foreign_local_port, CLUSTER_FOREIGN, CLUSTER_INFO, CLUSTER_NAME, GRPC_PROXY, HEALTH_URL,
    JMX_URL, MANAGEMENT_URL, METRICS_URL, WELL_KNOWN_LOOKUPS,
};
pub use negotiate::ChannelId;
pub use session::Session;
