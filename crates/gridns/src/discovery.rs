// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cluster enumeration on top of Name Service lookups.
//!
//! A single Name Service port can front several clusters: the cluster that
//! owns it plus any "foreign" clusters registered against it, each of which
//! also listens on its own ephemeral Name Service port. Discovery works in
//! two phases:
//!
//! 1. Ask each seed address for its local and foreign clusters
//!    ([`Session::discover_name_service_ports`]).
//! 2. Open one session per reported port and collect the cluster's
//!    endpoints ([`Session::discover_cluster_info`]).
//!
//! [`discover_clusters`] runs both phases, with phase 2 fanned out over
//! one thread per port.

use crate::address::NsAddress;
use crate::config::LookupConfig;
use crate::error::NsError;
use crate::lookup::{
    foreign_local_port, CLUSTER_FOREIGN, CLUSTER_NAME, JMX_URL, MANAGEMENT_URL, METRICS_URL,
};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::thread;

/// Characters removed from a cluster name to build a connection name.
const CONNECTION_NAME_STRIP: &[char] = &[
    '$', ',', ' ', '\'', '"', '(', ')', '[', ']', '\\', '*', '%', '^', '&', '#', '/', '@', ';',
    '!',
];

/// Endpoints published by one cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredCluster {
    pub cluster_name: String,
    /// Cluster name with shell- and URL-hostile characters removed.
    pub connection_name: String,
    pub ns_port: u16,
    pub host: String,
    pub management_urls: Vec<String>,
    pub metrics_urls: Vec<String>,
    pub jmx_urls: Vec<String>,
}

impl DiscoveredCluster {
    /// Check if Management over REST is published.
    pub fn has_management(&self) -> bool {
        !self.management_urls.is_empty()
    }

    /// First management URL, if any.
    pub fn management_url(&self) -> Option<&str> {
        self.management_urls.first().map(String::as_str)
    }

    /// Name Service address this cluster was read from.
    pub fn ns_address(&self) -> NsAddress {
        NsAddress::new(self.host.clone(), self.ns_port)
    }
}

/// A cluster and the Name Service port that answers for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterNsPort {
    pub host: String,
    pub cluster_name: String,
    pub port: u16,
    /// True for the cluster owning the queried port.
    pub is_local: bool,
}

impl ClusterNsPort {
    pub fn address(&self) -> NsAddress {
        NsAddress::new(self.host.clone(), self.port)
    }
}

/// Split a bracketed list value such as `"[a, b]"` into its items.
///
/// An empty value or an empty list yields no items.
pub fn parse_results(value: &str) -> Vec<String> {
    let inner: String = value.chars().filter(|c| *c != '[' && *c != ']').collect();
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(", ").map(str::to_owned).collect()
}

/// Strip characters that are unsafe in a connection name.
pub fn sanitize_connection_name(name: &str) -> String {
    name.chars()
        .filter(|c| !CONNECTION_NAME_STRIP.contains(c))
        .collect()
}

impl Session {
    /// Collect the name and published endpoints of the cluster behind this
    /// session.
    pub fn discover_cluster_info(&mut self) -> Result<DiscoveredCluster, NsError> {
        let cluster_name = self.lookup(CLUSTER_NAME)?;
        let management_urls = parse_results(&self.lookup(MANAGEMENT_URL)?);
        let jmx_urls = parse_results(&self.lookup(JMX_URL)?);
        let metrics_urls = parse_results(&self.lookup(METRICS_URL)?);

        Ok(DiscoveredCluster {
            connection_name: sanitize_connection_name(&cluster_name),
            cluster_name,
            ns_port: self.port(),
            host: self.host().to_string(),
            management_urls,
            metrics_urls,
            jmx_urls,
        })
    }

    /// List the local cluster and every foreign cluster registered on this
    /// Name Service port.
    ///
    /// The local cluster is always first; foreign clusters follow in the
    /// order the server reports them, without duplicates.
    pub fn discover_name_service_ports(&mut self) -> Result<Vec<ClusterNsPort>, NsError> {
        let local_name = self.lookup(CLUSTER_NAME)?;
        let foreign = parse_results(&self.lookup(CLUSTER_FOREIGN)?);

        let host = self.host().to_string();
        let mut ports = vec![ClusterNsPort {
            host: host.clone(),
            cluster_name: local_name.clone(),
            port: self.port(),
            is_local: true,
        }];

        let mut seen = HashSet::new();
        seen.insert(local_name);

        for cluster_name in foreign {
            if !seen.insert(cluster_name.clone()) {
                log::debug!("[gridns] skipping repeated foreign cluster {}", cluster_name);
                continue;
            }

            let name = foreign_local_port(&cluster_name);
            let value = self.lookup(&name)?;
            let port = match value.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(NsError::LookupValueMalformed { name, value }),
            };

            ports.push(ClusterNsPort {
                host: host.clone(),
                cluster_name,
                port,
                is_local: false,
            });
        }

        Ok(ports)
    }
}

/// Options for [`discover_clusters`].
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Record failing addresses and ports instead of aborting the scan.
    pub ignore_errors: bool,
}

/// An address or port skipped during a scan.
#[derive(Debug)]
pub struct DiscoveryFailure {
    pub address: String,
    pub error: NsError,
}

/// Result of a full scan.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Ports gathered in phase 1, de-duplicated, in seed order.
    pub name_service_ports: Vec<ClusterNsPort>,
    /// Clusters read in phase 2, in port order.
    pub clusters: Vec<DiscoveredCluster>,
    /// Failures skipped under `ignore_errors`.
    pub failures: Vec<DiscoveryFailure>,
}

impl DiscoveryReport {
    /// Clusters without Management over REST.
    pub fn without_management(&self) -> impl Iterator<Item = &DiscoveredCluster> {
        self.clusters.iter().filter(|c| !c.has_management())
    }
}

/// Discover every cluster reachable from the seed `addresses`.
///
/// An empty seed list scans `localhost` on the default port.
pub fn discover_clusters<S: AsRef<str>>(
    addresses: &[S],
    config: &LookupConfig,
    options: &DiscoveryOptions,
) -> Result<DiscoveryReport, NsError> {
    config.validate()?;

    let seeds: Vec<&str> = if addresses.is_empty() {
        vec![""]
    } else {
        addresses.iter().map(AsRef::as_ref).collect()
    };

    let mut report = DiscoveryReport::default();
    let mut seen = HashSet::new();

    for seed in seeds {
        let ports = Session::open(seed, config).and_then(|mut session| {
            let ports = session.discover_name_service_ports();
            session.close();
            ports
        });

        match ports {
            Ok(ports) => {
                for port in ports {
                    if seen.insert((port.host.clone(), port.port)) {
                        report.name_service_ports.push(port);
                    }
                }
            }
            Err(error) => record_failure(&mut report, options, seed_label(seed), error)?,
        }
    }

    if report.name_service_ports.is_empty() {
        return Err(NsError::NoEndpoints);
    }

    let results: Vec<Result<DiscoveredCluster, NsError>> = thread::scope(|scope| {
        let handles: Vec<_> = report
            .name_service_ports
            .iter()
            .map(|port| {
                let address = port.address();
                scope.spawn(move || {
                    log::debug!(
                        "[gridns] discovering cluster {} on {}",
                        port.cluster_name,
                        address
                    );
                    let mut session = Session::new(address, config.clone());
                    session.connect()?;
                    session.discover_cluster_info()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(NsError::Protocol("discovery worker panicked".into())))
            })
            .collect()
    });

    let addresses: Vec<String> = report
        .name_service_ports
        .iter()
        .map(|port| port.address().to_string())
        .collect();

    for (address, result) in addresses.into_iter().zip(results) {
        match result {
            Ok(cluster) => report.clusters.push(cluster),
            Err(error) => record_failure(&mut report, options, address, error)?,
        }
    }

    Ok(report)
}

fn seed_label(seed: &str) -> String {
    if seed.is_empty() {
        NsAddress::default().to_string()
    } else {
        seed.to_string()
    }
}

fn record_failure(
    report: &mut DiscoveryReport,
    options: &DiscoveryOptions,
    address: String,
    error: NsError,
) -> Result<(), NsError> {
    if !options.ignore_errors {
        return Err(error);
    }
    log::warn!("[gridns] skipping {}: {}", address, error);
    report.failures.push(DiscoveryFailure { address, error });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results() {
        assert!(parse_results("").is_empty());
        assert!(parse_results("[]").is_empty());
        assert_eq!(parse_results("[123]"), vec!["123"]);
        assert_eq!(parse_results("[123, 123]"), vec!["123", "123"]);
        assert_eq!(parse_results("[A, BB, CCC]"), vec!["A", "BB", "CCC"]);
    }

    #[test]
    fn test_parse_results_length_matches_items() {
        let mut rng = fastrand::Rng::with_seed(7);
        for n in 0..20 {
            let items: Vec<String> = (0..n)
                .map(|i| format!("http://host{}:{}/path", i, rng.u16(1024..)))
                .collect();
            let value = format!("[{}]", items.join(", "));
            assert_eq!(parse_results(&value), items);
        }
    }

    #[test]
    fn test_sanitize_connection_name() {
        assert_eq!(sanitize_connection_name("my-cluster"), "my-cluster");
        assert_eq!(sanitize_connection_name("my cluster (test)"), "myclustertest");
        assert_eq!(
            sanitize_connection_name("$a,b'c\"d[e]f\\g*h%i^j&k#l/m@n;o!"),
            "abcdefghijklmno"
        );
        assert_eq!(sanitize_connection_name(""), "");
    }

    #[test]
    fn test_discovered_cluster_helpers() {
        let mut cluster = DiscoveredCluster {
            cluster_name: "c1".into(),
            connection_name: "c1".into(),
            ns_port: 7574,
            host: "server".into(),
            ..Default::default()
        };
        assert!(!cluster.has_management());
        assert_eq!(cluster.management_url(), None);

        cluster.management_urls = vec![
            "http://a:30000/management".into(),
            "http://b:30000/management".into(),
        ];
        assert!(cluster.has_management());
        assert_eq!(cluster.management_url(), Some("http://a:30000/management"));
        assert_eq!(cluster.ns_address().to_string(), "server:7574");
    }

    #[test]
    fn test_cluster_ns_port_json() {
        let port = ClusterNsPort {
            host: "localhost".into(),
            cluster_name: "cluster1".into(),
            port: 7574,
            is_local: true,
        };
        let json = serde_json::to_string(&port).unwrap();
        assert!(json.contains("\"is_local\":true"));
        let back: ClusterNsPort = serde_json::from_str(&json).unwrap();
        assert_eq!(back, port);
        assert_eq!(back.address(), NsAddress::new("localhost", 7574));
    }

    #[test]
    fn test_discover_clusters_bad_seed() {
        let config = LookupConfig::default();
        let result = discover_clusters(&["host:80"], &config, &DiscoveryOptions::default());
        assert!(matches!(result, Err(NsError::AddressInvalid(_))));
    }

    #[test]
    fn test_discover_clusters_no_endpoints_when_all_skipped() {
        let config = LookupConfig::default();
        let options = DiscoveryOptions { ignore_errors: true };
        let result = discover_clusters(&["host:80", "host:1:2"], &config, &options);
        assert!(matches!(result, Err(NsError::NoEndpoints)));
    }
}
