// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! gridns-ctl - Name Service lookup and cluster discovery CLI
//!
//! # Usage
//!
//! ```bash
//! # Every well-known lookup against localhost:7574
//! gridns-ctl nslookup
//!
//! # One lookup against a specific Name Service
//! gridns-ctl nslookup -q Cluster/name server1:7574
//!
//! # Local and foreign clusters sharing a port
//! gridns-ctl ports server1 server2:7575
//!
//! # Full two-phase scan, JSON output, skip unreachable hosts
//! gridns-ctl --format json -I discover server1 server2
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use gridns::{
    discover_clusters, ClusterNsPort, DiscoveredCluster, DiscoveryOptions, LookupConfig, NsError,
    Session, WELL_KNOWN_LOOKUPS,
};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{Table, Tabled};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Name Service lookup and cluster discovery
#[derive(Parser, Debug)]
#[command(name = "gridns-ctl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session timeout in seconds (overrides the config file)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Configuration file (JSON format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format: pretty, json
    #[arg(short = 'f', long, default_value = "pretty")]
    format: OutputFormat,

    /// Skip addresses that fail instead of aborting
    #[arg(short = 'I', long)]
    ignore_errors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up names on one or more Name Services
    Nslookup {
        /// Name to look up (default: every well-known name)
        #[arg(short, long)]
        query: Option<String>,

        /// Name Service addresses as host[:port]
        addresses: Vec<String>,
    },

    /// List the clusters registered on each Name Service port
    Ports {
        /// Name Service addresses as host[:port]
        addresses: Vec<String>,
    },

    /// Discover clusters and their management endpoints
    Discover {
        /// Seed Name Service addresses as host[:port]
        addresses: Vec<String>,
    },
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "p" => Ok(OutputFormat::Pretty),
            "json" | "j" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Debug, Serialize)]
struct LookupResult {
    address: String,
    name: String,
    value: String,
}

#[derive(Tabled)]
struct LookupRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "CLUSTER NAME")]
    cluster_name: String,
    #[tabled(rename = "HOST")]
    host: String,
    #[tabled(rename = "NS PORT")]
    port: u16,
    #[tabled(rename = "LOCAL")]
    local: String,
}

#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "CONNECTION")]
    connection: String,
    #[tabled(rename = "CLUSTER NAME")]
    cluster_name: String,
    #[tabled(rename = "HOST")]
    host: String,
    #[tabled(rename = "NS PORT")]
    ns_port: u16,
    #[tabled(rename = "MANAGEMENT URL")]
    management_url: String,
}

#[derive(Debug, Serialize)]
struct DiscoverOutput<'a> {
    name_service_ports: &'a [ClusterNsPort],
    clusters: &'a [DiscoveredCluster],
    failures: Vec<FailureOutput>,
}

#[derive(Debug, Serialize)]
struct FailureOutput {
    address: String,
    error: String,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // try_init also routes `log` records from the library into tracing.
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
}

fn load_config(args: &Args) -> Result<LookupConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            debug!("Loading config from {:?}", path);
            LookupConfig::from_file(path)?
        }
        None => LookupConfig::default(),
    };

    if let Some(timeout) = args.timeout {
        config = config.with_timeout_secs(timeout);
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;

    match &args.command {
        Commands::Nslookup { query, addresses } => {
            cmd_nslookup(args, &config, query.as_deref(), addresses)
        }
        Commands::Ports { addresses } => cmd_ports(args, &config, addresses),
        Commands::Discover { addresses } => cmd_discover(args, &config, addresses),
    }
}

/// Seed list, defaulting to localhost on the default port.
fn seeds(addresses: &[String]) -> Vec<&str> {
    if addresses.is_empty() {
        vec![""]
    } else {
        addresses.iter().map(String::as_str).collect()
    }
}

/// Report `error` and continue when errors are ignored, fail otherwise.
fn check(args: &Args, context: &str, error: NsError) -> Result<(), Box<dyn std::error::Error>> {
    if !args.ignore_errors {
        return Err(format!("{}: {}", context, error).into());
    }
    eprintln!("{} {}: {}", "Warning:".yellow().bold(), context, error);
    Ok(())
}

fn cmd_nslookup(
    args: &Args,
    config: &LookupConfig,
    query: Option<&str>,
    addresses: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let names: Vec<&str> = match query {
        Some(name) => vec![name],
        None => WELL_KNOWN_LOOKUPS.to_vec(),
    };

    let mut results = Vec::new();
    for address in seeds(addresses) {
        let outcome = Session::open(address, config).and_then(|mut session| {
            let label = session.address().to_string();
            let mut values = Vec::with_capacity(names.len());
            for name in &names {
                values.push(LookupResult {
                    address: label.clone(),
                    name: (*name).to_string(),
                    value: session.lookup(name)?,
                });
            }
            session.close();
            Ok(values)
        });

        match outcome {
            Ok(values) => results.extend(values),
            Err(e) => check(args, &format!("unable to look up on {}", address), e)?,
        }
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Pretty if query.is_some() => {
            for result in &results {
                println!("{}", result.value);
            }
        }
        OutputFormat::Pretty => {
            let mut current: Option<&str> = None;
            let mut rows = Vec::new();
            for result in &results {
                if current != Some(result.address.as_str()) {
                    flush_lookup_table(current, &mut rows);
                    current = Some(result.address.as_str());
                }
                rows.push(LookupRow {
                    name: result.name.clone(),
                    value: if result.value.is_empty() {
                        "-".to_string()
                    } else {
                        result.value.clone()
                    },
                });
            }
            flush_lookup_table(current, &mut rows);
        }
    }

    Ok(())
}

fn flush_lookup_table(address: Option<&str>, rows: &mut Vec<LookupRow>) {
    if let Some(address) = address {
        println!("{} {}", "Name Service".cyan().bold(), address);
        println!("{}", Table::new(rows.drain(..)));
        println!();
    }
}

fn cmd_ports(
    args: &Args,
    config: &LookupConfig,
    addresses: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ports = Vec::new();
    for address in seeds(addresses) {
        let outcome = Session::open(address, config).and_then(|mut session| {
            let found = session.discover_name_service_ports();
            session.close();
            found
        });

        match outcome {
            Ok(found) => ports.extend(found),
            Err(e) => check(args, &format!("unable to discover clusters on {}", address), e)?,
        }
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ports)?),
        OutputFormat::Pretty => {
            if ports.is_empty() {
                println!("  {}", "No Name Service ports found".yellow());
                return Ok(());
            }
            let rows: Vec<PortRow> = ports
                .iter()
                .map(|p| PortRow {
                    cluster_name: p.cluster_name.clone(),
                    host: p.host.clone(),
                    port: p.port,
                    local: if p.is_local { "yes" } else { "no" }.to_string(),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
    }

    Ok(())
}

fn cmd_discover(
    args: &Args,
    config: &LookupConfig,
    addresses: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let options = DiscoveryOptions {
        ignore_errors: args.ignore_errors,
    };

    if matches!(args.format, OutputFormat::Pretty) {
        println!(
            "Discovering clusters using {} ...",
            seeds(addresses)
                .iter()
                .map(|a| if a.is_empty() { "localhost" } else { *a })
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let report = discover_clusters(addresses, config, &options)?;

    let failures: Vec<FailureOutput> = report
        .failures
        .iter()
        .map(|f| FailureOutput {
            address: f.address.clone(),
            error: f.error.to_string(),
        })
        .collect();

    if matches!(args.format, OutputFormat::Json) {
        let output = DiscoverOutput {
            name_service_ports: &report.name_service_ports,
            clusters: &report.clusters,
            failures,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for failure in &failures {
        eprintln!(
            "{} skipped {}: {}",
            "Warning:".yellow().bold(),
            failure.address,
            failure.error
        );
    }

    let total = report.clusters.len();
    let without: Vec<&DiscoveredCluster> = report.without_management().collect();

    println!();
    println!("Clusters found:    {}", total);
    println!("Without Http Mgmt: {}", without.len());
    println!("With Http Mgmt:    {}", total - without.len());

    if !without.is_empty() {
        println!();
        println!(
            "{}",
            "The following clusters do not have Management over REST enabled:".yellow()
        );
        for cluster in &without {
            println!(
                "  Cluster: {}, Name Service address: {}",
                cluster.cluster_name,
                cluster.ns_address()
            );
        }
    }

    let rows: Vec<ClusterRow> = report
        .clusters
        .iter()
        .map(|c| ClusterRow {
            connection: c.connection_name.clone(),
            cluster_name: c.cluster_name.clone(),
            host: c.host.clone(),
            ns_port: c.ns_port,
            management_url: c.management_url().unwrap_or("-").to_string(),
        })
        .collect();

    if !rows.is_empty() {
        println!();
        println!("{}", Table::new(rows));
    }

    Ok(())
}
