//! Client library for the OASTH (Thessaloniki urban transport) open data
//! API.
//!
//! The upstream exposes the static description of the network — stops,
//! routes, lines, master lines and operating schedules — as ad-hoc
//! delimited text, plus a handful of live endpoints answering loose JSON.
//! This crate fetches the six static datasets with maximum safe
//! parallelism, parses their non-standard encodings and joins everything
//! into one immutable, cross-referenced [`domain::Snapshot`].
//!
//! ```no_run
//! use oasth_client::feed::SnapshotClient;
//! use oasth_client::transport::TransportConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SnapshotClient::new(TransportConfig::new())?;
//! let snapshot = client.snapshot(true).await?;
//! println!("{} lines in the network", snapshot.lines.len());
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod feed;
pub mod live;
pub mod transport;
