//! Metabolomics Workbench REST client.
//!
//! This crate maps study lookups onto the Workbench REST API and folds every
//! failure into a uniform error payload, so callers on a tool boundary always
//! get well-formed JSON back.
//!
//! # Example
//!
//! ```no_run
//! use workbench::{Endpoint, WorkbenchClient, WorkbenchConfig};
//!
//! # async fn example() -> workbench::Result<()> {
//! let client = WorkbenchClient::new(WorkbenchConfig::default())?;
//!
//! let summary = client.lookup(Endpoint::StudySummary, Some("ST000001")).await;
//! println!("{}", summary.into_payload());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod endpoint;
mod error;
mod lookup;

pub use client::WorkbenchClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, WorkbenchConfig};
pub use endpoint::{DEFAULT_STUDY_ID, Endpoint};
pub use error::{Error, FetchError, Result};
pub use lookup::Lookup;
