#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Intent extraction, filtering and aggregation over surveillance records.
//!
//! A question flows through three pure steps:
//!
//! 1. [`intent::extract_intent`] turns free text into an [`Intent`].
//! 2. [`filter::filter`] selects the matching records from a snapshot.
//! 3. [`summary::summarize`] renders totals and a top-5 disease breakdown
//!    as plain lines, ready to be handed to a text generator.
//!
//! [`insights`] holds the richer per-disease and per-district analyses
//! used by the offline knowledge-base export and the CLI.
//!
//! [`Intent`]: surveillance_map_analytics_models::Intent

pub mod aggregate;
pub mod filter;
pub mod insights;
pub mod intent;
pub mod summary;

pub use filter::filter;
pub use intent::extract_intent;
pub use summary::summarize;

/// Region the dataset covers, used in generated sentences and prompts.
pub const REGION_NAME: &str = "Maharashtra";
