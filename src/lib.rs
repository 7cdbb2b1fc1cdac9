//! Ride analytics over a Nextbike account history.
//!
//! A raw `list.json` batch is turned into typed rides and segments by
//! [`extract`], optionally narrowed by [`filter`], and summarized by the pure
//! functions in [`stats`]. [`report`] bundles every view in one value.

pub mod config;
pub mod distance;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod models;
pub mod output;
pub mod parser;
pub mod report;
pub mod stats;
