//! Core of the TenderChain marketplace: tender projects, bid intake, deterministic bid
//! scoring, and per-project ranking.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
