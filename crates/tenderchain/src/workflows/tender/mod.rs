//! Tender projects and the bid evaluation pipeline attached to them.

pub mod bids;
pub mod domain;

pub use domain::{ProjectDraft, ProjectId, ProjectStatus, TenderProject};
