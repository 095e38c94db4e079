use serde::{Deserialize, Serialize};

use super::super::domain::{ProjectId, TenderProject};
use super::domain::{Bid, BidId, RankingUpdate};

/// Storage abstraction over projects and their bids so the service can run against any
/// document store (or an in-memory map in tests and demos).
pub trait TenderRepository: Send + Sync {
    fn insert_project(&self, project: TenderProject) -> Result<TenderProject, RepositoryError>;
    fn update_project(&self, project: TenderProject) -> Result<(), RepositoryError>;
    fn fetch_project(&self, id: &ProjectId) -> Result<Option<TenderProject>, RepositoryError>;
    /// Atomically bump the project's bid counter, returning the new count.
    fn increment_bid_count(&self, id: &ProjectId) -> Result<u32, RepositoryError>;

    fn insert_bid(&self, bid: Bid) -> Result<Bid, RepositoryError>;
    fn update_bid(&self, bid: Bid) -> Result<(), RepositoryError>;
    /// Set rank, percentile, and evaluation on a stored bid without touching other fields.
    fn update_bid_ranking(&self, id: &BidId, update: RankingUpdate) -> Result<(), RepositoryError>;
    fn fetch_bid(&self, id: &BidId) -> Result<Option<Bid>, RepositoryError>;
    fn bids_for_project(&self, id: &ProjectId) -> Result<Vec<Bid>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound channel for bidder notifications (e-mail, in-app inbox, ...).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: BidderNotification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ProjectStatusUpdate,
    BidStatusUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidderNotification {
    pub bidder_id: String,
    pub project_id: ProjectId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
