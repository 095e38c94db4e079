//! Bid intake, scoring, ranking, and analytics for tender projects.
//!
//! A submitted bid passes the intake guard, is scored by [`BidScorer`], stored, and then the
//! whole project is re-ranked. Re-analysis re-scores every bid of a project in one pass.

pub mod analytics;
pub mod domain;
pub mod export;
pub(crate) mod intake;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use analytics::{
    competitive_advantage, AnalysisSummary, BudgetVariance, ExperienceDistribution,
    ProjectAnalysis, ProjectAnalytics, ProjectRankings, ProjectSnapshot, RankedBidView,
    ScoreDistribution, TOP_CANDIDATES,
};
pub use domain::{
    Bid, BidId, BidReceipt, BidStatus, BidSubmission, ExperienceProfile, RankingUpdate,
};
pub use export::{rankings_csv, write_rankings_csv, ExportError};
pub use intake::IntakeViolation;
pub use ranking::{
    assign_rankings, percentile_for, persist_rankings, rank_bids, ranking_order, BidRanking,
    RankingFailure, RankingReport,
};
pub use repository::{
    BidderNotification, NotificationError, NotificationKind, NotificationPublisher,
    RepositoryError, TenderRepository,
};
pub use router::tender_router;
pub use scoring::{BidAnalysis, BidReview, BidScore, BidScorer, ReviewRating, ScoreBreakdown};
pub use service::{
    BidStatusChange, ProjectStatusChange, ProjectStatusUpdate, TenderService, TenderServiceError,
};
