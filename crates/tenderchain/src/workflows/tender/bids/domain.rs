use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::ProjectId;
use super::scoring::{BidReview, BidScore};

/// Identifier wrapper for submitted bids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BidId(pub String);

/// Experience claims made by the bidding company. Missing values count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceProfile {
    #[serde(default)]
    pub years: u32,
    #[serde(default)]
    pub similar_projects: u32,
    #[serde(default)]
    pub team_size: u32,
}

/// Bidder payload collected by the submission form.
///
/// Text fields default to empty so intake can report which one is missing instead of
/// failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidSubmission {
    #[serde(default)]
    pub bidder_id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub bid_amount: f64,
    #[serde(default)]
    pub proposal: String,
    #[serde(default)]
    pub timeline_weeks: u32,
    #[serde(default)]
    pub experience: ExperienceProfile,
    #[serde(default)]
    pub qualifications: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

/// Issuer-driven lifecycle of a bid. The scorer never changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Submitted,
    UnderReview,
    Shortlisted,
    Awarded,
    Rejected,
}

impl BidStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BidStatus::Submitted => "submitted",
            BidStatus::UnderReview => "under_review",
            BidStatus::Shortlisted => "shortlisted",
            BidStatus::Awarded => "awarded",
            BidStatus::Rejected => "rejected",
        }
    }

    /// Bids still in contention receive project status notifications.
    pub const fn is_active(self) -> bool {
        matches!(self, BidStatus::Submitted | BidStatus::Shortlisted)
    }
}

/// Stored bid with the derived evaluation and standing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub project_id: ProjectId,
    pub bidder_id: String,
    pub bidder_company: String,
    pub bid_amount: f64,
    pub proposal: String,
    pub timeline_weeks: u32,
    pub experience: ExperienceProfile,
    pub qualifications: Vec<String>,
    pub references: Vec<String>,
    pub status: BidStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<BidScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<u8>,
}

impl Bid {
    pub fn from_submission(
        id: BidId,
        project_id: ProjectId,
        submission: BidSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project_id,
            bidder_id: submission.bidder_id,
            bidder_company: submission.company_name,
            bid_amount: submission.bid_amount,
            proposal: submission.proposal,
            timeline_weeks: submission.timeline_weeks,
            experience: submission.experience,
            qualifications: submission.qualifications,
            references: submission.references,
            status: BidStatus::Submitted,
            submitted_at,
            evaluation: None,
            analyzed_at: None,
            rank: None,
            percentile: None,
        }
    }

    /// Score used for ordering; bids that were never scored sort as zero.
    pub fn ai_score(&self) -> u8 {
        self.evaluation
            .as_ref()
            .map(|evaluation| evaluation.ai_score)
            .unwrap_or(0)
    }

    pub fn receipt(&self) -> BidReceipt {
        BidReceipt {
            bid_id: self.id.clone(),
            ai_score: self.ai_score(),
            review: self
                .evaluation
                .as_ref()
                .map(|evaluation| evaluation.review.clone()),
            rank: self.rank,
            percentile: self.percentile,
        }
    }
}

/// Response returned to the bidder after a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidReceipt {
    pub bid_id: BidId,
    pub ai_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<BidReview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<u8>,
}

/// Standing fields written back by a ranking pass.
///
/// Issuer-owned fields such as `status` are not part of it, so a ranking write can never
/// revert a shortlist or award.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingUpdate {
    pub rank: u32,
    pub percentile: u8,
    pub evaluation: Option<BidScore>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl RankingUpdate {
    /// Standing carried by a bid that went through `assign_rankings`.
    pub fn from_ranked(bid: &Bid) -> Option<Self> {
        Some(Self {
            rank: bid.rank?,
            percentile: bid.percentile?,
            evaluation: bid.evaluation.clone(),
            analyzed_at: bid.analyzed_at,
        })
    }
}

impl Bid {
    /// Apply a ranking write. Absent evaluation fields leave the stored ones alone.
    pub fn apply_ranking(&mut self, update: RankingUpdate) {
        self.rank = Some(update.rank);
        self.percentile = Some(update.percentile);
        if let Some(evaluation) = update.evaluation {
            self.evaluation = Some(evaluation);
        }
        if let Some(analyzed_at) = update.analyzed_at {
            self.analyzed_at = Some(analyzed_at);
        }
    }
}
