mod review;
mod rules;

pub use review::ReviewRating;
pub use rules::{expected_timeline_weeks, leading_integer, DEFAULT_DURATION_MONTHS};

use serde::{Deserialize, Serialize};

use super::super::domain::TenderProject;
use super::domain::Bid;

/// Stateless scorer turning a bid and its project into a 0-100 score with a written review.
///
/// The computation is pure: identical inputs always produce identical output, and no input
/// can make it fail. Degenerate inputs (zero budget, empty proposal, no experience) land in
/// the lowest band of the affected factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct BidScorer;

impl BidScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, bid: &Bid, project: &TenderProject) -> BidScore {
        let signals = rules::collect_signals(bid, project);
        let breakdown = rules::score_signals(&signals);
        let ai_score = breakdown.total();

        BidScore {
            ai_score,
            breakdown,
            analysis: review::analysis_for(&signals),
            review: review::review_for(&signals, ai_score),
            detailed_experience: DetailedExperience {
                years: bid.experience.years,
                similar_projects: bid.experience.similar_projects,
                team_size: bid.experience.team_size,
                specializations: bid.qualifications.clone(),
                references: bid.references.clone(),
            },
        }
    }
}

/// Full scorer output attached to a stored bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidScore {
    pub ai_score: u8,
    pub breakdown: ScoreBreakdown,
    pub analysis: BidAnalysis,
    pub review: BidReview,
    pub detailed_experience: DetailedExperience,
}

/// Points awarded per factor; the caps are 30/25/20/15/10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub price_competitiveness: u8,
    pub proposal_quality: u8,
    pub experience: u8,
    pub qualifications: u8,
    pub timeline: u8,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        self.price_competitiveness
            + self.proposal_quality
            + self.experience
            + self.qualifications
            + self.timeline
    }
}

/// Qualitative label per factor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidAnalysis {
    pub price_competitiveness: String,
    pub proposal_quality: String,
    pub experience: String,
    pub qualifications: String,
    pub timeline: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidReview {
    pub overall: ReviewRating,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: String,
}

/// Echo of the bidder's experience claims kept next to the score for reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedExperience {
    pub years: u32,
    pub similar_projects: u32,
    pub team_size: u32,
    pub specializations: Vec<String>,
    pub references: Vec<String>,
}
