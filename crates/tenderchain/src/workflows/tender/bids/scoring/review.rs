use serde::{Deserialize, Serialize};

use super::rules::ScoreSignals;
use super::{BidAnalysis, BidReview};

/// Overall verdict derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewRating {
    Excellent,
    Good,
    Average,
    Poor,
}

impl ReviewRating {
    pub const fn from_score(score: u8) -> Self {
        match score {
            80.. => ReviewRating::Excellent,
            60..=79 => ReviewRating::Good,
            40..=59 => ReviewRating::Average,
            _ => ReviewRating::Poor,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ReviewRating::Excellent => "Excellent",
            ReviewRating::Good => "Good",
            ReviewRating::Average => "Average",
            ReviewRating::Poor => "Poor",
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            ReviewRating::Excellent => "Highly recommended - Strong candidate for project award",
            ReviewRating::Good => "Recommended - Good candidate with minor areas for improvement",
            ReviewRating::Average => "Consider with caution - Several areas need improvement",
            ReviewRating::Poor => "Not recommended - Significant concerns identified",
        }
    }
}

// Strength cutoffs are not the point-band cutoffs: pricing counts as a strength up to a 0.9
// ratio while full price points stop at 0.8. Keep the two sets separate.
pub(crate) fn review_for(signals: &ScoreSignals, score: u8) -> BidReview {
    let mut strengths = Vec::new();
    if signals.price_ratio_at_most(0.9) {
        strengths.push("Competitive pricing".to_string());
    }
    if signals.proposal_length > 1000 {
        strengths.push("Comprehensive proposal".to_string());
    }
    if signals.experience_years >= 10 {
        strengths.push("Extensive experience".to_string());
    }
    if signals.qualification_count >= 5 {
        strengths.push("Highly qualified".to_string());
    }
    if signals.timeline_within(1.0) {
        strengths.push("Realistic timeline".to_string());
    }

    let mut weaknesses = Vec::new();
    if signals.price_ratio_above(1.1) {
        weaknesses.push("Price exceeds budget significantly".to_string());
    }
    if signals.proposal_length < 200 {
        weaknesses.push("Limited proposal details".to_string());
    }
    if signals.experience_years < 2 {
        weaknesses.push("Limited experience".to_string());
    }
    if signals.qualification_count < 1 {
        weaknesses.push("Insufficient qualifications".to_string());
    }
    if !signals.timeline_within(1.5) {
        weaknesses.push("Unrealistic timeline".to_string());
    }

    let overall = ReviewRating::from_score(score);
    BidReview {
        overall,
        strengths,
        weaknesses,
        recommendation: overall.recommendation().to_string(),
    }
}

pub(crate) fn analysis_for(signals: &ScoreSignals) -> BidAnalysis {
    let price_competitiveness = if signals.price_ratio_at_most(0.9) {
        "Excellent"
    } else if signals.price_ratio_at_most(1.0) {
        "Good"
    } else {
        "Needs improvement"
    };

    BidAnalysis {
        price_competitiveness: price_competitiveness.to_string(),
        proposal_quality: if signals.proposal_length > 500 {
            "Comprehensive"
        } else {
            "Basic"
        }
        .to_string(),
        experience: if signals.experience_years >= 5 {
            "Experienced"
        } else {
            "Limited"
        }
        .to_string(),
        qualifications: if signals.qualification_count >= 3 {
            "Well qualified"
        } else {
            "Basic"
        }
        .to_string(),
        timeline: if signals.timeline_within(1.0) {
            "Feasible"
        } else {
            "Extended"
        }
        .to_string(),
    }
}
