use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::domain::{ProjectId, ProjectStatus, TenderProject};
use super::domain::Bid;
use super::ranking::{ranking_order, RankingReport};

/// How many of the best bids are highlighted in analysis responses.
pub const TOP_CANDIDATES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSnapshot {
    pub project_id: ProjectId,
    pub title: String,
    pub category: String,
    pub budget: f64,
    pub status: ProjectStatus,
    pub deadline: DateTime<Utc>,
    pub total_bids: usize,
}

impl ProjectSnapshot {
    pub fn of(project: &TenderProject, total_bids: usize) -> Self {
        Self {
            project_id: project.id.clone(),
            title: project.title.clone(),
            category: project.category.clone(),
            budget: project.budget,
            status: project.status,
            deadline: project.deadline,
            total_bids,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BudgetVariance {
    pub under_budget: usize,
    pub on_budget: usize,
    pub over_budget: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExperienceDistribution {
    /// 10 years or more.
    pub expert: usize,
    /// 5 to 9 years.
    pub experienced: usize,
    /// 2 to 4 years.
    pub intermediate: usize,
    /// Under 2 years.
    pub junior: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreDistribution {
    pub excellent: usize,
    pub good: usize,
    pub average: usize,
    pub poor: usize,
}

/// Aggregates computed from a project's bid set alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectAnalytics {
    pub total_bids: usize,
    pub average_bid_amount: f64,
    pub lowest_bid: f64,
    pub highest_bid: f64,
    pub average_score: u8,
    pub top_score: u8,
    pub budget_variance: BudgetVariance,
    pub experience_distribution: ExperienceDistribution,
    pub score_distribution: ScoreDistribution,
}

impl ProjectAnalytics {
    /// Returns `None` for an empty bid set, where averages are undefined.
    pub fn from_bids(bids: &[Bid], budget: f64) -> Option<Self> {
        if bids.is_empty() {
            return None;
        }

        let count = bids.len() as f64;
        let total_amount: f64 = bids.iter().map(|bid| bid.bid_amount).sum();
        let lowest_bid = bids
            .iter()
            .map(|bid| bid.bid_amount)
            .fold(f64::INFINITY, f64::min);
        let highest_bid = bids
            .iter()
            .map(|bid| bid.bid_amount)
            .fold(f64::NEG_INFINITY, f64::max);
        let total_score: u32 = bids.iter().map(|bid| u32::from(bid.ai_score())).sum();
        let top_score = bids.iter().map(Bid::ai_score).max().unwrap_or(0);

        let mut budget_variance = BudgetVariance::default();
        let mut experience_distribution = ExperienceDistribution::default();
        let mut score_distribution = ScoreDistribution::default();

        for bid in bids {
            if bid.bid_amount < budget {
                budget_variance.under_budget += 1;
            } else if bid.bid_amount > budget {
                budget_variance.over_budget += 1;
            } else {
                budget_variance.on_budget += 1;
            }

            match bid.experience.years {
                10.. => experience_distribution.expert += 1,
                5..=9 => experience_distribution.experienced += 1,
                2..=4 => experience_distribution.intermediate += 1,
                _ => experience_distribution.junior += 1,
            }

            match bid.ai_score() {
                80.. => score_distribution.excellent += 1,
                60..=79 => score_distribution.good += 1,
                40..=59 => score_distribution.average += 1,
                _ => score_distribution.poor += 1,
            }
        }

        Some(Self {
            total_bids: bids.len(),
            average_bid_amount: (total_amount / count).round(),
            lowest_bid,
            highest_bid,
            average_score: (f64::from(total_score) / count).round() as u8,
            top_score,
            budget_variance,
            experience_distribution,
            score_distribution,
        })
    }
}

/// Comparative label shown next to a bid's rank.
pub fn competitive_advantage(rank: u32) -> &'static str {
    match rank {
        1 => "Best overall bid",
        2 => "Strong alternative option",
        3 => "Solid third choice",
        4..=5 => "Worth considering",
        _ => "Under review",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBidView {
    #[serde(flatten)]
    pub bid: Bid,
    pub is_top_ranked: bool,
    pub competitive_advantage: &'static str,
}

impl RankedBidView {
    fn new(bid: Bid, is_top_ranked: bool) -> Self {
        let competitive_advantage = competitive_advantage(bid.rank.unwrap_or(0));
        Self {
            bid,
            is_top_ranked,
            competitive_advantage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub total_analyzed: usize,
    pub top_performers: usize,
    pub average_top_score: u8,
    pub budget_compliant_top5: usize,
}

impl AnalysisSummary {
    fn from_top(top: &[Bid], total_analyzed: usize, budget: f64) -> Self {
        let average_top_score = if top.is_empty() {
            0
        } else {
            let sum: u32 = top.iter().map(|bid| u32::from(bid.ai_score())).sum();
            (f64::from(sum) / top.len() as f64).round() as u8
        };

        Self {
            total_analyzed,
            top_performers: top.len(),
            average_top_score,
            budget_compliant_top5: top.iter().filter(|bid| bid.bid_amount <= budget).count(),
        }
    }
}

/// Issuer-facing advice derived from the ranked bid set.
pub fn recommendations(budget: f64, analytics: &ProjectAnalytics, ranked: &[Bid]) -> Vec<String> {
    let mut notes = Vec::new();
    let top = &ranked[..ranked.len().min(TOP_CANDIDATES)];

    if top.first().is_some_and(|bid| bid.bid_amount > budget) {
        notes.push(
            "Consider negotiating with top-ranked bidders as they exceed budget".to_string(),
        );
    }
    if analytics.average_bid_amount > budget * 1.1 {
        notes.push(
            "Budget may be too low - consider increasing or adjusting requirements".to_string(),
        );
    }
    if analytics.total_bids < 3 {
        notes.push(
            "Low bid count - consider extending deadline or improving project visibility"
                .to_string(),
        );
    }
    if analytics.score_distribution.excellent == 0 {
        notes.push(
            "No excellent bids found - review project requirements or extend deadline".to_string(),
        );
    }

    if let Some(best) = top.first() {
        if best.ai_score() >= 80 {
            notes.push(format!(
                "Top bid from {} shows excellent potential - recommend immediate consideration",
                best.bidder_company
            ));
        }
        if top.iter().any(|bid| bid.bid_amount <= budget) {
            notes.push("Multiple competitive bids within budget - good negotiation position".to_string());
        }
    }

    notes
}

/// Result of a full re-analysis pass over a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectAnalysis {
    pub project: ProjectSnapshot,
    pub analytics: ProjectAnalytics,
    pub recommendations: Vec<String>,
    pub top5: Vec<RankedBidView>,
    pub all_bids_ranked: Vec<Bid>,
    pub summary: AnalysisSummary,
    pub ranking: RankingReport,
}

impl ProjectAnalysis {
    /// `ranked` must already be in rank order. Returns `None` for an empty bid set.
    pub fn build(project: &TenderProject, ranked: Vec<Bid>, ranking: RankingReport) -> Option<Self> {
        let analytics = ProjectAnalytics::from_bids(&ranked, project.budget)?;
        let recommendations = recommendations(project.budget, &analytics, &ranked);
        let top = &ranked[..ranked.len().min(TOP_CANDIDATES)];
        let summary = AnalysisSummary::from_top(top, ranked.len(), project.budget);
        let top5 = top
            .iter()
            .cloned()
            .map(|bid| RankedBidView::new(bid, true))
            .collect();

        Some(Self {
            project: ProjectSnapshot::of(project, ranked.len()),
            analytics,
            recommendations,
            top5,
            all_bids_ranked: ranked,
            summary,
            ranking,
        })
    }
}

/// Read-only view over the stored rankings of a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRankings {
    pub project: ProjectSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<ProjectAnalytics>,
    pub ranked_bids: Vec<RankedBidView>,
    pub top5: Vec<RankedBidView>,
    pub summary: AnalysisSummary,
}

impl ProjectRankings {
    /// Orders stored bids by their persisted rank; bids that were never ranked go last.
    pub fn build(project: &TenderProject, mut bids: Vec<Bid>) -> Self {
        bids.sort_by(|a, b| {
            a.rank
                .unwrap_or(u32::MAX)
                .cmp(&b.rank.unwrap_or(u32::MAX))
                .then_with(|| ranking_order(a, b))
        });

        let analytics = ProjectAnalytics::from_bids(&bids, project.budget);
        let top_len = bids.len().min(TOP_CANDIDATES);
        let summary = AnalysisSummary::from_top(&bids[..top_len], bids.len(), project.budget);
        let ranked_bids: Vec<RankedBidView> = bids
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, bid)| RankedBidView::new(bid, index < TOP_CANDIDATES))
            .collect();
        let top5 = ranked_bids[..top_len].to_vec();

        Self {
            project: ProjectSnapshot::of(project, bids.len()),
            analytics,
            ranked_bids,
            top5,
            summary,
        }
    }
}
