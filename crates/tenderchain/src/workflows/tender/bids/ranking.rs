use std::cmp::Ordering;

use serde::Serialize;
use tracing::warn;

use super::domain::{Bid, BidId, RankingUpdate};
use super::repository::TenderRepository;

/// Standing of one bid inside its project's bid set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BidRanking {
    pub bid_id: BidId,
    pub rank: u32,
    pub percentile: u8,
}

/// Total order used for ranking: score descending, then cheaper bids first.
///
/// Submission time and id settle the remaining ties so the order never depends on
/// repository iteration order.
pub fn ranking_order(a: &Bid, b: &Bid) -> Ordering {
    b.ai_score()
        .cmp(&a.ai_score())
        .then_with(|| a.bid_amount.total_cmp(&b.bid_amount))
        .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// `round(((total - (rank - 1)) / total) * 100)`, with a lone bid pinned to 100.
pub fn percentile_for(rank: u32, total: u32) -> u8 {
    if total <= 1 {
        return 100;
    }
    let remaining = total.saturating_sub(rank.saturating_sub(1));
    let percentile = (f64::from(remaining) / f64::from(total) * 100.0).round();
    percentile.clamp(0.0, 100.0) as u8
}

/// Rank a project's scored bids. Ranks form the permutation `1..=N`.
pub fn rank_bids(bids: &[Bid]) -> Vec<BidRanking> {
    let mut ordered: Vec<&Bid> = bids.iter().collect();
    ordered.sort_by(|a, b| ranking_order(a, b));

    let total = ordered.len() as u32;
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, bid)| {
            let rank = index as u32 + 1;
            BidRanking {
                bid_id: bid.id.clone(),
                rank,
                percentile: percentile_for(rank, total),
            }
        })
        .collect()
}

/// Apply `rank_bids` to the bids themselves and return them in rank order.
pub fn assign_rankings(mut bids: Vec<Bid>) -> Vec<Bid> {
    bids.sort_by(ranking_order);
    let total = bids.len() as u32;
    for (index, bid) in bids.iter_mut().enumerate() {
        let rank = index as u32 + 1;
        bid.rank = Some(rank);
        bid.percentile = Some(percentile_for(rank, total));
    }
    bids
}

/// Write the standing of every ranked bid back, one update per bid.
///
/// Only rank, percentile, and evaluation are written. A failed write does not roll back
/// earlier ones; it is recorded in the report and the remaining bids are still written.
pub fn persist_rankings<R>(repository: &R, ranked: &[Bid]) -> RankingReport
where
    R: TenderRepository + ?Sized,
{
    let mut report = RankingReport::default();

    for bid in ranked {
        let Some(update) = RankingUpdate::from_ranked(bid) else {
            continue;
        };
        report.rankings.push(BidRanking {
            bid_id: bid.id.clone(),
            rank: update.rank,
            percentile: update.percentile,
        });

        match repository.update_bid_ranking(&bid.id, update) {
            Ok(()) => report.updated.push(bid.id.clone()),
            Err(error) => {
                warn!(bid_id = %bid.id.0, %error, "failed to persist bid ranking");
                report.failed.push(RankingFailure {
                    bid_id: bid.id.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    report
}

/// Outcome of a ranking pass over one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankingReport {
    pub rankings: Vec<BidRanking>,
    pub updated: Vec<BidId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<RankingFailure>,
}

impl RankingReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn ranking_for(&self, bid_id: &BidId) -> Option<&BidRanking> {
        self.rankings.iter().find(|ranking| &ranking.bid_id == bid_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingFailure {
    pub bid_id: BidId,
    pub error: String,
}
