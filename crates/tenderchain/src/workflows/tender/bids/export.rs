use std::io::Write;

use serde::Serialize;

use super::domain::Bid;
use super::ranking::ranking_order;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write rankings csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("rankings csv is not valid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("failed to flush rankings csv: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct RankingRow<'a> {
    rank: Option<u32>,
    percentile: Option<u8>,
    bidder_company: &'a str,
    bid_amount: f64,
    ai_score: u8,
    overall: &'static str,
    status: &'static str,
    timeline_weeks: u32,
    experience_years: u32,
}

impl<'a> RankingRow<'a> {
    fn from_bid(bid: &'a Bid) -> Self {
        Self {
            rank: bid.rank,
            percentile: bid.percentile,
            bidder_company: &bid.bidder_company,
            bid_amount: bid.bid_amount,
            ai_score: bid.ai_score(),
            overall: bid
                .evaluation
                .as_ref()
                .map(|evaluation| evaluation.review.overall.label())
                .unwrap_or(""),
            status: bid.status.label(),
            timeline_weeks: bid.timeline_weeks,
            experience_years: bid.experience.years,
        }
    }
}

/// Write one CSV row per bid, best rank first. Unranked bids trail the ranked ones.
pub fn write_rankings_csv<W: Write>(writer: W, bids: &[Bid]) -> Result<(), ExportError> {
    let mut ordered: Vec<&Bid> = bids.iter().collect();
    ordered.sort_by(|a, b| {
        a.rank
            .unwrap_or(u32::MAX)
            .cmp(&b.rank.unwrap_or(u32::MAX))
            .then_with(|| ranking_order(a, b))
    });

    let mut csv = csv::Writer::from_writer(writer);
    for bid in ordered {
        csv.serialize(RankingRow::from_bid(bid))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn rankings_csv(bids: &[Bid]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_rankings_csv(&mut buffer, bids)?;
    Ok(String::from_utf8(buffer)?)
}
