use super::super::super::domain::TenderProject;
use super::super::domain::Bid;
use super::ScoreBreakdown;

/// Months assumed when a project's duration text carries no leading number.
pub const DEFAULT_DURATION_MONTHS: i64 = 12;
const WEEKS_PER_MONTH: i64 = 4;

/// Raw measurements taken from a bid; both the point bands and the review read these.
pub(crate) struct ScoreSignals {
    /// `None` when the project budget cannot serve as a divisor.
    pub price_ratio: Option<f64>,
    pub proposal_length: usize,
    pub experience_years: u32,
    pub qualification_count: usize,
    pub timeline_weeks: u32,
    pub expected_weeks: f64,
}

impl ScoreSignals {
    pub fn price_ratio_at_most(&self, limit: f64) -> bool {
        self.price_ratio.map(|ratio| ratio <= limit).unwrap_or(false)
    }

    /// An unknown ratio counts as exceeding every limit.
    pub fn price_ratio_above(&self, limit: f64) -> bool {
        self.price_ratio.map(|ratio| ratio > limit).unwrap_or(true)
    }

    pub fn timeline_within(&self, factor: f64) -> bool {
        f64::from(self.timeline_weeks) <= self.expected_weeks * factor
    }
}

pub(crate) fn collect_signals(bid: &Bid, project: &TenderProject) -> ScoreSignals {
    let price_ratio = if project.budget.is_finite() && project.budget > 0.0 {
        let ratio = bid.bid_amount / project.budget;
        ratio.is_finite().then_some(ratio)
    } else {
        None
    };

    ScoreSignals {
        price_ratio,
        proposal_length: bid.proposal.chars().count(),
        experience_years: bid.experience.years,
        qualification_count: bid.qualifications.len(),
        timeline_weeks: bid.timeline_weeks,
        expected_weeks: expected_timeline_weeks(project.duration.as_deref()),
    }
}

pub(crate) fn score_signals(signals: &ScoreSignals) -> ScoreBreakdown {
    ScoreBreakdown {
        price_competitiveness: price_points(signals.price_ratio),
        proposal_quality: proposal_points(signals.proposal_length),
        experience: experience_points(signals.experience_years),
        qualifications: qualification_points(signals.qualification_count),
        timeline: timeline_points(signals),
    }
}

fn price_points(ratio: Option<f64>) -> u8 {
    match ratio {
        Some(ratio) if ratio <= 0.8 => 30,
        Some(ratio) if ratio <= 0.9 => 25,
        Some(ratio) if ratio <= 1.0 => 20,
        Some(ratio) if ratio <= 1.1 => 15,
        _ => 10,
    }
}

fn proposal_points(length: usize) -> u8 {
    match length {
        length if length > 1000 => 25,
        length if length > 500 => 20,
        length if length > 200 => 15,
        _ => 10,
    }
}

fn experience_points(years: u32) -> u8 {
    match years {
        10.. => 20,
        5..=9 => 15,
        2..=4 => 10,
        _ => 5,
    }
}

fn qualification_points(count: usize) -> u8 {
    match count {
        5.. => 15,
        3..=4 => 12,
        1..=2 => 8,
        _ => 5,
    }
}

fn timeline_points(signals: &ScoreSignals) -> u8 {
    if signals.timeline_within(1.0) {
        10
    } else if signals.timeline_within(1.2) {
        8
    } else if signals.timeline_within(1.5) {
        5
    } else {
        2
    }
}

/// Expected delivery in weeks, estimated as four weeks per month of the project duration.
pub fn expected_timeline_weeks(duration: Option<&str>) -> f64 {
    let months = duration
        .and_then(leading_integer)
        .unwrap_or(DEFAULT_DURATION_MONTHS);
    (months.saturating_mul(WEEKS_PER_MONTH)) as f64
}

/// Parse the integer at the start of `text`, skipping leading whitespace and accepting a sign.
///
/// `"12 months"` yields 12, `"  -3wk"` yields -3, and `"about a year"` yields `None`.
pub fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let value = rest[..digits_end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}
