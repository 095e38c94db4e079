use super::super::domain::{ProjectDraft, ProjectStatus, TenderProject};
use super::domain::{Bid, BidSubmission};

/// Rejections raised before a bid (or project) reaches scoring and storage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Bid amount must be a positive number")]
    InvalidBidAmount,
    #[error("Project budget must be a positive number")]
    InvalidBudget,
    #[error("{}", .0.closure_message())]
    NotAcceptingBids(ProjectStatus),
    #[error("You have already submitted a bid for this project")]
    DuplicateBidder,
    #[error(
        "Your company has already submitted a bid for this project. Only one bid per company is allowed."
    )]
    DuplicateCompany,
}

impl IntakeViolation {
    /// Malformed payloads, as opposed to well-formed requests that break a business rule.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            IntakeViolation::MissingField(_)
                | IntakeViolation::InvalidBidAmount
                | IntakeViolation::InvalidBudget
        )
    }
}

/// Gatekeeper for bid and project intake.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Check required fields and normalise free text. Numeric experience fields are left as
    /// submitted: missing values already default to zero.
    pub fn sanitize_submission(
        &self,
        mut submission: BidSubmission,
    ) -> Result<BidSubmission, IntakeViolation> {
        submission.bidder_id = submission.bidder_id.trim().to_string();
        submission.company_name = submission.company_name.trim().to_string();

        if submission.bidder_id.is_empty() {
            return Err(IntakeViolation::MissingField("bidder_id"));
        }
        if submission.company_name.is_empty() {
            return Err(IntakeViolation::MissingField("company_name"));
        }
        if !(submission.bid_amount.is_finite() && submission.bid_amount > 0.0) {
            return Err(IntakeViolation::InvalidBidAmount);
        }
        if submission.proposal.trim().is_empty() {
            return Err(IntakeViolation::MissingField("proposal"));
        }

        Ok(submission)
    }

    pub fn ensure_accepting_bids(&self, project: &TenderProject) -> Result<(), IntakeViolation> {
        if project.status.accepts_bids() {
            Ok(())
        } else {
            Err(IntakeViolation::NotAcceptingBids(project.status))
        }
    }

    /// One bid per bidder account and one per company name within a project.
    pub fn ensure_unique(
        &self,
        submission: &BidSubmission,
        existing: &[Bid],
    ) -> Result<(), IntakeViolation> {
        if existing
            .iter()
            .any(|bid| bid.bidder_id == submission.bidder_id)
        {
            return Err(IntakeViolation::DuplicateBidder);
        }

        if existing
            .iter()
            .any(|bid| bid.bidder_company == submission.company_name)
        {
            return Err(IntakeViolation::DuplicateCompany);
        }

        Ok(())
    }

    pub fn sanitize_project(&self, draft: ProjectDraft) -> Result<ProjectDraft, IntakeViolation> {
        if draft.title.trim().is_empty() {
            return Err(IntakeViolation::MissingField("title"));
        }
        if !(draft.budget.is_finite() && draft.budget > 0.0) {
            return Err(IntakeViolation::InvalidBudget);
        }
        Ok(draft)
    }
}
