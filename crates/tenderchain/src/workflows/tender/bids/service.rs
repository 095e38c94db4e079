use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::super::domain::{ProjectDraft, ProjectId, ProjectStatus, TenderProject};
use super::analytics::{ProjectAnalysis, ProjectRankings};
use super::domain::{Bid, BidId, BidReceipt, BidStatus, BidSubmission};
use super::export::{rankings_csv, ExportError};
use super::intake::{IntakeGuard, IntakeViolation};
use super::ranking::{assign_rankings, persist_rankings, RankingReport};
use super::repository::{
    BidderNotification, NotificationKind, NotificationPublisher, RepositoryError,
    TenderRepository,
};
use super::scoring::BidScorer;

/// Service composing intake checks, the scorer, the rank assigner, and storage.
///
/// Ranking passes and issuer status changes for a project run under that project's lock,
/// so rank writes never interleave and no bid lands on a project closed in the meantime.
pub struct TenderService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    guard: IntakeGuard,
    scorer: BidScorer,
    project_locks: Mutex<HashMap<ProjectId, Arc<Mutex<()>>>>,
}

static PROJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static BID_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_project_id() -> ProjectId {
    let id = PROJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProjectId(format!("prj-{id:06}"))
}

fn next_bid_id() -> BidId {
    let id = BID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BidId(format!("bid-{id:06}"))
}

impl<R, N> TenderService<R, N>
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            notifier,
            guard: IntakeGuard,
            scorer: BidScorer::new(),
            project_locks: Mutex::new(HashMap::new()),
        }
    }

    fn project_lock(&self, project_id: &ProjectId) -> Arc<Mutex<()>> {
        let mut locks = self
            .project_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(project_id.clone()).or_default().clone()
    }

    /// Post a new tender.
    pub fn create_project(&self, draft: ProjectDraft) -> Result<TenderProject, TenderServiceError> {
        let draft = self.guard.sanitize_project(draft)?;
        let project = TenderProject::from_draft(next_project_id(), draft, Utc::now());
        let stored = self.repository.insert_project(project)?;
        info!(
            project_id = %stored.id.0,
            budget = stored.budget,
            status = stored.status.label(),
            "tender project created"
        );
        Ok(stored)
    }

    pub fn project(&self, project_id: &ProjectId) -> Result<TenderProject, TenderServiceError> {
        self.repository
            .fetch_project(project_id)?
            .ok_or_else(|| TenderServiceError::ProjectNotFound(project_id.clone()))
    }

    pub fn bid(&self, bid_id: &BidId) -> Result<Bid, TenderServiceError> {
        self.repository
            .fetch_bid(bid_id)?
            .ok_or_else(|| TenderServiceError::BidNotFound(bid_id.clone()))
    }

    /// All bids of a project, most recent submission first.
    pub fn project_bids(&self, project_id: &ProjectId) -> Result<Vec<Bid>, TenderServiceError> {
        self.project(project_id)?;
        let mut bids = self.repository.bids_for_project(project_id)?;
        bids.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(bids)
    }

    /// Validate, score, and store a bid, then re-rank the whole project.
    pub fn submit_bid(
        &self,
        project_id: &ProjectId,
        submission: BidSubmission,
    ) -> Result<BidReceipt, TenderServiceError> {
        let result = self.accept_bid(project_id, submission);
        if let Err(error) = &result {
            warn!(project_id = %project_id.0, %error, "bid submission rejected");
        }
        result
    }

    fn accept_bid(
        &self,
        project_id: &ProjectId,
        submission: BidSubmission,
    ) -> Result<BidReceipt, TenderServiceError> {
        let submission = self.guard.sanitize_submission(submission)?;
        self.guard.ensure_accepting_bids(&self.project(project_id)?)?;

        let lock = self.project_lock(project_id);
        let _serialized = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Status may have changed while waiting for the lock.
        let project = self.project(project_id)?;
        self.guard.ensure_accepting_bids(&project)?;

        let mut bids = self.repository.bids_for_project(&project.id)?;
        self.guard.ensure_unique(&submission, &bids)?;

        let submitted_at = Utc::now();
        let mut bid = Bid::from_submission(next_bid_id(), project.id.clone(), submission, submitted_at);
        bid.evaluation = Some(self.scorer.score(&bid, &project));
        bid.analyzed_at = Some(submitted_at);

        let stored = self.repository.insert_bid(bid)?;
        // A counter failure is logged; the stored bid is still ranked.
        let bid_count = match self.repository.increment_bid_count(&project.id) {
            Ok(count) => Some(count),
            Err(error) => {
                warn!(
                    project_id = %project.id.0,
                    bid_id = %stored.id.0,
                    %error,
                    "failed to update project bid count"
                );
                None
            }
        };

        bids.push(stored.clone());
        let ranked = assign_rankings(bids);
        let report = persist_rankings(self.repository.as_ref(), &ranked);

        let placed = ranked
            .into_iter()
            .find(|bid| bid.id == stored.id)
            .unwrap_or(stored);

        info!(
            project_id = %project.id.0,
            bid_id = %placed.id.0,
            ai_score = placed.ai_score(),
            rank = placed.rank,
            bid_count = bid_count.unwrap_or(project.bid_count),
            bid_count_updated = bid_count.is_some(),
            ranking_failures = report.failed.len(),
            "bid submitted and ranked"
        );

        Ok(placed.receipt())
    }

    /// Recompute rank and percentile for every bid of a project from their stored scores.
    pub fn rerank_project(&self, project_id: &ProjectId) -> Result<RankingReport, TenderServiceError> {
        let project = self.project(project_id)?;
        let lock = self.project_lock(&project.id);
        let _serialized = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let bids = self.repository.bids_for_project(&project.id)?;
        let ranked = assign_rankings(bids);
        Ok(persist_rankings(self.repository.as_ref(), &ranked))
    }

    /// Score every bid of the project afresh, re-rank, and summarise the field.
    pub fn reanalyze_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<ProjectAnalysis, TenderServiceError> {
        let project = self.project(project_id)?;
        let lock = self.project_lock(&project.id);
        let _serialized = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut bids = self.repository.bids_for_project(&project.id)?;
        if bids.is_empty() {
            return Err(TenderServiceError::NoBids(project.id.clone()));
        }

        let analyzed_at = Utc::now();
        for bid in &mut bids {
            let score = self.scorer.score(bid, &project);
            bid.evaluation = Some(score);
            bid.analyzed_at = Some(analyzed_at);
        }

        // Scores and ranks land in a single write per bid.
        let ranked = assign_rankings(bids);
        let report = persist_rankings(self.repository.as_ref(), &ranked);

        info!(
            project_id = %project.id.0,
            analyzed = ranked.len(),
            failures = report.failed.len(),
            "project bids re-analyzed"
        );

        ProjectAnalysis::build(&project, ranked, report)
            .ok_or_else(|| TenderServiceError::NoBids(project.id.clone()))
    }

    /// Stored rankings and analytics without recomputing anything.
    pub fn rankings(&self, project_id: &ProjectId) -> Result<ProjectRankings, TenderServiceError> {
        let project = self.project(project_id)?;
        let bids = self.repository.bids_for_project(&project.id)?;
        Ok(ProjectRankings::build(&project, bids))
    }

    pub fn export_rankings_csv(&self, project_id: &ProjectId) -> Result<String, TenderServiceError> {
        let project = self.project(project_id)?;
        let bids = self.repository.bids_for_project(&project.id)?;
        Ok(rankings_csv(&bids)?)
    }

    /// Close, pause, or (re)open bidding and notify bidders still in contention.
    pub fn update_project_status(
        &self,
        project_id: &ProjectId,
        change: ProjectStatusChange,
    ) -> Result<ProjectStatusUpdate, TenderServiceError> {
        let lock = self.project_lock(project_id);
        let _serialized = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut project = self.project(project_id)?;
        let from = project.status;
        let to = change.status;

        let allowed = from != ProjectStatus::Awarded
            && matches!(
                to,
                ProjectStatus::Closed | ProjectStatus::Paused | ProjectStatus::Active
            );
        if !allowed {
            return Err(TenderServiceError::InvalidProjectTransition { from, to });
        }

        let (title, message, default_reason) = match to {
            ProjectStatus::Closed => (
                "Bidding Closed",
                format!(
                    "Bidding for \"{}\" has been closed. No new bids will be accepted.",
                    project.title
                ),
                Some("Bidding period ended"),
            ),
            ProjectStatus::Paused => (
                "Project Paused",
                format!(
                    "The project \"{}\" has been temporarily paused. We'll notify you when it resumes.",
                    project.title
                ),
                Some("Temporarily paused"),
            ),
            _ => (
                "Project Resumed",
                format!("The project \"{}\" is now accepting bids again.", project.title),
                None,
            ),
        };

        project.status = to;
        project.status_reason = change
            .reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty())
            .or_else(|| default_reason.map(str::to_string));
        project.status_changed_at = Some(Utc::now());
        self.repository.update_project(project.clone())?;

        let bids = self.repository.bids_for_project(&project.id)?;
        let mut notified_bidders = 0;
        for bid in bids.iter().filter(|bid| bid.status.is_active()) {
            let notification = BidderNotification {
                bidder_id: bid.bidder_id.clone(),
                project_id: project.id.clone(),
                kind: NotificationKind::ProjectStatusUpdate,
                title: title.to_string(),
                message: message.clone(),
            };
            match self.notifier.publish(notification) {
                Ok(()) => notified_bidders += 1,
                Err(error) => {
                    warn!(bid_id = %bid.id.0, %error, "failed to notify bidder of project status")
                }
            }
        }

        info!(
            project_id = %project.id.0,
            from = from.label(),
            to = to.label(),
            notified_bidders,
            "project status updated"
        );

        Ok(ProjectStatusUpdate {
            project_id: project.id,
            status: to,
            reason: project.status_reason,
            notified_bidders,
        })
    }

    /// Issuer decision on a bid. Awarding a bid also marks its project as awarded.
    pub fn update_bid_status(
        &self,
        bid_id: &BidId,
        status: BidStatus,
    ) -> Result<Bid, TenderServiceError> {
        if status == BidStatus::Submitted {
            return Err(TenderServiceError::InvalidBidTransition(status));
        }

        let project_id = self.bid(bid_id)?.project_id;
        let lock = self.project_lock(&project_id);
        let _serialized = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut bid = self.bid(bid_id)?;
        let mut project = self.project(&project_id)?;

        if status == BidStatus::Awarded {
            if project.status == ProjectStatus::Awarded {
                return Err(TenderServiceError::InvalidProjectTransition {
                    from: project.status,
                    to: ProjectStatus::Awarded,
                });
            }
            project.status = ProjectStatus::Awarded;
            project.status_reason = Some(format!("Awarded to {}", bid.bidder_company));
            project.status_changed_at = Some(Utc::now());
            self.repository.update_project(project.clone())?;
        }

        bid.status = status;
        self.repository.update_bid(bid.clone())?;

        let notification = BidderNotification {
            bidder_id: bid.bidder_id.clone(),
            project_id: project.id.clone(),
            kind: NotificationKind::BidStatusUpdate,
            title: "Bid Status Updated".to_string(),
            message: format!(
                "Your bid for \"{}\" is now {}.",
                project.title,
                status.label().replace('_', " ")
            ),
        };
        if let Err(error) = self.notifier.publish(notification) {
            warn!(bid_id = %bid.id.0, %error, "failed to notify bidder of bid status");
        }

        info!(bid_id = %bid.id.0, status = status.label(), "bid status updated");
        Ok(bid)
    }
}

/// Issuer request to move a project between bidding states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStatusChange {
    pub status: ProjectStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidStatusChange {
    pub status: BidStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStatusUpdate {
    pub project_id: ProjectId,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub notified_bidders: usize,
}

/// Error raised by the tender service.
#[derive(Debug, thiserror::Error)]
pub enum TenderServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Project not found")]
    ProjectNotFound(ProjectId),
    #[error("Bid not found")]
    BidNotFound(BidId),
    #[error("No bids found for this project")]
    NoBids(ProjectId),
    #[error("cannot move project from {} to {}", .from.label(), .to.label())]
    InvalidProjectTransition {
        from: ProjectStatus,
        to: ProjectStatus,
    },
    #[error("cannot set bid status to {}", .0.label())]
    InvalidBidTransition(BidStatus),
}
