use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::tender::bids::domain::{
    Bid, BidId, BidSubmission, ExperienceProfile, RankingUpdate,
};
use crate::workflows::tender::bids::repository::{
    BidderNotification, NotificationError, NotificationPublisher, RepositoryError,
    TenderRepository,
};
use crate::workflows::tender::bids::scoring::{BidScorer, ReviewRating};
use crate::workflows::tender::bids::{tender_router, BidReview, BidScore, TenderService};
use crate::workflows::tender::domain::{ProjectDraft, ProjectId, ProjectStatus, TenderProject};

pub(super) fn timestamp(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, day, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn project() -> TenderProject {
    TenderProject {
        id: ProjectId("prj-riverside".to_string()),
        title: "Riverside Clinic Extension".to_string(),
        category: "Healthcare".to_string(),
        budget: 1_000_000.0,
        duration: Some("12 months".to_string()),
        status: ProjectStatus::Open,
        deadline: timestamp(30),
        bid_count: 0,
        created_at: timestamp(1),
        status_reason: None,
        status_changed_at: None,
    }
}

pub(super) fn project_draft() -> ProjectDraft {
    ProjectDraft {
        title: "Riverside Clinic Extension".to_string(),
        category: "Healthcare".to_string(),
        budget: 1_000_000.0,
        duration: Some("12 months".to_string()),
        deadline: timestamp(30),
        draft: false,
    }
}

pub(super) fn proposal_of(length: usize) -> String {
    "p".repeat(length)
}

pub(super) fn qualifications(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("Certification {n}")).collect()
}

/// Bid that maxes out every factor against `project()`.
pub(super) fn submission_a() -> BidSubmission {
    BidSubmission {
        bidder_id: "user-apex".to_string(),
        company_name: "Apex Builders".to_string(),
        bid_amount: 800_000.0,
        proposal: proposal_of(1200),
        timeline_weeks: 40,
        experience: ExperienceProfile {
            years: 12,
            similar_projects: 18,
            team_size: 45,
        },
        qualifications: qualifications(6),
        references: vec!["City of Ames".to_string(), "Mercy Health".to_string()],
    }
}

/// Bid that lands in the lowest band of every factor against `project()`.
pub(super) fn submission_b() -> BidSubmission {
    BidSubmission {
        bidder_id: "user-budget".to_string(),
        company_name: "Budget Construct".to_string(),
        bid_amount: 1_200_000.0,
        proposal: proposal_of(150),
        timeline_weeks: 100,
        experience: ExperienceProfile {
            years: 1,
            similar_projects: 0,
            team_size: 4,
        },
        qualifications: Vec::new(),
        references: Vec::new(),
    }
}

pub(super) fn bid_from(id: &str, submission: BidSubmission) -> Bid {
    Bid::from_submission(
        BidId(id.to_string()),
        project().id,
        submission,
        timestamp(2),
    )
}

pub(super) fn scored(mut bid: Bid) -> Bid {
    bid.evaluation = Some(BidScorer::new().score(&bid, &project()));
    bid
}

/// Bid carrying an arbitrary score, for ranking tests that do not care how it was earned.
pub(super) fn bid_with_score(id: &str, score: u8, amount: f64) -> Bid {
    let mut bid = bid_from(
        id,
        BidSubmission {
            bidder_id: format!("user-{id}"),
            company_name: format!("Company {id}"),
            bid_amount: amount,
            proposal: proposal_of(300),
            ..BidSubmission::default()
        },
    );
    let mut evaluation = BidScorer::new().score(&bid, &project());
    evaluation.ai_score = score;
    evaluation.review = BidReview {
        overall: ReviewRating::from_score(score),
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        recommendation: ReviewRating::from_score(score).recommendation().to_string(),
    };
    bid.evaluation = Some(evaluation);
    bid
}

pub(super) fn with_submitted_at(mut bid: Bid, minutes: i64) -> Bid {
    bid.submitted_at = timestamp(2) + Duration::minutes(minutes);
    bid
}

pub(super) fn score_of(bid: &Bid) -> &BidScore {
    bid.evaluation.as_ref().expect("bid was scored")
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) projects: Arc<Mutex<HashMap<ProjectId, TenderProject>>>,
    pub(super) bids: Arc<Mutex<HashMap<BidId, Bid>>>,
}

impl MemoryRepository {
    pub(super) fn seed_project(&self, project: TenderProject) {
        self.projects
            .lock()
            .expect("project mutex poisoned")
            .insert(project.id.clone(), project);
    }

    pub(super) fn stored_bids(&self) -> Vec<Bid> {
        self.bids
            .lock()
            .expect("bid mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl TenderRepository for MemoryRepository {
    fn insert_project(&self, project: TenderProject) -> Result<TenderProject, RepositoryError> {
        let mut guard = self.projects.lock().expect("project mutex poisoned");
        if guard.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update_project(&self, project: TenderProject) -> Result<(), RepositoryError> {
        let mut guard = self.projects.lock().expect("project mutex poisoned");
        guard.insert(project.id.clone(), project);
        Ok(())
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<TenderProject>, RepositoryError> {
        let guard = self.projects.lock().expect("project mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn increment_bid_count(&self, id: &ProjectId) -> Result<u32, RepositoryError> {
        let mut guard = self.projects.lock().expect("project mutex poisoned");
        let project = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        project.bid_count += 1;
        Ok(project.bid_count)
    }

    fn insert_bid(&self, bid: Bid) -> Result<Bid, RepositoryError> {
        let mut guard = self.bids.lock().expect("bid mutex poisoned");
        if guard.contains_key(&bid.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(bid.id.clone(), bid.clone());
        Ok(bid)
    }

    fn update_bid(&self, bid: Bid) -> Result<(), RepositoryError> {
        let mut guard = self.bids.lock().expect("bid mutex poisoned");
        guard.insert(bid.id.clone(), bid);
        Ok(())
    }

    fn update_bid_ranking(&self, id: &BidId, update: RankingUpdate) -> Result<(), RepositoryError> {
        let mut guard = self.bids.lock().expect("bid mutex poisoned");
        let bid = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        bid.apply_ranking(update);
        Ok(())
    }

    fn fetch_bid(&self, id: &BidId) -> Result<Option<Bid>, RepositoryError> {
        let guard = self.bids.lock().expect("bid mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn bids_for_project(&self, id: &ProjectId) -> Result<Vec<Bid>, RepositoryError> {
        let guard = self.bids.lock().expect("bid mutex poisoned");
        Ok(guard
            .values()
            .filter(|bid| &bid.project_id == id)
            .cloned()
            .collect())
    }
}

/// Memory repository whose bid updates fail for selected companies, and whose bid counter
/// can be switched off.
#[derive(Default, Clone)]
pub(super) struct FlakyRepository {
    pub(super) inner: MemoryRepository,
    pub(super) failing_companies: Arc<Mutex<HashSet<String>>>,
    pub(super) failing_bid_count: Arc<AtomicBool>,
}

impl FlakyRepository {
    pub(super) fn fail_updates_for(&self, company: &str) {
        self.failing_companies
            .lock()
            .expect("flaky mutex poisoned")
            .insert(company.to_string());
    }

    pub(super) fn fail_bid_counts(&self) {
        self.failing_bid_count.store(true, Ordering::SeqCst);
    }

    fn fails_for(&self, company: &str) -> bool {
        self.failing_companies
            .lock()
            .expect("flaky mutex poisoned")
            .contains(company)
    }
}

impl TenderRepository for FlakyRepository {
    fn insert_project(&self, project: TenderProject) -> Result<TenderProject, RepositoryError> {
        self.inner.insert_project(project)
    }

    fn update_project(&self, project: TenderProject) -> Result<(), RepositoryError> {
        self.inner.update_project(project)
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<TenderProject>, RepositoryError> {
        self.inner.fetch_project(id)
    }

    fn increment_bid_count(&self, id: &ProjectId) -> Result<u32, RepositoryError> {
        if self.failing_bid_count.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("counter timeout".to_string()));
        }
        self.inner.increment_bid_count(id)
    }

    fn insert_bid(&self, bid: Bid) -> Result<Bid, RepositoryError> {
        self.inner.insert_bid(bid)
    }

    fn update_bid(&self, bid: Bid) -> Result<(), RepositoryError> {
        if self.fails_for(&bid.bidder_company) {
            return Err(RepositoryError::Unavailable("write timeout".to_string()));
        }
        self.inner.update_bid(bid)
    }

    fn update_bid_ranking(&self, id: &BidId, update: RankingUpdate) -> Result<(), RepositoryError> {
        let stored = self.inner.fetch_bid(id)?.ok_or(RepositoryError::NotFound)?;
        if self.fails_for(&stored.bidder_company) {
            return Err(RepositoryError::Unavailable("write timeout".to_string()));
        }
        self.inner.update_bid_ranking(id, update)
    }

    fn fetch_bid(&self, id: &BidId) -> Result<Option<Bid>, RepositoryError> {
        self.inner.fetch_bid(id)
    }

    fn bids_for_project(&self, id: &ProjectId) -> Result<Vec<Bid>, RepositoryError> {
        self.inner.bids_for_project(id)
    }
}

type StorageHook = Box<dyn FnOnce(&MemoryRepository) + Send>;

/// Memory repository that runs a one-shot hook right after a read returns, standing in for
/// an issuer decision that commits between the read and the next write.
#[derive(Default)]
pub(super) struct HookRepository {
    pub(super) inner: MemoryRepository,
    after_bid_snapshot: Mutex<Option<StorageHook>>,
    after_project_read: Mutex<Option<StorageHook>>,
}

impl HookRepository {
    pub(super) fn on_next_bid_snapshot(
        &self,
        hook: impl FnOnce(&MemoryRepository) + Send + 'static,
    ) {
        *self.after_bid_snapshot.lock().expect("hook mutex poisoned") = Some(Box::new(hook));
    }

    pub(super) fn on_next_project_read(
        &self,
        hook: impl FnOnce(&MemoryRepository) + Send + 'static,
    ) {
        *self.after_project_read.lock().expect("hook mutex poisoned") = Some(Box::new(hook));
    }

    fn fire(&self, slot: &Mutex<Option<StorageHook>>) {
        let hook = slot.lock().expect("hook mutex poisoned").take();
        if let Some(hook) = hook {
            hook(&self.inner);
        }
    }
}

impl TenderRepository for HookRepository {
    fn insert_project(&self, project: TenderProject) -> Result<TenderProject, RepositoryError> {
        self.inner.insert_project(project)
    }

    fn update_project(&self, project: TenderProject) -> Result<(), RepositoryError> {
        self.inner.update_project(project)
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<TenderProject>, RepositoryError> {
        let project = self.inner.fetch_project(id)?;
        self.fire(&self.after_project_read);
        Ok(project)
    }

    fn increment_bid_count(&self, id: &ProjectId) -> Result<u32, RepositoryError> {
        self.inner.increment_bid_count(id)
    }

    fn insert_bid(&self, bid: Bid) -> Result<Bid, RepositoryError> {
        self.inner.insert_bid(bid)
    }

    fn update_bid(&self, bid: Bid) -> Result<(), RepositoryError> {
        self.inner.update_bid(bid)
    }

    fn update_bid_ranking(&self, id: &BidId, update: RankingUpdate) -> Result<(), RepositoryError> {
        self.inner.update_bid_ranking(id, update)
    }

    fn fetch_bid(&self, id: &BidId) -> Result<Option<Bid>, RepositoryError> {
        self.inner.fetch_bid(id)
    }

    fn bids_for_project(&self, id: &ProjectId) -> Result<Vec<Bid>, RepositoryError> {
        let bids = self.inner.bids_for_project(id)?;
        self.fire(&self.after_bid_snapshot);
        Ok(bids)
    }
}

pub(super) fn build_hooked_service() -> (
    TenderService<HookRepository, MemoryNotifier>,
    Arc<HookRepository>,
) {
    let repository = Arc::new(HookRepository::default());
    repository.inner.seed_project(project());
    let service = TenderService::new(repository.clone(), Arc::new(MemoryNotifier::default()));
    (service, repository)
}

pub(super) struct UnavailableRepository;

impl TenderRepository for UnavailableRepository {
    fn insert_project(&self, _project: TenderProject) -> Result<TenderProject, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_project(&self, _project: TenderProject) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_project(&self, _id: &ProjectId) -> Result<Option<TenderProject>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn increment_bid_count(&self, _id: &ProjectId) -> Result<u32, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_bid(&self, _bid: Bid) -> Result<Bid, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_bid(&self, _bid: Bid) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_bid_ranking(&self, _id: &BidId, _update: RankingUpdate) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_bid(&self, _id: &BidId) -> Result<Option<Bid>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn bids_for_project(&self, _id: &ProjectId) -> Result<Vec<Bid>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<BidderNotification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<BidderNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotifier {
    fn publish(&self, notification: BidderNotification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl NotificationPublisher for OfflineNotifier {
    fn publish(&self, _notification: BidderNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay down".to_string()))
    }
}

pub(super) fn build_service() -> (
    TenderService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = TenderService::new(repository.clone(), notifier.clone());
    (service, repository, notifier)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: TenderService<MemoryRepository, MemoryNotifier>,
) -> axum::Router {
    tender_router(Arc::new(service))
}
