use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tenderchain::workflows::tender::bids::{
    Bid, BidId, BidderNotification, NotificationError, NotificationPublisher, RankingUpdate,
    RepositoryError, TenderRepository,
};
use tenderchain::workflows::tender::{ProjectId, TenderProject};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryTenderRepository {
    projects: Arc<Mutex<HashMap<ProjectId, TenderProject>>>,
    bids: Arc<Mutex<HashMap<BidId, Bid>>>,
}

impl InMemoryTenderRepository {
    fn projects(&self) -> std::sync::MutexGuard<'_, HashMap<ProjectId, TenderProject>> {
        self.projects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bids(&self) -> std::sync::MutexGuard<'_, HashMap<BidId, Bid>> {
        self.bids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TenderRepository for InMemoryTenderRepository {
    fn insert_project(&self, project: TenderProject) -> Result<TenderProject, RepositoryError> {
        let mut guard = self.projects();
        if guard.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update_project(&self, project: TenderProject) -> Result<(), RepositoryError> {
        let mut guard = self.projects();
        if guard.contains_key(&project.id) {
            guard.insert(project.id.clone(), project);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<TenderProject>, RepositoryError> {
        Ok(self.projects().get(id).cloned())
    }

    fn increment_bid_count(&self, id: &ProjectId) -> Result<u32, RepositoryError> {
        let mut guard = self.projects();
        let project = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        project.bid_count += 1;
        Ok(project.bid_count)
    }

    fn insert_bid(&self, bid: Bid) -> Result<Bid, RepositoryError> {
        let mut guard = self.bids();
        if guard.contains_key(&bid.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(bid.id.clone(), bid.clone());
        Ok(bid)
    }

    fn update_bid(&self, bid: Bid) -> Result<(), RepositoryError> {
        let mut guard = self.bids();
        if guard.contains_key(&bid.id) {
            guard.insert(bid.id.clone(), bid);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn update_bid_ranking(&self, id: &BidId, update: RankingUpdate) -> Result<(), RepositoryError> {
        let mut guard = self.bids();
        let bid = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        bid.apply_ranking(update);
        Ok(())
    }

    fn fetch_bid(&self, id: &BidId) -> Result<Option<Bid>, RepositoryError> {
        Ok(self.bids().get(id).cloned())
    }

    fn bids_for_project(&self, id: &ProjectId) -> Result<Vec<Bid>, RepositoryError> {
        Ok(self
            .bids()
            .values()
            .filter(|bid| &bid.project_id == id)
            .cloned()
            .collect())
    }
}

/// Notification sink that logs each message and keeps it for inspection.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<BidderNotification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: BidderNotification) -> Result<(), NotificationError> {
        info!(
            bidder_id = %notification.bidder_id,
            project_id = %notification.project_id.0,
            title = %notification.title,
            "bidder notification queued"
        );
        let mut guard = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<BidderNotification> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
