//! Integration scenarios for bid submission, scoring, ranking, and re-analysis.
//!
//! Everything runs through the public service facade and HTTP router against an in-memory
//! repository.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};

    use tenderchain::workflows::tender::bids::{
        Bid, BidId, BidSubmission, BidderNotification, ExperienceProfile, NotificationError,
        NotificationPublisher, RankingUpdate, RepositoryError, TenderRepository, TenderService,
    };
    use tenderchain::workflows::tender::{ProjectDraft, ProjectId, TenderProject};

    pub(super) fn draft(budget: f64) -> ProjectDraft {
        ProjectDraft {
            title: "North Depot Roof Replacement".to_string(),
            category: "Commercial".to_string(),
            budget,
            duration: Some("6 months".to_string()),
            deadline: Utc
                .with_ymd_and_hms(2025, 11, 15, 17, 0, 0)
                .single()
                .expect("valid deadline"),
            draft: false,
        }
    }

    pub(super) fn submission(
        company: &str,
        amount: f64,
        proposal_len: usize,
        years: u32,
        qualifications: usize,
        weeks: u32,
    ) -> BidSubmission {
        BidSubmission {
            bidder_id: format!("user-{}", company.to_lowercase().replace(' ', "-")),
            company_name: company.to_string(),
            bid_amount: amount,
            proposal: "Scope and method. ".repeat(proposal_len / 18 + 1)[..proposal_len].to_string(),
            timeline_weeks: weeks,
            experience: ExperienceProfile {
                years,
                similar_projects: years * 2,
                team_size: 12,
            },
            qualifications: (0..qualifications)
                .map(|n| format!("License {n}"))
                .collect(),
            references: vec!["County Facilities".to_string()],
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryStore {
        projects: Mutex<HashMap<ProjectId, TenderProject>>,
        bids: Mutex<HashMap<BidId, Bid>>,
    }

    impl TenderRepository for MemoryStore {
        fn insert_project(&self, project: TenderProject) -> Result<TenderProject, RepositoryError> {
            let mut guard = self.projects.lock().expect("lock");
            if guard.contains_key(&project.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(project.id.clone(), project.clone());
            Ok(project)
        }

        fn update_project(&self, project: TenderProject) -> Result<(), RepositoryError> {
            self.projects
                .lock()
                .expect("lock")
                .insert(project.id.clone(), project);
            Ok(())
        }

        fn fetch_project(&self, id: &ProjectId) -> Result<Option<TenderProject>, RepositoryError> {
            Ok(self.projects.lock().expect("lock").get(id).cloned())
        }

        fn increment_bid_count(&self, id: &ProjectId) -> Result<u32, RepositoryError> {
            let mut guard = self.projects.lock().expect("lock");
            let project = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
            project.bid_count += 1;
            Ok(project.bid_count)
        }

        fn insert_bid(&self, bid: Bid) -> Result<Bid, RepositoryError> {
            self.bids
                .lock()
                .expect("lock")
                .insert(bid.id.clone(), bid.clone());
            Ok(bid)
        }

        fn update_bid(&self, bid: Bid) -> Result<(), RepositoryError> {
            self.bids.lock().expect("lock").insert(bid.id.clone(), bid);
            Ok(())
        }

        fn update_bid_ranking(
            &self,
            id: &BidId,
            update: RankingUpdate,
        ) -> Result<(), RepositoryError> {
            let mut guard = self.bids.lock().expect("lock");
            let bid = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
            bid.apply_ranking(update);
            Ok(())
        }

        fn fetch_bid(&self, id: &BidId) -> Result<Option<Bid>, RepositoryError> {
            Ok(self.bids.lock().expect("lock").get(id).cloned())
        }

        fn bids_for_project(&self, id: &ProjectId) -> Result<Vec<Bid>, RepositoryError> {
            Ok(self
                .bids
                .lock()
                .expect("lock")
                .values()
                .filter(|bid| &bid.project_id == id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub(super) struct Inbox {
        pub(super) received: Mutex<Vec<BidderNotification>>,
    }

    impl NotificationPublisher for Inbox {
        fn publish(&self, notification: BidderNotification) -> Result<(), NotificationError> {
            self.received.lock().expect("lock").push(notification);
            Ok(())
        }
    }

    pub(super) fn build_service() -> Arc<TenderService<MemoryStore, Inbox>> {
        Arc::new(TenderService::new(
            Arc::new(MemoryStore::default()),
            Arc::new(Inbox::default()),
        ))
    }
}

mod ranking {
    use super::common::*;
    use tenderchain::workflows::tender::bids::{ReviewRating, TenderServiceError};

    #[test]
    fn field_of_four_is_ranked_best_first() {
        let service = build_service();
        let project = service.create_project(draft(400_000.0)).expect("project");

        // 6 months -> 24 expected weeks.
        let entries = [
            submission("Keystone Roofing", 310_000.0, 1400, 15, 6, 22),
            submission("Summit Exteriors", 350_000.0, 700, 7, 3, 26),
            submission("Patchwork Repairs", 470_000.0, 120, 1, 0, 60),
            submission("Ridgeline Co", 390_000.0, 350, 3, 1, 28),
        ];
        for entry in entries {
            service.submit_bid(&project.id, entry).expect("bid accepted");
        }

        let rankings = service.rankings(&project.id).expect("rankings");
        let order: Vec<(&str, u8, Option<u32>, Option<u8>)> = rankings
            .ranked_bids
            .iter()
            .map(|view| {
                (
                    view.bid.bidder_company.as_str(),
                    view.bid.ai_score(),
                    view.bid.rank,
                    view.bid.percentile,
                )
            })
            .collect();

        assert_eq!(
            order,
            vec![
                ("Keystone Roofing", 100, Some(1), Some(100)),
                ("Summit Exteriors", 80, Some(2), Some(75)),
                ("Ridgeline Co", 61, Some(3), Some(50)),
                ("Patchwork Repairs", 32, Some(4), Some(25)),
            ]
        );
        assert_eq!(rankings.top5.len(), 4);
        assert_eq!(
            rankings.ranked_bids[0]
                .bid
                .evaluation
                .as_ref()
                .map(|score| score.review.overall),
            Some(ReviewRating::Excellent)
        );
        assert_eq!(service.project(&project.id).expect("project").bid_count, 4);
    }

    #[test]
    fn reanalysis_reports_recommendations_and_keeps_ranks_consistent() {
        let service = build_service();
        let project = service.create_project(draft(400_000.0)).expect("project");
        service
            .submit_bid(
                &project.id,
                submission("Keystone Roofing", 310_000.0, 1400, 15, 6, 22),
            )
            .expect("bid accepted");
        service
            .submit_bid(
                &project.id,
                submission("Patchwork Repairs", 470_000.0, 120, 1, 0, 60),
            )
            .expect("bid accepted");

        let analysis = service.reanalyze_project(&project.id).expect("analysis");

        assert_eq!(analysis.summary.total_analyzed, 2);
        assert_eq!(analysis.summary.budget_compliant_top5, 1);
        assert!(analysis
            .recommendations
            .iter()
            .any(|note| note.starts_with("Low bid count")));
        assert!(analysis
            .recommendations
            .iter()
            .any(|note| note.contains("Keystone Roofing")));
        let ranks: Vec<Option<u32>> = analysis
            .all_bids_ranked
            .iter()
            .map(|bid| bid.rank)
            .collect();
        assert_eq!(ranks, vec![Some(1), Some(2)]);
        assert!(analysis.ranking.is_complete());
    }

    #[test]
    fn closed_project_turns_bids_away() {
        let service = build_service();
        let project = service.create_project(draft(400_000.0)).expect("project");
        service
            .update_project_status(
                &project.id,
                tenderchain::workflows::tender::bids::ProjectStatusChange {
                    status: tenderchain::workflows::tender::ProjectStatus::Closed,
                    reason: None,
                },
            )
            .expect("closed");

        match service.submit_bid(
            &project.id,
            submission("Keystone Roofing", 310_000.0, 1400, 15, 6, 22),
        ) {
            Err(TenderServiceError::Intake(violation)) => {
                assert_eq!(
                    violation.to_string(),
                    "This project has been closed and is no longer accepting bids"
                );
            }
            other => panic!("expected closed project rejection, got {other:?}"),
        }
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tenderchain::workflows::tender::bids::tender_router;
    use tower::ServiceExt;

    #[tokio::test]
    async fn analysis_endpoint_returns_ranked_field() {
        let service = build_service();
        let project = service.create_project(draft(400_000.0)).expect("project");
        service
            .submit_bid(
                &project.id,
                submission("Summit Exteriors", 350_000.0, 700, 7, 3, 26),
            )
            .expect("bid accepted");
        let router = tender_router(service);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/projects/{}/analysis", project.id.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["summary"]["total_analyzed"], 1);
        assert_eq!(payload["top5"][0]["rank"], 1);
        assert_eq!(payload["top5"][0]["percentile"], 100);
        assert_eq!(payload["top5"][0]["competitive_advantage"], "Best overall bid");
        assert_eq!(payload["top5"][0]["evaluation"]["ai_score"], 80);
    }
}
