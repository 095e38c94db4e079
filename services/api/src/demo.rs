use crate::infra::{InMemoryNotificationPublisher, InMemoryTenderRepository};
use chrono::{Duration, Utc};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tenderchain::error::AppError;
use tenderchain::workflows::tender::bids::{
    BidReceipt, BidSubmission, ExperienceProfile, ProjectRankings, ProjectStatusChange,
    TenderService, TenderServiceError,
};
use tenderchain::workflows::tender::{ProjectDraft, ProjectStatus};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Project budget used for the walkthrough.
    #[arg(long)]
    pub(crate) budget: Option<f64>,
    /// Write the final rankings export to this CSV file.
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Skip closing the project at the end of the walkthrough.
    #[arg(long)]
    pub(crate) keep_open: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// JSON document of the form {"project": {...}, "bids": [...]}
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Write the rankings export to this CSV file.
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

/// Offline bid set scored and ranked without a running server.
#[derive(Debug, Deserialize)]
pub(crate) struct RankingDocument {
    pub(crate) project: ProjectDraft,
    #[serde(default)]
    pub(crate) bids: Vec<BidSubmission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct RejectedBid {
    pub(crate) company_name: String,
    pub(crate) reason: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankingOutcome {
    pub(crate) rankings: ProjectRankings,
    pub(crate) rejected: Vec<RejectedBid>,
    #[serde(skip)]
    pub(crate) csv: String,
}

type MemoryService = TenderService<InMemoryTenderRepository, InMemoryNotificationPublisher>;

fn memory_service() -> (MemoryService, Arc<InMemoryNotificationPublisher>) {
    let repository = Arc::new(InMemoryTenderRepository::default());
    let notifier = Arc::new(InMemoryNotificationPublisher::default());
    (TenderService::new(repository, notifier.clone()), notifier)
}

/// Submit every bid of the document in order. Intake rejections are collected, not fatal.
pub(crate) fn rank_document(document: RankingDocument) -> Result<RankingOutcome, AppError> {
    let (service, _) = memory_service();
    let mut draft = document.project;
    draft.draft = false;
    let project = service.create_project(draft)?;

    let mut rejected = Vec::new();
    for submission in document.bids {
        let company_name = submission.company_name.clone();
        match service.submit_bid(&project.id, submission) {
            Ok(_) => {}
            Err(TenderServiceError::Intake(violation)) => rejected.push(RejectedBid {
                company_name,
                reason: violation.to_string(),
            }),
            Err(error) => return Err(error.into()),
        }
    }

    Ok(RankingOutcome {
        rankings: service.rankings(&project.id)?,
        rejected,
        csv: service.export_rankings_csv(&project.id)?,
    })
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs { input, csv } = args;

    let raw = std::fs::read_to_string(&input)?;
    let document: RankingDocument = serde_json::from_str(&raw)?;
    let outcome = rank_document(document)?;

    render_rankings(&outcome.rankings);
    if !outcome.rejected.is_empty() {
        println!("\nRejected bids");
        for rejection in &outcome.rejected {
            println!("- {}: {}", rejection.company_name, rejection.reason);
        }
    }

    if let Some(path) = csv {
        std::fs::write(&path, &outcome.csv)?;
        println!("\nRankings written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        budget,
        csv,
        keep_open,
    } = args;

    println!("TenderChain bid evaluation demo");
    let (service, notifier) = memory_service();
    let project = service.create_project(ProjectDraft {
        title: "Riverside Clinic Extension".to_string(),
        category: "Healthcare".to_string(),
        budget: budget.unwrap_or(1_000_000.0),
        duration: Some("12 months".to_string()),
        deadline: Utc::now() + Duration::days(30),
        draft: false,
    })?;
    println!(
        "Project {} \"{}\" | budget {:.0} | duration {}",
        project.id.0,
        project.title,
        project.budget,
        project.duration.as_deref().unwrap_or("unspecified")
    );

    println!("\nSubmissions");
    for submission in demo_submissions() {
        let company = submission.company_name.clone();
        match service.submit_bid(&project.id, submission) {
            Ok(receipt) => render_receipt(&company, &receipt),
            Err(error) => println!("- {company}: rejected ({error})"),
        }
    }

    let analysis = match service.reanalyze_project(&project.id) {
        Ok(analysis) => analysis,
        Err(error) => {
            println!("\nRe-analysis unavailable: {error}");
            return Ok(());
        }
    };
    println!(
        "\nRe-analysis: {} bids | average {:.0} | lowest {:.0} | highest {:.0} | average score {}",
        analysis.analytics.total_bids,
        analysis.analytics.average_bid_amount,
        analysis.analytics.lowest_bid,
        analysis.analytics.highest_bid,
        analysis.analytics.average_score
    );
    if !analysis.recommendations.is_empty() {
        println!("Recommendations");
        for note in &analysis.recommendations {
            println!("- {note}");
        }
    }

    render_rankings(&service.rankings(&project.id)?);

    if !keep_open {
        let update = service.update_project_status(
            &project.id,
            ProjectStatusChange {
                status: ProjectStatus::Closed,
                reason: None,
            },
        )?;
        println!(
            "\nProject {} -> {} ({}) | {} bidders notified",
            update.project_id.0,
            update.status.label(),
            update.reason.as_deref().unwrap_or("no reason given"),
            update.notified_bidders
        );

        let late = BidSubmission {
            bidder_id: "user-late".to_string(),
            company_name: "Latecomer Partners".to_string(),
            bid_amount: 700_000.0,
            proposal: "Late proposal".to_string(),
            ..BidSubmission::default()
        };
        if let Err(error) = service.submit_bid(&project.id, late) {
            println!("Late bid rejected: {error}");
        }

        for notification in notifier.events() {
            println!("  - {} <- {}", notification.bidder_id, notification.title);
        }
    }

    if let Some(path) = csv {
        let export = service.export_rankings_csv(&project.id)?;
        std::fs::write(&path, export)?;
        println!("\nRankings written to {}", path.display());
    }

    Ok(())
}

fn render_receipt(company: &str, receipt: &BidReceipt) {
    let overall = receipt
        .review
        .as_ref()
        .map(|review| review.overall.label())
        .unwrap_or("unscored");
    println!(
        "- {company}: {} scored {} ({overall}), rank {} / percentile {}",
        receipt.bid_id.0,
        receipt.ai_score,
        receipt.rank.map_or("-".to_string(), |rank| rank.to_string()),
        receipt
            .percentile
            .map_or("-".to_string(), |percentile| percentile.to_string()),
    );
    if let Some(review) = &receipt.review {
        if !review.strengths.is_empty() {
            println!("    strengths: {}", review.strengths.join(", "));
        }
        if !review.weaknesses.is_empty() {
            println!("    weaknesses: {}", review.weaknesses.join(", "));
        }
    }
}

pub(crate) fn render_rankings(rankings: &ProjectRankings) {
    println!(
        "\nRankings for \"{}\" (budget {:.0}, {} bids)",
        rankings.project.title, rankings.project.budget, rankings.project.total_bids
    );
    for view in &rankings.ranked_bids {
        let bid = &view.bid;
        println!(
            "{:>3} | {:<24} | {:>12.0} | score {:>3} | {:>3}th pct | {}",
            bid.rank.map_or("-".to_string(), |rank| rank.to_string()),
            bid.bidder_company,
            bid.bid_amount,
            bid.ai_score(),
            bid.percentile.unwrap_or(0),
            view.competitive_advantage
        );
    }
}

fn demo_submissions() -> Vec<BidSubmission> {
    vec![
        BidSubmission {
            bidder_id: "user-apex".to_string(),
            company_name: "Apex Builders".to_string(),
            bid_amount: 800_000.0,
            proposal: "Phased construction plan with infection-control partitions. ".repeat(20),
            timeline_weeks: 40,
            experience: ExperienceProfile {
                years: 12,
                similar_projects: 18,
                team_size: 45,
            },
            qualifications: (1..=6).map(|n| format!("Healthcare build certification {n}")).collect(),
            references: vec!["Mercy Health".to_string()],
        },
        BidSubmission {
            bidder_id: "user-crest".to_string(),
            company_name: "Crest Civil".to_string(),
            bid_amount: 950_000.0,
            proposal: "Design-build delivery with a dedicated site manager. ".repeat(12),
            timeline_weeks: 52,
            experience: ExperienceProfile {
                years: 6,
                similar_projects: 5,
                team_size: 20,
            },
            qualifications: vec!["ISO 9001".to_string(), "OSHA 30".to_string(), "LEED AP".to_string()],
            references: Vec::new(),
        },
        BidSubmission {
            bidder_id: "user-budget".to_string(),
            company_name: "Budget Construct".to_string(),
            bid_amount: 1_200_000.0,
            proposal: "We can do the job with our small crew.".to_string(),
            timeline_weeks: 100,
            experience: ExperienceProfile {
                years: 1,
                similar_projects: 0,
                team_size: 4,
            },
            qualifications: Vec::new(),
            references: Vec::new(),
        },
        BidSubmission {
            bidder_id: "user-apex-2".to_string(),
            company_name: "Apex Builders".to_string(),
            bid_amount: 780_000.0,
            proposal: "Second attempt from the same company.".to_string(),
            ..BidSubmission::default()
        },
    ]
}
