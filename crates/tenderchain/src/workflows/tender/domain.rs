use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for posted tenders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

/// Lifecycle of a tender as driven by its issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Open,
    Active,
    Paused,
    Closed,
    Awarded,
}

impl ProjectStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Open => "open",
            ProjectStatus::Active => "active",
            ProjectStatus::Paused => "paused",
            ProjectStatus::Closed => "closed",
            ProjectStatus::Awarded => "awarded",
        }
    }

    pub const fn accepts_bids(self) -> bool {
        matches!(self, ProjectStatus::Open | ProjectStatus::Active)
    }

    /// Message surfaced to bidders when a submission arrives outside the bidding window.
    pub const fn closure_message(self) -> &'static str {
        match self {
            ProjectStatus::Closed => "This project has been closed and is no longer accepting bids",
            ProjectStatus::Awarded => "This project has already been awarded",
            ProjectStatus::Paused => "This project is temporarily paused",
            _ => "Project is not accepting bids",
        }
    }
}

/// A construction tender open (or formerly open) for bidding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderProject {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub budget: f64,
    /// Free-text duration such as "12 months"; only the leading integer is interpreted.
    #[serde(default)]
    pub duration: Option<String>,
    pub status: ProjectStatus,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub bid_count: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_at: Option<DateTime<Utc>>,
}

impl TenderProject {
    /// Build a persisted project from an issuer draft.
    pub fn from_draft(id: ProjectId, draft: ProjectDraft, created_at: DateTime<Utc>) -> Self {
        let status = if draft.draft {
            ProjectStatus::Draft
        } else {
            ProjectStatus::Open
        };

        Self {
            id,
            title: draft.title.trim().to_string(),
            category: draft.category.trim().to_string(),
            budget: draft.budget,
            duration: draft
                .duration
                .map(|duration| duration.trim().to_string())
                .filter(|duration| !duration.is_empty()),
            status,
            deadline: draft.deadline,
            bid_count: 0,
            created_at,
            status_reason: None,
            status_changed_at: None,
        }
    }
}

/// Issuer payload used to post a new tender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub duration: Option<String>,
    pub deadline: DateTime<Utc>,
    /// Keep the project unpublished (status `draft`) instead of opening it for bids.
    #[serde(default)]
    pub draft: bool,
}
