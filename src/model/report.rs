use serde::Serialize;

use crate::error::ApiError;

/// Outcome of one attempted issue creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueCreation {
    pub card_id: String,
    pub card_url: String,
    #[serde(flatten)]
    pub outcome: CreationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreationOutcome {
    Created {
        issue_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id_readable: Option<String>,
    },
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        http_status: Option<u16>,
        message: String,
    },
}

/// Outcome of writing one time value onto one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldUpdate {
    Updated {
        value: String,
    },
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        http_status: Option<u16>,
        message: String,
    },
    /// No call was made, e.g. the board has no field with the label.
    Skipped {
        reason: String,
    },
}

impl FieldUpdate {
    pub fn failed(err: &ApiError) -> Self {
        FieldUpdate::Failed {
            http_status: err.status(),
            message: err.to_string(),
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, FieldUpdate::Updated { .. })
    }
}

impl CreationOutcome {
    pub fn failed(err: &ApiError) -> Self {
        CreationOutcome::Failed {
            http_status: err.status(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardWriteBack {
    pub card_id: String,
    pub issue_id: String,
    pub estimate: FieldUpdate,
    pub fact: FieldUpdate,
}

/// An open card whose URL is stored on more than one tracker issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousLink {
    pub card_id: String,
    pub issue_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteBackReport {
    pub updated: Vec<CardWriteBack>,
    /// Open cards no tracker issue links to.
    pub unlinked: Vec<String>,
    pub ambiguous: Vec<AmbiguousLink>,
}

/// Everything one sync pass did, serialized as the pass's response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: Vec<IssueCreation>,
    #[serde(flatten)]
    pub write_back: WriteBackReport,
}
