use serde::{Deserialize, Serialize};

/// Card URL stored on a tracker issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    pub issue_id: String,
    /// Empty when the issue has no link field or the field is unset.
    pub link_url: String,
}

/// Time-tracking values of a tracker issue, as presentation strings ("2d 4h").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTimeFields {
    pub issue_id: String,
    pub link_url: String,
    pub estimate: String,
    pub fact: String,
}
