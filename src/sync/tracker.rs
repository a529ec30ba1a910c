use std::collections::HashSet;

use tracing::{info, warn};

use crate::config::YouTrackConfig;
use crate::error::SyncError;
use crate::model::card::PendingCard;
use crate::model::issue::{IssueLink, IssueTimeFields};
use crate::model::report::{CreationOutcome, IssueCreation};
use crate::providers::youtrack::{Issue, IssueCustomField, NewIssue};
use crate::providers::TrackerApi;

/// Tracker custom-field names the handler reads and writes.
#[derive(Debug, Clone)]
pub struct TrackerLabels {
    pub link_field: String,
    pub assignee_field: String,
    pub estimate_field: String,
    pub spent_time_field: String,
}

impl From<&YouTrackConfig> for TrackerLabels {
    fn from(config: &YouTrackConfig) -> Self {
        Self {
            link_field: config.link_field.clone(),
            assignee_field: config.assignee_field.clone(),
            estimate_field: config.estimate_field.clone(),
            spent_time_field: config.spent_time_field.clone(),
        }
    }
}

pub struct TrackerSync {
    api: Box<dyn TrackerApi>,
    labels: TrackerLabels,
}

impl TrackerSync {
    pub fn new(api: Box<dyn TrackerApi>, labels: TrackerLabels) -> Self {
        Self { api, labels }
    }

    async fn issues(&self) -> Result<Vec<Issue>, SyncError> {
        self.api
            .project_issues()
            .await
            .map_err(SyncError::api("listing tracker issues"))
    }

    fn link_url(&self, issue: &Issue) -> String {
        issue
            .custom_field(&self.labels.link_field)
            .and_then(IssueCustomField::text)
            .unwrap_or_default()
    }

    /// Presentation of the named period field; empty when unset or absent.
    fn period(&self, issue: &Issue, label: &str) -> String {
        issue
            .custom_fields
            .iter()
            .filter(|f| matches!(f, IssueCustomField::Period { .. }))
            .find(|f| f.name() == Some(label))
            .and_then(IssueCustomField::period_presentation)
            .unwrap_or_default()
            .to_string()
    }

    pub async fn list_issue_link_urls(&self) -> Result<Vec<IssueLink>, SyncError> {
        Ok(self
            .issues()
            .await?
            .iter()
            .map(|issue| IssueLink {
                issue_id: issue.id.clone(),
                link_url: self.link_url(issue),
            })
            .collect())
    }

    fn new_issue(&self, card: &PendingCard) -> NewIssue {
        let mut custom_fields = vec![IssueCustomField::link(&self.labels.link_field, &card.url)];
        if !card.assignee.is_empty() {
            custom_fields.push(IssueCustomField::user(
                &self.labels.assignee_field,
                &card.assignee,
            ));
        }
        NewIssue {
            summary: card.summary.clone(),
            description: card.description.clone(),
            custom_fields,
        }
    }

    /// Create an issue for every card whose URL no issue links to yet.
    /// Cards that are already linked do not appear in the result.
    pub async fn create_missing_issues(
        &self,
        cards: &[PendingCard],
    ) -> Result<Vec<IssueCreation>, SyncError> {
        let mut linked: HashSet<String> = self
            .list_issue_link_urls()
            .await?
            .into_iter()
            .map(|link| link.link_url)
            .filter(|url| !url.is_empty())
            .collect();

        let mut results = Vec::new();
        for card in cards {
            if card.url.is_empty() {
                warn!(card = %card.id, "card has no URL, cannot link an issue to it");
                continue;
            }
            if linked.contains(&card.url) {
                continue;
            }

            let outcome = match self.api.create_issue(&self.new_issue(card)).await {
                Ok(created) => {
                    info!(card = %card.id, issue = %created.id, "created issue");
                    linked.insert(card.url.clone());
                    CreationOutcome::Created {
                        issue_id: created.id,
                        id_readable: created.id_readable,
                    }
                }
                Err(err) => {
                    warn!(card = %card.id, error = %err, "issue creation failed");
                    CreationOutcome::failed(&err)
                }
            };
            results.push(IssueCreation {
                card_id: card.id.clone(),
                card_url: card.url.clone(),
                outcome,
            });
        }

        Ok(results)
    }

    pub async fn list_issues_with_time_fields(&self) -> Result<Vec<IssueTimeFields>, SyncError> {
        let issues = self.issues().await?;
        info!(count = issues.len(), "fetched tracker issues");
        Ok(issues
            .iter()
            .map(|issue| IssueTimeFields {
                issue_id: issue.id.clone(),
                link_url: self.link_url(issue),
                estimate: self.period(issue, &self.labels.estimate_field),
                fact: self.period(issue, &self.labels.spent_time_field),
            })
            .collect())
    }
}
