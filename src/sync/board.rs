use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::TrelloConfig;
use crate::error::{ApiResult, SyncError};
use crate::model::card::{FieldDescriptor, OpenCard, PendingCard, TimeFieldDescriptors};
use crate::model::issue::IssueTimeFields;
use crate::model::report::{AmbiguousLink, CardWriteBack, FieldUpdate, WriteBackReport};
use crate::providers::trello::Card;
use crate::providers::BoardApi;

/// Board names the handler matches against, all exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct BoardLabels {
    pub new_list: String,
    pub complete_list: String,
    pub estimate_field: String,
    pub fact_field: String,
}

impl From<&TrelloConfig> for BoardLabels {
    fn from(config: &TrelloConfig) -> Self {
        Self {
            new_list: config.new_list.clone(),
            complete_list: config.complete_list.clone(),
            estimate_field: config.estimate_field.clone(),
            fact_field: config.fact_field.clone(),
        }
    }
}

pub struct BoardSync {
    api: Box<dyn BoardApi>,
    labels: BoardLabels,
}

/// Look up the estimate and fact fields on `api`'s board. A label with no
/// matching field leaves its slot empty.
pub async fn resolve_field_descriptors_from(
    api: &dyn BoardApi,
    labels: &BoardLabels,
) -> ApiResult<TimeFieldDescriptors> {
    let fields = api.custom_fields().await?;
    let find = |label: &str| {
        fields
            .iter()
            .find(|f| f.name == label)
            .map(|f| FieldDescriptor {
                id: f.id.clone(),
                kind: f.kind,
            })
    };

    Ok(TimeFieldDescriptors {
        estimate: find(&labels.estimate_field),
        fact: find(&labels.fact_field),
    })
}

impl BoardSync {
    pub fn new(api: Box<dyn BoardApi>, labels: BoardLabels) -> Self {
        Self { api, labels }
    }

    pub fn api(&self) -> &dyn BoardApi {
        self.api.as_ref()
    }

    /// Cards of the "new" list, in board order, with assignee logins resolved.
    pub async fn fetch_unsynchronized_cards(&self) -> Result<Vec<PendingCard>, SyncError> {
        let lists = self
            .api
            .lists()
            .await
            .map_err(SyncError::api("listing board lists"))?;

        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        for list in lists.iter().filter(|l| l.name == self.labels.new_list) {
            let cards = self
                .api
                .list_cards(&list.id)
                .await
                .map_err(SyncError::api("listing new cards"))?;

            for card in cards {
                if !seen.insert(card.id.clone()) {
                    continue;
                }
                let assignee = self.assignee_login(&card).await?;
                pending.push(PendingCard {
                    summary: card.name,
                    description: card.desc.unwrap_or_default(),
                    url: card.url.unwrap_or_default(),
                    assignee,
                    id: card.id,
                });
            }
        }

        info!(count = pending.len(), list = %self.labels.new_list, "fetched new cards");
        Ok(pending)
    }

    async fn assignee_login(&self, card: &Card) -> Result<String, SyncError> {
        let Some(member_id) = card.id_members.first() else {
            return Ok(String::new());
        };
        self.resolve_member_login(member_id)
            .await
            .map_err(|source| SyncError::MemberLookup {
                card_id: card.id.clone(),
                member_id: member_id.clone(),
                source,
            })
    }

    /// Cards of every list except the complete one, as `{id, url}`.
    pub async fn fetch_open_cards(&self) -> Result<Vec<OpenCard>, SyncError> {
        let lists = self
            .api
            .lists()
            .await
            .map_err(SyncError::api("listing board lists"))?;

        let mut open = Vec::new();
        for list in lists.iter().filter(|l| l.name != self.labels.complete_list) {
            let cards = self
                .api
                .list_cards(&list.id)
                .await
                .map_err(SyncError::api("listing open cards"))?;
            open.extend(cards.into_iter().map(|card| OpenCard {
                id: card.id,
                url: card.url.unwrap_or_default(),
            }));
        }

        debug!(count = open.len(), "fetched open cards");
        Ok(open)
    }

    pub async fn resolve_field_descriptors(&self) -> Result<TimeFieldDescriptors, SyncError> {
        let descriptors = resolve_field_descriptors_from(self.api.as_ref(), &self.labels)
            .await
            .map_err(SyncError::api("listing board custom fields"))?;
        if descriptors.estimate.is_none() {
            warn!(label = %self.labels.estimate_field, "board has no estimate field");
        }
        if descriptors.fact.is_none() {
            warn!(label = %self.labels.fact_field, "board has no fact field");
        }
        Ok(descriptors)
    }

    pub async fn resolve_member_login(&self, member_id: &str) -> ApiResult<String> {
        Ok(self.api.member(member_id).await?.username)
    }

    /// Copy tracker time values onto the open cards their issues link to.
    pub async fn write_back_time_fields(
        &self,
        issues: &[IssueTimeFields],
    ) -> Result<WriteBackReport, SyncError> {
        let descriptors = self.resolve_field_descriptors().await?;
        let open_cards = self.fetch_open_cards().await?;

        let mut report = WriteBackReport::default();
        for card in open_cards {
            let linked: Vec<&IssueTimeFields> = if card.url.is_empty() {
                Vec::new()
            } else {
                issues.iter().filter(|i| i.link_url == card.url).collect()
            };

            match linked.as_slice() {
                [] => report.unlinked.push(card.id),
                [issue] => {
                    let estimate = self
                        .write_field(
                            &card.id,
                            descriptors.estimate.as_ref(),
                            &self.labels.estimate_field,
                            &issue.estimate,
                        )
                        .await;
                    let fact = self
                        .write_field(
                            &card.id,
                            descriptors.fact.as_ref(),
                            &self.labels.fact_field,
                            &issue.fact,
                        )
                        .await;
                    report.updated.push(CardWriteBack {
                        card_id: card.id,
                        issue_id: issue.issue_id.clone(),
                        estimate,
                        fact,
                    });
                }
                many => {
                    let issue_ids: Vec<String> = many.iter().map(|i| i.issue_id.clone()).collect();
                    warn!(
                        card = %card.id,
                        url = %card.url,
                        issues = ?issue_ids,
                        "card is linked from several issues, leaving its fields alone"
                    );
                    report.ambiguous.push(AmbiguousLink {
                        card_id: card.id,
                        issue_ids,
                    });
                }
            }
        }

        let incomplete = report
            .updated
            .iter()
            .filter(|u| !u.estimate.is_updated() || !u.fact.is_updated())
            .count();
        info!(
            updated = report.updated.len(),
            incomplete,
            unlinked = report.unlinked.len(),
            ambiguous = report.ambiguous.len(),
            "wrote back time fields"
        );
        Ok(report)
    }

    async fn write_field(
        &self,
        card_id: &str,
        descriptor: Option<&FieldDescriptor>,
        label: &str,
        value: &str,
    ) -> FieldUpdate {
        let Some(field) = descriptor else {
            return FieldUpdate::Skipped {
                reason: format!("no board field named \"{label}\""),
            };
        };

        match self.api.set_custom_field(card_id, field, value).await {
            Ok(()) => FieldUpdate::Updated {
                value: value.to_string(),
            },
            Err(err) => {
                warn!(card = %card_id, field = %field.id, error = %err, "field update failed");
                FieldUpdate::failed(&err)
            }
        }
    }
}
