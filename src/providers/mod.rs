pub mod http;
pub mod trello;
pub mod youtrack;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::model::card::FieldDescriptor;
use trello::{BoardList, Card, CustomField, Member};
use youtrack::{CreatedIssue, Issue, NewIssue};

/// Calls the board handler needs from the kanban service.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn lists(&self) -> ApiResult<Vec<BoardList>>;
    async fn list_cards(&self, list_id: &str) -> ApiResult<Vec<Card>>;
    async fn custom_fields(&self) -> ApiResult<Vec<CustomField>>;
    async fn member(&self, member_id: &str) -> ApiResult<Member>;
    /// Write `value` into the card's item for `field`; an empty value clears it.
    async fn set_custom_field(
        &self,
        card_id: &str,
        field: &FieldDescriptor,
        value: &str,
    ) -> ApiResult<()>;
}

/// Calls the tracker handler needs from the issue tracker.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// Every issue of the configured project, with custom fields.
    async fn project_issues(&self) -> ApiResult<Vec<Issue>>;
    async fn create_issue(&self, issue: &NewIssue) -> ApiResult<CreatedIssue>;
}

#[cfg(test)]
pub mod tests;
