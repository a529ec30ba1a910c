use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::trello::{BoardList, Card, CustomField, Member};
use super::youtrack::{CreatedIssue, Issue, IssueCustomField, NewIssue, PeriodValue};
use super::{BoardApi, TrackerApi};
use crate::error::{ApiError, ApiResult};
use crate::model::card::{FieldDescriptor, FieldKind};

pub const LINK_FIELD: &str = "Trello Task";
pub const ESTIMATE_FIELD: &str = "Estimation";
pub const SPENT_FIELD: &str = "Spent time";

fn not_found(service: &'static str) -> ApiError {
    ApiError::Status {
        service,
        status: 404,
        message: "Not Found".into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWrite {
    pub card_id: String,
    pub field_id: String,
    pub value: String,
}

/// In-memory board that records custom-field writes.
#[derive(Default)]
pub struct FakeBoard {
    lists: Vec<BoardList>,
    cards: HashMap<String, Vec<Card>>,
    members: HashMap<String, Member>,
    fields: Vec<CustomField>,
    failing_fields: Vec<String>,
    pub writes: Arc<Mutex<Vec<FieldWrite>>>,
    pub member_lookups: Arc<Mutex<Vec<String>>>,
}

impl FakeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, id: &str, name: &str, cards: Vec<Card>) -> Self {
        self.lists.push(BoardList {
            id: id.into(),
            name: name.into(),
        });
        self.cards.insert(id.into(), cards);
        self
    }

    pub fn with_member(mut self, id: &str, username: &str) -> Self {
        self.members.insert(
            id.into(),
            Member {
                id: id.into(),
                username: username.into(),
            },
        );
        self
    }

    pub fn with_field(mut self, id: &str, name: &str, kind: FieldKind) -> Self {
        self.fields.push(CustomField {
            id: id.into(),
            name: name.into(),
            kind,
        });
        self
    }

    pub fn failing_field(mut self, id: &str) -> Self {
        self.failing_fields.push(id.into());
        self
    }

    /// Estimate and Fact text fields, the usual board setup.
    pub fn with_time_fields(self) -> Self {
        self.with_field("f-est", "Estimate", FieldKind::Text)
            .with_field("f-fact", "Fact", FieldKind::Text)
    }
}

pub fn card(id: &str, name: &str, url: &str, members: &[&str]) -> Card {
    Card {
        id: id.into(),
        name: name.into(),
        desc: Some(format!("about {name}")),
        url: Some(url.into()),
        id_members: members.iter().map(|m| m.to_string()).collect(),
        id_list: None,
    }
}

#[async_trait]
impl BoardApi for FakeBoard {
    async fn lists(&self) -> ApiResult<Vec<BoardList>> {
        Ok(self.lists.clone())
    }

    async fn list_cards(&self, list_id: &str) -> ApiResult<Vec<Card>> {
        self.cards
            .get(list_id)
            .cloned()
            .ok_or_else(|| not_found("Trello"))
    }

    async fn custom_fields(&self) -> ApiResult<Vec<CustomField>> {
        Ok(self.fields.clone())
    }

    async fn member(&self, member_id: &str) -> ApiResult<Member> {
        self.member_lookups.lock().unwrap().push(member_id.into());
        self.members
            .get(member_id)
            .cloned()
            .ok_or_else(|| not_found("Trello"))
    }

    async fn set_custom_field(
        &self,
        card_id: &str,
        field: &FieldDescriptor,
        value: &str,
    ) -> ApiResult<()> {
        if self.failing_fields.contains(&field.id) {
            return Err(ApiError::Status {
                service: "Trello",
                status: 400,
                message: "Bad Request: invalid value for custom field type".into(),
            });
        }
        self.writes.lock().unwrap().push(FieldWrite {
            card_id: card_id.into(),
            field_id: field.id.clone(),
            value: value.into(),
        });
        Ok(())
    }
}

/// In-memory tracker; created issues become visible to later listings.
#[derive(Default)]
pub struct FakeTracker {
    pub issues: Arc<Mutex<Vec<Issue>>>,
    pub created: Arc<Mutex<Vec<NewIssue>>>,
    failing_summaries: Vec<String>,
    fail_listing: bool,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(self, issue: Issue) -> Self {
        self.issues.lock().unwrap().push(issue);
        self
    }

    pub fn failing_create(mut self, summary: &str) -> Self {
        self.failing_summaries.push(summary.into());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }
}

fn period(name: &str, presentation: Option<&str>) -> IssueCustomField {
    IssueCustomField::Period {
        name: name.into(),
        value: presentation.map(|p| PeriodValue {
            presentation: Some(p.into()),
            minutes: None,
        }),
    }
}

/// Issue with the usual link/estimate/spent-time fields; `None` leaves a
/// field off (link) or unset (periods).
pub fn issue(id: &str, link: Option<&str>, estimate: Option<&str>, fact: Option<&str>) -> Issue {
    let mut custom_fields = Vec::new();
    if let Some(url) = link {
        custom_fields.push(IssueCustomField::link(LINK_FIELD, url));
    }
    custom_fields.push(period(ESTIMATE_FIELD, estimate));
    custom_fields.push(period(SPENT_FIELD, fact));
    Issue {
        id: id.into(),
        id_readable: Some(format!("DEMO-{id}")),
        summary: Some(format!("Issue {id}")),
        description: None,
        custom_fields,
    }
}

#[async_trait]
impl TrackerApi for FakeTracker {
    async fn project_issues(&self) -> ApiResult<Vec<Issue>> {
        if self.fail_listing {
            return Err(ApiError::Status {
                service: "YouTrack",
                status: 503,
                message: "Service Unavailable".into(),
            });
        }
        Ok(self.issues.lock().unwrap().clone())
    }

    async fn create_issue(&self, new_issue: &NewIssue) -> ApiResult<CreatedIssue> {
        if self.failing_summaries.contains(&new_issue.summary) {
            return Err(ApiError::Status {
                service: "YouTrack",
                status: 400,
                message: "Bad Request: unknown user".into(),
            });
        }

        let mut issues = self.issues.lock().unwrap();
        let number = issues.len() + 1;
        let id = format!("2-{number}");
        let id_readable = format!("DEMO-{number}");
        issues.push(Issue {
            id: id.clone(),
            id_readable: Some(id_readable.clone()),
            summary: Some(new_issue.summary.clone()),
            description: Some(new_issue.description.clone()),
            custom_fields: new_issue.custom_fields.clone(),
        });
        self.created.lock().unwrap().push(new_issue.clone());

        Ok(CreatedIssue {
            id,
            id_readable: Some(id_readable),
            summary: Some(new_issue.summary.clone()),
        })
    }
}

#[tokio::test]
async fn fake_tracker_lists_what_it_created() {
    let tracker = FakeTracker::new();
    let created = tracker
        .create_issue(&NewIssue {
            summary: "Fix login".into(),
            description: String::new(),
            custom_fields: vec![IssueCustomField::link(LINK_FIELD, "https://trello.com/c/1")],
        })
        .await
        .unwrap();

    let issues = tracker.project_issues().await.unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].id, created.id);
    assert_eq!(
        issues[0].custom_field(LINK_FIELD).and_then(|f| f.text()).as_deref(),
        Some("https://trello.com/c/1")
    );
}

#[tokio::test]
async fn board_api_works_behind_a_box() {
    let board: Box<dyn BoardApi> = Box::new(
        FakeBoard::new()
            .with_list("l1", "New", vec![card("c1", "One", "https://trello.com/c/1", &[])])
            .with_member("m1", "alice"),
    );

    assert_eq!(board.lists().await.unwrap().len(), 1);
    assert_eq!(board.member("m1").await.unwrap().username, "alice");
    assert_eq!(board.member("nobody").await.unwrap_err().status(), Some(404));
}
