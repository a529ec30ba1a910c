use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use super::http::{build_client, send_json};
use super::TrackerApi;
use crate::config::YouTrackConfig;
use crate::error::ApiResult;

const SERVICE: &str = "YouTrack";
const PAGE_SIZE: usize = 100;

/// Projection used for every issue listing.
const ISSUE_FIELDS: &str = "id,idReadable,summary,description,\
customFields($type,id,name,value($type,login,name,presentation,minutes,text))";

pub struct YouTrackClient {
    base_url: String,
    token: String,
    project_id: String,
    page_size: usize,
    client: reqwest::Client,
}

impl YouTrackClient {
    pub fn new(config: &YouTrackConfig, timeout: Duration) -> ApiResult<Self> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            project_id: config.project_id.clone(),
            page_size: PAGE_SIZE,
            client: build_client(SERVICE, timeout)?,
        })
    }

    #[cfg(test)]
    fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    pub async fn projects(&self) -> ApiResult<Vec<Project>> {
        send_json(
            SERVICE,
            self.get("admin/projects")
                .query(&[("fields", "id,name,shortName")]),
        )
        .await
    }

    pub async fn project_custom_fields(&self) -> ApiResult<Vec<ProjectCustomField>> {
        send_json(
            SERVICE,
            self.get(&format!("admin/projects/{}/customFields", self.project_id))
                .query(&[("fields", "id,$type,field(id,name)")]),
        )
        .await
    }

    /// Attach a global custom field to the project. `project_field_type` is
    /// the `$type` of the per-project binding, e.g. `PeriodProjectCustomField`.
    pub async fn attach_project_custom_field(
        &self,
        field_id: &str,
        project_field_type: &str,
    ) -> ApiResult<ProjectCustomField> {
        let body = serde_json::json!({
            "field": { "id": field_id, "$type": "CustomField" },
            "$type": project_field_type,
        });
        send_json(
            SERVICE,
            self.post(&format!("admin/projects/{}/customFields", self.project_id))
                .query(&[("fields", "id,$type,field(id,name)")])
                .json(&body),
        )
        .await
    }

    /// Create a global custom field. `field_type_id` is a tracker field type
    /// such as `string`, `period` or `user[1]`.
    pub async fn create_custom_field(&self, field: &NewCustomField) -> ApiResult<CustomField> {
        debug!(name = %field.name, field_type = %field.field_type.id, "creating custom field");
        send_json(
            SERVICE,
            self.post("admin/customFieldSettings/customFields")
                .query(&[("fields", "id,name,fieldType(id,presentation)")])
                .json(field),
        )
        .await
    }

    pub async fn users(&self) -> ApiResult<Vec<User>> {
        send_json(
            SERVICE,
            self.get("users")
                .query(&[("fields", "id,login,fullName,email,banned")]),
        )
        .await
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomField {
    pub name: String,
    pub field_type: FieldTypeRef,
    pub is_auto_attached: bool,
    pub is_displayed_in_issue_list: bool,
}

impl NewCustomField {
    pub fn new(name: &str, field_type_id: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: FieldTypeRef {
                id: field_type_id.to_string(),
                presentation: None,
            },
            is_auto_attached: false,
            is_displayed_in_issue_list: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldTypeRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: String,
    pub name: String,
    pub field_type: Option<FieldTypeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub login: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub banned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCustomField {
    pub id: String,
    #[serde(rename = "$type", default)]
    pub kind: String,
    pub field: Option<CustomFieldRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFieldRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub id_readable: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub custom_fields: Vec<IssueCustomField>,
}

impl Issue {
    pub fn custom_field(&self, name: &str) -> Option<&IssueCustomField> {
        self.custom_fields.iter().find(|f| f.name() == Some(name))
    }
}

/// Issue custom field, discriminated by the tracker's `$type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum IssueCustomField {
    #[serde(rename = "SimpleIssueCustomField")]
    Simple {
        name: String,
        #[serde(default)]
        value: Option<Value>,
    },
    #[serde(rename = "TextIssueCustomField")]
    Text {
        name: String,
        #[serde(default)]
        value: Option<TextValue>,
    },
    #[serde(rename = "SingleUserIssueCustomField")]
    SingleUser {
        name: String,
        #[serde(default)]
        value: Option<UserValue>,
    },
    #[serde(rename = "PeriodIssueCustomField")]
    Period {
        name: String,
        #[serde(default)]
        value: Option<PeriodValue>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextValue {
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodValue {
    pub presentation: Option<String>,
    pub minutes: Option<i64>,
}

impl IssueCustomField {
    pub fn link(name: &str, url: &str) -> Self {
        IssueCustomField::Simple {
            name: name.to_string(),
            value: Some(Value::String(url.to_string())),
        }
    }

    pub fn user(name: &str, login: &str) -> Self {
        IssueCustomField::SingleUser {
            name: name.to_string(),
            value: Some(UserValue {
                login: Some(login.to_string()),
                name: None,
            }),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            IssueCustomField::Simple { name, .. }
            | IssueCustomField::Text { name, .. }
            | IssueCustomField::SingleUser { name, .. }
            | IssueCustomField::Period { name, .. } => Some(name),
            IssueCustomField::Other => None,
        }
    }

    /// Plain-text value of a simple or text field; `None` for other kinds
    /// and for unset values.
    pub fn text(&self) -> Option<String> {
        match self {
            IssueCustomField::Simple { value, .. } => match value.as_ref()? {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            },
            IssueCustomField::Text { value, .. } => value.as_ref()?.text.clone(),
            _ => None,
        }
    }

    /// Presentation string of a period field ("1w 2d"); `None` otherwise.
    pub fn period_presentation(&self) -> Option<&str> {
        match self {
            IssueCustomField::Period { value, .. } => value.as_ref()?.presentation.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    pub summary: String,
    pub description: String,
    pub custom_fields: Vec<IssueCustomField>,
}

#[derive(Serialize)]
struct CreateIssueBody<'a> {
    project: ProjectRef<'a>,
    #[serde(flatten)]
    issue: &'a NewIssue,
}

#[derive(Serialize)]
struct ProjectRef<'a> {
    id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIssue {
    pub id: String,
    pub id_readable: Option<String>,
    pub summary: Option<String>,
}

#[async_trait]
impl TrackerApi for YouTrackClient {
    async fn project_issues(&self) -> ApiResult<Vec<Issue>> {
        let path = format!("admin/projects/{}/issues", self.project_id);
        let top = self.page_size.to_string();
        let mut issues: Vec<Issue> = Vec::new();
        let mut seen = HashSet::new();
        let mut skip = 0;

        loop {
            let skip_param = skip.to_string();
            debug!(project = %self.project_id, skip, "listing issues");
            let page: Vec<Issue> = send_json(
                SERVICE,
                self.get(&path).query(&[
                    ("fields", ISSUE_FIELDS),
                    ("$skip", skip_param.as_str()),
                    ("$top", top.as_str()),
                ]),
            )
            .await?;

            let fetched = page.len();
            let before = issues.len();
            issues.extend(page.into_iter().filter(|issue| seen.insert(issue.id.clone())));
            if fetched < self.page_size {
                break;
            }
            // A server that ignores `$skip` keeps answering with the same page.
            if issues.len() == before {
                warn!(project = %self.project_id, skip, "issue page repeated, stopping");
                break;
            }
            skip += fetched;
        }

        Ok(issues)
    }

    async fn create_issue(&self, issue: &NewIssue) -> ApiResult<CreatedIssue> {
        let body = CreateIssueBody {
            project: ProjectRef {
                id: &self.project_id,
            },
            issue,
        };
        debug!(summary = %issue.summary, "creating issue");
        send_json(
            SERVICE,
            self.post("issues")
                .query(&[("fields", "id,idReadable,summary")])
                .json(&body),
        )
        .await
    }
}
