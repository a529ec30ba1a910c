use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::http::{build_client, send, send_json};
use super::BoardApi;
use crate::config::TrelloConfig;
use crate::error::{ApiError, ApiResult};
use crate::model::card::{FieldDescriptor, FieldKind};

const SERVICE: &str = "Trello";

pub struct TrelloClient {
    api_key: String,
    token: String,
    board_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl TrelloClient {
    pub fn new(config: &TrelloConfig, timeout: Duration) -> ApiResult<Self> {
        Ok(Self {
            api_key: config.api_key.clone(),
            token: config.token.clone(),
            board_id: config.board_id.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: build_client(SERVICE, timeout)?,
        })
    }

    fn auth_params(&self) -> [(&str, &str); 2] {
        [("key", self.api_key.as_str()), ("token", self.token.as_str())]
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub desc: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub id_members: Vec<String>,
    pub id_list: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

/// Body for `PUT /cards/{card}/customField/{field}/item`. An empty value
/// clears the item.
fn item_body(kind: FieldKind, value: &str) -> ApiResult<Value> {
    let key = kind
        .value_key()
        .ok_or_else(|| ApiError::UnsupportedFieldKind(kind.as_str().to_string()))?;
    if value.is_empty() {
        return Ok(json!({ "value": "" }));
    }
    Ok(json!({ "value": { key: value } }))
}

#[async_trait]
impl BoardApi for TrelloClient {
    async fn lists(&self) -> ApiResult<Vec<BoardList>> {
        debug!(board = %self.board_id, "listing board lists");
        send_json(
            SERVICE,
            self.client
                .get(self.url(&format!("boards/{}/lists", self.board_id)))
                .query(&self.auth_params())
                .query(&[("fields", "id,name")]),
        )
        .await
    }

    async fn list_cards(&self, list_id: &str) -> ApiResult<Vec<Card>> {
        debug!(list = %list_id, "listing cards");
        send_json(
            SERVICE,
            self.client
                .get(self.url(&format!("lists/{list_id}/cards")))
                .query(&self.auth_params())
                .query(&[("fields", "id,name,desc,url,idMembers,idList")]),
        )
        .await
    }

    async fn custom_fields(&self) -> ApiResult<Vec<CustomField>> {
        send_json(
            SERVICE,
            self.client
                .get(self.url(&format!("boards/{}/customFields", self.board_id)))
                .query(&self.auth_params()),
        )
        .await
    }

    async fn member(&self, member_id: &str) -> ApiResult<Member> {
        debug!(member = %member_id, "looking up member");
        send_json(
            SERVICE,
            self.client
                .get(self.url(&format!("members/{member_id}")))
                .query(&self.auth_params())
                .query(&[("fields", "id,username")]),
        )
        .await
    }

    async fn set_custom_field(
        &self,
        card_id: &str,
        field: &FieldDescriptor,
        value: &str,
    ) -> ApiResult<()> {
        let body = item_body(field.kind, value)?;
        debug!(card = %card_id, field = %field.id, value = %value, "writing custom field");
        send(
            SERVICE,
            self.client
                .put(self.url(&format!("cards/{card_id}/customField/{}/item", field.id)))
                .query(&self.auth_params())
                .json(&body),
        )
        .await?;
        Ok(())
    }
}
