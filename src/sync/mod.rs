//! One sync pass: mirror new cards into the tracker, then copy tracker time
//! values back onto the board.
//!
//! Nothing is kept between passes. Issue creation is idempotent through the
//! link field, so a pass that fails halfway can simply be run again.

pub mod board;
pub mod tracker;

use anyhow::Result;
use tracing::info;

use crate::config::AppConfig;
use crate::error::SyncError;
use crate::model::report::SyncReport;
use crate::providers::trello::TrelloClient;
use crate::providers::youtrack::YouTrackClient;
use board::{BoardLabels, BoardSync};
use tracker::{TrackerLabels, TrackerSync};

pub struct Synchronizer {
    board: BoardSync,
    tracker: TrackerSync,
}

impl Synchronizer {
    pub fn new(board: BoardSync, tracker: TrackerSync) -> Self {
        Self { board, tracker }
    }

    /// Build both handlers on real clients from the `[trello]` and
    /// `[youtrack]` sections.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(board_from_config(config)?, tracker_from_config(config)?))
    }

    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let pending = self.board.fetch_unsynchronized_cards().await?;
        let created = self.tracker.create_missing_issues(&pending).await?;

        let times = self.tracker.list_issues_with_time_fields().await?;
        let write_back = self.board.write_back_time_fields(&times).await?;

        info!(
            created = created.len(),
            updated = write_back.updated.len(),
            "sync pass finished"
        );
        Ok(SyncReport {
            created,
            write_back,
        })
    }
}

pub fn board_from_config(config: &AppConfig) -> Result<BoardSync> {
    let trello = config.trello()?;
    let client = TrelloClient::new(trello, config.http.timeout())?;
    Ok(BoardSync::new(Box::new(client), BoardLabels::from(trello)))
}

pub fn tracker_from_config(config: &AppConfig) -> Result<TrackerSync> {
    let youtrack = config.youtrack()?;
    let client = YouTrackClient::new(youtrack, config.http.timeout())?;
    Ok(TrackerSync::new(Box::new(client), TrackerLabels::from(youtrack)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::report::{CardWriteBack, CreationOutcome, FieldUpdate};
    use crate::providers::tests::{
        card, issue, FakeBoard, FakeTracker, ESTIMATE_FIELD, LINK_FIELD, SPENT_FIELD,
    };

    fn board_labels() -> BoardLabels {
        BoardLabels {
            new_list: "New".into(),
            complete_list: "Complete".into(),
            estimate_field: "Estimate".into(),
            fact_field: "Fact".into(),
        }
    }

    fn tracker_labels() -> TrackerLabels {
        TrackerLabels {
            link_field: LINK_FIELD.into(),
            assignee_field: "Assignee".into(),
            estimate_field: ESTIMATE_FIELD.into(),
            spent_time_field: SPENT_FIELD.into(),
        }
    }

    fn synchronizer(board: FakeBoard, tracker: FakeTracker) -> Synchronizer {
        Synchronizer::new(
            BoardSync::new(Box::new(board), board_labels()),
            TrackerSync::new(Box::new(tracker), tracker_labels()),
        )
    }

    #[tokio::test]
    async fn tracker_times_land_on_linked_card() {
        let board = FakeBoard::new()
            .with_time_fields()
            .with_list("l1", "Doing", vec![card("card-1", "One", "https://board/card/1", &[])]);
        let tracker = FakeTracker::new()
            .with_issue(issue("2-1", Some("https://board/card/1"), Some("2d"), Some("1d")));

        let report = synchronizer(board, tracker).run().await.unwrap();

        assert!(report.created.is_empty());
        assert_eq!(
            report.write_back.updated,
            vec![CardWriteBack {
                card_id: "card-1".into(),
                issue_id: "2-1".into(),
                estimate: FieldUpdate::Updated { value: "2d".into() },
                fact: FieldUpdate::Updated { value: "1d".into() },
            }]
        );
    }

    #[tokio::test]
    async fn new_card_is_created_then_linked() {
        let board = FakeBoard::new()
            .with_time_fields()
            .with_member("m1", "alice")
            .with_list("l1", "New", vec![card("a", "Card A", "https://trello.com/c/a", &["m1"])])
            .with_list("l2", "Complete", vec![card("z", "Done", "https://trello.com/c/z", &[])]);
        let writes = board.writes.clone();
        let tracker = FakeTracker::new();
        let created = tracker.created.clone();

        let sync = synchronizer(board, tracker);
        let first = sync.run().await.unwrap();

        assert_eq!(first.created.len(), 1);
        assert_eq!(first.created[0].card_id, "a");
        assert!(matches!(first.created[0].outcome, CreationOutcome::Created { .. }));
        // The fresh issue has no time values yet, so the card's fields are cleared.
        assert_eq!(first.write_back.updated.len(), 1);
        assert_eq!(first.write_back.updated[0].estimate, FieldUpdate::Updated { value: String::new() });
        assert_eq!(writes.lock().unwrap().len(), 2);

        let second = sync.run().await.unwrap();
        assert!(second.created.is_empty());
        assert_eq!(created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn tracker_outage_aborts_the_pass() {
        let board = FakeBoard::new()
            .with_time_fields()
            .with_list("l1", "New", vec![card("a", "Card A", "https://trello.com/c/a", &[])]);
        let writes = board.writes.clone();
        let tracker = FakeTracker::new().failing_listing();

        let err = synchronizer(board, tracker).run().await.unwrap_err();

        assert!(err.to_string().contains("listing tracker issues"));
        assert!(writes.lock().unwrap().is_empty());
    }

    #[test]
    fn from_config_requires_both_sections() {
        let config = crate::config::parse_config(
            r#"
[trello]
api_key = "k"
token = "t"
board_id = "b"
"#,
        )
        .unwrap();
        let err = Synchronizer::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("[youtrack]"));
    }
}
