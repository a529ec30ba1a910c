use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::{self, AppConfig};
use crate::providers::youtrack::{NewCustomField, YouTrackClient};
use crate::server;
use crate::sync::{board_from_config, tracker_from_config, Synchronizer};

/// cardsync - mirror new Trello cards into YouTrack and copy time tracking back
#[derive(Parser, Debug)]
#[command(name = "cardsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.cardsync/config.toml)
    #[arg(short, long, global = true, env = "CARDSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run one sync pass and print the report as JSON
    Sync,

    /// Show the cards of the new list with their resolved assignees
    Pending,

    /// Show tracker issues with their card link and time fields
    Issues,

    /// List tracker projects
    Projects,

    /// List tracker users, to check assignee logins
    Users,

    /// Inspect and manage custom fields
    Fields {
        #[command(subcommand)]
        action: Option<FieldsCommand>,
    },

    /// Serve `GET /sync` over HTTP
    Serve {
        /// Address to listen on (default: [server] bind, then 127.0.0.1:8080)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum FieldsCommand {
    /// List board custom fields and tracker project fields
    List,

    /// Create a global tracker custom field, e.g. the card link field
    Create {
        /// Field name, e.g. "Trello Task"
        name: String,

        /// Tracker field type id: string, period, user[1], ...
        #[arg(long = "type", default_value = "string")]
        field_type: String,

        /// Attach the field to new projects automatically
        #[arg(long)]
        auto_attach: bool,

        /// Show the field in issue lists
        #[arg(long)]
        show_in_list: bool,
    },

    /// Attach a global tracker custom field to the project
    Attach {
        /// Id of the global custom field, e.g. 58-3
        field_id: String,

        /// `$type` of the project binding
        #[arg(long = "type", default_value = "SimpleProjectCustomField")]
        project_field_type: String,
    },
}

#[derive(Serialize)]
struct FieldListing<T, U> {
    board: T,
    tracker: U,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn youtrack_client(config: &AppConfig) -> Result<YouTrackClient> {
    Ok(YouTrackClient::new(config.youtrack()?, config.http.timeout())?)
}

pub async fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(config::default_config_path);
    let config = config::load_config(&path)?;

    match cli.command {
        Commands::Sync => {
            let report = Synchronizer::from_config(&config)?.run().await?;
            print_json(&report)
        }
        Commands::Pending => {
            let cards = board_from_config(&config)?
                .fetch_unsynchronized_cards()
                .await?;
            print_json(&cards)
        }
        Commands::Issues => {
            let issues = tracker_from_config(&config)?
                .list_issues_with_time_fields()
                .await?;
            print_json(&issues)
        }
        Commands::Projects => print_json(&youtrack_client(&config)?.projects().await?),
        Commands::Users => print_json(&youtrack_client(&config)?.users().await?),
        Commands::Fields { action } => match action.unwrap_or(FieldsCommand::List) {
            FieldsCommand::List => {
                let board = board_from_config(&config)?;
                let listing = FieldListing {
                    board: board.api().custom_fields().await?,
                    tracker: youtrack_client(&config)?.project_custom_fields().await?,
                };
                print_json(&listing)
            }
            FieldsCommand::Create {
                name,
                field_type,
                auto_attach,
                show_in_list,
            } => {
                let mut field = NewCustomField::new(&name, &field_type);
                field.is_auto_attached = auto_attach;
                field.is_displayed_in_issue_list = show_in_list;
                let created = youtrack_client(&config)?
                    .create_custom_field(&field)
                    .await?;
                print_json(&created)
            }
            FieldsCommand::Attach {
                field_id,
                project_field_type,
            } => {
                let attached = youtrack_client(&config)?
                    .attach_project_custom_field(&field_id, &project_field_type)
                    .await?;
                print_json(&attached)
            }
        },
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            server::serve(config, &bind).await
        }
    }
}
