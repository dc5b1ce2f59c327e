//! Directory tree management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use starry_core::error::AppError;
use starry_core::pagination::{DEFAULT_PAGE_LIMIT, PageRequest};
use starry_database::StoreManager;
use starry_entity::account::WorkspaceRole;
use starry_entity::directory::{DirectoryNode, DirectoryType};
use starry_service::{CreateDirectoryRequest, DirectoryService, RequestContext};

/// Arguments for directory commands
#[derive(Debug, Args)]
pub struct DirectoryArgs {
    /// Tenant the command acts in
    #[arg(short, long)]
    pub tenant: Uuid,

    /// Account recorded as the actor (nil when omitted)
    #[arg(short, long)]
    pub account: Option<Uuid>,

    /// Directory subcommand
    #[command(subcommand)]
    pub command: DirectoryCommand,
}

/// Directory subcommands
#[derive(Debug, Subcommand)]
pub enum DirectoryCommand {
    /// Show the directory tree of a type
    Tree {
        /// Directory type: app, knowledge or tool
        #[arg(short = 'T', long = "type", default_value = "app")]
        dir_type: String,
    },
    /// Create a new directory
    Create {
        /// Directory name
        #[arg(short, long)]
        name: String,
        /// Directory type: app, knowledge or tool
        #[arg(short = 'T', long = "type", default_value = "app")]
        dir_type: String,
        /// Parent directory ID (omit for root)
        #[arg(short, long)]
        parent_id: Option<Uuid>,
    },
    /// List the targets filed directly into a directory
    Bindings {
        /// Directory ID
        id: Uuid,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Items per page
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u64,
    },
    /// Delete a leaf directory and its bindings
    Delete {
        /// Directory ID
        id: Uuid,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Directory display row
#[derive(Debug, Serialize, Tabled)]
struct DirectoryRow {
    /// Directory ID
    id: String,
    /// Indented name
    name: String,
    /// Depth
    level: i32,
    /// Direct bindings
    bindings: u64,
}

/// Binding display row
#[derive(Debug, Serialize, Tabled)]
struct BindingRow {
    /// Target ID
    target_id: String,
    /// Target kind
    #[tabled(rename = "type")]
    target_type: String,
    /// Filed at
    created_at: String,
}

/// Execute directory commands
pub async fn execute(
    args: &DirectoryArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let stores = StoreManager::new(&config.database).await?;
    let service = DirectoryService::new(
        stores.directories(),
        stores.bindings(),
        config.directory.clone(),
    );
    let ctx = RequestContext::new(
        args.tenant,
        args.account.unwrap_or_else(Uuid::nil),
        WorkspaceRole::Owner,
    );

    match &args.command {
        DirectoryCommand::Tree { dir_type } => {
            let dir_type = dir_type.parse::<DirectoryType>()?;
            let forest = service.get_directory_tree(&ctx, dir_type).await?;

            match format {
                OutputFormat::Json => output::print_item(&forest, format),
                OutputFormat::Table => {
                    let mut rows = Vec::new();
                    flatten(&forest, 0, &mut rows);
                    output::print_list(&rows, format);
                }
            }
        }
        DirectoryCommand::Create {
            name,
            dir_type,
            parent_id,
        } => {
            let directory = service
                .create_directory(
                    &ctx,
                    CreateDirectoryRequest {
                        name: name.clone(),
                        dir_type: dir_type.parse()?,
                        parent_id: *parent_id,
                    },
                )
                .await?;

            output::print_success(&format!(
                "Directory '{}' created (id: {}, level: {})",
                directory.name, directory.id, directory.level
            ));
        }
        DirectoryCommand::Bindings { id, page, limit } => {
            let directory = service.get_directory(&ctx, *id).await?;
            let page = service
                .list_directory_bindings(&ctx, &directory, PageRequest::new(*page, *limit))
                .await?;

            match format {
                OutputFormat::Json => output::print_item(&page, format),
                OutputFormat::Table => {
                    let rows: Vec<BindingRow> = page
                        .data
                        .iter()
                        .map(|b| BindingRow {
                            target_id: b.target_id.to_string(),
                            target_type: b.target_type.to_string(),
                            created_at: b.created_at.to_rfc3339(),
                        })
                        .collect();
                    output::print_list(&rows, format);
                    println!(
                        "Page {} of {} bindings{}",
                        page.page,
                        page.total,
                        if page.has_more { ", more available" } else { "" }
                    );
                }
            }
        }
        DirectoryCommand::Delete { id, force } => {
            let directory = service.get_directory(&ctx, *id).await?;

            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete directory '{}' and all of its bindings?",
                        directory.name
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            service.delete_directory(&ctx, &directory).await?;
            output::print_success(&format!("Directory '{}' deleted", directory.name));
        }
    }

    Ok(())
}

/// Depth-first rows with names indented by depth.
fn flatten(nodes: &[DirectoryNode], depth: usize, rows: &mut Vec<DirectoryRow>) {
    for node in nodes {
        rows.push(DirectoryRow {
            id: node.id.to_string(),
            name: format!("{}{}", "  ".repeat(depth), node.name),
            level: node.level,
            bindings: node.binding_count,
        });
        flatten(&node.sub_dir, depth + 1, rows);
    }
}
