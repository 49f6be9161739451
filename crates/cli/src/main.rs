// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cfbot`: a thin client over `cfbotd`'s Unix-socket wire protocol —
//! enqueue a patch, peek/list the queue, inspect branches and task history,
//! force a tick.

mod client;
mod output;

use clap::{Parser, Subcommand};
use client::{socket_path_from, DaemonClient};
use output::{print, OutputFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cfbot", version, about = "Client for the cfbotd patch-processing daemon")]
struct Cli {
    /// Path to cfbotd's Unix socket. Defaults to the daemon's own default
    /// (config's `socket_path`, absent a config file or override).
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Health check.
    Ping,
    /// Enqueue a patch set for pipeline processing.
    Enqueue {
        #[arg(long)]
        patch_id: i64,
        #[arg(long)]
        message_id: String,
    },
    /// Dequeue the next patch set and create its Branch.
    Move,
    /// Step one Branch's pipeline forward once.
    ProcessBranch {
        #[arg(long)]
        branch_id: String,
    },
    /// Show the next unprocessed queue item.
    Peek,
    /// List every item currently in the queue.
    Queue,
    /// List every known Branch.
    Branches,
    /// List a Branch's Tasks.
    Tasks {
        #[arg(long)]
        branch_id: String,
    },
    /// Show a Branch's transition history, most recent first.
    History {
        #[arg(long)]
        branch_id: String,
    },
    /// Ask the daemon to stop.
    Shutdown,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(socket_path_from(cli.socket.as_deref()));

    match cli.command {
        Command::Ping => {
            client.ping().await?;
            println!("pong");
        }
        Command::Enqueue { patch_id, message_id } => {
            client.enqueue_patch(patch_id, message_id).await?;
            println!("enqueued patch {patch_id}");
        }
        Command::Move => {
            let move_result = client.get_and_move().await?;
            print(cli.format, &move_result, |(returned, new_current)| match returned {
                Some(item) => println!(
                    "dequeued patch {} (next up: {:?})",
                    item.patch_id,
                    new_current.as_ref().map(|i| i.patch_id)
                ),
                None => println!("queue is empty"),
            })?;
        }
        Command::ProcessBranch { branch_id } => {
            let stepped = client.process_branch(branch_id).await?;
            print(cli.format, &stepped, |(branch, delay_ms)| {
                println!("patch {} -> {} (retry in {:?}ms)", branch.patch_id, branch.status, delay_ms)
            })?;
        }
        Command::Peek => {
            let item = client.peek().await?;
            print(cli.format, &item, |item| match item {
                Some(item) => println!("{} ({})", item.patch_id, item.message_id),
                None => println!("queue is empty"),
            })?;
        }
        Command::Queue => {
            let items = client.get_queue().await?;
            print(cli.format, &items, |items| {
                for item in items {
                    println!("{}\t{}", item.patch_id, item.message_id);
                }
            })?;
        }
        Command::Branches => {
            let branches = client.branches().await?;
            print(cli.format, &branches, |branches| {
                for branch in branches {
                    println!("{}\t{}\t{}", branch.patch_id, branch.branch_id, branch.status);
                }
            })?;
        }
        Command::Tasks { branch_id } => {
            let tasks = client.tasks(branch_id).await?;
            print(cli.format, &tasks, |tasks| {
                for task in tasks {
                    println!("{}\t{}\t{}", task.position, task.task_name, task.status);
                }
            })?;
        }
        Command::History { branch_id } => {
            let entries = client.branch_history(branch_id).await?;
            print(cli.format, &entries, |entries| {
                for entry in entries {
                    println!("{}\t{}\t{} tasks", output::format_ms_ago(Some(entry.recorded_ms)), entry.status, entry.task_count);
                }
            })?;
        }
        Command::Shutdown => {
            client.shutdown().await?;
            println!("shutdown requested");
        }
    }

    Ok(())
}
