//! Command-line client for the on-chain todo list.
//!
//! Configuration comes from `TODO_*` environment variables (a `.env` file is
//! loaded when present); `--rpc-url` and `--contract` override them.
//!
//! Usage examples:
//! ```shell
//! # List every task
//! todo list
//!
//! # Add a task and wait until it is mined
//! todo --wait add "Learn Solidity"
//!
//! # Rewrite task 3 and mark it done
//! todo update 3 "Updated task content" --completed
//! ```

use alloy_primitives::U256;
use clap::{Parser, Subcommand};
use eyre::Result;
use std::env;
use todo_client::{Config, MarkOutcome, Submission, TodoClient};
use tracing::{info, warn};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(about = "Submit and read transactions against the todo-list contract")]
#[command(version)]
struct Cli {
    /// JSON-RPC endpoint (overrides TODO_RPC_URL)
    #[arg(long, global = true)]
    rpc_url: Option<Url>,

    /// Todo-list contract address (overrides TODO_CONTRACT_ADDRESS)
    #[arg(long, global = true)]
    contract: Option<String>,

    /// Wait for the receipt of every transaction sent
    #[arg(long, global = true)]
    wait: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a task
    Add {
        /// Task description
        content: String,
    },
    /// Mark a task as completed
    Complete {
        /// Task ID
        id: U256,
    },
    /// Replace a task's content and completion status
    Update {
        /// Task ID
        id: U256,
        /// New description
        content: String,
        /// Mark the task as completed
        #[arg(long)]
        completed: bool,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: U256,
    },
    /// Delete every listed task, one transaction each
    DeleteAll,
    /// Print all tasks
    List {
        /// Print JSON instead of text blocks
        #[arg(long)]
        json: bool,
    },
    /// Show one task by ID
    Get {
        /// Task ID
        id: U256,
    },
    /// Find a task by its exact content
    Find {
        /// Task description
        content: String,
    },
    /// Check the connection and configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "todo=info,todo_client=info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let client = TodoClient::new(load_config(&cli)?)?;

    match cli.command {
        Commands::Add { content } => {
            let submission = client.add_task(&content).await?;
            finish(&client, &submission, cli.wait).await?;
        }
        Commands::Complete { id } => match client.mark_task_completed(id).await? {
            MarkOutcome::Marked(submission) => finish(&client, &submission, cli.wait).await?,
            // The client already warns for this case.
            MarkOutcome::AlreadyCompleted => {}
        },
        Commands::Update {
            id,
            content,
            completed,
        } => {
            let submission = client.update_task(id, &content, completed).await?;
            finish(&client, &submission, cli.wait).await?;
        }
        Commands::Delete { id } => {
            let submission = client.delete_task(id).await?;
            finish(&client, &submission, cli.wait).await?;
        }
        Commands::DeleteAll => match client.delete_all_tasks().await {
            Ok(submissions) => {
                for submission in &submissions {
                    finish(&client, submission, cli.wait).await?;
                }
                println!("{} deletions submitted", submissions.len());
            }
            Err(e) => {
                for submission in e.submitted() {
                    finish(&client, submission, cli.wait).await?;
                }
                return Err(e.into());
            }
        },
        Commands::List { json } => {
            let tasks = client.get_all_tasks().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print!("{tasks}");
            }
        }
        Commands::Get { id } => {
            let (content, completed) = client.get_task(id).await?;
            println!("Task ID: {id}");
            println!("Task Content: {content}");
            println!("Task Completed: {completed}");
        }
        Commands::Find { content } => match client.get_task_by_content(&content).await? {
            Some(task) => {
                println!("Task ID: {}", task.id);
                println!("Task Content: {}", task.content);
                println!("Task Completed: {}", task.completed);
            }
            None => println!("Task not found"),
        },
        Commands::Check => run_check(&client).await?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(rpc_url) = &cli.rpc_url {
        config.network.rpc_url = rpc_url.clone();
    }
    if let Some(contract) = &cli.contract {
        config.contract.todo_list = contract
            .parse()
            .map_err(|e| eyre::eyre!("Invalid contract address {contract}: {e}"))?;
    }

    config.validate()?;
    Ok(config)
}

async fn finish(client: &TodoClient, submission: &Submission, wait: bool) -> Result<()> {
    println!("Transaction sent: {}", submission.tx_hash);

    if wait {
        let receipt = client.await_receipt(submission.tx_hash).await?;
        println!(
            "Confirmed in block {} (gas used {})",
            receipt.block_number.unwrap_or_default(),
            receipt.gas_used
        );
    }

    Ok(())
}

async fn run_check(client: &TodoClient) -> Result<()> {
    let stats = client.network_stats().await?;
    info!("✅ Network connection successful");
    println!("Chain ID: {}", stats.chain_id);
    println!("Current block: {}", stats.block_number);
    println!("Gas price: {} wei", stats.gas_price);
    println!("Contract: {}", client.contract_address());

    match client.wallet_address() {
        Some(address) if client.has_signer() => println!("Signer: {address}"),
        Some(address) => println!("Caller (read-only): {address}"),
        None => {
            warn!("⚠️  No signer configured - read-only mode");
            info!("💡 Set TODO_WALLET_PRIVATE_KEY for transaction capabilities");
        }
    }

    let tasks = client.get_all_tasks().await?;
    println!("Tasks on the list: {}", tasks.len());

    Ok(())
}
