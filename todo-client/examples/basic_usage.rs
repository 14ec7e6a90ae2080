use todo_client::{Config, MarkOutcome, Result, TodoClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Testing todo client basic usage...");

    let config = match Config::from_env() {
        Ok(config) => {
            info!("✓ Configuration loaded successfully");
            info!("  RPC URL: {}", config.network.rpc_url);
            info!("  Contract: {}", config.contract.todo_list);
            config
        }
        Err(e) => {
            eprintln!("✗ Failed to load configuration: {e}");
            eprintln!("Optional environment variables:");
            eprintln!("  - TODO_RPC_URL");
            eprintln!("  - TODO_CONTRACT_ADDRESS");
            eprintln!("  - TODO_WALLET_PRIVATE_KEY (needed for writes)");
            return Err(e);
        }
    };

    let client = TodoClient::new(config)?;

    let stats = client.network_stats().await?;
    info!("✓ Connected to chain {} at block {}", stats.chain_id, stats.block_number);

    let tasks = client.get_all_tasks().await?;
    info!("✓ {} tasks on the list", tasks.len());
    print!("{tasks}");

    if !client.has_signer() {
        info!("Skipping writes (no signer configured)");
        return Ok(());
    }

    let submission = client.add_task("Try the Rust client").await?;
    client.await_receipt(submission.tx_hash).await?;
    info!("✓ Task added in {}", submission.tx_hash);

    let Some(task) = client.get_task_by_content("Try the Rust client").await? else {
        info!("Added task not visible yet");
        return Ok(());
    };

    match client.mark_task_completed(task.id).await? {
        MarkOutcome::Marked(submission) => {
            client.await_receipt(submission.tx_hash).await?;
            info!("✓ Task {} completed", task.id);
        }
        MarkOutcome::AlreadyCompleted => info!("Task {} was already completed", task.id),
    }

    Ok(())
}
