//! Client flows against alloy's mocked transport. Responses are queued in the
//! order the client issues its RPCs: for a write that is `eth_gasPrice`,
//! `eth_getTransactionCount`, `eth_estimateGas`, `eth_sendRawTransaction`
//! (the chain id is fixed in the test config, so `eth_chainId` is skipped).

use alloy_primitives::{Address, Bytes, B256, U128, U256, U64};
use alloy_provider::ProviderBuilder;
use alloy_sol_types::SolValue;
use alloy_transport::mock::Asserter;
use serde_json::json;
use std::{sync::Arc, time::Duration};
use todo_client::{Config, DeleteAllMode, MarkOutcome, TodoClient, TodoError};
use tokio::time::Instant;

const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const GAS_PRICE: u64 = 10_000_000_000;
const GAS_LIMIT: u64 = 85_000;

fn signing_config() -> Config {
    let mut config = Config::default().with_private_key(TEST_PRIVATE_KEY).unwrap();
    config.network.chain_id = Some(97);
    config.timing.delete_interval_seconds = 0;
    config.timing.receipt_timeout_seconds = 0;
    config
}

fn mocked_client(config: Config) -> (TodoClient, Asserter) {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
    let client = TodoClient::with_provider(config, Arc::new(provider)).unwrap();
    (client, asserter)
}

/// Queues everything a successful write needs and returns the hash the node reports.
fn queue_write(asserter: &Asserter, nonce: u64, seed: u8) -> B256 {
    let tx_hash = B256::repeat_byte(seed);
    asserter.push_success(&U128::from(GAS_PRICE));
    asserter.push_success(&U64::from(nonce));
    asserter.push_success(&U64::from(GAS_LIMIT));
    asserter.push_success(&tx_hash);
    tx_hash
}

/// A legacy transaction receipt as returned by `eth_getTransactionReceipt`.
fn receipt_json(tx_hash: B256, succeeded: bool) -> serde_json::Value {
    json!({
        "type": "0x0",
        "status": if succeeded { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0xa410",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0xbb),
        "blockNumber": "0x2a",
        "gasUsed": "0xa410",
        "effectiveGasPrice": "0x2540be400",
        "from": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        "to": Address::repeat_byte(0xe8),
        "contractAddress": null
    })
}

fn queue_task_list(asserter: &Asserter, tasks: &[(u64, &str, bool)]) {
    let ids: Vec<U256> = tasks.iter().map(|(id, _, _)| U256::from(*id)).collect();
    let contents: Vec<String> = tasks.iter().map(|(_, c, _)| (*c).to_string()).collect();
    let completed: Vec<bool> = tasks.iter().map(|(_, _, done)| *done).collect();
    asserter.push_success(&Bytes::from((ids, contents, completed).abi_encode_params()));
}

#[tokio::test]
async fn test_add_task_broadcasts_signed_transaction() {
    let (client, asserter) = mocked_client(signing_config());
    let tx_hash = queue_write(&asserter, 4, 0xaa);

    let submission = client.add_task("Learn Solidity").await.unwrap();

    assert_eq!(submission.tx_hash, tx_hash);
    assert_eq!(submission.nonce, 4);
    assert_eq!(submission.chain_id, 97);
    assert_eq!(submission.gas_price, u128::from(GAS_PRICE));
    assert_eq!(submission.gas_limit, GAS_LIMIT);
}

#[tokio::test]
async fn test_chain_id_is_fetched_when_not_configured() {
    let mut config = signing_config();
    config.network.chain_id = None;
    let (client, asserter) = mocked_client(config);

    asserter.push_success(&U128::from(GAS_PRICE));
    asserter.push_success(&U64::from(56));
    asserter.push_success(&U64::from(0));
    asserter.push_success(&U64::from(GAS_LIMIT));
    asserter.push_success(&B256::repeat_byte(0x01));

    let submission = client.delete_task(U256::from(2)).await.unwrap();

    assert_eq!(submission.chain_id, 56);
    assert_eq!(submission.nonce, 0);
}

#[tokio::test]
async fn test_added_task_is_listed_as_open() {
    let (client, asserter) = mocked_client(signing_config());
    queue_write(&asserter, 0, 0x10);
    client.add_task("X").await.unwrap();

    queue_task_list(&asserter, &[(1, "older", true), (2, "X", false)]);
    let tasks = client.get_all_tasks().await.unwrap();

    let added = tasks.find_by_content("X").unwrap();
    assert_eq!(added.id, U256::from(2));
    assert!(!added.completed);
}

#[tokio::test]
async fn test_mark_task_completed_twice_does_not_raise() {
    let (client, asserter) = mocked_client(signing_config());

    let tx_hash = queue_write(&asserter, 7, 0x22);
    let first = client.mark_task_completed(U256::from(3)).await.unwrap();
    assert_eq!(first.submission().map(|s| s.tx_hash), Some(tx_hash));

    // The contract rejects the second call while the node estimates gas.
    asserter.push_success(&U128::from(GAS_PRICE));
    asserter.push_success(&U64::from(8));
    asserter.push_failure_msg("execution reverted: Task already completed");
    let second = client.mark_task_completed(U256::from(3)).await.unwrap();
    assert_eq!(second, MarkOutcome::AlreadyCompleted);

    asserter.push_success(&Bytes::from(("done".to_string(), true).abi_encode_params()));
    let (content, completed) = client.get_task(U256::from(3)).await.unwrap();
    assert_eq!(content, "done");
    assert!(completed);
}

#[tokio::test]
async fn test_mark_task_completed_propagates_other_failures() {
    let (client, asserter) = mocked_client(signing_config());

    asserter.push_success(&U128::from(GAS_PRICE));
    asserter.push_success(&U64::from(8));
    asserter.push_failure_msg("insufficient funds for gas * price + value");

    let result = client.mark_task_completed(U256::from(3)).await;
    assert!(matches!(result, Err(TodoError::Rpc(_))));
}

#[tokio::test]
async fn test_update_task_then_get_task() {
    let (client, asserter) = mocked_client(signing_config());
    queue_write(&asserter, 1, 0x33);
    client
        .update_task(U256::from(5), "Y", true)
        .await
        .unwrap();

    asserter.push_success(&Bytes::from(("Y".to_string(), true).abi_encode_params()));
    assert_eq!(
        client.get_task(U256::from(5)).await.unwrap(),
        ("Y".to_string(), true)
    );
}

#[tokio::test]
async fn test_deleted_task_is_not_listed() {
    let (client, asserter) = mocked_client(signing_config());
    queue_write(&asserter, 2, 0x44);
    client.delete_task(U256::from(2)).await.unwrap();

    queue_task_list(&asserter, &[(1, "keep", false), (3, "keep too", false)]);
    let tasks = client.get_all_tasks().await.unwrap();

    assert!(!tasks.ids().contains(&U256::from(2)));
    assert_eq!(tasks.len(), 2);
}

#[tokio::test]
async fn test_get_task_by_content() {
    let (client, asserter) = mocked_client(signing_config());

    asserter.push_success(&Bytes::from(
        (U256::from(9), "Unique task content".to_string(), false).abi_encode_params(),
    ));
    let found = client
        .get_task_by_content("Unique task content")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, U256::from(9));
    assert_eq!(found.content, "Unique task content");
    assert!(!found.completed);

    asserter.push_failure_msg("execution reverted: Task not found");
    assert!(client
        .get_task_by_content("missing")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_read_failures_propagate() {
    let (client, asserter) = mocked_client(Config::default());

    asserter.push_failure_msg("header not found");
    assert!(matches!(
        client.get_all_tasks().await,
        Err(TodoError::Rpc(_))
    ));

    // getTask does not swallow reverts.
    asserter.push_failure_msg("execution reverted: Task does not exist");
    assert!(matches!(
        client.get_task(U256::from(42)).await,
        Err(TodoError::Reverted { .. })
    ));
}

#[tokio::test]
async fn test_malformed_task_list() {
    let (client, asserter) = mocked_client(Config::default());

    let ids = vec![U256::from(1), U256::from(2)];
    let contents = vec!["one".to_string()];
    let completed = vec![false, false];
    asserter.push_success(&Bytes::from((ids, contents, completed).abi_encode_params()));

    assert!(matches!(
        client.get_all_tasks().await,
        Err(TodoError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_delete_all_tasks_deletes_each_listed_task() {
    let (client, asserter) = mocked_client(signing_config());

    queue_task_list(&asserter, &[(4, "a", false), (6, "b", true)]);
    let first = queue_write(&asserter, 10, 0x51);
    let second = queue_write(&asserter, 11, 0x52);

    let submissions = client.delete_all_tasks().await.unwrap();

    let hashes: Vec<B256> = submissions.iter().map(|s| s.tx_hash).collect();
    assert_eq!(hashes, vec![first, second]);
    assert_eq!(submissions[1].nonce, 11);
}

#[tokio::test]
async fn test_delete_all_tasks_returns_sent_hashes_on_failure() {
    let (client, asserter) = mocked_client(signing_config());

    queue_task_list(&asserter, &[(4, "a", false), (6, "b", false)]);
    let first = queue_write(&asserter, 10, 0x51);
    asserter.push_success(&U128::from(GAS_PRICE));
    asserter.push_failure_msg("nonce too low");

    let err = client.delete_all_tasks().await.unwrap_err();

    let hashes: Vec<B256> = err.submitted().iter().map(|s| s.tx_hash).collect();
    assert_eq!(hashes, vec![first]);
    match err {
        TodoError::PartialBulkDelete { source, .. } => {
            assert!(matches!(*source, TodoError::Rpc(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_all_tasks_first_failure_is_returned_as_is() {
    let (client, asserter) = mocked_client(signing_config());

    queue_task_list(&asserter, &[(4, "a", false)]);
    asserter.push_failure_msg("insufficient funds for gas * price + value");

    let err = client.delete_all_tasks().await.unwrap_err();
    assert!(matches!(err, TodoError::Rpc(_)));
    assert!(err.submitted().is_empty());
}

#[tokio::test]
async fn test_delete_all_tasks_first_id_mode_sends_one_per_task() {
    let mut config = signing_config();
    config.delete_all_mode = DeleteAllMode::FirstId;
    let (client, asserter) = mocked_client(config);

    queue_task_list(&asserter, &[(1, "a", false), (2, "b", false)]);
    let first = queue_write(&asserter, 3, 0x61);
    let second = queue_write(&asserter, 4, 0x62);

    let submissions = client.delete_all_tasks().await.unwrap();

    let hashes: Vec<B256> = submissions.iter().map(|s| s.tx_hash).collect();
    assert_eq!(hashes, vec![first, second]);
}

#[tokio::test(start_paused = true)]
async fn test_delete_all_tasks_waits_between_deletes_only() {
    let mut config = signing_config();
    config.timing.delete_interval_seconds = 5;
    let (client, asserter) = mocked_client(config);

    queue_task_list(&asserter, &[(7, "only", false)]);
    queue_write(&asserter, 0, 0x71);
    let started = Instant::now();
    client.delete_all_tasks().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    queue_task_list(&asserter, &[(1, "a", false), (2, "b", false), (3, "c", false)]);
    for nonce in 1..=3 {
        queue_write(&asserter, nonce, 0x71 + nonce as u8);
    }
    let started = Instant::now();
    let submissions = client.delete_all_tasks().await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(submissions.len(), 3);
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(15));
}

#[tokio::test]
async fn test_delete_all_tasks_on_empty_list() {
    let mut config = signing_config();
    config.delete_all_mode = DeleteAllMode::FirstId;
    let (client, asserter) = mocked_client(config);

    queue_task_list(&asserter, &[]);
    assert!(client.delete_all_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_writes_without_signer_fail_before_any_rpc() {
    // Nothing is queued: any RPC attempt would fail with a transport error instead.
    let (client, _asserter) = mocked_client(Config::default());

    assert!(!client.has_signer());
    assert!(matches!(
        client.add_task("X").await,
        Err(TodoError::MissingSigner(_))
    ));
    assert!(matches!(
        client.mark_task_completed(U256::from(1)).await,
        Err(TodoError::MissingSigner(_))
    ));
    assert!(matches!(
        client.delete_all_tasks().await,
        Err(TodoError::MissingSigner(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_await_receipt_returns_receipt_after_pending_polls() {
    let mut config = signing_config();
    config.timing.receipt_timeout_seconds = 60;
    let (client, asserter) = mocked_client(config);
    let tx_hash = B256::repeat_byte(0x78);

    asserter.push_success(&serde_json::Value::Null);
    asserter.push_success(&serde_json::Value::Null);
    asserter.push_success(&receipt_json(tx_hash, true));

    let receipt = client.await_receipt(tx_hash).await.unwrap();

    assert_eq!(receipt.transaction_hash, tx_hash);
    assert_eq!(receipt.block_number, Some(42));
    assert_eq!(receipt.gas_used, 42_000);
}

#[tokio::test(start_paused = true)]
async fn test_await_receipt_failed_status_is_revert() {
    let mut config = signing_config();
    config.timing.receipt_timeout_seconds = 60;
    let (client, asserter) = mocked_client(config);
    let tx_hash = B256::repeat_byte(0x79);

    asserter.push_success(&serde_json::Value::Null);
    asserter.push_success(&receipt_json(tx_hash, false));

    let err = client.await_receipt(tx_hash).await.unwrap_err();
    assert!(err.is_revert());
}

#[tokio::test]
async fn test_await_receipt_times_out() {
    let (client, asserter) = mocked_client(signing_config());

    asserter.push_success(&serde_json::Value::Null);
    let result = client.await_receipt(B256::repeat_byte(0x77)).await;

    assert!(matches!(result, Err(TodoError::Timeout(_))));
}
