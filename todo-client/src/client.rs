use crate::{
    config::Config,
    contracts::ITodoList,
    error::{Result, TodoError},
    types::{
        delete_all_targets, DeleteAllMode, MarkOutcome, NetworkStats, Submission, Task, TaskId,
        TaskList,
    },
};
use alloy_consensus::TxEnvelope;
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, TxHash};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use alloy_sol_types::SolCall;
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Submits and reads transactions against one deployed todo-list contract.
///
/// Writes are broadcast and not awaited: each returns as soon as the node
/// accepts the raw transaction. Use [`TodoClient::await_receipt`] to wait for
/// inclusion.
///
/// Nonces are read from the node for every transaction and never tracked
/// locally, so two writes issued concurrently from the same account can be
/// signed with the same nonce.
pub struct TodoClient {
    config: Config,
    provider: Arc<dyn Provider>,
    wallet: Option<EthereumWallet>,
}

impl TodoClient {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let provider = ProviderBuilder::new().connect_http(config.network.rpc_url.clone());
        Self::with_provider(config, Arc::new(provider))
    }

    /// Builds a client over an existing provider, e.g. a mocked transport.
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Result<Self> {
        config.validate()?;

        let wallet = match &config.signer {
            Some(signer_config) => Some(EthereumWallet::new(signer_config.signer()?)),
            None => None,
        };

        Ok(Self {
            config,
            provider,
            wallet,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn contract_address(&self) -> Address {
        self.config.contract.todo_list
    }

    #[must_use]
    pub const fn wallet_address(&self) -> Option<Address> {
        self.config.wallet_address
    }

    #[must_use]
    pub const fn has_signer(&self) -> bool {
        self.wallet.is_some()
    }

    pub async fn add_task(&self, content: &str) -> Result<Submission> {
        let submission = self
            .submit(ITodoList::addTaskCall {
                content: content.to_owned(),
            })
            .await?;

        info!("Task '{}' submitted in {}", content, submission.tx_hash);
        Ok(submission)
    }

    /// Marks a task done. The contract reverts for tasks that are already
    /// done; that case comes back as [`MarkOutcome::AlreadyCompleted`].
    pub async fn mark_task_completed(&self, task_id: TaskId) -> Result<MarkOutcome> {
        match self
            .submit(ITodoList::markTaskCompletedCall { taskId: task_id })
            .await
        {
            Ok(submission) => {
                info!("Task {} marked as completed", task_id);
                Ok(MarkOutcome::Marked(submission))
            }
            Err(TodoError::Reverted { reason }) => {
                warn!("Task {} already completed ({})", task_id, reason);
                Ok(MarkOutcome::AlreadyCompleted)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn update_task(
        &self,
        task_id: TaskId,
        new_content: &str,
        new_completed: bool,
    ) -> Result<Submission> {
        let submission = self
            .submit(ITodoList::updateTaskCall {
                taskId: task_id,
                newContent: new_content.to_owned(),
                newCompleted: new_completed,
            })
            .await?;

        info!("Task {} update submitted in {}", task_id, submission.tx_hash);
        Ok(submission)
    }

    pub async fn delete_task(&self, task_id: TaskId) -> Result<Submission> {
        let submission = self
            .submit(ITodoList::deleteTaskCall { taskId: task_id })
            .await?;

        info!("Task {} deleted", task_id);
        Ok(submission)
    }

    /// Sends one `deleteTask` per task currently listed, pausing
    /// `timing.delete_interval_seconds` between sends. Nothing is confirmed
    /// in between, and the targets depend on `delete_all_mode`.
    ///
    /// If a send fails after others went out, the error is
    /// [`TodoError::PartialBulkDelete`] carrying the earlier submissions.
    pub async fn delete_all_tasks(&self) -> Result<Vec<Submission>> {
        if !self.has_signer() {
            return Err(TodoError::MissingSigner("deleteAllTasks"));
        }

        let tasks = self.get_all_tasks().await?;
        let mode = self.config.delete_all_mode;
        match mode {
            DeleteAllMode::FirstId => warn!(
                "delete_all_mode is '{}': task id 1 is deleted {} times regardless of the listed ids",
                mode,
                tasks.len()
            ),
            DeleteAllMode::TaskId => debug!(
                "delete_all_mode is '{}': deleting {} listed ids",
                mode,
                tasks.len()
            ),
        }

        let targets = delete_all_targets(&tasks, mode);
        let interval = self.config.timing.delete_interval();
        let mut submissions = Vec::with_capacity(targets.len());

        for (index, task_id) in targets.into_iter().enumerate() {
            if index > 0 && !interval.is_zero() {
                sleep(interval).await;
            }
            match self.delete_task(task_id).await {
                Ok(submission) => submissions.push(submission),
                Err(e) if submissions.is_empty() => return Err(e),
                Err(e) => {
                    warn!(
                        "Bulk delete stopped at task {} after {} submissions: {}",
                        task_id,
                        submissions.len(),
                        e
                    );
                    return Err(TodoError::PartialBulkDelete {
                        submitted: submissions,
                        source: Box::new(e),
                    });
                }
            }
        }

        info!("Submitted {} deletions", submissions.len());
        Ok(submissions)
    }

    pub async fn get_all_tasks(&self) -> Result<TaskList> {
        let ITodoList::getAllTasksReturn {
            ids,
            contents,
            completed,
        } = self.read(ITodoList::getAllTasksCall {}).await?;

        TaskList::from_parallel(ids, contents, completed)
    }

    /// Returns `(content, completed)` for `task_id`.
    pub async fn get_task(&self, task_id: TaskId) -> Result<(String, bool)> {
        let ITodoList::getTaskReturn { content, completed } = self
            .read(ITodoList::getTaskCall { taskId: task_id })
            .await?;

        Ok((content, completed))
    }

    /// Looks a task up by its exact content. The contract reverts when no
    /// task matches; that case is `Ok(None)`.
    pub async fn get_task_by_content(&self, content: &str) -> Result<Option<Task>> {
        let call = ITodoList::getTaskByContentCall {
            content: content.to_owned(),
        };

        match self.read(call).await {
            Ok(found) => Ok(Some(Task {
                id: found.id,
                content: found.taskContent,
                completed: found.completed,
            })),
            Err(TodoError::Reverted { reason }) => {
                warn!("Task not found ({})", reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Polls for the receipt of `tx_hash` until it shows up or
    /// `timing.receipt_timeout_seconds` passes. A receipt with a failed
    /// status is returned as [`TodoError::Reverted`].
    pub async fn await_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt> {
        let timeout = self.config.timing.receipt_timeout();
        let poll_interval = self.config.timing.receipt_poll_interval();
        let started = Instant::now();

        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                debug!(
                    "Receipt for {} in block {:?}, gas used {}",
                    tx_hash, receipt.block_number, receipt.gas_used
                );

                if !receipt.status() {
                    return Err(TodoError::Reverted {
                        reason: format!("transaction {tx_hash} failed on-chain"),
                    });
                }
                return Ok(receipt);
            }

            if started.elapsed() >= timeout {
                return Err(TodoError::Timeout(format!(
                    "no receipt for {tx_hash} after {}s",
                    timeout.as_secs()
                )));
            }

            sleep(poll_interval).await;
        }
    }

    pub async fn network_stats(&self) -> Result<NetworkStats> {
        let chain_id = self.provider.get_chain_id().await?;
        let block_number = self.provider.get_block_number().await?;
        let gas_price = self.provider.get_gas_price().await?;

        Ok(NetworkStats {
            chain_id,
            block_number,
            gas_price,
        })
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let mut tx = TransactionRequest::default()
            .with_to(self.contract_address())
            .with_input(call.abi_encode());
        if let Some(from) = self.config.wallet_address {
            tx.set_from(from);
        }

        debug!("eth_call {} on {}", C::SIGNATURE, self.contract_address());
        let output = self.provider.call(tx).await?;

        Ok(C::abi_decode_returns(&output)?)
    }

    /// Build request, sign, broadcast. Gas price, chain id and nonce are
    /// fetched for every call.
    async fn submit<C: SolCall>(&self, call: C) -> Result<Submission> {
        let wallet = self
            .wallet
            .as_ref()
            .ok_or(TodoError::MissingSigner(C::SIGNATURE))?;
        let from = self
            .config
            .wallet_address
            .ok_or(TodoError::MissingSigner(C::SIGNATURE))?;

        let gas_price = self.provider.get_gas_price().await?;
        let chain_id = match self.config.network.chain_id {
            Some(chain_id) => chain_id,
            None => self.provider.get_chain_id().await?,
        };
        let nonce = self.provider.get_transaction_count(from).await?;

        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_to(self.contract_address())
            .with_input(call.abi_encode())
            .with_gas_price(gas_price)
            .with_chain_id(chain_id)
            .with_nonce(nonce);

        let gas_limit = self.provider.estimate_gas(tx.clone()).await?;
        tx.set_gas_limit(gas_limit);

        debug!(
            "Signing {} (chain {}, nonce {}, gas price {}, gas limit {})",
            C::SIGNATURE,
            chain_id,
            nonce,
            gas_price,
            gas_limit
        );

        let envelope: TxEnvelope = tx
            .build(wallet)
            .await
            .map_err(|e| TodoError::Signer(e.to_string()))?;
        let signed_hash = *envelope.tx_hash();

        let pending = self.provider.send_tx_envelope(envelope).await?;
        let tx_hash = *pending.tx_hash();
        if tx_hash != signed_hash {
            warn!(
                "Node reported hash {} for transaction signed as {}",
                tx_hash, signed_hash
            );
        }

        info!("Broadcast {} as {} (nonce {})", C::SIGNATURE, tx_hash, nonce);

        Ok(Submission {
            tx_hash,
            nonce,
            chain_id,
            gas_price,
            gas_limit,
        })
    }
}
