use crate::error::{Result, TodoError};
use alloy_primitives::{TxHash, U256};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub type TaskId = U256;

/// A todo item as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub content: String,
    pub completed: bool,
}

/// All tasks returned by a single `getAllTasks` call, in contract order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

impl TaskList {
    /// Zips the index-aligned arrays returned by the contract.
    pub fn from_parallel(ids: Vec<TaskId>, contents: Vec<String>, completed: Vec<bool>) -> Result<Self> {
        if ids.len() != contents.len() || ids.len() != completed.len() {
            return Err(TodoError::MalformedResponse(format!(
                "getAllTasks returned arrays of unequal length (ids: {}, contents: {}, completed: {})",
                ids.len(),
                contents.len(),
                completed.len()
            )));
        }

        let tasks = ids
            .into_iter()
            .zip(contents)
            .zip(completed)
            .map(|((id, content), completed)| Task {
                id,
                content,
                completed,
            })
            .collect();

        Ok(Self { tasks })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|task| task.id).collect()
    }

    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    #[must_use]
    pub fn find_by_content(&self, content: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.content == content)
    }

    #[must_use]
    pub fn last(&self) -> Option<&Task> {
        self.tasks.last()
    }
}

impl IntoIterator for TaskList {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

/// One block per task, numbered from 1 in list order.
impl fmt::Display for TaskList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, task) in self.tasks.iter().enumerate() {
            writeln!(f, "*******************************")?;
            writeln!(f, "Task number :{}", index + 1)?;
            writeln!(f, "Task ID: {}", task.id)?;
            writeln!(f, "Task Content: {}", task.content)?;
            writeln!(f, "Task Completed: {}", task.completed)?;
        }
        Ok(())
    }
}

/// A broadcast transaction. Inclusion is not implied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub tx_hash: TxHash,
    pub nonce: u64,
    pub chain_id: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkOutcome {
    Marked(Submission),
    /// The contract reverted the call, which it does for tasks that are already done.
    AlreadyCompleted,
}

impl MarkOutcome {
    #[must_use]
    pub const fn submission(&self) -> Option<&Submission> {
        match self {
            Self::Marked(submission) => Some(submission),
            Self::AlreadyCompleted => None,
        }
    }
}

/// Which ids a bulk delete targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteAllMode {
    /// Delete every listed task by its own id.
    #[default]
    TaskId,
    /// Delete id 1 once per listed task. Only empties the list while ids
    /// stay dense from 1.
    FirstId,
}

impl FromStr for DeleteAllMode {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task-id" | "task_id" => Ok(Self::TaskId),
            "first-id" | "first_id" => Ok(Self::FirstId),
            other => Err(TodoError::Config(format!(
                "Invalid delete-all mode '{other}', expected 'task-id' or 'first-id'"
            ))),
        }
    }
}

impl fmt::Display for DeleteAllMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskId => f.write_str("task-id"),
            Self::FirstId => f.write_str("first-id"),
        }
    }
}

/// Ids a bulk delete will send `deleteTask` for, in order.
#[must_use]
pub fn delete_all_targets(tasks: &TaskList, mode: DeleteAllMode) -> Vec<TaskId> {
    match mode {
        DeleteAllMode::TaskId => tasks.ids(),
        DeleteAllMode::FirstId => vec![U256::from(1); tasks.len()],
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStats {
    pub chain_id: u64,
    pub block_number: u64,
    pub gas_price: u128,
}
