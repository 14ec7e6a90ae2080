use crate::types::Submission;
use alloy_transport::TransportError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TodoError>;

#[derive(Error, Debug)]
pub enum TodoError {
    /// The contract rejected the call (a `require`/`revert` fired on-chain).
    #[error("Contract reverted: {reason}")]
    Reverted { reason: String },

    #[error("RPC error: {0}")]
    Rpc(TransportError),

    #[error("ABI decode error: {0}")]
    Decode(#[from] alloy_sol_types::Error),

    #[error("Malformed contract response: {0}")]
    MalformedResponse(String),

    #[error("Signer error: {0}")]
    Signer(String),

    #[error("No signer configured: {0} requires TODO_WALLET_PRIVATE_KEY")]
    MissingSigner(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    /// A bulk delete failed part way. `submitted` holds the deletions that
    /// were already broadcast before `source` stopped it.
    #[error("Bulk delete stopped after {} submissions: {source}", .submitted.len())]
    PartialBulkDelete {
        submitted: Vec<Submission>,
        source: Box<TodoError>,
    },

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Array conversion error: {0}")]
    ArrayConversion(#[from] std::array::TryFromSliceError),
}

impl TodoError {
    #[must_use]
    pub const fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }

    /// Transactions broadcast before the error, if any.
    #[must_use]
    pub fn submitted(&self) -> &[Submission] {
        match self {
            Self::PartialBulkDelete { submitted, .. } => submitted,
            _ => &[],
        }
    }
}

impl From<TransportError> for TodoError {
    /// Separates contract reverts from every other RPC failure.
    ///
    /// Nodes report reverts as JSON-RPC error responses, either with the ABI
    /// encoded revert payload in `data` or only with "execution reverted" in
    /// the message.
    fn from(err: TransportError) -> Self {
        let Some(payload) = err.as_error_resp() else {
            return Self::Rpc(err);
        };

        if let Some(data) = payload.as_revert_data() {
            let reason = alloy_sol_types::decode_revert_reason(&data)
                .unwrap_or_else(|| payload.message.to_string());
            return Self::Reverted { reason };
        }

        if payload.message.to_lowercase().contains("revert") {
            return Self::Reverted {
                reason: payload.message.to_string(),
            };
        }

        Self::Rpc(err)
    }
}
