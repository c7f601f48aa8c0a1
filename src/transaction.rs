use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::asset::Asset;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransactionError {
    #[error("Transaction has no operation at position {0}")]
    MissingOperation(usize),
    #[error("Expected `{expected}` operation, found `{found}`")]
    UnexpectedOperation { expected: String, found: String },
    #[error("Invalid `{name}` payload: {reason}")]
    InvalidPayload { name: String, reason: String },
}

/// One `[name, payload]` entry of a transaction's operation list.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Operation(pub String, pub Value);

impl Operation {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn payload<T: DeserializeOwned>(&self, expected: &str) -> Result<T, TransactionError> {
        if self.0 != expected {
            return Err(TransactionError::UnexpectedOperation {
                expected: expected.to_string(),
                found: self.0.clone(),
            });
        }
        serde_json::from_value(self.1.clone()).map_err(|e| TransactionError::InvalidPayload {
            name: self.0.clone(),
            reason: e.to_string(),
        })
    }
}

/// Transaction as signed by the wallet. Everything besides the operation
/// list is forwarded to the node untouched.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SignedTransaction {
    pub operations: Vec<Operation>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SignedTransaction {
    pub fn operation<T: DeserializeOwned>(
        &self,
        index: usize,
        expected: &str,
    ) -> Result<T, TransactionError> {
        self.operations
            .get(index)
            .ok_or(TransactionError::MissingOperation(index))?
            .payload(expected)
    }

    pub fn signatures(&self) -> usize {
        self.fields
            .get("signatures")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CreateProposalOperation {
    pub creator: String,
    pub receiver: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub daily_pay: Asset,
    pub subject: String,
    #[serde(alias = "url")]
    pub permlink: String,
}

impl CreateProposalOperation {
    pub const NAME: &'static str = "create_proposal";
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UpdateProposalVotesOperation {
    pub voter: String,
    pub proposal_ids: Vec<u64>,
    pub approve: bool,
}

impl UpdateProposalVotesOperation {
    pub const NAME: &'static str = "update_proposal_votes";
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RemoveProposalOperation {
    pub proposal_owner: String,
    pub proposal_ids: Vec<u64>,
}

impl RemoveProposalOperation {
    pub const NAME: &'static str = "remove_proposal";
}
