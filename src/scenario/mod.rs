pub mod create_proposal;
pub mod create_vote_delete;
pub mod id_collision;
pub mod list_proposals;
pub mod payment_distribution;

use std::fmt;
use std::process::ExitCode;

use crate::api::response::Proposal;
use crate::asset::AssetError;
use crate::network::client::ClientError;
use crate::node::wait::WaitError;
use crate::session::SessionError;
use crate::transaction::TransactionError;
use crate::wallet::WalletError;

#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("Invalid date: {0}")]
    Time(#[from] chrono::ParseError),
    #[error("{0}")]
    Wait(String),
    #[error("Check failed: {0}")]
    Check(String),
    #[error("Worker for {node} failed: {reason}")]
    Worker { node: String, reason: String },
}

impl<E: fmt::Display> From<WaitError<E>> for ScenarioError {
    fn from(value: WaitError<E>) -> Self {
        ScenarioError::Wait(value.to_string())
    }
}

/// Fails the scenario with a formatted message unless the condition holds.
macro_rules! ensure {
    ($condition:expr, $($message:tt)+) => {
        if !$condition {
            return Err($crate::scenario::ScenarioError::Check(format!($($message)+)));
        }
    };
}
pub(crate) use ensure;

/// Runs one scenario, logs its outcome and maps it to the process exit status.
pub async fn run<F>(name: &str, scenario: F) -> ExitCode
where
    F: Future<Output = Result<(), ScenarioError>>,
{
    tracing::info!(scenario = name, "Starting");
    match scenario.await {
        Ok(()) => {
            tracing::info!(scenario = name, "TEST `{name}` passed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(scenario = name, error = %e, "TEST `{name}` failed");
            ExitCode::FAILURE
        }
    }
}

pub fn find_by_subject<'a>(proposals: &'a [Proposal], subject: &str) -> Option<&'a Proposal> {
    proposals.iter().find(|p| p.subject == subject)
}
