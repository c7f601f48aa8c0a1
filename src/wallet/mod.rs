pub mod api;
pub mod command;
pub mod config;
pub mod http;
pub mod output;
pub mod process;

use serde_json::Value;
use std::time::Duration;

use crate::network::client::{ClientError, HttpRpcClient};
use crate::node::wait::Backoff;

pub use api::{AccountKeys, Comment, WalletApi};
pub use command::WalletCommand;
pub use config::{WalletConfig, WalletMode};
pub use http::HttpWallet;
pub use process::ProcessWallet;

#[derive(thiserror::Error, Debug)]
pub enum WalletError {
    #[error("Wallet I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Wallet process exited")]
    Exited,
    #[error("Wallet did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Wallet is unavailable: {0}")]
    Unavailable(String),
    #[error("Wallet rejected `{method}`: {message}")]
    Rejected { method: String, message: String },
    #[error("Unexpected result of `{method}`: {reason}")]
    InvalidResponse { method: String, reason: String },
    #[error(transparent)]
    Client(#[from] ClientError),
}

pub trait Wallet: Send + Sync {
    fn execute(
        &self,
        command: WalletCommand,
    ) -> impl Future<Output = Result<Value, WalletError>> + Send;
}

/// A running `cli_wallet`, whichever way it is reached.
pub enum CliWallet {
    Interactive(ProcessWallet),
    Http(HttpWallet<HttpRpcClient>),
}

impl Wallet for CliWallet {
    async fn execute(&self, command: WalletCommand) -> Result<Value, WalletError> {
        match self {
            CliWallet::Interactive(wallet) => wallet.execute(command).await,
            CliWallet::Http(wallet) => wallet.execute(command).await,
        }
    }
}

pub async fn launch(config: &WalletConfig, backoff: &Backoff) -> Result<CliWallet, WalletError> {
    match &config.mode {
        WalletMode::Interactive => Ok(CliWallet::Interactive(ProcessWallet::spawn(config).await?)),
        WalletMode::Daemon => Ok(CliWallet::Http(
            HttpWallet::spawn_daemon(config, backoff).await?,
        )),
        WalletMode::Attach(url) => {
            tracing::info!(%url, "Attaching to wallet daemon");
            let client = HttpRpcClient::new(url, config.response_timeout)?;
            Ok(CliWallet::Http(HttpWallet::attach(client)))
        }
    }
}
