use serde_json::Value;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::network::client::{ClientError, HttpRpcClient, RpcClient, RpcParams};
use crate::node::wait::{Backoff, wait_until};
use crate::wallet::command::WalletCommand;
use crate::wallet::config::WalletConfig;
use crate::wallet::{Wallet, WalletError};

/// Wallet reached over its HTTP JSON-RPC endpoint.
pub struct HttpWallet<C: RpcClient> {
    client: C,
    // Held so the spawned daemon is killed together with the wallet.
    _daemon: Option<Mutex<Child>>,
}

impl<C: RpcClient> HttpWallet<C> {
    pub fn attach(client: C) -> Self {
        Self {
            client,
            _daemon: None,
        }
    }
}

impl HttpWallet<HttpRpcClient> {
    /// Starts `cli_wallet` in daemon mode and waits until it answers.
    pub async fn spawn_daemon(config: &WalletConfig, backoff: &Backoff) -> Result<Self, WalletError> {
        let url = config
            .daemon_url()
            .ok_or(ClientError::InvalidEndpoint("daemon mode needs an RPC HTTP endpoint".to_string()))?;
        let client = HttpRpcClient::new(&url, config.response_timeout)?;

        let args = config.launch_args();
        tracing::info!(path = %config.path.display(), ?args, %url, "Starting wallet daemon");
        let child = Command::new(&config.path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let wallet = Self {
            client,
            _daemon: Some(Mutex::new(child)),
        };
        let condition = format!("wallet daemon at {url}");
        let daemon = &wallet;
        wait_until(backoff, &condition, || async move {
            daemon
                .execute(WalletCommand::new("is_new"))
                .await
                .map(Some)
        })
        .await
        .map_err(|e| WalletError::Unavailable(e.to_string()))?;
        Ok(wallet)
    }
}

impl<C: RpcClient> Wallet for HttpWallet<C> {
    async fn execute(&self, command: WalletCommand) -> Result<Value, WalletError> {
        tracing::debug!(%command, "Calling wallet");
        let WalletCommand { method, args } = command;
        self.client
            .call(&method, RpcParams::Positional(args))
            .await
            .map_err(|e| match e {
                ClientError::Rejected(message) => WalletError::Rejected { method, message },
                e => WalletError::Client(e),
            })
    }
}
