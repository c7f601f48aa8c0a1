use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use crate::wallet::command::WalletCommand;
use crate::wallet::config::WalletConfig;
use crate::wallet::output::{parse_output, strip_prompt};
use crate::wallet::{Wallet, WalletError};

struct Console {
    _child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
}

/// `cli_wallet` driven through its interactive console.
///
/// Commands are written one per line and answered in order, so the console
/// is locked for the whole exchange.
pub struct ProcessWallet {
    console: Mutex<Console>,
    response_timeout: Duration,
}

impl ProcessWallet {
    pub async fn spawn(config: &WalletConfig) -> Result<Self, WalletError> {
        let args = config.launch_args();
        tracing::info!(path = %config.path.display(), ?args, "Starting interactive wallet");
        let mut command = Command::new(&config.path);
        command.args(&args);
        Self::from_command(command, config.response_timeout).await
    }

    /// Runs `command` as the wallet console and waits for its first prompt.
    pub async fn from_command(
        mut command: Command,
        response_timeout: Duration,
    ) -> Result<Self, WalletError> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or(WalletError::Exited)?;
        let mut stdout = child.stdout.take().ok_or(WalletError::Exited)?;

        let banner = read_until_prompt(&mut stdout, response_timeout).await?;
        tracing::debug!(%banner, "Wallet ready");

        Ok(Self {
            console: Mutex::new(Console {
                _child: child,
                stdin,
                stdout,
            }),
            response_timeout,
        })
    }
}

impl Wallet for ProcessWallet {
    async fn execute(&self, command: WalletCommand) -> Result<Value, WalletError> {
        let mut console = self.console.lock().await;
        tracing::debug!(%command, "Writing wallet command");
        console.stdin.write_all(command.to_line().as_bytes()).await?;
        console.stdin.flush().await?;

        let output = read_until_prompt(&mut console.stdout, self.response_timeout).await?;
        tracing::trace!(method = %command.method, %output, "Wallet answered");
        parse_output(&command, &output)
    }
}

/// Reads console output until the next prompt and returns what preceded it.
pub async fn read_until_prompt<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<String, WalletError> {
    tokio::time::timeout(timeout, read_prompted(reader))
        .await
        .map_err(|_| WalletError::Timeout(timeout))?
}

async fn read_prompted<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String, WalletError> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(WalletError::Exited);
        }
        buffer.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buffer);
        if let Some(output) = strip_prompt(&text) {
            return Ok(output.to_string());
        }
    }
}
