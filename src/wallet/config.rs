use std::path::PathBuf;
use std::time::Duration;

/// How the harness reaches the wallet.
#[derive(Debug, Clone, PartialEq)]
pub enum WalletMode {
    /// Spawn `cli_wallet` and script its console.
    Interactive,
    /// Spawn `cli_wallet` as an HTTP JSON-RPC daemon.
    Daemon,
    /// Use a wallet daemon that is already running at the given URL.
    Attach(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletConfig {
    pub path: PathBuf,
    pub server_rpc_endpoint: Option<String>,
    pub cert_authority: Option<String>,
    pub rpc_tls_endpoint: Option<String>,
    pub rpc_tls_certificate: Option<String>,
    pub rpc_http_endpoint: Option<String>,
    pub rpc_http_allowip: Vec<String>,
    pub wallet_file: Option<PathBuf>,
    pub chain_id: Option<String>,
    pub mode: WalletMode,
    pub response_timeout: Duration,
}

impl WalletConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            server_rpc_endpoint: None,
            cert_authority: None,
            rpc_tls_endpoint: None,
            rpc_tls_certificate: None,
            rpc_http_endpoint: None,
            rpc_http_allowip: Vec::new(),
            wallet_file: None,
            chain_id: None,
            mode: WalletMode::Interactive,
            response_timeout: Duration::from_secs(30),
        }
    }

    /// Command line passed to the spawned `cli_wallet`.
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        let options = [
            ("--server-rpc-endpoint", &self.server_rpc_endpoint),
            ("--cert-authority", &self.cert_authority),
            ("--rpc-tls-endpoint", &self.rpc_tls_endpoint),
            ("--rpc-tls-certificate", &self.rpc_tls_certificate),
            ("--rpc-http-endpoint", &self.rpc_http_endpoint),
        ];
        for (flag, value) in options {
            if let Some(value) = value {
                args.push(format!("{flag}={value}"));
            }
        }
        if self.mode == WalletMode::Daemon {
            args.push("--daemon".to_string());
        }
        for ip in &self.rpc_http_allowip {
            args.push(format!("--rpc-http-allowip={ip}"));
        }
        if let Some(wallet_file) = &self.wallet_file {
            args.push(format!("--wallet-file={}", wallet_file.display()));
        }
        if let Some(chain_id) = &self.chain_id {
            args.push(format!("--chain-id={chain_id}"));
        }
        args
    }

    /// URL the daemon answers on, derived from its HTTP endpoint.
    pub fn daemon_url(&self) -> Option<String> {
        self.rpc_http_endpoint.as_ref().map(|endpoint| {
            if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
                endpoint.clone()
            } else {
                format!("http://{endpoint}")
            }
        })
    }
}
