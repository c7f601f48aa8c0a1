use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::asset::Asset;
use crate::node::wait::Backoff;
use crate::wallet::{WalletConfig, WalletMode};

#[derive(Parser, Debug)]
#[command(author, version, about = "End-to-end checks of the proposal system", long_about = None)]
pub struct Args {
    /// File receiving a copy of the log
    #[arg(long, env = "SPS_LOG_FILE", default_value = "./sps_test.log")]
    pub log_file: PathBuf,
    #[command(flatten)]
    pub polling: PollingArgs,
    #[command(subcommand)]
    pub scenario: Scenario,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PollingArgs {
    /// First delay between two polls, in milliseconds
    #[arg(
        long,
        env = "SPS_POLL_INITIAL_MS",
        value_parser = clap::value_parser!(u64).range(1..),
        default_value_t = 250
    )]
    pub poll_initial_ms: u64,
    /// Longest delay between two polls, in milliseconds
    #[arg(
        long,
        env = "SPS_POLL_MAX_MS",
        value_parser = clap::value_parser!(u64).range(1..),
        default_value_t = 3000
    )]
    pub poll_max_ms: u64,
    /// Time allowed for a polled condition to hold, in seconds
    #[arg(
        long,
        env = "SPS_POLL_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        default_value_t = 60
    )]
    pub poll_timeout_secs: u64,
    /// Time allowed for a single request, in seconds
    #[arg(long, env = "SPS_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl PollingArgs {
    pub fn backoff(&self) -> Backoff {
        Backoff {
            initial_delay: Duration::from_millis(self.poll_initial_ms),
            max_delay: Duration::from_millis(self.poll_max_ms),
            timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct WalletArgs {
    /// Path to the cli_wallet executable
    #[arg(long = "path", env = "SPS_WALLET_PATH", default_value = "cli_wallet")]
    pub path: PathBuf,
    #[arg(long, env = "SPS_SERVER_RPC_ENDPOINT", default_value = "ws://127.0.0.1:8090")]
    pub server_rpc_endpoint: String,
    #[arg(long, env = "SPS_CERT_AUTH")]
    pub cert_auth: Option<String>,
    #[arg(long, env = "SPS_RPC_TLS_ENDPOINT")]
    pub rpc_tls_endpoint: Option<String>,
    #[arg(long, env = "SPS_RPC_TLS_CERT")]
    pub rpc_tls_cert: Option<String>,
    #[arg(long, env = "SPS_RPC_HTTP_ENDPOINT")]
    pub rpc_http_endpoint: Option<String>,
    /// Run the wallet as an HTTP daemon instead of scripting its console
    #[arg(long, env = "SPS_WALLET_DAEMON")]
    pub daemon: bool,
    #[arg(long, env = "SPS_RPC_ALLOWIP", value_delimiter = ',')]
    pub rpc_allowip: Vec<String>,
    #[arg(long, env = "SPS_WALLET_FILE")]
    pub wallet_file: Option<PathBuf>,
    #[arg(long, env = "SPS_CHAIN_ID")]
    pub chain_id: Option<String>,
    /// URL of an already running wallet daemon
    #[arg(long, env = "SPS_WALLET_URL", conflicts_with = "daemon")]
    pub attach: Option<String>,
    #[arg(long, env = "SPS_WALLET_PASSWORD", default_value = "testpassword")]
    pub wallet_password: String,
    /// Private key imported into the wallet, may be repeated
    #[arg(long = "private-key", env = "SPS_PRIVATE_KEYS", value_delimiter = ',')]
    pub private_keys: Vec<String>,
}

impl WalletArgs {
    pub fn config(&self, response_timeout: Duration) -> WalletConfig {
        let mode = match (&self.attach, self.daemon) {
            (Some(url), _) => WalletMode::Attach(url.clone()),
            (None, true) => WalletMode::Daemon,
            (None, false) => WalletMode::Interactive,
        };
        WalletConfig {
            path: self.path.clone(),
            server_rpc_endpoint: Some(self.server_rpc_endpoint.clone()),
            cert_authority: self.cert_auth.clone(),
            rpc_tls_endpoint: self.rpc_tls_endpoint.clone(),
            rpc_tls_certificate: self.rpc_tls_cert.clone(),
            rpc_http_endpoint: self.rpc_http_endpoint.clone(),
            rpc_http_allowip: self.rpc_allowip.clone(),
            wallet_file: self.wallet_file.clone(),
            chain_id: self.chain_id.clone(),
            mode,
            response_timeout,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Scenario {
    /// Create a proposal through the wallet and check the creator's listing grows by one
    CreateProposal {
        #[arg(long, env = "SPS_CREATOR", default_value = "initminer")]
        creator: String,
        /// Account created as receiver, random when omitted
        #[arg(long)]
        receiver: Option<String>,
        #[command(flatten)]
        wallet: WalletArgs,
    },
    /// List proposals through the wallet with every ordering and status
    ListProposals {
        #[command(flatten)]
        wallet: WalletArgs,
    },
    /// Create, list, find, vote and remove proposals through a node
    CreateVoteDelete {
        /// Account to create proposals with
        creator: String,
        /// Account to receive funds
        receiver: String,
        /// Private key of the creator
        wif: String,
        #[arg(long = "node-address", env = "SPS_NODE_URL", default_value = "http://127.0.0.1:8090")]
        node_url: String,
        #[arg(long, default_value_t = 10)]
        iterations: u32,
        #[command(flatten)]
        wallet: WalletArgs,
    },
    /// Send proposals to several nodes at once and compare the ids they assign
    IdCollision {
        /// Account to create proposals with
        creator: String,
        /// Account to receive payment for proposals
        receiver: String,
        /// Private key of the creator
        wif: String,
        /// Url of every node to send proposals to
        #[arg(required = true, num_args = 1..)]
        nodes_url: Vec<String>,
        /// Delay in seconds of each node's worker
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        delays: Vec<f64>,
        /// Number of proposals each worker creates
        #[arg(long, default_value_t = 1)]
        proposal_count: usize,
        #[arg(long, default_value = "24.000 TBD")]
        daily_pay: Asset,
        #[command(flatten)]
        wallet: WalletArgs,
    },
    /// Fund test accounts, vote on their proposals and check how payments are distributed
    PaymentDistribution {
        /// Account to create test accounts with
        creator: String,
        /// Private key of the creator, also used to produce blocks
        wif: String,
        #[arg(long = "node-address", env = "SPS_NODE_URL", default_value = "http://127.0.0.1:8090")]
        node_url: String,
        #[arg(long, default_value_t = 3)]
        accounts: usize,
        #[arg(long, default_value = "24.000 TBD")]
        daily_pay: Asset,
        #[arg(long, default_value_t = 1250)]
        maintenance_blocks: u32,
        /// Do not erase the proposals created by this run
        #[arg(long)]
        no_erase_proposal: bool,
        #[command(flatten)]
        wallet: WalletArgs,
    },
}
