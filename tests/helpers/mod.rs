pub mod chain;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use sps_tester::network::client::HttpRpcClient;
use sps_tester::node::Node;
use sps_tester::node::wait::Backoff;
use sps_tester::session::Session;
use sps_tester::wallet::{HttpWallet, WalletApi};

use chain::MockChain;
use server::{BlockProducer, SharedChain, TestServer};

pub const INIT_KEY: &str = "5JNHfZYKGaomSFvd4NUdQ9qMcEAC43kujbfjueTHpVapX1Kzq2n";
pub const PASSWORD: &str = "testpassword";

pub type DaemonWallet = HttpWallet<HttpRpcClient>;

pub fn backoff() -> Backoff {
    Backoff {
        initial_delay: Duration::from_millis(20),
        max_delay: Duration::from_millis(200),
        timeout: Duration::from_secs(10),
    }
}

/// Nodes and a wallet daemon sharing one mock chain that keeps producing blocks.
pub struct TestNet {
    chain: SharedChain,
    pub nodes: Vec<TestServer>,
    pub wallet: TestServer,
    _producer: BlockProducer,
}

impl TestNet {
    pub async fn start(chain: MockChain, node_count: usize) -> Self {
        Self::launch(chain, node_count, 0).await
    }

    /// Like `start`, but the last `lagging` nodes list proposals `LAG_BLOCKS` behind.
    pub async fn with_lagging_nodes(chain: MockChain, node_count: usize, lagging: usize) -> Self {
        Self::launch(chain, node_count, lagging).await
    }

    async fn launch(chain: MockChain, node_count: usize, lagging: usize) -> Self {
        let chain = Arc::new(Mutex::new(chain));
        let mut nodes = Vec::with_capacity(node_count);
        for index in 0..node_count {
            let node = if index + lagging >= node_count {
                server::start_lagging_node(&chain).await
            } else {
                server::start_node(&chain).await
            };
            nodes.push(node);
        }
        let wallet = server::start_wallet(&chain).await;
        let producer = server::produce_blocks(&chain, Duration::from_millis(20));
        Self {
            chain,
            nodes,
            wallet,
            _producer: producer,
        }
    }

    pub fn chain(&self) -> MutexGuard<'_, MockChain> {
        self.chain.lock().expect("chain lock poisoned")
    }

    pub fn node(&self, index: usize) -> Node<HttpRpcClient> {
        let url = self.nodes[index].url();
        let client = HttpRpcClient::new(&url, Duration::from_secs(5)).expect("valid node url");
        Node::new(url, client)
    }

    /// Wallet attached to the daemon, unlocked and holding the init key.
    pub async fn wallet(&self) -> WalletApi<DaemonWallet> {
        let client =
            HttpRpcClient::new(&self.wallet.url(), Duration::from_secs(5)).expect("valid wallet url");
        let wallet = WalletApi::new(HttpWallet::attach(client));
        wallet
            .prepare(PASSWORD, &[INIT_KEY.to_string()])
            .await
            .expect("Could not prepare wallet");
        wallet
    }

    pub async fn sessions(&self) -> Vec<Session<HttpRpcClient, DaemonWallet>> {
        let signer = Arc::new(self.wallet().await);
        (0..self.nodes.len())
            .map(|index| Session::new(self.node(index), Arc::clone(&signer)))
            .collect()
    }
}
