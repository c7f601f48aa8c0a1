use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use sps_tester::args::{Args, PollingArgs, Scenario, WalletArgs};
use sps_tester::asset::Asset;
use sps_tester::network::client::HttpRpcClient;
use sps_tester::node::Node;
use sps_tester::scenario::{
    self, ScenarioError, create_proposal, create_vote_delete, id_collision, list_proposals,
    payment_distribution,
};
use sps_tester::session::Session;
use sps_tester::wallet::{self, CliWallet, WalletApi};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)?;
    let stdout_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_file(true)
        .with_line_number(true);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let polling = args.polling;
    let code = match args.scenario {
        Scenario::CreateProposal {
            creator,
            receiver,
            wallet,
        } => {
            scenario::run("create_proposal", async {
                let wallet = open_wallet(&wallet, &[], &polling).await?;
                let config = create_proposal::Config {
                    creator,
                    receiver,
                    backoff: polling.backoff(),
                };
                create_proposal::run(&wallet, &config).await
            })
            .await
        }
        Scenario::ListProposals { wallet } => {
            scenario::run("list_proposals", async {
                let wallet = open_wallet(&wallet, &[], &polling).await?;
                list_proposals::run(&wallet).await
            })
            .await
        }
        Scenario::CreateVoteDelete {
            creator,
            receiver,
            wif,
            node_url,
            iterations,
            wallet,
        } => {
            scenario::run("create_vote_delete", async {
                tracing::info!(%node_url, "Using node");
                let signer = Arc::new(open_wallet(&wallet, &[wif], &polling).await?);
                let session = Session::new(connect(&node_url, &polling)?, signer);
                let config = create_vote_delete::Config {
                    creator,
                    receiver,
                    iterations,
                    backoff: polling.backoff(),
                };
                create_vote_delete::run(&session, &config).await
            })
            .await
        }
        Scenario::IdCollision {
            creator,
            receiver,
            wif,
            nodes_url,
            delays,
            proposal_count,
            daily_pay,
            wallet,
        } => {
            scenario::run("id_collision", async {
                let signer = Arc::new(open_wallet(&wallet, &[wif], &polling).await?);
                let mut sessions = Vec::with_capacity(nodes_url.len());
                for url in &nodes_url {
                    sessions.push(Session::new(connect(url, &polling)?, Arc::clone(&signer)));
                }
                let config = id_collision::Config {
                    creator,
                    receiver,
                    delays: delays
                        .iter()
                        .map(|secs| Duration::try_from_secs_f64(*secs).unwrap_or_default())
                        .collect(),
                    proposal_count,
                    daily_pay,
                    settle_blocks: 5,
                    backoff: polling.backoff(),
                };
                id_collision::run(&sessions, &config).await
            })
            .await
        }
        Scenario::PaymentDistribution {
            creator,
            wif,
            node_url,
            accounts,
            daily_pay,
            maintenance_blocks,
            no_erase_proposal,
            wallet,
        } => {
            scenario::run("payment_distribution", async {
                tracing::info!(%node_url, "Using node");
                let signer = Arc::new(open_wallet(&wallet, &[wif.clone()], &polling).await?);
                let session = Session::new(connect(&node_url, &polling)?, signer);
                let config = payment_distribution::Config {
                    creator,
                    debug_key: wif,
                    account_count: accounts,
                    vesting: "310.000 TESTS".parse::<Asset>()?,
                    liquid: "399.000 TESTS".parse::<Asset>()?,
                    liquid_sbd: "398.000 TBD".parse::<Asset>()?,
                    daily_pay,
                    maintenance_blocks,
                    erase_proposals: !no_erase_proposal,
                    backoff: polling.backoff(),
                };
                payment_distribution::run(&session, &config).await
            })
            .await
        }
    };
    Ok(code)
}

async fn open_wallet(
    args: &WalletArgs,
    extra_keys: &[String],
    polling: &PollingArgs,
) -> Result<WalletApi<CliWallet>, ScenarioError> {
    let config = args.config(polling.request_timeout());
    let wallet = WalletApi::new(wallet::launch(&config, &polling.backoff()).await?);
    let keys: Vec<String> = args
        .private_keys
        .iter()
        .chain(extra_keys)
        .cloned()
        .collect();
    wallet.prepare(&args.wallet_password, &keys).await?;
    Ok(wallet)
}

fn connect(url: &str, polling: &PollingArgs) -> Result<Node<HttpRpcClient>, ScenarioError> {
    let client = HttpRpcClient::new(url, polling.request_timeout())?;
    Ok(Node::new(url, client))
}
