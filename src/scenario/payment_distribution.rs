use crate::api::request::{ProposalQuery, ProposalStatus};
use crate::api::response::Proposal;
use crate::asset::Asset;
use crate::fixture::{
    account_permlink, date_window, is_valid_account_name, random_account_name, random_subject,
};
use crate::network::client::{ClientError, RpcClient};
use crate::node::wait::{Backoff, wait_until};
use crate::scenario::{ScenarioError, ensure, find_by_subject};
use crate::session::Session;
use crate::transaction::CreateProposalOperation;
use crate::wallet::{AccountKeys, Comment, Wallet};

/// Most proposal ids a single vote operation may carry.
const MAX_VOTED_IDS: usize = 5;
const SETTLE_BLOCKS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub creator: String,
    /// Key authorised to produce blocks on the debug node.
    pub debug_key: String,
    pub account_count: usize,
    pub vesting: Asset,
    pub liquid: Asset,
    pub liquid_sbd: Asset,
    pub daily_pay: Asset,
    /// Blocks generated to cross at least one proposal maintenance period.
    pub maintenance_blocks: u32,
    pub erase_proposals: bool,
    pub backoff: Backoff,
}

/// Proposal created by, and paying, one test account.
#[derive(Debug, Clone)]
struct Funded {
    account: String,
    proposal: Proposal,
}

pub async fn run<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
) -> Result<(), ScenarioError> {
    let accounts = create_accounts(session, config).await?;
    generate_blocks(session, config, SETTLE_BLOCKS).await?;

    for account in &accounts {
        session
            .transfer_to_vesting(&config.creator, account, &config.vesting)
            .await?;
    }
    generate_blocks(session, config, SETTLE_BLOCKS).await?;

    for account in &accounts {
        session
            .transfer(&config.creator, account, &config.liquid, "initial transfer")
            .await?;
        session
            .transfer(&config.creator, account, &config.liquid_sbd, "initial transfer")
            .await?;
    }
    generate_blocks(session, config, SETTLE_BLOCKS).await?;

    for account in &accounts {
        session
            .post(&Comment {
                author: account.clone(),
                permlink: account_permlink(account),
                title: format!("Steempy proposal title [{account}]"),
                body: format!("Steempy proposal body [{account}]"),
            })
            .await?;
    }
    generate_blocks(session, config, SETTLE_BLOCKS).await?;

    let funded = create_proposals(session, config, &accounts).await?;
    vote(session, &funded).await?;
    generate_blocks(session, config, SETTLE_BLOCKS).await?;

    let before = sbd_balances(session, &accounts).await?;
    tracing::info!(blocks = config.maintenance_blocks, "Generating blocks past maintenance");
    generate_blocks(session, config, config.maintenance_blocks).await?;
    let after = sbd_balances(session, &accounts).await?;

    let mut payouts = Vec::with_capacity(accounts.len());
    for ((account, before), after) in accounts.iter().zip(&before).zip(&after) {
        let payout = after.checked_sub(before)?;
        tracing::info!(%account, %payout, "Proposal payout");
        payouts.push((account.clone(), payout));
    }
    check_payouts(&payouts)?;
    check_history(session, &payouts).await?;

    if config.erase_proposals {
        for entry in &funded {
            session
                .remove_proposal(&entry.account, &[entry.proposal.id])
                .await?;
        }
        tracing::info!(count = funded.len(), "Proposals removed");
    }
    Ok(())
}

async fn create_accounts<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
) -> Result<Vec<String>, ScenarioError> {
    let mut accounts = Vec::with_capacity(config.account_count);
    for _ in 0..config.account_count {
        let name = random_account_name("sps");
        ensure!(
            is_valid_account_name(&name),
            "generated account name `{name}` is invalid"
        );
        let brain_key = session.signer().suggest_brain_key().await?;
        session
            .create_account_with_keys(&config.creator, &name, &AccountKeys::single(&brain_key.pub_key))
            .await?;
        session.signer().import_key(&brain_key.wif_priv_key).await?;
        tracing::info!(account = %name, "Test account created");
        accounts.push(name);
    }
    Ok(accounts)
}

async fn generate_blocks<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
    count: u32,
) -> Result<(), ScenarioError> {
    let generated = session
        .node()
        .debug_generate_blocks(&config.debug_key, count)
        .await?;
    ensure!(
        generated == count,
        "node generated {generated} of {count} requested blocks"
    );
    Ok(())
}

async fn create_proposals<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
    accounts: &[String],
) -> Result<Vec<Funded>, ScenarioError> {
    let now = session.node().get_dynamic_global_properties().await?.time;
    let (start_date, end_date) = date_window(now, 0, 2);

    let mut funded = Vec::with_capacity(accounts.len());
    for account in accounts {
        let subject = random_subject();
        session
            .create_proposal(&CreateProposalOperation {
                creator: account.clone(),
                receiver: account.clone(),
                start_date,
                end_date,
                daily_pay: config.daily_pay.clone(),
                subject: subject.clone(),
                permlink: account_permlink(account),
            })
            .await?;

        let query = &ProposalQuery::by_creator(account, ProposalStatus::All);
        let node = session.node();
        let subject = subject.as_str();
        let proposal = wait_until(&config.backoff, "funded proposal listed", || async move {
            let listed = node.list_proposals(query).await?;
            Ok::<_, ClientError>(find_by_subject(&listed, subject).cloned())
        })
        .await?;
        tracing::info!(%account, id = proposal.id, "Proposal created");
        funded.push(Funded {
            account: account.clone(),
            proposal,
        });
    }
    Ok(funded)
}

/// Account `j` approves the first `n - j` proposals, so proposal `i` collects `n - i` votes.
async fn vote<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    funded: &[Funded],
) -> Result<(), ScenarioError> {
    let ids: Vec<u64> = funded.iter().map(|f| f.proposal.id).collect();
    for (j, voter) in funded.iter().enumerate() {
        for chunk in ids[..ids.len() - j].chunks(MAX_VOTED_IDS) {
            session
                .update_proposal_votes(&voter.account, chunk, true)
                .await?;
        }
    }
    Ok(())
}

async fn sbd_balances<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    accounts: &[String],
) -> Result<Vec<Asset>, ScenarioError> {
    let found = session.node().get_accounts(accounts).await?;
    accounts
        .iter()
        .map(|name| {
            found
                .iter()
                .find(|a| &a.name == name)
                .map(|a| a.sbd_balance.clone())
                .ok_or_else(|| ScenarioError::Check(format!("account {name} not found")))
        })
        .collect()
}

/// Payouts are listed from the most to the least voted proposal.
pub fn check_payouts(payouts: &[(String, Asset)]) -> Result<(), ScenarioError> {
    ensure!(
        payouts.iter().any(|(_, payout)| payout.amount > 0),
        "no proposal was paid"
    );
    for pair in payouts.windows(2) {
        let ((more_voted, higher), (less_voted, lower)) = (&pair[0], &pair[1]);
        ensure!(
            lower.amount <= higher.amount,
            "{less_voted} received {lower} with fewer votes than {more_voted} who received {higher}"
        );
    }
    Ok(())
}

async fn check_history<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    payouts: &[(String, Asset)],
) -> Result<(), ScenarioError> {
    for (account, payout) in payouts.iter().filter(|(_, p)| p.amount > 0) {
        let history = session.node().get_account_history(account, 100).await?;
        let paid = history
            .iter()
            .any(|(_, item)| item.op.name() == "proposal_pay");
        ensure!(
            paid,
            "{account} received {payout} without a proposal_pay entry in its history"
        );
    }
    Ok(())
}
