use crate::api::parse_time;
use crate::api::request::{ProposalQuery, ProposalStatus};
use crate::fixture::{is_valid_account_name, random_account_name};
use crate::node::wait::{Backoff, wait_until};
use crate::scenario::{ScenarioError, ensure};
use crate::transaction::CreateProposalOperation;
use crate::wallet::{Wallet, WalletApi, WalletError};

#[derive(Debug, Clone)]
pub struct Config {
    pub creator: String,
    /// Account created to receive the proposal, random when unset.
    pub receiver: Option<String>,
    pub backoff: Backoff,
}

async fn count_created_by<W: Wallet>(
    wallet: &WalletApi<W>,
    query: &ProposalQuery,
    creator: &str,
) -> Result<usize, WalletError> {
    let proposals = wallet.list_proposals(query).await?;
    Ok(proposals.iter().filter(|p| p.creator == creator).count())
}

/// Creating a proposal through the wallet grows the creator's listing by exactly one.
pub async fn run<W: Wallet>(wallet: &WalletApi<W>, config: &Config) -> Result<(), ScenarioError> {
    let creator = config.creator.as_str();
    let receiver = config
        .receiver
        .clone()
        .unwrap_or_else(|| random_account_name("crttest"));
    ensure!(
        is_valid_account_name(&receiver),
        "`{receiver}` is not a valid account name"
    );

    wallet.create_account(creator, &receiver, "", true).await?;
    tracing::info!(%creator, %receiver, "Receiver account created");

    let query = &ProposalQuery::by_creator(creator, ProposalStatus::All);
    let before = count_created_by(wallet, query, creator).await?;
    tracing::info!(before, "Proposals before");

    let proposal = CreateProposalOperation {
        creator: creator.to_string(),
        receiver,
        start_date: parse_time("2029-06-02T00:00:00")?,
        end_date: parse_time("2029-08-01T00:00:00")?,
        daily_pay: "1.000 TBD".parse()?,
        subject: "this is subject".to_string(),
        permlink: "http://url.html".to_string(),
    };
    wallet.create_proposal(&proposal, true).await?;

    let after = wait_until(&config.backoff, "proposal listed", || async move {
        let count = count_created_by(wallet, query, creator).await?;
        Ok::<_, WalletError>((count > before).then_some(count))
    })
    .await?;
    tracing::info!(after, "Proposals after");

    ensure!(
        after == before + 1,
        "expected {} proposals of {creator} after creating one, found {after}",
        before + 1
    );
    Ok(())
}
