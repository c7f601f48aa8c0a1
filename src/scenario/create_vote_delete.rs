use crate::api::request::{ProposalQuery, ProposalStatus, VoterQuery};
use crate::api::response::Proposal;
use crate::asset::Asset;
use crate::fixture::{PROPOSAL_PERMLINK, date_window, random_subject};
use crate::network::client::{ClientError, RpcClient};
use crate::node::wait::{Backoff, wait_until};
use crate::scenario::{ScenarioError, ensure, find_by_subject};
use crate::session::Session;
use crate::transaction::{CreateProposalOperation, UpdateProposalVotesOperation};
use crate::wallet::{Comment, Wallet};

/// Start offset and length in days of the proposals seeding the index.
pub const SEED_WINDOWS: [(i64, i64); 9] = [
    (1, 1),
    (2, 2),
    (4, 3),
    (5, 4),
    (5, 5),
    (5, 6),
    (5, 7),
    (5, 8),
    (6, 9),
];

const DAILY_PAY: &str = "16.000 TBD";

#[derive(Debug, Clone)]
pub struct Config {
    pub creator: String,
    pub receiver: String,
    pub iterations: u32,
    pub backoff: Backoff,
}

pub async fn run<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
) -> Result<(), ScenarioError> {
    tracing::info!("Creating initial post");
    session
        .post(&Comment {
            author: config.creator.clone(),
            permlink: PROPOSAL_PERMLINK.to_string(),
            title: "Steempy proposal title".to_string(),
            body: "Steempy proposal body".to_string(),
        })
        .await?;

    tracing::info!("Populating proposal index");
    let seed_subject = random_subject();
    for (start_days, length_days) in SEED_WINDOWS {
        let proposal = new_proposal(session, config, &seed_subject, start_days, length_days).await?;
        session.create_proposal(&proposal).await?;
    }

    for iteration in 0..config.iterations {
        let subject = random_subject();
        tracing::info!(iteration, %subject, "Starting iteration");
        create_proposal(session, config, &subject).await?;
        let proposal = list_proposals(session, config, &subject).await?;
        find_proposal(session, &proposal).await?;
        vote_proposal(session, config, &proposal).await?;
        list_voter_proposals(session, config, &subject).await?;
        remove_proposal(session, config, &proposal).await?;
    }
    Ok(())
}

async fn new_proposal<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
    subject: &str,
    start_days: i64,
    length_days: i64,
) -> Result<CreateProposalOperation, ScenarioError> {
    let now = session.node().get_dynamic_global_properties().await?.time;
    let (start_date, end_date) = date_window(now, start_days, length_days);
    Ok(CreateProposalOperation {
        creator: config.creator.clone(),
        receiver: config.receiver.clone(),
        start_date,
        end_date,
        daily_pay: DAILY_PAY.parse::<Asset>()?,
        subject: subject.to_string(),
        permlink: PROPOSAL_PERMLINK.to_string(),
    })
}

async fn create_proposal<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
    subject: &str,
) -> Result<(), ScenarioError> {
    tracing::info!("Testing: create_proposal");
    let proposal = new_proposal(session, config, subject, 10, 2).await?;
    let tx = session.create_proposal(&proposal).await?;

    let echoed: CreateProposalOperation = tx.operation(0, CreateProposalOperation::NAME)?;
    ensure!(
        echoed == proposal,
        "create_proposal operation {echoed:?} differs from request {proposal:?}"
    );
    Ok(())
}

async fn listed<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    creator: &str,
    status: ProposalStatus,
    subject: &str,
) -> Result<Option<Proposal>, ClientError> {
    let proposals = session
        .node()
        .list_proposals(&ProposalQuery::by_creator(creator, status))
        .await?;
    Ok(find_by_subject(&proposals, subject).cloned())
}

/// The new proposal starts in the future: inactive, not active, and part of all.
async fn list_proposals<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
    subject: &str,
) -> Result<Proposal, ScenarioError> {
    tracing::info!("Testing: list_proposals");
    let creator = config.creator.as_str();
    let proposal = wait_until(&config.backoff, "inactive proposal listed", || async move {
        listed(session, creator, ProposalStatus::Inactive, subject).await
    })
    .await?;

    let active = listed(session, creator, ProposalStatus::Active, subject).await?;
    ensure!(active.is_none(), "proposal {subject} is listed as active");

    let all = listed(session, creator, ProposalStatus::All, subject).await?;
    ensure!(all.is_some(), "proposal {subject} is missing from all proposals");
    Ok(proposal)
}

async fn find_proposal<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    proposal: &Proposal,
) -> Result<(), ScenarioError> {
    tracing::info!("Testing: find_proposals");
    let found = session.node().find_proposals(&[proposal.id]).await?;
    let subject = found.first().map(|p| p.subject.as_str());
    ensure!(
        subject == Some(proposal.subject.as_str()),
        "find_proposals({}) returned {subject:?}, expected {}",
        proposal.id,
        proposal.subject
    );
    Ok(())
}

async fn vote_proposal<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
    proposal: &Proposal,
) -> Result<(), ScenarioError> {
    tracing::info!("Testing: vote_proposal");
    let tx = session
        .update_proposal_votes(&config.creator, &[proposal.id], true)
        .await?;

    let vote: UpdateProposalVotesOperation = tx.operation(0, UpdateProposalVotesOperation::NAME)?;
    ensure!(vote.voter == config.creator, "vote cast by {}", vote.voter);
    ensure!(
        vote.proposal_ids.first() == Some(&proposal.id),
        "vote targets {:?} instead of {}",
        vote.proposal_ids,
        proposal.id
    );
    ensure!(vote.approve, "vote does not approve proposal {}", proposal.id);
    Ok(())
}

async fn list_voter_proposals<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
    subject: &str,
) -> Result<(), ScenarioError> {
    tracing::info!("Testing: list_voter_proposals");
    let query = &VoterQuery::new(&config.creator, ProposalStatus::Inactive);
    let node = session.node();
    wait_until(&config.backoff, "voted proposal listed", || async move {
        let voter_proposals = node.list_voter_proposals(query).await?;
        let found = voter_proposals
            .values()
            .any(|proposals| find_by_subject(proposals, subject).is_some());
        Ok::<_, ClientError>(found.then_some(()))
    })
    .await?;
    Ok(())
}

async fn remove_proposal<C: RpcClient, W: Wallet>(
    session: &Session<C, W>,
    config: &Config,
    proposal: &Proposal,
) -> Result<(), ScenarioError> {
    tracing::info!("Testing: remove_proposal");
    session
        .remove_proposal(&config.creator, &[proposal.id])
        .await?;

    let creator = config.creator.as_str();
    let subject = proposal.subject.as_str();
    wait_until(&config.backoff, "removed proposal unlisted", || async move {
        let remaining = listed(session, creator, ProposalStatus::Inactive, subject).await?;
        Ok::<_, ClientError>(remaining.is_none().then_some(()))
    })
    .await?;
    Ok(())
}
