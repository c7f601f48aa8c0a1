use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::api::request::{ProposalQuery, ProposalStatus};
use crate::api::response::Proposal;
use crate::asset::Asset;
use crate::fixture::{account_permlink, date_window, random_subject};
use crate::network::client::{ClientError, RpcClient};
use crate::node::health::unreachable_nodes;
use crate::node::wait::{Backoff, wait_for_blocks, wait_until};
use crate::scenario::{ScenarioError, ensure, find_by_subject};
use crate::session::{Session, SessionError};
use crate::transaction::CreateProposalOperation;
use crate::wallet::{Comment, Wallet};

#[derive(Debug, Clone)]
pub struct Config {
    pub creator: String,
    pub receiver: String,
    /// Delay of each node's worker, in node order. Missing entries mean no delay.
    pub delays: Vec<Duration>,
    pub proposal_count: usize,
    pub daily_pay: Asset,
    pub settle_blocks: u32,
    pub backoff: Backoff,
}

/// Subjects sent to one node.
#[derive(Debug, Clone)]
pub struct Batch {
    pub node: String,
    pub subjects: Vec<String>,
}

pub async fn run<C, W>(sessions: &[Session<C, W>], config: &Config) -> Result<(), ScenarioError>
where
    C: RpcClient + 'static,
    W: Wallet + 'static,
{
    let Some(first) = sessions.first() else {
        return Err(ScenarioError::Check("no nodes to send proposals to".to_string()));
    };
    let creator = config.creator.as_str();
    let permlink = account_permlink(creator);
    first
        .post(&Comment {
            author: creator.to_string(),
            permlink: permlink.clone(),
            title: format!("Steempy proposal title [{creator}]"),
            body: format!("Steempy proposal body [{creator}]"),
        })
        .await?;

    let now = first.node().get_dynamic_global_properties().await?.time;
    let (start_date, end_date) = date_window(now, 1, 2);

    tracing::info!("Creating proposals and workers");
    let proposals: Vec<Vec<CreateProposalOperation>> = sessions
        .iter()
        .map(|_| {
            (0..config.proposal_count)
                .map(|_| CreateProposalOperation {
                    creator: creator.to_string(),
                    receiver: config.receiver.clone(),
                    start_date,
                    end_date,
                    daily_pay: config.daily_pay.clone(),
                    subject: random_subject(),
                    permlink: permlink.clone(),
                })
                .collect()
        })
        .collect();
    let batches: Vec<Batch> = sessions
        .iter()
        .zip(&proposals)
        .map(|(session, batch)| Batch {
            node: session.node().name().to_string(),
            subjects: batch.iter().map(|p| p.subject.clone()).collect(),
        })
        .collect();

    let nodes: Vec<_> = sessions.iter().map(|s| s.node().clone()).collect();
    let unreachable = unreachable_nodes(&nodes).await;
    ensure!(
        unreachable.is_empty(),
        "unreachable nodes: {}",
        unreachable.join(", ")
    );

    tracing::info!(workers = sessions.len(), "Starting workers");
    let workers: Vec<_> = sessions
        .iter()
        .zip(proposals)
        .enumerate()
        .map(|(idx, (session, batch))| {
            let delay = config.delays.get(idx).copied().unwrap_or_default();
            tokio::spawn(send_proposals(session.clone(), batch, delay))
        })
        .collect();

    tracing::info!("Waiting for workers to join");
    let results = join_all(workers).await;
    for (batch, result) in batches.iter().zip(results) {
        let reason = match result {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e.to_string(),
            Err(e) => e.to_string(),
        };
        return Err(ScenarioError::Worker {
            node: batch.node.clone(),
            reason,
        });
    }

    wait_for_blocks(first.node(), config.settle_blocks, &config.backoff).await?;
    // Other nodes may lag behind the first one.
    // Other nodes may still be catching up, so each one is polled until it lists every subject.
    let query = &ProposalQuery::by_creator(creator, ProposalStatus::All);
    let subjects: &Vec<&str> = &batches
        .iter()
        .flat_map(|batch| batch.subjects.iter().map(String::as_str))
        .collect();
    let mut listings = Vec::with_capacity(sessions.len());
    for session in sessions {
        let node = session.node();
        let condition = format!("every proposal listed on {}", node.name());
        let listed = wait_until(&config.backoff, &condition, || async move {
            let listed = node.list_proposals(query).await?;
            let complete = subjects
                .iter()
                .all(|subject| find_by_subject(&listed, subject).is_some());
            Ok::<_, ClientError>(complete.then_some(listed))
        })
        .await?;
        listings.push((node.name().to_string(), listed));
    }
    let ids = verify_ids(&batches, &listings)?;
    tracing::info!(proposals = ids.len(), nodes = listings.len(), "Proposal ids agree across nodes");
    Ok(())
}

async fn send_proposals<C: RpcClient, W: Wallet>(
    session: Session<C, W>,
    proposals: Vec<CreateProposalOperation>,
    delay: Duration,
) -> Result<(), SessionError> {
    tracing::info!(node = session.node().name(), count = proposals.len(), ?delay, "Sending proposals");
    tokio::time::sleep(delay).await;
    for proposal in &proposals {
        session.create_proposal(proposal).await?;
    }
    Ok(())
}

/// Resolves the id of every subject on every node.
///
/// Fails when a node does not list a subject, when nodes disagree on a
/// subject's id, or when two subjects were given the same id.
pub fn verify_ids(
    batches: &[Batch],
    listings: &[(String, Vec<Proposal>)],
) -> Result<BTreeMap<String, u64>, ScenarioError> {
    let mut ids: BTreeMap<String, u64> = BTreeMap::new();
    for batch in batches {
        for subject in &batch.subjects {
            tracing::info!(sent_to = %batch.node, %subject, "Looking for id of proposal");
            for (node, proposals) in listings {
                let Some(proposal) = find_by_subject(proposals, subject) else {
                    return Err(ScenarioError::Check(format!(
                        "proposal {subject} sent to {} is not listed by {node}",
                        batch.node
                    )));
                };
                tracing::info!(%node, id = proposal.id, "Proposal found");
                let id = *ids.entry(subject.clone()).or_insert(proposal.id);
                ensure!(
                    id == proposal.id,
                    "proposal {subject} has id {id} on one node and {} on {node}",
                    proposal.id
                );
            }
        }
    }

    let mut owners: HashMap<u64, &str> = HashMap::new();
    for (subject, id) in &ids {
        if let Some(other) = owners.insert(*id, subject) {
            return Err(ScenarioError::Check(format!(
                "proposals {other} and {subject} share id {id}"
            )));
        }
    }
    Ok(ids)
}
