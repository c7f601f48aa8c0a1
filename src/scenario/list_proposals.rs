use chrono::NaiveDate;

use crate::api::request::{ListStart, OrderBy, OrderDirection, ProposalQuery, ProposalStatus};
use crate::scenario::{ScenarioError, ensure};
use crate::wallet::{Wallet, WalletApi};

const LIMIT: u16 = 10;

fn start_for(order_by: OrderBy) -> ListStart {
    match order_by {
        OrderBy::Creator => ListStart::Account(String::new()),
        OrderBy::StartDate | OrderBy::EndDate => ListStart::Date(
            NaiveDate::from_ymd_opt(2019, 3, 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
        ),
        OrderBy::TotalVotes => ListStart::Votes(0),
    }
}

/// Every ordering × status combination the wallet accepts.
pub fn queries() -> Vec<ProposalQuery> {
    OrderBy::ALL
        .into_iter()
        .flat_map(|order_by| {
            ProposalStatus::ALL.into_iter().map(move |status| ProposalQuery {
                start: start_for(order_by),
                order_by,
                direction: OrderDirection::Ascending,
                limit: LIMIT,
                status,
            })
        })
        .collect()
}

/// Lists proposals with every combination and fails if any of them errors.
pub async fn run<W: Wallet>(wallet: &WalletApi<W>) -> Result<(), ScenarioError> {
    let mut failures = Vec::new();
    for query in queries() {
        match wallet.list_proposals(&query).await {
            Ok(proposals) => {
                tracing::info!(order_by = %query.order_by, status = %query.status, count = proposals.len(), "Listed proposals");
            }
            Err(e) => {
                tracing::error!(order_by = %query.order_by, status = %query.status, error = %e, "Listing failed");
                failures.push(format!("{}/{}: {e}", query.order_by, query.status));
            }
        }
    }

    ensure!(
        failures.is_empty(),
        "{} listings failed: {}",
        failures.len(),
        failures.join("; ")
    );
    Ok(())
}
