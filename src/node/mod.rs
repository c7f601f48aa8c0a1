pub mod health;
pub mod wait;

use serde_json::{Value, json};
use std::sync::Arc;

use crate::api::request::{ProposalQuery, VoterQuery};
use crate::api::response::{
    Account, AccountHistory, BroadcastResponse, DynamicGlobalProperties, GenerateBlocksResponse,
    Proposal, VoterProposals,
};
use crate::network::client::{ClientError, RpcClient, RpcParams};
use crate::transaction::SignedTransaction;

/// JSON-RPC view of a single node.
pub struct Node<C: RpcClient> {
    name: String,
    client: Arc<C>,
}

impl<C: RpcClient> Clone for Node<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: RpcClient> Node<C> {
    pub fn new(name: impl Into<String>, client: C) -> Self {
        Self {
            name: name.into(),
            client: Arc::new(client),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    pub async fn get_dynamic_global_properties(
        &self,
    ) -> Result<DynamicGlobalProperties, ClientError> {
        self.client
            .call(
                "condenser_api.get_dynamic_global_properties",
                RpcParams::none(),
            )
            .await
    }

    pub async fn list_proposals(&self, query: &ProposalQuery) -> Result<Vec<Proposal>, ClientError> {
        let params = RpcParams::Positional(query.to_api_params());
        let proposals: Vec<Proposal> = self
            .client
            .call("condenser_api.list_proposals", params)
            .await?;
        tracing::debug!(node = %self.name, ?query.status, count = proposals.len(), "Listed proposals");
        Ok(proposals)
    }

    pub async fn find_proposals(&self, ids: &[u64]) -> Result<Vec<Proposal>, ClientError> {
        let params = RpcParams::Positional(vec![json!(ids)]);
        self.client.call("condenser_api.find_proposals", params).await
    }

    pub async fn list_voter_proposals(
        &self,
        query: &VoterQuery,
    ) -> Result<VoterProposals, ClientError> {
        let params = RpcParams::Positional(query.to_api_params());
        self.client
            .call("condenser_api.list_voter_proposals", params)
            .await
    }

    pub async fn get_accounts(&self, names: &[String]) -> Result<Vec<Account>, ClientError> {
        let params = RpcParams::Positional(vec![json!(names)]);
        self.client.call("condenser_api.get_accounts", params).await
    }

    pub async fn get_account_history(
        &self,
        account: &str,
        limit: u32,
    ) -> Result<AccountHistory, ClientError> {
        let params = RpcParams::Positional(vec![json!(account), json!(-1), json!(limit)]);
        self.client
            .call("condenser_api.get_account_history", params)
            .await
    }

    /// Returns once the transaction made it into a block.
    pub async fn broadcast_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<BroadcastResponse, ClientError> {
        let transaction = serde_json::to_value(transaction)
            .map_err(|e| ClientError::RequestError(e.to_string()))?;
        let params = RpcParams::Positional(vec![transaction]);
        let response: BroadcastResponse = self
            .client
            .call("condenser_api.broadcast_transaction_synchronous", params)
            .await?;
        tracing::debug!(node = %self.name, response.block_num, %response.id, "Transaction included");
        Ok(response)
    }

    pub async fn debug_generate_blocks(
        &self,
        debug_key: &str,
        count: u32,
    ) -> Result<u32, ClientError> {
        let params = RpcParams::ByName(vec![
            ("debug_key", Value::from(debug_key)),
            ("count", Value::from(count)),
            ("skip", Value::from(0)),
            ("miss_blocks", Value::from(0)),
            ("edit_if_needed", Value::from(true)),
        ]);
        let response: GenerateBlocksResponse = self
            .client
            .call("debug_node_api.debug_generate_blocks", params)
            .await?;
        tracing::debug!(node = %self.name, requested = count, generated = response.blocks, "Generated blocks");
        Ok(response.blocks)
    }
}
