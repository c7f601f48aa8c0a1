use std::sync::Arc;

use crate::asset::Asset;
use crate::network::client::{ClientError, RpcClient};
use crate::node::Node;
use crate::transaction::{CreateProposalOperation, SignedTransaction};
use crate::wallet::{AccountKeys, Comment, Wallet, WalletApi, WalletError};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Signing failed: {0}")]
    Signing(#[from] WalletError),
    #[error("Broadcast failed: {0}")]
    Broadcast(#[from] ClientError),
    #[error("Transaction {0} expired before it was included")]
    Expired(String),
    #[error("Wallet returned an unsigned {0} transaction")]
    Unsigned(String),
}

/// Writes against one node, signed by a shared wallet.
///
/// The wallet only builds and signs; the signed transaction is broadcast to
/// this session's node so that concurrent sessions can target different nodes.
pub struct Session<C: RpcClient, W: Wallet> {
    node: Node<C>,
    signer: Arc<WalletApi<W>>,
}

impl<C: RpcClient, W: Wallet> Clone for Session<C, W> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            signer: Arc::clone(&self.signer),
        }
    }
}

impl<C: RpcClient, W: Wallet> Session<C, W> {
    pub fn new(node: Node<C>, signer: Arc<WalletApi<W>>) -> Self {
        Self { node, signer }
    }

    pub fn node(&self) -> &Node<C> {
        &self.node
    }

    pub fn signer(&self) -> &WalletApi<W> {
        &self.signer
    }

    async fn submit(
        &self,
        operation: &str,
        transaction: SignedTransaction,
    ) -> Result<SignedTransaction, SessionError> {
        if transaction.signatures() == 0 {
            return Err(SessionError::Unsigned(operation.to_string()));
        }
        let response = self.node.broadcast_transaction(&transaction).await?;
        if response.expired {
            return Err(SessionError::Expired(response.id));
        }
        tracing::info!(
            node = self.node.name(),
            operation,
            block = response.block_num,
            "Transaction broadcast"
        );
        Ok(transaction)
    }

    pub async fn create_account_with_keys(
        &self,
        creator: &str,
        new_account: &str,
        keys: &AccountKeys,
    ) -> Result<SignedTransaction, SessionError> {
        let tx = self
            .signer
            .create_account_with_keys(creator, new_account, keys, false)
            .await?;
        self.submit("account_create", tx).await
    }

    pub async fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: &Asset,
        memo: &str,
    ) -> Result<SignedTransaction, SessionError> {
        let tx = self.signer.transfer(from, to, amount, memo, false).await?;
        self.submit("transfer", tx).await
    }

    pub async fn transfer_to_vesting(
        &self,
        from: &str,
        to: &str,
        amount: &Asset,
    ) -> Result<SignedTransaction, SessionError> {
        let tx = self
            .signer
            .transfer_to_vesting(from, to, amount, false)
            .await?;
        self.submit("transfer_to_vesting", tx).await
    }

    pub async fn post(&self, comment: &Comment) -> Result<SignedTransaction, SessionError> {
        let tx = self.signer.post_comment(comment, false).await?;
        self.submit("comment", tx).await
    }

    pub async fn create_proposal(
        &self,
        proposal: &CreateProposalOperation,
    ) -> Result<SignedTransaction, SessionError> {
        let tx = self.signer.create_proposal(proposal, false).await?;
        self.submit(CreateProposalOperation::NAME, tx).await
    }

    pub async fn update_proposal_votes(
        &self,
        voter: &str,
        proposal_ids: &[u64],
        approve: bool,
    ) -> Result<SignedTransaction, SessionError> {
        let tx = self
            .signer
            .update_proposal_votes(voter, proposal_ids, approve, false)
            .await?;
        self.submit("update_proposal_votes", tx).await
    }

    pub async fn remove_proposal(
        &self,
        owner: &str,
        proposal_ids: &[u64],
    ) -> Result<SignedTransaction, SessionError> {
        let tx = self
            .signer
            .remove_proposal(owner, proposal_ids, false)
            .await?;
        self.submit("remove_proposal", tx).await
    }
}
