use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::format_time;
use crate::api::request::{ProposalQuery, VoterQuery};
use crate::api::response::{BrainKey, Proposal, VoterProposals};
use crate::asset::Asset;
use crate::transaction::{CreateProposalOperation, SignedTransaction};
use crate::wallet::command::WalletCommand;
use crate::wallet::{Wallet, WalletError};

/// Public keys of a new account's authorities.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountKeys {
    pub owner: String,
    pub active: String,
    pub posting: String,
    pub memo: String,
}

impl AccountKeys {
    /// Uses one key for every authority.
    pub fn single(public_key: &str) -> Self {
        Self {
            owner: public_key.to_string(),
            active: public_key.to_string(),
            posting: public_key.to_string(),
            memo: public_key.to_string(),
        }
    }
}

/// Top-level post proposals link to through their permlink.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub author: String,
    pub permlink: String,
    pub title: String,
    pub body: String,
}

impl Comment {
    pub const PARENT_PERMLINK: &'static str = "proposals";

    fn json_metadata() -> Value {
        json!({ "tags": [Self::PARENT_PERMLINK] }).to_string().into()
    }
}

/// Typed calls on top of a raw [`Wallet`].
pub struct WalletApi<W: Wallet> {
    wallet: W,
}

impl<W: Wallet> WalletApi<W> {
    pub fn new(wallet: W) -> Self {
        Self { wallet }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    async fn call<T: DeserializeOwned>(&self, command: WalletCommand) -> Result<T, WalletError> {
        let method = command.method.clone();
        let result = self.wallet.execute(command).await?;
        serde_json::from_value(result).map_err(|e| WalletError::InvalidResponse {
            method,
            reason: e.to_string(),
        })
    }

    pub async fn is_new(&self) -> Result<bool, WalletError> {
        self.call(WalletCommand::new("is_new")).await
    }

    pub async fn set_password(&self, password: &str) -> Result<(), WalletError> {
        let _: Value = self
            .call(WalletCommand::new("set_password").arg(password))
            .await?;
        Ok(())
    }

    pub async fn unlock(&self, password: &str) -> Result<(), WalletError> {
        let _: Value = self.call(WalletCommand::new("unlock").arg(password)).await?;
        Ok(())
    }

    pub async fn import_key(&self, wif: &str) -> Result<(), WalletError> {
        let _: Value = self.call(WalletCommand::new("import_key").arg(wif)).await?;
        Ok(())
    }

    /// Sets the password of a fresh wallet, unlocks it and imports `keys`.
    pub async fn prepare(&self, password: &str, keys: &[String]) -> Result<(), WalletError> {
        if self.is_new().await? {
            tracing::info!("Setting password of new wallet");
            self.set_password(password).await?;
        }
        self.unlock(password).await?;
        for key in keys {
            self.import_key(key).await?;
        }
        tracing::info!(keys = keys.len(), "Wallet unlocked");
        Ok(())
    }

    pub async fn suggest_brain_key(&self) -> Result<BrainKey, WalletError> {
        self.call(WalletCommand::new("suggest_brain_key")).await
    }

    /// Creates an account whose keys are derived and stored by the wallet.
    pub async fn create_account(
        &self,
        creator: &str,
        new_account: &str,
        json_meta: &str,
        broadcast: bool,
    ) -> Result<SignedTransaction, WalletError> {
        let command = WalletCommand::new("create_account")
            .arg(creator)
            .arg(new_account)
            .arg(json_meta)
            .arg(broadcast);
        self.call(command).await
    }

    pub async fn create_account_with_keys(
        &self,
        creator: &str,
        new_account: &str,
        keys: &AccountKeys,
        broadcast: bool,
    ) -> Result<SignedTransaction, WalletError> {
        let command = WalletCommand::new("create_account_with_keys")
            .arg(creator)
            .arg(new_account)
            .arg("")
            .arg(keys.owner.as_str())
            .arg(keys.active.as_str())
            .arg(keys.posting.as_str())
            .arg(keys.memo.as_str())
            .arg(broadcast);
        self.call(command).await
    }

    pub async fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: &Asset,
        memo: &str,
        broadcast: bool,
    ) -> Result<SignedTransaction, WalletError> {
        let command = WalletCommand::new("transfer")
            .arg(from)
            .arg(to)
            .arg(amount.to_string())
            .arg(memo)
            .arg(broadcast);
        self.call(command).await
    }

    pub async fn transfer_to_vesting(
        &self,
        from: &str,
        to: &str,
        amount: &Asset,
        broadcast: bool,
    ) -> Result<SignedTransaction, WalletError> {
        let command = WalletCommand::new("transfer_to_vesting")
            .arg(from)
            .arg(to)
            .arg(amount.to_string())
            .arg(broadcast);
        self.call(command).await
    }

    pub async fn post_comment(
        &self,
        comment: &Comment,
        broadcast: bool,
    ) -> Result<SignedTransaction, WalletError> {
        let command = WalletCommand::new("post_comment")
            .arg(comment.author.as_str())
            .arg(comment.permlink.as_str())
            .arg("")
            .arg(Comment::PARENT_PERMLINK)
            .arg(comment.title.as_str())
            .arg(comment.body.as_str())
            .arg(Comment::json_metadata())
            .arg(broadcast);
        self.call(command).await
    }

    pub async fn create_proposal(
        &self,
        proposal: &CreateProposalOperation,
        broadcast: bool,
    ) -> Result<SignedTransaction, WalletError> {
        let command = WalletCommand::new("create_proposal")
            .arg(proposal.creator.as_str())
            .arg(proposal.receiver.as_str())
            .arg(format_time(&proposal.start_date))
            .arg(format_time(&proposal.end_date))
            .arg(proposal.daily_pay.to_string())
            .arg(proposal.subject.as_str())
            .arg(proposal.permlink.as_str())
            .arg(broadcast);
        self.call(command).await
    }

    pub async fn update_proposal_votes(
        &self,
        voter: &str,
        proposal_ids: &[u64],
        approve: bool,
        broadcast: bool,
    ) -> Result<SignedTransaction, WalletError> {
        let command = WalletCommand::new("update_proposal_votes")
            .arg(voter)
            .arg(proposal_ids)
            .arg(approve)
            .arg(broadcast);
        self.call(command).await
    }

    pub async fn remove_proposal(
        &self,
        deleter: &str,
        proposal_ids: &[u64],
        broadcast: bool,
    ) -> Result<SignedTransaction, WalletError> {
        let command = WalletCommand::new("remove_proposal")
            .arg(deleter)
            .arg(proposal_ids)
            .arg(broadcast);
        self.call(command).await
    }

    pub async fn list_proposals(&self, query: &ProposalQuery) -> Result<Vec<Proposal>, WalletError> {
        let command = WalletCommand::new("list_proposals").args(query.to_wallet_args());
        self.call(command).await
    }

    pub async fn list_voter_proposals(
        &self,
        query: &VoterQuery,
    ) -> Result<VoterProposals, WalletError> {
        let command = WalletCommand::new("list_voter_proposals").args(query.to_wallet_args());
        self.call(command).await
    }

    pub async fn find_proposals(&self, proposal_ids: &[u64]) -> Result<Vec<Proposal>, WalletError> {
        self.call(WalletCommand::new("find_proposals").arg(proposal_ids))
            .await
    }
}
