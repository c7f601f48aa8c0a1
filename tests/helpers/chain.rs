use chrono::{NaiveDateTime, TimeDelta};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};

use sps_tester::api::request::{OrderBy, ProposalStatus};
use sps_tester::api::{format_time, parse_time};
use sps_tester::asset::Asset;
use sps_tester::transaction::{
    CreateProposalOperation, Operation, RemoveProposalOperation, UpdateProposalVotesOperation,
};

pub const GENESIS_TIME: &str = "2019-03-01T00:00:00";
pub const BLOCK_INTERVAL_SECS: i64 = 3;
pub const MAINTENANCE_BLOCKS: u32 = 1200;
const VESTS_PER_TESTS: i64 = 1000;

#[derive(Debug, Clone)]
struct Balances {
    balance: Asset,
    sbd_balance: Asset,
    vesting_shares: Asset,
}

impl Balances {
    fn new(tests: i64, tbd: i64, vests: i64) -> Self {
        Self {
            balance: Asset::new(tests, 3, "TESTS"),
            sbd_balance: Asset::new(tbd, 3, "TBD"),
            vesting_shares: Asset::new(vests, 6, "VESTS"),
        }
    }
}

/// In-memory stand-in for a node's proposal state and the wallet attached to it.
pub struct MockChain {
    pub head_block: u32,
    pub time: NaiveDateTime,
    next_proposal_id: u64,
    proposals: BTreeMap<u64, CreateProposalOperation>,
    /// Block each proposal was created in.
    proposal_blocks: BTreeMap<u64, u32>,
    votes: BTreeMap<String, BTreeSet<u64>>,
    accounts: BTreeMap<String, Balances>,
    history: BTreeMap<String, Vec<Value>>,
    posts: BTreeSet<(String, String)>,
    blocks_since_maintenance: u32,
    /// How many of the most voted proposals the treasury can pay per maintenance.
    pub funded_per_maintenance: usize,
    pub wallet_password: Option<String>,
    pub wallet_unlocked: bool,
    pub wallet_keys: Vec<String>,
}

impl MockChain {
    pub fn new() -> Self {
        let mut accounts = BTreeMap::new();
        accounts.insert(
            "initminer".to_string(),
            Balances::new(1_000_000_000, 1_000_000_000, 1_000_000_000_000),
        );
        Self {
            head_block: 1,
            time: parse_time(GENESIS_TIME).expect("valid genesis time"),
            next_proposal_id: 0,
            proposals: BTreeMap::new(),
            proposal_blocks: BTreeMap::new(),
            votes: BTreeMap::new(),
            accounts,
            history: BTreeMap::new(),
            posts: BTreeSet::new(),
            blocks_since_maintenance: 0,
            funded_per_maintenance: 2,
            wallet_password: None,
            wallet_unlocked: false,
            wallet_keys: Vec::new(),
        }
    }

    pub fn with_account(mut self, name: &str) -> Self {
        self.accounts.insert(name.to_string(), Balances::new(0, 0, 0));
        self
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    pub fn global_properties(&self) -> Value {
        json!({
            "head_block_number": self.head_block,
            "head_block_id": format!("{:08x}{}", self.head_block, "0".repeat(32)),
            "time": format_time(&self.time),
        })
    }

    pub fn generate_blocks(&mut self, count: u32) -> u32 {
        for _ in 0..count {
            self.head_block += 1;
            self.time += TimeDelta::seconds(BLOCK_INTERVAL_SECS);
            self.blocks_since_maintenance += 1;
            if self.blocks_since_maintenance >= MAINTENANCE_BLOCKS {
                self.pay_proposals(i64::from(self.blocks_since_maintenance) * BLOCK_INTERVAL_SECS);
                self.blocks_since_maintenance = 0;
            }
        }
        count
    }

    fn is_active(&self, proposal: &CreateProposalOperation) -> bool {
        self.time >= proposal.start_date && self.time <= proposal.end_date
    }

    fn total_votes(&self, id: u64) -> u64 {
        let voters = self.votes.values().filter(|ids| ids.contains(&id)).count() as u64;
        voters * 1_000_000
    }

    fn pay_proposals(&mut self, elapsed_secs: i64) {
        let mut funded: Vec<(u64, u64)> = self
            .proposals
            .iter()
            .filter(|(_, p)| self.is_active(p))
            .map(|(id, _)| (*id, self.total_votes(*id)))
            .filter(|(_, votes)| *votes > 0)
            .collect();
        funded.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        for (id, _) in funded.into_iter().take(self.funded_per_maintenance) {
            let Some(proposal) = self.proposals.get(&id).cloned() else {
                continue;
            };
            let payment = Asset::new(
                proposal.daily_pay.amount * elapsed_secs / 86_400,
                proposal.daily_pay.precision,
                &proposal.daily_pay.symbol,
            );
            if let Some(receiver) = self.accounts.get_mut(&proposal.receiver) {
                receiver.sbd_balance.amount += payment.amount;
            }
            self.record(
                &proposal.receiver,
                "proposal_pay",
                json!({"receiver": proposal.receiver, "payment": payment.to_string()}),
            );
        }
    }

    fn record(&mut self, account: &str, name: &str, payload: Value) {
        let block = self.head_block;
        let entries = self.history.entry(account.to_string()).or_default();
        let sequence = entries.len();
        entries.push(json!([sequence, {
            "block": block,
            "trx_id": "0000000000000000000000000000000000000000",
            "timestamp": format_time(&self.time),
            "op": [name, payload],
        }]));
    }

    /// Applies every operation of a signed transaction, or none of them.
    pub fn apply(&mut self, transaction: &Value) -> Result<Value, String> {
        let operations: Vec<Operation> =
            serde_json::from_value(transaction["operations"].clone()).map_err(|e| e.to_string())?;
        let snapshot = (
            self.next_proposal_id,
            self.proposals.clone(),
            self.votes.clone(),
            self.accounts.clone(),
            self.posts.clone(),
        );
        for operation in &operations {
            if let Err(e) = self.apply_operation(operation) {
                (
                    self.next_proposal_id,
                    self.proposals,
                    self.votes,
                    self.accounts,
                    self.posts,
                ) = snapshot;
                return Err(e);
            }
        }
        self.generate_blocks(1);
        Ok(json!({
            "id": format!("{:040x}", self.head_block),
            "block_num": self.head_block,
            "trx_num": 0,
            "expired": false,
        }))
    }

    fn apply_operation(&mut self, operation: &Operation) -> Result<(), String> {
        let payload = &operation.1;
        match operation.name() {
            "account_create" => {
                let name = text(&payload["new_account_name"])?;
                if self.accounts.contains_key(&name) {
                    return Err(format!("10 assert_exception: account {name} already exists"));
                }
                self.accounts.insert(name, Balances::new(0, 0, 0));
            }
            "transfer" => {
                let from = text(&payload["from"])?;
                let to = text(&payload["to"])?;
                let amount = asset(&payload["amount"])?;
                self.move_funds(&from, &to, &amount)?;
            }
            "transfer_to_vesting" => {
                let from = text(&payload["from"])?;
                let to = text(&payload["to"])?;
                let amount = asset(&payload["amount"])?;
                self.account_mut(&from)?.balance.amount -= amount.amount;
                self.account_mut(&to)?.vesting_shares.amount += amount.amount * VESTS_PER_TESTS;
            }
            "comment" => {
                let author = text(&payload["author"])?;
                self.account_mut(&author)?;
                self.posts.insert((author, text(&payload["permlink"])?));
            }
            CreateProposalOperation::NAME => {
                let proposal: CreateProposalOperation =
                    operation.payload(CreateProposalOperation::NAME).map_err(|e| e.to_string())?;
                self.account_mut(&proposal.creator)?;
                self.account_mut(&proposal.receiver)?;
                if proposal.end_date <= proposal.start_date {
                    return Err("10 assert_exception: end date must follow start date".to_string());
                }
                let id = self.next_proposal_id;
                self.next_proposal_id += 1;
                self.proposals.insert(id, proposal);
                self.proposal_blocks.insert(id, self.head_block);
            }
            UpdateProposalVotesOperation::NAME => {
                let vote: UpdateProposalVotesOperation = operation
                    .payload(UpdateProposalVotesOperation::NAME)
                    .map_err(|e| e.to_string())?;
                for id in &vote.proposal_ids {
                    if !self.proposals.contains_key(id) {
                        return Err(format!("10 assert_exception: proposal {id} does not exist"));
                    }
                }
                let voted = self.votes.entry(vote.voter).or_default();
                for id in vote.proposal_ids {
                    if vote.approve {
                        voted.insert(id);
                    } else {
                        voted.remove(&id);
                    }
                }
            }
            RemoveProposalOperation::NAME => {
                let removal: RemoveProposalOperation = operation
                    .payload(RemoveProposalOperation::NAME)
                    .map_err(|e| e.to_string())?;
                for id in &removal.proposal_ids {
                    match self.proposals.get(id) {
                        Some(p) if p.creator == removal.proposal_owner => {}
                        _ => {
                            return Err(format!(
                                "10 assert_exception: {} cannot remove proposal {id}",
                                removal.proposal_owner
                            ));
                        }
                    }
                }
                for id in &removal.proposal_ids {
                    self.proposals.remove(id);
                    self.proposal_blocks.remove(id);
                    for voted in self.votes.values_mut() {
                        voted.remove(id);
                    }
                }
            }
            other => return Err(format!("unsupported operation {other}")),
        }
        Ok(())
    }

    fn account_mut(&mut self, name: &str) -> Result<&mut Balances, String> {
        self.accounts
            .get_mut(name)
            .ok_or_else(|| format!("10 assert_exception: unknown account {name}"))
    }

    fn move_funds(&mut self, from: &str, to: &str, amount: &Asset) -> Result<(), String> {
        pocket(self.account_mut(from)?, &amount.symbol)?.amount -= amount.amount;
        pocket(self.account_mut(to)?, &amount.symbol)?.amount += amount.amount;
        Ok(())
    }

    fn proposal_json(&self, id: u64, proposal: &CreateProposalOperation) -> Value {
        json!({
            "id": id,
            "creator": proposal.creator,
            "receiver": proposal.receiver,
            "start_date": format_time(&proposal.start_date),
            "end_date": format_time(&proposal.end_date),
            "daily_pay": proposal.daily_pay.to_string(),
            "subject": proposal.subject,
            "permlink": proposal.permlink,
            "total_votes": self.total_votes(id).to_string(),
        })
    }

    fn matches_status(&self, proposal: &CreateProposalOperation, status: ProposalStatus) -> bool {
        match status {
            ProposalStatus::Active => self.is_active(proposal),
            ProposalStatus::Inactive => !self.is_active(proposal),
            ProposalStatus::All => true,
        }
    }

    /// `[start, order_by, direction, limit, status]` in either node or wallet spelling.
    pub fn list_proposals(&self, args: &Value) -> Result<Value, String> {
        self.list_proposals_until(args, self.head_block)
    }

    /// Listing of a node that has only applied blocks up to `last_block`.
    pub fn list_proposals_until(&self, args: &Value, last_block: u32) -> Result<Value, String> {
        let start = &args[0];
        let order_by: OrderBy = text(&args[1])?.parse().map_err(|e| format!("{e}"))?;
        let descending = text(&args[2])?.contains("desc");
        let limit = args[3].as_u64().ok_or("limit must be a number")? as usize;
        let status: ProposalStatus = text(&args[4])?.parse().map_err(|e| format!("{e}"))?;
        if limit > 1000 {
            return Err("10 assert_exception: limit is too big".to_string());
        }

        let mut listed: Vec<(u64, &CreateProposalOperation)> = self
            .proposals
            .iter()
            .map(|(id, p)| (*id, p))
            .filter(|(id, _)| self.proposal_blocks.get(id).is_some_and(|block| *block <= last_block))
            .filter(|(_, p)| self.matches_status(p, status))
            .collect();
        match order_by {
            OrderBy::Creator => {
                let start = start.as_str().ok_or("creator start must be text")?;
                listed.retain(|(_, p)| p.creator.as_str() >= start);
                listed.sort_by(|a, b| a.1.creator.cmp(&b.1.creator).then(a.0.cmp(&b.0)));
            }
            OrderBy::StartDate | OrderBy::EndDate => {
                let start = parse_time(start.as_str().ok_or("date start must be text")?)
                    .map_err(|e| e.to_string())?;
                let key = |p: &CreateProposalOperation| match order_by {
                    OrderBy::StartDate => p.start_date,
                    _ => p.end_date,
                };
                listed.retain(|(_, p)| key(*p) >= start);
                listed.sort_by(|a, b| key(a.1).cmp(&key(b.1)).then(a.0.cmp(&b.0)));
            }
            OrderBy::TotalVotes => {
                let start = start.as_u64().ok_or("votes start must be a number")?;
                listed.retain(|(id, _)| self.total_votes(*id) >= start);
                listed.sort_by(|a, b| {
                    self.total_votes(a.0)
                        .cmp(&self.total_votes(b.0))
                        .then(a.0.cmp(&b.0))
                });
            }
        }
        if descending {
            listed.reverse();
        }
        Ok(Value::Array(
            listed
                .into_iter()
                .take(limit)
                .map(|(id, p)| self.proposal_json(id, p))
                .collect(),
        ))
    }

    pub fn find_proposals(&self, ids: &Value) -> Result<Value, String> {
        let ids: Vec<u64> = serde_json::from_value(ids.clone()).map_err(|e| e.to_string())?;
        Ok(Value::Array(
            ids.iter()
                .filter_map(|id| self.proposals.get(id).map(|p| self.proposal_json(*id, p)))
                .collect(),
        ))
    }

    /// `[voter, order_by, direction, limit, status]`
    pub fn list_voter_proposals(&self, args: &Value) -> Result<Value, String> {
        let voter = text(&args[0])?;
        let status: ProposalStatus = text(&args[4])?.parse().map_err(|e| format!("{e}"))?;
        let voted: Vec<Value> = self
            .votes
            .get(&voter)
            .into_iter()
            .flatten()
            .filter_map(|id| self.proposals.get(id).map(|p| (*id, p)))
            .filter(|(_, p)| self.matches_status(p, status))
            .map(|(id, p)| self.proposal_json(id, p))
            .collect();
        let mut response = serde_json::Map::new();
        if !voted.is_empty() {
            response.insert(voter, Value::Array(voted));
        }
        Ok(Value::Object(response))
    }

    pub fn get_accounts(&self, names: &Value) -> Result<Value, String> {
        let names: Vec<String> = serde_json::from_value(names.clone()).map_err(|e| e.to_string())?;
        Ok(Value::Array(
            names
                .iter()
                .filter_map(|name| {
                    self.accounts.get(name).map(|b| {
                        json!({
                            "name": name,
                            "balance": b.balance.to_string(),
                            "sbd_balance": b.sbd_balance.to_string(),
                            "vesting_shares": b.vesting_shares.to_string(),
                        })
                    })
                })
                .collect(),
        ))
    }

    pub fn get_account_history(&self, account: &str, limit: usize) -> Value {
        let entries = self.history.get(account).cloned().unwrap_or_default();
        let skip = entries.len().saturating_sub(limit);
        Value::Array(entries.into_iter().skip(skip).collect())
    }

    /// Builds the transaction the wallet would sign for one operation.
    pub fn sign(&self, name: &str, payload: Value) -> Result<Value, String> {
        if !self.wallet_unlocked {
            return Err("10 assert_exception: The wallet must be unlocked before operations can be signed".to_string());
        }
        Ok(json!({
            "ref_block_num": self.head_block & 0xffff,
            "ref_block_prefix": 3735928559u32,
            "expiration": format_time(&(self.time + TimeDelta::seconds(60))),
            "operations": [[name, payload]],
            "extensions": [],
            "signatures": ["1f7f0c3e9c4f1d2b"],
        }))
    }
}

fn pocket<'a>(balances: &'a mut Balances, symbol: &str) -> Result<&'a mut Asset, String> {
    match symbol {
        "TESTS" => Ok(&mut balances.balance),
        "TBD" => Ok(&mut balances.sbd_balance),
        other => Err(format!("cannot transfer {other}")),
    }
}

pub fn text(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("expected text, got {value}"))
}

pub fn asset(value: &Value) -> Result<Asset, String> {
    text(value)?.parse().map_err(|e| format!("{e}"))
}
