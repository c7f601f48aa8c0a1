use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

use crate::asset::Asset;
use crate::transaction::Operation;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Proposal {
    #[serde(deserialize_with = "number_or_text")]
    pub id: u64,
    pub creator: String,
    pub receiver: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub daily_pay: Asset,
    pub subject: String,
    #[serde(alias = "url")]
    pub permlink: String,
    #[serde(default, deserialize_with = "number_or_text")]
    pub total_votes: u64,
}

pub type VoterProposals = BTreeMap<String, Vec<Proposal>>;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct DynamicGlobalProperties {
    pub head_block_number: u32,
    #[serde(default)]
    pub head_block_id: String,
    pub time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Account {
    pub name: String,
    pub balance: Asset,
    pub sbd_balance: Asset,
    pub vesting_shares: Asset,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct BroadcastResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub block_num: u32,
    #[serde(default)]
    pub trx_num: u32,
    #[serde(default)]
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct GenerateBlocksResponse {
    pub blocks: u32,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct BrainKey {
    pub brain_priv_key: String,
    pub wif_priv_key: String,
    pub pub_key: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct HistoryItem {
    #[serde(default)]
    pub block: u32,
    pub op: Operation,
}

pub type AccountHistory = Vec<(u64, HistoryItem)>;

// 64-bit fields come back as strings from some node builds.
fn number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(u64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(number) => Ok(number),
        NumberOrText::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}
