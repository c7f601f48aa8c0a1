use chrono::NaiveDateTime;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::api::{SINGLE_QUERY_LIMIT, format_time};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Unknown {kind} `{value}`")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderBy {
    Creator,
    StartDate,
    EndDate,
    TotalVotes,
}

impl OrderBy {
    pub const ALL: [OrderBy; 4] = [
        OrderBy::Creator,
        OrderBy::StartDate,
        OrderBy::EndDate,
        OrderBy::TotalVotes,
    ];

    pub fn api_name(&self) -> &'static str {
        match self {
            OrderBy::Creator => "by_creator",
            OrderBy::StartDate => "by_start_date",
            OrderBy::EndDate => "by_end_date",
            OrderBy::TotalVotes => "by_total_votes",
        }
    }

    pub fn wallet_name(&self) -> &'static str {
        match self {
            OrderBy::Creator => "creator",
            OrderBy::StartDate => "start_date",
            OrderBy::EndDate => "end_date",
            OrderBy::TotalVotes => "total_votes",
        }
    }
}

impl FromStr for OrderBy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        OrderBy::ALL
            .into_iter()
            .find(|o| o.api_name() == lowered || o.wallet_name() == lowered)
            .ok_or(UnknownVariant {
                kind: "order",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wallet_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn api_name(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "direction_ascending",
            OrderDirection::Descending => "direction_descending",
        }
    }

    pub fn wallet_name(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "asc",
            OrderDirection::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProposalStatus {
    Active,
    Inactive,
    #[default]
    All,
}

impl ProposalStatus {
    pub const ALL: [ProposalStatus; 3] = [
        ProposalStatus::Active,
        ProposalStatus::Inactive,
        ProposalStatus::All,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProposalStatus::Active => "active",
            ProposalStatus::Inactive => "inactive",
            ProposalStatus::All => "all",
        }
    }
}

impl FromStr for ProposalStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        ProposalStatus::ALL
            .into_iter()
            .find(|status| status.name() == lowered)
            .ok_or(UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First key of a listing. Its type has to match the ordering field.
#[derive(Debug, Clone, PartialEq)]
pub enum ListStart {
    Account(String),
    Date(NaiveDateTime),
    Votes(u64),
}

impl From<ListStart> for Value {
    fn from(value: ListStart) -> Self {
        match value {
            ListStart::Account(account) => Value::String(account),
            ListStart::Date(date) => Value::String(format_time(&date)),
            ListStart::Votes(votes) => Value::from(votes),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProposalQuery {
    pub start: ListStart,
    pub order_by: OrderBy,
    pub direction: OrderDirection,
    pub limit: u16,
    pub status: ProposalStatus,
}

impl ProposalQuery {
    pub fn by_creator(creator: &str, status: ProposalStatus) -> Self {
        Self {
            start: ListStart::Account(creator.to_string()),
            order_by: OrderBy::Creator,
            direction: OrderDirection::Ascending,
            limit: SINGLE_QUERY_LIMIT,
            status,
        }
    }

    pub fn to_api_params(&self) -> Vec<Value> {
        vec![
            self.start.clone().into(),
            Value::from(self.order_by.api_name()),
            Value::from(self.direction.api_name()),
            Value::from(self.limit),
            Value::from(self.status.name()),
        ]
    }

    pub fn to_wallet_args(&self) -> Vec<Value> {
        vec![
            self.start.clone().into(),
            Value::from(self.order_by.wallet_name()),
            Value::from(self.direction.wallet_name()),
            Value::from(self.limit),
            Value::from(self.status.name()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoterQuery {
    pub voter: String,
    pub order_by: OrderBy,
    pub direction: OrderDirection,
    pub limit: u16,
    pub status: ProposalStatus,
}

impl VoterQuery {
    pub fn new(voter: &str, status: ProposalStatus) -> Self {
        Self {
            voter: voter.to_string(),
            order_by: OrderBy::Creator,
            direction: OrderDirection::Ascending,
            limit: SINGLE_QUERY_LIMIT,
            status,
        }
    }

    pub fn to_api_params(&self) -> Vec<Value> {
        vec![
            Value::from(self.voter.as_str()),
            Value::from(self.order_by.api_name()),
            Value::from(self.direction.api_name()),
            Value::from(self.limit),
            Value::from(self.status.name()),
        ]
    }

    pub fn to_wallet_args(&self) -> Vec<Value> {
        vec![
            Value::from(self.voter.as_str()),
            Value::from(self.order_by.wallet_name()),
            Value::from(self.direction.wallet_name()),
            Value::from(self.limit),
            Value::from(self.status.name()),
        ]
    }
}
