pub mod api;
pub mod args;
pub mod asset;
pub mod fixture;
pub mod network;
pub mod node;
pub mod scenario;
pub mod session;
pub mod transaction;
pub mod wallet;
