// Application layer: the account-ledger use cases every client goes through.

pub mod error;
mod service;

pub use error::*;
pub use service::*;
