//! The contract collaborator: read-only queries of the donation NFT contract.

use alloy_primitives::{Address, U256};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("token count {0} does not fit in 64 bits")]
    CountOutOfRange(U256),
}

impl From<alloy_sol_types::Error> for ContractError {
    fn from(error: alloy_sol_types::Error) -> Self {
        ContractError::Decode(error.to_string())
    }
}

/// A binding to the deployed donation NFT contract.
#[allow(async_fn_in_trait)]
pub trait DonationContract {
    /// Address the contract is deployed at, the receiver of donations.
    fn contract_id(&self) -> Address;

    /// Number of tokens owned by `account_id`.
    async fn supply_for_owner(&self, account_id: Address) -> Result<u64, ContractError>;
}

/// Narrows an on-chain token count to the count shown on the page.
pub fn token_count(balance: U256) -> Result<u64, ContractError> {
    u64::try_from(balance).map_err(|_| ContractError::CountOutOfRange(balance))
}
