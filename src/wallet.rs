//! The wallet collaborator: session state and transaction submission.

use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

use crate::transaction::Transaction;

/// What the chain reported for a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub transaction_hash: B256,
    /// The token minted by the transaction, when the receipt shows one.
    pub token_id: Option<U256>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("no account is signed in")]
    NotSignedIn,

    #[error("no signing key is configured")]
    MissingKey,

    #[error("failed to load the signing key: {0}")]
    InvalidKey(String),

    #[error("a transaction must contain exactly one action, got {0}")]
    UnsupportedBatch(usize),

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("transaction {0} was dropped before being mined")]
    Dropped(B256),

    #[error("transaction {0} reverted")]
    Reverted(B256),
}

/// An authenticated binding to the user's account, able to sign transactions.
#[allow(async_fn_in_trait)]
pub trait Wallet {
    /// Whether an account is connected and authorized.
    fn is_signed_in(&self) -> bool;

    /// The signed-in account, if any.
    fn account_id(&self) -> Option<Address>;

    async fn sign_in(&mut self) -> Result<(), WalletError>;

    fn sign_out(&mut self);

    /// Signs and broadcasts `transaction`, then waits for it to be mined.
    async fn sign_and_send_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<TransactionOutcome, WalletError>;
}
