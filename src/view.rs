//! The donation page's state machine.
//!
//! [`DonationView`] owns the only local state of the page: the donor's token
//! count and the status of the last donation. Session state belongs to the
//! [`Wallet`] and is read at render time; the view never changes it on its
//! own.

use alloy_primitives::{Address, B256, U256};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    contract::DonationContract,
    transaction::Transaction,
    wallet::{TransactionOutcome, Wallet, WalletError},
};

/// The donor's token count, as known to the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NftCount {
    /// Not queried yet. Shown as zero.
    #[default]
    NotLoaded,
    Loaded(u64),
    /// The query failed; the page offers a retry.
    Unavailable(String),
}

impl NftCount {
    /// The number shown on the page, if the count is not unavailable.
    pub fn displayed(&self) -> Option<u64> {
        match self {
            NftCount::NotLoaded => Some(0),
            NftCount::Loaded(count) => Some(*count),
            NftCount::Unavailable(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DonationStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded {
        transaction_hash: B256,
        token_id: Option<U256>,
    },
    Failed(String),
}

impl DonationStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, DonationStatus::Submitting)
    }
}

/// What the page shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    SignedOut,
    /// Signed in, but no contract is bound yet.
    Uninitialized { account_id: Address },
    SignedIn {
        account_id: Address,
        nfts: NftCount,
        donation: DonationStatus,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DonateError {
    #[error("sign in before donating")]
    NotSignedIn,

    #[error("the donation contract is not available yet")]
    NotInitialized,

    #[error("a donation is already being submitted")]
    DonationInFlight,

    #[error("no donation is waiting for this outcome")]
    UnexpectedOutcome,

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Identifies the donation handed out by [`DonationView::prepare_donation`].
/// Only the current ticket can complete it.
#[derive(Debug, PartialEq, Eq)]
pub struct DonationTicket(u64);

/// The donation page, bound to its wallet and (once available) its contract.
pub struct DonationView<W, C> {
    wallet: W,
    contract: Option<C>,
    nfts: NftCount,
    donation: DonationStatus,
    // Bumped on every prepared donation and on every session change
    generation: u64,
    mounted: bool,
}

impl<W, C> DonationView<W, C>
where
    W: Wallet,
    C: DonationContract,
{
    pub fn new(wallet: W, contract: Option<C>) -> Self {
        Self {
            wallet,
            contract,
            nfts: NftCount::default(),
            donation: DonationStatus::default(),
            generation: 0,
            mounted: false,
        }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn contract(&self) -> Option<&C> {
        self.contract.as_ref()
    }

    /// Binds the contract once it becomes available. The next [`Self::mount`]
    /// queries it.
    pub fn bind_contract(&mut self, contract: C) {
        self.contract = Some(contract);
        self.mounted = false;
    }

    pub fn nfts(&self) -> &NftCount {
        &self.nfts
    }

    pub fn donation(&self) -> &DonationStatus {
        &self.donation
    }

    pub fn screen(&self) -> Screen {
        // Signed-out visitors only get the sign-in prompt
        let Some(account_id) = self.signed_in_account() else {
            return Screen::SignedOut;
        };
        // Signed in, but nothing to query or mint against yet
        if self.contract.is_none() {
            return Screen::Uninitialized { account_id };
        }
        Screen::SignedIn {
            account_id,
            nfts: self.nfts.clone(),
            donation: self.donation.clone(),
        }
    }

    /// Loads the donor's token count. Only the first call queries the
    /// contract; signing in or out makes the next call query again.
    pub async fn mount(&mut self) {
        // Once per mount, like an effect with no dependencies
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.load_nft_count().await;
    }

    /// Queries the token count again, e.g. after it was unavailable.
    pub async fn refresh_nft_count(&mut self) {
        self.load_nft_count().await;
    }

    async fn load_nft_count(&mut self) {
        // Visitors that are not signed in never see a count
        let Some(account_id) = self.signed_in_account() else {
            debug!("Not signed in, skipping the token count query");
            return;
        };
        let Some(contract) = &self.contract else {
            debug!("No contract bound, skipping the token count query");
            return;
        };
        // Failures become a visible state instead of a stale zero
        self.nfts = match contract.supply_for_owner(account_id).await {
            Ok(count) => {
                debug!(%account_id, count, "Loaded token count");
                NftCount::Loaded(count)
            }
            Err(error) => {
                warn!(%account_id, %error, "Failed to load token count");
                NftCount::Unavailable(error.to_string())
            }
        };
    }

    /// Checks that a donation can be made and marks it as in flight.
    /// Returns the ticket that completes it and the transaction to submit.
    pub fn prepare_donation(&mut self) -> Result<(DonationTicket, Transaction), DonateError> {
        // Guards, in the order the page shows them
        let account_id = self.signed_in_account().ok_or(DonateError::NotSignedIn)?;
        let contract = self.contract.as_ref().ok_or(DonateError::NotInitialized)?;
        if self.donation.is_submitting() {
            return Err(DonateError::DonationInFlight);
        }
        // One mint to the donor, carrying the fixed gas and deposit
        let transaction = Transaction::mint(contract.contract_id(), account_id);
        // The new generation identifies this submission
        self.generation += 1;
        self.donation = DonationStatus::Submitting;
        Ok((DonationTicket(self.generation), transaction))
    }

    /// Records the outcome of the donation `ticket` was issued for.
    ///
    /// Outcomes for a ticket that is no longer current, or arriving when no
    /// donation is in flight, leave the status untouched.
    pub fn complete_donation(
        &mut self,
        ticket: DonationTicket,
        outcome: Result<TransactionOutcome, WalletError>,
    ) -> Result<TransactionOutcome, DonateError> {
        // Stale tickets come from before a later donation or a session change
        if ticket.0 != self.generation || !self.donation.is_submitting() {
            warn!(ticket = ticket.0, "Dropping the outcome of a donation that is not in flight");
            return Err(DonateError::UnexpectedOutcome);
        }
        match &outcome {
            Ok(outcome) => {
                info!(transaction_hash = %outcome.transaction_hash, "Donation confirmed");
                self.donation = DonationStatus::Succeeded {
                    transaction_hash: outcome.transaction_hash,
                    token_id: outcome.token_id,
                };
            }
            Err(error) => {
                warn!(%error, "Donation failed");
                self.donation = DonationStatus::Failed(error.to_string());
            }
        }
        // The caller sees the same outcome the page shows
        Ok(outcome?)
    }

    /// Donates by minting one token to the signed-in account.
    pub async fn donate(&mut self) -> Result<TransactionOutcome, DonateError> {
        let (ticket, transaction) = self.prepare_donation()?;
        info!(contract = %transaction.receiver_id, "Submitting donation");
        // The wallet signs, broadcasts and waits for the receipt
        let outcome = self.wallet.sign_and_send_transaction(transaction).await;
        self.complete_donation(ticket, outcome)
    }

    /// Signs in through the wallet. Refused while a donation is in flight.
    pub async fn sign_in(&mut self) -> Result<(), DonateError> {
        self.ensure_idle()?;
        self.wallet.sign_in().await?;
        self.reset();
        Ok(())
    }

    /// Signs out through the wallet. Refused while a donation is in flight.
    pub fn sign_out(&mut self) -> Result<(), DonateError> {
        self.ensure_idle()?;
        self.wallet.sign_out();
        self.reset();
        Ok(())
    }

    // Session changes wait for the outstanding donation
    fn ensure_idle(&self) -> Result<(), DonateError> {
        if self.donation.is_submitting() {
            return Err(DonateError::DonationInFlight);
        }
        Ok(())
    }

    // The session belongs to the wallet and is read, never cached
    fn signed_in_account(&self) -> Option<Address> {
        if !self.wallet.is_signed_in() {
            return None;
        }
        self.wallet.account_id()
    }

    // A session change stands in for a remount: fresh state, stale tickets
    fn reset(&mut self) {
        self.nfts = NftCount::default();
        self.donation = DonationStatus::default();
        self.generation += 1;
        self.mounted = false;
    }
}
