//! A donation page: signed-in donors mint an NFT for every donation and see
//! how many they have minted.
//!
//! The page is a [`view::DonationView`] bound to two collaborators, a
//! [`wallet::Wallet`] holding the session and a
//! [`contract::DonationContract`] answering queries. [`chain`] provides both
//! over JSON-RPC; [`page`] renders the view to HTML.

pub mod chain;
pub mod config;
pub mod contract;
pub mod erc721;
pub mod page;
pub mod transaction;
pub mod view;
pub mod wallet;

pub use config::{Network, NetworkConfig};
pub use view::{DonateError, DonationStatus, DonationTicket, DonationView, NftCount, Screen};
