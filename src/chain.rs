//! Wallet and contract collaborators backed by an `ethers` JSON-RPC provider.

use std::{fs, path::PathBuf};

use alloy_primitives::{Address, B256, U256};
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, MiddlewareError, Provider},
    signers::{LocalWallet, Signer},
    types::{transaction::eip2718::TypedTransaction, TransactionRequest, H160, U256 as EthU256},
};
use tracing::{debug, info};

use crate::{
    contract::{self, ContractError, DonationContract},
    erc721,
    transaction::{Action, Transaction},
    wallet::{TransactionOutcome, Wallet, WalletError},
};

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

fn to_h160(address: Address) -> H160 {
    H160::from_slice(address.as_slice())
}

fn to_eth_u256(value: U256) -> EthU256 {
    EthU256::from_big_endian(&value.to_be_bytes::<32>())
}

/// Describes a node error, decoding the contract's revert reason when present.
fn describe_error<E: MiddlewareError>(error: &E) -> String {
    error
        .as_error_response()
        .and_then(|response| response.as_revert_data())
        .and_then(|data| erc721::describe_revert(&data))
        .unwrap_or_else(|| error.to_string())
}

/// Parses a hex-encoded secp256k1 private key, with or without `0x`.
pub fn parse_private_key(text: &str) -> Result<LocalWallet, WalletError> {
    let text = text.trim();
    let bytes = hex::decode(text.strip_prefix("0x").unwrap_or(text))
        .map_err(|error| WalletError::InvalidKey(error.to_string()))?;
    LocalWallet::from_bytes(&bytes).map_err(|error| WalletError::InvalidKey(error.to_string()))
}

/// A wallet signing with a private key read from a file.
///
/// Signing in loads the key; signing out forgets it.
pub struct EthersWallet {
    provider: Provider<Http>,
    chain_id: u64,
    key_path: Option<PathBuf>,
    client: Option<Client>,
}

impl EthersWallet {
    pub fn new(provider: Provider<Http>, chain_id: u64, key_path: Option<PathBuf>) -> Self {
        Self {
            provider,
            chain_id,
            key_path,
            client: None,
        }
    }

    /// Signs in with an already loaded key.
    pub fn sign_in_with(&mut self, wallet: LocalWallet) {
        let wallet = wallet.with_chain_id(self.chain_id);
        info!(account_id = ?wallet.address(), "Signed in");
        self.client = Some(SignerMiddleware::new(self.provider.clone(), wallet));
    }
}

impl Wallet for EthersWallet {
    fn is_signed_in(&self) -> bool {
        self.client.is_some()
    }

    fn account_id(&self) -> Option<Address> {
        let client = self.client.as_ref()?;
        Some(Address::from(client.address().0))
    }

    async fn sign_in(&mut self) -> Result<(), WalletError> {
        let path = self.key_path.as_ref().ok_or(WalletError::MissingKey)?;
        let text = fs::read_to_string(path).map_err(|error| {
            WalletError::InvalidKey(format!("cannot read {}: {error}", path.display()))
        })?;
        let wallet = parse_private_key(&text)?;
        self.sign_in_with(wallet);
        Ok(())
    }

    fn sign_out(&mut self) {
        if self.client.take().is_some() {
            info!("Signed out");
        }
    }

    async fn sign_and_send_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<TransactionOutcome, WalletError> {
        let client = self.client.as_ref().ok_or(WalletError::NotSignedIn)?;
        let [Action::FunctionCall(call)] = transaction.actions.as_slice() else {
            return Err(WalletError::UnsupportedBatch(transaction.actions.len()));
        };

        let mut request: TypedTransaction = TransactionRequest::new()
            .from(client.address())
            .to(to_h160(transaction.receiver_id))
            .data(call.args.to_vec())
            .value(to_eth_u256(call.deposit))
            .into();
        // The allowance caps the node's estimate.
        let estimate = client
            .estimate_gas(&request, None)
            .await
            .map_err(|error| WalletError::Rejected(describe_error(&error)))?;
        request.set_gas(estimate.min(EthU256::from(call.gas)));
        debug!(method = %call.method_name, gas = %estimate, "Sending transaction");

        let pending = client
            .send_transaction(request, None)
            .await
            .map_err(|error| WalletError::Rejected(describe_error(&error)))?;
        let transaction_hash = B256::from(pending.tx_hash().0);
        let receipt = pending
            .await
            .map_err(|error| WalletError::Rejected(error.to_string()))?
            .ok_or(WalletError::Dropped(transaction_hash))?;
        if receipt.status != Some(1u64.into()) {
            return Err(WalletError::Reverted(transaction_hash));
        }

        let logs: Vec<_> = receipt
            .logs
            .iter()
            .map(|log| {
                let topics: Vec<B256> = log.topics.iter().map(|topic| B256::from(topic.0)).collect();
                (Address::from(log.address.0), topics, log.data.to_vec())
            })
            .collect();
        let receiver = self.account_id().ok_or(WalletError::NotSignedIn)?;
        let token_id = erc721::minted_token_id(
            logs.iter()
                .map(|(emitter, topics, data)| (*emitter, topics.as_slice(), data.as_slice())),
            transaction.receiver_id,
            receiver,
        );
        Ok(TransactionOutcome {
            transaction_hash,
            token_id,
        })
    }
}

/// The donation contract, queried through `eth_call`.
pub struct EthersContract {
    provider: Provider<Http>,
    address: Address,
}

impl EthersContract {
    pub fn new(provider: Provider<Http>, address: Address) -> Self {
        Self { provider, address }
    }
}

impl DonationContract for EthersContract {
    fn contract_id(&self) -> Address {
        self.address
    }

    async fn supply_for_owner(&self, account_id: Address) -> Result<u64, ContractError> {
        let request: TypedTransaction = TransactionRequest::new()
            .to(to_h160(self.address))
            .data(erc721::balance_of_calldata(account_id).to_vec())
            .into();
        let data = self
            .provider
            .call(&request, None)
            .await
            .map_err(|error| ContractError::Query(describe_error(&error)))?;
        contract::token_count(erc721::decode_balance(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // Well-known development key (anvil/hardhat account #0).
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn private_keys_parse_with_or_without_prefix() {
        let with_prefix = parse_private_key(DEV_KEY).unwrap();
        let without_prefix = parse_private_key(&format!("{}\n", &DEV_KEY[2..])).unwrap();
        assert_eq!(with_prefix.address(), without_prefix.address());
        assert_eq!(
            Address::from(with_prefix.address().0),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );
        assert_matches!(parse_private_key("not hex"), Err(WalletError::InvalidKey(_)));
    }

    #[test]
    fn amounts_convert_between_libraries() {
        let deposit = crate::transaction::DONATION_DEPOSIT;
        assert_eq!(
            to_eth_u256(deposit),
            EthU256::from_dec_str("2000000000000000000").unwrap()
        );
    }

    #[tokio::test]
    async fn signing_in_needs_a_key() {
        let provider = Provider::<Http>::try_from("http://localhost:8547").unwrap();
        let mut wallet = EthersWallet::new(provider, 412_346, None);
        assert_eq!(wallet.sign_in().await, Err(WalletError::MissingKey));
        assert!(!wallet.is_signed_in());

        wallet.sign_in_with(parse_private_key(DEV_KEY).unwrap());
        assert!(wallet.is_signed_in());
        assert!(wallet.account_id().is_some());
        wallet.sign_out();
        assert_eq!(wallet.account_id(), None);
    }

    #[tokio::test]
    async fn batches_are_rejected() {
        let provider = Provider::<Http>::try_from("http://localhost:8547").unwrap();
        let mut wallet = EthersWallet::new(provider, 412_346, None);
        wallet.sign_in_with(parse_private_key(DEV_KEY).unwrap());
        let account = wallet.account_id().unwrap();
        let mut transaction = Transaction::mint(Address::ZERO, account);
        transaction.actions.push(transaction.actions[0].clone());
        assert_eq!(
            wallet.sign_and_send_transaction(transaction).await,
            Err(WalletError::UnsupportedBatch(2))
        );
    }
}
