//! Transactions submitted through the wallet.

use alloy_primitives::{uint, Address, Bytes, U256};

use crate::erc721;

/// Contract method invoked by a donation.
pub const MINT_METHOD: &str = "mint";

/// Gas allowance attached to a donation.
pub const MINT_GAS: u64 = 10_000_000_000_000;

/// Value attached to a donation: 2 of the native currency, in wei.
pub const DONATION_DEPOSIT: U256 = uint!(2_000_000_000_000_000_000_U256);

/// A call of a contract method, with its encoded arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionCall {
    pub method_name: String,
    pub args: Bytes,
    pub gas: u64,
    pub deposit: U256,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    FunctionCall(FunctionCall),
}

/// A transaction to be signed and broadcast by the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub receiver_id: Address,
    pub actions: Vec<Action>,
}

impl Transaction {
    /// The donation: one `mint` call paying [`DONATION_DEPOSIT`], minting to `receiver`.
    pub fn mint(contract_id: Address, receiver: Address) -> Self {
        Self {
            receiver_id: contract_id,
            actions: vec![Action::FunctionCall(FunctionCall {
                method_name: MINT_METHOD.to_string(),
                args: erc721::mint_calldata(receiver),
                gas: MINT_GAS,
                deposit: DONATION_DEPOSIT,
            })],
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use alloy_sol_types::SolCall;

    use super::*;

    #[test]
    fn deposit_is_two_ether() {
        assert_eq!(DONATION_DEPOSIT, U256::from(2) * U256::from(10).pow(U256::from(18)));
    }

    #[test]
    fn mint_transaction_has_a_single_call() {
        let contract = address!("00000000000000000000000000000000000000c0");
        let alice = address!("00000000000000000000000000000000000a11ce");
        let transaction = Transaction::mint(contract, alice);

        assert_eq!(transaction.receiver_id, contract);
        let [Action::FunctionCall(call)] = transaction.actions.as_slice() else {
            panic!("expected one function call, got {:?}", transaction.actions);
        };
        assert_eq!(call.method_name, "mint");
        assert_eq!(call.gas, 10_000_000_000_000);
        assert_eq!(call.deposit, DONATION_DEPOSIT);
        let args = erc721::mintCall::abi_decode(&call.args, true).unwrap();
        assert_eq!(args.receiver, alice);
    }
}
