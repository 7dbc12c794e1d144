use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent, SolInterface};

// Caller-side ABI of the deployed donation NFT contract
sol! {
    interface DonationNft {
        // Mints a new token to `receiver`, the attached value is the donation
        function mint(address receiver) external payable returns (uint256 token_id);
        // Number of tokens currently owned by `owner`
        function balanceOf(address owner) external view returns (uint256 balance);

        // Emitted by every mint, with `from` set to the zero address
        event Transfer(address indexed from, address indexed to, uint256 indexed token_id);

        // The attached value is below the donation price
        error InsufficientDeposit(uint256 paid, uint256 required);
        // A contract receiver did not answer `onERC721Received` with its selector
        error ReceiverRefused(address receiver, uint256 token_id, bytes4 returned);
    }
}

// Re-export the generated types the rest of the crate builds on
pub use DonationNft::{balanceOfCall, mintCall, Transfer};

/// Calldata for `mint(receiver)`.
pub fn mint_calldata(receiver: Address) -> Bytes {
    // Selector followed by the ABI-encoded receiver
    mintCall { receiver }.abi_encode().into()
}

/// Calldata for `balanceOf(owner)`.
pub fn balance_of_calldata(owner: Address) -> Bytes {
    balanceOfCall { owner }.abi_encode().into()
}

/// Decodes the return data of `balanceOf`.
pub fn decode_balance(data: &[u8]) -> Result<U256, alloy_sol_types::Error> {
    // Strict validation, so truncated or padded return data is an error
    Ok(balanceOfCall::abi_decode_returns(data, true)?.balance)
}

/// Finds the token minted to `receiver` among the logs emitted by `contract`.
///
/// A mint is a `Transfer` from the zero address. Logs from other emitters
/// and undecodable logs are skipped.
pub fn minted_token_id<'a, I>(logs: I, contract: Address, receiver: Address) -> Option<U256>
where
    I: IntoIterator<Item = (Address, &'a [B256], &'a [u8])>,
{
    logs.into_iter()
        // Only `Transfer` logs of the donation contract itself
        .filter(|(emitter, topics, _)| {
            *emitter == contract && topics.first() == Some(&Transfer::SIGNATURE_HASH)
        })
        // All three fields are indexed, so the log data is empty
        .filter_map(|(_, topics, data)| Transfer::decode_raw_log(topics.iter().copied(), data, true).ok())
        // Minted tokens come from the zero address
        .find(|transfer| transfer.from.is_zero() && transfer.to == receiver)
        .map(|transfer| transfer.token_id)
}

/// Renders contract revert data as a readable reason, if it is one of the
/// contract's declared errors.
pub fn describe_revert(data: &[u8]) -> Option<String> {
    use DonationNft::DonationNftErrors as Errors;

    // Unknown selectors and malformed payloads are left to the caller
    let reason = match Errors::abi_decode(data, true).ok()? {
        // The donation was sent with too little value attached
        Errors::InsufficientDeposit(err) => {
            format!("deposit of {} wei is below the required {} wei", err.paid, err.required)
        }
        // The receiver is a contract that does not accept NFTs
        Errors::ReceiverRefused(err) => format!("{} refused token {}", err.receiver, err.token_id),
    };
    Some(reason)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, uint};
    use alloy_sol_types::{SolError, SolEventInterface, SolValue};

    use super::*;

    const CONTRACT: Address = address!("00000000000000000000000000000000000000c0");
    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");

    #[test]
    fn mint_calldata_targets_mint_with_receiver() {
        let data = mint_calldata(ALICE);
        assert_eq!(&data[..4], mintCall::SELECTOR.as_slice());
        let call = mintCall::abi_decode(&data, true).unwrap();
        assert_eq!(call.receiver, ALICE);
    }

    #[test]
    fn balance_is_decoded_from_return_data() {
        let data = U256::from(5).abi_encode();
        assert_eq!(decode_balance(&data).unwrap(), U256::from(5));
        assert!(decode_balance(&[0u8; 3]).is_err());
    }

    #[test]
    fn minted_token_is_found_in_transfer_logs() {
        let token_id = uint!(7_U256);
        let topics = [
            Transfer::SIGNATURE_HASH,
            Address::ZERO.into_word(),
            ALICE.into_word(),
            B256::from(token_id.to_be_bytes::<32>()),
        ];
        let other_emitter = address!("00000000000000000000000000000000000000ff");
        let no_data: &[u8] = &[];
        let logs = [
            (other_emitter, &topics[..], no_data),
            (CONTRACT, &topics[..], no_data),
        ];
        assert_eq!(minted_token_id(logs, CONTRACT, ALICE), Some(token_id));
        assert_eq!(minted_token_id(logs, CONTRACT, CONTRACT), None);
    }

    #[test]
    fn known_reverts_are_described() {
        let data = DonationNft::InsufficientDeposit {
            paid: U256::from(1),
            required: U256::from(2),
        }
        .abi_encode();
        assert_eq!(
            describe_revert(&data).as_deref(),
            Some("deposit of 1 wei is below the required 2 wei")
        );
        assert_eq!(describe_revert(&[1, 2, 3, 4]), None);

        let data = DonationNft::ReceiverRefused {
            receiver: CONTRACT,
            token_id: U256::from(3),
            returned: Default::default(),
        }
        .abi_encode();
        assert_eq!(
            describe_revert(&data),
            Some(format!("{CONTRACT} refused token 3"))
        );
    }

    #[test]
    fn only_mint_failures_are_declared() {
        // Insufficient deposit and receiver refusal are all `mint` can revert with
        assert_eq!(DonationNft::DonationNftErrors::COUNT, 2);
        assert_eq!(DonationNft::DonationNftEvents::COUNT, 1);
    }
}
