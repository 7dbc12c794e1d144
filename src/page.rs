//! HTML rendering of the donation page.
//!
//! The output is static markup. Each action button carries a `name`
//! (`sign-in`, `sign-out`, `donate`, `retry`) that the hosting page maps to
//! the matching [`DonationView`](crate::view::DonationView) operation.

use yew::prelude::*;

use crate::view::{DonationStatus, NftCount, Screen};

const POVERTY_IMAGE: &str = "assets/educationOnPoverty.jpg";
const EDUCATION_IMAGE: &str = "assets/Multilingual-Education.jpg";
const SOURCE_URL: &str = "https://www.savethechildren.net/news/393-million-children-unable-read-world%E2%80%99s-shocking-lost-potential";

#[derive(Properties, PartialEq)]
pub struct PageProps {
    pub screen: Screen,
}

#[function_component(DonationPage)]
pub fn donation_page(props: &PageProps) -> Html {
    match &props.screen {
        Screen::SignedOut => html! { <SignedOut /> },
        Screen::Uninitialized { .. } => html! {
            <>
                <SignOutButton />
                <main>
                    <p>{ "Connecting to the donation contract\u{2026}" }</p>
                </main>
            </>
        },
        Screen::SignedIn { nfts, donation, .. } => html! {
            <SignedIn nfts={nfts.clone()} donation={donation.clone()} />
        },
    }
}

#[function_component(SignedOut)]
fn signed_out() -> Html {
    html! {
        <main>
            <h1>{ "NEAR HACKS ACADEMY" }</h1>
            <div class="study-on-poverty-img">
                <img src={POVERTY_IMAGE} alt="Children studying" />
            </div>
            <p>
                { "393 MILLION CHILDREN UNABLE TO READ" }
                <br />
                { "More than 393 million children have failed to gain the basic literacy skills \
                   at age 10 since world leaders adopted the Sustainable Development Goals in 2015, \
                   according to a new analysis tool launched today." }
                <br />
                <i><a href={SOURCE_URL}>{ "(www.savethechildren.net)" }</a></i>
            </p>
            <p>
                { "For each NFT you mint on this app, you could help more children to gain education:" }
            </p>
            <p style="text-align: center; margin-top: 2.5em">
                <button name="sign-in">{ "Sign in" }</button>
            </p>
        </main>
    }
}

#[function_component(SignOutButton)]
fn sign_out_button() -> Html {
    html! {
        <button class="link" name="sign-out" style="float: right">
            { "Sign out" }
        </button>
    }
}

#[derive(Properties, PartialEq)]
struct SignedInProps {
    nfts: NftCount,
    donation: DonationStatus,
}

#[function_component(SignedIn)]
fn signed_in(props: &SignedInProps) -> Html {
    let count = match (&props.nfts, props.nfts.displayed()) {
        (_, Some(count)) => html! {
            <>
                <h2>{ format!("Thank you for mint {count} for poor children.") }</h2>
                <h3>{ "please check your wallet to see them" }</h3>
            </>
        },
        (NftCount::Unavailable(reason), None) => html! {
            <>
                <h2>{ format!("Your donation count is unavailable ({reason}).") }</h2>
                <button class="retry" name="retry">{ "Retry" }</button>
            </>
        },
        (_, None) => html! {},
    };

    let submitting = props.donation.is_submitting();
    let status = match &props.donation {
        DonationStatus::Idle => html! {},
        DonationStatus::Submitting => html! {
            <p class="donation-status">{ "Waiting for your wallet to confirm the donation\u{2026}" }</p>
        },
        DonationStatus::Succeeded { transaction_hash, token_id } => {
            let token = token_id
                .map(|token_id| format!(" Your NFT is #{token_id}."))
                .unwrap_or_default();
            html! {
                <p class="donation-status">
                    { format!("Thank you! Donation confirmed in transaction {transaction_hash}.{token}") }
                </p>
            }
        }
        DonationStatus::Failed(reason) => html! {
            <p class="donation-status error">{ format!("The donation failed: {reason}") }</p>
        },
    };

    html! {
        <>
            <SignOutButton />
            <main>
                <div class="study-on-poverty-img">
                    <img src={EDUCATION_IMAGE} alt="Multilingual education" />
                </div>
                <p>
                    { "Donate for poor children by minting NFT. Two ETH would be sent to them for each NFT minted." }
                </p>
                <div style="text-align: center; margin-top: 2.5em">
                    { count }
                </div>
                <button name="donate" disabled={submitting}>
                    { if submitting { "Donating\u{2026}" } else { "Donate more" } }
                </button>
                { status }
                <br />
            </main>
        </>
    }
}

/// Renders `screen` to static HTML.
pub async fn render_page(screen: Screen) -> String {
    yew::ServerRenderer::<DonationPage>::with_props(move || PageProps { screen })
        .hydratable(false)
        .render()
        .await
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, Address, B256, U256};

    use super::*;

    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");

    fn signed_in(nfts: NftCount, donation: DonationStatus) -> Screen {
        Screen::SignedIn {
            account_id: ALICE,
            nfts,
            donation,
        }
    }

    #[tokio::test]
    async fn signed_out_page_offers_sign_in() {
        let html = render_page(Screen::SignedOut).await;
        assert!(html.contains("393 MILLION CHILDREN UNABLE TO READ"));
        assert!(html.contains("More than 393 million children"));
        assert!(html.contains("Sign in"));
        assert!(!html.contains("Donate more"));
        assert!(!html.contains("Thank you for mint"));
    }

    #[tokio::test]
    async fn buttons_are_named_after_their_actions() {
        let html = render_page(Screen::SignedOut).await;
        assert!(html.contains(r#"name="sign-in""#));
        assert!(!html.contains("onclick"));

        let html = render_page(signed_in(
            NftCount::Unavailable("down".to_string()),
            DonationStatus::Idle,
        ))
        .await;
        assert!(html.contains(r#"name="sign-out""#));
        assert!(html.contains(r#"name="donate""#));
        assert!(html.contains(r#"name="retry""#));
    }

    #[tokio::test]
    async fn count_defaults_to_zero() {
        let html = render_page(signed_in(NftCount::NotLoaded, DonationStatus::Idle)).await;
        assert!(html.contains("Thank you for mint 0 for poor children."));
        assert!(html.contains("Donate more"));
        assert!(html.contains("Sign out"));
    }

    #[tokio::test]
    async fn unavailable_count_offers_retry() {
        let html = render_page(signed_in(
            NftCount::Unavailable("query failed: timeout".to_string()),
            DonationStatus::Idle,
        ))
        .await;
        assert!(html.contains("Your donation count is unavailable (query failed: timeout)."));
        assert!(html.contains("Retry"));
        assert!(!html.contains("Thank you for mint"));
    }

    #[tokio::test]
    async fn donate_button_is_disabled_while_submitting() {
        let html = render_page(signed_in(NftCount::Loaded(1), DonationStatus::Submitting)).await;
        assert!(html.contains("disabled"));
        assert!(html.contains("Donating\u{2026}"));
        assert!(!html.contains("Donate more"));
    }

    #[tokio::test]
    async fn donation_outcome_is_shown() {
        let hash = B256::repeat_byte(0xab);
        let html = render_page(signed_in(
            NftCount::Loaded(1),
            DonationStatus::Succeeded {
                transaction_hash: hash,
                token_id: Some(U256::from(42)),
            },
        ))
        .await;
        assert!(html.contains(&hash.to_string()));
        assert!(html.contains("Your NFT is #42."));

        let html = render_page(signed_in(
            NftCount::Loaded(1),
            DonationStatus::Failed("transaction rejected: user denied".to_string()),
        ))
        .await;
        assert!(html.contains("The donation failed: transaction rejected: user denied"));
    }

    #[tokio::test]
    async fn uninitialized_page_has_no_donate_action() {
        let html = render_page(Screen::Uninitialized { account_id: ALICE }).await;
        assert!(html.contains("Connecting to the donation contract"));
        assert!(html.contains("Sign out"));
        assert!(!html.contains("Donate more"));
    }
}
