use std::env;

use donation_view::{
    chain::{EthersContract, EthersWallet},
    page::render_page,
    DonationView, NetworkConfig,
};
use ethers::providers::{Http, Provider};
use eyre::{bail, WrapErr};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = NetworkConfig::from_env()?;
    tracing::info!(network = %config.network, rpc_url = %config.rpc_url, "Connecting");
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .wrap_err_with(|| format!("invalid RPC URL {}", config.rpc_url))?;

    let signing_in = config.key_path.is_some();
    let wallet = EthersWallet::new(provider.clone(), config.chain_id, config.key_path);
    let contract = EthersContract::new(provider, config.contract_address);
    let mut view = DonationView::new(wallet, Some(contract));
    if signing_in {
        view.sign_in().await?;
    }

    match env::args().nth(1).as_deref() {
        None => {}
        Some("donate") => {
            view.mount().await;
            let outcome = view.donate().await?;
            tracing::info!(transaction_hash = %outcome.transaction_hash, "Donated");
            view.refresh_nft_count().await;
        }
        Some("sign-out") => view.sign_out()?,
        Some(command) => bail!("unknown command `{command}`, expected `donate` or `sign-out`"),
    }

    view.mount().await;
    println!("{}", render_page(view.screen()).await);
    Ok(())
}
