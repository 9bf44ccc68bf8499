//! hl-sign: sign a single limit order and print the exchange request body
//!
//! The private key is read only from `HL_PRIVATE_KEY`; there is no flag for it,
//! so it never lands in shell history or process listings. Nothing is sent
//! unless `--submit` is given.
//!
//! Usage:
//!   HL_PRIVATE_KEY=0x... hl-sign --symbol BTC-USD --side buy --price 100000 --size 0.0001
//!   HL_PRIVATE_KEY=0x... hl-sign --network testnet --symbol ETH --side sell \
//!       --price 3000 --size 0.5 --tif ioc --submit

use clap::{Parser, ValueEnum};
use ethers::types::Address;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hyperliquid_actions::exchange::{encode_order_batch, ExchangeAction};
use hyperliquid_actions::{
    Client, ClientConfig, Cloid, Error, ExchangeResponseData, Network, OrderGrouping,
    OrderIntent, Result, Side, SubmitOptions, TimeInForce, Wallet,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SideArg {
    Buy,
    Sell,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Buy => Side::Buy,
            SideArg::Sell => Side::Sell,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TifArg {
    Gtc,
    Ioc,
    Alo,
}

impl From<TifArg> for TimeInForce {
    fn from(tif: TifArg) -> Self {
        match tif {
            TifArg::Gtc => TimeInForce::Gtc,
            TifArg::Ioc => TimeInForce::Ioc,
            TifArg::Alo => TimeInForce::Alo,
        }
    }
}

#[derive(Parser)]
#[command(name = "hl-sign", about = "Sign (and optionally submit) a limit order")]
struct Args {
    /// mainnet or testnet
    #[arg(long, default_value = "mainnet")]
    network: Network,

    /// Override the network's API URL
    #[arg(long)]
    base_url: Option<String>,

    /// Symbol to trade, e.g. BTC-USD
    #[arg(long)]
    symbol: String,

    /// Resolve the symbol against the spot universe
    #[arg(long, default_value_t = false)]
    spot: bool,

    /// Use this asset index instead of resolving the symbol
    #[arg(long)]
    asset: Option<u32>,

    #[arg(long, value_enum)]
    side: SideArg,

    #[arg(long)]
    price: String,

    #[arg(long)]
    size: String,

    #[arg(long, value_enum, default_value = "gtc")]
    tif: TifArg,

    #[arg(long, default_value_t = false)]
    reduce_only: bool,

    /// Client order id, 0x + 32 hex digits
    #[arg(long)]
    cloid: Option<Cloid>,

    /// Fixed nonce; defaults to the current time in milliseconds
    #[arg(long)]
    nonce: Option<u64>,

    /// Trade on behalf of this vault or subaccount
    #[arg(long)]
    vault: Option<String>,

    /// Millisecond timestamp after which the venue drops the order
    #[arg(long)]
    expires_after: Option<u64>,

    /// Send the signed request instead of only printing it
    #[arg(long, default_value_t = false)]
    submit: bool,
}

const PRIVATE_KEY_VAR: &str = "HL_PRIVATE_KEY";

fn wallet_from_env() -> Result<Wallet> {
    let key = std::env::var(PRIVATE_KEY_VAR)
        .map_err(|e| Error::Auth(format!("{PRIVATE_KEY_VAR} not usable: {e}")))?;
    Wallet::from_private_key(&key)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hyperliquid_actions=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn submit_options(args: &Args) -> Result<SubmitOptions> {
    let mut options = SubmitOptions::new();
    if let Some(nonce) = args.nonce {
        options = options.nonce(nonce);
    }
    if let Some(vault) = &args.vault {
        let vault: Address = vault
            .parse()
            .map_err(|e| Error::InvalidParameter(format!("Invalid vault address: {e}")))?;
        options = options.vault_address(vault);
    }
    if let Some(expires_after) = args.expires_after {
        options = options.expires_after(expires_after);
    }
    Ok(options)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let client = Client::from_config(&ClientConfig {
        base_url: args.base_url.clone(),
        ..ClientConfig::new(args.network)
    })?;
    let wallet = wallet_from_env()?;

    let mut intent = OrderIntent::limit(
        args.symbol.as_str(),
        args.side.into(),
        args.price.as_str(),
        args.size.as_str(),
    )
    .tif(args.tif.into())
    .reduce_only(args.reduce_only);
    if let Some(cloid) = args.cloid {
        intent = intent.cloid(cloid);
    }
    if args.spot {
        intent = intent.spot();
    }

    let intents = [intent];
    let action = match args.asset {
        Some(asset) => ExchangeAction::Order(encode_order_batch(
            &intents,
            &[asset],
            OrderGrouping::Na,
            None,
        )?),
        None => {
            client
                .build_order_action(&intents, OrderGrouping::Na, None)
                .await?
        }
    };

    let request = client
        .sign_action(&wallet, action, submit_options(&args)?)
        .await?;
    println!("{}", serde_json::to_string_pretty(&request)?);

    if !args.submit {
        return Ok(());
    }

    match client.submit(&request).await? {
        ExchangeResponseData::Order(order) => {
            for outcome in order.statuses {
                println!("{}", serde_json::to_string(&outcome)?);
            }
        }
        ExchangeResponseData::Default => println!("ok"),
    }
    Ok(())
}
