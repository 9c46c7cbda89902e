//! paystream CLI: inspect payment-stream networks, streams and balances.
//!
//! # Commands
//! ```text
//! paystream networks
//! paystream tokens        --network <name>
//! paystream stream        --network <name> --id <id>
//! paystream streams       --network <name> --address <addr> [--role ..] [--status ..] [--sort ..]
//! paystream withdrawable  --network <name> --id <id>
//! paystream balance       --network <name> --address <addr> --token <addr|native>
//! paystream decode-revert --data <hex>
//! ```

use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use paystream_core::{
    format_amount, short_address, NetworkName, RoleFilter, SortOrder, StatusFilter, StreamCounts,
    StreamDetails, StreamId, StreamQuery, SystemClock, Clock, TokenAddress, UserStreamEntry, Role,
};

mod logging;
mod session;

use logging::{init_tracing, LogConfig};

#[derive(Parser)]
#[command(
    name = "paystream",
    about = "paystream CLI: token payment streams on Celo and Arc",
    long_about = "
paystream CLI: read stream state from the deployed stream contracts.
All commands are read-only and use a watch-only wallet.

ENVIRONMENT VARIABLES:
  PAYSTREAM_RPC_CELO_MAINNET   Celo mainnet RPC URL
  PAYSTREAM_RPC_CELO_SEPOLIA   Celo Sepolia RPC URL
  PAYSTREAM_RPC_ARC_TESTNET    Arc testnet RPC URL
  RUST_LOG                     Log filter (overrides --log-level)
",
    version
)]
struct Cli {
    /// Global log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit JSON structured logs on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported networks
    Networks {
        #[arg(long)]
        json: bool,
    },

    /// List the tokens a network supports
    Tokens {
        #[arg(long, default_value = "celo-sepolia")]
        network: NetworkName,
        #[arg(long)]
        json: bool,
    },

    /// Show one stream
    Stream {
        #[arg(long, default_value = "celo-sepolia")]
        network: NetworkName,
        /// Stream id
        #[arg(long)]
        id: StreamId,
        /// RPC URL (overrides env PAYSTREAM_RPC_<NETWORK>)
        #[arg(long)]
        rpc: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// List the streams an address sends or receives
    Streams {
        #[arg(long, default_value = "celo-sepolia")]
        network: NetworkName,
        #[arg(long)]
        address: Address,
        #[arg(long, value_enum, default_value_t = RoleArg::All)]
        role: RoleArg,
        #[arg(long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
        #[arg(long, value_enum, default_value_t = SortArg::Newest)]
        sort: SortArg,
        /// Case-insensitive filter over id, sender, recipient and symbol
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        rpc: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Amount the recipient could withdraw now
    Withdrawable {
        #[arg(long, default_value = "celo-sepolia")]
        network: NetworkName,
        #[arg(long)]
        id: StreamId,
        #[arg(long)]
        rpc: Option<String>,
    },

    /// Token balance and stream-contract allowance of an address
    Balance {
        #[arg(long, default_value = "celo-sepolia")]
        network: NetworkName,
        #[arg(long)]
        address: Address,
        /// Token contract address, or `native`
        #[arg(long)]
        token: TokenAddress,
        #[arg(long)]
        rpc: Option<String>,
    },

    /// Decode revert data returned by a failed call
    #[command(name = "decode-revert")]
    DecodeRevert {
        /// Revert data (0x-prefixed hex)
        #[arg(long)]
        data: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    All,
    Sent,
    Received,
}

impl From<RoleArg> for RoleFilter {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::All => Self::All,
            RoleArg::Sent => Self::Sent,
            RoleArg::Received => Self::Received,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Active,
    Completed,
    Pending,
}

impl From<StatusArg> for StatusFilter {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::All => Self::All,
            StatusArg::Active => Self::Active,
            StatusArg::Completed => Self::Completed,
            StatusArg::Pending => Self::Pending,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Newest,
    Oldest,
    AmountHigh,
    AmountLow,
    Progress,
}

impl From<SortArg> for SortOrder {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Newest => Self::Newest,
            SortArg::Oldest => Self::Oldest,
            SortArg::AmountHigh => Self::AmountHigh,
            SortArg::AmountLow => Self::AmountLow,
            SortArg::Progress => Self::Progress,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&LogConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
        ..LogConfig::default()
    });

    match cli.command {
        Commands::Networks { json } => cmd_networks(json),
        Commands::Tokens { network, json } => cmd_tokens(network, json),
        Commands::Stream { network, id, rpc, json } => {
            cmd_stream(network, id, rpc.as_deref(), json).await
        }
        Commands::Streams { network, address, role, status, sort, search, rpc, json } => {
            let mut query = StreamQuery::new()
                .role(role.into())
                .status(status.into())
                .sort(sort.into());
            if let Some(term) = search {
                query = query.search(term);
            }
            cmd_streams(network, address, &query, rpc.as_deref(), json).await
        }
        Commands::Withdrawable { network, id, rpc } => {
            cmd_withdrawable(network, id, rpc.as_deref()).await
        }
        Commands::Balance { network, address, token, rpc } => {
            cmd_balance(network, address, token, rpc.as_deref()).await
        }
        Commands::DecodeRevert { data } => cmd_decode_revert(&data),
    }
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_networks(as_json: bool) -> Result<()> {
    if as_json {
        let all: Vec<_> = NetworkName::ALL.iter().map(|n| n.descriptor()).collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }
    println!("{:<14} {:<22} {:>10}  {}", "NAME", "DISPLAY NAME", "CHAIN ID", "STREAM CONTRACT");
    for name in NetworkName::ALL {
        let d = name.descriptor();
        println!(
            "{:<14} {:<22} {:>10}  {}",
            d.name.as_str(),
            d.display_name,
            d.chain_id,
            d.stream_contract
        );
    }
    Ok(())
}

fn cmd_tokens(network: NetworkName, as_json: bool) -> Result<()> {
    let d = network.descriptor();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&d.tokens)?);
        return Ok(());
    }
    println!("Tokens on {} ({}):\n", d.display_name, d.chain_id);
    for t in d.tokens {
        println!("  {:<8} {:>2} decimals  {}", t.symbol(), t.decimals, t.address);
    }
    Ok(())
}

async fn cmd_stream(network: NetworkName, id: StreamId, rpc: Option<&str>, as_json: bool) -> Result<()> {
    let gateway = session::open(network, rpc, Address::ZERO).await?;
    let stream = gateway
        .try_stream_details(id)
        .await
        .map_err(|e| anyhow!("stream {id} not readable on {network}: {e}"))?;
    let now = SystemClock.now();

    if as_json {
        let out = json!({
            "stream": stream,
            "status": stream.status(now),
            "progress": stream.progress(now),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    print_stream(&stream, network, now);
    Ok(())
}

fn print_stream(s: &StreamDetails, network: NetworkName, now: u64) {
    let amount = |v: U256| format_amount(v, s.token_decimals, &s.token_symbol);
    let d = network.descriptor();
    println!("Stream #{}  [{}]", s.id, s.status(now));
    println!("  Sender:       {}", s.sender);
    println!("  Recipient:    {}", s.recipient);
    println!("  Token:        {} ({})", s.token_symbol, s.token_address);
    println!("  Deposit:      {}", amount(s.total_amount));
    println!("  Withdrawn:    {}", amount(s.withdrawn));
    println!("  Remaining:    {}", amount(s.remaining_balance));
    println!("  Withdrawable: {}", amount(s.withdrawable_amount));
    println!("  Schedule:     {} → {}", s.start_time, s.stop_time);
    println!("  Progress:     {:.1}%", s.progress(now) * 100.0);
    if let Some(url) = d.explorer_address_url(&d.stream_contract) {
        println!("  Contract:     {url}");
    }
}

async fn cmd_streams(
    network: NetworkName,
    address: Address,
    query: &StreamQuery,
    rpc: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let gateway = session::open(network, rpc, address).await?;
    let all: Vec<UserStreamEntry> = gateway.get_user_streams(address).await?;
    let now = SystemClock.now();
    let shown = query.apply(&all, now);
    let counts = StreamCounts::from_entries(&all, now);

    if as_json {
        let out = json!({ "counts": counts, "streams": shown });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} streams ({} sent, {} received, {} active, {} completed)\n",
        counts.total, counts.sent, counts.received, counts.active, counts.completed
    );
    for e in &shown {
        let s = &e.stream;
        let counterparty = match e.role {
            Role::Sent => s.recipient,
            Role::Received => s.sender,
        };
        println!(
            "  #{:<6} {:<9} {:<10} {:>24}  {:>5.1}%  {}",
            s.id.0,
            format!("{:?}", e.role).to_lowercase(),
            s.status(now).to_string(),
            format_amount(s.total_amount, s.token_decimals, &s.token_symbol),
            s.progress(now) * 100.0,
            short_address(&counterparty),
        );
    }
    if shown.is_empty() {
        println!("  (no matching streams)");
    }
    Ok(())
}

async fn cmd_withdrawable(network: NetworkName, id: StreamId, rpc: Option<&str>) -> Result<()> {
    let gateway = session::open(network, rpc, Address::ZERO).await?;
    let amount = gateway.get_withdrawable_amount(id).await;
    match gateway.get_stream_details(id).await {
        Some(s) => println!("{}", format_amount(amount, s.token_decimals, &s.token_symbol)),
        None => println!("{amount}"),
    }
    Ok(())
}

async fn cmd_balance(network: NetworkName, address: Address, token: TokenAddress, rpc: Option<&str>) -> Result<()> {
    let gateway = session::open(network, rpc, address).await?;
    let d = network.descriptor();
    let (symbol, decimals) = match d.token(token) {
        Some(t) => (t.symbol().to_string(), t.decimals),
        None => {
            let meta = gateway.token_metadata(token).await?;
            (meta.symbol, meta.decimals)
        }
    };

    let balance = gateway.token_balance(token).await?;
    println!("Balance:   {}", format_amount(balance, decimals, &symbol));
    if let TokenAddress::Contract(_) = token {
        let allowance = gateway.token_allowance(token).await?;
        println!("Allowance: {}  (stream contract {})", format_amount(allowance, decimals, &symbol), d.stream_contract);
    }
    Ok(())
}

fn cmd_decode_revert(data: &str) -> Result<()> {
    let reason = paystream_evm::decode_revert_hex(data)
        .ok_or_else(|| anyhow!("'{data}' is not valid hex"))?;
    println!("{reason}");
    Ok(())
}
