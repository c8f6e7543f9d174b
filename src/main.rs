//! ltc-txcore: command-line front end for fee estimation, spend planning and
//! key sweeping against an Esplora-compatible Litecoin indexer.

use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use ltc_txcore::litecoin::spend::RegularInput;
use ltc_txcore::{
    estimate, plan_spend, EsploraClient, InputKind, LitecoinAddress, SpendRequest, Sweeper,
    TransactionSpec, TxCoreConfig,
};

#[derive(Parser)]
#[command(name = "ltc-txcore")]
#[command(version, about = "Litecoin + MWEB transaction construction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate weight and fees of a transaction spec (JSON).
    Estimate(EstimateArgs),
    /// Sweep a seed phrase or private key into one address.
    Sweep(SweepArgs),
    /// Choose the shape and fee of a spend from selected inputs.
    Plan(PlanArgs),
}

#[derive(Args)]
struct EstimateArgs {
    /// Path to the spec file, or "-" for stdin.
    #[arg(long)]
    spec: String,

    /// Regular fee rate in sat/vbyte (default: FEE_RATE).
    #[arg(long)]
    fee_rate: Option<u64>,

    /// MWEB fee rate in sat/weight-unit (default: MWEB_FEE_RATE).
    #[arg(long)]
    mweb_fee_rate: Option<u64>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["mnemonic", "key"])))]
struct SweepArgs {
    /// Destination address (regular ledger).
    #[arg(long)]
    to: String,

    /// BIP39 seed phrase.
    #[arg(long)]
    mnemonic: Option<String>,

    /// Extended private key or WIF, as scanned from a QR code.
    #[arg(long)]
    key: Option<String>,
}

#[derive(Args)]
struct PlanArgs {
    /// Destination address (regular or MWEB).
    #[arg(long)]
    to: String,

    /// Amount to send.
    #[arg(long)]
    amount: u64,

    /// Regular input as kind:value, e.g. P2WPKH:100000. Repeatable.
    #[arg(long, value_parser = parse_regular_input)]
    regular: Vec<RegularInput>,

    /// MWEB input value. Repeatable.
    #[arg(long)]
    mweb: Vec<u64>,
}

fn parse_regular_input(arg: &str) -> std::result::Result<RegularInput, String> {
    let (kind, value) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected kind:value, got '{}'", arg))?;

    let tag = kind.trim().to_uppercase();
    let kind = InputKind::from_tag(&tag).ok_or_else(|| {
        format!(
            "unknown input kind '{}' (P2WPKH, P2PKH or P2SH-P2WPKH)",
            tag
        )
    })?;

    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value '{}': {}", value, e))?;

    Ok(RegularInput { kind, value })
}

fn read_spec(source: &str) -> Result<TransactionSpec> {
    let json = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read spec from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read spec from {}", source))?
    };

    serde_json::from_str(&json).context("Invalid transaction spec")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let cli = Cli::parse();
    let config = TxCoreConfig::from_env();

    match cli.command {
        Commands::Estimate(args) => {
            let spec = read_spec(&args.spec)?;
            let result = estimate(
                &spec,
                args.fee_rate.unwrap_or(config.fee_rate),
                args.mweb_fee_rate.unwrap_or(config.mweb_fee_rate),
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Sweep(args) => {
            let client =
                EsploraClient::from_config(&config).context("Failed to create indexer client")?;
            let sweeper = Sweeper::new(&config, &client, &client);

            let swept = if let Some(words) = &args.mnemonic {
                sweeper.sweep_mnemonic(words, &args.to).await
            } else if let Some(key) = &args.key {
                sweeper.sweep_qr_key(key, &args.to).await
            } else {
                bail!("one of --mnemonic or --key is required");
            }
            .context("Sweep failed")?;

            println!("{}", serde_json::to_string_pretty(&swept)?);
        }
        Commands::Plan(args) => {
            let destination = LitecoinAddress::parse(&args.to, config.network)
                .context("Invalid destination")?;
            let request = SpendRequest {
                regular_inputs: args.regular,
                mweb_inputs: args.mweb,
                send_amount: args.amount,
                destination,
            };
            let plan = plan_spend(&request, config.fee_rate, config.mweb_fee_rate)
                .context("Planning failed")?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regular_input() {
        let input = parse_regular_input("p2sh-p2wpkh: 40000").unwrap();
        assert_eq!(input.kind, InputKind::P2shP2wpkh);
        assert_eq!(input.value, 40_000);

        assert!(parse_regular_input("P2TR:1000").is_err());
        assert!(parse_regular_input("P2WPKH").is_err());
        assert!(parse_regular_input("P2WPKH:lots").is_err());
    }
}
