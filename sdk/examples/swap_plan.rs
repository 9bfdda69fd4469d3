//! Plan a swap against a live cluster and print the quote and instructions
//!
//! Usage:
//!   cargo run --example swap_plan -- <pool> <mint> <amount> [exact-in|exact-out] [config.toml]
//!
//! The authority defaults to the `funder` in the config file; set
//! `RUST_LOG=clmm_swap_sdk=debug` to see the individual reads.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clmm_swap_sdk::prelude::*;
use clmm_swap_sdk::{SdkConfig, SwapIntent, SwapPlanner, SwapQuote};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        bail!("usage: swap_plan <pool> <mint> <amount> [exact-in|exact-out] [config.toml]");
    }

    let pool = Pubkey::from_str(&args[0]).context("invalid pool address")?;
    let mint = Pubkey::from_str(&args[1]).context("invalid mint address")?;
    let amount: u64 = args[2].parse().context("invalid amount")?;
    let intent = match args.get(3).map(String::as_str) {
        None | Some("exact-in") => SwapIntent::exact_in(amount, mint),
        Some("exact-out") => SwapIntent::exact_out(amount, mint),
        Some(other) => bail!("unknown swap mode {}", other),
    };
    let config = match args.get(4) {
        Some(path) => SdkConfig::load(path)?,
        None => SdkConfig::devnet(),
    };

    println!("=== Swap Plan ===");
    println!("RPC: {}", config.rpc_url);
    println!("Program ID: {}", config.program_id);

    let rpc = Arc::new(config.rpc_client()?);
    let planner = SwapPlanner::new(rpc, config);

    let quote = planner.quote_swap(&intent, &pool, None).await?;
    match quote {
        SwapQuote::ExactIn(q) => println!(
            "Exact input: in {} -> est out {} (min {}), fee {}",
            q.token_in, q.token_est_out, q.token_min_out, q.trade_fee
        ),
        SwapQuote::ExactOut(q) => println!(
            "Exact output: out {} <- est in {} (max {}), fee {}",
            q.token_out, q.token_est_in, q.token_max_in, q.trade_fee
        ),
    }

    if planner.config().funder.is_none() {
        println!("No funder configured; skipping instruction assembly");
        return Ok(());
    }

    let plan = planner.plan_swap(&intent, &pool, None, None).await?;
    println!("Direction: {:?}", plan.direction);
    println!("Tick array starts: {:?}", plan.tick_array_start_indices);
    for (i, ix) in plan.instructions.iter().enumerate() {
        println!(
            "  [{}] program {} ({} accounts, {} data bytes)",
            i,
            ix.program_id,
            ix.accounts.len(),
            ix.data.len()
        );
    }

    Ok(())
}
