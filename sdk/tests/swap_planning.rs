//! End-to-end planning against an in-memory ledger

mod common;

use std::sync::Arc;

use clmm_swap_sdk::client::fetch_tick_arrays_or_default;
use clmm_swap_sdk::instructions::{AccountsType, SwapArgs};
use clmm_swap_sdk::prelude::*;
use clmm_swap_sdk::protocol::PdaBuilder;
use clmm_swap_sdk::{
    swap_instructions, BaseClient, SdkError, SwapDirection, SwapIntent, SwapPlan, SwapPlanner,
    SwapQuote, TickArraySource,
};
use common::{init_tracing, MemoryLedger, PoolFixture};
use spl_associated_token_account::get_associated_token_address_with_program_id;

const SPACING: u16 = 64;
const WINDOW_AT_ZERO: [i32; 5] = [0, 5632, 11264, -5632, -11264];

fn swap_ix<'a>(fixture: &PoolFixture, plan: &'a SwapPlan) -> &'a Instruction {
    let swaps: Vec<&Instruction> = plan
        .instructions
        .iter()
        .filter(|ix| ix.program_id == fixture.config.program_id)
        .collect();
    assert_eq!(swaps.len(), 1, "Plan should contain exactly one swap instruction");
    swaps[0]
}

fn swap_args(ix: &Instruction) -> SwapArgs {
    SwapArgs::try_from_slice(&ix.data[8..]).expect("swap data should decode")
}

async fn plan(fixture: &PoolFixture, intent: SwapIntent) -> Result<SwapPlan, SdkError> {
    SwapPlanner::new(fixture.ledger.clone(), fixture.config.clone())
        .plan_swap(&intent, &fixture.pool, None, None)
        .await
}

// ============================================================================
// Window and account layout
// ============================================================================

#[tokio::test]
async fn test_plan_references_window_in_order() {
    init_tracing();
    let fixture = PoolFixture::new(SPACING);

    let plan = plan(&fixture, SwapIntent::exact_in(1_000_000, fixture.mint_a()))
        .await
        .expect("planning with no tick arrays on the ledger should succeed");

    assert_eq!(plan.tick_array_start_indices, WINDOW_AT_ZERO);

    let ix = swap_ix(&fixture, &plan);
    assert_eq!(ix.accounts.len(), 16, "11 fixed accounts plus 5 tick arrays");
    for (slot, start) in WINDOW_AT_ZERO.iter().enumerate() {
        let meta = &ix.accounts[11 + slot];
        assert_eq!(
            meta.pubkey,
            fixture.tick_array_address(*start),
            "Tick array slot {} should be the PDA for start {}",
            slot,
            start
        );
        assert!(meta.is_writable, "Tick array slot {} should be writable", slot);
        assert!(!meta.is_signer);
    }

    assert_eq!(ix.accounts[3].pubkey, fixture.wallet);
    assert!(ix.accounts[3].is_signer, "Authority should sign");
    assert_eq!(ix.accounts[4].pubkey, fixture.pool);
    assert_eq!(ix.accounts[0].pubkey, spl_token::ID);
    assert_eq!(ix.accounts[1].pubkey, spl_token::ID);
}

#[tokio::test]
async fn test_swap_data_decodes_to_quote() {
    let fixture = PoolFixture::new(SPACING);
    let plan = plan(&fixture, SwapIntent::exact_in(1_000_000, fixture.mint_a()))
        .await
        .unwrap();

    let args = swap_args(swap_ix(&fixture, &plan));
    assert_eq!(args.amount, 1_000_000);
    assert_eq!(args.other_amount_threshold, plan.quote.other_amount_threshold());
    assert_eq!(args.sqrt_price_limit, 0);
    assert!(args.amount_specified_is_input);
    assert!(args.a_to_b);

    let info = args
        .remaining_accounts_info
        .expect("supplemental tick arrays should be described");
    assert_eq!(info.slices.len(), 1);
    assert_eq!(info.slices[0].accounts_type, AccountsType::SupplementalTickArrays);
    assert_eq!(info.slices[0].length, 2);
}

#[tokio::test]
async fn test_materialized_array_among_synthetic_ones() {
    let fixture = PoolFixture::new(SPACING);
    let stored = fixture.insert_tick_array(5632);

    let base = BaseClient::new(fixture.ledger.clone(), fixture.config.program_id);
    let pool = base.fetch_pool(&fixture.pool).await.unwrap();
    let window = fetch_tick_arrays_or_default(
        fixture.ledger.as_ref(),
        &PdaBuilder::new(fixture.config.program_id),
        &pool,
    )
    .await
    .unwrap();

    for (slot, array) in window.iter().enumerate() {
        assert_eq!(array.address, fixture.tick_array_address(WINDOW_AT_ZERO[slot]));
        assert_eq!(array.data.start_tick_index, WINDOW_AT_ZERO[slot]);
        assert_eq!(array.owner, fixture.config.program_id);
        if slot == 1 {
            assert_eq!(array.source, TickArraySource::Materialized);
            assert_eq!(array.data, stored);
        } else {
            assert!(array.is_synthetic(), "Slot {} should be synthetic", slot);
            assert_eq!(array.data.initialized_tick_count(), 0);
            assert_eq!(array.data.fusion_pool, fixture.pool);
        }
    }

    // The mixed window still plans
    let plan = plan(&fixture, SwapIntent::exact_in(1_000_000, fixture.mint_b()))
        .await
        .unwrap();
    assert_eq!(plan.direction, SwapDirection::BToA);
}

// ============================================================================
// Direction and threshold
// ============================================================================

#[tokio::test]
async fn test_exact_out_of_b_swaps_a_to_b_with_max_in_threshold() {
    let fixture = PoolFixture::new(SPACING);

    let plan = plan(&fixture, SwapIntent::exact_out(500_000, fixture.mint_b()))
        .await
        .expect("exact output should plan even when no token accounts exist");

    assert_eq!(plan.direction, SwapDirection::AToB);
    assert!(plan.a_to_b());
    let quote = match plan.quote {
        SwapQuote::ExactOut(quote) => quote,
        other => panic!("Expected an exact output quote, got {:?}", other),
    };
    assert_eq!(quote.token_out, 500_000);
    assert!(quote.token_max_in >= quote.token_est_in);
    assert!(quote.token_est_in > 500_000, "Fees make the input exceed the output at price 1");

    let args = swap_args(swap_ix(&fixture, &plan));
    assert_eq!(args.other_amount_threshold, quote.token_max_in);
    assert!(!args.amount_specified_is_input);
    assert!(args.a_to_b);

    // Both ATAs are missing, so both are created ahead of the swap
    let creates = plan
        .instructions
        .iter()
        .take_while(|ix| ix.program_id != fixture.config.program_id)
        .filter(|ix| ix.program_id == spl_associated_token_account::ID)
        .count();
    assert_eq!(creates, 2);
}

#[tokio::test]
async fn test_exact_in_of_b_swaps_b_to_a() {
    let fixture = PoolFixture::new(SPACING);
    let plan = plan(&fixture, SwapIntent::exact_in(250_000, fixture.mint_b()))
        .await
        .unwrap();

    assert_eq!(plan.direction, SwapDirection::BToA);
    let quote = match plan.quote {
        SwapQuote::ExactIn(quote) => quote,
        other => panic!("Expected an exact input quote, got {:?}", other),
    };
    assert!(quote.token_min_out <= quote.token_est_out);
    assert!(quote.next_sqrt_price > common::SQRT_PRICE_ONE, "B to A raises the price");

    let args = swap_args(swap_ix(&fixture, &plan));
    assert_eq!(args.other_amount_threshold, quote.token_min_out);
    assert!(!args.a_to_b);
}

#[tokio::test]
async fn test_existing_token_accounts_are_reused() {
    let fixture = PoolFixture::new(SPACING);
    let ata_a = get_associated_token_address_with_program_id(
        &fixture.wallet,
        &fixture.mint_a(),
        &spl_token::ID,
    );
    let ata_b = get_associated_token_address_with_program_id(
        &fixture.wallet,
        &fixture.mint_b(),
        &spl_token::ID,
    );
    fixture.ledger.insert(ata_a, spl_token::ID, vec![0; 165]);
    fixture.ledger.insert(ata_b, spl_token::ID, vec![0; 165]);

    let plan = plan(&fixture, SwapIntent::exact_in(1_000, fixture.mint_a()))
        .await
        .unwrap();

    assert_eq!(plan.instructions.len(), 1, "Only the swap should remain");
    let ix = swap_ix(&fixture, &plan);
    assert_eq!(ix.accounts[7].pubkey, ata_a);
    assert_eq!(ix.accounts[9].pubkey, ata_b);
}

// ============================================================================
// Determinism
// ============================================================================

#[tokio::test]
async fn test_planning_is_repeatable() {
    let fixture = PoolFixture::new(SPACING);
    let intent = SwapIntent::exact_out(42_000, fixture.mint_a());

    let first = plan(&fixture, intent).await.unwrap();
    let second = swap_instructions(
        fixture.ledger.clone(),
        &fixture.config,
        &intent,
        &fixture.pool,
        None,
        Some(fixture.wallet),
    )
    .await
    .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.quote).unwrap(),
        serde_json::to_string(&second.quote).unwrap()
    );
}

#[tokio::test]
async fn test_quote_matches_plan() {
    let fixture = PoolFixture::new(SPACING);
    let planner = SwapPlanner::new(fixture.ledger.clone(), fixture.config.clone());
    let intent = SwapIntent::exact_in(77_777, fixture.mint_b());

    let quote = planner.quote_swap(&intent, &fixture.pool, Some(250)).await.unwrap();
    let plan = planner
        .plan_swap(&intent, &fixture.pool, Some(250), None)
        .await
        .unwrap();
    assert_eq!(quote, plan.quote);

    let tighter = planner.quote_swap(&intent, &fixture.pool, Some(10)).await.unwrap();
    assert!(
        tighter.other_amount_threshold() >= quote.other_amount_threshold(),
        "Lower slippage should not lower the minimum output"
    );
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_missing_pool() {
    let fixture = PoolFixture::new(SPACING);
    fixture.ledger.remove(&fixture.pool);

    let result = plan(&fixture, SwapIntent::exact_in(1_000, fixture.mint_a())).await;
    assert!(matches!(result, Err(SdkError::PoolNotFound(p)) if p == fixture.pool));
}

#[tokio::test]
async fn test_zero_tick_spacing_is_a_decode_error() {
    let fixture = PoolFixture::new(0);

    let result = plan(&fixture, SwapIntent::exact_in(1_000, fixture.mint_a())).await;
    assert!(
        matches!(result, Err(SdkError::AccountDecode { address, .. }) if address == fixture.pool),
        "A pool with zero tick spacing should fail to decode, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_missing_mint() {
    let fixture = PoolFixture::new(SPACING);
    fixture.ledger.remove(&fixture.mint_b());

    let result = plan(&fixture, SwapIntent::exact_in(1_000, fixture.mint_a())).await;
    assert!(matches!(result, Err(SdkError::MintNotFound(m)) if m == fixture.mint_b()));
}

#[tokio::test]
async fn test_invalid_intents() {
    let fixture = PoolFixture::new(SPACING);
    let planner = SwapPlanner::new(fixture.ledger.clone(), fixture.config.clone());

    let zero = planner
        .plan_swap(&SwapIntent::exact_in(0, fixture.mint_a()), &fixture.pool, None, None)
        .await;
    assert!(matches!(zero, Err(SdkError::InvalidIntent(_))), "Zero amount");

    let foreign = planner
        .plan_swap(&SwapIntent::exact_in(1_000, Pubkey::new_unique()), &fixture.pool, None, None)
        .await;
    assert!(matches!(foreign, Err(SdkError::InvalidIntent(_))), "Foreign mint");

    let slippage = planner
        .plan_swap(
            &SwapIntent::exact_in(1_000, fixture.mint_a()),
            &fixture.pool,
            Some(10_001),
            None,
        )
        .await;
    assert!(matches!(slippage, Err(SdkError::InvalidIntent(_))), "Slippage above 100%");

    let mut config = fixture.config.clone();
    config.funder = None;
    let no_authority = SwapPlanner::new(fixture.ledger.clone(), config)
        .plan_swap(&SwapIntent::exact_in(1_000, fixture.mint_a()), &fixture.pool, None, None)
        .await;
    assert!(matches!(no_authority, Err(SdkError::InvalidIntent(_))), "No authority");
}

#[tokio::test]
async fn test_invalid_intent_is_rejected_before_any_read() {
    let fixture = PoolFixture::new(SPACING);
    let planner = SwapPlanner::new(Arc::new(MemoryLedger::failing("offline")), fixture.config.clone());

    let result = planner
        .plan_swap(&SwapIntent::exact_in(0, fixture.mint_a()), &fixture.pool, None, None)
        .await;
    assert!(matches!(result, Err(SdkError::InvalidIntent(_))));
}

#[tokio::test]
async fn test_rpc_failure_is_transient() {
    let fixture = PoolFixture::new(SPACING);
    let planner = SwapPlanner::new(
        Arc::new(MemoryLedger::failing("connection reset")),
        fixture.config.clone(),
    );

    let err = planner
        .plan_swap(&SwapIntent::exact_in(1_000, fixture.mint_a()), &fixture.pool, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Rpc(_)));
    assert!(err.is_transient());
    assert!(!SdkError::PoolNotFound(fixture.pool).is_transient());
}

// ============================================================================
// Native mint and Token-2022
// ============================================================================

#[tokio::test]
async fn test_native_mint_is_wrapped_around_swap() {
    let fixture = PoolFixture::with_mints(SPACING, spl_token::native_mint::ID, Pubkey::new_unique());

    let plan = plan(&fixture, SwapIntent::exact_in(2_000_000, spl_token::native_mint::ID))
        .await
        .unwrap();
    assert_eq!(plan.direction, SwapDirection::AToB);

    let programs: Vec<Pubkey> = plan.instructions.iter().map(|ix| ix.program_id).collect();
    let swap_at = programs
        .iter()
        .position(|program| *program == fixture.config.program_id)
        .expect("swap instruction should be present");

    // Two ATA creations, the lamport transfer and the sync come first
    assert_eq!(swap_at, 4);
    let transfer_at = programs
        .iter()
        .position(|program| *program == solana_sdk::system_program::ID)
        .expect("lamport transfer should be present");
    assert_eq!(programs[transfer_at + 1], spl_token::ID, "sync_native follows the transfer");
    assert!(transfer_at + 1 < swap_at);
    assert_eq!(
        programs[..swap_at]
            .iter()
            .filter(|program| **program == spl_associated_token_account::ID)
            .count(),
        2
    );

    // The fresh wrapped SOL account is closed afterwards
    assert_eq!(programs.len(), swap_at + 2);
    assert_eq!(programs[swap_at + 1], spl_token::ID);

    let wsol_ata = get_associated_token_address_with_program_id(
        &fixture.wallet,
        &spl_token::native_mint::ID,
        &spl_token::ID,
    );
    assert_eq!(plan.instructions[swap_at + 1].accounts[0].pubkey, wsol_ata);
    assert_eq!(swap_ix(&fixture, &plan).accounts[7].pubkey, wsol_ata);
}

#[tokio::test]
async fn test_transfer_fee_follows_current_epoch() {
    let fixture = PoolFixture::new(SPACING);
    fixture.use_transfer_fee_mint_b((0, 0), (10, 500));
    let intent = SwapIntent::exact_in(1_000_000, fixture.mint_a());

    fixture.ledger.set_epoch(5);
    let before = plan(&fixture, intent).await.unwrap();
    fixture.ledger.set_epoch(10);
    let after = plan(&fixture, intent).await.unwrap();

    let (before_quote, after_quote) = match (before.quote, after.quote) {
        (SwapQuote::ExactIn(b), SwapQuote::ExactIn(a)) => (b, a),
        other => panic!("Expected exact input quotes, got {:?}", other),
    };
    assert!(
        after_quote.token_est_out < before_quote.token_est_out,
        "A 5% output transfer fee should reduce the estimate: {} vs {}",
        after_quote.token_est_out,
        before_quote.token_est_out
    );
    assert_eq!(before_quote.token_in, after_quote.token_in);

    let ix = swap_ix(&fixture, &after);
    assert_eq!(ix.accounts[1].pubkey, spl_token_2022::ID);
    assert_eq!(
        ix.accounts[9].pubkey,
        get_associated_token_address_with_program_id(
            &fixture.wallet,
            &fixture.mint_b(),
            &spl_token_2022::ID
        )
    );
}

// ============================================================================
// Runtime footprint
// ============================================================================

#[test]
fn test_planning_fits_a_small_thread_stack() {
    let fixture = PoolFixture::new(SPACING);
    fixture.insert_tick_array(0);
    fixture.insert_tick_array(-5632);
    let intent = SwapIntent::exact_in(1_000_000, fixture.mint_a());

    let handle = std::thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(move || {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(plan(&fixture, intent))
                .map(|plan| plan.direction)
        })
        .unwrap();

    let direction = handle
        .join()
        .expect("planning thread should not overflow its stack")
        .unwrap();
    assert_eq!(direction, SwapDirection::AToB);
}
