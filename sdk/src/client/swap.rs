//! Swap planning
//!
//! A planning call reads the pool, its mints, the tick array window and the
//! current epoch, quotes the intent and assembles the instructions. Nothing
//! is cached between calls and nothing is submitted.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::base::{BaseClient, LedgerRpc};
use super::tick_arrays::fetch_tick_arrays_or_default;
use crate::config::SdkConfig;
use crate::core::{
    PoolAccount, SwapDirection, SwapIntent, SwapPlan, SwapQuote, TickArrayAccount,
    BPS_DENOMINATOR, SWAP_TICK_ARRAY_COUNT,
};
use crate::error::{SdkError, SdkResult};
use crate::instructions::{
    prepare_token_accounts_instructions, SwapAccounts, SwapArgs, SwapInstructionBuilder,
};
use crate::prelude::*;
use crate::protocol::{get_current_transfer_fee, MintInfo, PdaBuilder};
use crate::quote::get_swap_quote;

/// Everything read from the ledger for one planning call
struct QuoteContext {
    pool: PoolAccount,
    mint_a: MintInfo,
    mint_b: MintInfo,
    tick_arrays: [TickArrayAccount; SWAP_TICK_ARRAY_COUNT],
    specified_is_token_a: bool,
    quote: SwapQuote,
}

/// Plans swaps against pools of the configured program
pub struct SwapPlanner<R> {
    base: BaseClient<R>,
    pda: PdaBuilder,
    config: SdkConfig,
}

impl<R: LedgerRpc> SwapPlanner<R> {
    pub fn new(rpc: Arc<R>, config: SdkConfig) -> Self {
        Self {
            base: BaseClient::new(rpc, config.program_id),
            pda: PdaBuilder::new(config.program_id),
            config,
        }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Quote `intent` without preparing any instructions
    pub async fn quote_swap(
        &self,
        intent: &SwapIntent,
        pool: &Pubkey,
        slippage_tolerance_bps: Option<u16>,
    ) -> SdkResult<SwapQuote> {
        let slippage = self.validate(intent, slippage_tolerance_bps)?;
        Ok(Box::pin(self.load_and_quote(intent, pool, slippage)).await?.quote)
    }

    /// Quote `intent` and assemble the instructions that execute it.
    ///
    /// `authority` owns the token accounts and signs the swap; it defaults to
    /// the configured funder. The returned instructions are token account
    /// preparation, the swap, then cleanup.
    pub async fn plan_swap(
        &self,
        intent: &SwapIntent,
        pool: &Pubkey,
        slippage_tolerance_bps: Option<u16>,
        authority: Option<Pubkey>,
    ) -> SdkResult<SwapPlan> {
        let slippage = self.validate(intent, slippage_tolerance_bps)?;
        let authority = authority
            .or(self.config.funder)
            .ok_or_else(|| SdkError::InvalidIntent("no authority given and no funder configured".to_string()))?;

        let context = Box::pin(self.load_and_quote(intent, pool, slippage)).await?;
        let pool_state = &context.pool.data;
        let direction = SwapDirection::derive(context.specified_is_token_a, intent.is_exact_input());
        let max_input = context.quote.max_input();

        let (required_a, required_b) = match direction {
            SwapDirection::AToB => (max_input, 0),
            SwapDirection::BToA => (0, max_input),
        };
        let requirements = BTreeMap::from([
            (pool_state.token_mint_a, required_a),
            (pool_state.token_mint_b, required_b),
        ]);
        let token_accounts = prepare_token_accounts_instructions(
            self.base.rpc(),
            authority,
            authority,
            &requirements,
            self.config.native_mint_wrapping,
        )
        .await?;

        let swap_accounts = SwapAccounts {
            token_program_a: context.mint_a.token_program,
            token_program_b: context.mint_b.token_program,
            token_authority: authority,
            fusion_pool: context.pool.address,
            token_mint_a: pool_state.token_mint_a,
            token_mint_b: pool_state.token_mint_b,
            token_owner_account_a: token_accounts.token_account(&pool_state.token_mint_a)?,
            token_vault_a: pool_state.token_vault_a,
            token_owner_account_b: token_accounts.token_account(&pool_state.token_mint_b)?,
            token_vault_b: pool_state.token_vault_b,
            tick_arrays: std::array::from_fn(|slot| context.tick_arrays[slot].address),
        };
        let args = SwapArgs::new(
            intent.amount(),
            context.quote.other_amount_threshold(),
            intent.is_exact_input(),
            direction.is_a_to_b(),
        );
        let swap_ix = SwapInstructionBuilder::new(self.base.program_id()).swap(&swap_accounts, &args)?;

        let mut instructions = token_accounts.create_instructions;
        instructions.push(swap_ix);
        instructions.extend(token_accounts.cleanup_instructions);

        info!(
            pool = %context.pool.address,
            mode = ?intent.mode(),
            ?direction,
            threshold = args.other_amount_threshold,
            instructions = instructions.len(),
            "planned swap"
        );

        Ok(SwapPlan {
            instructions,
            quote: context.quote,
            direction,
            tick_array_start_indices: std::array::from_fn(|slot| {
                context.tick_arrays[slot].data.start_tick_index
            }),
        })
    }

    /// Checks that need no ledger access; returns the effective slippage
    fn validate(&self, intent: &SwapIntent, slippage_tolerance_bps: Option<u16>) -> SdkResult<u16> {
        if intent.amount() == 0 {
            return Err(SdkError::InvalidIntent("amount must be greater than zero".to_string()));
        }
        let slippage = slippage_tolerance_bps.unwrap_or(self.config.slippage_tolerance_bps);
        if slippage > BPS_DENOMINATOR {
            return Err(SdkError::InvalidIntent(format!(
                "slippage tolerance {} bps exceeds {}",
                slippage, BPS_DENOMINATOR
            )));
        }
        Ok(slippage)
    }

    async fn load_and_quote(
        &self,
        intent: &SwapIntent,
        pool_address: &Pubkey,
        slippage: u16,
    ) -> SdkResult<QuoteContext> {
        let pool = self.base.fetch_pool(pool_address).await?;
        let specified_is_token_a = pool.data.side_of(&intent.mint()).ok_or_else(|| {
            SdkError::InvalidIntent(format!("mint {} is not traded by pool {}", intent.mint(), pool_address))
        })?;

        let ((mint_a, mint_b), tick_arrays, epoch) = tokio::try_join!(
            self.base.fetch_mints(&pool.data.token_mint_a, &pool.data.token_mint_b),
            fetch_tick_arrays_or_default(self.base.rpc(), &self.pda, &pool),
            self.base.current_epoch(),
        )?;

        let transfer_fee_a = get_current_transfer_fee(&mint_a, epoch);
        let transfer_fee_b = get_current_transfer_fee(&mint_b, epoch);
        debug!(epoch, ?transfer_fee_a, ?transfer_fee_b, "resolved transfer fees");

        let quote = get_swap_quote(
            intent,
            &pool.data,
            &tick_arrays,
            specified_is_token_a,
            slippage,
            transfer_fee_a,
            transfer_fee_b,
        )?;
        debug!(?quote, "computed quote");

        Ok(QuoteContext {
            pool,
            mint_a,
            mint_b,
            tick_arrays,
            specified_is_token_a,
            quote,
        })
    }
}

/// One-shot convenience around [`SwapPlanner::plan_swap`]
pub async fn swap_instructions<R: LedgerRpc>(
    rpc: Arc<R>,
    config: &SdkConfig,
    intent: &SwapIntent,
    pool: &Pubkey,
    slippage_tolerance_bps: Option<u16>,
    authority: Option<Pubkey>,
) -> SdkResult<SwapPlan> {
    SwapPlanner::new(rpc, config.clone())
        .plan_swap(intent, pool, slippage_tolerance_bps, authority)
        .await
}
