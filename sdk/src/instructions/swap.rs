use solana_sdk::instruction::AccountMeta;

use crate::core::{
    MEMO_PROGRAM_ID, FIXED_TICK_ARRAY_COUNT, SUPPLEMENTAL_TICK_ARRAY_COUNT, SWAP_TICK_ARRAY_COUNT,
};
use crate::error::SdkResult;
use crate::impl_instruction;
use crate::instructions::{AmmInstructionBuilder, InstructionBuilder};
use crate::prelude::*;

// Instruction discriminator
const SWAP_DISCRIMINATOR: [u8; 8] = [0xf8, 0xc6, 0x9e, 0x91, 0xe1, 0x75, 0x87, 0xc8];

/// Kind of a block of trailing accounts
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountsType {
    TransferHookA,
    TransferHookB,
    TransferHookInput,
    TransferHookIntermediate,
    TransferHookOutput,
    SupplementalTickArrays,
    SupplementalTickArraysOne,
    SupplementalTickArraysTwo,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemainingAccountsSlice {
    pub accounts_type: AccountsType,
    pub length: u8,
}

/// Describes the accounts appended after the fixed account schema, in order
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RemainingAccountsInfo {
    pub slices: Vec<RemainingAccountsSlice>,
}

impl RemainingAccountsInfo {
    pub fn supplemental_tick_arrays(length: u8) -> Self {
        Self {
            slices: vec![RemainingAccountsSlice {
                accounts_type: AccountsType::SupplementalTickArrays,
                length,
            }],
        }
    }
}

/// Arguments of the swap instruction
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SwapArgs {
    pub amount: u64,
    /// Minimum output for exact input, maximum input for exact output
    pub other_amount_threshold: u64,
    /// Zero lets the program use the protocol bound in the swap direction
    pub sqrt_price_limit: u128,
    pub amount_specified_is_input: bool,
    pub a_to_b: bool,
    pub remaining_accounts_info: Option<RemainingAccountsInfo>,
}

impl_instruction!(SwapArgs, SWAP_DISCRIMINATOR);

impl SwapArgs {
    /// Args for a swap without a price limit that passes the supplemental tick arrays
    pub fn new(
        amount: u64,
        other_amount_threshold: u64,
        amount_specified_is_input: bool,
        a_to_b: bool,
    ) -> Self {
        Self {
            amount,
            other_amount_threshold,
            sqrt_price_limit: 0,
            amount_specified_is_input,
            a_to_b,
            remaining_accounts_info: Some(RemainingAccountsInfo::supplemental_tick_arrays(
                SUPPLEMENTAL_TICK_ARRAY_COUNT as u8,
            )),
        }
    }
}

/// Accounts referenced by the swap instruction
#[derive(Clone, Debug)]
pub struct SwapAccounts {
    pub token_program_a: Pubkey,
    pub token_program_b: Pubkey,
    pub token_authority: Pubkey,
    pub fusion_pool: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub token_owner_account_a: Pubkey,
    pub token_vault_a: Pubkey,
    pub token_owner_account_b: Pubkey,
    pub token_vault_b: Pubkey,
    /// Tick array window in window order
    pub tick_arrays: [Pubkey; SWAP_TICK_ARRAY_COUNT],
}

/// Swap instruction builder
pub struct SwapInstructionBuilder {
    program_id: Pubkey,
}

impl SwapInstructionBuilder {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// Build the swap instruction.
    ///
    /// The first three tick arrays fill the fixed `tick_array_0..2` slots; the
    /// rest are appended as writable remaining accounts.
    pub fn swap(&self, accounts: &SwapAccounts, args: &SwapArgs) -> SdkResult<Instruction> {
        let (fixed, supplemental) = accounts.tick_arrays.split_at(FIXED_TICK_ARRAY_COUNT);

        let builder = AmmInstructionBuilder::new(self.program_id)
            .add_readonly(accounts.token_program_a)
            .add_readonly(accounts.token_program_b)
            .add_readonly(MEMO_PROGRAM_ID)
            .add_signer(accounts.token_authority)
            .add_writable(accounts.fusion_pool)
            .add_readonly(accounts.token_mint_a)
            .add_readonly(accounts.token_mint_b)
            .add_writable(accounts.token_owner_account_a)
            .add_writable(accounts.token_vault_a)
            .add_writable(accounts.token_owner_account_b)
            .add_writable(accounts.token_vault_b)
            .add_accounts(fixed.iter().map(|address| AccountMeta::new(*address, false)))
            .add_accounts(
                supplemental
                    .iter()
                    .map(|address| AccountMeta::new(*address, false)),
            );

        Ok(builder.with_data(args.build_data()?).build())
    }
}
