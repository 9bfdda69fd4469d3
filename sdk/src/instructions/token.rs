//! Token account preparation around a swap
//!
//! Produces the instructions that make the owner's associated token accounts
//! usable before the swap and the ones that tidy up afterwards. Balances are
//! not checked here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use solana_sdk::system_instruction;
use spl_token_2022::extension::StateWithExtensions;
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use tracing::debug;

use crate::client::LedgerRpc;
use crate::error::{SdkError, SdkResult};
use crate::prelude::*;

/// How wrapped SOL is provided when the native mint is traded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeMintWrapping {
    /// Fund the owner's wrapped SOL ATA with lamports and sync it; an ATA
    /// created for the swap is closed again afterwards
    #[default]
    Ata,
    /// Treat the native mint like any other token
    None,
}

/// Instructions surrounding a swap, plus the token account used per mint
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenAccountInstructions {
    pub create_instructions: Vec<Instruction>,
    pub cleanup_instructions: Vec<Instruction>,
    pub token_account_addresses: BTreeMap<Pubkey, Pubkey>,
}

impl TokenAccountInstructions {
    /// Token account for `mint`; every required mint has one
    pub fn token_account(&self, mint: &Pubkey) -> SdkResult<Pubkey> {
        self.token_account_addresses
            .get(mint)
            .copied()
            .ok_or_else(|| SdkError::Instruction(format!("no token account prepared for {}", mint)))
    }
}

/// Prepare the owner's token accounts for the mints in `requirements`.
///
/// `requirements` maps each mint to the largest amount the trade may take
/// from the owner. Missing ATAs are created idempotently with `funder`
/// paying rent. A wrapped SOL account is only topped up by the shortfall
/// between its current balance and the requirement.
pub async fn prepare_token_accounts_instructions<R: LedgerRpc + ?Sized>(
    rpc: &R,
    owner: Pubkey,
    funder: Pubkey,
    requirements: &BTreeMap<Pubkey, u64>,
    native_mint_wrapping: NativeMintWrapping,
) -> SdkResult<TokenAccountInstructions> {
    let mints: Vec<Pubkey> = requirements.keys().copied().collect();
    let mint_accounts = rpc.get_multiple_accounts(&mints).await?;

    let mut token_programs = Vec::with_capacity(mints.len());
    for (mint, account) in mints.iter().zip(mint_accounts) {
        let account = account.ok_or(SdkError::MintNotFound(*mint))?;
        token_programs.push(account.owner);
    }
    if token_programs.len() != mints.len() {
        return Err(SdkError::Rpc("incomplete mint batch".to_string()));
    }

    let ata_addresses: Vec<Pubkey> = mints
        .iter()
        .zip(&token_programs)
        .map(|(mint, program)| get_associated_token_address_with_program_id(&owner, mint, program))
        .collect();
    let ata_accounts = rpc.get_multiple_accounts(&ata_addresses).await?;
    if ata_accounts.len() != ata_addresses.len() {
        return Err(SdkError::Rpc("incomplete token account batch".to_string()));
    }

    let mut result = TokenAccountInstructions::default();
    for (((mint, token_program), ata), ata_account) in mints
        .iter()
        .zip(&token_programs)
        .zip(&ata_addresses)
        .zip(ata_accounts)
    {
        let amount = requirements.get(mint).copied().unwrap_or_default();
        let exists = ata_account.is_some();
        let wraps_sol = *mint == spl_token::native_mint::ID
            && native_mint_wrapping == NativeMintWrapping::Ata;
        let wrapped_balance = match &ata_account {
            Some(account) if wraps_sol => token_account_balance(ata, &account.data)?,
            _ => 0,
        };

        if !exists {
            result.create_instructions.push(create_associated_token_account_idempotent(
                &funder,
                &owner,
                mint,
                token_program,
            ));
        }

        if wraps_sol {
            let top_up = amount.saturating_sub(wrapped_balance);
            if top_up > 0 {
                result
                    .create_instructions
                    .push(system_instruction::transfer(&owner, ata, top_up));
                result
                    .create_instructions
                    .push(spl_token_2022::instruction::sync_native(token_program, ata)?);
            }
            if !exists {
                result
                    .cleanup_instructions
                    .push(spl_token_2022::instruction::close_account(
                        token_program,
                        ata,
                        &owner,
                        &owner,
                        &[],
                    )?);
            }
        }

        debug!(%mint, ata = %ata, exists, amount, "prepared token account");
        result.token_account_addresses.insert(*mint, *ata);
    }

    Ok(result)
}

/// Token balance held by an existing token account
fn token_account_balance(address: &Pubkey, data: &[u8]) -> SdkResult<u64> {
    StateWithExtensions::<spl_token_2022::state::Account>::unpack(data)
        .map(|account| account.base.amount)
        .map_err(|e| SdkError::decode(*address, e.to_string()))
}
