//! Transfer fee resolution for Token-2022 mints
//!
//! A mint's transfer fee extension holds two schedules: the one currently in
//! force and a pending one that activates at a future epoch. The effective
//! fee depends on the epoch at planning time, so it is resolved per call from
//! a freshly fetched epoch.

use spl_token_2022::extension::{
    transfer_fee::TransferFeeConfig, BaseStateWithExtensions, StateWithExtensions,
};

use crate::core::TransferFeeSchedule;
use crate::error::{SdkError, SdkResult};
use crate::prelude::*;

/// One transfer fee schedule and the epoch it activates at
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpochTransferFee {
    pub epoch: u64,
    pub fee_bps: u16,
    pub max_fee: u64,
}

impl EpochTransferFee {
    fn schedule(&self) -> TransferFeeSchedule {
        TransferFeeSchedule::new(self.fee_bps, self.max_fee)
    }
}

/// Transfer fee extension of a mint
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MintTransferFeeConfig {
    pub older: EpochTransferFee,
    pub newer: EpochTransferFee,
}

impl MintTransferFeeConfig {
    /// Schedule with the greatest activation epoch not after `epoch`
    pub fn effective_fee(&self, epoch: u64) -> TransferFeeSchedule {
        if epoch >= self.newer.epoch {
            self.newer.schedule()
        } else {
            self.older.schedule()
        }
    }
}

impl From<&TransferFeeConfig> for MintTransferFeeConfig {
    fn from(config: &TransferFeeConfig) -> Self {
        let convert = |fee: &spl_token_2022::extension::transfer_fee::TransferFee| {
            EpochTransferFee {
                epoch: u64::from(fee.epoch),
                fee_bps: u16::from(fee.transfer_fee_basis_points),
                max_fee: u64::from(fee.maximum_fee),
            }
        };
        Self {
            older: convert(&config.older_transfer_fee),
            newer: convert(&config.newer_transfer_fee),
        }
    }
}

/// A pool token mint as the planner needs it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintInfo {
    pub address: Pubkey,
    /// Owning token program; the swap and token account instructions target it
    pub token_program: Pubkey,
    pub transfer_fee: Option<MintTransferFeeConfig>,
}

impl MintInfo {
    /// Read the token program and transfer fee extension from a mint account
    pub fn from_account(address: Pubkey, account: &Account) -> SdkResult<Self> {
        if account.owner == spl_token::ID {
            return Ok(Self {
                address,
                token_program: spl_token::ID,
                transfer_fee: None,
            });
        }
        if account.owner != spl_token_2022::ID {
            return Err(SdkError::decode(address, "mint is not owned by a token program"));
        }

        let mint = StateWithExtensions::<spl_token_2022::state::Mint>::unpack(&account.data)
            .map_err(|e| SdkError::decode(address, e.to_string()))?;
        let transfer_fee = mint
            .get_extension::<TransferFeeConfig>()
            .ok()
            .map(MintTransferFeeConfig::from);

        Ok(Self {
            address,
            token_program: spl_token_2022::ID,
            transfer_fee,
        })
    }
}

/// Effective transfer fee of `mint` at `epoch`, or `None` when the mint charges none
pub fn get_current_transfer_fee(mint: &MintInfo, epoch: u64) -> Option<TransferFeeSchedule> {
    mint.transfer_fee.map(|config| config.effective_fee(epoch))
}
