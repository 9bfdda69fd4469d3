//! Shared fixtures: an in-memory ledger and a pool with two classic mints

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clmm_swap_sdk::prelude::*;
use clmm_swap_sdk::protocol::PdaBuilder;
use clmm_swap_sdk::{LedgerRpc, PoolState, SdkConfig, SdkError, SdkResult, TickArray};
use solana_program::program_option::COption;
use spl_token_2022::extension::{
    transfer_fee::{TransferFee, TransferFeeConfig},
    BaseStateWithExtensionsMut, ExtensionType, StateWithExtensionsMut,
};

// ============================================================================
// In-memory ledger
// ============================================================================

#[derive(Default)]
pub struct MemoryLedger {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    epoch: Mutex<u64>,
    fail_with: Option<String>,
}

impl MemoryLedger {
    /// Ledger whose every read fails like a dropped connection
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn insert(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(
            address,
            Account {
                lamports: 1_000_000,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    pub fn remove(&self, address: &Pubkey) {
        self.accounts.lock().unwrap().remove(address);
    }

    pub fn set_epoch(&self, epoch: u64) {
        *self.epoch.lock().unwrap() = epoch;
    }

    fn check(&self) -> SdkResult<()> {
        match &self.fail_with {
            Some(reason) => Err(SdkError::Rpc(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LedgerRpc for MemoryLedger {
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        self.check()?;
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> SdkResult<Vec<Option<Account>>> {
        self.check()?;
        let accounts = self.accounts.lock().unwrap();
        Ok(addresses.iter().map(|address| accounts.get(address).cloned()).collect())
    }

    async fn get_epoch(&self) -> SdkResult<u64> {
        self.check()?;
        Ok(*self.epoch.lock().unwrap())
    }
}

// ============================================================================
// Pool fixture
// ============================================================================

pub const SQRT_PRICE_ONE: u128 = 1 << 64;

pub struct PoolFixture {
    pub ledger: Arc<MemoryLedger>,
    pub config: SdkConfig,
    pub pool: Pubkey,
    pub state: PoolState,
    pub wallet: Pubkey,
}

impl PoolFixture {
    /// Pool at tick 0 with deep range liquidity and no tick arrays on the ledger
    pub fn new(tick_spacing: u16) -> Self {
        Self::with_mints(tick_spacing, Pubkey::new_unique(), Pubkey::new_unique())
    }

    pub fn with_mints(tick_spacing: u16, mint_a: Pubkey, mint_b: Pubkey) -> Self {
        let program_id = Pubkey::new_unique();
        let wallet = Pubkey::new_unique();
        let config = SdkConfig::localnet()
            .with_program_id(program_id)
            .with_funder(wallet);

        let state = PoolState {
            tick_spacing,
            tick_spacing_seed: tick_spacing.to_le_bytes(),
            fee_rate: 3000,
            liquidity: 1_000_000_000_000,
            sqrt_price: SQRT_PRICE_ONE,
            tick_current_index: 0,
            token_mint_a: mint_a,
            token_vault_a: Pubkey::new_unique(),
            token_mint_b: mint_b,
            token_vault_b: Pubkey::new_unique(),
            ..Default::default()
        };

        let ledger = Arc::new(MemoryLedger::default());
        let pool = Pubkey::new_unique();
        ledger.insert(pool, program_id, state.to_account_data());
        ledger.insert(mint_a, spl_token::ID, vec![0; 82]);
        ledger.insert(mint_b, spl_token::ID, vec![0; 82]);

        Self {
            ledger,
            config,
            pool,
            state,
            wallet,
        }
    }

    pub fn mint_a(&self) -> Pubkey {
        self.state.token_mint_a
    }

    pub fn mint_b(&self) -> Pubkey {
        self.state.token_mint_b
    }

    pub fn tick_array_address(&self, start_tick_index: i32) -> Pubkey {
        PdaBuilder::new(self.config.program_id)
            .tick_array(&self.pool, start_tick_index)
            .0
    }

    /// Store a tick array whose every tick is initialized with zero liquidity delta
    pub fn insert_tick_array(&self, start_tick_index: i32) -> TickArray {
        let mut array = TickArray::uninitialized(self.pool, start_tick_index);
        for tick in array.ticks.iter_mut() {
            tick.initialized = true;
        }
        self.ledger.insert(
            self.tick_array_address(start_tick_index),
            self.config.program_id,
            array.to_account_data(),
        );
        array
    }

    /// Replace token B with a Token-2022 mint carrying a transfer fee extension
    pub fn use_transfer_fee_mint_b(&self, older: (u64, u16), newer: (u64, u16)) {
        self.ledger.insert(
            self.mint_b(),
            spl_token_2022::ID,
            transfer_fee_mint_data(older, newer),
        );
    }
}

/// Token-2022 mint data with a transfer fee extension; schedules are `(epoch, bps)`
pub fn transfer_fee_mint_data(older: (u64, u16), newer: (u64, u16)) -> Vec<u8> {
    let space = ExtensionType::try_calculate_account_len::<spl_token_2022::state::Mint>(&[
        ExtensionType::TransferFeeConfig,
    ])
    .unwrap();
    let mut data = vec![0u8; space];
    let mut state =
        StateWithExtensionsMut::<spl_token_2022::state::Mint>::unpack_uninitialized(&mut data)
            .unwrap();

    let extension = state.init_extension::<TransferFeeConfig>(true).unwrap();
    extension.older_transfer_fee = TransferFee {
        epoch: older.0.into(),
        maximum_fee: u64::MAX.into(),
        transfer_fee_basis_points: older.1.into(),
    };
    extension.newer_transfer_fee = TransferFee {
        epoch: newer.0.into(),
        maximum_fee: u64::MAX.into(),
        transfer_fee_basis_points: newer.1.into(),
    };

    state.base = spl_token_2022::state::Mint {
        mint_authority: COption::None,
        supply: 0,
        decimals: 6,
        is_initialized: true,
        freeze_authority: COption::None,
    };
    state.pack_base();
    state.init_account_type().unwrap();
    data
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
