//! Account layouts for pool and tick array accounts
//!
//! Both accounts are an 8-byte discriminator followed by little-endian,
//! packed fields. Decoding validates the discriminator and the length before
//! reading any field.

use crate::core::constants::*;
use crate::core::types::*;
use crate::error::{SdkError, SdkResult};
use crate::prelude::*;

/// Serialized size of one tick slot
pub const TICK_LEN: usize = 1 + 16 * 4 + 8 * 6;

/// discriminator(8) + bump(1) + version(2) + mints and vaults(128) + spacing and seed(4)
/// + fee rates(8) + liquidity(16) + sqrt_price(16) + tick(4) + protocol fees owed(16)
/// + fee growth(32) + order totals(32) + olp fees owed(16)
///
/// Bytes past this length are reserved by the program and ignored.
pub const FUSION_POOL_LEN: usize = 8 + 1 + 2 + 128 + 4 + 8 + 16 + 16 + 4 + 16 + 32 + 32 + 16;

/// discriminator(8) + start_tick_index(4) + ticks + fusion_pool(32)
pub const TICK_ARRAY_LEN: usize = 8 + 4 + TICK_LEN * TICK_ARRAY_SIZE + 32;

struct AccountReader<'a> {
    address: Pubkey,
    data: &'a [u8],
    offset: usize,
}

impl<'a> AccountReader<'a> {
    fn new(
        address: Pubkey,
        data: &'a [u8],
        discriminator: &[u8; 8],
        expected_len: usize,
    ) -> SdkResult<Self> {
        if data.len() < 8 || data[..8] != discriminator[..] {
            return Err(SdkError::decode(address, "unexpected account discriminator"));
        }
        if data.len() < expected_len {
            return Err(SdkError::decode(
                address,
                format!("expected {} bytes, found {}", expected_len, data.len()),
            ));
        }
        Ok(Self {
            address,
            data,
            offset: 8,
        })
    }

    fn take<const N: usize>(&mut self) -> SdkResult<[u8; N]> {
        let bytes = self
            .data
            .get(self.offset..self.offset + N)
            .ok_or_else(|| SdkError::decode(self.address, "account data truncated"))?;
        self.offset += N;
        bytes
            .try_into()
            .map_err(|_| SdkError::decode(self.address, "account data truncated"))
    }

    fn read_u8(&mut self) -> SdkResult<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn read_bool(&mut self) -> SdkResult<bool> {
        Ok(self.take::<1>()?[0] != 0)
    }

    fn read_u16(&mut self) -> SdkResult<u16> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn read_i32(&mut self) -> SdkResult<i32> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn read_u64(&mut self) -> SdkResult<u64> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    fn read_u128(&mut self) -> SdkResult<u128> {
        Ok(u128::from_le_bytes(self.take()?))
    }

    fn read_i128(&mut self) -> SdkResult<i128> {
        Ok(i128::from_le_bytes(self.take()?))
    }

    fn read_pubkey(&mut self) -> SdkResult<Pubkey> {
        Ok(Pubkey::new_from_array(self.take()?))
    }

    fn read_tick(&mut self) -> SdkResult<Tick> {
        Ok(Tick {
            initialized: self.read_bool()?,
            liquidity_net: self.read_i128()?,
            liquidity_gross: self.read_u128()?,
            fee_growth_outside_a: self.read_u128()?,
            fee_growth_outside_b: self.read_u128()?,
            age: self.read_u64()?,
            open_orders_input: self.read_u64()?,
            part_filled_orders_input: self.read_u64()?,
            part_filled_orders_remaining_input: self.read_u64()?,
            fulfilled_a_to_b_orders_input: self.read_u64()?,
            fulfilled_b_to_a_orders_input: self.read_u64()?,
        })
    }
}

impl PoolState {
    /// Decode a pool account; a zero tick spacing is rejected
    pub fn from_account_data(address: Pubkey, data: &[u8]) -> SdkResult<Self> {
        let mut reader =
            AccountReader::new(address, data, &FUSION_POOL_DISCRIMINATOR, FUSION_POOL_LEN)?;
        let pool = Self {
            bump: reader.read_u8()?,
            version: reader.read_u16()?,
            token_mint_a: reader.read_pubkey()?,
            token_mint_b: reader.read_pubkey()?,
            token_vault_a: reader.read_pubkey()?,
            token_vault_b: reader.read_pubkey()?,
            tick_spacing: reader.read_u16()?,
            tick_spacing_seed: reader.take()?,
            fee_rate: reader.read_u16()?,
            protocol_fee_rate: reader.read_u16()?,
            clp_to_olp_reward_ratio: reader.read_u16()?,
            order_protocol_fee_rate: reader.read_u16()?,
            liquidity: reader.read_u128()?,
            sqrt_price: reader.read_u128()?,
            tick_current_index: reader.read_i32()?,
            protocol_fee_owed_a: reader.read_u64()?,
            protocol_fee_owed_b: reader.read_u64()?,
            fee_growth_global_a: reader.read_u128()?,
            fee_growth_global_b: reader.read_u128()?,
            orders_total_amount_a: reader.read_u64()?,
            orders_total_amount_b: reader.read_u64()?,
            orders_filled_amount_a: reader.read_u64()?,
            orders_filled_amount_b: reader.read_u64()?,
            olp_fee_owed_a: reader.read_u64()?,
            olp_fee_owed_b: reader.read_u64()?,
        };
        if pool.tick_spacing == 0 {
            return Err(SdkError::decode(address, "tick spacing is zero"));
        }
        Ok(pool)
    }

    /// Encode into the on-chain account layout, without the reserved tail
    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(FUSION_POOL_LEN);
        data.extend_from_slice(&FUSION_POOL_DISCRIMINATOR);
        data.push(self.bump);
        data.extend_from_slice(&self.version.to_le_bytes());
        for key in [
            &self.token_mint_a,
            &self.token_mint_b,
            &self.token_vault_a,
            &self.token_vault_b,
        ] {
            data.extend_from_slice(key.as_ref());
        }
        data.extend_from_slice(&self.tick_spacing.to_le_bytes());
        data.extend_from_slice(&self.tick_spacing_seed);
        for rate in [
            self.fee_rate,
            self.protocol_fee_rate,
            self.clp_to_olp_reward_ratio,
            self.order_protocol_fee_rate,
        ] {
            data.extend_from_slice(&rate.to_le_bytes());
        }
        data.extend_from_slice(&self.liquidity.to_le_bytes());
        data.extend_from_slice(&self.sqrt_price.to_le_bytes());
        data.extend_from_slice(&self.tick_current_index.to_le_bytes());
        data.extend_from_slice(&self.protocol_fee_owed_a.to_le_bytes());
        data.extend_from_slice(&self.protocol_fee_owed_b.to_le_bytes());
        data.extend_from_slice(&self.fee_growth_global_a.to_le_bytes());
        data.extend_from_slice(&self.fee_growth_global_b.to_le_bytes());
        for amount in [
            self.orders_total_amount_a,
            self.orders_total_amount_b,
            self.orders_filled_amount_a,
            self.orders_filled_amount_b,
            self.olp_fee_owed_a,
            self.olp_fee_owed_b,
        ] {
            data.extend_from_slice(&amount.to_le_bytes());
        }
        data
    }
}

impl TickArray {
    /// Decode a tick array account
    pub fn from_account_data(address: Pubkey, data: &[u8]) -> SdkResult<Self> {
        let mut reader =
            AccountReader::new(address, data, &TICK_ARRAY_DISCRIMINATOR, TICK_ARRAY_LEN)?;
        let start_tick_index = reader.read_i32()?;
        let mut ticks = Box::new([Tick::default(); TICK_ARRAY_SIZE]);
        for tick in ticks.iter_mut() {
            *tick = reader.read_tick()?;
        }
        let fusion_pool = reader.read_pubkey()?;
        Ok(Self {
            start_tick_index,
            ticks,
            fusion_pool,
        })
    }

    /// Encode into the on-chain account layout
    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(TICK_ARRAY_LEN);
        data.extend_from_slice(&TICK_ARRAY_DISCRIMINATOR);
        data.extend_from_slice(&self.start_tick_index.to_le_bytes());
        for tick in self.ticks.iter() {
            data.push(tick.initialized as u8);
            data.extend_from_slice(&tick.liquidity_net.to_le_bytes());
            data.extend_from_slice(&tick.liquidity_gross.to_le_bytes());
            data.extend_from_slice(&tick.fee_growth_outside_a.to_le_bytes());
            data.extend_from_slice(&tick.fee_growth_outside_b.to_le_bytes());
            for amount in [
                tick.age,
                tick.open_orders_input,
                tick.part_filled_orders_input,
                tick.part_filled_orders_remaining_input,
                tick.fulfilled_a_to_b_orders_input,
                tick.fulfilled_b_to_a_orders_input,
            ] {
                data.extend_from_slice(&amount.to_le_bytes());
            }
        }
        data.extend_from_slice(self.fusion_pool.as_ref());
        data
    }
}
