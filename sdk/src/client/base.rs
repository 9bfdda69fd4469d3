use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use tracing::debug;

use crate::core::{PoolAccount, PoolState};
use crate::error::{SdkError, SdkResult};
use crate::prelude::*;
use crate::protocol::MintInfo;

/// Read-only view of the ledger used while planning.
///
/// Absent accounts are `Ok(None)`; only transport failures are errors.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>>;

    /// Fetch several accounts in one round trip, preserving input order
    async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> SdkResult<Vec<Option<Account>>>;

    async fn get_epoch(&self) -> SdkResult<u64>;
}

#[async_trait]
impl LedgerRpc for RpcClient {
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        Ok(self
            .get_account_with_commitment(address, self.commitment())
            .await?
            .value)
    }

    async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> SdkResult<Vec<Option<Account>>> {
        Ok(RpcClient::get_multiple_accounts(self, addresses).await?)
    }

    async fn get_epoch(&self) -> SdkResult<u64> {
        Ok(self.get_epoch_info().await?.epoch)
    }
}

#[async_trait]
impl<T: LedgerRpc + ?Sized> LedgerRpc for Arc<T> {
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        T::get_account(self, address).await
    }

    async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> SdkResult<Vec<Option<Account>>> {
        T::get_multiple_accounts(self, addresses).await
    }

    async fn get_epoch(&self) -> SdkResult<u64> {
        T::get_epoch(self).await
    }
}

/// Ledger wrapper for the account reads shared by planners
pub struct BaseClient<R> {
    rpc: Arc<R>,
    program_id: Pubkey,
}

impl<R: LedgerRpc> BaseClient<R> {
    pub fn new(rpc: Arc<R>, program_id: Pubkey) -> Self {
        Self { rpc, program_id }
    }

    /// Get the ledger handle
    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    /// Get the program ID
    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Fetch and decode a pool; a missing account is `PoolNotFound`
    pub async fn fetch_pool(&self, address: &Pubkey) -> SdkResult<PoolAccount> {
        let account = self
            .rpc
            .get_account(address)
            .await?
            .ok_or(SdkError::PoolNotFound(*address))?;
        let data = PoolState::from_account_data(*address, &account.data)?;
        debug!(
            pool = %address,
            tick = data.tick_current_index,
            tick_spacing = data.tick_spacing,
            liquidity = data.liquidity,
            "fetched pool"
        );
        Ok(PoolAccount {
            address: *address,
            owner: account.owner,
            data,
        })
    }

    /// Fetch both pool mints in one batch; a missing mint is `MintNotFound`
    pub async fn fetch_mints(&self, mint_a: &Pubkey, mint_b: &Pubkey) -> SdkResult<(MintInfo, MintInfo)> {
        let accounts = self.rpc.get_multiple_accounts(&[*mint_a, *mint_b]).await?;
        let mut mints = [mint_a, mint_b].into_iter().zip(accounts).map(|(mint, account)| {
            account
                .ok_or(SdkError::MintNotFound(*mint))
                .and_then(|account| MintInfo::from_account(*mint, &account))
        });
        match (mints.next(), mints.next()) {
            (Some(a), Some(b)) => Ok((a?, b?)),
            (None, _) => Err(SdkError::MintNotFound(*mint_a)),
            (_, None) => Err(SdkError::MintNotFound(*mint_b)),
        }
    }

    /// Current epoch, fetched fresh on every call
    pub async fn current_epoch(&self) -> SdkResult<u64> {
        self.rpc.get_epoch().await
    }
}

impl<R> Clone for BaseClient<R> {
    fn clone(&self) -> Self {
        Self {
            rpc: Arc::clone(&self.rpc),
            program_id: self.program_id,
        }
    }
}
