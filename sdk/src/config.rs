use std::{fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use crate::core::{program_id, BPS_DENOMINATOR, DEFAULT_SLIPPAGE_TOLERANCE_BPS};
use crate::error::{SdkError, SdkResult};
use crate::instructions::NativeMintWrapping;

/// SDK configuration threaded into every planning call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// AMM program ID
    #[serde(with = "pubkey_serde")]
    pub program_id: Pubkey,

    /// Commitment level for reads (`processed`, `confirmed` or `finalized`)
    pub commitment: String,

    /// Slippage tolerance used when a call does not pass one
    pub slippage_tolerance_bps: u16,

    /// Authority and rent payer used when a call does not pass one
    #[serde(default, with = "option_pubkey_serde", skip_serializing_if = "Option::is_none")]
    pub funder: Option<Pubkey>,

    #[serde(default)]
    pub native_mint_wrapping: NativeMintWrapping,
}

impl SdkConfig {
    fn for_url(rpc_url: &str) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            program_id: program_id(),
            commitment: "confirmed".to_string(),
            slippage_tolerance_bps: DEFAULT_SLIPPAGE_TOLERANCE_BPS,
            funder: None,
            native_mint_wrapping: NativeMintWrapping::default(),
        }
    }

    pub fn localnet() -> Self {
        Self::for_url("http://localhost:8899")
    }

    pub fn devnet() -> Self {
        Self::for_url("https://api.devnet.solana.com")
    }

    pub fn mainnet() -> Self {
        Self::for_url("https://api.mainnet-beta.solana.com")
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_commitment(mut self, commitment: impl Into<String>) -> Self {
        self.commitment = commitment.into();
        self
    }

    pub fn with_slippage_tolerance_bps(mut self, slippage_tolerance_bps: u16) -> Self {
        self.slippage_tolerance_bps = slippage_tolerance_bps;
        self
    }

    pub fn with_funder(mut self, funder: Pubkey) -> Self {
        self.funder = Some(funder);
        self
    }

    pub fn with_native_mint_wrapping(mut self, wrapping: NativeMintWrapping) -> Self {
        self.native_mint_wrapping = wrapping;
        self
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SdkError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: SdkConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> SdkResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SdkResult<()> {
        if self.rpc_url.is_empty() {
            return Err(SdkError::Config("rpc_url must not be empty".to_string()));
        }
        if self.slippage_tolerance_bps > BPS_DENOMINATOR {
            return Err(SdkError::Config(format!(
                "slippage_tolerance_bps {} exceeds {}",
                self.slippage_tolerance_bps, BPS_DENOMINATOR
            )));
        }
        self.commitment_config()?;
        Ok(())
    }

    pub fn commitment_config(&self) -> SdkResult<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|_| SdkError::Config(format!("unknown commitment {}", self.commitment)))
    }

    /// Nonblocking RPC client for this configuration
    pub fn rpc_client(&self) -> SdkResult<RpcClient> {
        Ok(RpcClient::new_with_commitment(
            self.rpc_url.clone(),
            self.commitment_config()?,
        ))
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

mod pubkey_serde {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&pubkey.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

mod option_pubkey_serde {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(pubkey: &Option<Pubkey>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match pubkey {
            Some(pubkey) => serializer.serialize_some(&pubkey.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Pubkey>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| Pubkey::from_str(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
