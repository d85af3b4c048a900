//! Runtime configuration for the revenue share client.

use std::{env, str::FromStr, time::Duration};

use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use crate::{
    constants::{PERCENT_SCALE, TOTAL_SHARE_BPS},
    errors::{ConfigError, Result, RevenueShareError},
};

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Addresses and policies shared by every operation of a client.
#[derive(Debug, Clone)]
pub struct RevenueShareConfig {
    /// JSON-RPC endpoint used by [`crate::ledger::RpcLedger`].
    pub rpc_url: String,
    /// Revenue sharing program that owns state accounts.
    pub program_id: Pubkey,
    /// Mint of the shared token accounts.
    pub token_mint: Pubkey,
    /// Platform account placed in slot 0 of every revenue share.
    pub platform_account: Pubkey,
    /// Platform fee in basis points.
    pub platform_fee_bps: u16,
    /// Commitment used for reads and confirmation.
    pub commitment: CommitmentConfig,
    /// Upper bound on the wait for a submitted transaction to confirm.
    pub confirmation_timeout: Duration,
    /// Delay between two signature status polls.
    pub confirmation_poll_interval: Duration,
}

impl RevenueShareConfig {
    pub fn new(
        program_id: Pubkey,
        token_mint: Pubkey,
        platform_account: Pubkey,
        platform_fee_percent: f64,
    ) -> Result<Self> {
        Ok(Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            program_id,
            token_mint,
            platform_account,
            platform_fee_bps: fee_to_bps(platform_fee_percent)?,
            commitment: CommitmentConfig::confirmed(),
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            confirmation_poll_interval: DEFAULT_CONFIRMATION_POLL_INTERVAL,
        })
    }

    /// Loads the configuration from environment variables.
    ///
    /// Required: `REV_SHARING_PROGRAM_ID`, `TOKEN_MINT_ACCT`, `SC_ACCT`, `SC_FEE_PERC`.
    /// Optional: `CONNECT_URL`, `CONFIRMATION_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let program_id = parse_required(&lookup, "REV_SHARING_PROGRAM_ID")?;
        let token_mint = parse_required(&lookup, "TOKEN_MINT_ACCT")?;
        let platform_account = parse_required(&lookup, "SC_ACCT")?;
        let fee: f64 = parse_required(&lookup, "SC_FEE_PERC")?;

        let mut config = Self::new(program_id, token_mint, platform_account, fee)?;

        if let Some(url) = lookup("CONNECT_URL") {
            config.rpc_url = url;
        }
        if let Some(raw) = lookup("CONFIRMATION_TIMEOUT_SECS") {
            let secs: u64 = parse_value("CONFIRMATION_TIMEOUT_SECS", &raw)?;
            config.confirmation_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_confirmation(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self.confirmation_poll_interval = poll_interval;
        self
    }

    pub fn platform_fee_percent(&self) -> f64 {
        self.platform_fee_bps as f64 / PERCENT_SCALE
    }
}

fn fee_to_bps(percent: f64) -> Result<u16> {
    if !percent.is_finite() || !(0.0..100.0).contains(&percent) {
        return Err(RevenueShareError::InvalidFee(percent));
    }
    let bps = (percent * PERCENT_SCALE).round() as u16;
    debug_assert!(bps <= TOTAL_SHARE_BPS);
    Ok(bps)
}

fn parse_required<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<T> {
    let raw = lookup(name).ok_or(ConfigError::Missing(name))?;
    parse_value(name, &raw)
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }
        .into()
    })
}
