//! Network access used by the client.
//!
//! [`Ledger`] is the seam between the revenue share logic and the cluster;
//! [`RpcLedger`] is the JSON-RPC implementation.

use async_trait::async_trait;
use log::debug;
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig};
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    hash::Hash,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};
use spl_token::state::Account as TokenAccount;

use crate::{config::RevenueShareConfig, errors::LedgerError};

/// Status of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Not yet observed at the requested commitment
    Pending,
    Confirmed,
    /// Landed with an error, none of its instructions took effect
    Failed(String),
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Raw data of `address`, `None` when the account does not exist
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError>;

    async fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LedgerError>;

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError>;

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<ConfirmationStatus, LedgerError>;

    /// Unpacked SPL token account, `None` when it does not exist
    async fn token_account(&self, address: &Pubkey) -> Result<Option<TokenAccount>, LedgerError>;

    /// Raw token amount held by `token_account`, `None` when it does not exist
    async fn token_balance(&self, token_account: &Pubkey) -> Result<Option<u64>, LedgerError> {
        Ok(self
            .token_account(token_account)
            .await?
            .map(|account| account.amount))
    }
}

/// [`Ledger`] backed by a nonblocking JSON-RPC client
pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcLedger {
    pub fn new(client: RpcClient, commitment: CommitmentConfig) -> Self {
        Self { client, commitment }
    }

    pub fn from_config(config: &RevenueShareConfig) -> Self {
        let client = RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment);
        Self::new(client, config.commitment)
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LedgerError> {
        Ok(self
            .client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(CommitmentLevel::Confirmed),
            ..RpcSendTransactionConfig::default()
        };
        let signature = self
            .client
            .send_transaction_with_config(transaction, config)
            .await?;
        debug!("Sent transaction {}", signature);
        Ok(signature)
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<ConfirmationStatus, LedgerError> {
        let status = self
            .client
            .get_signature_status_with_commitment(signature, self.commitment)
            .await?;
        Ok(match status {
            None => ConfirmationStatus::Pending,
            Some(Ok(())) => ConfirmationStatus::Confirmed,
            Some(Err(err)) => ConfirmationStatus::Failed(err.to_string()),
        })
    }

    async fn token_account(&self, address: &Pubkey) -> Result<Option<TokenAccount>, LedgerError> {
        let Some(data) = self.account_data(address).await? else {
            return Ok(None);
        };
        let account =
            TokenAccount::unpack(&data).map_err(|_| LedgerError::InvalidTokenAccount(*address))?;
        Ok(Some(account))
    }
}
