//! Signing wallets and the session that tracks their connection.

use async_trait::async_trait;
use log::info;
use solana_sdk::{
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};

use crate::errors::{Result, RevenueShareError, WalletError};

#[async_trait]
pub trait Wallet: Send + Sync {
    /// Connects and returns the signing identity
    async fn connect(&self) -> std::result::Result<Pubkey, WalletError>;

    async fn disconnect(&self) -> std::result::Result<(), WalletError>;

    /// Adds the wallet signature; other required signatures are already present
    async fn sign_transaction(
        &self,
        transaction: Transaction,
    ) -> std::result::Result<Transaction, WalletError>;
}

/// Wallet holding a local keypair
pub struct KeypairWallet {
    keypair: Keypair,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl Wallet for KeypairWallet {
    async fn connect(&self) -> std::result::Result<Pubkey, WalletError> {
        Ok(self.keypair.pubkey())
    }

    async fn disconnect(&self) -> std::result::Result<(), WalletError> {
        Ok(())
    }

    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> std::result::Result<Transaction, WalletError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction.try_partial_sign(&[&self.keypair], blockhash)?;
        Ok(transaction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected(Pubkey),
}

/// Connection to one wallet, created once and handed to every write operation
pub struct WalletSession<W: Wallet> {
    wallet: W,
    state: SessionState,
}

impl<W: Wallet> WalletSession<W> {
    pub fn new(wallet: W) -> Self {
        Self {
            wallet,
            state: SessionState::Disconnected,
        }
    }

    /// Connects if needed and returns the new state
    pub async fn connect(&mut self) -> Result<SessionState> {
        if let SessionState::Connected(_) = self.state {
            return Ok(self.state);
        }
        let identity = self.wallet.connect().await?;
        info!("Wallet connected to {}", identity);
        self.state = SessionState::Connected(identity);
        Ok(self.state)
    }

    pub async fn disconnect(&mut self) -> Result<SessionState> {
        if self.state == SessionState::Disconnected {
            return Ok(self.state);
        }
        self.wallet.disconnect().await?;
        info!("Wallet disconnected");
        self.state = SessionState::Disconnected;
        Ok(self.state)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> Result<Pubkey> {
        match self.state {
            SessionState::Connected(identity) => Ok(identity),
            SessionState::Disconnected => Err(RevenueShareError::WalletNotConnected),
        }
    }

    pub async fn sign(&self, transaction: Transaction) -> Result<Transaction> {
        self.identity()?;
        Ok(self.wallet.sign_transaction(transaction).await?)
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }
}
