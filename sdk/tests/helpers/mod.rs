//! Test helpers for revenue share client tests
//!
//! `MockLedger` keeps accounts in memory and executes the system, token and
//! revenue share instructions the client sends, atomically per transaction.

#![allow(dead_code)]

pub mod accounts;
pub mod ledger;

pub use accounts::*;
pub use ledger::*;
pub use wallet::*;

use {
    revenue_share_sdk::{
        KeypairWallet, RevenueShareClient, RevenueShareConfig, WalletSession,
    },
    solana_sdk::{pubkey::Pubkey, signature::Keypair},
    std::time::Duration,
};

pub const FEE_PERCENT: f64 = 2.0;

/// Addresses shared by a test
pub struct TestEnv {
    pub program_id: Pubkey,
    pub mint: Pubkey,
    pub platform: Pubkey,
}

impl TestEnv {
    pub fn new() -> Self {
        init_logger();
        Self {
            program_id: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            platform: Pubkey::new_unique(),
        }
    }

    pub fn config(&self) -> RevenueShareConfig {
        RevenueShareConfig::new(self.program_id, self.mint, self.platform, FEE_PERCENT)
            .unwrap()
            .with_confirmation(Duration::from_secs(30), Duration::from_millis(400))
    }

    pub fn client(&self) -> RevenueShareClient<MockLedger> {
        RevenueShareClient::new(MockLedger::new(self.program_id), self.config())
    }
}

/// Routes `log` output through the test harness; `RUST_LOG=debug` to see it
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Connected session over a fresh keypair
pub async fn connected_session(keypair: Keypair) -> WalletSession<KeypairWallet> {
    let mut session = WalletSession::new(KeypairWallet::new(keypair));
    session.connect().await.unwrap();
    session
}
