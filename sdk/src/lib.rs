//! Client for per-publication revenue shares.
//!
//! A revenue share is a shared SPL token account plus a 463-byte state account
//! listing up to eleven members (the platform fee account first), their shares
//! in basis points and what each has withdrawn so far.

pub mod allocator;
pub mod amount;
pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod instructions;
pub mod ledger;
pub mod state;
pub mod summary;
pub mod wallet;

pub use allocator::{allocate, remaining_percentage, MemberShare, ShareAllocation};
pub use amount::Amount;
pub use client::{max_withdrawable, InitializedAccounts, RevenueShareClient};
pub use config::RevenueShareConfig;
pub use errors::{
    ConfigError, LedgerError, Outcome, Phase, Result, RevenueShareError, WalletError,
};
pub use ledger::{ConfirmationStatus, Ledger, RpcLedger};
pub use state::{encode, encode_shares, RevenueShareRecord};
pub use summary::RevenueShareSummary;
pub use wallet::{KeypairWallet, SessionState, Wallet, WalletSession};
