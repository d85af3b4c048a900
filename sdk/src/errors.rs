use std::{fmt, time::Duration};

use solana_client::client_error::ClientError;
use solana_sdk::{
    program_error::ProgramError, pubkey::Pubkey, signature::Signature, signer::SignerError,
};
use thiserror::Error;

/// Step of a write operation in which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Allocate,
    Prepare,
    Sign,
    Submit,
    Confirm,
    Verify,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Allocate => "allocate",
            Phase::Prepare => "prepare",
            Phase::Sign => "sign",
            Phase::Submit => "submit",
            Phase::Confirm => "confirm",
            Phase::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// What a failed write operation may have left on-chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was broadcast, or the ledger rejected the transaction atomically
    NotApplied,
    /// The transaction was broadcast and may still land
    AppliedOrUnknown,
}

#[derive(Error, Debug)]
pub enum RevenueShareError {
    #[error("State record must be {expected} bytes, got {actual}")]
    MalformedRecord { expected: usize, actual: usize },

    #[error("Too many members: {count} (max {max})")]
    TooManyMembers { count: usize, max: usize },

    #[error("Member percentages must sum to 10000 bps (100%), got {total_bps} bps")]
    SharesDoNotSumTo100 { total_bps: u64 },

    #[error("At least one member is required")]
    EmptyMemberList,

    #[error("Member and share slot counts differ: {members} members, {shares} shares")]
    SlotCountMismatch { members: usize, shares: usize },

    #[error("Invalid member percentage: {0}")]
    InvalidPercentage(f64),

    #[error("Share of {identity} rounds to zero after a {platform_fee_bps} bps platform fee")]
    ZeroShare { identity: Pubkey, platform_fee_bps: u16 },

    #[error("Token account {account} holds mint {actual}, expected {expected}")]
    MintMismatch {
        account: Pubkey,
        expected: Pubkey,
        actual: Pubkey,
    },

    #[error("Invalid platform fee percentage: {0}")]
    InvalidFee(f64),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Member address cannot be empty")]
    EmptyIdentity,

    #[error("Duplicate member address {0}")]
    DuplicateMember(Pubkey),

    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("{0} is not a member of this revenue share")]
    UnknownMember(Pubkey),

    #[error("Wallet is not connected")]
    WalletNotConnected,

    #[error("Math overflow")]
    MathOverflow,

    #[error("Invalid instruction: {0}")]
    InvalidInstruction(#[from] ProgramError),

    #[error("Transaction {signature} was rejected: {reason}")]
    TransactionRejected { signature: Signature, reason: String },

    #[error("State account {0} does not hold the submitted shares")]
    StateMismatch(Pubkey),

    #[error("Initialization failed during {phase}: {source}")]
    InitializationFailed {
        phase: Phase,
        #[source]
        source: Box<RevenueShareError>,
    },

    #[error("Withdrawal failed during {phase}: {source}")]
    WithdrawalFailed {
        phase: Phase,
        #[source]
        source: Box<RevenueShareError>,
    },

    #[error("Transaction {signature} not confirmed after {waited:?}")]
    ConfirmationTimeout { signature: Signature, waited: Duration },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RevenueShareError {
    pub(crate) fn initialization(phase: Phase, source: impl Into<RevenueShareError>) -> Self {
        Self::wrap(phase, source.into(), |phase, source| {
            RevenueShareError::InitializationFailed { phase, source }
        })
    }

    pub(crate) fn withdrawal(phase: Phase, source: impl Into<RevenueShareError>) -> Self {
        Self::wrap(phase, source.into(), |phase, source| {
            RevenueShareError::WithdrawalFailed { phase, source }
        })
    }

    // Timeouts keep their own variant so callers can tell them apart
    fn wrap(
        phase: Phase,
        source: RevenueShareError,
        make: impl FnOnce(Phase, Box<RevenueShareError>) -> RevenueShareError,
    ) -> Self {
        match source {
            timeout @ RevenueShareError::ConfirmationTimeout { .. } => timeout,
            other => make(phase, Box::new(other)),
        }
    }

    /// Whether the caller can assume nothing landed on-chain
    pub fn outcome(&self) -> Outcome {
        match self {
            RevenueShareError::InitializationFailed { phase, source }
            | RevenueShareError::WithdrawalFailed { phase, source } => match phase {
                Phase::Allocate | Phase::Prepare | Phase::Sign => Outcome::NotApplied,
                Phase::Confirm
                    if matches!(**source, RevenueShareError::TransactionRejected { .. }) =>
                {
                    Outcome::NotApplied
                }
                Phase::Submit | Phase::Confirm | Phase::Verify => Outcome::AppliedOrUnknown,
            },
            RevenueShareError::ConfirmationTimeout { .. } => Outcome::AppliedOrUnknown,
            _ => Outcome::NotApplied,
        }
    }
}

/// Errors raised by a [`crate::ledger::Ledger`] implementation
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("RPC error: {0}")]
    Rpc(#[from] Box<ClientError>),

    #[error("Account {0} is not a valid token account")]
    InvalidTokenAccount(Pubkey),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

impl From<ClientError> for LedgerError {
    fn from(err: ClientError) -> Self {
        LedgerError::Rpc(Box::new(err))
    }
}

/// Errors raised by a [`crate::wallet::Wallet`] implementation
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Signing failed: {0}")]
    Signing(#[from] SignerError),

    #[error("User rejected the request")]
    Rejected,

    #[error("Wallet unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration value {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, RevenueShareError>;
