//! Account fixtures

use {
    revenue_share_sdk::{Amount, RevenueShareRecord},
    solana_sdk::{program_pack::Pack, pubkey::Pubkey},
    spl_token::state::{Account as TokenAccount, AccountState},
};

/// Stored account in the mock ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAccount {
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

/// Packed SPL token account data
pub fn token_account_data(mint: Pubkey, owner: Pubkey, amount: u64) -> Vec<u8> {
    let mut data = vec![0u8; TokenAccount::LEN];
    TokenAccount::pack(
        TokenAccount {
            mint,
            owner,
            amount,
            state: AccountState::Initialized,
            ..TokenAccount::default()
        },
        &mut data,
    )
    .unwrap();
    data
}

/// Token account owned by the token program
pub fn token_account(mint: Pubkey, owner: Pubkey, amount: u64) -> StoredAccount {
    StoredAccount {
        lamports: 2_039_280,
        owner: spl_token::id(),
        data: token_account_data(mint, owner, amount),
    }
}

/// Initialized state record with the given slots and withdrawals (hundredths)
pub fn state_record(members: &[Pubkey], shares: &[u16], withdrawals: &[u64]) -> RevenueShareRecord {
    let mut record = RevenueShareRecord {
        is_initialized: true,
        ..Default::default()
    };
    record.members[..members.len()].copy_from_slice(members);
    record.shares[..shares.len()].copy_from_slice(shares);
    for (slot, amount) in withdrawals.iter().enumerate() {
        record.withdrawals[slot] = Amount::from_hundredths(*amount);
    }
    record
}

pub fn state_account(program_id: Pubkey, record: &RevenueShareRecord) -> StoredAccount {
    StoredAccount {
        lamports: 4_057_680,
        owner: program_id,
        data: record.to_bytes(),
    }
}
