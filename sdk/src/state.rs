use solana_sdk::pubkey::Pubkey;

use crate::{
    amount::Amount,
    constants::{
        IS_INITIALIZED_OFFSET, MAX_MEMBERS, MEMBERS_OFFSET, PERCENT_SCALE, SHARES_OFFSET,
        STATE_ACCOUNT_SIZE, WITHDRAWALS_OFFSET,
    },
    errors::{Result, RevenueShareError},
};

/// Decoded state account of a revenue share
///
/// Layout (packed, little-endian):
/// - 1 byte: is_initialized
/// - 352 bytes: members [Pubkey; 11]
/// - 22 bytes: shares [u16; 11]
/// - 88 bytes: withdrawals [u64; 11]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenueShareRecord {
    /// Set by the initialize instruction, never cleared
    pub is_initialized: bool,
    /// Slot 0 is the platform fee account, unused slots hold `Pubkey::default()`
    pub members: [Pubkey; MAX_MEMBERS],
    /// Share of each slot in basis points (10000 = 100%)
    pub shares: [u16; MAX_MEMBERS],
    /// Cumulative amount withdrawn by each slot
    pub withdrawals: [Amount; MAX_MEMBERS],
}

impl Default for RevenueShareRecord {
    fn default() -> Self {
        Self {
            is_initialized: false,
            members: [Pubkey::default(); MAX_MEMBERS],
            shares: [0; MAX_MEMBERS],
            withdrawals: [Amount::ZERO; MAX_MEMBERS],
        }
    }
}

impl RevenueShareRecord {
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != STATE_ACCOUNT_SIZE {
            return Err(RevenueShareError::MalformedRecord {
                expected: STATE_ACCOUNT_SIZE,
                actual: data.len(),
            });
        }

        let mut record = RevenueShareRecord {
            is_initialized: data[IS_INITIALIZED_OFFSET] != 0,
            ..Default::default()
        };

        for i in 0..MAX_MEMBERS {
            let offset = MEMBERS_OFFSET + i * 32;
            let mut key = [0u8; 32];
            key.copy_from_slice(&data[offset..offset + 32]);
            record.members[i] = Pubkey::new_from_array(key);

            let offset = SHARES_OFFSET + i * 2;
            record.shares[i] = u16::from_le_bytes([data[offset], data[offset + 1]]);

            let offset = WITHDRAWALS_OFFSET + i * 8;
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&data[offset..offset + 8]);
            record.withdrawals[i] = Amount::from_hundredths(u64::from_le_bytes(raw));
        }

        Ok(record)
    }

    /// Serializes the full record, withdrawals included
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; STATE_ACCOUNT_SIZE];
        data[IS_INITIALIZED_OFFSET] = self.is_initialized as u8;

        for i in 0..MAX_MEMBERS {
            let offset = MEMBERS_OFFSET + i * 32;
            data[offset..offset + 32].copy_from_slice(&self.members[i].to_bytes());

            let offset = SHARES_OFFSET + i * 2;
            data[offset..offset + 2].copy_from_slice(&self.shares[i].to_le_bytes());

            let offset = WITHDRAWALS_OFFSET + i * 8;
            data[offset..offset + 8]
                .copy_from_slice(&self.withdrawals[i].hundredths().to_le_bytes());
        }

        data
    }

    pub fn share_percentage(&self, slot: usize) -> f64 {
        self.shares[slot] as f64 / PERCENT_SCALE
    }

    /// Slots holding a real identity
    pub fn populated_slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..MAX_MEMBERS).filter(move |&i| self.members[i] != Pubkey::default())
    }

    /// Slot of `identity`; the empty identity never matches
    pub fn slot_of(&self, identity: &Pubkey) -> Option<usize> {
        if *identity == Pubkey::default() {
            return None;
        }
        self.members.iter().position(|m| m == identity)
    }

    /// Returns None on overflow
    pub fn total_withdrawn(&self) -> Option<Amount> {
        self.withdrawals
            .iter()
            .try_fold(Amount::ZERO, |acc, w| acc.checked_add(*w))
    }

    pub fn total_share_bps(&self) -> u32 {
        self.shares.iter().map(|s| *s as u32).sum()
    }
}

/// Encodes a freshly initialized state record
///
/// Slots past `members.len()` are padded with the empty identity and a zero share.
/// Withdrawals are always written as zero.
pub fn encode(members: &[Pubkey], shares: &[u16]) -> Result<Vec<u8>> {
    if members.len() != shares.len() {
        return Err(RevenueShareError::SlotCountMismatch {
            members: members.len(),
            shares: shares.len(),
        });
    }
    if members.is_empty() {
        return Err(RevenueShareError::EmptyMemberList);
    }
    if members.len() > MAX_MEMBERS {
        return Err(RevenueShareError::TooManyMembers {
            count: members.len(),
            max: MAX_MEMBERS,
        });
    }

    let mut record = RevenueShareRecord {
        is_initialized: true,
        ..Default::default()
    };
    record.members[..members.len()].copy_from_slice(members);
    record.shares[..shares.len()].copy_from_slice(shares);

    Ok(record.to_bytes())
}

/// Share vector as carried in initialize instruction data
pub fn encode_shares(shares: &[u16; MAX_MEMBERS]) -> [u8; 2 * MAX_MEMBERS] {
    let mut data = [0u8; 2 * MAX_MEMBERS];
    for (chunk, share) in data.chunks_exact_mut(2).zip(shares) {
        chunk.copy_from_slice(&share.to_le_bytes());
    }
    data
}
