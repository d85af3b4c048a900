// Slot configuration
pub const MAX_MEMBERS: usize = 11;            // fee slot + payees
pub const MAX_PAYEES: usize = MAX_MEMBERS - 1;
pub const PLATFORM_SLOT: usize = 0;

// Share arithmetic
pub const TOTAL_SHARE_BPS: u16 = 10000;       // 100.00%
pub const PERCENT_SCALE: f64 = 100.0;         // percentage -> bps, decimal -> hundredths

// Shared token account mint uses 2 decimals, so raw token amounts are hundredths
pub const TOKEN_DECIMALS: u8 = 2;

// State account layout
// - is_initialized: 1
// - members: 32 * 11 = 352
// - shares: 2 * 11 = 22
// - withdrawals: 8 * 11 = 88
// Total: 1 + 352 + 22 + 88 = 463
// NOTE: packed, no alignment padding
pub const IS_INITIALIZED_OFFSET: usize = 0;
pub const MEMBERS_OFFSET: usize = 1;
pub const SHARES_OFFSET: usize = MEMBERS_OFFSET + 32 * MAX_MEMBERS;      // 353
pub const WITHDRAWALS_OFFSET: usize = SHARES_OFFSET + 2 * MAX_MEMBERS;   // 375
pub const STATE_ACCOUNT_SIZE: usize = WITHDRAWALS_OFFSET + 8 * MAX_MEMBERS; // 463

const _: () = assert!(STATE_ACCOUNT_SIZE == 463);

// Instruction tags (first byte of instruction data)
pub const INITIALIZE_TAG: u8 = 0;
pub const WITHDRAW_TAG: u8 = 1;

// Seed of the program authority that owns the shared token account after init
pub const PDA_SEED: &[u8] = b"revenue_sharing";
