pub mod initialize;
pub mod withdraw;

pub use initialize::*;
pub use withdraw::*;

use solana_sdk::pubkey::Pubkey;

use crate::constants::PDA_SEED;

/// Derive the program authority that owns every shared token account
pub fn derive_program_authority(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PDA_SEED], program_id)
}
