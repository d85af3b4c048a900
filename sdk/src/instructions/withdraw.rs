use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::{amount::Amount, constants::WITHDRAW_TAG, instructions::derive_program_authority};

/// Build the revenue share withdraw instruction
///
/// Data: tag (1) + amount in hundredths, u64 little-endian (8)
///
/// Accounts:
/// 0. member (signer)
/// 1. state_account (writable)
/// 2. shared_account (writable)
/// 3. destination token account (writable)
/// 4. token_program
/// 5. program authority PDA
pub fn build_withdraw(
    program_id: Pubkey,
    member: Pubkey,
    state_account: Pubkey,
    shared_account: Pubkey,
    destination: Pubkey,
    amount: Amount,
) -> Instruction {
    let mut data = Vec::with_capacity(1 + 8);
    data.push(WITHDRAW_TAG);
    data.extend_from_slice(&amount.hundredths().to_le_bytes());

    let (authority, _bump) = derive_program_authority(&program_id);

    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new_readonly(member, true),
            AccountMeta::new(state_account, false),
            AccountMeta::new(shared_account, false),
            AccountMeta::new(destination, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(authority, false),
        ],
        data,
    }
}
