use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    program_pack::Pack,
    pubkey::Pubkey,
    system_instruction, sysvar,
};
use spl_token::state::Account as TokenAccount;

use crate::{
    allocator::ShareAllocation,
    constants::{INITIALIZE_TAG, MAX_MEMBERS, STATE_ACCOUNT_SIZE},
    errors::Result,
    state::encode_shares,
};

/// Accounts and rent needed to open a revenue share
#[derive(Debug, Clone, Copy)]
pub struct InitializeAccounts {
    /// Wallet paying for both accounts and signing the initialize instruction
    pub initializer: Pubkey,
    pub shared_account: Pubkey,
    pub state_account: Pubkey,
    pub token_mint: Pubkey,
    pub shared_account_lamports: u64,
    pub state_account_lamports: u64,
}

/// Build the revenue share initialize instruction
///
/// Data: tag (1) + shares [u16; 11] little-endian (22)
///
/// Accounts:
/// 0. initializer (signer)
/// 1. shared_account (writable)
/// 2. state_account (writable)
/// 3. rent sysvar
/// 4. token_program
/// 5..16. member identities, platform first, padded with the empty identity
pub fn build_initialize(
    program_id: Pubkey,
    initializer: Pubkey,
    shared_account: Pubkey,
    state_account: Pubkey,
    allocation: &ShareAllocation,
) -> Instruction {
    let mut data = Vec::with_capacity(1 + 2 * MAX_MEMBERS);
    data.push(INITIALIZE_TAG);
    data.extend_from_slice(&encode_shares(&allocation.shares));

    let mut accounts = vec![
        AccountMeta::new_readonly(initializer, true),
        AccountMeta::new(shared_account, false),
        AccountMeta::new(state_account, false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    // Member identities in slot order
    for member in &allocation.members {
        accounts.push(AccountMeta::new_readonly(*member, false));
    }

    Instruction {
        program_id,
        accounts,
        data,
    }
}

/// Build the four instructions of an initialize transaction, in order:
/// create shared account, initialize shared account, create state account,
/// initialize revenue share
pub fn build_initialize_transaction_instructions(
    program_id: Pubkey,
    accounts: &InitializeAccounts,
    allocation: &ShareAllocation,
) -> Result<Vec<Instruction>> {
    let create_shared = system_instruction::create_account(
        &accounts.initializer,
        &accounts.shared_account,
        accounts.shared_account_lamports,
        TokenAccount::LEN as u64,
        &spl_token::id(),
    );

    let init_shared = spl_token::instruction::initialize_account(
        &spl_token::id(),
        &accounts.shared_account,
        &accounts.token_mint,
        &accounts.initializer,
    )?;

    let create_state = system_instruction::create_account(
        &accounts.initializer,
        &accounts.state_account,
        accounts.state_account_lamports,
        STATE_ACCOUNT_SIZE as u64,
        &program_id,
    );

    let init_revenue_share = build_initialize(
        program_id,
        accounts.initializer,
        accounts.shared_account,
        accounts.state_account,
        allocation,
    );

    Ok(vec![create_shared, init_shared, create_state, init_revenue_share])
}
