//! In-memory ledger executing revenue share transactions

use {
    super::accounts::{token_account_data, StoredAccount},
    async_trait::async_trait,
    revenue_share_sdk::{
        constants::{INITIALIZE_TAG, MAX_MEMBERS, STATE_ACCOUNT_SIZE, WITHDRAW_TAG},
        max_withdrawable, Amount, ConfirmationStatus, Ledger, LedgerError, RevenueShareRecord,
    },
    solana_sdk::{
        hash::Hash,
        instruction::CompiledInstruction,
        program_pack::Pack,
        pubkey::Pubkey,
        signature::Signature,
        system_program,
        transaction::Transaction,
    },
    spl_token::state::Account as TokenAccount,
    std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Mutex,
        },
    },
};

pub const RENT_PER_BYTE: u64 = 6_960;

#[derive(Default)]
pub struct MockLedger {
    pub program_id: Pubkey,
    accounts: Mutex<HashMap<Pubkey, StoredAccount>>,
    statuses: Mutex<HashMap<Signature, ConfirmationStatus>>,
    sent: Mutex<Vec<Transaction>>,
    /// Status polls answered with Pending before the real status
    pub pending_polls: AtomicUsize,
    /// Every status poll answers Pending
    pub never_confirm: AtomicBool,
    /// send_transaction fails without broadcasting
    pub reject_send: AtomicBool,
    /// Initialize writes the shares in reverse slot order
    pub tamper_shares: AtomicBool,
    pub status_polls: AtomicUsize,
}

impl MockLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            ..Default::default()
        }
    }

    pub fn set_account(&self, address: Pubkey, account: StoredAccount) {
        self.accounts.lock().unwrap().insert(address, account);
    }

    pub fn account(&self, address: &Pubkey) -> Option<StoredAccount> {
        self.accounts.lock().unwrap().get(address).cloned()
    }

    pub fn record(&self, address: &Pubkey) -> RevenueShareRecord {
        RevenueShareRecord::decode(&self.account(address).unwrap().data).unwrap()
    }

    pub fn token_amount(&self, address: &Pubkey) -> u64 {
        TokenAccount::unpack(&self.account(address).unwrap().data)
            .unwrap()
            .amount
    }

    /// Adds tokens to an existing token account
    pub fn deposit(&self, address: &Pubkey, amount: u64) {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(address).unwrap();
        let mut token = TokenAccount::unpack(&account.data).unwrap();
        token.amount += amount;
        TokenAccount::pack(token, &mut account.data).unwrap();
    }

    pub fn sent_transactions(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }

    fn execute(&self, transaction: &Transaction) -> Result<(), String> {
        transaction.verify().map_err(|e| e.to_string())?;

        // Work on a copy so a failing instruction leaves nothing behind
        let mut accounts = self.accounts.lock().unwrap().clone();
        let message = &transaction.message;
        for ix in &message.instructions {
            let program_id = message.account_keys[ix.program_id_index as usize];
            let keys: Vec<Pubkey> = ix
                .accounts
                .iter()
                .map(|i| message.account_keys[*i as usize])
                .collect();
            if program_id == system_program::id() {
                create_account(&mut accounts, ix, &keys)?;
            } else if program_id == spl_token::id() {
                initialize_token_account(&mut accounts, &keys)?;
            } else if program_id == self.program_id {
                self.revenue_share(&mut accounts, ix, &keys, message)?;
            } else {
                return Err(format!("unknown program {}", program_id));
            }
        }
        *self.accounts.lock().unwrap() = accounts;
        Ok(())
    }

    fn revenue_share(
        &self,
        accounts: &mut HashMap<Pubkey, StoredAccount>,
        ix: &CompiledInstruction,
        keys: &[Pubkey],
        message: &solana_sdk::message::Message,
    ) -> Result<(), String> {
        let signer_index = ix.accounts[0] as usize;
        if !message.is_signer(signer_index) {
            return Err("missing signature".to_string());
        }
        match ix.data.first() {
            Some(&INITIALIZE_TAG) => {
                let (shared, state) = (keys[1], keys[2]);
                let stored = accounts.get(&state).ok_or("state account missing")?;
                if stored.data.len() != STATE_ACCOUNT_SIZE || stored.data[0] != 0 {
                    return Err("state account already initialized".to_string());
                }
                if !accounts.contains_key(&shared) {
                    return Err("shared account missing".to_string());
                }

                let mut record = RevenueShareRecord {
                    is_initialized: true,
                    ..Default::default()
                };
                for slot in 0..MAX_MEMBERS {
                    record.members[slot] = keys[5 + slot];
                    let offset = 1 + slot * 2;
                    record.shares[slot] =
                        u16::from_le_bytes([ix.data[offset], ix.data[offset + 1]]);
                }
                if self.tamper_shares.load(Ordering::SeqCst) {
                    record.shares.reverse();
                }
                accounts.get_mut(&state).unwrap().data = record.to_bytes();
                Ok(())
            }
            Some(&WITHDRAW_TAG) => {
                let (member, state, shared, destination) = (keys[0], keys[1], keys[2], keys[3]);
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&ix.data[1..9]);
                let amount = u64::from_le_bytes(raw);

                let stored = accounts.get(&state).ok_or("state account missing")?;
                let mut record =
                    RevenueShareRecord::decode(&stored.data).map_err(|e| e.to_string())?;
                let shared_data = &accounts.get(&shared).ok_or("shared account missing")?.data;
                let mut shared_token = TokenAccount::unpack(shared_data).map_err(|e| e.to_string())?;

                let available = max_withdrawable(
                    &record,
                    Amount::from_hundredths(shared_token.amount),
                    &member,
                )
                .map_err(|e| e.to_string())?;
                if amount > available.hundredths() {
                    return Err("insufficient funds".to_string());
                }

                let dest = accounts.get(&destination).ok_or("destination missing")?;
                let mut dest_token = TokenAccount::unpack(&dest.data).map_err(|e| e.to_string())?;

                let slot = record.slot_of(&member).ok_or("not a member")?;
                record.withdrawals[slot] =
                    Amount::from_hundredths(record.withdrawals[slot].hundredths() + amount);
                shared_token.amount -= amount;
                dest_token.amount += amount;

                accounts.get_mut(&state).unwrap().data = record.to_bytes();
                TokenAccount::pack(shared_token, &mut accounts.get_mut(&shared).unwrap().data)
                    .map_err(|e| e.to_string())?;
                TokenAccount::pack(dest_token, &mut accounts.get_mut(&destination).unwrap().data)
                    .map_err(|e| e.to_string())?;
                Ok(())
            }
            _ => Err("invalid instruction".to_string()),
        }
    }
}

/// SystemInstruction::CreateAccount: u32 tag, u64 lamports, u64 space, owner
fn create_account(
    accounts: &mut HashMap<Pubkey, StoredAccount>,
    ix: &CompiledInstruction,
    keys: &[Pubkey],
) -> Result<(), String> {
    if ix.data.len() != 52 || ix.data[..4] != [0, 0, 0, 0] {
        return Err("unsupported system instruction".to_string());
    }
    let new_account = keys[1];
    if accounts.contains_key(&new_account) {
        return Err("account already in use".to_string());
    }
    let lamports = u64::from_le_bytes(ix.data[4..12].try_into().unwrap());
    let space = u64::from_le_bytes(ix.data[12..20].try_into().unwrap());
    let owner = Pubkey::try_from(&ix.data[20..52]).unwrap();
    accounts.insert(
        new_account,
        StoredAccount {
            lamports,
            owner,
            data: vec![0u8; space as usize],
        },
    );
    Ok(())
}

/// TokenInstruction::InitializeAccount: account, mint, owner, rent
fn initialize_token_account(
    accounts: &mut HashMap<Pubkey, StoredAccount>,
    keys: &[Pubkey],
) -> Result<(), String> {
    let (account, mint, owner) = (keys[0], keys[1], keys[2]);
    let stored = accounts.get_mut(&account).ok_or("token account missing")?;
    if stored.owner != spl_token::id() || stored.data.len() != TokenAccount::LEN {
        return Err("invalid token account".to_string());
    }
    stored.data = token_account_data(mint, owner, 0);
    Ok(())
}

#[async_trait]
impl Ledger for MockLedger {
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.account(address).map(|a| a.data))
    }

    async fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LedgerError> {
        Ok((data_len as u64 + 128) * RENT_PER_BYTE)
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(Hash::new_unique())
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        if self.reject_send.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(transaction.clone());

        let signature = transaction.signatures[0];
        let status = match self.execute(transaction) {
            Ok(()) => ConfirmationStatus::Confirmed,
            Err(reason) => ConfirmationStatus::Failed(reason),
        };
        self.statuses.lock().unwrap().insert(signature, status);
        Ok(signature)
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<ConfirmationStatus, LedgerError> {
        self.status_polls.fetch_add(1, Ordering::SeqCst);
        if self.never_confirm.load(Ordering::SeqCst) {
            return Ok(ConfirmationStatus::Pending);
        }
        if self
            .pending_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Ok(ConfirmationStatus::Pending);
        }
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(signature)
            .cloned()
            .unwrap_or(ConfirmationStatus::Pending))
    }

    async fn token_account(&self, address: &Pubkey) -> Result<Option<TokenAccount>, LedgerError> {
        match self.account(address) {
            None => Ok(None),
            Some(account) => TokenAccount::unpack(&account.data)
                .map(Some)
                .map_err(|_| LedgerError::InvalidTokenAccount(*address)),
        }
    }
}
