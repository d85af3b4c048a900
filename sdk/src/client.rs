use log::{debug, info, warn};
use solana_sdk::{
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use spl_associated_token_account::get_associated_token_address;
use spl_token::state::Account as TokenAccount;

use crate::{
    allocator::{allocate, MemberShare},
    amount::Amount,
    config::RevenueShareConfig,
    constants::{STATE_ACCOUNT_SIZE, TOTAL_SHARE_BPS, WITHDRAWALS_OFFSET},
    errors::{LedgerError, Phase, Result, RevenueShareError, WalletError},
    instructions::{build_initialize_transaction_instructions, build_withdraw, InitializeAccounts},
    ledger::{ConfirmationStatus, Ledger},
    state::{encode, RevenueShareRecord},
    summary::RevenueShareSummary,
    wallet::{Wallet, WalletSession},
};

/// Accounts opened by a confirmed initialize transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializedAccounts {
    pub state_account: Pubkey,
    pub shared_account: Pubkey,
    pub signature: Signature,
}

/// Reads and writes revenue shares through a [`Ledger`]
///
/// Every call goes to the ledger; nothing is cached between calls.
pub struct RevenueShareClient<L: Ledger> {
    ledger: L,
    config: RevenueShareConfig,
}

impl<L: Ledger> RevenueShareClient<L> {
    pub fn new(ledger: L, config: RevenueShareConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &RevenueShareConfig {
        &self.config
    }

    /// Decoded state record and shared account balance
    pub async fn fetch_state(
        &self,
        state_account: &Pubkey,
        shared_account: &Pubkey,
    ) -> Result<(RevenueShareRecord, Amount)> {
        let data = self
            .ledger
            .account_data(state_account)
            .await?
            .ok_or(RevenueShareError::AccountNotFound(*state_account))?;
        let record = RevenueShareRecord::decode(&data)?;

        let balance = self
            .ledger
            .token_balance(shared_account)
            .await?
            .ok_or(RevenueShareError::AccountNotFound(*shared_account))?;

        Ok((record, Amount::from_hundredths(balance)))
    }

    pub async fn fetch_summary(
        &self,
        state_account: &Pubkey,
        shared_account: &Pubkey,
    ) -> Result<RevenueShareSummary> {
        let (record, balance) = self.fetch_state(state_account, shared_account).await?;
        Ok(RevenueShareSummary::new(&record, balance))
    }

    /// Opens a shared token account and its state account in one transaction
    ///
    /// Returns once the transaction is confirmed and the state account holds the
    /// submitted members and shares.
    pub async fn initialize<W: Wallet>(
        &self,
        session: &WalletSession<W>,
        payees: &[MemberShare],
    ) -> Result<InitializedAccounts> {
        // Phase 1: local validation, nothing touches the network
        let allocation = allocate(
            payees,
            &self.config.platform_account,
            self.config.platform_fee_bps,
        )
        .map_err(|e| RevenueShareError::initialization(Phase::Allocate, e))?;
        let expected_state = encode(allocation.populated_members(), allocation.populated_shares())
            .map_err(|e| RevenueShareError::initialization(Phase::Allocate, e))?;

        let initializer = session
            .identity()
            .map_err(|e| RevenueShareError::initialization(Phase::Prepare, e))?;

        // Phase 2: rent and blockhash
        let shared_keypair = Keypair::new();
        let state_keypair = Keypair::new();

        let prepare = |e: LedgerError| {
            RevenueShareError::initialization(Phase::Prepare, e)
        };
        let shared_account_lamports = self
            .ledger
            .minimum_balance_for_rent_exemption(TokenAccount::LEN)
            .await
            .map_err(prepare)?;
        let state_account_lamports = self
            .ledger
            .minimum_balance_for_rent_exemption(STATE_ACCOUNT_SIZE)
            .await
            .map_err(prepare)?;
        let blockhash = self.ledger.latest_blockhash().await.map_err(prepare)?;

        let accounts = InitializeAccounts {
            initializer,
            shared_account: shared_keypair.pubkey(),
            state_account: state_keypair.pubkey(),
            token_mint: self.config.token_mint,
            shared_account_lamports,
            state_account_lamports,
        };
        let instructions =
            build_initialize_transaction_instructions(self.config.program_id, &accounts, &allocation)
                .map_err(|e| RevenueShareError::initialization(Phase::Prepare, e))?;

        // Phase 3: new accounts sign first, then the wallet
        let mut transaction = Transaction::new_with_payer(&instructions, Some(&initializer));
        transaction
            .try_partial_sign(&[&shared_keypair, &state_keypair], blockhash)
            .map_err(|e| RevenueShareError::initialization(Phase::Sign, WalletError::from(e)))?;
        let transaction = session
            .sign(transaction)
            .await
            .map_err(|e| RevenueShareError::initialization(Phase::Sign, e))?;

        debug!(
            "Initializing revenue share state {} shared {} with shares {:?}",
            accounts.state_account,
            accounts.shared_account,
            allocation.populated_shares()
        );

        // Phase 4: submit and wait
        let signature = self
            .ledger
            .send_transaction(&transaction)
            .await
            .map_err(|e| RevenueShareError::initialization(Phase::Submit, e))?;
        info!("Submitted initialize transaction {}", signature);

        self.await_confirmation(&signature)
            .await
            .map_err(|e| RevenueShareError::initialization(Phase::Confirm, e))?;

        // Phase 5: the state account must hold what was submitted
        self.verify_state(&accounts.state_account, &expected_state)
            .await
            .map_err(|e| RevenueShareError::initialization(Phase::Verify, e))?;

        info!(
            "Revenue share initialized: state {} shared {}",
            accounts.state_account, accounts.shared_account
        );

        Ok(InitializedAccounts {
            state_account: accounts.state_account,
            shared_account: accounts.shared_account,
            signature,
        })
    }

    /// Withdraws `amount` from the shared account to `destination`
    ///
    /// Never retried: after an ambiguous failure the withdrawal may still land.
    pub async fn withdraw<W: Wallet>(
        &self,
        session: &WalletSession<W>,
        state_account: &Pubkey,
        shared_account: &Pubkey,
        amount: Amount,
        destination: &Pubkey,
    ) -> Result<Signature> {
        if amount.is_zero() {
            return Err(RevenueShareError::withdrawal(
                Phase::Prepare,
                RevenueShareError::InvalidAmount(amount.to_string()),
            ));
        }
        let member = session
            .identity()
            .map_err(|e| RevenueShareError::withdrawal(Phase::Prepare, e))?;
        self.check_withdraw_account(destination)
            .await
            .map_err(|e| RevenueShareError::withdrawal(Phase::Prepare, e))?;

        let instruction = build_withdraw(
            self.config.program_id,
            member,
            *state_account,
            *shared_account,
            *destination,
            amount,
        );

        let blockhash = self
            .ledger
            .latest_blockhash()
            .await
            .map_err(|e| RevenueShareError::withdrawal(Phase::Prepare, e))?;
        let mut transaction = Transaction::new_with_payer(&[instruction], Some(&member));
        transaction.message.recent_blockhash = blockhash;

        let transaction = session
            .sign(transaction)
            .await
            .map_err(|e| RevenueShareError::withdrawal(Phase::Sign, e))?;

        let signature = self
            .ledger
            .send_transaction(&transaction)
            .await
            .map_err(|e| RevenueShareError::withdrawal(Phase::Submit, e))?;
        info!(
            "Submitted withdrawal of {} from {} to {}: {}",
            amount, shared_account, destination, signature
        );

        self.await_confirmation(&signature)
            .await
            .map_err(|e| RevenueShareError::withdrawal(Phase::Confirm, e))?;

        Ok(signature)
    }

    /// Default withdraw destination: the owner's associated token account
    pub fn find_withdraw_account(&self, owner: &Pubkey) -> Pubkey {
        get_associated_token_address(owner, &self.config.token_mint)
    }

    /// `owner`'s associated token account, once the ledger shows it exists
    pub async fn fetch_withdraw_account(&self, owner: &Pubkey) -> Result<Pubkey> {
        let address = self.find_withdraw_account(owner);
        self.check_withdraw_account(&address).await?;
        Ok(address)
    }

    /// Destination must be an existing token account of the configured mint
    async fn check_withdraw_account(&self, destination: &Pubkey) -> Result<()> {
        let account = self
            .ledger
            .token_account(destination)
            .await?
            .ok_or(RevenueShareError::AccountNotFound(*destination))?;
        if account.mint != self.config.token_mint {
            return Err(RevenueShareError::MintMismatch {
                account: *destination,
                expected: self.config.token_mint,
                actual: account.mint,
            });
        }
        Ok(())
    }

    /// Polls the signature status until it settles, bounded by the confirmation timeout
    async fn await_confirmation(&self, signature: &Signature) -> Result<()> {
        let timeout = self.config.confirmation_timeout;
        match tokio::time::timeout(timeout, self.poll_until_settled(signature)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Transaction {} not confirmed after {:?}", signature, timeout);
                Err(RevenueShareError::ConfirmationTimeout {
                    signature: *signature,
                    waited: timeout,
                })
            }
        }
    }

    async fn poll_until_settled(&self, signature: &Signature) -> Result<()> {
        loop {
            match self.ledger.signature_status(signature).await? {
                ConfirmationStatus::Confirmed => {
                    info!("Transaction {} confirmed", signature);
                    return Ok(());
                }
                ConfirmationStatus::Failed(reason) => {
                    warn!("Transaction {} failed: {}", signature, reason);
                    return Err(RevenueShareError::TransactionRejected {
                        signature: *signature,
                        reason,
                    });
                }
                ConfirmationStatus::Pending => {
                    tokio::time::sleep(self.config.confirmation_poll_interval).await;
                }
            }
        }
    }

    async fn verify_state(&self, state_account: &Pubkey, expected: &[u8]) -> Result<()> {
        let data = self
            .ledger
            .account_data(state_account)
            .await?
            .ok_or(RevenueShareError::AccountNotFound(*state_account))?;
        let record = RevenueShareRecord::decode(&data)?;

        // Withdrawals may already have moved; members and shares may not
        if !record.is_initialized || data[..WITHDRAWALS_OFFSET] != expected[..WITHDRAWALS_OFFSET] {
            return Err(RevenueShareError::StateMismatch(*state_account));
        }
        Ok(())
    }
}

/// Amount `identity` can still withdraw
///
/// Everything ever deposited is the current balance plus all past withdrawals;
/// a member is entitled to its share of that, minus what it already took.
/// Floors at zero when the member is already overdrawn.
pub fn max_withdrawable(
    record: &RevenueShareRecord,
    shared_balance: Amount,
    identity: &Pubkey,
) -> Result<Amount> {
    let slot = record
        .slot_of(identity)
        .ok_or(RevenueShareError::UnknownMember(*identity))?;

    let total_deposited = record
        .total_withdrawn()
        .and_then(|withdrawn| withdrawn.checked_add(shared_balance))
        .ok_or(RevenueShareError::MathOverflow)?;

    let entitlement: u64 = (total_deposited.hundredths() as u128)
        .checked_mul(record.shares[slot] as u128)
        .ok_or(RevenueShareError::MathOverflow)?
        .checked_div(TOTAL_SHARE_BPS as u128)
        .ok_or(RevenueShareError::MathOverflow)?
        .try_into()
        .map_err(|_| RevenueShareError::MathOverflow)?;

    Ok(Amount::from_hundredths(entitlement).saturating_sub(record.withdrawals[slot]))
}
