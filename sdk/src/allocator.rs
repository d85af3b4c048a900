use log::debug;
use solana_sdk::pubkey::Pubkey;

use crate::{
    constants::{MAX_MEMBERS, MAX_PAYEES, PERCENT_SCALE, PLATFORM_SLOT, TOTAL_SHARE_BPS},
    errors::{Result, RevenueShareError},
};

/// Payee requested by the caller, percentage in 0-100 with two decimals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberShare {
    pub identity: Pubkey,
    pub percentage: f64,
}

impl MemberShare {
    pub fn new(identity: Pubkey, percentage: f64) -> Self {
        Self { identity, percentage }
    }
}

/// Fixed slot arrays ready for the initialize instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareAllocation {
    pub members: [Pubkey; MAX_MEMBERS],
    pub shares: [u16; MAX_MEMBERS],
    /// Populated slots, platform slot included
    pub member_count: usize,
}

impl ShareAllocation {
    pub fn populated_members(&self) -> &[Pubkey] {
        &self.members[..self.member_count]
    }

    pub fn populated_shares(&self) -> &[u16] {
        &self.shares[..self.member_count]
    }

    pub fn total_bps(&self) -> u32 {
        self.shares.iter().map(|s| *s as u32).sum()
    }
}

/// Converts a percentage to basis points, rounding half away from zero
fn percentage_to_bps(percentage: f64) -> Result<u64> {
    if !percentage.is_finite() || percentage <= 0.0 || percentage > 100.0 {
        return Err(RevenueShareError::InvalidPercentage(percentage));
    }
    // A slot holding 0 bps could never withdraw
    let bps = (percentage * PERCENT_SCALE).round() as u64;
    if bps == 0 {
        return Err(RevenueShareError::InvalidPercentage(percentage));
    }
    Ok(bps)
}

/// Builds the slot arrays for a new revenue share
///
/// Slot 0 receives the platform fee; the payees split the rest in proportion to
/// their requested percentages, which must total exactly 100.00.
pub fn allocate(
    payees: &[MemberShare],
    platform: &Pubkey,
    platform_fee_bps: u16,
) -> Result<ShareAllocation> {
    // Validate payee count
    require_payee_count(payees.len())?;

    // Validate each payee and check for duplicates
    for (i, payee) in payees.iter().enumerate() {
        // No empty identities
        if payee.identity == Pubkey::default() {
            return Err(RevenueShareError::EmptyIdentity);
        }

        // Platform account already owns slot 0
        if payee.identity == *platform {
            return Err(RevenueShareError::DuplicateMember(payee.identity));
        }

        // No duplicates
        if payees.iter().skip(i + 1).any(|other| other.identity == payee.identity) {
            return Err(RevenueShareError::DuplicateMember(payee.identity));
        }
    }

    // Validate raw percentages sum to 10000 bps before the fee is applied
    let raw_bps = payees
        .iter()
        .map(|p| percentage_to_bps(p.percentage))
        .collect::<Result<Vec<u64>>>()?;
    let total_bps: u64 = raw_bps.iter().sum();
    if total_bps != TOTAL_SHARE_BPS as u64 {
        return Err(RevenueShareError::SharesDoNotSumTo100 { total_bps });
    }

    if platform_fee_bps >= TOTAL_SHARE_BPS {
        return Err(RevenueShareError::InvalidFee(
            platform_fee_bps as f64 / PERCENT_SCALE,
        ));
    }

    let payee_bps = scale_to_remainder(&raw_bps, TOTAL_SHARE_BPS - platform_fee_bps);

    let mut allocation = ShareAllocation {
        members: [Pubkey::default(); MAX_MEMBERS],
        shares: [0; MAX_MEMBERS],
        member_count: payees.len() + 1,
    };
    allocation.members[PLATFORM_SLOT] = *platform;
    allocation.shares[PLATFORM_SLOT] = platform_fee_bps;
    for (i, (payee, bps)) in payees.iter().zip(payee_bps).enumerate() {
        if bps == 0 {
            return Err(RevenueShareError::ZeroShare {
                identity: payee.identity,
                platform_fee_bps,
            });
        }
        allocation.members[i + 1] = payee.identity;
        allocation.shares[i + 1] = bps;
    }

    debug!(
        "Allocated {} payees, fee {} bps, shares {:?}",
        payees.len(),
        platform_fee_bps,
        allocation.populated_shares()
    );

    Ok(allocation)
}

fn require_payee_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(RevenueShareError::EmptyMemberList);
    }
    if count > MAX_PAYEES {
        return Err(RevenueShareError::TooManyMembers {
            count,
            max: MAX_PAYEES,
        });
    }
    Ok(())
}

/// Scales `raw_bps` (summing to 10000) so the result sums to exactly `target`
///
/// Each value is rounded half away from zero; any residual left by rounding goes
/// to the values nearest their rounding boundary, lower slot first on ties.
fn scale_to_remainder(raw_bps: &[u64], target: u16) -> Vec<u16> {
    let den = TOTAL_SHARE_BPS as u64;
    let target = target as u64;

    // (rounded, remainder) per payee
    let mut scaled: Vec<(u64, u64)> = raw_bps
        .iter()
        .map(|bps| {
            let num = bps * target;
            let (quotient, remainder) = (num / den, num % den);
            let rounded = if remainder * 2 >= den { quotient + 1 } else { quotient };
            (rounded, remainder)
        })
        .collect();

    let sum: u64 = scaled.iter().map(|(rounded, _)| rounded).sum();

    if sum < target {
        let mut candidates: Vec<usize> = (0..scaled.len())
            .filter(|&i| scaled[i].1 * 2 < den)
            .collect();
        candidates.sort_by(|&a, &b| scaled[b].1.cmp(&scaled[a].1).then(a.cmp(&b)));
        for &i in candidates.iter().take((target - sum) as usize) {
            scaled[i].0 += 1;
        }
    } else if sum > target {
        let mut excess = sum - target;
        // Rounded-up values give a unit back, but never down to zero
        let mut candidates: Vec<usize> = (0..scaled.len())
            .filter(|&i| scaled[i].1 * 2 >= den && scaled[i].0 > 1)
            .collect();
        candidates.sort_by(|&a, &b| scaled[a].1.cmp(&scaled[b].1).then(a.cmp(&b)));
        for &i in candidates.iter().take(excess as usize) {
            scaled[i].0 -= 1;
            excess -= 1;
        }
        // Whatever is left comes off the largest value, lower slot first on ties
        if excess > 0 {
            if let Some(i) = (0..scaled.len())
                .max_by(|&a, &b| scaled[a].0.cmp(&scaled[b].0).then(b.cmp(&a)))
            {
                scaled[i].0 = scaled[i].0.saturating_sub(excess);
            }
        }
    }

    // Each value is at most target <= 10000
    scaled.into_iter().map(|(rounded, _)| rounded as u16).collect()
}

/// Percentage still unassigned after `shares`, never negative
pub fn remaining_percentage(shares: &[f64]) -> f64 {
    let total: f64 = shares.iter().sum();
    if total >= 100.0 {
        return 0.0;
    }
    100.0 - total
}
