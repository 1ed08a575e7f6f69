//! Recompute the cross-entity invariants from stored state.

use crate::query;
use serde::Serialize;
use staking_core::{user_id, Entity, EntityStore, SignedAmount, StoreError, User, ZERO_ADDRESS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub users: usize,
    /// `GlobalStats.totalStaked`, zero when no stats exist yet.
    pub total_staked: SignedAmount,
    pub sum_of_user_stakes: SignedAmount,
    /// Set when the recomputed sum left the 256-bit range; the sum is then partial.
    pub sum_overflowed: bool,
    /// Users whose `stakedAt` presence disagrees with a positive stake.
    pub stake_timestamp_mismatches: Vec<String>,
    /// Excludes the mint/burn address, whose balance mirrors minus the supply.
    pub negative_balances: Vec<String>,
    pub negative_stakes: Vec<String>,
}

impl AuditReport {
    pub fn total_staked_matches(&self) -> bool {
        !self.sum_overflowed && self.total_staked == self.sum_of_user_stakes
    }

    /// Negative values are reported but do not fail the audit on their own.
    pub fn is_consistent(&self) -> bool {
        self.total_staked_matches() && self.stake_timestamp_mismatches.is_empty()
    }
}

pub fn audit<S: EntityStore + ?Sized>(store: &S) -> Result<AuditReport, StoreError> {
    let users = query::all::<User, _>(store)?;
    let total_staked = query::global_stats(store)?
        .map(|s| s.total_staked())
        .unwrap_or_default();

    let mut sum = SignedAmount::ZERO;
    let mut overflowed = false;
    let mut report = AuditReport {
        users: users.len(),
        total_staked,
        sum_of_user_stakes: SignedAmount::ZERO,
        sum_overflowed: false,
        stake_timestamp_mismatches: Vec::new(),
        negative_balances: Vec::new(),
        negative_stakes: Vec::new(),
    };

    let mint_address = user_id(&ZERO_ADDRESS);
    for user in &users {
        match sum.checked_add(user.staked_amount()) {
            Ok(next) => sum = next,
            Err(_) => overflowed = true,
        }
        if user.staked_at().is_some() != user.staked_amount().is_positive() {
            report.stake_timestamp_mismatches.push(user.id().to_string());
        }
        if user.token_balance().is_negative() && user.id() != mint_address {
            report.negative_balances.push(user.id().to_string());
        }
        if user.staked_amount().is_negative() {
            report.negative_stakes.push(user.id().to_string());
        }
    }

    if overflowed {
        tracing::warn!("sum of user stakes overflowed during audit");
    }
    report.sum_overflowed = overflowed;
    report.sum_of_user_stakes = sum;
    Ok(report)
}
