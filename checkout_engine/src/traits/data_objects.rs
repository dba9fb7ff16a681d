use serde::{Deserialize, Serialize};

use crate::db_types::Transaction;

/// What finalization did to the inventory ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockEffect {
    /// The transaction was already terminal. Nothing was touched.
    Unchanged,
    /// The reserved units were consumed.
    Committed,
    /// There was no reservation to consume, so the units were deducted from unreserved stock instead.
    CommittedWithoutReservation,
    /// Neither a commit nor a plain deduction was possible. No stock was deducted and `stock_committed_at` is unset.
    CommitFailed,
    /// The reservation was given back.
    Released,
    /// There was no reservation left to give back. `stock_released_at` is set regardless.
    NothingToRelease,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeResult {
    pub transaction: Transaction,
    /// `true` if this call moved the transaction out of `Pending`; `false` for duplicate or late calls.
    pub applied: bool,
    pub stock_effect: StockEffect,
}

impl FinalizeResult {
    pub fn applied(transaction: Transaction, stock_effect: StockEffect) -> Self {
        Self { transaction, applied: true, stock_effect }
    }

    pub fn duplicate(transaction: Transaction) -> Self {
        Self { transaction, applied: false, stock_effect: StockEffect::Unchanged }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepResult {
    /// Transactions finalized as `Voided` by this sweep.
    pub voided: Vec<Transaction>,
    /// Transactions that had already been finalized by someone else by the time the sweep reached them.
    pub already_final: Vec<Transaction>,
    /// `(transaction id, error)` for every item that could not be processed.
    pub failures: Vec<(i64, String)>,
}

impl SweepResult {
    pub fn voided_count(&self) -> usize {
        self.voided.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn total_count(&self) -> usize {
        self.voided.len() + self.already_final.len() + self.failures.len()
    }
}
