// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::apply::apply;
use crate::command::Command;
use crate::error::CoreError;
use crate::ledger::PendingSyncLedger;
use crate::sync_key::SyncKey;
use schoolhub_audit::{Actor, AuditEvent, Cause};
use schoolhub_domain::AppState;
use std::sync::Arc;

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new document after the transition.
    pub new_state: AppState,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
    /// The sync keys the transition changed.
    pub touched: Vec<SyncKey>,
}

/// Holds the current document and the keys still waiting to be pushed.
///
/// Readers take cheap `Arc` snapshots. A commit swaps the whole document in
/// one step, so a reader never sees a half-applied transition.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    current: Arc<AppState>,
    ledger: PendingSyncLedger,
}

impl StateStore {
    /// Creates a store holding `state` with nothing pending.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            current: Arc::new(state),
            ledger: PendingSyncLedger::new(),
        }
    }

    /// Creates a store from a persisted document and ledger.
    #[must_use]
    pub fn with_ledger(state: AppState, ledger: PendingSyncLedger) -> Self {
        Self {
            current: Arc::new(state),
            ledger,
        }
    }

    /// Returns a snapshot of the current document.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.current)
    }

    /// Returns the current document.
    #[must_use]
    pub fn current(&self) -> &AppState {
        &self.current
    }

    /// Returns the pending-sync ledger.
    #[must_use]
    pub const fn ledger(&self) -> &PendingSyncLedger {
        &self.ledger
    }

    /// Returns the pending-sync ledger for acknowledging pushes.
    pub const fn ledger_mut(&mut self) -> &mut PendingSyncLedger {
        &mut self.ledger
    }

    /// Swaps in a transition's document and marks its touched keys.
    ///
    /// Returns the transition's audit event for persistence.
    pub fn commit(&mut self, result: TransitionResult) -> AuditEvent {
        self.current = Arc::new(result.new_state);
        self.ledger.mark_all(result.touched);
        result.audit_event
    }

    /// Applies a command to the current document and commits the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the command violates a domain rule. The store is
    /// unchanged in that case.
    pub fn execute(
        &mut self,
        command: Command,
        actor: Actor,
        cause: Cause,
    ) -> Result<AuditEvent, CoreError> {
        let result: TransitionResult = apply(&self.current, command, actor, cause)?;
        Ok(self.commit(result))
    }

    /// Replaces the whole document, e.g. from a backup, and marks every key.
    pub fn replace(&mut self, state: AppState) {
        self.ledger.mark_all(SyncKey::all_for(&state));
        self.current = Arc::new(state);
    }
}
