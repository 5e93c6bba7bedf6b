//! Append-only investigation ledger.
//!
//! Thin role-gated facade over the store's atomic note append. Officers write;
//! everyone with read access sees notes in canonical insertion order (display
//! surfaces may reverse for "most recent first", storage order is the audit
//! record).

use std::sync::Arc;

use crate::error::{DeskError, DeskResult};
use crate::model::{Actor, ComplaintId, InvestigationNote, Role};
use crate::store::ComplaintStore;

#[derive(Clone)]
pub struct InvestigationLog {
    store: Arc<ComplaintStore>,
}

impl InvestigationLog {
    pub fn new(store: Arc<ComplaintStore>) -> Self {
        Self { store }
    }

    /// Append one note. Officer-role actors only; the note is attributed to
    /// the officer's display name and timestamped at append time.
    pub fn append(
        &self,
        actor: &Actor,
        complaint: ComplaintId,
        note: &str,
    ) -> DeskResult<Vec<InvestigationNote>> {
        if actor.role != Role::Officer {
            return Err(DeskError::Authorization(format!(
                "role `{:?}` may not append investigation notes",
                actor.role
            )));
        }
        self.store.append_note(complaint, &actor.name, note)
    }

    /// Notes in insertion order.
    pub fn notes(&self, complaint: ComplaintId) -> DeskResult<Vec<InvestigationNote>> {
        self.store.notes(complaint)
    }
}
