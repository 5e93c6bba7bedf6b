//! In-memory complaint store.
//!
//! Exclusive owner of complaint records. Creation invariants, status
//! transitions, and note appends all happen under one per-map lock, so
//! concurrent transition requests against the same complaint serialize: the
//! loser of a race is re-validated against the state as it now stands and
//! receives `InvalidTransition`, never a silent overwrite. The lock is never
//! held across an await point — classification completes before `create` runs.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::error::{DeskError, DeskResult};
use crate::model::{
    Actor, ActorId, Classification, Complaint, ComplaintId, IdentityStatus, InvestigationNote,
    Role, Status,
};
use crate::workflow::{self, TransitionRequest};

/// Creation input as received from the boundary. Dates arrive as strings and
/// are validated here, before any persistence.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub incident_type: String,
    pub location: String,
    pub incident_date: String,
    pub incident_time: String,
    pub evidence: Option<String>,
    pub ai_draft: Option<String>,
}

#[derive(Debug, Default)]
pub struct ComplaintStore {
    inner: Mutex<HashMap<ComplaintId, Complaint>>,
}

impl ComplaintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap admission checks for the boundary: the citizen identity gate plus
    /// field validation. No mutation, no external calls — run this before
    /// spending anything on classification. `create` re-runs both.
    pub fn admit(&self, author: &Actor, input: &NewComplaint) -> DeskResult<()> {
        citizen_gate(author)?;
        validate(input)?;
        Ok(())
    }

    /// Create a complaint in `Pending` with its classification attached.
    ///
    /// Citizen authors must have identity status `Verified` — every complaint
    /// may culminate in an FIR, so the gate sits at the single entry point.
    /// Officials file without the gate.
    pub fn create(
        &self,
        author: &Actor,
        input: NewComplaint,
        classification: Classification,
    ) -> DeskResult<Complaint> {
        citizen_gate(author)?;
        let incident_date = validate(&input)?;

        let now = Utc::now();
        let complaint = Complaint {
            id: ComplaintId::new(),
            created_at: now,
            updated_at: now,
            author: author.id,
            author_role: author.role,
            title: input.title.trim().to_string(),
            description: input.description,
            incident_type: input.incident_type.trim().to_string(),
            location: input.location.trim().to_string(),
            incident_date,
            incident_time: input.incident_time.trim().to_string(),
            evidence: input.evidence,
            ai_draft: input.ai_draft,
            classification,
            status: Status::Pending,
            assigned_officer: None,
            investigation_updates: Vec::new(),
        };

        let mut map = self.inner.lock().expect("complaint store poisoned");
        map.insert(complaint.id, complaint.clone());
        info!(
            target: "store",
            id = %complaint.id,
            category = %complaint.classification.category,
            "complaint created"
        );
        Ok(complaint)
    }

    pub fn get(&self, id: ComplaintId) -> DeskResult<Complaint> {
        let map = self.inner.lock().expect("complaint store poisoned");
        map.get(&id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound(format!("complaint {id}")))
    }

    /// Apply a status transition. Validation and mutation happen atomically
    /// under the map lock; on any error no partial mutation occurs.
    ///
    /// `set_officer` carries the admin's assignment and is only legal while
    /// moving into (or staying in) `FIR Registered`. The reassignment
    /// self-edge requires it.
    pub fn update_status(
        &self,
        actor: &Actor,
        id: ComplaintId,
        requested: Status,
        set_officer: Option<ActorId>,
    ) -> DeskResult<Complaint> {
        let mut map = self.inner.lock().expect("complaint store poisoned");
        let complaint = map
            .get_mut(&id)
            .ok_or_else(|| DeskError::NotFound(format!("complaint {id}")))?;

        workflow::authorize(&TransitionRequest {
            current: complaint.status,
            requested,
            actor_role: actor.role,
            actor_id: actor.id,
            assigned_officer: complaint.assigned_officer,
        })?;

        if set_officer.is_some() && !workflow::may_assign_officer(requested, actor.role) {
            return Err(DeskError::Validation(
                "an officer may be assigned only when registering or holding an FIR".into(),
            ));
        }
        if complaint.status == Status::FirRegistered
            && requested == Status::FirRegistered
            && set_officer.is_none()
        {
            return Err(DeskError::Validation(
                "reassignment requires an officer id".into(),
            ));
        }

        let previous = complaint.status;
        complaint.status = requested;
        if let Some(officer) = set_officer {
            complaint.assigned_officer = Some(officer);
        }
        complaint.updated_at = Utc::now();

        debug_assert!(
            complaint.assigned_officer.is_none() || complaint.status.allows_assignment(),
            "assignment invariant violated"
        );

        info!(
            target: "store",
            id = %complaint.id,
            from = %previous,
            to = %complaint.status,
            actor = %actor.id,
            "status updated"
        );
        Ok(complaint.clone())
    }

    /// Append one investigation note atomically. Notes are immutable once
    /// appended; complaints in a terminal state no longer accept notes (the
    /// ledger freezes with the case).
    pub fn append_note(
        &self,
        id: ComplaintId,
        author_name: &str,
        note: &str,
    ) -> DeskResult<Vec<InvestigationNote>> {
        let note = note.trim();
        if note.is_empty() {
            return Err(DeskError::Validation("note text is required".into()));
        }

        let mut map = self.inner.lock().expect("complaint store poisoned");
        let complaint = map
            .get_mut(&id)
            .ok_or_else(|| DeskError::NotFound(format!("complaint {id}")))?;

        if complaint.status.is_terminal() {
            return Err(DeskError::Validation(format!(
                "complaint is {}; the investigation ledger is closed",
                complaint.status
            )));
        }

        complaint.investigation_updates.push(InvestigationNote {
            note: note.to_string(),
            author_name: author_name.to_string(),
            at: Utc::now(),
        });
        complaint.updated_at = Utc::now();
        Ok(complaint.investigation_updates.clone())
    }

    /// Notes in canonical insertion order.
    pub fn notes(&self, id: ComplaintId) -> DeskResult<Vec<InvestigationNote>> {
        Ok(self.get(id)?.investigation_updates)
    }

    /// Full snapshot for the read-side projection. No side effects.
    pub fn snapshot(&self) -> Vec<Complaint> {
        let map = self.inner.lock().expect("complaint store poisoned");
        map.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("complaint store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn citizen_gate(author: &Actor) -> DeskResult<()> {
    if author.role == Role::Citizen && author.identity_status() != Some(IdentityStatus::Verified) {
        return Err(DeskError::Authorization(
            "citizen identity must be verified before filing a complaint".into(),
        ));
    }
    Ok(())
}

fn validate(input: &NewComplaint) -> DeskResult<NaiveDate> {
    fn required(field: &str, value: &str) -> DeskResult<()> {
        if value.trim().is_empty() {
            Err(DeskError::Validation(format!("{field} is required")))
        } else {
            Ok(())
        }
    }

    required("title", &input.title)?;
    required("description", &input.description)?;
    required("incident_type", &input.incident_type)?;
    required("location", &input.location)?;
    required("incident_date", &input.incident_date)?;
    required("incident_time", &input.incident_time)?;

    NaiveDate::parse_from_str(input.incident_date.trim(), "%Y-%m-%d").map_err(|_| {
        DeskError::Validation(format!(
            "incident_date `{}` is not a valid YYYY-MM-DD date",
            input.incident_date
        ))
    })
}
