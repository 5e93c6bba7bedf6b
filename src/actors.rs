//! Single polymorphic actor directory.
//!
//! Citizens, officers, and admins live in one map behind one lookup — callers
//! never probe per-role collections. The directory also records the
//! admin-only identity decision: exactly once per citizen, `Pending ->
//! Verified` or `Pending -> Rejected`, with an immutable remark attached.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use crate::error::{DeskError, DeskResult};
use crate::model::{Actor, ActorId, CitizenIdentity, DocumentScan, IdentityStatus, Role};

#[derive(Debug, Default)]
pub struct ActorDirectory {
    inner: Mutex<HashMap<ActorId, Actor>>,
}

impl ActorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ActorId) -> DeskResult<Actor> {
        let map = self.inner.lock().expect("actor directory poisoned");
        map.get(&id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound(format!("actor {id}")))
    }

    /// Register a citizen with identity status `Pending` and the optional
    /// document-scan bundle for later decision support.
    pub fn register_citizen(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        scan: Option<DocumentScan>,
    ) -> DeskResult<Actor> {
        required("name", name)?;
        required("email", email)?;

        let actor = Actor {
            id: ActorId::new(),
            role: Role::Citizen,
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
            badge_id: None,
            identity: Some(CitizenIdentity::pending(scan)),
        };
        self.insert_unique(actor)
    }

    /// Admin-only officer registration; badge ids are unique.
    pub fn register_officer(
        &self,
        requested_by: &Actor,
        name: &str,
        email: &str,
        phone: &str,
        badge_id: &str,
    ) -> DeskResult<Actor> {
        if requested_by.role != Role::Admin {
            return Err(DeskError::Authorization(
                "only admins may register officers".into(),
            ));
        }
        required("name", name)?;
        required("email", email)?;
        required("badge_id", badge_id)?;

        let actor = Actor {
            id: ActorId::new(),
            role: Role::Officer,
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
            badge_id: Some(badge_id.trim().to_string()),
            identity: None,
        };
        self.insert_unique(actor)
    }

    /// Bootstrap path; admin provisioning is outside the core's auth scope.
    pub fn register_admin(&self, name: &str, email: &str, phone: &str) -> DeskResult<Actor> {
        required("name", name)?;
        required("email", email)?;
        let actor = Actor {
            id: ActorId::new(),
            role: Role::Admin,
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
            badge_id: None,
            identity: None,
        };
        self.insert_unique(actor)
    }

    /// Record the manual identity verdict. Admin-only, target must be a
    /// citizen still `Pending`, and the decision is written exactly once.
    pub fn decide_identity(
        &self,
        decided_by: &Actor,
        citizen: ActorId,
        decision: IdentityStatus,
        remark: &str,
    ) -> DeskResult<Actor> {
        if decided_by.role != Role::Admin {
            return Err(DeskError::Authorization(
                "only admins may decide identity verification".into(),
            ));
        }
        if decision == IdentityStatus::Pending {
            return Err(DeskError::Validation(
                "identity decision must be Verified or Rejected".into(),
            ));
        }

        let mut map = self.inner.lock().expect("actor directory poisoned");
        let actor = map
            .get_mut(&citizen)
            .ok_or_else(|| DeskError::NotFound(format!("actor {citizen}")))?;
        let identity = actor.identity.as_mut().ok_or_else(|| {
            DeskError::Validation("identity decisions apply to citizens only".into())
        })?;
        if identity.status != IdentityStatus::Pending {
            return Err(DeskError::Validation(
                "identity decision has already been recorded".into(),
            ));
        }

        identity.status = decision;
        identity.remark = remark.trim().to_string();
        info!(
            target: "identity",
            citizen = %citizen,
            decided_by = %decided_by.id,
            verified = (decision == IdentityStatus::Verified),
            "identity decision recorded"
        );
        Ok(actor.clone())
    }

    /// Uniqueness checks and the insert happen under one lock acquisition, so
    /// two concurrent registrations can never both pass a check and both land.
    fn insert_unique(&self, actor: Actor) -> DeskResult<Actor> {
        let mut map = self.inner.lock().expect("actor directory poisoned");
        if map.values().any(|a| a.email == actor.email) {
            return Err(DeskError::Validation(format!(
                "email `{}` is already registered",
                actor.email
            )));
        }
        if let Some(badge) = actor.badge_id.as_deref() {
            if map.values().any(|a| a.badge_id.as_deref() == Some(badge)) {
                return Err(DeskError::Validation(format!(
                    "badge id `{badge}` is already registered"
                )));
            }
        }
        map.insert(actor.id, actor.clone());
        Ok(actor)
    }
}

fn required(field: &str, value: &str) -> DeskResult<()> {
    if value.trim().is_empty() {
        Err(DeskError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}
