//! # Workflow engine
//! Pure, testable transition logic over complaint status. No I/O.
//!
//! Every role-conditioned check lives in this one table instead of being
//! scattered across handlers. Evaluation order matters for error taxonomy:
//! a missing edge is `InvalidTransition` (including any attempt to leave a
//! terminal state); an existing edge requested by the wrong role — or by an
//! officer who is not the assignee — is `Authorization`.

use crate::error::{DeskError, DeskResult};
use crate::model::{ActorId, Role, Status};

/// One request to move a complaint between states, as seen by the engine.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRequest {
    pub current: Status,
    pub requested: Status,
    pub actor_role: Role,
    pub actor_id: ActorId,
    /// The complaint's current assignee, if any.
    pub assigned_officer: Option<ActorId>,
}

/// Role(s) allowed to take an edge. Officer edges additionally require the
/// identity match, checked in `authorize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    AdminOnly,
    AssignedOfficerOnly,
}

/// The edge set. `FIR Registered -> FIR Registered` is the admin reassignment
/// self-edge (set/replace the assignee while the FIR is open).
fn edge_gate(current: Status, requested: Status) -> Option<Gate> {
    use Status::*;
    match (current, requested) {
        (Pending, UnderReview) => Some(Gate::AdminOnly),
        (Pending | UnderReview, FirRegistered) => Some(Gate::AdminOnly),
        (Pending | UnderReview, Rejected) => Some(Gate::AdminOnly),
        (FirRegistered, FirRegistered) => Some(Gate::AdminOnly),
        (FirRegistered, SolvedByOfficer) => Some(Gate::AssignedOfficerOnly),
        (SolvedByOfficer, Resolved) => Some(Gate::AdminOnly),
        _ => None,
    }
}

/// Validate a transition request. Returns `Ok(())` when the caller may apply
/// it; otherwise the precise failure. Performs no mutation.
pub fn authorize(req: &TransitionRequest) -> DeskResult<()> {
    let gate = edge_gate(req.current, req.requested).ok_or(DeskError::InvalidTransition {
        from: req.current,
        to: req.requested,
    })?;

    match gate {
        Gate::AdminOnly => {
            if req.actor_role != Role::Admin {
                return Err(DeskError::Authorization(format!(
                    "role `{:?}` may not move a complaint from {} to {}",
                    req.actor_role, req.current, req.requested
                )));
            }
        }
        Gate::AssignedOfficerOnly => {
            if req.actor_role != Role::Officer {
                return Err(DeskError::Authorization(format!(
                    "role `{:?}` may not mark a complaint solved",
                    req.actor_role
                )));
            }
            if req.assigned_officer != Some(req.actor_id) {
                return Err(DeskError::Authorization(
                    "only the assigned officer may mark this complaint solved".into(),
                ));
            }
        }
    }
    Ok(())
}

/// May `role` set `assigned_officer` as part of this transition? Only admins,
/// and only when the complaint is moving into (or staying in) FIR Registered.
pub fn may_assign_officer(requested: Status, role: Role) -> bool {
    role == Role::Admin && requested == Status::FirRegistered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(
        current: Status,
        requested: Status,
        actor_role: Role,
        actor_id: ActorId,
        assigned_officer: Option<ActorId>,
    ) -> TransitionRequest {
        TransitionRequest {
            current,
            requested,
            actor_role,
            actor_id,
            assigned_officer,
        }
    }

    #[test]
    fn admin_registers_fir_from_pending_and_under_review() {
        let admin = ActorId::new();
        for from in [Status::Pending, Status::UnderReview] {
            assert!(authorize(&req(from, Status::FirRegistered, Role::Admin, admin, None)).is_ok());
            assert!(authorize(&req(from, Status::Rejected, Role::Admin, admin, None)).is_ok());
        }
    }

    #[test]
    fn officer_may_not_register_fir() {
        let officer = ActorId::new();
        let err = authorize(&req(
            Status::Pending,
            Status::FirRegistered,
            Role::Officer,
            officer,
            None,
        ))
        .unwrap_err();
        assert!(matches!(err, DeskError::Authorization(_)));
    }

    #[test]
    fn citizen_may_never_change_status() {
        let citizen = ActorId::new();
        let err = authorize(&req(
            Status::Pending,
            Status::UnderReview,
            Role::Citizen,
            citizen,
            None,
        ))
        .unwrap_err();
        assert!(matches!(err, DeskError::Authorization(_)));
    }

    #[test]
    fn solved_requires_the_assigned_officer() {
        let officer_x = ActorId::new();
        let officer_y = ActorId::new();

        // Officer Y, not the assignee: authorization failure.
        let err = authorize(&req(
            Status::FirRegistered,
            Status::SolvedByOfficer,
            Role::Officer,
            officer_y,
            Some(officer_x),
        ))
        .unwrap_err();
        assert!(matches!(err, DeskError::Authorization(_)));

        // Officer X, the assignee: allowed.
        assert!(authorize(&req(
            Status::FirRegistered,
            Status::SolvedByOfficer,
            Role::Officer,
            officer_x,
            Some(officer_x),
        ))
        .is_ok());

        // Unassigned FIR: nobody can mark it solved.
        let err = authorize(&req(
            Status::FirRegistered,
            Status::SolvedByOfficer,
            Role::Officer,
            officer_x,
            None,
        ))
        .unwrap_err();
        assert!(matches!(err, DeskError::Authorization(_)));
    }

    #[test]
    fn admin_approves_closure() {
        let admin = ActorId::new();
        assert!(authorize(&req(
            Status::SolvedByOfficer,
            Status::Resolved,
            Role::Admin,
            admin,
            Some(ActorId::new()),
        ))
        .is_ok());
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        let admin = ActorId::new();
        for from in [Status::Resolved, Status::Rejected] {
            for to in [
                Status::Pending,
                Status::UnderReview,
                Status::FirRegistered,
                Status::SolvedByOfficer,
                Status::Resolved,
                Status::Rejected,
            ] {
                let err = authorize(&req(from, to, Role::Admin, admin, None)).unwrap_err();
                assert!(
                    matches!(err, DeskError::InvalidTransition { .. }),
                    "expected InvalidTransition for {} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn missing_edges_are_invalid_even_for_admins() {
        let admin = ActorId::new();
        // Skipping straight to Resolved is not an edge.
        let err = authorize(&req(
            Status::Pending,
            Status::Resolved,
            Role::Admin,
            admin,
            None,
        ))
        .unwrap_err();
        assert!(matches!(err, DeskError::InvalidTransition { .. }));

        // FIRs cannot be rejected; they close through the officer path.
        let err = authorize(&req(
            Status::FirRegistered,
            Status::Rejected,
            Role::Admin,
            admin,
            None,
        ))
        .unwrap_err();
        assert!(matches!(err, DeskError::InvalidTransition { .. }));
    }

    #[test]
    fn assignment_gate() {
        assert!(may_assign_officer(Status::FirRegistered, Role::Admin));
        assert!(!may_assign_officer(Status::FirRegistered, Role::Officer));
        assert!(!may_assign_officer(Status::Resolved, Role::Admin));
        assert!(!may_assign_officer(Status::Pending, Role::Admin));
    }
}
