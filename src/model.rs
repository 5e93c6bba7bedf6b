//! Domain types: complaints, actors, classification results and their wire forms.
//!
//! Everything here is plain data. Mutation rules live in `store` / `workflow` /
//! `investigation`; this module only enforces the value-level invariants
//! (e.g. a classification with provenance `unset` always carries confidence 0).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplaintId(pub Uuid);

impl ComplaintId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ComplaintId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Closed crime-category set. `Unclassified` is the storage default for a
/// fresh complaint; the classifier itself never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrimeCategory {
    Theft,
    #[serde(rename = "Cyber Crime")]
    CyberCrime,
    Harassment,
    #[serde(rename = "Lost Property")]
    LostProperty,
    Fraud,
    Robbery,
    Assault,
    Other,
    Unclassified,
}

impl CrimeCategory {
    /// Categories the classifier may return (priority order is defined by the
    /// keyword table, not by this list).
    pub const CLASSIFIABLE: [CrimeCategory; 8] = [
        CrimeCategory::Theft,
        CrimeCategory::CyberCrime,
        CrimeCategory::Harassment,
        CrimeCategory::LostProperty,
        CrimeCategory::Fraud,
        CrimeCategory::Robbery,
        CrimeCategory::Assault,
        CrimeCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CrimeCategory::Theft => "Theft",
            CrimeCategory::CyberCrime => "Cyber Crime",
            CrimeCategory::Harassment => "Harassment",
            CrimeCategory::LostProperty => "Lost Property",
            CrimeCategory::Fraud => "Fraud",
            CrimeCategory::Robbery => "Robbery",
            CrimeCategory::Assault => "Assault",
            CrimeCategory::Other => "Other",
            CrimeCategory::Unclassified => "Unclassified",
        }
    }

    /// Case-insensitive lookup against the classifiable set. Unknown labels
    /// return `None`; callers decide whether that collapses to `Other`.
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::CLASSIFIABLE
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for CrimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Unknown,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Unknown => "Unknown",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        [Severity::Low, Severity::Medium, Severity::High]
            .into_iter()
            .find(|v| v.label().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "rule-matched")]
    RuleMatched,
    #[serde(rename = "ai-inferred")]
    AiInferred,
    #[serde(rename = "unset")]
    Unset,
}

/// Classification value object attached to a complaint at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: CrimeCategory,
    pub severity: Severity,
    /// Confidence in [0,1]; always 0 while provenance is `unset`.
    pub confidence: f32,
    pub provenance: Provenance,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            category: CrimeCategory::Unclassified,
            severity: Severity::Unknown,
            confidence: 0.0,
            provenance: Provenance::Unset,
        }
    }
}

impl Classification {
    pub fn rule_matched(category: CrimeCategory, confidence: f32) -> Self {
        Self {
            category,
            // Rules do not attempt severity grading.
            severity: Severity::Medium,
            confidence: clamp01(confidence),
            provenance: Provenance::RuleMatched,
        }
    }

    pub fn ai_inferred(category: CrimeCategory, severity: Severity, confidence: f32) -> Self {
        Self {
            category,
            severity,
            confidence: clamp01(confidence),
            provenance: Provenance::AiInferred,
        }
    }
}

pub(crate) fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

// ---------------------------------------------------------------------------
// Workflow status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Pending,
    #[serde(rename = "Under Review")]
    UnderReview,
    #[serde(rename = "FIR Registered")]
    FirRegistered,
    #[serde(rename = "Solved by Officer")]
    SolvedByOfficer,
    Resolved,
    Rejected,
}

impl Status {
    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Resolved | Status::Rejected)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::UnderReview => "Under Review",
            Status::FirRegistered => "FIR Registered",
            Status::SolvedByOfficer => "Solved by Officer",
            Status::Resolved => "Resolved",
            Status::Rejected => "Rejected",
        }
    }

    /// `assigned_officer` may be non-null only in these states.
    pub fn allows_assignment(&self) -> bool {
        matches!(
            self,
            Status::FirRegistered | Status::SolvedByOfficer | Status::Resolved
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Officer,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityStatus {
    Pending,
    Verified,
    Rejected,
}

/// Flags derived from the external OCR collaborator. Decision support only;
/// the admin verdict is a separate, manual action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentScan {
    pub has_identifier_word: bool,
    pub has_numeric_pattern: bool,
    pub has_date_of_birth_pattern: bool,
    pub raw_text: String,
}

/// Citizen-only identity verification state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenIdentity {
    pub status: IdentityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan: Option<DocumentScan>,
    pub remark: String,
}

impl CitizenIdentity {
    pub fn pending(scan: Option<DocumentScan>) -> Self {
        Self {
            status: IdentityStatus::Pending,
            scan,
            remark: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Officers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_id: Option<String>,
    /// Citizens only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<CitizenIdentity>,
}

impl Actor {
    pub fn identity_status(&self) -> Option<IdentityStatus> {
        self.identity.as_ref().map(|i| i.status)
    }
}

// ---------------------------------------------------------------------------
// Complaints
// ---------------------------------------------------------------------------

/// One investigation note. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationNote {
    pub note: String,
    pub author_name: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Authorship; role is denormalized at submission time and never changes.
    pub author: ActorId,
    pub author_role: Role,

    // Content as submitted.
    pub title: String,
    pub description: String,
    /// Citizen-declared incident category (free label, not the classifier's).
    pub incident_type: String,
    pub location: String,
    pub incident_date: NaiveDate,
    pub incident_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_draft: Option<String>,

    pub classification: Classification,

    pub status: Status,
    pub assigned_officer: Option<ActorId>,

    /// Append-only, insertion order is canonical.
    pub investigation_updates: Vec<InvestigationNote>,
}
