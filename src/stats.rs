//! Read-side projection over the complaint store. Pure; no side effects.
//!
//! Feeds the admin dashboard and analytics charts: status overview, declared
//! vs. classified category distributions, severity spread, and monthly
//! filing trends.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::Complaint;

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    /// Citizen-declared incident types.
    pub by_incident_type: BTreeMap<String, u64>,
    /// Classifier output categories.
    pub by_crime_category: BTreeMap<String, u64>,
    pub by_severity: BTreeMap<String, u64>,
    /// `YYYY-MM` filing buckets.
    pub by_month: BTreeMap<String, u64>,
}

pub fn project(complaints: &[Complaint]) -> StatsSnapshot {
    let mut by_status = BTreeMap::new();
    let mut by_incident_type = BTreeMap::new();
    let mut by_crime_category = BTreeMap::new();
    let mut by_severity = BTreeMap::new();
    let mut by_month = BTreeMap::new();

    for c in complaints {
        bump(&mut by_status, c.status.label().to_string());
        bump(&mut by_incident_type, c.incident_type.clone());
        bump(
            &mut by_crime_category,
            c.classification.category.label().to_string(),
        );
        bump(
            &mut by_severity,
            c.classification.severity.label().to_string(),
        );
        bump(&mut by_month, c.created_at.format("%Y-%m").to_string());
    }

    StatsSnapshot {
        total: complaints.len() as u64,
        by_status,
        by_incident_type,
        by_crime_category,
        by_severity,
        by_month,
    }
}

fn bump(map: &mut BTreeMap<String, u64>, key: String) {
    *map.entry(key).or_insert(0) += 1;
}
