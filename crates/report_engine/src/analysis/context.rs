use crate::analysis::classifier::{TeamCapacityStatus, classify_teams, team_label_map};
use crate::ingest::IngestResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::models::records::{CitizenRecord, HouseholdRecord, ProductivityRecord};
use shared::models::registry::MunicipalParameters;
use std::collections::HashMap;

/// Inclusive date window applied to productivity records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Dimension the citizen crosstabs group by: facilities across the whole
/// municipality, or teams once a single facility is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupDimension {
    Facility,
    Team,
}

/// Immutable snapshot of one analysis interaction: the active municipal
/// parameters, the filters, the filtered record sets and the classified
/// team table. Rebuilt per user action, never mutated in place; every
/// aggregation reads from it.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    params: MunicipalParameters,
    facility: Option<String>,
    period: Option<DateRange>,
    citizens: Vec<CitizenRecord>,
    households: Vec<HouseholdRecord>,
    productivity: Vec<ProductivityRecord>,
    teams: Vec<TeamCapacityStatus>,
    team_labels: HashMap<String, String>,
}

impl AnalysisContext {
    pub fn new(
        data: &IngestResult,
        params: MunicipalParameters,
        facility: Option<String>,
        period: Option<DateRange>,
    ) -> Self {
        let citizens: Vec<CitizenRecord> = match &facility {
            Some(unidade) => data
                .citizens
                .iter()
                .filter(|c| &c.unidade == unidade)
                .cloned()
                .collect(),
            None => data.citizens.clone(),
        };
        // With a window active, undated rows drop out; without one every
        // row passes, dated or not.
        let productivity: Vec<ProductivityRecord> = match &period {
            Some(range) => data
                .productivity
                .iter()
                .filter(|p| p.data.is_some_and(|d| range.contains(d)))
                .cloned()
                .collect(),
            None => data.productivity.clone(),
        };
        let teams = classify_teams(&citizens, &params);
        let team_labels = team_label_map(&teams);
        Self {
            params,
            facility,
            period,
            citizens,
            households: data.households.clone(),
            productivity,
            teams,
            team_labels,
        }
    }

    pub fn params(&self) -> &MunicipalParameters {
        &self.params
    }

    pub fn facility(&self) -> Option<&str> {
        self.facility.as_deref()
    }

    pub fn period(&self) -> Option<DateRange> {
        self.period
    }

    pub fn citizens(&self) -> &[CitizenRecord] {
        &self.citizens
    }

    pub fn households(&self) -> &[HouseholdRecord] {
        &self.households
    }

    pub fn productivity(&self) -> &[ProductivityRecord] {
        &self.productivity
    }

    /// Classified teams, descending by enrolled count.
    pub fn teams(&self) -> &[TeamCapacityStatus] {
        &self.teams
    }

    pub fn group_dimension(&self) -> GroupDimension {
        if self.facility.is_some() {
            GroupDimension::Team
        } else {
            GroupDimension::Facility
        }
    }

    /// Grouping label of one citizen row under the active dimension:
    /// the facility name, or the team display label once a facility is
    /// selected (falling back to the composite key for teams the
    /// classifier has not seen).
    pub fn citizen_group_label(&self, citizen: &CitizenRecord) -> String {
        match self.group_dimension() {
            GroupDimension::Facility => citizen.unidade.clone(),
            GroupDimension::Team => self
                .team_labels
                .get(&citizen.equipe_completa)
                .cloned()
                .unwrap_or_else(|| citizen.equipe_completa.clone()),
        }
    }

    /// Distinct facility names in the citizen set, sorted, for filter
    /// controls.
    pub fn facility_names(data: &IngestResult) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for citizen in &data.citizens {
            if !names.contains(&citizen.unidade) {
                names.push(citizen.unidade.clone());
            }
        }
        names.sort();
        names
    }

    /// Date bounds of the dated productivity rows, for period controls.
    pub fn date_bounds(data: &IngestResult) -> Option<DateRange> {
        let mut dates = data.productivity.iter().filter_map(|p| p.data);
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DateRange::new(start, end))
    }
}
