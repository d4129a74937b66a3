//! Division grouping

use crate::error::{Result, StandingsError};
use crate::store::DivisionRegistry;
use crate::types::{ScopeView, StandingsRow};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Partitions standings rows by the registry's per-season divisions
pub struct DivisionGrouper<'a> {
    registry: &'a dyn DivisionRegistry,
    unknown_division: &'a str,
}

impl<'a> DivisionGrouper<'a> {
    pub fn new(registry: &'a dyn DivisionRegistry, unknown_division: &'a str) -> Self {
        Self { registry, unknown_division }
    }

    /// Group rows by division name.
    ///
    /// Season-spanning views put every row in one division named `""`.
    /// Teams the registry does not list land in the unknown division.
    pub fn group(
        &self,
        rows: Vec<StandingsRow>,
        view: &ScopeView,
    ) -> Result<BTreeMap<String, Vec<StandingsRow>>> {
        let mut grouped: BTreeMap<String, Vec<StandingsRow>> = BTreeMap::new();

        let ScopeView::Season { season, .. } = view else {
            for mut row in rows {
                row.division = String::new();
                grouped.entry(String::new()).or_default().push(row);
            }
            return Ok(grouped);
        };

        let divisions = self.registry.divisions_for(*season).map_err(|e| match e {
            StandingsError::DataUnavailable(_) => e,
            other => StandingsError::data_unavailable(format!(
                "division registry failed for {season}: {other}"
            )),
        })?;

        let mut team_division: HashMap<&str, &str> = HashMap::new();
        for (division, teams) in &divisions {
            for team in teams {
                if let Some(existing) = team_division.insert(team.as_str(), division.as_str()) {
                    debug!("{} listed in both {} and {} for {}", team, existing, division, season);
                    team_division.insert(team.as_str(), existing);
                }
            }
        }

        for mut row in rows {
            let division = match team_division.get(row.team.as_str()) {
                Some(division) => division.to_string(),
                None => {
                    warn!("No division for {} in {}, using {}", row.team, season, self.unknown_division);
                    self.unknown_division.to_string()
                }
            };
            row.division = division.clone();
            grouped.entry(division).or_default().push(row);
        }

        Ok(grouped)
    }
}
