//! Record types for the vaccination, contract and adverse event tables

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::table::{Cell, TabularRow};

/// Age bucket a vaccination is recorded against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AgeGroup {
    #[serde(rename = "0-17")]
    Minor,
    #[serde(rename = "18-30")]
    YoungAdult,
    #[serde(rename = "31-50")]
    Adult,
    #[serde(rename = "51-70")]
    MiddleAged,
    #[serde(rename = "70+")]
    Senior,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Minor,
        AgeGroup::YoungAdult,
        AgeGroup::Adult,
        AgeGroup::MiddleAged,
        AgeGroup::Senior,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgeGroup::Minor => "0-17",
            AgeGroup::YoungAdult => "18-30",
            AgeGroup::Adult => "31-50",
            AgeGroup::MiddleAged => "51-70",
            AgeGroup::Senior => "70+",
        }
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown age group: {}", s))
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adverse event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown severity: {}", s))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference country row
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Country {
    pub country_id: i32,
    pub country_name: String,
    pub population: i64,
    pub region: Option<String>,
    pub income_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Vaccination {
    pub vaccination_id: i32,
    pub country_id: i32,
    pub country_name: String,
    pub date_administered: NaiveDate,
    pub vaccine_type: String,
    pub age_group: AgeGroup,
    pub dose_number: i32,
    pub doses_given: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Contract {
    pub contract_id: i32,
    pub country_id: i32,
    pub country_name: String,
    pub total_doses: i64,
    pub price_per_dose: f64,
    pub manufacturer: String,
    pub contract_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdverseEvent {
    pub event_id: i32,
    pub vaccination_id: Option<i32>,
    pub country_id: i32,
    pub country_name: String,
    pub severity: Severity,
    pub description: String,
    pub resolved: bool,
}

/// Selectable record in the update and delete forms
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecordOption {
    pub id: i32,
    pub label: String,
}

fn default_dose_number() -> i32 {
    1
}

fn default_doses_given() -> i32 {
    1
}

/// Vaccination form submission
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewVaccination {
    /// Country name as listed by `/v1/countries`
    pub country: String,
    pub date_administered: NaiveDate,
    pub vaccine_type: String,
    pub age_group: AgeGroup,
    #[serde(default = "default_dose_number")]
    pub dose_number: i32,
    #[serde(default = "default_doses_given")]
    pub doses_given: i32,
}

/// Contract form submission
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewContract {
    pub country: String,
    pub total_doses: i64,
    pub price_per_dose: f64,
    pub manufacturer: String,
    pub contract_date: NaiveDate,
}

/// Adverse event form submission
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAdverseEvent {
    pub country: String,
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resolved: bool,
    /// Vaccination record the event followed, when known
    #[serde(default)]
    pub vaccination_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VaccineTypeUpdate {
    pub vaccine_type: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PriceUpdate {
    pub price_per_dose: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResolvedUpdate {
    pub resolved: bool,
}

/// Vaccinations view filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VaccinationFilter {
    /// Empty means every age group
    pub age_groups: Vec<AgeGroup>,
    pub country: Option<String>,
}

/// Contracts view filter
#[derive(Debug, Clone, PartialEq)]
pub struct ContractFilter {
    pub max_price: f64,
}

/// Adverse events view filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdverseEventFilter {
    /// Empty means every severity
    pub severities: Vec<Severity>,
}

impl TabularRow for Vaccination {
    fn headers() -> &'static [&'static str] {
        &[
            "vaccination_id",
            "country_id",
            "country_name",
            "date_administered",
            "vaccine_type",
            "age_group",
            "dose_number",
            "doses_given",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.vaccination_id.into()),
            Cell::Integer(self.country_id.into()),
            Cell::Text(self.country_name.clone()),
            Cell::Date(self.date_administered),
            Cell::Text(self.vaccine_type.clone()),
            Cell::Text(self.age_group.to_string()),
            Cell::Integer(self.dose_number.into()),
            Cell::Integer(self.doses_given.into()),
        ]
    }
}

impl TabularRow for Contract {
    fn headers() -> &'static [&'static str] {
        &[
            "contract_id",
            "country_id",
            "country_name",
            "total_doses",
            "price_per_dose",
            "manufacturer",
            "contract_date",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.contract_id.into()),
            Cell::Integer(self.country_id.into()),
            Cell::Text(self.country_name.clone()),
            Cell::Integer(self.total_doses),
            Cell::Number(self.price_per_dose),
            Cell::Text(self.manufacturer.clone()),
            Cell::Date(self.contract_date),
        ]
    }
}

impl TabularRow for AdverseEvent {
    fn headers() -> &'static [&'static str] {
        &[
            "event_id",
            "vaccination_id",
            "country_id",
            "country_name",
            "severity",
            "description",
            "resolved",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.event_id.into()),
            self.vaccination_id
                .map_or(Cell::Empty, |id| Cell::Integer(id.into())),
            Cell::Integer(self.country_id.into()),
            Cell::Text(self.country_name.clone()),
            Cell::Text(self.severity.to_string()),
            Cell::Text(self.description.clone()),
            Cell::Bool(self.resolved),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_group_labels_round_trip() {
        for group in AgeGroup::ALL {
            assert_eq!(group.as_str().parse::<AgeGroup>().unwrap(), group);
        }
        assert!("90+".parse::<AgeGroup>().is_err());
    }

    #[test]
    fn test_age_group_serde_uses_labels() {
        let json = serde_json::to_string(&AgeGroup::Senior).unwrap();
        assert_eq!(json, "\"70+\"");
        let parsed: AgeGroup = serde_json::from_str("\"18-30\"").unwrap();
        assert_eq!(parsed, AgeGroup::YoungAdult);
    }

    #[test]
    fn test_severity_parse_is_case_insensitive() {
        assert_eq!("severe".parse::<Severity>().unwrap(), Severity::Severe);
        assert_eq!(" Mild ".parse::<Severity>().unwrap(), Severity::Mild);
        assert!("Critical".parse::<Severity>().is_err());
    }

    #[test]
    fn test_new_vaccination_defaults() {
        let form: NewVaccination = serde_json::from_value(serde_json::json!({
            "country": "Kenya",
            "date_administered": "2021-06-01",
            "vaccine_type": "mRNA-1273",
            "age_group": "31-50"
        }))
        .unwrap();

        assert_eq!(form.dose_number, 1);
        assert_eq!(form.doses_given, 1);
        assert_eq!(form.age_group, AgeGroup::Adult);
    }

    #[test]
    fn test_adverse_event_cells_leave_missing_vaccination_empty() {
        let event = AdverseEvent {
            event_id: 4,
            vaccination_id: None,
            country_id: 2,
            country_name: "Brazil".to_string(),
            severity: Severity::Moderate,
            description: "Fever".to_string(),
            resolved: true,
        };

        let cells = event.cells();
        assert_eq!(cells.len(), AdverseEvent::headers().len());
        assert_eq!(cells[1], Cell::Empty);
        assert_eq!(cells[6], Cell::Bool(true));
    }
}
