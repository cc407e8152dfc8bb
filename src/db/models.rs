//! Row types decoded straight from store round trips

use chrono::NaiveDate;
use sqlx::FromRow;

use crate::model::{
    AdverseEvent, Contract, Country, CoverageRate, DateRange, RecordOption, Vaccination,
};

#[derive(Debug, Clone, FromRow)]
pub struct CountryRow {
    pub country_id: i32,
    pub country_name: String,
    pub population: i64,
    pub region: Option<String>,
    pub income_level: Option<String>,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Country {
            country_id: row.country_id,
            country_name: row.country_name,
            population: row.population,
            region: row.region,
            income_level: row.income_level,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct VaccinationRow {
    pub vaccination_id: i32,
    pub country_id: i32,
    pub country_name: String,
    pub date_administered: NaiveDate,
    pub vaccine_type: String,
    pub age_group: String,
    pub dose_number: i32,
    pub doses_given: i32,
}

impl VaccinationRow {
    /// Convert database row to domain model
    pub fn into_domain(self) -> Result<Vaccination, String> {
        Ok(Vaccination {
            age_group: self.age_group.parse()?,
            vaccination_id: self.vaccination_id,
            country_id: self.country_id,
            country_name: self.country_name,
            date_administered: self.date_administered,
            vaccine_type: self.vaccine_type,
            dose_number: self.dose_number,
            doses_given: self.doses_given,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ContractRow {
    pub contract_id: i32,
    pub country_id: i32,
    pub country_name: String,
    pub total_doses: i64,
    pub price_per_dose: f64,
    pub manufacturer: String,
    pub contract_date: NaiveDate,
}

impl From<ContractRow> for Contract {
    fn from(row: ContractRow) -> Self {
        Contract {
            contract_id: row.contract_id,
            country_id: row.country_id,
            country_name: row.country_name,
            total_doses: row.total_doses,
            price_per_dose: row.price_per_dose,
            manufacturer: row.manufacturer,
            contract_date: row.contract_date,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AdverseEventRow {
    pub event_id: i32,
    pub vaccination_id: Option<i32>,
    pub country_id: i32,
    pub country_name: String,
    pub severity: String,
    pub description: String,
    pub resolved: bool,
}

impl AdverseEventRow {
    /// Convert database row to domain model
    pub fn into_domain(self) -> Result<AdverseEvent, String> {
        Ok(AdverseEvent {
            severity: self.severity.parse()?,
            event_id: self.event_id,
            vaccination_id: self.vaccination_id,
            country_id: self.country_id,
            country_name: self.country_name,
            description: self.description,
            resolved: self.resolved,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OptionRow {
    pub id: i32,
    pub label: String,
}

impl From<OptionRow> for RecordOption {
    fn from(row: OptionRow) -> Self {
        RecordOption {
            id: row.id,
            label: row.label,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CountRow {
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DateRangeRow {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl From<DateRangeRow> for DateRange {
    fn from(row: DateRangeRow) -> Self {
        DateRange {
            min_date: row.min_date,
            max_date: row.max_date,
        }
    }
}

/// Coverage up to a cut-off date; the rate is absent for a zero population
#[derive(Debug, Clone, FromRow)]
pub struct CoverageRateRow {
    pub country_name: String,
    pub population: i64,
    pub region: Option<String>,
    pub income_level: Option<String>,
    pub total_doses_given: i64,
    pub vaccination_rate: Option<f64>,
}

impl CoverageRateRow {
    /// Keep the row only when its rate is a displayable percentage
    pub fn into_displayable(self) -> Option<CoverageRate> {
        let rate = self.vaccination_rate?;
        if !(0.0..=100.0).contains(&rate) {
            return None;
        }
        Some(CoverageRate {
            country_name: self.country_name,
            population: self.population,
            region: self.region,
            income_level: self.income_level,
            total_doses_given: self.total_doses_given,
            vaccination_rate: rate,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RevenueRow {
    pub country_name: String,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DeliveryRow {
    pub contract_id: i32,
    pub country_name: String,
    pub total_doses: i64,
    pub shipped: i64,
    pub delivery_rate_percent: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct CountryCoverageRow {
    pub country_name: String,
    pub total_doses_administered: i64,
    pub population: i64,
    pub coverage_percent: Option<f64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SevereEventsRow {
    pub country_name: String,
    pub severe_events: i64,
    pub total_doses: i64,
    pub events_per_million: Option<f64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct EfficacyRow {
    pub phase: String,
    pub avg_efficacy: Option<f64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ParticipantsRow {
    pub income_level: Option<String>,
    pub total_participants: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DailyDosesRow {
    pub date_administered: NaiveDate,
    pub total_given: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct AgeGroupDosesRow {
    pub age_group: String,
    pub total_doses: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct MonthlyDosesRow {
    pub month: String,
    pub total_doses: i64,
}
