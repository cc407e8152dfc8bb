//! Record forms and filtered table views
//!
//! Form input is held to the same limits the original entry widgets had
//! (minimum contract size, non-negative prices, fixed choice lists). Nothing
//! beyond that is checked here; the schema enforces the rest.

use crate::db::repository::RecordRepository;
use crate::db::{DbError, Store};
use crate::model::{
    AdverseEvent, AdverseEventFilter, AgeGroup, Contract, ContractFilter, Country,
    NewAdverseEvent, NewContract, NewVaccination, RecordCounts, RecordOption, Severity,
    Vaccination, VaccinationFilter,
};

pub const MIN_CONTRACT_DOSES: i64 = 1000;
pub const MAX_PRICE_FILTER: f64 = 50.0;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    #[error("Unknown vaccination: {0}")]
    UnknownVaccination(i32),

    #[error("{table} record {id} not found")]
    NotFound { table: &'static str, id: i32 },

    #[error("{table} record {id} still has {dependents}")]
    InUse {
        table: &'static str,
        id: i32,
        dependents: &'static str,
    },

    #[error(transparent)]
    Db(#[from] DbError),
}

fn required_text(field: &str, value: &str) -> Result<String, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn price(value: f64) -> Result<f64, RecordError> {
    if !value.is_finite() || value < 0.0 {
        return Err(RecordError::Invalid(format!(
            "price_per_dose must be a non-negative number, got {}",
            value
        )));
    }
    Ok(value)
}

pub fn validate_vaccination(form: NewVaccination) -> Result<NewVaccination, RecordError> {
    if form.dose_number < 1 {
        return Err(RecordError::Invalid("dose_number must be at least 1".to_string()));
    }
    if form.doses_given < 0 {
        return Err(RecordError::Invalid("doses_given must not be negative".to_string()));
    }
    Ok(NewVaccination {
        country: required_text("country", &form.country)?,
        vaccine_type: required_text("vaccine_type", &form.vaccine_type)?,
        ..form
    })
}

pub fn validate_contract(form: NewContract) -> Result<NewContract, RecordError> {
    if form.total_doses < MIN_CONTRACT_DOSES {
        return Err(RecordError::Invalid(format!(
            "total_doses must be at least {}",
            MIN_CONTRACT_DOSES
        )));
    }
    Ok(NewContract {
        country: required_text("country", &form.country)?,
        manufacturer: required_text("manufacturer", &form.manufacturer)?,
        price_per_dose: price(form.price_per_dose)?,
        ..form
    })
}

pub fn validate_adverse_event(form: NewAdverseEvent) -> Result<NewAdverseEvent, RecordError> {
    Ok(NewAdverseEvent {
        country: required_text("country", &form.country)?,
        description: form.description.trim().to_string(),
        ..form
    })
}

/// Comma separated choice list; blank means no filter
fn parse_choices<T>(raw: Option<&str>) -> Result<Vec<T>, RecordError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(RecordError::Invalid))
        .collect()
}

pub fn vaccination_filter(
    age_groups: Option<&str>,
    country: Option<&str>,
) -> Result<VaccinationFilter, RecordError> {
    Ok(VaccinationFilter {
        age_groups: parse_choices::<AgeGroup>(age_groups)?,
        country: country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
    })
}

pub fn contract_filter(max_price: Option<f64>, default: f64) -> Result<ContractFilter, RecordError> {
    let max_price = max_price.unwrap_or_else(|| default.clamp(0.0, MAX_PRICE_FILTER));
    if !(0.0..=MAX_PRICE_FILTER).contains(&max_price) {
        return Err(RecordError::Invalid(format!(
            "max_price must be between 0 and {}",
            MAX_PRICE_FILTER
        )));
    }
    Ok(ContractFilter { max_price })
}

pub fn adverse_event_filter(severities: Option<&str>) -> Result<AdverseEventFilter, RecordError> {
    Ok(AdverseEventFilter {
        severities: parse_choices::<Severity>(severities)?,
    })
}

/// Service behind the Add Data, View Data, Update and Delete views
pub struct RecordService {
    store: Store,
}

impl RecordService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn repository(&self) -> Result<RecordRepository, RecordError> {
        Ok(RecordRepository::new(self.store.gateway()?.clone()))
    }

    pub async fn countries(&self) -> Result<Vec<Country>, RecordError> {
        Ok(self.repository()?.countries().await?)
    }

    pub async fn counts(&self) -> Result<RecordCounts, RecordError> {
        Ok(self.repository()?.counts().await?)
    }

    pub async fn add_vaccination(&self, form: NewVaccination) -> Result<(), RecordError> {
        let form = validate_vaccination(form)?;
        if !self.repository()?.insert_vaccination(&form).await? {
            return Err(RecordError::UnknownCountry(form.country));
        }
        Ok(())
    }

    pub async fn add_contract(&self, form: NewContract) -> Result<(), RecordError> {
        let form = validate_contract(form)?;
        if !self.repository()?.insert_contract(&form).await? {
            return Err(RecordError::UnknownCountry(form.country));
        }
        Ok(())
    }

    pub async fn add_adverse_event(&self, form: NewAdverseEvent) -> Result<(), RecordError> {
        let form = validate_adverse_event(form)?;
        let inserted = match self.repository()?.insert_adverse_event(&form).await {
            Ok(inserted) => inserted,
            // Country ids come from the insert itself, so only the vaccination can be missing.
            Err(e) if e.is_foreign_key_violation() => {
                return Err(RecordError::UnknownVaccination(
                    form.vaccination_id.unwrap_or_default(),
                ));
            }
            Err(e) => return Err(e.into()),
        };
        if !inserted {
            return Err(RecordError::UnknownCountry(form.country));
        }
        Ok(())
    }

    pub async fn vaccinations(
        &self,
        filter: &VaccinationFilter,
    ) -> Result<Vec<Vaccination>, RecordError> {
        Ok(self.repository()?.list_vaccinations(filter).await?)
    }

    pub async fn contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, RecordError> {
        Ok(self.repository()?.list_contracts(filter).await?)
    }

    pub async fn adverse_events(
        &self,
        filter: &AdverseEventFilter,
    ) -> Result<Vec<AdverseEvent>, RecordError> {
        Ok(self.repository()?.list_adverse_events(filter).await?)
    }

    pub async fn vaccination_options(&self) -> Result<Vec<RecordOption>, RecordError> {
        Ok(self.repository()?.vaccination_options().await?)
    }

    pub async fn contract_options(&self) -> Result<Vec<RecordOption>, RecordError> {
        Ok(self.repository()?.contract_options().await?)
    }

    pub async fn adverse_event_options(&self) -> Result<Vec<RecordOption>, RecordError> {
        Ok(self.repository()?.adverse_event_options().await?)
    }

    pub async fn update_vaccine_type(&self, id: i32, vaccine_type: &str) -> Result<(), RecordError> {
        let vaccine_type = required_text("vaccine_type", vaccine_type)?;
        found(
            "vaccination",
            id,
            self.repository()?.update_vaccine_type(id, &vaccine_type).await?,
        )
    }

    pub async fn update_contract_price(&self, id: i32, new_price: f64) -> Result<(), RecordError> {
        let new_price = price(new_price)?;
        found(
            "contract",
            id,
            self.repository()?.update_contract_price(id, new_price).await?,
        )
    }

    pub async fn update_event_resolved(&self, id: i32, resolved: bool) -> Result<(), RecordError> {
        found(
            "adverse event",
            id,
            self.repository()?.update_event_resolved(id, resolved).await?,
        )
    }

    pub async fn delete_vaccination(&self, id: i32) -> Result<(), RecordError> {
        let deleted = self.repository()?.delete_vaccination(id).await;
        found("vaccination", id, blocked(deleted, "vaccination", id, "adverse events")?)
    }

    /// Shipments are never deleted here, so a shipped contract stays
    pub async fn delete_contract(&self, id: i32) -> Result<(), RecordError> {
        let deleted = self.repository()?.delete_contract(id).await;
        found("contract", id, blocked(deleted, "contract", id, "shipments")?)
    }

    pub async fn delete_adverse_event(&self, id: i32) -> Result<(), RecordError> {
        found("adverse event", id, self.repository()?.delete_adverse_event(id).await?)
    }
}

fn blocked(
    result: Result<bool, DbError>,
    table: &'static str,
    id: i32,
    dependents: &'static str,
) -> Result<bool, RecordError> {
    match result {
        Err(e) if e.is_foreign_key_violation() => Err(RecordError::InUse {
            table,
            id,
            dependents,
        }),
        other => Ok(other?),
    }
}

fn found(table: &'static str, id: i32, affected: bool) -> Result<(), RecordError> {
    if affected {
        Ok(())
    } else {
        Err(RecordError::NotFound { table, id })
    }
}
