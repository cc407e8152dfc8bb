//! Repository for the record forms and table views

use super::models::{AdverseEventRow, ContractRow, CountRow, CountryRow, OptionRow, VaccinationRow};
use super::{DbError, Gateway, Params};
use crate::model::{
    AdverseEvent, AdverseEventFilter, Contract, ContractFilter, Country, NewAdverseEvent,
    NewContract, NewVaccination, RecordCounts, RecordOption, Vaccination, VaccinationFilter,
};

/// Repository for vaccination, contract and adverse event rows
#[derive(Clone)]
pub struct RecordRepository {
    gateway: Gateway,
}

impl RecordRepository {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Reference countries, by name
    pub async fn countries(&self) -> Result<Vec<Country>, DbError> {
        let rows: Vec<CountryRow> = self
            .gateway
            .run_query(
                r#"
                SELECT country_id, country_name, population, region, income_level
                FROM countries_real
                ORDER BY country_name
                "#,
                Params::new(),
            )
            .await?;

        Ok(rows.into_iter().map(Country::from).collect())
    }

    /// Row counts shown on the home view
    pub async fn counts(&self) -> Result<RecordCounts, DbError> {
        Ok(RecordCounts {
            vaccinations: self.count("SELECT COUNT(*) AS count FROM vaccinations").await?,
            contracts: self.count("SELECT COUNT(*) AS count FROM contracts").await?,
            adverse_events: self.count("SELECT COUNT(*) AS count FROM adverse_events").await?,
            clinical_trials: self.count("SELECT COUNT(*) AS count FROM clinical_trials").await?,
        })
    }

    async fn count(&self, statement: &str) -> Result<i64, DbError> {
        let row: Option<CountRow> = self.gateway.run_query_optional(statement, Params::new()).await?;
        Ok(row.map_or(0, |r| r.count))
    }

    // ------------------------------------------------------------------
    // Vaccinations
    // ------------------------------------------------------------------

    /// Insert a vaccination for the named country
    ///
    /// Returns false when no country has that name; nothing is written then.
    pub async fn insert_vaccination(&self, form: &NewVaccination) -> Result<bool, DbError> {
        let inserted = self
            .gateway
            .execute_command(
                r#"
                INSERT INTO vaccinations (
                    country_id, date_administered, vaccine_type, age_group, dose_number, doses_given
                )
                SELECT c.country_id, $2, $3, $4, $5, $6
                FROM countries_real c
                WHERE c.country_name = $1
                "#,
                Params::new()
                    .bind(form.country.as_str())
                    .bind(form.date_administered)
                    .bind(form.vaccine_type.as_str())
                    .bind(form.age_group.as_str())
                    .bind(form.dose_number)
                    .bind(form.doses_given),
            )
            .await?;

        tracing::info!(country = %form.country, inserted, "Vaccination insert");
        Ok(inserted > 0)
    }

    pub async fn list_vaccinations(
        &self,
        filter: &VaccinationFilter,
    ) -> Result<Vec<Vaccination>, DbError> {
        let age_groups: Vec<String> = filter
            .age_groups
            .iter()
            .map(|group| group.as_str().to_string())
            .collect();

        let rows: Vec<VaccinationRow> = self
            .gateway
            .run_query(
                r#"
                SELECT vx.vaccination_id, vx.country_id, c.country_name, vx.date_administered,
                       vx.vaccine_type, vx.age_group, vx.dose_number, vx.doses_given
                FROM vaccinations vx
                JOIN countries_real c ON vx.country_id = c.country_id
                WHERE (cardinality($1::text[]) = 0 OR vx.age_group = ANY($1))
                  AND ($2::text IS NULL OR c.country_name = $2)
                ORDER BY vx.vaccination_id
                "#,
                Params::new().bind(age_groups).bind(filter.country.clone()),
            )
            .await?;

        rows.into_iter()
            .map(|row| row.into_domain().map_err(DbError::Decode))
            .collect()
    }

    pub async fn vaccination_options(&self) -> Result<Vec<RecordOption>, DbError> {
        self.options(
            r#"
            SELECT vx.vaccination_id AS id, vx.vaccination_id::text || ' - ' || c.country_name AS label
            FROM vaccinations vx
            JOIN countries_real c ON vx.country_id = c.country_id
            ORDER BY vx.vaccination_id
            "#,
        )
        .await
    }

    /// Returns false when the id does not exist
    pub async fn update_vaccine_type(&self, id: i32, vaccine_type: &str) -> Result<bool, DbError> {
        let updated = self
            .gateway
            .execute_command(
                "UPDATE vaccinations SET vaccine_type = $1 WHERE vaccination_id = $2",
                Params::new().bind(vaccine_type).bind(id),
            )
            .await?;

        tracing::info!(id, updated, "Vaccine type update");
        Ok(updated > 0)
    }

    pub async fn delete_vaccination(&self, id: i32) -> Result<bool, DbError> {
        self.delete("DELETE FROM vaccinations WHERE vaccination_id = $1", id)
            .await
    }

    // ------------------------------------------------------------------
    // Contracts
    // ------------------------------------------------------------------

    pub async fn insert_contract(&self, form: &NewContract) -> Result<bool, DbError> {
        let inserted = self
            .gateway
            .execute_command(
                r#"
                INSERT INTO contracts (
                    country_id, total_doses, price_per_dose, manufacturer, contract_date
                )
                SELECT c.country_id, $2, $3, $4, $5
                FROM countries_real c
                WHERE c.country_name = $1
                "#,
                Params::new()
                    .bind(form.country.as_str())
                    .bind(form.total_doses)
                    .bind(form.price_per_dose)
                    .bind(form.manufacturer.as_str())
                    .bind(form.contract_date),
            )
            .await?;

        tracing::info!(country = %form.country, doses = form.total_doses, inserted, "Contract insert");
        Ok(inserted > 0)
    }

    pub async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, DbError> {
        let rows: Vec<ContractRow> = self
            .gateway
            .run_query(
                r#"
                SELECT ct.contract_id, ct.country_id, c.country_name, ct.total_doses,
                       ct.price_per_dose, ct.manufacturer, ct.contract_date
                FROM contracts ct
                JOIN countries_real c ON ct.country_id = c.country_id
                WHERE ct.price_per_dose <= $1
                ORDER BY ct.contract_id
                "#,
                Params::new().bind(filter.max_price),
            )
            .await?;

        Ok(rows.into_iter().map(Contract::from).collect())
    }

    pub async fn contract_options(&self) -> Result<Vec<RecordOption>, DbError> {
        self.options(
            r#"
            SELECT ct.contract_id AS id, ct.contract_id::text || ' - ' || c.country_name AS label
            FROM contracts ct
            JOIN countries_real c ON ct.country_id = c.country_id
            ORDER BY ct.contract_id
            "#,
        )
        .await
    }

    pub async fn update_contract_price(&self, id: i32, price: f64) -> Result<bool, DbError> {
        let updated = self
            .gateway
            .execute_command(
                "UPDATE contracts SET price_per_dose = $1 WHERE contract_id = $2",
                Params::new().bind(price).bind(id),
            )
            .await?;

        tracing::info!(id, price, updated, "Contract price update");
        Ok(updated > 0)
    }

    pub async fn delete_contract(&self, id: i32) -> Result<bool, DbError> {
        self.delete("DELETE FROM contracts WHERE contract_id = $1", id)
            .await
    }

    // ------------------------------------------------------------------
    // Adverse events
    // ------------------------------------------------------------------

    pub async fn insert_adverse_event(&self, form: &NewAdverseEvent) -> Result<bool, DbError> {
        let inserted = self
            .gateway
            .execute_command(
                r#"
                INSERT INTO adverse_events (
                    vaccination_id, country_id, severity, description, resolved
                )
                SELECT $2, c.country_id, $3, $4, $5
                FROM countries_real c
                WHERE c.country_name = $1
                "#,
                Params::new()
                    .bind(form.country.as_str())
                    .bind(form.vaccination_id)
                    .bind(form.severity.as_str())
                    .bind(form.description.as_str())
                    .bind(form.resolved),
            )
            .await?;

        tracing::info!(country = %form.country, severity = %form.severity, inserted, "Adverse event insert");
        Ok(inserted > 0)
    }

    pub async fn list_adverse_events(
        &self,
        filter: &AdverseEventFilter,
    ) -> Result<Vec<AdverseEvent>, DbError> {
        let severities: Vec<String> = filter
            .severities
            .iter()
            .map(|severity| severity.as_str().to_string())
            .collect();

        let rows: Vec<AdverseEventRow> = self
            .gateway
            .run_query(
                r#"
                SELECT a.event_id, a.vaccination_id, a.country_id, c.country_name,
                       a.severity, a.description, a.resolved
                FROM adverse_events a
                JOIN countries_real c ON a.country_id = c.country_id
                WHERE cardinality($1::text[]) = 0 OR a.severity = ANY($1)
                ORDER BY a.event_id
                "#,
                Params::new().bind(severities),
            )
            .await?;

        rows.into_iter()
            .map(|row| row.into_domain().map_err(DbError::Decode))
            .collect()
    }

    pub async fn adverse_event_options(&self) -> Result<Vec<RecordOption>, DbError> {
        self.options(
            r#"
            SELECT event_id AS id, event_id::text || ' - ' || severity AS label
            FROM adverse_events
            ORDER BY event_id
            "#,
        )
        .await
    }

    pub async fn update_event_resolved(&self, id: i32, resolved: bool) -> Result<bool, DbError> {
        let updated = self
            .gateway
            .execute_command(
                "UPDATE adverse_events SET resolved = $1 WHERE event_id = $2",
                Params::new().bind(resolved).bind(id),
            )
            .await?;

        tracing::info!(id, resolved, updated, "Adverse event resolution update");
        Ok(updated > 0)
    }

    pub async fn delete_adverse_event(&self, id: i32) -> Result<bool, DbError> {
        self.delete("DELETE FROM adverse_events WHERE event_id = $1", id)
            .await
    }

    async fn options(&self, statement: &str) -> Result<Vec<RecordOption>, DbError> {
        let rows: Vec<OptionRow> = self.gateway.run_query(statement, Params::new()).await?;
        Ok(rows.into_iter().map(RecordOption::from).collect())
    }

    /// Delete one row by id
    /// Returns true if the row was deleted, false if it didn't exist
    async fn delete(&self, statement: &str, id: i32) -> Result<bool, DbError> {
        let deleted = self
            .gateway
            .execute_command(statement, Params::new().bind(id))
            .await?;

        if deleted > 0 {
            tracing::info!(id, "Deleted record");
        }
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::testing::{self, unique};
    use crate::model::{AgeGroup, Severity};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract_form(country: &str, manufacturer: &str) -> NewContract {
        NewContract {
            country: country.to_string(),
            total_doses: 250_000,
            price_per_dose: 19.5,
            manufacturer: manufacturer.to_string(),
            contract_date: date(2021, 2, 1),
        }
    }

    async fn contracts_by(repo: &RecordRepository, manufacturer: &str) -> Vec<Contract> {
        repo.list_contracts(&ContractFilter { max_price: f64::MAX })
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.manufacturer == manufacturer)
            .collect()
    }

    async fn shipments_of(gateway: &Gateway, contract_id: i32) -> i64 {
        let row: Option<CountRow> = gateway
            .run_query_optional(
                "SELECT COUNT(*) AS count FROM shipments WHERE contract_id = $1",
                Params::new().bind(contract_id),
            )
            .await
            .unwrap();
        row.map_or(0, |r| r.count)
    }

    #[tokio::test]
    async fn test_vaccination_insert_round_trip() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        let repo = RecordRepository::new(gateway);
        let vaccine_type = unique("mRNA-1273");

        let inserted = repo
            .insert_vaccination(&NewVaccination {
                country: "Kenya".to_string(),
                date_administered: date(2021, 7, 14),
                vaccine_type: vaccine_type.clone(),
                age_group: AgeGroup::MiddleAged,
                dose_number: 2,
                doses_given: 1_500,
            })
            .await
            .unwrap();
        assert!(inserted);

        let rows = repo
            .list_vaccinations(&VaccinationFilter {
                age_groups: vec![],
                country: Some("Kenya".to_string()),
            })
            .await
            .unwrap();

        let row = rows
            .iter()
            .find(|v| v.vaccine_type == vaccine_type)
            .expect("inserted vaccination should be listed");
        assert_eq!(row.country_name, "Kenya");
        assert_eq!(row.date_administered, date(2021, 7, 14));
        assert_eq!(row.age_group, AgeGroup::MiddleAged);
        assert_eq!(row.dose_number, 2);
        assert_eq!(row.doses_given, 1_500);
    }

    #[tokio::test]
    async fn test_insert_for_unknown_country_writes_nothing() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        let repo = RecordRepository::new(gateway);
        let manufacturer = unique("Nowhere Labs");

        let inserted = repo
            .insert_contract(&contract_form(&unique("Atlantis"), &manufacturer))
            .await
            .unwrap();

        assert!(!inserted);
        assert!(contracts_by(&repo, &manufacturer).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_contract_removes_only_that_row() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        let repo = RecordRepository::new(gateway.clone());
        let manufacturer = unique("BioNTech");

        assert!(repo.insert_contract(&contract_form("Kenya", &manufacturer)).await.unwrap());
        assert!(repo.insert_contract(&contract_form("Norway", &manufacturer)).await.unwrap());

        let before = contracts_by(&repo, &manufacturer).await;
        assert_eq!(before.len(), 2);
        let doomed = before.iter().find(|c| c.country_name == "Kenya").unwrap().contract_id;
        let survivor = before.iter().find(|c| c.country_name == "Norway").unwrap().contract_id;

        gateway
            .execute_command(
                "INSERT INTO shipments (contract_id, doses_shipped) VALUES ($1, $2)",
                Params::new().bind(survivor).bind(40_000_i32),
            )
            .await
            .unwrap();

        assert!(repo.delete_contract(doomed).await.unwrap());
        assert!(!repo.delete_contract(doomed).await.unwrap());

        let after = contracts_by(&repo, &manufacturer).await;
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].contract_id, survivor);
        assert!(after.iter().all(|c| c.contract_id != doomed));

        // A contract with shipment history cannot be deleted.
        let refused = repo.delete_contract(survivor).await.unwrap_err();
        assert!(refused.is_foreign_key_violation());
        assert_eq!(shipments_of(&gateway, survivor).await, 1);
        assert_eq!(contracts_by(&repo, &manufacturer).await.len(), 1);
    }

    #[tokio::test]
    async fn test_vaccination_with_adverse_events_is_kept() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        let repo = RecordRepository::new(gateway);
        let vaccine_type = unique("BNT162b2");

        assert!(
            repo.insert_vaccination(&NewVaccination {
                country: "Norway".to_string(),
                date_administered: date(2021, 8, 1),
                vaccine_type: vaccine_type.clone(),
                age_group: AgeGroup::Adult,
                dose_number: 1,
                doses_given: 10,
            })
            .await
            .unwrap()
        );
        let vaccination_id = repo
            .list_vaccinations(&VaccinationFilter::default())
            .await
            .unwrap()
            .into_iter()
            .find(|v| v.vaccine_type == vaccine_type)
            .unwrap()
            .vaccination_id;

        let description = unique("Fever");
        assert!(
            repo.insert_adverse_event(&NewAdverseEvent {
                country: "Norway".to_string(),
                severity: Severity::Moderate,
                description: description.clone(),
                resolved: false,
                vaccination_id: Some(vaccination_id),
            })
            .await
            .unwrap()
        );

        let refused = repo.delete_vaccination(vaccination_id).await.unwrap_err();
        assert!(refused.is_foreign_key_violation());

        let events = repo
            .list_adverse_events(&AdverseEventFilter::default())
            .await
            .unwrap();
        let event = events.iter().find(|e| e.description == description).unwrap();
        assert_eq!(event.vaccination_id, Some(vaccination_id));
    }

    #[tokio::test]
    async fn test_adverse_event_for_missing_vaccination_is_refused() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        let repo = RecordRepository::new(gateway);

        let refused = repo
            .insert_adverse_event(&NewAdverseEvent {
                country: "Kenya".to_string(),
                severity: Severity::Mild,
                description: unique("Headache"),
                resolved: true,
                vaccination_id: Some(i32::MAX),
            })
            .await
            .unwrap_err();
        assert!(refused.is_foreign_key_violation());
    }

    #[tokio::test]
    async fn test_contract_price_filter_and_update() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        let repo = RecordRepository::new(gateway);
        let manufacturer = unique("Moderna");

        assert!(repo.insert_contract(&contract_form("Norway", &manufacturer)).await.unwrap());
        let id = contracts_by(&repo, &manufacturer).await[0].contract_id;

        assert!(repo.update_contract_price(id, 31.0).await.unwrap());

        let cheap = repo
            .list_contracts(&ContractFilter { max_price: 25.0 })
            .await
            .unwrap();
        assert!(cheap.iter().all(|c| c.contract_id != id));
        assert_eq!(contracts_by(&repo, &manufacturer).await[0].price_per_dose, 31.0);
    }

    #[tokio::test]
    async fn test_adverse_event_lifecycle() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        let repo = RecordRepository::new(gateway);
        let description = unique("Injection site swelling");

        assert!(
            repo.insert_adverse_event(&NewAdverseEvent {
                country: "Russia".to_string(),
                severity: Severity::Severe,
                description: description.clone(),
                resolved: false,
                vaccination_id: None,
            })
            .await
            .unwrap()
        );

        let severe = repo
            .list_adverse_events(&AdverseEventFilter {
                severities: vec![Severity::Severe],
            })
            .await
            .unwrap();
        let event = severe.iter().find(|e| e.description == description).unwrap();
        assert!(!event.resolved);

        let options = repo.adverse_event_options().await.unwrap();
        let option = options.iter().find(|o| o.id == event.event_id).unwrap();
        assert_eq!(option.label, format!("{} - Severe", event.event_id));

        assert!(repo.update_event_resolved(event.event_id, true).await.unwrap());
        let mild = repo
            .list_adverse_events(&AdverseEventFilter {
                severities: vec![Severity::Mild],
            })
            .await
            .unwrap();
        assert!(mild.iter().all(|e| e.event_id != event.event_id));

        assert!(repo.delete_adverse_event(event.event_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_vaccination_reports_false() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        let repo = RecordRepository::new(gateway);

        assert!(!repo.update_vaccine_type(i32::MAX, "none").await.unwrap());
        assert!(!repo.delete_vaccination(i32::MAX).await.unwrap());
    }
}
