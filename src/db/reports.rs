//! Read-only aggregate queries behind the charts and the coverage map

use chrono::NaiveDate;

use super::models::{
    AgeGroupDosesRow, CountryCoverageRow, CoverageRateRow, DailyDosesRow, DateRangeRow,
    DeliveryRow, EfficacyRow, MonthlyDosesRow, ParticipantsRow, RevenueRow, SevereEventsRow,
};
use super::{DbError, Gateway, Params};
use crate::model::DateRange;

#[derive(Clone)]
pub struct ReportRepository {
    gateway: Gateway,
}

impl ReportRepository {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn revenue_by_country(&self) -> Result<Vec<RevenueRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT c.country_name, SUM(ct.total_doses * ct.price_per_dose)::float8 AS total_revenue
                FROM contracts ct
                JOIN countries_real c ON ct.country_id = c.country_id
                GROUP BY c.country_name
                ORDER BY c.country_name
                "#,
                Params::new(),
            )
            .await
    }

    pub async fn top_revenue_countries(&self, limit: i64) -> Result<Vec<RevenueRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT c.country_name, SUM(ct.total_doses * ct.price_per_dose)::float8 AS total_revenue
                FROM contracts ct
                JOIN countries_real c ON ct.country_id = c.country_id
                GROUP BY c.country_name
                ORDER BY total_revenue DESC
                LIMIT $1
                "#,
                Params::new().bind(limit),
            )
            .await
    }

    pub async fn delivery_completion(&self) -> Result<Vec<DeliveryRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT ct.contract_id, c.country_name, ct.total_doses,
                       SUM(s.doses_shipped)::bigint AS shipped,
                       ROUND(SUM(s.doses_shipped)::numeric / NULLIF(ct.total_doses, 0) * 100, 2)::float8
                           AS delivery_rate_percent
                FROM contracts ct
                JOIN countries_real c ON ct.country_id = c.country_id
                JOIN shipments s ON s.contract_id = ct.contract_id
                GROUP BY ct.contract_id, c.country_name, ct.total_doses
                HAVING ct.total_doses > 0
                ORDER BY ct.contract_id
                "#,
                Params::new(),
            )
            .await
    }

    pub async fn coverage_by_country(&self) -> Result<Vec<CountryCoverageRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT c.country_name,
                       SUM(v.doses_given)::bigint AS total_doses_administered,
                       c.population,
                       ROUND(SUM(v.doses_given)::numeric / NULLIF(c.population, 0) * 100, 2)::float8
                           AS coverage_percent
                FROM vaccinations v
                JOIN countries_real c ON v.country_id = c.country_id
                GROUP BY c.country_name, c.population
                ORDER BY c.country_name
                "#,
                Params::new(),
            )
            .await
    }

    /// Adverse events reach their country through the vaccination they followed
    pub async fn severe_events_per_million(&self) -> Result<Vec<SevereEventsRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT c.country_name,
                       COUNT(CASE WHEN a.severity = 'Severe' THEN 1 END) AS severe_events,
                       SUM(v.doses_given)::bigint AS total_doses,
                       ROUND(
                           COUNT(CASE WHEN a.severity = 'Severe' THEN 1 END)::numeric
                               / NULLIF(SUM(v.doses_given), 0) * 1000000,
                           2
                       )::float8 AS events_per_million
                FROM adverse_events a
                JOIN vaccinations v ON a.vaccination_id = v.vaccination_id
                JOIN countries_real c ON v.country_id = c.country_id
                GROUP BY c.country_name
                ORDER BY c.country_name
                "#,
                Params::new(),
            )
            .await
    }

    pub async fn efficacy_by_phase(&self) -> Result<Vec<EfficacyRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT phase, ROUND(AVG(efficacy_rate)::numeric, 2)::float8 AS avg_efficacy
                FROM clinical_trials
                GROUP BY phase
                ORDER BY phase
                "#,
                Params::new(),
            )
            .await
    }

    pub async fn participants_by_income(&self) -> Result<Vec<ParticipantsRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT c.income_level, SUM(t.participants)::bigint AS total_participants
                FROM clinical_trials t
                JOIN countries_real c ON t.country_id = c.country_id
                GROUP BY c.income_level
                ORDER BY c.income_level
                "#,
                Params::new(),
            )
            .await
    }

    pub async fn busiest_days(&self, limit: i64) -> Result<Vec<DailyDosesRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT date_administered, SUM(doses_given)::bigint AS total_given
                FROM vaccinations
                GROUP BY date_administered
                ORDER BY total_given DESC, date_administered
                LIMIT $1
                "#,
                Params::new().bind(limit),
            )
            .await
    }

    pub async fn doses_by_age_group(&self) -> Result<Vec<AgeGroupDosesRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT age_group, SUM(doses_given)::bigint AS total_doses
                FROM vaccinations
                GROUP BY age_group
                ORDER BY age_group
                "#,
                Params::new(),
            )
            .await
    }

    pub async fn monthly_doses(&self) -> Result<Vec<MonthlyDosesRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT to_char(date_administered, 'YYYY-MM') AS month,
                       SUM(doses_given)::bigint AS total_doses
                FROM vaccinations
                GROUP BY month
                ORDER BY month
                "#,
                Params::new(),
            )
            .await
    }

    pub async fn administration_date_range(&self) -> Result<DateRange, DbError> {
        let row: Option<DateRangeRow> = self
            .gateway
            .run_query_optional(
                r#"
                SELECT MIN(date_administered) AS min_date, MAX(date_administered) AS max_date
                FROM vaccinations
                "#,
                Params::new(),
            )
            .await?;

        Ok(row.map(DateRange::from).unwrap_or(DateRange {
            min_date: None,
            max_date: None,
        }))
    }

    /// Second-dose coverage per country counting doses on or before `until`
    ///
    /// Every country is returned, ordered by rate; rows are not yet filtered
    /// to the displayable range.
    pub async fn coverage_until(&self, until: NaiveDate) -> Result<Vec<CoverageRateRow>, DbError> {
        self.gateway
            .run_query(
                r#"
                SELECT c.country_name, c.population, c.region, c.income_level,
                       COALESCE(SUM(v.doses_given), 0)::bigint AS total_doses_given,
                       ROUND(COALESCE(SUM(v.doses_given), 0)::numeric / NULLIF(c.population, 0) * 100, 2)::float8
                           AS vaccination_rate
                FROM countries_real c
                LEFT JOIN vaccinations v
                    ON c.country_id = v.country_id
                   AND v.dose_number = 2
                   AND v.date_administered <= $1
                GROUP BY c.country_id, c.country_name, c.population, c.region, c.income_level
                ORDER BY vaccination_rate DESC NULLS LAST, c.country_name
                "#,
                Params::new().bind(until),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::RecordRepository;
    use crate::db::testing::{self, unique};
    use crate::model::{AgeGroup, NewVaccination};

    #[tokio::test]
    async fn test_coverage_respects_cut_off_date() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        let records = RecordRepository::new(gateway.clone());
        let reports = ReportRepository::new(gateway);

        let cut_off = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        let before = reports.coverage_until(cut_off).await.unwrap();
        let norway_before = before
            .iter()
            .find(|r| r.country_name == "Norway")
            .unwrap()
            .total_doses_given;

        assert!(
            records
                .insert_vaccination(&NewVaccination {
                    country: "Norway".to_string(),
                    date_administered: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
                    vaccine_type: unique("late"),
                    age_group: AgeGroup::Adult,
                    dose_number: 2,
                    doses_given: 10,
                })
                .await
                .unwrap()
        );

        let after = reports.coverage_until(cut_off).await.unwrap();
        let norway_after = after
            .iter()
            .find(|r| r.country_name == "Norway")
            .unwrap()
            .total_doses_given;
        assert_eq!(norway_before, norway_after);
    }

    #[tokio::test]
    async fn test_date_range_covers_inserted_dates() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        let records = RecordRepository::new(gateway.clone());
        let reports = ReportRepository::new(gateway);
        let day = NaiveDate::from_ymd_opt(2021, 5, 5).unwrap();

        records
            .insert_vaccination(&NewVaccination {
                country: "Kenya".to_string(),
                date_administered: day,
                vaccine_type: unique("range"),
                age_group: AgeGroup::Senior,
                dose_number: 1,
                doses_given: 1,
            })
            .await
            .unwrap();

        let range = reports.administration_date_range().await.unwrap();
        assert!(range.min_date.unwrap() <= day);
        assert!(range.max_date.unwrap() >= day);
    }
}
