//! Aggregate charts for the Visualize view

use crate::db::models::{
    AgeGroupDosesRow, CountryCoverageRow, DailyDosesRow, DeliveryRow, EfficacyRow,
    MonthlyDosesRow, ParticipantsRow, RevenueRow, SevereEventsRow,
};
use crate::db::reports::ReportRepository;
use crate::db::{DbError, Store};
use crate::model::{ChartData, ChartId, ChartPoint};

const TOP_REVENUE_LIMIT: i64 = 5;
const BUSIEST_DAYS_LIMIT: i64 = 5;

pub struct ChartService {
    store: Store,
}

impl ChartService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Run the aggregate behind `id` and shape it as plot points
    pub async fn chart(&self, id: ChartId) -> Result<ChartData, DbError> {
        let reports = ReportRepository::new(self.store.gateway()?.clone());

        let points = match id {
            ChartId::RevenueByCountry => revenue_points(reports.revenue_by_country().await?),
            ChartId::DeliveryCompletion => delivery_points(reports.delivery_completion().await?),
            ChartId::CoverageByCountry => coverage_points(reports.coverage_by_country().await?),
            ChartId::SevereEventsPerMillion => {
                severe_event_points(reports.severe_events_per_million().await?)
            }
            ChartId::TopRevenueCountries => {
                revenue_points(reports.top_revenue_countries(TOP_REVENUE_LIMIT).await?)
            }
            ChartId::EfficacyByPhase => efficacy_points(reports.efficacy_by_phase().await?),
            ChartId::ParticipantsByIncome => {
                participant_points(reports.participants_by_income().await?)
            }
            ChartId::BusiestDays => daily_points(reports.busiest_days(BUSIEST_DAYS_LIMIT).await?),
            ChartId::AgeGroupDistribution => age_group_points(reports.doses_by_age_group().await?),
            ChartId::MonthlyTrend => monthly_points(reports.monthly_doses().await?),
        };

        tracing::debug!(chart = id.slug(), points = points.len(), "Built chart");
        Ok(ChartData::new(id, points))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn revenue_points(rows: Vec<RevenueRow>) -> Vec<ChartPoint> {
    rows.into_iter()
        .map(|r| ChartPoint::new(r.country_name, round2(r.total_revenue)))
        .collect()
}

/// One bar per contract, coloured by the contracting country
pub fn delivery_points(rows: Vec<DeliveryRow>) -> Vec<ChartPoint> {
    rows.into_iter()
        .map(|r| {
            ChartPoint::new(r.contract_id.to_string(), r.delivery_rate_percent)
                .with_series(r.country_name)
        })
        .collect()
}

pub fn coverage_points(rows: Vec<CountryCoverageRow>) -> Vec<ChartPoint> {
    rows.into_iter()
        .filter_map(|r| {
            r.coverage_percent
                .map(|pct| ChartPoint::new(r.country_name, pct))
        })
        .collect()
}

pub fn severe_event_points(rows: Vec<SevereEventsRow>) -> Vec<ChartPoint> {
    rows.into_iter()
        .filter_map(|r| {
            r.events_per_million
                .map(|rate| ChartPoint::new(r.country_name, rate))
        })
        .collect()
}

pub fn efficacy_points(rows: Vec<EfficacyRow>) -> Vec<ChartPoint> {
    rows.into_iter()
        .filter_map(|r| r.avg_efficacy.map(|avg| ChartPoint::new(r.phase, avg)))
        .collect()
}

pub fn participant_points(rows: Vec<ParticipantsRow>) -> Vec<ChartPoint> {
    rows.into_iter()
        .map(|r| {
            ChartPoint::new(
                r.income_level.unwrap_or_else(|| "Unknown".to_string()),
                r.total_participants as f64,
            )
        })
        .collect()
}

pub fn daily_points(rows: Vec<DailyDosesRow>) -> Vec<ChartPoint> {
    rows.into_iter()
        .map(|r| {
            ChartPoint::new(
                r.date_administered.format("%Y-%m-%d").to_string(),
                r.total_given as f64,
            )
        })
        .collect()
}

pub fn age_group_points(rows: Vec<AgeGroupDosesRow>) -> Vec<ChartPoint> {
    rows.into_iter()
        .map(|r| ChartPoint::new(r.age_group, r.total_doses as f64))
        .collect()
}

pub fn monthly_points(rows: Vec<MonthlyDosesRow>) -> Vec<ChartPoint> {
    rows.into_iter()
        .map(|r| ChartPoint::new(r.month, r.total_doses as f64))
        .collect()
}
