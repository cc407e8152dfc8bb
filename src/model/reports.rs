//! Aggregate report types: chart series, map coverage rows and home counts

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::table::{Cell, TabularRow};

/// The charts offered by the Visualize view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ChartId {
    RevenueByCountry,
    DeliveryCompletion,
    CoverageByCountry,
    SevereEventsPerMillion,
    TopRevenueCountries,
    EfficacyByPhase,
    ParticipantsByIncome,
    BusiestDays,
    AgeGroupDistribution,
    MonthlyTrend,
}

impl ChartId {
    pub const ALL: [ChartId; 10] = [
        ChartId::RevenueByCountry,
        ChartId::DeliveryCompletion,
        ChartId::CoverageByCountry,
        ChartId::SevereEventsPerMillion,
        ChartId::TopRevenueCountries,
        ChartId::EfficacyByPhase,
        ChartId::ParticipantsByIncome,
        ChartId::BusiestDays,
        ChartId::AgeGroupDistribution,
        ChartId::MonthlyTrend,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ChartId::RevenueByCountry => "revenue-by-country",
            ChartId::DeliveryCompletion => "delivery-completion",
            ChartId::CoverageByCountry => "coverage-by-country",
            ChartId::SevereEventsPerMillion => "severe-events-per-million",
            ChartId::TopRevenueCountries => "top-revenue-countries",
            ChartId::EfficacyByPhase => "efficacy-by-phase",
            ChartId::ParticipantsByIncome => "participants-by-income",
            ChartId::BusiestDays => "busiest-days",
            ChartId::AgeGroupDistribution => "age-group-distribution",
            ChartId::MonthlyTrend => "monthly-trend",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartId::RevenueByCountry => "Total Contracted Revenue per Country",
            ChartId::DeliveryCompletion => "Dose Delivery Completion Rate per Contract (%)",
            ChartId::CoverageByCountry => "Vaccination Coverage by Country (%)",
            ChartId::SevereEventsPerMillion => "Severe Adverse Events per Million Doses by Country",
            ChartId::TopRevenueCountries => "Top 5 Countries by Revenue",
            ChartId::EfficacyByPhase => "Average Clinical Trial Efficacy by Phase",
            ChartId::ParticipantsByIncome => "Trial Participants by Income Level",
            ChartId::BusiestDays => "Top 5 Busiest Vaccination Days",
            ChartId::AgeGroupDistribution => "Age Group Distribution of Doses",
            ChartId::MonthlyTrend => "Monthly Dose Administration Trends",
        }
    }

    pub fn kind(self) -> ChartKind {
        match self {
            ChartId::TopRevenueCountries | ChartId::ParticipantsByIncome => ChartKind::Pie,
            ChartId::MonthlyTrend => ChartKind::Line,
            _ => ChartKind::Bar,
        }
    }

    /// Axis labels as (x, y)
    pub fn axis_labels(self) -> (&'static str, &'static str) {
        match self {
            ChartId::RevenueByCountry => ("Country", "Total Revenue (USD)"),
            ChartId::DeliveryCompletion => ("Contract ID", "Delivery Rate (%)"),
            ChartId::CoverageByCountry => ("Country", "Coverage (%)"),
            ChartId::SevereEventsPerMillion => ("Country", "Events per Million Doses"),
            ChartId::TopRevenueCountries => ("Country", "Revenue (USD)"),
            ChartId::EfficacyByPhase => ("Trial Phase", "Avg Efficacy Rate (%)"),
            ChartId::ParticipantsByIncome => ("Income Level", "Participants"),
            ChartId::BusiestDays => ("Date", "Doses Given"),
            ChartId::AgeGroupDistribution => ("Age Group", "Total Doses"),
            ChartId::MonthlyTrend => ("Month", "Total Doses"),
        }
    }
}

impl FromStr for ChartId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.slug() == s)
            .ok_or_else(|| format!("Unknown chart: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

/// One plotted value
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    /// Colour grouping, when the chart has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            series: None,
        }
    }

    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }
}

/// Chart data ready for a client-side renderer
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartData {
    pub id: ChartId,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    pub fn new(id: ChartId, points: Vec<ChartPoint>) -> Self {
        let (x_label, y_label) = id.axis_labels();
        Self {
            id,
            title: id.title().to_string(),
            kind: id.kind(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            points,
        }
    }
}

/// Summary entry for the chart index
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChartSummary {
    pub id: ChartId,
    pub title: String,
    pub kind: ChartKind,
    pub path: String,
}

impl From<ChartId> for ChartSummary {
    fn from(id: ChartId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            kind: id.kind(),
            path: format!("/v1/charts/{}", id.slug()),
        }
    }
}

/// Country vaccination coverage up to a cut-off date, as shown on the map
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CoverageRate {
    pub country_name: String,
    pub population: i64,
    pub region: Option<String>,
    pub income_level: Option<String>,
    pub total_doses_given: i64,
    /// Second doses per population, percent, two decimals
    pub vaccination_rate: f64,
}

impl TabularRow for CoverageRate {
    fn headers() -> &'static [&'static str] {
        &[
            "country_name",
            "population",
            "region",
            "income_level",
            "total_doses_given",
            "vaccination_rate",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.country_name.clone()),
            Cell::Integer(self.population),
            self.region.clone().map_or(Cell::Empty, Cell::Text),
            self.income_level.clone().map_or(Cell::Empty, Cell::Text),
            Cell::Integer(self.total_doses_given),
            Cell::Number(self.vaccination_rate),
        ]
    }
}

/// Earliest and latest administration dates on record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct DateRange {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.min_date, self.max_date) {
            (Some(min), Some(max)) => (min..=max).contains(&date),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecordCounts {
    pub vaccinations: i64,
    pub contracts: i64,
    pub adverse_events: i64,
    pub clinical_trials: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_slugs_parse_back() {
        for id in ChartId::ALL {
            assert_eq!(id.slug().parse::<ChartId>().unwrap(), id);
            assert_eq!(
                serde_json::to_value(id).unwrap(),
                serde_json::Value::String(id.slug().to_string())
            );
        }
        assert!("revenue".parse::<ChartId>().is_err());
    }

    #[test]
    fn test_chart_kinds() {
        assert_eq!(ChartId::TopRevenueCountries.kind(), ChartKind::Pie);
        assert_eq!(ChartId::MonthlyTrend.kind(), ChartKind::Line);
        assert_eq!(ChartId::BusiestDays.kind(), ChartKind::Bar);
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange {
            min_date: NaiveDate::from_ymd_opt(2021, 1, 1),
            max_date: NaiveDate::from_ymd_opt(2021, 12, 31),
        };
        assert!(range.contains(NaiveDate::from_ymd_opt(2021, 12, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()));

        let empty = DateRange {
            min_date: None,
            max_date: None,
        };
        assert!(empty.contains(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()));
    }
}
