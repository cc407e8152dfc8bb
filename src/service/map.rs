//! Choropleth of second-dose coverage by country

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::db::models::CoverageRateRow;
use crate::db::reports::ReportRepository;
use crate::db::{DbError, Store};
use crate::model::{CoverageRate, DateRange};
use crate::service::color::color_for;
use crate::service::geo::{FeatureCollection, GeoError, GeoReference};
use crate::service::names::canonicalize;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Geo(#[from] GeoError),

    #[error("Date {date} is outside the recorded range {min} to {max}")]
    OutOfRange {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },
}

/// Map view payload: the coverage table and the painted boundary features
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoverageMap {
    pub until: NaiveDate,
    pub rows: Vec<CoverageRate>,
    /// GeoJSON FeatureCollection with `display_name`, `fill_color` and
    /// `vaccination_rate` set on every feature
    #[schema(value_type = Object)]
    pub features: FeatureCollection,
}

pub struct MapService {
    store: Store,
    geo: Arc<GeoReference>,
}

impl MapService {
    pub fn new(store: Store, geo: Arc<GeoReference>) -> Self {
        Self { store, geo }
    }

    fn reports(&self) -> Result<ReportRepository, DbError> {
        Ok(ReportRepository::new(self.store.gateway()?.clone()))
    }

    pub async fn date_range(&self) -> Result<DateRange, MapError> {
        Ok(self.reports()?.administration_date_range().await?)
    }

    /// Displayable coverage rows up to the requested (or latest) date
    pub async fn coverage(
        &self,
        requested: Option<NaiveDate>,
    ) -> Result<(NaiveDate, Vec<CoverageRate>), MapError> {
        let reports = self.reports()?;
        let range = reports.administration_date_range().await?;
        let until = resolve_cut_off(range, requested, Utc::now().date_naive())?;

        let rows = displayable(reports.coverage_until(until).await?);
        tracing::debug!(%until, countries = rows.len(), "Computed coverage rows");

        Ok((until, rows))
    }

    pub async fn render(&self, requested: Option<NaiveDate>) -> Result<CoverageMap, MapError> {
        let (until, rows) = self.coverage(requested).await?;
        let geo = self.geo.load().await?;
        let features = paint(&geo, &rows);

        Ok(CoverageMap {
            until,
            rows,
            features,
        })
    }
}

/// Pick the cut-off date: the request if inside the recorded range, else the latest date
///
/// With no vaccinations on record any date is accepted and the default is `today`.
pub fn resolve_cut_off(
    range: DateRange,
    requested: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NaiveDate, MapError> {
    match (requested, range.min_date, range.max_date) {
        (Some(date), Some(min), Some(max)) if !range.contains(date) => {
            Err(MapError::OutOfRange { date, min, max })
        }
        (Some(date), _, _) => Ok(date),
        (None, _, Some(max)) => Ok(max),
        (None, _, None) => Ok(today),
    }
}

/// Drop rows whose rate is missing or not a percentage; order is preserved
pub fn displayable(rows: Vec<CoverageRateRow>) -> Vec<CoverageRate> {
    rows.into_iter()
        .filter_map(CoverageRateRow::into_displayable)
        .collect()
}

/// Copy of the boundary features with fill colour and rate joined in by canonical name
pub fn paint(collection: &FeatureCollection, rows: &[CoverageRate]) -> FeatureCollection {
    let mut rates: HashMap<&str, f64> = HashMap::with_capacity(rows.len());
    for row in rows {
        rates
            .entry(row.country_name.as_str())
            .or_insert(row.vaccination_rate);
    }

    let mut painted = collection.clone();
    let mut unmatched = 0usize;

    for feature in &mut painted.features {
        let display_name = feature.raw_name().map(|raw| canonicalize(raw).to_string());
        let rate = display_name
            .as_deref()
            .and_then(|name| rates.get(name).copied());
        if rate.is_none() {
            unmatched += 1;
        }

        let color = color_for(rate);
        let properties = &mut feature.properties;
        properties.insert(
            "display_name".to_string(),
            display_name.map_or(Value::Null, Value::String),
        );
        properties.insert(
            "fill_color".to_string(),
            json!([color.0, color.1, color.2]),
        );
        properties.insert(
            "vaccination_rate".to_string(),
            rate.map_or(Value::Null, Value::from),
        );
    }

    tracing::debug!(
        features = painted.features.len(),
        unmatched,
        "Painted coverage map"
    );
    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::color::NO_DATA;
    use crate::service::geo::Feature;
    use serde_json::Map;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn feature(key: &str, name: &str) -> Feature {
        let mut properties = Map::new();
        properties.insert(key.to_string(), Value::from(name));
        Feature {
            kind: "Feature".to_string(),
            properties,
            geometry: Value::Null,
            extra: Map::new(),
        }
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            kind: "FeatureCollection".to_string(),
            features,
            extra: Map::new(),
        }
    }

    fn rate_row(name: &str, rate: Option<f64>) -> CoverageRateRow {
        CoverageRateRow {
            country_name: name.to_string(),
            population: 1_000_000,
            region: None,
            income_level: None,
            total_doses_given: 0,
            vaccination_rate: rate,
        }
    }

    fn coverage(name: &str, rate: f64) -> CoverageRate {
        rate_row(name, Some(rate)).into_displayable().unwrap()
    }

    #[test]
    fn test_displayable_excludes_out_of_range_rates() {
        let rows = vec![
            rate_row("Norway", Some(130.5)),
            rate_row("Kenya", Some(41.2)),
            rate_row("Brazil", None),
            rate_row("Egypt", Some(0.0)),
        ];
        let kept: Vec<String> = displayable(rows)
            .into_iter()
            .map(|r| r.country_name)
            .collect();
        assert_eq!(kept, vec!["Kenya", "Egypt"]);
    }

    #[test]
    fn test_paint_joins_through_canonical_names() {
        let geo = collection(vec![
            feature("ADMIN", "Russian Federation"),
            feature("name", "Kenya"),
        ]);
        let painted = paint(&geo, &[coverage("Russia", 100.0), coverage("Kenya", 0.0)]);

        let russia = &painted.features[0].properties;
        assert_eq!(russia["display_name"], json!("Russia"));
        assert_eq!(russia["fill_color"], json!([0, 255, 0]));
        assert_eq!(russia["vaccination_rate"], json!(100.0));

        let kenya = &painted.features[1].properties;
        assert_eq!(kenya["fill_color"], json!([255, 0, 0]));
        assert_eq!(kenya["vaccination_rate"], json!(0.0));
    }

    #[test]
    fn test_unreconciled_name_is_grey_no_data() {
        let geo = collection(vec![feature("ADMIN", "Côte d'Ivoire")]);
        let painted = paint(&geo, &[coverage("Ivory Coast", 55.0)]);

        let props = &painted.features[0].properties;
        assert_eq!(props["display_name"], json!("Côte d'Ivoire"));
        assert_eq!(props["fill_color"], json!([NO_DATA.0, NO_DATA.1, NO_DATA.2]));
        assert_eq!(props["vaccination_rate"], Value::Null);
    }

    #[test]
    fn test_excluded_row_paints_as_no_data() {
        let geo = collection(vec![feature("ADMIN", "Norway")]);
        let rows = displayable(vec![rate_row("Norway", Some(101.0))]);
        let painted = paint(&geo, &rows);
        assert_eq!(painted.features[0].properties["fill_color"], json!([200, 200, 200]));
    }

    #[test]
    fn test_paint_leaves_source_untouched() {
        let geo = collection(vec![feature("ADMIN", "Kenya")]);
        let _ = paint(&geo, &[coverage("Kenya", 12.0)]);
        assert!(!geo.features[0].properties.contains_key("fill_color"));
    }

    #[test]
    fn test_cut_off_defaults_to_latest_date() {
        let range = DateRange {
            min_date: Some(date(2021, 1, 1)),
            max_date: Some(date(2021, 9, 30)),
        };
        let today = date(2026, 1, 1);
        assert_eq!(resolve_cut_off(range, None, today).unwrap(), date(2021, 9, 30));
        assert_eq!(
            resolve_cut_off(range, Some(date(2021, 3, 1)), today).unwrap(),
            date(2021, 3, 1)
        );
        assert!(matches!(
            resolve_cut_off(range, Some(date(2022, 1, 1)), today),
            Err(MapError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_cut_off_without_records() {
        let empty = DateRange {
            min_date: None,
            max_date: None,
        };
        let today = date(2026, 1, 1);
        assert_eq!(resolve_cut_off(empty, None, today).unwrap(), today);
        assert_eq!(
            resolve_cut_off(empty, Some(date(2020, 2, 2)), today).unwrap(),
            date(2020, 2, 2)
        );
    }

    #[tokio::test]
    async fn test_unavailable_store_is_reported() {
        let service = MapService::new(
            Store::Unavailable {
                reason: "offline".to_string(),
            },
            Arc::new(GeoReference::new("countries.geojson")),
        );
        assert!(matches!(
            service.date_range().await,
            Err(MapError::Db(DbError::Unavailable(_)))
        ));
    }
}
