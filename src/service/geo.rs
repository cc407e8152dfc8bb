//! Country boundary reference data, loaded once per process

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Failed to read geo reference {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed geo reference {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

/// GeoJSON feature collection; members this service does not use are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    /// The dataset's own label: `ADMIN`, else `name`
    pub fn raw_name(&self) -> Option<&str> {
        self.properties
            .get("ADMIN")
            .and_then(Value::as_str)
            .or_else(|| self.properties.get("name").and_then(Value::as_str))
    }
}

impl FeatureCollection {
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }
}

/// Lazily loaded, never invalidated boundary dataset
pub struct GeoReference {
    path: PathBuf,
    collection: OnceCell<Arc<FeatureCollection>>,
}

impl GeoReference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            collection: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The boundary dataset, read from disk on first use
    pub async fn load(&self) -> Result<Arc<FeatureCollection>, GeoError> {
        self.collection
            .get_or_try_init(|| async {
                let contents =
                    tokio::fs::read_to_string(&self.path)
                        .await
                        .map_err(|source| GeoError::Read {
                            path: self.path.clone(),
                            source,
                        })?;

                let collection =
                    FeatureCollection::from_json(&contents).map_err(|source| GeoError::Parse {
                        path: self.path.clone(),
                        source,
                    })?;

                tracing::info!(path = %self.path.display(), features = collection.features.len(), "Loaded geo reference");
                Ok::<_, GeoError>(Arc::new(collection))
            })
            .await
            .map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "name": "countries",
        "features": [
            {
                "type": "Feature",
                "properties": { "ADMIN": "Russian Federation", "ISO_A3": "RUS" },
                "geometry": { "type": "Polygon", "coordinates": [[[30.0, 50.0], [31.0, 50.0], [31.0, 51.0], [30.0, 50.0]]] }
            },
            {
                "type": "Feature",
                "properties": { "name": "Kenya" },
                "geometry": null
            }
        ]
    }"#;

    fn write_sample(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_keeps_unknown_members() {
        let collection = FeatureCollection::from_json(SAMPLE).unwrap();
        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.extra.get("name"), Some(&Value::from("countries")));
        assert_eq!(
            collection.features[0].properties.get("ISO_A3"),
            Some(&Value::from("RUS"))
        );
    }

    #[test]
    fn test_raw_name_prefers_admin() {
        let collection = FeatureCollection::from_json(SAMPLE).unwrap();
        assert_eq!(collection.features[0].raw_name(), Some("Russian Federation"));
        assert_eq!(collection.features[1].raw_name(), Some("Kenya"));
    }

    #[tokio::test]
    async fn test_load_is_memoized() {
        let file = write_sample(SAMPLE);
        let reference = GeoReference::new(file.path());

        let first = reference.load().await.unwrap();
        // Deleting the source must not matter once loaded.
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());

        let second = reference.load().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let reference = GeoReference::new("/definitely/not/here/countries.geojson");
        assert!(matches!(reference.load().await, Err(GeoError::Read { .. })));
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let file = write_sample("{ \"type\": \"FeatureCollection\", \"features\": [");
        let reference = GeoReference::new(file.path());
        assert!(matches!(reference.load().await, Err(GeoError::Parse { .. })));
    }
}
