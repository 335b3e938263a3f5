use thiserror::Error;

/// Failures while turning a dataset document into an [`crate::Atlas`].
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("dataset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("unsupported dataset type {0:?}; expected Topology or FeatureCollection")]
    UnsupportedType(String),
    #[error("topology has no objects")]
    NoObjects,
    #[error("arc index {0} is out of range")]
    ArcIndex(i64),
}
