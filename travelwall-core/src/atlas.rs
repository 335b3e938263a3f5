use geo_types::{Geometry, MultiPolygon, Point};
use geojson::GeoJson;
use geojson::feature::Id;
use serde_json::Value;

use crate::constants::{MAP_HEIGHT, MAP_WIDTH, UNKNOWN_ID, UNKNOWN_NAME};
use crate::error::AtlasError;
use crate::projection::NaturalEarth;
use crate::topology::Topology;

/// A selectable country. Supplied by the dataset and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Country {
    pub id: String,
    pub name: String,
}

impl Country {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Country {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Feature as read from a dataset, before identifier fallbacks apply.
#[derive(Clone, Debug, Default)]
pub struct SourceFeature {
    pub id: Option<String>,
    pub name: Option<String>,
    pub shape: Option<MultiPolygon<f64>>,
}

impl SourceFeature {
    /// Id falls back to the name, then to `"unknown"`; name falls back to `"Unknown"`.
    fn country(&self) -> Country {
        let id = self
            .id
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| UNKNOWN_ID.to_string());
        let name = self.name.clone().unwrap_or_else(|| UNKNOWN_NAME.to_string());
        Country { id, name }
    }
}

/// Screen-space rendering of one country.
#[derive(Clone, Debug)]
pub struct ProjectedShape {
    /// Index into [`Atlas::countries`].
    pub country: usize,
    pub path: String,
    pub centroid: Option<Point<f64>>,
}

/// Read-only country dataset projected onto the map canvas.
#[derive(Clone, Debug)]
pub struct Atlas {
    countries: Vec<Country>,
    shapes: Vec<ProjectedShape>,
}

impl Atlas {
    /// Parse a TopoJSON `Topology` or a GeoJSON `FeatureCollection`.
    pub fn from_json(text: &str) -> Result<Self, AtlasError> {
        let value: Value = serde_json::from_str(text)?;
        let features = match value.get("type").and_then(Value::as_str) {
            Some("Topology") => {
                let topo: Topology = serde_json::from_value(value)?;
                let object = topo.object("countries").ok_or(AtlasError::NoObjects)?;
                topo.features(object)?
            }
            Some("FeatureCollection") => geojson_features(value)?,
            other => return Err(AtlasError::UnsupportedType(other.unwrap_or_default().to_string())),
        };
        Ok(Self::from_features(features))
    }

    /// Every feature becomes a country; only shapes that survive projection
    /// are kept for rendering.
    pub fn from_features(features: Vec<SourceFeature>) -> Self {
        let projection =
            NaturalEarth::fit_size(MAP_WIDTH, MAP_HEIGHT, features.iter().filter_map(|f| f.shape.as_ref()));
        let mut countries = Vec::with_capacity(features.len());
        let mut shapes = Vec::with_capacity(features.len());
        for (i, f) in features.iter().enumerate() {
            countries.push(f.country());
            let Some(shape) = &f.shape else { continue };
            match projection.path(shape) {
                Some(path) => shapes.push(ProjectedShape {
                    country: i,
                    path,
                    centroid: projection.centroid(shape),
                }),
                None => log::debug!("skipping unrenderable shape for {}", countries[i].id),
            }
        }
        log::debug!("atlas loaded: {} countries, {} drawable", countries.len(), shapes.len());
        Atlas { countries, shapes }
    }

    /// Total number of countries, drawable or not.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn find(&self, id: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.id == id)
    }

    /// Drawable shapes paired with their country, in dataset order.
    pub fn shapes(&self) -> impl Iterator<Item = (&Country, &ProjectedShape)> {
        self.shapes.iter().map(|s| (&self.countries[s.country], s))
    }
}

fn geojson_features(value: Value) -> Result<Vec<SourceFeature>, AtlasError> {
    let collection = match GeoJson::from_json_value(value)? {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(AtlasError::UnsupportedType("FeatureCollection".to_string())),
    };
    collection
        .features
        .into_iter()
        .map(|f| {
            let id = f.id.map(|id| match id {
                Id::String(s) => s,
                Id::Number(n) => n.to_string(),
            });
            let name = f
                .properties
                .as_ref()
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string);
            let shape = match f.geometry {
                Some(g) => multi_polygon(Geometry::<f64>::try_from(g.value)?),
                None => None,
            };
            Ok(SourceFeature { id, name, shape })
        })
        .collect()
}

fn multi_polygon(g: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match g {
        Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        Geometry::MultiPolygon(m) => Some(m),
        Geometry::GeometryCollection(gc) => {
            let polys: Vec<_> = gc
                .0
                .into_iter()
                .filter_map(multi_polygon)
                .flat_map(|m| m.0)
                .collect();
            (!polys.is_empty()).then(|| MultiPolygon(polys))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE: &str = include_str!("../tests/fixtures/three_countries.json");

    #[test]
    fn loads_topology_countries_in_order() {
        let atlas = Atlas::from_json(THREE).unwrap();
        let ids: Vec<&str> = atlas.countries().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["004", "008", "012"]);
        assert_eq!(atlas.len(), 3);
        assert_eq!(atlas.find("008").map(|c| c.name.as_str()), Some("Albania"));
        assert!(atlas.find("999").is_none());
    }

    #[test]
    fn every_fixture_country_is_drawable_with_a_centroid() {
        let atlas = Atlas::from_json(THREE).unwrap();
        let drawn: Vec<_> = atlas.shapes().collect();
        assert_eq!(drawn.len(), 3);
        for (_, shape) in drawn {
            assert!(shape.path.starts_with('M') && shape.path.ends_with('Z'));
            let c = shape.centroid.unwrap();
            assert!((0.0..=980.0).contains(&c.x()) && (0.0..=520.0).contains(&c.y()));
        }
    }

    #[test]
    fn id_and_name_fallbacks() {
        let atlas = Atlas::from_features(vec![
            SourceFeature {
                id: None,
                name: Some("Kosovo".into()),
                shape: None,
            },
            SourceFeature::default(),
        ]);
        assert_eq!(atlas.countries()[0], Country::new("Kosovo", "Kosovo"));
        assert_eq!(atlas.countries()[1], Country::new("unknown", "Unknown"));
    }

    #[test]
    fn shapeless_features_count_towards_total_but_are_not_drawn() {
        let text = r#"{"type":"Topology",
            "objects":{"countries":{"type":"GeometryCollection","geometries":[
                {"type":"Polygon","arcs":[[0]],"id":"004","properties":{"name":"Afghanistan"}},
                {"type":null,"id":"010","properties":{"name":"Antarctica"}}
            ]}},
            "arcs":[[[61,29],[75,29],[75,38],[61,38],[61,29]]]}"#;
        let atlas = Atlas::from_json(text).unwrap();
        assert_eq!(atlas.len(), 2);
        assert_eq!(atlas.shapes().count(), 1);
    }

    #[test]
    fn reads_geojson_feature_collections() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":250,"properties":{"name":"France"},
             "geometry":{"type":"Polygon","coordinates":[[[-4,43],[8,43],[8,51],[-4,51],[-4,43]]]}},
            {"type":"Feature","properties":{"name":"Nowhere"},"geometry":null}
        ]}"#;
        let atlas = Atlas::from_json(text).unwrap();
        assert_eq!(atlas.countries()[0], Country::new("250", "France"));
        assert_eq!(atlas.countries()[1].id, "Nowhere");
        assert_eq!(atlas.shapes().count(), 1);
    }

    #[test]
    fn rejects_unknown_documents() {
        let err = Atlas::from_json(r#"{"type":"Point","coordinates":[0,0]}"#).unwrap_err();
        assert!(matches!(err, AtlasError::UnsupportedType(t) if t == "Point"));
        assert!(matches!(Atlas::from_json("not json"), Err(AtlasError::Json(_))));
    }
}
