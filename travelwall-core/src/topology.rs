use std::collections::BTreeMap;

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::atlas::SourceFeature;
use crate::error::AtlasError;

/// TopoJSON document as published by `world-atlas`.
#[derive(Clone, Debug, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub objects: BTreeMap<String, TopoGeometry>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub transform: Option<Transform>,
}

/// Quantization transform; positions are delta-encoded when present.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

/// Geometry object. Fields are kept loose so that unknown geometry types and
/// null geometries still deserialize.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TopoGeometry {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub id: Option<Value>,
    pub properties: Option<Map<String, Value>>,
    pub arcs: Option<Value>,
    pub geometries: Option<Vec<TopoGeometry>>,
}

impl Topology {
    /// Absolute lon/lat coordinates of every arc.
    pub fn decoded_arcs(&self) -> Vec<Vec<Coord<f64>>> {
        self.arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| match self.transform {
                        Some(t) => {
                            x += p[0];
                            y += p[1];
                            Coord {
                                x: x * t.scale[0] + t.translate[0],
                                y: y * t.scale[1] + t.translate[1],
                            }
                        }
                        None => Coord { x: p[0], y: p[1] },
                    })
                    .collect()
            })
            .collect()
    }

    /// The named object if present, otherwise the first one.
    pub fn object(&self, preferred: &str) -> Option<&TopoGeometry> {
        self.objects
            .get(preferred)
            .or_else(|| self.objects.values().next())
    }

    /// Expand an object into features. A `GeometryCollection` yields one
    /// feature per member; any other object is a single feature.
    pub fn features(&self, object: &TopoGeometry) -> Result<Vec<SourceFeature>, AtlasError> {
        let arcs = self.decoded_arcs();
        match (object.type_.as_deref(), &object.geometries) {
            (Some("GeometryCollection"), Some(members)) => {
                members.iter().map(|g| feature(g, &arcs)).collect()
            }
            _ => Ok(vec![feature(object, &arcs)?]),
        }
    }
}

fn feature(g: &TopoGeometry, arcs: &[Vec<Coord<f64>>]) -> Result<SourceFeature, AtlasError> {
    let id = g.id.as_ref().and_then(value_to_id);
    let name = g
        .properties
        .as_ref()
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let mut polygons = Vec::new();
    collect_polygons(g, arcs, &mut polygons)?;
    let shape = if polygons.is_empty() {
        None
    } else {
        Some(MultiPolygon(polygons))
    };
    Ok(SourceFeature { id, name, shape })
}

pub(crate) fn value_to_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn collect_polygons(
    g: &TopoGeometry,
    arcs: &[Vec<Coord<f64>>],
    out: &mut Vec<Polygon<f64>>,
) -> Result<(), AtlasError> {
    match g.type_.as_deref() {
        Some("Polygon") => {
            if let Some(v) = &g.arcs {
                let rings: Vec<Vec<i64>> = serde_json::from_value(v.clone())?;
                if let Some(p) = polygon(&rings, arcs)? {
                    out.push(p);
                }
            }
        }
        Some("MultiPolygon") => {
            if let Some(v) = &g.arcs {
                let polys: Vec<Vec<Vec<i64>>> = serde_json::from_value(v.clone())?;
                for rings in &polys {
                    if let Some(p) = polygon(rings, arcs)? {
                        out.push(p);
                    }
                }
            }
        }
        Some("GeometryCollection") => {
            for member in g.geometries.iter().flatten() {
                collect_polygons(member, arcs, out)?;
            }
        }
        // Points, lines and null geometries carry no area to draw.
        _ => {}
    }
    Ok(())
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<Coord<f64>>]) -> Result<Option<Polygon<f64>>, AtlasError> {
    let mut decoded = Vec::with_capacity(rings.len());
    for r in rings {
        let pts = ring(r, arcs)?;
        if !pts.is_empty() {
            decoded.push(LineString::from(pts));
        }
    }
    if decoded.is_empty() {
        return Ok(None);
    }
    let exterior = decoded.remove(0);
    Ok(Some(Polygon::new(exterior, decoded)))
}

/// Stitch arcs into one closed ring. Consecutive arcs share an endpoint, so
/// the last emitted point is dropped before the next arc is appended.
fn ring(indices: &[i64], arcs: &[Vec<Coord<f64>>]) -> Result<Vec<Coord<f64>>, AtlasError> {
    let mut points: Vec<Coord<f64>> = Vec::new();
    for &i in indices {
        let (idx, reversed) = if i < 0 { (!i, true) } else { (i, false) };
        let arc = usize::try_from(idx)
            .ok()
            .and_then(|k| arcs.get(k))
            .ok_or(AtlasError::ArcIndex(i))?;
        points.pop();
        if reversed {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
    }
    // Arcs with only two points can produce rings too short to close.
    if let Some(&first) = points.first() {
        if points.len() < 4 {
            points.push(first);
        }
    }
    Ok(points)
}
