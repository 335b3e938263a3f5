use std::fmt::Write;

use geo::Centroid;
use geo_types::{Coord, LineString, MultiPolygon, Point, Polygon};

/// Natural Earth I pseudocylindrical projection fitted to a fixed canvas.
/// Screen coordinates grow rightwards and downwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NaturalEarth {
    pub scale: f64,
    pub translate: (f64, f64),
}

/// Raw projection of longitude/latitude in radians (y up).
fn raw(lambda: f64, phi: f64) -> (f64, f64) {
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;
    (
        lambda
            * (0.8707 - 0.131979 * phi2
                + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4))),
        phi * (1.007226 + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4))),
    )
}

/// Raw projected point with y flipped to screen orientation.
fn raw_screen(c: Coord<f64>) -> Option<(f64, f64)> {
    let (x, y) = raw(c.x.to_radians(), c.y.to_radians());
    (x.is_finite() && y.is_finite()).then_some((x, -y))
}

impl NaturalEarth {
    /// Choose scale and translation so the projected bounds of `shapes` are
    /// as large as possible while centred inside `width`×`height`. With no
    /// usable coordinates the whole globe is fitted instead.
    pub fn fit_size<'a, I>(width: f64, height: f64, shapes: I) -> Self
    where
        I: IntoIterator<Item = &'a MultiPolygon<f64>>,
    {
        let mut b = Bounds::default();
        for shape in shapes {
            for poly in &shape.0 {
                for ls in std::iter::once(poly.exterior()).chain(poly.interiors()) {
                    for c in ls.coords() {
                        if let Some(p) = raw_screen(*c) {
                            b.add(p);
                        }
                    }
                }
            }
        }
        if b.is_empty() {
            for (lon, lat) in [(-180.0, 0.0), (180.0, 0.0), (0.0, 90.0), (0.0, -90.0)] {
                if let Some(p) = raw_screen(Coord { x: lon, y: lat }) {
                    b.add(p);
                }
            }
        }
        let dx = b.max_x - b.min_x;
        let dy = b.max_y - b.min_y;
        let k = match (dx > 0.0, dy > 0.0) {
            (true, true) => (width / dx).min(height / dy),
            (true, false) => width / dx,
            (false, true) => height / dy,
            (false, false) => 1.0,
        };
        NaturalEarth {
            scale: k,
            translate: (
                (width - k * (b.max_x + b.min_x)) / 2.0,
                (height - k * (b.max_y + b.min_y)) / 2.0,
            ),
        }
    }

    pub fn project(&self, c: Coord<f64>) -> Option<Coord<f64>> {
        let (x, y) = raw_screen(c)?;
        Some(Coord {
            x: self.translate.0 + self.scale * x,
            y: self.translate.1 + self.scale * y,
        })
    }

    /// Project every ring, dropping rings that collapse to fewer than three
    /// distinct points. `None` when nothing drawable is left.
    pub fn project_shape(&self, shape: &MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
        let polys: Vec<Polygon<f64>> = shape
            .0
            .iter()
            .filter_map(|poly| {
                let exterior = self.project_ring(poly.exterior())?;
                let interiors = poly
                    .interiors()
                    .iter()
                    .filter_map(|r| self.project_ring(r))
                    .collect();
                Some(Polygon::new(exterior, interiors))
            })
            .collect();
        (!polys.is_empty()).then(|| MultiPolygon(polys))
    }

    fn project_ring(&self, ring: &LineString<f64>) -> Option<LineString<f64>> {
        let mut pts: Vec<Coord<f64>> = ring.coords().filter_map(|c| self.project(*c)).collect();
        pts.dedup();
        let open_len = if pts.len() > 1 && pts.first() == pts.last() {
            pts.len() - 1
        } else {
            pts.len()
        };
        (open_len >= 3).then(|| LineString::from(pts))
    }

    /// SVG path data, one `M…Z` subpath per ring.
    pub fn path(&self, shape: &MultiPolygon<f64>) -> Option<String> {
        let projected = self.project_shape(shape)?;
        let mut d = String::new();
        for poly in &projected.0 {
            for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
                let coords = &ring.0;
                // Rings are closed; the final point repeats the first.
                let open = &coords[..coords.len().saturating_sub(1)];
                for (i, c) in open.iter().enumerate() {
                    let cmd = if i == 0 { 'M' } else { 'L' };
                    let _ = write!(d, "{cmd}{:.2},{:.2}", c.x, c.y);
                }
                d.push('Z');
            }
        }
        Some(d)
    }

    /// Planar area-weighted centroid of the projected shape.
    pub fn centroid(&self, shape: &MultiPolygon<f64>) -> Option<Point<f64>> {
        self.project_shape(shape)?.centroid()
    }
}

#[derive(Debug)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }
}

impl Bounds {
    fn add(&mut self, (x, y): (f64, f64)) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn is_empty(&self) -> bool {
        !(self.max_x.is_finite() && self.max_y.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::polygon;

    fn square(lon: f64, lat: f64, half: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: lon - half, y: lat - half),
            (x: lon + half, y: lat - half),
            (x: lon + half, y: lat + half),
            (x: lon - half, y: lat + half),
        ]])
    }

    #[test]
    fn fitted_shapes_stay_inside_the_canvas() {
        let shapes = vec![square(-120.0, 40.0, 10.0), square(100.0, -30.0, 15.0)];
        let proj = NaturalEarth::fit_size(980.0, 520.0, &shapes);
        for s in &shapes {
            let p = proj.project_shape(s).unwrap();
            for c in p.0.iter().flat_map(|poly| poly.exterior().coords()) {
                assert!(c.x >= -1e-6 && c.x <= 980.0 + 1e-6, "x out of range: {}", c.x);
                assert!(c.y >= -1e-6 && c.y <= 520.0 + 1e-6, "y out of range: {}", c.y);
            }
        }
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let proj = NaturalEarth::fit_size(980.0, 520.0, &[square(0.0, 0.0, 60.0)]);
        let north = proj.project(Coord { x: 0.0, y: 50.0 }).unwrap();
        let south = proj.project(Coord { x: 0.0, y: -50.0 }).unwrap();
        let east = proj.project(Coord { x: 50.0, y: 0.0 }).unwrap();
        assert!(north.y < south.y);
        assert!(east.x > north.x);
    }

    #[test]
    fn symmetric_shape_centroid_lands_in_canvas_centre() {
        let shape = square(0.0, 0.0, 20.0);
        let proj = NaturalEarth::fit_size(980.0, 520.0, [&shape]);
        let c = proj.centroid(&shape).unwrap();
        assert!((c.x() - 490.0).abs() < 1e-6);
        assert!((c.y() - 260.0).abs() < 1e-6);
    }

    #[test]
    fn path_has_one_subpath_per_ring() {
        let shapes = vec![square(10.0, 10.0, 5.0), square(40.0, 10.0, 5.0)];
        let merged = MultiPolygon(shapes.iter().flat_map(|s| s.0.clone()).collect());
        let proj = NaturalEarth::fit_size(980.0, 520.0, &shapes);
        let d = proj.path(&merged).unwrap();
        assert!(d.starts_with('M'));
        assert_eq!(d.matches('M').count(), 2);
        assert_eq!(d.matches('Z').count(), 2);
        assert_eq!(d.matches('L').count(), 6);
    }

    #[test]
    fn degenerate_shape_has_no_path_or_centroid() {
        let point_like = square(5.0, 5.0, 0.0);
        let proj = NaturalEarth::fit_size(980.0, 520.0, [&square(0.0, 0.0, 30.0)]);
        assert!(proj.path(&point_like).is_none());
        assert!(proj.centroid(&point_like).is_none());
    }

    #[test]
    fn empty_input_fits_the_whole_globe() {
        let proj = NaturalEarth::fit_size(980.0, 520.0, std::iter::empty());
        let west = proj.project(Coord { x: -180.0, y: 0.0 }).unwrap();
        let east = proj.project(Coord { x: 180.0, y: 0.0 }).unwrap();
        assert!(west.x >= -1e-6 && east.x <= 980.0 + 1e-6);
        assert!(proj.scale > 0.0);
    }
}
