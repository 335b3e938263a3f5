use std::fmt::Write;

use geo_types::Point;

use crate::atlas::{Atlas, Country};
use crate::constants::{MAP_HEIGHT, MAP_WIDTH, MARKER_RADIUS, REGION_STROKE_WIDTH};
use crate::wall::WallSnapshot;

/// Visual state of one country outline. Selection wins over photo styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionState {
    Plain,
    Selected,
    HasPhoto,
}

impl RegionState {
    pub fn of(selected: bool, has_photo: bool) -> Self {
        match (selected, has_photo) {
            (true, _) => RegionState::Selected,
            (false, true) => RegionState::HasPhoto,
            (false, false) => RegionState::Plain,
        }
    }

    pub fn fill(self) -> &'static str {
        match self {
            RegionState::Selected => "#334155",
            RegionState::HasPhoto | RegionState::Plain => "#1e293b",
        }
    }

    pub fn stroke(self) -> &'static str {
        match self {
            RegionState::Selected => "rgba(251, 146, 60, 0.7)",
            RegionState::HasPhoto => "rgba(253, 230, 138, 0.3)",
            RegionState::Plain => "rgba(71, 85, 105, 0.7)",
        }
    }

    fn class(self) -> &'static str {
        match self {
            RegionState::Selected => "region region--selected",
            RegionState::HasPhoto => "region region--photo",
            RegionState::Plain => "region",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Region<'a> {
    pub country: &'a Country,
    pub path: &'a str,
    pub state: RegionState,
}

#[derive(Clone, Debug)]
pub struct Marker<'a> {
    pub country: &'a Country,
    pub centre: Point<f64>,
}

/// Everything the map draws for one wall state.
#[derive(Clone, Debug, Default)]
pub struct MapScene<'a> {
    pub regions: Vec<Region<'a>>,
    pub markers: Vec<Marker<'a>>,
}

/// Pure composition of the map from the dataset, the selected id and a
/// photo predicate.
pub fn compose<'a>(
    atlas: &'a Atlas,
    selected_id: Option<&str>,
    has_photo: impl Fn(&str) -> bool,
) -> MapScene<'a> {
    let mut scene = MapScene::default();
    for (country, shape) in atlas.shapes() {
        let photo = has_photo(&country.id);
        scene.regions.push(Region {
            country,
            path: &shape.path,
            state: RegionState::of(selected_id == Some(country.id.as_str()), photo),
        });
        if photo && let Some(centre) = shape.centroid {
            scene.markers.push(Marker { country, centre });
        }
    }
    scene
}

/// [`compose`] driven by a wall snapshot.
pub fn compose_snapshot<'a>(atlas: &'a Atlas, wall: &WallSnapshot<'_>) -> MapScene<'a> {
    compose(atlas, wall.selection.map(|c| c.id.as_str()), |id| wall.has_photo(id))
}

impl MapScene<'_> {
    /// Standalone SVG document for the scene.
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(64 * 1024);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {MAP_WIDTH} {MAP_HEIGHT}" class="map" role="img" aria-label="World map">"#
        );
        let _ = write!(
            out,
            r##"<rect x="0" y="0" width="{MAP_WIDTH}" height="{MAP_HEIGHT}" fill="#0f172a"/>"##
        );
        out.push_str("<g class=\"regions\">");
        for r in &self.regions {
            let _ = write!(
                out,
                r#"<path d="{d}" class="{class}" fill="{fill}" stroke="{stroke}" stroke-width="{REGION_STROKE_WIDTH}" vector-effect="non-scaling-stroke" role="button" tabindex="0" aria-label="{label}" {data}/>"#,
                d = r.path,
                class = r.state.class(),
                fill = r.state.fill(),
                stroke = r.state.stroke(),
                label = escape(&r.country.name),
                data = data_attrs(r.country),
            );
        }
        out.push_str("</g><g class=\"markers\">");
        for m in &self.markers {
            let _ = write!(
                out,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{MARKER_RADIUS}" class="marker" role="button" tabindex="0" aria-label="Visited: {}" {}/>"#,
                m.centre.x(),
                m.centre.y(),
                escape(&m.country.name),
                data_attrs(m.country),
            );
        }
        out.push_str("</g></svg>");
        out
    }
}

fn data_attrs(c: &Country) -> String {
    format!(
        r#"data-country-id="{}" data-country-name="{}""#,
        escape(&c.id),
        escape(&c.name)
    )
}

/// Escape text for use inside a double-quoted XML attribute.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Keys that activate a focused region or marker like a click.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Spacebar")
}

/// Label above the map: `"Visited countries: X/Y"`.
pub fn visited_label(wall: &WallSnapshot<'_>) -> String {
    format!("Visited countries: {}", wall.visited_count())
}

/// Selection line above the map.
pub fn selection_label(wall: &WallSnapshot<'_>) -> String {
    match wall.selection {
        Some(c) => format!("Selected: {}", c.name),
        None => "Select a country".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::{MemoryFile, MemoryStore};
    use crate::wall::WallController;

    const THREE: &str = include_str!("../tests/fixtures/three_countries.json");

    #[test]
    fn region_state_precedence() {
        assert_eq!(RegionState::of(true, true), RegionState::Selected);
        assert_eq!(RegionState::of(true, false), RegionState::Selected);
        assert_eq!(RegionState::of(false, true), RegionState::HasPhoto);
        assert_eq!(RegionState::of(false, false), RegionState::Plain);
        assert_eq!(RegionState::Selected.fill(), "#334155");
        assert_ne!(RegionState::HasPhoto.stroke(), RegionState::Plain.stroke());
    }

    #[test]
    fn markers_follow_photos_not_selection() {
        let atlas = Atlas::from_json(THREE).unwrap();
        let scene = compose(&atlas, Some("008"), |id| id == "008" || id == "012");
        let states: Vec<_> = scene.regions.iter().map(|r| (r.country.id.as_str(), r.state)).collect();
        assert_eq!(
            states,
            vec![
                ("004", RegionState::Plain),
                ("008", RegionState::Selected),
                ("012", RegionState::HasPhoto),
            ]
        );
        let marked: Vec<_> = scene.markers.iter().map(|m| m.country.id.as_str()).collect();
        assert_eq!(marked, vec!["008", "012"]);
    }

    #[test]
    fn snapshot_composition_matches_wall() {
        let atlas = Atlas::from_json(THREE).unwrap();
        let mut wall = WallController::new(MemoryStore::new(), atlas.len());
        wall.select_country(atlas.find("004").unwrap().clone());
        wall.attach_to_selection(Some(&MemoryFile::new("k.jpg", vec![1])));
        let scene = compose_snapshot(&atlas, &wall.snapshot());
        assert_eq!(scene.regions[0].state, RegionState::Selected);
        assert_eq!(scene.markers.len(), 1);
        assert_eq!(visited_label(&wall.snapshot()), "Visited countries: 1/3");
        assert_eq!(selection_label(&wall.snapshot()), "Selected: Afghanistan");
    }

    #[test]
    fn svg_carries_selection_data_and_escapes_names() {
        let atlas = Atlas::from_json(
            &THREE.replace("Albania", "Bosnia & \\\"Herz\\\""),
        )
        .unwrap();
        let svg = compose(&atlas, None, |id| id == "008").to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<path ").count(), 3);
        assert_eq!(svg.matches("<circle ").count(), 1);
        assert!(svg.contains(r#"data-country-id="012""#));
        assert!(svg.contains("Bosnia &amp; &quot;Herz&quot;"));
        assert!(svg.contains("aria-label=\"Visited: Bosnia &amp; &quot;Herz&quot;\""));
        assert_eq!(svg.matches("tabindex=\"0\"").count(), 4);

        let marker = &svg[svg.find("<circle ").unwrap()..];
        let marker = &marker[..marker.find("/>").unwrap()];
        assert!(marker.contains(r#"data-country-id="008""#));
        assert!(marker.contains(r#"data-country-name="Bosnia &amp; &quot;Herz&quot;""#));
        assert!(marker.contains(r#"role="button""#));
    }

    #[test]
    fn activation_keys() {
        assert!(is_activation_key("Enter"));
        assert!(is_activation_key(" "));
        assert!(is_activation_key("Spacebar"));
        assert!(!is_activation_key("a"));
        assert!(!is_activation_key("Tab"));
    }

    #[test]
    fn empty_selection_prompt() {
        let wall = WallController::new(MemoryStore::new(), 0);
        assert_eq!(selection_label(&wall.snapshot()), "Select a country");
    }
}
