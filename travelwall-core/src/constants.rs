/// Application-wide constants.
/// Lengths are expressed in SVG user units of the map canvas unless noted otherwise.
pub const MAP_WIDTH: f64 = 980.0;
pub const MAP_HEIGHT: f64 = 520.0;
/// Radius of the visited marker drawn at a country's centroid.
pub const MARKER_RADIUS: f64 = 4.2;
/// Stroke width shared by every country outline.
pub const REGION_STROKE_WIDTH: f64 = 0.7;
/// Identity provider used for the social sign-in flow.
pub const OAUTH_PROVIDER: &str = "google";
/// Mount point of the hosted auth service, relative to the page origin.
pub const DEFAULT_AUTH_BASE: &str = "/api/auth";
/// Dataset shipped next to the page.
pub const DEFAULT_ATLAS_ASSET: &str = "countries-110m.json";
/// Public copy of the same dataset, tried when the bundled asset is missing.
pub const ATLAS_CDN_URL: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json";
/// Fallbacks for features that carry neither an id nor a name.
pub const UNKNOWN_ID: &str = "unknown";
pub const UNKNOWN_NAME: &str = "Unknown";
