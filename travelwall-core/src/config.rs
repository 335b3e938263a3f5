use crate::constants::{ATLAS_CDN_URL, DEFAULT_ATLAS_ASSET, DEFAULT_AUTH_BASE, OAUTH_PROVIDER};

/// Page configuration assembled from host-page globals and the query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Prefix for bundled assets, always ending in `/`.
    pub base_url: String,
    /// Mount point of the auth service, without trailing `/`.
    pub auth_base: String,
    pub provider: String,
    /// Dataset locations, tried in order.
    pub atlas_urls: Vec<String>,
}

impl AppConfig {
    /// `base_url` and `auth_base` come from `window.__BASE_URL` and
    /// `window.__AUTH_BASE_URL` when the host page sets them.
    pub fn from_page(search: &str, base_url: Option<String>, auth_base: Option<String>) -> Self {
        let base_url = normalize_base(base_url.as_deref().unwrap_or("/"));
        let auth_base = auth_base
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUTH_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let mut atlas_urls = Vec::new();
        if let Some(custom) = query_value(search, "atlas").filter(|s| !s.is_empty()) {
            atlas_urls.push(asset_url(&base_url, &custom));
        }
        atlas_urls.push(asset_url(&base_url, DEFAULT_ATLAS_ASSET));
        atlas_urls.push(ATLAS_CDN_URL.to_string());
        atlas_urls.dedup();
        AppConfig {
            base_url,
            auth_base,
            provider: OAUTH_PROVIDER.to_string(),
            atlas_urls,
        }
    }

    pub fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.auth_base, endpoint.trim_start_matches('/'))
    }
}

fn normalize_base(base: &str) -> String {
    let base = base.trim();
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

/// Resolve an asset path against `base`; absolute and data URLs pass through.
pub fn asset_url(base: &str, path: &str) -> String {
    let p = path.trim();
    if p.starts_with("http://") || p.starts_with("https://") || p.starts_with("data:") {
        return p.to_string();
    }
    format!("{}{}", normalize_base(base), p.trim_start_matches('/'))
}

/// Decoded value of the first `key` in a `location.search` string. A bare
/// `key` with no `=` reads as empty.
pub fn query_value(search: &str, key: &str) -> Option<String> {
    search
        .strip_prefix('?')
        .unwrap_or(search)
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| decode_component(v))
}

// Form encoding: `+` is a space, then percent escapes.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_encoding::percent_decode_str(&spaced)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_globals_or_query() {
        let cfg = AppConfig::from_page("", None, None);
        assert_eq!(cfg.base_url, "/");
        assert_eq!(cfg.auth_base, "/api/auth");
        assert_eq!(cfg.provider, "google");
        assert_eq!(
            cfg.atlas_urls,
            vec!["/countries-110m.json".to_string(), ATLAS_CDN_URL.to_string()]
        );
        assert_eq!(cfg.auth_url("get-session"), "/api/auth/get-session");
    }

    #[test]
    fn atlas_query_comes_first_and_is_decoded() {
        let cfg = AppConfig::from_page(
            "?lang=en&atlas=data%2Fworld%20small.json",
            Some("/travelwall".into()),
            Some("https://auth.example.test/api/auth/".into()),
        );
        assert_eq!(cfg.base_url, "/travelwall/");
        assert_eq!(cfg.atlas_urls[0], "/travelwall/data/world small.json");
        assert_eq!(cfg.atlas_urls[1], "/travelwall/countries-110m.json");
        assert_eq!(cfg.auth_url("/sign-out"), "https://auth.example.test/api/auth/sign-out");
    }

    #[test]
    fn absolute_asset_urls_pass_through() {
        assert_eq!(asset_url("/x/", "https://cdn.test/a.json"), "https://cdn.test/a.json");
        assert_eq!(asset_url("/x", "/a.json"), "/x/a.json");
    }

    #[test]
    fn query_param_lookup() {
        assert_eq!(query_value("?a=1&b=two+words", "b").as_deref(), Some("two words"));
        assert_eq!(query_value("a", "a").as_deref(), Some(""));
        assert_eq!(query_value("?a=1", "z"), None);
        assert_eq!(query_value("x=%E2%9C%93&x=2", "x").as_deref(), Some("\u{2713}"));
        assert_eq!(query_value("?q=a=b", "q").as_deref(), Some("a=b"));
    }
}
