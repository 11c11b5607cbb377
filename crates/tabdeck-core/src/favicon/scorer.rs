//! Quality score for a successfully probed icon
//!
//! The weights are empirically tuned. They are kept in one table so callers can
//! experiment without touching the scoring arithmetic.

use url::Url;

use super::candidates::{IconProvider, GENERIC_ASSET_PATH};

/// Score assigned to icons too small to use
pub const DISQUALIFIED: f64 = -1_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    /// Icons with both sides below this are disqualified
    pub min_side_px: u32,
    /// Assumed size of vector icons that report no usable dimensions
    pub vector_implicit_px: u32,
    pub size_factor: f64,
    pub aspect_factor: f64,
    pub same_site: f64,
    pub favicon_path: f64,
    pub touch_icon: f64,
    pub generic_asset: f64,
    pub vector: f64,
    pub high_res_query: f64,
    pub low_res_domain_query: f64,
    pub low_res_provider: f64,
    pub ico: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            min_side_px: 12,
            vector_implicit_px: 64,
            size_factor: 2.0,
            aspect_factor: 40.0,
            same_site: 90.0,
            favicon_path: 16.0,
            touch_icon: 18.0,
            generic_asset: 12.0,
            vector: 6.0,
            high_res_query: 24.0,
            low_res_domain_query: -20.0,
            low_res_provider: -70.0,
            ico: -4.0,
        }
    }
}

/// Score `url` with the default weights, judging vector-ness by its path
pub fn score(url: &str, width: u32, height: u32, target_host: &str) -> f64 {
    score_with(&ScoreWeights::default(), url, width, height, false, target_host)
}

/// Score `url` with `weights`
///
/// `vector` marks a body that was recognised as SVG when it was loaded. A
/// `.svg` path counts as vector either way.
pub fn score_with(
    weights: &ScoreWeights,
    url: &str,
    width: u32,
    height: u32,
    vector: bool,
    target_host: &str,
) -> f64 {
    let parsed = Url::parse(url).ok();
    let path = parsed
        .as_ref()
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|| url.to_ascii_lowercase());
    let is_vector = vector || path.ends_with(".svg");

    let (mut width, mut height) = (width, height);
    if width < weights.min_side_px && height < weights.min_side_px {
        if !is_vector {
            return DISQUALIFIED;
        }
        width = weights.vector_implicit_px;
        height = weights.vector_implicit_px;
    }

    let min_side = width.min(height) as f64;
    let max_side = width.max(height) as f64;
    let aspect = if max_side > 0.0 { min_side / max_side } else { 0.0 };
    let mut score = min_side * weights.size_factor + aspect * weights.aspect_factor;

    if let Some(host) = parsed.as_ref().and_then(|u| u.host_str()) {
        if is_same_site(host, target_host) {
            score += weights.same_site;
        }
    }

    if path.contains("favicon") {
        score += weights.favicon_path;
    }
    if is_touch_icon(&path) {
        score += weights.touch_icon;
    }
    if path == GENERIC_ASSET_PATH {
        score += weights.generic_asset;
    }
    if is_vector {
        score += weights.vector;
    }

    let provider = parsed
        .as_ref()
        .map(IconProvider::classify)
        .unwrap_or(IconProvider::Direct);
    if provider.is_high_res_query() {
        score += weights.high_res_query;
    }
    if provider == IconProvider::GoogleDomain {
        score += weights.low_res_domain_query;
    }
    if provider.is_low_res_provider() {
        score += weights.low_res_provider;
    }
    if path.ends_with(".ico") {
        score += weights.ico;
    }

    score
}

/// Same host, a subdomain of the target, or a parent domain of it
pub fn is_same_site(host: &str, target: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let target = target.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() || target.is_empty() {
        return false;
    }
    host == target
        || host.ends_with(&format!(".{}", target))
        || target.ends_with(&format!(".{}", host))
}

fn is_touch_icon(path: &str) -> bool {
    path.contains("apple-touch-icon")
        || path.contains("android-chrome")
        || path.contains("maskable")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disqualification_boundary() {
        assert_eq!(score("https://a.com/x.png", 11, 11, "a.com"), DISQUALIFIED);
        assert_ne!(score("https://a.com/x.png", 12, 12, "a.com"), DISQUALIFIED);
        // one side large enough keeps the candidate
        assert_ne!(score("https://a.com/x.png", 11, 48, "a.com"), DISQUALIFIED);
    }

    #[test]
    fn test_vector_without_dimensions_is_implicit_64() {
        let svg = score("https://other.com/logo.svg", 0, 0, "a.com");
        // 64 * 2 + 40 + vector bonus
        assert!((svg - (128.0 + 40.0 + 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_svg_body_behind_raster_path_is_vector() {
        let weights = ScoreWeights::default();
        let served = score_with(&weights, "https://other.com/logo.png", 0, 0, true, "a.com");
        assert!((served - (128.0 + 40.0 + 6.0)).abs() < 1e-9);

        // same URL without the body hint is too small to use
        let unknown = score_with(&weights, "https://other.com/logo.png", 0, 0, false, "a.com");
        assert_eq!(unknown, DISQUALIFIED);

        // favicon.ico serving SVG keeps its path adjustments
        let ico = score_with(&weights, "https://a.com/favicon.ico", 0, 0, true, "a.com");
        assert!((ico - (128.0 + 40.0 + 90.0 + 16.0 + 6.0 - 4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_larger_icon_scores_higher() {
        let small = score("https://a.com/x.png", 32, 32, "a.com");
        let large = score("https://a.com/x.png", 64, 64, "a.com");
        assert!(large > small);
        assert!((large - small - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_site_bonus_is_exactly_90() {
        let same = score("https://a.com/x.png", 48, 48, "a.com");
        let cross = score("https://b.com/x.png", 48, 48, "a.com");
        assert!((same - cross - 90.0).abs() < 1e-9);

        let sub = score("https://static.a.com/x.png", 48, 48, "a.com");
        let parent = score("https://a.com/x.png", 48, 48, "www.a.com");
        assert!((sub - cross - 90.0).abs() < 1e-9);
        assert!((parent - cross - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_path_bonuses() {
        let base = score("https://b.com/x.png", 48, 48, "a.com");
        let touch = score("https://b.com/apple-touch-icon.png", 48, 48, "a.com");
        let ico = score("https://b.com/favicon.ico", 48, 48, "a.com");
        let generic = score("https://b.com/icon.png", 48, 48, "a.com");
        assert!((touch - base - 18.0).abs() < 1e-9);
        assert!((ico - base - 12.0).abs() < 1e-9);
        assert!((generic - base - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_third_party_adjustments() {
        let plain = score("https://b.com/x.png", 64, 64, "a.com");
        let domain_url = score(
            "https://www.google.com/s2/favicons?domain_url=https%3A%2F%2Fa.com&sz=128",
            64,
            64,
            "a.com",
        );
        let domain = score(
            "https://www.google.com/s2/favicons?domain=a.com&sz=64",
            64,
            64,
            "a.com",
        );
        let gstatic = score(
            "https://t1.gstatic.com/faviconV2?client=SOCIAL&url=https%3A%2F%2Fa.com&size=128",
            64,
            64,
            "a.com",
        );
        let ddg = score("https://icons.duckduckgo.com/ip3/a.com.ico", 64, 64, "a.com");

        // s2 paths contain "favicon" too
        assert!((domain_url - plain - (16.0 + 24.0 - 70.0)).abs() < 1e-9);
        assert!((domain - plain - (16.0 - 20.0 - 70.0)).abs() < 1e-9);
        assert!((gstatic - plain - (16.0 + 24.0)).abs() < 1e-9);
        assert!((ddg - plain - (-70.0 - 4.0)).abs() < 1e-9);
        assert!(domain_url > domain);
    }

    #[test]
    fn test_real_icon_beats_provider_fallback() {
        let own = score("https://a.com/favicon.png", 32, 32, "a.com");
        let provider = score(
            "https://www.google.com/s2/favicons?domain=a.com&sz=64",
            64,
            64,
            "a.com",
        );
        assert!(own > provider);
    }
}
