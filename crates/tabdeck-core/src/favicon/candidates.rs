//! Candidate icon URLs for a link, in priority order

use url::Url;

/// Conventional icon locations at the site root
const ROOT_ICON_PATHS: [&str; 4] = [
    "/favicon.ico",
    "/favicon.png",
    "/favicon.svg",
    "/apple-touch-icon.png",
];

/// Conventional icon locations under common asset directories
const ASSET_ICON_PATHS: [&str; 4] = [
    "/static/favicon.png",
    "/assets/favicon.png",
    "/android-chrome-192x192.png",
    "/apple-touch-icon-precomposed.png",
];

/// Last same-origin guess before third-party services
pub const GENERIC_ASSET_PATH: &str = "/icon.png";

const GOOGLE_S2_HOST: &str = "www.google.com";
const GOOGLE_S2_PATH: &str = "/s2/favicons";
const GSTATIC_HOST: &str = "t1.gstatic.com";
const GSTATIC_PATH: &str = "/faviconV2";
const DUCKDUCKGO_HOST: &str = "icons.duckduckgo.com";

/// Which third-party service (if any) serves an icon URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconProvider {
    /// Served by the site itself or an unknown host
    Direct,
    /// Google s2 favicons queried by full origin at high resolution
    GoogleDomainUrl,
    /// Google s2 favicons queried by bare domain
    GoogleDomain,
    /// Google s2 favicons with an unrecognized query
    GoogleOther,
    /// gstatic faviconV2 queried by URL
    GstaticByUrl,
    /// gstatic faviconV2 with an unrecognized query
    GstaticOther,
    /// DuckDuckGo icon service
    DuckDuckGo,
}

impl IconProvider {
    pub fn classify(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default();
        let has_param = |name: &str| url.query_pairs().any(|(k, _)| k == name);

        if host.eq_ignore_ascii_case(GOOGLE_S2_HOST) && url.path() == GOOGLE_S2_PATH {
            if has_param("domain_url") {
                IconProvider::GoogleDomainUrl
            } else if has_param("domain") {
                IconProvider::GoogleDomain
            } else {
                IconProvider::GoogleOther
            }
        } else if host.eq_ignore_ascii_case(GSTATIC_HOST) && url.path() == GSTATIC_PATH {
            if has_param("url") {
                IconProvider::GstaticByUrl
            } else {
                IconProvider::GstaticOther
            }
        } else if host.eq_ignore_ascii_case(DUCKDUCKGO_HOST) {
            IconProvider::DuckDuckGo
        } else {
            IconProvider::Direct
        }
    }

    pub fn classify_str(url: &str) -> Self {
        Url::parse(url)
            .map(|u| Self::classify(&u))
            .unwrap_or(IconProvider::Direct)
    }

    /// Providers that mostly return small, generic icons
    pub fn is_low_res_provider(self) -> bool {
        matches!(
            self,
            IconProvider::GoogleDomainUrl
                | IconProvider::GoogleDomain
                | IconProvider::GoogleOther
                | IconProvider::DuckDuckGo
        )
    }

    /// Query forms that explicitly request a large icon
    pub fn is_high_res_query(self) -> bool {
        matches!(self, IconProvider::GoogleDomainUrl | IconProvider::GstaticByUrl)
    }
}

/// Whether a stored preference uses the untrusted low-resolution domain query
pub fn is_low_res_domain_query(url: &str) -> bool {
    IconProvider::classify_str(url) == IconProvider::GoogleDomain
}

/// Ordered, de-duplicated candidate icon URLs for `link_url`
///
/// `preferred` (a previously chosen icon) always comes first. An unparseable
/// link URL yields only the preference, if any.
pub fn favicon_candidates(link_url: &str, preferred: Option<&str>) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(preferred) = preferred.map(str::trim).filter(|p| !p.is_empty()) {
        candidates.push(preferred.to_string());
    }

    let Ok(url) = Url::parse(link_url) else {
        return candidates;
    };
    let Some(host) = url.host_str().map(str::to_string) else {
        return candidates;
    };
    let origin = url.origin().ascii_serialization();

    let same_origin = ROOT_ICON_PATHS
        .iter()
        .chain(ASSET_ICON_PATHS.iter())
        .chain(std::iter::once(&GENERIC_ASSET_PATH))
        .map(|path| format!("{}{}", origin, path));

    let third_party = [
        service_url(
            &format!("https://{}{}", GOOGLE_S2_HOST, GOOGLE_S2_PATH),
            &[("domain_url", origin.as_str()), ("sz", "128")],
        ),
        service_url(
            &format!("https://{}{}", GSTATIC_HOST, GSTATIC_PATH),
            &[
                ("client", "SOCIAL"),
                ("type", "FAVICON"),
                ("fallback_opts", "TYPE,SIZE,URL"),
                ("url", origin.as_str()),
                ("size", "128"),
            ],
        ),
        service_url(
            &format!("https://{}{}", GOOGLE_S2_HOST, GOOGLE_S2_PATH),
            &[("domain", host.as_str()), ("sz", "64")],
        ),
        Some(format!("https://{}/ip3/{}.ico", DUCKDUCKGO_HOST, host)),
    ];

    for candidate in same_origin.chain(third_party.into_iter().flatten()) {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

fn service_url(base: &str, params: &[(&str, &str)]) -> Option<String> {
    Url::parse_with_params(base, params).ok().map(String::from)
}

/// Append a per-run token so cached responses are bypassed
pub fn with_cache_bust(url: &str, token: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().append_pair("_tabdeck", token);
            parsed.into()
        }
        Err(_) => url.to_string(),
    }
}
