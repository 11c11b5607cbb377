use url::Url;

use crate::{Error, Result};

/// Normalize user input into an absolute http(s) URL
///
/// Input without a scheme is treated as https.
pub fn normalize_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidLink("empty URL".to_string()));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches("//"))
    };

    let url = Url::parse(&candidate)?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidLink(format!("unsupported scheme: {}", other)));
        }
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::InvalidLink(format!("missing host: {}", trimmed)));
    }

    Ok(url.to_string())
}

/// Host without a leading `www.`, used to name links that only have a URL
pub fn display_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

fn has_scheme(input: &str) -> bool {
    match input.find("://") {
        Some(idx) => input[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_https_scheme() {
        assert_eq!(normalize_url("example.com").unwrap(), "https://example.com/");
        assert_eq!(
            normalize_url("  github.com/rust-lang  ").unwrap(),
            "https://github.com/rust-lang"
        );
    }

    #[test]
    fn test_keeps_http_scheme() {
        assert_eq!(
            normalize_url("http://localhost:8080/x").unwrap(),
            "http://localhost:8080/x"
        );
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(normalize_url("ftp://example.com").is_err());
        assert!(normalize_url("").is_err());
        assert!(normalize_url("   ").is_err());
    }

    #[test]
    fn test_display_host() {
        assert_eq!(display_host("https://www.rust-lang.org/").as_deref(), Some("rust-lang.org"));
        assert_eq!(display_host("https://docs.rs/").as_deref(), Some("docs.rs"));
        assert_eq!(display_host("not a url"), None);
    }
}
