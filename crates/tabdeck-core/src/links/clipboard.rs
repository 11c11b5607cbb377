use super::normalize::{display_host, normalize_url};
use super::NewLink;

/// Parse pasted text into link candidates, one per usable line
///
/// Accepted shapes: `[Name](url)`, `Name | url`, `Name url`, and a bare URL.
/// Lines that do not yield a valid http(s) URL are skipped.
pub fn parse_clipboard_links(text: &str) -> Vec<NewLink> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<NewLink> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (name, raw_url) = split_markdown(line)
        .or_else(|| split_pipe(line))
        .or_else(|| split_trailing_url(line))
        .unwrap_or((None, line));

    let url = normalize_url(raw_url).ok()?;
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| display_host(&url));

    Some(NewLink {
        name,
        url,
        tags: Vec::new(),
    })
}

fn split_markdown(line: &str) -> Option<(Option<&str>, &str)> {
    let rest = line.strip_prefix('[')?;
    let (name, rest) = rest.split_once("](")?;
    let url = rest.strip_suffix(')')?;
    Some((Some(name), url.trim()))
}

fn split_pipe(line: &str) -> Option<(Option<&str>, &str)> {
    let (name, url) = line.rsplit_once('|')?;
    Some((Some(name), url.trim()))
}

fn split_trailing_url(line: &str) -> Option<(Option<&str>, &str)> {
    let (name, url) = line.rsplit_once(char::is_whitespace)?;
    let url = url.trim_start_matches('<').trim_end_matches('>');
    if url.contains("://") || url.contains('.') {
        Some((Some(name), url))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_supported_shapes() {
        let text = "\
[Rust](https://www.rust-lang.org)
Docs | docs.rs
Crates <https://crates.io>
https://www.github.com/

not a link at all
";
        let links = parse_clipboard_links(text);
        let pairs: Vec<(String, String)> = links
            .into_iter()
            .map(|l| (l.name.unwrap_or_default(), l.url))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Rust".to_string(), "https://www.rust-lang.org/".to_string()),
                ("Docs".to_string(), "https://docs.rs/".to_string()),
                ("Crates".to_string(), "https://crates.io/".to_string()),
                ("github.com".to_string(), "https://www.github.com/".to_string()),
            ]
        );
    }

    #[test]
    fn test_skips_invalid_scheme() {
        assert!(parse_clipboard_links("Files | ftp://example.com").is_empty());
    }
}
