use anyhow::Result;

use tabdeck_core::{
    links::{normalize_url, IconSource, LinkBook, LinkPatch},
    storage::Storage,
};

pub async fn run(store: &dyn Storage, id_or_name: &str, mut patch: LinkPatch) -> Result<()> {
    let mut book = LinkBook::new(store.load_links().await?);

    let Some(before) = book.find(id_or_name).cloned() else {
        println!("No link named '{}'.", id_or_name);
        return Ok(());
    };

    if let Some(IconSource::Custom { url }) = &mut patch.icon {
        *url = normalize_url(url)?;
    }

    let link = book.update(&before.id, patch)?.clone();
    store.save_links(book.into_links()).await?;

    // A new address or icon setting makes the stored favicon choice stale
    if link.url != before.url || link.icon != before.icon {
        let mut preferences = store.load_favicon_preferences().await?;
        if preferences.remove(&link.id).is_some() {
            store.save_favicon_preferences(preferences).await?;
        }
    }

    println!("Updated: {} - {} ({})", link.name, link.url, link.id);
    Ok(())
}

/// `auto`, `none` or an image URL
pub fn parse_icon(value: &str) -> std::result::Result<IconSource, String> {
    match value.trim() {
        "" => Err("expected auto, none or an image URL".to_string()),
        v if v.eq_ignore_ascii_case("auto") => Ok(IconSource::Auto),
        v if v.eq_ignore_ascii_case("none") => Ok(IconSource::Disabled),
        url => Ok(IconSource::Custom {
            url: url.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_icon() {
        assert_eq!(parse_icon("auto"), Ok(IconSource::Auto));
        assert_eq!(parse_icon("NONE"), Ok(IconSource::Disabled));
        assert_eq!(
            parse_icon(" https://a.com/logo.png "),
            Ok(IconSource::Custom {
                url: "https://a.com/logo.png".to_string()
            })
        );
        assert!(parse_icon("  ").is_err());
    }
}
