use anyhow::Result;

use tabdeck_core::{
    links::{display_host, IconSource},
    storage::Storage,
};

pub async fn run(store: &dyn Storage) -> Result<()> {
    let links = store.load_links().await?;

    if links.is_empty() {
        println!("No links yet.");
        println!("\nTo add one, run:");
        println!("  tabdeck add <url> -n <name>");
        return Ok(());
    }

    let preferences = store.load_favicon_preferences().await?;

    println!("Links ({}):\n", links.len());

    for link in &links {
        let tags = if link.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", link.tags.join(", "))
        };
        println!("  {} - {}{}", link.name, display_host(&link.url).unwrap_or_default(), tags);
        println!("    URL: {}", link.url);
        println!("    ID: {}", link.id);

        let icon = match &link.icon {
            IconSource::Auto => preferences
                .get(&link.id)
                .cloned()
                .unwrap_or_else(|| "(not resolved)".to_string()),
            IconSource::Custom { url } => format!("{} (custom)", url),
            IconSource::Disabled => "(disabled)".to_string(),
        };
        println!("    Icon: {}", icon);

        if let Some(last) = link.access_log.last() {
            println!("    Last opened: {}", last.format("%Y-%m-%d %H:%M"));
        }
        println!();
    }

    Ok(())
}
