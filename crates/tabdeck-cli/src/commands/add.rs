use anyhow::Result;

use tabdeck_core::{
    links::{LinkBook, NewLink},
    storage::Storage,
};

pub async fn run(store: &dyn Storage, url: &str, name: Option<String>, tags: Vec<String>) -> Result<()> {
    let mut book = LinkBook::new(store.load_links().await?);

    let link = book.add(NewLink {
        name,
        url: url.to_string(),
        tags,
    })?;
    println!("Added: {} - {} ({})", link.name, link.url, link.id);

    store.save_links(book.into_links()).await?;
    Ok(())
}
