use anyhow::Result;

use tabdeck_core::{links::LinkBook, storage::Storage};

pub async fn run(store: &dyn Storage, id_or_name: &str) -> Result<()> {
    let mut book = LinkBook::new(store.load_links().await?);

    let Some(id) = book.find(id_or_name).map(|l| l.id.clone()) else {
        println!("No link named '{}'.", id_or_name);
        return Ok(());
    };

    let removed = book.remove(&id)?;
    store.save_links(book.into_links()).await?;

    // The stored favicon choice goes with the link
    let mut preferences = store.load_favicon_preferences().await?;
    if preferences.remove(&removed.id).is_some() {
        store.save_favicon_preferences(preferences).await?;
    }

    println!("Removed: {} ({})", removed.name, removed.url);
    Ok(())
}
