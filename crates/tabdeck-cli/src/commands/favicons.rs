use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use tabdeck_core::{
    favicon::{favicon_candidates, FaviconResolver, HttpImageProbe, RefreshProgress},
    links::LinkBook,
    storage::Storage,
    AppConfig,
};

pub async fn refresh(config: &AppConfig, store: Arc<dyn Storage>) -> Result<()> {
    let links = store.load_links().await?;
    if links.is_empty() {
        println!("No links to refresh.");
        return Ok(());
    }

    let probe = Arc::new(HttpImageProbe::new(&config.favicon)?);
    let resolver = FaviconResolver::new(probe, store, &config.favicon);
    resolver.load().await?;

    let (tx, mut rx) = mpsc::unbounded_channel::<RefreshProgress>();
    let printer = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            print!("\rProbing favicons [{}/{}]", progress.done, progress.total);
            io::stdout().flush().ok();
        }
        println!();
    });

    let result = resolver.refresh_all_favicons(&links, Some(&tx)).await;
    drop(tx);
    printer.await?;

    let summary = result?;
    println!(
        "Resolved {} of {} links",
        summary.resolved, summary.total
    );
    Ok(())
}

pub async fn show(store: &dyn Storage, id_or_name: &str) -> Result<()> {
    let book = LinkBook::new(store.load_links().await?);
    let Some(link) = book.find(id_or_name) else {
        println!("No link named '{}'.", id_or_name);
        return Ok(());
    };

    let preferences = store.load_favicon_preferences().await?;
    let preferred = preferences.get(&link.id).map(String::as_str);

    println!("{} ({})\n", link.name, link.url);
    for (i, candidate) in favicon_candidates(&link.url, preferred).iter().enumerate() {
        let marker = if Some(candidate.as_str()) == preferred {
            "*"
        } else {
            " "
        };
        println!(" {} {:>2}. {}", marker, i + 1, candidate);
    }
    if preferred.is_none() {
        println!("\nNo stored preference yet.");
    }

    Ok(())
}
