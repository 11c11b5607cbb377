use std::io::{self, Read};

use anyhow::Result;

use tabdeck_core::{
    links::{parse_clipboard_links, LinkBook},
    storage::Storage,
};

pub async fn run(store: &dyn Storage) -> Result<()> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;

    let candidates = parse_clipboard_links(&text);
    if candidates.is_empty() {
        println!("No links found in input.");
        return Ok(());
    }
    println!("Found {} links\n", candidates.len());

    let mut book = LinkBook::new(store.load_links().await?);
    let mut imported = 0u32;
    let mut skipped = 0u32;

    for candidate in candidates {
        if book.links().iter().any(|l| l.url == candidate.url) {
            println!("  {} ... already added", candidate.url);
            skipped += 1;
            continue;
        }
        match book.add(candidate) {
            Ok(link) => {
                println!("  {} ... added as '{}'", link.url, link.name);
                imported += 1;
            }
            Err(e) => {
                println!("  skipped: {}", e);
                skipped += 1;
            }
        }
    }

    if imported > 0 {
        store.save_links(book.into_links()).await?;
    }

    println!("\nImported: {}, skipped: {}", imported, skipped);
    Ok(())
}
