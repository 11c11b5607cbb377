use anyhow::Result;

use tabdeck_core::{
    links::{Background, SettingsPatch},
    storage::Storage,
};

pub async fn run(store: &dyn Storage, patch: SettingsPatch) -> Result<()> {
    let settings = if patch == SettingsPatch::default() {
        store.load_settings().await?
    } else {
        store.save_settings(patch).await?
    };

    println!("Grid: {} rows x {} columns", settings.grid_rows, settings.grid_columns);
    println!("Icon size: {}", settings.icon_size);
    println!(
        "Clock: {}{}",
        if settings.clock_24h { "24h" } else { "12h" },
        if settings.show_seconds { " with seconds" } else { "" }
    );
    println!("Open in new tab: {}", settings.open_in_new_tab);
    match &settings.background {
        Background::Solid { color } => println!("Background: {}", color),
        Background::Image { url } => println!("Background: image {}", url),
    }

    Ok(())
}
