//! Command handlers behind the `leafwatch` subcommands.

mod watch;

pub(crate) use watch::watch;

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Local;
use tokio::sync::watch as watch_channel;

use crate::classifier::HttpClassifier;
use crate::cli::{ConfigCommand, HistoryCommand};
use crate::diagnosis::Diagnosis;
use crate::events::EventBus;
use crate::labels::parse_label;
use crate::models::HistoryEntry;
use crate::settings::{Settings, SettingsStore};
use crate::status::{check_once, ApiStatus};
use crate::upload::classify_file;
use crate::AppState;

pub(crate) fn config(store: &SettingsStore, action: &ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&store.settings())?);
        }
        ConfigCommand::SetApiUrl { url } => {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("API URL must start with http:// or https://");
            }
            store.update_api_url(url.trim_end_matches('/').to_string())?;
            println!("API URL set to {url}");
        }
    }
    Ok(())
}

pub(crate) async fn status(settings: &Settings) -> Result<()> {
    let classifier = HttpClassifier::new(&settings.api)?;
    let (status_tx, _status_rx) = watch_channel::channel(ApiStatus::Checking);

    match check_once(&classifier, &status_tx, &EventBus::default()).await {
        ApiStatus::Online => println!("online: {}", settings.api.api_url),
        _ => println!(
            "offline: make sure the prediction backend is running at {}",
            settings.api.api_url
        ),
    }
    Ok(())
}

pub(crate) async fn classify(app: &AppState, settings: &Settings, path: &Path) -> Result<()> {
    let classifier = HttpClassifier::new(&settings.api)?;
    let entry = classify_file(app, &classifier, path)
        .await
        .with_context(|| format!("could not classify {}", path.display()))?;

    print!("{}", Diagnosis::from_result(&entry.result).render());
    println!("saved as {}", entry.id);
    Ok(())
}

pub(crate) async fn history(app: &AppState, action: HistoryCommand) -> Result<()> {
    match action {
        HistoryCommand::List => {
            let entries = app.history.entries().await;
            if entries.is_empty() {
                println!("no predictions yet");
            }
            for (index, entry) in entries.iter().enumerate() {
                println!("{}", summary_line(index, entry));
            }
        }
        HistoryCommand::Show { id } => {
            let Some(entry) = app.history.get(&id).await else {
                bail!("no history entry with id {id}");
            };
            print_entry(&entry);
        }
        HistoryCommand::Remove { id } => {
            if !app.history.remove(&id).await? {
                bail!("no history entry with id {id}");
            }
            println!("removed {id}");
        }
        HistoryCommand::Clear { yes } => {
            if !yes {
                bail!("this deletes every saved prediction; pass --yes to confirm");
            }
            app.history.clear().await?;
            println!("history cleared");
        }
    }
    Ok(())
}

pub(crate) fn summary_line(index: usize, entry: &HistoryEntry) -> String {
    let parsed = parse_label(&entry.result.label);
    format!(
        "{:>2}  {}  {} ({}%)  {}",
        index,
        entry.id,
        parsed.display_name(),
        entry.result.confidence_percent(),
        entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
    )
}

pub(crate) fn print_entry(entry: &HistoryEntry) {
    println!(
        "{}  {}",
        entry.id,
        entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
    print!("{}", Diagnosis::from_result(&entry.result).render());
    println!("preview: {} bytes", entry.image_preview.len());
}
