use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::EnvFilter;

use reverie::api::ApiClient;
use reverie::config::AppConfig;
use reverie::emotion::{classify_entry, EntryBadge};
use reverie::journal::{JournalEntry, JournalRepository};
use reverie::stats::{from_counts, window_snapshot, MoodWindow};

fn main() {
    if let Err(error) = run() {
        eprintln!("reverie failed: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reverie=debug")),
        )
        .init();

    let config = AppConfig::load();
    tracing::info!("Analysis service: {}", config.backend_url);

    let client = ApiClient::new(config.backend_url.clone(), config.backend_token.clone());
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(render_dashboard(client, &config))
}

async fn render_dashboard(client: ApiClient, config: &AppConfig) -> Result<()> {
    let mut repository = JournalRepository::new(client.clone());
    let now = Local::now();

    // A failed refresh degrades to an empty dashboard; it never aborts.
    let entries: Vec<JournalEntry> = match repository.list(config.history_limit).await {
        Ok(entries) => entries.to_vec(),
        Err(error) => {
            tracing::warn!("Failed to refresh journal history: {}", error);
            Vec::new()
        }
    };

    let snapshot = window_snapshot(&entries, MoodWindow::Days(config.window_days), &now);
    println!("Mood over the last {} days", config.window_days);
    println!(
        "  entries: {}   streak: {} day(s)   positive: {}%",
        snapshot.total_entries, snapshot.streak, snapshot.positive_ratio
    );
    println!("  most common: {}", snapshot.most_common);
    for stat in &snapshot.stats {
        println!("  {:>3}%  {} ({})", stat.percentage, stat.emotion, stat.count);
    }

    // The service's pre-aggregated view of the same window, when reachable.
    match client.mood_stats(config.window_days).await {
        Ok(stats) => {
            let remote = from_counts(
                &stats.distribution_pairs(),
                stats.total_entries,
                snapshot.streak,
            );
            println!(
                "\nService view: {} entries, most common {}",
                remote.total_entries, remote.most_common
            );
        }
        Err(error) => {
            tracing::warn!("Failed to fetch mood stats: {}", error);
        }
    }

    match client.reflection_provider().await {
        Ok(status) => {
            println!(
                "\nReflection provider: {} (available: {})",
                status.current_provider,
                status.available_providers.join(", ")
            );
        }
        Err(error) => {
            tracing::warn!("Failed to fetch reflection provider: {}", error);
        }
    }

    println!("\nRecent entries");
    for entry in entries.iter().take(5) {
        let stamp = entry
            .created_at
            .with_timezone(&now.timezone())
            .format("%Y-%m-%d %H:%M");
        println!("  [{}] {}", stamp, badge_line(entry));
    }

    Ok(())
}

fn badge_line(entry: &JournalEntry) -> String {
    match classify_entry(&entry.emotion, entry.emotion_metadata.as_ref()) {
        EntryBadge::Confused { primary, others, .. } => {
            let mut line = "feeling confused".to_string();
            if let Some(primary) = primary {
                line.push_str(&format!(" · {}", primary));
            }
            if !others.is_empty() {
                line.push_str(&format!(" (also {})", others.join(", ")));
            }
            line
        }
        EntryBadge::Mixed { emotions } => {
            let parts: Vec<String> = emotions
                .iter()
                .map(|sub| format!("{} {}%", sub.label, sub.confidence_pct))
                .collect();
            format!("mixed feelings: {}", parts.join(", "))
        }
        EntryBadge::Single { style, .. } => style.label.to_string(),
    }
}
