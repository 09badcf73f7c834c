//! Text and JSON rendering for `kefctl`

use anyhow::Result;
use kef_sdk::{ConfigEntry, PlayerSnapshot};

pub fn render_snapshot(snapshot: &PlayerSnapshot, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(snapshot)?);
    }
    Ok(render_text(snapshot))
}

fn render_text(snapshot: &PlayerSnapshot) -> String {
    let mut lines = Vec::new();

    let name = snapshot.name.as_deref().unwrap_or(&snapshot.host);
    lines.push(format!("{} ({})", name, snapshot.host));

    let state = snapshot
        .state
        .map(|state| state.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let source = snapshot
        .source
        .as_ref()
        .map(|source| source.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    lines.push(format!("  State:   {} on {}", state, source));

    let muted = if snapshot.is_volume_muted == Some(true) { ", muted" } else { "" };
    lines.push(format!(
        "  Volume:  {} (max {}){}",
        percent(snapshot.volume_level),
        percent(snapshot.volume_max),
        muted
    ));

    if let Some(title) = &snapshot.media_title {
        let mut track = title.clone();
        if let Some(artist) = &snapshot.media_artist {
            track.push_str(&format!(" - {}", artist));
        }
        lines.push(format!("  Track:   {}", track));
    }

    if let Some(album) = &snapshot.media_album_name {
        lines.push(format!("  Album:   {}", album));
    }

    if let (Some(position), Some(duration)) = (snapshot.media_position, snapshot.media_duration) {
        lines.push(format!("  Time:    {} / {}", clock(position), clock(duration)));
    }

    if let Some(app) = &snapshot.app_name {
        lines.push(format!("  Service: {}", app));
    }

    lines.push(format!(
        "  Accepts: {}",
        snapshot.supported_features.names().join(", ")
    ));

    lines.join("\n")
}

pub fn render_entries(entries: &[ConfigEntry]) -> String {
    if entries.is_empty() {
        return "No speakers configured. Add one with `kefctl setup <host>`.".to_string();
    }

    entries
        .iter()
        .map(|entry| {
            format!(
                "{}\t{}\tadded {}",
                entry.host,
                entry.title,
                entry.created_at.format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn percent(fraction: Option<f64>) -> String {
    match fraction {
        Some(value) => format!("{:.0}%", value * 100.0),
        None => "?".to_string(),
    }
}

fn clock(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
