// Text rendering of the dashboard snapshot for the console.

use crate::interface_adapters::protocol::seconds_since;
use crate::use_cases::DashboardSnapshot;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Formats a coordinate the way the dashboard displays it (no trailing `.0`).
pub fn format_coord(value: f64) -> String {
    // Normalizes -0.0 left behind by rounding small negatives.
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

pub fn render(snapshot: &DashboardSnapshot, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = write_view(&mut out, snapshot, now);
    out
}

fn write_view(
    out: &mut String,
    snapshot: &DashboardSnapshot,
    now: DateTime<Utc>,
) -> std::fmt::Result {
    let projection = &snapshot.projection;
    writeln!(out, "Status: {}", snapshot.connection)?;
    writeln!(
        out,
        "X: {}  Y: {}  Z: {}",
        format_coord(projection.position.x),
        format_coord(projection.position.y),
        format_coord(projection.position.z)
    )?;
    if let (Some(player), Some(world)) = (&projection.player, &projection.world) {
        writeln!(out, "Player: {player} | World: {world}")?;
    }

    writeln!(out)?;
    writeln!(out, "Players")?;
    if snapshot.players.is_empty() {
        writeln!(out, "  No players online")?;
    }
    for player in &snapshot.players {
        let marker = if snapshot.selected.as_deref() == Some(player.name.as_str()) {
            '*'
        } else {
            ' '
        };
        writeln!(
            out,
            "{marker} {}  X: {}  Y: {}  Z: {}  World: {}  Updated: {}s ago",
            player.name,
            format_coord(player.position.x),
            format_coord(player.position.y),
            format_coord(player.position.z),
            player.world,
            seconds_since(player.last_update, now)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Saved locations")?;
    if snapshot.locations.is_empty() {
        writeln!(out, "  No saved locations yet")?;
    }
    for (index, location) in snapshot.locations.iter().enumerate() {
        writeln!(
            out,
            "  [{index}] {}  X: {}, Y: {}, Z: {}  Saved: {}",
            location.name,
            format_coord(location.x),
            format_coord(location.y),
            format_coord(location.z),
            location.timestamp
        )?;
    }
    Ok(())
}
