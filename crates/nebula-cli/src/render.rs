//! Text and JSON views of engine results, shared by the CLI and the MCP
//! tools.

use std::fmt::Write as _;

use nebula_core::{
    AwardReport, Avatar, Item, MissionCheck, MissionStatus, NarrativeHook, Status, VitalsReport,
};
use serde_json::{Value, json};

pub fn avatar_label(avatar: Avatar) -> String {
    match avatar {
        Avatar::Stage(tier) => format!("{} portrait", tier.label()),
        other => format!("{other:?}"),
    }
}

pub fn cargo_line(items: &[Item]) -> String {
    if items.is_empty() {
        return "(empty)".to_string();
    }
    items
        .iter()
        .map(|i| i.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn mission_line(mission: &MissionStatus) -> String {
    match mission {
        MissionStatus::Idle => "idle".to_string(),
        MissionStatus::Active {
            destination,
            remaining_secs,
        } => format!("{destination}, {:.0}s left", remaining_secs.ceil()),
        MissionStatus::Returning { destination } => format!("{destination}, returning"),
    }
}

pub fn status_text(status: &Status) -> String {
    let mut out = String::new();
    let v = &status.vitals;
    let _ = writeln!(out, "name:       {}", status.name);
    let _ = writeln!(
        out,
        "tier:       {} ({:.0} xp)",
        status.tier, status.experience
    );
    let _ = writeln!(
        out,
        "mood:       {} ({})",
        status.presentation.mood,
        avatar_label(status.presentation.avatar)
    );
    let _ = writeln!(out, "trait:      {}", status.disposition);
    let _ = writeln!(out, "hunger:     {:.1}", v.hunger());
    let _ = writeln!(out, "happiness:  {:.1}", v.happiness());
    let _ = writeln!(out, "energy:     {:.1}", v.energy());
    let _ = writeln!(out, "mission:    {}", mission_line(&status.mission));
    let _ = write!(out, "cargo:      {}", cargo_line(&status.cargo));
    out
}

pub fn award_text(award: &AwardReport) -> String {
    match award.transition {
        Some(t) => format!("+{} xp, evolved {} -> {}", award.amount, t.from, t.to),
        None => format!("+{} xp", award.amount),
    }
}

// The JSON views below go to the chat host. They carry labels only: no
// vitals, experience, durations or timestamps.

pub fn award_view(award: &AwardReport) -> Value {
    json!({
        "tier": award.tier.label(),
        "evolved": award.transition.map(|t| t.to.label()),
    })
}

pub fn sync_view(report: &VitalsReport) -> Value {
    json!({ "clock_skew": report.clock_skew })
}

pub fn hooks_json(hooks: &[NarrativeHook]) -> Value {
    Value::from(hooks.iter().map(ToString::to_string).collect::<Vec<_>>())
}

fn mission_view(mission: &MissionStatus) -> Value {
    match mission {
        MissionStatus::Idle => Value::Null,
        MissionStatus::Active { destination, .. } => json!({
            "destination": destination.name(),
            "state": "active",
        }),
        MissionStatus::Returning { destination } => json!({
            "destination": destination.name(),
            "state": "returning",
        }),
    }
}

pub fn companion_view(status: &Status) -> Value {
    let mood = status.presentation.mood;
    json!({
        "name": status.name,
        "mood": mood.label(),
        "voice": mood.tone(),
        "avatar": avatar_label(status.presentation.avatar),
        "idle_animation_due": status.presentation.idle_animation_due,
        "tier": status.tier.label(),
        "trait": status.disposition.label(),
        "mission": mission_view(&status.mission),
        "cargo": status.cargo.iter().map(|i| i.label()).collect::<Vec<_>>(),
    })
}

pub fn mission_check_view(check: &MissionCheck) -> Value {
    match check {
        MissionCheck::Idle => json!({ "state": "idle" }),
        MissionCheck::InFlight { .. } => json!({ "state": "in_flight" }),
        MissionCheck::Completed(report) => json!({
            "state": "completed",
            "destination": report.mission.destination.name(),
            "award": award_view(&report.award),
            "found": report.found.map(Item::label),
            "dropped": report.dropped.map(Item::label),
            "clock_skew": report.vitals.clock_skew,
        }),
    }
}
