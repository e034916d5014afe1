//! Portal connectivity and snapshot consistency check.
//!
//! Loads ~/.studiodesk/config.json, performs one snapshot fetch with the
//! session token from STUDIODESK_SESSION_TOKEN, and prints what a healthy
//! dashboard would render: entity counts, the unread invariant, and where
//! the milestone timeline cursor sits. Exits nonzero when the fetch fails.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use studiodesk::dashboard::store::SnapshotStore;
use studiodesk::dashboard::views::available_views;
use studiodesk::types::{timeline_position, TimelinePosition};
use studiodesk::{FetchOutcome, HttpPortalApi};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    println!("studiodesk portal doctor ({})", chrono::Utc::now().to_rfc3339());

    let config = match studiodesk::config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("portal: {}", config.base_url);

    let token = match std::env::var("STUDIODESK_SESSION_TOKEN") {
        Ok(t) if !t.is_empty() => t,
        _ => {
            eprintln!("error: STUDIODESK_SESSION_TOKEN is not set");
            return ExitCode::FAILURE;
        }
    };

    let api = match HttpPortalApi::new(
        &config.base_url,
        &token,
        Duration::from_secs(config.request_timeout_secs),
    ) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = SnapshotStore::new(api);
    match store.fetch().await {
        FetchOutcome::Ready => {}
        FetchOutcome::RedirectToLogin => {
            eprintln!("error: session rejected (token expired or invalid)");
            return ExitCode::FAILURE;
        }
        FetchOutcome::Failed => {
            eprintln!(
                "error: snapshot fetch failed: {}",
                store.error().unwrap_or_default()
            );
            return ExitCode::FAILURE;
        }
    }

    // The store was just fetched, so the snapshot is present.
    let Some(snapshot) = store.snapshot() else {
        eprintln!("error: no snapshot after a successful fetch");
        return ExitCode::FAILURE;
    };

    println!(
        "project:   #{} {} ({}, {}%)",
        snapshot.project.id,
        snapshot.project.name,
        snapshot.project.status_label(),
        snapshot.project.progress_percent()
    );
    println!(
        "counts:    {} milestones, {} messages, {} files, {} approvals",
        snapshot.milestones.len(),
        snapshot.messages.len(),
        snapshot.files.len(),
        snapshot.approvals.len()
    );
    println!(
        "views:     {}",
        available_views(&snapshot.project)
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    match timeline_position(&snapshot.milestones) {
        TimelinePosition::At(idx) => {
            println!("timeline:  at \"{}\"", snapshot.milestones[idx].title)
        }
        TimelinePosition::Complete => println!("timeline:  complete"),
    }

    if snapshot.unread_count_consistent() {
        println!("unread:    {} (badge consistent)", snapshot.unread_count);
    } else {
        println!(
            "unread:    badge {} but {} flagged messages (backend inconsistency)",
            snapshot.unread_count,
            snapshot.unread_messages()
        );
    }

    ExitCode::SUCCESS
}
