// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `delaydesk seed` command implementation.
//!
//! Fills the store with random but plausible delay reports so the dashboard
//! has something to show.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use delaydesk_config::DelayDeskConfig;
use delaydesk_core::{DelayError, DelayFilter, DelayStatus, DelayStore, NewDelayReport};
use delaydesk_storage::SqliteStore;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

pub const NEIGHBORHOODS: [&str; 10] = [
    "Downtown",
    "Midtown",
    "Uptown",
    "Eastside",
    "Westside",
    "North End",
    "South Park",
    "Central District",
    "Riverside",
    "Harbor View",
];

pub const REASONS: [&str; 6] = [
    "Mechanical Breakdown",
    "Traffic Congestion",
    "Weather Conditions",
    "Accident",
    "Construction",
    "Other",
];

pub const ROUTES: [&str; 8] = [
    "Route 1",
    "Route 2",
    "Route 3",
    "Route 4",
    "Route 5",
    "Route 42",
    "Route 101",
    "Route 202",
];

const WINDOW_SECS: i64 = 7 * 24 * 60 * 60;
const ACTIVE_SHARE: f64 = 0.7;

/// Builds `count` random reports dated within the week before `now`.
pub fn generate_reports<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<NewDelayReport> {
    (0..count)
        .map(|_| NewDelayReport {
            route_number: pick(rng, &ROUTES),
            neighborhood: pick(rng, &NEIGHBORHOODS),
            delay_minutes: rng.gen_range(5..65),
            reason: pick(rng, &REASONS),
            bus_id: format!("BUS-{:04}", rng.gen_range(0..10_000)),
            reported_at: (now - Duration::seconds(rng.gen_range(0..WINDOW_SECS))).trunc_subsecs(3),
            status: if rng.gen_bool(ACTIVE_SHARE) {
                DelayStatus::Active
            } else {
                DelayStatus::Resolved
            },
        })
        .collect()
}

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&str]) -> String {
    items.choose(rng).copied().unwrap_or_default().to_string()
}

/// Inserts `count` random reports, clearing the table first unless `keep`.
///
/// Returns per-neighborhood counts over all statuses, largest first.
pub async fn seed_store(
    store: &dyn DelayStore,
    count: usize,
    keep: bool,
) -> Result<Vec<(String, u64)>, DelayError> {
    if !keep {
        let removed = store.clear().await?;
        info!(removed, "cleared existing delay reports");
    }

    let reports = generate_reports(&mut rand::thread_rng(), count, Utc::now());
    for report in reports {
        store.insert(report).await?;
    }
    info!(count, "inserted sample delay reports");

    let mut summary: Vec<(String, u64)> = store
        .group_by_neighborhood(DelayFilter::all())
        .await?
        .into_iter()
        .map(|g| (g.neighborhood, g.count))
        .collect();
    summary.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(summary)
}

/// Runs the `delaydesk seed` command.
pub async fn run_seed(config: DelayDeskConfig, count: usize, keep: bool) -> Result<(), DelayError> {
    crate::serve::init_tracing(&config.log.level);

    let store = SqliteStore::open(&config.storage).await?;
    let summary = seed_store(&store, count, keep).await?;
    store.close().await?;

    println!("Inserted {count} delay reports into {}", config.storage.database_path);
    println!("Delays by neighborhood:");
    for (neighborhood, n) in summary {
        println!("  {neighborhood}: {n}");
    }
    Ok(())
}
