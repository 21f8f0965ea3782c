// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delay report CRUD and scan operations.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use delaydesk_core::types::now_millis;
use delaydesk_core::{
    DelayError, DelayFilter, DelayId, DelayReport, DelaySort, DelayStatus, NeighborhoodTotals,
    NewDelayReport,
};
use rusqlite::types::{Type, Value};
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use crate::database::{Database, map_tr_err};

const REPORT_COLUMNS: &str = "id, route_number, neighborhood, delay_minutes, reason, bus_id, \
                              reported_at, status, created_at, updated_at";

/// Fixed-width RFC 3339 so that text order matches time order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<DelayReport> {
    let status: String = row.get(7)?;
    let status = DelayStatus::from_str(&status)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(DelayReport {
        id: DelayId(row.get(0)?),
        route_number: row.get(1)?,
        neighborhood: row.get(2)?,
        delay_minutes: row.get(3)?,
        reason: row.get(4)?,
        bus_id: row.get(5)?,
        reported_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
        status,
        created_at: parse_timestamp(8, &row.get::<_, String>(8)?)?,
        updated_at: parse_timestamp(9, &row.get::<_, String>(9)?)?,
    })
}

/// `WHERE` clause and its bound values for a filter.
pub(crate) fn filter_clause(filter: DelayFilter) -> (&'static str, Vec<Value>) {
    match filter.status {
        Some(status) => ("WHERE status = ?", vec![Value::Text(status.to_string())]),
        None => ("", Vec::new()),
    }
}

fn order_clause(sort: DelaySort) -> &'static str {
    match sort {
        DelaySort::ReportedAtDesc => "ORDER BY reported_at DESC, rowid DESC",
        DelaySort::ReportedAtAsc => "ORDER BY reported_at ASC, rowid ASC",
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Insert a validated report, assigning a fresh id and write timestamps.
pub async fn insert_report(db: &Database, report: NewDelayReport) -> Result<DelayReport, DelayError> {
    let now = now_millis();
    let stored = DelayReport {
        id: DelayId::generate(),
        route_number: report.route_number,
        neighborhood: report.neighborhood,
        delay_minutes: report.delay_minutes,
        reason: report.reason,
        bus_id: report.bus_id,
        reported_at: report.reported_at.trunc_subsecs(3),
        status: report.status,
        created_at: now,
        updated_at: now,
    };

    let row = stored.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO delays (id, route_number, neighborhood, delay_minutes, reason, \
                 bus_id, reported_at, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    row.id.as_str(),
                    row.route_number,
                    row.neighborhood,
                    row.delay_minutes,
                    row.reason,
                    row.bus_id,
                    format_timestamp(&row.reported_at),
                    row.status.to_string(),
                    format_timestamp(&row.created_at),
                    format_timestamp(&row.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

    Ok(stored)
}

/// Get a report by id.
pub async fn get_report(db: &Database, id: &DelayId) -> Result<Option<DelayReport>, DelayError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {REPORT_COLUMNS} FROM delays WHERE id = ?1"))?;
            stmt.query_row(params![id], report_from_row).optional()
        })
        .await
        .map_err(map_tr_err)
}

/// List reports matching `filter`, sorted, with offset/limit applied.
pub async fn list_reports(
    db: &Database,
    filter: DelayFilter,
    sort: DelaySort,
    offset: u64,
    limit: u64,
) -> Result<Vec<DelayReport>, DelayError> {
    let (where_sql, mut values) = filter_clause(filter);
    let sql = format!(
        "SELECT {REPORT_COLUMNS} FROM delays {where_sql} {} LIMIT ? OFFSET ?",
        order_clause(sort)
    );
    values.push(Value::Integer(to_sql_int(limit)));
    values.push(Value::Integer(to_sql_int(offset)));

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let reports = stmt
                .query_map(params_from_iter(values), report_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(reports)
        })
        .await
        .map_err(map_tr_err)
}

/// Count reports matching `filter`.
pub async fn count_reports(db: &Database, filter: DelayFilter) -> Result<u64, DelayError> {
    let (where_sql, values) = filter_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM delays {where_sql}");

    let count: i64 = db
        .connection()
        .call(move |conn| conn.query_row(&sql, params_from_iter(values), |row| row.get(0)))
        .await
        .map_err(map_tr_err)?;
    Ok(count.max(0).unsigned_abs())
}

/// Set a report's status and bump `updated_at`, returning the new state.
pub async fn update_status(
    db: &Database,
    id: &DelayId,
    status: DelayStatus,
) -> Result<Option<DelayReport>, DelayError> {
    let id = id.0.clone();
    let updated_at = format_timestamp(&now_millis());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "UPDATE delays SET status = ?1, updated_at = ?2 WHERE id = ?3 \
                 RETURNING {REPORT_COLUMNS}"
            ))?;
            stmt.query_row(params![status.to_string(), updated_at, id], report_from_row)
                .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a report, returning the row as it was just before deletion.
pub async fn delete_report(db: &Database, id: &DelayId) -> Result<Option<DelayReport>, DelayError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "DELETE FROM delays WHERE id = ?1 RETURNING {REPORT_COLUMNS}"
            ))?;
            stmt.query_row(params![id], report_from_row).optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Per-neighborhood count and delay sum, ordered by each group's first insert.
pub async fn group_by_neighborhood(
    db: &Database,
    filter: DelayFilter,
) -> Result<Vec<NeighborhoodTotals>, DelayError> {
    let (where_sql, values) = filter_clause(filter);
    let sql = format!(
        "SELECT neighborhood, COUNT(*), COALESCE(SUM(delay_minutes), 0), MIN(rowid) AS first_seen
         FROM delays {where_sql}
         GROUP BY neighborhood
         ORDER BY first_seen"
    );

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let groups = stmt
                .query_map(params_from_iter(values), |row| {
                    let count: i64 = row.get(1)?;
                    let total: i64 = row.get(2)?;
                    Ok(NeighborhoodTotals {
                        neighborhood: row.get(0)?,
                        count: count.max(0).unsigned_abs(),
                        total_delay_minutes: total.max(0).unsigned_abs(),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(groups)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every report. Returns how many rows were removed.
pub async fn delete_all(db: &Database) -> Result<u64, DelayError> {
    let removed = db
        .connection()
        .call(|conn| conn.execute("DELETE FROM delays", []))
        .await
        .map_err(map_tr_err)?;
    Ok(removed as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn make_report(neighborhood: &str, minutes: u32, reported_at: DateTime<Utc>) -> NewDelayReport {
        NewDelayReport {
            route_number: "Route 42".to_string(),
            neighborhood: neighborhood.to_string(),
            delay_minutes: minutes,
            reason: "Traffic Congestion".to_string(),
            bus_id: "BUS-0042".to_string(),
            reported_at,
            status: DelayStatus::Active,
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn timestamps_are_fixed_width() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(format_timestamp(&ts), "2026-03-04T05:06:07.000Z");
    }

    #[tokio::test]
    async fn insert_and_get_roundtrips() {
        let db = setup_db().await;
        let inserted = insert_report(&db, make_report("Downtown", 0, base_time()))
            .await
            .unwrap();

        let fetched = get_report(&db, &inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.delay_minutes, 0);
        assert_eq!(fetched.status, DelayStatus::Active);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let db = setup_db().await;
        let missing = get_report(&db, &DelayId::from("no-such-id")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_sorts_by_reported_at_and_pages() {
        let db = setup_db().await;
        for i in 0..5 {
            insert_report(&db, make_report("Downtown", i, base_time() + Duration::minutes(i.into())))
                .await
                .unwrap();
        }

        let desc = list_reports(&db, DelayFilter::all(), DelaySort::ReportedAtDesc, 0, 3)
            .await
            .unwrap();
        let minutes: Vec<u32> = desc.iter().map(|r| r.delay_minutes).collect();
        assert_eq!(minutes, vec![4, 3, 2]);

        let second = list_reports(&db, DelayFilter::all(), DelaySort::ReportedAtDesc, 3, 3)
            .await
            .unwrap();
        let minutes: Vec<u32> = second.iter().map(|r| r.delay_minutes).collect();
        assert_eq!(minutes, vec![1, 0]);

        let asc = list_reports(&db, DelayFilter::all(), DelaySort::ReportedAtAsc, 0, 2)
            .await
            .unwrap();
        let minutes: Vec<u32> = asc.iter().map(|r| r.delay_minutes).collect();
        assert_eq!(minutes, vec![0, 1]);
    }

    #[tokio::test]
    async fn equal_timestamps_keep_insertion_order() {
        let db = setup_db().await;
        for i in 0..3 {
            insert_report(&db, make_report("Uptown", i, base_time())).await.unwrap();
        }
        let desc = list_reports(&db, DelayFilter::all(), DelaySort::ReportedAtDesc, 0, 10)
            .await
            .unwrap();
        let minutes: Vec<u32> = desc.iter().map(|r| r.delay_minutes).collect();
        assert_eq!(minutes, vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn filter_and_count_by_status() {
        let db = setup_db().await;
        let a = insert_report(&db, make_report("Downtown", 10, base_time())).await.unwrap();
        insert_report(&db, make_report("Downtown", 20, base_time())).await.unwrap();
        update_status(&db, &a.id, DelayStatus::Resolved).await.unwrap();

        let active = DelayFilter::status(DelayStatus::Active);
        let resolved = DelayFilter::status(DelayStatus::Resolved);
        assert_eq!(count_reports(&db, active).await.unwrap(), 1);
        assert_eq!(count_reports(&db, resolved).await.unwrap(), 1);
        assert_eq!(count_reports(&db, DelayFilter::all()).await.unwrap(), 2);

        let listed = list_reports(&db, resolved, DelaySort::ReportedAtDesc, 0, 10)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, a.id);
    }

    #[tokio::test]
    async fn update_status_returns_new_state() {
        let db = setup_db().await;
        let inserted = insert_report(&db, make_report("Eastside", 15, base_time())).await.unwrap();

        let updated = update_status(&db, &inserted.id, DelayStatus::Resolved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, DelayStatus::Resolved);
        assert!(updated.updated_at >= inserted.updated_at);
        assert_eq!(updated.created_at, inserted.created_at);

        let missing = update_status(&db, &DelayId::from("nope"), DelayStatus::Resolved)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_returns_last_state_once() {
        let db = setup_db().await;
        let inserted = insert_report(&db, make_report("Westside", 5, base_time())).await.unwrap();

        let deleted = delete_report(&db, &inserted.id).await.unwrap().unwrap();
        assert_eq!(deleted, inserted);
        assert!(delete_report(&db, &inserted.id).await.unwrap().is_none());
        assert!(get_report(&db, &inserted.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn group_keeps_first_insertion_order() {
        let db = setup_db().await;
        insert_report(&db, make_report("Midtown", 10, base_time())).await.unwrap();
        insert_report(&db, make_report("Downtown", 20, base_time())).await.unwrap();
        insert_report(&db, make_report("Midtown", 25, base_time())).await.unwrap();
        let resolved = insert_report(&db, make_report("Riverside", 40, base_time()))
            .await
            .unwrap();
        update_status(&db, &resolved.id, DelayStatus::Resolved).await.unwrap();

        let groups = group_by_neighborhood(&db, DelayFilter::status(DelayStatus::Active))
            .await
            .unwrap();
        assert_eq!(
            groups,
            vec![
                NeighborhoodTotals {
                    neighborhood: "Midtown".into(),
                    count: 2,
                    total_delay_minutes: 35,
                },
                NeighborhoodTotals {
                    neighborhood: "Downtown".into(),
                    count: 1,
                    total_delay_minutes: 20,
                },
            ]
        );

        let all = group_by_neighborhood(&db, DelayFilter::all()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].neighborhood, "Riverside");
    }

    #[tokio::test]
    async fn group_on_empty_table_is_empty() {
        let db = setup_db().await;
        let groups = group_by_neighborhood(&db, DelayFilter::all()).await.unwrap();
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn delete_all_reports_count() {
        let db = setup_db().await;
        for i in 0..4 {
            insert_report(&db, make_report("Harbor View", i, base_time())).await.unwrap();
        }
        assert_eq!(delete_all(&db).await.unwrap(), 4);
        assert_eq!(count_reports(&db, DelayFilter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn table_rejects_blank_fields() {
        let db = setup_db().await;
        let mut report = make_report("Downtown", 1, base_time());
        report.bus_id = "   ".to_string();
        assert!(matches!(
            insert_report(&db, report).await,
            Err(DelayError::Storage { .. })
        ));
    }
}
