// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read side: paginated listing and per-neighborhood aggregation.

use std::cmp::Ordering;
use std::str::FromStr;

use delaydesk_core::parse::leading_integer;
use delaydesk_core::{
    DelayError, DelayFilter, DelayReport, DelaySort, DelayStatus, NeighborhoodSummary,
    NeighborhoodTotals, Page, Pagination, StatusFilter, ViolationKind,
};
use tracing::debug;

use crate::DelayService;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Parameters of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub status: StatusFilter,
    pub page: u64,
    pub page_size: u64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            status: StatusFilter::default(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    /// Builds a query from raw query-string values.
    ///
    /// `page` and `limit` take the leading integer of their text and fall
    /// back to the defaults when missing, unreadable, or below 1. A blank
    /// `status` means the default; an unrecognized one is rejected.
    pub fn from_raw(
        status: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> Result<Self, DelayError> {
        let status = match status.map(str::trim) {
            None | Some("") => StatusFilter::default(),
            Some(raw) => StatusFilter::from_str(raw)
                .map_err(|_| DelayError::invalid("status", ViolationKind::Unsupported))?,
        };

        Ok(Self {
            status,
            page: positive_or(page, DEFAULT_PAGE),
            page_size: positive_or(limit, DEFAULT_PAGE_SIZE),
        })
    }

    fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(leading_integer)
        .and_then(|n| u64::try_from(n).ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

/// Average of `total / count` rounded to two decimals, ties to even.
///
/// Rounding happens on the exact integer ratio, so binary float error never
/// pushes a value across a rounding boundary. Returns 0 for an empty group.
pub fn average_two_places(total: u64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let scaled = u128::from(total) * 100;
    let count = u128::from(count);
    let mut hundredths = scaled / count;
    let remainder = scaled % count;

    match (remainder * 2).cmp(&count) {
        Ordering::Greater => hundredths += 1,
        Ordering::Equal if hundredths % 2 == 1 => hundredths += 1,
        _ => {}
    }
    hundredths as f64 / 100.0
}

/// Turns raw group totals into summaries sorted by count, largest first.
///
/// The sort is stable, so groups with equal counts keep the store's order.
pub fn summarize(groups: Vec<NeighborhoodTotals>) -> Vec<NeighborhoodSummary> {
    let mut summaries: Vec<NeighborhoodSummary> = groups
        .into_iter()
        .map(|g| NeighborhoodSummary {
            avg_delay_minutes: average_two_places(g.total_delay_minutes, g.count),
            neighborhood: g.neighborhood,
            count: g.count,
            total_delay_minutes: g.total_delay_minutes,
        })
        .collect();
    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries
}

impl DelayService {
    /// Lists reports newest first, one page at a time.
    ///
    /// A page past the end yields no items rather than an error.
    pub async fn list(&self, query: ListQuery) -> Result<Page<DelayReport>, DelayError> {
        let filter = query.status.to_filter();
        let total = self.store.count(filter).await?;
        let items = self
            .store
            .find_many(filter, DelaySort::ReportedAtDesc, query.offset(), query.page_size)
            .await?;

        debug!(
            status = %query.status,
            page = query.page,
            returned = items.len(),
            total,
            "listed delays"
        );
        Ok(Page {
            items,
            pagination: Pagination::new(query.page, query.page_size, total),
        })
    }

    /// Per-neighborhood count, total, and average over active reports.
    pub async fn aggregate_by_neighborhood(
        &self,
    ) -> Result<Vec<NeighborhoodSummary>, DelayError> {
        let groups = self
            .store
            .group_by_neighborhood(DelayFilter::status(DelayStatus::Active))
            .await?;
        let summaries = summarize(groups);
        debug!(groups = summaries.len(), "aggregated delays by neighborhood");
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use delaydesk_core::{CreateDelayRequest, DelayStore};
    use delaydesk_storage::SqliteStore;
    use serde_json::json;

    async fn service() -> DelayService {
        let store = SqliteStore::open_in_memory().await.unwrap();
        DelayService::new(Arc::new(store))
    }

    async fn report(service: &DelayService, neighborhood: &str, minutes: u32) -> DelayReport {
        let req = CreateDelayRequest {
            route_number: Some("Route 1".into()),
            neighborhood: Some(neighborhood.into()),
            delay_minutes: Some(json!(minutes)),
            reason: Some("Weather Conditions".into()),
            bus_id: Some("BUS-1000".into()),
        };
        service.create(req).await.unwrap()
    }

    fn totals(neighborhood: &str, count: u64, total: u64) -> NeighborhoodTotals {
        NeighborhoodTotals {
            neighborhood: neighborhood.into(),
            count,
            total_delay_minutes: total,
        }
    }

    #[test]
    fn list_query_defaults() {
        let q = ListQuery::from_raw(None, None, None).unwrap();
        assert_eq!(q, ListQuery::default());
        assert_eq!(q.status, StatusFilter::Active);
        assert_eq!((q.page, q.page_size), (1, 10));
    }

    #[test]
    fn list_query_is_lenient_with_numbers() {
        let q = ListQuery::from_raw(Some("all"), Some("2abc"), Some(" 5 ")).unwrap();
        assert_eq!(q.status, StatusFilter::All);
        assert_eq!(q.page, 2);
        assert_eq!(q.page_size, 5);

        let q = ListQuery::from_raw(Some(""), Some("0"), Some("-3")).unwrap();
        assert_eq!(q, ListQuery::default());

        let q = ListQuery::from_raw(None, Some("next"), Some("many")).unwrap();
        assert_eq!(q, ListQuery::default());
    }

    #[test]
    fn list_query_rejects_unknown_status() {
        let err = ListQuery::from_raw(Some("pending"), None, None).unwrap_err();
        match err {
            DelayError::Validation { violations } => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "status");
                assert_eq!(violations[0].kind, ViolationKind::Unsupported);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn averages_round_to_two_places() {
        assert_eq!(average_two_places(60, 3), 20.0);
        assert_eq!(average_two_places(5, 1), 5.0);
        assert_eq!(average_two_places(50, 3), 16.67);
        assert_eq!(average_two_places(10, 3), 3.33);
        assert_eq!(average_two_places(0, 4), 0.0);
        assert_eq!(average_two_places(7, 0), 0.0);
    }

    #[test]
    fn exact_ties_round_to_even() {
        // 1/8 = 0.125 and 3/8 = 0.375
        assert_eq!(average_two_places(1, 8), 0.12);
        assert_eq!(average_two_places(3, 8), 0.38);
        // 41/16 = 2.5625 is not a tie at two places
        assert_eq!(average_two_places(41, 16), 2.56);
    }

    #[test]
    fn summarize_sorts_stably_by_count() {
        let out = summarize(vec![
            totals("Uptown", 1, 5),
            totals("Downtown", 3, 60),
            totals("Eastside", 1, 9),
        ]);
        let names: Vec<&str> = out.iter().map(|s| s.neighborhood.as_str()).collect();
        assert_eq!(names, vec!["Downtown", "Uptown", "Eastside"]);
        assert_eq!(out[0].avg_delay_minutes, 20.0);
    }

    #[tokio::test]
    async fn aggregate_matches_worked_example() {
        let service = service().await;
        for minutes in [10, 20, 30] {
            report(&service, "Downtown", minutes).await;
        }
        report(&service, "Uptown", 5).await;

        let out = service.aggregate_by_neighborhood().await.unwrap();
        assert_eq!(
            out,
            vec![
                NeighborhoodSummary {
                    neighborhood: "Downtown".into(),
                    count: 3,
                    total_delay_minutes: 60,
                    avg_delay_minutes: 20.0,
                },
                NeighborhoodSummary {
                    neighborhood: "Uptown".into(),
                    count: 1,
                    total_delay_minutes: 5,
                    avg_delay_minutes: 5.0,
                },
            ]
        );
    }

    #[tokio::test]
    async fn aggregate_ignores_resolved_reports() {
        let service = service().await;
        report(&service, "Riverside", 10).await;
        let resolved = report(&service, "Riverside", 50).await;
        let only_resolved = report(&service, "Harbor View", 7).await;
        service.resolve(&resolved.id).await.unwrap();
        service.resolve(&only_resolved.id).await.unwrap();

        let out = service.aggregate_by_neighborhood().await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].count, 1);
        assert_eq!(out[0].total_delay_minutes, 10);

        let active = service
            .store()
            .count(DelayFilter::status(DelayStatus::Active))
            .await
            .unwrap();
        assert_eq!(out.iter().map(|s| s.count).sum::<u64>(), active);
    }

    #[tokio::test]
    async fn aggregate_on_empty_store() {
        let service = service().await;
        assert!(service.aggregate_by_neighborhood().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_all_first_page_of_twelve() {
        let service = service().await;
        for i in 0..12 {
            report(&service, "Midtown", i).await;
        }

        let query = ListQuery {
            status: StatusFilter::All,
            page: 1,
            page_size: 10,
        };
        let page = service.list(query).await.unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(
            page.pagination,
            Pagination {
                current_page: 1,
                total_pages: 2,
                total_items: 12,
                items_per_page: 10,
                has_next_page: true,
                has_prev_page: false,
            }
        );

        let second = service.list(ListQuery { page: 2, ..query }).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert!(second.pagination.has_prev_page);
        assert!(!second.pagination.has_next_page);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let service = service().await;
        let first = report(&service, "Uptown", 1).await;
        let second = report(&service, "Uptown", 2).await;

        let page = service.list(ListQuery::default()).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn list_defaults_to_active_only() {
        let service = service().await;
        let a = report(&service, "Westside", 3).await;
        report(&service, "Westside", 4).await;
        service.resolve(&a.id).await.unwrap();

        let page = service.list(ListQuery::default()).await.unwrap();
        assert_eq!(page.pagination.total_items, 1);
        assert!(page.items.iter().all(|r| r.status == DelayStatus::Active));

        let resolved = ListQuery {
            status: StatusFilter::Resolved,
            ..ListQuery::default()
        };
        let page = service.list(resolved).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, a.id);
    }

    #[tokio::test]
    async fn empty_and_out_of_range_pages() {
        let service = service().await;
        let page = service.list(ListQuery::default()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_next_page);
        assert!(!page.pagination.has_prev_page);

        report(&service, "Downtown", 8).await;
        let beyond = ListQuery {
            page: 9,
            ..ListQuery::default()
        };
        let page = service.list(beyond).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_items, 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn average_is_within_half_a_hundredth(total in 0u64..1_000_000, count in 1u64..10_000) {
                let avg = average_two_places(total, count);
                let exact = total as f64 / count as f64;
                prop_assert!((avg - exact).abs() <= 0.005 + 1e-9);
                let hundredths = (avg * 100.0).round();
                prop_assert!((avg * 100.0 - hundredths).abs() < 1e-6);
            }

            #[test]
            fn summaries_are_sorted_and_conserve_counts(counts in proptest::collection::vec(1u64..50, 0..20)) {
                let groups: Vec<_> = counts
                    .iter()
                    .enumerate()
                    .map(|(i, c)| totals(&format!("n{i}"), *c, c * 7))
                    .collect();
                let out = summarize(groups);
                prop_assert_eq!(out.iter().map(|s| s.count).sum::<u64>(), counts.iter().sum::<u64>());
                prop_assert!(out.windows(2).all(|w| w[0].count >= w[1].count));
                for s in &out {
                    prop_assert_eq!(s.avg_delay_minutes, 7.0);
                }
            }
        }
    }
}
