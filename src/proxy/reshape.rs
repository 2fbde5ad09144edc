use chrono::{Datelike, NaiveDate};
use folio_common::{ActivityPayload, WINDOW_DAYS, sum_counts, year_range};

use super::upstream::UpstreamActivity;

/// Turn validated upstream data into the compact payload served to the widget.
///
/// Future-dated entries (relative to `today`) are dropped, the rest sorted
/// oldest first and cut to the most recent [`WINDOW_DAYS`] days.
/// `all_time_total` sums every upstream total regardless of the window.
pub fn reshape(upstream: UpstreamActivity, today: NaiveDate) -> ActivityPayload {
    let mut days: Vec<_> = upstream
        .contributions
        .into_iter()
        .filter(|day| day.date <= today)
        .collect();

    days.sort_by_key(|day| day.date);

    if days.len() > WINDOW_DAYS {
        days.drain(..days.len() - WINDOW_DAYS);
    }

    let year_range = match (days.first(), days.last()) {
        (Some(first), Some(last)) => year_range(first.date, last.date),
        _ => today.year().to_string(),
    };

    let all_time_total = upstream
        .total
        .values()
        .fold(0u64, |acc, n| acc.saturating_add(*n));

    ActivityPayload {
        last_year_total: sum_counts(&days),
        all_time_total,
        year_range,
        contributions: days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_common::ContributionDay;
    use std::collections::BTreeMap;

    fn day(date: &str, count: u64) -> ContributionDay {
        ContributionDay::parse(date, count, (count.min(4)) as u8).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn totals(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_two_day_scenario() {
        let upstream = UpstreamActivity {
            total: totals(&[("2023", 100), ("2024", 50)]),
            contributions: vec![day("2024-01-01", 2), day("2024-01-02", 0)],
        };
        let payload = reshape(upstream, ymd(2024, 1, 3));

        assert_eq!(payload.contributions.len(), 2);
        assert_eq!(payload.contributions[0].date, ymd(2024, 1, 1));
        assert_eq!(payload.contributions[1].date, ymd(2024, 1, 2));
        assert_eq!(payload.last_year_total, 2);
        assert_eq!(payload.all_time_total, 150);
        assert_eq!(payload.year_range, "2024");
    }

    #[test]
    fn test_future_entries_are_excluded() {
        let upstream = UpstreamActivity {
            total: totals(&[("2024", 10)]),
            contributions: vec![
                day("2024-03-01", 1),
                day("2024-03-02", 3),
                day("2024-03-03", 5),
                day("2024-12-31", 0),
            ],
        };
        let today = ymd(2024, 3, 2);
        let payload = reshape(upstream, today);

        assert!(payload.contributions.iter().all(|d| d.date <= today));
        assert_eq!(payload.contributions.len(), 2);
        assert_eq!(payload.last_year_total, 4);
    }

    #[test]
    fn test_unsorted_input_is_sorted_ascending() {
        let upstream = UpstreamActivity {
            total: BTreeMap::new(),
            contributions: vec![
                day("2024-02-10", 1),
                day("2023-12-31", 2),
                day("2024-01-15", 3),
            ],
        };
        let payload = reshape(upstream, ymd(2024, 6, 1));
        let dates: Vec<_> = payload.contributions.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![ymd(2023, 12, 31), ymd(2024, 1, 15), ymd(2024, 2, 10)]
        );
        assert_eq!(payload.year_range, "2023 - 2024");
    }

    #[test]
    fn test_window_keeps_most_recent_365_days() {
        let start = ymd(2022, 1, 1);
        let contributions: Vec<_> = (0..500)
            .map(|i| ContributionDay {
                date: start + chrono::Days::new(i),
                count: 1,
                level: 1,
            })
            .collect();
        let last = contributions.last().unwrap().date;
        let upstream = UpstreamActivity {
            total: totals(&[("2022", 365), ("2023", 135)]),
            contributions,
        };
        let payload = reshape(upstream, last);

        assert_eq!(payload.contributions.len(), 365);
        assert_eq!(payload.contributions.last().unwrap().date, last);
        assert_eq!(
            payload.contributions.first().unwrap().date,
            start + chrono::Days::new(135)
        );
        assert!(
            payload
                .contributions
                .windows(2)
                .all(|w| w[0].date < w[1].date)
        );
        assert_eq!(payload.last_year_total, 365);
        assert_eq!(payload.all_time_total, 500);
    }

    #[test]
    fn test_last_year_total_matches_window_sum() {
        let upstream = UpstreamActivity {
            total: totals(&[("2024", 9999)]),
            contributions: vec![
                day("2024-01-01", 7),
                day("2024-01-02", 11),
                day("2024-01-03", 0),
            ],
        };
        let payload = reshape(upstream, ymd(2024, 1, 3));
        let sum: u64 = payload.contributions.iter().map(|d| d.count).sum();
        assert_eq!(payload.last_year_total, sum);
        assert_eq!(payload.all_time_total, 9999);
    }

    #[test]
    fn test_empty_window_uses_current_year() {
        let upstream = UpstreamActivity {
            total: totals(&[("2023", 4)]),
            contributions: vec![day("2025-01-01", 1)],
        };
        let payload = reshape(upstream, ymd(2024, 7, 1));
        assert!(payload.contributions.is_empty());
        assert_eq!(payload.last_year_total, 0);
        assert_eq!(payload.all_time_total, 4);
        assert_eq!(payload.year_range, "2024");
    }
}
