use crate::post::Post;
use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Trailing window used by the analytics view.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Engagement counters for one calendar day in the display time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEngagement {
    pub date: NaiveDate,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

impl DailyEngagement {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            likes: 0,
            comments: 0,
            shares: 0,
        }
    }
}

/// Calendar dates of a trailing window ending on `as_of`'s local date, oldest first.
///
/// A window reaching past `NaiveDate::MIN` is cut short at that date.
pub fn window_dates<Tz: TimeZone>(window_days: u32, as_of: &DateTime<Tz>) -> Vec<NaiveDate> {
    let today = as_of.date_naive();
    let mut dates: Vec<NaiveDate> = (0..window_days)
        .map_while(|days_back| today.checked_sub_signed(Duration::days(i64::from(days_back))))
        .collect();
    dates.reverse();
    dates
}

/// Bucket posts by local calendar day over a trailing window of `window_days`.
///
/// The result holds `window_days` entries, oldest first, with the last entry
/// on `as_of`'s date; see [`window_dates`] for the lower date bound. Posts dated outside the window (too old,
/// or later than `as_of`'s date) are skipped. The time zone of `as_of`
/// decides which day a post belongs to.
pub fn compute_daily_series<Tz: TimeZone>(
    posts: &[Post],
    window_days: u32,
    as_of: &DateTime<Tz>,
) -> Vec<DailyEngagement> {
    let mut buckets: Vec<DailyEngagement> = window_dates(window_days, as_of)
        .into_iter()
        .map(DailyEngagement::empty)
        .collect();

    let Some(first) = buckets.first().map(|b| b.date) else {
        return buckets;
    };

    let tz = as_of.timezone();
    for post in posts {
        let day = post.created_at.with_timezone(&tz).date_naive();
        let offset = (day - first).num_days();
        if offset < 0 {
            continue;
        }

        if let Some(bucket) = buckets.get_mut(offset as usize) {
            bucket.likes = bucket.likes.saturating_add(post.likes);
            bucket.comments = bucket.comments.saturating_add(post.comments);
            bucket.shares = bucket.shares.saturating_add(post.shares);
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::Sentiment;
    use chrono::{FixedOffset, Utc};
    use uuid::Uuid;

    fn post_at(created_at: DateTime<Utc>, likes: u64, comments: u64, shares: u64) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            content: String::new(),
            created_at,
            likes,
            comments,
            shares,
            sentiment: Sentiment::neutral(),
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn window_has_exact_length_oldest_first() {
        let as_of = noon(2024, 3, 10);
        let dates = window_dates(30, &as_of);

        assert_eq!(dates.len(), 30);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert_eq!(dates[29], NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_input_still_yields_full_zeroed_window() {
        let series = compute_daily_series(&[], DEFAULT_WINDOW_DAYS, &noon(2024, 1, 5));

        assert_eq!(series.len(), 30);
        assert!(series
            .iter()
            .all(|d| d.likes == 0 && d.comments == 0 && d.shares == 0));
    }

    #[test]
    fn window_stops_at_earliest_representable_date() {
        let as_of = (NaiveDate::MIN + Duration::days(4))
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();

        let dates = window_dates(u32::MAX, &as_of);
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[0], NaiveDate::MIN);
        assert_eq!(dates[4], as_of.date_naive());

        let series = compute_daily_series(&[], u32::MAX, &as_of);
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn zero_window_is_empty() {
        let posts = vec![post_at(noon(2024, 1, 5), 1, 1, 1)];
        assert!(compute_daily_series(&posts, 0, &noon(2024, 1, 5)).is_empty());
    }

    #[test]
    fn posts_on_same_day_are_summed() {
        let as_of = noon(2024, 6, 30);
        let posts = vec![
            post_at(Utc.with_ymd_and_hms(2024, 6, 29, 1, 0, 0).unwrap(), 2, 1, 0),
            post_at(Utc.with_ymd_and_hms(2024, 6, 29, 23, 0, 0).unwrap(), 4, 0, 1),
        ];

        let series = compute_daily_series(&posts, 30, &as_of);
        let day = series[28];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 6, 29).unwrap());
        assert_eq!((day.likes, day.comments, day.shares), (6, 1, 1));
    }

    #[test]
    fn old_and_future_posts_are_excluded() {
        let as_of = noon(2024, 6, 30);
        let posts = vec![
            post_at(noon(2024, 5, 31), 100, 0, 0), // day before window start
            post_at(noon(2024, 6, 1), 1, 0, 0),    // first day of window
            post_at(noon(2024, 6, 30), 2, 0, 0),   // today
            post_at(noon(2024, 7, 1), 50, 0, 0),   // future
        ];

        let series = compute_daily_series(&posts, 30, &as_of);
        assert_eq!(series[0].likes, 1);
        assert_eq!(series[29].likes, 2);
        assert_eq!(series.iter().map(|d| d.likes).sum::<u64>(), 3);
    }

    #[test]
    fn bucket_sums_match_posts_inside_window() {
        let as_of = noon(2024, 2, 15);
        let posts: Vec<Post> = (0..90)
            .map(|i| post_at(as_of - Duration::hours(i * 11), i as u64, 1, (i % 3) as u64))
            .collect();

        let series = compute_daily_series(&posts, 30, &as_of);
        let first = series[0].date;
        let last = series[29].date;
        let inside: Vec<&Post> = posts
            .iter()
            .filter(|p| {
                let d = p.created_at.date_naive();
                d >= first && d <= last
            })
            .collect();

        assert_eq!(
            series.iter().map(|d| d.likes).sum::<u64>(),
            inside.iter().map(|p| p.likes).sum::<u64>()
        );
        assert_eq!(
            series.iter().map(|d| d.comments).sum::<u64>(),
            inside.iter().map(|p| p.comments).sum::<u64>()
        );
        assert_eq!(
            series.iter().map(|d| d.shares).sum::<u64>(),
            inside.iter().map(|p| p.shares).sum::<u64>()
        );
    }

    #[test]
    fn display_time_zone_decides_the_day() {
        // 2024-03-10 23:30 UTC is already 2024-03-11 in UTC+2
        let created = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        let posts = vec![post_at(created, 7, 0, 0)];

        let utc_as_of = Utc.with_ymd_and_hms(2024, 3, 11, 12, 0, 0).unwrap();
        let utc_series = compute_daily_series(&posts, 7, &utc_as_of);
        assert_eq!(utc_series[5].likes, 7);
        assert_eq!(utc_series[6].likes, 0);

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_as_of = utc_as_of.with_timezone(&plus_two);
        let local_series = compute_daily_series(&posts, 7, &local_as_of);
        assert_eq!(local_series[6].date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(local_series[6].likes, 7);
        assert_eq!(local_series[5].likes, 0);
    }
}
