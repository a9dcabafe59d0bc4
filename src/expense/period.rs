//! Custom billing periods: months that may begin on any day of the month.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};
use serde::{Deserialize, Serialize};

use crate::errors::ExpenseError;

const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_milli_opt(23, 59, 59, 999) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Day of the month on which a billing period begins, always within `1..=31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PeriodStartDay(u32);

impl PeriodStartDay {
    pub const FIRST: PeriodStartDay = PeriodStartDay(1);

    pub fn new(day: u32) -> Result<Self, ExpenseError> {
        if (1..=31).contains(&day) {
            Ok(Self(day))
        } else {
            Err(ExpenseError::InvalidStartDay(day))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// The start day as it lands in the given month, clamped to the month's last day.
    pub fn clamped_to(self, year: i32, month: u32) -> u32 {
        self.0.min(days_in_month(year, month))
    }
}

impl Default for PeriodStartDay {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u32> for PeriodStartDay {
    type Error = ExpenseError;

    fn try_from(day: u32) -> Result<Self, Self::Error> {
        Self::new(day)
    }
}

impl From<PeriodStartDay> for u32 {
    fn from(day: PeriodStartDay) -> Self {
        day.0
    }
}

/// Inclusive range of local wall-clock time covered by one billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBoundary {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl PeriodBoundary {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date()
    }

    /// The period that begins the day after this one ends, or `None` past `NaiveDate::MAX`.
    pub fn following(&self, start_day: PeriodStartDay) -> Option<PeriodBoundary> {
        self.last_day()
            .succ_opt()
            .map(|day| compute_bounds(day, start_day))
    }

    /// The period that ends the day before this one begins, or `None` before `NaiveDate::MIN`.
    pub fn preceding(&self, start_day: PeriodStartDay) -> Option<PeriodBoundary> {
        self.first_day()
            .pred_opt()
            .map(|day| compute_bounds(day, start_day))
    }

    /// Resolves both ends to instants in `tz`.
    ///
    /// An ambiguous start resolves to its earlier instant and an ambiguous end to its later
    /// one, so the window never shrinks across a daylight-saving fold.
    pub fn localize<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Tz>, DateTime<Tz>) {
        (
            resolve_local(tz, self.start, false),
            resolve_local(tz, self.end, true),
        )
    }
}

/// Computes the billing period that contains `reference`.
///
/// Boundaries are assembled from calendar fields so they stay on local midnight
/// regardless of daylight-saving shifts. A start day past the end of a short month
/// lands on that month's last day. Near the ends of the representable calendar a
/// boundary that would fall outside it saturates to `NaiveDate::MIN` or `NaiveDate::MAX`.
pub fn compute_bounds(reference: NaiveDate, start_day: PeriodStartDay) -> PeriodBoundary {
    let (year, month) = (reference.year(), reference.month());

    if start_day == PeriodStartDay::FIRST {
        let boundary = PeriodBoundary {
            start: start_of_day(calendar_day(year, month, 1)),
            end: end_of_day(calendar_day(year, month, days_in_month(year, month))),
        };
        tracing::debug!(%reference, start = %boundary.start, end = %boundary.end, "calendar month period");
        return boundary;
    }

    let this_start = start_day.clamped_to(year, month);
    let (prev_year, prev_month) = previous_month(year, month);
    let prev_start = start_day.clamped_to(prev_year, prev_month);

    let boundary = if reference.day() < this_start {
        PeriodBoundary {
            start: start_of_day(calendar_day(prev_year, prev_month, prev_start)),
            end: end_of_day(calendar_day(year, month, this_start - 1)),
        }
    } else {
        let (next_year, next_month) = next_month(year, month);
        let next_start = start_day.clamped_to(next_year, next_month);
        PeriodBoundary {
            start: start_of_day(calendar_day(year, month, this_start)),
            end: end_of_day(calendar_day(next_year, next_month, next_start - 1)),
        }
    };
    tracing::debug!(
        %reference,
        start_day = start_day.get(),
        start = %boundary.start,
        end = %boundary.end,
        "custom period"
    );
    boundary
}

/// Display label for the month a reference date falls in, e.g. `October 2026`.
pub fn month_label(date: NaiveDate) -> String {
    format!("{} {}", month_name(date.month()), date.year())
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Days are clamped to the month length, so `None` only means the year is out of range.
fn calendar_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn start_of_day(date: Option<NaiveDate>) -> NaiveDateTime {
    date.unwrap_or(NaiveDate::MIN).and_time(NaiveTime::MIN)
}

fn end_of_day(date: Option<NaiveDate>) -> NaiveDateTime {
    date.unwrap_or(NaiveDate::MAX).and_time(END_OF_DAY)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime, prefer_late: bool) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(at) => at,
        LocalResult::Ambiguous(early, late) => {
            if prefer_late {
                late
            } else {
                early
            }
        }
        LocalResult::None => (1..=3)
            .find_map(|hours| {
                tz.from_local_datetime(&(naive + Duration::hours(hours)))
                    .earliest()
            })
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, SecondsFormat, Timelike, Utc};
    use chrono_tz::America::Sao_Paulo;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(n: u32) -> PeriodStartDay {
        PeriodStartDay::new(n).unwrap()
    }

    #[test]
    fn start_day_must_be_in_range() {
        assert!(matches!(
            PeriodStartDay::new(0),
            Err(ExpenseError::InvalidStartDay(0))
        ));
        assert!(PeriodStartDay::new(32).is_err());
        assert_eq!(PeriodStartDay::new(31).unwrap().get(), 31);
    }

    #[test]
    fn start_day_deserializes_with_validation() {
        let parsed: PeriodStartDay = serde_json::from_str("15").unwrap();
        assert_eq!(parsed.get(), 15);
        assert!(serde_json::from_str::<PeriodStartDay>("40").is_err());
    }

    #[test]
    fn first_of_month_is_calendar_month() {
        let bounds = compute_bounds(date(2024, 2, 10), PeriodStartDay::FIRST);
        assert_eq!(bounds.start, date(2024, 2, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            bounds.end,
            date(2024, 2, 29).and_hms_milli_opt(23, 59, 59, 999).unwrap()
        );
    }

    #[test]
    fn reference_before_start_day_uses_previous_month() {
        let bounds = compute_bounds(date(2025, 3, 10), day(15));
        assert_eq!(bounds.first_day(), date(2025, 2, 15));
        assert_eq!(bounds.last_day(), date(2025, 3, 14));
        assert_eq!(bounds.end.nanosecond(), 999_000_000);
    }

    #[test]
    fn reference_on_start_day_opens_new_period() {
        let bounds = compute_bounds(date(2025, 3, 15), day(15));
        assert_eq!(bounds.first_day(), date(2025, 3, 15));
        assert_eq!(bounds.last_day(), date(2025, 4, 14));
    }

    #[test]
    fn year_rolls_over_in_both_directions() {
        let january = compute_bounds(date(2025, 1, 5), day(20));
        assert_eq!(january.first_day(), date(2024, 12, 20));
        assert_eq!(january.last_day(), date(2025, 1, 19));

        let december = compute_bounds(date(2024, 12, 25), day(20));
        assert_eq!(december.first_day(), date(2024, 12, 20));
        assert_eq!(december.last_day(), date(2025, 1, 19));
    }

    #[test]
    fn february_clamps_in_leap_and_common_years() {
        let common = compute_bounds(date(2023, 2, 15), day(31));
        assert_eq!(common.first_day(), date(2023, 1, 31));
        assert_eq!(common.last_day(), date(2023, 2, 27));
        assert_eq!(common.following(day(31)).unwrap().first_day(), date(2023, 2, 28));

        let leap = compute_bounds(date(2024, 2, 15), day(31));
        assert_eq!(leap.first_day(), date(2024, 1, 31));
        assert_eq!(leap.last_day(), date(2024, 2, 28));
        assert_eq!(leap.following(day(31)).unwrap().first_day(), date(2024, 2, 29));
    }

    #[test]
    fn clamped_start_day_opens_period_on_last_day() {
        let bounds = compute_bounds(date(2023, 2, 28), day(30));
        assert_eq!(bounds.first_day(), date(2023, 2, 28));
        assert_eq!(bounds.last_day(), date(2023, 3, 29));
    }

    #[test]
    fn preceding_and_following_chain() {
        let current = compute_bounds(date(2025, 5, 3), day(28));
        let previous = current.preceding(day(28)).unwrap();
        let next = current.following(day(28)).unwrap();
        assert_eq!(previous.last_day() + Duration::days(1), current.first_day());
        assert_eq!(current.last_day() + Duration::days(1), next.first_day());
    }

    #[test]
    fn contains_is_inclusive() {
        let bounds = compute_bounds(date(2025, 6, 20), day(10));
        assert!(bounds.contains(bounds.start));
        assert!(bounds.contains(bounds.end));
        assert!(!bounds.contains(bounds.end + Duration::milliseconds(1)));
        assert!(!bounds.contains(bounds.start - Duration::milliseconds(1)));
    }

    #[test]
    fn localize_keeps_wall_clock_fields() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let bounds = compute_bounds(date(2025, 6, 20), day(10));
        let (start, end) = bounds.localize(&tz);
        assert_eq!(start.naive_local(), bounds.start);
        assert_eq!(end.naive_local(), bounds.end);
        assert_eq!(start.to_rfc3339(), "2025-06-10T00:00:00+09:00");
    }

    #[test]
    fn bounds_saturate_at_calendar_edges() {
        let last = compute_bounds(NaiveDate::MAX, day(15));
        assert_eq!(last.first_day(), NaiveDate::MAX.with_day(15).unwrap());
        assert_eq!(last.last_day(), NaiveDate::MAX);
        assert!(last.following(day(15)).is_none());

        let first = compute_bounds(NaiveDate::MIN, day(15));
        assert_eq!(first.first_day(), NaiveDate::MIN);
        assert_eq!(first.last_day(), NaiveDate::MIN.with_day(14).unwrap());
        assert!(first.preceding(day(15)).is_none());

        let calendar = compute_bounds(NaiveDate::MAX, PeriodStartDay::FIRST);
        assert_eq!(calendar.last_day(), NaiveDate::MAX);
    }

    fn utc_millis<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
        at.with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    #[test]
    fn localize_widens_end_across_dst_fold() {
        // 2019-02-17 00:00 -02 fell back to 2019-02-16 23:00 -03.
        let bounds = compute_bounds(date(2019, 2, 10), day(17));
        assert_eq!(bounds.last_day(), date(2019, 2, 16));
        let (start, end) = bounds.localize(&Sao_Paulo);
        assert_eq!(start.naive_local(), bounds.start);
        assert_eq!(end.naive_local(), bounds.end);
        assert_eq!(utc_millis(&end), "2019-02-17T02:59:59.999Z");

        let (next_start, _) = bounds.following(day(17)).unwrap().localize(&Sao_Paulo);
        assert_eq!(utc_millis(&next_start), "2019-02-17T03:00:00.000Z");
    }

    #[test]
    fn localize_moves_start_past_dst_gap() {
        // 2018-11-04 00:00 -03 jumped to 01:00 -02, so local midnight never happened.
        let bounds = compute_bounds(date(2018, 11, 10), day(4));
        assert_eq!(bounds.first_day(), date(2018, 11, 4));
        let (start, _) = bounds.localize(&Sao_Paulo);
        assert_eq!(start.to_rfc3339(), "2018-11-04T01:00:00-02:00");

        let (_, previous_end) = bounds.preceding(day(4)).unwrap().localize(&Sao_Paulo);
        assert_eq!(utc_millis(&previous_end), "2018-11-04T02:59:59.999Z");
        assert_eq!(utc_millis(&start), "2018-11-04T03:00:00.000Z");
    }

    #[test]
    fn labels_months() {
        assert_eq!(month_label(date(2026, 10, 18)), "October 2026");
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
    }
}
