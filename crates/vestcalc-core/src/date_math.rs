use chrono::{Datelike, Local, Months, NaiveDate};

/// Whole calendar months from `from` to `to`, ignoring the day of month.
///
/// 2024-01-31 → 2024-02-01 counts as one month, the same way a vesting
/// calendar counts "vesting months". Negative when `to` precedes `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Shift a date by a signed number of calendar months.
///
/// The day is clamped to the last day of the target month
/// (2024-01-31 + 1 month = 2024-02-29). Returns `None` on overflow of the
/// representable date range.
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    }
}

/// The local calendar date, used as the default vesting reference date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_months_between_same_month() {
        assert_eq!(months_between(d(2024, 3, 1), d(2024, 3, 31)), 0);
    }

    #[test]
    fn test_months_between_ignores_day_of_month() {
        assert_eq!(months_between(d(2024, 1, 31), d(2024, 2, 1)), 1);
        assert_eq!(months_between(d(2024, 1, 1), d(2024, 2, 29)), 1);
    }

    #[test]
    fn test_months_between_across_years() {
        assert_eq!(months_between(d(2022, 11, 15), d(2024, 11, 15)), 24);
        assert_eq!(months_between(d(2022, 11, 15), d(2023, 2, 1)), 3);
    }

    #[test]
    fn test_months_between_negative() {
        assert_eq!(months_between(d(2024, 6, 1), d(2024, 1, 1)), -5);
        assert_eq!(months_between(d(2024, 1, 1), d(2022, 12, 31)), -13);
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months(d(2024, 1, 31), 1), Some(d(2024, 2, 29)));
        assert_eq!(add_months(d(2023, 1, 31), 1), Some(d(2023, 2, 28)));
    }

    #[test]
    fn test_add_months_negative() {
        assert_eq!(add_months(d(2024, 3, 15), -14), Some(d(2023, 1, 15)));
    }

    #[test]
    fn test_add_months_round_trips_with_months_between() {
        let start = d(2021, 7, 9);
        for m in [-30, -1, 0, 1, 11, 12, 48, 61] {
            let shifted = add_months(start, m).unwrap();
            assert_eq!(months_between(start, shifted), m);
        }
    }
}
