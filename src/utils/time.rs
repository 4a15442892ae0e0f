use chrono::{DateTime, Datelike, TimeZone};

/// Amount of whole minutes between punching in and punching out. Missing timestamps and spans
/// where `out_time` precedes `in_time` both count as zero. Multi-day spans are allowed.
pub fn calculate_minutes<Tz: TimeZone>(
    in_time: Option<&DateTime<Tz>>,
    out_time: Option<&DateTime<Tz>>,
) -> u64 {
    let (Some(in_time), Some(out_time)) = (in_time, out_time) else {
        return 0;
    };

    let diff_ms = out_time.timestamp_millis() - in_time.timestamp_millis();
    if diff_ms < 0 {
        return 0;
    }

    (diff_ms / 60_000) as u64
}

/// Formats minutes as `"{hours}h {minutes}m"`.
pub fn format_duration(total_minutes: u64) -> String {
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// This is the standard way of converting a date to a record key in shiftlog. Uses the calendar
/// fields of whatever timezone the date is expressed in, which is [chrono::Local] in the cli.
pub fn format_date_key<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

    use super::{calculate_minutes, format_date_key, format_duration};

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, second).unwrap()
    }

    #[test]
    fn test_calculate_minutes_floors_partial_minutes() {
        let start = at(9, 0, 0);
        let end = at(11, 5, 59);

        assert_eq!(calculate_minutes(Some(&start), Some(&end)), 125);
    }

    #[test]
    fn test_calculate_minutes_clamps_negative_spans() {
        let start = at(17, 0, 0);
        let end = at(9, 0, 0);

        assert_eq!(calculate_minutes(Some(&start), Some(&end)), 0);
        assert_eq!(calculate_minutes(Some(&end), Some(&start)), 480);
    }

    #[test]
    fn test_calculate_minutes_missing_timestamp() {
        let start = at(9, 0, 0);

        assert_eq!(calculate_minutes(Some(&start), None), 0);
        assert_eq!(calculate_minutes(None, Some(&start)), 0);
        assert_eq!(calculate_minutes::<Utc>(None, None), 0);
    }

    #[test]
    fn test_calculate_minutes_sub_minute_and_multi_day() {
        let start = at(9, 0, 0);

        assert_eq!(
            calculate_minutes(Some(&start), Some(&(start + Duration::seconds(59)))),
            0
        );
        assert_eq!(
            calculate_minutes(Some(&start), Some(&(start + Duration::days(2)))),
            2 * 24 * 60
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0h 0m");
        assert_eq!(format_duration(59), "0h 59m");
        assert_eq!(format_duration(60), "1h 0m");
        assert_eq!(format_duration(90), "1h 30m");
        assert_eq!(format_duration(25 * 60 + 1), "25h 1m");
    }

    #[test]
    fn test_format_date_key_pads_fields() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(format_date_key(&date), "2024-03-05");
    }

    #[test]
    fn test_format_date_key_same_local_day() {
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let morning = offset.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let night = offset.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let next_day = night + Duration::seconds(1);

        assert_eq!(format_date_key(&morning), format_date_key(&night));
        assert_ne!(format_date_key(&night), format_date_key(&next_day));
        assert_eq!(format_date_key(&next_day), "2025-01-01");
    }

    #[test]
    fn test_format_date_key_uses_own_calendar() {
        // 2024-01-01 02:00 in +05:30 is still 2023-12-31 in UTC.
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let local = offset.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();

        assert_eq!(format_date_key(&local), "2024-01-01");
        assert_eq!(format_date_key(&local.to_utc()), "2023-12-31");
    }
}
