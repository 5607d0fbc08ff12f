use crate::types::SchedulingRule;
use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};

/// Resolve a scheduling rule against a reference date (usually the
/// completion time of the task's last dependency).
///
/// Pure and deterministic: no clock reads, no I/O. Rules that cannot be
/// interpreted fall back to the reference date unchanged.
pub fn resolve(rule: &SchedulingRule, reference: DateTime<Utc>) -> DateTime<Utc> {
    match rule {
        SchedulingRule::Immediate => reference,

        SchedulingRule::Relative {
            relative_days,
            relative_hours,
        } => {
            // Days before hours; the order is observable across calendar
            // boundaries.
            reference + Duration::days(*relative_days) + Duration::hours(*relative_hours)
        }

        SchedulingRule::Absolute {
            specific_date,
            specific_time,
        } => {
            if let Some(date) = specific_date {
                return *date;
            }
            if let Some(time) = specific_time {
                if let Some((hour, minute)) = parse_time(time) {
                    let mut at = set_time(reference, hour, minute);
                    // The rule means the next occurrence of that time:
                    // roll forward one day at most.
                    if at < reference {
                        at = at + Duration::days(1);
                    }
                    return at;
                }
            }
            reference
        }

        SchedulingRule::BusinessDay {
            business_day_offset,
            time_of_day,
        } => {
            let date = add_business_days(reference, *business_day_offset);
            match time_of_day.as_deref() {
                Some("morning") => set_time(date, 9, 0),
                Some("afternoon") => set_time(date, 14, 0),
                Some(time) => match parse_time(time) {
                    Some((hour, minute)) => set_time(date, hour, minute),
                    None => date,
                },
                None => date,
            }
        }

        SchedulingRule::Unknown => reference,
    }
}

/// Add `offset` business days, skipping Saturdays and Sundays. Zero leaves
/// the date untouched even on a weekend.
fn add_business_days(date: DateTime<Utc>, offset: i64) -> DateTime<Utc> {
    let step = if offset >= 0 { 1 } else { -1 };
    let mut date = date;
    for _ in 0..offset.abs() {
        date = date + Duration::days(step);
        while is_weekend(date) {
            date = date + Duration::days(step);
        }
    }
    date
}

fn is_weekend(date: DateTime<Utc>) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Parse "HH:MM". Anything else is rejected rather than guessed at.
fn parse_time(time: &str) -> Option<(u32, u32)> {
    let (hour, minute) = time.split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

fn set_time(date: DateTime<Utc>, hour: u32, minute: u32) -> DateTime<Utc> {
    date.with_hour(hour)
        .and_then(|d| d.with_minute(minute))
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Monday 2025-06-02 10:00 UTC
    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
    }

    #[test]
    fn immediate_is_the_reference() {
        assert_eq!(resolve(&SchedulingRule::Immediate, reference()), reference());
    }

    #[test]
    fn relative_adds_days_then_hours() {
        let rule = SchedulingRule::Relative {
            relative_days: 3,
            relative_hours: 5,
        };
        assert_eq!(
            resolve(&rule, reference()),
            Utc.with_ymd_and_hms(2025, 6, 5, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn relative_with_positive_offset_is_strictly_later() {
        for (days, hours) in [(1, 0), (0, 1), (2, 23), (365, 0)] {
            let rule = SchedulingRule::Relative {
                relative_days: days,
                relative_hours: hours,
            };
            assert!(resolve(&rule, reference()) > reference());
        }
    }

    #[test]
    fn absolute_specific_date_wins_verbatim() {
        let date = Utc.with_ymd_and_hms(2030, 1, 15, 8, 30, 0).unwrap();
        let rule = SchedulingRule::Absolute {
            specific_date: Some(date),
            specific_time: Some("23:59".to_string()),
        };
        assert_eq!(resolve(&rule, reference()), date);
    }

    #[test]
    fn absolute_time_already_past_rolls_forward_one_day() {
        // Reference is 10:00; 09:00 has passed, so it means tomorrow 09:00.
        let rule = SchedulingRule::Absolute {
            specific_date: None,
            specific_time: Some("09:00".to_string()),
        };
        assert_eq!(
            resolve(&rule, reference()),
            Utc.with_ymd_and_hms(2025, 6, 3, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn absolute_time_still_ahead_stays_on_the_same_day() {
        let rule = SchedulingRule::Absolute {
            specific_date: None,
            specific_time: Some("16:30".to_string()),
        };
        assert_eq!(
            resolve(&rule, reference()),
            Utc.with_ymd_and_hms(2025, 6, 2, 16, 30, 0).unwrap()
        );
    }

    #[test]
    fn absolute_without_date_or_time_falls_back() {
        let rule = SchedulingRule::Absolute {
            specific_date: None,
            specific_time: None,
        };
        assert_eq!(resolve(&rule, reference()), reference());
    }

    #[test]
    fn absolute_with_garbage_time_falls_back() {
        let rule = SchedulingRule::Absolute {
            specific_date: None,
            specific_time: Some("noonish".to_string()),
        };
        assert_eq!(resolve(&rule, reference()), reference());
    }

    #[test]
    fn business_day_offset_skips_weekend() {
        // Friday 2025-06-06 + 1 business day lands on Monday 2025-06-09.
        let friday = Utc.with_ymd_and_hms(2025, 6, 6, 10, 0, 0).unwrap();
        let rule = SchedulingRule::BusinessDay {
            business_day_offset: 1,
            time_of_day: None,
        };
        assert_eq!(
            resolve(&rule, friday),
            Utc.with_ymd_and_hms(2025, 6, 9, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn business_day_zero_offset_keeps_the_day() {
        let rule = SchedulingRule::BusinessDay {
            business_day_offset: 0,
            time_of_day: None,
        };
        assert_eq!(resolve(&rule, reference()), reference());
    }

    #[test]
    fn business_day_named_times() {
        let rule = SchedulingRule::BusinessDay {
            business_day_offset: 1,
            time_of_day: Some("morning".to_string()),
        };
        assert_eq!(
            resolve(&rule, reference()),
            Utc.with_ymd_and_hms(2025, 6, 3, 9, 0, 0).unwrap()
        );

        let rule = SchedulingRule::BusinessDay {
            business_day_offset: 1,
            time_of_day: Some("afternoon".to_string()),
        };
        assert_eq!(
            resolve(&rule, reference()),
            Utc.with_ymd_and_hms(2025, 6, 3, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn business_day_explicit_time() {
        let rule = SchedulingRule::BusinessDay {
            business_day_offset: 2,
            time_of_day: Some("11:45".to_string()),
        };
        assert_eq!(
            resolve(&rule, reference()),
            Utc.with_ymd_and_hms(2025, 6, 4, 11, 45, 0).unwrap()
        );
    }

    #[test]
    fn business_day_without_time_keeps_time_component() {
        // Thursday + 2 business days crosses the weekend and keeps 10:00.
        let thursday = Utc.with_ymd_and_hms(2025, 6, 5, 10, 0, 0).unwrap();
        let rule = SchedulingRule::BusinessDay {
            business_day_offset: 2,
            time_of_day: None,
        };
        assert_eq!(
            resolve(&rule, thursday),
            Utc.with_ymd_and_hms(2025, 6, 9, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn unknown_rule_kind_is_a_no_op() {
        assert_eq!(resolve(&SchedulingRule::Unknown, reference()), reference());
    }
}
