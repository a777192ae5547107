use time::OffsetDateTime;

/// Human-readable age of a timestamp, as shown next to notifications and
/// dashboard entries.
pub fn time_ago(when: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = now - when;
    let minutes = elapsed.whole_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} minutes ago");
    }
    let hours = elapsed.whole_hours();
    if hours < 24 {
        return format!("{hours} hours ago");
    }
    format!("{} days ago", elapsed.whole_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn base() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::days(20_000)
    }

    #[test]
    fn under_a_minute() {
        let now = base();
        assert_eq!(time_ago(now - Duration::seconds(30), now), "just now");
    }

    #[test]
    fn minutes_and_hours() {
        let now = base();
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3 hours ago");
    }

    #[test]
    fn days() {
        let now = base();
        assert_eq!(time_ago(now - Duration::days(2), now), "2 days ago");
        assert_eq!(time_ago(now - Duration::hours(25), now), "1 days ago");
    }
}
