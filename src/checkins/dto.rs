use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::checkins::repo::{CheckinDetail, EmotionType};
use crate::checkins::services::emoji_for_level;
use crate::sentiment::SentimentLabel;
use crate::timeago::time_ago;

#[derive(Debug, Deserialize)]
pub struct CheckinRequest {
    pub emotion_level: i32,
    pub emotion_type_id: Uuid,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SentimentInfo {
    pub score: f32,
    pub label: SentimentLabel,
}

/// Payload returned after submitting or fetching a check-in.
#[derive(Debug, Serialize)]
pub struct CheckinData {
    pub id: Uuid,
    pub emoji: String,
    pub mood: String,
    pub level: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub comment: Option<String>,
    pub sentiment: Option<SentimentInfo>,
}

impl CheckinData {
    pub fn from_detail(detail: CheckinDetail) -> Self {
        let sentiment = match (detail.sentiment_score, detail.sentiment_label) {
            (Some(score), Some(label)) => Some(SentimentInfo { score, label }),
            _ => None,
        };
        Self {
            id: detail.id,
            emoji: emoji_for_level(detail.emotion_level).to_string(),
            mood: detail.mood_name,
            level: detail.emotion_level,
            time: detail.checkin_time,
            comment: detail.comment,
            sentiment,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CanCheckinData {
    pub can_checkin: bool,
}

#[derive(Debug, Serialize)]
pub struct EmotionTypeResponse {
    pub id: Uuid,
    pub name: String,
    pub level: i32,
    pub description: String,
    pub color_code: String,
    pub emoji: String,
}

impl From<EmotionType> for EmotionTypeResponse {
    fn from(e: EmotionType) -> Self {
        Self {
            id: e.id,
            emoji: emoji_for_level(e.level).to_string(),
            name: e.name,
            level: e.level,
            description: e.description,
            color_code: e.color_code,
        }
    }
}

/// One line of check-in history, also embedded in dashboards. Comment fields
/// honor the viewer's visibility.
#[derive(Debug, Serialize)]
pub struct CheckinHistoryItem {
    pub id: Uuid,
    pub date: String,
    pub emoji: String,
    pub mood: String,
    pub level: i32,
    pub color_code: String,
    pub comment: Option<String>,
    pub has_comment: bool,
    pub sentiment_score: Option<f32>,
    pub sentiment_label: Option<SentimentLabel>,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub time_ago: String,
}

impl CheckinHistoryItem {
    pub fn from_detail(detail: CheckinDetail, include_comments: bool, now: OffsetDateTime) -> Self {
        let (comment, has_comment) = if include_comments {
            let has = detail.comment.is_some();
            (detail.comment, has)
        } else {
            (None, false)
        };
        Self {
            id: detail.id,
            date: detail.checkin_date.to_string(),
            emoji: emoji_for_level(detail.emotion_level).to_string(),
            mood: detail.mood_name,
            level: detail.emotion_level,
            color_code: detail.color_code,
            comment,
            has_comment,
            sentiment_score: detail.sentiment_score,
            sentiment_label: detail.sentiment_label,
            time: detail.checkin_time,
            time_ago: time_ago(detail.checkin_time, now),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn detail(comment: Option<&str>) -> CheckinDetail {
        CheckinDetail {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            emotion_level: 1,
            mood_name: "Sad".into(),
            color_code: "#F44336".into(),
            comment: comment.map(|c| c.to_string()),
            checkin_time: datetime!(2026-08-20 09:00 UTC),
            checkin_date: date!(2026 - 08 - 20),
            sentiment_score: Some(-0.7),
            sentiment_label: Some(SentimentLabel::Negative),
        }
    }

    #[test]
    fn comments_pass_through_for_permitted_viewers() {
        let now = datetime!(2026-08-20 10:00 UTC);
        let item = CheckinHistoryItem::from_detail(detail(Some("rough day")), true, now);
        assert_eq!(item.comment.as_deref(), Some("rough day"));
        assert!(item.has_comment);
    }

    #[test]
    fn comments_are_stripped_when_not_permitted() {
        let now = datetime!(2026-08-20 10:00 UTC);
        let item = CheckinHistoryItem::from_detail(detail(Some("rough day")), false, now);
        assert_eq!(item.comment, None);
        assert!(!item.has_comment);
        // sentiment survives even when the text is hidden
        assert_eq!(item.sentiment_label, Some(SentimentLabel::Negative));
    }

    #[test]
    fn absent_comment_is_not_flagged() {
        let now = datetime!(2026-08-20 10:00 UTC);
        let item = CheckinHistoryItem::from_detail(detail(None), true, now);
        assert_eq!(item.comment, None);
        assert!(!item.has_comment);
    }

    #[test]
    fn date_renders_iso() {
        let now = datetime!(2026-08-20 10:00 UTC);
        let item = CheckinHistoryItem::from_detail(detail(None), true, now);
        assert_eq!(item.date, "2026-08-20");
    }
}
