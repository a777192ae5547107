use time::OffsetDateTime;
use tracing::{info, warn};

use crate::audit::repo::AuditAction;
use crate::audit::services::record;
use crate::checkins::dto::{
    CanCheckinData, CheckinData, CheckinHistoryItem, CheckinRequest, EmotionTypeResponse,
    Pagination, SentimentInfo,
};
use crate::checkins::repo;
use crate::error::{ApiError, ApiResult};
use crate::notifications::services::notify_hr_bad_mood;
use crate::sentiment::{is_high_risk, SentimentScore};
use crate::state::AppState;
use crate::users::repo::{Role, User};

pub const BAD_MOOD_LEVEL: i32 = 1;
const MAX_COMMENT_CHARS: usize = 1000;

pub(crate) fn emoji_for_level(level: i32) -> &'static str {
    match level {
        1 => "😢",
        2 => "😐",
        _ => "😊",
    }
}

pub async fn create(
    state: &AppState,
    actor: &User,
    payload: CheckinRequest,
    ip: &str,
) -> ApiResult<CheckinData> {
    if actor.role != Role::Employee {
        return Err(ApiError::forbidden("Only employees can check-in"));
    }

    let now = state.config.local_now();
    let today = now.date();

    if repo::exists_for_day(&state.db, actor.id, today).await? {
        return Err(ApiError::conflict("You have already checked-in today"));
    }

    let emotion = repo::find_emotion(&state.db, payload.emotion_type_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid emotion type"))?;
    if emotion.level != payload.emotion_level {
        return Err(ApiError::bad_request(
            "Emotion level does not match emotion type",
        ));
    }

    let comment = payload
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if let Some(c) = comment {
        if c.chars().count() > MAX_COMMENT_CHARS {
            return Err(ApiError::bad_request(
                "Comment must not exceed 1000 characters",
            ));
        }
    }

    // The unique constraint on (employee_id, checkin_date) is the only guard
    // against two concurrent submissions passing the existence check.
    let checkin = repo::insert_checkin(
        &state.db,
        actor.id,
        emotion.level,
        emotion.id,
        comment,
        now,
        today,
    )
    .await?;

    let sentiment = match comment {
        Some(text) => {
            let score = match state.sentiment.analyze(text).await {
                Ok(score) => score,
                Err(err) => {
                    warn!(error = %err, checkin_id = %checkin.id, "sentiment analysis failed");
                    SentimentScore::fallback()
                }
            };
            let label = score.label();
            if is_high_risk(score.score, score.magnitude) {
                warn!(
                    checkin_id = %checkin.id,
                    score = score.score,
                    magnitude = score.magnitude,
                    "high-risk sentiment detected"
                );
            }
            repo::insert_ai_result(
                &state.db,
                checkin.id,
                score.score,
                score.magnitude,
                label,
                &score.language,
            )
            .await?;
            Some(SentimentInfo {
                score: score.score,
                label,
            })
        }
        None => None,
    };

    if emotion.level == BAD_MOOD_LEVEL {
        notify_hr_bad_mood(state, actor, checkin.id).await?;
    }

    record(
        &state.db,
        actor.id,
        AuditAction::CheckIn,
        None,
        Some(serde_json::json!({ "level": emotion.level, "mood": emotion.name }).to_string()),
        ip,
    )
    .await?;

    info!(user_id = %actor.id, level = emotion.level, "check-in recorded");
    Ok(CheckinData {
        id: checkin.id,
        emoji: emoji_for_level(emotion.level).to_string(),
        mood: emotion.name,
        level: emotion.level,
        time: checkin.checkin_time,
        comment: checkin.comment,
        sentiment,
    })
}

pub async fn today(state: &AppState, actor: &User) -> ApiResult<CheckinData> {
    let today = state.config.local_today();
    let detail = repo::find_for_day(&state.db, actor.id, today)
        .await?
        .ok_or_else(|| ApiError::not_found("No check-in found for today"))?;
    Ok(CheckinData::from_detail(detail))
}

pub async fn can_checkin(state: &AppState, actor: &User) -> ApiResult<CanCheckinData> {
    let today = state.config.local_today();
    let exists = repo::exists_for_day(&state.db, actor.id, today).await?;
    Ok(CanCheckinData {
        can_checkin: !exists,
    })
}

pub async fn history(
    state: &AppState,
    actor: &User,
    page: Pagination,
) -> ApiResult<Vec<CheckinHistoryItem>> {
    let limit = page.limit.clamp(1, 100);
    let offset = page.offset.max(0);
    let rows = repo::list_history(&state.db, actor.id, limit, offset).await?;
    let now = OffsetDateTime::now_utc();
    Ok(rows
        .into_iter()
        .map(|d| CheckinHistoryItem::from_detail(d, true, now))
        .collect())
}

pub async fn emotions(state: &AppState) -> ApiResult<Vec<EmotionTypeResponse>> {
    let rows = repo::list_emotions(&state.db).await?;
    Ok(rows.into_iter().map(EmotionTypeResponse::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    #[test]
    fn emoji_per_level() {
        assert_eq!(emoji_for_level(1), "😢");
        assert_eq!(emoji_for_level(2), "😐");
        assert_eq!(emoji_for_level(3), "😊");
    }

    #[tokio::test]
    async fn only_employees_can_check_in() {
        let state = AppState::fake();
        let actor = User {
            id: Uuid::new_v4(),
            name: "HR Person".into(),
            email: "hr@example.com".into(),
            password_hash: String::new(),
            role: Role::Hr,
            department: None,
            position: None,
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let payload = CheckinRequest {
            emotion_level: 1,
            emotion_type_id: Uuid::new_v4(),
            comment: None,
        };
        let err = create(&state, &actor, payload, "unknown").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Only employees can check-in");
    }
}
