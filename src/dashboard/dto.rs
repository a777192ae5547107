use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::checkins::dto::CheckinHistoryItem;

/// Mood-level breakdown over a set of check-ins. Positive/neutral/negative
/// refer to emotion levels 3/2/1, not NLP labels.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmotionStats {
    pub total_checkins: i64,
    pub positive_count: i64,
    pub neutral_count: i64,
    pub negative_count: i64,
    pub positive_percent: f32,
    pub neutral_percent: f32,
    pub negative_percent: f32,
    pub mood_distribution: BTreeMap<String, i64>,
    pub average_sentiment: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct EmployeeDashboard {
    pub history: Vec<CheckinHistoryItem>,
    pub stats: EmotionStats,
    pub streak: i64,
    pub last_checkin_date: Option<String>,
    pub can_checkin_today: bool,
    pub unread_notifications: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PeriodCounts {
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeInsight {
    pub employee_id: Uuid,
    pub name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub last_checkin_date: Option<String>,
    pub last_mood: Option<String>,
    pub last_level: Option<i32>,
    pub last_emoji: Option<String>,
    pub streak: i64,
    pub checkin_rate_30d: f32,
    pub weekly: PeriodCounts,
    pub monthly: PeriodCounts,
    pub average_sentiment: Option<f32>,
    pub is_high_risk: bool,
    pub consecutive_bad_days: i64,
    pub recent_comment: Option<String>,
    pub has_comment: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentStats {
    pub department: String,
    pub employee_count: i64,
    pub checked_in_today: i64,
    pub checkin_rate_today: f32,
    pub period_checkins: i64,
    pub positive_count: i64,
    pub neutral_count: i64,
    pub negative_count: i64,
    pub average_mood_score: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct TeamDashboard {
    pub departments: Vec<DepartmentStats>,
    pub insights: Vec<EmployeeInsight>,
    pub high_risk_count: i64,
    pub high_risk_alerts: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    #[serde(flatten)]
    pub team: TeamDashboard,
    pub active_employees: i64,
    pub checkins_today: i64,
    pub consecutive_bad_count: i64,
}
