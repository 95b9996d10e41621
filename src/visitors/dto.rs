use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Body of `POST /visitors`. `sessionId` is the client-generated,
/// per-browser-session identifier.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordVisitRequest {
    #[serde(default)]
    pub page: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    pub confirm: Option<String>,
}

/// Visit counts over one calendar window.
#[derive(Debug, Clone, Copy, Serialize, FromRow)]
pub struct WindowStats {
    pub unique_visitors: i64,
    pub total_visits: i64,
}

#[derive(Debug, Serialize)]
pub struct RecentVisitor {
    pub ip: String,
    pub page: String,
    pub referrer: String,
    pub device: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub visited_at: OffsetDateTime,
}

#[derive(Debug, Serialize, FromRow)]
pub struct PageCount {
    pub page: String,
    pub visits: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: i64,
    pub percentage: f64,
}

/// The full statistics bundle returned by `GET /visitors`.
#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub success: bool,
    pub today: WindowStats,
    pub month: WindowStats,
    pub year: WindowStats,
    pub all_time: WindowStats,
    pub recent_visitors: Vec<RecentVisitor>,
    pub top_pages: Vec<PageCount>,
    /// 24 hour-of-day buckets for today, zero-filled.
    pub hourly_stats: Vec<i64>,
    pub devices: Vec<CategoryCount>,
    pub browsers: Vec<CategoryCount>,
}
