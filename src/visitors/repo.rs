use sqlx::{FromRow, PgExecutor, PgPool};
use time::{Date, OffsetDateTime};

use super::dto::{PageCount, WindowStats};

/// Raw page-visit event. Append-only; removed only by the bulk reset.
#[derive(Debug, Clone, FromRow)]
pub struct VisitorStat {
    pub id: i64,
    pub ip: String,
    pub user_agent: String,
    pub page: String,
    pub referrer: String,
    pub session_id: String,
    pub visited_at: OffsetDateTime,
}

pub struct NewVisit<'a> {
    pub ip: &'a str,
    pub user_agent: &'a str,
    pub page: &'a str,
    pub referrer: &'a str,
    pub session_id: &'a str,
    pub visited_at: OffsetDateTime,
}

/// Dashboard pages are not part of the public traffic picture.
const PAGE_FILTER: &str = "page NOT LIKE '/admin%' AND page <> '/login'";

pub async fn insert_visit(ex: impl PgExecutor<'_>, visit: &NewVisit<'_>) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO visitor_stats (ip, user_agent, page, referrer, session_id, visited_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(visit.ip)
    .bind(visit.user_agent)
    .bind(visit.page)
    .bind(visit.referrer)
    .bind(visit.session_id)
    .bind(visit.visited_at)
    .execute(ex)
    .await?;
    Ok(())
}

/// Records `(date, ip)` in the seen-today set. The insert-if-absent result is
/// the uniqueness decision: true means this is the IP's first visit today.
/// A single atomic statement, so concurrent visits from one IP cannot both
/// count as unique.
pub async fn mark_seen_today(
    ex: impl PgExecutor<'_>,
    date: Date,
    ip: &str,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO daily_visitor_ips (visit_date, ip)
        VALUES ($1, $2)
        ON CONFLICT (visit_date, ip) DO NOTHING
        "#,
    )
    .bind(date)
    .bind(ip)
    .execute(ex)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Incremental upsert of the per-date aggregate. `total_visits` always moves;
/// `unique_visitors` only on the first visit of the IP that day; `menu_views`
/// only for menu pages.
pub async fn bump_daily(
    ex: impl PgExecutor<'_>,
    date: Date,
    first_today: bool,
    menu_view: bool,
) -> anyhow::Result<()> {
    let unique_inc: i64 = first_today.into();
    let menu_inc: i64 = menu_view.into();
    sqlx::query(
        r#"
        INSERT INTO daily_stats (date, total_visits, unique_visitors, menu_views)
        VALUES ($1, 1, $2, $3)
        ON CONFLICT (date) DO UPDATE SET
            total_visits = daily_stats.total_visits + 1,
            unique_visitors = daily_stats.unique_visitors + $2,
            menu_views = daily_stats.menu_views + $3
        "#,
    )
    .bind(date)
    .bind(unique_inc)
    .bind(menu_inc)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn counts_between(
    db: &PgPool,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> anyhow::Result<WindowStats> {
    let stats = sqlx::query_as::<_, WindowStats>(
        r#"
        SELECT COUNT(DISTINCT ip) AS unique_visitors, COUNT(*) AS total_visits
        FROM visitor_stats
        WHERE visited_at >= $1 AND visited_at < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await?;
    Ok(stats)
}

pub async fn counts_all(db: &PgPool) -> anyhow::Result<WindowStats> {
    let stats = sqlx::query_as::<_, WindowStats>(
        r#"
        SELECT COUNT(DISTINCT ip) AS unique_visitors, COUNT(*) AS total_visits
        FROM visitor_stats
        "#,
    )
    .fetch_one(db)
    .await?;
    Ok(stats)
}

pub async fn recent(db: &PgPool, limit: i64) -> anyhow::Result<Vec<VisitorStat>> {
    let rows = sqlx::query_as::<_, VisitorStat>(&format!(
        r#"
        SELECT id, ip, user_agent, page, referrer, session_id, visited_at
        FROM visitor_stats
        WHERE {PAGE_FILTER}
        ORDER BY visited_at DESC
        LIMIT $1
        "#
    ))
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn top_pages(db: &PgPool, limit: i64) -> anyhow::Result<Vec<PageCount>> {
    let rows = sqlx::query_as::<_, PageCount>(&format!(
        r#"
        SELECT page, COUNT(*) AS visits
        FROM visitor_stats
        WHERE {PAGE_FILTER}
        GROUP BY page
        ORDER BY visits DESC, page ASC
        LIMIT $1
        "#
    ))
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn hourly_counts(
    db: &PgPool,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> anyhow::Result<Vec<(i32, i64)>> {
    let rows = sqlx::query_as::<_, (i32, i64)>(
        r#"
        SELECT EXTRACT(HOUR FROM visited_at)::INT AS hour, COUNT(*) AS visits
        FROM visitor_stats
        WHERE visited_at >= $1 AND visited_at < $2
        GROUP BY hour
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn user_agents_between(
    db: &PgPool,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> anyhow::Result<Vec<String>> {
    let agents: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT user_agent
        FROM visitor_stats
        WHERE visited_at >= $1 AND visited_at < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await?;
    Ok(agents)
}

/// Wipes the raw events, the aggregates and the seen-today set together.
pub async fn reset_all(db: &PgPool) -> anyhow::Result<()> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM visitor_stats").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM daily_stats").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM daily_visitor_ips").execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}
