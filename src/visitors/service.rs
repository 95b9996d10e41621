use std::collections::BTreeMap;

use axum::http::HeaderMap;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use time::{Date, Month, OffsetDateTime};
use tracing::debug;

use crate::config::Environment;

use super::dto::{CategoryCount, RecentVisitor, RecordVisitRequest, StatisticsResponse};
use super::repo::{self, NewVisit};

const RECENT_LIMIT: i64 = 50;
const TOP_PAGES_LIMIT: i64 = 10;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Client IP from proxy headers, by precedence: first `x-forwarded-for`
/// entry, `x-real-ip`, `cf-connecting-ip`, `client-ip`, loopback.
pub(crate) fn header_client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    for name in ["x-real-ip", "cf-connecting-ip", "client-ip"] {
        if let Some(value) = header_str(headers, name) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    "127.0.0.1".to_string()
}

/// Synthetic address for development: derived from the session id so one
/// browser session keeps one stable pseudo-IP, random when no id was sent.
fn pseudo_ip(session_id: Option<&str>) -> String {
    match session_id {
        Some(sid) if !sid.is_empty() => {
            let digest = Sha256::digest(sid.as_bytes());
            format!("10.{}.{}.{}", digest[0], digest[1], digest[2])
        }
        _ => {
            let mut rng = rand::thread_rng();
            format!(
                "10.{}.{}.{}",
                rng.gen::<u8>(),
                rng.gen::<u8>(),
                rng.gen::<u8>()
            )
        }
    }
}

pub(crate) fn resolve_client_ip(
    headers: &HeaderMap,
    session_id: Option<&str>,
    environment: Environment,
) -> String {
    if environment.is_production() {
        header_client_ip(headers)
    } else {
        pseudo_ip(session_id)
    }
}

pub(crate) fn classify_device(user_agent: &str) -> &'static str {
    let ua = user_agent.to_ascii_lowercase();
    if ua.contains("ipad") || ua.contains("tablet") {
        "Tablet"
    } else if ua.contains("mobile") || ua.contains("iphone") || ua.contains("android") {
        "Mobile"
    } else {
        "Desktop"
    }
}

pub(crate) fn classify_browser(user_agent: &str) -> &'static str {
    let ua = user_agent.to_ascii_lowercase();
    if ua.contains("edg") {
        "Edge"
    } else if ua.contains("firefox") {
        "Firefox"
    } else if ua.contains("chrome") || ua.contains("crios") {
        "Chrome"
    } else if ua.contains("safari") {
        "Safari"
    } else {
        "Other"
    }
}

fn is_menu_page(page: &str) -> bool {
    page == "/menu" || page.starts_with("/menu/")
}

fn day_start(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}

pub(crate) fn day_window(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    let start = now.date();
    (day_start(start), day_start(start.next_day().expect("in range")))
}

pub(crate) fn month_window(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    let date = now.date();
    let start = Date::from_calendar_date(date.year(), date.month(), 1).expect("day 1 is valid");
    let end = match date.month() {
        Month::December => Date::from_calendar_date(date.year() + 1, Month::January, 1),
        month => Date::from_calendar_date(date.year(), month.next(), 1),
    }
    .expect("day 1 is valid");
    (day_start(start), day_start(end))
}

pub(crate) fn year_window(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    let year = now.date().year();
    let start = Date::from_calendar_date(year, Month::January, 1).expect("day 1 is valid");
    let end = Date::from_calendar_date(year + 1, Month::January, 1).expect("day 1 is valid");
    (day_start(start), day_start(end))
}

pub(crate) fn fill_hourly(rows: Vec<(i32, i64)>) -> Vec<i64> {
    let mut buckets = vec![0i64; 24];
    for (hour, count) in rows {
        if (0..24).contains(&hour) {
            buckets[hour as usize] = count;
        }
    }
    buckets
}

pub(crate) fn breakdown(
    agents: &[String],
    classify: fn(&str) -> &'static str,
) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&'static str, i64> = BTreeMap::new();
    for ua in agents {
        *counts.entry(classify(ua)).or_insert(0) += 1;
    }
    let total = agents.len() as i64;
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
            percentage: if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            },
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    out
}

/// Records one page view: raw event, seen-today set and daily aggregate in a
/// single transaction, so a failure cannot leave the raw log and the
/// aggregate out of step.
pub async fn ingest(
    db: &PgPool,
    environment: Environment,
    headers: &HeaderMap,
    payload: &RecordVisitRequest,
) -> anyhow::Result<()> {
    let ip = resolve_client_ip(headers, payload.session_id.as_deref(), environment);
    let user_agent = header_str(headers, "user-agent").unwrap_or_default();
    let referrer = header_str(headers, "referer").unwrap_or_default();
    let now = OffsetDateTime::now_utc();

    let visit = NewVisit {
        ip: &ip,
        user_agent,
        page: &payload.page,
        referrer,
        session_id: payload.session_id.as_deref().unwrap_or_default(),
        visited_at: now,
    };

    let mut tx = db.begin().await?;
    repo::insert_visit(&mut *tx, &visit).await?;
    let first_today = repo::mark_seen_today(&mut *tx, now.date(), &ip).await?;
    repo::bump_daily(&mut *tx, now.date(), first_today, is_menu_page(&payload.page)).await?;
    tx.commit().await?;

    debug!(%ip, page = %payload.page, first_today, "visit recorded");
    Ok(())
}

/// The full statistics bundle, computed live from the raw events.
pub async fn statistics(db: &PgPool) -> anyhow::Result<StatisticsResponse> {
    let now = OffsetDateTime::now_utc();
    let (day_from, day_to) = day_window(now);
    let (month_from, month_to) = month_window(now);
    let (year_from, year_to) = year_window(now);

    let today = repo::counts_between(db, day_from, day_to).await?;
    let month = repo::counts_between(db, month_from, month_to).await?;
    let year = repo::counts_between(db, year_from, year_to).await?;
    let all_time = repo::counts_all(db).await?;

    let recent_visitors = repo::recent(db, RECENT_LIMIT)
        .await?
        .into_iter()
        .map(|row| RecentVisitor {
            device: classify_device(&row.user_agent),
            ip: row.ip,
            page: row.page,
            referrer: row.referrer,
            visited_at: row.visited_at,
        })
        .collect();

    let top_pages = repo::top_pages(db, TOP_PAGES_LIMIT).await?;
    let hourly_stats = fill_hourly(repo::hourly_counts(db, day_from, day_to).await?);

    let agents = repo::user_agents_between(db, month_from, month_to).await?;
    let devices = breakdown(&agents, classify_device);
    let browsers = breakdown(&agents, classify_browser);

    Ok(StatisticsResponse {
        success: true,
        today,
        month,
        year,
        all_time,
        recent_visitors,
        top_pages,
        hourly_stats,
        devices,
        browsers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const DESKTOP_UA: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";
    const IPHONE_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Version/17.0 Mobile/15E148 Safari/604.1";
    const IPAD_UA: &str =
        "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X) Version/16.0 Mobile/15E148 Safari/604.1";

    #[test]
    fn device_classification() {
        assert_eq!(classify_device(DESKTOP_UA), "Desktop");
        assert_eq!(classify_device(IPHONE_UA), "Mobile");
        assert_eq!(classify_device(IPAD_UA), "Tablet");
        assert_eq!(classify_device("Mozilla/5.0 (Linux; Android 13; Pixel)"), "Mobile");
        assert_eq!(classify_device(""), "Desktop");
    }

    #[test]
    fn browser_classification() {
        assert_eq!(classify_browser(DESKTOP_UA), "Chrome");
        assert_eq!(classify_browser(IPHONE_UA), "Safari");
        assert_eq!(
            classify_browser("Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0"),
            "Firefox"
        );
        assert_eq!(
            classify_browser("Mozilla/5.0 (Windows NT 10.0) Chrome/120.0 Safari/537.36 Edg/120.0"),
            "Edge"
        );
        assert_eq!(classify_browser("curl/8.4.0"), "Other");
    }

    #[test]
    fn pseudo_ip_is_deterministic_per_session() {
        let a = pseudo_ip(Some("abc"));
        let b = pseudo_ip(Some("abc"));
        let c = pseudo_ip(Some("other-session"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("10."));
    }

    #[test]
    fn pseudo_ip_without_session_is_still_private_range() {
        assert!(pseudo_ip(None).starts_with("10."));
        assert!(pseudo_ip(Some("")).starts_with("10."));
    }

    #[test]
    fn header_precedence_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 70.41.3.18".parse().unwrap());
        headers.insert("x-real-ip", "198.51.100.1".parse().unwrap());
        assert_eq!(header_client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn header_precedence_falls_through() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", "198.51.100.9".parse().unwrap());
        assert_eq!(header_client_ip(&headers), "198.51.100.9");

        assert_eq!(header_client_ip(&HeaderMap::new()), "127.0.0.1");
    }

    #[test]
    fn production_mode_reads_headers_dev_mode_synthesizes() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.1".parse().unwrap());
        assert_eq!(
            resolve_client_ip(&headers, Some("sid"), Environment::Production),
            "198.51.100.1"
        );
        let dev = resolve_client_ip(&headers, Some("sid"), Environment::Development);
        assert!(dev.starts_with("10."));
    }

    #[test]
    fn menu_pages() {
        assert!(is_menu_page("/menu"));
        assert!(is_menu_page("/menu/antipasti"));
        assert!(!is_menu_page("/menus"));
        assert!(!is_menu_page("/"));
    }

    #[test]
    fn day_window_covers_exactly_one_date() {
        let (from, to) = day_window(datetime!(2025-07-15 13:45 UTC));
        assert_eq!(from, datetime!(2025-07-15 00:00 UTC));
        assert_eq!(to, datetime!(2025-07-16 00:00 UTC));
    }

    #[test]
    fn month_window_handles_december_rollover() {
        let (from, to) = month_window(datetime!(2025-12-31 23:59 UTC));
        assert_eq!(from, datetime!(2025-12-01 00:00 UTC));
        assert_eq!(to, datetime!(2026-01-01 00:00 UTC));
    }

    #[test]
    fn year_window_spans_calendar_year() {
        let (from, to) = year_window(datetime!(2025-03-02 08:00 UTC));
        assert_eq!(from, datetime!(2025-01-01 00:00 UTC));
        assert_eq!(to, datetime!(2026-01-01 00:00 UTC));
    }

    #[test]
    fn hourly_buckets_are_zero_filled() {
        let buckets = fill_hourly(vec![(0, 3), (13, 7), (23, 1)]);
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[0], 3);
        assert_eq!(buckets[13], 7);
        assert_eq!(buckets[23], 1);
        assert_eq!(buckets[1], 0);
    }

    #[test]
    fn breakdown_counts_and_percentages() {
        let agents = vec![
            DESKTOP_UA.to_string(),
            DESKTOP_UA.to_string(),
            IPHONE_UA.to_string(),
            IPAD_UA.to_string(),
        ];
        let devices = breakdown(&agents, classify_device);
        assert_eq!(devices[0].name, "Desktop");
        assert_eq!(devices[0].count, 2);
        assert!((devices[0].percentage - 50.0).abs() < f64::EPSILON);
        let total: i64 = devices.iter().map(|d| d.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn breakdown_of_nothing_has_no_divide_by_zero() {
        assert!(breakdown(&[], classify_device).is_empty());
    }
}
