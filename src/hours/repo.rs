use sqlx::{FromRow, PgPool};
use time::{Date, Time};

/// One weekday row; 0 = Sunday .. 6 = Saturday. Either `closed` is set or
/// both times are present.
#[derive(Debug, Clone, FromRow)]
pub struct OpeningHour {
    pub day_of_week: i16,
    pub open_time: Option<Time>,
    pub close_time: Option<Time>,
    pub closed: bool,
}

/// The single vacation-mode row. While active for today's date, the public
/// site shows the closure message instead of the opening hours.
#[derive(Debug, Clone, FromRow)]
pub struct VacationMode {
    pub active: bool,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub message: String,
}

impl Default for VacationMode {
    fn default() -> Self {
        Self {
            active: false,
            start_date: None,
            end_date: None,
            message: String::new(),
        }
    }
}

impl OpeningHour {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<OpeningHour>> {
        let rows = sqlx::query_as::<_, OpeningHour>(
            r#"
            SELECT day_of_week, open_time, close_time, closed
            FROM opening_hours
            ORDER BY day_of_week ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Replaces the full week atomically.
    pub async fn replace_all(db: &PgPool, rows: &[OpeningHour]) -> anyhow::Result<()> {
        let mut tx = db.begin().await?;
        sqlx::query("DELETE FROM opening_hours").execute(&mut *tx).await?;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO opening_hours (day_of_week, open_time, close_time, closed)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(row.day_of_week)
            .bind(row.open_time)
            .bind(row.close_time)
            .bind(row.closed)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

impl VacationMode {
    pub async fn get(db: &PgPool) -> anyhow::Result<VacationMode> {
        let row = sqlx::query_as::<_, VacationMode>(
            "SELECT active, start_date, end_date, message FROM vacation_mode WHERE id = 1",
        )
        .fetch_optional(db)
        .await?;
        Ok(row.unwrap_or_default())
    }

    pub async fn set(db: &PgPool, v: &VacationMode) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vacation_mode (id, active, start_date, end_date, message)
            VALUES (1, $1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                active = EXCLUDED.active,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                message = EXCLUDED.message
            "#,
        )
        .bind(v.active)
        .bind(v.start_date)
        .bind(v.end_date)
        .bind(&v.message)
        .execute(db)
        .await?;
        Ok(())
    }
}
