//! PostgreSQL implementation of the click repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;

use crate::domain::analytics::{ClickSummary, DailyClicks, GroupCount};
use crate::domain::entities::{ClickEvent, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    alias: String,
    clicked_at: DateTime<Utc>,
    user_agent: Option<String>,
    ip_address: Option<String>,
    os_name: String,
    device_type: String,
}

impl From<ClickRow> for ClickEvent {
    fn from(row: ClickRow) -> Self {
        Self {
            id: row.id,
            alias: row.alias,
            clicked_at: row.clicked_at,
            user_agent: row.user_agent,
            ip_address: row.ip_address,
            os_name: row.os_name,
            device_type: row.device_type,
        }
    }
}

#[derive(sqlx::FromRow)]
struct GroupRow {
    name: String,
    clicks: i64,
    unique_users: i64,
}

impl From<GroupRow> for GroupCount {
    fn from(row: GroupRow) -> Self {
        Self {
            name: row.name,
            clicks: count(row.clicks),
            unique_users: count(row.unique_users),
        }
    }
}

#[derive(sqlx::FromRow)]
struct DayRow {
    day: NaiveDate,
    clicks: i64,
}

fn count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}

/// Counts clicks and distinct IPs per value of `column`.
///
/// `column` is always one of the fixed names below, never user input.
async fn grouped(
    conn: &mut PgConnection,
    column: &'static str,
    aliases: &[String],
) -> Result<Vec<GroupCount>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {column} AS name,
               COUNT(*) AS clicks,
               COUNT(DISTINCT ip_address) AS unique_users
        FROM click_events
        WHERE alias = ANY($1)
        GROUP BY {column}
        "#
    );

    let rows = sqlx::query_as::<_, GroupRow>(&sql)
        .bind(aliases)
        .fetch_all(conn)
        .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert(&self, click: NewClick) -> Result<ClickEvent, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO click_events (alias, clicked_at, user_agent, ip_address, os_name, device_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&click.alias)
        .bind(click.clicked_at)
        .bind(&click.user_agent)
        .bind(&click.ip_address)
        .bind(&click.os_name)
        .bind(&click.device_type)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(click.into_event(id))
    }

    async fn list_for_aliases(&self, aliases: &[String]) -> Result<Vec<ClickEvent>, AppError> {
        if aliases.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT id, alias, clicked_at, user_agent, ip_address, os_name, device_type
            FROM click_events
            WHERE alias = ANY($1)
            ORDER BY clicked_at DESC
            "#,
        )
        .bind(aliases)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn summarize(
        &self,
        aliases: &[String],
        since: DateTime<Utc>,
    ) -> Result<ClickSummary, AppError> {
        if aliases.is_empty() {
            return Ok(ClickSummary::default());
        }

        // One snapshot for all five queries.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let (total_clicks, unique_users): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(DISTINCT ip_address)
            FROM click_events
            WHERE alias = ANY($1)
            "#,
        )
        .bind(aliases)
        .fetch_one(&mut *tx)
        .await?;

        let days = sqlx::query_as::<_, DayRow>(
            r#"
            SELECT (clicked_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS clicks
            FROM click_events
            WHERE alias = ANY($1) AND clicked_at >= $2
            GROUP BY day
            ORDER BY day DESC
            "#,
        )
        .bind(aliases)
        .bind(since)
        .fetch_all(&mut *tx)
        .await?;

        let per_alias = grouped(&mut *tx, "alias", aliases).await?;
        let by_os = grouped(&mut *tx, "os_name", aliases).await?;
        let by_device = grouped(&mut *tx, "device_type", aliases).await?;

        tx.commit().await?;

        Ok(ClickSummary {
            total_clicks: count(total_clicks),
            unique_users: count(unique_users),
            per_alias,
            by_date: days
                .into_iter()
                .map(|row| DailyClicks {
                    date: row.day,
                    click_count: count(row.clicks),
                })
                .collect(),
            by_os,
            by_device,
        })
    }
}
