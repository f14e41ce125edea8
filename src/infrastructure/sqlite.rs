use crate::domain::chat::UserId;
use crate::domain::order::{NewOrder, Order, OrderId, OrderStatus, TransitionPolicy};
use crate::domain::ports::OrderStore;
use crate::domain::reference::ReferenceCode;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const CREATE_ORDERS: &str = "
CREATE TABLE IF NOT EXISTS orders (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER NOT NULL,
  username TEXT,
  utr TEXT,
  status TEXT DEFAULT 'PENDING',
  created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_USER_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders (user_id)";

/// Same shape as SQLite's `CURRENT_TIMESTAMP`, with milliseconds.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const SELECT_ORDER: &str = "SELECT id, user_id, username, utr, status, created_at FROM orders";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    username: Option<String>,
    utr: Option<String>,
    status: Option<String>,
    created_at: Option<String>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

impl TryFrom<OrderRow> for Order {
    type Error = BotError;

    fn try_from(row: OrderRow) -> Result<Self> {
        let corrupt = |what: &str| {
            BotError::StorageError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("order {} has {what}", row.id),
            )))
        };

        let utr = row
            .utr
            .as_deref()
            .and_then(|utr| ReferenceCode::parse(utr).ok())
            .ok_or_else(|| corrupt("an invalid reference code"))?;
        let status = match row.status.as_deref() {
            None => OrderStatus::Pending,
            Some(status) => OrderStatus::from_str(status).map_err(|_| corrupt("an unknown status"))?,
        };
        let created_at = row
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| corrupt("an unreadable timestamp"))?;

        Ok(Order {
            id: OrderId(row.id),
            user_id: UserId(row.user_id),
            username: row.username,
            utr,
            status,
            created_at,
        })
    }
}

/// A persistent order store backed by a single SQLite file.
///
/// The pool holds one long-lived connection, so every statement is applied by
/// a single writer. Strict transitions are a single conditional `UPDATE` and
/// therefore atomic with respect to concurrent decisions.
///
/// `Clone` shares the underlying pool.
#[derive(Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Opens or creates the database at `path` and ensures the `orders` table exists.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        Self::connect(options).await
    }

    /// A private database that lives as long as the store.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        // One connection that is never recycled; an in-memory database would
        // vanish with it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_ORDERS).execute(&pool).await?;
        sqlx::query(CREATE_USER_INDEX).execute(&pool).await?;
        debug!("orders table ready");

        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn create(&self, order: NewOrder) -> Result<OrderId> {
        let result = sqlx::query(
            "INSERT INTO orders (user_id, username, utr, status, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order.user_id.0)
        .bind(order.username)
        .bind(order.utr.as_str())
        .bind(OrderStatus::Pending.as_str())
        .bind(Utc::now().format(TIMESTAMP_FORMAT).to_string())
        .execute(&self.pool)
        .await?;

        Ok(OrderId(result.last_insert_rowid()))
    }

    async fn set_status(
        &self,
        user_id: UserId,
        status: OrderStatus,
        policy: TransitionPolicy,
    ) -> Result<u64> {
        let result = match policy {
            TransitionPolicy::Lenient => {
                sqlx::query("UPDATE orders SET status = ? WHERE user_id = ?")
                    .bind(status.as_str())
                    .bind(user_id.0)
                    .execute(&self.pool)
                    .await?
            }
            TransitionPolicy::Strict => {
                let sources = policy.sources_for(status);
                if sources.is_empty() {
                    return Ok(0);
                }
                let placeholders = vec!["?"; sources.len()].join(", ");
                // Rows written with the column default may hold NULL, which reads as PENDING.
                let sql = format!(
                    "UPDATE orders SET status = ? WHERE user_id = ? AND COALESCE(status, 'PENDING') IN ({placeholders})"
                );
                let mut query = sqlx::query(&sql).bind(status.as_str()).bind(user_id.0);
                for source in sources {
                    query = query.bind(source.as_str());
                }
                query.execute(&self.pool).await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }
}
