//! SQLite implementation of the storage interfaces.
//!
//! Multi-row mutations run inside one sqlx transaction; dropping the
//! transaction on any error path rolls it back.

use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use super::helpers::{format_timestamp, from_cents, parse_timestamp, to_cents};
use super::schema::{
    DrawWinners, Earnings, RewardHistory, Tickets, Users, CREATE_DRAW_WINNERS_TABLE,
    CREATE_EARNINGS_TABLE, CREATE_REWARD_HISTORY_TABLE, CREATE_TICKETS_TABLE, CREATE_USERS_TABLE,
};
use super::{Result, StorageError};
use crate::model::{Earning, Ticket, UserAccount};

mod ledger_store;
mod ticket_store;

/// SQLite implementation of LedgerStore and TicketStore.
pub struct SqliteLedgerStore {
    pool: SqlitePool,
}

impl SqliteLedgerStore {
    /// Create a new SQLite ledger store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        for ddl in [
            CREATE_USERS_TABLE,
            CREATE_REWARD_HISTORY_TABLE,
            CREATE_EARNINGS_TABLE,
            CREATE_TICKETS_TABLE,
            CREATE_DRAW_WINNERS_TABLE,
        ] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        debug!("SQLite ledger schema ready");
        Ok(())
    }
}

fn count_from_db(column: &'static str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| StorageError::CounterOutOfRange {
        column,
        value: value.to_string(),
    })
}

/// Counters are stored as INTEGER, so anything above `i64::MAX` is refused.
fn count_to_db(column: &'static str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| StorageError::CounterOutOfRange {
        column,
        value: value.to_string(),
    })
}

fn user_from_row(row: &SqliteRow) -> Result<UserAccount> {
    let level: String = row.try_get("creator_level")?;
    Ok(UserAccount {
        id: row.try_get("id")?,
        reward_points: row.try_get("reward_points")?,
        total_views: count_from_db("total_views", row.try_get("total_views")?)?,
        creator_level: level.parse()?,
        reels_count: count_from_db("reels_count", row.try_get("reels_count")?)?,
    })
}

fn earning_from_row(row: &SqliteRow) -> Result<Earning> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(Earning {
        id: uuid::Uuid::parse_str(&id)?,
        user_id: row.try_get("user_id")?,
        amount: from_cents(row.try_get("amount_cents")?),
        source: row.try_get("source")?,
        created_at: parse_timestamp(&created_at)?,
        is_paid: row.try_get("is_paid")?,
    })
}

fn ticket_from_row(row: &SqliteRow) -> Result<Ticket> {
    let purchase_date: String = row.try_get("purchase_date")?;
    Ok(Ticket {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        event_id: row.try_get("event_id")?,
        purchase_date: parse_timestamp(&purchase_date)?,
    })
}

async fn fetch_user(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<UserAccount>> {
    let query = Query::select()
        .columns([
            Users::Id,
            Users::RewardPoints,
            Users::TotalViews,
            Users::CreatorLevel,
            Users::ReelsCount,
        ])
        .from(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .to_string(SqliteQueryBuilder);

    let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
    row.as_ref().map(user_from_row).transpose()
}

async fn require_user(conn: &mut SqliteConnection, user_id: &str) -> Result<UserAccount> {
    fetch_user(conn, user_id)
        .await?
        .ok_or_else(|| StorageError::UserNotFound(user_id.to_string()))
}

/// Apply a point delta with its history entry. Caller owns the transaction.
///
/// The balance check is part of the UPDATE, so two racing deductions can
/// never both pass it.
async fn apply_points(
    conn: &mut SqliteConnection,
    user_id: &str,
    delta: i64,
    reason: &str,
    at: chrono::DateTime<chrono::Utc>,
) -> Result<i64> {
    let query = Query::update()
        .table(Users::Table)
        .value(Users::RewardPoints, Expr::col(Users::RewardPoints).add(delta))
        .and_where(Expr::col(Users::Id).eq(user_id))
        .and_where(Expr::col(Users::RewardPoints).gte(delta.saturating_neg()))
        .returning_col(Users::RewardPoints)
        .to_string(SqliteQueryBuilder);

    let balance: i64 = match sqlx::query(&query).fetch_optional(&mut *conn).await? {
        Some(row) => row.try_get("reward_points")?,
        None => {
            let user = require_user(conn, user_id).await?;
            return Err(StorageError::InsufficientBalance {
                user_id: user_id.to_string(),
                balance: user.reward_points,
                required: delta.saturating_neg(),
            });
        }
    };

    let query = Query::insert()
        .into_table(RewardHistory::Table)
        .columns([
            RewardHistory::UserId,
            RewardHistory::Amount,
            RewardHistory::Reason,
            RewardHistory::CreatedAt,
        ])
        .values_panic([
            user_id.into(),
            delta.into(),
            reason.into(),
            format_timestamp(at).into(),
        ])
        .to_string(SqliteQueryBuilder);

    sqlx::query(&query).execute(&mut *conn).await?;

    Ok(balance)
}

async fn insert_earning(conn: &mut SqliteConnection, earning: &Earning) -> Result<()> {
    let query = Query::insert()
        .into_table(Earnings::Table)
        .columns([
            Earnings::Id,
            Earnings::UserId,
            Earnings::AmountCents,
            Earnings::Source,
            Earnings::CreatedAt,
            Earnings::IsPaid,
        ])
        .values_panic([
            earning.id.to_string().into(),
            earning.user_id.clone().into(),
            to_cents(earning.amount)?.into(),
            earning.source.clone().into(),
            format_timestamp(earning.created_at).into(),
            earning.is_paid.into(),
        ])
        .to_string(SqliteQueryBuilder);

    sqlx::query(&query).execute(&mut *conn).await?;
    Ok(())
}

async fn insert_tickets(conn: &mut SqliteConnection, tickets: &[Ticket]) -> Result<()> {
    for ticket in tickets {
        let query = Query::insert()
            .into_table(Tickets::Table)
            .columns([
                Tickets::Id,
                Tickets::UserId,
                Tickets::EventId,
                Tickets::PurchaseDate,
            ])
            .values_panic([
                ticket.id.clone().into(),
                ticket.user_id.clone().into(),
                ticket.event_id.clone().into(),
                format_timestamp(ticket.purchase_date).into(),
            ])
            .to_string(SqliteQueryBuilder);

        match sqlx::query(&query).execute(&mut *conn).await {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(StorageError::DuplicateTicket(ticket.id.clone()));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn fetch_winner(conn: &mut SqliteConnection, event_id: &str) -> Result<Option<Ticket>> {
    let query = Query::select()
        .columns([
            (Tickets::Table, Tickets::Id),
            (Tickets::Table, Tickets::UserId),
            (Tickets::Table, Tickets::EventId),
            (Tickets::Table, Tickets::PurchaseDate),
        ])
        .from(DrawWinners::Table)
        .inner_join(
            Tickets::Table,
            Expr::col((Tickets::Table, Tickets::Id))
                .equals((DrawWinners::Table, DrawWinners::TicketId)),
        )
        .and_where(Expr::col((DrawWinners::Table, DrawWinners::EventId)).eq(event_id))
        .to_string(SqliteQueryBuilder);

    let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
    row.as_ref().map(ticket_from_row).transpose()
}

fn insert_user_query(user_id: &str, created_at: &str) -> String {
    Query::insert()
        .into_table(Users::Table)
        .columns([Users::Id, Users::CreatedAt])
        .values_panic([user_id.into(), created_at.into()])
        .on_conflict(OnConflict::column(Users::Id).do_nothing().to_owned())
        .to_string(SqliteQueryBuilder)
}
