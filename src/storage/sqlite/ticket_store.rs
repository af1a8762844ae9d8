//! SQLite TicketStore implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_query::{Expr, OnConflict, Order, Query, SqliteQueryBuilder};

use super::{fetch_winner, insert_tickets, ticket_from_row, SqliteLedgerStore};
use crate::model::Ticket;
use crate::storage::helpers::format_timestamp;
use crate::storage::schema::{DrawWinners, Tickets};
use crate::storage::{Result, StorageError, TicketStore};

#[async_trait]
impl TicketStore for SqliteLedgerStore {
    async fn store_tickets(&self, tickets: &[Ticket]) -> Result<()> {
        if tickets.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        insert_tickets(&mut tx, tickets).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn tickets_for_event(&self, event_id: &str) -> Result<Vec<Ticket>> {
        let query = Query::select()
            .columns([
                Tickets::Id,
                Tickets::UserId,
                Tickets::EventId,
                Tickets::PurchaseDate,
            ])
            .from(Tickets::Table)
            .and_where(Expr::col(Tickets::EventId).eq(event_id))
            .order_by(Tickets::Seq, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(ticket_from_row).collect()
    }

    async fn record_winner(
        &self,
        event_id: &str,
        ticket: &Ticket,
        drawn_at: DateTime<Utc>,
    ) -> Result<Ticket> {
        let mut tx = self.pool.begin().await?;

        let query = Query::insert()
            .into_table(DrawWinners::Table)
            .columns([
                DrawWinners::EventId,
                DrawWinners::TicketId,
                DrawWinners::DrawnAt,
            ])
            .values_panic([
                event_id.into(),
                ticket.id.clone().into(),
                format_timestamp(drawn_at).into(),
            ])
            .on_conflict(OnConflict::column(DrawWinners::EventId).do_nothing().to_owned())
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *tx).await?;

        let winner = fetch_winner(&mut tx, event_id).await?.ok_or_else(|| {
            StorageError::Conflict(format!("winner for {} vanished during draw", event_id))
        })?;

        tx.commit().await?;
        Ok(winner)
    }

    async fn winner(&self, event_id: &str) -> Result<Option<Ticket>> {
        let mut conn = self.pool.acquire().await?;
        fetch_winner(&mut conn, event_id).await
    }
}
