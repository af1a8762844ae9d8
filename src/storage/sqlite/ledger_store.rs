//! SQLite LedgerStore implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::{
    apply_points, count_to_db, earning_from_row, fetch_user, insert_earning, insert_tickets,
    insert_user_query, require_user, SqliteLedgerStore,
};
use crate::model::{Earning, RewardEntry, UserAccount};
use crate::rewards::tier;
use crate::storage::helpers::{format_timestamp, parse_timestamp};
use crate::storage::schema::{Earnings, RewardHistory, Users};
use crate::storage::{CoinPurchase, LedgerStore, ReelUpdate, Result, StorageError};

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    async fn create_user(&self, user_id: &str) -> Result<UserAccount> {
        let mut tx = self.pool.begin().await?;

        let query = insert_user_query(user_id, &format_timestamp(Utc::now()));
        sqlx::query(&query).execute(&mut *tx).await?;
        let user = require_user(&mut tx, user_id).await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserAccount>> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, user_id).await
    }

    async fn add_reward_points(
        &self,
        user_id: &str,
        delta: i64,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let balance = apply_points(&mut tx, user_id, delta, reason, at).await?;
        tx.commit().await?;
        Ok(balance)
    }

    async fn reward_history(&self, user_id: &str) -> Result<Vec<RewardEntry>> {
        let mut conn = self.pool.acquire().await?;
        require_user(&mut conn, user_id).await?;

        let query = Query::select()
            .columns([
                RewardHistory::Amount,
                RewardHistory::Reason,
                RewardHistory::CreatedAt,
            ])
            .from(RewardHistory::Table)
            .and_where(Expr::col(RewardHistory::UserId).eq(user_id))
            .order_by(RewardHistory::Seq, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let created_at: String = row.try_get("created_at")?;
            entries.push(RewardEntry {
                amount: row.try_get("amount")?,
                reason: row.try_get("reason")?,
                timestamp: parse_timestamp(&created_at)?,
            });
        }

        Ok(entries)
    }

    async fn record_reel(&self, user_id: &str, update: &ReelUpdate) -> Result<UserAccount> {
        let mut tx = self.pool.begin().await?;

        // Points first: the UPDATE takes the write lock before the account is read
        let balance = apply_points(&mut tx, user_id, update.points, &update.reason, update.at).await?;

        let mut account = require_user(&mut tx, user_id).await?;
        tier::advance(&mut account, update.views);
        account.reward_points = balance;
        let total_views = count_to_db("total_views", account.total_views)?;
        let reels_count = count_to_db("reels_count", account.reels_count)?;

        let query = Query::update()
            .table(Users::Table)
            .values([
                (Users::TotalViews, total_views.into()),
                (Users::CreatorLevel, account.creator_level.as_str().into()),
                (Users::ReelsCount, reels_count.into()),
            ])
            .and_where(Expr::col(Users::Id).eq(user_id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *tx).await?;

        if let Some(earning) = &update.earning {
            insert_earning(&mut tx, earning).await?;
        }

        tx.commit().await?;

        debug!(
            user_id = %user_id,
            total_views = account.total_views,
            tier = %account.creator_level,
            "Reel recorded"
        );
        Ok(account)
    }

    async fn add_earning(&self, earning: &Earning) -> Result<Earning> {
        let mut tx = self.pool.begin().await?;
        require_user(&mut tx, &earning.user_id).await?;
        insert_earning(&mut tx, earning).await?;
        tx.commit().await?;
        Ok(earning.clone())
    }

    async fn earnings(&self, user_id: &str) -> Result<Vec<Earning>> {
        let mut conn = self.pool.acquire().await?;
        require_user(&mut conn, user_id).await?;

        let query = Query::select()
            .columns([
                Earnings::Id,
                Earnings::UserId,
                Earnings::AmountCents,
                Earnings::Source,
                Earnings::CreatedAt,
                Earnings::IsPaid,
            ])
            .from(Earnings::Table)
            .and_where(Expr::col(Earnings::UserId).eq(user_id))
            .order_by(Earnings::Seq, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(earning_from_row).collect()
    }

    async fn mark_earning_paid(&self, earning_id: Uuid) -> Result<Earning> {
        let mut tx = self.pool.begin().await?;
        let id = earning_id.to_string();

        let query = Query::update()
            .table(Earnings::Table)
            .value(Earnings::IsPaid, true)
            .and_where(Expr::col(Earnings::Id).eq(id.as_str()))
            .and_where(Expr::col(Earnings::IsPaid).eq(false))
            .to_string(SqliteQueryBuilder);

        let updated = sqlx::query(&query).execute(&mut *tx).await?.rows_affected();

        let query = Query::select()
            .columns([
                Earnings::Id,
                Earnings::UserId,
                Earnings::AmountCents,
                Earnings::Source,
                Earnings::CreatedAt,
                Earnings::IsPaid,
            ])
            .from(Earnings::Table)
            .and_where(Expr::col(Earnings::Id).eq(id.as_str()))
            .to_string(SqliteQueryBuilder);

        let earning = match sqlx::query(&query).fetch_optional(&mut *tx).await? {
            Some(row) => earning_from_row(&row)?,
            None => return Err(StorageError::EarningNotFound(earning_id)),
        };
        if updated == 0 {
            return Err(StorageError::EarningAlreadyPaid(earning_id));
        }

        tx.commit().await?;
        Ok(earning)
    }

    async fn purchase_tickets(&self, purchase: &CoinPurchase) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let balance = apply_points(
            &mut tx,
            &purchase.user_id,
            purchase.cost.saturating_neg(),
            &purchase.reason,
            purchase.at,
        )
        .await?;
        insert_tickets(&mut tx, &purchase.tickets).await?;

        tx.commit().await?;
        Ok(balance)
    }
}
