//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.
//! Money columns hold integer cents; timestamps are fixed-width RFC3339 text.

use sea_query::Iden;

/// Users table schema.
#[derive(Iden)]
pub enum Users {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "reward_points"]
    RewardPoints,
    #[iden = "total_views"]
    TotalViews,
    #[iden = "creator_level"]
    CreatorLevel,
    #[iden = "reels_count"]
    ReelsCount,
    #[iden = "created_at"]
    CreatedAt,
}

/// Reward history table schema. `seq` preserves insertion order.
#[derive(Iden)]
pub enum RewardHistory {
    Table,
    #[iden = "seq"]
    Seq,
    #[iden = "user_id"]
    UserId,
    #[iden = "amount"]
    Amount,
    #[iden = "reason"]
    Reason,
    #[iden = "created_at"]
    CreatedAt,
}

/// Earnings table schema.
#[derive(Iden)]
pub enum Earnings {
    Table,
    #[iden = "seq"]
    Seq,
    #[iden = "id"]
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "amount_cents"]
    AmountCents,
    #[iden = "source"]
    Source,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "is_paid"]
    IsPaid,
}

/// Tickets table schema.
#[derive(Iden)]
pub enum Tickets {
    Table,
    #[iden = "seq"]
    Seq,
    #[iden = "id"]
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "event_id"]
    EventId,
    #[iden = "purchase_date"]
    PurchaseDate,
}

/// Draw winners table schema, one row per drawn event.
#[derive(Iden)]
pub enum DrawWinners {
    Table,
    #[iden = "event_id"]
    EventId,
    #[iden = "ticket_id"]
    TicketId,
    #[iden = "drawn_at"]
    DrawnAt,
}

/// SQL for creating the users table.
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    reward_points INTEGER NOT NULL DEFAULT 0 CHECK (reward_points >= 0),
    total_views INTEGER NOT NULL DEFAULT 0,
    creator_level TEXT NOT NULL DEFAULT 'beginner',
    reels_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);
"#;

/// SQL for creating the reward history table.
pub const CREATE_REWARD_HISTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reward_history (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL REFERENCES users(id),
    amount INTEGER NOT NULL,
    reason TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reward_history_user ON reward_history(user_id, seq);
"#;

/// SQL for creating the earnings table.
pub const CREATE_EARNINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS earnings (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    user_id TEXT NOT NULL REFERENCES users(id),
    amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
    source TEXT NOT NULL,
    created_at TEXT NOT NULL,
    is_paid INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_earnings_user ON earnings(user_id, seq);
"#;

/// SQL for creating the tickets table.
pub const CREATE_TICKETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tickets (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    user_id TEXT NOT NULL,
    event_id TEXT NOT NULL,
    purchase_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tickets_event ON tickets(event_id, seq);
"#;

/// SQL for creating the draw winners table.
pub const CREATE_DRAW_WINNERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS draw_winners (
    event_id TEXT PRIMARY KEY,
    ticket_id TEXT NOT NULL REFERENCES tickets(id),
    drawn_at TEXT NOT NULL
);
"#;
