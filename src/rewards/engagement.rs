//! Engagement rewarder: maps engagement events to reward-point deltas.

use crate::model::EngagementAction;

/// Points for every posted reel.
pub const REEL_BASE_POINTS: i64 = 10;

/// Cumulative view bonuses for a single reel: `(min views, bonus points)`.
///
/// Every threshold the reel reaches adds its bonus.
pub const REEL_VIEW_BONUSES: [(u64, i64); 3] = [(1_000, 20), (5_000, 50), (20_000, 100)];

/// Flat daily login reward.
pub const DAILY_LOGIN_POINTS: i64 = 5;

/// An event that earns reward points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementEvent {
    ReelCreated { views: u64 },
    DailyLogin,
    Action(EngagementAction),
}

impl EngagementEvent {
    /// Point delta awarded for this event.
    pub fn points(&self) -> i64 {
        match self {
            EngagementEvent::ReelCreated { views } => reel_points(*views),
            EngagementEvent::DailyLogin => DAILY_LOGIN_POINTS,
            EngagementEvent::Action(action) => action_points(*action),
        }
    }

    /// History reason naming the count or action that triggered the reward.
    pub fn reason(&self) -> String {
        match self {
            EngagementEvent::ReelCreated { views } => {
                format!("Reel posted with {} views", views)
            }
            EngagementEvent::DailyLogin => "Daily login bonus".to_string(),
            EngagementEvent::Action(action) => format!("Engagement reward: {}", action),
        }
    }
}

/// Base reel points plus every view bonus the reel qualifies for.
pub fn reel_points(views: u64) -> i64 {
    REEL_VIEW_BONUSES
        .iter()
        .filter(|(min_views, _)| views >= *min_views)
        .fold(REEL_BASE_POINTS, |points, (_, bonus)| points + bonus)
}

pub fn action_points(action: EngagementAction) -> i64 {
    match action {
        EngagementAction::Like => 1,
        EngagementAction::Comment => 3,
        EngagementAction::Share => 5,
    }
}
