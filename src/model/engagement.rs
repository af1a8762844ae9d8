//! Social engagement actions that earn reward points.

use std::fmt;
use std::str::FromStr;

/// Closed set of rewardable engagement actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementAction {
    Like,
    Comment,
    Share,
}

impl EngagementAction {
    pub fn as_str(self) -> &'static str {
        match self {
            EngagementAction::Like => "like",
            EngagementAction::Comment => "comment",
            EngagementAction::Share => "share",
        }
    }
}

impl fmt::Display for EngagementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown engagement action: {0:?}")]
pub struct UnknownAction(pub String);

impl FromStr for EngagementAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(EngagementAction::Like),
            "comment" => Ok(EngagementAction::Comment),
            "share" => Ok(EngagementAction::Share),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_actions() {
        assert_eq!("like".parse::<EngagementAction>(), Ok(EngagementAction::Like));
        assert_eq!("comment".parse::<EngagementAction>(), Ok(EngagementAction::Comment));
        assert_eq!("share".parse::<EngagementAction>(), Ok(EngagementAction::Share));
    }

    #[test]
    fn test_parse_is_exact() {
        assert!("Like".parse::<EngagementAction>().is_err());
        assert!("".parse::<EngagementAction>().is_err());
        assert!("subscribe".parse::<EngagementAction>().is_err());
    }
}
