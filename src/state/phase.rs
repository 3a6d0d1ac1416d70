//! Lifecycle of one domain's crawl
//!
//! `Seeded -> Running -> (Exhausted | PageLimitReached) -> Done`

use crate::ShelfError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    /// Homepage and extra seeds are queued; nothing fetched yet
    Seeded,

    /// Frontier entries are being dispatched
    Running,

    /// The frontier emptied before the page budget was used
    Exhausted,

    /// The page budget was used; no further dispatches
    PageLimitReached,

    /// All in-flight fetches have been drained
    Done,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Seeded, Self::Running)
                | (Self::Running, Self::Exhausted)
                | (Self::Running, Self::PageLimitReached)
                | (Self::Exhausted, Self::Done)
                | (Self::PageLimitReached, Self::Done)
        )
    }

    /// Returns the next phase, or an error if the transition is illegal
    pub fn advance(self, next: CrawlPhase) -> Result<CrawlPhase, ShelfError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ShelfError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Returns true once new dispatches are no longer allowed
    pub fn is_stopping(&self) -> bool {
        matches!(self, Self::Exhausted | Self::PageLimitReached | Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Running => "running",
            Self::Exhausted => "exhausted",
            Self::PageLimitReached => "page_limit_reached",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_paths() {
        let phase = CrawlPhase::Seeded.advance(CrawlPhase::Running).unwrap();
        let phase = phase.advance(CrawlPhase::PageLimitReached).unwrap();
        assert_eq!(phase.advance(CrawlPhase::Done).unwrap(), CrawlPhase::Done);

        let phase = CrawlPhase::Running.advance(CrawlPhase::Exhausted).unwrap();
        assert_eq!(phase.advance(CrawlPhase::Done).unwrap(), CrawlPhase::Done);
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(CrawlPhase::Seeded.advance(CrawlPhase::Done).is_err());
        assert!(CrawlPhase::Running.advance(CrawlPhase::Done).is_err());
        assert!(CrawlPhase::Exhausted.advance(CrawlPhase::Running).is_err());
        assert!(CrawlPhase::Done.advance(CrawlPhase::Running).is_err());
        assert!(CrawlPhase::Exhausted
            .advance(CrawlPhase::PageLimitReached)
            .is_err());
    }

    #[test]
    fn test_error_names_both_phases() {
        let err = CrawlPhase::Done.advance(CrawlPhase::Seeded).unwrap_err();
        assert!(matches!(
            err,
            ShelfError::InvalidTransition {
                from: CrawlPhase::Done,
                to: CrawlPhase::Seeded
            }
        ));
    }

    #[test]
    fn test_is_stopping() {
        assert!(!CrawlPhase::Seeded.is_stopping());
        assert!(!CrawlPhase::Running.is_stopping());
        assert!(CrawlPhase::Exhausted.is_stopping());
        assert!(CrawlPhase::PageLimitReached.is_stopping());
        assert!(CrawlPhase::Done.is_stopping());
    }

    #[test]
    fn test_display() {
        assert_eq!(CrawlPhase::PageLimitReached.to_string(), "page_limit_reached");
    }
}
