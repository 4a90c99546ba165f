//! Problem model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::points;

/// Problem database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Problem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub difficulty: String,
    pub created_at: DateTime<Utc>,
}

impl Problem {
    /// Parse the stored difficulty, falling back to easy for unknown values
    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_str(&self.difficulty).unwrap_or(Difficulty::Easy)
    }
}

/// Problem difficulty tier, which determines the base point value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Get difficulty as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Parse difficulty from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    /// Base point value awarded for solving a problem of this difficulty
    pub fn base_points(&self) -> i64 {
        match self {
            Self::Easy => points::EASY,
            Self::Medium => points::MEDIUM,
            Self::Hard => points::HARD,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_points_by_difficulty() {
        assert_eq!(Difficulty::Easy.base_points(), 250);
        assert_eq!(Difficulty::Medium.base_points(), 500);
        assert_eq!(Difficulty::Hard.base_points(), 1_000);
    }

    #[test]
    fn test_difficulty_roundtrip() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_str("extreme"), None);
    }
}
