//! Business logic services

pub mod callback_service;
pub mod leaderboard_service;
pub mod scoring_service;
pub mod submission_service;

pub use callback_service::{CallbackOutcome, CallbackService};
pub use leaderboard_service::{LeaderboardEntry, LeaderboardService};
pub use scoring_service::ScoringService;
pub use submission_service::SubmissionService;
