//! Domain models

pub mod contest;
pub mod problem;
pub mod submission;

pub use contest::{Contest, ContestPoints, ContestScore};
pub use problem::{Difficulty, Problem};
pub use submission::{Submission, Verdict};
