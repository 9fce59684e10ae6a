pub mod import;
pub mod init;
pub mod leaderboard;
pub mod notes;
pub mod progress;
pub mod recompute;
pub mod register;
pub mod schedule;
pub mod validate;
