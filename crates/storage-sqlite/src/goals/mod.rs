//! SQLite storage implementation for the goal.

mod model;
mod repository;

pub use model::{GoalChangesetDB, GoalDB};
pub use repository::GoalRepository;
