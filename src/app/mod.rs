pub mod dispatch;
pub mod interactive;
pub mod render;

pub use dispatch::{Outcome, Session, run, run_attempt};
