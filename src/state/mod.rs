pub mod shared;
pub mod loading;
pub mod startup;

pub use shared::SharedState;
pub use loading::{AttemptId, LoadAttempt};
pub use startup::{StartupPhase, StartupTimer};
