pub mod task;
pub mod token;

pub use task::{Task, FnTask, AsyncTask};
pub use token::{CompletionToken, ReleaseOutcome};
