// One-shot populate-and-push orchestration
pub mod push_run;

pub use push_run::PushRun;
