pub mod orchestrator;
pub mod pipeline;
pub mod types;

pub use orchestrator::{SolverInfo, WorkflowIdGenerator, WorkflowOrchestrator};
