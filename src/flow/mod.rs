//! Flow module - deployment lifecycle and the multi-turn test loop
//!
//! Contains:
//! - `manager`: the step-by-step deployment driver
//! - `invocation`: the invoke / drain / re-prompt loop
//! - `lifecycle`: resource tracking and best-effort cleanup

pub mod conversation;
pub mod events;
pub mod invocation;
pub mod lifecycle;
pub mod manager;
pub mod payload;

pub use conversation::Conversation;
pub use events::InvocationOutcome;
pub use invocation::InvocationLoop;
pub use lifecycle::{cleanup_flow, CreatedResources, FlowLifecycle, LifecycleOutcome};
pub use manager::{DeployOptions, Deployment, FlowManager, PreparedFlow};
pub use payload::{build_payload, TurnInput};
