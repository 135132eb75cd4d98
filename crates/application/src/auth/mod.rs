//! Session storage, refresh coordination, and sign-in workflows.

mod coordinator;
mod memory_store;
mod session_service;

pub use coordinator::{RefreshCoordinator, RefreshState};
pub use memory_store::MemorySessionStore;
pub use session_service::SessionService;
