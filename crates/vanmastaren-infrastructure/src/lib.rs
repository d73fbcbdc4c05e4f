// Infrastructure layer - Technical implementations
// Depends on domain layer, implements its interfaces

pub mod events;
pub mod logging;
pub mod persistence;

mod result_ext;

pub use persistence::Database;
pub use result_ext::ResultExt;
