// Domain layer - habit aggregate and streak rules
// No dependencies on infrastructure or presentation layers

pub mod events;
pub mod habit;
pub mod shared;

// Re-exports for convenience
pub use events::DomainEvent;
pub use shared::{DomainError, HabitId};
