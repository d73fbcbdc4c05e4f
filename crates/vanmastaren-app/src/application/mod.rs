pub mod clock;
pub mod commands;
pub mod dtos;
pub mod event_handlers;
pub mod queries;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
