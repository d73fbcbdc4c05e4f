mod create_habit_handler;
mod delete_habit_handler;
mod rename_habit_handler;
mod toggle_completion_handler;

#[cfg(test)]
mod tests;

pub use create_habit_handler::CreateHabitCommandHandler;
pub use delete_habit_handler::DeleteHabitCommandHandler;
pub use rename_habit_handler::RenameHabitCommandHandler;
pub use toggle_completion_handler::ToggleCompletionCommandHandler;
