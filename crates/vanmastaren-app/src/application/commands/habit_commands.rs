use crate::application::commands::command_handler::Command;
use crate::application::dtos::HabitDto;

/// Create habit command
#[derive(Debug, Clone)]
pub struct CreateHabitCommand {
    pub name: String,
    /// Record a completion for today right away.
    pub completed_today: bool,
}

impl Command for CreateHabitCommand {}

/// Create habit command result
#[derive(Debug, Clone)]
pub struct CreateHabitResult {
    pub habit: HabitDto,
}

/// Mark today done, or undo today's completion
#[derive(Debug, Clone)]
pub struct ToggleCompletionCommand {
    pub habit_id: String,
}

impl Command for ToggleCompletionCommand {}

#[derive(Debug, Clone)]
pub struct ToggleCompletionResult {
    pub habit: HabitDto,
}

/// Rename habit command
#[derive(Debug, Clone)]
pub struct RenameHabitCommand {
    pub habit_id: String,
    pub name: String,
}

impl Command for RenameHabitCommand {}

#[derive(Debug, Clone)]
pub struct RenameHabitResult {
    pub habit: HabitDto,
}

/// Delete habit command
#[derive(Debug, Clone)]
pub struct DeleteHabitCommand {
    pub habit_id: String,
}

impl Command for DeleteHabitCommand {}

/// Delete habit command result
#[derive(Debug, Clone)]
pub struct DeleteHabitResult {
    pub success: bool,
}
