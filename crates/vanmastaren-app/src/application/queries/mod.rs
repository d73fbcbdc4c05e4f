mod habit_queries;

pub use habit_queries::HabitQueryService;
