pub mod habit_repo;

pub use habit_repo::SqliteHabitRepository;
