mod engine;

pub use engine::{HabitTimer, TimerSnapshot, TimerState};
