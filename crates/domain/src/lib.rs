#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod composer;
pub mod error;
pub mod exercise;
pub mod id;
pub mod name;
pub mod performance;
pub mod progress;
pub mod service;
pub mod training;
pub mod workout;


pub use composer::{ExerciseSelection, SetDraft, WorkoutDraft};
pub use error::{
    CompleteError, ComposeError, CreateError, DeleteError, ReadError, StorageError, UpdateError,
    ValidationError,
};
pub use exercise::{Exercise, ExerciseRepository, ExerciseService};
pub use id::{ExerciseID, SetID, UserID, WorkoutExerciseID, WorkoutID};
pub use name::{Description, Name, NameError};
pub use performance::{Comparison, PerformanceService, PreviousSet, align};
pub use progress::{
    HistoryFilter, HistoryStats, Progress, check_completion, history_stats, percentage,
    workout_progress,
};
pub use service::Service;
pub use training::{Reps, RepsError, Weight, WeightError};
pub use workout::{
    Set, SetChanges, Workout, WorkoutDetail, WorkoutExercise, WorkoutExerciseDetail,
    WorkoutRepository, WorkoutService,
};
