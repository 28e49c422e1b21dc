//! Building a persisted workout from an in-memory draft.
//!
//! A workout is written as three dependent kinds of rows: the workout header, one workout
//! exercise per selected exercise and the sets of each workout exercise. The writes are issued
//! strictly in sequence, because every step needs the id generated by the previous one and the
//! `order` of a workout exercise must reflect its position in the draft.
//!
//! If a write fails after the header has been created, the header is deleted again (which
//! removes all children already written). Only if that deletion fails as well, the caller gets a
//! [`ComposeError::PartialComposition`] naming the workout left behind.

use std::collections::HashSet;

use log::{debug, error, warn};

use crate::{
    ComposeError, CreateError, Description, ExerciseID, Name, Reps, UserID, ValidationError,
    Weight, WorkoutID, WorkoutRepository,
};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDraft {
    pub name: Name,
    pub description: Option<Description>,
    pub exercises: Vec<ExerciseSelection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSelection {
    pub exercise_id: ExerciseID,
    pub sets: Vec<SetDraft>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetDraft {
    pub weight: Option<Weight>,
    pub reps: Reps,
}

impl WorkoutDraft {
    pub fn new(
        name: &str,
        description: &str,
        exercises: Vec<ExerciseSelection>,
    ) -> Result<Self, ValidationError> {
        let draft = Self {
            name: Name::new(name)?,
            description: Description::new(description),
            exercises,
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.exercises.is_empty() {
            return Err(ValidationError::NoExercises);
        }

        let mut seen = HashSet::new();
        for (position, selection) in self.exercises.iter().enumerate() {
            if selection.sets.is_empty() {
                return Err(ValidationError::NoSets(position));
            }
            if !seen.insert(selection.exercise_id) {
                return Err(ValidationError::DuplicateExercise(position));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

pub async fn compose<R: WorkoutRepository>(
    repository: &R,
    user_id: UserID,
    draft: WorkoutDraft,
) -> Result<WorkoutID, ComposeError> {
    draft.validate()?;

    let num_sets = draft.num_sets();
    let WorkoutDraft {
        name,
        description,
        exercises,
    } = draft;

    let workout = repository
        .create_workout(user_id, name, description)
        .await?;

    debug!(
        "created workout {}, {} exercises with {num_sets} sets pending",
        workout.id,
        exercises.len()
    );

    match create_exercises(repository, workout.id, exercises).await {
        Ok(()) => Ok(workout.id),
        Err(err) => Err(roll_back(repository, workout.id, err).await),
    }
}

async fn create_exercises<R: WorkoutRepository>(
    repository: &R,
    workout_id: WorkoutID,
    exercises: Vec<ExerciseSelection>,
) -> Result<(), CreateError> {
    for (order, selection) in (0..).zip(exercises) {
        let workout_exercise = repository
            .create_workout_exercise(workout_id, selection.exercise_id, order)
            .await?;
        repository
            .create_sets(workout_exercise.id, selection.sets)
            .await?;
    }
    Ok(())
}

async fn roll_back<R: WorkoutRepository>(
    repository: &R,
    workout_id: WorkoutID,
    err: CreateError,
) -> ComposeError {
    warn!("failed to compose workout {workout_id}, removing it again: {err}");
    match repository.delete_workout(workout_id).await {
        Ok(_) => ComposeError::Storage(err),
        Err(delete_err) => {
            error!("failed to remove partially created workout {workout_id}: {delete_err}");
            ComposeError::PartialComposition {
                workout_id,
                source: err,
            }
        }
    }
}
