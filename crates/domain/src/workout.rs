use chrono::{DateTime, Utc};

use crate::{
    CompleteError, ComposeError, CreateError, DeleteError, Description, Exercise, ExerciseID,
    HistoryFilter, Name, ReadError, Reps, SetID, UpdateError, UserID, Weight, WorkoutExerciseID,
    WorkoutID, composer::SetDraft,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn create_workout(
        &self,
        user_id: UserID,
        draft: crate::WorkoutDraft,
    ) -> Result<WorkoutID, ComposeError>;
    async fn get_workouts(
        &self,
        user_id: UserID,
        filter: HistoryFilter,
    ) -> Result<Vec<WorkoutDetail>, ReadError>;
    async fn get_workout(&self, id: WorkoutID) -> Result<WorkoutDetail, ReadError>;
    async fn modify_set(&self, id: SetID, changes: SetChanges) -> Result<Set, UpdateError>;
    async fn complete_workout(&self, id: WorkoutID) -> Result<Workout, CompleteError>;
    async fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
}

/// The queries and writes issued against the relational store.
///
/// Identifiers and `created_at` timestamps are generated by the store. Deleting a workout
/// removes its workout exercises and their sets.
#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn create_workout(
        &self,
        user_id: UserID,
        name: Name,
        description: Option<Description>,
    ) -> Result<Workout, CreateError>;
    async fn create_workout_exercise(
        &self,
        workout_id: WorkoutID,
        exercise_id: ExerciseID,
        order: u32,
    ) -> Result<WorkoutExercise, CreateError>;
    async fn create_sets(
        &self,
        workout_exercise_id: WorkoutExerciseID,
        sets: Vec<SetDraft>,
    ) -> Result<Vec<Set>, CreateError>;
    async fn read_workouts(
        &self,
        user_id: UserID,
        filter: HistoryFilter,
    ) -> Result<Vec<WorkoutDetail>, ReadError>;
    async fn read_workout(&self, id: WorkoutID) -> Result<WorkoutDetail, ReadError>;
    /// Sets of `exercise_id` in the most recent workout of `user_id` created before `before`.
    async fn read_previous_sets(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
        before: DateTime<Utc>,
    ) -> Result<Vec<Set>, ReadError>;
    async fn modify_set(&self, id: SetID, changes: SetChanges) -> Result<Set, UpdateError>;
    /// Fails with `UpdateError::Conflict` if the workout is already completed.
    async fn complete_workout(
        &self,
        id: WorkoutID,
        completed_at: DateTime<Utc>,
    ) -> Result<Workout, UpdateError>;
    async fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: WorkoutID,
    pub user_id: UserID,
    pub name: Name,
    pub description: Option<Description>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Workout {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub id: WorkoutExerciseID,
    pub workout_id: WorkoutID,
    pub exercise_id: ExerciseID,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    pub id: SetID,
    pub workout_exercise_id: WorkoutExerciseID,
    pub weight: Option<Weight>,
    pub reps: Reps,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Point update of a single set. `None` leaves a field untouched, `Some(None)` clears the
/// weight.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SetChanges {
    pub weight: Option<Option<Weight>>,
    pub reps: Option<Reps>,
    pub completed: Option<bool>,
}

impl SetChanges {
    #[must_use]
    pub fn weight(weight: Option<Weight>) -> Self {
        Self {
            weight: Some(weight),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reps(reps: Reps) -> Self {
        Self {
            reps: Some(reps),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weight.is_none() && self.reps.is_none() && self.completed.is_none()
    }

    pub fn apply(&self, set: &mut Set) {
        if let Some(weight) = self.weight {
            set.weight = weight;
        }
        if let Some(reps) = self.reps {
            set.reps = reps;
        }
        if let Some(completed) = self.completed {
            set.completed = completed;
        }
    }
}

/// A workout with its exercises and sets as returned by a joined query.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDetail {
    pub workout: Workout,
    pub exercises: Vec<WorkoutExerciseDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExerciseDetail {
    pub link: WorkoutExercise,
    pub exercise: Option<Exercise>,
    pub sets: Vec<Set>,
}

impl WorkoutDetail {
    /// Put exercises into draft order and sets into creation order.
    ///
    /// Both sorts are stable, so sets sharing a timestamp keep the order the store returned.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.exercises.sort_by_key(|e| e.link.order);
        for exercise in &mut self.exercises {
            sort_sets(&mut exercise.sets);
        }
        self
    }

    pub fn sets(&self) -> impl Iterator<Item = &Set> {
        self.exercises.iter().flat_map(|e| e.sets.iter())
    }

    #[must_use]
    pub fn exercise_ids(&self) -> Vec<ExerciseID> {
        self.exercises.iter().map(|e| e.link.exercise_id).collect()
    }
}

pub fn sort_sets(sets: &mut [Set]) {
    sets.sort_by_key(|s| s.created_at);
}
