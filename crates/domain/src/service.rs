use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::{
    CompleteError, ComposeError, CreateError, DeleteError, Exercise, ExerciseID,
    ExerciseRepository, ExerciseService, HistoryFilter, PerformanceService, PreviousSet,
    ReadError, Set, SetChanges, SetID, StorageError, UpdateError, UserID, Workout, WorkoutDetail,
    WorkoutDraft, WorkoutExerciseID, WorkoutID, WorkoutRepository, WorkoutService, composer,
    performance, progress,
};

pub struct Service<R> {
    repository: R,
    lookup_concurrency: usize,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            lookup_concurrency: performance::DEFAULT_LOOKUP_CONCURRENCY,
        }
    }

    /// Limit the number of previous performance lookups in flight at the same time.
    #[must_use]
    pub fn with_lookup_concurrency(mut self, lookup_concurrency: usize) -> Self {
        self.lookup_concurrency = lookup_concurrency.max(1);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn lookup_concurrency(&self) -> usize {
        self.lookup_concurrency
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError> {
        log_on_error!(
            self.repository.read_exercise(id),
            ReadError,
            "get",
            "exercise"
        )
    }
}

impl<R: WorkoutRepository> WorkoutService for Service<R> {
    async fn create_workout(
        &self,
        user_id: UserID,
        draft: WorkoutDraft,
    ) -> Result<WorkoutID, ComposeError> {
        let result = composer::compose(&self.repository, user_id, draft).await;
        match result {
            Ok(_) | Err(ComposeError::Validation(_)) => {}
            Err(ComposeError::Storage(CreateError::Storage(StorageError::NoConnection))) => {
                debug!("failed to create workout: no connection");
            }
            Err(ref err) => {
                error!("failed to create workout: {err}");
            }
        }
        result
    }

    async fn get_workouts(
        &self,
        user_id: UserID,
        filter: HistoryFilter,
    ) -> Result<Vec<WorkoutDetail>, ReadError> {
        log_on_error!(
            async {
                let workouts = self.repository.read_workouts(user_id, filter).await?;
                Ok::<_, ReadError>(workouts.into_iter().map(WorkoutDetail::normalized).collect())
            },
            ReadError,
            "get",
            "workouts"
        )
    }

    async fn get_workout(&self, id: WorkoutID) -> Result<WorkoutDetail, ReadError> {
        log_on_error!(
            async {
                Ok::<_, ReadError>(self.repository.read_workout(id).await?.normalized())
            },
            ReadError,
            "get",
            "workout"
        )
    }

    async fn modify_set(&self, id: SetID, changes: SetChanges) -> Result<Set, UpdateError> {
        log_on_error!(
            self.repository.modify_set(id, changes),
            UpdateError,
            "modify",
            "set"
        )
    }

    async fn complete_workout(&self, id: WorkoutID) -> Result<Workout, CompleteError> {
        log_on_error!(
            async {
                let workout = self.repository.read_workout(id).await?;
                progress::check_completion(&workout)?;
                Ok::<_, CompleteError>(self.repository.complete_workout(id, Utc::now()).await?)
            },
            CompleteError,
            "complete",
            "workout"
        )
    }

    async fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError> {
        log_on_error!(
            self.repository.delete_workout(id),
            DeleteError,
            "delete",
            "workout"
        )
    }
}

impl<R: WorkoutRepository> PerformanceService for Service<R> {
    async fn get_previous_sets(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
        before: DateTime<Utc>,
    ) -> Vec<PreviousSet> {
        performance::previous_sets(&self.repository, user_id, exercise_id, before).await
    }

    async fn get_previous_performance(
        &self,
        user_id: UserID,
        workout: &WorkoutDetail,
    ) -> BTreeMap<WorkoutExerciseID, Vec<PreviousSet>> {
        performance::previous_performance(
            &self.repository,
            user_id,
            workout,
            self.lookup_concurrency,
        )
        .await
    }
}
