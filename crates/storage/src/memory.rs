//! In-memory store with the same constraints as the relational store: generated identifiers and
//! timestamps, unique exercises per workout, cascading deletes and a one-way completion.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use ironlog_domain as domain;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    exercises: Vec<domain::Exercise>,
    workouts: Vec<domain::Workout>,
    workout_exercises: Vec<domain::WorkoutExercise>,
    sets: Vec<domain::Set>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing, so rows created in sequence keep their order.
    fn timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }

    fn detail(&self, workout: &domain::Workout) -> domain::WorkoutDetail {
        domain::WorkoutDetail {
            workout: workout.clone(),
            exercises: self
                .workout_exercises
                .iter()
                .filter(|we| we.workout_id == workout.id)
                .map(|we| domain::WorkoutExerciseDetail {
                    link: we.clone(),
                    exercise: self
                        .exercises
                        .iter()
                        .find(|e| e.id == we.exercise_id)
                        .cloned(),
                    sets: self.sets_of(we.id),
                })
                .collect(),
        }
    }

    fn sets_of(&self, workout_exercise_id: domain::WorkoutExerciseID) -> Vec<domain::Set> {
        self.sets
            .iter()
            .filter(|s| s.workout_exercise_id == workout_exercise_id)
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn with_exercises(exercises: Vec<domain::Exercise>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                exercises,
                ..Tables::default()
            }),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, domain::StorageError> {
        self.tables
            .lock()
            .map_err(|err| domain::StorageError::Other(err.to_string().into()))
    }
}

impl domain::ExerciseRepository for MemoryStore {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let mut exercises = self.tables()?.exercises.clone();
        exercises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(exercises)
    }

    async fn read_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        self.tables()?
            .exercises
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(domain::ReadError::NotFound)
    }
}

impl domain::WorkoutRepository for MemoryStore {
    async fn create_workout(
        &self,
        user_id: domain::UserID,
        name: domain::Name,
        description: Option<domain::Description>,
    ) -> Result<domain::Workout, domain::CreateError> {
        let mut tables = self.tables()?;
        let workout = domain::Workout {
            id: Uuid::new_v4().into(),
            user_id,
            name,
            description,
            created_at: tables.timestamp(),
            completed_at: None,
        };
        tables.workouts.push(workout.clone());
        Ok(workout)
    }

    async fn create_workout_exercise(
        &self,
        workout_id: domain::WorkoutID,
        exercise_id: domain::ExerciseID,
        order: u32,
    ) -> Result<domain::WorkoutExercise, domain::CreateError> {
        let mut tables = self.tables()?;
        if !tables.workouts.iter().any(|w| w.id == workout_id) {
            return Err(domain::CreateError::Other(
                format!("workout {workout_id} does not exist").into(),
            ));
        }
        if tables
            .workout_exercises
            .iter()
            .any(|we| we.workout_id == workout_id && we.exercise_id == exercise_id)
        {
            return Err(domain::CreateError::Conflict);
        }
        let workout_exercise = domain::WorkoutExercise {
            id: Uuid::new_v4().into(),
            workout_id,
            exercise_id,
            order,
            created_at: tables.timestamp(),
        };
        tables.workout_exercises.push(workout_exercise.clone());
        Ok(workout_exercise)
    }

    async fn create_sets(
        &self,
        workout_exercise_id: domain::WorkoutExerciseID,
        sets: Vec<domain::SetDraft>,
    ) -> Result<Vec<domain::Set>, domain::CreateError> {
        let mut tables = self.tables()?;
        if !tables
            .workout_exercises
            .iter()
            .any(|we| we.id == workout_exercise_id)
        {
            return Err(domain::CreateError::Other(
                format!("workout exercise {workout_exercise_id} does not exist").into(),
            ));
        }
        let created = sets
            .into_iter()
            .map(|draft| domain::Set {
                id: Uuid::new_v4().into(),
                workout_exercise_id,
                weight: draft.weight,
                reps: draft.reps,
                completed: false,
                created_at: tables.timestamp(),
            })
            .collect::<Vec<_>>();
        tables.sets.extend(created.iter().cloned());
        Ok(created)
    }

    async fn read_workouts(
        &self,
        user_id: domain::UserID,
        filter: domain::HistoryFilter,
    ) -> Result<Vec<domain::WorkoutDetail>, domain::ReadError> {
        let tables = self.tables()?;
        let mut workouts = tables
            .workouts
            .iter()
            .filter(|w| w.user_id == user_id && filter.matches(w))
            .map(|w| tables.detail(w))
            .collect::<Vec<_>>();
        workouts.sort_by(|a, b| b.workout.created_at.cmp(&a.workout.created_at));
        Ok(workouts)
    }

    async fn read_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutDetail, domain::ReadError> {
        let tables = self.tables()?;
        tables
            .workouts
            .iter()
            .find(|w| w.id == id)
            .map(|w| tables.detail(w))
            .ok_or(domain::ReadError::NotFound)
    }

    async fn read_previous_sets(
        &self,
        user_id: domain::UserID,
        exercise_id: domain::ExerciseID,
        before: DateTime<Utc>,
    ) -> Result<Vec<domain::Set>, domain::ReadError> {
        let tables = self.tables()?;
        let previous = tables
            .workout_exercises
            .iter()
            .filter(|we| we.exercise_id == exercise_id)
            .filter_map(|we| {
                tables
                    .workouts
                    .iter()
                    .find(|w| w.id == we.workout_id)
                    .filter(|w| w.user_id == user_id && w.created_at < before)
                    .map(|w| (w.created_at, we.id))
            })
            .max_by_key(|(created_at, _)| *created_at);
        Ok(previous
            .map(|(_, id)| tables.sets_of(id))
            .unwrap_or_default())
    }

    async fn modify_set(
        &self,
        id: domain::SetID,
        changes: domain::SetChanges,
    ) -> Result<domain::Set, domain::UpdateError> {
        let mut tables = self.tables()?;
        let set = tables
            .sets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(domain::UpdateError::NotFound)?;
        changes.apply(set);
        Ok(set.clone())
    }

    async fn complete_workout(
        &self,
        id: domain::WorkoutID,
        completed_at: DateTime<Utc>,
    ) -> Result<domain::Workout, domain::UpdateError> {
        let mut tables = self.tables()?;
        let workout = tables
            .workouts
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(domain::UpdateError::NotFound)?;
        if workout.completed_at.is_some() {
            return Err(domain::UpdateError::Conflict);
        }
        workout.completed_at = Some(completed_at);
        Ok(workout.clone())
    }

    async fn delete_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        let mut tables = self.tables()?;
        let Some(position) = tables.workouts.iter().position(|w| w.id == id) else {
            return Err(domain::DeleteError::NotFound);
        };
        tables.workouts.remove(position);
        let links = tables
            .workout_exercises
            .iter()
            .filter(|we| we.workout_id == id)
            .map(|we| we.id)
            .collect::<Vec<_>>();
        tables.sets.retain(|s| !links.contains(&s.workout_exercise_id));
        tables.workout_exercises.retain(|we| we.workout_id != id);
        Ok(id)
    }
}
