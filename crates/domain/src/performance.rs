//! Comparison of the current workout with the previous performance of the same user.
//!
//! For each exercise the most recent earlier workout containing that exercise is looked up and
//! its sets are aligned with the current sets purely by index. Sets added or removed between
//! sessions shift the comparison; no matching by weight or reps similarity takes place.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use futures_util::{StreamExt, stream};
use log::{debug, warn};

use crate::{
    ExerciseID, Reps, Set, UserID, Weight, WorkoutDetail, WorkoutExerciseID, WorkoutRepository,
    workout::sort_sets,
};

pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 4;

#[allow(async_fn_in_trait)]
pub trait PerformanceService {
    async fn get_previous_sets(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
        before: DateTime<Utc>,
    ) -> Vec<PreviousSet>;
    async fn get_previous_performance(
        &self,
        user_id: UserID,
        workout: &WorkoutDetail,
    ) -> BTreeMap<WorkoutExerciseID, Vec<PreviousSet>>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PreviousSet {
    pub weight: Option<Weight>,
    pub reps: Option<Reps>,
}

impl From<&Set> for PreviousSet {
    fn from(value: &Set) -> Self {
        Self {
            weight: value.weight,
            reps: Some(value.reps),
        }
    }
}

impl fmt::Display for PreviousSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.weight {
            Some(weight) => write!(f, "{weight}")?,
            None => write!(f, "-")?,
        }
        match self.reps {
            Some(reps) => write!(f, "x{reps}"),
            None => write!(f, "x-"),
        }
    }
}

/// The value shown next to a current set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison(pub Option<PreviousSet>);

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(previous) => write!(f, "{previous}"),
            None => write!(f, "-"),
        }
    }
}

/// Pair every current set with the previous set at the same index.
#[must_use]
pub fn align<'a>(current: &'a [Set], previous: &[PreviousSet]) -> Vec<(&'a Set, Comparison)> {
    current
        .iter()
        .enumerate()
        .map(|(idx, set)| (set, Comparison(previous.get(idx).copied())))
        .collect()
}

/// Previous sets of `exercise_id`, or nothing if there is no earlier workout or the lookup
/// failed.
pub async fn previous_sets<R: WorkoutRepository>(
    repository: &R,
    user_id: UserID,
    exercise_id: ExerciseID,
    before: DateTime<Utc>,
) -> Vec<PreviousSet> {
    match repository
        .read_previous_sets(user_id, exercise_id, before)
        .await
    {
        Ok(mut sets) => {
            sort_sets(&mut sets);
            sets.iter().map(PreviousSet::from).collect()
        }
        Err(err) => {
            warn!("failed to get previous sets of exercise {exercise_id}: {err}");
            vec![]
        }
    }
}

/// Look up the previous sets of all exercises of `workout`, at most `concurrency` at a time.
pub async fn previous_performance<R: WorkoutRepository>(
    repository: &R,
    user_id: UserID,
    workout: &WorkoutDetail,
    concurrency: usize,
) -> BTreeMap<WorkoutExerciseID, Vec<PreviousSet>> {
    let before = workout.workout.created_at;
    debug!(
        "looking up previous performance for {} exercises",
        workout.exercises.len()
    );
    stream::iter(workout.exercises.iter().map(|e| async move {
        (
            e.link.id,
            previous_sets(repository, user_id, e.link.exercise_id, before).await,
        )
    }))
    .buffer_unordered(concurrency.max(1))
    .collect::<BTreeMap<_, _>>()
    .await
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::tests::{FakeRepository, Fault, at, set, workout_detail};

    use super::*;

    fn previous(weight: f32, reps: u32) -> PreviousSet {
        PreviousSet {
            weight: Some(Weight::new(weight).unwrap()),
            reps: Some(Reps::new(reps)),
        }
    }

    #[rstest]
    #[case(previous(100.0, 8), "100x8")]
    #[case(previous(102.5, 6), "102.5x6")]
    #[case(PreviousSet { weight: None, reps: Some(Reps::new(12)) }, "-x12")]
    #[case(PreviousSet::default(), "-x-")]
    fn test_previous_set_display(#[case] previous: PreviousSet, #[case] expected: &str) {
        assert_eq!(previous.to_string(), expected);
    }

    #[test]
    fn test_align() {
        let current = vec![set(1, 1, 5, 0), set(2, 1, 5, 1), set(3, 1, 5, 2)];
        let previous = vec![previous(100.0, 8), previous(105.0, 6)];

        assert_eq!(
            align(&current, &previous)
                .iter()
                .map(|(s, c)| (s.id, c.to_string()))
                .collect::<Vec<_>>(),
            vec![
                (1.into(), String::from("100x8")),
                (2.into(), String::from("105x6")),
                (3.into(), String::from("-")),
            ]
        );
    }

    #[test]
    fn test_align_more_previous_than_current() {
        let current = vec![set(1, 1, 5, 0)];
        let previous = vec![previous(100.0, 8), previous(105.0, 6)];

        assert_eq!(
            align(&current, &previous)
                .iter()
                .map(|(_, c)| *c)
                .collect::<Vec<_>>(),
            vec![Comparison(Some(previous[0]))]
        );
    }

    #[tokio::test]
    async fn test_previous_sets_most_recent_earlier_workout() {
        let repository = FakeRepository::default();
        repository.insert(workout_detail(1, 1, at(10), &[(7, &[(90.0, 10)])]));
        repository.insert(workout_detail(2, 1, at(20), &[(7, &[(100.0, 8), (105.0, 6)])]));
        repository.insert(workout_detail(3, 2, at(25), &[(7, &[(200.0, 1)])]));
        repository.insert(workout_detail(4, 1, at(30), &[(8, &[(50.0, 5)])]));
        repository.insert(workout_detail(5, 1, at(40), &[(7, &[(120.0, 3)])]));

        assert_eq!(
            previous_sets(&repository, 1.into(), 7.into(), at(35)).await,
            vec![previous(100.0, 8), previous(105.0, 6)]
        );
        assert_eq!(
            previous_sets(&repository, 1.into(), 7.into(), at(20)).await,
            vec![previous(90.0, 10)]
        );
        assert_eq!(
            previous_sets(&repository, 1.into(), 7.into(), at(10)).await,
            vec![]
        );
        assert_eq!(
            previous_sets(&repository, 3.into(), 7.into(), at(50)).await,
            vec![]
        );
    }

    #[tokio::test]
    async fn test_previous_sets_sorted_by_creation() {
        let repository = FakeRepository::default();
        let mut detail = workout_detail(1, 1, at(10), &[(7, &[(100.0, 8), (105.0, 6)])]);
        detail.exercises[0].sets.reverse();
        repository.insert(detail);

        assert_eq!(
            previous_sets(&repository, 1.into(), 7.into(), at(20)).await,
            vec![previous(100.0, 8), previous(105.0, 6)]
        );
    }

    #[tokio::test]
    async fn test_previous_sets_failure_means_no_data() {
        let repository = FakeRepository::with_fault(Fault::ReadPreviousSets(7.into()));
        repository.insert(workout_detail(1, 1, at(10), &[(7, &[(100.0, 8)])]));

        assert_eq!(
            previous_sets(&repository, 1.into(), 7.into(), at(20)).await,
            vec![]
        );
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(DEFAULT_LOOKUP_CONCURRENCY)]
    #[case(0)]
    #[tokio::test]
    async fn test_previous_performance(#[case] concurrency: usize) {
        let repository = FakeRepository::with_fault(Fault::ReadPreviousSets(9.into()));
        repository.insert(workout_detail(
            1,
            1,
            at(10),
            &[(7, &[(100.0, 8), (105.0, 6)]), (9, &[(20.0, 12)])],
        ));
        let current = workout_detail(
            2,
            1,
            at(20),
            &[(7, &[(0.0, 0), (0.0, 0), (0.0, 0)]), (8, &[(0.0, 0)]), (9, &[(0.0, 0)])],
        );

        let performance =
            previous_performance(&repository, 1.into(), &current, concurrency).await;

        assert_eq!(performance.len(), 3);
        let bench = &current.exercises[0];
        assert_eq!(
            align(&bench.sets, &performance[&bench.link.id])
                .iter()
                .map(|(_, c)| c.to_string())
                .collect::<Vec<_>>(),
            vec!["100x8", "105x6", "-"]
        );
        assert_eq!(performance[&current.exercises[1].link.id], vec![]);
        assert_eq!(performance[&current.exercises[2].link.id], vec![]);
    }
}
