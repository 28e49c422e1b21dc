use strum::{AsRefStr, EnumIter};

use crate::{CompleteError, Workout, WorkoutDetail};

/// Subset of the workout history requested from the store.
#[derive(AsRefStr, EnumIter, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum HistoryFilter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl HistoryFilter {
    #[must_use]
    pub fn matches(self, workout: &Workout) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Completed => workout.is_completed(),
            HistoryFilter::Incomplete => !workout.is_completed(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub total_sets: u32,
    pub completed_sets: u32,
    pub percent: u32,
}

impl Progress {
    #[must_use]
    pub fn new(total_sets: u32, completed_sets: u32) -> Self {
        Self {
            total_sets,
            completed_sets,
            percent: percentage(completed_sets, total_sets),
        }
    }

    /// Completion gate: all sets done and at least one set present.
    #[must_use]
    pub fn can_complete(&self) -> bool {
        self.total_sets > 0 && self.completed_sets == self.total_sets
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_workouts: u32,
    pub completed_workouts: u32,
    pub total_sets: u32,
    pub completed_sets: u32,
    pub completion_rate: u32,
}

/// Rounded share of `part` in `total` in percent, 0 for an empty total.
#[must_use]
pub fn percentage(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (100.0 * f64::from(part) / f64::from(total)).round() as u32;
    percent
}

#[must_use]
pub fn workout_progress(workout: &WorkoutDetail) -> Progress {
    let (total, completed) = count_sets(workout);
    Progress::new(total, completed)
}

#[must_use]
pub fn history_stats(workouts: &[WorkoutDetail]) -> HistoryStats {
    let mut stats = HistoryStats::default();
    for workout in workouts {
        let (total, completed) = count_sets(workout);
        stats.total_workouts += 1;
        stats.completed_workouts += u32::from(workout.workout.is_completed());
        stats.total_sets += total;
        stats.completed_sets += completed;
    }
    stats.completion_rate = percentage(stats.completed_sets, stats.total_sets);
    stats
}

/// Check whether `workout` may be marked as completed.
pub fn check_completion(workout: &WorkoutDetail) -> Result<Progress, CompleteError> {
    if workout.workout.is_completed() {
        return Err(CompleteError::AlreadyCompleted);
    }
    let progress = workout_progress(workout);
    if progress.total_sets == 0 {
        return Err(CompleteError::NoSets);
    }
    if !progress.can_complete() {
        return Err(CompleteError::Incomplete {
            completed: progress.completed_sets,
            total: progress.total_sets,
        });
    }
    Ok(progress)
}

fn count_sets(workout: &WorkoutDetail) -> (u32, u32) {
    workout.sets().fold((0, 0), |(total, completed), set| {
        (total + 1, completed + u32::from(set.completed))
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::tests::{at, workout_detail};

    use super::*;

    fn with_completed(mut workout: WorkoutDetail, completed: &[bool]) -> WorkoutDetail {
        for (set, done) in workout
            .exercises
            .iter_mut()
            .flat_map(|e| e.sets.iter_mut())
            .zip(completed)
        {
            set.completed = *done;
        }
        workout
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(0, 3, 0)]
    #[case(2, 3, 67)]
    #[case(1, 3, 33)]
    #[case(1, 2, 50)]
    #[case(1, 8, 13)]
    #[case(3, 3, 100)]
    fn test_percentage(#[case] part: u32, #[case] total: u32, #[case] expected: u32) {
        assert_eq!(percentage(part, total), expected);
    }

    #[rstest]
    #[case(&[], Progress { total_sets: 3, completed_sets: 0, percent: 0 }, false)]
    #[case(&[true, false, true], Progress { total_sets: 3, completed_sets: 2, percent: 67 }, false)]
    #[case(&[true, true, true], Progress { total_sets: 3, completed_sets: 3, percent: 100 }, true)]
    fn test_workout_progress(
        #[case] completed: &[bool],
        #[case] expected: Progress,
        #[case] can_complete: bool,
    ) {
        let workout = with_completed(
            workout_detail(1, 1, at(0), &[(7, &[(100.0, 8), (100.0, 8)]), (8, &[(20.0, 10)])]),
            completed,
        );

        let progress = workout_progress(&workout);

        assert_eq!(progress, expected);
        assert_eq!(workout_progress(&workout), progress);
        assert_eq!(progress.can_complete(), can_complete);
    }

    #[test]
    fn test_workout_progress_without_sets() {
        let workout = workout_detail(1, 1, at(0), &[(7, &[])]);
        assert_eq!(workout_progress(&workout), Progress::default());
        assert!(!Progress::default().can_complete());
    }

    #[test]
    fn test_history_stats() {
        let mut done = with_completed(
            workout_detail(1, 1, at(0), &[(7, &[(100.0, 8), (100.0, 8)])]),
            &[true, true],
        );
        done.workout.completed_at = Some(at(30));
        let partial = with_completed(
            workout_detail(2, 1, at(40), &[(7, &[(100.0, 8)]), (8, &[(1.0, 1), (1.0, 1)])]),
            &[true],
        );

        assert_eq!(
            history_stats(&[done, partial]),
            HistoryStats {
                total_workouts: 2,
                completed_workouts: 1,
                total_sets: 5,
                completed_sets: 3,
                completion_rate: 60,
            }
        );
        assert_eq!(history_stats(&[]), HistoryStats::default());
    }

    #[test]
    fn test_check_completion() {
        let workout = workout_detail(1, 1, at(0), &[(7, &[(100.0, 8), (100.0, 8)])]);
        assert!(matches!(
            check_completion(&with_completed(workout.clone(), &[true, false])),
            Err(CompleteError::Incomplete {
                completed: 1,
                total: 2
            })
        ));
        assert!(matches!(
            check_completion(&workout_detail(2, 1, at(0), &[])),
            Err(CompleteError::NoSets)
        ));

        let mut completed = with_completed(workout, &[true, true]);
        assert_eq!(
            check_completion(&completed).unwrap(),
            Progress::new(2, 2)
        );

        completed.workout.completed_at = Some(at(10));
        assert!(matches!(
            check_completion(&completed),
            Err(CompleteError::AlreadyCompleted)
        ));
    }

    #[test]
    fn test_history_filter_partitions() {
        let mut workouts = (0..6)
            .map(|i| workout_detail(i, 1, at(0), &[]).workout)
            .collect::<Vec<_>>();
        workouts[1].completed_at = Some(at(1));
        workouts[4].completed_at = Some(at(2));

        let select = |filter: HistoryFilter| {
            workouts
                .iter()
                .filter(|w| filter.matches(w))
                .map(|w| w.id)
                .collect::<Vec<_>>()
        };

        let completed = select(HistoryFilter::Completed);
        let incomplete = select(HistoryFilter::Incomplete);
        assert_eq!(completed, vec![1.into(), 4.into()]);
        assert!(completed.iter().all(|id| !incomplete.contains(id)));
        assert_eq!(completed.len() + incomplete.len(), select(HistoryFilter::All).len());
    }
}
