use crate::WorkoutID;

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<UpdateError> for CreateError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::Conflict => CreateError::Conflict,
            UpdateError::NotFound => CreateError::Other("not found".into()),
            UpdateError::Storage(storage) => CreateError::Storage(storage),
            UpdateError::Other(other) => CreateError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("conflict")]
    Conflict,
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error("unexpected response status {0}")]
    Status(u16),
    #[error("deserialization failed: {0}")]
    Deserialization(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error(transparent)]
    Name(#[from] crate::NameError),
    #[error("workout must contain at least one exercise")]
    NoExercises,
    #[error("exercise at position {0} has no sets")]
    NoSets(usize),
    #[error("exercise at position {0} was already selected")]
    DuplicateExercise(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] CreateError),
    #[error("workout {workout_id:?} was only partially created: {source}")]
    PartialComposition {
        workout_id: WorkoutID,
        source: CreateError,
    },
}

impl ComposeError {
    /// The orphaned workout, if the store was left with one.
    #[must_use]
    pub fn partial_workout(&self) -> Option<WorkoutID> {
        match self {
            ComposeError::PartialComposition { workout_id, .. } => Some(*workout_id),
            ComposeError::Validation(_) | ComposeError::Storage(_) => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CompleteError {
    #[error("not found")]
    NotFound,
    #[error("workout is already completed")]
    AlreadyCompleted,
    #[error("workout has no sets")]
    NoSets,
    #[error("only {completed} of {total} sets are completed")]
    Incomplete { completed: u32, total: u32 },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for CompleteError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => CompleteError::NotFound,
            ReadError::Storage(storage) => CompleteError::Storage(storage),
            ReadError::Other(other) => CompleteError::Other(other),
        }
    }
}

impl From<UpdateError> for CompleteError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => CompleteError::NotFound,
            UpdateError::Conflict => CompleteError::AlreadyCompleted,
            UpdateError::Storage(storage) => CompleteError::Storage(storage),
            UpdateError::Other(other) => CompleteError::Other(other),
        }
    }
}
