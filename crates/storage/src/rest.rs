//! REST
//!
//! Client for a relational store exposing its tables as `/rest/v1/<table>` resources with
//! PostgREST query syntax. Joined reads use embedded resources in `select`, filters on joined
//! parent rows use `!inner` embeddings.

use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, json};
use ironlog_domain as domain;
use uuid::Uuid;

use crate::config::Config;

const WORKOUT_DETAIL: &str = "*,workout_exercises(*,exercise:exercises(*),sets(*))";
const WORKOUT_DETAIL_ORDER: &str =
    "workout_exercises.order=order.asc&workout_exercises.sets.order=created_at.asc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Table and query string, relative to `/rest/v1/`.
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl Request {
    fn get(path: String) -> Self {
        Self {
            method: Method::Get,
            path,
            body: None,
        }
    }

    fn post(path: &str, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            body: Some(body),
        }
    }

    fn patch(path: String, body: serde_json::Value) -> Self {
        Self {
            method: Method::Patch,
            path,
            body: Some(body),
        }
    }

    fn delete(path: String) -> Self {
        Self {
            method: Method::Delete,
            path,
            body: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send(&self, request: Request) -> Result<Response, domain::StorageError>;
}

pub struct ReqwestSendRequest {
    client: reqwest::Client,
    config: Config,
}

impl ReqwestSendRequest {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

impl SendRequest for ReqwestSendRequest {
    async fn send(&self, request: Request) -> Result<Response, domain::StorageError> {
        let url = format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            request.path
        );
        let bearer = self
            .config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.api_key);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        }
        .header("apikey", &self.config.api_key)
        .header("Authorization", format!("Bearer {bearer}"))
        .header("Prefer", "return=representation");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!("{:?} {url}", request.method);

        let response = builder.send().await.map_err(|err| {
            if err.is_connect() || err.is_timeout() {
                domain::StorageError::NoConnection
            } else {
                domain::StorageError::Other(Box::new(err))
            }
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| domain::StorageError::Other(Box::new(err)))?;

        Ok(Response { status, body })
    }
}

pub struct REST<S: SendRequest> {
    send_request: S,
}

impl REST<ReqwestSendRequest> {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            send_request: ReqwestSendRequest::new(config),
        }
    }
}

impl<S: SendRequest> REST<S> {
    pub const fn with_send_request(send_request: S) -> Self {
        Self { send_request }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<T, domain::StorageError> {
        let response = self.send_request.send(request).await?;
        if !(200..300).contains(&response.status) {
            return Err(domain::StorageError::Status(response.status));
        }
        serde_json::from_str(&response.body)
            .map_err(|err| domain::StorageError::Deserialization(err.to_string()))
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<Option<T>, domain::StorageError> {
        Ok(self.fetch::<Vec<T>>(request).await?.into_iter().next())
    }

    async fn create<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<Vec<T>, domain::CreateError> {
        match self.fetch::<Vec<T>>(request).await {
            Ok(rows) => Ok(rows),
            Err(domain::StorageError::Status(409)) => Err(domain::CreateError::Conflict),
            Err(err) => Err(err.into()),
        }
    }

    async fn workout_exists(&self, id: domain::WorkoutID) -> Result<bool, domain::StorageError> {
        Ok(self
            .fetch_one::<Row>(Request::get(format!("workouts?select=id&id=eq.{id}")))
            .await?
            .is_some())
    }
}

impl<S: SendRequest> domain::ExerciseRepository for REST<S> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let rows: Vec<Exercise> = self
            .fetch(Request::get("exercises?select=*&order=name.asc".into()))
            .await?;
        Ok(convert_all(rows)?)
    }

    async fn read_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        let row: Exercise = self
            .fetch_one(Request::get(format!("exercises?select=*&id=eq.{id}")))
            .await?
            .ok_or(domain::ReadError::NotFound)?;
        Ok(convert(row)?)
    }
}

impl<S: SendRequest> domain::WorkoutRepository for REST<S> {
    async fn create_workout(
        &self,
        user_id: domain::UserID,
        name: domain::Name,
        description: Option<domain::Description>,
    ) -> Result<domain::Workout, domain::CreateError> {
        let row: Workout = self
            .create(Request::post(
                "workouts",
                json!({
                    "user_id": *user_id,
                    "name": name.to_string(),
                    "description": description.map(|d| d.to_string()),
                }),
            ))
            .await?
            .into_iter()
            .next()
            .ok_or(domain::StorageError::Deserialization("empty response".into()))?;
        Ok(convert::<_, domain::WorkoutDetail>(row)?.workout)
    }

    async fn create_workout_exercise(
        &self,
        workout_id: domain::WorkoutID,
        exercise_id: domain::ExerciseID,
        order: u32,
    ) -> Result<domain::WorkoutExercise, domain::CreateError> {
        let row: WorkoutExercise = self
            .create(Request::post(
                "workout_exercises",
                json!({
                    "workout_id": *workout_id,
                    "exercise_id": *exercise_id,
                    "order": order,
                }),
            ))
            .await?
            .into_iter()
            .next()
            .ok_or(domain::StorageError::Deserialization("empty response".into()))?;
        Ok(convert::<_, domain::WorkoutExerciseDetail>(row)?.link)
    }

    async fn create_sets(
        &self,
        workout_exercise_id: domain::WorkoutExerciseID,
        sets: Vec<domain::SetDraft>,
    ) -> Result<Vec<domain::Set>, domain::CreateError> {
        let rows = sets
            .iter()
            .map(|s| {
                json!({
                    "workout_exercise_id": *workout_exercise_id,
                    "weight": s.weight.map(f32::from),
                    "reps": u32::from(s.reps),
                    "completed": false,
                })
            })
            .collect::<Vec<_>>();
        let rows: Vec<Set> = self.create(Request::post("sets", json!(rows))).await?;
        Ok(convert_all(rows)?)
    }

    async fn read_workouts(
        &self,
        user_id: domain::UserID,
        filter: domain::HistoryFilter,
    ) -> Result<Vec<domain::WorkoutDetail>, domain::ReadError> {
        let completed = match filter {
            domain::HistoryFilter::All => "",
            domain::HistoryFilter::Completed => "&completed_at=not.is.null",
            domain::HistoryFilter::Incomplete => "&completed_at=is.null",
        };
        let rows: Vec<Workout> = self
            .fetch(Request::get(format!(
                "workouts?select={WORKOUT_DETAIL}&user_id=eq.{user_id}{completed}\
                 &order=created_at.desc&{WORKOUT_DETAIL_ORDER}"
            )))
            .await?;
        Ok(convert_all(rows)?)
    }

    async fn read_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutDetail, domain::ReadError> {
        let row: Workout = self
            .fetch_one(Request::get(format!(
                "workouts?select={WORKOUT_DETAIL}&id=eq.{id}&{WORKOUT_DETAIL_ORDER}"
            )))
            .await?
            .ok_or(domain::ReadError::NotFound)?;
        Ok(convert(row)?)
    }

    async fn read_previous_sets(
        &self,
        user_id: domain::UserID,
        exercise_id: domain::ExerciseID,
        before: DateTime<Utc>,
    ) -> Result<Vec<domain::Set>, domain::ReadError> {
        let before = before.to_rfc3339_opts(SecondsFormat::Micros, true);
        let row: Option<PreviousOccurrence> = self
            .fetch_one(Request::get(format!(
                "workout_exercises?select=id,sets(*),workouts!inner(user_id,created_at)\
                 &exercise_id=eq.{exercise_id}\
                 &workouts.user_id=eq.{user_id}\
                 &workouts.created_at=lt.{before}\
                 &order=workouts(created_at).desc&limit=1\
                 &sets.order=created_at.asc"
            )))
            .await?;
        match row {
            Some(row) => Ok(convert_all(row.sets)?),
            None => Ok(vec![]),
        }
    }

    async fn modify_set(
        &self,
        id: domain::SetID,
        changes: domain::SetChanges,
    ) -> Result<domain::Set, domain::UpdateError> {
        let request = if changes.is_empty() {
            Request::get(format!("sets?select=*&id=eq.{id}"))
        } else {
            let mut content = Map::new();
            if let Some(weight) = changes.weight {
                content.insert("weight".into(), json!(weight.map(f32::from)));
            }
            if let Some(reps) = changes.reps {
                content.insert("reps".into(), json!(u32::from(reps)));
            }
            if let Some(completed) = changes.completed {
                content.insert("completed".into(), json!(completed));
            }
            Request::patch(format!("sets?id=eq.{id}"), content.into())
        };
        let row: Set = self
            .fetch_one(request)
            .await?
            .ok_or(domain::UpdateError::NotFound)?;
        Ok(convert(row)?)
    }

    async fn complete_workout(
        &self,
        id: domain::WorkoutID,
        completed_at: DateTime<Utc>,
    ) -> Result<domain::Workout, domain::UpdateError> {
        let row: Option<Workout> = self
            .fetch_one(Request::patch(
                format!("workouts?id=eq.{id}&completed_at=is.null"),
                json!({ "completed_at": completed_at }),
            ))
            .await?;
        match row {
            Some(row) => Ok(convert::<_, domain::WorkoutDetail>(row)?.workout),
            None if self.workout_exists(id).await? => Err(domain::UpdateError::Conflict),
            None => Err(domain::UpdateError::NotFound),
        }
    }

    async fn delete_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        self.fetch_one::<Row>(Request::delete(format!("workouts?id=eq.{id}")))
            .await?
            .map(|_| id)
            .ok_or(domain::DeleteError::NotFound)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InvalidRow {
    #[error(transparent)]
    Name(#[from] domain::NameError),
    #[error(transparent)]
    Weight(#[from] domain::WeightError),
}

impl From<InvalidRow> for domain::StorageError {
    fn from(value: InvalidRow) -> Self {
        domain::StorageError::Deserialization(value.to_string())
    }
}

fn convert<T, U>(row: T) -> Result<U, domain::StorageError>
where
    U: TryFrom<T, Error = InvalidRow>,
{
    Ok(U::try_from(row)?)
}

fn convert_all<T, U>(rows: Vec<T>) -> Result<Vec<U>, domain::StorageError>
where
    U: TryFrom<T, Error = InvalidRow>,
{
    rows.into_iter().map(convert).collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Row {
    id: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = InvalidRow;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        Ok(domain::Exercise {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            description: value.description,
            category: value.category,
        })
    }
}

impl From<domain::Exercise> for Exercise {
    fn from(value: domain::Exercise) -> Self {
        Exercise {
            id: *value.id,
            name: value.name.to_string(),
            description: value.description,
            category: value.category,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workout_exercises: Vec<WorkoutExercise>,
}

impl TryFrom<Workout> for domain::WorkoutDetail {
    type Error = InvalidRow;

    fn try_from(value: Workout) -> Result<Self, Self::Error> {
        Ok(domain::WorkoutDetail {
            workout: domain::Workout {
                id: value.id.into(),
                user_id: value.user_id.into(),
                name: domain::Name::new(&value.name)?,
                description: value
                    .description
                    .as_deref()
                    .and_then(domain::Description::new),
                created_at: value.created_at,
                completed_at: value.completed_at,
            },
            exercises: value
                .workout_exercises
                .into_iter()
                .map(domain::WorkoutExerciseDetail::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl From<domain::WorkoutDetail> for Workout {
    fn from(value: domain::WorkoutDetail) -> Self {
        Workout {
            id: *value.workout.id,
            user_id: *value.workout.user_id,
            name: value.workout.name.to_string(),
            description: value.workout.description.map(|d| d.to_string()),
            created_at: value.workout.created_at,
            completed_at: value.workout.completed_at,
            workout_exercises: value
                .exercises
                .into_iter()
                .map(WorkoutExercise::from)
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub order: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<Exercise>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<Set>,
}

impl TryFrom<WorkoutExercise> for domain::WorkoutExerciseDetail {
    type Error = InvalidRow;

    fn try_from(value: WorkoutExercise) -> Result<Self, Self::Error> {
        Ok(domain::WorkoutExerciseDetail {
            link: domain::WorkoutExercise {
                id: value.id.into(),
                workout_id: value.workout_id.into(),
                exercise_id: value.exercise_id.into(),
                order: value.order,
                created_at: value.created_at,
            },
            exercise: value.exercise.map(domain::Exercise::try_from).transpose()?,
            sets: value
                .sets
                .into_iter()
                .map(domain::Set::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl From<domain::WorkoutExerciseDetail> for WorkoutExercise {
    fn from(value: domain::WorkoutExerciseDetail) -> Self {
        WorkoutExercise {
            id: *value.link.id,
            workout_id: *value.link.workout_id,
            exercise_id: *value.link.exercise_id,
            order: value.link.order,
            created_at: value.link.created_at,
            exercise: value.exercise.map(Exercise::from),
            sets: value.sets.into_iter().map(Set::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Set {
    pub id: Uuid,
    pub workout_exercise_id: Uuid,
    pub weight: Option<f32>,
    pub reps: u32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Set> for domain::Set {
    type Error = InvalidRow;

    fn try_from(value: Set) -> Result<Self, Self::Error> {
        Ok(domain::Set {
            id: value.id.into(),
            workout_exercise_id: value.workout_exercise_id.into(),
            weight: value.weight.map(domain::Weight::new).transpose()?,
            reps: domain::Reps::new(value.reps),
            completed: value.completed,
            created_at: value.created_at,
        })
    }
}

impl From<domain::Set> for Set {
    fn from(value: domain::Set) -> Self {
        Set {
            id: *value.id,
            workout_exercise_id: *value.workout_exercise_id,
            weight: value.weight.map(f32::from),
            reps: u32::from(value.reps),
            completed: value.completed,
            created_at: value.created_at,
        }
    }
}

#[derive(Deserialize, Debug)]
struct PreviousOccurrence {
    #[serde(default)]
    sets: Vec<Set>,
}
