// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! To-do list and task routes.
//!
//! The gate checks the caller may read or write `/todo`, `/todos`, `/task`
//! or `/tasks` at all. Handlers then check the list itself: only its owner
//! or a privileged user may touch it. Task routes addressed by list ID check
//! that list; `DELETE /task/{id}` is addressed by task ID and checks the list
//! the task belongs to.

use axum::{
	extract::{rejection::JsonRejection, Path, State},
	response::IntoResponse,
	Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use todos_server_auth::CurrentUser;
use todos_server_db::{NewTask, TaskFilter, TaskId, TaskUpdate, Todo, TodoId};

use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError};

/// Task priority range, 1 being the lowest.
pub const MIN_PRIORITY: i64 = 1;
pub const MAX_PRIORITY: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
	pub name: String,
	#[serde(default)]
	pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameTodoRequest {
	pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DescribeTodoRequest {
	pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
	pub name: String,
	#[serde(default)]
	pub finish_at: String,
	#[serde(default = "default_priority")]
	pub priority: i64,
	#[serde(default)]
	pub completed: bool,
}

fn default_priority() -> i64 {
	MIN_PRIORITY
}

#[derive(Debug, Deserialize)]
pub struct TaskNameRequest {
	pub id: TaskId,
	pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskDateRequest {
	pub id: TaskId,
	pub finish_at: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskPriorityRequest {
	pub id: TaskId,
	pub priority: i64,
}

#[derive(Debug, Deserialize)]
pub struct TaskStatusRequest {
	pub id: TaskId,
	pub completed: bool,
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
	payload
		.map(|Json(body)| body)
		.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

fn require_name(name: &str) -> Result<String, ServerError> {
	let name = name.trim();
	if name.is_empty() {
		return Err(ServerError::BadRequest("name must not be empty".to_string()));
	}
	Ok(name.to_string())
}

fn check_priority(priority: i64) -> Result<i64, ServerError> {
	if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
		return Err(ServerError::BadRequest(format!(
			"priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}"
		)));
	}
	Ok(priority)
}

/// Empty means no deadline.
fn check_finish_at(date: &str) -> Result<String, ServerError> {
	let date = date.trim();
	if !date.is_empty() && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
		return Err(ServerError::BadRequest(
			"finish_at must be a YYYY-MM-DD date".to_string(),
		));
	}
	Ok(date.to_string())
}

/// Load list `todo_id` if `current_user` owns it or is privileged.
async fn owned_todo(
	state: &AppState,
	current_user: &CurrentUser,
	todo_id: TodoId,
) -> Result<Todo, ServerError> {
	let todo = state
		.todo_repo
		.get_todo(todo_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("todo {todo_id}")))?;

	if !todo.is_owned_by(current_user.id()) && !current_user.is_privileged() {
		return Err(ServerError::Forbidden(
			"You are not allowed to make any changes to this list".to_string(),
		));
	}

	Ok(todo)
}

/// POST /todo
#[tracing::instrument(skip_all, fields(actor_id = %current_user.id()))]
pub async fn create_todo(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	let body = parse_body(payload)?;
	let name = require_name(&body.name)?;

	let todo = state
		.todo_repo
		.create_todo(current_user.id(), &name, body.description.trim())
		.await?;

	tracing::info!(todo_id = todo.id, "todo created");
	Ok(Json(todo))
}

/// GET /todos
///
/// Privileged users see every list, others their own.
#[tracing::instrument(skip_all, fields(actor_id = %current_user.id()))]
pub async fn list_todos(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	let owner = (!current_user.is_privileged()).then_some(current_user.id());
	let todos = state.todo_repo.list_todos(owner).await?;
	Ok(Json(todos))
}

/// DELETE /todo/{id}
#[tracing::instrument(skip(current_user, state), fields(actor_id = %current_user.id()))]
pub async fn delete_todo(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<TodoId>,
) -> Result<impl IntoResponse, ServerError> {
	owned_todo(&state, &current_user, id).await?;

	if !state.todo_repo.delete_todo(id).await? {
		return Err(ServerError::NotFound(format!("todo {id}")));
	}

	tracing::info!(todo_id = id, "todo deleted");
	Ok(Json("Todo deleted"))
}

/// PUT /todo/name/{id}
#[tracing::instrument(skip(current_user, state, payload), fields(actor_id = %current_user.id()))]
pub async fn rename_todo(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<TodoId>,
	payload: Result<Json<RenameTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	owned_todo(&state, &current_user, id).await?;
	let body = parse_body(payload)?;
	let name = require_name(&body.name)?;

	state.todo_repo.rename_todo(id, &name).await?;
	Ok(Json("Todo updated"))
}

/// PUT /todo/description/{id}
#[tracing::instrument(skip(current_user, state, payload), fields(actor_id = %current_user.id()))]
pub async fn describe_todo(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<TodoId>,
	payload: Result<Json<DescribeTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	owned_todo(&state, &current_user, id).await?;
	let body = parse_body(payload)?;

	state
		.todo_repo
		.update_description(id, body.description.trim())
		.await?;
	Ok(Json("Todo updated"))
}

/// POST /task/{id}, where `id` names the list.
#[tracing::instrument(skip(current_user, state, payload), fields(actor_id = %current_user.id()))]
pub async fn create_task(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(todo_id): Path<TodoId>,
	payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	owned_todo(&state, &current_user, todo_id).await?;
	let body = parse_body(payload)?;

	let new_task = NewTask {
		name: require_name(&body.name)?,
		finish_at: check_finish_at(&body.finish_at)?,
		priority: check_priority(body.priority)?,
		completed: body.completed,
	};
	let task = state.todo_repo.create_task(todo_id, &new_task).await?;

	tracing::info!(task_id = task.id, "task created");
	Ok(Json(task))
}

async fn list_tasks_matching(
	state: &AppState,
	current_user: &CurrentUser,
	todo_id: TodoId,
	filter: TaskFilter,
) -> Result<impl IntoResponse, ServerError> {
	owned_todo(state, current_user, todo_id).await?;
	let tasks = state.todo_repo.list_tasks(todo_id, filter).await?;
	Ok(Json(tasks))
}

/// GET /task/{id}, where `id` names the list.
#[tracing::instrument(skip(current_user, state), fields(actor_id = %current_user.id()))]
pub async fn list_tasks(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(todo_id): Path<TodoId>,
) -> Result<impl IntoResponse, ServerError> {
	list_tasks_matching(&state, &current_user, todo_id, TaskFilter::All).await
}

/// GET /tasks/active/{id}
#[tracing::instrument(skip(current_user, state), fields(actor_id = %current_user.id()))]
pub async fn list_active_tasks(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(todo_id): Path<TodoId>,
) -> Result<impl IntoResponse, ServerError> {
	list_tasks_matching(&state, &current_user, todo_id, TaskFilter::Active).await
}

/// GET /tasks/completed/{id}
#[tracing::instrument(skip(current_user, state), fields(actor_id = %current_user.id()))]
pub async fn list_completed_tasks(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(todo_id): Path<TodoId>,
) -> Result<impl IntoResponse, ServerError> {
	list_tasks_matching(&state, &current_user, todo_id, TaskFilter::Completed).await
}

/// DELETE /task/{id}, where `id` names the task.
#[tracing::instrument(skip(current_user, state), fields(actor_id = %current_user.id()))]
pub async fn delete_task(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(task_id): Path<TaskId>,
) -> Result<impl IntoResponse, ServerError> {
	let task = state
		.todo_repo
		.get_task(task_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("task {task_id}")))?;
	owned_todo(&state, &current_user, task.todo_id).await?;

	state.todo_repo.delete_task(task_id).await?;

	tracing::info!(task_id, "task deleted");
	Ok(Json("Task deleted"))
}

async fn update_task(
	state: &AppState,
	current_user: &CurrentUser,
	todo_id: TodoId,
	task_id: TaskId,
	update: TaskUpdate,
) -> Result<Json<&'static str>, ServerError> {
	owned_todo(state, current_user, todo_id).await?;
	state.todo_repo.update_task(todo_id, task_id, &update).await?;
	Ok(Json("Task updated"))
}

/// PUT /task/name/{id}, where `id` names the list and the body the task.
#[tracing::instrument(skip(current_user, state, payload), fields(actor_id = %current_user.id()))]
pub async fn rename_task(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(todo_id): Path<TodoId>,
	payload: Result<Json<TaskNameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	let body = parse_body(payload)?;
	let update = TaskUpdate::Name(require_name(&body.name)?);
	update_task(&state, &current_user, todo_id, body.id, update).await
}

/// PUT /task/date/{id}
#[tracing::instrument(skip(current_user, state, payload), fields(actor_id = %current_user.id()))]
pub async fn update_task_date(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(todo_id): Path<TodoId>,
	payload: Result<Json<TaskDateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	let body = parse_body(payload)?;
	let update = TaskUpdate::FinishAt(check_finish_at(&body.finish_at)?);
	update_task(&state, &current_user, todo_id, body.id, update).await
}

/// PUT /task/priority/{id}
#[tracing::instrument(skip(current_user, state, payload), fields(actor_id = %current_user.id()))]
pub async fn update_task_priority(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(todo_id): Path<TodoId>,
	payload: Result<Json<TaskPriorityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	let body = parse_body(payload)?;
	let update = TaskUpdate::Priority(check_priority(body.priority)?);
	update_task(&state, &current_user, todo_id, body.id, update).await
}

/// PUT /task/status/{id}
#[tracing::instrument(skip(current_user, state, payload), fields(actor_id = %current_user.id()))]
pub async fn update_task_status(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(todo_id): Path<TodoId>,
	payload: Result<Json<TaskStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	let body = parse_body(payload)?;
	update_task(
		&state,
		&current_user,
		todo_id,
		body.id,
		TaskUpdate::Completed(body.completed),
	)
	.await
}
