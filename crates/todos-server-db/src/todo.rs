// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! To-do list and task repository.
//!
//! A to-do list belongs to one user. Tasks belong to one list and are only
//! ever updated through the list that owns them: every task update is keyed
//! on `(task id, list id)`.

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePool, Row};
use todos_server_auth::UserId;

use crate::error::DbError;

pub type TodoId = i64;
pub type TaskId = i64;

const TODO_COLUMNS: &str = "id, user_id, name, description";
const TASK_COLUMNS: &str = "id, todo_id, name, created_at, finish_at, priority, completed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
	pub id: TodoId,
	pub user_id: UserId,
	pub name: String,
	pub description: String,
}

impl Todo {
	pub fn is_owned_by(&self, user_id: UserId) -> bool {
		self.user_id == user_id
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
	pub id: TaskId,
	pub todo_id: TodoId,
	pub name: String,
	/// RFC 3339 timestamp set on insert.
	pub created_at: String,
	/// `YYYY-MM-DD`, empty when the task has no deadline.
	pub finish_at: String,
	pub priority: i64,
	pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
	pub name: String,
	pub finish_at: String,
	pub priority: i64,
	pub completed: bool,
}

/// A single-field change to an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskUpdate {
	Name(String),
	FinishAt(String),
	Priority(i64),
	Completed(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
	All,
	Active,
	Completed,
}

impl TaskFilter {
	fn clause(self) -> &'static str {
		match self {
			TaskFilter::All => "",
			TaskFilter::Active => " AND completed = 0",
			TaskFilter::Completed => " AND completed = 1",
		}
	}
}

#[derive(Clone)]
pub struct TodoRepository {
	pool: SqlitePool,
}

impl TodoRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, name, description), fields(user_id = %user_id))]
	pub async fn create_todo(
		&self,
		user_id: UserId,
		name: &str,
		description: &str,
	) -> Result<Todo, DbError> {
		let result = sqlx::query("INSERT INTO todos (user_id, name, description) VALUES (?, ?, ?)")
			.bind(user_id)
			.bind(name)
			.bind(description)
			.execute(&self.pool)
			.await?;

		let id = result.last_insert_rowid();
		tracing::debug!(todo_id = id, "todo created");
		Ok(Todo {
			id,
			user_id,
			name: name.to_string(),
			description: description.to_string(),
		})
	}

	#[tracing::instrument(skip(self), fields(todo_id = %id))]
	pub async fn get_todo(&self, id: TodoId) -> Result<Option<Todo>, DbError> {
		let row = sqlx::query(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.map(|r| row_to_todo(&r)))
	}

	/// Lists owned by `owner`, or every list when `owner` is `None`.
	#[tracing::instrument(skip(self))]
	pub async fn list_todos(&self, owner: Option<UserId>) -> Result<Vec<Todo>, DbError> {
		let rows = match owner {
			Some(user_id) => {
				sqlx::query(&format!(
					"SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ? ORDER BY id"
				))
				.bind(user_id)
				.fetch_all(&self.pool)
				.await?
			}
			None => {
				sqlx::query(&format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY id"))
					.fetch_all(&self.pool)
					.await?
			}
		};

		Ok(rows.iter().map(row_to_todo).collect())
	}

	/// Delete a list and its tasks. Returns true if the list existed.
	#[tracing::instrument(skip(self), fields(todo_id = %id))]
	pub async fn delete_todo(&self, id: TodoId) -> Result<bool, DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("DELETE FROM tasks WHERE todo_id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?;
		let result = sqlx::query("DELETE FROM todos WHERE id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		Ok(result.rows_affected() > 0)
	}

	/// # Errors
	/// Returns `DbError::NotFound` if no list has this ID.
	#[tracing::instrument(skip(self, name), fields(todo_id = %id))]
	pub async fn rename_todo(&self, id: TodoId, name: &str) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE todos SET name = ? WHERE id = ?")
			.bind(name)
			.bind(id)
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("todo {id}")));
		}
		Ok(())
	}

	#[tracing::instrument(skip(self, description), fields(todo_id = %id))]
	pub async fn update_description(&self, id: TodoId, description: &str) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE todos SET description = ? WHERE id = ?")
			.bind(description)
			.bind(id)
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("todo {id}")));
		}
		Ok(())
	}

	#[tracing::instrument(skip(self, task), fields(todo_id = %todo_id))]
	pub async fn create_task(&self, todo_id: TodoId, task: &NewTask) -> Result<Task, DbError> {
		let created_at = chrono::Utc::now().to_rfc3339();
		let result = sqlx::query(
			r#"
			INSERT INTO tasks (todo_id, name, created_at, finish_at, priority, completed)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(todo_id)
		.bind(&task.name)
		.bind(&created_at)
		.bind(&task.finish_at)
		.bind(task.priority)
		.bind(task.completed)
		.execute(&self.pool)
		.await?;

		let id = result.last_insert_rowid();
		tracing::debug!(task_id = id, "task created");
		Ok(Task {
			id,
			todo_id,
			name: task.name.clone(),
			created_at,
			finish_at: task.finish_at.clone(),
			priority: task.priority,
			completed: task.completed,
		})
	}

	#[tracing::instrument(skip(self), fields(task_id = %id))]
	pub async fn get_task(&self, id: TaskId) -> Result<Option<Task>, DbError> {
		let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.map(|r| row_to_task(&r)))
	}

	#[tracing::instrument(skip(self), fields(todo_id = %todo_id))]
	pub async fn list_tasks(&self, todo_id: TodoId, filter: TaskFilter) -> Result<Vec<Task>, DbError> {
		let rows = sqlx::query(&format!(
			"SELECT {TASK_COLUMNS} FROM tasks WHERE todo_id = ?{} ORDER BY id",
			filter.clause()
		))
		.bind(todo_id)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(row_to_task).collect())
	}

	/// Returns true if a row was deleted.
	#[tracing::instrument(skip(self), fields(task_id = %id))]
	pub async fn delete_task(&self, id: TaskId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	/// # Errors
	/// Returns `DbError::NotFound` unless task `task_id` belongs to list `todo_id`.
	#[tracing::instrument(skip(self, update), fields(todo_id = %todo_id, task_id = %task_id))]
	pub async fn update_task(
		&self,
		todo_id: TodoId,
		task_id: TaskId,
		update: &TaskUpdate,
	) -> Result<(), DbError> {
		let query = match update {
			TaskUpdate::Name(name) => {
				sqlx::query("UPDATE tasks SET name = ? WHERE id = ? AND todo_id = ?").bind(name.as_str())
			}
			TaskUpdate::FinishAt(date) => {
				sqlx::query("UPDATE tasks SET finish_at = ? WHERE id = ? AND todo_id = ?")
					.bind(date.as_str())
			}
			TaskUpdate::Priority(priority) => {
				sqlx::query("UPDATE tasks SET priority = ? WHERE id = ? AND todo_id = ?").bind(*priority)
			}
			TaskUpdate::Completed(completed) => {
				sqlx::query("UPDATE tasks SET completed = ? WHERE id = ? AND todo_id = ?")
					.bind(*completed)
			}
		};

		let result = query
			.bind(task_id)
			.bind(todo_id)
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("task {task_id} in todo {todo_id}")));
		}
		Ok(())
	}
}

fn row_to_todo(row: &sqlx::sqlite::SqliteRow) -> Todo {
	Todo {
		id: row.get("id"),
		user_id: row.get("user_id"),
		name: row.get("name"),
		description: row.get("description"),
	}
}

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> Task {
	Task {
		id: row.get("id"),
		todo_id: row.get("todo_id"),
		name: row.get("name"),
		created_at: row.get("created_at"),
		finish_at: row.get("finish_at"),
		priority: row.get("priority"),
		completed: row.get("completed"),
	}
}
