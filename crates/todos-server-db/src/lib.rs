// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # todos-server-db
//!
//! SQLite persistence for the todos server via sqlx.
//!
//! [`UserRepository`] holds a `SqlitePool` and implements
//! [`todos_server_auth::UserStore`], so the auth layer never sees SQL.
//! [`TodoRepository`] owns to-do lists and their tasks.
//!
//! ## Error Handling
//!
//! | Variant | When to use |
//! |---------|-------------|
//! | `NotFound` | Update by an ID that does not exist, or a task outside its list |
//! | `Conflict` | Username or email already registered |
//! | `Sqlx` | Unexpected database errors, propagated via `?` |
//! | `Internal` | Bad connection string |
//!
//! Lookups where absence is normal return `Result<Option<T>>`.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod testing;
pub mod todo;
pub mod user;

pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use pool::create_pool;
pub use todo::{NewTask, Task, TaskFilter, TaskId, TaskUpdate, Todo, TodoId, TodoRepository};
pub use user::UserRepository;
