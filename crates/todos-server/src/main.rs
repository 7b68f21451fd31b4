// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! todos server binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use todos_server::{create_app_state, create_router, LogFilter};
use todos_server_auth::PolicySet;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// todos server - users, sessions and path-based access control.
#[derive(Parser, Debug)]
#[command(name = "todos-server", about = "todos HTTP server", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/todos/server.toml)
	#[arg(long, env = "TODOS_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

fn format_version_info() -> String {
	format!(
		"todos-server version: {}\n\
		 Platform:             {}-{}",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH,
	)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let (filter_layer, log_filter) = LogFilter::from_default_env();
	tracing_subscriber::registry()
		.with(filter_layer)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let config = match args.config {
		Some(path) => todos_server_config::load_config_with_file(path)?,
		None => todos_server_config::load_config()?,
	};
	log_filter.apply_config_level(&config.logging.level)?;

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting todos-server"
	);

	let pool = todos_server_db::create_pool(&config.database.url).await?;
	todos_server_db::run_migrations(&pool).await?;

	let policy = PolicySet::from_file(&config.auth.policy_path)?;
	let state = create_app_state(pool, Arc::new(policy), &config.auth);

	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
