// Trails
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! REST service to manage a catalog of hiking trails.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::{info, warn};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use trails_core::db::Db;

pub mod db;
pub mod driver;
use driver::{Driver, TrailsOptions};
pub(crate) mod model;
mod rest;
use rest::app;

/// Waits until the process is asked to terminate.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received termination request; shutting down"),
        Err(e) => {
            warn!("Cannot listen for termination requests: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Prepares the database and serves the application on `bind_addr` until termination.
async fn run(
    bind_addr: SocketAddr,
    db: Arc<dyn Db + Send + Sync>,
    opts: TrailsOptions,
) -> Result<(), Box<dyn Error>> {
    db::init_schema(&mut db.ex().await?).await?;
    info!("Database schema initialized");

    let seed = opts.seed();
    let driver = Driver::new(db, opts);
    if seed {
        let loaded = driver.clone().seed_trails().await?;
        if loaded > 0 {
            info!("Loaded {} sample trails into the empty database", loaded);
        }
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app(driver)).with_graceful_shutdown(shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

/// Serves the trails API on `bind_addr` backed by `db` until the process is asked to terminate.
///
/// This initializes the database schema and, if requested by `opts`, loads the sample trails
/// into an empty database.  `db` is closed once the server stops, even on error.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    opts: TrailsOptions,
) -> Result<(), Box<dyn Error>> {
    let result = run(bind_addr.into(), db.clone(), opts).await;
    db.close().await;
    result
}
