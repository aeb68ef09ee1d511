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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::driver::testutils::test_options;
use crate::model::{Difficulty, Trail, TrailFields, TrailId, TrailType};
use crate::rest::app;
use axum::Router;
use std::sync::Arc;
use trails_core::db::{Db, DbError};

pub(crate) use crate::driver::testutils::ADMIN_TOKEN;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the app.
    db: Arc<dyn Db + Send + Sync>,

    /// The router under test.
    app: Router,
}

impl TestContext {
    /// Initializes the REST app using an in-memory database with an initialized schema.
    pub(crate) async fn setup() -> Self {
        let db = Arc::new(trails_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = Driver::new(db.clone(), test_options());
        let app = app(driver);
        Self { db, app }
    }

    /// Gets a copy of the router under test.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns the router under test.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Stores a trail named `name` with the given `difficulty` and returns it.
    pub(crate) async fn put_trail(&self, name: &str, difficulty: Difficulty) -> Trail {
        let fields =
            TrailFields::new(name, "Boulder", difficulty, 5.0, 120, 499.0, TrailType::OutAndBack);
        db::create_trail(&mut self.db.ex().await.unwrap(), &fields).await.unwrap()
    }

    /// Gets the trail identified by `id`, if it exists.
    pub(crate) async fn get_trail(&self, id: TrailId) -> Option<Trail> {
        match db::get_trail(&mut self.db.ex().await.unwrap(), id).await {
            Ok(trail) => Some(trail),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Counts the number of stored trails.
    pub(crate) async fn count_trails(&self) -> u64 {
        db::count_trails(&mut self.db.ex().await.unwrap()).await.unwrap()
    }
}
