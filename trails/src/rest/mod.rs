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

//! Entry point to the REST server.

use crate::driver::Driver;
use axum::Router;

mod trail_delete;
mod trail_get;
mod trail_put;
mod trails_delete;
mod trails_get;
mod trails_post;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;
    Router::new()
        .route(
            "/trails",
            get(trails_get::handler).post(trails_post::handler).delete(trails_delete::handler),
        )
        .route(
            "/trails/:id",
            get(trail_get::handler).put(trail_put::handler).delete(trail_delete::handler),
        )
        .with_state(driver)
}
