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

//! API to create a new trail.

use crate::driver::Driver;
use crate::model::payload;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, http};
use serde_json::Value;
use trails_core::rest::{JsonBody, RestError};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    JsonBody(body): JsonBody<Value>,
) -> Result<impl IntoResponse, RestError> {
    let fields = payload::validate_create(&body)?;
    let trail = driver.create_trail(fields).await?;
    Ok((http::StatusCode::CREATED, Json(trail)))
}
