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

//! API to get a single trail.

use crate::driver::Driver;
use crate::model::TrailId;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use trails_core::rest::{EmptyBody, RestError};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<String>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let id = id.parse::<TrailId>()?;
    let trail = driver.get_trail(id).await?;
    Ok(Json(trail))
}

#[cfg(test)]
mod tests {
    use crate::model::{Difficulty, Trail, TrailId};
    use crate::rest::testutils::*;
    use axum::http;
    use trails_core::rest::testutils::*;

    fn route(id: TrailId) -> (http::Method, String) {
        (http::Method::GET, format!("/trails/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        context.put_trail("first", Difficulty::Easy).await;
        let exp_response = context.put_trail("second", Difficulty::Hard).await;

        let response = OneShotBuilder::new(context.app(), route(*exp_response.id()))
            .send_empty()
            .await
            .expect_json::<Trail>()
            .await;
        assert_eq!(exp_response, response);
        assert_eq!(&None, response.cover_photo());
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route(TrailId::new(42)))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Trail not found$")
            .await;
    }

    #[tokio::test]
    async fn test_invalid_id() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), (http::Method::GET, "/trails/abc"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid trail id 'abc'")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route(TrailId::new(1)));
}
