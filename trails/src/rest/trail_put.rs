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

//! API to partially update a trail.

use crate::driver::Driver;
use crate::model::{TrailId, payload};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::Value;
use trails_core::rest::{JsonBody, RestError};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<impl IntoResponse, RestError> {
    let id = id.parse::<TrailId>()?;
    let update = payload::validate_update(&body)?;
    let trail = driver.update_trail(id, update).await?;
    Ok(Json(trail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Trail, TrailType};
    use crate::rest::testutils::*;
    use axum::http;
    use serde_json::json;
    use trails_core::rest::testutils::*;

    fn route(id: TrailId) -> (http::Method, String) {
        (http::Method::PUT, format!("/trails/{}", id))
    }

    #[tokio::test]
    async fn test_partial_update_is_idempotent() {
        let context = TestContext::setup().await;

        let trail = context.put_trail("Rocky Path", Difficulty::Hard).await;
        let other = context.put_trail("Other", Difficulty::Hard).await;
        assert_eq!(499.0, *trail.fields().elevation_gain());

        for _ in 0..2 {
            let response = OneShotBuilder::new(context.app(), route(*trail.id()))
                .send_json(json!({"elevation_gain": 500}))
                .await
                .expect_json::<Trail>()
                .await;
            assert_eq!(500.0, *response.fields().elevation_gain());
            assert_eq!(trail.fields().name(), response.fields().name());
            assert_eq!(trail.fields().location(), response.fields().location());
            assert_eq!(trail.fields().difficulty(), response.fields().difficulty());
            assert_eq!(trail.fields().length(), response.fields().length());
            assert_eq!(trail.fields().duration(), response.fields().duration());
            assert_eq!(trail.fields().trail_type(), response.fields().trail_type());
            assert_eq!(Some(response), context.get_trail(*trail.id()).await);
        }

        assert_eq!(Some(other.clone()), context.get_trail(*other.id()).await);
    }

    #[tokio::test]
    async fn test_canonicalizes_enums() {
        let context = TestContext::setup().await;

        let trail = context.put_trail("Rocky Path", Difficulty::Hard).await;

        let response = OneShotBuilder::new(context.app(), route(*trail.id()))
            .send_json(json!({"difficulty": "moderate", "type": "POINT TO POINT", "id": 999}))
            .await
            .expect_json::<Trail>()
            .await;
        assert_eq!(trail.id(), response.id());
        assert_eq!(Difficulty::Moderate, *response.fields().difficulty());
        assert_eq!(TrailType::PointToPoint, *response.fields().trail_type());
    }

    #[tokio::test]
    async fn test_empty_update() {
        let context = TestContext::setup().await;

        let trail = context.put_trail("Rocky Path", Difficulty::Hard).await;

        let response = OneShotBuilder::new(context.app(), route(*trail.id()))
            .send_json(json!({}))
            .await
            .expect_json::<Trail>()
            .await;
        assert_eq!(trail, response);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route(TrailId::new(5)))
            .send_json(json!({"name": "New name"}))
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Trail not found$")
            .await;
    }

    #[tokio::test]
    async fn test_invalid_field() {
        let context = TestContext::setup().await;

        let trail = context.put_trail("Rocky Path", Difficulty::Hard).await;

        OneShotBuilder::new(context.app(), route(*trail.id()))
            .send_json(json!({"name": "New name", "type": "Loop"}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("type: Invalid type 'Loop'")
            .await;

        OneShotBuilder::new(context.app(), route(*trail.id()))
            .send_json(json!({"duration": null}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("duration: cannot be null")
            .await;

        assert_eq!(Some(trail.clone()), context.get_trail(*trail.id()).await);
    }

    #[tokio::test]
    async fn test_invalid_id() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), (http::Method::PUT, "/trails/1.5"))
            .send_json(json!({"name": "New name"}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid trail id '1.5'")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route(TrailId::new(1)));
}
