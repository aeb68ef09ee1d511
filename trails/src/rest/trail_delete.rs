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

//! API to delete a single trail.

use crate::driver::Driver;
use crate::model::TrailId;
use axum::extract::{Path, State};
use axum::http;
use trails_core::rest::{EmptyBody, RestError};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<String>,
    _: EmptyBody,
) -> Result<http::StatusCode, RestError> {
    let id = id.parse::<TrailId>()?;
    driver.delete_trail(id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::rest::testutils::*;
    use trails_core::rest::testutils::*;

    fn route(id: TrailId) -> (http::Method, String) {
        (http::Method::DELETE, format!("/trails/{}", id))
    }

    #[tokio::test]
    async fn test_ok_then_not_found() {
        let context = TestContext::setup().await;

        let trail = context.put_trail("first", Difficulty::Easy).await;
        let other = context.put_trail("second", Difficulty::Easy).await;

        OneShotBuilder::new(context.app(), route(*trail.id()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;
        assert_eq!(None, context.get_trail(*trail.id()).await);

        OneShotBuilder::new(context.app(), route(*trail.id()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Trail not found$")
            .await;
        assert_eq!(None, context.get_trail(*trail.id()).await);

        assert_eq!(Some(other.clone()), context.get_trail(*other.id()).await);
    }

    #[tokio::test]
    async fn test_invalid_id() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), (http::Method::DELETE, "/trails/first"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid trail id 'first'")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route(TrailId::new(1)));
}
