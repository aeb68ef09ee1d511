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

//! API to delete all trails that match a condition.

use crate::driver::Driver;
use axum::extract::{Query, State};
use axum::http::{self, HeaderMap};
use trails_core::rest::{EmptyBody, RestError, get_unique_header};

/// Name of the header that carries the admin token.
const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    _: EmptyBody,
) -> Result<http::StatusCode, RestError> {
    // A repeated header is as good as a missing one for authorization purposes.
    let token = get_unique_header(&headers, ADMIN_TOKEN_HEADER).ok().flatten();
    driver.delete_trails_where(token.map(|v| v.as_bytes()), params).await?;
    Ok(http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, TrailId};
    use crate::rest::testutils::*;
    use trails_core::rest::testutils::*;

    fn route() -> (http::Method, String) {
        (http::Method::DELETE, "/trails".to_owned())
    }

    /// Stores a fixed set of trails and returns their identifiers.
    async fn put_trails(context: &TestContext) -> Vec<TrailId> {
        vec![
            *context.put_trail("a", Difficulty::Easy).await.id(),
            *context.put_trail("b", Difficulty::Moderate).await.id(),
            *context.put_trail("c", Difficulty::Moderate).await.id(),
            *context.put_trail("d", Difficulty::Hard).await.id(),
        ]
    }

    #[tokio::test]
    async fn test_ok_and_repeat() {
        let context = TestContext::setup().await;

        let ids = put_trails(&context).await;

        OneShotBuilder::new(context.app(), route())
            .with_query([("difficulty", "Moderate")])
            .with_header("X-Admin-Token", ADMIN_TOKEN)
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;

        assert!(context.get_trail(ids[0]).await.is_some());
        assert!(context.get_trail(ids[1]).await.is_none());
        assert!(context.get_trail(ids[2]).await.is_none());
        assert!(context.get_trail(ids[3]).await.is_some());

        OneShotBuilder::new(context.app(), route())
            .with_query([("difficulty", "Moderate")])
            .with_header("X-Admin-Token", ADMIN_TOKEN)
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^No trails match the given condition$")
            .await;

        assert_eq!(2, context.count_trails().await);
    }

    #[tokio::test]
    async fn test_other_fields() {
        let context = TestContext::setup().await;

        let ids = put_trails(&context).await;

        OneShotBuilder::new(context.app(), route())
            .with_query([("name", "d")])
            .with_header("X-Admin-Token", ADMIN_TOKEN)
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;
        assert!(context.get_trail(ids[3]).await.is_none());

        OneShotBuilder::new(context.app(), route())
            .with_query([("type", "Out-and-back")])
            .with_header("X-Admin-Token", ADMIN_TOKEN)
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;
        assert_eq!(0, context.count_trails().await);
    }

    #[tokio::test]
    async fn test_unknown_enum_value_matches_nothing() {
        let context = TestContext::setup().await;

        put_trails(&context).await;

        let queries = [[("difficulty", "Extreme")], [("difficulty", "moderate")], [("type", "Loop")]];
        for query in queries {
            OneShotBuilder::new(context.app(), route())
                .with_query(query)
                .with_header("X-Admin-Token", ADMIN_TOKEN)
                .send_empty()
                .await
                .expect_status(http::StatusCode::NOT_FOUND)
                .expect_error("^No trails match the given condition$")
                .await;
        }

        assert_eq!(4, context.count_trails().await);
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let context = TestContext::setup().await;

        put_trails(&context).await;

        for query in [[("difficulty", "Moderate")], [("difficulty", "Unknown")], [("foo", "bar")]] {
            OneShotBuilder::new(context.app(), route())
                .with_query(query)
                .with_header("X-Admin-Token", "not-the-token")
                .send_empty()
                .await
                .expect_status(http::StatusCode::FORBIDDEN)
                .expect_error("^Not authorized$")
                .await;

            OneShotBuilder::new(context.app(), route())
                .with_query(query)
                .send_empty()
                .await
                .expect_status(http::StatusCode::FORBIDDEN)
                .expect_error("^Not authorized$")
                .await;
        }

        assert_eq!(4, context.count_trails().await);
    }

    #[tokio::test]
    async fn test_repeated_token_header() {
        let context = TestContext::setup().await;

        put_trails(&context).await;

        OneShotBuilder::new(context.app(), route())
            .with_query([("difficulty", "Moderate")])
            .with_header("X-Admin-Token", ADMIN_TOKEN)
            .with_header("X-Admin-Token", ADMIN_TOKEN)
            .send_empty()
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("^Not authorized$")
            .await;

        assert_eq!(4, context.count_trails().await);
    }

    #[tokio::test]
    async fn test_invalid_condition() {
        let context = TestContext::setup().await;

        put_trails(&context).await;

        OneShotBuilder::new(context.app(), route())
            .with_query([("color", "red")])
            .with_header("X-Admin-Token", ADMIN_TOKEN)
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid condition field 'color'")
            .await;

        OneShotBuilder::new(context.app(), route())
            .with_header("X-Admin-Token", ADMIN_TOKEN)
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("A condition is required")
            .await;

        OneShotBuilder::new(context.app(), route())
            .with_query([("difficulty", "Easy"), ("name", "a")])
            .with_header("X-Admin-Token", ADMIN_TOKEN)
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Only one condition")
            .await;

        assert_eq!(4, context.count_trails().await);
    }

    test_payload_must_be_empty!(
        TestContext::setup().await.into_app(),
        route(),
        [("difficulty", "Easy")]
    );
}
