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

//! Error types for the business logic layer.
//!
//! The service's `Driver` holds the shared database handle and its configuration, and exposes one
//! method per operation.  Those methods consume `self`: every operation is self-contained and
//! either runs one statement or opens its own transaction, so a caller that wants to chain two of
//! them has to clone the driver on purpose.
//!
//! ```rust
//! use trails_core::db::Db;
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! pub(crate) struct Driver {
//!     /// The database that the driver uses for persistence.
//!     db: Arc<dyn Db + Send + Sync>,
//! }
//! ```

use crate::db::DbError;
use crate::model::ModelError;

/// Business logic errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// The database failed in a way the caller cannot fix.
    #[error("{0}")]
    BackendError(String),

    /// The caller supplied invalid data.
    #[error("{0}")]
    InvalidInput(String),

    /// The entity the operation refers to does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The caller did not present valid credentials for the operation.
    #[error("{0}")]
    Unauthorized(String),
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound => DriverError::NotFound(e.to_string()),
            DbError::BackendError(_) | DbError::DataIntegrityError(_) | DbError::Unavailable => {
                DriverError::BackendError(e.to_string())
            }
        }
    }
}

impl From<ModelError> for DriverError {
    fn from(e: ModelError) -> Self {
        DriverError::InvalidInput(e.to_string())
    }
}

/// Result type for this module.
pub type DriverResult<T> = Result<T, DriverError>;
