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

//! Business logic for the service.

use crate::model::AdminToken;
use derivative::Derivative;
use log::warn;
use std::sync::Arc;
use trails_core::db::{Db, DbError};
use trails_core::driver::{DriverError, DriverResult};
use trails_core::env::{get_optional_var, get_required_var};

mod trail;
mod trails;
#[cfg(test)]
pub(crate) mod testutils;

/// Error message returned when an admin operation is attempted with the wrong credentials.
const NOT_AUTHORIZED: &str = "Not authorized";

/// Configuration options for the service.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct TrailsOptions {
    /// Secret that callers of admin operations must present.
    #[derivative(Debug = "ignore")]
    admin_token: AdminToken,

    /// Whether to load the sample trails into an empty database at startup.
    seed: bool,
}

impl TrailsOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_ADMIN_TOKEN` and `<prefix>_SEED`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let admin_token = get_required_var::<String>(prefix, "ADMIN_TOKEN")?;
        Ok(Self {
            admin_token: AdminToken::new(admin_token).map_err(|e| e.to_string())?,
            seed: get_optional_var::<bool>(prefix, "SEED")?.unwrap_or(true),
        })
    }

    /// Returns whether the sample trails should be loaded at startup.
    pub fn seed(&self) -> bool {
        self.seed
    }
}

/// Business logic.
///
/// Every operation is atomic on its own: it either issues a single statement or commits one
/// transaction.  Operations consume the driver so that callers do not chain them by accident.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Configuration options for the driver.
    opts: Arc<TrailsOptions>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, opts: TrailsOptions) -> Self {
        Self { db, opts: Arc::from(opts) }
    }

    /// Ensures that `token`, as presented by the caller, grants access to admin operations.
    fn check_admin_token(&self, token: Option<&[u8]>) -> DriverResult<()> {
        match token {
            Some(token) if self.opts.admin_token.matches(token) => Ok(()),
            Some(_) => {
                warn!("Rejected admin operation with an invalid token");
                Err(DriverError::Unauthorized(NOT_AUTHORIZED.to_owned()))
            }
            None => {
                warn!("Rejected admin operation without a token");
                Err(DriverError::Unauthorized(NOT_AUTHORIZED.to_owned()))
            }
        }
    }
}

/// Converts a database error on a single trail lookup into a driver error.
fn trail_not_found(e: DbError) -> DriverError {
    match e {
        DbError::NotFound => DriverError::NotFound("Trail not found".to_owned()),
        e => e.into(),
    }
}
