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

//! Operations on collections of trails.

use crate::db;
use crate::driver::Driver;
use crate::model::{Condition, Difficulty, ListOptions, Trail, TrailFields, TrailType};
use log::info;
use trails_core::driver::{DriverError, DriverResult};

/// Returns the trails to load into an empty database.
fn sample_trails() -> Vec<TrailFields> {
    vec![
        TrailFields::new(
            "Sunny Trail",
            "Mountain View",
            Difficulty::Easy,
            3.5,
            60,
            200.0,
            TrailType::Circular,
        ),
        TrailFields::new(
            "Rocky Path",
            "Boulder",
            Difficulty::Hard,
            5.0,
            120,
            500.0,
            TrailType::OutAndBack,
        ),
        TrailFields::new(
            "Forest Run",
            "Redwood",
            Difficulty::Moderate,
            4.2,
            90,
            300.0,
            TrailType::PointToPoint,
        ),
    ]
}

impl Driver {
    /// Deletes all trails that match the single condition carried in `params` with a single
    /// statement.
    ///
    /// The caller must present the admin `token`, which is validated before anything else.
    /// Returns the number of deleted trails, which is always positive.
    pub(crate) async fn delete_trails_where(
        self,
        token: Option<&[u8]>,
        params: Vec<(String, String)>,
    ) -> DriverResult<u64> {
        self.check_admin_token(token)?;
        let condition = Condition::from_query(params)?;

        let deleted = db::delete_trails_where(&mut self.db.ex().await?, &condition).await?;
        if deleted == 0 {
            return Err(DriverError::NotFound("No trails match the given condition".to_owned()));
        }

        info!("Deleted {} trails matching {}", deleted, condition);
        Ok(deleted)
    }

    /// Lists the trails that match `opts`.
    pub(crate) async fn list_trails(self, opts: ListOptions) -> DriverResult<Vec<Trail>> {
        let trails = db::list_trails(&mut self.db.ex().await?, &opts).await?;
        Ok(trails)
    }

    /// Loads the sample trails if the database is empty and returns how many were loaded.
    pub(crate) async fn seed_trails(self) -> DriverResult<usize> {
        let mut tx = self.db.begin().await?;
        let mut loaded = 0;
        if db::count_trails(tx.ex()).await? == 0 {
            for fields in sample_trails() {
                db::create_trail(tx.ex(), &fields).await?;
                loaded += 1;
            }
        }
        tx.commit().await?;
        Ok(loaded)
    }
}
