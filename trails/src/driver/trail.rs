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

//! Operations on one trail.

use crate::db;
use crate::driver::{Driver, trail_not_found};
use crate::model::{Trail, TrailFields, TrailId, TrailUpdate};
use log::info;
use trails_core::driver::DriverResult;

impl Driver {
    /// Creates a new trail with the given `fields`.
    pub(crate) async fn create_trail(self, fields: TrailFields) -> DriverResult<Trail> {
        let trail = db::create_trail(&mut self.db.ex().await?, &fields).await?;
        Ok(trail)
    }

    /// Deletes the trail identified by `id`.
    pub(crate) async fn delete_trail(self, id: TrailId) -> DriverResult<()> {
        db::delete_trail(&mut self.db.ex().await?, id).await.map_err(trail_not_found)?;
        info!("Deleted trail {}", id);
        Ok(())
    }

    /// Gets the trail identified by `id`.
    pub(crate) async fn get_trail(self, id: TrailId) -> DriverResult<Trail> {
        let trail = db::get_trail(&mut self.db.ex().await?, id).await.map_err(trail_not_found)?;
        Ok(trail)
    }

    /// Applies a partial `update` to the trail identified by `id` and returns the new trail.
    pub(crate) async fn update_trail(self, id: TrailId, update: TrailUpdate) -> DriverResult<Trail> {
        let mut tx = self.db.begin().await?;
        let trail = db::get_trail(tx.ex(), id).await.map_err(trail_not_found)?.update(update);
        db::update_trail(tx.ex(), &trail).await.map_err(trail_not_found)?;
        tx.commit().await?;
        Ok(trail)
    }
}
