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

//! High-level data types.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use trails_core::model::{ModelError, ModelResult};

pub(crate) mod payload;
mod query;
pub(crate) use query::{Condition, ListOptions, SortField};

/// Looks up the variant in `all` whose canonical name matches `s` ignoring ASCII case.
///
/// `what` names the kind of value being parsed and is used to build the error message.
fn parse_ignore_case<T: Copy>(
    all: &[T],
    as_str: fn(T) -> &'static str,
    what: &str,
    s: &str,
) -> ModelResult<T> {
    match all.iter().find(|v| as_str(**v).eq_ignore_ascii_case(s)) {
        Some(v) => Ok(*v),
        None => {
            let allowed = all.iter().map(|v| as_str(*v)).collect::<Vec<&str>>().join(", ");
            Err(ModelError(format!("Invalid {} '{}'; allowed values are: {}", what, s, allowed)))
        }
    }
}

/// Identifier of a trail as assigned by the database.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct TrailId(i64);

impl TrailId {
    /// Creates a trail identifier from its raw database value.
    pub(crate) fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw database value of the identifier.
    pub(crate) fn as_i64(self) -> i64 {
        self.0
    }
}

impl FromStr for TrailId {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s.parse::<i64>() {
            Ok(id) => Ok(Self(id)),
            Err(_) => Err(ModelError(format!("Invalid trail id '{}'", s))),
        }
    }
}

impl fmt::Display for TrailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How hard a trail is to hike.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) enum Difficulty {
    /// Suitable for everyone.
    Easy,

    /// Requires some fitness.
    Moderate,

    /// Requires experience.
    Hard,
}

impl Difficulty {
    /// All known difficulties.
    const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Moderate, Difficulty::Hard];

    /// Returns the canonical textual representation of the difficulty.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Moderate => "Moderate",
            Difficulty::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        parse_ignore_case(&Self::ALL, Self::as_str, "difficulty", s)
    }
}

/// Shape of a trail's route.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) enum TrailType {
    /// The route ends where it starts without retracing steps.
    Circular,

    /// The route goes to a destination and returns the same way.
    #[serde(rename = "Out-and-back")]
    OutAndBack,

    /// The route starts and ends in different places.
    #[serde(rename = "Point To Point")]
    PointToPoint,
}

impl TrailType {
    /// All known trail types.
    const ALL: [TrailType; 3] =
        [TrailType::Circular, TrailType::OutAndBack, TrailType::PointToPoint];

    /// Returns the canonical textual representation of the trail type.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            TrailType::Circular => "Circular",
            TrailType::OutAndBack => "Out-and-back",
            TrailType::PointToPoint => "Point To Point",
        }
    }
}

impl FromStr for TrailType {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        parse_ignore_case(&Self::ALL, Self::as_str, "type", s)
    }
}

/// The user-editable properties of a trail.
#[derive(Clone, Getters, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct TrailFields {
    /// Name of the trail.
    name: String,

    /// Where the trail is.
    location: String,

    /// How hard the trail is.
    difficulty: Difficulty,

    /// Length of the trail in kilometers.
    length: f64,

    /// Expected time to complete the trail in minutes.
    duration: u32,

    /// Elevation gain along the trail in meters.
    elevation_gain: f64,

    /// Shape of the trail's route.
    #[serde(rename = "type")]
    trail_type: TrailType,
}

impl TrailFields {
    /// Creates a new set of trail properties.
    ///
    /// The caller is responsible for having validated the values; see the `payload` module.
    pub(crate) fn new<S1: Into<String>, S2: Into<String>>(
        name: S1,
        location: S2,
        difficulty: Difficulty,
        length: f64,
        duration: u32,
        elevation_gain: f64,
        trail_type: TrailType,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            difficulty,
            length,
            duration,
            elevation_gain,
            trail_type,
        }
    }

    /// Returns a copy of these properties with the values present in `update` replaced.
    pub(crate) fn merge(self, update: TrailUpdate) -> Self {
        Self {
            name: update.name.unwrap_or(self.name),
            location: update.location.unwrap_or(self.location),
            difficulty: update.difficulty.unwrap_or(self.difficulty),
            length: update.length.unwrap_or(self.length),
            duration: update.duration.unwrap_or(self.duration),
            elevation_gain: update.elevation_gain.unwrap_or(self.elevation_gain),
            trail_type: update.trail_type.unwrap_or(self.trail_type),
        }
    }
}

/// A stored trail.
#[derive(Clone, Getters, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct Trail {
    /// Identifier of the trail.
    id: TrailId,

    /// User-editable properties of the trail.
    #[serde(flatten)]
    fields: TrailFields,

    /// Reference to the trail's cover photo, if any.
    cover_photo: Option<String>,
}

impl Trail {
    /// Creates a new trail without a cover photo.
    pub(crate) fn new(id: TrailId, fields: TrailFields) -> Self {
        Self { id, fields, cover_photo: None }
    }

    /// Sets the cover photo of the trail.
    pub(crate) fn with_cover_photo(mut self, cover_photo: Option<String>) -> Self {
        self.cover_photo = cover_photo;
        self
    }

    /// Applies a partial `update` to the trail.  Fields not present in `update` keep their values.
    pub(crate) fn update(self, update: TrailUpdate) -> Self {
        Self { fields: self.fields.merge(update), ..self }
    }
}

/// A partial modification to the properties of a trail.  `None` means "leave unchanged".
#[derive(Default)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct TrailUpdate {
    /// New name.
    pub(crate) name: Option<String>,

    /// New location.
    pub(crate) location: Option<String>,

    /// New difficulty.
    pub(crate) difficulty: Option<Difficulty>,

    /// New length in kilometers.
    pub(crate) length: Option<f64>,

    /// New duration in minutes.
    pub(crate) duration: Option<u32>,

    /// New elevation gain in meters.
    pub(crate) elevation_gain: Option<f64>,

    /// New trail type.
    pub(crate) trail_type: Option<TrailType>,
}

/// Shared secret that gates administrative operations.
pub(crate) struct AdminToken(String);

impl AdminToken {
    /// Creates a new admin token, which must not be empty.
    pub(crate) fn new<S: Into<String>>(token: S) -> ModelResult<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(ModelError("Admin token cannot be empty".to_owned()));
        }
        Ok(Self(token))
    }

    /// Checks if `candidate` matches this token.  The comparison runs in constant time for
    /// candidates of the same length as the token.
    pub(crate) fn matches(&self, candidate: &[u8]) -> bool {
        self.0.as_bytes().ct_eq(candidate).into()
    }
}
