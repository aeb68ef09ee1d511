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

//! Validation of the JSON payloads that create and modify trails.
//!
//! Payloads are inspected as raw JSON objects, not deserialized into typed structs.  Every
//! offending field is reported in a single error, and an explicit `null` is an error of its own
//! rather than an absent field.

use crate::model::{Difficulty, TrailFields, TrailType, TrailUpdate};
use serde_json::{Map, Value};
use trails_core::model::{ModelError, ModelResult};

/// Accessor over the fields of a JSON object that accumulates validation errors.
struct FieldReader<'a> {
    /// The object being validated.
    object: &'a Map<String, Value>,

    /// Human-readable descriptions of all problems found so far.
    errors: Vec<String>,
}

impl<'a> FieldReader<'a> {
    /// Creates a reader over `body`, which must be a JSON object.
    fn new(body: &'a Value) -> ModelResult<Self> {
        match body.as_object() {
            Some(object) => Ok(Self { object, errors: vec![] }),
            None => Err(ModelError("Request body must be a JSON object".to_owned())),
        }
    }

    /// Reads and parses the optional field `name`, recording an error if it is present but
    /// invalid.
    fn optional<T>(&mut self, name: &str, parse: fn(&Value) -> Result<T, String>) -> Option<T> {
        let value = self.object.get(name)?;
        if value.is_null() {
            self.errors.push(format!("{}: cannot be null", name));
            return None;
        }
        match parse(value) {
            Ok(value) => Some(value),
            Err(e) => {
                self.errors.push(format!("{}: {}", name, e));
                None
            }
        }
    }

    /// Reads and parses the mandatory field `name`, recording an error if it is missing or
    /// invalid.
    fn required<T>(&mut self, name: &str, parse: fn(&Value) -> Result<T, String>) -> Option<T> {
        if !self.object.contains_key(name) {
            self.errors.push(format!("{}: field required", name));
            return None;
        }
        self.optional(name, parse)
    }

    /// Consumes the reader and returns the error describing all recorded problems, if any.
    fn finish(self) -> ModelResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ModelError(format!("Invalid trail: {}", self.errors.join("; "))))
        }
    }
}

/// Parses a non-blank string.
fn parse_text(value: &Value) -> Result<String, String> {
    match value.as_str() {
        Some(s) if s.trim().is_empty() => Err("cannot be blank".to_owned()),
        Some(s) => Ok(s.to_owned()),
        None => Err("must be a string".to_owned()),
    }
}

/// Parses a difficulty given as a string in any case.
fn parse_difficulty(value: &Value) -> Result<Difficulty, String> {
    match value.as_str() {
        Some(s) => s.parse().map_err(|e: ModelError| e.0),
        None => Err("must be a string".to_owned()),
    }
}

/// Parses a trail type given as a string in any case.
fn parse_trail_type(value: &Value) -> Result<TrailType, String> {
    match value.as_str() {
        Some(s) => s.parse().map_err(|e: ModelError| e.0),
        None => Err("must be a string".to_owned()),
    }
}

/// Parses a length, which must be a non-negative number.
fn parse_length(value: &Value) -> Result<f64, String> {
    match value.as_f64() {
        Some(n) if n >= 0.0 => Ok(n),
        _ => Err("must be a non-negative number".to_owned()),
    }
}

/// Parses a duration, which must be a non-negative integer that fits in 32 bits.
fn parse_duration(value: &Value) -> Result<u32, String> {
    match value.as_u64().map(u32::try_from) {
        Some(Ok(n)) => Ok(n),
        _ => Err("must be a non-negative integer".to_owned()),
    }
}

/// Parses an elevation gain, which can be any number.
fn parse_elevation_gain(value: &Value) -> Result<f64, String> {
    value.as_f64().ok_or_else(|| "must be a number".to_owned())
}

/// Validates the payload to create a new trail.
///
/// All fields are mandatory.  Unknown fields are ignored.
pub(crate) fn validate_create(body: &Value) -> ModelResult<TrailFields> {
    let mut reader = FieldReader::new(body)?;
    let name = reader.required("name", parse_text);
    let location = reader.required("location", parse_text);
    let difficulty = reader.required("difficulty", parse_difficulty);
    let length = reader.required("length", parse_length);
    let duration = reader.required("duration", parse_duration);
    let elevation_gain = reader.required("elevation_gain", parse_elevation_gain);
    let trail_type = reader.required("type", parse_trail_type);

    match (name, location, difficulty, length, duration, elevation_gain, trail_type) {
        (
            Some(name),
            Some(location),
            Some(difficulty),
            Some(length),
            Some(duration),
            Some(elevation_gain),
            Some(trail_type),
        ) => Ok(TrailFields::new(
            name,
            location,
            difficulty,
            length,
            duration,
            elevation_gain,
            trail_type,
        )),
        _ => match reader.finish() {
            Err(e) => Err(e),
            Ok(()) => Err(ModelError("Invalid trail".to_owned())),
        },
    }
}

/// Validates the payload to partially update an existing trail.
///
/// All fields are optional but those that are present must be valid and not null.  Unknown
/// fields, including `id` and `cover_photo`, are ignored.
pub(crate) fn validate_update(body: &Value) -> ModelResult<TrailUpdate> {
    let mut reader = FieldReader::new(body)?;
    let update = TrailUpdate {
        name: reader.optional("name", parse_text),
        location: reader.optional("location", parse_text),
        difficulty: reader.optional("difficulty", parse_difficulty),
        length: reader.optional("length", parse_length),
        duration: reader.optional("duration", parse_duration),
        elevation_gain: reader.optional("elevation_gain", parse_elevation_gain),
        trail_type: reader.optional("type", parse_trail_type),
    };
    reader.finish()?;
    Ok(update)
}
