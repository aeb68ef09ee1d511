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

//! Query intents for listing and bulk-deleting trails.

use crate::model::TrailId;
use derive_getters::Getters;
use std::fmt;
use std::str::FromStr;
use trails_core::model::{ModelError, ModelResult};

/// Field by which to sort trail listings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SortField {
    /// Sort by identifier, which is the same as insertion order.
    Id,

    /// Sort by name.
    Name,

    /// Sort by location.
    Location,

    /// Sort by canonical difficulty name.
    Difficulty,

    /// Sort by length.
    Length,

    /// Sort by duration.
    Duration,

    /// Sort by elevation gain.
    ElevationGain,

    /// Sort by canonical trail type name.
    Type,

    /// Sort by cover photo reference.
    CoverPhoto,
}

impl FromStr for SortField {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        let field = match s {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "location" => SortField::Location,
            "difficulty" => SortField::Difficulty,
            "length" => SortField::Length,
            "duration" => SortField::Duration,
            "elevation_gain" => SortField::ElevationGain,
            "type" => SortField::Type,
            "cover_photo" => SortField::CoverPhoto,
            _ => return Err(ModelError("Invalid sortBy parameter".to_owned())),
        };
        Ok(field)
    }
}

/// Parameters to list trails.
#[derive(Debug, Default, Getters, PartialEq)]
pub(crate) struct ListOptions {
    /// Only return trails whose canonical difficulty is exactly this string.
    difficulty: Option<String>,

    /// Sort results by this field instead of by insertion order.
    sort_by: Option<SortField>,

    /// Maximum number of trails to return.
    count: Option<u32>,
}

impl ListOptions {
    /// Creates a new set of list options.
    #[cfg(test)]
    pub(crate) fn new(
        difficulty: Option<&str>,
        sort_by: Option<SortField>,
        count: Option<u32>,
    ) -> Self {
        Self { difficulty: difficulty.map(str::to_owned), sort_by, count }
    }

    /// Parses the list options from the query parameters of a request.
    ///
    /// Unknown parameters are ignored and so are parameters with empty values.  If a parameter
    /// is repeated, the last occurrence wins.  The difficulty filter is kept verbatim: values
    /// that are not canonical difficulties are not errors and simply match no trails.
    pub(crate) fn from_query(params: Vec<(String, String)>) -> ModelResult<Self> {
        let mut opts = ListOptions::default();
        for (key, value) in params {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "difficulty" => opts.difficulty = Some(value),
                "sortBy" => opts.sort_by = Some(value.parse()?),
                "count" => match value.parse::<u32>() {
                    Ok(count) if count > 0 => opts.count = Some(count),
                    _ => {
                        return Err(ModelError(format!(
                            "Invalid count parameter '{}'; must be a positive integer",
                            value
                        )));
                    }
                },
                _ => (),
            }
        }
        Ok(opts)
    }
}

/// Equality condition that selects the trails to delete in bulk.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Condition {
    /// Matches the trail with this identifier.
    Id(TrailId),

    /// Matches trails with exactly this name.
    Name(String),

    /// Matches trails with exactly this location.
    Location(String),

    /// Matches trails whose canonical difficulty is exactly this string.
    Difficulty(String),

    /// Matches trails with this length.
    Length(f64),

    /// Matches trails with this duration.
    Duration(u32),

    /// Matches trails with this elevation gain.
    ElevationGain(f64),

    /// Matches trails whose canonical type is exactly this string.
    Type(String),

    /// Matches trails with exactly this cover photo reference.
    CoverPhoto(String),
}

/// Parses `value` as a finite number for the condition on `field`.
fn parse_number(field: &str, value: &str) -> ModelResult<f64> {
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ModelError(format!("Invalid value '{}' for condition on {}", value, field))),
    }
}

impl Condition {
    /// Builds a condition that matches `field` against `value`.
    pub(crate) fn parse(field: &str, value: &str) -> ModelResult<Self> {
        let condition = match field {
            "id" => Condition::Id(value.parse()?),
            "name" => Condition::Name(value.to_owned()),
            "location" => Condition::Location(value.to_owned()),
            "difficulty" => Condition::Difficulty(value.to_owned()),
            "length" => Condition::Length(parse_number(field, value)?),
            "duration" => match value.parse::<u32>() {
                Ok(n) => Condition::Duration(n),
                Err(_) => {
                    return Err(ModelError(format!(
                        "Invalid value '{}' for condition on {}",
                        value, field
                    )));
                }
            },
            "elevation_gain" => Condition::ElevationGain(parse_number(field, value)?),
            "type" => Condition::Type(value.to_owned()),
            "cover_photo" => Condition::CoverPhoto(value.to_owned()),
            _ => return Err(ModelError(format!("Invalid condition field '{}'", field))),
        };
        Ok(condition)
    }

    /// Parses the single condition carried in the query parameters of a request.
    pub(crate) fn from_query(params: Vec<(String, String)>) -> ModelResult<Self> {
        let mut iter = params.into_iter();
        match (iter.next(), iter.next()) {
            (None, _) => Err(ModelError("A condition is required to delete trails".to_owned())),
            (Some((field, value)), None) => Condition::parse(&field, &value),
            (Some(_), Some(_)) => {
                Err(ModelError("Only one condition can be given to delete trails".to_owned()))
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Id(id) => write!(f, "id={}", id),
            Condition::Name(name) => write!(f, "name={}", name),
            Condition::Location(location) => write!(f, "location={}", location),
            Condition::Difficulty(difficulty) => write!(f, "difficulty={}", difficulty),
            Condition::Length(length) => write!(f, "length={}", length),
            Condition::Duration(duration) => write!(f, "duration={}", duration),
            Condition::ElevationGain(gain) => write!(f, "elevation_gain={}", gain),
            Condition::Type(trail_type) => write!(f, "type={}", trail_type),
            Condition::CoverPhoto(photo) => write!(f, "cover_photo={}", photo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Syntactic sugar to build query parameters from string literals.
    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!(SortField::Id, "id".parse::<SortField>().unwrap());
        assert_eq!(SortField::ElevationGain, "elevation_gain".parse::<SortField>().unwrap());
        assert_eq!(SortField::Type, "type".parse::<SortField>().unwrap());
        assert_eq!(SortField::CoverPhoto, "cover_photo".parse::<SortField>().unwrap());
        for invalid in ["Name", "elevationGain", "trail_type", "foo"] {
            assert_eq!(
                ModelError("Invalid sortBy parameter".to_owned()),
                invalid.parse::<SortField>().unwrap_err()
            );
        }
    }

    #[test]
    fn test_list_options_from_query_empty() {
        assert_eq!(ListOptions::default(), ListOptions::from_query(vec![]).unwrap());
    }

    #[test]
    fn test_list_options_from_query_all() {
        let opts = ListOptions::from_query(params(&[
            ("difficulty", "moderate"),
            ("sortBy", "length"),
            ("count", "2"),
            ("unknown", "ignored"),
        ]))
        .unwrap();
        assert_eq!(
            ListOptions::new(Some("moderate"), Some(SortField::Length), Some(2)),
            opts
        );
    }

    #[test]
    fn test_list_options_from_query_empty_values_ignored() {
        let opts =
            ListOptions::from_query(params(&[("difficulty", ""), ("sortBy", ""), ("count", "")]))
                .unwrap();
        assert_eq!(ListOptions::default(), opts);
    }

    #[test]
    fn test_list_options_from_query_errors() {
        assert_eq!(
            ModelError("Invalid sortBy parameter".to_owned()),
            ListOptions::from_query(params(&[("sortBy", "height")])).unwrap_err()
        );
        for count in ["0", "-1", "abc", "1.5"] {
            let err = ListOptions::from_query(params(&[("count", count)])).unwrap_err();
            assert!(err.0.starts_with("Invalid count parameter"), "Unexpected error {}", err);
        }
    }

    #[test]
    fn test_list_options_from_query_difficulty_is_verbatim() {
        for difficulty in ["Extreme", "moderate", "Hard"] {
            let opts = ListOptions::from_query(params(&[("difficulty", difficulty)])).unwrap();
            assert_eq!(ListOptions::new(Some(difficulty), None, None), opts);
        }
    }

    #[test]
    fn test_condition_parse_ok() {
        assert_eq!(Condition::Id(TrailId::new(3)), Condition::parse("id", "3").unwrap());
        assert_eq!(
            Condition::Name("Sunny Trail".to_owned()),
            Condition::parse("name", "Sunny Trail").unwrap()
        );
        assert_eq!(
            Condition::Difficulty("Hard".to_owned()),
            Condition::parse("difficulty", "Hard").unwrap()
        );
        assert_eq!(Condition::Length(4.2), Condition::parse("length", "4.2").unwrap());
        assert_eq!(Condition::Duration(90), Condition::parse("duration", "90").unwrap());
        assert_eq!(
            Condition::ElevationGain(-10.0),
            Condition::parse("elevation_gain", "-10").unwrap()
        );
        assert_eq!(
            Condition::Type("Point To Point".to_owned()),
            Condition::parse("type", "Point To Point").unwrap()
        );
    }

    #[test]
    fn test_condition_parse_enum_values_verbatim() {
        assert_eq!(
            Condition::Difficulty("Extreme".to_owned()),
            Condition::parse("difficulty", "Extreme").unwrap()
        );
        assert_eq!(
            Condition::Difficulty("hard".to_owned()),
            Condition::parse("difficulty", "hard").unwrap()
        );
        assert_eq!(
            Condition::Type("Loop".to_owned()),
            Condition::parse("type", "Loop").unwrap()
        );
    }

    #[test]
    fn test_condition_parse_errors() {
        assert_eq!(
            ModelError("Invalid condition field 'color'".to_owned()),
            Condition::parse("color", "red").unwrap_err()
        );
        assert_eq!(
            ModelError("Invalid value 'long' for condition on length".to_owned()),
            Condition::parse("length", "long").unwrap_err()
        );
        assert_eq!(
            ModelError("Invalid value 'NaN' for condition on elevation_gain".to_owned()),
            Condition::parse("elevation_gain", "NaN").unwrap_err()
        );
        assert_eq!(
            ModelError("Invalid value '-5' for condition on duration".to_owned()),
            Condition::parse("duration", "-5").unwrap_err()
        );
        assert!(Condition::parse("id", "first").is_err());
    }

    #[test]
    fn test_condition_from_query() {
        assert_eq!(
            Condition::Difficulty("Easy".to_owned()),
            Condition::from_query(params(&[("difficulty", "Easy")])).unwrap()
        );
        assert_eq!(
            ModelError("A condition is required to delete trails".to_owned()),
            Condition::from_query(vec![]).unwrap_err()
        );
        assert_eq!(
            ModelError("Only one condition can be given to delete trails".to_owned()),
            Condition::from_query(params(&[("difficulty", "Easy"), ("name", "x")])).unwrap_err()
        );
    }

    #[test]
    fn test_condition_display() {
        assert_eq!(
            "difficulty=Moderate",
            Condition::Difficulty("Moderate".to_owned()).to_string()
        );
        assert_eq!("type=Out-and-back", Condition::Type("Out-and-back".to_owned()).to_string());
        assert_eq!("id=5", Condition::Id(TrailId::new(5)).to_string());
    }

    #[test]
    fn test_condition_debug() {
        assert_eq!("Id(TrailId(5))", format!("{:?}", Condition::Id(TrailId::new(5))));
    }
}
