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

//! Typed access to the environment variables that configure the service.
//!
//! Variables are grouped by a prefix, so `("TRAILS", "PORT")` refers to `TRAILS_PORT`.

use std::env;
use std::fmt;
use std::str::FromStr;

/// Result type for environment errors.
type Result<T> = std::result::Result<T, String>;

/// Reads the variable `name` and parses it as a `T`, returning `None` if it is not set.
fn get_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = match env::var(name) {
        Ok(raw) => raw,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            return Err(format!("Invalid value in environment variable {}", name));
        }
    };
    match raw.parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(format!(
            "Invalid type in environment variable {}: expected {}: {}",
            name,
            std::any::type_name::<T>(),
            e
        )),
    }
}

/// Gets the required variable `<prefix>_<suffix>` parsed as a `T`.
pub fn get_required_var<T>(prefix: &str, suffix: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let name = format!("{}_{}", prefix, suffix);
    get_var(&name)?.ok_or_else(|| format!("Required environment variable {} not present", name))
}

/// Gets the optional variable `<prefix>_<suffix>` parsed as a `T`.
pub fn get_optional_var<T>(prefix: &str, suffix: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    get_var(&format!("{}_{}", prefix, suffix))
}
