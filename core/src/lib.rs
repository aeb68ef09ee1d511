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

//! Shared building blocks for the trails service.
//!
//! The service is split in layers, each with its own result and error types so that `?` can
//! carry failures upwards until the REST layer turns them into HTTP responses:
//!
//! 1.  `model`: domain types, validated at construction time.  Invalid values yield a
//!     `ModelError`.
//!
//! 1.  `db`: persistence.  Services write free functions that take an `Executor` and issue one
//!     query per supported backend.
//!
//! 1.  `driver`: business logic.  Services define a `Driver` whose operations either run a single
//!     statement or group several of them in one transaction.
//!
//! 1.  `rest`: the HTTP layer.  Services build an `axum::Router` on top of the `Driver` and report
//!     failures with `RestError`.
//!
//! 1.  `main`: reads the configuration from the environment (see `env`) and starts the server.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod db;
pub mod driver;
pub mod env;
pub mod model;
pub mod rest;
