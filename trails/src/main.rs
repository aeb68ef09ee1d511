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

//! Entry point to the trails service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use std::net::Ipv4Addr;
use std::sync::Arc;
use trails::driver::TrailsOptions;
use trails::serve;
use trails_core::db::postgres::{PostgresDb, PostgresOptions};
use trails_core::env::get_optional_var;

/// Default port to listen on when `TRAILS_PORT` is not set.
const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() {
    env_logger::init();

    let port = get_optional_var::<u16>("TRAILS", "PORT").unwrap().unwrap_or(DEFAULT_PORT);
    let bind_all = get_optional_var::<bool>("TRAILS", "BIND_ALL").unwrap().unwrap_or(false);
    let addr = if bind_all { (Ipv4Addr::UNSPECIFIED, port) } else { (Ipv4Addr::LOCALHOST, port) };

    let opts = TrailsOptions::from_env("TRAILS").unwrap();
    let db_opts = PostgresOptions::from_env("POSTGRES").unwrap();

    let db = Arc::new(PostgresDb::connect(db_opts).unwrap());

    serve(addr, db, opts).await.unwrap()
}
