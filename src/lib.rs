// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! swiftfs lets file-style code address objects in an [OpenStack
//! Swift](https://docs.openstack.org/api-ref/object-store/) object store.
//!
//! Objects are addressed with the `swift://server/account/container/object`
//! URL form. Authentication, HTTP transport and retry policy are delegated
//! to external collaborators: the auth token comes from configuration or the
//! `OS_STORAGE_URL` / `OS_AUTH_TOKEN` environment variables (as issued by
//! `swift auth` or similar tooling), and the HTTP client is pluggable.
//!
//! # Quick Start
//!
//! ```no_run
//! use swiftfs::Result;
//! use swiftfs::SwiftBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Endpoint and token fall back to OS_STORAGE_URL / OS_AUTH_TOKEN.
//!     let fs = SwiftBuilder::from_uri("swift://server/account/container")?.build()?;
//!
//!     fs.write("hello.txt", "Hello, World!").await?;
//!
//!     let bs = fs.read("hello.txt").await?;
//!     assert_eq!(&*bs, b"Hello, World!");
//!
//!     let meta = fs.stat("hello.txt").await?;
//!     let _length = meta.content_length();
//!
//!     fs.delete("hello.txt").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Retrying client
//!
//! Wrap any [`raw::HttpFetch`] in a [`raw::RetryFetcher`] to retry transient
//! transport failures and retryable response statuses with exponential
//! backoff:
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use swiftfs::raw::HttpClient;
//! use swiftfs::raw::RetryFetcher;
//! use swiftfs::Result;
//! use swiftfs::SwiftBuilder;
//!
//! # fn example() -> Result<()> {
//! let client = HttpClient::with(
//!     RetryFetcher::new(reqwest::Client::new())
//!         .with_max_times(4)
//!         .with_min_delay(Duration::from_millis(100))
//!         .with_jitter(),
//! );
//!
//! let fs = SwiftBuilder::default()
//!     .endpoint("https://server/v1/account")
//!     .container("container")
//!     .http_client(client)
//!     .build()?;
//! # let _ = fs;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]
// Deny unused qualifications.
#![deny(unused_qualifications)]

// Private module with public types, they will be accessed via `swiftfs::Xxxx`
mod types;
pub use types::*;

// Public modules, they will be accessed like `swiftfs::raw::Xxxx`
pub mod raw;
pub mod services;

pub use services::Lister;
pub use services::SwiftBuilder;
pub use services::SwiftConfig;
pub use services::SwiftFileSystem;
pub use services::SwiftRef;
