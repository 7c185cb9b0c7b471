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

//! http_util contains the http request building, sending and response
//! parsing helpers shared by the whole crate.

mod client;
pub use client::BoxedFuture;
pub use client::HttpClient;
pub use client::HttpFetch;
pub use client::HttpFetchDyn;
pub use client::HttpFetcher;

mod retry;
pub use retry::RetryFetcher;

mod bytes_range;
pub use bytes_range::BytesRange;

mod header;
pub use header::format_content_md5_hex;
pub use header::parse_content_length;
pub use header::parse_content_type;
pub use header::parse_etag;
pub use header::parse_header_to_str;
pub use header::parse_into_metadata;
pub use header::parse_last_modified;

mod error;
pub use error::new_json_deserialize_error;
pub use error::new_request_build_error;
pub use error::with_error_response_context;

mod uri;
pub use uri::percent_encode_path;
