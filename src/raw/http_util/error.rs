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

use http::response::Parts;

use crate::Error;
use crate::ErrorKind;

/// Create a new error happened during building request.
pub fn new_request_build_error(err: http::Error) -> Error {
    Error::new(ErrorKind::Unexpected, "building http request")
        .with_operation("http::Request::build")
        .set_source(err)
}

/// Create a new error happened during deserializing a json response body.
pub fn new_json_deserialize_error(err: serde_json::Error) -> Error {
    Error::new(ErrorKind::Unexpected, "deserialize json from response body")
        .with_operation("http_util::new_json_deserialize_error")
        .set_source(err)
}

/// Add response status and uri into the error's context.
pub fn with_error_response_context(mut err: Error, parts: &Parts) -> Error {
    err = err.with_context("status", parts.status);

    // The uri is inserted into the response extensions by `HttpClient`.
    if let Some(uri) = parts.extensions.get::<http::Uri>() {
        err = err.with_context("uri", uri);
    }

    err
}
