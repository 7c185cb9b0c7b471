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

use bytes::Bytes;
use http::response::Parts;
use http::StatusCode;

use crate::raw::with_error_response_context;
use crate::Error;
use crate::ErrorKind;

/// Parse an error response into an [`Error`].
pub(super) fn parse_error(parts: &Parts, body: &Bytes) -> Error {
    let (kind, retryable) = match parts.status {
        StatusCode::NOT_FOUND => (ErrorKind::NotFound, false),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => (ErrorKind::PermissionDenied, false),
        StatusCode::PRECONDITION_FAILED => (ErrorKind::ConditionNotMatch, false),
        StatusCode::TOO_MANY_REQUESTS => (ErrorKind::RateLimited, true),
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => (ErrorKind::Unexpected, true),
        _ => (ErrorKind::Unexpected, false),
    };

    let message = parse_error_response(body);

    let mut err = Error::new(kind, message);

    err = with_error_response_context(err, parts);

    if retryable {
        err = err.set_temporary();
    }

    err
}

/// Swift returns error responses as an HTML document. The human
/// readable message lives in the first `<p>` element.
fn parse_error_response(resp: &Bytes) -> String {
    let doc = scraper::Html::parse_document(&String::from_utf8_lossy(resp));
    let selector = scraper::Selector::parse("p").expect("selector is valid");
    let mut msg = String::new();

    if let Some(p) = doc.select(&selector).next() {
        msg = p.text().collect::<Vec<_>>().join("");
    }

    if msg.is_empty() {
        String::from_utf8_lossy(resp).trim().to_string()
    } else {
        msg
    }
}
