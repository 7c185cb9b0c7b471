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

use std::str::FromStr;

use http::Uri;

use crate::Error;
use crate::ErrorKind;
use crate::Result;

/// A parsed reference to a Swift account, container or object.
///
/// Two URL forms address the same resource:
///
/// - `swift://server/account/container/object`
/// - `https://server/v1/account/container/object`
///
/// The container and object parts are optional: a reference may point at a
/// whole account (list containers) or a whole container (list objects).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwiftRef {
    host: String,
    account: String,
    container: Option<String>,
    object: Option<String>,
}

impl SwiftRef {
    /// The host this reference points at.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The account this reference points at.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// The container this reference points at, if any.
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// The object path this reference points at, if any.
    pub fn object(&self) -> Option<&str> {
        self.object.as_deref()
    }

    /// Render this reference as the native `https://host/v1/...` url.
    pub fn http_url(&self) -> String {
        match (&self.container, &self.object) {
            (Some(container), Some(object)) => format!(
                "https://{}/v1/{}/{}/{}",
                self.host, self.account, container, object
            ),
            (Some(container), None) => {
                format!("https://{}/v1/{}/{}", self.host, self.account, container)
            }
            _ => format!("https://{}/v1/{}", self.host, self.account),
        }
    }

    /// Render this reference as a `swift://` url.
    pub fn swift_url(&self) -> String {
        match (&self.container, &self.object) {
            (Some(container), Some(object)) => format!(
                "swift://{}/{}/{}/{}",
                self.host, self.account, container, object
            ),
            (Some(container), None) => {
                format!("swift://{}/{}/{}", self.host, self.account, container)
            }
            _ => format!("swift://{}/{}", self.host, self.account),
        }
    }
}

impl FromStr for SwiftRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let uri = Uri::from_str(s).map_err(|err| {
            Error::new(ErrorKind::ConfigInvalid, "swift url is invalid")
                .with_context("url", s)
                .set_source(err)
        })?;

        let host = uri
            .host()
            .ok_or_else(|| {
                Error::new(ErrorKind::ConfigInvalid, "swift url has no host").with_context("url", s)
            })?
            .to_string();

        let path = match uri.scheme_str() {
            Some("swift") => uri.path(),
            // The native form carries the API version as first path segment.
            Some("http") | Some("https") => match uri.path().strip_prefix("/v1") {
                // The prefix must be a whole segment, `/v1abc` is not it.
                Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
                _ => {
                    return Err(Error::new(
                        ErrorKind::ConfigInvalid,
                        "https swift url must start with /v1",
                    )
                    .with_context("url", s))
                }
            },
            scheme => {
                return Err(Error::new(
                    ErrorKind::ConfigInvalid,
                    format!("unknown swift url scheme '{}'", scheme.unwrap_or("")),
                )
                .with_context("url", s))
            }
        };

        let mut parts = path.trim_start_matches('/').splitn(3, '/');

        let account = match parts.next() {
            Some(account) if !account.is_empty() => account.to_string(),
            _ => {
                return Err(
                    Error::new(ErrorKind::ConfigInvalid, "swift url has no account")
                        .with_context("url", s),
                )
            }
        };
        let container = parts.next().filter(|v| !v.is_empty()).map(str::to_string);
        let object = parts
            .next()
            .map(|v| v.trim_end_matches('/'))
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(SwiftRef {
            host,
            account,
            container,
            object,
        })
    }
}
