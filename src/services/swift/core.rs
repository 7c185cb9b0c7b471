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

use std::fmt::Debug;

use bytes::Bytes;
use http::header;
use http::Request;
use http::StatusCode;
use serde::Deserialize;

use super::error::parse_error;
use crate::raw::build_abs_path;
use crate::raw::new_json_deserialize_error;
use crate::raw::new_request_build_error;
use crate::raw::parse_into_metadata;
use crate::raw::percent_encode_path;
use crate::raw::BytesRange;
use crate::raw::HttpClient;
use crate::Metadata;
use crate::Result;

/// The header carrying the auth token, issued out of band.
const X_AUTH_TOKEN: &str = "X-Auth-Token";

pub(super) struct SwiftCore {
    pub root: String,
    pub endpoint: String,
    pub container: String,
    pub token: String,
    pub client: HttpClient,
}

impl Debug for SwiftCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwiftCore")
            .field("root", &self.root)
            .field("endpoint", &self.endpoint)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl SwiftCore {
    fn object_url(&self, p: &str) -> String {
        format!(
            "{}/{}/{}",
            &self.endpoint,
            &self.container,
            percent_encode_path(p)
        )
    }

    fn auth_headers(&self, mut req: http::request::Builder) -> http::request::Builder {
        if !self.token.is_empty() {
            req = req.header(X_AUTH_TOKEN, &self.token);
        }
        req
    }

    pub async fn swift_delete(&self, path: &str) -> Result<()> {
        let p = build_abs_path(&self.root, path);

        let req = self.auth_headers(Request::delete(self.object_url(&p)));

        let req = req.body(Bytes::new()).map_err(new_request_build_error)?;

        let (parts, body) = self.client.send(req).await?.into_parts();
        match parts.status {
            // Delete is idempotent, an already deleted object is fine.
            StatusCode::NO_CONTENT | StatusCode::OK | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(parse_error(&parts, &body)),
        }
    }

    pub async fn swift_list(
        &self,
        path: &str,
        delimiter: &str,
        limit: Option<usize>,
        marker: &str,
    ) -> Result<Vec<ListOpResponse>> {
        let p = build_abs_path(&self.root, path);

        // The delimiter is used to disable recursive listing.
        // Swift returns a 200 status code when there is no such pseudo
        // directory in prefix.
        let mut url = format!(
            "{}/{}/?prefix={}&delimiter={}&format=json",
            &self.endpoint,
            &self.container,
            percent_encode_path(&p),
            delimiter
        );

        if let Some(limit) = limit {
            url += &format!("&limit={limit}");
        }
        if !marker.is_empty() {
            url += &format!("&marker={}", percent_encode_path(marker));
        }

        let req = self.auth_headers(Request::get(&url));

        let req = req.body(Bytes::new()).map_err(new_request_build_error)?;

        let (parts, body) = self.client.send(req).await?.into_parts();
        match parts.status {
            StatusCode::OK => {
                serde_json::from_slice(&body).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(&parts, &body)),
        }
    }

    pub async fn swift_list_containers(
        &self,
        limit: Option<usize>,
        marker: &str,
    ) -> Result<Vec<ContainerInfo>> {
        let mut url = format!("{}/?format=json", &self.endpoint);

        if let Some(limit) = limit {
            url += &format!("&limit={limit}");
        }
        if !marker.is_empty() {
            url += &format!("&marker={}", percent_encode_path(marker));
        }

        let req = self.auth_headers(Request::get(&url));

        let req = req.body(Bytes::new()).map_err(new_request_build_error)?;

        let (parts, body) = self.client.send(req).await?.into_parts();
        match parts.status {
            StatusCode::OK => {
                serde_json::from_slice(&body).map_err(new_json_deserialize_error)
            }
            _ => Err(parse_error(&parts, &body)),
        }
    }

    pub async fn swift_create_object(
        &self,
        path: &str,
        body: Bytes,
        content_type: Option<&str>,
        etag: Option<&str>,
    ) -> Result<()> {
        let p = build_abs_path(&self.root, path);

        let mut req = self.auth_headers(Request::put(self.object_url(&p)));

        req = req.header(header::CONTENT_LENGTH, body.len());
        if let Some(content_type) = content_type {
            req = req.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(etag) = etag {
            // Swift verifies the upload against the hex MD5 in ETag.
            req = req.header(header::ETAG, etag);
        }

        let req = req.body(body).map_err(new_request_build_error)?;

        let (parts, body) = self.client.send(req).await?.into_parts();
        match parts.status {
            StatusCode::CREATED | StatusCode::OK => Ok(()),
            _ => Err(parse_error(&parts, &body)),
        }
    }

    pub async fn swift_read(&self, path: &str, range: BytesRange) -> Result<Bytes> {
        // A zero size range has no `Range` header form.
        if range.is_empty() {
            return Ok(Bytes::new());
        }

        let p = build_abs_path(&self.root, path)
            .trim_end_matches('/')
            .to_string();

        let mut req = self.auth_headers(Request::get(self.object_url(&p)));

        if !range.is_full() {
            req = req.header(header::RANGE, range.to_header());
        }

        let req = req.body(Bytes::new()).map_err(new_request_build_error)?;

        let (parts, body) = self.client.send(req).await?.into_parts();
        match parts.status {
            StatusCode::OK | StatusCode::PARTIAL_CONTENT => Ok(body),
            StatusCode::RANGE_NOT_SATISFIABLE => Ok(Bytes::new()),
            _ => Err(parse_error(&parts, &body)),
        }
    }

    pub async fn swift_copy(&self, src_p: &str, dst_p: &str) -> Result<()> {
        // NOTE: current implementation is limited to same container and root

        let src_p = format!(
            "/{}/{}",
            self.container,
            build_abs_path(&self.root, src_p).trim_end_matches('/')
        );

        let dst_p = build_abs_path(&self.root, dst_p)
            .trim_end_matches('/')
            .to_string();

        // Request method doesn't support for COPY, we use PUT instead.
        // Reference: https://docs.openstack.org/api-ref/object-store/#copy-object
        let mut req = self.auth_headers(Request::put(self.object_url(&dst_p)));

        req = req.header("X-Copy-From", percent_encode_path(&src_p));

        // if use PUT method, we need to set the content-length to 0.
        req = req.header(header::CONTENT_LENGTH, "0");

        let req = req.body(Bytes::new()).map_err(new_request_build_error)?;

        let (parts, body) = self.client.send(req).await?.into_parts();
        match parts.status {
            StatusCode::CREATED | StatusCode::OK => Ok(()),
            _ => Err(parse_error(&parts, &body)),
        }
    }

    pub async fn swift_get_metadata(&self, path: &str) -> Result<Metadata> {
        let p = build_abs_path(&self.root, path);

        let req = self.auth_headers(Request::head(self.object_url(&p)));

        let req = req.body(Bytes::new()).map_err(new_request_build_error)?;

        let (parts, body) = self.client.send(req).await?.into_parts();
        match parts.status {
            StatusCode::OK | StatusCode::NO_CONTENT => parse_into_metadata(path, &parts.headers),
            _ => Err(parse_error(&parts, &body).with_context("path", path)),
        }
    }
}

/// One entry of a container listing.
#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(untagged)]
pub(super) enum ListOpResponse {
    Subdir {
        subdir: String,
    },
    FileInfo {
        bytes: u64,
        hash: String,
        name: String,
        last_modified: String,
        content_type: Option<String>,
    },
}

/// One entry of an account listing.
#[derive(Debug, Eq, PartialEq, Deserialize)]
pub(super) struct ContainerInfo {
    pub name: String,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub last_modified: Option<String>,
}
