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

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use log::debug;

use super::config::SwiftConfig;
use super::config::ENV_AUTH_TOKEN;
use super::config::ENV_STORAGE_URL;
use super::core::SwiftCore;
use super::lister::Lister;
use super::uri::SwiftRef;
use super::writer::SwiftWriter;
use crate::raw::normalize_path;
use crate::raw::normalize_root;
use crate::raw::parse_datetime_from_rfc3339;
use crate::raw::BytesRange;
use crate::raw::HttpClient;
use crate::Entry;
use crate::EntryMode;
use crate::Error;
use crate::ErrorKind;
use crate::Metadata;
use crate::Result;

/// [OpenStack Swift](https://docs.openstack.org/api-ref/object-store/#)
/// and compatible services support.
#[derive(Default, Clone)]
pub struct SwiftBuilder {
    config: SwiftConfig,
    http_client: Option<HttpClient>,
}

impl Debug for SwiftBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwiftBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SwiftBuilder {
    /// Set the remote address of this backend.
    ///
    /// Endpoints should be full uri, e.g.
    ///
    /// - `https://openstack-controller.example.com:8080/v1/account`
    /// - `http://192.168.66.88:8080/v1/account`
    ///
    /// If the scheme is omitted, `https://` is assumed.
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.config.endpoint = if endpoint.is_empty() {
            None
        } else {
            Some(endpoint.trim_end_matches('/').to_string())
        };
        self
    }

    /// Set the container of this backend.
    ///
    /// All operations will happen under this container. It is required and
    /// cannot be empty.
    pub fn container(mut self, container: &str) -> Self {
        self.config.container = if container.is_empty() {
            None
        } else {
            Some(container.trim_matches('/').to_string())
        };
        self
    }

    /// Set the working directory of this backend.
    ///
    /// All operations will happen under this root.
    pub fn root(mut self, root: &str) -> Self {
        self.config.root = if root.is_empty() {
            None
        } else {
            Some(root.to_string())
        };
        self
    }

    /// Set the token of this backend.
    ///
    /// Tokens are obtained out of band, for example via
    /// `openstack token issue`. They time out and need to be renewed by
    /// the caller.
    ///
    /// Falls back to the `OS_AUTH_TOKEN` environment variable when unset.
    pub fn token(mut self, token: &str) -> Self {
        self.config.token = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
        self
    }

    /// Specify the http client used to communicate with the service.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build a builder from a map of config values.
    ///
    /// Recognized keys are `endpoint`, `container`, `root` and `token`.
    pub fn from_map(map: HashMap<String, String>) -> Self {
        let mut builder = Self::default();

        if let Some(v) = map.get("endpoint") {
            builder = builder.endpoint(v);
        }
        if let Some(v) = map.get("container") {
            builder = builder.container(v);
        }
        if let Some(v) = map.get("root") {
            builder = builder.root(v);
        }
        if let Some(v) = map.get("token") {
            builder = builder.token(v);
        }

        builder
    }

    /// Build a builder from a `swift://` or storage url.
    ///
    /// Both forms are accepted:
    ///
    /// - `swift://server/account/container/path/to/root`
    /// - `https://server/v1/account/container/path/to/root`
    pub fn from_uri(uri: &str) -> Result<Self> {
        let swift_ref: SwiftRef = uri.parse()?;

        let container = swift_ref.container().ok_or_else(|| {
            Error::new(ErrorKind::ConfigInvalid, "uri has no container")
                .with_operation("Builder::from_uri")
                .with_context("uri", uri)
        })?;

        let mut builder = Self::default()
            .endpoint(&format!(
                "https://{}/v1/{}",
                swift_ref.host(),
                swift_ref.account()
            ))
            .container(container);

        if let Some(object) = swift_ref.object() {
            builder = builder.root(object);
        }

        Ok(builder)
    }

    /// Consume the builder and build a [`SwiftFileSystem`].
    pub fn build(self) -> Result<SwiftFileSystem> {
        debug!("backend build started: {:?}", &self);

        let root = normalize_root(&self.config.root.unwrap_or_default());
        debug!("backend use root {root}");

        let endpoint = match self.config.endpoint {
            Some(endpoint) => endpoint,
            None => match std::env::var(ENV_STORAGE_URL) {
                Ok(url) => url.trim_end_matches('/').to_string(),
                Err(_) => {
                    return Err(Error::new(ErrorKind::ConfigInvalid, "endpoint is empty")
                        .with_operation("Builder::build")
                        .with_context("service", "swift"))
                }
            },
        };
        let endpoint = if endpoint.starts_with("http") {
            endpoint
        } else {
            format!("https://{endpoint}")
        };
        debug!("backend use endpoint: {}", &endpoint);

        let container = match self.config.container {
            Some(container) => container,
            None => {
                return Err(Error::new(ErrorKind::ConfigInvalid, "container is empty")
                    .with_operation("Builder::build")
                    .with_context("service", "swift"))
            }
        };
        debug!("backend use container: {}", &container);

        let token = match self.config.token {
            Some(token) => token,
            None => std::env::var(ENV_AUTH_TOKEN).unwrap_or_default(),
        };

        let client = match self.http_client {
            Some(client) => client,
            None => HttpClient::new()?,
        };

        debug!("backend build finished");
        Ok(SwiftFileSystem {
            core: Arc::new(SwiftCore {
                root,
                endpoint,
                container,
                token,
                client,
            }),
        })
    }
}

/// A handle to one container of an OpenStack Swift account.
///
/// Cloning is cheap, all clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct SwiftFileSystem {
    core: Arc<SwiftCore>,
}

impl SwiftFileSystem {
    /// The endpoint this filesystem talks to, including the account.
    pub fn endpoint(&self) -> &str {
        &self.core.endpoint
    }

    /// The container all operations happen in.
    pub fn container(&self) -> &str {
        &self.core.container
    }

    /// The normalized working directory, in `/path/to/root/` form.
    pub fn root(&self) -> &str {
        &self.core.root
    }

    /// Get the metadata of the given path.
    ///
    /// Paths ending with `/` are pseudo directories. They have no backing
    /// object, so no request is sent for them.
    pub async fn stat(&self, path: &str) -> Result<Metadata> {
        let path = normalize_path(path);

        if path.ends_with('/') {
            return Ok(Metadata::new(EntryMode::DIR));
        }

        self.core.swift_get_metadata(&path).await
    }

    /// Read the whole content of the given object.
    pub async fn read(&self, path: &str) -> Result<Bytes> {
        self.read_with(path, BytesRange::default()).await
    }

    /// Read the given range of the given object.
    ///
    /// A range starting beyond the end of the object yields empty bytes.
    pub async fn read_with(&self, path: &str, range: BytesRange) -> Result<Bytes> {
        let path = normalize_path(path);

        self.core.swift_read(&path, range).await
    }

    /// Write the given content to the given path.
    ///
    /// The upload is verified by the server against the MD5 of the content.
    pub async fn write(&self, path: &str, bs: impl Into<Bytes>) -> Result<()> {
        self.write_with(path, bs, None, true).await
    }

    /// Write the given content to the given path with options.
    ///
    /// `verify_upload` controls whether an `ETag` header is attached so
    /// the server checks the received bytes against their MD5.
    pub async fn write_with(
        &self,
        path: &str,
        bs: impl Into<Bytes>,
        content_type: Option<&str>,
        verify_upload: bool,
    ) -> Result<()> {
        let path = normalize_path(path);

        let w = SwiftWriter::new(
            self.core.clone(),
            &path,
            content_type.map(|v| v.to_string()),
            verify_upload,
        );
        w.write(bs.into()).await
    }

    /// Delete the given object.
    ///
    /// Deleting a missing object is not an error.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let path = normalize_path(path);

        self.core.swift_delete(&path).await
    }

    /// Copy an object to another path within the same container.
    pub async fn copy(&self, from: &str, to: &str) -> Result<()> {
        let from = normalize_path(from);
        let to = normalize_path(to);

        if from == to {
            return Err(Error::new(
                ErrorKind::IsSameFile,
                "source and target are the same object",
            )
            .with_operation("copy")
            .with_context("path", &from));
        }

        self.core.swift_copy(&from, &to).await
    }

    /// List the entries directly under the given path.
    pub async fn list(&self, path: &str) -> Result<Vec<Entry>> {
        self.lister(path).try_collect().await
    }

    /// Create a lazy stream over the entries directly under the given path.
    pub fn lister(&self, path: &str) -> Lister {
        self.lister_with(path, false, None)
    }

    /// Create a lazy stream over the entries under the given path.
    ///
    /// With `recursive` set, entries of all nested pseudo directories are
    /// returned as well. `limit` caps the page size of the underlying
    /// listing requests, not the total number of entries.
    pub fn lister_with(&self, path: &str, recursive: bool, limit: Option<usize>) -> Lister {
        let mut path = normalize_path(path);

        // Listing is directory based: `animals` must not match `animals2/`.
        if path != "/" && !path.ends_with('/') {
            path.push('/');
        }

        Lister::new(self.core.clone(), &path, recursive, limit)
    }

    /// List all containers of the account this filesystem points at.
    ///
    /// Containers are reported as pseudo directory entries.
    pub async fn list_containers(&self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut marker = String::new();

        loop {
            let page = self.core.swift_list_containers(None, &marker).await?;
            let Some(last) = page.last() else {
                break;
            };
            marker = last.name.clone();

            for info in page {
                let mut meta = Metadata::new(EntryMode::DIR);
                if let Some(bytes) = info.bytes {
                    meta.set_content_length(bytes);
                }
                if let Some(v) = info.last_modified {
                    // Same naive timestamp form as object listings.
                    if let Ok(dt) = parse_datetime_from_rfc3339(&format!("{v}Z")) {
                        meta.set_last_modified(dt);
                    }
                }
                entries.push(Entry::new(format!("{}/", info.name), meta));
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_container() {
        let err = SwiftBuilder::default()
            .endpoint("https://example.com/v1/AUTH_test")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_builder_from_uri() {
        let fs = SwiftBuilder::from_uri("swift://example.com/AUTH_test/data/prefix")
            .unwrap()
            .token("secret")
            .build()
            .unwrap();

        assert_eq!(fs.endpoint(), "https://example.com/v1/AUTH_test");
        assert_eq!(fs.container(), "data");
        assert_eq!(fs.root(), "/prefix/");
    }

    #[test]
    fn test_builder_from_map() {
        let map = HashMap::from([
            ("endpoint".to_string(), "http://127.0.0.1:8080/v1/AUTH_test/".to_string()),
            ("container".to_string(), "data".to_string()),
            ("root".to_string(), "/prefix".to_string()),
        ]);

        let fs = SwiftBuilder::from_map(map).build().unwrap();
        assert_eq!(fs.endpoint(), "http://127.0.0.1:8080/v1/AUTH_test");
        assert_eq!(fs.container(), "data");
        assert_eq!(fs.root(), "/prefix/");
    }
}
