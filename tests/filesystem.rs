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

//! Integration tests against an in-memory Swift mock.

use std::collections::BTreeMap;
use std::sync::Mutex;

use bytes::Bytes;
use futures::TryStreamExt;
use http::header;
use http::Request;
use http::Response;
use http::StatusCode;
use swiftfs::raw::format_content_md5_hex;
use swiftfs::raw::BytesRange;
use swiftfs::raw::HttpClient;
use swiftfs::raw::HttpFetch;
use swiftfs::EntryMode;
use swiftfs::ErrorKind;
use swiftfs::Result;
use swiftfs::SwiftBuilder;
use swiftfs::SwiftFileSystem;

const ACCOUNT: &str = "AUTH_test";
const CONTAINER: &str = "data";
const TOKEN: &str = "secret-token";

/// An in-memory Swift account with a single container.
///
/// Routes the subset of the object store API that the filesystem
/// uses and checks the auth token on every request.
#[derive(Default)]
struct MockSwift {
    objects: Mutex<BTreeMap<String, Bytes>>,
    content_types: Mutex<BTreeMap<String, String>>,
    /// Mangle uploaded bodies, modelling corruption in transit.
    corrupt_uploads: bool,
}

impl MockSwift {
    fn with_objects(objects: &[(&str, &str)]) -> Self {
        Self {
            objects: Mutex::new(
                objects
                    .iter()
                    .map(|(k, v)| (k.to_string(), Bytes::copy_from_slice(v.as_bytes())))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    fn response(status: StatusCode, body: Bytes) -> Result<Response<Bytes>> {
        Ok(Response::builder()
            .status(status)
            .body(body)
            .expect("response must build"))
    }

    fn not_found() -> Result<Response<Bytes>> {
        let body = Bytes::from_static(
            b"<html><h1>Not Found</h1><p>The resource could not be found.</p></html>",
        );
        Self::response(StatusCode::NOT_FOUND, body)
    }

    fn list_objects(&self, query: &BTreeMap<String, String>) -> Result<Response<Bytes>> {
        let prefix = query.get("prefix").cloned().unwrap_or_default();
        let delimiter = query.get("delimiter").cloned().unwrap_or_default();
        let marker = query.get("marker").cloned().unwrap_or_default();
        let limit = query
            .get("limit")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10_000);

        let objects = self.objects.lock().unwrap();

        let mut names: Vec<(String, Option<&Bytes>)> = Vec::new();
        for (name, bs) in objects.iter() {
            if !name.starts_with(&prefix) {
                continue;
            }
            if delimiter.is_empty() {
                names.push((name.clone(), Some(bs)));
                continue;
            }
            // Collapse everything below the delimiter into a subdir entry.
            match name[prefix.len()..].split_once(&delimiter) {
                Some((head, _)) => {
                    let subdir = format!("{prefix}{head}{delimiter}");
                    if names.last().map(|(n, _)| n.as_str()) != Some(subdir.as_str()) {
                        names.push((subdir, None));
                    }
                }
                None => names.push((name.clone(), Some(bs))),
            }
        }

        let page = names
            .into_iter()
            .filter(|(name, _)| name.as_str() > marker.as_str())
            .take(limit)
            .map(|(name, bs)| match bs {
                Some(bs) => serde_json::json!({
                    "bytes": bs.len(),
                    "hash": format_content_md5_hex(bs),
                    "name": name,
                    "content_type": "text/plain",
                    "last_modified": "2023-11-01T03:00:23.147480",
                }),
                None => serde_json::json!({ "subdir": name }),
            })
            .collect::<Vec<_>>();

        Self::response(
            StatusCode::OK,
            Bytes::from(serde_json::to_vec(&page).unwrap()),
        )
    }

    fn list_containers(&self, query: &BTreeMap<String, String>) -> Result<Response<Bytes>> {
        // A fixed account: one container on the first page, none after.
        let page = if query.contains_key("marker") {
            serde_json::json!([])
        } else {
            serde_json::json!([{
                "count": 2,
                "bytes": 147,
                "name": CONTAINER,
                "last_modified": "2016-04-29T16:23:50.460230",
            }])
        };

        Self::response(
            StatusCode::OK,
            Bytes::from(serde_json::to_vec(&page).unwrap()),
        )
    }

    fn get_object(&self, name: &str, range: Option<&str>) -> Result<Response<Bytes>> {
        let objects = self.objects.lock().unwrap();
        let Some(bs) = objects.get(name) else {
            return Self::not_found();
        };

        match range {
            None => Self::response(StatusCode::OK, bs.clone()),
            Some(spec) => {
                let spec = spec.strip_prefix("bytes=").expect("range must be in bytes");
                let (start, end) = spec.split_once('-').expect("range must have two parts");
                let start: usize = start.parse().unwrap();
                let end = end
                    .parse::<usize>()
                    .map(|v| (v + 1).min(bs.len()))
                    .unwrap_or(bs.len());
                if start >= bs.len() {
                    return Self::response(StatusCode::RANGE_NOT_SATISFIABLE, Bytes::new());
                }
                Self::response(StatusCode::PARTIAL_CONTENT, bs.slice(start..end))
            }
        }
    }

    fn head_object(&self, name: &str) -> Result<Response<Bytes>> {
        let objects = self.objects.lock().unwrap();
        let Some(bs) = objects.get(name) else {
            return Self::response(StatusCode::NOT_FOUND, Bytes::new());
        };

        let content_type = self
            .content_types
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_else(|| "text/plain".to_string());

        Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, bs.len())
            .header(header::CONTENT_TYPE, content_type)
            .header(header::ETAG, format_content_md5_hex(bs))
            .header(header::LAST_MODIFIED, "Wed, 01 Nov 2023 03:00:23 GMT")
            .body(Bytes::new())
            .expect("response must build"))
    }

    fn put_object(&self, name: &str, req: &Request<Bytes>) -> Result<Response<Bytes>> {
        if let Some(src) = req.headers().get("X-Copy-From") {
            let src = src.to_str().unwrap();
            let src = src
                .strip_prefix(&format!("/{CONTAINER}/"))
                .expect("copy source must name the container");
            let mut objects = self.objects.lock().unwrap();
            let Some(bs) = objects.get(src).cloned() else {
                return Self::not_found();
            };
            objects.insert(name.to_string(), bs);
            return Self::response(StatusCode::CREATED, Bytes::new());
        }

        let mut body = req.body().clone();
        if self.corrupt_uploads {
            let mut broken = body.to_vec();
            broken.push(b'!');
            body = Bytes::from(broken);
        }

        // Replicate the server side upload verification.
        if let Some(etag) = req.headers().get(header::ETAG) {
            let expect = format_content_md5_hex(&body);
            if etag.to_str().unwrap() != expect {
                return Self::response(
                    StatusCode::PRECONDITION_FAILED,
                    Bytes::from_static(b"<html><p>Precondition Failed</p></html>"),
                );
            }
        }

        if let Some(ct) = req.headers().get(header::CONTENT_TYPE) {
            self.content_types
                .lock()
                .unwrap()
                .insert(name.to_string(), ct.to_str().unwrap().to_string());
        }

        self.objects.lock().unwrap().insert(name.to_string(), body);
        Self::response(StatusCode::CREATED, Bytes::new())
    }

    fn delete_object(&self, name: &str) -> Result<Response<Bytes>> {
        match self.objects.lock().unwrap().remove(name) {
            Some(_) => Self::response(StatusCode::NO_CONTENT, Bytes::new()),
            None => Self::not_found(),
        }
    }
}

impl HttpFetch for MockSwift {
    async fn fetch(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let token = req
            .headers()
            .get("X-Auth-Token")
            .and_then(|v| v.to_str().ok());
        if token != Some(TOKEN) {
            return Self::response(
                StatusCode::UNAUTHORIZED,
                Bytes::from_static(b"<html><p>Unauthorized.</p></html>"),
            );
        }

        let query: BTreeMap<String, String> = req
            .uri()
            .query()
            .unwrap_or_default()
            .split('&')
            .filter(|v| !v.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();

        let path = req.uri().path();
        let account_root = format!("/v1/{ACCOUNT}/");
        let container_root = format!("/v1/{ACCOUNT}/{CONTAINER}/");

        if path == account_root {
            return self.list_containers(&query);
        }

        let Some(name) = path.strip_prefix(container_root.as_str()) else {
            return Self::not_found();
        };

        match req.method().as_str() {
            "GET" if name.is_empty() => self.list_objects(&query),
            "GET" => self.get_object(
                name,
                req.headers()
                    .get(header::RANGE)
                    .and_then(|v| v.to_str().ok()),
            ),
            "HEAD" => self.head_object(name),
            "PUT" => self.put_object(name, &req),
            "DELETE" => self.delete_object(name),
            _ => Self::response(StatusCode::METHOD_NOT_ALLOWED, Bytes::new()),
        }
    }
}

fn new_filesystem(mock: MockSwift) -> SwiftFileSystem {
    SwiftBuilder::default()
        .endpoint(&format!("https://storage.example.com/v1/{ACCOUNT}"))
        .container(CONTAINER)
        .token(TOKEN)
        .http_client(HttpClient::with(mock))
        .build()
        .expect("filesystem must build")
}

#[tokio::test]
async fn test_write_then_read() -> Result<()> {
    let fs = new_filesystem(MockSwift::default());

    fs.write("hello.txt", "Hello, World!").await?;

    let bs = fs.read("hello.txt").await?;
    assert_eq!(&*bs, b"Hello, World!");
    Ok(())
}

#[tokio::test]
async fn test_read_with_range() -> Result<()> {
    let fs = new_filesystem(MockSwift::with_objects(&[("hello.txt", "Hello, World!")]));

    let bs = fs.read_with("hello.txt", BytesRange::from(0..5)).await?;
    assert_eq!(&*bs, b"Hello");

    let bs = fs.read_with("hello.txt", BytesRange::from(7..)).await?;
    assert_eq!(&*bs, b"World!");

    // Reading past the end yields empty bytes instead of an error.
    let bs = fs.read_with("hello.txt", BytesRange::from(100..)).await?;
    assert!(bs.is_empty());

    // A zero size range selects nothing and sends no request.
    let bs = fs.read_with("hello.txt", BytesRange::from(0..0)).await?;
    assert!(bs.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_read_not_found() {
    let fs = new_filesystem(MockSwift::default());

    let err = fs.read("missing.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_missing_token_is_permission_denied() {
    let fs = SwiftBuilder::default()
        .endpoint(&format!("https://storage.example.com/v1/{ACCOUNT}"))
        .container(CONTAINER)
        .token("wrong-token")
        .http_client(HttpClient::with(MockSwift::default()))
        .build()
        .expect("filesystem must build");

    let err = fs.read("hello.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn test_env_var_fallback() -> Result<()> {
    // The only test touching the environment; the other tests configure
    // endpoint and token explicitly so `build()` never reads it there.
    std::env::set_var(
        "OS_STORAGE_URL",
        format!("https://storage.example.com/v1/{ACCOUNT}"),
    );
    std::env::set_var("OS_AUTH_TOKEN", TOKEN);

    let fs = SwiftBuilder::default()
        .container(CONTAINER)
        .http_client(HttpClient::with(MockSwift::default()))
        .build()?;

    std::env::remove_var("OS_STORAGE_URL");
    std::env::remove_var("OS_AUTH_TOKEN");

    assert_eq!(
        fs.endpoint(),
        format!("https://storage.example.com/v1/{ACCOUNT}")
    );

    // The token picked up from the environment must authenticate.
    fs.write("hello.txt", "Hello, World!").await?;
    let bs = fs.read("hello.txt").await?;
    assert_eq!(&*bs, b"Hello, World!");
    Ok(())
}

#[tokio::test]
async fn test_verified_upload_catches_corruption() {
    let fs = new_filesystem(MockSwift {
        corrupt_uploads: true,
        ..Default::default()
    });

    let err = fs.write("hello.txt", "Hello, World!").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConditionNotMatch);
}

#[tokio::test]
async fn test_unverified_upload_skips_etag() -> Result<()> {
    let fs = new_filesystem(MockSwift {
        corrupt_uploads: true,
        ..Default::default()
    });

    // Without the ETag header the server stores whatever arrived.
    fs.write_with("hello.txt", "Hello, World!", None, false)
        .await?;

    let bs = fs.read("hello.txt").await?;
    assert_ne!(&*bs, b"Hello, World!");
    Ok(())
}

#[tokio::test]
async fn test_write_with_content_type() -> Result<()> {
    let fs = new_filesystem(MockSwift::default());

    fs.write_with("data.json", r#"{"hello":"world"}"#, Some("application/json"), true)
        .await?;

    let meta = fs.stat("data.json").await?;
    assert_eq!(meta.content_type(), Some("application/json"));
    Ok(())
}

#[tokio::test]
async fn test_stat() -> Result<()> {
    let fs = new_filesystem(MockSwift::with_objects(&[("hello.txt", "Hello, World!")]));

    let meta = fs.stat("hello.txt").await?;
    assert_eq!(meta.mode(), EntryMode::FILE);
    assert_eq!(meta.content_length(), 13);
    assert_eq!(meta.content_type(), Some("text/plain"));
    assert_eq!(meta.content_md5(), Some("65a8e27d8879283831b664bd8b7f0ad4"));
    assert!(meta.last_modified().is_some());

    // Pseudo directories have no backing object.
    let meta = fs.stat("some/dir/").await?;
    assert_eq!(meta.mode(), EntryMode::DIR);

    let err = fs.stat("missing.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

#[tokio::test]
async fn test_delete_is_idempotent() -> Result<()> {
    let fs = new_filesystem(MockSwift::with_objects(&[("hello.txt", "Hello, World!")]));

    fs.delete("hello.txt").await?;
    let err = fs.read("hello.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Deleting an already deleted object is fine.
    fs.delete("hello.txt").await?;
    Ok(())
}

#[tokio::test]
async fn test_copy() -> Result<()> {
    let fs = new_filesystem(MockSwift::with_objects(&[("src.txt", "Hello, World!")]));

    fs.copy("src.txt", "dst.txt").await?;
    let bs = fs.read("dst.txt").await?;
    assert_eq!(&*bs, b"Hello, World!");

    let err = fs.copy("src.txt", "src.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IsSameFile);
    Ok(())
}

#[tokio::test]
async fn test_list_shallow() -> Result<()> {
    let fs = new_filesystem(MockSwift::with_objects(&[
        ("animals/cat.txt", "meow"),
        ("animals/dog.txt", "woof"),
        ("test.txt", "Hello, World!"),
    ]));

    let entries = fs.list("/").await?;
    let names = entries.iter().map(|e| e.path()).collect::<Vec<_>>();
    assert_eq!(names, vec!["animals/", "test.txt"]);

    assert_eq!(entries[0].metadata().mode(), EntryMode::DIR);
    assert_eq!(entries[1].metadata().mode(), EntryMode::FILE);
    assert_eq!(entries[1].metadata().content_length(), 13);
    Ok(())
}

#[tokio::test]
async fn test_list_is_directory_based() -> Result<()> {
    let fs = new_filesystem(MockSwift::with_objects(&[
        ("animals/cat.txt", "meow"),
        ("animals2/bird.txt", "tweet"),
    ]));

    // `animals` must not match the `animals2/` sibling.
    let entries = fs.list("animals").await?;
    let names = entries.iter().map(|e| e.path()).collect::<Vec<_>>();
    assert_eq!(names, vec!["animals/cat.txt"]);
    Ok(())
}

#[tokio::test]
async fn test_list_recursive() -> Result<()> {
    let fs = new_filesystem(MockSwift::with_objects(&[
        ("animals/cat.txt", "meow"),
        ("animals/dog.txt", "woof"),
        ("test.txt", "Hello, World!"),
    ]));

    let entries: Vec<_> = fs.lister_with("/", true, None).try_collect().await?;
    let names = entries.iter().map(|e| e.path()).collect::<Vec<_>>();
    assert_eq!(names, vec!["animals/cat.txt", "animals/dog.txt", "test.txt"]);
    Ok(())
}

#[tokio::test]
async fn test_list_pages_through_markers() -> Result<()> {
    let fs = new_filesystem(MockSwift::with_objects(&[
        ("a.txt", "a"),
        ("b.txt", "b"),
        ("c.txt", "c"),
    ]));

    let entries: Vec<_> = fs.lister_with("/", false, Some(1)).try_collect().await?;
    let names = entries.iter().map(|e| e.path()).collect::<Vec<_>>();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    Ok(())
}

#[tokio::test]
async fn test_list_under_root() -> Result<()> {
    let fs = SwiftBuilder::default()
        .endpoint(&format!("https://storage.example.com/v1/{ACCOUNT}"))
        .container(CONTAINER)
        .root("/animals")
        .token(TOKEN)
        .http_client(HttpClient::with(MockSwift::with_objects(&[
            ("animals/cat.txt", "meow"),
            ("animals/dog.txt", "woof"),
            ("test.txt", "Hello, World!"),
        ])))
        .build()?;

    let entries = fs.list("/").await?;
    let names = entries.iter().map(|e| e.path()).collect::<Vec<_>>();
    assert_eq!(names, vec!["cat.txt", "dog.txt"]);

    let bs = fs.read("cat.txt").await?;
    assert_eq!(&*bs, b"meow");
    Ok(())
}

#[tokio::test]
async fn test_list_containers() -> Result<()> {
    let fs = new_filesystem(MockSwift::default());

    let entries = fs.list_containers().await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path(), "data/");
    assert_eq!(entries[0].metadata().mode(), EntryMode::DIR);
    assert_eq!(entries[0].metadata().content_length(), 147);
    assert!(entries[0].metadata().last_modified().is_some());
    Ok(())
}
