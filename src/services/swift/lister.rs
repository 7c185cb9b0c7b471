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

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use futures::Stream;

use super::core::ListOpResponse;
use super::core::SwiftCore;
use crate::raw::build_abs_path;
use crate::raw::build_rel_path;
use crate::raw::parse_datetime_from_rfc3339;
use crate::raw::BoxedFuture;
use crate::Entry;
use crate::EntryMode;
use crate::Metadata;
use crate::Result;

/// A stream of [`Entry`] produced by a container listing.
///
/// Pages are fetched lazily. A new request is only issued once the
/// entries of the previous page have been drained.
pub struct Lister {
    core: Arc<SwiftCore>,
    path: String,
    delimiter: &'static str,
    limit: Option<usize>,

    marker: String,
    done: bool,
    buffer: VecDeque<Entry>,
    fut: Option<BoxedFuture<'static, Result<Vec<ListOpResponse>>>>,
}

impl Lister {
    pub(super) fn new(
        core: Arc<SwiftCore>,
        path: &str,
        recursive: bool,
        limit: Option<usize>,
    ) -> Self {
        let delimiter = if recursive { "" } else { "/" };

        Self {
            core,
            path: path.to_string(),
            delimiter,
            limit,
            marker: String::new(),
            done: false,
            buffer: VecDeque::new(),
            fut: None,
        }
    }

    fn into_entry(&self, entry: ListOpResponse) -> Option<Entry> {
        let (name, meta) = match entry {
            ListOpResponse::Subdir { subdir } => {
                (subdir, Metadata::new(EntryMode::DIR))
            }
            ListOpResponse::FileInfo {
                bytes,
                hash,
                name,
                last_modified,
                content_type,
            } => {
                let mut meta = Metadata::new(EntryMode::from_path(&name));
                meta.set_content_length(bytes);
                meta.set_content_md5(&hash);

                // Swift returns a naive timestamp, the offset is
                // always UTC.
                if let Ok(dt) = parse_datetime_from_rfc3339(&format!("{last_modified}Z")) {
                    meta.set_last_modified(dt);
                }
                if let Some(content_type) = content_type {
                    meta.set_content_type(&content_type);
                }

                (name, meta)
            }
        };

        // A shallow listing of `dir/` contains `dir/` itself, skip it.
        if name == build_abs_path(&self.core.root, &self.path) {
            return None;
        }

        let mut rel = build_rel_path(&self.core.root, &name);
        if rel.is_empty() {
            rel = "/".to_string();
        }

        Some(Entry::new(&rel, meta))
    }
}

impl Stream for Lister {
    type Item = Result<Entry>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(entry) = self.buffer.pop_front() {
                return Poll::Ready(Some(Ok(entry)));
            }

            if self.done {
                return Poll::Ready(None);
            }

            let mut fut: BoxedFuture<'static, _> = match self.fut.take() {
                Some(fut) => fut,
                None => {
                    let core = self.core.clone();
                    let path = self.path.clone();
                    let delimiter = self.delimiter;
                    let limit = self.limit;
                    let marker = self.marker.clone();

                    Box::pin(async move {
                        core.swift_list(&path, delimiter, limit, &marker).await
                    })
                }
            };

            let page = match fut.as_mut().poll(cx) {
                Poll::Pending => {
                    self.fut = Some(fut);
                    return Poll::Pending;
                }
                Poll::Ready(Ok(page)) => page,
                Poll::Ready(Err(err)) => {
                    self.done = true;
                    return Poll::Ready(Some(Err(err)));
                }
            };

            if page.is_empty() {
                self.done = true;
                continue;
            }

            // Continue the next page after the last returned name.
            self.marker = match page.last() {
                Some(ListOpResponse::Subdir { subdir }) => subdir.clone(),
                Some(ListOpResponse::FileInfo { name, .. }) => name.clone(),
                None => unreachable!("page is not empty"),
            };

            for entry in page {
                if let Some(entry) = self.into_entry(entry) {
                    self.buffer.push_back(entry);
                }
            }
        }
    }
}
