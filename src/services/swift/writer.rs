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

use std::sync::Arc;

use bytes::Bytes;

use super::core::SwiftCore;
use crate::raw::format_content_md5_hex;
use crate::Error;
use crate::ErrorKind;
use crate::Result;

/// Swift rejects single PUT requests beyond this size. Larger payloads
/// require the static large object manifest API.
const MAX_OBJECT_SIZE: u64 = 5 * 1024 * 1024 * 1024;

pub(super) struct SwiftWriter {
    core: Arc<SwiftCore>,
    path: String,
    content_type: Option<String>,
    verify_upload: bool,
}

impl SwiftWriter {
    pub fn new(
        core: Arc<SwiftCore>,
        path: &str,
        content_type: Option<String>,
        verify_upload: bool,
    ) -> Self {
        Self {
            core,
            path: path.to_string(),
            content_type,
            verify_upload,
        }
    }

    pub async fn write(&self, bs: Bytes) -> Result<()> {
        if bs.len() as u64 > MAX_OBJECT_SIZE {
            return Err(Error::new(
                ErrorKind::Unsupported,
                "static large objects are not supported",
            )
            .with_operation("Writer::write")
            .with_context("path", &self.path)
            .with_context("size", bs.len().to_string()));
        }

        let etag = if self.verify_upload {
            Some(format_content_md5_hex(&bs))
        } else {
            None
        };

        self.core
            .swift_create_object(
                &self.path,
                bs,
                self.content_type.as_deref(),
                etag.as_deref(),
            )
            .await
    }
}
