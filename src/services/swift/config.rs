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

use serde::Deserialize;
use serde::Serialize;

/// Environment variable holding the storage URL, as written by `swift auth`.
///
/// The storage URL is the full endpoint including the account, e.g.
/// `https://server/v1/AUTH_account`.
pub(super) const ENV_STORAGE_URL: &str = "OS_STORAGE_URL";

/// Environment variable holding the auth token, as written by `swift auth`.
pub(super) const ENV_AUTH_TOKEN: &str = "OS_AUTH_TOKEN";

/// Config for OpenStack Swift support.
#[derive(Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
#[non_exhaustive]
pub struct SwiftConfig {
    /// The endpoint for Swift, the full storage URL including the account.
    pub endpoint: Option<String>,
    /// The container for Swift.
    pub container: Option<String>,
    /// The root for Swift, all operations happen under it.
    pub root: Option<String>,
    /// The auth token for Swift.
    pub token: Option<String>,
}

impl Debug for SwiftConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ds = f.debug_struct("SwiftConfig");

        ds.field("endpoint", &self.endpoint);
        ds.field("container", &self.container);
        ds.field("root", &self.root);

        if self.token.is_some() {
            ds.field("token", &"<redacted>");
        }

        ds.finish()
    }
}
