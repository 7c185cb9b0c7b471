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

use crate::raw::get_basename;
use crate::Metadata;

/// Entry is the entry of a listed path with corresponding metadata.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// Path of this entry, relative to the configured root.
    path: String,
    /// Metadata of this entry.
    metadata: Metadata,
}

impl Entry {
    /// Create an entry with metadata.
    pub fn new(path: impl Into<String>, metadata: Metadata) -> Entry {
        Entry {
            path: path.into(),
            metadata,
        }
    }

    /// Path of entry, relative to the filesystem's root.
    ///
    /// - Path endswith `/` means it's a pseudo directory.
    /// - Otherwise, it's an object.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of entry, the last segment of the path.
    ///
    /// If this entry is a pseudo directory, `name` ends with `/`.
    pub fn name(&self) -> &str {
        get_basename(&self.path)
    }

    /// Fetch metadata of this entry.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Consume this entry to get its path and metadata.
    pub fn into_parts(self) -> (String, Metadata) {
        (self.path, self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntryMode;

    #[test]
    fn test_entry_name() {
        let cases = vec![
            ("object", "path/to/data.txt", "data.txt"),
            ("pseudo dir", "path/to/dir/", "dir/"),
            ("root", "/", "/"),
        ];

        for (name, path, expect) in cases {
            let entry = Entry::new(path, Metadata::new(EntryMode::from_path(path)));
            assert_eq!(entry.name(), expect, "{name}");
        }
    }
}
