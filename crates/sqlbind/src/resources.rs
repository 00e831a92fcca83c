// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Resource loading for `resource` and `url` attributes.

use crate::error::BuilderError;
use std::fs;

pub struct Resources;

impl Resources {
    pub fn load(path: &str) -> Result<String, BuilderError> {
        fs::read_to_string(path).map_err(|e| BuilderError::Io {
            resource: path.to_string(),
            source: e,
        })
    }

    /// Only `file://` URLs are supported; remote schemes are rejected.
    pub fn load_url(url: &str) -> Result<String, BuilderError> {
        match url.strip_prefix("file://") {
            Some(path) => Self::load(path),
            None => Err(BuilderError::Malformed {
                element: "url",
                message: format!("unsupported URL scheme in '{}'", url),
            }),
        }
    }
}
