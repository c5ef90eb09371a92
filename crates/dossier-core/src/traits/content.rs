// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binary content store holding serialized notification variants.

use async_trait::async_trait;

use crate::error::DossierError;
use crate::traits::adapter::PluginAdapter;

/// A blob to store or as loaded back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlob {
    pub title: String,
    pub mime_type: String,
    pub compressed: bool,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait ContentBlobStore: PluginAdapter {
    /// Store a blob and return its key.
    async fn store_blob(&self, blob: ContentBlob) -> Result<String, DossierError>;

    async fn load_blob(&self, key: &str) -> Result<Option<ContentBlob>, DossierError>;

    /// Delete a blob. Deleting an unknown key is not an error.
    async fn delete_blob(&self, key: &str) -> Result<(), DossierError>;
}
