// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped access to a credential file: materialize, call, release.

use std::future::Future;
use std::path::{Path, PathBuf};

use credseal_core::{CredentialError, MaterializationError};
use tracing::warn;

use crate::file::{Materializer, TempCredentialFile};
use crate::scope::ScopeKey;

impl Materializer {
    /// Run `f` with the path of a freshly materialized credential file.
    ///
    /// The file is deleted after `f` returns, and also if `f` panics. A
    /// failure to delete is logged and never replaces `f`'s result.
    pub fn with_materialized_file<T, F>(
        &self,
        plaintext: &[u8],
        scope: &ScopeKey,
        f: F,
    ) -> Result<T, CredentialError>
    where
        F: FnOnce(&Path) -> T,
    {
        let file = self
            .materialize(plaintext, scope)
            .inspect_err(log_materialize_failure)?;
        let output = f(file.path());
        release_logged(file);
        Ok(output)
    }

    /// Async form of [`Materializer::with_materialized_file`].
    ///
    /// The file handle lives inside the returned future, so dropping the
    /// future (timeout, cancellation) deletes the file too.
    pub async fn with_materialized_file_async<T, F, Fut>(
        &self,
        plaintext: &[u8],
        scope: &ScopeKey,
        f: F,
    ) -> Result<T, CredentialError>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = T>,
    {
        let file = self
            .materialize(plaintext, scope)
            .inspect_err(log_materialize_failure)?;
        let output = f(file.path().to_path_buf()).await;
        release_logged(file);
        Ok(output)
    }
}

fn log_materialize_failure(err: &MaterializationError) {
    warn!(path = %err.path().display(), error = %err, "failed to materialize credential file");
}

fn release_logged(file: TempCredentialFile) {
    if let Err(err) = file.release() {
        warn!(path = %err.path().display(), error = %err, "failed to release credential file");
    }
}
