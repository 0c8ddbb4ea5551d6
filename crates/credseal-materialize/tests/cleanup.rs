// SPDX-FileCopyrightText: 2026 Credseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cleanup guarantees of scoped credential files.

use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

use chrono::Utc;
use credseal_core::{AccountId, TenantId};
use credseal_materialize::{Materializer, ScopeKey};

fn scope() -> ScopeKey {
    ScopeKey::new(
        "ga4-report",
        &TenantId::new("acme"),
        &AccountId::new("properties_42"),
    )
}

fn entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|rd| rd.count()).unwrap_or(0)
}

#[test]
fn callback_sees_plaintext_and_file_is_gone_afterwards() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = Materializer::new(dir.path(), "json");

    let (seen_path, contents) = materializer
        .with_materialized_file(b"secret-token-abc", &scope(), |path| {
            (path.to_path_buf(), fs::read(path).unwrap())
        })
        .unwrap();

    assert_eq!(contents, b"secret-token-abc");
    assert!(!seen_path.exists());
    assert_eq!(entries(dir.path()), 0);
}

#[test]
fn failing_callback_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = Materializer::new(dir.path(), "json");

    let outcome = materializer
        .with_materialized_file(b"{}", &scope(), |path| -> Result<(), String> {
            assert!(path.exists());
            Err("analytics client rejected the key file".to_string())
        })
        .unwrap();

    assert_eq!(
        outcome.unwrap_err(),
        "analytics client rejected the key file"
    );
    assert_eq!(entries(dir.path()), 0);
}

#[test]
fn panicking_callback_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = Materializer::new(dir.path(), "json");
    let seen: Mutex<Option<PathBuf>> = Mutex::new(None);

    let result = catch_unwind(AssertUnwindSafe(|| {
        materializer.with_materialized_file(b"{}", &scope(), |path| {
            *seen.lock().unwrap() = Some(path.to_path_buf());
            panic!("client crashed");
        })
    }));

    assert!(result.is_err());
    let path = seen.lock().unwrap().clone().unwrap();
    assert!(!path.exists());
    assert_eq!(entries(dir.path()), 0);
}

#[test]
fn concurrent_calls_for_same_account_never_collide() {
    const THREADS: usize = 8;
    let dir = tempfile::tempdir().unwrap();
    let materializer = Materializer::new(dir.path(), "json");
    // Same timestamp for every call: only the sequence number differs.
    let scope = ScopeKey::at(
        "ga4-report",
        &TenantId::new("acme"),
        &AccountId::new("properties_42"),
        Utc::now(),
    );
    let barrier = Barrier::new(THREADS);

    let results: Vec<(PathBuf, Vec<u8>)> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let materializer = &materializer;
                let scope = &scope;
                let barrier = &barrier;
                s.spawn(move || {
                    let payload = format!("payload-{i}").into_bytes();
                    materializer
                        .with_materialized_file(&payload, scope, |path| {
                            // Hold every file open at once.
                            barrier.wait();
                            (path.to_path_buf(), fs::read(path).unwrap())
                        })
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut paths: Vec<_> = results.iter().map(|(p, _)| p.clone()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), THREADS);

    let mut payloads: Vec<_> = results.into_iter().map(|(_, c)| c).collect();
    payloads.sort();
    payloads.dedup();
    assert_eq!(payloads.len(), THREADS);

    assert_eq!(entries(dir.path()), 0);
}

#[tokio::test]
async fn async_callback_file_is_released() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = Materializer::new(dir.path(), "json");

    let contents = materializer
        .with_materialized_file_async(b"async-secret", &scope(), |path| async move {
            tokio::task::yield_now().await;
            fs::read(&path).unwrap()
        })
        .await
        .unwrap();

    assert_eq!(contents, b"async-secret");
    assert_eq!(entries(dir.path()), 0);
}

#[tokio::test]
async fn timed_out_async_call_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = Materializer::new(dir.path(), "json");
    let seen: Arc<Mutex<Option<PathBuf>>> = Arc::new(Mutex::new(None));
    let seen_in_call = Arc::clone(&seen);

    let result = tokio::time::timeout(
        Duration::from_millis(50),
        materializer.with_materialized_file_async(b"slow", &scope(), move |path| async move {
            *seen_in_call.lock().unwrap() = Some(path);
            tokio::time::sleep(Duration::from_secs(60)).await;
        }),
    )
    .await;

    assert!(result.is_err(), "call should have timed out");
    let path = seen.lock().unwrap().clone().unwrap();
    assert!(!path.exists());
    assert_eq!(entries(dir.path()), 0);
}

#[test]
fn release_treats_missing_file_as_released() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = Materializer::new(dir.path(), "json");

    let file = materializer.materialize(b"x", &scope()).unwrap();
    let path = file.path().to_path_buf();
    fs::remove_file(&path).unwrap();
    file.release().unwrap();
    assert!(!path.exists());
}
