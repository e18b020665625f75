//! Digest resolution
//!
//! Maps an integrity descriptor to the on-disk entry an access function should
//! operate on. Only the descriptor's preferred algorithm is considered; every
//! hash listed under it is a candidate, tried in descriptor order.
//!
//! With a single candidate the access function's outcome is returned as-is.
//! With several, the two forms differ on purpose:
//!
//! - [`with_content_path`] probes all candidates concurrently and waits for
//!   every one of them, so a fast failure never hides a slower success. The
//!   first success in candidate order wins. If all fail and any of them was
//!   missing, one aggregate `ENOENT` is returned; otherwise the first failure.
//! - [`with_content_path_sync`] tries candidates one by one, stops at the
//!   first success, and returns the last failure if none succeed.

use std::future::Future;
use std::path::{Path, PathBuf};

use cask_core::{CaskError, CaskResult};
use futures::stream::{self, StreamExt};
use ssri::{Algorithm, Integrity};
use tracing::{debug, trace};

use crate::descriptor::Descriptor;
use crate::path::content_path;

/// Split a validated descriptor into single-hash candidates for its
/// preferred algorithm, in descriptor order
fn candidates(sri: &Integrity) -> (Algorithm, Vec<Integrity>) {
    let algorithm = sri.pick_algorithm();
    let candidates = sri
        .hashes
        .iter()
        .filter(|hash| hash.algorithm == algorithm)
        .map(|hash| Integrity {
            hashes: vec![hash.clone()],
        })
        .collect();
    (algorithm, candidates)
}

/// Every (content path, digest) pair a descriptor resolves to, without
/// touching the filesystem
pub fn candidate_paths<D>(root: &Path, descriptor: &D) -> CaskResult<Vec<(PathBuf, Integrity)>>
where
    D: Descriptor + ?Sized,
{
    let sri = descriptor.to_integrity()?;
    let (_, candidates) = candidates(&sri);
    candidates
        .into_iter()
        .map(|candidate| Ok((content_path(root, &candidate)?, candidate)))
        .collect()
}

async fn resolve_one<T, F, Fut>(root: &Path, sri: Integrity, access: &F) -> CaskResult<T>
where
    F: Fn(PathBuf, Integrity) -> Fut,
    Fut: Future<Output = CaskResult<T>>,
{
    let cpath = content_path(root, &sri)?;
    trace!(path = %cpath.display(), %sri, "probing candidate");
    access(cpath, sri).await
}

fn resolve_one_sync<T, F>(root: &Path, sri: Integrity, access: &mut F) -> CaskResult<T>
where
    F: FnMut(PathBuf, Integrity) -> CaskResult<T>,
{
    let cpath = content_path(root, &sri)?;
    trace!(path = %cpath.display(), %sri, "probing candidate");
    access(cpath, sri)
}

/// Resolve `descriptor` under `root` and run `access` against the winning
/// candidate. `max_fanout` caps how many candidates are probed at once;
/// `None` probes all of them together.
pub async fn with_content_path<D, T, F, Fut>(
    root: &Path,
    descriptor: &D,
    max_fanout: Option<usize>,
    access: F,
) -> CaskResult<T>
where
    D: Descriptor + ?Sized,
    F: Fn(PathBuf, Integrity) -> Fut,
    Fut: Future<Output = CaskResult<T>>,
{
    let sri = descriptor.to_integrity()?;
    let (algorithm, mut candidates) = candidates(&sri);

    if candidates.len() == 1 {
        let only = candidates.swap_remove(0);
        return resolve_one(root, only, &access).await;
    }

    let width = max_fanout.unwrap_or(candidates.len()).max(1);
    debug!(%algorithm, candidates = candidates.len(), width, "resolving descriptor with multiple candidates");

    // `buffered` keeps results in candidate order regardless of completion order
    let outcomes: Vec<CaskResult<T>> = stream::iter(
        candidates
            .into_iter()
            .map(|candidate| resolve_one(root, candidate, &access)),
    )
    .buffered(width)
    .collect()
    .await;

    settle(sri, outcomes)
}

/// Blocking counterpart of [`with_content_path`]
pub fn with_content_path_sync<D, T, F>(root: &Path, descriptor: &D, mut access: F) -> CaskResult<T>
where
    D: Descriptor + ?Sized,
    F: FnMut(PathBuf, Integrity) -> CaskResult<T>,
{
    let sri = descriptor.to_integrity()?;
    let (algorithm, mut candidates) = candidates(&sri);

    if candidates.len() == 1 {
        let only = candidates.swap_remove(0);
        return resolve_one_sync(root, only, &mut access);
    }

    debug!(%algorithm, candidates = candidates.len(), "resolving descriptor sequentially");

    let mut last_failure = None;
    for candidate in candidates {
        match resolve_one_sync(root, candidate, &mut access) {
            Ok(value) => return Ok(value),
            Err(err) => {
                trace!(error = %err, "candidate failed");
                last_failure = Some(err);
            }
        }
    }
    Err(last_failure.unwrap_or_else(|| CaskError::not_found(sri)))
}

/// Pick the outcome of a joined fan-out
fn settle<T>(sri: Integrity, outcomes: Vec<CaskResult<T>>) -> CaskResult<T> {
    let mut saw_missing = false;
    let mut first_failure = None;

    for outcome in outcomes {
        match outcome {
            Ok(value) => return Ok(value),
            Err(err) if err.is_not_found() => saw_missing = true,
            Err(err) => {
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }

    match first_failure {
        Some(err) if !saw_missing => Err(err),
        _ => {
            debug!(%sri, "no candidate resolved to present content");
            Err(CaskError::not_found(sri))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{absent_content, join};
    use cask_core::ErrorCode;
    use std::collections::HashMap;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed(&'static str),
        Missing,
        Denied,
        Corrupt,
    }

    fn outcome(behavior: Behavior, path: &Path, sri: &Integrity) -> CaskResult<&'static str> {
        match behavior {
            Behavior::Succeed(value) => Ok(value),
            Behavior::Missing => Err(CaskError::io(
                "Failed to read content",
                io::Error::from(io::ErrorKind::NotFound),
            )),
            Behavior::Denied => Err(CaskError::io(
                "Failed to read content",
                io::Error::from(io::ErrorKind::PermissionDenied),
            )),
            Behavior::Corrupt => Err(CaskError::integrity_mismatch(sri.clone(), path)),
        }
    }

    /// Candidates built from distinct payloads, paired with scripted behaviors
    fn scripted(behaviors: &[Behavior]) -> (Integrity, HashMap<String, Behavior>) {
        let sris: Vec<Integrity> = (0..behaviors.len())
            .map(|i| absent_content(format!("candidate {}", i).as_bytes()))
            .collect();
        let script = sris
            .iter()
            .zip(behaviors)
            .map(|(sri, behavior)| (sri.hashes[0].digest.clone(), *behavior))
            .collect();
        let refs: Vec<&Integrity> = sris.iter().collect();
        (join(&refs), script)
    }

    async fn run_async(behaviors: &[Behavior]) -> (Integrity, CaskResult<&'static str>) {
        let (sri, script) = scripted(behaviors);
        let script = &script;
        let result = with_content_path(Path::new("/store"), &sri, None, |path, candidate| {
            let behavior = script[&candidate.hashes[0].digest];
            async move { outcome(behavior, &path, &candidate) }
        })
        .await;
        (sri, result)
    }

    fn run_sync(behaviors: &[Behavior]) -> (Integrity, CaskResult<&'static str>) {
        let (sri, script) = scripted(behaviors);
        let result = with_content_path_sync(Path::new("/store"), &sri, |path, candidate| {
            outcome(script[&candidate.hashes[0].digest], &path, &candidate)
        });
        (sri, result)
    }

    #[tokio::test]
    async fn test_single_candidate_error_passes_through() {
        let (_, result) = run_async(&[Behavior::Missing]).await;
        let err = result.unwrap_err();
        assert!(matches!(err, CaskError::Io { .. }));
        assert_eq!(err.code(), ErrorCode::NotFound);

        let (_, result) = run_sync(&[Behavior::Denied]);
        assert_eq!(result.unwrap_err().code(), ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_single_candidate_receives_its_content_path() {
        let sri = absent_content(b"single");
        let expected = content_path(Path::new("/store"), &sri).unwrap();
        let seen = with_content_path(Path::new("/store"), &sri, None, |path, candidate| async move {
            Ok((path, candidate))
        })
        .await
        .unwrap();
        assert_eq!(seen, (expected, sri));
    }

    #[tokio::test]
    async fn test_first_success_in_candidate_order_wins() {
        let (_, result) = run_async(&[
            Behavior::Missing,
            Behavior::Succeed("second"),
            Behavior::Succeed("third"),
        ])
        .await;
        assert_eq!(result.unwrap(), "second");

        let (_, result) = run_sync(&[Behavior::Succeed("first"), Behavior::Succeed("second")]);
        assert_eq!(result.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_all_missing_aggregates_to_one_not_found() {
        let (sri, result) = run_async(&[Behavior::Missing, Behavior::Missing, Behavior::Missing]).await;
        match result.unwrap_err() {
            CaskError::NotFound { sri: reported } => assert_eq!(reported, sri),
            other => panic!("expected aggregate not-found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_outranks_earlier_generic_failure() {
        let (_, result) = run_async(&[Behavior::Denied, Behavior::Missing]).await;
        let err = result.unwrap_err();
        assert!(matches!(err, CaskError::NotFound { .. }));

        // The blocking form reports the last failure instead
        let (_, result) = run_sync(&[Behavior::Denied, Behavior::Missing]);
        let err = result.unwrap_err();
        assert!(matches!(err, CaskError::Io { .. }));
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_first_generic_failure_when_nothing_missing() {
        let (_, result) = run_async(&[Behavior::Denied, Behavior::Corrupt]).await;
        assert_eq!(result.unwrap_err().code(), ErrorCode::PermissionDenied);

        let (_, result) = run_sync(&[Behavior::Denied, Behavior::Corrupt]);
        assert_eq!(result.unwrap_err().code(), ErrorCode::Integrity);
    }

    #[test]
    fn test_sync_stops_at_first_success() {
        let (sri, script) = scripted(&[
            Behavior::Missing,
            Behavior::Succeed("hit"),
            Behavior::Succeed("never probed"),
        ]);
        let mut probes = 0;
        let result = with_content_path_sync(Path::new("/store"), &sri, |path, candidate| {
            probes += 1;
            outcome(script[&candidate.hashes[0].digest], &path, &candidate)
        });
        assert_eq!(result.unwrap(), "hit");
        assert_eq!(probes, 2);
    }

    #[tokio::test]
    async fn test_slow_success_is_not_masked_by_fast_failure() {
        let (sri, script) = scripted(&[Behavior::Denied, Behavior::Succeed("slow")]);
        let script = &script;
        let result = with_content_path(Path::new("/store"), &sri, None, |path, candidate| {
            let behavior = script[&candidate.hashes[0].digest];
            async move {
                if let Behavior::Succeed(_) = behavior {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                outcome(behavior, &path, &candidate)
            }
        })
        .await;
        assert_eq!(result.unwrap(), "slow");
    }

    #[tokio::test]
    async fn test_fanout_probes_concurrently_and_respects_cap() {
        async fn peak_concurrency(max_fanout: Option<usize>) -> usize {
            let (sri, _) = scripted(&[Behavior::Missing; 4]);
            let active = AtomicUsize::new(0);
            let peak = AtomicUsize::new(0);
            let (active, peak_ref) = (&active, &peak);
            let result: CaskResult<()> =
                with_content_path(Path::new("/store"), &sri, max_fanout, |_, candidate| async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak_ref.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Err(CaskError::not_found(candidate))
                })
                .await;
            assert!(result.unwrap_err().is_not_found());
            peak.load(Ordering::SeqCst)
        }

        assert_eq!(peak_concurrency(None).await, 4);
        assert_eq!(peak_concurrency(Some(2)).await, 2);
        assert_eq!(peak_concurrency(Some(1)).await, 1);
    }

    #[tokio::test]
    async fn test_only_preferred_algorithm_is_considered() {
        let strong = absent_content(b"payload");
        let weak = cask_core::utils::compute_integrity(b"payload", Algorithm::Sha1);
        let descriptor = format!("{} {}", weak, strong);

        let paths = candidate_paths(Path::new("/store"), descriptor.as_str()).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].1, strong);

        let seen = with_content_path(Path::new("/store"), descriptor.as_str(), None, |_, candidate| async move {
            Ok(candidate.hashes[0].algorithm)
        })
        .await
        .unwrap();
        assert_eq!(seen, Algorithm::Sha512);
    }

    #[test]
    fn test_built_descriptor_prefers_strongest_algorithm() {
        let weak = cask_core::utils::compute_integrity(b"payload", Algorithm::Sha1);
        let strong = absent_content(b"payload");
        let built = Integrity {
            hashes: vec![weak.hashes[0].clone(), strong.hashes[0].clone()],
        };
        let root = Path::new("/store");

        let paths = candidate_paths(root, &built).unwrap();
        assert_eq!(paths, vec![(content_path(root, &strong).unwrap(), strong.clone())]);
        assert_eq!(paths, candidate_paths(root, built.to_string().as_str()).unwrap());
    }

    #[test]
    fn test_malformed_descriptor_never_calls_access() {
        let mut called = false;
        let result: CaskResult<()> = with_content_path_sync(Path::new("/store"), "not-a-digest", |_, _| {
            called = true;
            Ok(())
        });
        assert!(matches!(result.unwrap_err(), CaskError::IntegrityParse { .. }));
        assert!(!called);
    }

    #[test]
    fn test_candidate_paths_keep_descriptor_order() {
        let a = absent_content(b"a");
        let b = absent_content(b"b");
        let root = Path::new("/store");
        let paths = candidate_paths(root, &join(&[&b, &a])).unwrap();
        assert_eq!(
            paths,
            vec![
                (content_path(root, &b).unwrap(), b.clone()),
                (content_path(root, &a).unwrap(), a.clone()),
            ]
        );
    }
}
