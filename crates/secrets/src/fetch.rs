//! Sequential secret fetching with per-item failure tolerance

use crate::{SecretBundle, SecretFetcher};
use std::collections::BTreeMap;

/// Fetch every secret named in `secret_map` and re-key it.
///
/// `secret_map` maps remote secret names to output keys. Secrets are fetched
/// one at a time in map order. A failed fetch is logged and skipped, so the
/// returned bundle holds whatever could be retrieved; its output key is
/// simply absent. When two remote names share an output key, the one fetched
/// last wins.
pub async fn fetch_bundle<F>(fetcher: &F, secret_map: &BTreeMap<String, String>) -> SecretBundle
where
    F: SecretFetcher + ?Sized,
{
    let mut bundle = SecretBundle::new();
    let mut failed = 0usize;

    for (name, key) in secret_map {
        match fetcher.fetch(name).await {
            Ok(value) => {
                tracing::debug!(
                    secret = %name,
                    key = %key,
                    provider = fetcher.provider_name(),
                    "Fetched secret"
                );
                if bundle.insert(key.clone(), value).is_some() {
                    tracing::warn!(
                        secret = %name,
                        key = %key,
                        "Output key already set by another secret, overwriting"
                    );
                }
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(secret = %name, error = %e, "failed to fetch secret");
            }
        }
    }

    tracing::info!(
        fetched = bundle.len(),
        failed,
        total = secret_map.len(),
        "Secret fetch complete"
    );

    bundle
}
