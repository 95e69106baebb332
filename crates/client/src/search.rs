//! Global search index over data products.
//!
//! Built by walking every bucket of an environment and listing its
//! products on parallel threads. A bucket that fails to list
//! contributes nothing; the rest of the index still builds. Lookup is
//! case-insensitive substring match, capped at 10 suggestions.

use std::thread;

use crate::client::{ApiError, ConsoleClient};

const MAX_SUGGESTIONS: usize = 10;

/// One searchable product.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SearchEntry {
    pub env_id: String,
    pub bucket: String,
    pub product: String,
}

impl SearchEntry {
    /// Display label, also the match target.
    pub fn label(&self) -> String {
        format!("{} ({})", self.product, self.bucket)
    }
}

/// In-memory product index for one environment.
#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    /// Build the index by listing products in every bucket of the
    /// environment in parallel. Per-bucket failures are swallowed.
    pub fn build(client: &ConsoleClient, env_id: &str) -> Result<Self, ApiError> {
        let environments = client.environments()?;
        let env = environments
            .into_iter()
            .find(|e| e.id == env_id)
            .ok_or_else(|| ApiError::Validation(format!("Unknown environment: {}", env_id)))?;

        let mut entries = Vec::new();
        thread::scope(|scope| {
            let handles: Vec<_> = env
                .buckets
                .iter()
                .map(|bucket| {
                    scope.spawn(move || {
                        let products = client.products(env_id, bucket).unwrap_or_default();
                        (bucket.clone(), products)
                    })
                })
                .collect();

            for handle in handles {
                // A panicked bucket thread counts as a failed bucket.
                let Ok((bucket, products)) = handle.join() else {
                    continue;
                };
                for product in products {
                    entries.push(SearchEntry {
                        env_id: env_id.to_string(),
                        bucket: bucket.clone(),
                        product: product.name,
                    });
                }
            }
        });

        entries.sort_by(|a, b| a.product.cmp(&b.product).then(a.bucket.cmp(&b.bucket)));
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring lookup, first 10 matches.
    pub fn lookup(&self, term: &str) -> Vec<&SearchEntry> {
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|e| e.product.to_lowercase().contains(&needle))
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}
