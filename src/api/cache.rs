//! Lazy id -> name caches
//!
//! A [`NameCache`] starts Unpopulated and becomes Populated after the first
//! successful fetch of the full collection. It is never refreshed. Concurrent
//! callers hitting an Unpopulated cache wait on a single populator; if that
//! populator fails the cache stays Unpopulated and the next access retries.

use super::error::{ApiError, Result};
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::OnceCell;

pub type NameMap = HashMap<u64, String>;

#[derive(Debug)]
pub struct NameCache {
    kind: &'static str,
    names: OnceCell<NameMap>,
}

impl NameCache {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            names: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn is_populated(&self) -> bool {
        self.names.initialized()
    }

    /// Return the mapping, running `fetch` to build it on first access
    pub async fn get_or_populate<F, Fut, I>(&self, fetch: F) -> Result<&NameMap>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<I>>,
        I: IntoIterator<Item = (u64, String)>,
    {
        let kind = self.kind;
        self.names
            .get_or_try_init(|| async move {
                let names: NameMap = fetch().await?.into_iter().collect();
                tracing::debug!("cached {} {} names", names.len(), kind);
                Ok::<_, ApiError>(names)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn regions() -> Vec<(u64, String)> {
        vec![(1, "New York 1".to_string()), (3, "San Francisco 1".to_string())]
    }

    #[tokio::test]
    async fn test_populates_once() {
        let cache = NameCache::new("region");
        let calls = AtomicUsize::new(0);
        assert!(!cache.is_populated());

        for _ in 0..3 {
            let names = cache
                .get_or_populate(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(regions())
                })
                .await
                .unwrap();
            assert_eq!(names.get(&3).map(String::as_str), Some("San Francisco 1"));
        }

        assert!(cache.is_populated());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_population_is_not_stored() {
        let cache = NameCache::new("size");

        let result = cache
            .get_or_populate(|| async {
                Err::<Vec<(u64, String)>, _>(ApiError::Decode(
                    serde_json::from_str::<u64>("nope").unwrap_err(),
                ))
            })
            .await;
        assert!(result.is_err());
        assert!(!cache.is_populated());

        let names = cache
            .get_or_populate(|| async { Ok(vec![(66, "512MB".to_string())]) })
            .await
            .unwrap();
        assert_eq!(names.len(), 1);
        assert!(cache.is_populated());
    }

    #[tokio::test]
    async fn test_duplicate_ids_keep_last_name() {
        let cache = NameCache::new("image");
        let names = cache
            .get_or_populate(|| async {
                Ok(vec![(1, "old".to_string()), (1, "new".to_string())])
            })
            .await
            .unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names[&1], "new");
    }
}
