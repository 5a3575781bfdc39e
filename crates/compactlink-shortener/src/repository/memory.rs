use crate::error::{Result, ShortenerError};
use crate::repository::{Repository, UrlRecord};
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory storage entry for a URL mapping.
#[derive(Debug, Clone)]
struct StoredUrl {
    code: ShortCode,
    record: UrlRecord,
}

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    storage: DashMap<String, StoredUrl>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, code: &ShortCode, record: UrlRecord) -> Result<()> {
        let stored = StoredUrl {
            code: code.clone(),
            record,
        };

        // Check-and-insert under the shard lock: an unexpired entry blocks the code.
        match self.storage.entry(code.as_str().to_owned()) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().record.is_expired() {
                    return Err(ShortenerError::AliasConflict(code.to_string()));
                }
                occupied.insert(stored);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(stored);
            }
        }
        Ok(())
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(self
            .storage
            .get(code.as_str())
            .map(|stored| stored.record.clone()))
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.remove(code.as_str()).is_some())
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self
            .storage
            .get(code.as_str())
            .is_some_and(|stored| !stored.record.is_expired()))
    }

    async fn find_by_original_url(&self, url: &str) -> Result<Option<(ShortCode, UrlRecord)>> {
        let mut expired_match = None;
        for stored in self.storage.iter() {
            if stored.record.original_url != url {
                continue;
            }
            if !stored.record.is_expired() {
                return Ok(Some((stored.code.clone(), stored.record.clone())));
            }
            expired_match.get_or_insert_with(|| (stored.code.clone(), stored.record.clone()));
        }
        Ok(expired_match)
    }

    async fn record_click(&self, code: &ShortCode) -> Result<bool> {
        let Some(mut stored) = self.storage.get_mut(code.as_str()) else {
            return Ok(false);
        };
        stored.record.click_count += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::{SignedDuration, Timestamp};

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn record(url: &str, expire_at: Option<Timestamp>) -> UrlRecord {
        UrlRecord {
            original_url: url.to_string(),
            created_at: Timestamp::now(),
            expire_at,
            click_count: 0,
        }
    }

    #[tokio::test]
    async fn save_and_get() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abc123"), record("https://example.com", None))
            .await
            .unwrap();

        let result = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(result.original_url, "https://example.com");
        assert_eq!(result.expire_at, None);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();

        let result = repo.get(&code("nope")).await.unwrap();
        assert!(result.is_none());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn insert_conflict() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abc123"), record("https://example.com", None))
            .await
            .unwrap();

        let err = repo
            .insert(&code("abc123"), record("https://other.com", None))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::AliasConflict(_)));
    }

    #[tokio::test]
    async fn insert_over_expired_entry() {
        let repo = InMemoryRepository::new();
        let expired = Timestamp::now() - SignedDuration::from_secs(1);

        repo.insert(&code("abc123"), record("https://old.com", Some(expired)))
            .await
            .unwrap();

        // Should succeed because the existing entry is expired.
        repo.insert(&code("abc123"), record("https://new.com", None))
            .await
            .unwrap();

        let result = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(result.original_url, "https://new.com");
    }

    #[tokio::test]
    async fn expired_entry_is_still_returned() {
        let repo = InMemoryRepository::new();
        let expired = Timestamp::now() - SignedDuration::from_secs(1);

        repo.insert(
            &code("abc123"),
            record("https://example.com", Some(expired)),
        )
        .await
        .unwrap();

        let result = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert!(result.is_expired());
    }

    #[tokio::test]
    async fn delete_existing() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abc123"), record("https://example.com", None))
            .await
            .unwrap();

        assert!(repo.delete(&code("abc123")).await.unwrap());
        assert!(repo.get(&code("abc123")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_nonexistent() {
        let repo = InMemoryRepository::new();

        assert!(!repo.delete(&code("nope")).await.unwrap());
    }

    #[tokio::test]
    async fn exists_checks() {
        let repo = InMemoryRepository::new();

        assert!(!repo.exists(&code("abc123")).await.unwrap());

        repo.insert(&code("abc123"), record("https://example.com", None))
            .await
            .unwrap();

        assert!(repo.exists(&code("abc123")).await.unwrap());
    }

    #[tokio::test]
    async fn exists_returns_false_for_expired() {
        let repo = InMemoryRepository::new();
        let expired = Timestamp::now() - SignedDuration::from_secs(1);

        repo.insert(
            &code("abc123"),
            record("https://example.com", Some(expired)),
        )
        .await
        .unwrap();

        assert!(!repo.exists(&code("abc123")).await.unwrap());
    }

    #[tokio::test]
    async fn find_by_original_url_prefers_active_mapping() {
        let repo = InMemoryRepository::new();
        let expired = Timestamp::now() - SignedDuration::from_secs(1);

        repo.insert(&code("old-one"), record("https://example.com", Some(expired)))
            .await
            .unwrap();
        repo.insert(&code("new-one"), record("https://example.com", None))
            .await
            .unwrap();

        let (found, record) = repo
            .find_by_original_url("https://example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.as_str(), "new-one");
        assert!(!record.is_expired());

        assert!(repo
            .find_by_original_url("https://unknown.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn find_by_original_url_falls_back_to_expired() {
        let repo = InMemoryRepository::new();
        let expired = Timestamp::now() - SignedDuration::from_secs(1);

        repo.insert(&code("old-one"), record("https://example.com", Some(expired)))
            .await
            .unwrap();

        let (found, record) = repo
            .find_by_original_url("https://example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.as_str(), "old-one");
        assert!(record.is_expired());
    }

    #[tokio::test]
    async fn record_click_increments_counter() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abc123"), record("https://example.com", None))
            .await
            .unwrap();

        assert!(repo.record_click(&code("abc123")).await.unwrap());
        assert!(repo.record_click(&code("abc123")).await.unwrap());
        assert!(!repo.record_click(&code("nope")).await.unwrap());

        let result = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(result.click_count, 2);
    }

    #[tokio::test]
    async fn concurrent_access() {
        use std::sync::Arc;

        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            let handle = tokio::spawn(async move {
                let c = ShortCode::new_unchecked(format!("code-{:03}", i));
                repo.insert(&c, record(&format!("https://example{}.com", i), None))
                    .await
                    .unwrap();
            });
            handles.push(handle);
        }

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            let handle = tokio::spawn(async move {
                let c = ShortCode::new_unchecked(format!("code-{:03}", i));
                let _ = repo.record_click(&c).await;
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..10u64 {
            let c = ShortCode::new_unchecked(format!("code-{:03}", i));
            let result = repo.get(&c).await.unwrap().unwrap();
            assert_eq!(result.original_url, format!("https://example{}.com", i));
        }
    }
}
