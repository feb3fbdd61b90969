//! Metadata caching for the Jira tools server
//!
//! Project and board listings change rarely, so they are kept for a TTL
//! to spare repeated round trips when an agent browses a Jira instance.

use crate::error::{JiraMcpError, JiraMcpResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Cache entry with timestamp
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    created_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Keyed TTL map behind a lock
#[derive(Debug)]
struct TtlMap<K, V> {
    name: &'static str,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K: Eq + Hash, V: Clone> TtlMap<K, V> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn get(&self, key: &K, ttl: Duration) -> Option<V> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if entry.is_expired(ttl) {
            None
        } else {
            Some(entry.value.clone())
        }
    }

    fn insert(&self, key: K, value: V) -> JiraMcpResult<()> {
        self.entries
            .write()
            .map_err(|_| {
                JiraMcpError::cache(format!("Failed to acquire write lock for {}", self.name))
            })?
            .insert(key, CacheEntry::new(value));
        Ok(())
    }

    /// Drop expired entries, returning how many were removed
    fn purge_expired(&self, ttl: Duration) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(ttl));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    fn clear(&self) -> JiraMcpResult<()> {
        self.entries
            .write()
            .map_err(|_| JiraMcpError::cache(format!("Failed to clear {}", self.name)))?
            .clear();
        Ok(())
    }
}

/// Project summary as listed by `GET /project`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub key: String,
    pub name: String,
    pub project_type: Option<String>,
    pub lead: Option<String>,
}

/// Board summary as listed by `GET /board`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardInfo {
    pub id: u64,
    pub name: String,
    pub board_type: String,
    pub project_key: Option<String>,
}

/// Cached identity of the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMapping {
    pub account_id: String,
    pub display_name: String,
    pub email_address: Option<String>,
}

/// Metadata cache with TTL management
#[derive(Debug)]
pub struct MetadataCache {
    /// Full project listing, under a single key
    projects: TtlMap<(), Vec<ProjectInfo>>,

    /// Board listings keyed by project filter (`None` = all boards)
    boards: TtlMap<Option<String>, Vec<BoardInfo>>,

    current_user: RwLock<Option<CacheEntry<UserMapping>>>,

    ttl: Duration,
}

impl MetadataCache {
    /// Create a new metadata cache with the given TTL
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            projects: TtlMap::new("project listing"),
            boards: TtlMap::new("board listings"),
            current_user: RwLock::new(None),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self: Arc<Self>) -> JoinHandle<()> {
        let cleanup_interval = (self.ttl / 2).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(cleanup_interval);
            loop {
                interval.tick().await;
                self.cleanup_expired();
            }
        })
    }

    /// Clean up expired entries
    fn cleanup_expired(&self) {
        debug!("Running cache cleanup");

        let mut cleaned_count =
            self.projects.purge_expired(self.ttl) + self.boards.purge_expired(self.ttl);

        if let Ok(mut current_user) = self.current_user.write() {
            if current_user
                .as_ref()
                .is_some_and(|entry| entry.is_expired(self.ttl))
            {
                *current_user = None;
                cleaned_count += 1;
            }
        }

        if cleaned_count > 0 {
            debug!("Cleaned {} expired cache entries", cleaned_count);
        }
    }

    pub fn get_projects(&self) -> Option<Vec<ProjectInfo>> {
        self.projects.get(&(), self.ttl)
    }

    pub fn set_projects(&self, projects: Vec<ProjectInfo>) -> JiraMcpResult<()> {
        self.projects.insert((), projects)
    }

    pub fn get_boards(&self, project_key: Option<&str>) -> Option<Vec<BoardInfo>> {
        self.boards
            .get(&project_key.map(String::from), self.ttl)
    }

    pub fn set_boards(
        &self,
        project_key: Option<String>,
        boards: Vec<BoardInfo>,
    ) -> JiraMcpResult<()> {
        self.boards.insert(project_key, boards)
    }

    pub fn get_current_user(&self) -> Option<UserMapping> {
        let current_user = self.current_user.read().ok()?;
        let entry = current_user.as_ref()?;

        if entry.is_expired(self.ttl) {
            None
        } else {
            Some(entry.value.clone())
        }
    }

    pub fn set_current_user(&self, user: UserMapping) -> JiraMcpResult<()> {
        let mut current_user = self
            .current_user
            .write()
            .map_err(|_| JiraMcpError::cache("Failed to acquire write lock for current user"))?;

        *current_user = Some(CacheEntry::new(user));
        Ok(())
    }

    /// Get cache statistics
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            project_listings: self.projects.len(),
            board_listings: self.boards.len(),
            has_current_user: self
                .current_user
                .read()
                .map(|u| u.is_some())
                .unwrap_or(false),
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    /// Clear all cache entries
    pub fn clear_all(&self) -> JiraMcpResult<()> {
        info!("Clearing all cache entries");

        self.projects.clear()?;
        self.boards.clear()?;
        *self
            .current_user
            .write()
            .map_err(|_| JiraMcpError::cache("Failed to clear current user"))? = None;

        Ok(())
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub project_listings: usize,
    pub board_listings: usize,
    pub has_current_user: bool,
    pub ttl_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(id: u64, name: &str) -> BoardInfo {
        BoardInfo {
            id,
            name: name.to_string(),
            board_type: "scrum".to_string(),
            project_key: Some("DEV".to_string()),
        }
    }

    #[test]
    fn test_cache_entry_expiration() {
        let entry = CacheEntry::new("test_value".to_string());
        assert!(!entry.is_expired(Duration::from_secs(1)));
        assert!(entry.is_expired(Duration::from_secs(0)));
    }

    #[test]
    fn test_board_listings_are_keyed_by_filter() {
        let cache = MetadataCache::new(300);
        assert!(cache.get_boards(None).is_none());

        cache.set_boards(None, vec![board(1, "All")]).unwrap();
        cache
            .set_boards(Some("DEV".to_string()), vec![board(2, "Dev")])
            .unwrap();

        assert_eq!(cache.get_boards(None).unwrap()[0].id, 1);
        assert_eq!(cache.get_boards(Some("DEV")).unwrap()[0].id, 2);
        assert!(cache.get_boards(Some("OPS")).is_none());
    }

    #[test]
    fn test_stats_and_clear() {
        let cache = MetadataCache::new(300);
        let stats = cache.get_stats();
        assert_eq!(stats.project_listings, 0);
        assert_eq!(stats.ttl_seconds, 300);
        assert!(!stats.has_current_user);

        cache.set_projects(Vec::new()).unwrap();
        cache
            .set_current_user(UserMapping {
                account_id: "user123".to_string(),
                display_name: "Test User".to_string(),
                email_address: None,
            })
            .unwrap();

        let stats = cache.get_stats();
        assert_eq!(stats.project_listings, 1);
        assert!(stats.has_current_user);

        cache.clear_all().unwrap();
        assert!(cache.get_projects().is_none());
        assert!(cache.get_current_user().is_none());
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = Arc::new(MetadataCache::new(1));

        cache.set_boards(None, vec![board(1, "All")]).unwrap();
        assert!(cache.get_boards(None).is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.get_boards(None).is_none());
        cache.cleanup_expired();
        assert_eq!(cache.get_stats().board_listings, 0);
    }
}
