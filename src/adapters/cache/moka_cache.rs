use crate::ports::Cache;
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use std::hash::Hash;
use std::time::Duration;

pub struct MokaCacheAdapter<K, V> {
    inner: MokaCache<K, V>,
}

impl<K, V> MokaCacheAdapter<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { inner: cache }
    }

    pub fn with_default_settings() -> Self {
        Self::new(300, 1_000)
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MokaCacheAdapter<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).await
    }

    async fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value).await;
    }

    async fn remove(&self, key: &K) {
        self.inner.invalidate(key).await;
    }

    async fn clear(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Skill, SkillId, TaskId};

    #[tokio::test]
    async fn insert_get_and_remove() {
        let cache = MokaCacheAdapter::<TaskId, String>::with_default_settings();
        let id = TaskId::from("1");

        cache.insert(id.clone(), "Plant trees".to_string()).await;
        assert_eq!(cache.get(&id).await.as_deref(), Some("Plant trees"));

        cache.remove(&id).await;
        assert_eq!(cache.get(&id).await, None);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = MokaCacheAdapter::<String, Vec<Skill>>::with_default_settings();
        let skills = vec![Skill {
            id: SkillId::from("1"),
            name: "Carpentry".to_string(),
        }];

        cache.insert("skills".to_string(), skills).await;
        cache.clear().await;

        assert_eq!(cache.get(&"skills".to_string()).await, None);
    }
}
