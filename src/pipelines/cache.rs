use crate::error::{PipelineError, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Options that identify a loadable model.
pub trait ModelOptions {
    /// Stable key for this model configuration (device is appended separately).
    fn cache_key(&self) -> String;
}

// Cache stores WEAK references - models are freed when all pipelines using them drop.
type CacheStorage = HashMap<(TypeId, String), Box<dyn Any + Send + Sync>>;

/// Shares loaded models between pipelines built from the same checkpoint.
///
/// Construct one per process and hand it to
/// [`EmotionClassificationPipelineBuilder::build_in`](crate::emotion::EmotionClassificationPipelineBuilder::build_in).
#[derive(Clone)]
pub struct ModelCache {
    cache: Arc<Mutex<CacheStorage>>,
}

impl ModelCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheStorage>> {
        self.cache
            .lock()
            .map_err(|_| PipelineError::Unexpected("Model cache lock poisoned".into()))
    }

    pub(crate) fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        let type_id = TypeId::of::<M>();
        let cache_key = (type_id, key.to_string());

        {
            let mut cache = self.lock()?;
            if let Some(boxed) = cache.get(&cache_key) {
                // Try to upgrade weak ref
                if let Some(weak) = boxed.downcast_ref::<Weak<M>>() {
                    if let Some(strong) = weak.upgrade() {
                        tracing::debug!(key, "reusing loaded model");
                        return Ok(strong);
                    }
                }
                // Weak ref dead, remove stale entry
                cache.remove(&cache_key);
            }
        }

        let model = Arc::new(loader()?);

        {
            let mut cache = self.lock()?;
            let weak: Weak<M> = Arc::downgrade(&model);
            cache.insert(cache_key, Box::new(weak));
        }

        Ok(model)
    }

    /// Number of entries, including ones whose model was already dropped.
    pub fn len(&self) -> usize {
        self.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Whether nothing was ever cached (or everything was cleared).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every entry.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.lock() {
            cache.clear();
        }
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestModel {
        id: String,
    }

    #[test]
    fn test_cache_returns_same_instance() {
        let cache = ModelCache::new();
        let model1 = cache
            .get_or_create::<TestModel, _>("test", || {
                Ok(TestModel {
                    id: "original".into(),
                })
            })
            .unwrap();
        let model2 = cache
            .get_or_create::<TestModel, _>("test", || Ok(TestModel { id: "new".into() }))
            .unwrap();
        assert_eq!(model1.id, model2.id);
        assert!(Arc::ptr_eq(&model1, &model2));
    }

    #[test]
    fn test_dropped_model_is_reloaded() {
        let cache = ModelCache::new();
        let first = cache
            .get_or_create::<TestModel, _>("k", || Ok(TestModel { id: "first".into() }))
            .unwrap();
        drop(first);

        let second = cache
            .get_or_create::<TestModel, _>("k", || Ok(TestModel { id: "second".into() }))
            .unwrap();
        assert_eq!(second.id, "second");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_loader_error_is_not_cached() {
        let cache = ModelCache::new();
        let err = cache.get_or_create::<TestModel, _>("k", || {
            Err(PipelineError::Download("offline".into()))
        });
        assert!(matches!(err, Err(PipelineError::Download(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_clear() {
        let cache = ModelCache::new();
        #[derive(Clone)]
        struct A;
        let _kept = cache.get_or_create::<A, _>("k", || Ok(A)).unwrap();
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_different_keys_independent() {
        let cache = ModelCache::new();

        let model1 = cache
            .get_or_create::<TestModel, _>("key1", || Ok(TestModel { id: "first".into() }))
            .unwrap();

        let model2 = cache
            .get_or_create::<TestModel, _>("key2", || {
                Ok(TestModel {
                    id: "second".into(),
                })
            })
            .unwrap();

        assert_eq!(model1.id, "first");
        assert_eq!(model2.id, "second");
        assert_eq!(cache.len(), 2);
    }
}
