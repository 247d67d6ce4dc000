//! Model registry: language-keyed cache of expensive model instances.
//!
//! Loading recognition or synthesis weights takes seconds and hundreds of
//! megabytes, so each model must be constructed at most once per key and
//! shared by reference across every concurrent job. The registry keeps one
//! async `OnceCell` per cache key: construction for key A never blocks
//! acquisition for key B, concurrent callers for the same key all wait on a
//! single in-flight load, and a *failed* load leaves the cell empty so a
//! later call can retry.
//!
//! Nothing is ever evicted. Memory grows with the number of distinct
//! languages seen over the process lifetime.
// TODO: bound the cache with reference-counted eviction once per-language
// memory use is measured in production.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::dispatch::Dispatcher;
use crate::error::{ConvertError, ModelError};

/// Constructs models for a registry and resolves languages to cache keys.
///
/// `load` is blocking by design — it always executes on the
/// [`Dispatcher`], never on the caller's task.
pub trait ModelLoader<M: ?Sized + Send + Sync>: Send + Sync {
    /// Map a requested language to a cache key, falling back to the
    /// documented default key when the language is unsupported.
    fn resolve(&self, language: &str) -> String;

    /// Construct the model for a resolved key. Expensive; called at most
    /// once per key unless a previous call failed.
    fn load(&self, key: &str) -> Result<Box<M>, ModelError>;
}

/// A loaded model shared across concurrent jobs.
///
/// The inner lock serializes access for backends that are not reentrant.
/// It is a `std::sync::Mutex` on purpose: the lock is only ever taken inside
/// a blocking dispatcher job, so holding it across `.await` is impossible by
/// construction.
pub struct ModelHandle<M: ?Sized + Send + Sync> {
    key: String,
    model: Mutex<Box<M>>,
}

impl<M: ?Sized + Send + Sync> std::fmt::Debug for ModelHandle<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<M: ?Sized + Send + Sync> ModelHandle<M> {
    /// The cache key this model was loaded for.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Run `f` with exclusive access to the model.
    ///
    /// A poisoned lock is recovered rather than propagated: the models are
    /// stateless between calls from our perspective, and a panicked job has
    /// already been reported by the dispatcher.
    pub fn with_model<R>(&self, f: impl FnOnce(&mut M) -> R) -> R {
        let mut guard = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut **guard)
    }
}

/// Cache of model instances keyed by resolved language key.
pub struct ModelRegistry<M: ?Sized + Send + Sync + 'static> {
    /// Capability name, for logs and errors ("recognition", "synthesis").
    name: &'static str,
    loader: Arc<dyn ModelLoader<M>>,
    dispatcher: Dispatcher,
    cells: Mutex<HashMap<String, Arc<OnceCell<Arc<ModelHandle<M>>>>>>,
}

impl<M: ?Sized + Send + Sync + 'static> ModelRegistry<M> {
    pub fn new(name: &'static str, loader: Arc<dyn ModelLoader<M>>, dispatcher: Dispatcher) -> Self {
        Self {
            name,
            loader,
            dispatcher,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Get the model for `language`, constructing it on the dispatcher if
    /// this is the first acquisition for its resolved key.
    pub async fn acquire(&self, language: &str) -> Result<Arc<ModelHandle<M>>, ConvertError> {
        let key = self.loader.resolve(language);
        if key != language {
            debug!(
                "no {} model for language '{}'; falling back to key '{}'",
                self.name, language, key
            );
        }

        // Clone the per-key cell out of the map so the map lock is never
        // held across an await.
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cells.entry(key.clone()).or_default())
        };

        let handle = cell
            .get_or_try_init(|| {
                let loader = Arc::clone(&self.loader);
                let dispatcher = self.dispatcher.clone();
                let key = key.clone();
                let name = self.name;
                async move {
                    info!("loading {} model for key '{}'", name, key);
                    let loaded = {
                        let key = key.clone();
                        dispatcher.dispatch(move || loader.load(&key)).await?
                    };
                    let model = loaded.map_err(|cause| ConvertError::ModelLoad {
                        key: key.clone(),
                        cause,
                    })?;
                    info!("{} model ready for key '{}'", name, key);
                    Ok::<_, ConvertError>(Arc::new(ModelHandle {
                        key,
                        model: Mutex::new(model),
                    }))
                }
            })
            .await?;

        Ok(Arc::clone(handle))
    }

    /// Number of keys with a successfully loaded model.
    pub fn loaded_keys(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.values().filter(|c| c.initialized()).count()
    }
}
