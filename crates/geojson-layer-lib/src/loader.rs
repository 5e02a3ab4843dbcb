//! LayerLoader - owns the current snapshot of a layer and (re)loads it
//!
//! Every load gets a revision number when it starts. When it finishes, its
//! result only replaces the current snapshot if no newer load has started in
//! the meantime, so slow fetches can never overwrite fresher data. Failed loads
//! leave the current snapshot untouched.

use crate::Result;
use crate::document::{parse_document, parse_str};
use crate::feature::LayerOptions;
use crate::primitives::Primitives;
use crate::source::DataSource;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Immutable result of one successful load
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayerSnapshot {
    /// Revision of the load that produced this snapshot, 0 before the first load
    pub revision: u64,
    pub primitives: Primitives,
}

/// What happened to a load that completed without error
#[derive(Clone, Debug)]
pub enum LoadOutcome {
    /// The result is now the current snapshot
    Applied(Arc<LayerSnapshot>),
    /// A newer load started before this one finished; the result was dropped
    Superseded { revision: u64 },
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Loads GeoJSON documents into snapshots and publishes them
pub struct LayerLoader {
    options: LayerOptions,
    /// Revision of the most recently started load
    latest_revision: AtomicU64,
    current: watch::Sender<Arc<LayerSnapshot>>,
}

impl LayerLoader {
    /// Create a loader with an empty snapshot
    pub fn new(options: LayerOptions) -> Self {
        let (current, _) = watch::channel(Arc::new(LayerSnapshot::default()));
        Self {
            options,
            latest_revision: AtomicU64::new(0),
            current,
        }
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<LayerSnapshot> {
        self.current.borrow().clone()
    }

    /// Receive every snapshot that gets applied from now on
    pub fn subscribe(&self) -> watch::Receiver<Arc<LayerSnapshot>> {
        self.current.subscribe()
    }

    /// Fetch a document from `source` and make it the current snapshot
    ///
    /// Fetch, JSON and structural errors are returned and leave the current
    /// snapshot as it was.
    pub async fn load<S: DataSource>(&self, source: &S) -> Result<LoadOutcome> {
        let revision = self.start_revision();
        tracing::debug!(
            "Loading GeoJSON layer revision {} from {}",
            revision,
            source.describe()
        );

        let text = match source.fetch().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", source.describe(), e);
                return Err(e.into());
            }
        };

        match parse_str(&text, &self.options) {
            Ok(primitives) => Ok(self.apply(revision, primitives)),
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", source.describe(), e);
                Err(e)
            }
        }
    }

    /// Make an already decoded document the current snapshot
    pub fn load_document(&self, root: &Value) -> Result<LoadOutcome> {
        let revision = self.start_revision();
        let primitives = parse_document(root, &self.options).inspect_err(|e| {
            tracing::warn!("Rejected GeoJSON document: {}", e);
        })?;
        Ok(self.apply(revision, primitives))
    }

    fn start_revision(&self) -> u64 {
        self.latest_revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, revision: u64, primitives: Primitives) -> LoadOutcome {
        #[cfg(feature = "profiling")]
        profiling::scope!("LayerLoader::apply");
        let snapshot = Arc::new(LayerSnapshot {
            revision,
            primitives,
        });

        // The check runs under the channel lock, so two completing loads
        // cannot interleave between check and swap
        let applied = self.current.send_if_modified(|current| {
            if self.latest_revision.load(Ordering::SeqCst) != revision {
                return false;
            }
            *current = snapshot.clone();
            true
        });

        if applied {
            tracing::info!(
                "Applied GeoJSON layer revision {}: {} primitives",
                revision,
                snapshot.primitives.len()
            );
            LoadOutcome::Applied(snapshot)
        } else {
            tracing::debug!("Discarded superseded GeoJSON layer revision {}", revision);
            LoadOutcome::Superseded { revision }
        }
    }
}

impl Default for LayerLoader {
    fn default() -> Self {
        Self::new(LayerOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayerError;
    use crate::source::{FileSource, MemorySource, SourceError};
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::Notify;

    const POINTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [24.7, 59.4]}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [24.8, 59.5]}}
        ]
    }"#;

    const LINE: &str = r#"{
        "type": "Feature",
        "geometry": {"type": "LineString", "coordinates": [[24.7, 59.4], [24.8, 59.401]]}
    }"#;

    /// Source that only answers once the gate is opened
    struct GatedSource {
        text: String,
        gate: Arc<Notify>,
    }

    impl DataSource for GatedSource {
        async fn fetch(&self) -> std::result::Result<String, SourceError> {
            self.gate.notified().await;
            Ok(self.text.clone())
        }

        fn describe(&self) -> String {
            "gated test source".to_string()
        }
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_empty() {
        let loader = LayerLoader::default();
        let snapshot = loader.snapshot();
        assert_eq!(snapshot.revision, 0);
        assert!(snapshot.primitives.is_empty());
    }

    #[tokio::test]
    async fn test_load_applies_snapshot() {
        let loader = LayerLoader::default();
        let outcome = loader.load(&MemorySource::new(POINTS)).await.unwrap();
        assert!(outcome.is_applied());

        let snapshot = loader.snapshot();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.primitives.markers.len(), 2);
    }

    #[tokio::test]
    async fn test_reload_replaces_previous_result() {
        let loader = LayerLoader::default();
        loader.load(&MemorySource::new(POINTS)).await.unwrap();
        loader.load(&MemorySource::new(LINE)).await.unwrap();

        let snapshot = loader.snapshot();
        assert_eq!(snapshot.revision, 2);
        assert!(snapshot.primitives.markers.is_empty());
        assert_eq!(snapshot.primitives.polylines.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_loads_keep_previous_snapshot() {
        let loader = LayerLoader::default();
        loader.load(&MemorySource::new(POINTS)).await.unwrap();

        let missing = loader.load(&FileSource::new("/no/such/layer.geojson")).await;
        assert!(matches!(
            missing,
            Err(LayerError::Source(SourceError::NotFound(_)))
        ));

        let garbage = loader.load(&MemorySource::new("<html></html>")).await;
        assert!(matches!(garbage, Err(LayerError::Json(_))));

        let not_geojson = loader.load(&MemorySource::new(r#"{"type":"Topology"}"#)).await;
        assert!(matches!(not_geojson, Err(LayerError::UnsupportedType(_))));

        let snapshot = loader.snapshot();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.primitives.markers.len(), 2);
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let loader = LayerLoader::default();
        let gate = Arc::new(Notify::new());
        let slow = GatedSource {
            text: POINTS.to_string(),
            gate: gate.clone(),
        };
        let fast = MemorySource::new(LINE);

        // Start the slow load and let it park on the gate
        let slow_load = loader.load(&slow);
        tokio::pin!(slow_load);
        let parked = tokio::time::timeout(Duration::from_millis(20), &mut slow_load).await;
        assert!(parked.is_err());

        let fast_outcome = loader.load(&fast).await;
        gate.notify_one();
        let slow_outcome = slow_load.await;

        assert!(fast_outcome.unwrap().is_applied());
        assert!(matches!(
            slow_outcome.unwrap(),
            LoadOutcome::Superseded { revision: 1 }
        ));

        let snapshot = loader.snapshot();
        assert_eq!(snapshot.revision, 2);
        assert_eq!(snapshot.primitives.polylines.len(), 1);
        assert!(snapshot.primitives.markers.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_new_snapshots() {
        let loader = LayerLoader::default();
        let mut receiver = loader.subscribe();
        assert!(!receiver.has_changed().unwrap());

        loader.load(&MemorySource::new(LINE)).await.unwrap();
        assert!(receiver.has_changed().unwrap());
        let snapshot = receiver.borrow_and_update().clone();
        assert_eq!(snapshot.primitives.polylines.len(), 1);

        // Failed loads publish nothing
        let _ = loader.load(&MemorySource::new("{}")).await;
        assert!(!receiver.has_changed().unwrap());
    }

    #[test]
    fn test_load_document() {
        let loader = LayerLoader::default();
        let outcome = loader
            .load_document(&json!({"type": "FeatureCollection", "features": []}))
            .unwrap();
        assert!(outcome.is_applied());
        assert!(loader.load_document(&json!({})).is_err());
        assert_eq!(loader.snapshot().revision, 1);
    }
}
