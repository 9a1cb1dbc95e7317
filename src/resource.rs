use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use tracing::info;

use crate::{
    catalog::Catalog,
    config::Config,
    error::{Error, Result},
    recommend::Recommender,
    vectorizer::{serde::TFIDFData, TFIDFVectorizer},
};

/// Length and modification time of a file when it was loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileStamp {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: Arc<T>,
    stamp: FileStamp,
}

/// Load-once holder for the job catalog and the recommender.
///
/// Each resource is read from disk the first time it is requested and then
/// shared through `Arc`. `reload_if_changed` drops any resource whose backing
/// file changed so the next request reads it again.
#[derive(Debug)]
pub struct Resources {
    data_path: PathBuf,
    model_path: PathBuf,
    catalog: Option<Slot<Catalog>>,
    /// stamp is the model file's; also dropped whenever the catalog is
    recommender: Option<Slot<Recommender>>,
}

impl Resources {
    pub fn new(data_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            model_path: model_path.into(),
            catalog: None,
            recommender: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data.path, &config.model.path)
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Job catalog, loaded on first use
    pub fn catalog(&mut self) -> Result<Arc<Catalog>> {
        if let Some(slot) = &self.catalog {
            return Ok(Arc::clone(&slot.value));
        }
        let stamp = FileStamp::of(&self.data_path)?;
        let catalog = Arc::new(Catalog::from_csv_path(&self.data_path)?);
        self.catalog = Some(Slot {
            value: Arc::clone(&catalog),
            stamp,
        });
        Ok(catalog)
    }

    /// Recommender over the current catalog, built on first use
    pub fn recommender(&mut self) -> Result<Arc<Recommender>> {
        if let Some(slot) = &self.recommender {
            return Ok(Arc::clone(&slot.value));
        }
        let catalog = self.catalog()?;
        let stamp = FileStamp::of(&self.model_path)?;
        let vectorizer: TFIDFVectorizer = TFIDFData::load(&self.model_path)?.into_tf_idf_vectorizer()?;
        info!(
            path = %self.model_path.display(),
            columns = vectorizer.dim(),
            "loaded tf-idf artifact"
        );
        let recommender = Arc::new(Recommender::new(catalog, vectorizer)?);
        self.recommender = Some(Slot {
            value: Arc::clone(&recommender),
            stamp,
        });
        Ok(recommender)
    }

    /// Drop resources whose files changed (or vanished) since they were loaded.
    /// Returns whether anything was dropped.
    pub fn reload_if_changed(&mut self) -> bool {
        let mut dropped = false;
        if is_stale(&self.catalog, &self.data_path) {
            info!(path = %self.data_path.display(), "job catalog changed on disk");
            self.catalog = None;
            self.recommender = None;
            dropped = true;
        }
        if is_stale(&self.recommender, &self.model_path) {
            info!(path = %self.model_path.display(), "tf-idf artifact changed on disk");
            self.recommender = None;
            dropped = true;
        }
        dropped
    }
}

fn is_stale<T>(slot: &Option<Slot<T>>, path: &Path) -> bool {
    match slot {
        Some(slot) => FileStamp::of(path).map_or(true, |stamp| stamp != slot.stamp),
        None => false,
    }
}
