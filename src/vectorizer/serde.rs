use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{Error, Result},
    utils::math::vector::Weight,
    vectorizer::{
        analyzer::Analyzer,
        tfidf::{TFIDFEngine, TFIDFOptions},
        vocabulary::Vocabulary,
        CorpusStamp, TFIDFVectorizer,
    },
};

/// Artifact layout written by this build
pub const ARTIFACT_VERSION: u32 = 1;

/// Serializable form of a fitted `TFIDFVectorizer`.
/// Holds everything needed to vectorize queries without the training texts.
/// Convert back with `into_tf_idf_vectorizer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TFIDFData {
    pub version: u32,
    pub analyzer: Analyzer,
    pub options: TFIDFOptions,
    /// terms in column order
    pub vocabulary: Vec<String>,
    /// one weight per vocabulary term
    pub idf: Vec<f64>,
    pub corpus_stamp: CorpusStamp,
}

impl TFIDFData {
    /// Rebuild the vectorizer.
    /// Fails on an unknown artifact version or an inconsistent vocabulary.
    pub fn into_tf_idf_vectorizer<N, E>(self) -> Result<TFIDFVectorizer<N, E>>
    where
        N: Weight,
        E: TFIDFEngine<N> + Send + Sync,
    {
        if self.version != ARTIFACT_VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: ARTIFACT_VERSION,
            });
        }
        self.options.validate()?;
        let vocabulary = Vocabulary::new(self.vocabulary, self.idf)?;
        Ok(TFIDFVectorizer::from_vocabulary(
            vocabulary,
            self.analyzer,
            self.options,
            self.corpus_stamp,
        ))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_cbor::from_reader(reader)?)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_cbor::to_writer(writer, self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush().map_err(io_err)?;
        info!(path = %path.display(), columns = self.vocabulary.len(), "saved tf-idf artifact");
        Ok(())
    }
}

impl<N, E> From<&TFIDFVectorizer<N, E>> for TFIDFData
where
    N: Weight,
    E: TFIDFEngine<N>,
{
    fn from(vectorizer: &TFIDFVectorizer<N, E>) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            analyzer: vectorizer.analyzer,
            options: vectorizer.options.clone(),
            vocabulary: vectorizer.vocabulary.terms().map(str::to_owned).collect(),
            idf: vectorizer.vocabulary.idf_vec().to_vec(),
            corpus_stamp: vectorizer.corpus_stamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> TFIDFVectorizer<f32> {
        TFIDFVectorizer::fit(
            &["senior rust engineer", "python data analyst", "rust backend"],
            Analyzer::default(),
            TFIDFOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn restored_vectorizer_transforms_identically() {
        let original = fitted();
        let mut bytes = Vec::new();
        TFIDFData::from(&original).to_writer(&mut bytes).unwrap();

        let restored: TFIDFVectorizer<f32> = TFIDFData::from_reader(bytes.as_slice())
            .unwrap()
            .into_tf_idf_vectorizer()
            .unwrap();
        assert_eq!(restored.fingerprint(), original.fingerprint());
        assert_eq!(restored.corpus_stamp, original.corpus_stamp);
        assert_eq!(restored.transform("rust data"), original.transform("rust data"));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut data = TFIDFData::from(&fitted());
        data.version = ARTIFACT_VERSION + 1;
        assert!(matches!(
            data.into_tf_idf_vectorizer::<f32, crate::vectorizer::tfidf::DefaultTFIDFEngine>(),
            Err(Error::UnsupportedVersion { found: 2, expected: 1 })
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            TFIDFData::from_reader(&b"not cbor at all"[..]),
            Err(Error::Artifact(_))
        ));
    }

    #[test]
    fn save_and_load_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.cbor");
        let data = TFIDFData::from(&fitted());
        data.save(&path).unwrap();
        assert_eq!(TFIDFData::load(&path).unwrap(), data);
        assert!(matches!(
            TFIDFData::load(dir.path().join("missing.cbor")),
            Err(Error::Io { .. })
        ));
    }
}
