use std::{fs::File, io::Read, path::Path};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Columns a job catalog must provide
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Cleaned Job Title",
    "Category",
    "country",
    "average_hourly_rate",
    "link",
    "job_description",
];

/// One job listing. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobPosting {
    #[serde(rename = "Cleaned Job Title")]
    pub title: String,
    #[serde(rename = "Category")]
    pub category: String,
    pub country: String,
    /// blank, non-numeric or non-finite cells load as `None`
    #[serde(rename = "average_hourly_rate", deserialize_with = "finite_rate")]
    pub hourly_rate: Option<f64>,
    pub link: String,
    #[serde(rename = "job_description")]
    pub description: String,
}

// `NaN` and `inf` parse as f64 but count as missing
fn finite_rate<'de, D>(de: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let rate: Option<f64> = csv::invalid_option(de)?;
    Ok(rate.filter(|rate| rate.is_finite()))
}

/// Headline numbers for the home view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogStats {
    pub total_jobs: usize,
    pub categories: usize,
    pub countries: usize,
    /// mean over postings with a rate, 0.0 when none has one
    pub mean_hourly_rate: f64,
}

/// Ordered job postings.
/// Row `i` of a document-term matrix built from `descriptions()` is `postings()[i]`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    postings: Vec<JobPosting>,
    skipped: usize,
}

impl Catalog {
    pub fn new(postings: Vec<JobPosting>) -> Self {
        let total = postings.len();
        let postings: Vec<JobPosting> = postings
            .into_iter()
            .filter(|posting| !posting.description.trim().is_empty())
            .collect();
        let skipped = total - postings.len();
        if skipped > 0 {
            warn!(skipped, "excluded postings without a description");
        }
        Self { postings, skipped }
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            postings = catalog.len(),
            skipped = catalog.skipped(),
            "loaded job catalog"
        );
        Ok(catalog)
    }

    /// Read CSV with a header row. Extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().from_reader(reader);
        let headers = reader.headers()?.clone();
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .copied()
            .find(|column| !headers.iter().any(|header| header == *column))
        {
            return Err(Error::MissingColumn(missing.to_string()));
        }

        let postings = reader
            .deserialize()
            .collect::<std::result::Result<Vec<JobPosting>, csv::Error>>()?;
        Ok(Self::new(postings))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Rows dropped for an empty description
    #[inline]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[inline]
    pub fn get(&self, row: usize) -> Option<&JobPosting> {
        self.postings.get(row)
    }

    pub fn postings(&self) -> &[JobPosting] {
        &self.postings
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.postings.iter().map(|posting| posting.description.as_str()).collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let categories: IndexSet<&str> = self
            .postings
            .iter()
            .map(|posting| posting.category.trim())
            .filter(|category| !category.is_empty())
            .collect();
        let countries: IndexSet<&str> = self
            .postings
            .iter()
            .map(|posting| posting.country.trim())
            .filter(|country| !country.is_empty())
            .collect();
        let (sum, count) = self
            .postings
            .iter()
            .filter_map(|posting| posting.hourly_rate)
            .fold((0.0, 0usize), |(sum, count), rate| (sum + rate, count + 1));

        CatalogStats {
            total_jobs: self.postings.len(),
            categories: categories.len(),
            countries: countries.len(),
            mean_hourly_rate: if count == 0 { 0.0 } else { sum / count as f64 },
        }
    }

    /// Most frequent categories, ties in order of first appearance
    pub fn category_counts(&self, limit: usize) -> Vec<(String, usize)> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for posting in &self.postings {
            let category = posting.category.trim();
            if !category.is_empty() {
                *counts.entry(category).or_insert(0) += 1;
            }
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(limit);
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Cleaned Job Title,Category,country,average_hourly_rate,link,job_description,extra
Data Scientist,Data,India,40,https://a.example,python machine learning,x
Backend Engineer,Software,USA,,https://b.example,rust services,x
Analyst,Data,India,n/a,https://c.example,   ,x
Java Developer,Software,Germany,20,https://d.example,java spring,x
Designer,Design,USA,30,https://e.example,figma ui,x
";

    #[test]
    fn loads_and_excludes_empty_descriptions() {
        let catalog = Catalog::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.skipped(), 1);
        assert_eq!(catalog.get(1).map(|p| p.title.as_str()), Some("Backend Engineer"));
        assert_eq!(catalog.get(1).and_then(|p| p.hourly_rate), None);
        assert_eq!(catalog.descriptions()[3], "figma ui");
    }

    #[test]
    fn stats_skip_missing_rates() {
        let stats = Catalog::from_reader(CSV.as_bytes()).unwrap().stats();
        assert_eq!(stats.total_jobs, 4);
        assert_eq!(stats.categories, 3);
        assert_eq!(stats.countries, 3);
        assert!((stats.mean_hourly_rate - 30.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_rates_count_as_missing() {
        let csv = "\
Cleaned Job Title,Category,country,average_hourly_rate,link,job_description
A,Data,India,40,https://a.example,python
B,Data,India,NaN,https://b.example,rust
C,Data,India,inf,https://c.example,java
D,Data,India,-infinity,https://d.example,sql
";
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 4);
        let rates: Vec<Option<f64>> = catalog.postings().iter().map(|p| p.hourly_rate).collect();
        assert_eq!(rates, vec![Some(40.0), None, None, None]);
        assert_eq!(catalog.stats().mean_hourly_rate, 40.0);
    }

    #[test]
    fn empty_catalog_has_zero_mean() {
        let stats = Catalog::default().stats();
        assert_eq!(stats.total_jobs, 0);
        assert_eq!(stats.mean_hourly_rate, 0.0);
    }

    #[test]
    fn category_counts_order_by_frequency_then_appearance() {
        let catalog = Catalog::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(
            catalog.category_counts(10),
            vec![
                ("Software".to_string(), 2),
                ("Data".to_string(), 1),
                ("Design".to_string(), 1),
            ]
        );
        assert_eq!(catalog.category_counts(1), vec![("Software".to_string(), 2)]);
    }

    #[test]
    fn missing_column_is_named() {
        let csv = "Cleaned Job Title,Category,country,link,job_description\nA,B,C,D,E\n";
        assert!(matches!(
            Catalog::from_reader(csv.as_bytes()),
            Err(Error::MissingColumn(column)) if column == "average_hourly_rate"
        ));
    }
}
