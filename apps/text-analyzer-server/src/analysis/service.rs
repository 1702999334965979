//! Analyzer service
//!
//! Metrics are computed once when an analyzer is created. Reads resolve the
//! stored analyzer through a read-through [`TtlCache`]; writes made directly
//! on the repository are not seen until the cached entry expires, while
//! [`AnalyzerService::update`] and [`AnalyzerService::delete`] drop it.

use chrono::Utc;

use super::cache::TtlCache;
use super::metrics::TextMetrics;
use crate::config::CacheConfig;
use crate::db::{Analyzer, AnalyzerRepository, CreateAnalyzer, DeleteResult, UpdateAnalyzer, UpdateResult};
use crate::error::{AppError, Result};

pub struct AnalyzerService {
    repo: AnalyzerRepository,
    cache: TtlCache<String, Analyzer>,
}

impl AnalyzerService {
    pub fn new(repo: AnalyzerRepository, cache: CacheConfig) -> Self {
        Self {
            repo,
            cache: TtlCache::new(cache),
        }
    }

    /// Underlying repository
    pub fn repository(&self) -> &AnalyzerRepository {
        &self.repo
    }

    /// Analyze `data.content` and store the result
    #[tracing::instrument(skip_all)]
    pub async fn create(&self, data: CreateAnalyzer) -> Result<Analyzer> {
        let metrics = TextMetrics::compute(&data.content);
        let now = Utc::now();

        let analyzer = self
            .repo
            .create(&Analyzer {
                id: None,
                content: data.content,
                metrics,
                created_by: data.created_by,
                updated_by: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(id = ?analyzer.id, words = analyzer.metrics.words_count, "Analyzer created");
        Ok(analyzer)
    }

    pub async fn get_words_count(&self, analyzer_id: &str) -> Result<u64> {
        Ok(self.get(analyzer_id).await?.metrics.words_count)
    }

    pub async fn get_characters_count(&self, analyzer_id: &str) -> Result<u64> {
        Ok(self.get(analyzer_id).await?.metrics.characters_count)
    }

    pub async fn get_sentences_count(&self, analyzer_id: &str) -> Result<u64> {
        Ok(self.get(analyzer_id).await?.metrics.sentences_count)
    }

    pub async fn get_paragraphs_count(&self, analyzer_id: &str) -> Result<u64> {
        Ok(self.get(analyzer_id).await?.metrics.paragraphs_count)
    }

    pub async fn get_longest_word(&self, analyzer_id: &str) -> Result<String> {
        Ok(self.get(analyzer_id).await?.metrics.longest_word)
    }

    /// Patch an analyzer and drop its cached copy. Metrics are not recomputed.
    pub async fn update(&self, analyzer_id: &str, patch: &UpdateAnalyzer) -> Result<UpdateResult> {
        let result = self.repo.update(analyzer_id, patch).await?;
        self.cache.invalidate(&analyzer_id.to_string());
        Ok(result)
    }

    /// Delete an analyzer and drop its cached copy
    pub async fn delete(&self, analyzer_id: &str) -> Result<DeleteResult> {
        let result = self.repo.delete(analyzer_id).await?;
        self.cache.invalidate(&analyzer_id.to_string());
        Ok(result)
    }

    /// Resolve an analyzer from the cache or the repository
    async fn get(&self, analyzer_id: &str) -> Result<Analyzer> {
        let key = analyzer_id.to_string();
        if let Some(analyzer) = self.cache.get(&key) {
            tracing::debug!(analyzer_id, "Analyzer cache hit");
            return Ok(analyzer);
        }

        let analyzer = self
            .repo
            .get(analyzer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Analyzer not found".to_string()))?;

        self.cache.insert(key, analyzer.clone());
        Ok(analyzer)
    }
}
