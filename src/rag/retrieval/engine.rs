// Constrained retrieval: over-fetch nearest neighbours, then drop excluded products
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::errors::{GlowError, Result};
use crate::rag::index::ProductIndex;
use crate::types::ProductRecord;

/// Candidates fetched per requested result before exclusion filtering
pub const OVERFETCH_FACTOR: usize = 4;

/// One retrieval request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalQuery {
    pub text: String,
    /// Maximum number of results
    pub k: usize,
    /// Ingredient substrings to exclude (case-insensitive)
    pub exclusions: Vec<String>,
}

impl RetrievalQuery {
    pub fn new(text: impl Into<String>, k: usize) -> Self {
        Self {
            text: text.into(),
            k,
            exclusions: Vec::new(),
        }
    }

    pub fn excluding<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = terms.into_iter().map(Into::into).collect();
        self
    }

    fn lowered_exclusions(&self) -> Vec<String> {
        self.exclusions
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Retriever enforcing ingredient exclusions on top of similarity search
#[derive(Clone)]
pub struct ConstrainedRetriever {
    index: Arc<dyn ProductIndex>,
    overfetch_factor: usize,
}

impl ConstrainedRetriever {
    pub fn new(index: Arc<dyn ProductIndex>) -> Self {
        Self::with_overfetch(index, OVERFETCH_FACTOR)
    }

    pub fn with_overfetch(index: Arc<dyn ProductIndex>, overfetch_factor: usize) -> Self {
        Self {
            index,
            overfetch_factor: overfetch_factor.max(1),
        }
    }

    pub fn overfetch_factor(&self) -> usize {
        self.overfetch_factor
    }

    /// Top-`k` products by similarity whose ingredients contain none of the
    /// excluded terms. May return fewer than `k`; never backfills.
    pub fn search(&self, query: &RetrievalQuery) -> Result<Vec<ProductRecord>> {
        if query.k == 0 {
            return Ok(Vec::new());
        }

        let vector = self
            .index
            .embed(&query.text)
            .map_err(|e| GlowError::Retrieval(format!("Failed to embed query: {}", e)))?;

        let exclusions = query.lowered_exclusions();
        if exclusions.is_empty() {
            let hits = self.index.nearest(&vector, query.k)?;
            return Ok(hits.into_iter().map(|hit| hit.product).collect());
        }

        let fetch_k = query.k.saturating_mul(self.overfetch_factor);
        let candidates = self.index.nearest(&vector, fetch_k)?;
        let fetched = candidates.len();

        let mut accepted = Vec::with_capacity(query.k);
        for candidate in candidates {
            if candidate.product.contains_any_ingredient(&exclusions) {
                continue;
            }
            accepted.push(candidate.product);
            if accepted.len() >= query.k {
                break;
            }
        }

        debug!(
            query = %query.text,
            fetched,
            accepted = accepted.len(),
            requested = query.k,
            "Constrained retrieval"
        );

        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::rag::index::CatalogIndex;

    fn retriever(records: Vec<ProductRecord>) -> ConstrainedRetriever {
        let index = CatalogIndex::build(records, Arc::new(HashingEmbedder::new())).unwrap();
        ConstrainedRetriever::new(Arc::new(index))
    }

    fn scenario_catalog() -> Vec<ProductRecord> {
        vec![
            ProductRecord::new("Gentle Foam", "cleanser", "22€", "aloe, chamomile"),
            ProductRecord::new("Retinol Renew", "serum", "55€", "retinol, parabens"),
        ]
    }

    #[test]
    fn test_excluded_product_is_dropped() {
        let retriever = retriever(scenario_catalog());
        let query = RetrievalQuery::new("serum", 2).excluding(["parabens"]);

        let results = retriever.search(&query).unwrap();
        assert!(results.len() <= 1);
        assert!(results.iter().all(|p| p.name != "Retinol Renew"));
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        let retriever = retriever(scenario_catalog());
        let query = RetrievalQuery::new("serum", 2).excluding(["PARABENS"]);
        let results = retriever.search(&query).unwrap();
        assert!(results.iter().all(|p| p.name != "Retinol Renew"));
    }

    #[test]
    fn test_empty_exclusions_return_raw_neighbours() {
        let retriever = retriever(scenario_catalog());
        let results = retriever.search(&RetrievalQuery::new("serum", 2)).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Retinol Renew");
    }

    #[test]
    fn test_blank_exclusions_take_fast_path() {
        let retriever = retriever(scenario_catalog());
        let query = RetrievalQuery::new("serum", 2).excluding(["", "  "]);
        assert_eq!(retriever.search(&query).unwrap().len(), 2);
    }

    #[test]
    fn test_zero_k_returns_nothing() {
        let retriever = retriever(scenario_catalog());
        assert!(retriever.search(&RetrievalQuery::new("serum", 0)).unwrap().is_empty());
    }

    #[test]
    fn test_short_result_is_not_backfilled() {
        let retriever = retriever(scenario_catalog());
        let query = RetrievalQuery::new("cleanser serum", 2).excluding(["aloe", "parabens"]);
        assert!(retriever.search(&query).unwrap().is_empty());
    }

    #[test]
    fn test_overfetch_window_limits_candidates() {
        // With factor 1 only the top-k candidates are inspected
        let records = vec![
            ProductRecord::new("Serum A", "serum", "10€", "parabens"),
            ProductRecord::new("Toner B", "toner", "12€", "rose water"),
        ];
        let index = CatalogIndex::build(records, Arc::new(HashingEmbedder::new())).unwrap();
        let narrow = ConstrainedRetriever::with_overfetch(Arc::new(index), 1);

        let query = RetrievalQuery::new("serum", 1).excluding(["parabens"]);
        assert!(narrow.search(&query).unwrap().is_empty());
        assert_eq!(narrow.overfetch_factor(), 1);
    }

    #[test]
    fn test_default_overfetch_finds_survivor() {
        let records = vec![
            ProductRecord::new("Serum A", "serum", "10€", "parabens"),
            ProductRecord::new("Toner B", "toner", "12€", "rose water"),
        ];
        let retriever = retriever(records);
        let query = RetrievalQuery::new("serum", 1).excluding(["parabens"]);
        let results = retriever.search(&query).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Toner B");
    }
}
