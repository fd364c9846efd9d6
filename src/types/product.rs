//! Catalog product records

use serde::{Deserialize, Serialize};

/// One product from the catalog. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    /// Product type as listed in the catalog (cleanser, serum, cream, mask, ...)
    pub category: String,
    /// Display price, kept verbatim (e.g. "24€")
    pub price: String,
    /// Free-form ingredient list, used for embedding and exclusion matching
    pub ingredient_text: String,
    pub url: Option<String>,
}

impl ProductRecord {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: impl Into<String>,
        ingredient_text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price: price.into(),
            ingredient_text: ingredient_text.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Descriptive text fed to the embedder
    pub fn descriptive_text(&self) -> String {
        format!(
            "Type: {}. Name: {}. Price: {}. Ingredients: {}.",
            self.category, self.name, self.price, self.ingredient_text
        )
    }

    /// Case-insensitive substring test against any of the (already lowercased)
    /// excluded terms. "oil" matches "patchouli oil" and "soil" alike.
    pub fn contains_any_ingredient(&self, lowered_terms: &[String]) -> bool {
        let ingredients = self.ingredient_text.to_lowercase();
        lowered_terms
            .iter()
            .any(|term| ingredients.contains(term.as_str()))
    }
}
