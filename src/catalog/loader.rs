use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::{GlowError, Result};
use crate::types::ProductRecord;

/// Columns every catalog must provide
pub const REQUIRED_COLUMNS: [&str; 4] = ["product_type", "product_name", "price", "ingredients"];

const URL_COLUMN: &str = "product_url";

/// Load the catalog CSV at `path`
pub fn load_catalog(path: &Path) -> Result<Vec<ProductRecord>> {
    if !path.exists() {
        return Err(GlowError::IndexBuild(format!(
            "Catalog file not found: {}",
            path.display()
        )));
    }

    let file = std::fs::File::open(path).map_err(|e| {
        GlowError::IndexBuild(format!("Failed to open catalog {}: {}", path.display(), e))
    })?;

    let records = parse_catalog(file)?;
    info!(path = %path.display(), products = records.len(), "Catalog loaded");
    Ok(records)
}

/// Parse catalog rows from any reader
pub fn parse_catalog<R: Read>(source: R) -> Result<Vec<ProductRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| GlowError::IndexBuild(format!("Failed to read catalog header: {}", e)))?
        .clone();

    let column = |name: &str| headers.iter().position(|h| h == name);

    let mut required = [0usize; 4];
    for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = column(name).ok_or_else(|| {
            GlowError::IndexBuild(format!("Catalog is missing required column '{}'", name))
        })?;
    }
    let [type_idx, name_idx, price_idx, ingredients_idx] = required;
    let url_idx = column(URL_COLUMN);
    if url_idx.is_none() {
        debug!("Catalog has no '{}' column, urls left empty", URL_COLUMN);
    }

    let mut records = Vec::new();
    for (row_number, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            GlowError::IndexBuild(format!("Malformed catalog row {}: {}", row_number + 1, e))
        })?;

        let field = |idx: usize| row.get(idx).unwrap_or_default().to_string();

        let url = url_idx
            .and_then(|idx| row.get(idx))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        records.push(ProductRecord {
            name: field(name_idx),
            category: field(type_idx),
            price: field(price_idx),
            ingredient_text: field(ingredients_idx),
            url,
        });
    }

    if records.is_empty() {
        return Err(GlowError::IndexBuild(
            "Catalog contains no products".to_string(),
        ));
    }

    Ok(records)
}
