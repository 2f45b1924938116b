//! Catalog import and listing.
//!
//! # File Format
//!
//! ```yaml
//! works:
//!   - title: Blue vase
//!     description: Hand-thrown stoneware
//!     price: "120.00"
//!     image: vase.jpg
//!   - title: Tea bowl
//!     price: "45,50"
//! ```
//!
//! Prices are strings and go through the same validation as the API. The
//! whole file is validated before the database is touched, and the works are
//! inserted in a single transaction.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use atelier_shop::models::{NewWork, WorkInput};
use atelier_shop::services::CatalogService;

use super::{CommandError, store};

/// Top-level shape of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    works: Vec<WorkInput>,
}

/// Parse a catalog file and report every invalid entry.
fn parse_catalog(content: &str) -> Result<Vec<WorkInput>, CommandError> {
    let catalog: CatalogFile = serde_yaml::from_str(content)?;

    let errors: Vec<String> = catalog
        .works
        .iter()
        .enumerate()
        .filter_map(|(index, input)| {
            NewWork::parse(input.clone())
                .err()
                .map(|e| format!("entry {} ({:?}): {e}", index + 1, input.title))
        })
        .collect();

    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::InvalidCatalog(errors.len()));
    }

    Ok(catalog.works)
}

/// Import works from a YAML file.
///
/// # Errors
///
/// Returns `CommandError` if the file cannot be read, any entry is invalid,
/// or the database rejects the batch.
pub async fn import(path: &Path, dry_run: bool) -> Result<(), CommandError> {
    info!(path = %path.display(), "Loading catalog from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let works = parse_catalog(&content)?;
    info!(works = works.len(), "Catalog validated");

    if dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let store = store().await?;
    let imported = CatalogService::new(&store).import_works(works).await?;
    for work in &imported {
        info!(work_id = %work.id, title = %work.title, price = %work.price, "Imported");
    }

    info!("Import complete!");
    Ok(())
}

/// Log every work in the catalog.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable.
pub async fn list() -> Result<(), CommandError> {
    let store = store().await?;
    let works = CatalogService::new(&store).list_works().await?;

    info!("Catalog ({} works)", works.len());
    for work in works {
        info!(
            "  {:>6}  {:>10}  {}",
            work.id.to_string(),
            work.price.to_string(),
            work.title
        );
    }
    Ok(())
}
