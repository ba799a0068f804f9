//! Catalog fetching.
//!
//! Pages are requested in order until a short page arrives. Any page error
//! aborts the whole fetch: a partial catalog is never returned.

use retainer_core::Catalog;

use crate::error::RegistryError;
use crate::registry::PackageRegistry;

/// Largest page size the GitHub API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Upper bound on pages requested before giving up.
pub const MAX_PAGES: u32 = 10_000;

/// Fetches every version of the package into one deduplicated catalog.
///
/// `page_size` is clamped to `1..=`[`MAX_PAGE_SIZE`].
///
/// # Errors
///
/// Returns the first page error, or [`RegistryError::PaginationLimit`] if the
/// registry never returns a short page.
pub async fn fetch_catalog<R>(registry: &R, page_size: u32) -> Result<Catalog, RegistryError>
where
    R: PackageRegistry + ?Sized,
{
    let per_page = page_size.clamp(1, MAX_PAGE_SIZE);
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        let batch = registry.list_versions(page, per_page).await?;
        let received = batch.len();
        records.extend(batch);

        tracing::debug!(page, received, "fetched version page");

        if received < per_page as usize {
            break;
        }
        if page >= MAX_PAGES {
            return Err(RegistryError::PaginationLimit { pages: page });
        }
        page += 1;
    }

    let catalog = Catalog::from_records(records);
    tracing::info!(versions = catalog.len(), pages = page, "fetched version catalog");

    Ok(catalog)
}
