//! Catalog management.

use tracing::instrument;

use atelier_core::WorkId;

use super::ServiceError;
use crate::db::CatalogRepository;
use crate::models::{NewWork, Work, WorkInput};

/// Catalog operations over a [`CatalogRepository`].
#[derive(Debug)]
pub struct CatalogService<'a, R> {
    repo: &'a R,
}

impl<'a, R: CatalogRepository> CatalogService<'a, R> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Validate and add a work to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank title or malformed price.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_work(&self, input: WorkInput) -> Result<Work, ServiceError> {
        let work = NewWork::parse(input)?;
        let created = self.repo.create_work(&work).await?;
        tracing::info!(work_id = %created.id, price = %created.price, "work created");
        Ok(created)
    }

    /// Validate a batch of works and add them in one atomic write.
    ///
    /// Nothing is stored unless every entry is valid.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` naming the first invalid entry.
    #[instrument(skip(self, inputs), fields(works = inputs.len()))]
    pub async fn import_works(&self, inputs: Vec<WorkInput>) -> Result<Vec<Work>, ServiceError> {
        let works = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                NewWork::parse(input)
                    .map_err(|e| ServiceError::Validation(format!("entry {}: {e}", index + 1)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let created = self.repo.create_works(&works).await?;
        tracing::info!(works = created.len(), "works imported");
        Ok(created)
    }

    /// Fetch one work.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the work does not exist.
    pub async fn get_work(&self, id: WorkId) -> Result<Work, ServiceError> {
        self.repo
            .get_work(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format_args!("work {id}")))
    }

    /// All works, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    pub async fn list_works(&self) -> Result<Vec<Work>, ServiceError> {
        Ok(self.repo.list_works().await?)
    }

    /// Validate and replace a work's fields.
    ///
    /// Placed orders keep the price they were placed at; open carts see the new
    /// price.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad input and
    /// `ServiceError::NotFound` if the work does not exist.
    #[instrument(skip(self, input), fields(work_id = %id))]
    pub async fn update_work(&self, id: WorkId, input: WorkInput) -> Result<Work, ServiceError> {
        let work = NewWork::parse(input)?;
        match self.repo.update_work(id, &work).await {
            Ok(updated) => {
                tracing::info!(price = %updated.price, "work updated");
                Ok(updated)
            }
            Err(crate::db::RepositoryError::NotFound) => {
                Err(ServiceError::not_found(format_args!("work {id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a work from the catalog and from every cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the work does not exist and
    /// `ServiceError::Integrity` if placed orders reference it.
    #[instrument(skip(self), fields(work_id = %id))]
    pub async fn delete_work(&self, id: WorkId) -> Result<(), ServiceError> {
        match self.repo.delete_work(id).await {
            Ok(true) => {
                tracing::info!("work deleted");
                Ok(())
            }
            Ok(false) => Err(ServiceError::not_found(format_args!("work {id}"))),
            Err(e) => {
                tracing::warn!(error = %e, "work delete rejected");
                Err(e.into())
            }
        }
    }
}
