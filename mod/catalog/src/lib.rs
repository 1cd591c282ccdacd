//! Catalog module — organization-scoped, three-level service catalog.
//!
//! # Resources
//!
//! - **LifeSituation** — top-level catalog node, identified as `{org}.{k}`
//! - **Service** — child of a LifeSituation, identified as `{parent}.{k}`
//! - **Process** — child of a Service, identified as `{parent}.{k}`,
//!   with an embedded ProcessData sub-record
//!
//! Identifiers are allocated server-side from per-scope counters; client
//! supplied identifiers are discarded. Each operation (list/retrieve/
//! create/update) serializes through its own projection, and the schema
//! of every registered projection can be introspected for client-side
//! form generation.
//!
//! # Usage
//!
//! ```ignore
//! use catalog::CatalogModule;
//!
//! let module = CatalogModule::new(sql)?;
//! let router = module.routes(); // Mount under /catalog
//! ```

pub mod api;
pub mod model;
pub mod projection;
pub mod service;

use std::sync::Arc;

use axum::Router;

use svcreg_core::Module;

use crate::service::CatalogService;

/// Catalog module implementing the Module trait.
///
/// Holds the CatalogService and provides HTTP routes for all catalog
/// endpoints.
pub struct CatalogModule {
    service: Arc<CatalogService>,
}

impl CatalogModule {
    /// Create a new CatalogModule.
    pub fn new(
        sql: Arc<dyn svcreg_sql::SQLStore>,
    ) -> Result<Self, svcreg_core::ServiceError> {
        let service = CatalogService::new(sql).map_err(svcreg_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying CatalogService.
    pub fn service(&self) -> &Arc<CatalogService> {
        &self.service
    }
}

impl Module for CatalogModule {
    fn name(&self) -> &str {
        "catalog"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
