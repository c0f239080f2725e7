//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod devices;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use pineapple_pos_core::{Category, CategoryId, Product, ProductId};
use pineapple_pos_engine::catalog::CatalogFile;
use pineapple_pos_engine::db::{self, ProductRepository, RepositoryError};
use pineapple_pos_engine::{
    CatalogMode, CatalogStore, EngineConfig, EngineError, PageAccumulator, ProductQueryService,
    QueryParams, TracingNotifier,
};

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Neither a catalog file nor a database is configured.
    #[error("No catalog available: pass --catalog <file> or set POS_DATABASE_URL")]
    NoCatalog,

    /// The command needs the in-memory catalog.
    #[error("{0} requires a catalog file or POS_CATALOG_MODE=simple")]
    SimpleModeOnly(&'static str),

    /// Catalog file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Catalog file is not valid YAML/JSON.
    #[error("Invalid catalog file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Output file could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Cart snapshot could not be encoded.
    #[error("Failed to encode cart snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    /// A command argument could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<RepositoryError> for CommandError {
    fn from(e: RepositoryError) -> Self {
        Self::Engine(EngineError::Database(e))
    }
}

/// Where catalog data comes from for this invocation.
#[derive(Debug)]
pub enum CatalogBackend {
    /// Whole catalog held in memory.
    Memory(CatalogStore),
    /// Paginated queries against `PostgreSQL`.
    Database(ProductRepository),
}

impl CatalogBackend {
    /// Open the catalog named on the command line, falling back to the
    /// configured database.
    ///
    /// In simple mode the database catalog is loaded into memory once, page by
    /// page.
    pub async fn open(path: Option<&Path>, config: &EngineConfig) -> Result<Self, CommandError> {
        if let Some(path) = path {
            return load_file(path).await.map(Self::Memory);
        }

        let Some(database_url) = &config.database_url else {
            return Err(CommandError::NoCatalog);
        };

        let pool = db::create_pool(database_url)
            .await
            .map_err(RepositoryError::from)?;
        tracing::info!("Database pool created");
        let repository = ProductRepository::new(pool);

        match config.catalog_mode {
            CatalogMode::Paginated => Ok(Self::Database(repository)),
            CatalogMode::Simple => load_all(repository, config.page_size)
                .await
                .map(Self::Memory),
        }
    }

    /// Look up one product by id.
    pub async fn product(&self, id: &ProductId) -> Result<Option<Product>, CommandError> {
        match self {
            Self::Memory(store) => Ok(store.product(id).cloned()),
            Self::Database(repository) => Ok(repository.get_by_id(id).await?),
        }
    }
}

async fn load_file(path: &Path) -> Result<CatalogStore, CommandError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    // YAML is a superset of JSON, so one parser covers both formats
    let file: CatalogFile = serde_yaml::from_str(&content).map_err(|source| CommandError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        categories = file.categories.len(),
        products = file.products.len(),
        "Loaded catalog file"
    );
    Ok(file.into())
}

async fn load_all(repository: ProductRepository, page_size: u32) -> Result<CatalogStore, CommandError> {
    let service = ProductQueryService::new(repository, Arc::new(TracingNotifier));
    let mut accumulator = PageAccumulator::new();
    let mut params = Some(QueryParams {
        limit: page_size,
        ..QueryParams::default()
    });

    while let Some(current) = params {
        let page = service
            .get_products_paginated(&current)
            .await
            .map_err(EngineError::from)?;
        accumulator.apply(&current, page);
        params = accumulator.next_params();
    }

    let products = accumulator.items().to_vec();
    let categories = derived_categories(&products);
    tracing::info!(products = products.len(), "Loaded database catalog into memory");
    Ok(CatalogStore::new(categories, products))
}

/// The database has no taxonomy table, so categories are named after their ids.
fn derived_categories(products: &[Product]) -> Vec<Category> {
    let mut ids: Vec<&CategoryId> = products.iter().map(|p| &p.category).collect();
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids.dedup();

    ids.into_iter()
        .map(|id| Category {
            id: id.clone(),
            name: id.as_str().to_string(),
            icon: String::new(),
        })
        .collect()
}
