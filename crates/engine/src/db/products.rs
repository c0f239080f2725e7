//! Product repository for paginated catalog queries.
//!
//! Queries are assembled at runtime with `QueryBuilder` because the filter
//! set varies per request.

use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use pineapple_pos_core::{Badge, CategoryId, Product, ProductId, VariantOptions};

use super::RepositoryError;
use crate::catalog::{SearchTerm, is_category_filter};
use crate::query::{ProductSource, QueryPage, QueryParams, SortBy, SortOrder};

/// Repository over `pos.products`.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row cannot be decoded.
    pub async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM pos.products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(product_from_row)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid product row {id}: {e}")))
    }

    /// Count products matching the filters.
    async fn count(&self, params: &QueryParams) -> Result<u64, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM pos.products");
        push_filters(&mut qb, params);

        let total: i64 = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}

impl ProductSource for ProductRepository {
    #[instrument(skip(self))]
    async fn fetch_page(&self, params: &QueryParams) -> Result<QueryPage, RepositoryError> {
        let total_count = self.count(params).await?;

        let mut qb = select_page(params);
        let rows = qb.build().fetch_all(&self.pool).await?;

        let items = rows
            .iter()
            .filter_map(|row| match product_from_row(row) {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping undecodable product row");
                    None
                }
            })
            .collect();

        Ok(QueryPage::new(items, params, total_count))
    }
}

/// Build the page query: filters, deterministic ordering, limit and offset.
fn select_page(params: &QueryParams) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM pos.products");
    push_filters(&mut qb, params);

    let direction = match params.sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    // Byte-order collation keeps page boundaries identical to the in-memory sort
    match params.sort_by {
        SortBy::Name => {
            qb.push(format!(
                " ORDER BY lower(name) COLLATE \"C\" {direction}, id COLLATE \"C\" ASC"
            ));
        }
        SortBy::Price => {
            qb.push(format!(" ORDER BY price {direction}, id COLLATE \"C\" ASC"));
        }
        SortBy::Category => {
            qb.push(format!(
                " ORDER BY category COLLATE \"C\" {direction}, id COLLATE \"C\" ASC"
            ));
        }
        SortBy::Id => {
            qb.push(format!(" ORDER BY id COLLATE \"C\" {direction}"));
        }
    }

    qb.push(" LIMIT ")
        .push_bind(i64::from(params.limit))
        .push(" OFFSET ")
        .push_bind(i64::try_from(params.offset()).unwrap_or(i64::MAX));
    qb
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &QueryParams) {
    qb.push(" WHERE TRUE");

    if let Some(category) = params.category.as_ref()
        && is_category_filter(Some(category))
    {
        qb.push(" AND category = ")
            .push_bind(category.as_str().to_owned());
    }

    if let Some(term) = params.query.as_deref().and_then(SearchTerm::parse) {
        let pattern = format!("%{}%", escape_like(term.as_str()));
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR COALESCE(brand, '') ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR category ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Read an optional column, treating a column the schema lacks as NULL.
fn optional_column<'r, T>(row: &'r PgRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    match row.try_get::<Option<T>, _>(column) {
        Ok(value) => Ok(value),
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    let id: ProductId = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let category: CategoryId = row.try_get("category")?;
    let price: Decimal = row.try_get("price")?;

    let badge = optional_column::<String>(row, "badge")?.and_then(|raw| {
        raw.parse::<Badge>()
            .map_err(|e| tracing::warn!(product_id = %id, error = %e, "Ignoring unknown badge"))
            .ok()
    });

    let variants = optional_column::<serde_json::Value>(row, "variants")?.and_then(|raw| {
        serde_json::from_value::<VariantOptions>(raw)
            .map_err(|e| tracing::warn!(product_id = %id, error = %e, "Ignoring unparseable variants"))
            .ok()
    });

    Ok(Product {
        name,
        category,
        price,
        image: optional_column(row, "image")?,
        description: optional_column(row, "description")?.unwrap_or_default(),
        brand: optional_column(row, "brand")?,
        barcode: optional_column(row, "barcode")?,
        reorder_threshold: optional_column(row, "reorder_threshold")?,
        badge,
        variants,
        id,
    })
}
