//! Generic PostgreSQL storer.
//!
//! Each domain's `store` module implements [`PgTable`] (row type, column
//! list, binds and filter clause); [`PgStore`] turns that into SQL.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use ichor_core::{OrderBy, Page};
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::bus::{Domain, Entity, Storer};
use crate::sqldb::{StoreError, Target, Tx, WhereClause};

/// Row separator used by [`PgTable::bind_row`].
pub type RowBinds<'qb> = Separated<'qb, 'static, Postgres, &'static str>;

/// SQL mapping of a domain onto its table.
///
/// The first entry of [`PgTable::COLUMNS`] must be `id`, and `bind_row` must
/// push one bind per column in the same order.
pub trait PgTable: Domain {
    const COLUMNS: &'static [&'static str];

    type Row: for<'r> FromRow<'r, PgRow> + Into<Self::Entity> + Send + Unpin;

    fn bind_row(entity: &Self::Entity, row: &mut RowBinds<'_>);

    fn apply_filter(filter: &Self::Filter, clause: &mut WhereClause<'_>);

    /// SQL column for a business order field. Business order fields share
    /// their column's name, so the column list doubles as the allow-list.
    fn order_column(field: &str) -> Option<&'static str> {
        Self::COLUMNS.iter().copied().find(|c| *c == field)
    }
}

/// PostgreSQL implementation of [`Storer`].
pub struct PgStore<D: PgTable> {
    target: Target,
    _domain: PhantomData<fn() -> D>,
}

impl<D: PgTable> PgStore<D> {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            target: Target::Pool(pool),
            _domain: PhantomData,
        }
    }

    fn select() -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new(format!("SELECT {} FROM {}", D::COLUMNS.join(", "), D::TABLE))
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl<D: PgTable> Storer<D> for PgStore<D> {
    async fn create(&self, entity: &D::Entity) -> Result<(), StoreError> {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            D::TABLE,
            D::COLUMNS.join(", ")
        ));
        D::bind_row(entity, &mut qb.separated(", "));
        qb.push(")");

        let mut conn = self.target.acquire().await?;
        qb.build().execute(&mut *conn).await?;
        Ok(())
    }

    async fn update(&self, entity: &D::Entity) -> Result<(), StoreError> {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(format!(
            "UPDATE {} SET ({}) = ROW(",
            D::TABLE,
            D::COLUMNS.join(", ")
        ));
        D::bind_row(entity, &mut qb.separated(", "));
        qb.push(") WHERE id = ").push_bind(entity.id());

        let mut conn = self.target.acquire().await?;
        let result = qb.build().execute(&mut *conn).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, entity: &D::Entity) -> Result<(), StoreError> {
        let mut qb: QueryBuilder<'static, Postgres> =
            QueryBuilder::new(format!("DELETE FROM {} WHERE id = ", D::TABLE));
        qb.push_bind(entity.id());

        let mut conn = self.target.acquire().await?;
        qb.build().execute(&mut *conn).await?;
        Ok(())
    }

    async fn query(
        &self,
        filter: &D::Filter,
        order: &OrderBy,
        page: Page,
    ) -> Result<Vec<D::Entity>, StoreError> {
        let column = D::order_column(order.field)
            .ok_or_else(|| StoreError::UnknownOrder(order.field.to_string()))?;

        let mut qb = Self::select();
        D::apply_filter(filter, &mut WhereClause::new(&mut qb));
        qb.push(format!(" ORDER BY {column} {}, id ASC", order.direction.as_sql()));
        qb.push(" OFFSET ")
            .push_bind(to_i64(page.offset()))
            .push(" ROWS FETCH NEXT ")
            .push_bind(i64::from(page.rows_per_page()))
            .push(" ROWS ONLY");

        let mut conn = self.target.acquire().await?;
        let rows = qb.build_query_as::<D::Row>().fetch_all(&mut *conn).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: &D::Filter) -> Result<u64, StoreError> {
        let mut qb: QueryBuilder<'static, Postgres> =
            QueryBuilder::new(format!("SELECT COUNT(1) FROM {}", D::TABLE));
        D::apply_filter(filter, &mut WhereClause::new(&mut qb));

        let mut conn = self.target.acquire().await?;
        let count: i64 = qb.build_query_scalar().fetch_one(&mut *conn).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn query_by_id(&self, id: Uuid) -> Result<D::Entity, StoreError> {
        let mut qb = Self::select();
        qb.push(" WHERE id = ").push_bind(id);

        let mut conn = self.target.acquire().await?;
        let row = qb.build_query_as::<D::Row>().fetch_one(&mut *conn).await?;
        Ok(row.into())
    }

    async fn query_by_ids(&self, ids: &[Uuid]) -> Result<Vec<D::Entity>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = Self::select();
        qb.push(" WHERE id = ANY(").push_bind(ids.to_vec()).push(")");

        let mut conn = self.target.acquire().await?;
        let rows = qb.build_query_as::<D::Row>().fetch_all(&mut *conn).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn new_with_tx(&self, tx: &Tx) -> Result<Arc<dyn Storer<D>>, StoreError> {
        let shared = tx.shared().ok_or(StoreError::TxClosed)?;
        Ok(Arc::new(Self {
            target: Target::Tx(shared),
            _domain: PhantomData,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::currency::CurrencyDomain;
    use crate::domain::tag::{TagDomain, TagFilter};

    #[test]
    fn order_columns_are_limited_to_known_columns() {
        assert_eq!(TagDomain::order_column("name"), Some("name"));
        assert_eq!(TagDomain::order_column("id"), Some("id"));
        assert_eq!(TagDomain::order_column("name; DROP TABLE x"), None);
    }

    #[test]
    fn select_lists_every_column() {
        let qb = PgStore::<CurrencyDomain>::select();
        assert!(qb.sql().starts_with("SELECT id, code, name"));
        assert!(qb.sql().ends_with("FROM core.currencies"));
    }

    #[test]
    fn filter_clause_uses_binds() {
        let mut qb = PgStore::<TagDomain>::select();
        let filter = TagFilter {
            name: Some("frag".to_string()),
            ..TagFilter::default()
        };
        TagDomain::apply_filter(&filter, &mut WhereClause::new(&mut qb));
        assert_eq!(
            qb.sql(),
            "SELECT id, name, description FROM assets.tags WHERE name ILIKE $1"
        );
    }
}
