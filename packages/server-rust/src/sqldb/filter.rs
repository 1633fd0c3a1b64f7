//! WHERE-clause construction for query filters.
//!
//! Every value is bound as a parameter. Column names come from `&'static str`
//! constants in the per-domain store modules, never from client input.

use sqlx::{Encode, Postgres, QueryBuilder, Type};

/// Appends `WHERE a AND b AND ...` to a query as conditions are added.
pub struct WhereClause<'a> {
    qb: &'a mut QueryBuilder<'static, Postgres>,
    empty: bool,
}

impl<'a> WhereClause<'a> {
    pub fn new(qb: &'a mut QueryBuilder<'static, Postgres>) -> Self {
        Self { qb, empty: true }
    }

    fn next(&mut self, column: &str) -> &mut QueryBuilder<'static, Postgres> {
        self.qb.push(if self.empty { " WHERE " } else { " AND " });
        self.empty = false;
        self.qb.push(column)
    }

    /// `column = value`
    pub fn eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'static + Encode<'static, Postgres> + Type<Postgres> + Send,
    {
        if let Some(v) = value {
            self.next(column).push(" = ").push_bind(v);
        }
        self
    }

    /// Case-insensitive substring match. `%` and `_` in `value` match
    /// literally.
    pub fn ilike(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            let pattern = format!("%{}%", escape_like(v));
            self.next(column).push(" ILIKE ").push_bind(pattern);
        }
        self
    }

    /// `column >= value`
    pub fn gte<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'static + Encode<'static, Postgres> + Type<Postgres> + Send,
    {
        if let Some(v) = value {
            self.next(column).push(" >= ").push_bind(v);
        }
        self
    }

    /// `column <= value`
    pub fn lte<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'static + Encode<'static, Postgres> + Type<Postgres> + Send,
    {
        if let Some(v) = value {
            self.next(column).push(" <= ").push_bind(v);
        }
        self
    }
}

fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn no_conditions_leaves_query_untouched() {
        let mut qb = QueryBuilder::new("SELECT id FROM assets.tags");
        WhereClause::new(&mut qb)
            .eq::<Uuid>("id", None)
            .ilike("name", None);
        assert_eq!(qb.sql(), "SELECT id FROM assets.tags");
    }

    #[test]
    fn conditions_are_joined_with_and() {
        let mut qb = QueryBuilder::new("SELECT id FROM core.currencies");
        WhereClause::new(&mut qb)
            .eq("is_active", Some(true))
            .ilike("name", Some("dol"))
            .gte("sort_order", Some(1_i32))
            .lte("sort_order", Some(9_i32));
        assert_eq!(
            qb.sql(),
            "SELECT id FROM core.currencies WHERE is_active = $1 AND name ILIKE $2 \
             AND sort_order >= $3 AND sort_order <= $4"
        );
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
