//! PostgreSQL-backed document store.
//!
//! Every collection shares the `documents(collection, id, body jsonb)` table.
//! Filters translate to JSONB containment (`body @> filter`), field updates to
//! JSONB concatenation (`body || fields`) and group-by sums to a
//! `COUNT(*) FILTER` aggregate over the requested conditions.

use diesel::sql_query;
use diesel::sql_types::{BigInt, Jsonb, Nullable, Text};
use diesel::QueryableByName;
use diesel_async::RunQueryDsl;
use serde_json::{Value, json};

use crate::domain::ports::{
    Collection, Document, DocumentStore, DocumentStoreError, Filter, GroupByQuery, GroupTotals,
    ID_FIELD, document_id,
};

use super::diesel_helpers::{is_unique_violation, map_diesel_error, map_pool_error};
use super::pool::DbPool;

/// Diesel-backed implementation of the document store port.
#[derive(Clone)]
pub struct DieselDocumentStore {
    pool: DbPool,
}

impl DieselDocumentStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const FIND_SQL: &str = r#"
SELECT body FROM documents
WHERE collection = $1 AND body @> $2
ORDER BY id
LIMIT 1
"#;

const FIND_MANY_SQL: &str = r#"
SELECT body FROM documents
WHERE collection = $1 AND body @> $2
ORDER BY id
"#;

const INSERT_SQL: &str = r#"
INSERT INTO documents (collection, id, body)
VALUES ($1, $2, $3)
"#;

const UPDATE_SQL: &str = r#"
UPDATE documents
SET body = body || $3, updated_at = now()
WHERE collection = $1 AND body @> $2
"#;

const DELETE_SQL: &str = r#"
DELETE FROM documents
WHERE collection = $1 AND body @> $2
"#;

const COUNT_SQL: &str = r#"
SELECT COUNT(*) AS total FROM documents
WHERE collection = $1 AND body @> $2
"#;

const GROUP_BY_SQL: &str = r#"
SELECT d.body -> $2 AS group_key,
       s.name AS sum_name,
       COUNT(*) FILTER (WHERE d.body -> s.field = s.equals) AS total
FROM documents d
CROSS JOIN jsonb_to_recordset($3) AS s(name text, field text, equals jsonb)
WHERE d.collection = $1 AND d.body @> $4
GROUP BY 1, 2
"#;

#[derive(QueryableByName)]
struct BodyRow {
    #[diesel(sql_type = Jsonb)]
    body: Value,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

#[derive(QueryableByName)]
struct GroupRow {
    #[diesel(sql_type = Nullable<Jsonb>)]
    group_key: Option<Value>,
    #[diesel(sql_type = Text)]
    sum_name: String,
    #[diesel(sql_type = BigInt)]
    total: i64,
}

fn into_document(row: BodyRow) -> Result<Document, DocumentStoreError> {
    match row.body {
        Value::Object(map) => Ok(map),
        other => Err(DocumentStoreError::invalid_document(format!(
            "stored body is not an object: {other}"
        ))),
    }
}

fn filter_value(filter: &Filter) -> Value {
    Value::Object(filter.as_document().clone())
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Fold `(group, sum, total)` rows into one [`GroupTotals`] per group, keeping
/// the order in which groups first appear.
fn fold_group_rows(rows: Vec<GroupRow>) -> Vec<GroupTotals> {
    let mut groups: Vec<GroupTotals> = Vec::new();
    for row in rows {
        let key = row.group_key.unwrap_or(Value::Null);
        let total = non_negative(row.total);
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => {
                group.sums.insert(row.sum_name, total);
            }
            None => {
                let mut group = GroupTotals {
                    key,
                    ..GroupTotals::default()
                };
                group.sums.insert(row.sum_name, total);
                groups.push(group);
            }
        }
    }
    groups
}

#[async_trait::async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BodyRow> = sql_query(FIND_SQL)
            .bind::<Text, _>(collection.as_str())
            .bind::<Jsonb, _>(filter_value(filter))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "find document"))?;
        rows.into_iter().next().map(into_document).transpose()
    }

    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BodyRow> = sql_query(FIND_MANY_SQL)
            .bind::<Text, _>(collection.as_str())
            .bind::<Jsonb, _>(filter_value(filter))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "find documents"))?;
        rows.into_iter().map(into_document).collect()
    }

    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<(), DocumentStoreError> {
        let id = document_id(&document)?.to_owned();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = sql_query(INSERT_SQL)
            .bind::<Text, _>(collection.as_str())
            .bind::<Text, _>(id.as_str())
            .bind::<Jsonb, _>(Value::Object(document))
            .execute(&mut conn)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(DocumentStoreError::duplicate_key(collection.as_str(), id))
            }
            Err(err) => Err(map_diesel_error(err, "insert document")),
        }
    }

    async fn update_fields(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Document,
    ) -> Result<u64, DocumentStoreError> {
        if fields.contains_key(ID_FIELD) {
            return Err(DocumentStoreError::invalid_document(
                "document ids cannot be updated",
            ));
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = sql_query(UPDATE_SQL)
            .bind::<Text, _>(collection.as_str())
            .bind::<Jsonb, _>(filter_value(filter))
            .bind::<Jsonb, _>(Value::Object(fields))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "update documents"))?;
        Ok(u64::try_from(updated).unwrap_or(u64::MAX))
    }

    async fn delete(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = sql_query(DELETE_SQL)
            .bind::<Text, _>(collection.as_str())
            .bind::<Jsonb, _>(filter_value(filter))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete documents"))?;
        Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
    }

    async fn count(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: CountRow = sql_query(COUNT_SQL)
            .bind::<Text, _>(collection.as_str())
            .bind::<Jsonb, _>(filter_value(filter))
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "count documents"))?;
        Ok(non_negative(row.total))
    }

    async fn aggregate_group_by(
        &self,
        collection: Collection,
        query: &GroupByQuery,
    ) -> Result<Vec<GroupTotals>, DocumentStoreError> {
        if query.sums.is_empty() {
            return Ok(Vec::new());
        }
        let sums: Value = query
            .sums
            .iter()
            .map(|sum| json!({ "name": sum.name, "field": sum.field, "equals": sum.equals }))
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<GroupRow> = sql_query(GROUP_BY_SQL)
            .bind::<Text, _>(collection.as_str())
            .bind::<Text, _>(query.group_key.as_str())
            .bind::<Jsonb, _>(sums)
            .bind::<Jsonb, _>(filter_value(&query.filter))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "aggregate documents"))?;
        Ok(fold_group_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(key: Option<Value>, name: &str, total: i64) -> GroupRow {
        GroupRow {
            group_key: key,
            sum_name: name.to_owned(),
            total,
        }
    }

    #[rstest]
    fn group_rows_fold_per_key() {
        let groups = fold_group_rows(vec![
            row(Some(json!("p1")), "up", 2),
            row(Some(json!("p2")), "up", 0),
            row(Some(json!("p1")), "down", 1),
            row(None, "up", 4),
        ]);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key, json!("p1"));
        assert_eq!((groups[0].sum("up"), groups[0].sum("down")), (2, 1));
        assert_eq!(groups[2].key, Value::Null);
    }

    #[rstest]
    fn negative_totals_clamp_to_zero() {
        assert_eq!(non_negative(-3), 0);
        assert_eq!(non_negative(5), 5);
    }

    #[rstest]
    fn non_object_bodies_are_invalid() {
        let err = into_document(BodyRow { body: json!([1, 2]) }).expect_err("array body");
        assert!(matches!(err, DocumentStoreError::InvalidDocument { .. }));
    }
}
