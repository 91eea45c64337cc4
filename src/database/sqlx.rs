use crate::core::models::{
    common::Pagination,
    form::{Form, FormSummary, Query as FormQuery, Upsert as FormUpsert},
    response::{Insert as ResponseInsert, Query as ResponseQuery, ResponseRecord},
};
use crate::core::ports::repository::{Common, FormCommon, Manager, ResponseCommon, Store, TxStore};
use crate::error::Error;
use sqlx::pool::PoolConnection;
use sqlx::{query, query_as, query_scalar, Executor, PgPool, Postgres, QueryBuilder, Transaction};

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E> FormCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn upsert(&mut self, form: FormUpsert) -> Result<Form, Error> {
        let schema = serde_json::to_value(&form.schema)?;
        let saved = query_as(
            "
        INSERT INTO forms (slug, title, description, active, schema)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (slug) DO UPDATE SET
            title = EXCLUDED.title,
            description = EXCLUDED.description,
            active = EXCLUDED.active,
            schema = EXCLUDED.schema,
            updated_at = NOW()
        RETURNING slug, title, description, active, schema, created_at, updated_at",
        )
        .bind(form.slug)
        .bind(form.schema.title)
        .bind(form.schema.description)
        .bind(form.schema.active)
        .bind(schema)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(saved)
    }

    async fn get(&mut self, slug: &str) -> Result<Option<Form>, Error> {
        let form = query_as("SELECT slug, title, description, active, schema, created_at, updated_at FROM forms WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(form)
    }

    async fn query(&mut self, query: &FormQuery, pagination: Pagination) -> Result<Vec<FormSummary>, Error> {
        let mut stmt = QueryBuilder::<Postgres>::new(
            "
        SELECT f.slug, f.title, f.active, f.updated_at, COUNT(r.id) AS response_count
        FROM forms AS f
        LEFT JOIN responses AS r ON f.slug = r.form_slug
        WHERE 1 = 1",
        );
        if let Some(active) = query.active_eq {
            stmt.push(" AND f.active = ").push_bind(active);
        }
        stmt.push(" GROUP BY f.slug, f.title, f.active, f.updated_at ORDER BY f.updated_at DESC");
        stmt.push(" LIMIT ").push_bind(pagination.limit);
        stmt.push(" OFFSET ").push_bind(pagination.offset);
        let forms = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(forms)
    }

    async fn count(&mut self, query: &FormQuery) -> Result<i64, Error> {
        let mut stmt = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM forms WHERE 1 = 1");
        if let Some(active) = query.active_eq {
            stmt.push(" AND active = ").push_bind(active);
        }
        let (n,): (i64,) = stmt.build_query_as().fetch_one(&mut self.executor).await?;
        Ok(n)
    }
}

impl<E> ResponseCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, response: ResponseInsert) -> Result<(), Error> {
        query("INSERT INTO responses (form_slug, ip, answers) VALUES ($1, $2, $3)")
            .bind(response.form_slug)
            .bind(response.ip)
            .bind(response.answers)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn exists(&mut self, query: &ResponseQuery) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT 1 FROM responses WHERE form_slug = $1 AND ($2::TEXT IS NULL OR ip = $2))")
            .bind(&query.form_slug_eq)
            .bind(&query.ip_eq)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn query(&mut self, query: &ResponseQuery) -> Result<Vec<ResponseRecord>, Error> {
        let rows = query_as(
            "
        SELECT created_at, ip, answers
        FROM responses
        WHERE form_slug = $1 AND ($2::TEXT IS NULL OR ip = $2)
        ORDER BY created_at DESC, id DESC",
        )
        .bind(&query.form_slug_eq)
        .bind(&query.ip_eq)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(rows)
    }
}

impl Common for PgSqlx<PoolConnection<Postgres>> {}
impl Common for PgSqlx<Transaction<'static, Postgres>> {}
impl Store for PgSqlx<PoolConnection<Postgres>> {}
impl Store for PgSqlx<Transaction<'static, Postgres>> {}

impl TxStore for PgSqlx<Transaction<'static, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.executor.rollback().await?;
        Ok(())
    }
}

pub struct PgSqlxManager {
    pool: PgPool,
}

impl PgSqlxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Manager for PgSqlxManager {
    type Store = PgSqlx<PoolConnection<Postgres>>;
    type TxStore = PgSqlx<Transaction<'static, Postgres>>;

    async fn db(&self) -> Result<Self::Store, Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgSqlx::new(conn))
    }

    async fn tx(&self) -> Result<Self::TxStore, Error> {
        let tx = self.pool.begin().await?;
        Ok(PgSqlx::new(tx))
    }
}
