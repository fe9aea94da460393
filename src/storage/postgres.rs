use std::time::Duration;

use sqlx::{Postgres, QueryBuilder, postgres::PgPoolOptions};
use uuid::Uuid;

use super::{PublishedRepository, Repository, Table};
use crate::{
    content::ContentRecord,
    error::{Error, Result},
};

/// 数据库连接池类型
pub type DBPool = sqlx::PgPool;

const SCHEMA: &str = include_str!("../../sql/01-CREATE_TABLE.sql");

/// 根据连接 URL 创建新的数据库连接池
///
/// 连接池配置：
///
/// - 最大空闲时间 60 秒
/// - 最大生存时间 1500 秒（约 25 分钟）
/// - 最大连接数 10
/// - 获取连接超时 2 秒
/// - 获取前测试连接
/// - 最小连接数 2
pub async fn connect(conn_url: &str) -> Result<DBPool> {
    Ok(PgPoolOptions::new()
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1500))
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .test_before_acquire(true)
        .min_connections(2)
        .connect(conn_url)
        .await?)
}

/// 执行内置的建表语句
///
/// 语句均为 `IF NOT EXISTS`，可重复执行。按 `;` 分割逐条执行。
pub async fn migrate(pool: &DBPool) -> Result<()> {
    for sql in SCHEMA.split(';').map(str::trim) {
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}

/// [`Repository`] 的 Postgres 实现
#[derive(Clone)]
pub struct PgStore {
    pool: DBPool,
}

impl PgStore {
    pub fn new(pool: DBPool) -> Self {
        Self { pool }
    }
}

impl<T: Table> Repository<T> for PgStore {
    async fn list_all(&self) -> Result<Vec<T>> {
        let sql = format!("SELECT * FROM {} ORDER BY {}", T::NAME, T::ORDER_BY);
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::NAME);
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert(&self, new: T::New) -> Result<Uuid> {
        let fields = T::insert_fields(new);

        let mut builder = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} (", T::NAME));
        {
            let mut columns = builder.separated(", ");
            for (column, _) in &fields {
                columns.push(*column);
            }
        }
        builder.push(") VALUES (");
        {
            let mut values = builder.separated(", ");
            for (_, value) in fields {
                values.push("");
                value.bind(&mut values);
            }
        }
        builder.push(") RETURNING id");

        let id = builder
            .build_query_scalar::<Uuid>()
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(table = T::NAME, %id, "row inserted");
        Ok(id)
    }

    async fn update(&self, id: Uuid, patch: T::Patch) -> Result<()> {
        let fields = T::patch_fields(patch);

        let mut builder = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", T::NAME));
        {
            let mut set = builder.separated(", ");
            for (column, value) in fields {
                set.push(format!("{column} = "));
                value.bind(&mut set);
            }
            set.push("updated_at = now()");
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        tracing::debug!(table = T::NAME, %id, "row updated");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::NAME);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        tracing::debug!(table = T::NAME, %id, "row deleted");
        Ok(())
    }
}

impl<T: Table + ContentRecord> PublishedRepository<T> for PgStore {
    async fn list_published(&self) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT * FROM {} WHERE published = TRUE ORDER BY {}",
            T::NAME,
            T::ORDER_BY
        );
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<T>> {
        let sql = format!(
            "SELECT * FROM {} WHERE slug = $1 AND published = TRUE LIMIT 1",
            T::NAME
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }
}
