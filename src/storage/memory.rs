use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use chrono::Utc;
use serde_json::{Map, Value as Json};
use uuid::Uuid;

use super::{Fields, PublishedRepository, Repository, Table};
use crate::{
    content::ContentRecord,
    error::{Error, Result},
};

/// 进程内的 [`Repository`] 实现
///
/// 行以 JSON 对象保存，按表名分桶。用于测试与本地演示，
/// 与 [`PgStore`](super::PgStore) 行为保持一致：更新刷新 `updated_at`，
/// 不存在的 id 返回 [`Error::NotFound`]。
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<&'static str, Vec<Json>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入完整记录，保留其 id 与时间戳
    pub fn seed<T: Table>(&self, rows: impl IntoIterator<Item = T>) -> Result<()> {
        let rows = rows
            .into_iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;

        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(T::NAME)
            .or_default()
            .extend(rows);
        Ok(())
    }

    fn rows<T: Table>(&self) -> Result<Vec<T>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows = tables
            .get(T::NAME)
            .map(|rows| rows.iter().map(decode::<T>).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();
        rows.sort_by(T::list_order);
        Ok(rows)
    }
}

fn decode<T: Table>(row: &Json) -> Result<T> {
    Ok(serde_json::from_value(row.clone())?)
}

fn apply(row: &mut Map<String, Json>, fields: Fields) {
    for (column, value) in fields {
        row.insert(column.to_string(), value.into_json());
    }
}

fn id_of(row: &Json) -> Option<&str> {
    row.get("id").and_then(Json::as_str)
}

impl<T: Table> Repository<T> for MemoryStore {
    async fn list_all(&self) -> Result<Vec<T>> {
        self.rows()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>> {
        let id = id.to_string();
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables
            .get(T::NAME)
            .and_then(|rows| rows.iter().find(|r| id_of(r) == Some(id.as_str())))
            .map(decode::<T>)
            .transpose()
    }

    async fn insert(&self, new: T::New) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        let mut row = Map::new();
        row.insert("id".to_string(), id.to_string().into());
        row.insert("created_at".to_string(), now.clone().into());
        row.insert("updated_at".to_string(), now.into());
        apply(&mut row, T::insert_fields(new));

        // 先按目标类型解码一遍，保证存入的行完整
        let row = serde_json::to_value(decode::<T>(&Json::Object(row))?)?;

        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(T::NAME)
            .or_default()
            .push(row);

        tracing::debug!(table = T::NAME, %id, "row inserted");
        Ok(id)
    }

    async fn update(&self, id: Uuid, patch: T::Patch) -> Result<()> {
        let fields = T::patch_fields(patch);
        let id = id.to_string();

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let row = tables
            .get_mut(T::NAME)
            .and_then(|rows| rows.iter_mut().find(|r| id_of(r) == Some(id.as_str())))
            .and_then(Json::as_object_mut)
            .ok_or(Error::NotFound)?;

        let mut updated = row.clone();
        apply(&mut updated, fields);
        updated.insert("updated_at".to_string(), Utc::now().to_rfc3339().into());
        decode::<T>(&Json::Object(updated.clone()))?;
        *row = updated;

        tracing::debug!(table = T::NAME, %id, "row updated");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id = id.to_string();

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let rows = tables.get_mut(T::NAME).ok_or(Error::NotFound)?;
        let before = rows.len();
        rows.retain(|r| id_of(r) != Some(id.as_str()));
        if rows.len() == before {
            return Err(Error::NotFound);
        }

        tracing::debug!(table = T::NAME, %id, "row deleted");
        Ok(())
    }
}

impl<T: Table + ContentRecord> PublishedRepository<T> for MemoryStore {
    async fn list_published(&self) -> Result<Vec<T>> {
        Ok(self
            .rows::<T>()?
            .into_iter()
            .filter(|r| r.published())
            .collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<T>> {
        Ok(self
            .rows::<T>()?
            .into_iter()
            .find(|r| r.published() && r.slug() == slug))
    }
}
