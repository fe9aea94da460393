//! 内容仓储：对托管关系表的一层薄封装
//!
//! 只负责整表读取与逐条增删改，过滤排序分页都在 [`crate::content`] 的内存引擎中完成。

mod memory;
mod postgres;
mod table;

use std::future::Future;

use uuid::Uuid;

use crate::{
    content::{Blog, ContentRecord, Project, Skill},
    error::Result,
};

pub use self::{
    memory::MemoryStore,
    postgres::{DBPool, PgStore, connect, migrate},
    table::{Fields, Flagged, Table, Value},
};

/// 单张表的读写接口
pub trait Repository<T: Table>: Clone + Send + Sync + 'static {
    /// 整表读取（管理端，包含草稿）
    fn list_all(&self) -> impl Future<Output = Result<Vec<T>>> + Send;

    /// 按 id 查询，不存在返回 `None`
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<T>>> + Send;

    /// 插入一条记录，返回存储层分配的 id
    fn insert(&self, new: T::New) -> impl Future<Output = Result<Uuid>> + Send;

    /// 部分字段更新，同时刷新 `updated_at`
    ///
    /// id 不存在时返回 [`Error::NotFound`](crate::error::Error::NotFound)。
    fn update(&self, id: Uuid, patch: T::Patch) -> impl Future<Output = Result<()>> + Send;

    /// 删除，id 不存在时返回 [`Error::NotFound`](crate::error::Error::NotFound)
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send;
}

/// 带发布状态的内容表：公开读取路径只能看到已发布记录
pub trait PublishedRepository<T: Table + ContentRecord>: Repository<T> {
    /// 已发布记录，按创建时间倒序
    fn list_published(&self) -> impl Future<Output = Result<Vec<T>>> + Send;

    /// 按 slug 查询已发布记录
    fn find_by_slug(&self, slug: &str) -> impl Future<Output = Result<Option<T>>> + Send;
}

/// 应用需要的全部表
pub trait Store:
    PublishedRepository<Blog> + PublishedRepository<Project> + Repository<Skill>
{
}

impl<S> Store for S where
    S: PublishedRepository<Blog> + PublishedRepository<Project> + Repository<Skill>
{
}
