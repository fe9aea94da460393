//! 仓储调用的胶水层
//!
//! - 表单校验在存储调用之前完成
//! - 管理列表只在远端调用成功后才修改本地状态，失败不改动本地数据
//! - 读取失败在这里转换为 [`Notice`]，写入失败原样返回，由响应层转换

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    content::{Blog, ContentRecord, Draft, Listing, Page, Project, Skill},
    error::{Error, Result},
    notice::Notice,
    storage::{Flagged, PublishedRepository, Repository, Table},
};

/// 内容写操作入口
#[derive(Clone)]
pub struct ContentService<R> {
    repo: R,
}

impl<R> ContentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// 校验后插入，返回新记录 id
    pub async fn create<T>(&self, new: T::New) -> Result<Uuid>
    where
        T: Table,
        R: Repository<T>,
    {
        new.validate()?;
        let id = self.repo.insert(new).await?;
        tracing::info!(table = T::NAME, %id, "created");
        Ok(id)
    }

    /// 校验后部分更新
    pub async fn edit<T>(&self, id: Uuid, patch: T::Patch) -> Result<()>
    where
        T: Table,
        R: Repository<T>,
    {
        patch.validate()?;
        self.repo.update(id, patch).await?;
        tracing::info!(table = T::NAME, %id, "updated");
        Ok(())
    }

    pub async fn remove<T>(&self, id: Uuid) -> Result<()>
    where
        T: Table,
        R: Repository<T>,
    {
        self.repo.delete(id).await?;
        tracing::info!(table = T::NAME, %id, "deleted");
        Ok(())
    }

    /// 读取公开记录，失败时退化为空集合并附带提示
    pub async fn published_or_empty<T>(&self) -> (Vec<T>, Option<Notice>)
    where
        T: Table + ContentRecord,
        R: PublishedRepository<T>,
    {
        match self.repo.list_published().await {
            Ok(records) => (records, None),
            Err(e) => {
                tracing::error!(table = T::NAME, %e, "fetch failed");
                (vec![], Some(fetch_failed::<T>()))
            }
        }
    }

    /// 读取全部记录（含草稿），失败时退化为空集合并附带提示
    pub async fn all_or_empty<T>(&self) -> (Vec<T>, Option<Notice>)
    where
        T: Table,
        R: Repository<T>,
    {
        match self.repo.list_all().await {
            Ok(records) => (records, None),
            Err(e) => {
                tracing::error!(table = T::NAME, %e, "fetch failed");
                (vec![], Some(fetch_failed::<T>()))
            }
        }
    }
}

fn fetch_failed<T: Table>() -> Notice {
    Notice::error(format!("Failed to fetch {}s.", T::LABEL.to_lowercase()))
}

/// 管理端列表
///
/// 持有一份本地记录副本。每次修改先发起远端调用，成功后才更新本地副本；
/// 失败时本地副本保持原样，错误原样返回，由响应层转换为错误提示。
/// 不做乐观更新，也就没有回滚。
pub struct AdminList<T, R> {
    service: ContentService<R>,
    items: Vec<T>,
}

impl<T, R> AdminList<T, R>
where
    T: Table,
    R: Repository<T>,
{
    pub fn new(repo: R) -> Self {
        Self {
            service: ContentService::new(repo),
            items: vec![],
        }
    }

    /// 只载入一条记录，针对单条记录的操作无需读取整表
    pub async fn focus(repo: R, id: Uuid) -> Result<Self> {
        let record = repo.find_by_id(id).await?.ok_or(Error::NotFound)?;
        Ok(Self {
            service: ContentService::new(repo),
            items: vec![record],
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// 整体替换本地副本
    pub async fn load(&mut self) -> Option<Notice> {
        let (items, notice) = self.service.all_or_empty::<T>().await;
        self.items = items;
        notice
    }

    pub async fn create(&mut self, new: T::New) -> Result<(Uuid, Notice)> {
        let id = self
            .service
            .create::<T>(new)
            .await
            .inspect_err(|e| failed::<T>(e, "create"))?;

        if let Some(record) = self.reread(id).await {
            self.items.insert(0, record);
        }
        Ok((
            id,
            Notice::success(format!("{} created successfully.", T::LABEL)),
        ))
    }

    /// 编辑成功后重新读取该条记录
    pub async fn edit(&mut self, id: Uuid, patch: T::Patch) -> Result<Notice> {
        self.service
            .edit::<T>(id, patch)
            .await
            .inspect_err(|e| failed::<T>(e, "update"))?;

        let fresh = self.reread(id).await;
        match (self.position(id), fresh) {
            (Some(i), Some(record)) => self.items[i] = record,
            (None, Some(record)) => self.items.insert(0, record),
            _ => {}
        }
        Ok(Notice::success(format!("{} updated successfully.", T::LABEL)))
    }

    /// 删除（调用方负责先取得确认）
    pub async fn remove(&mut self, id: Uuid) -> Result<Notice> {
        self.service
            .remove::<T>(id)
            .await
            .inspect_err(|e| failed::<T>(e, "delete"))?;

        self.items.retain(|r| r.row_id() != id);
        Ok(Notice::success(format!("{} deleted successfully.", T::LABEL)))
    }

    /// 写入已成功，重读失败只记录日志，本地副本保持原样
    async fn reread(&self, id: Uuid) -> Option<T> {
        match self.service.repo().find_by_id(id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(table = T::NAME, %id, %e, "reread after write failed");
                None
            }
        }
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|r| r.row_id() == id)
    }
}

impl<T, R> AdminList<T, R>
where
    T: Flagged,
    R: Repository<T>,
{
    pub fn view(&self, listing: &Listing) -> Page<&T> {
        listing.view(&self.items)
    }

    pub async fn toggle_published(&mut self, id: Uuid) -> Result<Notice> {
        let i = self.position(id).ok_or(Error::NotFound)?;
        let current = self.items[i].published();

        let patch = T::flag_patch(Some(!current), None);
        self.service
            .edit::<T>(id, patch)
            .await
            .inspect_err(|e| failed::<T>(e, "update status of"))?;

        self.items[i].set_published(!current);
        let state = if current { "unpublished" } else { "published" };
        Ok(Notice::success(format!("{} {state} successfully.", T::LABEL)))
    }

    pub async fn toggle_featured(&mut self, id: Uuid) -> Result<Notice> {
        let i = self.position(id).ok_or(Error::NotFound)?;
        let current = self.items[i].featured();

        let patch = T::flag_patch(None, Some(!current));
        self.service
            .edit::<T>(id, patch)
            .await
            .inspect_err(|e| failed::<T>(e, "update featured status of"))?;

        self.items[i].set_featured(!current);
        let state = if current {
            "removed from featured"
        } else {
            "marked as featured"
        };
        Ok(Notice::success(format!("{} {state} successfully.", T::LABEL)))
    }
}

fn failed<T: Table>(e: &Error, action: &str) {
    match e {
        Error::Validation(_) | Error::NotFound => {
            tracing::warn!(table = T::NAME, %e, action, "mutation rejected")
        }
        _ => tracing::error!(table = T::NAME, %e, action, "mutation failed"),
    }
}

/// 后台首页的条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentItem {
    pub id: Uuid,
    pub title: String,
    pub published: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

/// 后台首页统计
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_blogs: usize,
    pub published_blogs: usize,
    pub total_projects: usize,
    pub featured_projects: usize,
    pub total_skills: usize,
    pub featured_skills: usize,
    pub recent_blogs: Vec<RecentItem>,
    pub recent_projects: Vec<RecentItem>,
}

/// 首页展示的最近条目数
pub const RECENT_LIMIT: usize = 5;

impl<R> ContentService<R>
where
    R: Repository<Blog> + Repository<Project> + Repository<Skill>,
{
    /// 后台首页数据
    ///
    /// 每张表独立读取，读取失败的表按空表计数，并返回第一条错误提示。
    pub async fn dashboard(&self) -> (Dashboard, Option<Notice>) {
        let (blogs, blog_notice) = self.all_or_empty::<Blog>().await;
        let (projects, project_notice) = self.all_or_empty::<Project>().await;
        let (skills, skill_notice) = self.all_or_empty::<Skill>().await;

        let dashboard = Dashboard {
            total_blogs: blogs.len(),
            published_blogs: blogs.iter().filter(|b| b.published).count(),
            total_projects: projects.len(),
            featured_projects: projects.iter().filter(|p| p.featured).count(),
            total_skills: skills.len(),
            featured_skills: skills.iter().filter(|s| s.featured).count(),
            recent_blogs: recent(&blogs),
            recent_projects: recent(&projects),
        };

        (dashboard, blog_notice.or(project_notice).or(skill_notice))
    }
}

fn recent<T: ContentRecord>(records: &[T]) -> Vec<RecentItem> {
    let mut newest: Vec<&T> = records.iter().collect();
    newest.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    newest
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|r| RecentItem {
            id: r.id(),
            title: r.title().to_string(),
            published: r.published(),
            featured: r.featured(),
            created_at: r.created_at(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use super::*;
    use crate::{
        content::{Blog, BlogPatch, NewBlog, StatusFilter},
        error::Error,
        storage::MemoryStore,
    };

    /// 可切换为全部失败的仓储
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: Arc<AtomicBool>,
    }

    impl FlakyStore {
        fn fail(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Sqlx(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    impl Repository<Blog> for FlakyStore {
        async fn list_all(&self) -> Result<Vec<Blog>> {
            self.check()?;
            Repository::<Blog>::list_all(&self.inner).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>> {
            self.check()?;
            Repository::<Blog>::find_by_id(&self.inner, id).await
        }

        async fn insert(&self, new: NewBlog) -> Result<Uuid> {
            self.check()?;
            Repository::<Blog>::insert(&self.inner, new).await
        }

        async fn update(&self, id: Uuid, patch: BlogPatch) -> Result<()> {
            self.check()?;
            Repository::<Blog>::update(&self.inner, id, patch).await
        }

        async fn delete(&self, id: Uuid) -> Result<()> {
            self.check()?;
            Repository::<Blog>::delete(&self.inner, id).await
        }
    }

    fn new_blog(title: &str) -> NewBlog {
        NewBlog {
            title: title.to_string(),
            content: "body".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_validation_happens_before_repository_call() {
        let store = FlakyStore::default();
        store.fail(true);
        let service = ContentService::new(store);

        let result = service.create::<Blog>(NewBlog::default()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_local_state_changes_only_after_success() {
        let store = FlakyStore::default();
        let mut list: AdminList<Blog, _> = AdminList::new(store.clone());

        let (id, notice) = list.create(new_blog("First")).await.unwrap();
        assert!(!notice.is_error(), "{notice:?}");
        assert_eq!(list.items()[0].id, id);
        assert!(!list.items()[0].published);

        let notice = list.toggle_published(id).await.unwrap();
        assert_eq!(notice.description, "Blog post published successfully.");
        assert!(list.items()[0].published);

        store.fail(true);
        let before = list.items().to_vec();

        assert!(list.toggle_published(id).await.is_err());
        assert!(list.toggle_featured(id).await.is_err());
        assert!(list.remove(id).await.is_err());
        assert!(list.create(new_blog("Second")).await.is_err());
        assert_eq!(list.items(), before.as_slice(), "失败不应修改本地数据");

        store.fail(false);
        let notice = list.remove(id).await.unwrap();
        assert_eq!(notice.description, "Blog post deleted successfully.");
        assert!(list.items().is_empty());
    }

    #[tokio::test]
    async fn test_focus_loads_single_record() {
        let store = MemoryStore::new();
        let first = ContentService::new(store.clone())
            .create::<Blog>(new_blog("First"))
            .await
            .unwrap();
        ContentService::new(store.clone())
            .create::<Blog>(new_blog("Second"))
            .await
            .unwrap();

        let mut list = AdminList::<Blog, _>::focus(store.clone(), first)
            .await
            .unwrap();
        assert_eq!(list.items().len(), 1);

        let notice = list.toggle_featured(first).await.unwrap();
        assert_eq!(notice.description, "Blog post marked as featured successfully.");
        assert!(list.items()[0].featured);

        // 不在本地副本中的记录视为不存在
        let other = Uuid::new_v4();
        assert!(matches!(
            list.toggle_featured(other).await,
            Err(Error::NotFound)
        ));
        assert!(matches!(
            AdminList::<Blog, _>::focus(store, other).await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_empty() {
        let store = FlakyStore::default();
        let mut list: AdminList<Blog, _> = AdminList::new(store.clone());
        list.create(new_blog("Kept")).await.unwrap();

        store.fail(true);
        let notice = list.load().await.expect("error notice");
        assert_eq!(notice.description, "Failed to fetch blog posts.");
        assert!(list.items().is_empty());

        store.fail(false);
        assert!(list.load().await.is_none());
        assert_eq!(list.items().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_refreshes_record_and_view_filters() {
        let store = MemoryStore::new();
        let mut list: AdminList<Blog, _> = AdminList::new(store);
        let (id, _) = list.create(new_blog("Draft One")).await.unwrap();
        list.create(new_blog("Draft Two")).await.unwrap();

        let notice = list
            .edit(
                id,
                BlogPatch {
                    title: Some("Renamed".to_string()),
                    category: Some("Rust".to_string()),
                    published: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!notice.is_error());

        let edited = list.items().iter().find(|b| b.id == id).unwrap();
        assert_eq!(edited.title, "Renamed");
        assert_eq!(edited.category_slug.as_deref(), Some("rust"));

        let mut listing = Listing::new(10);
        listing.set_status(StatusFilter::Draft);
        let page = list.view(&listing);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Draft Two");
    }

    #[tokio::test]
    async fn test_dashboard_counts_and_recent() {
        let store = MemoryStore::new();
        let service = ContentService::new(store.clone());
        for i in 0..7 {
            let mut blog = new_blog(&format!("Post {i}"));
            blog.published = i % 2 == 0;
            service.create::<Blog>(blog).await.unwrap();
        }
        service
            .create::<Skill>(crate::content::NewSkill {
                name: "Rust".to_string(),
                featured: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let (dashboard, notice) = service.dashboard().await;
        assert!(notice.is_none());
        assert_eq!(dashboard.total_blogs, 7);
        assert_eq!(dashboard.published_blogs, 4);
        assert_eq!(dashboard.recent_blogs.len(), RECENT_LIMIT);
        assert_eq!(dashboard.total_projects, 0);
        assert!(dashboard.recent_projects.is_empty());
        assert_eq!(dashboard.total_skills, 1);
        assert_eq!(dashboard.featured_skills, 1);
    }
}
