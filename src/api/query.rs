use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use axum_extra::extract::Query;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ListParams, ListResponse, found};
use crate::{
    content::{
        Blog, Category, CategoryFilter, PUBLIC_PAGE_SIZE, Page, PageLink, Project, Skill,
        SkillGroup, author_name, build_category_index, by_author, category_name, filter_skills,
        group_skills, other_categories, page_window, reading_time, skill_categories, slugify,
        sort_skills, split_display,
    },
    error::Result,
    notice::Notice,
    state::AppState,
    storage::{PublishedRepository, Store},
};

/// 卡片上直接展示的标签数，其余折叠为 "+K"
const TAG_PREVIEW: usize = 3;

/// 分类页“浏览其他分类”的数量
const OTHER_CATEGORIES: usize = 5;

pub(super) fn setup_route<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/blogs", get(list_blogs::<S>))
        .route("/blogs/categories", get(blog_categories::<S>))
        .route("/blogs/category/{slug}", get(blog_category::<S>))
        .route("/blogs/author/{slug}", get(blog_author::<S>))
        .route("/blogs/{slug}", get(blog_detail::<S>))
        .route("/projects", get(list_projects::<S>))
        .route("/projects/{slug}", get(project_detail::<S>))
        .route("/skills", get(list_skills::<S>))
}

/// 文章公开地址：有分类时走分类路径
pub(crate) fn blog_path(blog: &Blog) -> String {
    let category_slug = blog
        .category_slug
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| blog.category.as_deref().map(slugify).filter(|s| !s.is_empty()));

    match category_slug {
        Some(category) => format!("/blogs/{}/{}", category, blog.slug),
        None => format!("/blogs/{}", blog.slug),
    }
}

/// 文章列表项
#[derive(Debug, Serialize)]
pub struct BlogMeta {
    id: Uuid,
    title: String,
    slug: String,
    url: String,
    author: String,
    excerpt: Option<String>,
    tags: Vec<String>,
    tag_preview: Vec<String>,
    more_tags: usize,
    featured_image: Option<String>,
    category: Option<String>,
    category_slug: Option<String>,
    featured: bool,
    reading_time: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Blog> for BlogMeta {
    fn from(blog: &Blog) -> Self {
        let (preview, more_tags) = split_display(&blog.tags, TAG_PREVIEW);
        Self {
            id: blog.id,
            title: blog.title.clone(),
            slug: blog.slug.clone(),
            url: blog_path(blog),
            author: blog.author.clone(),
            excerpt: blog.excerpt.clone(),
            tags: blog.tags.clone(),
            tag_preview: preview.to_vec(),
            more_tags,
            featured_image: blog.featured_image.clone(),
            category: blog.category.clone(),
            category_slug: blog.category_slug.clone(),
            featured: blog.featured,
            reading_time: reading_time(blog.content.as_deref()),
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}

/// 文章详情
#[derive(Debug, Serialize)]
pub struct BlogDetail {
    #[serde(flatten)]
    meta: BlogMeta,
    content: Option<String>,
}

/// 项目列表项
#[derive(Debug, Serialize)]
pub struct ProjectMeta {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
    technologies: Vec<String>,
    tag_preview: Vec<String>,
    more_tags: usize,
    featured_image: Option<String>,
    demo_url: Option<String>,
    repo_url: Option<String>,
    category: Option<String>,
    category_slug: Option<String>,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Project> for ProjectMeta {
    fn from(project: &Project) -> Self {
        let (preview, more_tags) = split_display(&project.technologies, TAG_PREVIEW);
        Self {
            id: project.id,
            title: project.title.clone(),
            slug: project.slug.clone(),
            description: project.description.clone(),
            technologies: project.technologies.clone(),
            tag_preview: preview.to_vec(),
            more_tags,
            featured_image: project.featured_image.clone(),
            demo_url: project.demo_url.clone(),
            repo_url: project.repo_url.clone(),
            category: project.category.clone(),
            category_slug: project.category_slug.clone(),
            featured: project.featured,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    meta: ProjectMeta,
    content: Option<String>,
}

async fn list_blogs<S: Store>(
    Query(params): Query<ListParams>,
    State(state): State<AppState<S>>,
) -> Json<ListResponse<BlogMeta>> {
    let (blogs, notice) = state.service().published_or_empty::<Blog>().await;

    let listing = params.listing(PUBLIC_PAGE_SIZE, false);
    let page = listing.view(&blogs).map(BlogMeta::from);

    Json(ListResponse::new(page, build_category_index(&blogs), notice))
}

#[derive(Debug, Serialize)]
struct CategoriesResponse {
    categories: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
}

async fn blog_categories<S: Store>(
    State(state): State<AppState<S>>,
) -> Json<CategoriesResponse> {
    let (blogs, notice) = state.service().published_or_empty::<Blog>().await;
    Json(CategoriesResponse {
        categories: build_category_index(&blogs),
        notice,
    })
}

/// 分类页
#[derive(Debug, Serialize)]
pub struct CategoryPage {
    name: String,
    slug: String,
    #[serde(flatten)]
    page: Page<BlogMeta>,
    page_window: Vec<PageLink>,
    other_categories: Vec<Category>,
}

async fn blog_category<S: Store>(
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
    State(state): State<AppState<S>>,
) -> Result<Json<CategoryPage>> {
    let blogs = PublishedRepository::<Blog>::list_published(state.service().repo()).await?;

    // 分类中没有任何公开文章即视为不存在
    let name = found(category_name(&blogs, &slug))?;

    let mut listing = params.listing(PUBLIC_PAGE_SIZE, false);
    listing.set_active_category(Some(slug.clone()));
    listing.go_to(params.page);
    let page = listing.view(&blogs).map(BlogMeta::from);

    Ok(Json(CategoryPage {
        page_window: page_window(page.current_page, page.total_pages),
        other_categories: other_categories(&blogs, &slug, OTHER_CATEGORIES),
        name,
        slug,
        page,
    }))
}

/// 作者页
#[derive(Debug, Serialize)]
pub struct AuthorPage {
    name: String,
    slug: String,
    #[serde(flatten)]
    page: Page<BlogMeta>,
    page_window: Vec<PageLink>,
}

async fn blog_author<S: Store>(
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
    State(state): State<AppState<S>>,
) -> Result<Json<AuthorPage>> {
    let blogs = PublishedRepository::<Blog>::list_published(state.service().repo()).await?;

    let name = found(author_name(&blogs, &slug))?;
    let written = by_author(&blogs, &name);

    let listing = params.listing(PUBLIC_PAGE_SIZE, false);
    let page = listing.view(&written).map(|b| BlogMeta::from(*b));

    Ok(Json(AuthorPage {
        page_window: page_window(page.current_page, page.total_pages),
        name,
        slug,
        page,
    }))
}

async fn blog_detail<S: Store>(
    Path(slug): Path<String>,
    State(state): State<AppState<S>>,
) -> Result<Json<BlogDetail>> {
    let blog = PublishedRepository::<Blog>::find_by_slug(state.service().repo(), &slug).await?;
    let blog = found(blog)?;

    Ok(Json(BlogDetail {
        meta: BlogMeta::from(&blog),
        content: blog.content,
    }))
}

async fn list_projects<S: Store>(
    Query(params): Query<ListParams>,
    State(state): State<AppState<S>>,
) -> Json<ListResponse<ProjectMeta>> {
    let (projects, notice) = state.service().published_or_empty::<Project>().await;

    let listing = params.listing(PUBLIC_PAGE_SIZE, false);
    let page = listing.view(&projects).map(ProjectMeta::from);

    Json(ListResponse::new(
        page,
        build_category_index(&projects),
        notice,
    ))
}

async fn project_detail<S: Store>(
    Path(slug): Path<String>,
    State(state): State<AppState<S>>,
) -> Result<Json<ProjectDetail>> {
    let project =
        PublishedRepository::<Project>::find_by_slug(state.service().repo(), &slug).await?;
    let project = found(project)?;

    Ok(Json(ProjectDetail {
        meta: ProjectMeta::from(&project),
        content: project.content,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SkillParams {
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct SkillsResponse<'a> {
    categories: Vec<&'a str>,
    groups: Vec<SkillGroup<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
}

async fn list_skills<S: Store>(
    Query(params): Query<SkillParams>,
    State(state): State<AppState<S>>,
) -> Result<Json<serde_json::Value>> {
    let (mut skills, notice) = state.service().all_or_empty::<Skill>().await;
    sort_skills(&mut skills);

    let filter = CategoryFilter::from_param(params.category.as_deref());
    let shown = filter_skills(&skills, &filter);

    let resp = SkillsResponse {
        categories: skill_categories(&skills),
        groups: group_skills(&shown),
        notice,
    };

    // 分组借用本地数据，先序列化再返回
    Ok(Json(serde_json::to_value(&resp)?))
}
