//! 管理端接口，挂载在 `/api/admin` 下，由 [`require_owner`](crate::auth::require_owner) 保护

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ListParams, ListResponse, found};
use crate::{
    content::{ADMIN_PAGE_SIZE, Blog, Project, Skill, build_category_index, sort_skills},
    error::{Error, Result},
    notice::Notice,
    service::{AdminList, Dashboard},
    state::AppState,
    storage::{Flagged, Repository, Store, Table},
};

pub(super) fn setup_route<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/dashboard", get(dashboard::<S>))
        .route("/blogs", get(list::<S, Blog>).post(create::<S, Blog>))
        .route(
            "/blogs/{id}",
            get(get_one::<S, Blog>)
                .patch(edit::<S, Blog>)
                .delete(remove::<S, Blog>),
        )
        .route("/blogs/{id}/publish", post(toggle_published::<S, Blog>))
        .route("/blogs/{id}/feature", post(toggle_featured::<S, Blog>))
        .route("/projects", get(list::<S, Project>).post(create::<S, Project>))
        .route(
            "/projects/{id}",
            get(get_one::<S, Project>)
                .patch(edit::<S, Project>)
                .delete(remove::<S, Project>),
        )
        .route(
            "/projects/{id}/publish",
            post(toggle_published::<S, Project>),
        )
        .route(
            "/projects/{id}/feature",
            post(toggle_featured::<S, Project>),
        )
        .route("/skills", get(list_skills::<S>).post(create::<S, Skill>))
        .route(
            "/skills/{id}",
            get(get_one::<S, Skill>)
                .patch(edit::<S, Skill>)
                .delete(remove::<S, Skill>),
        )
        .route("/upload/{folder}", post(upload::<S>))
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    #[serde(flatten)]
    dashboard: Dashboard,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
}

/// 后台首页：统计与最近条目，读取失败按零计数
async fn dashboard<S: Store>(State(state): State<AppState<S>>) -> Json<DashboardResponse> {
    let (dashboard, notice) = state.service().dashboard().await;
    Json(DashboardResponse { dashboard, notice })
}

/// 管理端列表：包含草稿，支持 `status` 过滤
async fn list<S, T>(
    Query(params): Query<ListParams>,
    State(state): State<AppState<S>>,
) -> Json<ListResponse<T>>
where
    S: Repository<T>,
    T: Flagged,
{
    let mut list = AdminList::<T, S>::new(state.service().repo().clone());
    let notice = list.load().await;

    let listing = params.listing(ADMIN_PAGE_SIZE, true);
    let page = list.view(&listing).map(T::clone);

    Json(ListResponse::new(
        page,
        build_category_index(list.items()),
        notice,
    ))
}

#[derive(Debug, Serialize)]
struct SkillList {
    skills: Vec<Skill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
}

async fn list_skills<S: Store>(State(state): State<AppState<S>>) -> Json<SkillList> {
    let mut list = AdminList::<Skill, S>::new(state.service().repo().clone());
    let notice = list.load().await;

    let mut skills = list.items().to_vec();
    sort_skills(&mut skills);
    Json(SkillList { skills, notice })
}

/// 编辑页读取单条记录
async fn get_one<S, T>(Path(id): Path<Uuid>, State(state): State<AppState<S>>) -> Result<Json<T>>
where
    S: Repository<T>,
    T: Table,
{
    let record = Repository::<T>::find_by_id(state.service().repo(), id).await?;
    Ok(Json(found(record)?))
}

#[derive(Debug, Serialize)]
struct Created {
    id: Uuid,
    notice: Notice,
}

async fn create<S, T>(
    State(state): State<AppState<S>>,
    Json(new): Json<T::New>,
) -> Result<(StatusCode, Json<Created>)>
where
    S: Repository<T>,
    T: Table,
{
    let mut list = AdminList::<T, S>::new(state.service().repo().clone());
    let (id, notice) = list.create(new).await?;
    Ok((StatusCode::CREATED, Json(Created { id, notice })))
}

async fn edit<S, T>(
    Path(id): Path<Uuid>,
    State(state): State<AppState<S>>,
    Json(patch): Json<T::Patch>,
) -> Result<Json<Notice>>
where
    S: Repository<T>,
    T: Table,
{
    let mut list = AdminList::<T, S>::focus(state.service().repo().clone(), id).await?;
    Ok(Json(list.edit(id, patch).await?))
}

async fn remove<S, T>(Path(id): Path<Uuid>, State(state): State<AppState<S>>) -> Result<Json<Notice>>
where
    S: Repository<T>,
    T: Table,
{
    let mut list = AdminList::<T, S>::focus(state.service().repo().clone(), id).await?;
    Ok(Json(list.remove(id).await?))
}

async fn toggle_published<S, T>(
    Path(id): Path<Uuid>,
    State(state): State<AppState<S>>,
) -> Result<Json<Notice>>
where
    S: Repository<T>,
    T: Flagged,
{
    let mut list = AdminList::<T, S>::focus(state.service().repo().clone(), id).await?;
    Ok(Json(list.toggle_published(id).await?))
}

async fn toggle_featured<S, T>(
    Path(id): Path<Uuid>,
    State(state): State<AppState<S>>,
) -> Result<Json<Notice>>
where
    S: Repository<T>,
    T: Flagged,
{
    let mut list = AdminList::<T, S>::focus(state.service().repo().clone(), id).await?;
    Ok(Json(list.toggle_featured(id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UploadParams {
    ext: String,
}

#[derive(Debug, Serialize)]
struct Uploaded {
    url: String,
}

/// 原始请求体即文件内容，返回公开地址
async fn upload<S: Store>(
    Path(folder): Path<String>,
    Query(params): Query<UploadParams>,
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Uploaded>> {
    let storage = state
        .storage()
        .ok_or_else(|| Error::Config("object storage is not configured".to_string()))?;

    if body.is_empty() {
        return Err(Error::Validation("empty upload".to_string()));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let url = storage
        .upload(&folder, &params.ext, content_type, body.to_vec())
        .await?;

    Ok(Json(Uploaded { url }))
}
