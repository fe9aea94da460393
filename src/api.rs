mod admin;
mod query;
mod sitemap;

use axum::{Router, middleware};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::{
    auth::require_owner,
    content::{
        Category, CategoryFilter, FeaturedFilter, FilterCriteria, Listing, Page, PageLink,
        SortBy, StatusFilter, page_window,
    },
    error::{Error, Result},
    notice::Notice,
    state::AppState,
    storage::Store,
};

/// 设置应用的路由。
///
/// `/api` 下为公开查询接口，`/api/admin` 下为需要登录的管理接口，
/// 另有根路径下的 `/sitemap.xml`。
pub fn setup_route<S: Store>(state: AppState<S>) -> Router {
    let admin = admin::setup_route::<S>().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_owner::<S>,
    ));

    Router::new()
        .nest("/api", query::setup_route::<S>().nest("/admin", admin))
        .merge(sitemap::setup_route::<S>())
        .with_state(state)
}

/// 启动 HTTP 服务，并使用给定的路由处理请求。
#[instrument(name = "http server", skip_all)]
pub async fn run_server_with_router(router: Router, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;

    tracing::info!("listening on {listen}");

    axum::serve(listener, router).await?;
    Ok(())
}

/// 启动 HTTP 服务，自动设置路由和中间件。
///
/// 1. 生成路由
/// 2. 添加日志和追踪中间件
/// 3. 启动服务器
pub async fn run_server<S: Store>(state: AppState<S>, listen: &str) -> Result<()> {
    let router = setup_route(state);
    let router = add_middlewares(router);
    run_server_with_router(router, listen).await
}

/// 为路由添加中间件，包括请求追踪和失败日志记录。
fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {
                // 空实现，关闭请求日志
            }),
    )
}

/// 列表查询参数
///
/// - `search`：标题、摘要、作者、标签的子串搜索
/// - `status`：`all` / `published` / `draft`，仅管理端生效
/// - `featured`：`all` / `featured` / `regular`
/// - `category`：分类名精确匹配，`all` 表示不过滤
/// - `sort`：`newest` / `oldest` / `title` / `author`（项目为 `category`）
/// - `page`：从 1 开始
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ListParams {
    search: String,
    status: StatusFilter,
    featured: FeaturedFilter,
    category: Option<String>,
    sort: SortBy,
    page: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            featured: FeaturedFilter::All,
            category: None,
            sort: SortBy::Newest,
            page: 1,
        }
    }
}

impl ListParams {
    /// 构造列表状态；公开接口忽略 `status`
    fn listing(&self, page_size: usize, with_status: bool) -> Listing {
        let mut listing = Listing::new(page_size);
        listing.set_criteria(FilterCriteria {
            search_term: self.search.clone(),
            status: if with_status {
                self.status
            } else {
                StatusFilter::All
            },
            featured: self.featured,
            category: CategoryFilter::from_param(self.category.as_deref()),
            sort_by: self.sort,
        });
        listing.go_to(self.page);
        listing
    }
}

/// 分页列表响应
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    #[serde(flatten)]
    page: Page<T>,
    page_window: Vec<PageLink>,
    categories: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
}

impl<T> ListResponse<T> {
    fn new(page: Page<T>, categories: Vec<Category>, notice: Option<Notice>) -> Self {
        Self {
            page_window: page_window(page.current_page, page.total_pages),
            page,
            categories,
            notice,
        }
    }
}

/// 记录不存在时转换为 404
fn found<T>(record: Option<T>) -> Result<T> {
    record.ok_or(Error::NotFound)
}
