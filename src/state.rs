use std::sync::Arc;

use crate::{auth::AuthClient, service::ContentService, upload::ObjectStorage};

/// 应用程序上下文
///
/// [`AppState`] 封装了内容仓储、认证客户端与对象存储，提供统一访问入口。
/// 仓储以类型参数注入，测试中可替换为内存实现。
#[derive(Clone)]
pub struct AppState<S> {
    service: ContentService<S>,
    auth: Option<AuthClient>,
    storage: Option<ObjectStorage>,
    site_url: Arc<str>,
}

impl<S> AppState<S> {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(store: S, site_url: impl AsRef<str>) -> Self {
        Self {
            service: ContentService::new(store),
            auth: None,
            storage: None,
            site_url: Arc::from(site_url.as_ref().trim_end_matches('/')),
        }
    }

    /// 启用管理端认证
    pub fn with_auth(mut self, auth: Option<AuthClient>) -> Self {
        self.auth = auth;
        self
    }

    /// 启用文件上传
    pub fn with_storage(mut self, storage: Option<ObjectStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// 获取内容服务
    pub fn service(&self) -> &ContentService<S> {
        &self.service
    }

    /// 获取认证客户端，未配置时为 `None`
    pub fn auth(&self) -> Option<&AuthClient> {
        self.auth.as_ref()
    }

    /// 获取对象存储客户端，未配置时为 `None`
    pub fn storage(&self) -> Option<&ObjectStorage> {
        self.storage.as_ref()
    }

    /// 站点根地址，不带结尾 `/`
    pub fn site_url(&self) -> &str {
        &self.site_url
    }
}
