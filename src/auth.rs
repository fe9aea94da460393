//! 管理端路由守卫
//!
//! 令牌校验完全委托给托管后端的用户接口，这里只负责取令牌、问后端、放行或拒绝。

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::{
    config::BaasConfig,
    error::{Error, Result},
    state::AppState,
};

/// 当前登录用户
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// 托管后端认证接口客户端
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    /// 认证未配置（开发模式）时返回 `None`
    pub fn from_config(baas: &BaasConfig) -> Option<Self> {
        if !baas.is_configured() {
            return None;
        }
        Some(Self::new(baas.url.clone()?, baas.anon_key.clone()?))
    }

    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!(
                    env!("CARGO_PKG_NAME"),
                    "/",
                    env!("CARGO_PKG_VERSION")
                ))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// 用访问令牌查询当前用户
    ///
    /// 令牌无效（401/403）时返回 `None`，其余失败作为错误返回。
    pub async fn current_user(&self, token: &str) -> Result<Option<User>> {
        let resp = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Ok(Some(resp.error_for_status()?.json::<User>().await?)),
        }
    }
}

/// 从 `Authorization: Bearer <token>` 取出令牌
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// 管理端中间件
///
/// 认证已配置时要求有效用户，否则返回 401；
/// 未配置时放行并记录警告。
pub async fn require_owner<S: Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let Some(auth) = state.auth() else {
        tracing::warn!(path = %req.uri().path(), "authentication not configured, admin route is open");
        return Ok(next.run(req).await);
    };

    let token = bearer_token(req.headers()).ok_or(Error::Unauthorized)?;
    let user = auth
        .current_user(token)
        .await?
        .ok_or(Error::Unauthorized)?;

    tracing::debug!(user = %user.id, "owner authenticated");
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_unconfigured_auth_is_none() {
        let baas = BaasConfig {
            url: Some("https://placeholder.example".to_string()),
            anon_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(AuthClient::from_config(&baas).is_none());
    }
}
