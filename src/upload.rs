use reqwest::header;
use uuid::Uuid;

use crate::{
    config::BaasConfig,
    error::{Error, Result},
};

/// 上传目录
pub const UPLOAD_FOLDERS: &[&str] = &["blog-images", "project-images", "skill-icons"];

/// 托管对象存储客户端
///
/// 上传二进制内容，返回公开访问 URL。
#[derive(Clone)]
pub struct ObjectStorage {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl ObjectStorage {
    /// 缺少地址或服务 key 时返回 `None`
    pub fn from_config(baas: &BaasConfig) -> Option<Self> {
        let key = baas.service_key.clone().or_else(|| baas.anon_key.clone())?;
        Some(Self::new(baas.url.clone()?, key, baas.bucket.clone()))
    }

    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
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
            service_key: service_key.into(),
            bucket: bucket.into(),
        }
    }

    /// 公开访问地址
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    /// 上传到 `folder` 下，文件名随机生成
    pub async fn upload(
        &self,
        folder: &str,
        ext: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let path = object_path(folder, ext)?;

        let resp = self
            .client
            .post(format!(
                "{}/storage/v1/object/{}/{}",
                self.base_url, self.bucket, path
            ))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Upload(format!("{} | {}", status, text.trim())));
        }

        tracing::info!(%path, "object uploaded");
        Ok(self.public_url(&path))
    }
}

/// 生成 `folder/<uuid>.<ext>`，目录必须在白名单中，扩展名只保留字母数字
pub fn object_path(folder: &str, ext: &str) -> Result<String> {
    if !UPLOAD_FOLDERS.contains(&folder) {
        return Err(Error::Validation(format!("unknown upload folder `{folder}`")));
    }

    let ext: String = ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    if ext.is_empty() {
        return Err(Error::Validation("file extension is required".to_string()));
    }

    Ok(format!("{folder}/{}.{ext}", Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path() {
        let path = object_path("blog-images", ".PNG").expect("valid path");
        assert!(path.starts_with("blog-images/"));
        assert!(path.ends_with(".png"));

        assert!(matches!(
            object_path("../etc", "png"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            object_path("skill-icons", "../"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_public_url() {
        let storage = ObjectStorage::new("https://project.baas.example", "key", "uploads");
        assert_eq!(
            storage.public_url("blog-images/a.png"),
            "https://project.baas.example/storage/v1/object/public/uploads/blog-images/a.png"
        );
    }

    /// 访问真实对象存储的测试，需要网络和有效 key
    #[tokio::test]
    #[ignore = "需要访问对象存储"]
    async fn test_upload() {
        let storage = ObjectStorage::from_config(&crate::config::Config::from_env().unwrap().baas)
            .expect("object storage configured");
        println!(
            "{:?}",
            storage
                .upload("blog-images", "txt", "text/plain", b"hello".to_vec())
                .await
        );
    }
}
