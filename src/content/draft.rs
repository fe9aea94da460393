//! 管理端表单提交的数据：新建与部分更新
//!
//! 校验在任何存储调用之前完成；`slug` 与 `category_slug` 在写入时派生。

use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use super::{skill::default_skill_category, slugify};
use crate::error::{Error, Result};

/// 可提交到存储层的表单数据
pub trait Draft: DeserializeOwned + Send + Sync + 'static {
    /// 必填字段校验
    fn validate(&self) -> Result<()>;
}

/// 新建博客
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewBlog {
    pub title: String,
    /// 留空时由标题派生
    pub slug: String,
    pub author: String,
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub category: Option<String>,
    pub published: bool,
    pub featured: bool,
}

/// 新建项目
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewProject {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub demo_url: Option<String>,
    pub repo_url: Option<String>,
    #[serde(deserialize_with = "tag_list")]
    pub technologies: Vec<String>,
    pub category: Option<String>,
    pub published: bool,
    pub featured: bool,
}

/// 新建技能
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewSkill {
    pub name: String,
    pub icon_url: Option<String>,
    pub website_url: Option<String>,
    pub category: String,
    pub featured: bool,
}

impl Default for NewSkill {
    fn default() -> Self {
        Self {
            name: String::new(),
            icon_url: None,
            website_url: None,
            category: default_skill_category(),
            featured: false,
        }
    }
}

/// 博客部分更新，`None` 表示不修改
///
/// 可空字段传空串表示清空。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub author: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    #[serde(deserialize_with = "optional_tag_list")]
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

/// 项目部分更新
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub demo_url: Option<String>,
    pub repo_url: Option<String>,
    #[serde(deserialize_with = "optional_tag_list")]
    pub technologies: Option<Vec<String>>,
    pub category: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

/// 技能部分更新
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub icon_url: Option<String>,
    pub website_url: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
}

impl NewBlog {
    /// 最终写入的 slug
    pub fn resolved_slug(&self) -> String {
        resolve_slug(&self.title, &self.slug)
    }
}

impl NewProject {
    pub fn resolved_slug(&self) -> String {
        resolve_slug(&self.title, &self.slug)
    }
}

impl Draft for NewBlog {
    fn validate(&self) -> Result<()> {
        required("title", &self.title)?;
        required("content", &self.content)?;
        non_degenerate_category(self.category.as_deref())?;
        non_degenerate_slug(&self.resolved_slug())
    }
}

impl Draft for NewProject {
    fn validate(&self) -> Result<()> {
        required("title", &self.title)?;
        required("description", &self.description)?;
        non_degenerate_category(self.category.as_deref())?;
        non_degenerate_slug(&self.resolved_slug())
    }
}

impl Draft for NewSkill {
    fn validate(&self) -> Result<()> {
        required("name", &self.name)
    }
}

impl Draft for BlogPatch {
    fn validate(&self) -> Result<()> {
        optional_required("title", self.title.as_deref())?;
        optional_required("content", self.content.as_deref())?;
        non_degenerate_category(self.category.as_deref())?;
        match &self.slug {
            Some(slug) => non_degenerate_slug(&slugify(slug)),
            None => Ok(()),
        }
    }
}

impl Draft for ProjectPatch {
    fn validate(&self) -> Result<()> {
        optional_required("title", self.title.as_deref())?;
        optional_required("description", self.description.as_deref())?;
        non_degenerate_category(self.category.as_deref())?;
        match &self.slug {
            Some(slug) => non_degenerate_slug(&slugify(slug)),
            None => Ok(()),
        }
    }
}

impl Draft for SkillPatch {
    fn validate(&self) -> Result<()> {
        optional_required("name", self.name.as_deref())
    }
}

/// 由分类名得到 `(category, category_slug)`，空白分类两者都为 `None`
pub fn category_pair(category: Option<&str>) -> (Option<String>, Option<String>) {
    match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => (Some(c.to_string()), Some(slugify(c))),
        None => (None, None),
    }
}

/// 空串视为清空
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn resolve_slug(title: &str, slug: &str) -> String {
    if slug.trim().is_empty() {
        slugify(title)
    } else {
        slugify(slug)
    }
}

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("`{field}` is required")));
    }
    Ok(())
}

fn optional_required(field: &str, value: Option<&str>) -> Result<()> {
    value.map_or(Ok(()), |v| required(field, v))
}

fn non_degenerate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(Error::Validation(
            "slug would be empty, use letters or digits in the title or slug".to_string(),
        ));
    }
    Ok(())
}

/// 非空分类必须能派生出非空 slug，否则分类页无法访问
fn non_degenerate_category(category: Option<&str>) -> Result<()> {
    match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) if slugify(c).is_empty() => Err(Error::Validation(format!(
            "category `{c}` has no letters or digits to build a link from"
        ))),
        _ => Ok(()),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagInput {
    Joined(String),
    List(Vec<String>),
}

impl TagInput {
    fn into_tags(self) -> Vec<String> {
        let raw = match self {
            TagInput::Joined(s) => s.split(',').map(str::to_string).collect(),
            TagInput::List(list) => list,
        };
        raw.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// 标签既可以是逗号分隔的字符串，也可以是数组
fn tag_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TagInput>::deserialize(deserializer)?
        .map(TagInput::into_tags)
        .unwrap_or_default())
}

fn optional_tag_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TagInput>::deserialize(deserializer)?.map(TagInput::into_tags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_blog_requires_title_and_content() {
        let blog = NewBlog {
            title: "  ".to_string(),
            content: "body".to_string(),
            ..Default::default()
        };
        assert!(matches!(blog.validate(), Err(Error::Validation(_))));

        let blog = NewBlog {
            title: "Hello".to_string(),
            content: String::new(),
            ..Default::default()
        };
        assert!(matches!(blog.validate(), Err(Error::Validation(_))));

        let blog = NewBlog {
            title: "Hello".to_string(),
            content: "body".to_string(),
            ..Default::default()
        };
        assert!(blog.validate().is_ok());
    }

    #[test]
    fn test_symbol_only_title_is_rejected() {
        let blog = NewBlog {
            title: "!!!".to_string(),
            content: "body".to_string(),
            ..Default::default()
        };
        assert!(matches!(blog.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_slug_override() {
        let project = NewProject {
            title: "My Project".to_string(),
            slug: "Custom Slug!".to_string(),
            description: "desc".to_string(),
            ..Default::default()
        };
        assert_eq!(project.resolved_slug(), "custom-slug");

        let project = NewProject {
            slug: "   ".to_string(),
            ..project
        };
        assert_eq!(project.resolved_slug(), "my-project");
    }

    #[test]
    fn test_tags_from_string_or_list() {
        let blog: NewBlog = serde_json::from_value(serde_json::json!({
            "title": "t",
            "content": "c",
            "tags": "rust, web ,, axum ",
        }))
        .unwrap();
        assert_eq!(blog.tags, vec!["rust", "web", "axum"]);

        let blog: NewBlog = serde_json::from_value(serde_json::json!({
            "title": "t",
            "content": "c",
            "tags": ["rust", " "],
        }))
        .unwrap();
        assert_eq!(blog.tags, vec!["rust"]);

        let patch: BlogPatch = serde_json::from_value(serde_json::json!({
            "published": true,
        }))
        .unwrap();
        assert!(patch.tags.is_none());
        assert_eq!(patch.published, Some(true));
    }

    #[test]
    fn test_patch_validation() {
        let patch = BlogPatch {
            title: Some("".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = ProjectPatch {
            featured: Some(true),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());

        let patch = SkillPatch {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_symbol_only_category_is_rejected() {
        let blog = NewBlog {
            title: "Hello".to_string(),
            content: "body".to_string(),
            category: Some("中文 !!!".to_string()),
            ..Default::default()
        };
        assert!(matches!(blog.validate(), Err(Error::Validation(_))));

        let blog = NewBlog {
            category: Some("   ".to_string()),
            ..blog
        };
        assert!(blog.validate().is_ok());

        let project = NewProject {
            title: "Folio".to_string(),
            description: "desc".to_string(),
            category: Some("???".to_string()),
            ..Default::default()
        };
        assert!(matches!(project.validate(), Err(Error::Validation(_))));

        let patch = BlogPatch {
            category: Some("!!!".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = ProjectPatch {
            category: Some("Web Dev".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_category_pair() {
        assert_eq!(
            category_pair(Some(" Web Development ")),
            (
                Some("Web Development".to_string()),
                Some("web-development".to_string())
            )
        );
        assert_eq!(category_pair(Some("  ")), (None, None));
        assert_eq!(category_pair(None), (None, None));
    }
}
