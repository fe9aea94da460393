use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// 过滤、排序、分类引擎读取的公共字段
///
/// [`Blog`] 与 [`Project`] 都实现此 trait，引擎本身不关心具体类型。
pub trait ContentRecord {
    fn id(&self) -> Uuid;
    fn title(&self) -> &str;
    fn slug(&self) -> &str;
    /// 摘要：博客为 `excerpt`，项目为 `description`
    fn summary(&self) -> Option<&str>;
    fn author(&self) -> Option<&str>;
    /// 标签：博客为 `tags`，项目为 `technologies`
    fn tags(&self) -> &[String];
    fn category(&self) -> Option<&str>;
    fn category_slug(&self) -> Option<&str>;
    fn published(&self) -> bool;
    fn featured(&self) -> bool;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;

    /// [`SortBy::Author`](super::SortBy::Author) 使用的排序字段
    ///
    /// 博客按作者排序，项目按分类排序。
    fn sort_label(&self) -> &str;
}

impl<T: ContentRecord + ?Sized> ContentRecord for &T {
    fn id(&self) -> Uuid {
        (**self).id()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn slug(&self) -> &str {
        (**self).slug()
    }

    fn summary(&self) -> Option<&str> {
        (**self).summary()
    }

    fn author(&self) -> Option<&str> {
        (**self).author()
    }

    fn tags(&self) -> &[String] {
        (**self).tags()
    }

    fn category(&self) -> Option<&str> {
        (**self).category()
    }

    fn category_slug(&self) -> Option<&str> {
        (**self).category_slug()
    }

    fn published(&self) -> bool {
        (**self).published()
    }

    fn featured(&self) -> bool {
        (**self).featured()
    }

    fn created_at(&self) -> DateTime<Utc> {
        (**self).created_at()
    }

    fn updated_at(&self) -> DateTime<Utc> {
        (**self).updated_at()
    }

    fn sort_label(&self) -> &str {
        (**self).sort_label()
    }
}

/// 博客文章
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default, deserialize_with = "nullable")]
    pub author: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub published: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub featured: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_slug: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// 作品项目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub published: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub featured: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord for Blog {
    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn summary(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }

    fn author(&self) -> Option<&str> {
        Some(&self.author)
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn category_slug(&self) -> Option<&str> {
        self.category_slug.as_deref()
    }

    fn published(&self) -> bool {
        self.published
    }

    fn featured(&self) -> bool {
        self.featured
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn sort_label(&self) -> &str {
        &self.author
    }
}

impl ContentRecord for Project {
    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn summary(&self) -> Option<&str> {
        Some(&self.description)
    }

    fn author(&self) -> Option<&str> {
        None
    }

    fn tags(&self) -> &[String] {
        &self.technologies
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn category_slug(&self) -> Option<&str> {
        self.category_slug.as_deref()
    }

    fn published(&self) -> bool {
        self.published
    }

    fn featured(&self) -> bool {
        self.featured
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn sort_label(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }
}

/// 估算阅读时长（分钟）
///
/// 按每分钟 200 词计算，向上取整，最少 1 分钟。
pub fn reading_time(content: Option<&str>) -> u32 {
    const WORDS_PER_MINUTE: usize = 200;

    let words = content.map(|c| c.split_whitespace().count()).unwrap_or(0);
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// 取前 `n` 个标签用于展示，并返回剩余数量（"+K more"）
pub fn split_display(tags: &[String], n: usize) -> (&[String], usize) {
    let shown = &tags[..tags.len().min(n)];
    (shown, tags.len() - shown.len())
}

/// `null` 视为类型默认值
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 宽松的时间解析
///
/// 依次尝试 RFC 3339、带时分秒、仅日期的格式，全部失败（或为 `null`）
/// 时落到 Unix 纪元，在“最新”排序中排到最后，不会报错。
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.as_deref().map(parse_timestamp).unwrap_or_default())
}

/// 解析时间字符串，无法解析时返回 Unix 纪元
pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }

    for fmt in &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return naive_dt.and_utc();
        }
    }

    for fmt in &["%Y-%m-%d", "%Y/%m/%d"] {
        if let Some(naive_dt) = NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return naive_dt.and_utc();
        }
    }

    tracing::debug!(value = s, "unparseable timestamp, falling back to epoch");
    DateTime::<Utc>::default()
}
