use std::cmp::Ordering;

use serde::{Serialize, de::DeserializeOwned};
use sqlx::{Postgres, postgres::PgRow, query_builder::Separated};
use uuid::Uuid;

use crate::content::{
    Blog, BlogPatch, ContentRecord, Draft, NewBlog, NewProject, NewSkill, Project, ProjectPatch, Skill,
    SkillPatch, blank_to_none, category_pair, locale_cmp, slugify,
};

/// 写入单元格的值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Nullable(Option<String>),
    Flag(bool),
    List(Vec<String>),
}

/// 一组 `(列名, 值)`
pub type Fields = Vec<(&'static str, Value)>;

impl Value {
    pub(crate) fn bind<'a>(self, sep: &mut Separated<'_, 'a, Postgres, &'static str>) {
        match self {
            Value::Text(v) => {
                sep.push_bind_unseparated(v);
            }
            Value::Nullable(v) => {
                sep.push_bind_unseparated(v);
            }
            Value::Flag(v) => {
                sep.push_bind_unseparated(v);
            }
            Value::List(v) => {
                sep.push_bind_unseparated(v);
            }
        }
    }

    pub(crate) fn into_json(self) -> serde_json::Value {
        match self {
            Value::Text(v) => v.into(),
            Value::Nullable(v) => v.into(),
            Value::Flag(v) => v.into(),
            Value::List(v) => v.into(),
        }
    }
}

/// 一张内容表
///
/// 描述表名、默认排序，以及表单数据如何落到列上。
pub trait Table:
    Clone
    + Send
    + Sync
    + Unpin
    + Serialize
    + DeserializeOwned
    + for<'r> sqlx::FromRow<'r, PgRow>
    + 'static
{
    const NAME: &'static str;
    /// 提示信息中使用的名称，例如 `Blog post`
    const LABEL: &'static str;
    /// 列表 SQL 排序子句
    const ORDER_BY: &'static str;

    type New: Draft;
    type Patch: Draft;

    /// 主键
    fn row_id(&self) -> Uuid;

    /// 与 [`Table::ORDER_BY`] 一致的内存排序
    fn list_order(a: &Self, b: &Self) -> Ordering;

    fn insert_fields(new: Self::New) -> Fields;

    fn patch_fields(patch: Self::Patch) -> Fields;
}

impl Table for Blog {
    const NAME: &'static str = "blogs";
    const LABEL: &'static str = "Blog post";
    const ORDER_BY: &'static str = "created_at DESC";

    type New = NewBlog;
    type Patch = BlogPatch;

    fn row_id(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at)
    }

    fn insert_fields(new: NewBlog) -> Fields {
        let slug = new.resolved_slug();
        let (category, category_slug) = category_pair(new.category.as_deref());

        vec![
            ("title", Value::Text(new.title.trim().to_string())),
            ("slug", Value::Text(slug)),
            ("author", Value::Text(new.author.trim().to_string())),
            ("excerpt", Value::Nullable(blank_to_none(new.excerpt))),
            ("content", Value::Nullable(Some(new.content))),
            ("tags", Value::List(new.tags)),
            ("featured_image", Value::Nullable(blank_to_none(new.featured_image))),
            ("category", Value::Nullable(category)),
            ("category_slug", Value::Nullable(category_slug)),
            ("published", Value::Flag(new.published)),
            ("featured", Value::Flag(new.featured)),
        ]
    }

    fn patch_fields(patch: BlogPatch) -> Fields {
        let mut fields = Fields::new();

        if let Some(title) = patch.title {
            fields.push(("title", Value::Text(title.trim().to_string())));
        }
        if let Some(slug) = patch.slug {
            fields.push(("slug", Value::Text(slugify(slug))));
        }
        if let Some(author) = patch.author {
            fields.push(("author", Value::Text(author.trim().to_string())));
        }
        if let Some(excerpt) = patch.excerpt {
            fields.push(("excerpt", Value::Nullable(blank_to_none(Some(excerpt)))));
        }
        if let Some(content) = patch.content {
            fields.push(("content", Value::Nullable(Some(content))));
        }
        if let Some(tags) = patch.tags {
            fields.push(("tags", Value::List(tags)));
        }
        if let Some(image) = patch.featured_image {
            fields.push(("featured_image", Value::Nullable(blank_to_none(Some(image)))));
        }
        push_category(&mut fields, patch.category);
        push_flags(&mut fields, patch.published, patch.featured);

        fields
    }
}

impl Table for Project {
    const NAME: &'static str = "projects";
    const LABEL: &'static str = "Project";
    const ORDER_BY: &'static str = "created_at DESC";

    type New = NewProject;
    type Patch = ProjectPatch;

    fn row_id(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at)
    }

    fn insert_fields(new: NewProject) -> Fields {
        let slug = new.resolved_slug();
        let (category, category_slug) = category_pair(new.category.as_deref());

        vec![
            ("title", Value::Text(new.title.trim().to_string())),
            ("slug", Value::Text(slug)),
            ("description", Value::Text(new.description.trim().to_string())),
            ("content", Value::Nullable(blank_to_none(new.content))),
            ("featured_image", Value::Nullable(blank_to_none(new.featured_image))),
            ("demo_url", Value::Nullable(blank_to_none(new.demo_url))),
            ("repo_url", Value::Nullable(blank_to_none(new.repo_url))),
            ("technologies", Value::List(new.technologies)),
            ("category", Value::Nullable(category)),
            ("category_slug", Value::Nullable(category_slug)),
            ("published", Value::Flag(new.published)),
            ("featured", Value::Flag(new.featured)),
        ]
    }

    fn patch_fields(patch: ProjectPatch) -> Fields {
        let mut fields = Fields::new();

        if let Some(title) = patch.title {
            fields.push(("title", Value::Text(title.trim().to_string())));
        }
        if let Some(slug) = patch.slug {
            fields.push(("slug", Value::Text(slugify(slug))));
        }
        if let Some(description) = patch.description {
            fields.push(("description", Value::Text(description.trim().to_string())));
        }
        for (column, value) in [
            ("content", patch.content),
            ("featured_image", patch.featured_image),
            ("demo_url", patch.demo_url),
            ("repo_url", patch.repo_url),
        ] {
            if let Some(value) = value {
                fields.push((column, Value::Nullable(blank_to_none(Some(value)))));
            }
        }
        if let Some(technologies) = patch.technologies {
            fields.push(("technologies", Value::List(technologies)));
        }
        push_category(&mut fields, patch.category);
        push_flags(&mut fields, patch.published, patch.featured);

        fields
    }
}

impl Table for Skill {
    const NAME: &'static str = "skills";
    const LABEL: &'static str = "Skill";
    const ORDER_BY: &'static str = "featured DESC, name ASC";

    type New = NewSkill;
    type Patch = SkillPatch;

    fn row_id(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        b.featured
            .cmp(&a.featured)
            .then_with(|| locale_cmp(&a.name, &b.name))
    }

    fn insert_fields(new: NewSkill) -> Fields {
        vec![
            ("name", Value::Text(new.name.trim().to_string())),
            ("icon_url", Value::Nullable(blank_to_none(new.icon_url))),
            ("website_url", Value::Nullable(blank_to_none(new.website_url))),
            ("category", Value::Text(new.category.trim().to_lowercase())),
            ("featured", Value::Flag(new.featured)),
        ]
    }

    fn patch_fields(patch: SkillPatch) -> Fields {
        let mut fields = Fields::new();

        if let Some(name) = patch.name {
            fields.push(("name", Value::Text(name.trim().to_string())));
        }
        if let Some(icon_url) = patch.icon_url {
            fields.push(("icon_url", Value::Nullable(blank_to_none(Some(icon_url)))));
        }
        if let Some(website_url) = patch.website_url {
            fields.push(("website_url", Value::Nullable(blank_to_none(Some(website_url)))));
        }
        if let Some(category) = patch.category {
            fields.push(("category", Value::Text(category.trim().to_lowercase())));
        }
        push_flags(&mut fields, None, patch.featured);

        fields
    }
}

/// 可在管理列表中切换发布、精选状态的内容
pub trait Flagged: Table + ContentRecord {
    fn set_published(&mut self, published: bool);
    fn set_featured(&mut self, featured: bool);
    fn flag_patch(published: Option<bool>, featured: Option<bool>) -> Self::Patch;
}

impl Flagged for Blog {
    fn set_published(&mut self, published: bool) {
        self.published = published;
    }

    fn set_featured(&mut self, featured: bool) {
        self.featured = featured;
    }

    fn flag_patch(published: Option<bool>, featured: Option<bool>) -> BlogPatch {
        BlogPatch {
            published,
            featured,
            ..Default::default()
        }
    }
}

impl Flagged for Project {
    fn set_published(&mut self, published: bool) {
        self.published = published;
    }

    fn set_featured(&mut self, featured: bool) {
        self.featured = featured;
    }

    fn flag_patch(published: Option<bool>, featured: Option<bool>) -> ProjectPatch {
        ProjectPatch {
            published,
            featured,
            ..Default::default()
        }
    }
}

/// 分类变化时同时重算 `category_slug`
fn push_category(fields: &mut Fields, category: Option<String>) {
    if let Some(category) = category {
        let (category, category_slug) = category_pair(Some(&category));
        fields.push(("category", Value::Nullable(category)));
        fields.push(("category_slug", Value::Nullable(category_slug)));
    }
}

fn push_flags(fields: &mut Fields, published: Option<bool>, featured: Option<bool>) {
    if let Some(published) = published {
        fields.push(("published", Value::Flag(published)));
    }
    if let Some(featured) = featured {
        fields.push(("featured", Value::Flag(featured)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(fields: &'a Fields, column: &str) -> Option<&'a Value> {
        fields.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    #[test]
    fn test_blog_insert_precomputes_slugs() {
        let fields = Blog::insert_fields(NewBlog {
            title: " Hello, World! ".to_string(),
            content: "body".to_string(),
            category: Some("Web Development".to_string()),
            excerpt: Some("".to_string()),
            ..Default::default()
        });

        assert_eq!(
            field(&fields, "slug"),
            Some(&Value::Text("hello-world".to_string()))
        );
        assert_eq!(
            field(&fields, "category_slug"),
            Some(&Value::Nullable(Some("web-development".to_string())))
        );
        assert_eq!(field(&fields, "excerpt"), Some(&Value::Nullable(None)));
    }

    #[test]
    fn test_patch_only_touches_given_columns() {
        let fields = Project::patch_fields(ProjectPatch {
            published: Some(true),
            ..Default::default()
        });
        assert_eq!(fields, vec![("published", Value::Flag(true))]);

        let fields = Blog::patch_fields(BlogPatch {
            category: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(
            fields,
            vec![
                ("category", Value::Nullable(None)),
                ("category_slug", Value::Nullable(None)),
            ]
        );
    }

    #[test]
    fn test_skill_category_normalized() {
        let fields = Skill::insert_fields(NewSkill {
            name: "Rust".to_string(),
            category: " Backend ".to_string(),
            ..Default::default()
        });
        assert_eq!(
            field(&fields, "category"),
            Some(&Value::Text("backend".to_string()))
        );
    }
}
