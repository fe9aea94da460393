use serde::Serialize;

use super::{ContentRecord, locale_cmp, slugify};

/// 派生分类，每次按当前记录集合重新计算，不落库
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub label: String,
    pub count: usize,
    pub slug: String,
}

/// 按去空白后的分类名分组计数，按名称升序输出
///
/// 空分类不进入索引。同组任一记录带有 `category_slug` 时优先使用它，
/// 否则由 [`slugify`] 派生。
pub fn build_category_index<T: ContentRecord>(records: &[T]) -> Vec<Category> {
    build_index(records.iter())
}

/// 记录是否属于目标分类 slug
///
/// 先比对预存的 `category_slug`，缺失时回退到由分类名现场派生。
pub fn matches_category<T: ContentRecord>(record: &T, target_slug: &str) -> bool {
    let Some(category) = record.category().filter(|c| !c.is_empty()) else {
        return false;
    };

    if record.category_slug() == Some(target_slug) {
        return true;
    }

    slugify(category) == target_slug
}

/// 分类页标题：取第一个匹配记录的分类名
///
/// 返回 `None` 表示该分类不存在。
pub fn category_name<T: ContentRecord>(records: &[T], target_slug: &str) -> Option<String> {
    records
        .iter()
        .find(|r| matches_category(*r, target_slug))
        .and_then(|r| r.category())
        .map(str::to_string)
}

/// “浏览其他分类”推荐：排除当前分类，按文章数降序取前 `limit` 个
pub fn other_categories<T: ContentRecord>(
    records: &[T],
    current_slug: &str,
    limit: usize,
) -> Vec<Category> {
    let mut others = build_index(
        records
            .iter()
            .filter(|r| !matches_category(*r, current_slug)),
    );
    others.sort_by(|a, b| b.count.cmp(&a.count));
    others.truncate(limit);
    others
}

fn build_index<'a, T, I>(records: I) -> Vec<Category>
where
    T: ContentRecord + 'a,
    I: Iterator<Item = &'a T>,
{
    let mut index: Vec<Category> = Vec::new();

    for record in records {
        let label = record.category().unwrap_or_default().trim();
        if label.is_empty() {
            continue;
        }

        let explicit = record.category_slug().filter(|s| !s.is_empty());

        match index.iter_mut().find(|c| c.label == label) {
            Some(entry) => {
                entry.count += 1;
                if let Some(slug) = explicit {
                    entry.slug = slug.to_string();
                }
            }
            None => index.push(Category {
                label: label.to_string(),
                count: 1,
                slug: explicit.map(str::to_string).unwrap_or_else(|| slugify(label)),
            }),
        }
    }

    index.sort_by(|a, b| locale_cmp(&a.label, &b.label));
    index
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::content::Blog;

    fn blog(title: &str, category: Option<&str>, category_slug: Option<&str>) -> Blog {
        Blog {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: slugify(title),
            author: String::new(),
            excerpt: None,
            content: None,
            tags: vec![],
            featured_image: None,
            published: true,
            featured: false,
            category: category.map(String::from),
            category_slug: category_slug.map(String::from),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn test_index_groups_counts_and_sorts() {
        let records = vec![
            blog("a", Some("Web Development"), None),
            blog("b", Some("  Web Development "), None),
            blog("c", Some("DevOps & Cloud"), None),
            blog("d", None, None),
            blog("e", Some("   "), None),
            blog("f", Some(""), None),
            blog("g", Some("ai"), None),
        ];

        let index = build_category_index(&records);
        assert_eq!(
            index,
            vec![
                Category {
                    label: "ai".to_string(),
                    count: 1,
                    slug: "ai".to_string(),
                },
                Category {
                    label: "DevOps & Cloud".to_string(),
                    count: 1,
                    slug: "devops-cloud".to_string(),
                },
                Category {
                    label: "Web Development".to_string(),
                    count: 2,
                    slug: "web-development".to_string(),
                },
            ]
        );

        let with_category = records
            .iter()
            .filter(|r| r.category.as_deref().is_some_and(|c| !c.trim().is_empty()))
            .count();
        assert_eq!(index.iter().map(|c| c.count).sum::<usize>(), with_category);
    }

    #[test]
    fn test_index_prefers_explicit_slug() {
        let records = vec![
            blog("a", Some("C++ Tips"), None),
            blog("b", Some("C++ Tips"), Some("cpp-tips")),
        ];
        let index = build_category_index(&records);
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].slug, "cpp-tips");
        assert_eq!(index[0].count, 2);
    }

    #[test]
    fn test_matches_category() {
        let explicit = blog("a", Some("C++ Tips"), Some("cpp-tips"));
        assert!(matches_category(&explicit, "cpp-tips"));
        assert!(matches_category(&explicit, "c-tips"));
        assert!(!matches_category(&explicit, "rust"));

        let derived = blog("b", Some("Web Development"), None);
        assert!(matches_category(&derived, "web-development"));
        assert!(!matches_category(&derived, "Web Development"));

        let uncategorized = blog("c", None, Some("orphan"));
        assert!(!matches_category(&uncategorized, "orphan"));

        let empty = blog("d", Some(""), Some(""));
        assert!(!matches_category(&empty, ""));
    }

    #[test]
    fn test_category_name_and_not_found() {
        let records = vec![
            blog("a", Some("Rust"), None),
            blog("b", Some("Web Development"), Some("web-development")),
        ];
        assert_eq!(
            category_name(&records, "web-development").as_deref(),
            Some("Web Development")
        );
        assert_eq!(category_name(&records, "missing"), None);
    }

    #[test]
    fn test_other_categories() {
        let records = vec![
            blog("a", Some("Rust"), None),
            blog("b", Some("Go"), None),
            blog("c", Some("Go"), None),
            blog("d", Some("Web"), None),
            blog("e", Some("Web"), None),
            blog("f", Some("Web"), None),
            blog("g", Some("AI"), None),
        ];

        let others = other_categories(&records, "rust", 2);
        let labels: Vec<_> = others.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Web", "Go"]);

        let others = other_categories(&records, "web", 5);
        let labels: Vec<_> = others.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Go", "AI", "Rust"]);
    }
}
