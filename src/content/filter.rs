use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::ContentRecord;

/// 发布状态筛选（仅管理端使用）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Published,
    Draft,
}

/// 精选筛选
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeaturedFilter {
    #[default]
    All,
    Featured,
    #[serde(alias = "not-featured")]
    Regular,
}

/// 排序方式
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    Title,
    /// 博客按作者，项目按分类，参见 [`ContentRecord::sort_label`]
    #[serde(alias = "category")]
    Author,
}

/// 分类标签精确匹配
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Exact(String),
}

impl CategoryFilter {
    /// `None`、空串与 `"all"` 都表示不过滤
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            None | Some("") | Some("all") => Self::All,
            Some(label) => Self::Exact(label.to_string()),
        }
    }
}

/// 列表页的筛选条件，由界面持有，不落库
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_term: String,
    pub status: StatusFilter,
    pub featured: FeaturedFilter,
    pub category: CategoryFilter,
    pub sort_by: SortBy,
}

impl FilterCriteria {
    /// 四个条件同时满足才保留
    pub fn matches<T: ContentRecord>(&self, record: &T) -> bool {
        self.matches_search(record)
            && self.matches_status(record)
            && self.matches_featured(record)
            && self.matches_category(record)
    }

    fn matches_search<T: ContentRecord>(&self, record: &T) -> bool {
        let q = self.search_term.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }

        let contains = |field: &str| field.to_lowercase().contains(&q);

        contains(record.title())
            || record.summary().is_some_and(contains)
            || record.author().is_some_and(contains)
            || record.tags().iter().any(|tag| contains(tag))
    }

    fn matches_status<T: ContentRecord>(&self, record: &T) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Published => record.published(),
            StatusFilter::Draft => !record.published(),
        }
    }

    fn matches_featured<T: ContentRecord>(&self, record: &T) -> bool {
        match self.featured {
            FeaturedFilter::All => true,
            FeaturedFilter::Featured => record.featured(),
            FeaturedFilter::Regular => !record.featured(),
        }
    }

    fn matches_category<T: ContentRecord>(&self, record: &T) -> bool {
        match &self.category {
            CategoryFilter::All => true,
            // 与分类索引一致，按去空白后的名称比较
            CategoryFilter::Exact(label) => {
                record.category().map(str::trim) == Some(label.as_str())
            }
        }
    }

    fn compare<T: ContentRecord>(&self, a: &T, b: &T) -> Ordering {
        match self.sort_by {
            SortBy::Newest => b.created_at().cmp(&a.created_at()),
            SortBy::Oldest => a.created_at().cmp(&b.created_at()),
            SortBy::Title => locale_cmp(a.title(), b.title()),
            SortBy::Author => locale_cmp(a.sort_label(), b.sort_label()),
        }
    }
}

/// 先按条件过滤，再稳定排序
///
/// 相同排序键的记录保持输入顺序。
pub fn apply_filters<'a, T: ContentRecord>(
    records: &'a [T],
    criteria: &FilterCriteria,
) -> Vec<&'a T> {
    let mut retained: Vec<&T> = records.iter().filter(|r| criteria.matches(*r)).collect();
    retained.sort_by(|a, b| criteria.compare(*a, *b));
    retained
}

/// 近似本地化的字符串比较：先忽略大小写比较，再以原文决胜负
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded.then_with(|| a.cmp(b))
}
