use serde::Serialize;

use super::{
    CategoryFilter, ContentRecord, FeaturedFilter, FilterCriteria, SortBy, StatusFilter,
    apply_filters, matches_category,
};

/// 公开列表每页条数
pub const PUBLIC_PAGE_SIZE: usize = 12;
/// 管理端列表每页条数
pub const ADMIN_PAGE_SIZE: usize = 10;

/// 一页数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
        }
    }
}

/// 分页按钮，`Gap` 代表被折叠的一段页码（序列化为 `null`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageLink {
    Number(usize),
    Gap,
}

/// 切出第 `current_page` 页（从 1 开始）
///
/// 总页数至少为 1。不对页码做钳制，越界时返回空页。
pub fn paginate<T: Clone>(records: &[T], page_size: usize, current_page: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = records.len().div_ceil(page_size).max(1);

    let items = current_page
        .checked_sub(1)
        .and_then(|p| records.chunks(page_size).nth(p))
        .map(<[T]>::to_vec)
        .unwrap_or_default();

    Page {
        items,
        current_page,
        total_pages,
    }
}

/// 紧凑分页窗口：首页、末页以及当前页前后各一页可见，其余折叠为 [`PageLink::Gap`]
pub fn page_window(current_page: usize, total_pages: usize) -> Vec<PageLink> {
    let mut links = Vec::new();

    for n in 1..=total_pages {
        if n == 1 || n == total_pages || n.abs_diff(current_page) <= 1 {
            links.push(PageLink::Number(n));
        } else if links.last() != Some(&PageLink::Gap) {
            links.push(PageLink::Gap);
        }
    }

    links
}

/// 列表页状态：筛选条件、当前分类与页码
///
/// 任何筛选条件或分类的变化都会把页码重置为 1，
/// 避免旧页码指向已经变短的结果集。
#[derive(Debug, Clone)]
pub struct Listing {
    criteria: FilterCriteria,
    category: Option<String>,
    page: usize,
    page_size: usize,
}

impl Listing {
    pub fn new(page_size: usize) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            category: None,
            page: 1,
            page_size,
        }
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if self.criteria != criteria {
            self.criteria = criteria;
            self.page = 1;
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let criteria = FilterCriteria {
            search_term: term.into(),
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        let criteria = FilterCriteria {
            status,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    pub fn set_featured(&mut self, featured: FeaturedFilter) {
        let criteria = FilterCriteria {
            featured,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    pub fn set_category_filter(&mut self, category: CategoryFilter) {
        let criteria = FilterCriteria {
            category,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        let criteria = FilterCriteria {
            sort_by,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    /// 切换当前浏览的分类 slug
    pub fn set_active_category(&mut self, slug: Option<String>) {
        if self.category != slug {
            self.category = slug;
            self.page = 1;
        }
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page;
    }

    /// 分类匹配 → 条件过滤与排序 → 分页
    pub fn view<'a, T: ContentRecord>(&self, records: &'a [T]) -> Page<&'a T> {
        let in_category: Vec<&T> = match &self.category {
            Some(slug) => records
                .iter()
                .filter(|r| matches_category(*r, slug))
                .collect(),
            None => records.iter().collect(),
        };

        let filtered = apply_filters(&in_category, &self.criteria);
        let filtered: Vec<&T> = filtered.into_iter().copied().collect();

        paginate(&filtered, self.page_size, self.page)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::content::{Blog, slugify};

    fn blogs(n: usize) -> Vec<Blog> {
        (0..n)
            .map(|i| Blog {
                id: Uuid::new_v4(),
                title: format!("Post {i}"),
                slug: format!("post-{i}"),
                author: "Saran".to_string(),
                excerpt: None,
                content: None,
                tags: vec![],
                featured_image: None,
                published: true,
                featured: i % 2 == 0,
                category: Some(if i < 5 { "Rust" } else { "Web" }.to_string()),
                category_slug: None,
                created_at: DateTime::<Utc>::default() + chrono::Duration::days(i as i64),
                updated_at: DateTime::<Utc>::default(),
            })
            .collect()
    }

    #[test]
    fn test_paginate_25_by_10() {
        let records: Vec<u32> = (0..25).collect();

        let page = paginate(&records, 10, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 10);

        assert_eq!(paginate(&records, 10, 2).items.len(), 10);

        let last = paginate(&records, 10, 3);
        assert_eq!(last.items, vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_paginate_out_of_range_is_empty() {
        let records: Vec<u32> = (0..5).collect();
        assert!(paginate(&records, 10, 2).items.is_empty());
        assert!(paginate(&records, 10, 0).items.is_empty());
    }

    #[test]
    fn test_paginate_empty_has_one_page() {
        let page = paginate::<u32>(&[], 12, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_page_window() {
        use PageLink::*;

        assert_eq!(page_window(1, 1), vec![Number(1)]);
        assert_eq!(
            page_window(1, 3),
            vec![Number(1), Number(2), Number(3)]
        );
        assert_eq!(
            page_window(5, 10),
            vec![Number(1), Gap, Number(4), Number(5), Number(6), Gap, Number(10)]
        );
        assert_eq!(
            page_window(1, 6),
            vec![Number(1), Number(2), Gap, Number(6)]
        );
        assert_eq!(
            page_window(6, 6),
            vec![Number(1), Gap, Number(5), Number(6)]
        );
    }

    #[test]
    fn test_criteria_change_resets_page() {
        let records = blogs(30);
        let mut listing = Listing::new(10);
        listing.go_to(3);
        assert_eq!(listing.view(&records).items.len(), 10);

        listing.set_search_term("zzz");
        assert_eq!(listing.current_page(), 1);

        let page = listing.view(&records);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_every_setter_resets_page() {
        let mut listing = Listing::new(10);

        listing.go_to(2);
        listing.set_status(StatusFilter::Draft);
        assert_eq!(listing.current_page(), 1);

        listing.go_to(2);
        listing.set_featured(FeaturedFilter::Featured);
        assert_eq!(listing.current_page(), 1);

        listing.go_to(2);
        listing.set_sort_by(SortBy::Title);
        assert_eq!(listing.current_page(), 1);

        listing.go_to(2);
        listing.set_category_filter(CategoryFilter::Exact("Rust".to_string()));
        assert_eq!(listing.current_page(), 1);

        listing.go_to(2);
        listing.set_active_category(Some("rust".to_string()));
        assert_eq!(listing.current_page(), 1);

        // 未变化时保留页码
        listing.go_to(2);
        listing.set_active_category(Some("rust".to_string()));
        listing.set_sort_by(SortBy::Title);
        assert_eq!(listing.current_page(), 2);
    }

    #[test]
    fn test_view_narrows_by_category_then_filters() {
        let records = blogs(12);
        let mut listing = Listing::new(4);
        listing.set_active_category(Some(slugify("Web")));
        listing.set_featured(FeaturedFilter::Featured);

        let page = listing.view(&records);
        let titles: Vec<_> = page.items.iter().map(|b| b.title.as_str()).collect();
        // Web: 5..12，精选为偶数，按最新排序
        assert_eq!(titles, vec!["Post 10", "Post 8", "Post 6"]);
        assert_eq!(page.total_pages, 1);
    }
}
