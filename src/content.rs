//! 内容核心：slug、过滤排序、分类索引、作者页、分页
//!
//! 全部是内存数组上的纯函数，不依赖存储层，可直接单测。

mod author;
mod category;
mod draft;
mod filter;
mod pagination;
mod record;
mod skill;
mod slug;

pub use self::{
    author::{UNKNOWN_AUTHOR, author_label, author_name, by_author},
    category::{Category, build_category_index, category_name, matches_category, other_categories},
    draft::{
        BlogPatch, Draft, NewBlog, NewProject, NewSkill, ProjectPatch, SkillPatch, blank_to_none,
        category_pair,
    },
    filter::{
        CategoryFilter, FeaturedFilter, FilterCriteria, SortBy, StatusFilter, apply_filters,
        locale_cmp,
    },
    pagination::{
        ADMIN_PAGE_SIZE, Listing, PUBLIC_PAGE_SIZE, Page, PageLink, page_window, paginate,
    },
    record::{Blog, ContentRecord, Project, parse_timestamp, reading_time, split_display},
    skill::{Skill, SkillGroup, filter_skills, group_skills, skill_categories, sort_skills},
    slug::slugify,
};
