use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CategoryFilter, locale_cmp, record::lenient_timestamp, record::nullable};

/// 技能条目，没有草稿状态，全部公开
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default = "default_skill_category")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable")]
    pub featured: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn default_skill_category() -> String {
    "other".to_string()
}

/// 同一分类下的技能
#[derive(Debug, Serialize)]
pub struct SkillGroup<'a> {
    pub category: &'a str,
    pub skills: Vec<&'a Skill>,
}

/// 公开展示顺序：精选在前，再按名称升序
pub fn sort_skills(skills: &mut [Skill]) {
    skills.sort_by(|a, b| {
        b.featured
            .cmp(&a.featured)
            .then_with(|| locale_cmp(&a.name, &b.name))
    });
}

/// 按分类精确过滤
pub fn filter_skills<'a>(skills: &'a [Skill], category: &CategoryFilter) -> Vec<&'a Skill> {
    skills
        .iter()
        .filter(|s| match category {
            CategoryFilter::All => true,
            CategoryFilter::Exact(c) => &s.category == c,
        })
        .collect()
}

/// 所有出现过的分类，保持首次出现顺序
pub fn skill_categories(skills: &[Skill]) -> Vec<&str> {
    let mut categories: Vec<&str> = Vec::new();
    for skill in skills {
        if !categories.contains(&skill.category.as_str()) {
            categories.push(&skill.category);
        }
    }
    categories
}

/// 按分类分组，组的顺序为首次出现顺序，组内保持输入顺序
pub fn group_skills<'a>(skills: &[&'a Skill]) -> Vec<SkillGroup<'a>> {
    let mut groups: Vec<SkillGroup<'a>> = Vec::new();

    for &skill in skills {
        match groups.iter_mut().find(|g| g.category == skill.category) {
            Some(group) => group.skills.push(skill),
            None => groups.push(SkillGroup {
                category: &skill.category,
                skills: vec![skill],
            }),
        }
    }

    groups
}
