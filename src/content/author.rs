use super::{ContentRecord, slugify};

/// 作者为空时的展示名
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// 去空白后的作者名，空作者记为 [`UNKNOWN_AUTHOR`]
pub fn author_label<T: ContentRecord>(record: &T) -> &str {
    match record.author().map(str::trim) {
        Some(author) if !author.is_empty() => author,
        _ => UNKNOWN_AUTHOR,
    }
}

/// 由作者页 slug 反查作者名，取第一个 `slugify(作者) == slug` 的记录
pub fn author_name<T: ContentRecord>(records: &[T], slug: &str) -> Option<String> {
    if slug.is_empty() {
        return None;
    }

    records
        .iter()
        .map(author_label)
        .find(|author| slugify(author) == slug)
        .map(str::to_string)
}

/// 属于该作者的记录，保持输入顺序
pub fn by_author<'a, T: ContentRecord>(records: &'a [T], name: &str) -> Vec<&'a T> {
    records.iter().filter(|r| author_label(*r) == name).collect()
}
