/// 将任意文本规整为 URL 安全的 slug
///
/// 规则：
///
/// 1. 转为小写
/// 2. 去掉除 ASCII 小写字母、数字、空白、`-` 以外的所有字符
/// 3. 连续空白替换为单个 `-`
/// 4. 连续 `-` 折叠为一个
/// 5. 去掉首尾的 `-` 与空白
///
/// 写入时生成 `slug`/`category_slug` 与读取时的分类匹配都走这一个函数，
/// 两边结果必须逐字节一致。
///
/// ```
/// assert_eq!(folio::content::slugify("Hello, World!  Foo--Bar "), "hello-world-foo-bar");
/// ```
pub fn slugify(input: impl AsRef<str>) -> String {
    let mut slug = String::with_capacity(input.as_ref().len());

    for c in input.as_ref().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-') && !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    // 末尾至多残留一个 `-`
    if slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello, World!  Foo--Bar "), "hello-world-foo-bar");
        assert_eq!(slugify("Rust & WebAssembly"), "rust-webassembly");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
        assert_eq!(slugify("--already-a-slug--"), "already-a-slug");
        assert_eq!(slugify("Next.js 14"), "nextjs-14");
    }

    #[test]
    fn test_slugify_degenerate_input() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(" - - "), "");
    }

    #[test]
    fn test_slugify_strips_non_ascii_letters() {
        assert_eq!(slugify("Café Crème"), "caf-crme");
        assert_eq!(slugify("中文 标题"), "");
        assert_eq!(slugify("Tab\tand\nnewline"), "tab-and-newline");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        for input in [
            "Hello, World!  Foo--Bar ",
            "Web Development",
            "  --x--  y  ",
            "Café",
            "a_b_c",
            "",
            "UPPER lower 123",
        ] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input: {input:?}");
        }
    }
}
