use axum::{
    Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};

use super::query::blog_path;
use crate::{
    content::{Blog, ContentRecord, Project},
    state::AppState,
    storage::Store,
};

pub(super) fn setup_route<S: Store>() -> Router<AppState<S>> {
    Router::new().route("/sitemap.xml", get(sitemap::<S>))
}

struct Entry {
    loc: String,
    lastmod: Option<DateTime<Utc>>,
    priority: &'static str,
}

/// 公开页面的站点地图，读取失败的集合直接省略
async fn sitemap<S: Store>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let (blogs, _) = state.service().published_or_empty::<Blog>().await;
    let (projects, _) = state.service().published_or_empty::<Project>().await;

    let xml = render(state.site_url(), &blogs, &projects);
    ([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml)
}

fn render(site_url: &str, blogs: &[Blog], projects: &[Project]) -> String {
    let mut entries = vec![
        Entry {
            loc: site_url.to_string(),
            lastmod: None,
            priority: "1.0",
        },
        Entry {
            loc: format!("{site_url}/blogs"),
            lastmod: None,
            priority: "0.8",
        },
        Entry {
            loc: format!("{site_url}/projects"),
            lastmod: None,
            priority: "0.8",
        },
    ];

    entries.extend(blogs.iter().map(|b| Entry {
        loc: format!("{site_url}{}", blog_path(b)),
        lastmod: Some(lastmod(b)),
        priority: "0.7",
    }));
    entries.extend(projects.iter().map(|p| Entry {
        loc: format!("{site_url}/projects/{}", p.slug),
        lastmod: Some(lastmod(p)),
        priority: "0.7",
    }));

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape(&entry.loc)));
        if let Some(date) = entry.lastmod {
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                date.format("%Y-%m-%d")
            ));
        }
        xml.push_str("    <changefreq>weekly</changefreq>\n");
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// 更新时间缺失（落到纪元）时取创建时间
fn lastmod<T: ContentRecord>(record: &T) -> DateTime<Utc> {
    if record.updated_at() == DateTime::<Utc>::UNIX_EPOCH {
        record.created_at()
    } else {
        record.updated_at()
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
