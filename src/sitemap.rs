//! Sitemap generation.
//!
//! Emits a sitemaps.org `<urlset>` listing the site root followed by every
//! post's internal URL in board order. Used by `rboard sitemap` and
//! `GET /sitemap.xml`.

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::Config;
use crate::context::BoardContext;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Render the sitemap for `paths`, each prefixed with `host`.
pub fn build_sitemap<S: AsRef<str>>(host: &str, paths: &[S]) -> Result<String> {
    let host = host.trim_end_matches('/');
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
    ))?;

    write_url(&mut writer, &format!("{}/", host))?;
    for path in paths {
        write_url(&mut writer, &format!("{}{}", host, path.as_ref()))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_url(writer: &mut Writer<Vec<u8>>, loc: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("url")))?;
    writer.write_event(Event::Start(BytesStart::new("loc")))?;
    writer.write_event(Event::Text(BytesText::new(loc)))?;
    writer.write_event(Event::End(BytesEnd::new("loc")))?;
    writer.write_event(Event::End(BytesEnd::new("url")))?;
    Ok(())
}

/// CLI entry point for `rboard sitemap`.
pub async fn run_sitemap(config: &Config) -> Result<()> {
    let ctx = BoardContext::load(config).await?;
    let urls = ctx.board.urls().await;
    println!("{}", build_sitemap(&config.server.host, &urls)?);
    Ok(())
}
