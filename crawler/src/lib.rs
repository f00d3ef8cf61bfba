use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use newsradar_core::{Ingest, RawRecord};
use reqwest::Client;
use url::Url;
use scraper::{Html, Selector};
use std::io::Write;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

pub const DEFAULT_SOURCE_URL: &str = "https://news.google.com/search?q=cybersecurity&hl=en-IN&gl=IN&ceid=IN%3Aen";
pub const DEFAULT_USER_AGENT: &str = "newsradar-bot/0.1 (+https://example.com/bot)";
const LINK_BASE: &str = "https://news.google.com/";

lazy_static! {
    static ref SEL_ARTICLE: Selector = Selector::parse("article").expect("valid selector");
    static ref SEL_HEADLINE: Selector = Selector::parse("a.JtKRv").expect("valid selector");
    static ref SEL_TIME: Selector = Selector::parse("time").expect("valid selector");
}

/// Scrapes headline triples from a news search results page.
#[derive(Debug, Clone)]
pub struct NewsSource {
    client: Client,
    url: Url,
}

impl NewsSource {
    pub fn new(url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url: Url::parse(url)? })
    }

    pub fn url(&self) -> &Url { &self.url }

    pub async fn fetch(&self) -> Result<Vec<RawRecord>> {
        let resp = self.client.get(self.url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("{} returned {}", self.url, resp.status()));
        }
        let body = resp.text().await?;
        let records = parse_articles(&body);
        tracing::debug!(url = %self.url, bytes = body.len(), records = records.len(), "fetched news page");
        Ok(records)
    }
}

impl Ingest for NewsSource {
    async fn ingest(&self) -> Result<Vec<RawRecord>> {
        self.fetch().await
    }
}

/// Extract one record per `<article>` that carries a headline anchor.
pub fn parse_articles(html: &str) -> Vec<RawRecord> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();
    for article in doc.select(&SEL_ARTICLE) {
        let Some(anchor) = article.select(&SEL_HEADLINE).next() else { continue };
        let headline = anchor.text().collect::<String>();
        let link = anchor.value().attr("href").and_then(resolve_link).unwrap_or_default();
        let date = article
            .select(&SEL_TIME)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .and_then(reverse_date);
        out.push(RawRecord::new(headline, link, date));
    }
    out
}

/// Resolve a page-relative href such as `./read/abc` against the news host.
pub fn resolve_link(href: &str) -> Option<String> {
    let base = Url::parse(LINK_BASE).ok()?;
    base.join(href).ok().map(String::from)
}

/// `2024-01-05T08:00:00Z` -> `05-01-2024`.
pub fn reverse_date(datetime: &str) -> Option<String> {
    let parsed = OffsetDateTime::parse(datetime, &Rfc3339).ok()?;
    parsed.format(format_description!("[day]-[month]-[year]")).ok()
}

/// Write records as CSV with a `Headline,Link,Date` header.
pub fn write_csv<W: Write>(records: &[RawRecord], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["Headline", "Link", "Date"])?;
    for r in records {
        wtr.write_record([r.headline.as_str(), r.link.as_str(), r.date.as_deref().unwrap_or("")])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <article>
            <a class="JtKRv" href="./read/CBMiabc?hl=en-IN">Ransomware hits Mumbai hospital</a>
            <time datetime="2024-01-05T08:30:00Z">2 days ago</time>
        </article>
        <article><a class="other" href="./read/x">No headline anchor</a></article>
        <article>
            <a class="JtKRv" href="./read/CBMidef">Phishing wave in Delhi</a>
        </article>
    </body></html>"#;

    #[test]
    fn extracts_headlines_links_and_dates() {
        let recs = parse_articles(PAGE);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].headline, "Ransomware hits Mumbai hospital");
        assert_eq!(recs[0].link, "https://news.google.com/read/CBMiabc?hl=en-IN");
        assert_eq!(recs[0].date.as_deref(), Some("05-01-2024"));
        assert_eq!(recs[1].date, None);
    }

    #[test]
    fn bad_datetime_has_no_date() {
        assert_eq!(reverse_date("yesterday"), None);
    }

    #[test]
    fn csv_output_loads_back_as_corpus() {
        let mut buf = Vec::new();
        write_csv(&parse_articles(PAGE), &mut buf).unwrap();
        let (corpus, report) = newsradar_core::Corpus::load_csv(buf.as_slice()).unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(corpus.get(1).unwrap().headline(), "Phishing wave in Delhi");
    }
}
