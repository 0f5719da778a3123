use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html};

use super::{FetchError, Fetched, Fetcher};

/// Characters escaped when a page key is placed in an article URL.
/// `%` is left alone so keys pasted in escaped form pass through.
const PAGE_KEY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Fetches article HTML from Wikipedia (or anything serving `/wiki/<page>`).
pub struct WikipediaFetcher {
    base_url: String,
    client: Client,
}

impl WikipediaFetcher {
    /// `base_url` is the article prefix, e.g. `https://en.wikipedia.org/wiki/`.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    fn page_url(&self, page: &str) -> String {
        format!("{}{}", self.base_url, utf8_percent_encode(page, PAGE_KEY))
    }
}

#[async_trait]
impl Fetcher for WikipediaFetcher {
    async fn fetch(&self, page: &str) -> Result<Fetched, FetchError> {
        let url = self.page_url(page);
        let response = self.client.get(&url).send().await?;

        // A missing article is a regular page without an infobox.
        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let final_url = response.url().to_string();
        let markup = response.bytes().await?;

        let canonical = canonical_link(&markup)
            .and_then(|href| page_from_url(&href))
            .or_else(|| page_from_url(&final_url))
            .unwrap_or_else(|| page.to_string());

        tracing::debug!(page, canonical = %canonical, bytes = markup.len(), "fetched article");

        Ok(Fetched { markup, canonical })
    }
}

/// The `href` of `<link rel="canonical">`, if the document has one.
fn canonical_link(markup: &[u8]) -> Option<String> {
    let source = String::from_utf8_lossy(markup);
    let document = Html::parse_document(&source);

    document
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "link")
        .find(|el| {
            el.value()
                .attr("rel")
                .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("canonical")))
        })
        .and_then(|el| el.value().attr("href").map(str::to_string))
}

/// Decoded page key of an article URL (the part after `/wiki/`).
fn page_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/wiki/")?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    if rest.is_empty() {
        return None;
    }
    let page = percent_decode_str(rest)
        .decode_utf8()
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| rest.to_string());
    Some(page)
}
