//! HTTP client for the documentation catalog.

use futures::future::join_all;
use serde::Serialize;

use crate::catalog::{DocCatalog, DocCategory, DocSource};
use crate::text;

/// One page's outcome in a search: either an excerpt around the first hit
/// or the error that prevented fetching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// `category:name` of the page.
    pub source: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct DocsClient {
    http: reqwest::Client,
    catalog: DocCatalog,
    snippet_radius: usize,
}

impl DocsClient {
    /// Build a client over the built-in catalog.
    pub fn new(config: &cf_core::config::DocsConfig) -> cf_core::Result<Self> {
        Self::with_catalog(config, DocCatalog::builtin())
    }

    pub fn with_catalog(
        config: &cf_core::config::DocsConfig,
        catalog: DocCatalog,
    ) -> cf_core::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| cf_core::Error::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            catalog,
            snippet_radius: config.snippet_radius,
        })
    }

    pub fn catalog(&self) -> &DocCatalog {
        &self.catalog
    }

    /// Pages for one category, or every category for `None` / `"all"`.
    pub fn urls(&self, category: Option<&str>) -> cf_core::Result<Vec<&DocCategory>> {
        self.catalog.select(category)
    }

    /// Fetch one catalog page as plain text.
    pub async fn get_service_documentation(
        &self,
        category: &str,
        name: &str,
    ) -> cf_core::Result<String> {
        let category = self.catalog.category(category)?;
        let source = category.source(name)?;
        self.fetch_text(&qualified(&category.name, source), &source.url).await
    }

    /// Fetch any web page and return its content as plain text.
    pub async fn fetch_url(&self, url: &str) -> cf_core::Result<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(cf_core::Error::invalid("url", "URL is empty"));
        }
        self.fetch_text(url, url).await
    }

    /// Fetch every page in scope concurrently and report an excerpt for
    /// each page containing `term`. Pages that fail to load are reported
    /// with their error; pages without a match are omitted.
    pub async fn search(
        &self,
        term: &str,
        category: Option<&str>,
    ) -> cf_core::Result<Vec<SearchHit>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(cf_core::Error::invalid("term", "search term is empty"));
        }

        let targets: Vec<(String, &DocSource)> = self
            .catalog
            .select(category)?
            .into_iter()
            .flat_map(|c| c.sources.iter().map(move |s| (qualified(&c.name, s), s)))
            .collect();
        tracing::info!("searching {} documentation pages for {term:?}", targets.len());

        let pages = join_all(
            targets
                .iter()
                .map(|(label, source)| self.fetch_text(label, &source.url)),
        )
        .await;

        let hits = targets
            .into_iter()
            .zip(pages)
            .filter_map(|((label, source), page)| match page {
                Ok(body) => {
                    text::excerpt(&body, term, self.snippet_radius).map(|excerpt| SearchHit {
                        source: label,
                        url: source.url.clone(),
                        excerpt: Some(excerpt),
                        error: None,
                    })
                }
                Err(e) => Some(SearchHit {
                    source: label,
                    url: source.url.clone(),
                    excerpt: None,
                    error: Some(e.to_string()),
                }),
            })
            .collect();
        Ok(hits)
    }

    async fn fetch_text(&self, label: &str, url: &str) -> cf_core::Result<String> {
        tracing::debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| cf_core::Error::fetch(label, format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(cf_core::Error::fetch(label, format!("HTTP {}", resp.status())));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| cf_core::Error::fetch(label, format!("read error: {e}")))?;
        Ok(text::html_to_text(&body))
    }
}

fn qualified(category: &str, source: &DocSource) -> String {
    format!("{category}:{}", source.name)
}
