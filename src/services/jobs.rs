// src/services/jobs.rs

//! Job board scraper service.
//!
//! Fetches the board page and extracts listings using configured CSS
//! selectors. Extraction itself is a pure function over the parsed
//! document; nothing mutable is shared across invocations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, Job, JobSelectors, SourceConfig};
use crate::utils::{get_host, resolve_url};

/// A source of job listings.
///
/// Keeping the fetch behind a trait lets the pipeline run against scripted
/// sources in tests and leaves room for additional boards later.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch the current listings, in page-traversal order.
    ///
    /// An empty result is a valid return value, not an error.
    async fn fetch(&self) -> Result<Vec<Job>>;

    /// Name of the source for log output.
    fn source_name(&self) -> &str;
}

/// Selectors compiled once at scraper construction.
///
/// An invalid selector string is a configuration fault and surfaces here,
/// before any network I/O happens.
struct CompiledSelectors {
    listing: Selector,
    title: Selector,
    location: Selector,
    link: Selector,
    attr_name: String,
}

impl CompiledSelectors {
    fn compile(selectors: &JobSelectors) -> Result<Self> {
        Ok(Self {
            listing: parse_selector(&selectors.listing_selector)?,
            title: parse_selector(&selectors.title_selector)?,
            location: parse_selector(&selectors.location_selector)?,
            link: parse_selector(&selectors.link_selector)?,
            attr_name: selectors.attr_name.clone(),
        })
    }
}

/// Scraper for a single configured job board.
pub struct JobScraper {
    source: SourceConfig,
    selectors: CompiledSelectors,
    client: Client,
}

impl JobScraper {
    /// Create a new scraper for the given source.
    pub fn new(source: SourceConfig, http: &HttpConfig) -> Result<Self> {
        let selectors = CompiledSelectors::compile(&source.selectors)?;
        let client = Client::builder()
            .user_agent(&http.user_agent)
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()?;

        Ok(Self {
            source,
            selectors,
            client,
        })
    }

    /// Refuse to fetch anything outside the allowed host.
    fn check_allowed(&self, url: &str) -> Result<()> {
        let host = get_host(url)
            .ok_or_else(|| AppError::config(format!("source.url is not a valid URL: {url}")))?;
        if host != self.source.allowed_host.to_lowercase() {
            return Err(AppError::config(format!(
                "host {} is outside the allowed host {}",
                host, self.source.allowed_host
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl JobSource for JobScraper {
    async fn fetch(&self) -> Result<Vec<Job>> {
        self.check_allowed(&self.source.url)?;

        debug!("Fetching board page: {}", self.source.url);
        let response = self.client.get(&self.source.url).send().await?;

        check_status(response.status())?;

        let html = response.text().await?;
        let base_url = Url::parse(&self.source.url)?;
        let jobs = parse_jobs(&html, &self.selectors, &base_url);

        if jobs.is_empty() {
            warn!("No listings matched on {}", self.source.url);
        }
        Ok(jobs)
    }

    fn source_name(&self) -> &str {
        &self.source.allowed_host
    }
}

/// Extract listings from the page markup.
///
/// Listings missing a title are skipped; a missing location or link yields
/// an empty field rather than dropping the listing.
fn parse_jobs(html: &str, selectors: &CompiledSelectors, base_url: &Url) -> Vec<Job> {
    let document = Html::parse_document(html);
    let mut jobs = Vec::new();

    for element in document.select(&selectors.listing) {
        let title: String = match element.select(&selectors.title).next() {
            Some(el) => el.text().collect::<String>().trim().to_string(),
            None => continue,
        };
        if title.is_empty() {
            continue;
        }

        let location = element
            .select(&selectors.location)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let url = element
            .select(&selectors.link)
            .next()
            .and_then(|el| el.value().attr(&selectors.attr_name))
            .map(|href| resolve_url(base_url, href))
            .unwrap_or_default();

        jobs.push(Job {
            title,
            location,
            url,
        });
    }

    jobs
}

/// A non-success response is a degraded fetch, not a configuration fault.
fn check_status(status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(AppError::fetch(format!("board page returned status {status}")))
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled() -> CompiledSelectors {
        CompiledSelectors::compile(&JobSelectors::default()).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://job-boards.greenhouse.io/defenseunicorns").unwrap()
    }

    const BOARD_HTML: &str = r#"
        <div class="job-posts">
          <div class="job-post">
            <a href="/defenseunicorns/jobs/100">
              <p class="body body--medium">Platform Engineer</p>
              <p class="body body__secondary body--metadata">Remote (US)</p>
            </a>
          </div>
          <div class="job-post">
            <a href="https://job-boards.greenhouse.io/defenseunicorns/jobs/101">
              <p class="body body--medium">Site Reliability Engineer</p>
              <p class="body body__secondary body--metadata">Colorado Springs, CO</p>
            </a>
          </div>
        </div>
    "#;

    #[test]
    fn test_parse_jobs_extracts_fields() {
        let jobs = parse_jobs(BOARD_HTML, &compiled(), &base());
        assert_eq!(jobs.len(), 2);

        assert_eq!(jobs[0].title, "Platform Engineer");
        assert_eq!(jobs[0].location, "Remote (US)");
        assert_eq!(
            jobs[0].url,
            "https://job-boards.greenhouse.io/defenseunicorns/jobs/100"
        );

        assert_eq!(jobs[1].title, "Site Reliability Engineer");
        assert_eq!(
            jobs[1].url,
            "https://job-boards.greenhouse.io/defenseunicorns/jobs/101"
        );
    }

    #[test]
    fn test_parse_jobs_preserves_page_order() {
        let jobs = parse_jobs(BOARD_HTML, &compiled(), &base());
        assert_eq!(jobs[0].title, "Platform Engineer");
        assert_eq!(jobs[1].title, "Site Reliability Engineer");
    }

    #[test]
    fn test_parse_jobs_empty_page() {
        let jobs = parse_jobs("<html><body></body></html>", &compiled(), &base());
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_parse_jobs_skips_untitled_listing() {
        let html = r#"
            <div class="job-post"><a href="/x"></a></div>
            <div class="job-post">
              <a href="/defenseunicorns/jobs/102">
                <p class="body body--medium">Security Engineer</p>
              </a>
            </div>
        "#;
        let jobs = parse_jobs(html, &compiled(), &base());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Security Engineer");
        // Missing location is tolerated
        assert!(jobs[0].location.is_empty());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }

    #[test]
    fn test_check_status_classifies_server_error_as_fetch() {
        use crate::error::AppError;

        assert!(check_status(reqwest::StatusCode::OK).is_ok());

        let err = check_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR).unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)), "got {err:?}");
    }

    #[test]
    fn test_check_allowed_rejects_foreign_host() {
        let source = SourceConfig {
            url: "https://evil.example.com/board".to_string(),
            ..SourceConfig::default()
        };
        let scraper = JobScraper::new(source, &HttpConfig::default()).unwrap();
        assert!(scraper.check_allowed("https://evil.example.com/board").is_err());
        assert!(
            scraper
                .check_allowed("https://job-boards.greenhouse.io/defenseunicorns")
                .is_ok()
        );
    }
}
