//! Content extraction seam.
//!
//! The scoring heuristics live in `dom_smoothie`. This module wraps them
//! behind the [`Extractor`] trait and folds every outcome into the
//! three-way [`Extraction`] result.

use std::sync::Arc;
use std::time::Duration;

use dom_smoothie::{Config as ExtractConfig, Readability, ReadabilityError};
use tracing::warn;
use url::Url;

use crate::ServiceError;

/// Outcome of running the extraction algorithm on one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Main content was found.
    Extracted { title: String, content: String },
    /// The document parsed but does not look like an article.
    NotFound,
    /// The algorithm itself broke.
    Failed { cause: String },
}

impl Extraction {
    /// Classifies a raw extraction outcome.
    ///
    /// [`ReadabilityError::GrabFailed`] means no candidate qualified and becomes
    /// [`Extraction::NotFound`], as does an empty title or empty content. Any
    /// other error is a [`Extraction::Failed`].
    pub fn from_outcome(outcome: Result<(String, String), ReadabilityError>) -> Self {
        match outcome {
            Ok((title, content)) if !title.trim().is_empty() && !content.trim().is_empty() => {
                Self::Extracted { title: title.trim().to_string(), content }
            }
            Ok(_) => Self::NotFound,
            Err(ReadabilityError::GrabFailed) => Self::NotFound,
            Err(e) => Self::Failed { cause: e.to_string() },
        }
    }

    /// Turns the outcome into the handler's result type.
    pub fn into_result(self) -> Result<(String, String), ServiceError> {
        match self {
            Self::Extracted { title, content } => Ok((title, content)),
            Self::NotFound => Err(ServiceError::NotFound),
            Self::Failed { cause } => Err(ServiceError::ExtractionFailed { cause }),
        }
    }
}

/// Something that can pull the main content out of an HTML document.
///
/// Implementations run synchronously on a blocking thread and must not hold
/// per-request state between calls.
pub trait Extractor: Send + Sync + 'static {
    fn extract(&self, html: &str, base_url: &Url) -> Extraction;
}

/// [`Extractor`] backed by the `dom_smoothie` readability algorithm.
#[derive(Debug, Clone, Default)]
pub struct ReadabilityExtractor {
    config: ExtractConfig,
}

impl ReadabilityExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }
}

impl Extractor for ReadabilityExtractor {
    fn extract(&self, html: &str, base_url: &Url) -> Extraction {
        // The document URL resolves relative a/img/media URLs in the result.
        let outcome = Readability::new(html, Some(base_url.as_str()), Some(self.config.clone()))
            .and_then(|mut readability| readability.parse())
            .map(|article| (article.title, article.content.to_string()));

        Extraction::from_outcome(outcome)
    }
}

/// Runs `extractor` on a blocking thread.
///
/// A panic inside the extractor is reported as [`Extraction::Failed`]. When
/// `timeout` elapses first the request fails with [`ServiceError::TimedOut`];
/// the blocking task cannot be interrupted and finishes in the background.
pub async fn run_extraction(
    extractor: Arc<dyn Extractor>, html: String, base_url: Url, timeout: Option<Duration>,
) -> Result<Extraction, ServiceError> {
    let task = tokio::task::spawn_blocking(move || extractor.extract(&html, &base_url));

    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| ServiceError::TimedOut { limit })?,
        None => task.await,
    };

    match joined {
        Ok(extraction) => Ok(extraction),
        Err(e) if e.is_panic() => {
            warn!("extractor panicked");
            Ok(Extraction::Failed { cause: panic_message(e.into_panic().as_ref()) })
        }
        Err(e) => Ok(Extraction::Failed { cause: e.to_string() }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "extractor panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r##"
        <!DOCTYPE html>
        <html lang="en">
        <head><title>Harbour Wall Repairs Begin</title></head>
        <body>
            <nav>
                <a href="/">Home</a>
                <a href="/world">World</a>
                <a href="/sport">Sport</a>
            </nav>
            <article class="story">
                <h1>Harbour Wall Repairs Begin</h1>
                <p>Work to repair the old harbour wall started on Monday, with crews arriving early to secure the site, divert foot traffic, and begin removing the loose stones that fell during the winter storms.</p>
                <p>The council said the project would take about six weeks, although engineers warned that the schedule depends heavily on the weather, the tides, and the availability of the specialist masons who restore historic stonework.</p>
                <p><img src="photo.jpg" alt="The damaged wall"> Residents have welcomed the repairs, saying the wall protects dozens of homes and businesses along the seafront, and that the delay since the storms had caused real concern among families living nearby.</p>
                <p>Funding for the work comes from a regional resilience grant, which the council applied for last year, and which also covers a survey of the breakwater, new lighting along the promenade, and drainage improvements on the coast road.</p>
            </article>
        </body>
        </html>
    "##;

    fn base() -> Url {
        Url::parse("https://example.com/articles/1").unwrap()
    }

    #[test]
    fn test_readability_extracts_article() {
        let extraction = ReadabilityExtractor::default().extract(ARTICLE_HTML, &base());
        match extraction {
            Extraction::Extracted { title, content } => {
                assert_eq!(title, "Harbour Wall Repairs Begin");
                assert!(content.contains("old harbour wall"));
                assert!(content.contains("https://example.com/articles/photo.jpg"));
            }
            other => panic!("expected extracted article, got {:?}", other),
        }
    }

    #[test]
    fn test_readability_extractor_keeps_config() {
        let config = ExtractConfig { char_threshold: 120, ..Default::default() };
        let extractor = ReadabilityExtractor::new(config);
        assert_eq!(extractor.config().char_threshold, 120);
    }

    #[test]
    fn test_readability_bare_document_not_found() {
        let extraction = ReadabilityExtractor::default().extract("<html><body></body></html>", &base());
        assert_eq!(extraction, Extraction::NotFound);
    }

    #[test]
    fn test_from_outcome_classification() {
        assert_eq!(Extraction::from_outcome(Err(ReadabilityError::GrabFailed)), Extraction::NotFound);
        assert!(matches!(
            Extraction::from_outcome(Err(ReadabilityError::BadDocumentURL)),
            Extraction::Failed { .. }
        ));
        match Extraction::from_outcome(Err(ReadabilityError::TooManyElements(12, 10))) {
            Extraction::Failed { cause } => assert!(cause.contains("too many elements")),
            other => panic!("expected failed extraction, got {:?}", other),
        }
    }

    #[test]
    fn test_readability_element_limit_is_failure() {
        let config = ExtractConfig { max_elements_to_parse: 5, ..Default::default() };
        let extraction = ReadabilityExtractor::new(config).extract(ARTICLE_HTML, &base());
        assert!(matches!(extraction, Extraction::Failed { .. }));
    }

    #[test]
    fn test_from_outcome_requires_title_and_content() {
        assert_eq!(Extraction::from_outcome(Ok((String::new(), "<p>body</p>".to_string()))), Extraction::NotFound);
        assert_eq!(
            Extraction::from_outcome(Ok(("  ".to_string(), "<p>body</p>".to_string()))),
            Extraction::NotFound
        );
        assert_eq!(
            Extraction::from_outcome(Ok(("Title".to_string(), "\n".to_string()))),
            Extraction::NotFound
        );
        assert_eq!(
            Extraction::from_outcome(Ok((" Title ".to_string(), "<p>body</p>".to_string()))),
            Extraction::Extracted { title: "Title".to_string(), content: "<p>body</p>".to_string() }
        );
    }

    #[test]
    fn test_into_result() {
        assert!(matches!(Extraction::NotFound.into_result(), Err(ServiceError::NotFound)));
        assert!(matches!(
            Extraction::Failed { cause: "x".to_string() }.into_result(),
            Err(ServiceError::ExtractionFailed { .. })
        ));
    }

    struct Panicking;

    impl Extractor for Panicking {
        fn extract(&self, _html: &str, _base_url: &Url) -> Extraction {
            panic!("malformed tree");
        }
    }

    struct Sleepy;

    impl Extractor for Sleepy {
        fn extract(&self, _html: &str, _base_url: &Url) -> Extraction {
            std::thread::sleep(Duration::from_millis(300));
            Extraction::NotFound
        }
    }

    #[tokio::test]
    async fn test_run_extraction_panic_is_failure() {
        let result = run_extraction(Arc::new(Panicking), String::new(), base(), None).await;
        match result {
            Ok(Extraction::Failed { cause }) => assert!(cause.contains("malformed tree")),
            other => panic!("expected failed extraction, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_extraction_timeout() {
        let result = run_extraction(Arc::new(Sleepy), String::new(), base(), Some(Duration::from_millis(20))).await;
        match result {
            Err(ServiceError::TimedOut { limit }) => {
                assert_eq!(limit, Duration::from_millis(20));
                assert!(ServiceError::TimedOut { limit }.to_string().ends_with("20ms"));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_extraction_within_timeout() {
        let result = run_extraction(Arc::new(Sleepy), String::new(), base(), Some(Duration::from_secs(5))).await;
        assert!(matches!(result, Ok(Extraction::NotFound)));
    }
}
