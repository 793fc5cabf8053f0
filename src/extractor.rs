use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use once_cell::sync::Lazy;
use tracing::{debug, info};
use url::{Host, Url};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::text::{collapse_whitespace, sentence_spans, truncate_chars};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Shortest cleaned body accepted as an article.
const MIN_ARTICLE_CHARS: usize = 50;
const MIN_SENTENCE_CHARS: usize = 15;
const MIN_PARAGRAPH_CHARS: usize = 30;

const SKIPPED_TAGS: [&str; 13] = [
    "script", "style", "nav", "header", "footer", "aside", "form", "iframe", "noscript", "button",
    "input", "select", "textarea",
];

/// Elements whose class contains one of these are dropped with their subtree.
const SKIPPED_CLASS_FRAGMENTS: [&str; 16] = [
    "footer", "header", "nav", "menu", "sidebar", "social", "share", "comment",
    "copyright", "disclaimer", "terms", "division", "corp", "dnpa", "ethics", "reserved",
];

/// Whole class names (or `name-` prefixes) that mark ad slots.
const AD_CLASS_NAMES: [&str; 3] = ["ad", "ads", "advert"];

const BOILERPLATE_PHRASES: [&str; 15] = [
    "all rights reserved",
    "copyright",
    "read more",
    "subscribe to",
    "follow us on",
    "advertisement",
    "click here to",
    "code of ethics",
    "our divisions",
    "db corp",
    "this website follows",
    "2023-24",
    "2024-25",
    "2025-26",
    "dnpa",
];

const BOILERPLATE_WORDS: [&str; 6] = ["copyright", "corp", "division", "reserved", "ethics", "dnpa"];

/// Gujarati news sites the extractor is tuned for.
pub const COMMON_GUJARATI_SOURCES: [&str; 4] = [
    "divyabhaskar.co.in",
    "gujaratsamachar.com",
    "sandesh.com",
    "tv9gujarati.com",
];

pub const SUPPORTED_ARTICLE_LANGUAGES: [&str; 3] = ["gujarati", "hindi", "english"];

// Compiled once; ordered from most to least article-specific.
static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "article .story-content",
        "article .article-content",
        ".story-body",
        ".article-body",
        "[class*=\"story-text\"]",
        "[class*=\"article-content\"]",
        ".post-content",
        ".entry-content",
        "article",
        "main",
        "[role=\"main\"]",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("Failed to parse content selector"))
    .collect()
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

static OG_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[property=\"og:title\"]").expect("Failed to parse og:title selector")
});

static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p").expect("Failed to parse paragraph selector")
});

/// Article text pulled out of a news page.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
    pub source_domain: String,
}

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &Url) -> Result<Article>;
}

/// Validates caller input as an article URL, adding `https://` when no scheme is given.
pub fn parse_article_url(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AppError::ValidationError("URL cannot be empty".to_string()));
    }
    if input.chars().any(char::is_whitespace) {
        return Err(AppError::ValidationError(format!("Invalid URL: {}", input)));
    }

    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    let url = Url::parse(&candidate)
        .map_err(|e| AppError::ValidationError(format!("Invalid URL {}: {}", input, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AppError::ValidationError(format!(
            "Unsupported URL scheme: {}",
            url.scheme()
        )));
    }
    let valid_host = match url.host() {
        Some(Host::Domain(domain)) => domain.contains('.') || domain == "localhost",
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    };
    if !valid_host {
        return Err(AppError::ValidationError(format!("Invalid URL: {}", input)));
    }
    Ok(url)
}

/// Host name used to group statistics, without a leading `www.`.
pub fn source_domain(url: &Url) -> String {
    let host = url.host_str().unwrap_or("unknown");
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Fetches pages over HTTP and parses them with CSS selectors.
pub struct HttpExtractor {
    client: Client,
    max_chars: usize,
}

impl HttpExtractor {
    pub fn new(config: &Config) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(config.fetch_timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(10)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_chars: config.max_extracted_chars,
        })
    }

    async fn fetch_html(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchError(format!("HTTP {} for {}", status, url)));
        }
        let html = response.text().await?;
        Ok(html)
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, url: &Url) -> Result<Article> {
        let fetch_start = std::time::Instant::now();
        let html = self.fetch_html(url).await?;
        debug!(url = %url, bytes = html.len(), elapsed = ?fetch_start.elapsed(), "Fetched page");

        let (title, text) = parse_article(&html, self.max_chars)?;
        info!(url = %url, chars = text.chars().count(), "Extracted article");

        Ok(Article {
            url: url.to_string(),
            title,
            text,
            source_domain: source_domain(url),
        })
    }
}

/// Pulls the title and cleaned body text out of an HTML page.
pub fn parse_article(html: &str, max_chars: usize) -> Result<(Option<String>, String)> {
    let document = Html::parse_document(html);
    let title = extract_title(&document);

    let mut body = String::new();
    for selector in CONTENT_SELECTORS.iter() {
        if let Some(element) = document.select(selector).next() {
            let mut raw = String::new();
            collect_text(element, &mut raw);
            let cleaned = clean_article_text(&raw);
            if cleaned.chars().count() >= MIN_ARTICLE_CHARS {
                body = cleaned;
                break;
            }
        }
    }

    if body.is_empty() {
        body = clean_article_text(&paragraph_text(&document));
    }

    if body.chars().count() < MIN_ARTICLE_CHARS {
        return Err(AppError::ParseError("No article body found in the page".to_string()));
    }

    Ok((title, truncate_chars(&body, max_chars).to_string()))
}

fn extract_title(document: &Html) -> Option<String> {
    let og_title = document
        .select(&OG_TITLE_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(collapse_whitespace);

    og_title
        .filter(|t| !t.is_empty())
        .or_else(|| {
            document
                .select(&TITLE_SELECTOR)
                .next()
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        })
        .filter(|t| !t.is_empty())
}

/// Appends the visible text under `element`, skipping boilerplate subtrees.
fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if is_boilerplate_element(child_element) {
                continue;
            }
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

fn is_boilerplate_element(element: ElementRef) -> bool {
    let value = element.value();
    if SKIPPED_TAGS.contains(&value.name()) {
        return true;
    }
    value.classes().any(|class| {
        let class = class.to_ascii_lowercase();
        SKIPPED_CLASS_FRAGMENTS.iter().any(|fragment| class.contains(fragment))
            || AD_CLASS_NAMES
                .iter()
                .any(|ad| class == *ad || class.starts_with(&format!("{}-", ad)))
    })
}

fn paragraph_text(document: &Html) -> String {
    document
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| {
            let mut raw = String::new();
            collect_text(p, &mut raw);
            collapse_whitespace(&raw)
        })
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops short fragments and boilerplate sentences, keeping terminators.
pub fn clean_article_text(raw: &str) -> String {
    let text = collapse_whitespace(raw);
    sentence_spans(&text)
        .into_iter()
        .filter(|sentence| !is_boilerplate_sentence(sentence))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_boilerplate_sentence(sentence: &str) -> bool {
    if sentence.chars().count() < MIN_SENTENCE_CHARS {
        return true;
    }
    let lowered = sentence.to_lowercase();
    if BOILERPLATE_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
        return true;
    }

    // More than a fifth of the words being legal/corporate terms.
    let words: Vec<&str> = lowered
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .collect();
    let bad_words = words.iter().filter(|w| BOILERPLATE_WORDS.contains(*w)).count();
    !words.is_empty() && bad_words * 5 > words.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEWS_PAGE: &str = r#"
        <html>
          <head>
            <title>Rain update | Daily News</title>
            <meta property="og:title" content="Heavy rain in Ahmedabad">
          </head>
          <body>
            <nav>Home. Sports. Business and markets today.</nav>
            <article>
              <div class="story-content">
                <p>Heavy rain lashed Ahmedabad on Monday and roads were flooded.</p>
                <script>var tracking = "should never appear in the text";</script>
                <p>The municipal corporation deployed pumps at twelve junctions.</p>
                <p>Copyright 2025 Daily News Corp. All rights reserved.</p>
              </div>
            </article>
            <footer>Follow us on social media for more updates.</footer>
          </body>
        </html>
    "#;

    #[test]
    fn story_content_is_extracted_without_boilerplate() {
        let (title, text) = parse_article(NEWS_PAGE, 5000).unwrap();

        assert_eq!(title.as_deref(), Some("Heavy rain in Ahmedabad"));
        assert!(text.starts_with("Heavy rain lashed Ahmedabad on Monday"));
        assert!(text.contains("twelve junctions."));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("Follow us"));
    }

    #[test]
    fn falls_back_to_paragraphs() {
        let html = r#"<html><head><title> Plain page </title></head><body>
            <div><p>This paragraph is long enough to count as article text for sure.</p>
            <p>Too short.</p>
            <p>Another paragraph that carries real reporting about the local election.</p></div>
            </body></html>"#;
        let (title, text) = parse_article(html, 5000).unwrap();

        assert_eq!(title.as_deref(), Some("Plain page"));
        assert!(text.contains("local election."));
        assert!(!text.contains("Too short"));
    }

    #[test]
    fn page_without_body_text_is_a_parse_error() {
        let html = "<html><body><nav>Menu</nav><p>Hi.</p></body></html>";
        assert!(matches!(parse_article(html, 5000), Err(AppError::ParseError(_))));
    }

    #[test]
    fn body_is_capped_at_max_chars() {
        let (_, text) = parse_article(NEWS_PAGE, 20).unwrap();
        assert_eq!(text.chars().count(), 20);
    }

    #[test]
    fn url_validation() {
        assert!(parse_article_url("not a url").is_err());
        assert!(parse_article_url("").is_err());
        assert!(parse_article_url("ftp://example.com/file").is_err());
        assert!(parse_article_url("https://nohost").is_err());

        let url = parse_article_url("www.divyabhaskar.co.in/local/news-1").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(source_domain(&url), "divyabhaskar.co.in");

        let url = parse_article_url("http://127.0.0.1:8080/story").unwrap();
        assert_eq!(source_domain(&url), "127.0.0.1");
    }

    #[test]
    fn boilerplate_classes_are_dropped_with_their_subtree() {
        let html = r#"<html><body><article>
            <p>The state government announced a new water supply scheme for Surat on Friday.</p>
            <div class="social-share-bar"><p>Share this story with your friends and family today.</p></div>
            <div class="ad-slot"><p>Buy the best mobile phones at the lowest prices this week.</p></div>
            <div class="site-footer-links"><p>Our Divisions Copyright 2024-25 DB Corp ltd.</p></div>
            <p class="lead">Work on the pipeline will begin before the end of the monsoon season.</p>
        </article></body></html>"#;
        let (_, text) = parse_article(html, 5000).unwrap();

        assert!(text.contains("water supply scheme"));
        assert!(text.contains("monsoon season."));
        assert!(!text.contains("Share this story"));
        assert!(!text.contains("mobile phones"));
        assert!(!text.contains("Divisions"));
    }

    #[test]
    fn corporate_boilerplate_sentences_are_rejected() {
        assert!(is_boilerplate_sentence("DB Corp ltd owns this news website in India."));
        assert!(is_boilerplate_sentence("Website follows the 2024-25 content policy."));
        assert!(is_boilerplate_sentence("Corp division ethics reserved here."));
        assert!(!is_boilerplate_sentence("The reserved forest near Gir saw heavy rain this week."));
    }

    #[test]
    fn gujarati_sentences_survive_cleaning() {
        let cleaned = clean_article_text("અમદાવાદમાં આજે ભારે વરસાદ પડ્યો છે। ટૂંકું। Read more at our site.");
        assert_eq!(cleaned, "અમદાવાદમાં આજે ભારે વરસાદ પડ્યો છે।");
    }
}
