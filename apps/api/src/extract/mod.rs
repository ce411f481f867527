//! Posting extraction — reads job title/company/description text out of a
//! job-board page's HTML using per-site CSS selectors.
//!
//! Sites form a closed set of variants, each matched by hostname substring.
//! Unrecognized hosts fall back to a "manual" extraction carrying whatever
//! text the user had selected on the page.

pub mod handlers;

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Supported job boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSite {
    LinkedIn,
    Indeed,
    Greenhouse,
    Lever,
}

/// Selector triple for one site. `company` is optional: Greenhouse postings
/// carry the company only in the page title.
struct SiteSelectors {
    description: &'static str,
    company: Option<&'static str>,
    title: &'static str,
}

impl JobSite {
    const ALL: [JobSite; 4] = [
        JobSite::LinkedIn,
        JobSite::Indeed,
        JobSite::Greenhouse,
        JobSite::Lever,
    ];

    /// Matches a hostname against the variant set by substring, mirroring
    /// how the job boards serve from regional subdomains.
    pub fn detect(hostname: &str) -> Option<JobSite> {
        let host = hostname.to_lowercase();
        Self::ALL.into_iter().find(|site| host.contains(site.hostname()))
    }

    fn hostname(self) -> &'static str {
        match self {
            JobSite::LinkedIn => "linkedin.com",
            JobSite::Indeed => "indeed.com",
            JobSite::Greenhouse => "greenhouse.io",
            JobSite::Lever => "lever.co",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobSite::LinkedIn => "linkedin",
            JobSite::Indeed => "indeed",
            JobSite::Greenhouse => "greenhouse",
            JobSite::Lever => "lever",
        }
    }

    fn selectors(self) -> SiteSelectors {
        match self {
            JobSite::LinkedIn => SiteSelectors {
                description: ".jobs-description__content",
                company: Some(".jobs-unified-top-card__company-name"),
                title: ".jobs-unified-top-card__job-title",
            },
            JobSite::Indeed => SiteSelectors {
                description: "#jobDescriptionText",
                company: Some("[data-company-name]"),
                title: ".jobsearch-JobInfoHeader-title",
            },
            JobSite::Greenhouse => SiteSelectors {
                description: "#content .body",
                company: None, // parsed from <title>
                title: "h1.app-title",
            },
            JobSite::Lever => SiteSelectors {
                description: ".posting-page .content",
                company: Some(".posting-headline .company-name"),
                title: ".posting-headline h2",
            },
        }
    }
}

/// Job-posting data pulled from a page. Ephemeral: never persisted beyond
/// the latest-extraction cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPosting {
    pub source: String,
    pub company: String,
    pub title: String,
    pub description: String,
    pub url: String,
}

/// Extracts posting data from `html`, choosing selectors by the hostname of
/// `url`. Unrecognized hosts (or unparseable URLs) yield a manual extraction
/// whose description is the user's text selection.
pub fn extract_posting(url: &str, html: &str, selection: Option<&str>) -> ExtractedPosting {
    let site = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().and_then(JobSite::detect));

    let Some(site) = site else {
        return ExtractedPosting {
            source: "manual".to_string(),
            company: String::new(),
            title: String::new(),
            description: selection.unwrap_or_default().trim().to_string(),
            url: url.to_string(),
        };
    };

    let doc = Html::parse_document(html);
    let selectors = site.selectors();

    let mut company = selectors
        .company
        .map(|sel| select_text(&doc, sel))
        .unwrap_or_default();
    let title = select_text(&doc, selectors.title);
    let description = select_text(&doc, selectors.description);

    // Greenhouse pages title themselves "Job Title at Company Name".
    if site == JobSite::Greenhouse && company.is_empty() {
        company = company_from_page_title(&select_text(&doc, "title"));
    }

    ExtractedPosting {
        source: site.label().to_string(),
        company,
        title,
        description,
        url: url.to_string(),
    }
}

/// Trimmed text of the first element matching `selector`, empty on no match.
fn select_text(doc: &Html, selector: &str) -> String {
    let Ok(sel) = Selector::parse(selector) else {
        return String::new();
    };
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn company_from_page_title(page_title: &str) -> String {
    static AT_COMPANY: OnceLock<Regex> = OnceLock::new();
    let re = AT_COMPANY
        .get_or_init(|| Regex::new(r"(?i)at\s+(.+?)(?:\s*[-|]|$)").expect("valid regex"));
    re.captures(page_title)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
