//! Content advisory generation.
//!
//! Best-effort, non-blocking guidance derived from the extracted signals:
//! a page-type classification, a fixed advice list per type, templated
//! rewrite examples, and a short outline-based content brief. Nothing here
//! performs I/O and nothing here can fail the audit; classification falls
//! back to the generic landing type.

use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use url::Url;

use crate::extract::ExtractedSignals;

/// Page-type classification for a marketing/content page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIterMacro, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    /// Plan/price listing page.
    Pricing,
    /// Customer story page.
    CaseStudy,
    /// Editorial article or guide.
    Blog,
    /// Product or developer documentation.
    Docs,
    /// Feature/product page.
    Feature,
    /// Competitor comparison or alternatives page.
    Comparison,
    /// Company/about page.
    About,
    /// Contact page.
    Contact,
    /// Site root.
    Homepage,
    /// Generic landing page; the fallback classification.
    Landing,
}

impl PageType {
    /// Returns the wire representation of the page type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Pricing => "pricing",
            PageType::CaseStudy => "case_study",
            PageType::Blog => "blog",
            PageType::Docs => "docs",
            PageType::Feature => "feature",
            PageType::Comparison => "comparison",
            PageType::About => "about",
            PageType::Contact => "contact",
            PageType::Homepage => "homepage",
            PageType::Landing => "landing",
        }
    }
}

/// A templated before/after rewrite suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteExample {
    /// What the pair rewrites (title, meta description, ...).
    pub label: String,
    /// Current state, or a placeholder when the element is missing.
    pub before: String,
    /// Suggested replacement.
    pub after: String,
    /// Short rationale.
    pub note: String,
}

/// The full advisory block attached to a successful report.
#[derive(Debug, Clone, Serialize)]
pub struct Advisory {
    /// Classified page type.
    pub page_type: PageType,
    /// Fixed advice bullets for the type.
    pub advice: Vec<String>,
    /// Templated rewrite suggestions.
    pub rewrite_examples: Vec<RewriteExample>,
    /// Short outline-based content brief.
    pub content_brief: String,
}

/// Generates the advisory block for a page. Total function; unclassifiable
/// pages get the landing defaults.
pub fn generate(signals: &ExtractedSignals, final_url: &str) -> Advisory {
    let page_type = classify_page_type(signals, final_url);
    Advisory {
        page_type,
        advice: advice_for(page_type),
        rewrite_examples: rewrite_examples(signals, page_type),
        content_brief: content_brief(signals),
    }
}

fn haystack(signals: &ExtractedSignals, final_url: &str) -> String {
    format!(
        "{} {} {} {}",
        final_url, signals.title, signals.h1, signals.meta_description
    )
    .to_lowercase()
}

fn hits(text: &str, patterns: &[&str]) -> u32 {
    patterns.iter().filter(|p| text.contains(*p)).count() as u32
}

/// Classifies the page via keyword matching over URL + title + H1 + meta.
///
/// Additive signal scores per type, highest score wins, ties broken by the
/// declaration order below; a bare site root short-circuits to homepage.
pub fn classify_page_type(signals: &ExtractedSignals, final_url: &str) -> PageType {
    if let Ok(url) = Url::parse(final_url) {
        let path = url.path();
        if path == "/" || path.is_empty() {
            return PageType::Homepage;
        }
    }

    let text = haystack(signals, final_url);
    let scored: [(PageType, u32); 8] = [
        (
            PageType::Pricing,
            2 * hits(&text, &["pricing", "/plans", "billing", "per month", "per user"])
                + hits(&text, &["free trial", "monthly", "annual", "upgrade"]),
        ),
        (
            PageType::Comparison,
            2 * hits(&text, &[" vs ", "/vs-", "/vs/", "versus", "alternative to", "comparison"])
                + hits(&text, &["compare", "side-by-side"]),
        ),
        (
            PageType::CaseStudy,
            2 * hits(&text, &["case study", "case-study", "customer story", "success story"])
                + hits(&text, &["results", "testimonial"]),
        ),
        (
            PageType::Docs,
            2 * hits(&text, &["/docs", "documentation", "api reference", "developer guide"])
                + hits(&text, &["getting started", "install", "reference"]),
        ),
        (
            PageType::Blog,
            2 * hits(&text, &["/blog", "guide", "how to ", "ultimate guide", "playbook"])
                + hits(&text, &["what is ", "benefits of", "tips for", "best practices"]),
        ),
        (
            PageType::Feature,
            2 * hits(&text, &["features", "product tour", "capabilities", "how it works"])
                + hits(&text, &["use cases", "workflow", "for teams"]),
        ),
        (
            PageType::About,
            2 * hits(&text, &["/about", "about us", "our story", "our team", "careers"]),
        ),
        (
            PageType::Contact,
            2 * hits(&text, &["/contact", "contact us", "get in touch", "support@"]),
        ),
    ];

    let mut best = PageType::Landing;
    let mut best_score = 0;
    for (page_type, type_score) in scored {
        if type_score > best_score {
            best_score = type_score;
            best = page_type;
        }
    }
    best
}

/// Fixed advice bullets per page type.
pub fn advice_for(page_type: PageType) -> Vec<String> {
    let bullets: &[&str] = match page_type {
        PageType::Pricing => &[
            "Make plan differences crystal clear (who each plan is for, usage limits, key features).",
            "Highlight the recommended plan to reduce choice paralysis.",
            "Add trust elements near pricing (logos, testimonials, security badges).",
            "Answer common objections with an FAQ close to the pricing table.",
            "Clarify billing terms: monthly vs annual, cancellation, refunds.",
        ],
        PageType::CaseStudy => &[
            "Lead with the headline result (metric + timeframe) rather than the customer name.",
            "Structure as challenge, solution, outcome so skimmers get the arc.",
            "Quote the customer directly at least twice; attributed quotes build trust.",
            "Show the product in context with one or two screenshots.",
            "End with a CTA aimed at readers in the same industry or situation.",
        ],
        PageType::Blog => &[
            "Make the intro clearly match the search problem and promise a specific outcome.",
            "Use structured H2/H3 sections with examples that relate back to the product.",
            "Include one or two product moments (screenshots or callouts) where the tool helps.",
            "Add internal links to relevant feature, pricing, and case study pages.",
            "End with a CTA that fits the reader's stage: checklist, template, or trial.",
        ],
        PageType::Docs => &[
            "Open with what the page lets the reader accomplish, not with concepts.",
            "Keep one task per page; split long reference pages by topic.",
            "Show a complete working example before explaining the options.",
            "Cross-link prerequisite and next-step pages explicitly.",
            "Keep headings descriptive so in-page search and anchors work well.",
        ],
        PageType::Feature => &[
            "Lead with a strong value proposition above the fold, not just the feature name.",
            "Use benefit-oriented subheadings (what the user gets, not what the feature does).",
            "Show the feature in context with product UI or a short tour.",
            "Add one or two testimonials tied to this feature's outcome.",
            "Link clearly to pricing and related features to continue the journey.",
        ],
        PageType::Comparison => &[
            "Use a clear comparison table covering features, price, and support.",
            "Call out where your product is a better fit and where competitors are stronger.",
            "Frame evaluation criteria that favor your strengths honestly.",
            "Include quotes from customers who switched.",
            "End with a clear next-step section summarizing who should choose which option.",
        ],
        PageType::About => &[
            "Tell the founding story in terms of the customer problem, not the company.",
            "Put faces and names on the team; anonymous companies convert worse.",
            "Link to proof: press, customers, numbers that establish credibility.",
            "Keep one clear CTA (careers, product, or contact) rather than many.",
        ],
        PageType::Contact => &[
            "Offer the fastest channel first and set response-time expectations.",
            "Keep the form short; every extra field costs submissions.",
            "Add a short FAQ for questions that do not need a human reply.",
            "Include physical/legal details where relevant for trust.",
        ],
        PageType::Homepage => &[
            "State what the product does and for whom in the first screenful.",
            "Back the headline with one concrete proof point (metric, logo, quote).",
            "Route distinct audiences quickly: product, pricing, docs, case studies.",
            "Keep one primary CTA; secondary actions go below the fold.",
            "Make the H1 describe the category, not a slogan.",
        ],
        PageType::Landing => &[
            "Match the headline to the traffic source's promise.",
            "Keep one conversion goal per page and remove competing navigation.",
            "Answer the top three objections directly on the page.",
            "Use specific social proof over generic badges.",
            "Make the CTA describe the outcome, not the mechanism.",
        ],
    };
    bullets.iter().map(|s| s.to_string()).collect()
}

/// Cleans a raw title/H1 into a usable topic phrase.
fn topic_of(signals: &ExtractedSignals) -> String {
    let raw = if !signals.title.is_empty() {
        &signals.title
    } else if !signals.h1.is_empty() {
        &signals.h1
    } else {
        ""
    };
    // Drop the brand suffix and clamp to something headline-sized.
    let cleaned = raw
        .split(['|', '-', '\u{2013}', '\u{2014}'])
        .next()
        .unwrap_or("")
        .trim();
    if cleaned.is_empty() {
        "this page".to_string()
    } else {
        cleaned.chars().take(80).collect()
    }
}

/// Templated before/after rewrite pairs for the core on-page elements.
pub fn rewrite_examples(signals: &ExtractedSignals, page_type: PageType) -> Vec<RewriteExample> {
    let topic = topic_of(signals);
    let or_missing = |s: &str| {
        if s.is_empty() {
            "(missing)".to_string()
        } else {
            s.to_string()
        }
    };

    vec![
        RewriteExample {
            label: "title".to_string(),
            before: or_missing(&signals.title),
            after: format!("{topic} \u{2014} what it is and how to choose | Brand"),
            note: "Keep the core keyword near the front and stay under 60 characters.".to_string(),
        },
        RewriteExample {
            label: "meta_description".to_string(),
            before: or_missing(&signals.meta_description),
            after: format!(
                "Everything you need to know about {}: key benefits, common pitfalls, and how to get started.",
                topic.to_lowercase()
            ),
            note: "140-160 characters with a benefit and the target keyword.".to_string(),
        },
        RewriteExample {
            label: "h1".to_string(),
            before: or_missing(&signals.h1),
            after: topic.clone(),
            note: "One H1 that states the page's primary topic plainly.".to_string(),
        },
        RewriteExample {
            label: "opening_line".to_string(),
            before: String::new(),
            after: format!(
                "If you're evaluating {}, this page covers what matters and what to skip.",
                topic.to_lowercase()
            ),
            note: "Open by naming the reader's problem, not the company.".to_string(),
        },
        RewriteExample {
            label: "cta".to_string(),
            before: String::new(),
            after: match page_type {
                PageType::Pricing => "Start free \u{2014} upgrade when you grow".to_string(),
                PageType::Comparison => "See the full comparison".to_string(),
                PageType::Docs => "Follow the quickstart".to_string(),
                _ => "Get started in minutes".to_string(),
            },
            note: "Describe the outcome, not the mechanism.".to_string(),
        },
    ]
}

/// Five-point outline-based content brief.
pub fn content_brief(signals: &ExtractedSignals) -> String {
    let topic = topic_of(signals);
    [
        format!("1. Clarify the primary search intent for {topic} (informational, commercial, or transactional)."),
        format!("2. Add an introduction that explains who the page is for and what they will learn about {topic}."),
        format!("3. Use H2/H3 sections to cover subtopics, FAQs, and comparisons related to {topic}."),
        "4. Include internal links to 3-5 closely related pages and 1-2 authoritative external resources.".to_string(),
        "5. End with a clear next step (CTA) that fits the visitor's stage: learn more, compare options, or get started.".to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn signals_with(title: &str, h1: &str, meta: &str) -> ExtractedSignals {
        ExtractedSignals {
            title: title.to_string(),
            h1: h1.to_string(),
            meta_description: meta.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pricing_classification() {
        let signals = signals_with("Pricing - Acme", "Plans for every team", "");
        assert_eq!(
            classify_page_type(&signals, "https://acme.io/pricing"),
            PageType::Pricing
        );
    }

    #[test]
    fn test_comparison_classification() {
        let signals = signals_with("Acme vs Globex", "", "");
        assert_eq!(
            classify_page_type(&signals, "https://acme.io/vs/globex"),
            PageType::Comparison
        );
    }

    #[test]
    fn test_docs_classification() {
        let signals = signals_with("API reference", "Getting started", "");
        assert_eq!(
            classify_page_type(&signals, "https://acme.io/docs/api"),
            PageType::Docs
        );
    }

    #[test]
    fn test_homepage_short_circuit() {
        let signals = signals_with("Acme pricing plans billing", "", "");
        assert_eq!(
            classify_page_type(&signals, "https://acme.io/"),
            PageType::Homepage
        );
    }

    #[test]
    fn test_landing_fallback() {
        let signals = signals_with("Untitled", "", "");
        assert_eq!(
            classify_page_type(&signals, "https://acme.io/xyz"),
            PageType::Landing
        );
    }

    #[test]
    fn test_every_type_has_advice() {
        for page_type in PageType::iter() {
            assert!(!advice_for(page_type).is_empty(), "{page_type:?}");
        }
    }

    #[test]
    fn test_rewrite_examples_cover_core_elements() {
        let signals = signals_with("Invoice Software", "Invoices", "desc");
        let examples = rewrite_examples(&signals, PageType::Feature);
        let labels: Vec<&str> = examples.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["title", "meta_description", "h1", "opening_line", "cta"]
        );
    }

    #[test]
    fn test_missing_elements_marked_in_rewrites() {
        let signals = ExtractedSignals::default();
        let examples = rewrite_examples(&signals, PageType::Landing);
        assert_eq!(examples[0].before, "(missing)");
    }

    #[test]
    fn test_topic_strips_brand_suffix() {
        let signals = signals_with("Invoice Software | Acme", "", "");
        let brief = content_brief(&signals);
        assert!(brief.contains("Invoice Software"));
        assert!(!brief.contains("| Acme"));
    }

    #[test]
    fn test_generate_is_total_on_empty_signals() {
        let advisory = generate(&ExtractedSignals::default(), "not a url");
        assert_eq!(advisory.page_type, PageType::Landing);
        assert!(!advisory.advice.is_empty());
        assert!(!advisory.content_brief.is_empty());
    }
}
