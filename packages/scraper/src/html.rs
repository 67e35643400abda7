//! HTML utilities for querying parsed pages.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::Result;

/// A fetched page: its URL and parsed document.
pub struct Page {
    url: Url,
    document: Html,
}

impl Page {
    /// Parse a page from its URL and HTML source.
    pub fn parse(url: &str, html: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(url)?,
            document: Html::parse_document(html),
        })
    }

    /// URL the page was fetched from.
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Select all elements matching a selector, in document order.
    pub fn select<'a, 'b>(
        &'a self,
        selector: &'b Selector,
    ) -> scraper::html::Select<'a, 'b> {
        self.document.select(selector)
    }

    /// Resolve a link target against the page URL.
    ///
    /// # Examples
    /// ```
    /// use igedd_scraper::html::Page;
    ///
    /// let page = Page::parse("https://example.org/a/b.html", "<html></html>").unwrap();
    /// assert_eq!(page.resolve("c.pdf").unwrap(), "https://example.org/a/c.pdf");
    /// assert_eq!(page.resolve("/IMG/d.pdf").unwrap(), "https://example.org/IMG/d.pdf");
    /// ```
    pub fn resolve(&self, href: &str) -> Result<String> {
        Ok(self.url.join(href.trim())?.to_string())
    }
}

/// Check if the element matches the selector or contains a match.
pub fn has_match(element: ElementRef<'_>, selector: &Selector) -> bool {
    find_match(element, selector).is_some()
}

/// Return the element itself if it matches, otherwise its first matching descendant.
pub fn find_match<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    if selector.matches(&element) {
        Some(element)
    } else {
        element.select(selector).next()
    }
}

/// Concatenate all text nodes below the element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Concatenate all text nodes below the element, leaving out exact matches of `skip`.
pub fn element_text_without(element: ElementRef<'_>, skip: &[&str]) -> String {
    element.text().filter(|t| !skip.contains(t)).collect()
}

/// First non-blank text node below the element, trimmed.
///
/// Download links carry their file size in a nested span; the label is the
/// first text node.
pub fn first_text(element: ElementRef<'_>) -> Option<String> {
    element
        .text()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// Value of the `href` attribute, if non-empty.
pub fn href(element: ElementRef<'_>) -> Option<&str> {
    element
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(css: &str) -> Selector {
        Selector::parse(css).unwrap()
    }

    #[test]
    fn test_first_text_skips_blank_nodes() {
        let html = Html::parse_fragment(
            r#"<a class="dl">
                Avis délibéré <span>PDF - 300 Ko</span></a>"#,
        );
        let link = html.select(&selector("a")).next().unwrap();
        assert_eq!(first_text(link), Some("Avis délibéré".to_string()));
    }

    #[test]
    fn test_find_match_self_or_descendant() {
        let html = Html::parse_fragment(
            r#"<div class="outer"><h2>Titre</h2></div><h2 id="self">Autre</h2>"#,
        );
        let h2 = selector("h2");
        let outer = html.select(&selector("div.outer")).next().unwrap();
        let own = html.select(&selector("h2#self")).next().unwrap();

        assert_eq!(first_text(find_match(outer, &h2).unwrap()).unwrap(), "Titre");
        assert_eq!(first_text(find_match(own, &h2).unwrap()).unwrap(), "Autre");
        assert!(!has_match(outer, &selector("p")));
    }

    #[test]
    fn test_element_text_without() {
        let html = Html::parse_fragment("<div><span>NOUVEAU</span>N°\u{a0}2024-1\n</div>");
        let div = html.select(&selector("div")).next().unwrap();
        assert_eq!(element_text_without(div, &["NOUVEAU"]), "N°\u{a0}2024-1\n");
    }

    #[test]
    fn test_href() {
        let html = Html::parse_fragment(r#"<a href=" /x.pdf ">x</a><a href="">y</a>"#);
        let links: Vec<_> = html.select(&selector("a")).collect();
        assert_eq!(href(links[0]), Some("/x.pdf"));
        assert_eq!(href(links[1]), None);
    }

    #[test]
    fn test_page_resolve_absolute() {
        let page = Page::parse("https://example.org/a.html", "").unwrap();
        assert_eq!(
            page.resolve("https://other.org/f.pdf").unwrap(),
            "https://other.org/f.pdf"
        );
    }
}
