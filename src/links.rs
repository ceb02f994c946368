use url::Url;

/// Resolves row hrefs against the origin of the page the grid lives on
#[derive(Debug, Clone)]
pub struct LinkResolver {
    base: Url,
}

impl LinkResolver {
    /// Create a resolver rooted at the origin of `page_url`
    pub fn for_page(page_url: &Url) -> Result<Self, url::ParseError> {
        let base = Url::parse(&page_url.origin().ascii_serialization())?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve an href to an absolute URL.
    ///
    /// Unresolvable hrefs are returned as-is rather than dropped.
    pub fn resolve(&self, href: &str) -> String {
        match self.base.join(href.trim()) {
            Ok(url) => url.to_string(),
            Err(e) => {
                ::log::debug!("Keeping unresolvable href {:?}: {}", href, e);
                href.to_string()
            }
        }
    }

    /// Resolve every non-empty href, preserving order
    pub fn resolve_all<'a>(&self, hrefs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        hrefs
            .into_iter()
            .filter(|h| !h.trim().is_empty())
            .map(|h| self.resolve(h))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(page: &str) -> LinkResolver {
        LinkResolver::for_page(&Url::parse(page).unwrap()).unwrap()
    }

    #[test]
    fn test_relative_href_resolves_against_origin() {
        let r = resolver("https://example.org/tenders/Active.aspx?x=1");
        assert_eq!(r.resolve("Docs/x.pdf"), "https://example.org/Docs/x.pdf");
        assert_eq!(r.resolve("/Docs/y.pdf"), "https://example.org/Docs/y.pdf");
    }

    #[test]
    fn test_absolute_href_is_kept() {
        let r = resolver("https://example.org/");
        assert_eq!(
            r.resolve("https://cdn.example.net/z.pdf"),
            "https://cdn.example.net/z.pdf"
        );
    }

    #[test]
    fn test_port_is_part_of_origin() {
        let r = resolver("http://localhost:8080/grid");
        assert_eq!(r.base().as_str(), "http://localhost:8080/");
        assert_eq!(r.resolve("a.pdf"), "http://localhost:8080/a.pdf");
    }

    #[test]
    fn test_empty_hrefs_are_skipped() {
        let r = resolver("https://example.org/");
        let links = r.resolve_all(["", "  ", "one.pdf"]);
        assert_eq!(links, vec!["https://example.org/one.pdf".to_string()]);
    }
}
