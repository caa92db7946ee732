//! Location normalization.

use url::Url;

use imgcrawl_core::Location;

/// Normalize a raw link or image reference.
///
/// Absolute hierarchical URLs go through [`Url`], which lowercases the
/// scheme and host and drops any `#fragment`. Relative or opaque
/// references such as `a.png` are only trimmed and cut at `#`. Either way
/// one trailing `/` is dropped unless that would leave an empty string, a
/// bare scheme or a path ending in another `/`.
pub fn normalize(raw: &str) -> Location {
    let trimmed = raw.trim();
    let serialized = match Url::parse(trimmed) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            url.set_fragment(None);
            String::from(url)
        }
        _ => strip_fragment(trimmed).to_string(),
    };

    Location::new(strip_trailing_slash(&serialized))
}

fn strip_fragment(raw: &str) -> &str {
    raw.split_once('#').map_or(raw, |(head, _)| head)
}

fn strip_trailing_slash(location: &str) -> &str {
    match location.strip_suffix('/') {
        Some(head) if !head.is_empty() && !head.ends_with('/') && !head.ends_with(':') => head,
        _ => location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  http://site/a.html#top ").as_str(), "http://site/a.html");
        assert_eq!(normalize("http://site/dir/").as_str(), "http://site/dir");
        assert_eq!(normalize("http://site/").as_str(), "http://site");
        assert_eq!(normalize("http://").as_str(), "http://");
        assert_eq!(normalize("/").as_str(), "/");
        assert_eq!(normalize("a.html").as_str(), "a.html");
    }

    #[test]
    fn test_normalize_absolute_urls() {
        assert_eq!(normalize("HTTP://Site.Example/a.png").as_str(), "http://site.example/a.png");
        assert_eq!(normalize("http://site").as_str(), normalize("http://site/").as_str());
        assert_eq!(normalize("http://site/?q=1#frag").as_str(), "http://site/?q=1");
    }

    #[test]
    fn test_normalize_relative_and_opaque() {
        assert_eq!(normalize("p0").as_str(), "p0");
        assert_eq!(normalize(" img/a.png#x").as_str(), "img/a.png");
        assert_eq!(normalize("mailto:someone@site#x").as_str(), "mailto:someone@site");
    }
}
