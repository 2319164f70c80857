use std::fmt;

use url::Url;

use crate::error::PopupError;

const TCONST_PREFIX: &str = "tt";
const IMDB_TITLE_BASE: &str = "https://www.imdb.com/title";

/// A movie identifier in the remote service's namespace ("tt" followed by
/// digits, e.g. "tt1375666").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tconst(String);

impl Tconst {
    /// Validates a raw path segment as a tconst.
    pub fn parse(segment: &str) -> Result<Self, PopupError> {
        if segment.contains(TCONST_PREFIX) {
            Ok(Self(segment.to_string()))
        } else {
            Err(PopupError::InvalidIdentifier(segment.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tconst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn imdb_title_url(tconst: &str) -> String {
    format!("{}/{}", IMDB_TITLE_BASE, tconst)
}

/// Pulls the movie identifier out of a page URL. Movie pages look like
/// `https://www.imdb.com/title/tt1375666/...`, so the identifier is the
/// second path segment.
pub fn extract_tconst(page_url: &str) -> Result<Tconst, PopupError> {
    let url = Url::parse(page_url)
        .map_err(|_| PopupError::InvalidIdentifier(page_url.to_string()))?;

    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.nth(1))
        .ok_or_else(|| PopupError::InvalidIdentifier(page_url.to_string()))?;

    Tconst::parse(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tconst_from_title_page() {
        let tconst = extract_tconst("https://www.imdb.com/title/tt1375666/").unwrap();
        assert_eq!(tconst.as_str(), "tt1375666");
    }

    #[test]
    fn keeps_the_segment_exactly_as_written() {
        let tconst =
            extract_tconst("https://www.imdb.com/title/tt0468569/?ref_=nv_sr_srsg_0").unwrap();
        assert_eq!(tconst.as_str(), "tt0468569");
    }

    #[test]
    fn rejects_url_without_second_segment() {
        let err = extract_tconst("https://www.imdb.com/").unwrap_err();
        assert!(matches!(err, PopupError::InvalidIdentifier(_)));
    }

    #[test]
    fn rejects_segment_without_prefix() {
        let err = extract_tconst("https://www.imdb.com/name/nm0000138/").unwrap_err();
        assert!(matches!(err, PopupError::InvalidIdentifier(_)));
    }

    #[test]
    fn rejects_empty_segment() {
        let err = extract_tconst("https://www.imdb.com/title/").unwrap_err();
        assert!(matches!(err, PopupError::InvalidIdentifier(_)));
    }

    #[test]
    fn rejects_unparsable_url() {
        let err = extract_tconst("not a url at all").unwrap_err();
        assert!(matches!(err, PopupError::InvalidIdentifier(_)));
    }

    #[test]
    fn builds_the_canonical_public_page() {
        assert_eq!(
            imdb_title_url("tt1375666"),
            "https://www.imdb.com/title/tt1375666"
        );
    }
}
