//! Content addresses.
//!
//! A provider's artwork collection lives at `content://<authority>`; a single
//! row lives at `content://<authority>/<id>`, which is what inserts return.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AddressError;
use crate::types::{ArtworkId, Authority};

/// URI scheme of every content address.
pub const SCHEME: &str = "content";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentUri {
    authority: Authority,
    id: Option<ArtworkId>,
}

impl ContentUri {
    /// Collection address for `authority`. No validation is performed.
    pub fn new(authority: impl Into<Authority>) -> Self {
        Self {
            authority: authority.into(),
            id: None,
        }
    }

    /// Parse `content://<authority>[/<id>]`.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let invalid = |reason: &str| AddressError::Invalid {
            input: input.to_owned(),
            reason: reason.to_owned(),
        };

        let url = Url::parse(input).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != SCHEME {
            return Err(invalid("scheme must be `content`"));
        }
        let authority = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_owned(),
            _ => return Err(invalid("missing authority")),
        };
        if !url.username().is_empty() || url.password().is_some() || url.port().is_some() {
            return Err(invalid("authority must not carry userinfo or a port"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not supported"));
        }

        let id = match url.path() {
            "" | "/" => None,
            path => {
                let segment = path.strip_prefix('/').unwrap_or(path);
                let segment = segment.strip_suffix('/').unwrap_or(segment);
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("path must be empty or a single numeric row id"));
                }
                Some(ArtworkId(
                    segment.parse().map_err(|_| invalid("row id out of range"))?,
                ))
            }
        };

        Ok(Self {
            authority: Authority(authority),
            id,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Row id named by the path, if this is a row address.
    pub fn id(&self) -> Option<ArtworkId> {
        self.id
    }

    /// Address of row `id` under this address's authority.
    pub fn with_id(&self, id: ArtworkId) -> Self {
        Self {
            authority: self.authority.clone(),
            id: Some(id),
        }
    }

    /// The collection address this address belongs to.
    pub fn collection(&self) -> Self {
        Self::new(self.authority.clone())
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}://{}", self.authority)?;
        if let Some(id) = self.id {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}

impl FromStr for ContentUri {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentUri {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ContentUri> for String {
    fn from(uri: ContentUri) -> Self {
        uri.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_address_has_no_path() {
        let uri = ContentUri::new("com.example.art");
        assert_eq!(uri.to_string(), "content://com.example.art");
        assert_eq!(uri.id(), None);
    }

    #[test]
    fn row_address_appends_id() {
        let uri = ContentUri::new("com.example.art").with_id(ArtworkId(12));
        assert_eq!(uri.to_string(), "content://com.example.art/12");
        assert_eq!(uri.collection(), ContentUri::new("com.example.art"));
    }

    #[test]
    fn parse_roundtrips_display() {
        for input in ["content://com.example.art", "content://com.example.art/7"] {
            let uri = ContentUri::parse(input).unwrap();
            assert_eq!(uri.to_string(), input);
        }
    }

    #[test]
    fn parse_accepts_trailing_slash() {
        let uri = ContentUri::parse("content://com.example.art/").unwrap();
        assert_eq!(uri, ContentUri::new("com.example.art"));
    }

    #[test]
    fn parse_rejects_other_schemes_and_paths() {
        assert!(ContentUri::parse("https://com.example.art").is_err());
        assert!(ContentUri::parse("content://com.example.art/artwork/3").is_err());
        assert!(ContentUri::parse("content://com.example.art/abc").is_err());
        assert!(ContentUri::parse("content://com.example.art:80").is_err());
        assert!(ContentUri::parse("content:///3").is_err());
        assert!(ContentUri::parse("not a uri").is_err());
    }

    #[test]
    fn parse_rejects_empty_path_segments() {
        assert_eq!(
            ContentUri::parse("content://a.b/3/").unwrap(),
            ContentUri::new("a.b").with_id(ArtworkId(3))
        );
        for input in ["content://a.b//3", "content://a.b/3//", "content://a.b//"] {
            assert!(ContentUri::parse(input).is_err(), "{input}");
        }
    }

    #[test]
    fn serializes_as_string() {
        let uri = ContentUri::new("a.b").with_id(ArtworkId(1));
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, r#""content://a.b/1""#);
        let back: ContentUri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uri);
    }
}
