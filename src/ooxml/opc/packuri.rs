/// The PackURI value type: a part name inside a package.
///
/// PackURIs always begin with a forward slash and use forward slashes as path
/// separators. Zip member names are the same string without the leading slash.
use crate::ooxml::error::{FormatError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/ppt/slides/slide1.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI, which must begin with a forward slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(FormatError::InvalidPackUri(uri));
        }
        Ok(PackURI { uri })
    }

    /// Create a PackURI from a zip member name ("ppt/slides/slide1.xml").
    pub fn from_member_name(member: &str) -> Self {
        PackURI {
            uri: format!("/{}", member.trim_start_matches('/')),
        }
    }

    /// Resolve a relationship target (like "../slideLayouts/slideLayout1.xml")
    /// against a base URI (like "/ppt/slides").
    ///
    /// A target starting with a slash is already absolute.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self> {
        if relative_ref.starts_with('/') {
            return Self::new(Self::normalize_path(relative_ref));
        }
        let joined = if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(Self::normalize_path(&joined))
    }

    /// Get the base URI (directory portion) of this PackURI.
    ///
    /// For example, "/ppt/slides" for "/ppt/slides/slide1.xml".
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion, e.g. "slide1.xml".
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Get the zip member name (URI with the leading slash stripped).
    #[inline]
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Get the PackURI of the .rels part for this part.
    ///
    /// For example, "/ppt/slides/_rels/slide1.xml.rels" for "/ppt/slides/slide1.xml",
    /// and "/_rels/.rels" for the package pseudo-partname "/".
    pub fn rels_uri(&self) -> PackURI {
        let base_uri = self.base_uri();
        let filename = self.filename();
        let uri = if base_uri == "/" {
            format!("/_rels/{}.rels", filename)
        } else {
            format!("{}/_rels/{}.rels", base_uri, filename)
        };
        PackURI { uri }
    }

    /// Whether this part holds relationships.
    #[inline]
    pub fn is_rels(&self) -> bool {
        self.uri.ends_with(".rels") && self.base_uri().ends_with("/_rels")
    }

    /// For a `.rels` part, the part whose relationships it holds.
    ///
    /// "/_rels/.rels" maps to the package pseudo-partname "/".
    pub fn rels_source(&self) -> Option<PackURI> {
        if !self.is_rels() {
            return None;
        }
        let dir = self.base_uri().strip_suffix("/_rels")?;
        let filename = self.filename().strip_suffix(".rels")?;
        let uri = match (dir, filename) {
            (_, "") => PACKAGE_URI.to_string(),
            ("", name) => format!("/{}", name),
            (dir, name) => format!("{}/{}", dir, name),
        };
        Some(PackURI { uri })
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Resolve "." and ".." segments.
    fn normalize_path(path: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for part in path.split('/') {
            match part {
                "" | "." => {},
                ".." => {
                    parts.pop();
                },
                _ => parts.push(part),
            }
        }
        format!("/{}", parts.join("/"))
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";
