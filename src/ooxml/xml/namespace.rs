//! Namespace URIs used by PresentationML and DrawingML parts.

use phf::{Map, phf_map};

// ============================================================================
// NAMESPACE CONSTANTS
// ============================================================================

/// DrawingML main namespace (`a:`)
pub const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// PresentationML namespace (`p:`)
pub const P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// Office document relationships namespace (`r:`)
pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// DrawingML chart namespace (`c:`)
pub const C: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

/// Markup compatibility namespace (`mc:`)
pub const MC: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

/// DrawingML diagram namespace (`dgm:`)
pub const DGM: &str = "http://schemas.openxmlformats.org/drawingml/2006/diagram";

/// Built-in `xml:` prefix
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// `a:graphicData/@uri` for tables
pub const GRAPHIC_TABLE: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";

/// `a:graphicData/@uri` for charts
pub const GRAPHIC_CHART: &str = C;

/// `a:graphicData/@uri` for SmartArt diagrams
pub const GRAPHIC_DIAGRAM: &str = DGM;

/// Conventional prefix for each namespace, used when a new element has to be
/// created in a namespace not carried by its parent.
static PREFERRED_PREFIXES: Map<&'static str, &'static str> = phf_map! {
    "http://schemas.openxmlformats.org/drawingml/2006/main" => "a",
    "http://schemas.openxmlformats.org/presentationml/2006/main" => "p",
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships" => "r",
    "http://schemas.openxmlformats.org/drawingml/2006/chart" => "c",
    "http://schemas.openxmlformats.org/markup-compatibility/2006" => "mc",
    "http://schemas.openxmlformats.org/drawingml/2006/diagram" => "dgm",
};

/// Get the conventional prefix for a namespace URI.
#[inline]
pub fn preferred_prefix(uri: &str) -> Option<&'static str> {
    PREFERRED_PREFIXES.get(uri).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_prefix() {
        assert_eq!(preferred_prefix(A), Some("a"));
        assert_eq!(preferred_prefix(GRAPHIC_CHART), Some("c"));
        assert_eq!(preferred_prefix("urn:unknown"), None);
    }
}
