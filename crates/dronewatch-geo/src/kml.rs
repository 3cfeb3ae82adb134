//! KML rendering of boundary polygons.

use std::borrow::Cow;
use std::fmt::Write as _;

use geo::Polygon;

use crate::boundary::Boundary;

/// Media type for KML documents.
pub const KML_CONTENT_TYPE: &str = "application/vnd.google-earth.kml+xml";

const DOCUMENT_NAME: &str = "Drone Safety Boundaries";
const DOCUMENT_DESCRIPTION: &str = "Safety zones for drone monitoring";

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Exterior ring as space-separated `lon,lat,0` tuples.
#[must_use]
pub fn ring_coordinates(polygon: &Polygon<f64>) -> String {
    polygon
        .exterior()
        .coords()
        .map(|c| format!("{},{},0", c.x, c.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One `Placemark` per boundary inside a single `Document`.
#[must_use]
pub fn to_kml(boundaries: &[Boundary]) -> String {
    let mut kml = String::new();
    kml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    kml.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
    kml.push_str("  <Document>\n");
    let _ = writeln!(kml, "    <name>{DOCUMENT_NAME}</name>");
    let _ = writeln!(kml, "    <description>{DOCUMENT_DESCRIPTION}</description>");

    for boundary in boundaries {
        kml.push_str("    <Placemark>\n");
        let _ = writeln!(kml, "      <name>{}</name>", escape_xml(&boundary.name));
        let _ = writeln!(
            kml,
            "      <description>Type: {}, Security Level: {}</description>",
            escape_xml(&boundary.zone_type),
            escape_xml(&boundary.security_level)
        );
        kml.push_str("      <Polygon>\n");
        kml.push_str("        <outerBoundaryIs>\n");
        kml.push_str("          <LinearRing>\n");
        let _ = writeln!(
            kml,
            "            <coordinates>{}</coordinates>",
            ring_coordinates(&boundary.polygon)
        );
        kml.push_str("          </LinearRing>\n");
        kml.push_str("        </outerBoundaryIs>\n");
        kml.push_str("      </Polygon>\n");
        kml.push_str("    </Placemark>\n");
    }

    kml.push_str("  </Document>\n");
    kml.push_str("</kml>\n");
    kml
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, polygon};

    fn zone(name: &str) -> Boundary {
        Boundary {
            name: name.to_string(),
            zone_type: "restricted".to_string(),
            security_level: "high".to_string(),
            polygon: polygon![
                (x: 85.0, y: 23.0),
                (x: 85.5, y: 23.0),
                (x: 85.5, y: 23.25),
                (x: 85.0, y: 23.0),
            ],
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_xml("Zone A"), "Zone A");
        assert!(matches!(escape_xml("plain"), Cow::Borrowed(_)));
        assert_eq!(escape_xml("A & <B> \"c\" 'd'"), "A &amp; &lt;B&gt; &quot;c&quot; &apos;d&apos;");
    }

    #[test]
    fn test_ring_is_lon_lat_zero() {
        let p = Polygon::new(
            LineString::from(vec![(77.5, 12.9), (77.6, 12.9), (77.6, 13.0), (77.5, 12.9)]),
            vec![],
        );
        assert_eq!(ring_coordinates(&p), "77.5,12.9,0 77.6,12.9,0 77.6,13,0 77.5,12.9,0");
    }

    #[test]
    fn test_document_shape() {
        let kml = to_kml(&[zone("North Gate"), zone("Tank <3>")]);
        assert!(kml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(kml.contains("<kml xmlns=\"http://www.opengis.net/kml/2.2\">"));
        assert!(kml.contains("<name>Drone Safety Boundaries</name>"));
        assert_eq!(kml.matches("<Placemark>").count(), 2);
        assert!(kml.contains("<description>Type: restricted, Security Level: high</description>"));
        assert!(kml.contains("<name>Tank &lt;3&gt;</name>"));
        assert!(kml.contains("<coordinates>85,23,0 85.5,23,0 85.5,23.25,0 85,23,0</coordinates>"));
        assert!(kml.trim_end().ends_with("</kml>"));
    }

    #[test]
    fn test_empty_document() {
        let kml = to_kml(&[]);
        assert!(!kml.contains("<Placemark>"));
        assert!(kml.contains("</Document>"));
    }
}
