use serde::{Deserialize, Serialize};

/// One map annotation: a point geometry with a rich-text description.
///
/// Drafts created client-side carry negative ids until the create request
/// returns the server id; everything the backend owns is positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: i64,
    pub x: f64,
    pub y: f64,
    pub description: String,
    pub style: Option<serde_json::Value>,
}

impl Annotation {
    pub fn is_draft(&self) -> bool {
        self.id < 0
    }

    /// Geometry in the backend's point WKT form.
    pub fn geom_wkt(&self) -> String {
        format!("POINT ({} {})", self.x, self.y)
    }
}

/// The minimal fields exchanged with the feature endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub geom: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
}

impl AnnotationRecord {
    /// Build the wire record from a runtime annotation. Draft ids are not
    /// sent; the backend assigns the real one.
    pub fn from_annotation(annotation: &Annotation) -> Self {
        AnnotationRecord {
            id: (!annotation.is_draft()).then_some(annotation.id),
            geom: annotation.geom_wkt(),
            description: annotation.description.clone(),
            style: annotation.style.clone(),
        }
    }

    /// Reconstruct a runtime annotation from a wire record.
    ///
    /// Returns `None` when the geometry is not a parseable point WKT; the
    /// collection load skips such records rather than failing the batch.
    pub fn to_annotation(&self) -> Option<Annotation> {
        let (x, y) = parse_point_wkt(&self.geom)?;
        Some(Annotation {
            id: self.id?,
            x,
            y,
            description: self.description.clone(),
            style: self.style.clone(),
        })
    }
}

/// Parse `POINT (x y)` / `POINT(x y)` into coordinates.
pub fn parse_point_wkt(wkt: &str) -> Option<(f64, f64)> {
    let rest = wkt.trim().strip_prefix("POINT")?.trim();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_annotation(id: i64) -> Annotation {
        Annotation {
            id,
            x: 11.5,
            y: -3.25,
            description: "survey point".to_string(),
            style: None,
        }
    }

    #[test]
    fn point_wkt_round_trip() {
        let annotation = make_annotation(5);
        let record = AnnotationRecord::from_annotation(&annotation);
        assert_eq!(record.geom, "POINT (11.5 -3.25)");
        assert_eq!(record.to_annotation().unwrap(), annotation);
    }

    #[test]
    fn parse_point_wkt_accepts_tight_spacing() {
        assert_eq!(parse_point_wkt("POINT(1 2)"), Some((1.0, 2.0)));
        assert_eq!(parse_point_wkt("  POINT ( 1.5   2.5 ) "), Some((1.5, 2.5)));
    }

    #[test]
    fn parse_point_wkt_rejects_other_geometries() {
        assert_eq!(parse_point_wkt("LINESTRING (0 0, 1 1)"), None);
        assert_eq!(parse_point_wkt("POINT (1 2 3)"), None);
        assert_eq!(parse_point_wkt("POINT ()"), None);
    }

    #[test]
    fn draft_id_is_not_serialized() {
        let draft = make_annotation(-1);
        let record = AnnotationRecord::from_annotation(&draft);
        assert!(record.id.is_none());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_none());
    }
}
