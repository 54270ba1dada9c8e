//! Object-index documents returned by the object retrieval API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Marker identifying figure/graphic references (`gr1`, `gr2`, ...)
const GRAPHIC_MARKER: &str = "gr";

/// Marker identifying author-manuscript references
const MANUSCRIPT_MARKER: &str = "am";

/// Kind of downloadable object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Graphic,
    Manuscript,
}

/// A downloadable asset attached to an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectReference {
    /// Reference tag, e.g. `gr1` or `am`
    pub reference: String,
    pub kind: ObjectKind,
    /// Declared object type, e.g. `IMAGE-HIGH-JPEG` or `APPLICATION-PDF`
    pub object_type: String,
    /// Direct URL advertised by the index, if any
    pub url: Option<String>,
}

impl ObjectReference {
    /// URL to download this object from, given the article's index URL.
    ///
    /// Graphics are requested at the high-resolution rendering; manuscripts
    /// use the URL the index advertises.
    pub fn download_url(&self, index_url: &str) -> Option<String> {
        match self.kind {
            ObjectKind::Graphic => Some(format!("{}/ref/{}/high", index_url, self.reference)),
            ObjectKind::Manuscript => self.url.clone(),
        }
    }
}

/// One row of `choices.choice`
#[derive(Debug, Clone, Deserialize)]
struct Choice {
    #[serde(rename = "@ref", default)]
    reference: String,
    #[serde(rename = "@type", default)]
    object_type: String,
    #[serde(rename = "$", default)]
    url: Option<String>,
}

/// Parsed object index for one article
#[derive(Debug, Clone, Default)]
pub struct ObjectIndex {
    choices: Vec<Choice>,
}

impl ObjectIndex {
    /// Parse `choices.choice` from an object-index document.
    ///
    /// Returns `None` when the structure is missing or malformed. A lone
    /// object in place of the array is accepted.
    pub fn from_value(document: &Value) -> Option<Self> {
        let raw = document.get("choices")?.get("choice")?;
        let choices = match raw {
            Value::Array(_) => serde_json::from_value::<Vec<Choice>>(raw.clone()).ok()?,
            Value::Object(_) => vec![serde_json::from_value::<Choice>(raw.clone()).ok()?],
            _ => return None,
        };
        Some(Self { choices })
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Distinct graphic references, sorted by tag
    pub fn graphics(&self) -> Vec<ObjectReference> {
        let mut by_ref: BTreeMap<&str, &Choice> = BTreeMap::new();
        for choice in &self.choices {
            if choice.reference.contains(GRAPHIC_MARKER) {
                by_ref.entry(choice.reference.as_str()).or_insert(choice);
            }
        }

        by_ref
            .into_values()
            .map(|c| ObjectReference {
                reference: c.reference.clone(),
                kind: ObjectKind::Graphic,
                object_type: c.object_type.clone(),
                url: c.url.clone(),
            })
            .collect()
    }

    /// Distinct author-manuscript PDFs, sorted by URL
    pub fn manuscripts(&self) -> Vec<ObjectReference> {
        let mut by_url: BTreeMap<&str, &Choice> = BTreeMap::new();
        for choice in &self.choices {
            let is_manuscript = choice.reference.to_lowercase().contains(MANUSCRIPT_MARKER)
                && choice.object_type.to_lowercase().contains("pdf");
            if let (true, Some(url)) = (is_manuscript, choice.url.as_deref()) {
                by_url.entry(url).or_insert(choice);
            }
        }

        by_url
            .into_values()
            .map(|c| ObjectReference {
                reference: c.reference.clone(),
                kind: ObjectKind::Manuscript,
                object_type: c.object_type.clone(),
                url: c.url.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index_document() -> Value {
        json!({
            "choices": {
                "choice": [
                    {"@ref": "gr2", "@type": "IMAGE-HIGH-JPEG", "$": "https://example.com/gr2"},
                    {"@ref": "gr1", "@type": "IMAGE-HIGH-JPEG", "$": "https://example.com/gr1"},
                    {"@ref": "gr1", "@type": "IMAGE-THUMBNAIL", "$": "https://example.com/gr1-thumb"},
                    {"@ref": "fig1", "@type": "IMAGE-HIGH-JPEG", "$": "https://example.com/fig1"},
                    {"@ref": "AM", "@type": "APPLICATION-PDF", "$": "https://example.com/am.pdf"},
                    {"@ref": "am", "@type": "TEXT-XML", "$": "https://example.com/am.xml"}
                ]
            }
        })
    }

    #[test]
    fn test_graphics_match_marker_substring() {
        let index = ObjectIndex::from_value(&index_document()).unwrap();
        let refs: Vec<String> = index.graphics().into_iter().map(|g| g.reference).collect();
        assert_eq!(refs, vec!["gr1", "gr2"]);
    }

    #[test]
    fn test_graphic_download_url() {
        let index = ObjectIndex::from_value(&index_document()).unwrap();
        let first = &index.graphics()[0];
        assert_eq!(
            first.download_url("https://api.example.com/content/object/doi/10.1/x"),
            Some("https://api.example.com/content/object/doi/10.1/x/ref/gr1/high".to_string())
        );
    }

    #[test]
    fn test_manuscripts_require_pdf_type() {
        let index = ObjectIndex::from_value(&index_document()).unwrap();
        let manuscripts = index.manuscripts();
        assert_eq!(manuscripts.len(), 1);
        assert_eq!(
            manuscripts[0].download_url("ignored"),
            Some("https://example.com/am.pdf".to_string())
        );
    }

    #[test]
    fn test_single_choice_object() {
        let doc = json!({"choices": {"choice": {"@ref": "gr1", "@type": "IMAGE-HIGH-JPEG"}}});
        let index = ObjectIndex::from_value(&doc).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.graphics().len(), 1);
    }

    #[test]
    fn test_malformed_index() {
        assert!(ObjectIndex::from_value(&json!({})).is_none());
        assert!(ObjectIndex::from_value(&json!({"choices": {"choice": "gr1"}})).is_none());
        assert!(ObjectIndex::from_value(&json!({"service-error": {}})).is_none());
    }
}
