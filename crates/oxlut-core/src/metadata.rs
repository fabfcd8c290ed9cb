//! Format metadata carried by file-based operators.
//!
//! Readers for process-list formats attach descriptive metadata to the
//! operators they produce: a name, an id, and an ordered list of child
//! elements such as descriptions. The metadata rides along through
//! transformations and is merged when two operators are combined into
//! one.
//!
//! Metadata never participates in operator equality or cache identity.

/// Conventional element name for description children.
pub const METADATA_DESCRIPTION: &str = "Description";

/// A single named metadata element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataItem {
    /// Element name, e.g. `Description`.
    pub name: String,
    /// Element text content.
    pub value: String,
}

/// Metadata tree attached to an operator.
///
/// # Example
///
/// ```rust
/// use oxlut_core::{FormatMetadata, METADATA_DESCRIPTION};
///
/// let mut md = FormatMetadata::new();
/// md.set_name("lut1");
/// md.add_child(METADATA_DESCRIPTION, "primary grade");
/// assert_eq!(md.children().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatMetadata {
    name: String,
    id: String,
    children: Vec<MetadataItem>,
}

impl FormatMetadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// The operator name attribute (may be empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the operator name attribute.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The operator id attribute (may be empty).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sets the operator id attribute.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Appends a child element.
    pub fn add_child(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.children.push(MetadataItem {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Child elements in insertion order.
    pub fn children(&self) -> &[MetadataItem] {
        &self.children
    }

    /// Merges another operator's metadata into this one.
    ///
    /// Children are appended in their original order. Name and id
    /// attributes are joined with `" + "` when both sides carry one,
    /// otherwise the non-empty side wins.
    pub fn combine(&mut self, other: &FormatMetadata) {
        self.name = join_attr(&self.name, &other.name);
        self.id = join_attr(&self.id, &other.id);
        self.children.extend(other.children.iter().cloned());
    }
}

fn join_attr(a: &str, b: &str) -> String {
    if a.is_empty() {
        b.to_string()
    } else if b.is_empty() {
        a.to_string()
    } else {
        format!("{a} + {b}")
    }
}
