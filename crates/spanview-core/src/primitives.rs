//! # Reserved Primitives
//!
//! Fixed identifiers and constants shared by the projectors.
//!
//! These values are part of the wire contract with the annotation client
//! and of the project configuration format. They are compiled into the
//! binary and are immutable at runtime.

/// Storage identifier of the structural "nesting" pseudo-relation.
///
/// Nodes carrying this identifier are dropped from every projected tree.
pub const ENTITY_NESTING_TYPE: &str = "ENTITY-NESTING";

/// Drawing-config key holding the fallback style for span types.
pub const VISUAL_SPAN_DEFAULT: &str = "SPAN_DEFAULT";

/// Drawing-config key holding the fallback style for arcs and relations.
pub const VISUAL_ARC_DEFAULT: &str = "ARC_DEFAULT";

/// Drawing-config key holding the fallback style for attributes.
pub const VISUAL_ATTR_DEFAULT: &str = "ATTRIBUTE_DEFAULT";

/// Style keys copied onto span type items.
pub const SPAN_DRAWING_ATTRIBUTES: &[&str] = &["fgColor", "bgColor", "borderColor"];

/// Style keys copied onto arcs and relation type items.
pub const ARC_DRAWING_ATTRIBUTES: &[&str] = &["color", "dashArray", "arrowHead", "labelArrow"];

/// Style keys copied onto attribute values.
pub const ATTR_DRAWING_ATTRIBUTES: &[&str] =
    &["glyphColor", "box", "dashArray", "glyph", "position"];

/// Positional style key for attribute glyphs, renamed to `position` on output.
pub const GLYPH_POS_KEY: &str = "<GLYPH-POS>";

/// Glyph positions accepted for [`GLYPH_POS_KEY`].
pub const GLYPH_POSITIONS: &[&str] = &["left", "right"];

/// Name of the projected glyph position field.
pub const POSITION_KEY: &str = "position";

/// Style key synthesised when an attribute value has no drawing style.
pub const GLYPH_KEY: &str = "glyph";

/// Special-argument tag listing relation properties (e.g. `symmetric`).
pub const REL_TYPE_TAG: &str = "<REL-TYPE>";

/// Argument role enumerating the possible values of an attribute.
pub const VALUE_ROLE: &str = "Value";

/// Argument role listing the types an attribute applies to.
pub const ATTRIBUTE_TARGET_ROLE: &str = "Arg";

/// Target wildcard matching every type.
pub const ANY_TYPE: &str = "<ANY>";

/// Target wildcard matching every entity type.
pub const ENTITY_WILDCARD: &str = "<ENTITY>";

/// Target wildcard matching every event type.
pub const EVENT_WILDCARD: &str = "<EVENT>";

// =============================================================================
// FILES
// =============================================================================

/// Suffix of the primary text file of a document.
pub const TEXT_FILE_SUFFIX: &str = "txt";

/// Suffix of the joined annotation file.
pub const JOINED_ANN_FILE_SUFFIX: &str = "ann";

/// Suffixes of partial annotation files, read when no joined file exists.
pub const PARTIAL_ANN_FILE_SUFFIXES: &[&str] = &["a1", "a2", "co", "rel"];

/// File name of the per-directory project configuration.
pub const PROJECT_CONFIG_FILE: &str = "annotation.toml";

/// File name of the optional collection description.
pub const README_FILE: &str = "README";

/// Timestamp reported for files that are missing or unreadable.
pub const MISSING_TIMESTAMP: f64 = -1.0;

// =============================================================================
// CLIENT RENDERING
// =============================================================================

/// Pattern rewritten in projected text: two consecutive plain spaces.
pub const DOUBLE_SPACE: &str = "  ";

/// Replacement for [`DOUBLE_SPACE`]: a space followed by U+00A0.
pub const SPACE_NBSP: &str = " \u{00A0}";

/// Comment type used for parse failures and verification errors.
pub const ANNOTATION_ERROR: &str = "AnnotationError";

/// Comment type used for verification warnings.
pub const ANNOTATION_WARNING: &str = "AnnotationWarning";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_nbsp_keeps_char_count() {
        assert_eq!(DOUBLE_SPACE.chars().count(), SPACE_NBSP.chars().count());
    }

    #[test]
    fn glyph_position_key_is_not_a_drawing_attribute() {
        assert!(!ATTR_DRAWING_ATTRIBUTES.contains(&GLYPH_POS_KEY));
    }
}
