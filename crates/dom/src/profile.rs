//! Switchable host behaviours.
//!
//! Real hosts ship primitives that are missing or subtly wrong. A
//! [`HostProfile`] lets a [`crate::Document`] imitate them so that probing
//! and fallback can be exercised.

/// State of one optional primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Primitive {
    /// Calling it returns an error.
    Absent,
    #[default]
    Working,
    /// Present but buggy; the bug depends on the primitive.
    Degraded,
}

/// Per-primitive behaviour of a document.
#[allow(
    clippy::struct_excessive_bools,
    reason = "Each flag toggles one independent host quirk"
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostProfile {
    /// Degraded: also returns elements whose `name` equals the id.
    pub id_lookup: Primitive,
    /// Degraded: only the first class token of each element is seen.
    pub class_lookup: Primitive,
    /// Degraded: `*` also yields text and comment nodes.
    pub tag_lookup: Primitive,
    /// Degraded: selectors with `*` also yield text and comment nodes.
    pub bulk_query: Primitive,
    /// Bulk query compares class names case-insensitively.
    pub bulk_query_ignores_class_case: bool,
    /// Degraded: unknown pseudo-classes are accepted and match.
    pub single_match: Primitive,
    /// The generic attribute getter on a `form` returns a child control
    /// whose id or name equals the attribute name.
    pub form_getter_shadowed: bool,
    /// Whether document-order comparison is available.
    pub document_order: bool,
    /// Whether the engine-facing mutation primitives work.
    pub mutable: bool,
}

impl Default for HostProfile {
    fn default() -> Self {
        Self {
            id_lookup: Primitive::Working,
            class_lookup: Primitive::Working,
            tag_lookup: Primitive::Working,
            bulk_query: Primitive::Working,
            bulk_query_ignores_class_case: false,
            single_match: Primitive::Working,
            form_getter_shadowed: false,
            document_order: true,
            mutable: true,
        }
    }
}

impl HostProfile {
    /// A host with navigation and attribute reads only.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            id_lookup: Primitive::Absent,
            class_lookup: Primitive::Absent,
            tag_lookup: Primitive::Absent,
            bulk_query: Primitive::Absent,
            bulk_query_ignores_class_case: false,
            single_match: Primitive::Absent,
            form_getter_shadowed: false,
            document_order: false,
            mutable: false,
        }
    }

    /// Every primitive present but buggy.
    #[must_use]
    pub fn quirky() -> Self {
        Self {
            id_lookup: Primitive::Degraded,
            class_lookup: Primitive::Degraded,
            tag_lookup: Primitive::Degraded,
            bulk_query: Primitive::Degraded,
            bulk_query_ignores_class_case: true,
            single_match: Primitive::Degraded,
            form_getter_shadowed: true,
            document_order: true,
            mutable: true,
        }
    }
}
