// crates/authz-chain-config/src/field.rs
// ============================================================================
// Module: Field Errors
// Description: Structured, path-attributed validation defects.
// Purpose: Accumulate every defect in one pass and render them for operators.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Validation never stops at the first defect. Each defect is a
//! [`FieldError`] carrying its kind, the dotted field path it is attributed
//! to (`authorizers[0].webhook.timeout`), and the offending value where one
//! applies. A [`FieldErrorList`] aggregates them into one message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

// ============================================================================
// SECTION: Field Paths
// ============================================================================

/// Segment of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    /// Named child field.
    Field(String),
    /// Index into a sequence.
    Index(usize),
}

/// Dotted field path (`authorizers[1].webhook.name`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    /// Path segments from the root.
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Creates a path rooted at the named field.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            segments: vec![PathSegment::Field(root.to_string())],
        }
    }

    /// Returns a path extended with a named child.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.to_string()));
        Self {
            segments,
        }
    }

    /// Returns a path extended with a sequence index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self {
            segments,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if idx == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

// ============================================================================
// SECTION: Field Errors
// ============================================================================

/// Classification of a validation defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Mandatory field absent or zero.
    Required,
    /// Present but fails a semantic constraint.
    Invalid,
    /// Outside an enumerated set of values.
    NotSupported,
    /// Collides with an earlier value that must be unique.
    Duplicate,
}

impl FieldErrorKind {
    /// Returns the operator-facing label for the kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Required => "Required value",
            Self::Invalid => "Invalid value",
            Self::NotSupported => "Unsupported value",
            Self::Duplicate => "Duplicate value",
        }
    }
}

/// Single validation defect attributed to a field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Defect classification.
    pub kind: FieldErrorKind,
    /// Field the defect is attributed to.
    pub field: FieldPath,
    /// Offending value, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bad_value: Option<String>,
    /// Additional detail.
    pub detail: String,
}

impl FieldError {
    /// Mandatory field is missing.
    #[must_use]
    pub fn required(field: FieldPath, detail: &str) -> Self {
        Self {
            kind: FieldErrorKind::Required,
            field,
            bad_value: None,
            detail: detail.to_string(),
        }
    }

    /// Value fails a semantic constraint.
    #[must_use]
    pub fn invalid(field: FieldPath, value: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: FieldErrorKind::Invalid,
            field,
            bad_value: Some(value.into()),
            detail: detail.into(),
        }
    }

    /// Value is outside the allowed set; the detail lists the allowed values.
    #[must_use]
    pub fn not_supported<S: AsRef<str>>(
        field: FieldPath,
        value: impl Into<String>,
        allowed: &[S],
    ) -> Self {
        let quoted: Vec<String> =
            allowed.iter().map(|value| format!("\"{}\"", value.as_ref())).collect();
        Self {
            kind: FieldErrorKind::NotSupported,
            field,
            bad_value: Some(value.into()),
            detail: format!("supported values: {}", quoted.join(", ")),
        }
    }

    /// Value repeats an earlier unique value.
    #[must_use]
    pub fn duplicate(field: FieldPath, value: impl Into<String>) -> Self {
        Self {
            kind: FieldErrorKind::Duplicate,
            field,
            bad_value: Some(value.into()),
            detail: String::new(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind.label())?;
        if let Some(value) = &self.bad_value {
            write!(f, ": \"{value}\"")?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

// ============================================================================
// SECTION: Error Lists
// ============================================================================

/// Ordered list of field errors from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrorList(Vec<FieldError>);

impl FieldErrorList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a single error.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Appends every error from another list.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Returns true when no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the recorded errors in order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }
}

impl From<Vec<FieldError>> for FieldErrorList {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for FieldErrorList {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrorList {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_aggregate(f, self.0.iter())
    }
}

/// Joins messages into one aggregate: a lone message is written as is,
/// several are bracketed and comma separated.
pub(crate) fn write_aggregate<I, T>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: ExactSizeIterator<Item = T>,
    T: fmt::Display,
{
    let count = items.len();
    if count == 1 {
        for item in items {
            write!(f, "{item}")?;
        }
        return Ok(());
    }
    f.write_str("[")?;
    for (idx, item) in items.enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
