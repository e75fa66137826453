//! Index fields, terms and the per-asset documents built from them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuledexError};

/// The kinds of facts an asset can be indexed by.
///
/// The wire name of each kind ([`IndexableElement::as_str`]) is the index
/// field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexableElement {
    /// Fully-qualified class name of a referenced type.
    TypeName,
    /// Simple name of a referenced field.
    FieldTypeName,
    /// Declared class of a referenced field.
    FieldTypeFullyQualifiedClassName,
    /// A rule-level attribute such as `no-loop`.
    RuleAttributeName,
    /// The value given to a rule attribute.
    RuleAttributeValue,
    /// Name of a rule defined or referenced by the asset.
    RuleName,
    /// Package the asset belongs to.
    PackageName,
}

impl IndexableElement {
    /// Every field kind, in declaration order.
    pub const ALL: [IndexableElement; 7] = [
        IndexableElement::TypeName,
        IndexableElement::FieldTypeName,
        IndexableElement::FieldTypeFullyQualifiedClassName,
        IndexableElement::RuleAttributeName,
        IndexableElement::RuleAttributeValue,
        IndexableElement::RuleName,
        IndexableElement::PackageName,
    ];

    /// The index field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexableElement::TypeName => "TYPE_NAME",
            IndexableElement::FieldTypeName => "FIELD_TYPE_NAME",
            IndexableElement::FieldTypeFullyQualifiedClassName => {
                "FIELD_TYPE_FULLY_QUALIFIED_CLASS_NAME"
            }
            IndexableElement::RuleAttributeName => "RULE_ATTRIBUTE_NAME",
            IndexableElement::RuleAttributeValue => "RULE_ATTRIBUTE_VALUE",
            IndexableElement::RuleName => "RULE_NAME",
            IndexableElement::PackageName => "PACKAGE_NAME",
        }
    }
}

impl fmt::Display for IndexableElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexableElement {
    type Err = RuledexError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        IndexableElement::ALL
            .into_iter()
            .find(|element| element.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RuledexError::field(format!("Unknown index field: {s}")))
    }
}

/// A single `(field, value)` predicate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexTerm {
    pub field: IndexableElement,
    pub value: String,
}

impl IndexTerm {
    pub fn new<S: Into<String>>(field: IndexableElement, value: S) -> Self {
        IndexTerm {
            field,
            value: value.into(),
        }
    }

    pub fn type_name<S: Into<String>>(value: S) -> Self {
        Self::new(IndexableElement::TypeName, value)
    }

    pub fn field_type_name<S: Into<String>>(value: S) -> Self {
        Self::new(IndexableElement::FieldTypeName, value)
    }

    pub fn field_type_fqcn<S: Into<String>>(value: S) -> Self {
        Self::new(IndexableElement::FieldTypeFullyQualifiedClassName, value)
    }

    pub fn rule_attribute_name<S: Into<String>>(value: S) -> Self {
        Self::new(IndexableElement::RuleAttributeName, value)
    }

    pub fn rule_attribute_value<S: Into<String>>(value: S) -> Self {
        Self::new(IndexableElement::RuleAttributeValue, value)
    }

    pub fn rule_name<S: Into<String>>(value: S) -> Self {
        Self::new(IndexableElement::RuleName, value)
    }

    pub fn package_name<S: Into<String>>(value: S) -> Self {
        Self::new(IndexableElement::PackageName, value)
    }

    /// Parse `FIELD=value`.
    pub fn parse(spec: &str) -> Result<Self> {
        let (field, value) = spec.split_once('=').ok_or_else(|| {
            RuledexError::invalid_argument(format!("Expected FIELD=VALUE, got '{spec}'"))
        })?;
        let field: IndexableElement = field.parse()?;
        if value.trim().is_empty() {
            return Err(RuledexError::invalid_argument(format!(
                "Empty value for field {field}"
            )));
        }
        Ok(IndexTerm::new(field, value))
    }
}

impl fmt::Display for IndexTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

/// Normalized location of an asset.
///
/// Always starts with `/`, never ends with one (except the root itself) and
/// has no empty, `.` or `..` segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetPath(String);

impl AssetPath {
    /// Parse and normalize a path.
    pub fn new(path: &str) -> Result<Self> {
        let mut segments: Vec<&str> = Vec::new();
        for segment in path.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(RuledexError::invalid_argument(format!(
                            "Path escapes the root: {path}"
                        )));
                    }
                }
                other => segments.push(other),
            }
        }
        Ok(AssetPath(format!("/{}", segments.join("/"))))
    }

    /// The root path `/`.
    pub fn root() -> Self {
        AssetPath("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Last segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// Extension of the file name without the dot.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    pub fn parent(&self) -> Option<AssetPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) | None => Some(AssetPath::root()),
            Some(idx) => Some(AssetPath(self.0[..idx].to_string())),
        }
    }

    /// Join a relative child path onto this one.
    pub fn resolve(&self, child: &str) -> Result<AssetPath> {
        AssetPath::new(&format!("{}/{}", self.0, child))
    }

    /// Replace the file name.
    pub fn resolve_sibling(&self, name: &str) -> Result<AssetPath> {
        self.parent().unwrap_or_else(AssetPath::root).resolve(name)
    }

    /// Whether `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &AssetPath) -> bool {
        other.is_root()
            || self == other
            || (self.0.starts_with(&other.0) && self.0[other.0.len()..].starts_with('/'))
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssetPath {
    type Err = RuledexError;

    fn from_str(s: &str) -> Result<Self> {
        AssetPath::new(s)
    }
}

impl TryFrom<String> for AssetPath {
    type Error = RuledexError;

    fn try_from(value: String) -> Result<Self> {
        AssetPath::new(&value)
    }
}

impl From<AssetPath> for String {
    fn from(path: AssetPath) -> Self {
        path.0
    }
}

/// The terms extracted from one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub path: AssetPath,
    pub asset_type: String,
    pub terms: BTreeSet<IndexTerm>,
    pub indexed_at: DateTime<Utc>,
}

impl IndexDocument {
    pub fn new<S: Into<String>>(path: AssetPath, asset_type: S) -> Self {
        IndexDocument {
            path,
            asset_type: asset_type.into(),
            terms: BTreeSet::new(),
            indexed_at: Utc::now(),
        }
    }

    pub fn with_terms<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = IndexTerm>,
    {
        self.terms.extend(terms);
        self
    }

    /// Add a term. Returns `false` if it was already present.
    pub fn add_term(&mut self, term: IndexTerm) -> bool {
        self.terms.insert(term)
    }

    pub fn contains(&self, term: &IndexTerm) -> bool {
        self.terms.contains(term)
    }

    /// Values stored under `field`.
    pub fn values(&self, field: IndexableElement) -> impl Iterator<Item = &str> {
        self.terms
            .iter()
            .filter(move |term| term.field == field)
            .map(|term| term.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The same document moved to `path`.
    pub fn relocated(mut self, path: AssetPath) -> Self {
        self.path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_wire_names() {
        for element in IndexableElement::ALL {
            assert_eq!(element.as_str().parse::<IndexableElement>().unwrap(), element);
        }
        assert_eq!(
            "field_type_name".parse::<IndexableElement>().unwrap(),
            IndexableElement::FieldTypeName
        );
        assert!(matches!(
            "SHOE_SIZE".parse::<IndexableElement>(),
            Err(RuledexError::Field(_))
        ));

        let json =
            serde_json::to_string(&IndexableElement::FieldTypeFullyQualifiedClassName).unwrap();
        assert_eq!(json, "\"FIELD_TYPE_FULLY_QUALIFIED_CLASS_NAME\"");
    }

    #[test]
    fn test_term_parse() {
        let term = IndexTerm::parse("TYPE_NAME=org.example.Mortgage").unwrap();
        assert_eq!(term, IndexTerm::type_name("org.example.Mortgage"));
        assert_eq!(term.to_string(), "TYPE_NAME=org.example.Mortgage");

        assert!(IndexTerm::parse("TYPE_NAME").is_err());
        assert!(IndexTerm::parse("TYPE_NAME=  ").is_err());
        assert!(IndexTerm::parse("NOPE=x").is_err());
    }

    #[test]
    fn test_asset_path_normalization() {
        let path = AssetPath::new("mortgages//src/main/./sc1.scgd/").unwrap();
        assert_eq!(path.as_str(), "/mortgages/src/main/sc1.scgd");
        assert_eq!(path.file_name(), Some("sc1.scgd"));
        assert_eq!(path.extension(), Some("scgd"));
        assert_eq!(path.parent().unwrap().as_str(), "/mortgages/src/main");

        assert_eq!(AssetPath::new("/a/b/../c").unwrap().as_str(), "/a/c");
        assert!(AssetPath::new("/../etc").is_err());
        assert!(AssetPath::root().parent().is_none());
        assert_eq!(AssetPath::new("/a").unwrap().parent(), Some(AssetPath::root()));
        assert_eq!(AssetPath::new("/.hidden").unwrap().extension(), None);
    }

    #[test]
    fn test_asset_path_resolve() {
        let dir = AssetPath::new("/pkg").unwrap();
        let file = dir.resolve("rules/r1.rdrl").unwrap();
        assert_eq!(file.as_str(), "/pkg/rules/r1.rdrl");
        assert_eq!(file.resolve_sibling("r2.rdrl").unwrap().as_str(), "/pkg/rules/r2.rdrl");
        assert!(file.starts_with(&dir));
        assert!(!AssetPath::new("/pkgx/a").unwrap().starts_with(&dir));
    }

    #[test]
    fn test_document_terms_are_a_set() {
        let mut doc = IndexDocument::new(AssetPath::new("/a.scgd").unwrap(), "scorecard");
        assert!(doc.add_term(IndexTerm::type_name("a")));
        assert!(!doc.add_term(IndexTerm::type_name("a")));
        doc.add_term(IndexTerm::field_type_name("amount"));

        assert_eq!(doc.len(), 2);
        assert_eq!(
            doc.values(IndexableElement::FieldTypeName).collect::<Vec<_>>(),
            vec!["amount"]
        );
    }

    #[test]
    fn test_path_serde() {
        let path = AssetPath::new("/x/y.test").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"/x/y.test\"");
        let back: AssetPath = serde_json::from_str("\"x//y.test\"").unwrap();
        assert_eq!(back, path);
    }
}
