//! Import declarations and simple-name type resolution.

use serde::{Deserialize, Serialize};

/// A single imported type, e.g. `org.example.Applicant`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Import {
    pub type_name: String,
}

impl Import {
    pub fn new<S: Into<String>>(type_name: S) -> Self {
        Import {
            type_name: type_name.into(),
        }
    }

    /// The part after the last `.`.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.type_name)
    }
}

/// The ordered imports of an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Imports {
    imports: Vec<Import>,
}

impl Imports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an import unless it is already present.
    pub fn add<S: Into<String>>(&mut self, type_name: S) {
        let import = Import::new(type_name);
        if !self.imports.contains(&import) {
            self.imports.push(import);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter()
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// The imported fully-qualified name whose simple name is `simple`.
    pub fn resolve(&self, simple: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|import| import.simple_name() == simple)
            .map(|import| import.type_name.as_str())
    }

    /// Fully qualify a type name as written in an asset.
    ///
    /// Dotted names are taken as already qualified. Simple names resolve
    /// through the imports first, then into `package_name`.
    pub fn resolve_type(&self, name: &str, package_name: &str) -> String {
        let name = name.trim();
        if name.contains('.') {
            return name.to_string();
        }
        if let Some(resolved) = self.resolve(name) {
            return resolved.to_string();
        }
        if package_name.is_empty() {
            name.to_string()
        } else {
            format!("{package_name}.{name}")
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Imports {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut imports = Imports::new();
        for type_name in iter {
            imports.add(type_name);
        }
        imports
    }
}

/// The part of a dotted name after the last `.`.
pub fn simple_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_type() {
        let imports: Imports = ["org.example.Applicant", "org.example.Mortgage"]
            .into_iter()
            .collect();

        assert_eq!(imports.resolve("Mortgage"), Some("org.example.Mortgage"));
        assert_eq!(imports.resolve("Bank"), None);

        assert_eq!(
            imports.resolve_type("Applicant", "com.acme"),
            "org.example.Applicant"
        );
        assert_eq!(imports.resolve_type("Bank", "com.acme"), "com.acme.Bank");
        assert_eq!(imports.resolve_type("Bank", ""), "Bank");
        assert_eq!(
            imports.resolve_type("java.lang.Integer", "com.acme"),
            "java.lang.Integer"
        );
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let mut imports = Imports::new();
        imports.add("a.B");
        imports.add("a.B");
        assert_eq!(imports.len(), 1);
        assert_eq!(simple_name("a.B"), "B");
        assert_eq!(simple_name("B"), "B");
    }

    #[test]
    fn test_serde_is_a_plain_list() {
        let imports: Imports = ["x.Y"].into_iter().collect();
        assert_eq!(serde_json::to_string(&imports).unwrap(), "[\"x.Y\"]");
    }
}
