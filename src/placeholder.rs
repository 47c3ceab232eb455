//! Type tags and the per-run placeholder table.
//!
//! Every parameter type is reduced to a [`TypeTag`]. Scalar tags map to a
//! fixed literal. Composite tags (array, union, object literal) carry the
//! [`Site`] of the type node they came from, and their literal is stored in a
//! [`PlaceholderTable`] under that site while the type is synthesized. The
//! renderer later asks the same table for the literal of each argument.
//!
//! One table belongs to one run. Nothing here is global, so generating
//! several files at once cannot mix registrations.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

/// Literal passed for a missing or unknown argument.
pub const ABSENT: &str = "undefined";

/// Which composite shape a [`Site`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Array,
    Union,
    Object,
}

/// Identity of one composite type occurrence: its kind and source byte span.
///
/// The span keeps `number[][]` apart from its inner `number[]` (same start,
/// different end), and the kind keeps a union apart from a same-span member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Site {
    pub kind: CompositeKind,
    pub start: usize,
    pub end: usize,
}

/// Closed classification of a declared parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Number,
    Boolean,
    String,
    /// A literal type (`'a'`, `42`, `true`, `null`) rendered as written.
    Literal(String),
    Array {
        site: Site,
        element: Box<TypeTag>,
    },
    Union {
        site: Site,
        arms: Vec<TypeTag>,
    },
    Object {
        site: Site,
        fields: Vec<(String, TypeTag)>,
    },
    /// A type referenced by name; resolved through the table's named mappings.
    Named(String),
    Unknown,
}

impl TypeTag {
    pub fn is_union(&self) -> bool {
        matches!(self, Self::Union { .. })
    }

    /// Short human-readable form used in debug dumps.
    pub fn describe(&self) -> String {
        match self {
            Self::Number => "number".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::String => "string".to_string(),
            Self::Literal(text) => text.clone(),
            Self::Array { element, .. } if element.is_union() => {
                format!("({})[]", element.describe())
            }
            Self::Array { element, .. } => format!("{}[]", element.describe()),
            Self::Union { arms, .. } => arms
                .iter()
                .map(TypeTag::describe)
                .collect::<Vec<_>>()
                .join(" | "),
            Self::Object { fields, .. } => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|(name, tag)| format!("{name}: {}", tag.describe()))
                    .collect();
                format!("{{ {} }}", inner.join("; "))
            }
            Self::Named(name) => name.clone(),
            Self::Unknown => "unknown".to_string(),
        }
    }
}

/// Registered literal for a composite site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Value(String),
    /// One literal per union arm, in declaration order.
    Arms(Vec<String>),
}

/// Per-run registry of placeholder literals.
#[derive(Debug, Clone)]
pub struct PlaceholderTable {
    sites: HashMap<Site, Placeholder>,
    named: BTreeMap<String, String>,
}

impl PlaceholderTable {
    /// Fresh table with the built-in named mappings for the given run date.
    pub fn new(today: NaiveDate) -> Self {
        let mut named = BTreeMap::new();
        named.insert("Date".to_string(), date_literal(today));
        Self {
            sites: HashMap::new(),
            named,
        }
    }

    /// Map a named type to a literal, replacing any built-in mapping.
    pub fn map_named(&mut self, name: impl Into<String>, literal: impl Into<String>) {
        self.named.insert(name.into(), literal.into());
    }

    pub fn register(&mut self, site: Site, placeholder: Placeholder) {
        self.sites.insert(site, placeholder);
    }

    /// Number of registered composite sites.
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Base literal for a tag. Unions yield their first arm.
    pub fn placeholder_for(&self, tag: &TypeTag) -> String {
        self.arm(tag, 0)
            .unwrap_or_else(|| self.scalar_or_value(tag))
    }

    /// Literal of union arm `index`, or `None` for non-unions and
    /// out-of-range indices.
    pub fn arm(&self, tag: &TypeTag, index: usize) -> Option<String> {
        let TypeTag::Union { site, .. } = tag else {
            return None;
        };
        match self.sites.get(site) {
            Some(Placeholder::Arms(arms)) => arms.get(index).cloned(),
            _ => None,
        }
    }

    /// Number of union arms registered for `tag` (0 for non-unions).
    pub fn arity(&self, tag: &TypeTag) -> usize {
        let TypeTag::Union { site, .. } = tag else {
            return 0;
        };
        match self.sites.get(site) {
            Some(Placeholder::Arms(arms)) => arms.len(),
            _ => 0,
        }
    }

    fn scalar_or_value(&self, tag: &TypeTag) -> String {
        match tag {
            TypeTag::Number => "1".to_string(),
            TypeTag::Boolean => "true".to_string(),
            TypeTag::String => "\"string\"".to_string(),
            TypeTag::Literal(text) => text.clone(),
            TypeTag::Named(name) => self
                .named
                .get(name)
                .cloned()
                .unwrap_or_else(|| ABSENT.to_string()),
            TypeTag::Unknown => ABSENT.to_string(),
            TypeTag::Array { site, .. }
            | TypeTag::Union { site, .. }
            | TypeTag::Object { site, .. } => match self.sites.get(site) {
                Some(Placeholder::Value(v)) => v.clone(),
                Some(Placeholder::Arms(arms)) => arms
                    .first()
                    .cloned()
                    .unwrap_or_else(|| ABSENT.to_string()),
                None => ABSENT.to_string(),
            },
        }
    }
}

/// `Date.prototype.toDateString()` form: `"Fri Oct 16 2026"`.
fn date_literal(day: NaiveDate) -> String {
    format!("\"{}\"", day.format("%a %b %d %Y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PlaceholderTable {
        PlaceholderTable::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    fn site(kind: CompositeKind, start: usize, end: usize) -> Site {
        Site { kind, start, end }
    }

    #[test]
    fn scalars_have_fixed_literals() {
        let t = table();
        assert_eq!(t.placeholder_for(&TypeTag::Number), "1");
        assert_eq!(t.placeholder_for(&TypeTag::Boolean), "true");
        assert_eq!(t.placeholder_for(&TypeTag::String), "\"string\"");
        assert_eq!(t.placeholder_for(&TypeTag::Unknown), "undefined");
        assert_eq!(t.placeholder_for(&TypeTag::Literal("'a'".into())), "'a'");
    }

    #[test]
    fn date_is_mapped_to_run_date() {
        let t = table();
        assert_eq!(
            t.placeholder_for(&TypeTag::Named("Date".into())),
            "\"Fri Oct 16 2026\""
        );
    }

    #[test]
    fn unmapped_named_type_is_absent() {
        let t = table();
        assert_eq!(t.placeholder_for(&TypeTag::Named("User".into())), "undefined");
    }

    #[test]
    fn caller_mapping_overrides_named_type() {
        let mut t = table();
        t.map_named("User", "{ id: 1 }");
        assert_eq!(t.placeholder_for(&TypeTag::Named("User".into())), "{ id: 1 }");
    }

    #[test]
    fn union_arms_are_addressable_by_index() {
        let mut t = table();
        let s = site(CompositeKind::Union, 10, 25);
        t.register(s, Placeholder::Arms(vec!["1".into(), "\"string\"".into()]));
        let tag = TypeTag::Union {
            site: s,
            arms: vec![TypeTag::Number, TypeTag::String],
        };

        assert_eq!(t.arity(&tag), 2);
        assert_eq!(t.placeholder_for(&tag), "1");
        assert_eq!(t.arm(&tag, 1).as_deref(), Some("\"string\""));
        assert_eq!(t.arm(&tag, 2), None);
    }

    #[test]
    fn sites_with_same_start_do_not_collide() {
        let mut t = table();
        let outer = site(CompositeKind::Array, 0, 10);
        let inner = site(CompositeKind::Array, 0, 8);
        t.register(outer, Placeholder::Value("[[1]]".into()));
        t.register(inner, Placeholder::Value("[1]".into()));
        assert_eq!(t.site_count(), 2);
        let tag = TypeTag::Array {
            site: outer,
            element: Box::new(TypeTag::Number),
        };
        assert_eq!(t.placeholder_for(&tag), "[[1]]");
    }

    #[test]
    fn unregistered_composite_falls_back_to_absent() {
        let t = table();
        let tag = TypeTag::Array {
            site: site(CompositeKind::Array, 3, 11),
            element: Box::new(TypeTag::Number),
        };
        assert_eq!(t.placeholder_for(&tag), "undefined");
        assert_eq!(t.site_count(), 0);
    }

    #[test]
    fn describe_renders_nested_shapes() {
        let tag = TypeTag::Array {
            site: site(CompositeKind::Array, 0, 17),
            element: Box::new(TypeTag::Union {
                site: site(CompositeKind::Union, 1, 15),
                arms: vec![TypeTag::Number, TypeTag::String],
            }),
        };
        assert_eq!(tag.describe(), "(number | string)[]");
    }
}
