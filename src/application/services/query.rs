//! Filtering and ordering of listings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::{DomainError, Node, NodeId};

/// Field a listing can be ordered by.
pub trait SortKey: Sized + Copy {
    fn parse(name: &str) -> Option<Self>;
    fn name(self) -> &'static str;
    fn allowed() -> &'static str;
}

/// Sort key with direction; parses `"name"` and `"-name"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder<K> {
    pub key: K,
    pub descending: bool,
}

impl<K> SortOrder<K> {
    pub fn asc(key: K) -> Self {
        Self {
            key,
            descending: false,
        }
    }

    pub fn desc(key: K) -> Self {
        Self {
            key,
            descending: true,
        }
    }

    /// Apply the direction to an ascending comparison.
    pub fn directed(&self, ordering: Ordering) -> Ordering {
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl<K: SortKey> FromStr for SortOrder<K> {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (descending, name) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let key = K::parse(name).ok_or_else(|| {
            DomainError::invalid_field(
                "ordering",
                format!("unknown field '{}', expected one of: {}", name, K::allowed()),
            )
        })?;
        Ok(Self { key, descending })
    }
}

impl<K: SortKey> fmt::Display for SortOrder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-")?;
        }
        write!(f, "{}", self.key.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSortKey {
    Name,
    City,
    Country,
    CreatedAt,
}

impl SortKey for NodeSortKey {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "city" => Some(Self::City),
            "country" => Some(Self::Country),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::City => "city",
            Self::Country => "country",
            Self::CreatedAt => "created_at",
        }
    }

    fn allowed() -> &'static str {
        "name, city, country, created_at"
    }
}

impl NodeSortKey {
    pub fn compare(self, a: &Node, b: &Node) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::City => a.city.cmp(&b.city),
            Self::Country => a.country.cmp(&b.country),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortKey {
    ReleaseDate,
    Title,
}

impl SortKey for ProductSortKey {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "release_date" => Some(Self::ReleaseDate),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::ReleaseDate => "release_date",
            Self::Title => "title",
        }
    }

    fn allowed() -> &'static str {
        "release_date, title"
    }
}

/// Node listing filters. Empty query lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeQuery {
    /// Case-insensitive substring of the country
    pub country: Option<String>,
    /// Exact city
    pub city: Option<String>,
    /// Case-insensitive substring of name, city, country or email
    pub search: Option<String>,
    /// Default: country, city, name
    pub ordering: Option<SortOrder<NodeSortKey>>,
}

impl NodeQuery {
    pub fn matches(&self, node: &Node) -> bool {
        if let Some(country) = &self.country {
            if !contains_ignore_case(&node.country, country) {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if node.city != *city {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let fields = [&node.name, &node.city, &node.country, &node.email];
            if !fields.iter().any(|f| contains_ignore_case(f, term)) {
                return false;
            }
        }
        true
    }

    pub fn compare(&self, a: &Node, b: &Node) -> Ordering {
        match self.ordering {
            Some(order) => order
                .directed(order.key.compare(a, b))
                .then_with(|| a.id.cmp(&b.id)),
            None => a
                .country
                .cmp(&b.country)
                .then_with(|| a.city.cmp(&b.city))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id)),
        }
    }
}

/// Product listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub owner: Option<NodeId>,
    /// Case-insensitive substring of title, model, owner name or owner city
    pub search: Option<String>,
    /// Default: newest release first, then title
    pub ordering: Option<SortOrder<ProductSortKey>>,
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("name", NodeSortKey::Name, false)]
    #[case("-created_at", NodeSortKey::CreatedAt, true)]
    #[case(" country ", NodeSortKey::Country, false)]
    fn given_ordering_text_when_parsing_then_key_and_direction(
        #[case] input: &str,
        #[case] key: NodeSortKey,
        #[case] descending: bool,
    ) {
        let order: SortOrder<NodeSortKey> = input.parse().unwrap();
        assert_eq!(order, SortOrder { key, descending });
    }

    #[test]
    fn given_unknown_field_when_parsing_ordering_then_rejected() {
        let result: Result<SortOrder<NodeSortKey>, _> = "debt".parse();
        assert!(matches!(
            result,
            Err(DomainError::InvalidField {
                field: "ordering",
                ..
            })
        ));
    }

    #[test]
    fn given_ordering_when_displayed_then_round_trips_text() {
        let order = SortOrder::desc(ProductSortKey::ReleaseDate);
        assert_eq!(order.to_string(), "-release_date");
    }

    #[test]
    fn contains_ignore_case_matches_mixed_case() {
        assert!(contains_ignore_case("Test Country", "test c"));
        assert!(!contains_ignore_case("Test Country", "land"));
    }
}
