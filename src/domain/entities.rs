//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Identifier of a persisted network node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a persisted product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Total digits a debt may carry, the two decimal places included.
pub const DEBT_MAX_DIGITS: u32 = 12;

/// Debt towards the supplier, in cents. Never negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Debt {
    cents: u64,
}

impl Debt {
    pub const ZERO: Debt = Debt { cents: 0 };

    pub fn from_cents(cents: u64) -> Result<Self, DomainError> {
        if cents >= 10u64.pow(DEBT_MAX_DIGITS) {
            return Err(DomainError::invalid_field(
                "debt",
                format!("must have at most {} digits", DEBT_MAX_DIGITS),
            ));
        }
        Ok(Self { cents })
    }

    pub fn cents(self) -> u64 {
        self.cents
    }

    pub fn is_zero(self) -> bool {
        self.cents == 0
    }
}

impl fmt::Display for Debt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl FromStr for Debt {
    type Err = DomainError;

    /// Parse `"1500"`, `"1500.5"` or `"1500.50"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |message: &str| DomainError::invalid_field("debt", message);

        if s.starts_with('-') {
            return Err(invalid("must not be negative"));
        }
        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("not a valid amount"));
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("at most 2 decimal places allowed"));
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() as u32 > DEBT_MAX_DIGITS - 2 {
            return Err(invalid("too many digits"));
        }
        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("not a valid amount"))?
        };
        let fraction: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid("not a valid amount"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("not a valid amount"))?,
        };

        Self::from_cents(whole * 100 + fraction)
    }
}

impl TryFrom<String> for Debt {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Debt> for String {
    fn from(debt: Debt) -> Self {
        debt.to_string()
    }
}

/// Readable name of a hierarchy level.
pub fn level_name(level: usize) -> String {
    match level {
        0 => "Factory".to_string(),
        1 => "Retail chain".to_string(),
        2 => "Sole proprietor".to_string(),
        n => format!("Level {n}"),
    }
}

/// A member of the supplier network: factory, retail chain or sole proprietor.
///
/// The level is never stored; it is derived from the supplier chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub email: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    /// Single supplier; a lookup key only, the supplier does not own this node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<NodeId>,
    #[serde(default)]
    pub debt: Debt,
    pub created_at: DateTime<Utc>,
}

impl Node {
    pub fn from_draft(id: NodeId, draft: NodeDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            country: draft.country,
            city: draft.city,
            street: draft.street,
            house_number: draft.house_number,
            supplier: draft.supplier,
            debt: draft.debt,
            created_at,
        }
    }

    /// Check the descriptive attributes. Hierarchy rules are checked separately.
    pub fn validate_fields(&self) -> Result<(), DomainError> {
        check_length("name", &self.name, 2, 255)?;
        check_email(&self.email)?;
        check_length("country", &self.country, 1, 100)?;
        check_length("city", &self.city, 1, 100)?;
        check_length("street", &self.street, 1, 120)?;
        check_length("house_number", &self.house_number, 1, 30)?;
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.city)
    }
}

/// A node that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeDraft {
    pub name: String,
    pub email: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    pub supplier: Option<NodeId>,
    pub debt: Debt,
}

/// Partial update of a node.
///
/// Debt is deliberately absent: it only changes on create or through
/// the clear-debt action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    /// `Some(None)` detaches the node from its supplier
    pub supplier: Option<Option<NodeId>>,
}

impl NodePatch {
    pub fn apply(&self, node: &Node) -> Node {
        let mut updated = node.clone();
        if let Some(name) = &self.name {
            updated.name = name.clone();
        }
        if let Some(email) = &self.email {
            updated.email = email.clone();
        }
        if let Some(country) = &self.country {
            updated.country = country.clone();
        }
        if let Some(city) = &self.city {
            updated.city = city.clone();
        }
        if let Some(street) = &self.street {
            updated.street = street.clone();
        }
        if let Some(house_number) = &self.house_number {
            updated.house_number = house_number.clone();
        }
        if let Some(supplier) = self.supplier {
            updated.supplier = supplier;
        }
        updated
    }
}

/// A product owned by exactly one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub owner: NodeId,
    pub title: String,
    pub model: String,
    pub release_date: NaiveDate,
}

impl Product {
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            owner: draft.owner,
            title: draft.title,
            model: draft.model,
            release_date: draft.release_date,
        }
    }

    pub fn validate_fields(&self) -> Result<(), DomainError> {
        check_length("title", &self.title, 1, 255)?;
        check_length("model", &self.model, 1, 120)?;
        Ok(())
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.title, self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub owner: NodeId,
    pub title: String,
    pub model: String,
    pub release_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub owner: Option<NodeId>,
    pub title: Option<String>,
    pub model: Option<String>,
    pub release_date: Option<NaiveDate>,
}

impl ProductPatch {
    pub fn apply(&self, product: &Product) -> Product {
        let mut updated = product.clone();
        if let Some(owner) = self.owner {
            updated.owner = owner;
        }
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(model) = &self.model {
            updated.model = model.clone();
        }
        if let Some(release_date) = self.release_date {
            updated.release_date = release_date;
        }
        updated
    }
}

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), DomainError> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(DomainError::invalid_field(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    if len > max {
        return Err(DomainError::invalid_field(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), DomainError> {
    if !EMAIL_REGEX.is_match(email.trim()) {
        return Err(DomainError::invalid_field("email", "not a valid email address"));
    }
    check_length("email", email, 3, 254)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_node() -> Node {
        Node {
            id: NodeId(1),
            name: "Test Factory".to_string(),
            email: "factory@test.com".to_string(),
            country: "Test Country".to_string(),
            city: "Test City".to_string(),
            street: "Test Street".to_string(),
            house_number: "123".to_string(),
            supplier: None,
            debt: Debt::ZERO,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("0", 0)]
    #[case("1500", 150_000)]
    #[case("1500.5", 150_050)]
    #[case("1500.05", 150_005)]
    #[case(" 12.34 ", 1_234)]
    #[case("0009999999999.99", 999_999_999_999)]
    fn given_valid_amount_when_parsing_debt_then_stores_cents(
        #[case] input: &str,
        #[case] cents: u64,
    ) {
        let debt: Debt = input.parse().unwrap();
        assert_eq!(debt.cents(), cents);
    }

    #[rstest]
    #[case("-1")]
    #[case("")]
    #[case("abc")]
    #[case("1.234")]
    #[case(".5")]
    #[case("10000000000")]
    fn given_invalid_amount_when_parsing_debt_then_fails(#[case] input: &str) {
        let result: Result<Debt, _> = input.parse();
        assert!(
            matches!(result, Err(DomainError::InvalidField { field: "debt", .. })),
            "{input:?} should be rejected"
        );
    }

    #[test]
    fn given_debt_when_displayed_then_has_two_decimals() {
        assert_eq!(Debt::from_cents(50_000).unwrap().to_string(), "500.00");
        assert_eq!(Debt::from_cents(7).unwrap().to_string(), "0.07");
    }

    #[rstest]
    #[case(0, "Factory")]
    #[case(1, "Retail chain")]
    #[case(2, "Sole proprietor")]
    #[case(5, "Level 5")]
    fn given_level_when_naming_then_returns_readable_name(
        #[case] level: usize,
        #[case] name: &str,
    ) {
        assert_eq!(level_name(level), name);
    }

    #[test]
    fn given_valid_node_when_validating_fields_then_ok() {
        assert!(sample_node().validate_fields().is_ok());
    }

    #[test]
    fn given_short_name_when_validating_fields_then_rejects_name() {
        let mut node = sample_node();
        node.name = "X".to_string();
        let err = node.validate_fields().unwrap_err();
        assert!(matches!(err, DomainError::InvalidField { field: "name", .. }));
    }

    #[test]
    fn given_bad_email_when_validating_fields_then_rejects_email() {
        let mut node = sample_node();
        node.email = "not-an-email".to_string();
        let err = node.validate_fields().unwrap_err();
        assert!(matches!(err, DomainError::InvalidField { field: "email", .. }));
    }

    #[test]
    fn given_patch_when_applied_then_only_set_fields_change() {
        let node = sample_node();
        let patch = NodePatch {
            city: Some("Other City".to_string()),
            supplier: Some(Some(NodeId(7))),
            ..Default::default()
        };

        let updated = patch.apply(&node);

        assert_eq!(updated.city, "Other City");
        assert_eq!(updated.supplier, Some(NodeId(7)));
        assert_eq!(updated.name, node.name);
        assert_eq!(updated.debt, node.debt);
    }

    #[test]
    fn given_node_when_displayed_then_shows_name_and_city() {
        assert_eq!(sample_node().to_string(), "Test Factory (Test City)");
    }
}
