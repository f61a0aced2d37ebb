use crate::core::account::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a partner (counterparty) on a transaction.
///
/// A partner can be a customer, a vendor, or both. Statement lines and
/// open ledger lines reference partners by id; the [`PartnerBook`]
/// resolves them to full records when the engine needs category tags
/// or receivable/payable accounts.
///
/// # Examples
///
/// ```
/// use reconcile_engine::core::partner::PartnerId;
///
/// let acme = PartnerId::new("ACME");
/// let globex = PartnerId::new("GLOBEX");
/// assert_ne!(acme, globex);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(String);

impl PartnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartnerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a partner category tag (e.g. "WHOLESALE", "EU").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A counterparty record.
///
/// Carries the category tags used by rule criteria and the
/// receivable/payable accounts any open-balance line is attributed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    pub receivable_account: AccountId,
    pub payable_account: AccountId,
}

impl Partner {
    pub fn new(
        id: PartnerId,
        name: impl Into<String>,
        receivable_account: AccountId,
        payable_account: AccountId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            categories: Vec::new(),
            receivable_account,
            payable_account,
        }
    }

    pub fn with_categories(mut self, categories: Vec<CategoryId>) -> Self {
        self.categories = categories;
        self
    }

    pub fn has_category(&self, category: &CategoryId) -> bool {
        self.categories.contains(category)
    }
}

/// Registry of known partners, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnerBook {
    partners: HashMap<PartnerId, Partner>,
}

impl PartnerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, partner: Partner) {
        self.partners.insert(partner.id.clone(), partner);
    }

    pub fn get(&self, id: &PartnerId) -> Option<&Partner> {
        self.partners.get(id)
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Whether the partner carries at least one of the given category tags.
    /// Unknown partners carry no tags.
    pub fn has_any_category(&self, id: &PartnerId, categories: &[CategoryId]) -> bool {
        self.get(id)
            .map(|p| categories.iter().any(|c| p.has_category(c)))
            .unwrap_or(false)
    }
}

impl FromIterator<Partner> for PartnerBook {
    fn from_iter<T: IntoIterator<Item = Partner>>(iter: T) -> Self {
        let mut book = Self::new();
        for partner in iter {
            book.insert(partner);
        }
        book
    }
}
