use crate::core::account::AccountId;
use crate::core::journal::JournalId;
use crate::core::partner::{CategoryId, PartnerId};
use crate::core::tax::TaxId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// What a matched rule does with a statement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Journal items are created manually; never evaluated in a batch.
    #[default]
    Manual,
    /// Always matches; suggests a write-off counter-entry.
    WriteOff,
    /// Suggests a match against open invoices/bills.
    Invoices,
}

/// Restriction on the sign of the statement amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountNature {
    Received,
    Paid,
    #[default]
    Both,
}

/// Bound on the statement line's absolute amount, compared at the
/// line currency's decimal precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountCondition {
    Lower(Decimal),
    Greater(Decimal),
    Between(Decimal, Decimal),
}

/// Restriction on the statement line's label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelCondition {
    /// Case-insensitive substring containment.
    Contains(String),
    /// Negation of `Contains`.
    NotContains(String),
    /// Regular expression match.
    MatchRegex(String),
}

/// How a write-off line's amount is derived from the leftover balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOffAmount {
    /// Fixed amount; negative counts as a debit, positive as a credit.
    Fixed(Decimal),
    /// Percentage of the leftover balance.
    Percentage(Decimal),
}

impl Default for WriteOffAmount {
    fn default() -> Self {
        Self::Percentage(dec!(100))
    }
}

/// Template for one generated write-off line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteOffTemplate {
    /// Target account. Without one, no write-off lines are generated.
    #[serde(default)]
    pub account: Option<AccountId>,
    /// Label put on the generated journal line.
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub amount: WriteOffAmount,
    /// Optional tax applied to the line.
    #[serde(default)]
    pub tax: Option<TaxId>,
    /// Treat the tax as price-included even when it is not.
    #[serde(default)]
    pub force_tax_included: bool,
}

impl WriteOffTemplate {
    pub fn new(account: AccountId, label: impl Into<String>) -> Self {
        Self {
            account: Some(account),
            label: label.into(),
            amount: WriteOffAmount::default(),
            tax: None,
            force_tax_included: false,
        }
    }

    pub fn with_amount(mut self, amount: WriteOffAmount) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_tax(mut self, tax: TaxId) -> Self {
        self.tax = Some(tax);
        self
    }
}

fn default_sequence() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_total_amount_param() -> Decimal {
    dec!(100)
}

/// A named, ordered reconciliation rule.
///
/// Rules are evaluated in `(sequence, id)` order. All configured
/// criteria must hold for a rule to claim a statement line; each
/// criterion is independently toggle-able.
///
/// # Examples
///
/// ```
/// use reconcile_engine::rules::model::{LabelCondition, ReconcileModel, RuleType};
///
/// let rule = ReconcileModel::new(1, "Customer wires", RuleType::Invoices)
///     .with_label(LabelCondition::Contains("WIRE".into()));
/// assert_eq!(rule.sequence, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileModel {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_sequence")]
    pub sequence: u32,
    #[serde(default)]
    pub rule_type: RuleType,
    /// Reconcile matched lines automatically instead of suggesting.
    #[serde(default)]
    pub auto_reconcile: bool,

    // --- Conditions ---
    /// Restrict to statement lines of these journals (empty = any).
    #[serde(default)]
    pub match_journals: Vec<JournalId>,
    #[serde(default)]
    pub nature: AmountNature,
    #[serde(default)]
    pub match_amount: Option<AmountCondition>,
    #[serde(default)]
    pub match_label: Option<LabelCondition>,
    /// Restrict to candidates in the statement line's currency.
    #[serde(default = "default_true")]
    pub match_same_currency: bool,
    /// Require candidate residuals to cover the statement amount.
    #[serde(default = "default_true")]
    pub match_total_amount: bool,
    /// Minimum coverage percentage, clamped to 0..=100.
    #[serde(default = "default_total_amount_param")]
    pub match_total_amount_param: Decimal,
    /// Apply only when the statement line has a partner.
    #[serde(default)]
    pub partner_is_set: bool,
    /// Restrict to these statement line partners (empty = any).
    #[serde(default)]
    pub match_partners: Vec<PartnerId>,
    /// Restrict to partners carrying any of these tags (empty = any).
    #[serde(default)]
    pub match_partner_categories: Vec<CategoryId>,

    // --- Write-off ---
    #[serde(default)]
    pub write_off: WriteOffTemplate,
    /// Optional second line absorbing the remaining balance.
    #[serde(default)]
    pub second_write_off: Option<WriteOffTemplate>,
}

impl ReconcileModel {
    pub fn new(id: u32, name: impl Into<String>, rule_type: RuleType) -> Self {
        Self {
            id,
            name: name.into(),
            sequence: default_sequence(),
            rule_type,
            auto_reconcile: false,
            match_journals: Vec::new(),
            nature: AmountNature::Both,
            match_amount: None,
            match_label: None,
            match_same_currency: true,
            match_total_amount: true,
            match_total_amount_param: default_total_amount_param(),
            partner_is_set: false,
            match_partners: Vec::new(),
            match_partner_categories: Vec::new(),
            write_off: WriteOffTemplate::default(),
            second_write_off: None,
        }
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn auto_reconciling(mut self) -> Self {
        self.auto_reconcile = true;
        self
    }

    pub fn with_journals(mut self, journals: Vec<JournalId>) -> Self {
        self.match_journals = journals;
        self
    }

    pub fn with_nature(mut self, nature: AmountNature) -> Self {
        self.nature = nature;
        self
    }

    pub fn with_amount(mut self, condition: AmountCondition) -> Self {
        self.match_amount = Some(condition);
        self
    }

    pub fn with_label(mut self, condition: LabelCondition) -> Self {
        self.match_label = Some(condition);
        self
    }

    /// Set the coverage percentage, clamping to 0..=100.
    pub fn with_total_amount_param(mut self, param: Decimal) -> Self {
        self.match_total_amount_param = param.clamp(Decimal::ZERO, dec!(100));
        self
    }

    pub fn without_total_amount_check(mut self) -> Self {
        self.match_total_amount = false;
        self
    }

    pub fn requiring_partner(mut self) -> Self {
        self.partner_is_set = true;
        self
    }

    pub fn with_partners(mut self, partners: Vec<PartnerId>) -> Self {
        self.match_partners = partners;
        self
    }

    pub fn with_partner_categories(mut self, categories: Vec<CategoryId>) -> Self {
        self.match_partner_categories = categories;
        self
    }

    pub fn with_write_off(mut self, template: WriteOffTemplate) -> Self {
        self.write_off = template;
        self
    }

    pub fn with_second_write_off(mut self, template: WriteOffTemplate) -> Self {
        self.second_write_off = Some(template);
        self
    }

    /// Ordering key for rule evaluation.
    pub fn order_key(&self) -> (u32, u32) {
        (self.sequence, self.id)
    }

    /// Coverage percentage normalized into 0..=100.
    pub fn total_amount_param(&self) -> Decimal {
        self.match_total_amount_param.clamp(Decimal::ZERO, dec!(100))
    }
}
