use crate::core::candidate::CandidateLine;
use crate::core::journal::JournalId;
use crate::core::partner::{CategoryId, PartnerId};
use crate::core::statement::StatementLine;
use crate::matching::context::MatchContext;
use crate::rules::model::{
    AmountCondition, AmountNature, LabelCondition, ReconcileModel,
};
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors arising from rule configuration.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule '{rule}': invalid label regex '{pattern}': {source}")]
    InvalidRegex {
        rule: String,
        pattern: String,
        source: regex::Error,
    },
}

/// Compiled label restriction.
#[derive(Debug, Clone)]
enum LabelMatcher {
    /// Stored lowercased; matched case-insensitively.
    Contains(String),
    NotContains(String),
    Regex(Regex),
}

impl LabelMatcher {
    fn compile(condition: &LabelCondition, rule: &str) -> Result<Self, RuleError> {
        match condition {
            LabelCondition::Contains(s) => Ok(Self::Contains(s.to_lowercase())),
            LabelCondition::NotContains(s) => Ok(Self::NotContains(s.to_lowercase())),
            LabelCondition::MatchRegex(pattern) => {
                let regex = Regex::new(pattern).map_err(|source| RuleError::InvalidRegex {
                    rule: rule.to_string(),
                    pattern: pattern.clone(),
                    source,
                })?;
                Ok(Self::Regex(regex))
            }
        }
    }

    fn matches(&self, label: &str) -> bool {
        match self {
            Self::Contains(needle) => label.to_lowercase().contains(needle),
            Self::NotContains(needle) => !label.to_lowercase().contains(needle),
            Self::Regex(regex) => regex.is_match(label),
        }
    }
}

/// A rule's criteria compiled into an evaluatable predicate.
///
/// Replaces ad-hoc filter composition with a typed builder: every
/// configured criterion becomes a check here, and they compose by
/// logical AND. The label regex is compiled once, at engine
/// construction, so malformed patterns surface as a [`RuleError`]
/// before any line is evaluated.
#[derive(Debug, Clone)]
pub struct RuleFilter {
    journals: Vec<JournalId>,
    nature: AmountNature,
    amount: Option<AmountCondition>,
    label: Option<LabelMatcher>,
    partner_is_set: bool,
    partners: Vec<PartnerId>,
    categories: Vec<CategoryId>,
    same_currency: bool,
}

impl RuleFilter {
    /// Compile a model's criteria. Fails on a malformed label regex.
    pub fn compile(model: &ReconcileModel) -> Result<Self, RuleError> {
        let label = model
            .match_label
            .as_ref()
            .map(|c| LabelMatcher::compile(c, &model.name))
            .transpose()?;
        Ok(Self {
            journals: model.match_journals.clone(),
            nature: model.nature,
            amount: model.match_amount.clone(),
            label,
            partner_is_set: model.partner_is_set,
            partners: model.match_partners.clone(),
            categories: model.match_partner_categories.clone(),
            same_currency: model.match_same_currency,
        })
    }

    /// Evaluate the line-level criteria.
    ///
    /// `partner` is the effective partner of the line (a caller-supplied
    /// override, or the line's own).
    pub fn accepts_line(
        &self,
        line: &StatementLine,
        partner: Option<&PartnerId>,
        ctx: &MatchContext,
    ) -> bool {
        self.journal_ok(line)
            && self.nature_ok(line)
            && self.amount_ok(line, ctx)
            && self.label_ok(line)
            && self.partner_ok(partner, ctx)
    }

    /// Evaluate the candidate-level criteria against a candidate of
    /// the given line.
    pub fn accepts_candidate(
        &self,
        line: &StatementLine,
        candidate: &CandidateLine,
        ctx: &MatchContext,
    ) -> bool {
        if !self.same_currency {
            return true;
        }
        let line_currency = ctx.line_currency(line);
        let candidate_currency = candidate
            .currency()
            .cloned()
            .unwrap_or_else(|| ctx.currencies.company_currency().clone());
        line_currency == candidate_currency
    }

    fn journal_ok(&self, line: &StatementLine) -> bool {
        self.journals.is_empty() || self.journals.contains(line.journal())
    }

    fn nature_ok(&self, line: &StatementLine) -> bool {
        match self.nature {
            AmountNature::Received => line.amount() >= Decimal::ZERO,
            AmountNature::Paid => line.amount() <= Decimal::ZERO,
            AmountNature::Both => true,
        }
    }

    fn amount_ok(&self, line: &StatementLine, ctx: &MatchContext) -> bool {
        let Some(condition) = &self.amount else {
            return true;
        };
        let currency = ctx.line_currency(line);
        let amount = ctx.currencies.round(line.amount().abs(), &currency);
        match condition {
            AmountCondition::Lower(bound) => amount <= *bound,
            AmountCondition::Greater(bound) => amount >= *bound,
            AmountCondition::Between(low, high) => amount >= *low && amount <= *high,
        }
    }

    fn label_ok(&self, line: &StatementLine) -> bool {
        self.label
            .as_ref()
            .map(|m| m.matches(line.label()))
            .unwrap_or(true)
    }

    fn partner_ok(&self, partner: Option<&PartnerId>, ctx: &MatchContext) -> bool {
        if !self.partner_is_set {
            return true;
        }
        let Some(partner) = partner else {
            return false;
        };
        if !self.partners.is_empty() && !self.partners.contains(partner) {
            return false;
        }
        if !self.categories.is_empty() && !ctx.partners.has_any_category(partner, &self.categories)
        {
            return false;
        }
        true
    }
}
