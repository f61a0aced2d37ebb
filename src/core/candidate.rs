use crate::core::account::AccountId;
use crate::core::currency::CurrencyCode;
use crate::core::partner::PartnerId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of open document a candidate ledger line belongs to.
///
/// The kind ties a candidate to the direction of money flow: an
/// incoming bank amount can settle customer invoices and vendor
/// refunds, an outgoing one vendor bills and customer refunds.
/// `Payment` marks liquidity lines of registered payments; these are
/// never proposed by invoice-matching rules but can be handed to the
/// executor directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    CustomerInvoice,
    VendorBill,
    CustomerRefund,
    VendorRefund,
    Payment,
}

impl DocumentKind {
    /// Whether a document of this kind can settle a statement amount
    /// with the given sign.
    pub fn settles_amount(&self, amount: Decimal) -> bool {
        if amount >= Decimal::ZERO {
            matches!(self, Self::CustomerInvoice | Self::VendorRefund)
        } else {
            matches!(self, Self::VendorBill | Self::CustomerRefund)
        }
    }
}

/// An open ledger line that a statement line could settle.
///
/// The `residual` is the unpaid portion, signed: positive on
/// receivable lines, negative on payable ones. `currency` is the
/// document currency; `None` means the company currency.
///
/// # Examples
///
/// ```
/// use reconcile_engine::core::account::AccountId;
/// use reconcile_engine::core::candidate::{CandidateLine, DocumentKind};
/// use rust_decimal_macros::dec;
///
/// let inv = CandidateLine::new(
///     "INV/2026/0042",
///     DocumentKind::CustomerInvoice,
///     AccountId::new("121000"),
///     dec!(1210),
/// )
/// .with_reference("INV/2026/0042");
/// assert_eq!(inv.residual(), dec!(1210));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateLine {
    /// Unique identifier for this ledger line.
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    /// Line label as posted.
    label: String,
    /// Document number or vendor reference, when any.
    #[serde(default)]
    reference: Option<String>,
    kind: DocumentKind,
    /// The reconcilable account the line is held on.
    account: AccountId,
    #[serde(default)]
    partner: Option<PartnerId>,
    /// Document currency; `None` means the company currency.
    #[serde(default)]
    currency: Option<CurrencyCode>,
    /// Unsettled portion, signed (positive = receivable).
    residual: Decimal,
}

impl CandidateLine {
    pub fn new(
        label: impl Into<String>,
        kind: DocumentKind,
        account: AccountId,
        residual: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            reference: None,
            kind,
            account,
            partner: None,
            currency: None,
            residual,
        }
    }

    /// Fix the line id (useful for testing / determinism).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_partner(mut self, partner: PartnerId) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = Some(currency);
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn partner(&self) -> Option<&PartnerId> {
        self.partner.as_ref()
    }

    pub fn currency(&self) -> Option<&CurrencyCode> {
        self.currency.as_ref()
    }

    pub fn residual(&self) -> Decimal {
        self.residual
    }

    /// Label shown on a counterpart line: the document reference when
    /// the posted label is the "/" placeholder.
    pub fn display_label(&self) -> &str {
        if self.label == "/" {
            self.reference.as_deref().unwrap_or(&self.label)
        } else {
            &self.label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_settles_amount_sign() {
        assert!(DocumentKind::CustomerInvoice.settles_amount(dec!(100)));
        assert!(DocumentKind::VendorRefund.settles_amount(dec!(100)));
        assert!(!DocumentKind::VendorBill.settles_amount(dec!(100)));

        assert!(DocumentKind::VendorBill.settles_amount(dec!(-100)));
        assert!(DocumentKind::CustomerRefund.settles_amount(dec!(-100)));
        assert!(!DocumentKind::CustomerInvoice.settles_amount(dec!(-100)));

        assert!(!DocumentKind::Payment.settles_amount(dec!(100)));
        assert!(!DocumentKind::Payment.settles_amount(dec!(-100)));
    }

    #[test]
    fn test_display_label_placeholder() {
        let line = CandidateLine::new("/", DocumentKind::CustomerInvoice, AccountId::new("121000"), dec!(50))
            .with_reference("INV/2026/0007");
        assert_eq!(line.display_label(), "INV/2026/0007");

        let named = CandidateLine::new("deposit", DocumentKind::CustomerInvoice, AccountId::new("121000"), dec!(50));
        assert_eq!(named.display_label(), "deposit");
    }
}
