//! Checkout flow state machine.

use crate::checkout::OrderRequest;
use crate::ids::ProductId;
use crate::ShopError;
use serde::{Deserialize, Serialize};

/// Steps in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutStep {
    /// Payment method and delivery address.
    PaymentAddress,
    /// Email and phone.
    Contacts,
    /// Order sent, waiting for the server.
    Submitting,
    /// Order confirmed.
    Complete,
}

impl CheckoutStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::PaymentAddress => "payment_address",
            CheckoutStep::Contacts => "contacts",
            CheckoutStep::Submitting => "submitting",
            CheckoutStep::Complete => "complete",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::PaymentAddress => "Payment & address",
            CheckoutStep::Contacts => "Contacts",
            CheckoutStep::Submitting => "Submitting",
            CheckoutStep::Complete => "Complete",
        }
    }
}

/// Validated output of the payment/address form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub payment_method: String,
    pub address: String,
}

/// Validated output of the contacts form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    pub phone: String,
}

/// Data accumulated across the checkout forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    pub payment_method: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CheckoutDraft {
    /// Merge the payment/address step.
    pub fn merge_order(&mut self, details: OrderDetails) {
        self.payment_method = Some(details.payment_method);
        self.address = Some(details.address);
    }

    /// Merge the contacts step.
    pub fn merge_contacts(&mut self, contacts: ContactDetails) {
        self.email = Some(contacts.email);
        self.phone = Some(contacts.phone);
    }

    /// Names of the fields still unset, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.payment_method.is_none() {
            missing.push("payment method");
        }
        if self.address.is_none() {
            missing.push("address");
        }
        if self.email.is_none() {
            missing.push("email");
        }
        if self.phone.is_none() {
            missing.push("phone");
        }
        missing
    }

    /// Build the wire request from this draft and a cart snapshot.
    pub fn to_request(&self, items: Vec<ProductId>, total: u64) -> Result<OrderRequest, ShopError> {
        if items.is_empty() {
            return Err(ShopError::EmptyCart);
        }
        match (&self.payment_method, &self.address, &self.email, &self.phone) {
            (Some(payment), Some(address), Some(email), Some(phone)) => Ok(OrderRequest {
                payment: payment.clone(),
                email: email.clone(),
                phone: phone.clone(),
                address: address.clone(),
                total,
                items,
            }),
            _ => Err(ShopError::CheckoutIncomplete(self.missing_fields().join(", "))),
        }
    }
}

/// One checkout attempt: the current step plus the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFlow {
    /// Attempt number, distinguishes restarted checkouts.
    pub attempt: u64,
    /// Current step.
    pub step: CheckoutStep,
    /// Accumulated form data.
    pub draft: CheckoutDraft,
}

impl CheckoutFlow {
    /// Start a new checkout at the payment/address step with an empty draft.
    pub fn new(attempt: u64) -> Self {
        Self {
            attempt,
            step: CheckoutStep::PaymentAddress,
            draft: CheckoutDraft::default(),
        }
    }

    /// Check if the draft holds what a step needs.
    pub fn can_advance_to(&self, step: CheckoutStep) -> bool {
        match step {
            CheckoutStep::PaymentAddress => true,
            CheckoutStep::Contacts => {
                self.draft.payment_method.is_some() && self.draft.address.is_some()
            }
            CheckoutStep::Submitting | CheckoutStep::Complete => {
                self.can_advance_to(CheckoutStep::Contacts)
                    && self.draft.email.is_some()
                    && self.draft.phone.is_some()
            }
        }
    }

    /// Record the payment/address step and move to contacts.
    pub fn record_order(&mut self, details: OrderDetails) -> Result<CheckoutStep, ShopError> {
        self.expect_step(CheckoutStep::PaymentAddress, CheckoutStep::Contacts)?;
        self.draft.merge_order(details);
        self.step = CheckoutStep::Contacts;
        Ok(self.step)
    }

    /// Record the contacts step. The flow stays on contacts until submission.
    pub fn record_contacts(&mut self, contacts: ContactDetails) -> Result<(), ShopError> {
        self.expect_step(CheckoutStep::Contacts, CheckoutStep::Submitting)?;
        self.draft.merge_contacts(contacts);
        Ok(())
    }

    /// Build the order request and move to submitting.
    ///
    /// On error the flow stays on contacts and the draft is untouched.
    pub fn begin_submission(
        &mut self,
        items: Vec<ProductId>,
        total: u64,
    ) -> Result<OrderRequest, ShopError> {
        self.expect_step(CheckoutStep::Contacts, CheckoutStep::Submitting)?;
        if !self.can_advance_to(CheckoutStep::Submitting) {
            return Err(ShopError::CheckoutIncomplete(
                self.draft.missing_fields().join(", "),
            ));
        }
        let request = self.draft.to_request(items, total)?;
        self.step = CheckoutStep::Submitting;
        Ok(request)
    }

    /// Return to contacts after a failed submission, keeping the draft.
    pub fn submission_failed(&mut self) -> Result<(), ShopError> {
        self.expect_step(CheckoutStep::Submitting, CheckoutStep::Contacts)?;
        self.step = CheckoutStep::Contacts;
        Ok(())
    }

    /// Mark the order as confirmed.
    pub fn complete(&mut self) -> Result<(), ShopError> {
        self.expect_step(CheckoutStep::Submitting, CheckoutStep::Complete)?;
        self.step = CheckoutStep::Complete;
        Ok(())
    }

    /// Check if checkout is complete.
    pub fn is_complete(&self) -> bool {
        self.step == CheckoutStep::Complete
    }

    /// Check if an order request is in flight.
    pub fn is_submitting(&self) -> bool {
        self.step == CheckoutStep::Submitting
    }

    fn expect_step(&self, expected: CheckoutStep, to: CheckoutStep) -> Result<(), ShopError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(ShopError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_details() -> OrderDetails {
        OrderDetails {
            payment_method: "card".to_string(),
            address: "Main St".to_string(),
        }
    }

    fn contacts() -> ContactDetails {
        ContactDetails {
            email: "a@b.com".to_string(),
            phone: "555".to_string(),
        }
    }

    #[test]
    fn test_checkout_creation() {
        let flow = CheckoutFlow::new(1);
        assert_eq!(flow.step, CheckoutStep::PaymentAddress);
        assert_eq!(flow.draft, CheckoutDraft::default());
    }

    #[test]
    fn test_full_sequence() {
        let mut flow = CheckoutFlow::new(1);
        assert_eq!(flow.record_order(order_details()).unwrap(), CheckoutStep::Contacts);
        flow.record_contacts(contacts()).unwrap();

        let request = flow.begin_submission(vec![ProductId::new("1")], 100).unwrap();
        assert_eq!(request.payment, "card");
        assert_eq!(request.address, "Main St");
        assert_eq!(request.email, "a@b.com");
        assert_eq!(request.total, 100);
        assert!(flow.is_submitting());

        flow.complete().unwrap();
        assert!(flow.is_complete());
    }

    #[test]
    fn test_contacts_before_order_is_rejected() {
        let mut flow = CheckoutFlow::new(1);
        let err = flow.record_contacts(contacts()).unwrap_err();
        assert!(matches!(err, ShopError::InvalidCheckoutTransition { .. }));
        assert_eq!(flow.draft.email, None);
    }

    #[test]
    fn test_empty_cart_keeps_draft_and_step() {
        let mut flow = CheckoutFlow::new(1);
        flow.record_order(order_details()).unwrap();
        flow.record_contacts(contacts()).unwrap();

        let err = flow.begin_submission(Vec::new(), 0).unwrap_err();
        assert_eq!(err, ShopError::EmptyCart);
        assert_eq!(err.to_string(), "cart is empty");
        assert_eq!(flow.step, CheckoutStep::Contacts);
        assert_eq!(flow.draft.phone.as_deref(), Some("555"));
    }

    #[test]
    fn test_failed_submission_returns_to_contacts() {
        let mut flow = CheckoutFlow::new(1);
        flow.record_order(order_details()).unwrap();
        flow.record_contacts(contacts()).unwrap();
        flow.begin_submission(vec![ProductId::new("1")], 100).unwrap();

        flow.submission_failed().unwrap();
        assert_eq!(flow.step, CheckoutStep::Contacts);
        assert!(flow.begin_submission(vec![ProductId::new("1")], 100).is_ok());
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut flow = CheckoutFlow::new(1);
        flow.record_order(order_details()).unwrap();
        flow.record_contacts(contacts()).unwrap();
        flow.begin_submission(vec![ProductId::new("1")], 100).unwrap();
        flow.complete().unwrap();

        assert!(flow.submission_failed().is_err());
        assert!(flow.complete().is_err());
    }

    #[test]
    fn test_incomplete_draft_lists_missing_fields() {
        let draft = CheckoutDraft {
            payment_method: Some("card".to_string()),
            ..Default::default()
        };
        let err = draft.to_request(vec![ProductId::new("1")], 1).unwrap_err();
        assert_eq!(
            err,
            ShopError::CheckoutIncomplete("address, email, phone".to_string())
        );
    }
}
