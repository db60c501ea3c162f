//! Checkout coordination.
//!
//! The coordinator drives the three checkout steps through the modal:
//!
//! 1. `order:open` starts a fresh attempt and shows the payment/address form
//! 2. `order:submit` records it and shows the contacts form
//! 3. `contacts:submit` records contacts and queues the order submission
//!
//! The submission result comes back through [`CheckoutCoordinator::complete_order`].
//! Closing the modal abandons the attempt and discards its draft.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use larek_core::checkout::{CheckoutFlow, CheckoutStep, ContactDetails, OrderConfirmation, OrderDetails};
use larek_core::ShopError;
use larek_events::SubscriptionHandle;
use larek_gateway::GatewayError;
use tracing::{error, info, warn};

use crate::effect::{Effect, EffectQueue};
use crate::events::{topics, ShopBus, ShopEvent};
use crate::form::{contacts_form, order_form, FormView, ValidatedForm};
use crate::modal::{ModalController, Panel, PanelKind};
use crate::store::Store;
use crate::view::SuccessView;

/// What became of a submission result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Confirmation shown to the user.
    Confirmed,
    /// Order accepted after the attempt was abandoned; cart still cleared.
    ConfirmedUnattended,
    /// Failure shown in the contacts form.
    Failed,
    /// Failure for an attempt nobody is looking at any more.
    FailedUnattended,
}

/// Owner of the checkout flow and its forms.
#[derive(Debug)]
pub struct CheckoutCoordinator {
    bus: ShopBus,
    store: Rc<Store>,
    modal: Rc<ModalController>,
    effects: EffectQueue,
    order_form: ValidatedForm,
    contacts_form: ValidatedForm,
    flow: RefCell<Option<CheckoutFlow>>,
    attempts: Cell<u64>,
    handles: RefCell<Vec<SubscriptionHandle>>,
}

impl CheckoutCoordinator {
    /// Create the coordinator and subscribe it to the checkout topics.
    pub fn attach(
        bus: &ShopBus,
        store: Rc<Store>,
        modal: Rc<ModalController>,
        effects: EffectQueue,
        payment_options: &[String],
    ) -> Rc<Self> {
        let coordinator = Rc::new(Self {
            bus: bus.clone(),
            order_form: order_form(bus.clone(), payment_options.iter().cloned()),
            contacts_form: contacts_form(bus.clone()),
            store,
            modal,
            effects,
            flow: RefCell::new(None),
            attempts: Cell::new(0),
            handles: RefCell::new(Vec::new()),
        });

        let modal = Rc::downgrade(&coordinator.modal);
        coordinator
            .order_form
            .set_render_hook(form_renderer(modal.clone(), PanelKind::Order, Panel::Order));
        coordinator
            .contacts_form
            .set_render_hook(form_renderer(modal, PanelKind::Contacts, Panel::Contacts));

        let weak = Rc::downgrade(&coordinator);
        let handle = bus.subscribe(topics::ORDER_OPEN, {
            let weak = weak.clone();
            move |_: &ShopEvent| {
                if let Some(c) = weak.upgrade() {
                    c.start();
                }
            }
        });
        let mut handles = vec![handle];
        handles.push(bus.subscribe(topics::ORDER_SUBMIT, {
            let weak = weak.clone();
            move |event: &ShopEvent| {
                if let (Some(c), ShopEvent::OrderSubmit(details)) = (weak.upgrade(), event) {
                    c.on_order_submit(details.clone());
                }
            }
        }));
        handles.push(bus.subscribe(topics::CONTACTS_SUBMIT, {
            let weak = weak.clone();
            move |event: &ShopEvent| {
                if let (Some(c), ShopEvent::ContactsSubmit(contacts)) = (weak.upgrade(), event) {
                    c.on_contacts_submit(contacts.clone());
                }
            }
        }));
        handles.push(bus.subscribe(topics::MODAL_CLOSED, move |_: &ShopEvent| {
            if let Some(c) = weak.upgrade() {
                c.abandon();
            }
        }));
        *coordinator.handles.borrow_mut() = handles;
        coordinator
    }

    pub fn order_form(&self) -> &ValidatedForm {
        &self.order_form
    }

    pub fn contacts_form(&self) -> &ValidatedForm {
        &self.contacts_form
    }

    /// Current flow, if a checkout is in progress.
    pub fn flow(&self) -> Option<CheckoutFlow> {
        self.flow.borrow().clone()
    }

    pub fn step(&self) -> Option<CheckoutStep> {
        self.flow.borrow().as_ref().map(|f| f.step)
    }

    /// Start a new attempt with an empty draft and show the first form.
    pub fn start(&self) {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        let previous = self.flow.replace(Some(CheckoutFlow::new(attempt)));
        if previous.is_some() {
            info!(attempt, "previous checkout discarded");
        }
        info!(attempt, "checkout started");

        self.order_form.reset();
        self.contacts_form.reset();
        self.modal.show(Panel::Order(self.order_form.view()));
    }

    fn on_order_submit(&self, details: OrderDetails) {
        let recorded = match self.flow.borrow_mut().as_mut() {
            Some(flow) => flow.record_order(details).map(|_| flow.attempt),
            None => {
                warn!("order form submitted without a checkout");
                return;
            }
        };
        match recorded {
            Ok(attempt) => {
                info!(attempt, step = CheckoutStep::Contacts.as_str(), "checkout advanced");
                self.modal.show(Panel::Contacts(self.contacts_form.view()));
            }
            Err(e) => warn!(error = %e, "order form submission ignored"),
        }
    }

    fn on_contacts_submit(&self, contacts: ContactDetails) {
        let items = self.store.cart_ids();
        let total = self.store.cart_total();

        let outcome = {
            let mut flow = self.flow.borrow_mut();
            let Some(flow) = flow.as_mut() else {
                warn!("contacts submitted without a checkout");
                return;
            };
            if flow.is_submitting() {
                warn!(attempt = flow.attempt, "submission already in flight; ignoring");
                return;
            }
            flow.record_contacts(contacts)
                .and_then(|_| flow.begin_submission(items, total))
                .map(|request| (flow.attempt, request))
        };

        match outcome {
            Ok((attempt, request)) => {
                info!(attempt, items = request.items.len(), total, "order queued");
                self.contacts_form.set_error("");
                self.effects.push(Effect::SubmitOrder { attempt, request });
            }
            Err(ShopError::EmptyCart) => {
                warn!("order not sent: cart is empty");
                self.contacts_form.set_error(ShopError::EmptyCart.to_string());
            }
            Err(e) => {
                warn!(error = %e, "order not sent");
                self.contacts_form.set_error(e.to_string());
            }
        }
    }

    /// Apply the result of a submission for `attempt`.
    ///
    /// A confirmed order always clears the cart. The confirmation panel and
    /// error message are only shown if the attempt is still on screen.
    pub fn complete_order(
        &self,
        attempt: u64,
        requested_total: u64,
        result: Result<OrderConfirmation, GatewayError>,
    ) -> CompletionOutcome {
        match result {
            Ok(confirmation) => {
                if !confirmation.matches_total(requested_total) {
                    warn!(
                        order = %confirmation.id,
                        requested = requested_total,
                        charged = confirmation.total,
                        "server total differs from cart total"
                    );
                }
                self.store.clear_cart();

                let active = self.take_if_submitting(attempt, |flow| flow.complete());
                if active {
                    info!(attempt, order = %confirmation.id, "order confirmed");
                    self.modal.set_content(Some(Panel::Success(SuccessView::new(
                        confirmation.id,
                        confirmation.total,
                    ))));
                    CompletionOutcome::Confirmed
                } else {
                    info!(attempt, order = %confirmation.id, "order confirmed after checkout was closed");
                    CompletionOutcome::ConfirmedUnattended
                }
            }
            Err(e) => {
                error!(attempt, error = %e, "order submission failed");
                let active = {
                    let mut flow = self.flow.borrow_mut();
                    match flow.as_mut() {
                        Some(f) if f.attempt == attempt && f.is_submitting() => {
                            f.submission_failed().is_ok()
                        }
                        _ => false,
                    }
                };
                if active {
                    self.contacts_form.set_error(e.to_string());
                    CompletionOutcome::Failed
                } else {
                    CompletionOutcome::FailedUnattended
                }
            }
        }
    }

    /// Close out the flow for `attempt` if it is still submitting.
    fn take_if_submitting<F>(&self, attempt: u64, finish: F) -> bool
    where
        F: FnOnce(&mut CheckoutFlow) -> Result<(), ShopError>,
    {
        let mut slot = self.flow.borrow_mut();
        match slot.as_mut() {
            Some(flow) if flow.attempt == attempt && flow.is_submitting() => {
                if let Err(e) = finish(flow) {
                    warn!(error = %e, "checkout could not complete");
                    return false;
                }
                *slot = None;
                true
            }
            _ => false,
        }
    }

    fn abandon(&self) {
        if let Some(flow) = self.flow.take() {
            info!(attempt = flow.attempt, step = flow.step.as_str(), "checkout abandoned");
        }
    }
}

impl Drop for CheckoutCoordinator {
    fn drop(&mut self) {
        for handle in self.handles.get_mut().drain(..) {
            self.bus.unsubscribe(handle);
        }
    }
}

/// Render hook that refreshes a form panel only while it is displayed.
fn form_renderer(
    modal: Weak<ModalController>,
    kind: PanelKind,
    wrap: fn(FormView) -> Panel,
) -> impl Fn(&FormView) + 'static {
    move |view: &FormView| {
        if let Some(modal) = modal.upgrade() {
            modal.replace_if(|panel| panel.kind() == kind, wrap(view.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larek_core::catalog::CatalogEntry;
    use larek_core::ids::OrderId;

    use crate::form::{ADDRESS_FIELD, EMAIL_FIELD, PAYMENT_GROUP, PHONE_FIELD};

    struct Harness {
        store: Rc<Store>,
        modal: Rc<ModalController>,
        effects: EffectQueue,
        checkout: Rc<CheckoutCoordinator>,
    }

    fn harness() -> Harness {
        let bus = ShopBus::new();
        let store = Rc::new(Store::new(bus.clone()));
        let modal = Rc::new(ModalController::new(bus.clone()));
        let effects = EffectQueue::new();
        let checkout = CheckoutCoordinator::attach(
            &bus,
            Rc::clone(&store),
            Rc::clone(&modal),
            effects.clone(),
            &["card".to_string(), "cash".to_string()],
        );
        store.add_to_cart(&CatalogEntry::new("1", "Pill", "/p.svg", Some(100), "other"));
        Harness {
            store,
            modal,
            effects,
            checkout,
        }
    }

    fn fill_forms(checkout: &CheckoutCoordinator) {
        checkout.order_form().select(PAYMENT_GROUP, "card");
        checkout.order_form().input(ADDRESS_FIELD, "Main St");
        assert!(checkout.order_form().submit());
        checkout.contacts_form().input(EMAIL_FIELD, "a@b.com");
        checkout.contacts_form().input(PHONE_FIELD, "555");
        assert!(checkout.contacts_form().submit());
    }

    fn confirmation(total: u64) -> Result<OrderConfirmation, GatewayError> {
        Ok(OrderConfirmation {
            id: OrderId::new("o1"),
            total,
        })
    }

    #[test]
    fn test_steps_advance_through_modal() {
        let h = harness();
        h.checkout.start();
        assert!(h.modal.is_showing(PanelKind::Order));
        assert_eq!(h.checkout.step(), Some(CheckoutStep::PaymentAddress));

        h.checkout.order_form().select(PAYMENT_GROUP, "cash");
        h.checkout.order_form().input(ADDRESS_FIELD, "Main St");
        h.checkout.order_form().submit();
        assert!(h.modal.is_showing(PanelKind::Contacts));
        assert_eq!(h.checkout.step(), Some(CheckoutStep::Contacts));
    }

    #[test]
    fn test_form_panel_rerenders_on_input() {
        let h = harness();
        h.checkout.start();
        h.checkout.order_form().input(ADDRESS_FIELD, "Main St");

        match h.modal.content() {
            Some(Panel::Order(view)) => {
                assert_eq!(view.values.field(ADDRESS_FIELD), "Main St");
                assert!(!view.submit_enabled);
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[test]
    fn test_contacts_submit_queues_one_order() {
        let h = harness();
        h.checkout.start();
        fill_forms(&h.checkout);

        assert_eq!(h.effects.len(), 1);
        assert_eq!(h.checkout.step(), Some(CheckoutStep::Submitting));

        // A second submit while in flight is ignored.
        h.checkout.contacts_form().submit();
        assert_eq!(h.effects.len(), 1);
    }

    #[test]
    fn test_success_clears_cart_and_shows_total() {
        let h = harness();
        h.checkout.start();
        fill_forms(&h.checkout);

        let outcome = h.checkout.complete_order(1, 100, confirmation(100));
        assert_eq!(outcome, CompletionOutcome::Confirmed);
        assert_eq!(h.store.cart_len(), 0);
        assert!(h.checkout.flow().is_none());
        match h.modal.content() {
            Some(Panel::Success(view)) => assert_eq!(view.total, 100),
            other => panic!("unexpected panel {:?}", other),
        }
    }

    #[test]
    fn test_failure_keeps_draft_for_retry() {
        let h = harness();
        h.checkout.start();
        fill_forms(&h.checkout);

        let outcome = h.checkout.complete_order(
            1,
            100,
            Err(GatewayError::rejected(500, "Server is busy")),
        );
        assert_eq!(outcome, CompletionOutcome::Failed);
        assert_eq!(h.checkout.step(), Some(CheckoutStep::Contacts));
        assert_eq!(h.checkout.contacts_form().error_text(), "Server is busy");
        assert_eq!(h.store.cart_len(), 1);

        let flow = h.checkout.flow().unwrap();
        assert_eq!(flow.draft.address.as_deref(), Some("Main St"));

        h.effects.pop();
        assert!(h.checkout.contacts_form().submit());
        assert_eq!(h.effects.len(), 1);
    }

    #[test]
    fn test_closing_modal_discards_draft() {
        let h = harness();
        h.checkout.start();
        h.checkout.order_form().select(PAYMENT_GROUP, "card");
        h.checkout.order_form().input(ADDRESS_FIELD, "Main St");
        h.checkout.order_form().submit();

        h.modal.close();
        assert!(h.checkout.flow().is_none());

        h.checkout.start();
        assert_eq!(h.checkout.flow().unwrap().attempt, 2);
        assert_eq!(h.checkout.order_form().values().choice(PAYMENT_GROUP), None);
    }

    #[test]
    fn test_late_confirmation_still_clears_cart() {
        let h = harness();
        h.checkout.start();
        fill_forms(&h.checkout);
        h.modal.close();

        let outcome = h.checkout.complete_order(1, 100, confirmation(100));
        assert_eq!(outcome, CompletionOutcome::ConfirmedUnattended);
        assert_eq!(h.store.cart_len(), 0);
        assert!(!h.modal.is_open());
    }

    #[test]
    fn test_empty_cart_blocks_submission() {
        let h = harness();
        h.checkout.start();
        h.store.clear_cart();
        fill_forms(&h.checkout);

        assert!(h.effects.is_empty());
        assert_eq!(h.checkout.contacts_form().error_text(), "cart is empty");
        let flow = h.checkout.flow().unwrap();
        assert_eq!(flow.step, CheckoutStep::Contacts);
        assert_eq!(flow.draft.email.as_deref(), Some("a@b.com"));
    }
}
