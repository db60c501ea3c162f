//! Validated forms.
//!
//! There is one form engine, [`ValidatedForm`]. Each checkout step plugs in
//! its own validation policy and payload builder:
//!
//! - [`validate_order`] / [`order_form`]: payment method and address
//! - [`validate_contacts`] / [`contacts_form`]: email and phone
//!
//! Every input, blur or selection runs a validation pass. The submit
//! control is enabled only while the last pass was valid, and the single
//! error area shows the errors of the last pass joined together.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use larek_core::checkout::{ContactDetails, OrderDetails};
use serde::Serialize;
use tracing::{debug, warn};

use crate::events::{ShopBus, ShopEvent};

pub const PAYMENT_GROUP: &str = "payment";
pub const ADDRESS_FIELD: &str = "address";
pub const EMAIL_FIELD: &str = "email";
pub const PHONE_FIELD: &str = "phone";

/// Separator between errors in the aggregated error area.
pub const ERROR_SEPARATOR: &str = "; ";

/// Current field values and choice selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormValues {
    fields: BTreeMap<String, String>,
    choices: BTreeMap<String, String>,
}

impl FormValues {
    /// Raw value of a field; empty if never set.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    /// Field value with surrounding whitespace removed.
    pub fn trimmed(&self, name: &str) -> &str {
        self.field(name).trim()
    }

    /// Selected option of a choice group.
    pub fn choice(&self, group: &str) -> Option<&str> {
        self.choices.get(group).map(String::as_str)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Select an option, replacing any previous selection in the group.
    pub fn select(&mut self, group: impl Into<String>, option: impl Into<String>) {
        self.choices.insert(group.into(), option.into());
    }
}

/// Result of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl FormState {
    /// Build a state from the collected errors; valid iff there are none.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Errors joined for the single error area.
    pub fn error_text(&self) -> String {
        self.errors.join(ERROR_SEPARATOR)
    }
}

/// Lifecycle of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormPhase {
    /// Nothing entered yet.
    Pristine,
    /// A validation pass is running.
    Validating,
    Valid,
    Invalid,
}

impl FormPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormPhase::Pristine => "pristine",
            FormPhase::Validating => "validating",
            FormPhase::Valid => "valid",
            FormPhase::Invalid => "invalid",
        }
    }
}

/// An exclusive choice group and its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceGroup {
    pub name: String,
    pub options: Vec<String>,
}

/// Snapshot of a form for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub name: String,
    pub phase: FormPhase,
    pub values: FormValues,
    pub choice_groups: Vec<ChoiceGroup>,
    pub submit_enabled: bool,
    /// Aggregated error area.
    pub error_text: String,
}

impl FormView {
    /// Check if an option is the active one in its group.
    pub fn is_selected(&self, group: &str, option: &str) -> bool {
        self.values.choice(group) == Some(option)
    }
}

type ValidationPolicy = Rc<dyn Fn(&FormValues) -> FormState>;
type PayloadBuilder = Rc<dyn Fn(&FormValues) -> ShopEvent>;
type RenderHook = Rc<dyn Fn(&FormView)>;

#[derive(Debug)]
struct FormInner {
    phase: FormPhase,
    values: FormValues,
    state: FormState,
    error_text: String,
}

impl FormInner {
    fn pristine() -> Self {
        Self {
            phase: FormPhase::Pristine,
            values: FormValues::default(),
            state: FormState::default(),
            error_text: String::new(),
        }
    }
}

/// Form engine parameterised by a validation policy and a payload builder.
pub struct ValidatedForm {
    name: String,
    bus: ShopBus,
    validate: ValidationPolicy,
    build: PayloadBuilder,
    choice_groups: Vec<ChoiceGroup>,
    inner: RefCell<FormInner>,
    on_render: RefCell<Option<RenderHook>>,
}

impl std::fmt::Debug for ValidatedForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedForm")
            .field("name", &self.name)
            .field("inner", &self.inner)
            .finish()
    }
}

impl ValidatedForm {
    /// Create a form that publishes `build(values)` on a valid submit.
    pub fn new<V, B>(name: impl Into<String>, bus: ShopBus, validate: V, build: B) -> Self
    where
        V: Fn(&FormValues) -> FormState + 'static,
        B: Fn(&FormValues) -> ShopEvent + 'static,
    {
        Self {
            name: name.into(),
            bus,
            validate: Rc::new(validate),
            build: Rc::new(build),
            choice_groups: Vec::new(),
            inner: RefCell::new(FormInner::pristine()),
            on_render: RefCell::new(None),
        }
    }

    /// Declare an exclusive choice group.
    pub fn with_choice_group<I, S>(mut self, name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choice_groups.push(ChoiceGroup {
            name: name.into(),
            options: options.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Install the hook called with a fresh view after every pass.
    pub fn set_render_hook<F>(&self, hook: F)
    where
        F: Fn(&FormView) + 'static,
    {
        *self.on_render.borrow_mut() = Some(Rc::new(hook));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> FormPhase {
        self.inner.borrow().phase
    }

    pub fn values(&self) -> FormValues {
        self.inner.borrow().values.clone()
    }

    /// Result of the last validation pass.
    pub fn state(&self) -> FormState {
        self.inner.borrow().state.clone()
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.phase() == FormPhase::Valid
    }

    pub fn error_text(&self) -> String {
        self.inner.borrow().error_text.clone()
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> FormView {
        let inner = self.inner.borrow();
        FormView {
            name: self.name.clone(),
            phase: inner.phase,
            values: inner.values.clone(),
            choice_groups: self.choice_groups.clone(),
            submit_enabled: inner.phase == FormPhase::Valid,
            error_text: inner.error_text.clone(),
        }
    }

    /// Text typed into a field.
    pub fn input(&self, field: &str, value: &str) {
        self.inner.borrow_mut().values.set_field(field, value);
        self.run_validation();
    }

    /// Field lost focus.
    pub fn blur(&self, _field: &str) {
        self.run_validation();
    }

    /// Choose an option in a choice group; siblings are deselected.
    ///
    /// Returns `false` for an unknown group or option.
    pub fn select(&self, group: &str, option: &str) -> bool {
        let known = self
            .choice_groups
            .iter()
            .any(|g| g.name == group && g.options.iter().any(|o| o == option));
        if !known {
            warn!(form = %self.name, group, option, "unknown choice");
            return false;
        }
        self.inner.borrow_mut().values.select(group, option);
        self.run_validation();
        true
    }

    /// Re-validate and publish the payload if valid.
    ///
    /// Returns whether anything was published.
    pub fn submit(&self) -> bool {
        let state = self.run_validation();
        if !state.valid {
            debug!(form = %self.name, errors = state.errors.len(), "submit blocked");
            return false;
        }
        let values = self.values();
        let event = (self.build)(&values);
        debug!(form = %self.name, "submitting");
        self.bus.publish(event);
        true
    }

    /// Show an externally produced error in the error area.
    ///
    /// The phase and submit control are left as they are.
    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.borrow_mut().error_text = message.into();
        self.render();
    }

    /// Forget all values and return to pristine.
    pub fn reset(&self) {
        *self.inner.borrow_mut() = FormInner::pristine();
        self.render();
    }

    fn run_validation(&self) -> FormState {
        self.inner.borrow_mut().phase = FormPhase::Validating;
        let values = self.values();
        let state = (self.validate)(&values);
        {
            let mut inner = self.inner.borrow_mut();
            inner.phase = if state.valid {
                FormPhase::Valid
            } else {
                FormPhase::Invalid
            };
            inner.error_text = state.error_text();
            inner.state = state.clone();
        }
        self.render();
        state
    }

    fn render(&self) {
        let hook = self.on_render.borrow().clone();
        if let Some(hook) = hook {
            hook(&self.view());
        }
    }
}

/// Payment/address policy: a payment option and a non-blank address.
pub fn validate_order(values: &FormValues) -> FormState {
    let mut errors = Vec::new();
    if values.choice(PAYMENT_GROUP).is_none() {
        errors.push("Select a payment method".to_string());
    }
    if values.trimmed(ADDRESS_FIELD).is_empty() {
        errors.push("Enter a delivery address".to_string());
    }
    FormState::from_errors(errors)
}

/// Contacts policy: non-blank email and phone. Formats are not checked.
pub fn validate_contacts(values: &FormValues) -> FormState {
    let mut errors = Vec::new();
    if values.trimmed(EMAIL_FIELD).is_empty() {
        errors.push("Enter an email".to_string());
    }
    if values.trimmed(PHONE_FIELD).is_empty() {
        errors.push("Enter a phone number".to_string());
    }
    FormState::from_errors(errors)
}

/// Payment/address form publishing `order:submit`.
pub fn order_form<I, S>(bus: ShopBus, payment_options: I) -> ValidatedForm
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ValidatedForm::new("order", bus, validate_order, |values: &FormValues| {
        ShopEvent::OrderSubmit(OrderDetails {
            payment_method: values.choice(PAYMENT_GROUP).unwrap_or_default().to_string(),
            address: values.trimmed(ADDRESS_FIELD).to_string(),
        })
    })
    .with_choice_group(PAYMENT_GROUP, payment_options)
}

/// Contacts form publishing `contacts:submit`.
pub fn contacts_form(bus: ShopBus) -> ValidatedForm {
    ValidatedForm::new("contacts", bus, validate_contacts, |values: &FormValues| {
        ShopEvent::ContactsSubmit(ContactDetails {
            email: values.trimmed(EMAIL_FIELD).to_string(),
            phone: values.trimmed(PHONE_FIELD).to_string(),
        })
    })
}
