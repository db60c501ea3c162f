//! Storefront composition root.

use std::rc::Rc;
use std::sync::Arc;

use larek_core::ids::ProductId;
use larek_events::SubscriptionHandle;
use larek_gateway::{Gateway, GatewayError};
use tracing::{debug, error, info, warn};

use crate::checkout::{CheckoutCoordinator, CompletionOutcome};
use crate::effect::{Effect, EffectQueue};
use crate::events::{topics, ShopBus, ShopEvent};
use crate::modal::{ModalController, Panel, PanelKind};
use crate::presenter::{CartPresenter, CatalogPresenter, PreviewPresenter};
use crate::store::Store;
use crate::view::PreviewView;

/// Payment options offered when none are configured.
pub const DEFAULT_PAYMENT_OPTIONS: &[&str] = &["card", "cash"];

/// Storefront construction options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontOptions {
    /// Options of the payment choice group.
    pub payment_options: Vec<String>,
}

impl Default for StorefrontOptions {
    fn default() -> Self {
        Self {
            payment_options: DEFAULT_PAYMENT_OPTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StorefrontOptions {
    pub fn with_payment_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payment_options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Result of running one effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    /// Preview shown for the product.
    PreviewShown(ProductId),
    /// Item could not be loaded; nothing was shown.
    PreviewFailed(ProductId),
    /// Item loaded after a checkout took over the modal; nothing was shown.
    PreviewSkipped(ProductId),
    Order(CompletionOutcome),
}

/// One storefront: bus, store, modal, presenters and checkout, wired.
///
/// Everything is built once here and shared by reference. Event handlers
/// only queue gateway work; [`Storefront::settle`] performs it.
pub struct Storefront {
    bus: ShopBus,
    store: Rc<Store>,
    modal: Rc<ModalController>,
    catalog: Rc<CatalogPresenter>,
    preview: Rc<PreviewPresenter>,
    cart: Rc<CartPresenter>,
    checkout: Rc<CheckoutCoordinator>,
    effects: EffectQueue,
    gateway: Arc<dyn Gateway>,
    handles: Vec<SubscriptionHandle>,
}

impl Storefront {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self::with_options(gateway, StorefrontOptions::default())
    }

    pub fn with_options(gateway: Arc<dyn Gateway>, options: StorefrontOptions) -> Self {
        let bus = ShopBus::new();
        let store = Rc::new(Store::new(bus.clone()));
        let modal = Rc::new(ModalController::new(bus.clone()));
        let effects = EffectQueue::new();

        let catalog = CatalogPresenter::attach(&bus, Rc::clone(&store));
        let preview = PreviewPresenter::attach(&bus, Rc::clone(&store), Rc::clone(&modal));
        let cart = CartPresenter::attach(&bus, Rc::clone(&store), Rc::clone(&modal));
        let checkout = CheckoutCoordinator::attach(
            &bus,
            Rc::clone(&store),
            Rc::clone(&modal),
            effects.clone(),
            &options.payment_options,
        );

        let handles = wire_intents(&bus, &store, &cart, &effects);
        debug!(subscriptions = bus.subscriber_count(), "storefront wired");

        Self {
            bus,
            store,
            modal,
            catalog,
            preview,
            cart,
            checkout,
            effects,
            gateway,
            handles,
        }
    }

    pub fn bus(&self) -> &ShopBus {
        &self.bus
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn modal(&self) -> &ModalController {
        &self.modal
    }

    pub fn catalog(&self) -> &CatalogPresenter {
        &self.catalog
    }

    pub fn preview(&self) -> &PreviewPresenter {
        &self.preview
    }

    pub fn cart(&self) -> &CartPresenter {
        &self.cart
    }

    pub fn checkout(&self) -> &CheckoutCoordinator {
        &self.checkout
    }

    /// Preview of `id`, if it is what the open modal is showing.
    pub fn visible_preview(&self, id: &ProductId) -> Option<PreviewView> {
        if !self.modal.is_open() {
            return None;
        }
        match self.modal.content() {
            Some(Panel::Preview(view)) if &view.card.id == id => Some(view),
            _ => None,
        }
    }

    /// Gateway work waiting for [`Storefront::settle`].
    pub fn pending_effects(&self) -> Vec<Effect> {
        self.effects.pending()
    }

    /// Fetch the catalog into the store.
    ///
    /// On failure the previous catalog is kept.
    pub async fn load_catalog(&self) -> Result<usize, GatewayError> {
        match self.gateway.fetch_catalog().await {
            Ok(entries) => {
                let count = entries.len();
                info!(entries = count, "catalog loaded");
                self.store.set_catalog(entries);
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, "catalog fetch failed");
                Err(e)
            }
        }
    }

    /// Run queued gateway work until the queue is empty.
    ///
    /// Effects queued by continuations run in the same call.
    pub async fn settle(&self) -> Vec<EffectOutcome> {
        let mut outcomes = Vec::new();
        while let Some(effect) = self.effects.pop() {
            outcomes.push(self.run(effect).await);
        }
        outcomes
    }

    async fn run(&self, effect: Effect) -> EffectOutcome {
        match effect {
            Effect::FetchItem(id) => match self.gateway.fetch_item(&id).await {
                Ok(detail) if self.can_show_preview() => {
                    self.preview.show(detail);
                    EffectOutcome::PreviewShown(id)
                }
                Ok(_) => {
                    warn!(
                        product = %id,
                        panel = ?self.modal.panel_kind(),
                        "item loaded while the modal is busy; not shown"
                    );
                    EffectOutcome::PreviewSkipped(id)
                }
                Err(e) => {
                    error!(product = %id, error = %e, "item fetch failed");
                    EffectOutcome::PreviewFailed(id)
                }
            },
            Effect::SubmitOrder { attempt, request } => {
                let result = self.gateway.submit_order(&request).await;
                EffectOutcome::Order(self.checkout.complete_order(attempt, request.total, result))
            }
        }
    }

    /// A preview may replace another preview, never a checkout panel.
    fn can_show_preview(&self) -> bool {
        self.checkout.flow().is_none()
            && (!self.modal.is_open() || self.modal.is_showing(PanelKind::Preview))
    }
}

impl Drop for Storefront {
    fn drop(&mut self) {
        for handle in self.handles.drain(..) {
            self.bus.unsubscribe(handle);
        }
    }
}

/// Route intents to the store, the cart panel and the effect queue.
fn wire_intents(
    bus: &ShopBus,
    store: &Rc<Store>,
    cart: &Rc<CartPresenter>,
    effects: &EffectQueue,
) -> Vec<SubscriptionHandle> {
    let mut handles = Vec::new();

    let queue = effects.clone();
    handles.push(bus.subscribe(topics::PRODUCT_SELECTED, move |event: &ShopEvent| {
        if let ShopEvent::ProductSelected { id } = event {
            queue.push(Effect::FetchItem(id.clone()));
        }
    }));

    let weak = Rc::downgrade(store);
    handles.push(bus.subscribe(topics::CART_ADD, move |event: &ShopEvent| {
        if let (Some(store), ShopEvent::CartAdd { entry }) = (weak.upgrade(), event) {
            store.add_to_cart(entry);
        }
    }));

    let weak = Rc::downgrade(store);
    handles.push(bus.subscribe(topics::CART_REMOVE, move |event: &ShopEvent| {
        if let (Some(store), ShopEvent::CartRemove { id }) = (weak.upgrade(), event) {
            store.remove_from_cart(id);
        }
    }));

    let weak = Rc::downgrade(cart);
    handles.push(bus.subscribe(topics::CART_OPEN, move |_: &ShopEvent| {
        if let Some(cart) = weak.upgrade() {
            cart.open();
        }
    }));

    handles
}
