//! Typed storefront events.

use larek_core::cart::CartLine;
use larek_core::catalog::CatalogEntry;
use larek_core::checkout::{ContactDetails, OrderDetails};
use larek_core::ids::ProductId;
use larek_events::{EventBus, Topic};

/// Topic names carried by [`ShopEvent`].
pub mod topics {
    pub const CATALOG_CHANGED: &str = "catalog:changed";
    pub const CART_CHANGED: &str = "cart:changed";
    pub const MODAL_OPENED: &str = "modal:opened";
    pub const MODAL_CLOSED: &str = "modal:closed";
    pub const PRODUCT_SELECTED: &str = "product:selected";
    pub const CART_ADD: &str = "cart:add";
    pub const CART_REMOVE: &str = "cart:remove";
    pub const CART_OPEN: &str = "cart:open";
    pub const ORDER_OPEN: &str = "order:open";
    pub const ORDER_SUBMIT: &str = "order:submit";
    pub const CONTACTS_SUBMIT: &str = "contacts:submit";
}

/// Every event that travels over the storefront bus.
///
/// Change events are emitted by the store and the modal after their state
/// is updated. Intent events are emitted by presenters and forms.
#[derive(Debug, Clone, PartialEq)]
pub enum ShopEvent {
    /// The catalog snapshot was replaced.
    CatalogChanged(Vec<CatalogEntry>),
    /// The cart changed; carries the full ordered cart.
    CartChanged(Vec<CartLine>),
    /// The modal went from closed to open.
    ModalOpened,
    /// The modal went from open to closed.
    ModalClosed,
    /// A catalog card body was clicked.
    ProductSelected { id: ProductId },
    /// Put this entry in the cart.
    CartAdd { entry: CatalogEntry },
    /// Take this product out of the cart.
    CartRemove { id: ProductId },
    /// Show the cart panel.
    CartOpen,
    /// Start checkout from the cart panel.
    OrderOpen,
    /// Validated payment/address form.
    OrderSubmit(OrderDetails),
    /// Validated contacts form.
    ContactsSubmit(ContactDetails),
}

impl Topic for ShopEvent {
    fn topic(&self) -> &str {
        match self {
            ShopEvent::CatalogChanged(_) => topics::CATALOG_CHANGED,
            ShopEvent::CartChanged(_) => topics::CART_CHANGED,
            ShopEvent::ModalOpened => topics::MODAL_OPENED,
            ShopEvent::ModalClosed => topics::MODAL_CLOSED,
            ShopEvent::ProductSelected { .. } => topics::PRODUCT_SELECTED,
            ShopEvent::CartAdd { .. } => topics::CART_ADD,
            ShopEvent::CartRemove { .. } => topics::CART_REMOVE,
            ShopEvent::CartOpen => topics::CART_OPEN,
            ShopEvent::OrderOpen => topics::ORDER_OPEN,
            ShopEvent::OrderSubmit(_) => topics::ORDER_SUBMIT,
            ShopEvent::ContactsSubmit(_) => topics::CONTACTS_SUBMIT,
        }
    }
}

/// Bus carrying [`ShopEvent`]s.
pub type ShopBus = EventBus<ShopEvent>;
