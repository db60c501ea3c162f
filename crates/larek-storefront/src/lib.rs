//! Reactive storefront engine.
//!
//! A [`Storefront`] wires together:
//!
//! - **Store**: catalog snapshot and cart; every mutation emits a change event
//! - **ModalController**: one content slot with open/close lifecycle events
//! - **ValidatedForm**: the form engine used by both checkout steps
//! - **Presenters**: catalog grid, preview and cart panel
//! - **CheckoutCoordinator**: the three-step checkout
//!
//! Components talk through a [`ShopBus`]. Gateway calls are deferred to
//! [`Storefront::settle`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use larek_gateway::MemoryGateway;
//! use larek_storefront::{CardTarget, Storefront};
//!
//! # async fn run() {
//! let shop = Storefront::new(Arc::new(MemoryGateway::demo()));
//! shop.load_catalog().await.unwrap();
//!
//! let first = shop.catalog().cards()[0].id.clone();
//! shop.catalog().handle_click(&first, CardTarget::ActionButton);
//! assert_eq!(shop.store().cart_len(), 1);
//! # }
//! ```

mod app;
pub mod checkout;
mod effect;
pub mod events;
pub mod form;
pub mod modal;
pub mod presenter;
mod store;
pub mod view;

pub use app::{EffectOutcome, Storefront, StorefrontOptions, DEFAULT_PAYMENT_OPTIONS};
pub use checkout::{CheckoutCoordinator, CompletionOutcome};
pub use effect::{Effect, EffectQueue};
pub use events::{topics, ShopBus, ShopEvent};
pub use form::{FormPhase, FormState, FormValues, FormView, ValidatedForm};
pub use modal::{Key, ModalClick, ModalController, Panel, PanelKind};
pub use presenter::{CardTarget, CartPresenter, CatalogPresenter, PreviewPresenter};
pub use store::Store;
pub use view::{CardView, CartLineView, CartView, ItemAction, PreviewView, SuccessView};
