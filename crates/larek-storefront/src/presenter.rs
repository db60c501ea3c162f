//! Presenters: derive views from the store and turn clicks into intents.
//!
//! Presenters never mutate the store. They publish intent events and
//! re-render when the store reports a change.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use larek_core::catalog::ProductDetail;
use larek_core::ids::ProductId;
use larek_events::SubscriptionHandle;
use tracing::debug;

use crate::events::{topics, ShopBus, ShopEvent};
use crate::modal::{ModalController, Panel};
use crate::store::Store;
use crate::view::{CardView, CartView, ItemAction, PreviewView};

/// Part of a catalog card that was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTarget {
    /// Image or title; opens the preview.
    Body,
    /// The add/remove button.
    ActionButton,
}

/// Subscribe `render` on each topic, holding the presenter weakly.
fn subscribe_weak<T: 'static>(
    bus: &ShopBus,
    presenter: &Rc<T>,
    topics: &[&str],
    render: fn(&T),
) -> Vec<SubscriptionHandle> {
    topics
        .iter()
        .map(|topic| {
            let weak: Weak<T> = Rc::downgrade(presenter);
            bus.subscribe(*topic, move |_: &ShopEvent| {
                if let Some(presenter) = weak.upgrade() {
                    render(&presenter);
                }
            })
        })
        .collect()
}

/// Publish the add/remove intent an action button stands for.
fn publish_action(bus: &ShopBus, store: &Store, id: &ProductId) {
    let Some(entry) = store.find_entry(id) else {
        debug!(product = %id, "action on unknown product");
        return;
    };
    match ItemAction::derive(&entry, store.is_in_cart(id)) {
        ItemAction::Add => {
            bus.publish(ShopEvent::CartAdd { entry });
        }
        ItemAction::Remove => {
            bus.publish(ShopEvent::CartRemove { id: id.clone() });
        }
        ItemAction::Priceless => debug!(product = %id, "action disabled for priceless product"),
    }
}

/// Catalog grid.
#[derive(Debug)]
pub struct CatalogPresenter {
    bus: ShopBus,
    store: Rc<Store>,
    cards: RefCell<Vec<CardView>>,
    handles: RefCell<Vec<SubscriptionHandle>>,
}

impl CatalogPresenter {
    /// Create the presenter, render once, and follow catalog and cart changes.
    pub fn attach(bus: &ShopBus, store: Rc<Store>) -> Rc<Self> {
        let presenter = Rc::new(Self {
            bus: bus.clone(),
            store,
            cards: RefCell::new(Vec::new()),
            handles: RefCell::new(Vec::new()),
        });
        let handles = subscribe_weak(
            bus,
            &presenter,
            &[topics::CATALOG_CHANGED, topics::CART_CHANGED],
            Self::render,
        );
        *presenter.handles.borrow_mut() = handles;
        presenter.render();
        presenter
    }

    /// Rebuild every card from the store.
    pub fn render(&self) {
        let cards: Vec<CardView> = self
            .store
            .catalog()
            .iter()
            .map(|entry| CardView::new(entry, self.store.is_in_cart(&entry.id)))
            .collect();
        debug!(cards = cards.len(), "catalog rendered");
        *self.cards.borrow_mut() = cards;
    }

    pub fn cards(&self) -> Vec<CardView> {
        self.cards.borrow().clone()
    }

    pub fn card(&self, id: &ProductId) -> Option<CardView> {
        self.cards.borrow().iter().find(|c| &c.id == id).cloned()
    }

    /// Handle a click on a card.
    ///
    /// A click on the action button never also counts as a body click.
    pub fn handle_click(&self, id: &ProductId, target: CardTarget) {
        match target {
            CardTarget::Body => {
                self.bus.publish(ShopEvent::ProductSelected { id: id.clone() });
            }
            CardTarget::ActionButton => publish_action(&self.bus, &self.store, id),
        }
    }
}

impl Drop for CatalogPresenter {
    fn drop(&mut self) {
        for handle in self.handles.get_mut().drain(..) {
            self.bus.unsubscribe(handle);
        }
    }
}

/// Product preview panel.
#[derive(Debug)]
pub struct PreviewPresenter {
    bus: ShopBus,
    store: Rc<Store>,
    modal: Rc<ModalController>,
    current: RefCell<Option<ProductDetail>>,
    handles: RefCell<Vec<SubscriptionHandle>>,
}

impl PreviewPresenter {
    pub fn attach(bus: &ShopBus, store: Rc<Store>, modal: Rc<ModalController>) -> Rc<Self> {
        let presenter = Rc::new(Self {
            bus: bus.clone(),
            store,
            modal,
            current: RefCell::new(None),
            handles: RefCell::new(Vec::new()),
        });
        let handles = subscribe_weak(bus, &presenter, &[topics::CART_CHANGED], Self::refresh);
        *presenter.handles.borrow_mut() = handles;
        presenter
    }

    /// Show a product in the modal.
    pub fn show(&self, detail: ProductDetail) {
        let view = self.view_of(&detail);
        *self.current.borrow_mut() = Some(detail);
        self.modal.show(Panel::Preview(view));
    }

    /// Product last shown, if any.
    pub fn current(&self) -> Option<ProductDetail> {
        self.current.borrow().clone()
    }

    /// Re-derive the action button while the preview is on screen.
    pub fn refresh(&self) {
        let Some(detail) = self.current() else {
            return;
        };
        let view = self.view_of(&detail);
        self.modal.replace_if(
            |panel| matches!(panel, Panel::Preview(shown) if shown.card.id == detail.entry.id),
            Panel::Preview(view),
        );
    }

    /// Toggle cart membership of the shown product.
    pub fn click_action(&self) {
        if let Some(detail) = self.current() {
            publish_action(&self.bus, &self.store, &detail.entry.id);
        }
    }

    fn view_of(&self, detail: &ProductDetail) -> PreviewView {
        PreviewView::new(detail, self.store.is_in_cart(&detail.entry.id))
    }
}

impl Drop for PreviewPresenter {
    fn drop(&mut self) {
        for handle in self.handles.get_mut().drain(..) {
            self.bus.unsubscribe(handle);
        }
    }
}

/// Cart panel.
#[derive(Debug)]
pub struct CartPresenter {
    bus: ShopBus,
    store: Rc<Store>,
    modal: Rc<ModalController>,
    handles: RefCell<Vec<SubscriptionHandle>>,
}

impl CartPresenter {
    pub fn attach(bus: &ShopBus, store: Rc<Store>, modal: Rc<ModalController>) -> Rc<Self> {
        let presenter = Rc::new(Self {
            bus: bus.clone(),
            store,
            modal,
            handles: RefCell::new(Vec::new()),
        });
        let handles = subscribe_weak(bus, &presenter, &[topics::CART_CHANGED], Self::refresh);
        *presenter.handles.borrow_mut() = handles;
        presenter
    }

    pub fn view(&self) -> CartView {
        CartView::new(&self.store.cart(), self.store.cart_total())
    }

    /// Render the cart into the modal and open it.
    pub fn open(&self) {
        self.modal.show(Panel::Cart(self.view()));
    }

    /// Re-render while the cart panel is displayed.
    pub fn refresh(&self) {
        self.modal
            .replace_if(|panel| matches!(panel, Panel::Cart(_)), Panel::Cart(self.view()));
    }

    /// Remove the line at a 1-based index.
    ///
    /// Returns `false` if there is no such line.
    pub fn remove(&self, index: usize) -> bool {
        let id = index
            .checked_sub(1)
            .and_then(|i| self.store.cart().get(i).map(|line| line.id.clone()));
        match id {
            Some(id) => {
                self.bus.publish(ShopEvent::CartRemove { id });
                true
            }
            None => {
                debug!(index, "no cart line at index");
                false
            }
        }
    }

    /// Start checkout. Does nothing while the cart is empty.
    pub fn proceed(&self) -> bool {
        if self.store.cart_len() == 0 {
            debug!("proceed ignored for empty cart");
            return false;
        }
        self.bus.publish(ShopEvent::OrderOpen);
        true
    }
}

impl Drop for CartPresenter {
    fn drop(&mut self) {
        for handle in self.handles.get_mut().drain(..) {
            self.bus.unsubscribe(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larek_core::catalog::CatalogEntry;

    use crate::modal::PanelKind;

    fn entry(id: &str, price: Option<u64>) -> CatalogEntry {
        CatalogEntry::new(id, format!("Item {}", id), "/i.svg", price, "other")
    }

    /// Store with `cart:add` / `cart:remove` wired the way the storefront does.
    fn wired_store(bus: &ShopBus) -> Rc<Store> {
        let store = Rc::new(Store::new(bus.clone()));
        let s = Rc::downgrade(&store);
        bus.subscribe("cart:*", move |event: &ShopEvent| {
            let Some(store) = s.upgrade() else { return };
            match event {
                ShopEvent::CartAdd { entry } => {
                    store.add_to_cart(entry);
                }
                ShopEvent::CartRemove { id } => {
                    store.remove_from_cart(id);
                }
                _ => {}
            }
        });
        store
    }

    #[test]
    fn test_catalog_cards_follow_cart() {
        let bus = ShopBus::new();
        let store = wired_store(&bus);
        let catalog = CatalogPresenter::attach(&bus, Rc::clone(&store));
        store.set_catalog(vec![entry("1", Some(100)), entry("2", None)]);

        let one = ProductId::new("1");
        assert_eq!(catalog.card(&one).unwrap().action, ItemAction::Add);

        catalog.handle_click(&one, CardTarget::ActionButton);
        assert!(store.is_in_cart(&one));
        assert_eq!(catalog.card(&one).unwrap().action, ItemAction::Remove);

        catalog.handle_click(&one, CardTarget::ActionButton);
        assert!(!store.is_in_cart(&one));

        let two = catalog.card(&ProductId::new("2")).unwrap();
        assert!(!two.action.is_enabled());
        catalog.handle_click(&two.id, CardTarget::ActionButton);
        assert_eq!(store.cart_len(), 0);
    }

    #[test]
    fn test_action_click_is_not_a_body_click() {
        let bus = ShopBus::new();
        let store = wired_store(&bus);
        let catalog = CatalogPresenter::attach(&bus, Rc::clone(&store));
        store.set_catalog(vec![entry("1", Some(100))]);

        let selected = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&selected);
        bus.subscribe(topics::PRODUCT_SELECTED, move |e: &ShopEvent| {
            if let ShopEvent::ProductSelected { id } = e {
                s.borrow_mut().push(id.clone());
            }
        });

        catalog.handle_click(&ProductId::new("1"), CardTarget::ActionButton);
        assert!(selected.borrow().is_empty());

        catalog.handle_click(&ProductId::new("1"), CardTarget::Body);
        assert_eq!(*selected.borrow(), vec![ProductId::new("1")]);
    }

    #[test]
    fn test_dropped_presenter_unsubscribes() {
        let bus = ShopBus::new();
        let store = Rc::new(Store::new(bus.clone()));
        let catalog = CatalogPresenter::attach(&bus, Rc::clone(&store));
        assert_eq!(bus.subscriber_count(), 2);
        drop(catalog);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_cart_panel_rerenders_while_shown() {
        let bus = ShopBus::new();
        let store = wired_store(&bus);
        let modal = Rc::new(ModalController::new(bus.clone()));
        let cart = CartPresenter::attach(&bus, Rc::clone(&store), Rc::clone(&modal));

        store.add_to_cart(&entry("1", Some(100)));
        store.add_to_cart(&entry("2", Some(50)));
        cart.open();
        assert!(modal.is_showing(PanelKind::Cart));

        assert!(cart.remove(1));
        match modal.content() {
            Some(Panel::Cart(view)) => {
                assert_eq!(view.lines.len(), 1);
                assert_eq!(view.lines[0].index, 1);
                assert_eq!(view.lines[0].id, ProductId::new("2"));
                assert_eq!(view.total, 50);
            }
            other => panic!("unexpected panel {:?}", other),
        }
        assert!(!cart.remove(0));
        assert!(!cart.remove(5));
    }

    #[test]
    fn test_proceed_requires_items() {
        let bus = ShopBus::new();
        let store = wired_store(&bus);
        let modal = Rc::new(ModalController::new(bus.clone()));
        let cart = CartPresenter::attach(&bus, Rc::clone(&store), modal);

        let opened = Rc::new(RefCell::new(0));
        let o = Rc::clone(&opened);
        bus.subscribe(topics::ORDER_OPEN, move |_: &ShopEvent| *o.borrow_mut() += 1);

        assert!(!cart.view().proceed_enabled);
        assert!(!cart.proceed());
        store.add_to_cart(&entry("1", Some(100)));
        assert!(cart.proceed());
        assert_eq!(*opened.borrow(), 1);
    }

    #[test]
    fn test_preview_tracks_membership() {
        let bus = ShopBus::new();
        let store = wired_store(&bus);
        let modal = Rc::new(ModalController::new(bus.clone()));
        let preview = PreviewPresenter::attach(&bus, Rc::clone(&store), Rc::clone(&modal));
        store.set_catalog(vec![entry("1", Some(100))]);

        preview.show(ProductDetail::new(entry("1", Some(100)), "A pill"));
        preview.click_action();
        assert!(store.is_in_cart(&ProductId::new("1")));

        match modal.content() {
            Some(Panel::Preview(view)) => {
                assert_eq!(view.card.action, ItemAction::Remove);
                assert_eq!(view.description, "A pill");
            }
            other => panic!("unexpected panel {:?}", other),
        }
    }
}
