//! Single-slot modal.

use std::cell::{Cell, RefCell};

use serde::Serialize;
use tracing::debug;

use crate::events::{ShopBus, ShopEvent};
use crate::form::FormView;
use crate::view::{CartView, PreviewView, SuccessView};

/// Content of the modal slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "lowercase")]
pub enum Panel {
    Preview(PreviewView),
    Cart(CartView),
    /// Payment/address form.
    Order(FormView),
    Contacts(FormView),
    Success(SuccessView),
}

/// Kind of a [`Panel`], for cheap comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Preview,
    Cart,
    Order,
    Contacts,
    Success,
}

impl Panel {
    pub fn kind(&self) -> PanelKind {
        match self {
            Panel::Preview(_) => PanelKind::Preview,
            Panel::Cart(_) => PanelKind::Cart,
            Panel::Order(_) => PanelKind::Order,
            Panel::Contacts(_) => PanelKind::Contacts,
            Panel::Success(_) => PanelKind::Success,
        }
    }
}

/// Where a click inside the modal landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalClick {
    /// The dimmed area around the content.
    Overlay,
    CloseButton,
    /// Anywhere inside the content box.
    Content,
}

/// Keys the modal reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Char(char),
}

/// Modal with exactly one content slot.
///
/// Opening while open and closing while closed do nothing and emit nothing.
/// Content is replaced wholesale and is independent of the open state.
#[derive(Debug)]
pub struct ModalController {
    bus: ShopBus,
    open: Cell<bool>,
    content: RefCell<Option<Panel>>,
}

impl ModalController {
    pub fn new(bus: ShopBus) -> Self {
        Self {
            bus,
            open: Cell::new(false),
            content: RefCell::new(None),
        }
    }

    /// Replace the content; `None` clears it. Does not open or close.
    pub fn set_content(&self, panel: Option<Panel>) {
        debug!(panel = ?panel.as_ref().map(Panel::kind), "modal content replaced");
        *self.content.borrow_mut() = panel;
    }

    /// Replace the content only while open and showing a matching panel.
    ///
    /// Returns whether the content was replaced.
    pub fn replace_if<P>(&self, predicate: P, panel: Panel) -> bool
    where
        P: FnOnce(&Panel) -> bool,
    {
        if !self.open.get() {
            return false;
        }
        let mut content = self.content.borrow_mut();
        match content.as_ref() {
            Some(current) if predicate(current) => {
                *content = Some(panel);
                true
            }
            _ => false,
        }
    }

    /// Set the content and open.
    pub fn show(&self, panel: Panel) {
        self.set_content(Some(panel));
        self.open();
    }

    /// Open the modal. Returns `false` if it was already open.
    pub fn open(&self) -> bool {
        if self.open.replace(true) {
            return false;
        }
        self.bus.publish(ShopEvent::ModalOpened);
        true
    }

    /// Close the modal. Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        if !self.open.replace(false) {
            return false;
        }
        self.bus.publish(ShopEvent::ModalClosed);
        true
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn content(&self) -> Option<Panel> {
        self.content.borrow().clone()
    }

    pub fn panel_kind(&self) -> Option<PanelKind> {
        self.content.borrow().as_ref().map(Panel::kind)
    }

    /// Check if the modal is open on a panel of the given kind.
    pub fn is_showing(&self, kind: PanelKind) -> bool {
        self.is_open() && self.panel_kind() == Some(kind)
    }

    /// Route a click. Clicks inside the content never close the modal.
    pub fn handle_click(&self, target: ModalClick) {
        match target {
            ModalClick::Overlay | ModalClick::CloseButton => {
                self.close();
            }
            ModalClick::Content => {}
        }
    }

    /// Route a key press; Escape closes.
    pub fn handle_key(&self, key: Key) {
        if key == Key::Escape {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use larek_core::ids::OrderId;

    fn lifecycle(bus: &ShopBus) -> Rc<RefCell<Vec<&'static str>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        bus.subscribe("modal:*", move |e: &ShopEvent| {
            s.borrow_mut().push(match e {
                ShopEvent::ModalOpened => "opened",
                ShopEvent::ModalClosed => "closed",
                _ => "other",
            })
        });
        seen
    }

    fn success() -> Panel {
        Panel::Success(SuccessView::new(OrderId::new("o1"), 100))
    }

    #[test]
    fn test_open_twice_emits_once() {
        let bus = ShopBus::new();
        let seen = lifecycle(&bus);
        let modal = ModalController::new(bus);

        assert!(modal.open());
        assert!(!modal.open());
        assert_eq!(*seen.borrow(), vec!["opened"]);
    }

    #[test]
    fn test_close_when_closed_is_silent() {
        let bus = ShopBus::new();
        let seen = lifecycle(&bus);
        let modal = ModalController::new(bus);

        assert!(!modal.close());
        modal.open();
        assert!(modal.close());
        assert!(!modal.close());
        assert_eq!(*seen.borrow(), vec!["opened", "closed"]);
    }

    #[test]
    fn test_set_content_does_not_toggle() {
        let modal = ModalController::new(ShopBus::new());
        modal.set_content(Some(success()));
        assert!(!modal.is_open());
        assert_eq!(modal.panel_kind(), Some(PanelKind::Success));

        modal.set_content(None);
        assert!(modal.content().is_none());
    }

    #[test]
    fn test_click_routing() {
        let modal = ModalController::new(ShopBus::new());
        modal.show(success());

        modal.handle_click(ModalClick::Content);
        assert!(modal.is_open());
        modal.handle_click(ModalClick::Overlay);
        assert!(!modal.is_open());

        modal.open();
        modal.handle_click(ModalClick::CloseButton);
        assert!(!modal.is_open());
    }

    #[test]
    fn test_escape_closes() {
        let modal = ModalController::new(ShopBus::new());
        modal.show(success());
        modal.handle_key(Key::Char('x'));
        assert!(modal.is_open());
        modal.handle_key(Key::Escape);
        assert!(!modal.is_open());
    }

    #[test]
    fn test_replace_if_respects_current_panel() {
        let modal = ModalController::new(ShopBus::new());
        let cart = Panel::Cart(CartView::new(&[], 0));

        assert!(!modal.replace_if(|p| p.kind() == PanelKind::Cart, cart.clone()));

        modal.show(success());
        assert!(!modal.replace_if(|p| p.kind() == PanelKind::Cart, cart.clone()));
        assert_eq!(modal.panel_kind(), Some(PanelKind::Success));

        modal.set_content(Some(cart.clone()));
        assert!(modal.replace_if(|p| p.kind() == PanelKind::Cart, cart));
    }
}
