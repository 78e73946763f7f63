/// Interactive controls of the presentation modal, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalControl {
    Close,
    Fullscreen,
    ExternalLink,
    Menu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    /// An element of the underlying page, by id.
    Element(String),
    Control(ModalControl),
    /// Entry of the demo-switch menu, by position.
    MenuItem(usize),
}

/// Keeps Tab cycling inside the modal while it is open.
#[derive(Debug, Clone, Default)]
pub struct FocusTrap {
    ring: Vec<FocusTarget>,
    index: usize,
}

impl FocusTrap {
    /// Trap over the modal controls, plus the menu entries while it is open.
    pub fn new(menu_items: Option<usize>) -> Self {
        let mut ring: Vec<FocusTarget> = [
            ModalControl::Close,
            ModalControl::Fullscreen,
            ModalControl::ExternalLink,
            ModalControl::Menu,
        ]
        .into_iter()
        .map(FocusTarget::Control)
        .collect();
        if let Some(count) = menu_items {
            ring.extend((0..count).map(FocusTarget::MenuItem));
        }
        Self { ring, index: 0 }
    }

    pub fn current(&self) -> Option<&FocusTarget> {
        self.ring.get(self.index)
    }

    /// Move focus to `target` if it is inside the trap.
    pub fn focus(&mut self, target: &FocusTarget) -> bool {
        match self.ring.iter().position(|t| t == target) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    /// Next target in tab order, wrapping around the ends.
    pub fn advance(&mut self, backwards: bool) -> Option<&FocusTarget> {
        if self.ring.is_empty() {
            return None;
        }
        let len = self.ring.len();
        self.index = if backwards {
            (self.index + len - 1) % len
        } else {
            (self.index + 1) % len
        };
        self.ring.get(self.index)
    }
}
