/// Keys the presenter reacts to while the modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Tab,
    ShiftTab,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str, shift: bool) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            "Tab" if shift => Key::ShiftTab,
            "Tab" => Key::Tab,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Home" => Key::Home,
            "End" => Key::End,
            _ => Key::Other,
        }
    }
}

/// Where a browsing key moves within the registry, given the current
/// position and the number of projects. `None` for out-of-range moves;
/// browsing does not wrap.
pub fn browse_target(key: Key, current: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let target = match key {
        Key::ArrowLeft => current.checked_sub(1)?,
        Key::ArrowRight => current + 1,
        Key::Home => 0,
        Key::End => len - 1,
        _ => return None,
    };
    (target < len && target != current).then_some(target)
}
