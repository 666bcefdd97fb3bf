//! Everything a key or button can be bound to, and the bindings themselves

use x11rb::protocol::xproto::{Keysym, ModMask};

use crate::{
    bar::BarClick,
    keysyms::*,
    layouts::LayoutKind,
    mod_mask::clean_mask,
    tags::TagMask,
};

/// Programs started from bindings
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Program {
    Terminal,
    Launcher,
    Lock,
    VolumeUp,
    VolumeDown,
    ToggleMute,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Action {
    Spawn(Program),
    ToggleBar,
    /// Focus the next or previous client, optionally showing hidden ones on the way
    FocusStack {
        forward: bool,
        include_hidden: bool,
    },
    IncNMaster(i32),
    SetMFact(f64),
    Zoom,
    /// The empty mask goes back to the previous view
    View(TagMask),
    ToggleView(TagMask),
    Tag(TagMask),
    ToggleTag(TagMask),
    KillClient,
    /// `None` switches to the previous layout
    SetLayout(Option<LayoutKind>),
    ToggleFloating,
    FocusMon(i32),
    TagMon(i32),
    ShowAll,
    ToggleHide,
    /// Hide the clicked client if it has focus, otherwise show and focus it
    ToggleWin,
    MoveMouse,
    ResizeMouse,
    Quit,
}

impl Action {
    /// Tag actions bound to the tag bar act on the clicked tag
    pub(crate) fn on_tag(self, mask: TagMask) -> Self {
        match self {
            Action::View(_) => Action::View(mask),
            Action::ToggleView(_) => Action::ToggleView(mask),
            Action::Tag(_) => Action::Tag(mask),
            Action::ToggleTag(_) => Action::ToggleTag(mask),
            other => other,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct KeyBinding {
    pub(crate) mask: u16,
    pub(crate) keysym: Keysym,
    pub(crate) action: Action,
}

/// Where a button was pressed
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Click {
    TagBar,
    LayoutButton,
    WinTitle,
    StatusText,
    ClientWin,
    RootWin,
}

impl From<&BarClick> for Click {
    fn from(click: &BarClick) -> Self {
        match click {
            BarClick::Status => Click::StatusText,
            BarClick::Tag(_) => Click::TagBar,
            BarClick::LayoutButton => Click::LayoutButton,
            BarClick::WinTitle(_) => Click::WinTitle,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct ButtonBinding {
    pub(crate) click: Click,
    pub(crate) mask: u16,
    pub(crate) button: u8,
    pub(crate) action: Action,
}

fn key(mask: u16, keysym: Keysym, action: Action) -> KeyBinding {
    KeyBinding {
        mask,
        keysym,
        action,
    }
}

/// The keyboard bindings, `modkey` is the configured mod key
pub(crate) fn key_bindings(modkey: u16, tag_count: usize) -> Vec<KeyBinding> {
    let shift = u16::from(ModMask::SHIFT);
    let ctrl = u16::from(ModMask::CONTROL);
    let stack = |forward, include_hidden| Action::FocusStack {
        forward,
        include_hidden,
    };

    let mut keys = vec![
        key(modkey | shift, XK_L, Action::Spawn(Program::Lock)),
        key(modkey, XK_P, Action::Spawn(Program::Launcher)),
        key(modkey | shift, XK_RETURN, Action::Spawn(Program::Terminal)),
        key(modkey, XK_UP, Action::Spawn(Program::VolumeUp)),
        key(modkey, XK_DOWN, Action::Spawn(Program::VolumeDown)),
        key(modkey | shift, XK_M, Action::Spawn(Program::ToggleMute)),
        key(modkey, XK_B, Action::ToggleBar),
        key(modkey, XK_J, stack(true, false)),
        key(modkey, XK_K, stack(false, false)),
        key(modkey | shift, XK_J, stack(true, true)),
        key(modkey | shift, XK_K, stack(false, true)),
        key(modkey, XK_I, Action::IncNMaster(1)),
        key(modkey, XK_D, Action::IncNMaster(-1)),
        key(modkey, XK_H, Action::SetMFact(-0.05)),
        key(modkey, XK_L, Action::SetMFact(0.05)),
        key(modkey, XK_RETURN, Action::Zoom),
        key(modkey, XK_TAB, Action::View(TagMask::EMPTY)),
        key(modkey | shift, XK_C, Action::KillClient),
        key(modkey, XK_T, Action::SetLayout(Some(LayoutKind::Tile))),
        key(modkey, XK_F, Action::SetLayout(Some(LayoutKind::Floating))),
        key(modkey, XK_M, Action::SetLayout(Some(LayoutKind::Monocle))),
        key(modkey, XK_SPACE, Action::SetLayout(None)),
        key(modkey | shift, XK_SPACE, Action::ToggleFloating),
        key(modkey, XK_0, Action::View(TagMask::all(tag_count))),
        key(modkey | shift, XK_0, Action::Tag(TagMask::all(tag_count))),
        key(modkey, XK_COMMA, Action::FocusMon(-1)),
        key(modkey, XK_PERIOD, Action::FocusMon(1)),
        key(modkey | shift, XK_COMMA, Action::TagMon(-1)),
        key(modkey | shift, XK_PERIOD, Action::TagMon(1)),
        key(modkey | shift, XK_S, Action::ShowAll),
        key(modkey, XK_O, Action::ToggleHide),
        key(modkey | shift, XK_Q, Action::Quit),
    ];

    // the number row has room for nine tags
    for i in 0..tag_count.min(9) {
        let sym = digit(i as u32 + 1);
        let Ok(mask) = TagMask::single(i) else {
            continue;
        };
        keys.push(key(modkey, sym, Action::View(mask)));
        keys.push(key(modkey | ctrl, sym, Action::ToggleView(mask)));
        keys.push(key(modkey | shift, sym, Action::Tag(mask)));
        keys.push(key(modkey | ctrl | shift, sym, Action::ToggleTag(mask)));
    }
    keys
}

pub(crate) fn button_bindings(modkey: u16) -> Vec<ButtonBinding> {
    let button = |click, mask, button, action| ButtonBinding {
        click,
        mask,
        button,
        action,
    };
    vec![
        button(Click::LayoutButton, 0, 1, Action::SetLayout(None)),
        button(
            Click::LayoutButton,
            0,
            3,
            Action::SetLayout(Some(LayoutKind::Monocle)),
        ),
        button(Click::WinTitle, 0, 1, Action::ToggleWin),
        button(Click::WinTitle, 0, 2, Action::Zoom),
        button(Click::StatusText, 0, 2, Action::Spawn(Program::Terminal)),
        button(Click::ClientWin, modkey, 1, Action::MoveMouse),
        button(Click::ClientWin, modkey, 2, Action::ToggleFloating),
        button(Click::ClientWin, modkey, 3, Action::ResizeMouse),
        button(Click::TagBar, 0, 1, Action::View(TagMask::EMPTY)),
        button(Click::TagBar, 0, 3, Action::ToggleView(TagMask::EMPTY)),
        button(Click::TagBar, modkey, 1, Action::Tag(TagMask::EMPTY)),
        button(Click::TagBar, modkey, 3, Action::ToggleTag(TagMask::EMPTY)),
    ]
}

/// The action bound to a key press with the given modifier `state`
pub(crate) fn find_key(
    bindings: &[KeyBinding],
    keysym: Keysym,
    state: u16,
    numlock: u16,
) -> Option<Action> {
    let state = clean_mask(state, numlock);
    bindings
        .iter()
        .find(|b| b.keysym == keysym && clean_mask(b.mask, numlock) == state)
        .map(|b| b.action)
}

/// The actions bound to a button press, in table order
pub(crate) fn find_buttons(
    bindings: &[ButtonBinding],
    click: Click,
    button: u8,
    state: u16,
    numlock: u16,
) -> Vec<Action> {
    let state = clean_mask(state, numlock);
    bindings
        .iter()
        .filter(|b| {
            b.click == click && b.button == button && clean_mask(b.mask, numlock) == state
        })
        .map(|b| b.action)
        .collect()
}
