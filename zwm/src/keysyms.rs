//! The few keysyms the default bindings use, values from X11/keysymdef.h

use x11rb::protocol::xproto::Keysym;

pub(crate) const XK_TAB: Keysym = 0xff09;
pub(crate) const XK_RETURN: Keysym = 0xff0d;
pub(crate) const XK_UP: Keysym = 0xff52;
pub(crate) const XK_DOWN: Keysym = 0xff54;
pub(crate) const XK_NUM_LOCK: Keysym = 0xff7f;

pub(crate) const XK_SPACE: Keysym = 0x0020;
pub(crate) const XK_COMMA: Keysym = 0x002c;
pub(crate) const XK_PERIOD: Keysym = 0x002e;

pub(crate) const XK_0: Keysym = 0x0030;

pub(crate) const XK_B: Keysym = 0x0062;
pub(crate) const XK_C: Keysym = 0x0063;
pub(crate) const XK_D: Keysym = 0x0064;
pub(crate) const XK_F: Keysym = 0x0066;
pub(crate) const XK_H: Keysym = 0x0068;
pub(crate) const XK_I: Keysym = 0x0069;
pub(crate) const XK_J: Keysym = 0x006a;
pub(crate) const XK_K: Keysym = 0x006b;
pub(crate) const XK_L: Keysym = 0x006c;
pub(crate) const XK_M: Keysym = 0x006d;
pub(crate) const XK_O: Keysym = 0x006f;
pub(crate) const XK_P: Keysym = 0x0070;
pub(crate) const XK_Q: Keysym = 0x0071;
pub(crate) const XK_S: Keysym = 0x0073;
pub(crate) const XK_T: Keysym = 0x0074;

/// Keysym of the digit `n` on the top row
pub(crate) const fn digit(n: u32) -> Keysym {
    XK_0 + n
}
