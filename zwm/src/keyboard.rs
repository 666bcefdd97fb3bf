//! Keycode <-> keysym lookups and the num lock modifier

use x11rb::{
    connection::Connection,
    errors::ReplyError,
    protocol::xproto::{ConnectionExt as _, Keycode, Keysym},
};

use crate::keysyms::XK_NUM_LOCK;

#[derive(Debug, Clone, Default)]
pub(crate) struct KeyboardMapping {
    min_keycode: Keycode,
    per_keycode: usize,
    keysyms: Vec<Keysym>,
    /// The modifier bit Num_Lock is on, 0 if it isn't on any
    pub(crate) numlock: u16,
}

impl KeyboardMapping {
    /// Ask the server for the current mapping
    pub(crate) fn query<C: Connection>(conn: &C) -> Result<Self, ReplyError> {
        let setup = conn.setup();
        let (min, max) = (setup.min_keycode, setup.max_keycode);
        let keyboard = conn.get_keyboard_mapping(min, max - min + 1)?;
        let modifiers = conn.get_modifier_mapping()?;

        let keyboard = keyboard.reply()?;
        let modifiers = modifiers.reply()?;
        let mut mapping = Self::new(min, keyboard.keysyms_per_keycode as usize, keyboard.keysyms);
        mapping.numlock = mapping.modifier_of(XK_NUM_LOCK, &modifiers.keycodes);
        Ok(mapping)
    }

    pub(crate) fn new(min_keycode: Keycode, per_keycode: usize, keysyms: Vec<Keysym>) -> Self {
        Self {
            min_keycode,
            per_keycode: per_keycode.max(1),
            keysyms,
            numlock: 0,
        }
    }

    /// The keysym in the first column of `keycode`
    pub(crate) fn keysym(&self, keycode: Keycode) -> Option<Keysym> {
        let index = (keycode.checked_sub(self.min_keycode)? as usize) * self.per_keycode;
        self.keysyms.get(index).copied().filter(|&k| k != 0)
    }

    /// Every keycode that produces `keysym` in any column
    pub(crate) fn keycodes(&self, keysym: Keysym) -> Vec<Keycode> {
        self.keysyms
            .chunks(self.per_keycode)
            .enumerate()
            .filter(|(_, syms)| syms.contains(&keysym))
            .filter_map(|(i, _)| u8::try_from(i + self.min_keycode as usize).ok())
            .collect()
    }

    /// The modifier mask that has a key producing `keysym`.
    ///
    /// `modifier_keycodes` is the reply to GetModifierMapping, 8 equal groups of keycodes
    pub(crate) fn modifier_of(&self, keysym: Keysym, modifier_keycodes: &[Keycode]) -> u16 {
        let targets = self.keycodes(keysym);
        let per_modifier = modifier_keycodes.len() / 8;
        if per_modifier == 0 {
            return 0;
        }
        modifier_keycodes
            .chunks(per_modifier)
            .position(|codes| codes.iter().any(|c| *c != 0 && targets.contains(c)))
            .map_or(0, |i| 1 << i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> KeyboardMapping {
        // keycodes 8, 9 and 10, two columns each
        KeyboardMapping::new(8, 2, vec![0x61, 0x41, 0, 0, XK_NUM_LOCK, 0xffb7])
    }

    #[test]
    fn lookups() {
        let mapping = mapping();
        assert_eq!(mapping.keysym(8), Some(0x61));
        assert_eq!(mapping.keysym(9), None);
        assert_eq!(mapping.keysym(3), None);
        assert_eq!(mapping.keysym(200), None);
        assert_eq!(mapping.keycodes(0x41), vec![8]);
        assert!(mapping.keycodes(0x42).is_empty());
    }

    #[test]
    fn numlock_modifier() {
        let mapping = mapping();
        // two keycodes per modifier, num lock on Mod2
        let mut modifiers = vec![0; 16];
        modifiers[8] = 10;
        assert_eq!(mapping.modifier_of(XK_NUM_LOCK, &modifiers), 1 << 4);
        assert_eq!(mapping.modifier_of(XK_NUM_LOCK, &[0; 16]), 0);
        assert_eq!(mapping.modifier_of(XK_NUM_LOCK, &[]), 0);
    }
}
