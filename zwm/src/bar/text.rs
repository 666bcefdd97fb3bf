//! Bar text, drawn by the X server with a core font

use x11rb::{
    connection::Connection,
    errors::{ConnectionError, ReplyOrIdError},
    protocol::xproto::{ChangeGCAux, ConnectionExt as _, CreateGCAux, Drawable, Font, Gcontext},
};

use super::Zone;

/// Used when the configured font doesn't exist
const FALLBACK_FONT: &str = "fixed";
/// A TEXTITEM16 holds at most this many characters
const MAX_ITEM_CHARS: usize = 254;

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct FontMetrics {
    pub(crate) char_width: i16,
    pub(crate) ascent: i16,
    pub(crate) descent: i16,
}

/// A font and a GC to draw it with
#[derive(Debug)]
pub(crate) struct CoreFont {
    font: Font,
    gc: Gcontext,
    pub(crate) metrics: FontMetrics,
}

impl CoreFont {
    /// Open `name`, falling back to "fixed". `drawable` only decides the depth of the GC
    pub(crate) fn open<C: Connection>(
        conn: &C,
        drawable: Drawable,
        name: &str,
    ) -> Result<Self, ReplyOrIdError> {
        let font = conn.generate_id()?;
        if let Err(e) = conn.open_font(font, name.as_bytes())?.check() {
            log::warn!("Can't open font {:?} ({:?}), using {}", name, e, FALLBACK_FONT);
            conn.open_font(font, FALLBACK_FONT.as_bytes())?.check()?;
        }

        let info = conn.query_font(font)?.reply()?;
        let metrics = FontMetrics {
            char_width: info.max_bounds.character_width.max(1),
            ascent: info.font_ascent,
            descent: info.font_descent,
        };

        let gc = conn.generate_id()?;
        conn.create_gc(
            gc,
            drawable,
            &CreateGCAux::new().font(font).graphics_exposures(0),
        )?;

        Ok(Self { font, gc, metrics })
    }

    /// Draw `text` centred in `zone`, cut at the end if it doesn't fit
    pub(crate) fn draw<C: Connection>(
        &self,
        conn: &C,
        drawable: Drawable,
        zone: &Zone,
        margin: f64,
        text: &str,
        pixel: u32,
    ) -> Result<(), ConnectionError> {
        let chars: Vec<char> = text.chars().collect();
        let (x, y, fit) = place_text(zone, margin, chars.len(), self.metrics);
        if fit == 0 {
            return Ok(());
        }
        conn.change_gc(self.gc, &ChangeGCAux::new().foreground(pixel))?;
        conn.poly_text16(drawable, self.gc, x, y, &encode_text16(&chars[..fit]))?;
        Ok(())
    }

    pub(crate) fn close<C: Connection>(&self, conn: &C) -> Result<(), ConnectionError> {
        conn.free_gc(self.gc)?;
        conn.close_font(self.font)?;
        Ok(())
    }
}

/// Start of the baseline and how many of `chars` characters fit in `zone`
pub(crate) fn place_text(
    zone: &Zone,
    margin: f64,
    chars: usize,
    metrics: FontMetrics,
) -> (i16, i16, usize) {
    let available = (zone.w - 2.0 * margin).max(0.0);
    let cw = metrics.char_width as f64;
    let fit = chars.min((available / cw) as usize);
    let width = fit as f64 * cw;
    let x = zone.x + margin + (available - width) / 2.0;
    let y = zone.y + (zone.h + metrics.ascent as f64 - metrics.descent as f64) / 2.0;
    (x.round() as i16, y.round() as i16, fit)
}

/// TEXTITEM16 items for `chars`. Characters outside the BMP become '?'
pub(crate) fn encode_text16(chars: &[char]) -> Vec<u8> {
    let mut items = Vec::with_capacity(chars.len() * 2 + 2 * (chars.len() / MAX_ITEM_CHARS + 1));
    for chunk in chars.chunks(MAX_ITEM_CHARS) {
        // length, then the delta to the previous item
        items.push(chunk.len() as u8);
        items.push(0);
        for c in chunk {
            let code = u16::try_from(*c as u32).unwrap_or('?' as u16);
            items.extend_from_slice(&code.to_be_bytes());
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: FontMetrics = FontMetrics {
        char_width: 10,
        ascent: 12,
        descent: 4,
    };

    #[test]
    fn centred_when_it_fits() {
        let zone = Zone::new(100.0, 0.0, 100.0, 30.0);
        let (x, y, fit) = place_text(&zone, 5.0, 3, METRICS);
        assert_eq!(fit, 3);
        assert_eq!(x, 135);
        assert_eq!(y, 19);
    }

    #[test]
    fn truncated_when_too_long() {
        let zone = Zone::new(0.0, 0.0, 55.0, 30.0);
        let (x, _, fit) = place_text(&zone, 5.0, 20, METRICS);
        assert_eq!(fit, 4);
        assert_eq!(x, 8);
        assert_eq!(place_text(&Zone::new(0.0, 0.0, 8.0, 30.0), 5.0, 2, METRICS).2, 0);
    }

    #[test]
    fn text_items() {
        let chars: Vec<char> = "a中😀".chars().collect();
        assert_eq!(encode_text16(&chars), vec![3, 0, 0, b'a', 0x4e, 0x2d, 0, b'?']);

        let long = vec!['x'; 300];
        let items = encode_text16(&long);
        assert_eq!(items[0], 254);
        assert_eq!(items[2 + 254 * 2], 46);
        assert_eq!(items.len(), 4 + 300 * 2);
    }
}
