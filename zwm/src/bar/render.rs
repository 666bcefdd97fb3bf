//! Shapes of the bar, painted into a buffer that is uploaded with `put_image`

use crate::{color::Color, layouts::LayoutKind, rect::Rect};

use super::{Flavor, Frame, FrameContent, Zone};

/// A BGRA buffer with premultiplied alpha, the layout of a 24/32 bit ZPixmap
#[derive(Debug, Clone)]
pub(crate) struct Canvas {
    width: u16,
    height: u16,
    data: Vec<u8>,
}

impl Canvas {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub(crate) fn width(&self) -> u16 {
        self.width
    }

    pub(crate) fn height(&self) -> u16 {
        self.height
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// The bytes of `rows` rows starting at `first`
    pub(crate) fn rows(&self, first: u16, rows: u16) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = (first as usize * stride).min(self.data.len());
        let end = (start + rows as usize * stride).min(self.data.len());
        &self.data[start..end]
    }

    pub(crate) fn clear(&mut self, color: Color) {
        let px = color.bgra();
        self.data.chunks_exact_mut(4).for_each(|p| p.copy_from_slice(&px));
    }

    pub(crate) fn pixel(&self, x: u16, y: u16) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    fn blend(&mut self, x: i32, y: i32, px: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let inv = 255 - px[3] as u16;
        for c in 0..4 {
            let dst = self.data[i + c] as u16;
            self.data[i + c] = (px[c] as u16 + dst * inv / 255) as u8;
        }
    }

    /// Source-over fill, clipped to the canvas
    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Color) {
        let px = color.bgra();
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = rect.right().min(self.width as i32);
        let y1 = rect.bottom().min(self.height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, px);
            }
        }
    }

    /// Copy opaque RGBA rows of `width` pixels to (`x`, `y`), clipped to the canvas
    pub(crate) fn blit_rgba(&mut self, x: i32, y: i32, width: u32, rgba: &[u8]) {
        let stride = self.width as usize * 4;
        for (row, line) in rgba.chunks_exact(width as usize * 4).enumerate() {
            let cy = y + row as i32;
            if cy < 0 || cy >= self.height as i32 {
                continue;
            }
            for (col, px) in line.chunks_exact(4).enumerate() {
                let cx = x + col as i32;
                if cx < 0 || cx >= self.width as i32 {
                    continue;
                }
                let i = cy as usize * stride + cx as usize * 4;
                self.data[i..i + 4].copy_from_slice(&[px[2], px[1], px[0], 255]);
            }
        }
    }

    /// Right triangle with the right angle at (`x`, `y`) and both legs `side` long
    pub(crate) fn fill_corner(&mut self, x: i32, y: i32, side: i32, color: Color) {
        let px = color.bgra();
        for dy in 0..side {
            for dx in 0..side - dy {
                self.blend(x + dx, y + dy, px);
            }
        }
    }
}

/// How many rows of a `width` pixel wide image fit in one `put_image` request
pub(crate) fn rows_per_request(width: u16, max_request_bytes: usize) -> u16 {
    // the fixed part of a PutImage request
    const HEADER: usize = 24;
    let stride = (width as usize * 4).max(1);
    (max_request_bytes.saturating_sub(HEADER) / stride).clamp(1, u16::MAX as usize) as u16
}

/// Sizes of the decorations, relative to the bar height
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct BarAttrs {
    pub(crate) margin_ratio: f64,
    pub(crate) baseline_ratio: f64,
    pub(crate) text_height_ratio: f64,
    pub(crate) volume_bar_ratio: f64,
    pub(crate) pin_ratio: f64,
}

impl Default for BarAttrs {
    fn default() -> Self {
        Self {
            margin_ratio: 0.15,
            baseline_ratio: 0.7,
            text_height_ratio: 0.6,
            volume_bar_ratio: 0.2,
            pin_ratio: 0.35,
        }
    }
}

/// Colors of the bar, by flavor
pub(crate) trait Palette {
    fn background(&self, flavor: Flavor) -> Color;
    fn foreground(&self, flavor: Flavor) -> Color;
    fn pin(&self, flavor: Flavor) -> Color;
}

/// Kanagawa colors
#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct Kanagawa;

impl Kanagawa {
    const SUMI_INK1: Color = Color::rgb(0x18, 0x18, 0x20);
    const SUMI_INK3: Color = Color::rgb(0x1f, 0x1f, 0x28);
    const WAVE_BLUE1: Color = Color::rgb(0x22, 0x32, 0x49);
    const WAVE_BLUE2: Color = Color::rgb(0x2d, 0x4f, 0x67);
    const WINTER_BLUE: Color = Color::rgb(0x25, 0x25, 0x35);
    const FUJI_WHITE: Color = Color::rgb(0xdc, 0xd7, 0xba);
    const FUJI_GRAY: Color = Color::rgb(0x72, 0x71, 0x69);
    const KATANA_GRAY: Color = Color::rgb(0x71, 0x7c, 0x7c);
    const PEACH_RED: Color = Color::rgb(0xff, 0x5d, 0x62);
    const SPRING_BLUE: Color = Color::rgb(0x7f, 0xb4, 0xca);
    const SPRING_VIOLET1: Color = Color::rgb(0x93, 0x8a, 0xa9);
    const SURIMI_ORANGE: Color = Color::rgb(0xff, 0xa0, 0x66);

    /// Background of the empty volume bar
    pub(crate) fn plate(&self) -> Color {
        Self::FUJI_GRAY
    }
}

impl Palette for Kanagawa {
    fn background(&self, flavor: Flavor) -> Color {
        match flavor {
            Flavor::DateTime => Self::WAVE_BLUE1,
            Flavor::Logo => Self::SUMI_INK1,
            Flavor::TagSel => Self::WAVE_BLUE1.with_alpha(204),
            Flavor::TagSelActive => Self::WAVE_BLUE2,
            Flavor::LayoutButton | Flavor::InputMethod => Self::WINTER_BLUE,
            Flavor::WinSelActive => Self::FUJI_WHITE,
            Flavor::Volume => Self::SUMI_INK3,
            _ => Self::SUMI_INK3.with_alpha(204),
        }
    }

    fn foreground(&self, flavor: Flavor) -> Color {
        match flavor {
            Flavor::DateTime => Self::SPRING_BLUE,
            Flavor::Logo => Self::SPRING_VIOLET1,
            Flavor::WinSelActive => Self::WAVE_BLUE2,
            Flavor::TagSel | Flavor::TagSelActive => Self::SURIMI_ORANGE,
            _ => Self::FUJI_WHITE,
        }
    }

    fn pin(&self, flavor: Flavor) -> Color {
        match flavor {
            Flavor::TagSelUrgent => Self::PEACH_RED,
            Flavor::TagSelOccupied => Self::FUJI_WHITE,
            Flavor::WinSelHidden => Self::KATANA_GRAY,
            _ => Self::WINTER_BLUE,
        }
    }
}

/// Paints frames. Text is left to the caller, it needs the X server for fonts
pub(crate) trait Renderer {
    fn draw(&self, canvas: &mut Canvas, frame: &Frame);

    /// The color text of the given flavor is drawn with
    fn text_color(&self, flavor: Flavor) -> Color;
}

/// Solid rectangles, no gradients
#[derive(Debug, Default, Clone)]
pub(crate) struct FlatRenderer {
    pub(crate) palette: Kanagawa,
    pub(crate) attrs: BarAttrs,
}

impl FlatRenderer {
    fn margin(&self, zone: &Zone) -> f64 {
        zone.h * self.attrs.margin_ratio
    }

    fn draw_level(&self, canvas: &mut Canvas, zone: &Zone, flavor: Flavor, level: Option<f64>) {
        let inner = zone.inset(self.margin(zone));
        let h = zone.h * self.attrs.volume_bar_ratio;
        let plate = Zone::new(inner.x, zone.y + (zone.h - h) / 2.0, inner.w, h);
        canvas.fill_rect(plate.to_rect(), self.palette.plate());
        if let Some(level) = level {
            let fill = Zone::new(plate.x, plate.y, plate.w * level.clamp(0.0, 1.0), plate.h);
            canvas.fill_rect(fill.to_rect(), self.palette.foreground(flavor));
        }
    }

    fn draw_icon(&self, canvas: &mut Canvas, zone: &Zone, flavor: Flavor, layout: LayoutKind) {
        let inner = zone.inset(self.margin(zone));
        let color = self.palette.foreground(flavor);
        let part = |x0: f64, y0: f64, x1: f64, y1: f64| {
            Zone::new(
                inner.x + inner.w * x0,
                inner.y + inner.h * y0,
                inner.w * (x1 - x0),
                inner.h * (y1 - y0),
            )
            .to_rect()
        };
        let parts = match layout {
            LayoutKind::Monocle => vec![part(0.0, 0.0, 1.0, 1.0)],
            LayoutKind::Tile => vec![
                part(0.0, 0.0, 0.45, 1.0),
                part(0.55, 0.0, 1.0, 0.45),
                part(0.55, 0.55, 1.0, 1.0),
            ],
            LayoutKind::Floating => {
                let t = 1.0 / 3.0;
                // two overlapping windows, drawn as outlines
                vec![
                    part(0.0, 0.0, 2.0 * t, 0.12),
                    part(0.0, 0.0, 0.12, 2.0 * t),
                    part(t, t, 1.0, t + 0.12),
                    part(t, t, t + 0.12, 1.0),
                ]
            }
        };
        for rect in parts {
            canvas.fill_rect(rect, color);
        }
    }
}

impl Renderer for FlatRenderer {
    fn draw(&self, canvas: &mut Canvas, frame: &Frame) {
        let zone = &frame.zone;
        if frame.fill {
            canvas.fill_rect(zone.to_rect(), self.palette.background(frame.flavor));
        }
        match &frame.content {
            FrameContent::Level(level) => self.draw_level(canvas, zone, frame.flavor, *level),
            FrameContent::Icon(layout) => self.draw_icon(canvas, zone, frame.flavor, *layout),
            FrameContent::Text(_) | FrameContent::Empty => {}
        }
        if let Some(pin) = frame.pin {
            let side = (zone.h * self.attrs.pin_ratio).round() as i32;
            let r = zone.to_rect();
            canvas.fill_corner(r.x, r.y, side, self.palette.pin(pin));
        }
    }

    fn text_color(&self, flavor: Flavor) -> Color {
        self.palette.foreground(flavor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_is_clipped() {
        let mut canvas = Canvas::new(10, 4);
        canvas.fill_rect(Rect::new(-5, 2, 8, 10), Color::rgb(1, 2, 3));
        assert_eq!(canvas.pixel(2, 3), [3, 2, 1, 255]);
        assert_eq!(canvas.pixel(3, 3), [0, 0, 0, 0]);
        assert_eq!(canvas.pixel(0, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn translucent_fill_blends() {
        let mut canvas = Canvas::new(1, 1);
        canvas.clear(Color::rgb(200, 0, 0));
        canvas.fill_rect(Rect::new(0, 0, 1, 1), Color::rgb(0, 0, 0).with_alpha(128));
        let [_, _, r, a] = canvas.pixel(0, 0);
        assert_eq!(a, 255);
        assert!(r > 90 && r < 110);
    }

    #[test]
    fn corner_is_a_triangle() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill_corner(0, 0, 4, Color::rgb(255, 0, 0));
        assert_eq!(canvas.pixel(3, 0)[3], 255);
        assert_eq!(canvas.pixel(0, 3)[3], 255);
        assert_eq!(canvas.pixel(2, 2)[3], 0);
        assert_eq!(canvas.pixel(4, 0)[3], 0);
    }

    #[test]
    fn request_rows() {
        assert_eq!(rows_per_request(1000, 4_000_024), 1000);
        assert_eq!(rows_per_request(1000, 10), 1);
        let canvas = Canvas::new(3, 5);
        assert_eq!(canvas.rows(4, 3).len(), 12);
    }

    #[test]
    fn volume_level() {
        let renderer = FlatRenderer::default();
        let mut canvas = Canvas::new(100, 20);
        let frame = Frame {
            zone: Zone::new(0.0, 0.0, 100.0, 20.0),
            flavor: Flavor::Volume,
            fill: false,
            content: FrameContent::Level(Some(0.5)),
            pin: None,
        };
        renderer.draw(&mut canvas, &frame);
        let fg = Kanagawa.foreground(Flavor::Volume).bgra();
        let plate = Kanagawa.plate().bgra();
        assert_eq!(canvas.pixel(10, 10), fg);
        assert_eq!(canvas.pixel(80, 10), plate);
        // outside of the bar
        assert_eq!(canvas.pixel(50, 2), [0, 0, 0, 0]);
    }
}
