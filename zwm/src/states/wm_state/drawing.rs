//! Bars and the root background

use time::OffsetDateTime;
use x11rb::{
    connection::{Connection, RequestConnection},
    errors::{ConnectionError, ReplyOrIdError},
    protocol::xproto::*,
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    NONE,
};

use crate::{
    bar::{
        frames,
        render::{rows_per_request, Canvas, FlatRenderer, Palette, Renderer},
        text::CoreFont,
        BarContent, Flavor, Frame, FrameContent, WindowEntry,
    },
    states::WMState,
};

/// Draws bars off screen, then copies them to their window
#[derive(Debug)]
pub(super) struct BarPainter {
    font: CoreFont,
    gc: Gcontext,
    renderer: FlatRenderer,
    canvas: Canvas,
    /// Same size as `canvas`, `NONE` before the first draw
    pixmap: Pixmap,
    root: Window,
    depth: u8,
}

impl BarPainter {
    pub(super) fn new(
        conn: &RustConnection,
        root: Window,
        depth: u8,
        font: &str,
    ) -> Result<Self, ReplyOrIdError> {
        let font = CoreFont::open(conn, root, font)?;
        let gc = conn.generate_id()?;
        conn.create_gc(gc, root, &CreateGCAux::new().graphics_exposures(0))?;
        Ok(Self {
            font,
            gc,
            renderer: FlatRenderer::default(),
            canvas: Canvas::new(0, 0),
            pixmap: NONE,
            root,
            depth,
        })
    }

    /// `ratio` of the screen height, but never too small for the font
    pub(super) fn bar_height(&self, screen_height: i32, ratio: f64) -> i32 {
        let metrics = self.font.metrics;
        let text = f64::from(metrics.ascent + metrics.descent) / self.renderer.attrs.text_height_ratio;
        (screen_height as f64 * ratio).round().max(text.ceil()) as i32
    }

    fn ensure_size(
        &mut self,
        conn: &RustConnection,
        width: u16,
        height: u16,
    ) -> Result<(), ReplyOrIdError> {
        if self.pixmap != NONE && self.canvas.width() == width && self.canvas.height() == height {
            return Ok(());
        }
        if self.pixmap != NONE {
            conn.free_pixmap(self.pixmap)?;
        }
        self.pixmap = conn.generate_id()?;
        conn.create_pixmap(self.depth, self.pixmap, self.root, width, height)?;
        self.canvas = Canvas::new(width, height);
        Ok(())
    }

    fn paint(
        &mut self,
        conn: &RustConnection,
        window: Window,
        width: u16,
        height: u16,
        frames: &[Frame],
    ) -> Result<(), ReplyOrIdError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.ensure_size(conn, width, height)?;
        self.canvas
            .clear(self.renderer.palette.background(Flavor::Logo));
        for frame in frames {
            self.renderer.draw(&mut self.canvas, frame);
        }
        upload(conn, self.pixmap, self.gc, self.depth, &self.canvas)?;

        for frame in frames {
            if let FrameContent::Text(text) = &frame.content {
                let margin = frame.zone.h * self.renderer.attrs.margin_ratio;
                let pixel = self.renderer.text_color(frame.flavor).pixel(self.depth);
                self.font
                    .draw(conn, self.pixmap, &frame.zone, margin, text, pixel)?;
            }
        }
        conn.copy_area(self.pixmap, window, self.gc, 0, 0, 0, 0, width, height)?;
        Ok(())
    }

    pub(super) fn free(&self, conn: &RustConnection) -> Result<(), ConnectionError> {
        self.font.close(conn)?;
        conn.free_gc(self.gc)?;
        if self.pixmap != NONE {
            conn.free_pixmap(self.pixmap)?;
        }
        Ok(())
    }
}

/// Upload `canvas` to `drawable`, split in as few requests as the server allows
fn upload(
    conn: &RustConnection,
    drawable: Drawable,
    gc: Gcontext,
    depth: u8,
    canvas: &Canvas,
) -> Result<(), ConnectionError> {
    let rows = rows_per_request(canvas.width(), conn.maximum_request_bytes());
    let mut first = 0;
    while first < canvas.height() {
        let count = rows.min(canvas.height() - first);
        conn.put_image(
            ImageFormat::Z_PIXMAP,
            drawable,
            gc,
            canvas.width(),
            count,
            0,
            first as i16,
            0,
            depth,
            canvas.rows(first, count),
        )?;
        first += count;
    }
    Ok(())
}

impl<'a> WMState<'a> {
    /// Create the bar windows monitors don't have yet
    pub(super) fn update_bars(&mut self) -> Result<(), ReplyOrIdError> {
        let bar_height = self.model.bar_height;
        for mon in self.model.monitors.iter_mut() {
            if mon.bar_window != NONE {
                continue;
            }
            let rect = mon.bar_rect(bar_height);
            let window = self.conn.generate_id()?;
            let aux = CreateWindowAux::new()
                .override_redirect(1)
                .background_pixmap(u32::from(BackPixmap::PARENT_RELATIVE))
                .event_mask(EventMask::BUTTON_PRESS | EventMask::EXPOSURE)
                .cursor(self.cursors.normal);
            self.conn.create_window(
                x11rb::COPY_DEPTH_FROM_PARENT,
                window,
                self.root,
                rect.x as i16,
                rect.y as i16,
                rect.width.max(1) as u16,
                rect.height.max(1) as u16,
                0,
                WindowClass::INPUT_OUTPUT,
                x11rb::COPY_FROM_PARENT,
                &aux,
            )?;
            self.conn.change_property8(
                PropMode::REPLACE,
                window,
                AtomEnum::WM_CLASS,
                AtomEnum::STRING,
                b"zwm\0zwm\0",
            )?;
            self.conn.map_window(window)?;
            log::debug!("Created bar {:#x} at {:?}", window, rect);
            mon.bar_window = window;
        }
        Ok(())
    }

    /// Put the bar of `mon` where it belongs, off screen when hidden
    pub(super) fn place_bar(&self, mon: usize) -> Result<(), ConnectionError> {
        let monitor = &self.model.monitors[mon];
        let rect = monitor.bar_rect(self.model.bar_height);
        self.conn.configure_window(
            monitor.bar_window,
            &ConfigureWindowAux::new()
                .x(rect.x)
                .y(rect.y)
                .width(rect.width.max(1) as u32)
                .height(rect.height.max(1) as u32),
        )?;
        Ok(())
    }

    pub(crate) fn draw_bars(&mut self) -> Result<(), ReplyOrIdError> {
        for mon in 0..self.model.monitors.len() {
            self.draw_bar(mon)?;
        }
        Ok(())
    }

    pub(crate) fn draw_bar(&mut self, mon: usize) -> Result<(), ReplyOrIdError> {
        let monitor = &self.model.monitors[mon];
        if !monitor.show_bar || monitor.bar_window == NONE {
            return Ok(());
        }
        let clock = self.clock();
        let input_method = self.input_method_text();
        let (occupied, urgent) = self.model.tag_state(mon);
        let windows = self
            .model
            .bar_windows(mon)
            .into_iter()
            .map(|id| {
                let client = &self.model.clients[id];
                WindowEntry {
                    name: &client.name,
                    selected: monitor.sel == Some(id),
                    hidden: client.hidden || monitor.revealed == Some(id),
                }
            })
            .collect();
        let content = BarContent {
            status: &self.status,
            clock: &clock,
            tag_names: &self.config.tags,
            active_tags: monitor.active_tags(),
            occupied,
            urgent,
            layout: monitor.layout(),
            windows,
            volume: self.volume.as_ref().and_then(|latest| latest.get()),
            input_method: &input_method,
        };
        let frames = frames(&monitor.bar, &content);
        let window = monitor.bar_window;
        let width = monitor.rect.width.max(0) as u16;
        let height = self.model.bar_height.max(0) as u16;
        self.painter
            .paint(self.conn, window, width, height, &frames)
    }

    /// Local time as HH:MM:SS
    fn clock(&self) -> String {
        let now = OffsetDateTime::now_utc().to_offset(self.utc_offset);
        format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second())
    }

    /// Text set through the first panel property wins over the input method watcher
    fn input_method_text(&self) -> String {
        if !self.panels[0].is_empty() {
            return self.panels[0].clone();
        }
        self.input_method
            .as_ref()
            .and_then(|latest| latest.get())
            .unwrap_or_else(|| String::from("-"))
    }

    /// Paint every monitor's background into a new root pixmap
    pub(super) fn paint_background(&mut self) -> Result<(), ReplyOrIdError> {
        let screen = self.model.screen;
        let (width, height) = (screen.width.max(1) as u16, screen.height.max(1) as u16);
        let mut canvas = Canvas::new(width, height);
        for mon in &self.model.monitors {
            self.background.fill(&mut canvas, mon.rect);
        }

        let pixmap = self.conn.generate_id()?;
        self.conn
            .create_pixmap(self.depth, pixmap, self.root, width, height)?;
        upload(self.conn, pixmap, self.painter.gc, self.depth, &canvas)?;
        self.conn.change_window_attributes(
            self.root,
            &ChangeWindowAttributesAux::new().background_pixmap(pixmap),
        )?;
        // so other programs (compositors, terminals) can find it
        for atom in [self.atoms._XROOTPMAP_ID, self.atoms.ESETROOT_PMAP_ID] {
            self.conn.change_property32(
                PropMode::REPLACE,
                self.root,
                atom,
                AtomEnum::PIXMAP,
                &[pixmap],
            )?;
        }
        self.conn.clear_area(false, self.root, 0, 0, 0, 0)?;
        if self.root_pixmap != NONE {
            self.conn.free_pixmap(self.root_pixmap)?;
        }
        self.root_pixmap = pixmap;
        Ok(())
    }
}
