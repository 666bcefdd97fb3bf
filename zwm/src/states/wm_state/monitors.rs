//! Outputs reported by RandR, and following them when they change

use x11rb::{
    connection::RequestConnection,
    errors::{ConnectionError, ReplyError, ReplyOrIdError},
    protocol::{
        randr::{self, ConnectionExt as _},
        xproto::*,
    },
    rust_connection::RustConnection,
};

use crate::{rect::Rect, states::WMState};

pub(super) fn has_randr(conn: &RustConnection) -> Result<bool, ConnectionError> {
    Ok(conn
        .extension_information(randr::X11_EXTENSION_NAME)?
        .is_some())
}

/// Two side by side halves of the screen, to try multi monitor code on one
#[cfg(feature = "fake_monitors")]
pub(super) fn query_outputs(
    _conn: &RustConnection,
    _root: Window,
    screen: Rect,
) -> Result<Vec<Rect>, ReplyError> {
    let half = screen.width / 2;
    Ok(vec![
        Rect::new(screen.x, screen.y, half, screen.height),
        Rect::new(screen.x + half, screen.y, screen.width - half, screen.height),
    ])
}

/// The area of every active CRTC, or the whole screen without RandR
#[cfg(not(feature = "fake_monitors"))]
pub(super) fn query_outputs(
    conn: &RustConnection,
    root: Window,
    screen: Rect,
) -> Result<Vec<Rect>, ReplyError> {
    if !has_randr(conn)? {
        log::info!("No RandR, using the whole screen as one monitor");
        return Ok(vec![screen]);
    }
    let resources = conn.randr_get_screen_resources_current(root)?.reply()?;
    let cookies = resources
        .crtcs
        .iter()
        .map(|&crtc| conn.randr_get_crtc_info(crtc, resources.config_timestamp))
        .collect::<Result<Vec<_>, _>>()?;

    let mut outputs = Vec::with_capacity(cookies.len());
    for cookie in cookies {
        let info = cookie.reply()?;
        if info.width == 0 || info.height == 0 {
            continue;
        }
        outputs.push(Rect::new(
            info.x as i32,
            info.y as i32,
            info.width as i32,
            info.height as i32,
        ));
    }
    if outputs.is_empty() {
        outputs.push(screen);
    }
    log::debug!("Outputs: {:?}", outputs);
    Ok(outputs)
}

impl<'a> WMState<'a> {
    /// The screen or its outputs changed: rebuild the monitors and everything on them
    pub(crate) fn update_geometry(&mut self) -> Result<(), ReplyOrIdError> {
        let geometry = self.conn.get_geometry(self.root)?.reply()?;
        let screen = Rect::new(0, 0, geometry.width as i32, geometry.height as i32);
        let outputs = query_outputs(self.conn, self.root, screen)?;
        let update = self.model.update_geometry(screen, &outputs);
        if !update.dirty {
            return Ok(());
        }

        for bar in update.removed_bars {
            self.conn.destroy_window(bar)?;
        }
        for id in update.rehidden {
            self.hide_window(id)?;
        }
        self.update_bars()?;
        for mon in 0..self.model.monitors.len() {
            self.place_bar(mon)?;
        }
        let fullscreen: Vec<_> = self
            .model
            .clients
            .iter()
            .filter(|(_, c)| c.fullscreen)
            .map(|(id, c)| (id, self.model.monitors[c.monitor].rect))
            .collect();
        for (id, rect) in fullscreen {
            self.model.clients[id].set_rect(rect);
            self.configure_client(id)?;
        }

        let pointer = self.conn.query_pointer(self.root)?.reply()?;
        self.model.selmon = self
            .model
            .monitor_at(pointer.root_x as i32, pointer.root_y as i32);
        self.motion_monitor = Some(self.model.selmon);

        self.paint_background()?;
        self.focus(None)?;
        self.arrange(None)
    }
}
