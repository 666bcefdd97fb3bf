use x11rb::{errors::ReplyOrIdError, protocol::xproto::*};

use crate::{
    bar::BarClick,
    command::{find_buttons, find_key, Click},
    errors::ignore_vanished,
    keyboard::KeyboardMapping,
    rect::Rect,
    states::{ClientId, WMState},
};

use super::WITHDRAWN_STATE;

/// Set on events that came from `SendEvent`
const SEND_EVENT_BIT: u8 = 0x80;

fn has(mask: ConfigWindow, flag: ConfigWindow) -> bool {
    u16::from(mask) & u16::from(flag) != 0
}

impl<'a> WMState<'a> {
    /// Monitor `window` belongs to, the one under the pointer for the root window
    fn window_to_monitor(&self, window: Window) -> Result<usize, ReplyOrIdError> {
        if window == self.root {
            let pointer = self.conn.query_pointer(self.root)?.reply()?;
            return Ok(self
                .model
                .monitor_at(pointer.root_x as i32, pointer.root_y as i32));
        }
        if let Some(mon) = self.model.bar_owner(window) {
            return Ok(mon);
        }
        Ok(self
            .model
            .find_by_window(window)
            .map_or(self.model.selmon, |id| self.model.clients[id].monitor))
    }

    /// Make `mon` the selected monitor, taking the focus away from the old one
    fn select_monitor(&mut self, mon: usize) -> Result<(), ReplyOrIdError> {
        if let Some(sel) = self.model.sel() {
            self.unfocus(sel, true)?;
        }
        self.model.selmon = mon;
        Ok(())
    }

    pub(crate) fn on_button_press(&mut self, event: ButtonPressEvent) -> Result<(), ReplyOrIdError> {
        let mon = self.window_to_monitor(event.event)?;
        if mon != self.model.selmon {
            self.select_monitor(mon)?;
            self.focus(None)?;
        }

        let mut click = Click::RootWin;
        let mut bar_click = None;
        let selmon = self.model.selmon;
        if event.event == self.model.monitors[selmon].bar_window {
            let windows = self.model.bar_windows(selmon);
            bar_click = self.model.monitors[selmon].bar.hit(
                event.event_x as f64,
                event.event_y as f64,
                self.model.tag_count,
                &windows,
            );
            match &bar_click {
                Some(hit) => click = Click::from(hit),
                None => return Ok(()),
            }
        } else if let Some(id) = self.model.find_by_window(event.event) {
            self.focus(Some(id))?;
            self.restack(self.model.selmon)?;
            self.conn.allow_events(Allow::REPLAY_POINTER, x11rb::CURRENT_TIME)?;
            click = Click::ClientWin;
        }

        let actions = find_buttons(
            &self.buttons,
            click,
            event.detail,
            u16::from(event.state),
            self.keyboard.numlock,
        );
        let clicked = match bar_click {
            Some(BarClick::WinTitle(id)) => Some(id),
            _ => None,
        };
        for action in actions {
            let action = match bar_click {
                Some(BarClick::Tag(mask)) => action.on_tag(mask),
                _ => action,
            };
            self.handle_action(action, clicked)?;
        }
        Ok(())
    }

    pub(crate) fn on_client_message(&mut self, event: ClientMessageEvent) -> Result<(), ReplyOrIdError> {
        let id = match self.model.find_by_window(event.window) {
            Some(id) => id,
            None => return Ok(()),
        };
        let data = event.data.as_data32();
        if event.type_ == self.atoms._NET_WM_STATE {
            let fullscreen = self.atoms._NET_WM_STATE_FULLSCREEN;
            if data[1] == fullscreen || data[2] == fullscreen {
                // 0 removes, 1 adds, 2 toggles
                let enable = data[0] == 1 || (data[0] == 2 && !self.model.clients[id].fullscreen);
                self.set_fullscreen(id, enable)?;
            }
        } else if event.type_ == self.atoms._NET_ACTIVE_WINDOW
            && self.model.sel() != Some(id)
            && !self.model.clients[id].urgent
        {
            self.set_urgent(id, true)?;
            self.draw_bars()?;
        }
        Ok(())
    }

    pub(crate) fn on_configure_request(
        &mut self,
        event: ConfigureRequestEvent,
    ) -> Result<(), ReplyOrIdError> {
        let id = match self.model.find_by_window(event.window) {
            Some(id) => id,
            None => {
                let aux = ConfigureWindowAux::from_configure_request(&event);
                self.conn.configure_window(event.window, &aux)?;
                return Ok(());
            }
        };
        let mask = event.value_mask;
        if has(mask, ConfigWindow::BORDER_WIDTH) {
            self.model.clients[id].border = event.border_width as i32;
            return Ok(());
        }

        let client = &self.model.clients[id];
        let floating_layout = self.model.selmon().layout().is_floating();
        if !client.floating && !floating_layout {
            return self.send_configure(id);
        }

        let mon = self.model.monitors[client.monitor].rect;
        let mut rect = client.rect;
        if has(mask, ConfigWindow::X) {
            rect.x = mon.x + event.x as i32;
        }
        if has(mask, ConfigWindow::Y) {
            rect.y = mon.y + event.y as i32;
        }
        if has(mask, ConfigWindow::WIDTH) {
            rect.width = event.width as i32;
        }
        if has(mask, ConfigWindow::HEIGHT) {
            rect.height = event.height as i32;
        }
        // floating windows that would stick out are centred
        let outer = Rect::new(
            rect.x,
            rect.y,
            rect.width + 2 * client.border,
            rect.height + 2 * client.border,
        );
        if client.floating && outer.right() > mon.right() {
            rect.x = mon.x + (mon.width / 2 - outer.width / 2);
        }
        if client.floating && outer.bottom() > mon.bottom() {
            rect.y = mon.y + (mon.height / 2 - outer.height / 2);
        }
        let moved_only = (has(mask, ConfigWindow::X) || has(mask, ConfigWindow::Y))
            && !(has(mask, ConfigWindow::WIDTH) || has(mask, ConfigWindow::HEIGHT));

        self.model.clients[id].set_rect(rect);
        if moved_only {
            self.send_configure(id)?;
        }
        if self.model.is_visible(id) {
            self.conn.configure_window(
                event.window,
                &ConfigureWindowAux::new()
                    .x(rect.x)
                    .y(rect.y)
                    .width(rect.width.max(1) as u32)
                    .height(rect.height.max(1) as u32),
            )?;
        }
        Ok(())
    }

    pub(crate) fn on_configure_notify(
        &mut self,
        event: ConfigureNotifyEvent,
    ) -> Result<(), ReplyOrIdError> {
        if event.window == self.root {
            self.update_geometry()?;
        }
        Ok(())
    }

    pub(crate) fn on_destroy_notify(&mut self, event: DestroyNotifyEvent) -> Result<(), ReplyOrIdError> {
        if let Some(id) = self.model.find_by_window(event.window) {
            self.unmanage(id, true)?;
        }
        Ok(())
    }

    /// Focus follows the pointer
    pub(crate) fn on_enter_notify(&mut self, event: EnterNotifyEvent) -> Result<(), ReplyOrIdError> {
        if (event.mode != NotifyMode::NORMAL || event.detail == NotifyDetail::INFERIOR)
            && event.event != self.root
        {
            return Ok(());
        }
        let client = self.model.find_by_window(event.event);
        let mon = match client {
            Some(id) => self.model.clients[id].monitor,
            None => self.window_to_monitor(event.event)?,
        };
        if mon != self.model.selmon {
            self.select_monitor(mon)?;
        } else if client.is_none() || client == self.model.sel() {
            return Ok(());
        }
        self.focus(client)
    }

    pub(crate) fn on_expose(&mut self, event: ExposeEvent) -> Result<(), ReplyOrIdError> {
        if event.count != 0 {
            return Ok(());
        }
        if let Some(mon) = self.model.bar_owner(event.window) {
            self.draw_bar(mon)?;
        }
        Ok(())
    }

    /// Some clients take the focus themselves, give it back to the selection
    pub(crate) fn on_focus_in(&mut self, event: FocusInEvent) -> Result<(), ReplyOrIdError> {
        if let Some(sel) = self.model.sel() {
            if self.model.clients[sel].window != event.event {
                self.set_focus(sel)?;
            }
        }
        Ok(())
    }

    pub(crate) fn on_key_press(&mut self, event: KeyPressEvent) -> Result<(), ReplyOrIdError> {
        let keysym = match self.keyboard.keysym(event.detail) {
            Some(keysym) => keysym,
            None => return Ok(()),
        };
        if let Some(action) = find_key(
            &self.keys,
            keysym,
            u16::from(event.state),
            self.keyboard.numlock,
        ) {
            self.handle_action(action, None)?;
        }
        Ok(())
    }

    pub(crate) fn on_mapping_notify(&mut self, event: MappingNotifyEvent) -> Result<(), ReplyOrIdError> {
        if event.request == Mapping::KEYBOARD || event.request == Mapping::MODIFIER {
            log::debug!("Keyboard mapping changed");
            self.keyboard = KeyboardMapping::query(self.conn)?;
            self.grab_keys()?;
        }
        Ok(())
    }

    pub(crate) fn on_map_request(&mut self, event: MapRequestEvent) -> Result<(), ReplyOrIdError> {
        let attrs = match ignore_vanished(self.conn.get_window_attributes(event.window)?.reply())? {
            Some(attrs) => attrs,
            None => return Ok(()),
        };
        if attrs.override_redirect || self.model.find_by_window(event.window).is_some() {
            return Ok(());
        }
        if let Some(geometry) = ignore_vanished(self.conn.get_geometry(event.window)?.reply())? {
            self.manage(event.window, &geometry)?;
        }
        Ok(())
    }

    /// The selected monitor follows the pointer over the root window
    pub(crate) fn on_motion_notify(&mut self, event: MotionNotifyEvent) -> Result<(), ReplyOrIdError> {
        if event.event != self.root {
            return Ok(());
        }
        let mon = self
            .model
            .monitor_at(event.root_x as i32, event.root_y as i32);
        let previous = self.motion_monitor.replace(mon);
        if previous.is_some() && previous != Some(mon) && mon != self.model.selmon {
            self.select_monitor(mon)?;
            self.focus(None)?;
        }
        Ok(())
    }

    pub(crate) fn on_property_notify(&mut self, event: PropertyNotifyEvent) -> Result<(), ReplyOrIdError> {
        if event.window == self.root {
            if event.atom == u32::from(AtomEnum::WM_NAME) {
                self.update_status()?;
            } else if let Some(panel) = self.atoms.panel(event.atom) {
                self.update_panel(panel)?;
            }
            return Ok(());
        }
        if event.state == Property::DELETE {
            return Ok(());
        }
        let id = match self.model.find_by_window(event.window) {
            Some(id) => id,
            None => return Ok(()),
        };

        if event.atom == u32::from(AtomEnum::WM_TRANSIENT_FOR) {
            self.on_transient_change(id)?;
        } else if event.atom == u32::from(AtomEnum::WM_NORMAL_HINTS) {
            // read again on the next resize
            self.model.clients[id].hints = None;
        } else if event.atom == u32::from(AtomEnum::WM_HINTS) {
            self.update_wm_hints(id)?;
            self.draw_bars()?;
        }
        if event.atom == u32::from(AtomEnum::WM_NAME) || event.atom == self.atoms._NET_WM_NAME {
            let window = self.model.clients[id].window;
            self.model.clients[id].name = self.window_title(window)?;
            self.draw_bar(self.model.clients[id].monitor)?;
        }
        if event.atom == self.atoms._NET_WM_WINDOW_TYPE {
            self.update_window_type(id)?;
        }
        Ok(())
    }

    /// A client that became a transient of a managed window starts floating
    fn on_transient_change(&mut self, id: ClientId) -> Result<(), ReplyOrIdError> {
        if self.model.clients[id].floating {
            return Ok(());
        }
        let parent = self.transient_for(self.model.clients[id].window)?;
        if parent.and_then(|p| self.model.find_by_window(p)).is_some() {
            self.model.clients[id].floating = true;
            self.arrange(Some(self.model.clients[id].monitor))?;
        }
        Ok(())
    }

    pub(crate) fn on_unmap_notify(&mut self, event: UnmapNotifyEvent) -> Result<(), ReplyOrIdError> {
        let id = match self.model.find_by_window(event.window) {
            Some(id) => id,
            None => return Ok(()),
        };
        if event.response_type & SEND_EVENT_BIT != 0 {
            self.set_client_state(event.window, WITHDRAWN_STATE)?;
        } else {
            self.unmanage(id, false)?;
        }
        Ok(())
    }
}
