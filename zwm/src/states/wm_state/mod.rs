mod command_handlers;
mod drawing;
mod event_handlers;
mod monitors;
mod mouse;

use std::collections::VecDeque;

use time::UtcOffset;
use x11rb::{
    connection::Connection,
    cursor::Handle as CursorHandle,
    errors::{ConnectionError, ReplyError, ReplyOrIdError},
    properties::{WmClass, WmHints, WmSizeHints},
    protocol::{randr::ConnectionExt as _, xproto::*, Event},
    resource_manager,
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    CURRENT_TIME, NONE,
};

use common::{PANEL_COUNT, WM_NAME};

use crate::{
    atoms::Atoms,
    background::{BackgroundSource, ImageFill, SolidFill},
    bar::BarPanels,
    command::{button_bindings, key_bindings, ButtonBinding, Click, KeyBinding},
    config::Config,
    errors::ignore_vanished,
    keyboard::KeyboardMapping,
    rect::Rect,
    rules::apply_rules,
    size_hints::{apply_size_hints, HintArea, SizeHints},
    states::{client::BROKEN, Client, ClientId, Model, MonitorSettings},
    utils::text_from_property,
    watchers::{Latest, Volume},
};

use drawing::BarPainter;

/// What we listen to on the root window
fn root_event_mask() -> EventMask {
    EventMask::SUBSTRUCTURE_REDIRECT
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::BUTTON_PRESS
        | EventMask::POINTER_MOTION
        | EventMask::ENTER_WINDOW
        | EventMask::LEAVE_WINDOW
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::PROPERTY_CHANGE
}

/// What we listen to on every client
fn client_event_mask() -> EventMask {
    EventMask::ENTER_WINDOW
        | EventMask::FOCUS_CHANGE
        | EventMask::PROPERTY_CHANGE
        | EventMask::STRUCTURE_NOTIFY
}

fn button_mask() -> EventMask {
    EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE
}

/// `mask` without the bits of `without`
fn mask_without(mask: EventMask, without: EventMask) -> EventMask {
    EventMask::from(u32::from(mask) & !u32::from(without))
}

/// ICCCM WM_STATE values
const WITHDRAWN_STATE: u32 = 0;
const NORMAL_STATE: u32 = 1;
const ICONIC_STATE: u32 = 3;

/// Longest property we read, in 32 bit units
const MAX_PROPERTY_LEN: u32 = 1024;

#[derive(Debug, Copy, Clone)]
struct Cursors {
    normal: Cursor,
    moving: Cursor,
    resizing: Cursor,
}

impl Cursors {
    fn load(conn: &RustConnection, screen_num: usize) -> Result<Self, ReplyOrIdError> {
        let database = resource_manager::new_from_default(conn)?;
        let handle = CursorHandle::new(conn, screen_num, &database)?.reply()?;
        Ok(Self {
            normal: handle.load_cursor(conn, "left_ptr")?,
            moving: handle.load_cursor(conn, "fleur")?,
            resizing: handle.load_cursor(conn, "bottom_right_corner")?,
        })
    }

    fn free(&self, conn: &RustConnection) -> Result<(), ConnectionError> {
        for cursor in [self.normal, self.moving, self.resizing] {
            conn.free_cursor(cursor)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct WMState<'a> {
    pub(crate) conn: &'a RustConnection,
    pub(crate) config: Config,
    root: Window,
    depth: u8,
    pub(crate) running: bool,
    pub(crate) model: Model,
    atoms: Atoms,
    keyboard: KeyboardMapping,
    keys: Vec<KeyBinding>,
    buttons: Vec<ButtonBinding>,
    cursors: Cursors,
    /// Holds `_NET_SUPPORTING_WM_CHECK`
    wm_check: Window,
    /// Root window name, drawn in the logo zone
    status: String,
    panels: [String; PANEL_COUNT],
    painter: BarPainter,
    background: Box<dyn BackgroundSource>,
    /// The pixmap behind the root window, `NONE` before the first paint
    root_pixmap: Pixmap,
    utc_offset: UtcOffset,
    /// Events read while looking for something else, handled before new ones
    pending: VecDeque<Event>,
    /// Monitor the pointer was last seen on
    motion_monitor: Option<usize>,
    pub(crate) volume: Option<Latest<Volume>>,
    pub(crate) input_method: Option<Latest<String>>,
}

impl<'a> WMState<'a> {
    /// Take over the screen: create every X resource we need and publish what we support
    pub(crate) fn new(
        conn: &'a RustConnection,
        screen_num: usize,
        config: Config,
        utc_offset: UtcOffset,
    ) -> Result<Self, ReplyOrIdError> {
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let depth = screen.root_depth;
        let screen_rect = Rect::new(
            0,
            0,
            screen.width_in_pixels as i32,
            screen.height_in_pixels as i32,
        );

        let atoms = Atoms::new(conn)?.reply()?;
        let painter = BarPainter::new(conn, root, depth, &config.font)?;
        let bar_height = painter.bar_height(screen_rect.height, config.bar_height_ratio);
        log::debug!("Bar height is {}", bar_height);

        let settings = MonitorSettings {
            mfact: config.mfact,
            nmaster: config.nmaster,
            show_bar: config.show_bar,
            top_bar: config.top_bar,
            panels: BarPanels {
                volume: config.volume_panel,
                input_method: config.input_method_panel,
            },
        };
        let outputs = monitors::query_outputs(conn, root, screen_rect)?;
        let model = Model::new(
            screen_rect,
            &outputs,
            settings,
            config.tags.len(),
            bar_height,
        );

        let modkey = u16::from(config.mod_key);
        let background: Box<dyn BackgroundSource> = match &config.background {
            Some(path) => match ImageFill::open(path) {
                Ok(image) => Box::new(image),
                Err(e) => {
                    log::warn!("Can't use {:?} as background: {}", path, e);
                    Box::new(SolidFill(config.background_color))
                }
            },
            None => Box::new(SolidFill(config.background_color)),
        };

        let mut state = Self {
            conn,
            keyboard: KeyboardMapping::query(conn)?,
            keys: key_bindings(modkey, config.tags.len()),
            buttons: button_bindings(modkey),
            cursors: Cursors::load(conn, screen_num)?,
            config,
            root,
            depth,
            running: true,
            model,
            atoms,
            wm_check: NONE,
            status: String::from(WM_NAME),
            panels: Default::default(),
            painter,
            background,
            root_pixmap: NONE,
            utc_offset,
            pending: VecDeque::new(),
            motion_monitor: None,
            volume: None,
            input_method: None,
        };
        state.setup()?;
        Ok(state)
    }

    fn setup(&mut self) -> Result<(), ReplyOrIdError> {
        let attrs = ChangeWindowAttributesAux::new()
            .cursor(self.cursors.normal)
            .event_mask(root_event_mask());
        self.conn.change_window_attributes(self.root, &attrs)?;
        if monitors::has_randr(self.conn)? {
            self.conn
                .randr_select_input(self.root, x11rb::protocol::randr::NotifyMask::SCREEN_CHANGE)?;
        }

        // EWMH: a child window proves we are alive
        self.wm_check = self.conn.generate_id()?;
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            self.wm_check,
            self.root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new(),
        )?;
        for window in [self.wm_check, self.root] {
            self.conn.change_property32(
                PropMode::REPLACE,
                window,
                self.atoms._NET_SUPPORTING_WM_CHECK,
                AtomEnum::WINDOW,
                &[self.wm_check],
            )?;
        }
        self.conn.change_property8(
            PropMode::REPLACE,
            self.wm_check,
            self.atoms._NET_WM_NAME,
            self.atoms.UTF8_STRING,
            WM_NAME.as_bytes(),
        )?;
        self.conn.change_property32(
            PropMode::REPLACE,
            self.root,
            self.atoms._NET_SUPPORTED,
            AtomEnum::ATOM,
            &self.atoms.supported(),
        )?;
        self.conn
            .delete_property(self.root, self.atoms._NET_CLIENT_LIST)?;

        self.update_bars()?;
        self.update_status()?;
        for panel in 0..PANEL_COUNT {
            self.update_panel(panel)?;
        }
        self.grab_keys()?;
        self.paint_background()?;
        self.focus(None)?;
        Ok(())
    }

    /// Manage windows that existed before we started. Transients go last so their parent is known
    pub fn scan_windows(&mut self) -> Result<(), ReplyOrIdError> {
        let tree = self.conn.query_tree(self.root)?.reply()?;

        // Bunch request the attributes of each window
        let mut cookies = Vec::with_capacity(tree.children.len());
        for win in tree.children {
            let attr = self.conn.get_window_attributes(win)?;
            let state = self.conn.get_property(
                false,
                win,
                self.atoms.WM_STATE,
                self.atoms.WM_STATE,
                0,
                2,
            )?;
            let transient = self.conn.get_property(
                false,
                win,
                AtomEnum::WM_TRANSIENT_FOR,
                AtomEnum::WINDOW,
                0,
                1,
            )?;
            cookies.push((win, attr, state, transient));
        }

        let mut normal = Vec::new();
        let mut transients = Vec::new();
        for (win, attr, state, transient) in cookies {
            // Just skip windows that are gone already
            let attr = match attr.reply() {
                Ok(attr) => attr,
                Err(_) => continue,
            };
            if attr.override_redirect {
                continue;
            }
            let iconic = state
                .reply()
                .ok()
                .and_then(|s| s.value32().and_then(|mut v| v.next()))
                == Some(ICONIC_STATE);
            if attr.map_state != MapState::VIEWABLE && !iconic {
                continue;
            }
            let is_transient = transient
                .reply()
                .ok()
                .and_then(|t| t.value32().and_then(|mut v| v.next()))
                .map_or(false, |parent| parent != NONE);
            if is_transient {
                transients.push(win);
            } else {
                normal.push(win);
            }
        }

        for win in normal.into_iter().chain(transients) {
            if let Some(geometry) = ignore_vanished(self.conn.get_geometry(win)?.reply())? {
                self.manage(win, &geometry)?;
            }
        }
        Ok(())
    }

    /// Start managing `window`
    fn manage(&mut self, window: Window, geometry: &GetGeometryReply) -> Result<(), ReplyOrIdError> {
        let rect = Rect::new(
            geometry.x as i32,
            geometry.y as i32,
            geometry.width as i32,
            geometry.height as i32,
        );
        let mut client = Client::new(
            window,
            rect,
            self.config.border_width as i32,
            self.model.selmon,
        );
        client.old_border = geometry.border_width as i32;
        client.name = self.window_title(window)?;

        let transient_for = self.transient_for(window)?;
        match transient_for.and_then(|parent| self.model.find_by_window(parent)) {
            Some(parent) => {
                let parent = &self.model.clients[parent];
                client.monitor = parent.monitor;
                client.tags = parent.tags;
            }
            None => {
                let (instance, class) = match WmClass::get(self.conn, window)?.reply()? {
                    Some(wm_class) => (
                        String::from_utf8_lossy(wm_class.instance()).into_owned(),
                        String::from_utf8_lossy(wm_class.class()).into_owned(),
                    ),
                    None => (String::from(BROKEN), String::from(BROKEN)),
                };
                let outcome = apply_rules(&self.config.rules, &class, &instance, &client.name);
                client.floating = outcome.floating;
                if let Some(mon) = outcome.monitor.filter(|&m| m < self.model.monitors.len()) {
                    client.monitor = mon;
                }
                client.tags = self.model.initial_tags(client.monitor, outcome.tags);
            }
        }
        self.model.fit_into_work_area(&mut client);

        let (fullscreen, dialog) = self.window_type(window)?;
        if dialog {
            client.floating = true;
        }
        if let Some(hints) = WmSizeHints::get_normal_hints(self.conn, window)?.reply()? {
            client.set_hints(SizeHints::from_wm(&hints));
        } else {
            client.set_hints(SizeHints::default());
        }
        if let Some(hints) = WmHints::get(self.conn, window)?.reply()? {
            client.urgent = hints.urgent;
            client.never_focus = hints.input == Some(false);
        }
        if !client.floating {
            client.floating = transient_for.is_some() || client.is_fixed;
        }
        client.old_floating = client.floating;
        log::debug!("Managing {:#x} ({:?}) on monitor {}", window, client.name, client.monitor);

        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new().border_width(client.border as u32),
        )?;
        let attrs = ChangeWindowAttributesAux::new()
            .border_pixel(self.config.normal_border_color.pixel(self.depth))
            .event_mask(client_event_mask());
        self.conn.change_window_attributes(window, &attrs)?;
        self.grab_buttons(window, false)?;
        if client.floating {
            self.conn
                .configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))?;
        }
        // off screen until it is arranged, so it doesn't flicker
        let parked = client.rect.x + 2 * self.model.screen.width;
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().x(parked))?;

        let mon = client.monitor;
        let id = self.model.add_client(client);
        self.send_configure(id)?;
        self.conn.change_property32(
            PropMode::APPEND,
            self.root,
            self.atoms._NET_CLIENT_LIST,
            AtomEnum::WINDOW,
            &[window],
        )?;
        self.set_client_state(window, NORMAL_STATE)?;
        if fullscreen {
            self.set_fullscreen(id, true)?;
        }

        if mon == self.model.selmon {
            if let Some(sel) = self.model.sel() {
                self.unfocus(sel, false)?;
            }
        }
        self.model.monitors[mon].sel = Some(id);
        self.arrange(Some(mon))?;
        self.conn.map_window(window)?;
        self.focus(None)
    }

    /// Stop managing `id`. A destroyed window can't be touched anymore
    fn unmanage(&mut self, id: ClientId, destroyed: bool) -> Result<(), ReplyOrIdError> {
        let client = match self.model.remove_client(id) {
            Some(client) => client,
            None => return Ok(()),
        };
        log::debug!("Unmanaging {:#x} ({:?})", client.window, client.name);
        if !destroyed {
            self.conn.grab_server()?;
            self.conn.change_window_attributes(
                client.window,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::NO_EVENT),
            )?;
            self.conn.configure_window(
                client.window,
                &ConfigureWindowAux::new().border_width(client.old_border as u32),
            )?;
            self.conn
                .ungrab_button(ButtonIndex::ANY, client.window, ModMask::ANY)?;
            self.set_client_state(client.window, WITHDRAWN_STATE)?;
            self.conn.ungrab_server()?;
        }
        self.focus(None)?;
        self.update_client_list()?;
        self.arrange(Some(client.monitor))
    }

    /// The next event to handle, `None` if there is nothing to do right now
    pub(crate) fn next_event(&mut self) -> Result<Option<Event>, ConnectionError> {
        match self.pending.pop_front() {
            Some(event) => Ok(Some(event)),
            None => self.conn.poll_for_event(),
        }
    }

    /// Handle events from the X server
    pub fn handle_event(&mut self, event: Event) -> Result<(), ReplyOrIdError> {
        match event {
            Event::ButtonPress(event) => self.on_button_press(event)?,
            Event::ClientMessage(event) => self.on_client_message(event)?,
            Event::ConfigureRequest(event) => self.on_configure_request(event)?,
            Event::ConfigureNotify(event) => self.on_configure_notify(event)?,
            Event::DestroyNotify(event) => self.on_destroy_notify(event)?,
            Event::EnterNotify(event) => self.on_enter_notify(event)?,
            Event::Expose(event) => self.on_expose(event)?,
            Event::FocusIn(event) => self.on_focus_in(event)?,
            Event::KeyPress(event) => self.on_key_press(event)?,
            Event::MappingNotify(event) => self.on_mapping_notify(event)?,
            Event::MapRequest(event) => self.on_map_request(event)?,
            Event::MotionNotify(event) => self.on_motion_notify(event)?,
            Event::PropertyNotify(event) => self.on_property_notify(event)?,
            Event::UnmapNotify(event) => self.on_unmap_notify(event)?,
            Event::RandrScreenChangeNotify(_) => self.update_geometry()?,
            _ => {}
        }

        Ok(())
    }

    /// Put every client where its monitor's layout wants it, and restack
    pub(crate) fn arrange(&mut self, mon: Option<usize>) -> Result<(), ReplyOrIdError> {
        let monitors = match mon {
            Some(mon) => mon..mon + 1,
            None => 0..self.model.monitors.len(),
        };
        for m in monitors.clone() {
            self.show_hide(m)?;
        }
        for m in monitors {
            for (id, rect) in self.model.arrangement(m, self.config.gap as i32) {
                self.resize(id, rect, false)?;
            }
            if mon.is_some() {
                self.restack(m)?;
            }
        }
        Ok(())
    }

    /// Move visible clients into place top down, and the rest off screen bottom up
    fn show_hide(&mut self, mon: usize) -> Result<(), ReplyOrIdError> {
        let stack = self.model.monitors[mon].stack.clone();
        let floating_layout = self.model.monitors[mon].layout().is_floating();
        for &id in &stack {
            if !self.model.is_visible(id) {
                continue;
            }
            let client = &self.model.clients[id];
            self.conn.configure_window(
                client.window,
                &ConfigureWindowAux::new().x(client.rect.x).y(client.rect.y),
            )?;
            if (floating_layout || client.floating) && !client.fullscreen {
                let rect = client.rect;
                self.resize(id, rect, false)?;
            }
        }
        for &id in stack.iter().rev() {
            if self.model.is_visible(id) {
                continue;
            }
            let client = &self.model.clients[id];
            self.conn.configure_window(
                client.window,
                &ConfigureWindowAux::new()
                    .x(-2 * client.outer_width())
                    .y(client.rect.y),
            )?;
        }
        Ok(())
    }

    /// Raise the selection if it floats, and put tiled clients below the bar in focus order
    pub(crate) fn restack(&mut self, mon: usize) -> Result<(), ReplyOrIdError> {
        self.draw_bar(mon)?;
        let monitor = &self.model.monitors[mon];
        let sel = match monitor.sel {
            Some(sel) => sel,
            None => return Ok(()),
        };
        let floating_layout = monitor.layout().is_floating();
        if self.model.clients[sel].floating || floating_layout {
            self.conn.configure_window(
                self.model.clients[sel].window,
                &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
            )?;
        }
        if !floating_layout {
            let mut sibling = monitor.bar_window;
            for &id in &monitor.stack {
                let client = &self.model.clients[id];
                if client.floating || !self.model.is_visible(id) {
                    continue;
                }
                let mut aux = ConfigureWindowAux::new().stack_mode(StackMode::BELOW);
                if sibling != NONE {
                    aux = aux.sibling(sibling);
                }
                self.conn.configure_window(client.window, &aux)?;
                sibling = client.window;
            }
        }
        self.drop_enter_events()
    }

    /// Forget the EnterNotify events caused by moving windows under the pointer
    fn drop_enter_events(&mut self) -> Result<(), ReplyOrIdError> {
        self.conn.get_input_focus()?.reply()?;
        while let Some(event) = self.conn.poll_for_event()? {
            if !matches!(event, Event::EnterNotify(_)) {
                self.pending.push_back(event);
            }
        }
        Ok(())
    }

    /// Resize `id` to `proposed`, after the size hints had their say
    pub(crate) fn resize(
        &mut self,
        id: ClientId,
        proposed: Rect,
        interact: bool,
    ) -> Result<(), ReplyOrIdError> {
        if self.model.clients[id].hints.is_none() {
            self.update_size_hints(id)?;
        }
        let client = &self.model.clients[id];
        let mon = &self.model.monitors[client.monitor];
        let area = HintArea {
            screen: self.model.screen,
            work: mon.work,
            bar_height: self.model.bar_height,
            gap: self.config.gap as i32,
            honor_hints: client.floating || mon.layout().is_floating(),
        };
        let (rect, changed) = apply_size_hints(
            client.rect,
            client.border,
            client.hints.as_ref(),
            proposed,
            interact,
            &area,
        );
        if changed {
            self.model.clients[id].set_rect(rect);
            self.configure_client(id)?;
        }
        Ok(())
    }

    /// Tell the server where the client is, and the client too
    fn configure_client(&self, id: ClientId) -> Result<(), ReplyOrIdError> {
        let client = &self.model.clients[id];
        let aux = ConfigureWindowAux::new()
            .x(client.rect.x)
            .y(client.rect.y)
            .width(client.rect.width.max(1) as u32)
            .height(client.rect.height.max(1) as u32)
            .border_width(client.border as u32);
        self.conn.configure_window(client.window, &aux)?;
        self.send_configure(id)
    }

    /// A synthetic ConfigureNotify, ICCCM 4.1.5
    fn send_configure(&self, id: ClientId) -> Result<(), ReplyOrIdError> {
        let client = &self.model.clients[id];
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: client.window,
            window: client.window,
            above_sibling: NONE,
            x: client.rect.x as i16,
            y: client.rect.y as i16,
            width: client.rect.width.max(1) as u16,
            height: client.rect.height.max(1) as u16,
            border_width: client.border as u16,
            override_redirect: false,
        };
        self.conn
            .send_event(false, client.window, EventMask::STRUCTURE_NOTIFY, event)?;
        Ok(())
    }

    /// Give `requested` the focus, or whatever should have it instead
    pub(crate) fn focus(&mut self, requested: Option<ClientId>) -> Result<(), ReplyOrIdError> {
        let was_urgent = self
            .model
            .focus_target(requested)
            .map_or(false, |id| self.model.clients[id].urgent);
        let change = self.model.focus(requested);

        if let Some(prev) = change.unfocused {
            self.unfocus(prev, false)?;
        }
        if let Some(hidden) = change.rehidden {
            self.hide_window(hidden)?;
            self.arrange(Some(self.model.clients[hidden].monitor))?;
        }

        match change.focused {
            Some(id) => {
                let window = self.model.clients[id].window;
                if was_urgent {
                    self.set_urgency_hint(window, false)?;
                }
                self.grab_buttons(window, true)?;
                self.conn.change_window_attributes(
                    window,
                    &ChangeWindowAttributesAux::new()
                        .border_pixel(self.config.focused_border_color.pixel(self.depth)),
                )?;
                self.set_focus(id)?;
            }
            None => {
                self.conn
                    .set_input_focus(InputFocus::POINTER_ROOT, self.root, CURRENT_TIME)?;
                self.conn
                    .delete_property(self.root, self.atoms._NET_ACTIVE_WINDOW)?;
            }
        }
        self.draw_bars()
    }

    pub(crate) fn unfocus(&mut self, id: ClientId, set_focus: bool) -> Result<(), ReplyOrIdError> {
        let window = self.model.clients[id].window;
        self.grab_buttons(window, false)?;
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new()
                .border_pixel(self.config.normal_border_color.pixel(self.depth)),
        )?;
        if set_focus {
            self.conn
                .set_input_focus(InputFocus::POINTER_ROOT, self.root, CURRENT_TIME)?;
            self.conn
                .delete_property(self.root, self.atoms._NET_ACTIVE_WINDOW)?;
        }
        Ok(())
    }

    fn set_focus(&self, id: ClientId) -> Result<(), ReplyOrIdError> {
        let client = &self.model.clients[id];
        if !client.never_focus {
            self.conn
                .set_input_focus(InputFocus::POINTER_ROOT, client.window, CURRENT_TIME)?;
            self.conn.change_property32(
                PropMode::REPLACE,
                self.root,
                self.atoms._NET_ACTIVE_WINDOW,
                AtomEnum::WINDOW,
                &[client.window],
            )?;
        }
        self.send_protocol(client.window, self.atoms.WM_TAKE_FOCUS)?;
        Ok(())
    }

    /// Send `protocol` if the window supports it. Returns whether it does
    fn send_protocol(&self, window: Window, protocol: Atom) -> Result<bool, ReplyOrIdError> {
        let reply = self.conn.get_property(
            false,
            window,
            self.atoms.WM_PROTOCOLS,
            AtomEnum::ATOM,
            0,
            MAX_PROPERTY_LEN,
        )?;
        let supported = match ignore_vanished(reply.reply())? {
            Some(reply) => reply
                .value32()
                .map_or(false, |mut atoms| atoms.any(|a| a == protocol)),
            None => false,
        };
        if supported {
            let event = ClientMessageEvent::new(
                32,
                window,
                self.atoms.WM_PROTOCOLS,
                [protocol, CURRENT_TIME, 0, 0, 0],
            );
            self.conn
                .send_event(false, window, EventMask::NO_EVENT, event)?;
        }
        Ok(supported)
    }

    /// Grab the buttons bound to clients. Unfocused windows get every click, to focus them
    fn grab_buttons(&self, window: Window, focused: bool) -> Result<(), ReplyOrIdError> {
        self.conn
            .ungrab_button(ButtonIndex::ANY, window, ModMask::ANY)?;
        if !focused {
            self.conn.grab_button(
                false,
                window,
                button_mask(),
                GrabMode::SYNC,
                GrabMode::SYNC,
                NONE,
                NONE,
                ButtonIndex::ANY,
                ModMask::ANY,
            )?;
        }
        for binding in self.buttons.iter().filter(|b| b.click == Click::ClientWin) {
            for modifiers in self.lock_combinations() {
                self.conn.grab_button(
                    false,
                    window,
                    button_mask(),
                    GrabMode::ASYNC,
                    GrabMode::SYNC,
                    NONE,
                    NONE,
                    ButtonIndex::from(binding.button),
                    ModMask::from(binding.mask | modifiers),
                )?;
            }
        }
        Ok(())
    }

    fn grab_keys(&self) -> Result<(), ReplyOrIdError> {
        self.conn.ungrab_key(Grab::ANY, self.root, ModMask::ANY)?;
        for binding in &self.keys {
            for keycode in self.keyboard.keycodes(binding.keysym) {
                for modifiers in self.lock_combinations() {
                    self.conn.grab_key(
                        true,
                        self.root,
                        ModMask::from(binding.mask | modifiers),
                        keycode,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Bindings work the same with caps lock and num lock on
    fn lock_combinations(&self) -> [u16; 4] {
        let lock = u16::from(ModMask::LOCK);
        let numlock = self.keyboard.numlock;
        [0, lock, numlock, numlock | lock]
    }

    fn set_client_state(&self, window: Window, state: u32) -> Result<(), ConnectionError> {
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.WM_STATE,
            self.atoms.WM_STATE,
            &[state, NONE],
        )?;
        Ok(())
    }

    /// Unmap without hearing about it, the client stays managed
    fn hide_window(&self, id: ClientId) -> Result<(), ReplyOrIdError> {
        let window = self.model.clients[id].window;
        self.conn.grab_server()?;
        self.conn.change_window_attributes(
            self.root,
            &ChangeWindowAttributesAux::new()
                .event_mask(mask_without(root_event_mask(), EventMask::SUBSTRUCTURE_NOTIFY)),
        )?;
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new()
                .event_mask(mask_without(client_event_mask(), EventMask::STRUCTURE_NOTIFY)),
        )?;
        self.conn.unmap_window(window)?;
        self.set_client_state(window, ICONIC_STATE)?;
        self.conn.change_window_attributes(
            self.root,
            &ChangeWindowAttributesAux::new().event_mask(root_event_mask()),
        )?;
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(client_event_mask()),
        )?;
        self.conn.ungrab_server()?;
        Ok(())
    }

    fn show_window(&self, id: ClientId) -> Result<(), ReplyOrIdError> {
        let window = self.model.clients[id].window;
        self.conn.map_window(window)?;
        self.set_client_state(window, NORMAL_STATE)?;
        Ok(())
    }

    pub(crate) fn set_fullscreen(&mut self, id: ClientId, fullscreen: bool) -> Result<(), ReplyOrIdError> {
        if !self.model.set_fullscreen(id, fullscreen) {
            return Ok(());
        }
        let window = self.model.clients[id].window;
        let state: &[Atom] = if fullscreen {
            &[self.atoms._NET_WM_STATE_FULLSCREEN]
        } else {
            &[]
        };
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms._NET_WM_STATE,
            AtomEnum::ATOM,
            state,
        )?;
        self.configure_client(id)?;
        if fullscreen {
            self.conn
                .configure_window(window, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))?;
        } else {
            self.arrange(Some(self.model.clients[id].monitor))?;
        }
        Ok(())
    }

    /// Set or clear the urgency of `id`, on our side and in its WM_HINTS
    pub(crate) fn set_urgent(&mut self, id: ClientId, urgent: bool) -> Result<(), ReplyOrIdError> {
        self.model.clients[id].urgent = urgent;
        self.set_urgency_hint(self.model.clients[id].window, urgent)
    }

    fn set_urgency_hint(&self, window: Window, urgent: bool) -> Result<(), ReplyOrIdError> {
        if let Some(mut hints) = ignore_vanished(WmHints::get(self.conn, window)?.reply())?.flatten()
        {
            hints.urgent = urgent;
            hints.set(self.conn, window)?;
        }
        Ok(())
    }

    fn update_size_hints(&mut self, id: ClientId) -> Result<(), ReplyOrIdError> {
        let window = self.model.clients[id].window;
        let hints = ignore_vanished(WmSizeHints::get_normal_hints(self.conn, window)?.reply())?
            .flatten()
            .map(|hints| SizeHints::from_wm(&hints))
            .unwrap_or_default();
        self.model.clients[id].set_hints(hints);
        Ok(())
    }

    fn update_wm_hints(&mut self, id: ClientId) -> Result<(), ReplyOrIdError> {
        let window = self.model.clients[id].window;
        let mut hints = match ignore_vanished(WmHints::get(self.conn, window)?.reply())?.flatten() {
            Some(hints) => hints,
            None => return Ok(()),
        };
        if Some(id) == self.model.sel() && hints.urgent {
            hints.urgent = false;
            hints.set(self.conn, window)?;
        } else {
            self.model.clients[id].urgent = hints.urgent;
        }
        self.model.clients[id].never_focus = hints.input == Some(false);
        Ok(())
    }

    /// `(fullscreen, dialog)` from the EWMH properties of `window`
    fn window_type(&self, window: Window) -> Result<(bool, bool), ReplyOrIdError> {
        let state = self.atom_property(window, self.atoms._NET_WM_STATE)?;
        let kind = self.atom_property(window, self.atoms._NET_WM_WINDOW_TYPE)?;
        Ok((
            state == Some(self.atoms._NET_WM_STATE_FULLSCREEN),
            kind == Some(self.atoms._NET_WM_WINDOW_TYPE_DIALOG),
        ))
    }

    fn update_window_type(&mut self, id: ClientId) -> Result<(), ReplyOrIdError> {
        let (fullscreen, dialog) = self.window_type(self.model.clients[id].window)?;
        if fullscreen {
            self.set_fullscreen(id, true)?;
        }
        if dialog {
            self.model.clients[id].floating = true;
        }
        Ok(())
    }

    fn atom_property(&self, window: Window, property: Atom) -> Result<Option<Atom>, ReplyOrIdError> {
        let reply = self
            .conn
            .get_property(false, window, property, AtomEnum::ATOM, 0, 1)?;
        Ok(ignore_vanished(reply.reply())?
            .and_then(|reply| reply.value32().and_then(|mut values| values.next())))
    }

    fn transient_for(&self, window: Window) -> Result<Option<Window>, ReplyOrIdError> {
        let reply = self.conn.get_property(
            false,
            window,
            AtomEnum::WM_TRANSIENT_FOR,
            AtomEnum::WINDOW,
            0,
            1,
        )?;
        Ok(ignore_vanished(reply.reply())?
            .and_then(|reply| reply.value32().and_then(|mut values| values.next()))
            .filter(|&parent| parent != NONE))
    }

    fn text_property(&self, window: Window, property: Atom) -> Result<String, ReplyError> {
        let reply = self.conn.get_property(
            false,
            window,
            property,
            AtomEnum::ANY,
            0,
            MAX_PROPERTY_LEN,
        )?;
        Ok(ignore_vanished(reply.reply())?
            .map(|reply| text_from_property(&reply.value))
            .unwrap_or_default())
    }

    /// `_NET_WM_NAME`, falling back to `WM_NAME`
    fn window_title(&self, window: Window) -> Result<String, ReplyError> {
        let mut title = self.text_property(window, self.atoms._NET_WM_NAME)?;
        if title.is_empty() {
            title = self.text_property(window, AtomEnum::WM_NAME.into())?;
        }
        if title.is_empty() {
            title = String::from(BROKEN);
        }
        Ok(title)
    }

    /// Read the status text from the name of the root window
    fn update_status(&mut self) -> Result<(), ReplyOrIdError> {
        let status = self.text_property(self.root, AtomEnum::WM_NAME.into())?;
        self.status = if status.is_empty() {
            String::from(WM_NAME)
        } else {
            status
        };
        self.draw_bars()
    }

    fn update_panel(&mut self, panel: usize) -> Result<(), ReplyOrIdError> {
        let atom = match panel {
            0 => self.atoms.ZWM_PANEL0_TEXT,
            1 => self.atoms.ZWM_PANEL1_TEXT,
            _ => self.atoms.ZWM_PANEL2_TEXT,
        };
        let text = self.text_property(self.root, atom)?;
        log::debug!("Panel {} text is now {:?}", panel, text);
        self.panels[panel] = text;
        self.draw_bars()
    }

    fn update_client_list(&self) -> Result<(), ConnectionError> {
        self.conn
            .delete_property(self.root, self.atoms._NET_CLIENT_LIST)?;
        for window in self.model.client_windows() {
            self.conn.change_property32(
                PropMode::APPEND,
                self.root,
                self.atoms._NET_CLIENT_LIST,
                AtomEnum::WINDOW,
                &[window],
            )?;
        }
        Ok(())
    }

    /// Undo everything we did to the server. Runs once, after the event loop stops
    pub(crate) fn teardown(&mut self) -> Result<(), ReplyOrIdError> {
        log::info!("Cleaning up");
        for id in self.model.release_all() {
            self.show_window(id)?;
        }
        let ids: Vec<ClientId> = self
            .model
            .monitors
            .iter()
            .flat_map(|m| m.stack.iter().copied())
            .collect();
        for id in ids {
            self.unmanage(id, false)?;
        }

        self.conn.ungrab_key(Grab::ANY, self.root, ModMask::ANY)?;
        for mon in &self.model.monitors {
            if mon.bar_window != NONE {
                self.conn.unmap_window(mon.bar_window)?;
                self.conn.destroy_window(mon.bar_window)?;
            }
        }
        self.painter.free(self.conn)?;
        self.cursors.free(self.conn)?;
        if self.root_pixmap != NONE {
            self.conn.free_pixmap(self.root_pixmap)?;
        }
        self.conn.destroy_window(self.wm_check)?;
        self.conn
            .set_input_focus(
                InputFocus::POINTER_ROOT,
                u32::from(InputFocus::POINTER_ROOT),
                CURRENT_TIME,
            )?;
        self.conn
            .delete_property(self.root, self.atoms._NET_ACTIVE_WINDOW)?;
        self.conn.flush()?;
        Ok(())
    }
}
