//! Clients and monitors, without anything X specific.
//!
//! Everything here is decided without talking to the server, `WMState` then makes the server
//! agree with it
use slotmap::SlotMap;
use x11rb::protocol::xproto::Window;

use crate::{
    layouts::{place, LayoutKind},
    rect::Rect,
    states::{Client, ClientId, Monitor, MonitorSettings},
    tags::TagMask,
};

/// What `Model::focus` changed
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub(crate) struct FocusChange {
    /// Lost focus
    pub(crate) unfocused: Option<ClientId>,
    /// Has focus now, `None` means the root window gets it
    pub(crate) focused: Option<ClientId>,
    /// Was only revealed while focused and is hidden again
    pub(crate) rehidden: Option<ClientId>,
}

/// What `Model::update_geometry` changed
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct GeometryUpdate {
    pub(crate) dirty: bool,
    /// Bar windows of monitors that are gone
    pub(crate) removed_bars: Vec<Window>,
    /// Clients a removed monitor had revealed, hidden again
    pub(crate) rehidden: Vec<ClientId>,
}

#[derive(Debug)]
pub(crate) struct Model {
    pub(crate) clients: SlotMap<ClientId, Client>,
    /// Never empty
    pub(crate) monitors: Vec<Monitor>,
    pub(crate) selmon: usize,
    pub(crate) tag_count: usize,
    pub(crate) bar_height: i32,
    /// The root window
    pub(crate) screen: Rect,
    pub(crate) settings: MonitorSettings,
}

impl Model {
    pub(crate) fn new(
        screen: Rect,
        outputs: &[Rect],
        settings: MonitorSettings,
        tag_count: usize,
        bar_height: i32,
    ) -> Self {
        let mut model = Self {
            clients: SlotMap::with_key(),
            monitors: Vec::new(),
            selmon: 0,
            tag_count,
            bar_height,
            screen,
            settings,
        };
        model.update_geometry(screen, outputs);
        model
    }

    pub(crate) fn selmon(&self) -> &Monitor {
        &self.monitors[self.selmon]
    }

    pub(crate) fn sel(&self) -> Option<ClientId> {
        self.selmon().sel
    }

    pub(crate) fn find_by_window(&self, window: Window) -> Option<ClientId> {
        self.clients
            .iter()
            .find(|(_, c)| c.window == window)
            .map(|(id, _)| id)
    }

    /// The monitor whose bar is `window`
    pub(crate) fn bar_owner(&self, window: Window) -> Option<usize> {
        if window == x11rb::NONE {
            return None;
        }
        self.monitors.iter().position(|m| m.bar_window == window)
    }

    /// On one of the tags its monitor shows. Hidden clients can be visible too
    pub(crate) fn is_visible(&self, id: ClientId) -> bool {
        let client = &self.clients[id];
        client
            .tags
            .intersects(self.monitors[client.monitor].active_tags())
    }

    /// Clients that take part in the layout of `mon`, in list order
    pub(crate) fn tiled(&self, mon: usize) -> Vec<ClientId> {
        self.monitors[mon]
            .clients
            .iter()
            .copied()
            .filter(|&id| {
                let c = &self.clients[id];
                !c.floating && !c.hidden && self.is_visible(id)
            })
            .collect()
    }

    /// Clients listed on the bar of `mon`
    pub(crate) fn bar_windows(&self, mon: usize) -> Vec<ClientId> {
        self.monitors[mon]
            .clients
            .iter()
            .copied()
            .filter(|&id| self.is_visible(id))
            .collect()
    }

    /// Every managed window, monitor by monitor
    pub(crate) fn client_windows(&self) -> Vec<Window> {
        self.monitors
            .iter()
            .flat_map(|m| m.clients.iter().map(|&id| self.clients[id].window))
            .collect()
    }

    pub(crate) fn attach(&mut self, id: ClientId) {
        let mon = self.clients[id].monitor;
        self.monitors[mon].clients.insert(0, id);
    }

    pub(crate) fn detach(&mut self, id: ClientId) {
        let mon = self.clients[id].monitor;
        self.monitors[mon].clients.retain(|&c| c != id);
    }

    pub(crate) fn attach_stack(&mut self, id: ClientId) {
        let mon = self.clients[id].monitor;
        self.monitors[mon].stack.insert(0, id);
    }

    /// Also picks a new selection for the monitor if `id` was selected
    pub(crate) fn detach_stack(&mut self, id: ClientId) {
        let mon = self.clients[id].monitor;
        self.monitors[mon].stack.retain(|&c| c != id);
        if self.monitors[mon].sel == Some(id) {
            let sel = self.monitors[mon]
                .stack
                .iter()
                .copied()
                .find(|&c| self.is_visible(c) && !self.clients[c].hidden);
            self.monitors[mon].sel = sel;
        }
    }

    /// Start tracking `client`, at the head of both lists of its monitor
    pub(crate) fn add_client(&mut self, client: Client) -> ClientId {
        let id = self.clients.insert(client);
        self.attach(id);
        self.attach_stack(id);
        id
    }

    pub(crate) fn remove_client(&mut self, id: ClientId) -> Option<Client> {
        if !self.clients.contains_key(id) {
            return None;
        }
        self.detach(id);
        self.detach_stack(id);
        let mon = self.clients[id].monitor;
        if self.monitors[mon].revealed == Some(id) {
            self.monitors[mon].revealed = None;
        }
        self.clients.remove(id)
    }

    /// Move a new client inside the work area of its monitor, as far as it fits
    pub(crate) fn fit_into_work_area(&self, client: &mut Client) {
        let work = self.monitors[client.monitor].work;
        if client.rect.x + client.outer_width() > work.right() {
            client.rect.x = work.right() - client.outer_width();
        }
        if client.rect.y + client.outer_height() > work.bottom() {
            client.rect.y = work.bottom() - client.outer_height();
        }
        client.rect.x = client.rect.x.max(work.x);
        client.rect.y = client.rect.y.max(work.y);
    }

    /// Tags for a new client on `mon`, the ones the rules gave it or what the monitor shows
    pub(crate) fn initial_tags(&self, mon: usize, from_rules: TagMask) -> TagMask {
        let tags = from_rules.masked(self.tag_count);
        if tags.is_empty() {
            self.monitors[mon].active_tags()
        } else {
            tags
        }
    }

    /// Returns false if `mask` has no valid tag
    pub(crate) fn set_tags(&mut self, id: ClientId, mask: TagMask) -> bool {
        let mask = mask.masked(self.tag_count);
        if mask.is_empty() {
            return false;
        }
        self.clients[id].tags = mask;
        true
    }

    /// `requested` if it can get focus, otherwise the most recently focused shown client
    pub(crate) fn focus_target(&self, requested: Option<ClientId>) -> Option<ClientId> {
        requested
            .filter(|&id| self.clients.contains_key(id) && self.is_visible(id))
            .or_else(|| {
                self.selmon()
                    .stack
                    .iter()
                    .copied()
                    .find(|&id| self.is_visible(id) && !self.clients[id].hidden)
            })
    }

    pub(crate) fn focus(&mut self, requested: Option<ClientId>) -> FocusChange {
        let target = self.focus_target(requested);
        let mut change = FocusChange {
            focused: target,
            ..FocusChange::default()
        };

        let mon = &mut self.monitors[self.selmon];
        if let Some(prev) = mon.sel.filter(|&p| Some(p) != target) {
            change.unfocused = Some(prev);
            if mon.revealed == Some(prev) {
                mon.revealed = None;
                change.rehidden = Some(prev);
            }
        }
        if let Some(client) = change.rehidden.and_then(|id| self.clients.get_mut(id)) {
            client.hidden = true;
        }

        match target {
            Some(id) => {
                self.selmon = self.clients[id].monitor;
                self.clients[id].urgent = false;
                self.detach_stack(id);
                self.attach_stack(id);
                self.monitors[self.selmon].sel = Some(id);
            }
            None => self.monitors[self.selmon].sel = None,
        }
        change
    }

    /// The client after (or before) the selected one, in list order.
    ///
    /// Nothing moves while the selection is fullscreen
    pub(crate) fn cycle_target(&self, forward: bool, include_hidden: bool) -> Option<ClientId> {
        let mon = self.selmon();
        let sel = mon.sel;
        if sel.is_none() && !include_hidden {
            return None;
        }
        if sel.map_or(false, |s| self.clients[s].fullscreen) {
            return None;
        }

        let candidate = |id: ClientId| self.is_visible(id) && (include_hidden || !self.clients[id].hidden);
        let all = || mon.clients.iter().copied();
        let pos = sel.and_then(|s| mon.clients.iter().position(|&c| c == s));
        let target = match (forward, pos) {
            (true, Some(p)) => mon.clients[p + 1..]
                .iter()
                .copied()
                .find(|&c| candidate(c))
                .or_else(|| all().find(|&c| candidate(c))),
            (true, None) => all().find(|&c| candidate(c)),
            (false, Some(p)) => mon.clients[..p]
                .iter()
                .copied()
                .rev()
                .find(|&c| candidate(c))
                .or_else(|| all().rev().find(|&c| candidate(c))),
            (false, None) => all().rev().find(|&c| candidate(c)),
        };
        target.filter(|&t| Some(t) != sel)
    }

    /// The client that should become the master, `None` if nothing should happen
    pub(crate) fn zoom_target(&self) -> Option<ClientId> {
        let mon = self.selmon();
        let sel = mon.sel?;
        if mon.layout().is_floating() || self.clients[sel].floating {
            return None;
        }
        let tiled = self.tiled(self.selmon);
        if tiled.first() == Some(&sel) {
            tiled.get(1).copied()
        } else {
            Some(sel)
        }
    }

    /// Move to the head of the client list
    pub(crate) fn pop(&mut self, id: ClientId) {
        self.detach(id);
        self.attach(id);
    }

    pub(crate) fn hide(&mut self, id: ClientId) -> bool {
        let client = &mut self.clients[id];
        if client.hidden {
            return false;
        }
        client.hidden = true;
        let mon = client.monitor;
        if self.monitors[mon].revealed == Some(id) {
            self.monitors[mon].revealed = None;
        }
        true
    }

    pub(crate) fn show(&mut self, id: ClientId) -> bool {
        let client = &mut self.clients[id];
        if !client.hidden {
            return false;
        }
        client.hidden = false;
        true
    }

    /// Show every hidden client `mon` shows, returns them
    pub(crate) fn show_all(&mut self, mon: usize) -> Vec<ClientId> {
        self.monitors[mon].revealed = None;
        let hidden: Vec<_> = self.monitors[mon]
            .clients
            .iter()
            .copied()
            .filter(|&id| self.clients[id].hidden && self.is_visible(id))
            .collect();
        for &id in &hidden {
            self.clients[id].hidden = false;
        }
        hidden
    }

    /// Every tag on every monitor, floating, nothing hidden. Returns the clients that were hidden
    pub(crate) fn release_all(&mut self) -> Vec<ClientId> {
        let all = TagMask::all(self.tag_count);
        let mut shown = Vec::new();
        for mon in 0..self.monitors.len() {
            self.selmon = mon;
            self.view(all);
            self.set_layout(Some(LayoutKind::Floating));
            shown.extend(self.show_all(mon));
        }
        shown
    }

    pub(crate) fn view(&mut self, mask: TagMask) -> bool {
        let mask = mask.masked(self.tag_count);
        self.monitors[self.selmon].tagset.view(mask)
    }

    pub(crate) fn toggle_view(&mut self, mask: TagMask) -> bool {
        let mask = mask.masked(self.tag_count);
        self.monitors[self.selmon].tagset.toggle(mask)
    }

    /// Put the selected client on exactly `mask`
    pub(crate) fn tag(&mut self, mask: TagMask) -> bool {
        match self.sel() {
            Some(id) => self.set_tags(id, mask),
            None => false,
        }
    }

    pub(crate) fn toggle_tag(&mut self, mask: TagMask) -> bool {
        match self.sel() {
            Some(id) => {
                let tags = self.clients[id].tags ^ mask.masked(self.tag_count);
                self.set_tags(id, tags)
            }
            None => false,
        }
    }

    /// Switch to `kind`, or back to the previous layout for `None` or the current one
    pub(crate) fn set_layout(&mut self, kind: Option<LayoutKind>) {
        let mon = &mut self.monitors[self.selmon];
        if kind != Some(mon.layout()) {
            mon.selected_layout ^= 1;
        }
        if let Some(kind) = kind {
            mon.layouts[mon.selected_layout] = kind;
        }
    }

    /// Values below 1.0 are added to the current factor, others set it to `f - 1.0`
    pub(crate) fn set_mfact(&mut self, f: f64) -> bool {
        let mon = &mut self.monitors[self.selmon];
        if mon.layout().is_floating() {
            return false;
        }
        let f = if f < 1.0 { f + mon.mfact } else { f - 1.0 };
        if !(0.05..=0.95).contains(&f) {
            return false;
        }
        mon.mfact = f;
        true
    }

    pub(crate) fn inc_nmaster(&mut self, inc: i32) {
        let mon = &mut self.monitors[self.selmon];
        mon.nmaster = (mon.nmaster as i32 + inc).max(0) as u32;
    }

    pub(crate) fn toggle_bar(&mut self) {
        let bar_height = self.bar_height;
        let mon = &mut self.monitors[self.selmon];
        mon.show_bar = !mon.show_bar;
        mon.update_bar_position(bar_height);
    }

    /// Fixed size clients always float. Fullscreen clients are left alone
    pub(crate) fn toggle_floating(&mut self, id: ClientId) -> bool {
        let client = &mut self.clients[id];
        if client.fullscreen {
            return false;
        }
        client.floating = !client.floating || client.is_fixed;
        true
    }

    pub(crate) fn set_fullscreen(&mut self, id: ClientId, fullscreen: bool) -> bool {
        let monitor = self.monitors[self.clients[id].monitor].rect;
        let client = &mut self.clients[id];
        if fullscreen {
            client.enter_fullscreen(monitor)
        } else {
            client.leave_fullscreen()
        }
    }

    /// Move `id` to monitor `target`, onto the tags it shows
    pub(crate) fn send_to_monitor(&mut self, id: ClientId, target: usize) -> bool {
        if self.clients[id].monitor == target || target >= self.monitors.len() {
            return false;
        }
        self.detach(id);
        self.detach_stack(id);
        let old = self.clients[id].monitor;
        if self.monitors[old].revealed == Some(id) {
            self.monitors[old].revealed = None;
        }
        self.clients[id].monitor = target;
        self.clients[id].tags = self.monitors[target].active_tags();
        self.attach(id);
        self.attach_stack(id);
        true
    }

    /// The monitor `dir` steps away from the selected one, wrapping around
    pub(crate) fn dir_to_monitor(&self, dir: i32) -> usize {
        let n = self.monitors.len() as i32;
        (self.selmon as i32 + dir).rem_euclid(n) as usize
    }

    /// The monitor `rect` overlaps the most, the selected one if it overlaps none
    pub(crate) fn rect_to_monitor(&self, rect: Rect) -> usize {
        let mut best = (self.selmon, 0);
        for (i, mon) in self.monitors.iter().enumerate() {
            let area = mon.work.intersection_area(&rect);
            if area > best.1 {
                best = (i, area);
            }
        }
        best.0
    }

    pub(crate) fn monitor_at(&self, x: i32, y: i32) -> usize {
        self.rect_to_monitor(Rect::new(x, y, 1, 1))
    }

    /// After a drag, move the client to the monitor it ended up on. Returns the new monitor
    pub(crate) fn reassign_by_position(&mut self, id: ClientId) -> Option<usize> {
        let target = self.rect_to_monitor(self.clients[id].rect);
        if !self.send_to_monitor(id, target) {
            return None;
        }
        self.selmon = target;
        Some(target)
    }

    /// Make the monitors match `outputs`.
    ///
    /// Identical outputs count once. Clients of monitors that are gone move to the first one
    pub(crate) fn update_geometry(&mut self, screen: Rect, outputs: &[Rect]) -> GeometryUpdate {
        self.screen = screen;
        let mut unique: Vec<Rect> = Vec::with_capacity(outputs.len());
        for output in outputs {
            if !unique.contains(output) {
                unique.push(*output);
            }
        }
        if unique.is_empty() {
            unique.push(screen);
        }

        let mut update = GeometryUpdate::default();
        for (i, rect) in unique.iter().enumerate() {
            if i >= self.monitors.len() {
                log::info!("New monitor at {:?}", rect);
                self.monitors.push(Monitor::new(
                    *rect,
                    &self.settings,
                    self.bar_height,
                    self.tag_count,
                ));
                update.dirty = true;
            } else if self.monitors[i].rect != *rect {
                log::info!("Monitor {} moved to {:?}", i, rect);
                let mon = &mut self.monitors[i];
                mon.rect = *rect;
                mon.update_bar_position(self.bar_height);
                mon.update_bar_layout(self.bar_height, self.tag_count);
                update.dirty = true;
            }
        }

        while self.monitors.len() > unique.len() {
            let removed = self.monitors.len() - 1;
            let mon = match self.monitors.pop() {
                Some(mon) => mon,
                None => break,
            };
            log::info!(
                "Monitor {} is gone, moving {} clients",
                removed,
                mon.clients.len()
            );
            // back to front so they keep their order
            for &id in mon.clients.iter().rev() {
                self.clients[id].monitor = 0;
                self.monitors[0].clients.insert(0, id);
            }
            for &id in mon.stack.iter().rev() {
                self.monitors[0].stack.insert(0, id);
            }
            if let Some(id) = mon.revealed {
                self.clients[id].hidden = true;
                update.rehidden.push(id);
            }
            if self.selmon >= self.monitors.len() {
                self.selmon = 0;
            }
            update.removed_bars.push(mon.bar_window);
            update.dirty = true;
        }
        update
    }

    /// Tags with clients on `mon`, and the ones with urgent clients
    pub(crate) fn tag_state(&self, mon: usize) -> (TagMask, TagMask) {
        self.monitors[mon]
            .clients
            .iter()
            .map(|&id| &self.clients[id])
            .fold((TagMask::EMPTY, TagMask::EMPTY), |(occupied, urgent), c| {
                let urgent = if c.urgent { urgent | c.tags } else { urgent };
                (occupied | c.tags, urgent)
            })
    }

    /// Where every tiled client of `mon` goes, nothing for the floating layout
    pub(crate) fn arrangement(&self, mon: usize, gap: i32) -> Vec<(ClientId, Rect)> {
        let m = &self.monitors[mon];
        let tiled = self.tiled(mon);
        let layout = m.layout();
        let cells = match layout.arrange(m.work, tiled.len(), m.nmaster, m.mfact) {
            Some(cells) => cells,
            None => return Vec::new(),
        };
        let borderless = layout.borderless(tiled.len());
        tiled
            .into_iter()
            .zip(cells)
            .map(|(id, cell)| (id, place(cell, self.clients[id].border, gap, borderless)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::BarPanels;

    fn settings() -> MonitorSettings {
        MonitorSettings {
            mfact: 0.55,
            nmaster: 1,
            show_bar: true,
            top_bar: true,
            panels: BarPanels {
                volume: false,
                input_method: false,
            },
        }
    }

    fn model() -> Model {
        Model::new(Rect::new(0, 0, 1280, 800), &[], settings(), 9, 20)
    }

    fn add(model: &mut Model, window: Window) -> ClientId {
        let mut client = Client::new(window, Rect::new(0, 0, 100, 100), 2, model.selmon);
        client.tags = model.initial_tags(model.selmon, TagMask::EMPTY);
        model.add_client(client)
    }

    #[test]
    fn new_clients_go_first() {
        let mut model = model();
        let a = add(&mut model, 1);
        let b = add(&mut model, 2);
        assert_eq!(model.selmon().clients, vec![b, a]);
        assert_eq!(model.find_by_window(1), Some(a));
        assert_eq!(model.client_windows(), vec![2, 1]);
    }

    #[test]
    fn focus_promotes_and_clears_urgency() {
        let mut model = model();
        let a = add(&mut model, 1);
        let b = add(&mut model, 2);
        model.clients[a].urgent = true;

        let change = model.focus(Some(a));
        assert_eq!(change.focused, Some(a));
        assert_eq!(model.selmon().stack, vec![a, b]);
        assert!(!model.clients[a].urgent);

        let change = model.focus(Some(b));
        assert_eq!(change.unfocused, Some(a));
        assert_eq!(model.sel(), Some(b));
    }

    #[test]
    fn invisible_target_falls_back() {
        let mut model = model();
        let a = add(&mut model, 1);
        let b = add(&mut model, 2);
        model.focus(Some(a));
        model.set_tags(b, TagMask::from_bits(0b10));
        assert_eq!(model.focus(Some(b)).focused, Some(a));
    }

    #[test]
    fn removing_the_selection_picks_the_next_in_stack() {
        let mut model = model();
        let a = add(&mut model, 1);
        let b = add(&mut model, 2);
        model.focus(Some(a));
        model.focus(Some(b));
        assert!(model.remove_client(b).is_some());
        assert_eq!(model.sel(), Some(a));
        assert!(model.remove_client(b).is_none());
    }

    #[test]
    fn cycling() {
        let mut model = model();
        let c = add(&mut model, 3);
        let b = add(&mut model, 2);
        let a = add(&mut model, 1);
        // list order is a, b, c
        model.focus(Some(a));
        assert_eq!(model.cycle_target(true, false), Some(b));
        assert_eq!(model.cycle_target(false, false), Some(c));

        model.hide(b);
        assert_eq!(model.cycle_target(true, false), Some(c));
        assert_eq!(model.cycle_target(true, true), Some(b));

        model.clients[a].fullscreen = true;
        assert_eq!(model.cycle_target(true, false), None);
    }

    #[test]
    fn nothing_to_cycle_without_a_selection() {
        let mut model = model();
        let a = add(&mut model, 1);
        model.hide(a);
        model.focus(None);
        assert_eq!(model.sel(), None);
        assert_eq!(model.cycle_target(true, false), None);
        assert_eq!(model.cycle_target(true, true), Some(a));
    }

    #[test]
    fn revealed_client_is_hidden_again_when_focus_leaves() {
        let mut model = model();
        let b = add(&mut model, 2);
        let a = add(&mut model, 1);
        model.focus(Some(a));
        model.hide(b);

        let target = model.cycle_target(true, true).unwrap();
        assert_eq!(target, b);
        model.focus(Some(b));
        model.show(b);
        model.monitors[0].revealed = Some(b);

        let change = model.focus(Some(a));
        assert_eq!(change.rehidden, Some(b));
        assert!(model.clients[b].hidden);
        assert_eq!(model.selmon().revealed, None);
    }

    #[test]
    fn zoom() {
        let mut model = model();
        let b = add(&mut model, 2);
        let a = add(&mut model, 1);
        model.focus(Some(a));
        // already master, swap with the next one
        assert_eq!(model.zoom_target(), Some(b));
        model.focus(Some(b));
        assert_eq!(model.zoom_target(), Some(b));
        model.pop(b);
        assert_eq!(model.selmon().clients, vec![b, a]);

        model.set_layout(Some(LayoutKind::Floating));
        assert_eq!(model.zoom_target(), None);
    }

    #[test]
    fn layouts_toggle_back() {
        let mut model = model();
        model.set_layout(Some(LayoutKind::Monocle));
        assert_eq!(model.selmon().layout(), LayoutKind::Monocle);
        model.set_layout(None);
        assert_eq!(model.selmon().layout(), LayoutKind::Tile);
        model.set_layout(None);
        assert_eq!(model.selmon().layout(), LayoutKind::Monocle);
        // selecting the active layout keeps it
        model.set_layout(Some(LayoutKind::Monocle));
        assert_eq!(model.selmon().layout(), LayoutKind::Monocle);
    }

    #[test]
    fn mfact_limits() {
        let mut model = model();
        assert!(model.set_mfact(0.05));
        assert!((model.selmon().mfact - 0.6).abs() < 1e-9);
        assert!(model.set_mfact(1.3));
        assert!((model.selmon().mfact - 0.3).abs() < 1e-9);
        assert!(!model.set_mfact(-0.3));
        assert!(!model.set_mfact(1.99));
        model.set_layout(Some(LayoutKind::Floating));
        assert!(!model.set_mfact(0.05));
    }

    #[test]
    fn nmaster_stays_positive() {
        let mut model = model();
        model.inc_nmaster(-3);
        assert_eq!(model.selmon().nmaster, 0);
        model.inc_nmaster(2);
        assert_eq!(model.selmon().nmaster, 2);
    }

    #[test]
    fn tags_are_never_empty() {
        let mut model = model();
        let a = add(&mut model, 1);
        model.focus(Some(a));
        assert!(!model.tag(TagMask::EMPTY));
        assert!(!model.tag(TagMask::from_bits(1 << 20)));
        assert!(!model.toggle_tag(TagMask::from_bits(1)));
        assert!(model.toggle_tag(TagMask::from_bits(0b10)));
        assert_eq!(model.clients[a].tags.bits(), 0b11);
        assert!(!model.toggle_view(TagMask::from_bits(1)));
    }

    #[test]
    fn hidden_and_floating_clients_are_not_tiled() {
        let mut model = model();
        let c = add(&mut model, 3);
        let b = add(&mut model, 2);
        let a = add(&mut model, 1);
        model.hide(b);
        model.clients[c].floating = true;
        assert_eq!(model.tiled(0), vec![a]);
        assert_eq!(model.bar_windows(0), vec![a, b, c]);

        let shown = model.show_all(0);
        assert_eq!(shown, vec![b]);
        assert_eq!(model.tiled(0), vec![a, b]);
    }

    #[test]
    fn single_client_fills_the_work_area() {
        let mut model = model();
        let a = add(&mut model, 1);
        let work = model.selmon().work;
        let placed = model.arrangement(0, 9);
        assert_eq!(placed, vec![(a, Rect::new(-2, work.y - 2, work.width, work.height))]);
    }

    #[test]
    fn fullscreen_covers_the_monitor() {
        let mut model = model();
        let a = add(&mut model, 1);
        assert!(model.set_fullscreen(a, true));
        assert_eq!(model.clients[a].rect, model.selmon().rect);
        assert!(!model.toggle_floating(a));
        assert!(model.set_fullscreen(a, false));
        assert_eq!(model.clients[a].rect, Rect::new(0, 0, 100, 100));
    }

    #[test]
    fn fit_new_windows_into_the_work_area() {
        let model = model();
        let mut client = Client::new(1, Rect::new(1250, -10, 100, 100), 2, 0);
        model.fit_into_work_area(&mut client);
        assert_eq!(client.rect.x, 1280 - 104);
        assert_eq!(client.rect.y, 20);
    }

    #[test]
    fn monitor_lookup() {
        let outputs = [Rect::new(0, 0, 1000, 800), Rect::new(1000, 0, 1000, 800)];
        let model = Model::new(Rect::new(0, 0, 2000, 800), &outputs, settings(), 9, 20);
        assert_eq!(model.monitor_at(1500, 400), 1);
        assert_eq!(model.rect_to_monitor(Rect::new(900, 100, 300, 300)), 1);
        assert_eq!(model.rect_to_monitor(Rect::new(5000, 100, 10, 10)), 0);
        assert_eq!(model.dir_to_monitor(1), 1);
        assert_eq!(model.dir_to_monitor(-1), 1);
        assert_eq!(model.dir_to_monitor(2), 0);
    }

    #[test]
    fn duplicated_outputs_are_one_monitor() {
        let outputs = [Rect::new(0, 0, 1000, 800), Rect::new(0, 0, 1000, 800)];
        let model = Model::new(Rect::new(0, 0, 1000, 800), &outputs, settings(), 9, 20);
        assert_eq!(model.monitors.len(), 1);
    }

    #[test]
    fn urgency_and_occupancy() {
        let mut model = model();
        add(&mut model, 1);
        let b = add(&mut model, 2);
        model.set_tags(b, TagMask::from_bits(0b100));
        model.clients[b].urgent = true;
        let (occupied, urgent) = model.tag_state(0);
        assert_eq!(occupied.bits(), 0b101);
        assert_eq!(urgent.bits(), 0b100);
    }
}
