use x11rb::{errors::ReplyOrIdError, protocol::xproto::*};

use crate::{
    command::{Action, Program},
    spawn::{spawn, spawn_shell},
    states::{ClientId, WMState},
};

const VOLUME_STEP: &str = "10%";
const DEFAULT_SINK: &str = "@DEFAULT_AUDIO_SINK@";

impl<'a> WMState<'a> {
    /// Run a bound action. `clicked` is the client whose title was clicked on the bar, if any
    pub(crate) fn handle_action(
        &mut self,
        action: Action,
        clicked: Option<ClientId>,
    ) -> Result<(), ReplyOrIdError> {
        log::debug!("Running {:?}", action);
        let selmon = self.model.selmon;
        match action {
            Action::Spawn(program) => self.spawn_program(program),
            Action::ToggleBar => self.toggle_bar()?,
            Action::FocusStack {
                forward,
                include_hidden,
            } => self.focus_stack(forward, include_hidden)?,
            Action::IncNMaster(inc) => {
                self.model.inc_nmaster(inc);
                self.arrange(Some(selmon))?;
            }
            Action::SetMFact(f) => {
                if self.model.set_mfact(f) {
                    self.arrange(Some(selmon))?;
                }
            }
            Action::Zoom => self.zoom()?,
            Action::View(mask) => {
                if self.model.view(mask) {
                    self.focus(None)?;
                    self.arrange(Some(selmon))?;
                }
            }
            Action::ToggleView(mask) => {
                if self.model.toggle_view(mask) {
                    self.focus(None)?;
                    self.arrange(Some(selmon))?;
                }
            }
            Action::Tag(mask) => {
                if self.model.tag(mask) {
                    self.focus(None)?;
                    self.arrange(Some(selmon))?;
                }
            }
            Action::ToggleTag(mask) => {
                if self.model.toggle_tag(mask) {
                    self.focus(None)?;
                    self.arrange(Some(selmon))?;
                }
            }
            Action::KillClient => self.kill_client()?,
            Action::SetLayout(kind) => {
                self.model.set_layout(kind);
                if self.model.sel().is_some() {
                    self.arrange(Some(selmon))?;
                } else {
                    self.draw_bar(selmon)?;
                }
            }
            Action::ToggleFloating => self.toggle_floating()?,
            Action::FocusMon(dir) => self.focus_monitor(dir)?,
            Action::TagMon(dir) => self.tag_monitor(dir)?,
            Action::ShowAll => self.show_all()?,
            Action::ToggleHide => self.toggle_hide()?,
            Action::ToggleWin => {
                if let Some(id) = clicked.filter(|&id| self.model.clients.contains_key(id)) {
                    self.toggle_win(id)?;
                }
            }
            Action::MoveMouse => self.move_mouse()?,
            Action::ResizeMouse => self.resize_mouse()?,
            Action::Quit => {
                log::info!("Quitting");
                self.running = false;
            }
        }
        Ok(())
    }

    fn spawn_program(&self, program: Program) {
        let result = match program {
            Program::Terminal => spawn_shell(&self.config.terminal),
            Program::Launcher => spawn_shell(&self.config.launcher),
            Program::Lock => spawn_shell(&self.config.lock),
            Program::VolumeUp => spawn(
                "wpctl",
                &["set-volume", DEFAULT_SINK, &format!("{}+", VOLUME_STEP)],
            ),
            Program::VolumeDown => spawn(
                "wpctl",
                &["set-volume", DEFAULT_SINK, &format!("{}-", VOLUME_STEP)],
            ),
            Program::ToggleMute => spawn("wpctl", &["set-mute", DEFAULT_SINK, "toggle"]),
        };
        if let Err(e) = result {
            log::error!("Failed to start {:?}: {}", program, e);
        }
    }

    fn toggle_bar(&mut self) -> Result<(), ReplyOrIdError> {
        let selmon = self.model.selmon;
        self.model.toggle_bar();
        self.place_bar(selmon)?;
        self.arrange(Some(selmon))
    }

    fn focus_stack(&mut self, forward: bool, include_hidden: bool) -> Result<(), ReplyOrIdError> {
        let target = match self.model.cycle_target(forward, include_hidden) {
            Some(target) => target,
            None => return Ok(()),
        };
        let reveal = self.model.show(target);
        if reveal {
            self.show_window(target)?;
        }
        self.focus(Some(target))?;
        let mon = self.model.clients[target].monitor;
        if reveal {
            // hidden again once it loses focus
            self.model.monitors[mon].revealed = Some(target);
            self.arrange(Some(mon))
        } else {
            self.restack(mon)
        }
    }

    fn zoom(&mut self) -> Result<(), ReplyOrIdError> {
        if let Some(target) = self.model.zoom_target() {
            self.model.pop(target);
            self.focus(Some(target))?;
            self.arrange(Some(self.model.clients[target].monitor))?;
        }
        Ok(())
    }

    /// Ask the selection to close, kill its connection if it doesn't understand
    fn kill_client(&mut self) -> Result<(), ReplyOrIdError> {
        let window = match self.model.sel() {
            Some(id) => self.model.clients[id].window,
            None => return Ok(()),
        };
        if !self.send_protocol(window, self.atoms.WM_DELETE_WINDOW)? {
            log::debug!("Killing {:#x}", window);
            self.conn.grab_server()?;
            self.conn.set_close_down_mode(CloseDown::DESTROY_ALL)?;
            self.conn.kill_client(window)?;
            self.conn.ungrab_server()?;
        }
        Ok(())
    }

    pub(super) fn toggle_floating(&mut self) -> Result<(), ReplyOrIdError> {
        let id = match self.model.sel() {
            Some(id) => id,
            None => return Ok(()),
        };
        if !self.model.toggle_floating(id) {
            return Ok(());
        }
        if self.model.clients[id].floating {
            let rect = self.model.clients[id].rect;
            self.resize(id, rect, false)?;
        }
        self.arrange(Some(self.model.selmon))
    }

    fn focus_monitor(&mut self, dir: i32) -> Result<(), ReplyOrIdError> {
        if self.model.monitors.len() < 2 {
            return Ok(());
        }
        let target = self.model.dir_to_monitor(dir);
        if target == self.model.selmon {
            return Ok(());
        }
        if let Some(sel) = self.model.sel() {
            self.unfocus(sel, false)?;
        }
        self.model.selmon = target;
        self.focus(None)
    }

    fn tag_monitor(&mut self, dir: i32) -> Result<(), ReplyOrIdError> {
        let id = match self.model.sel() {
            Some(id) if self.model.monitors.len() > 1 => id,
            _ => return Ok(()),
        };
        let target = self.model.dir_to_monitor(dir);
        self.send_to_monitor(id, target)
    }

    /// Move `id` to monitor `target`, onto the tags that monitor shows
    fn send_to_monitor(&mut self, id: ClientId, target: usize) -> Result<(), ReplyOrIdError> {
        if self.model.clients[id].monitor == target {
            return Ok(());
        }
        self.unfocus(id, true)?;
        self.model.send_to_monitor(id, target);
        self.focus(None)?;
        self.arrange(None)
    }

    fn show_all(&mut self) -> Result<(), ReplyOrIdError> {
        let selmon = self.model.selmon;
        for id in self.model.show_all(selmon) {
            self.show_window(id)?;
        }
        if self.model.sel().is_none() {
            self.focus(None)?;
        }
        self.arrange(Some(selmon))
    }

    /// Hide the selection, or hide again the client focus cycling revealed
    fn toggle_hide(&mut self) -> Result<(), ReplyOrIdError> {
        let id = match self.model.sel() {
            Some(id) => id,
            None => return Ok(()),
        };
        let mon = self.model.clients[id].monitor;
        if self.model.monitors[mon].revealed == Some(id) {
            self.model.monitors[mon].revealed = None;
            self.show(id)
        } else {
            self.hide(id)
        }
    }

    fn hide(&mut self, id: ClientId) -> Result<(), ReplyOrIdError> {
        if !self.model.hide(id) {
            return Ok(());
        }
        let mon = self.model.clients[id].monitor;
        self.hide_window(id)?;
        self.focus(None)?;
        self.arrange(Some(mon))
    }

    fn show(&mut self, id: ClientId) -> Result<(), ReplyOrIdError> {
        self.model.show(id);
        self.show_window(id)?;
        self.arrange(Some(self.model.clients[id].monitor))
    }

    /// Bar title click: hide the focused client, show and focus any other
    fn toggle_win(&mut self, id: ClientId) -> Result<(), ReplyOrIdError> {
        if self.model.sel() == Some(id) {
            return self.hide(id);
        }
        if self.model.clients[id].hidden {
            self.show(id)?;
        }
        self.focus(Some(id))?;
        self.restack(self.model.selmon)
    }
}
