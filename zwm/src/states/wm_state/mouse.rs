//! Moving and resizing clients with the pointer

use x11rb::{
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::{xproto::*, Event},
    CURRENT_TIME, NONE,
};

use crate::{errors::ignore_benign, rect::Rect, states::{ClientId, WMState}};

/// Shortest time between two handled motion events, in milliseconds
const MOTION_INTERVAL: u32 = 1000 / 60;

#[derive(Debug, Copy, Clone)]
enum Drag {
    /// Where the client and the pointer were when the drag started
    Move { origin: Rect, pointer: (i32, i32) },
    Resize { origin: Rect },
}

impl<'a> WMState<'a> {
    pub(super) fn move_mouse(&mut self) -> Result<(), ReplyOrIdError> {
        let id = match self.drag_target()? {
            Some(id) => id,
            None => return Ok(()),
        };
        let pointer = self.conn.query_pointer(self.root)?.reply()?;
        let drag = Drag::Move {
            origin: self.model.clients[id].rect,
            pointer: (pointer.root_x as i32, pointer.root_y as i32),
        };
        if self.grab_pointer(self.cursors.moving)? {
            self.drag(id, drag)?;
        }
        Ok(())
    }

    pub(super) fn resize_mouse(&mut self) -> Result<(), ReplyOrIdError> {
        let id = match self.drag_target()? {
            Some(id) => id,
            None => return Ok(()),
        };
        let drag = Drag::Resize {
            origin: self.model.clients[id].rect,
        };
        if self.grab_pointer(self.cursors.resizing)? {
            self.warp_to_corner(id)?;
            self.drag(id, drag)?;
            self.drop_enter_events()?;
        }
        Ok(())
    }

    /// The selection, raised, unless it is fullscreen
    fn drag_target(&mut self) -> Result<Option<ClientId>, ReplyOrIdError> {
        let id = match self.model.sel() {
            Some(id) if !self.model.clients[id].fullscreen => id,
            _ => return Ok(None),
        };
        self.restack(self.model.selmon)?;
        Ok(Some(id))
    }

    fn grab_pointer(&self, cursor: Cursor) -> Result<bool, ReplyOrIdError> {
        let mask = EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION;
        let reply = self
            .conn
            .grab_pointer(
                false,
                self.root,
                mask,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                cursor,
                CURRENT_TIME,
            )?
            .reply()?;
        if reply.status != GrabStatus::SUCCESS {
            log::debug!("Can't grab the pointer: {:?}", reply.status);
        }
        Ok(reply.status == GrabStatus::SUCCESS)
    }

    fn warp_to_corner(&self, id: ClientId) -> Result<(), ReplyOrIdError> {
        let client = &self.model.clients[id];
        self.conn.warp_pointer(
            NONE,
            client.window,
            0,
            0,
            0,
            0,
            (client.rect.width + client.border - 1) as i16,
            (client.rect.height + client.border - 1) as i16,
        )?;
        Ok(())
    }

    /// Follow the pointer until the button is released, then move `id` to the monitor it ended
    /// up on
    fn drag(&mut self, id: ClientId, drag: Drag) -> Result<(), ReplyOrIdError> {
        let result = self.follow_pointer(id, drag);
        if matches!(drag, Drag::Resize { .. }) && self.model.clients.contains_key(id) {
            self.warp_to_corner(id)?;
        }
        self.conn.ungrab_pointer(CURRENT_TIME)?;
        result?;

        if !self.model.clients.contains_key(id) {
            return Ok(());
        }
        let target = self.model.rect_to_monitor(self.model.clients[id].rect);
        if target != self.model.clients[id].monitor {
            self.unfocus(id, true)?;
            if let Some(mon) = self.model.reassign_by_position(id) {
                log::debug!("Dragged {:#x} to monitor {}", self.model.clients[id].window, mon);
            }
            self.focus(None)?;
            self.arrange(None)?;
        }
        Ok(())
    }

    fn follow_pointer(&mut self, id: ClientId, drag: Drag) -> Result<(), ReplyOrIdError> {
        let mut last_motion: u32 = 0;
        loop {
            match self.conn.wait_for_event()? {
                event @ (Event::ConfigureRequest(_) | Event::Expose(_) | Event::MapRequest(_)) => {
                    ignore_benign(self.handle_event(event))?;
                }
                Event::MotionNotify(motion) => {
                    if motion.time.wrapping_sub(last_motion) <= MOTION_INTERVAL {
                        continue;
                    }
                    last_motion = motion.time;
                    // the client can go away in the middle of a drag
                    if !self.model.clients.contains_key(id) {
                        continue;
                    }
                    let (x, y) = (motion.root_x as i32, motion.root_y as i32);
                    match drag {
                        Drag::Move { origin, pointer } => {
                            self.drag_move(id, origin, x - pointer.0, y - pointer.1)?
                        }
                        Drag::Resize { origin } => self.drag_resize(id, origin, x, y)?,
                    }
                }
                Event::ButtonRelease(_) => return Ok(()),
                Event::Error(e) => {
                    log::debug!("Error during a drag: {:?}", e);
                }
                event => self.pending.push_back(event),
            }
        }
    }

    fn drag_move(&mut self, id: ClientId, origin: Rect, dx: i32, dy: i32) -> Result<(), ReplyOrIdError> {
        let snap = self.config.snap as i32;
        let mon = self.model.selmon();
        let work = mon.work;
        let floating_layout = mon.layout().is_floating();
        let client = &self.model.clients[id];
        let (outer_width, outer_height) = (client.outer_width(), client.outer_height());

        let mut x = origin.x + dx;
        let mut y = origin.y + dy;
        if (work.x - x).abs() < snap {
            x = work.x;
        } else if (work.right() - (x + outer_width)).abs() < snap {
            x = work.right() - outer_width;
        }
        if (work.y - y).abs() < snap {
            y = work.y;
        } else if (work.bottom() - (y + outer_height)).abs() < snap {
            y = work.bottom() - outer_height;
        }

        let current = client.rect;
        if !client.floating
            && !floating_layout
            && ((x - current.x).abs() > snap || (y - current.y).abs() > snap)
        {
            self.toggle_floating()?;
        }
        if floating_layout || self.model.clients[id].floating {
            let rect = self.model.clients[id].rect;
            self.resize(id, Rect::new(x, y, rect.width, rect.height), true)?;
        }
        Ok(())
    }

    fn drag_resize(&mut self, id: ClientId, origin: Rect, x: i32, y: i32) -> Result<(), ReplyOrIdError> {
        let snap = self.config.snap as i32;
        let mon = self.model.selmon();
        let work = mon.work;
        let floating_layout = mon.layout().is_floating();
        let client = &self.model.clients[id];
        let client_work = self.model.monitors[client.monitor].work;

        let width = (x - origin.x - 2 * client.border + 1).max(1);
        let height = (y - origin.y - 2 * client.border + 1).max(1);
        let inside = client_work.x + width >= work.x
            && client_work.x + width <= work.right()
            && client_work.y + height >= work.y
            && client_work.y + height <= work.bottom();
        if inside
            && !client.floating
            && !floating_layout
            && ((width - client.rect.width).abs() > snap || (height - client.rect.height).abs() > snap)
        {
            self.toggle_floating()?;
        }
        if floating_layout || self.model.clients[id].floating {
            let rect = self.model.clients[id].rect;
            self.resize(id, Rect::new(rect.x, rect.y, width, height), true)?;
        }
        Ok(())
    }
}
