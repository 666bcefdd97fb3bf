use std::path::PathBuf;

use x11rb::protocol::xproto::Window;

use crate::{
    bar::BarPanels,
    layouts::LayoutKind,
    rect::Rect,
    size_hints::{apply_size_hints, HintArea, SizeHints},
    states::{Client, ClientId, Model, MonitorSettings},
    tags::TagMask,
    utils::expand_tilde,
};

#[test]
fn test_tilde_expand() {
    let home = dirs::home_dir().expect("No home dir");

    let p = expand_tilde(&PathBuf::from("~"));
    assert_eq!(p, home);

    let p = expand_tilde(&PathBuf::from("~/"));
    assert_eq!(p, home);

    let p = expand_tilde(&PathBuf::from("~/blah"));
    let mut expected = home;
    expected.push("blah");
    assert_eq!(p, expected);

    let p = expand_tilde(&PathBuf::from("/blah"));
    assert_eq!(p, PathBuf::from("/blah"));

    let p = expand_tilde(&PathBuf::from("/~/blah"));
    assert_eq!(p, PathBuf::from("/~/blah"));
}

const BAR_HEIGHT: i32 = 20;
const BORDER: i32 = 2;
const GAP: i32 = 5;

fn settings() -> MonitorSettings {
    MonitorSettings {
        mfact: 0.55,
        nmaster: 1,
        show_bar: true,
        top_bar: true,
        panels: BarPanels {
            volume: true,
            input_method: true,
        },
    }
}

fn single_monitor() -> Model {
    Model::new(Rect::new(0, 0, 1280, 800), &[], settings(), 9, BAR_HEIGHT)
}

fn dual_monitor() -> Model {
    let outputs = [Rect::new(0, 0, 1280, 800), Rect::new(1280, 0, 1280, 800)];
    Model::new(Rect::new(0, 0, 2560, 800), &outputs, settings(), 9, BAR_HEIGHT)
}

fn manage(model: &mut Model, window: Window) -> ClientId {
    let mut client = Client::new(window, Rect::new(10, 30, 200, 100), BORDER, model.selmon);
    client.tags = model.initial_tags(model.selmon, TagMask::EMPTY);
    let id = model.add_client(client);
    model.focus(Some(id));
    id
}

/// Every client in exactly one client list, and at most once in the stacks
fn assert_lists_consistent(model: &Model) {
    for (id, client) in model.clients.iter() {
        let in_clients: usize = model
            .monitors
            .iter()
            .map(|m| m.clients.iter().filter(|&&c| c == id).count())
            .sum();
        let in_stacks: usize = model
            .monitors
            .iter()
            .map(|m| m.stack.iter().filter(|&&c| c == id).count())
            .sum();
        assert_eq!(in_clients, 1, "{:?} is in {} client lists", id, in_clients);
        assert!(in_stacks <= 1);
        assert!(model.monitors[client.monitor].clients.contains(&id));
    }
}

#[test]
fn clients_stay_in_one_monitor() {
    let mut model = dual_monitor();
    let a = manage(&mut model, 1);
    let b = manage(&mut model, 2);
    assert_lists_consistent(&model);

    model.send_to_monitor(a, 1);
    assert_lists_consistent(&model);
    assert_eq!(model.clients[a].monitor, 1);
    assert_eq!(model.clients[a].tags, model.monitors[1].active_tags());

    model.remove_client(b);
    assert_lists_consistent(&model);
    assert!(model.monitors[0].clients.is_empty());
}

#[test]
fn tag_operations_never_leave_a_client_without_tags() {
    let mut model = single_monitor();
    let a = manage(&mut model, 1);
    let before = model.clients[a].tags;

    assert!(!model.tag(TagMask::EMPTY));
    assert!(!model.toggle_tag(before));
    assert!(!model.tag(TagMask::from_bits(1 << 20)));
    assert_eq!(model.clients[a].tags, before);

    assert!(!model.toggle_view(model.selmon().active_tags()));
    assert!(!model.selmon().active_tags().is_empty());
}

#[test]
fn toggling_a_view_twice_goes_back() {
    let mut model = single_monitor();
    let start = model.selmon().active_tags();
    let other = TagMask::from_bits(0b110);

    assert!(model.toggle_view(other));
    assert!(model.toggle_view(other));
    assert_eq!(model.selmon().active_tags(), start);

    assert!(model.view(other));
    assert_eq!(model.selmon().active_tags(), other);
    assert!(model.view(TagMask::EMPTY));
    assert_eq!(model.selmon().active_tags(), start);
}

#[test]
fn size_hints_settle() {
    let hints = SizeHints {
        base_width: 4,
        base_height: 4,
        inc_width: 7,
        inc_height: 13,
        min_width: 20,
        min_height: 20,
        ..SizeHints::default()
    };
    let area = HintArea {
        screen: Rect::new(0, 0, 1280, 800),
        work: Rect::new(0, BAR_HEIGHT, 1280, 800 - BAR_HEIGHT),
        bar_height: BAR_HEIGHT,
        gap: GAP,
        honor_hints: true,
    };
    let current = Rect::new(100, 100, 300, 300);
    for proposed in [
        Rect::new(100, 100, 333, 251),
        Rect::new(-50, 900, 3, 3),
        Rect::new(0, 0, -40, 0),
    ] {
        let (first, _) = apply_size_hints(current, BORDER, Some(&hints), proposed, false, &area);
        assert!(first.width > 0 && first.height > 0, "{:?}", first);
        let (second, changed) =
            apply_size_hints(first, BORDER, Some(&hints), first, false, &area);
        assert_eq!(second, first);
        assert!(!changed);
    }
}

#[test]
fn three_tiled_clients() {
    let mut model = single_monitor();
    let a = manage(&mut model, 1);
    let b = manage(&mut model, 2);
    let c = manage(&mut model, 3);
    let work = model.selmon().work;
    assert_eq!(work, Rect::new(0, BAR_HEIGHT, 1280, 780));

    let placed = model.arrangement(0, GAP);
    // the newest client is the master
    assert_eq!(
        placed,
        vec![
            (c, Rect::new(5, 25, 704 - 2 * GAP - 2 * BORDER, 780 - 2 * GAP - 2 * BORDER)),
            (b, Rect::new(709, 25, 576 - 2 * GAP - 2 * BORDER, 390 - 2 * GAP - 2 * BORDER)),
            (a, Rect::new(709, 415, 576 - 2 * GAP - 2 * BORDER, 390 - 2 * GAP - 2 * BORDER)),
        ]
    );
    let master_outer = placed[0].1.width + 2 * GAP + 2 * BORDER;
    let stack_outer = placed[1].1.width + 2 * GAP + 2 * BORDER;
    assert_eq!(master_outer + stack_outer, work.width);
}

#[test]
fn monocle_covers_the_work_area() {
    let mut model = single_monitor();
    manage(&mut model, 1);
    manage(&mut model, 2);
    model.set_layout(Some(LayoutKind::Monocle));
    let work = model.selmon().work;
    for (_, rect) in model.arrangement(0, GAP) {
        assert_eq!(
            Rect::new(rect.x + BORDER, rect.y + BORDER, rect.width, rect.height),
            work
        );
    }
}

#[test]
fn hidden_selection_gives_focus_away() {
    let mut model = single_monitor();
    let a = manage(&mut model, 1);
    let b = manage(&mut model, 2);
    assert_eq!(model.sel(), Some(b));

    assert!(model.hide(b));
    assert!(model.selmon().clients.contains(&b));
    assert!(model.selmon().stack.contains(&b));
    assert!(model.arrangement(0, GAP).iter().all(|&(id, _)| id != b));

    let change = model.focus(None);
    assert_eq!(change.focused, Some(a));
    assert_eq!(change.unfocused, Some(b));
    assert_eq!(model.sel(), Some(a));
}

#[test]
fn clients_of_a_removed_monitor_move_to_the_first() {
    let mut model = dual_monitor();
    model.selmon = 1;
    let a = manage(&mut model, 1);
    let b = manage(&mut model, 2);
    model.set_tags(a, TagMask::from_bits(0b100));
    let tags = (model.clients[a].tags, model.clients[b].tags);

    let update = model.update_geometry(Rect::new(0, 0, 1280, 800), &[Rect::new(0, 0, 1280, 800)]);
    assert!(update.dirty);
    assert_eq!(update.removed_bars.len(), 1);
    assert_eq!(model.monitors.len(), 1);
    assert_eq!(model.selmon, 0);
    assert_eq!(model.clients[a].monitor, 0);
    assert_eq!(model.clients[b].monitor, 0);
    assert_eq!((model.clients[a].tags, model.clients[b].tags), tags);
    assert_lists_consistent(&model);
}

#[test]
fn dragged_client_changes_monitor() {
    let mut model = dual_monitor();
    let a = manage(&mut model, 1);
    model.clients[a].floating = true;

    model.clients[a].set_rect(Rect::new(1500, 200, 200, 100));
    assert_eq!(model.reassign_by_position(a), Some(1));
    assert_eq!(model.clients[a].monitor, 1);
    assert_eq!(model.selmon, 1);
    assert!(model.monitors[1].clients.contains(&a));
    assert!(!model.monitors[0].clients.contains(&a));

    // dropped on the same monitor again
    assert_eq!(model.reassign_by_position(a), None);
}

#[test]
fn focus_clears_urgency() {
    let mut model = single_monitor();
    let a = manage(&mut model, 1);
    let b = manage(&mut model, 2);
    model.set_tags(a, TagMask::from_bits(0b10));
    model.clients[a].urgent = true;

    let (_, urgent) = model.tag_state(0);
    assert_eq!(urgent, TagMask::from_bits(0b10));

    model.view(TagMask::from_bits(0b10));
    model.focus(Some(a));
    assert!(!model.clients[a].urgent);
    let (occupied, urgent) = model.tag_state(0);
    assert!(urgent.is_empty());
    assert_eq!(occupied, TagMask::from_bits(0b11));
    assert_ne!(model.sel(), Some(b));
}

#[test]
fn releasing_shows_clients_hidden_on_other_tags() {
    let mut model = single_monitor();
    let a = manage(&mut model, 1);
    let b = manage(&mut model, 2);
    model.set_tags(b, TagMask::from_bits(0b10));
    model.clients[b].hidden = true;
    assert!(!model.is_visible(b));

    let shown = model.release_all();
    assert_eq!(shown, vec![b]);
    assert!(!model.clients[a].hidden && !model.clients[b].hidden);
    assert_eq!(model.selmon().active_tags(), TagMask::all(9));
    assert_eq!(model.selmon().layout(), LayoutKind::Floating);
}

#[test]
fn hidden_clients_are_not_selected_when_the_selection_leaves() {
    let mut model = dual_monitor();
    let a = manage(&mut model, 1);
    let b = manage(&mut model, 2);
    assert!(model.hide(b));
    model.focus(None);
    assert_eq!(model.monitors[0].sel, Some(a));

    model.clients[a].floating = true;
    model.clients[a].set_rect(Rect::new(1500, 200, 200, 100));
    assert_eq!(model.reassign_by_position(a), Some(1));
    assert_eq!(model.monitors[0].sel, None);
    assert_lists_consistent(&model);
}

#[test]
fn revealed_client_of_a_removed_monitor_is_hidden_again() {
    let mut model = dual_monitor();
    model.selmon = 1;
    let a = manage(&mut model, 1);
    let b = manage(&mut model, 2);
    assert!(model.hide(b));
    assert!(model.show(b));
    model.monitors[1].revealed = Some(b);
    model.focus(Some(b));

    let update = model.update_geometry(Rect::new(0, 0, 1280, 800), &[Rect::new(0, 0, 1280, 800)]);
    assert_eq!(update.rehidden, vec![b]);
    assert!(model.clients[b].hidden);
    assert!(!model.clients[a].hidden);
    assert_eq!(model.monitors[0].revealed, None);
    assert_lists_consistent(&model);
}
