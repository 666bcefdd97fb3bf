pub(crate) mod client;
mod model;
mod mon_state;
pub(crate) mod wm_state;

pub(crate) use {
    client::{Client, ClientId},
    model::Model,
    mon_state::{Monitor, MonitorSettings},
    wm_state::WMState,
};
