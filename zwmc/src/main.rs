use {
    anyhow::{Context, Result},
    structopt::StructOpt,
    x11rb::{
        connection::Connection,
        protocol::xproto::{ConnectionExt as _, PropMode},
        wrapper::ConnectionExt as _,
    },
};

use common::{truncate_at_boundary, Panel, MAX_TEXT_LEN};

#[derive(StructOpt, Debug)]
#[structopt(name = "zwmc", about = "Set the texts shown on the zwm bar")]
enum Opt {
    /// Set the text of a panel ("status", "panel0", "panel1" or "panel2")
    Set { panel: Panel, text: String },
    /// Remove the text of a panel, zwm falls back to its default
    Clear { panel: Panel },
}

fn main() -> Result<()> {
    let opts = Opt::from_args();

    let (conn, screen_num) = x11rb::connect(None).context("Error connecting to the X server")?;
    let root = conn.setup().roots[screen_num].root;

    let panel = match &opts {
        Opt::Set { panel, .. } | Opt::Clear { panel } => *panel,
    };
    let property = conn
        .intern_atom(false, panel.property_name().as_bytes())?
        .reply()
        .context("Failed to intern the panel atom")?
        .atom;

    match opts {
        Opt::Set { text, .. } => {
            let utf8_string = conn.intern_atom(false, b"UTF8_STRING")?.reply()?.atom;
            let mut text = text;
            truncate_at_boundary(&mut text, MAX_TEXT_LEN - 1);
            conn.change_property8(PropMode::REPLACE, root, property, utf8_string, text.as_bytes())?;
        }
        Opt::Clear { .. } => {
            conn.delete_property(root, property)?;
        }
    }

    conn.flush().context("Error sending the request")?;
    Ok(())
}
