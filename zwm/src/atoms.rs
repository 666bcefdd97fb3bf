use x11rb::atom_manager;

atom_manager! {
    /// Every atom zwm uses, interned in one round trip
    pub(crate) Atoms: AtomsCookie {
        UTF8_STRING,
        WM_PROTOCOLS,
        WM_DELETE_WINDOW,
        WM_STATE,
        WM_TAKE_FOCUS,
        _NET_ACTIVE_WINDOW,
        _NET_SUPPORTED,
        _NET_WM_NAME,
        _NET_WM_STATE,
        _NET_SUPPORTING_WM_CHECK,
        _NET_WM_STATE_FULLSCREEN,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DIALOG,
        _NET_CLIENT_LIST,
        _XROOTPMAP_ID,
        ESETROOT_PMAP_ID,
        ZWM_PANEL0_TEXT,
        ZWM_PANEL1_TEXT,
        ZWM_PANEL2_TEXT,
    }
}

impl Atoms {
    /// What goes into `_NET_SUPPORTED`
    pub(crate) fn supported(&self) -> [u32; 9] {
        [
            self._NET_ACTIVE_WINDOW,
            self._NET_SUPPORTED,
            self._NET_WM_NAME,
            self._NET_WM_STATE,
            self._NET_SUPPORTING_WM_CHECK,
            self._NET_WM_STATE_FULLSCREEN,
            self._NET_WM_WINDOW_TYPE,
            self._NET_WM_WINDOW_TYPE_DIALOG,
            self._NET_CLIENT_LIST,
        ]
    }

    /// Index of the text panel whose property is `atom`
    pub(crate) fn panel(&self, atom: u32) -> Option<usize> {
        [
            self.ZWM_PANEL0_TEXT,
            self.ZWM_PANEL1_TEXT,
            self.ZWM_PANEL2_TEXT,
        ]
        .iter()
        .position(|&a| a == atom)
    }
}
