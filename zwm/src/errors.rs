//! X errors we expect while managing windows that can vanish at any time

use x11rb::{
    errors::{ReplyError, ReplyOrIdError},
    protocol::{
        xproto::{
            CONFIGURE_WINDOW_REQUEST, COPY_AREA_REQUEST, GRAB_BUTTON_REQUEST, GRAB_KEY_REQUEST,
            POLY_FILL_RECTANGLE_REQUEST, POLY_SEGMENT_REQUEST, POLY_TEXT16_REQUEST,
            POLY_TEXT8_REQUEST, PUT_IMAGE_REQUEST, SET_INPUT_FOCUS_REQUEST,
        },
        ErrorKind,
    },
    x11_utils::X11Error,
};

/// Errors caused by a client going away under our feet, or by another program holding a grab
pub(crate) fn is_ignorable(error: &X11Error) -> bool {
    let request = error.major_opcode;
    match error.error_kind {
        ErrorKind::Window => true,
        ErrorKind::Match => [SET_INPUT_FOCUS_REQUEST, CONFIGURE_WINDOW_REQUEST].contains(&request),
        ErrorKind::Drawable => [
            POLY_TEXT8_REQUEST,
            POLY_TEXT16_REQUEST,
            POLY_FILL_RECTANGLE_REQUEST,
            POLY_SEGMENT_REQUEST,
            COPY_AREA_REQUEST,
            PUT_IMAGE_REQUEST,
        ]
        .contains(&request),
        ErrorKind::Access => [GRAB_BUTTON_REQUEST, GRAB_KEY_REQUEST].contains(&request),
        _ => false,
    }
}

/// Turn ignorable X errors into `Ok`, everything else stays an error
pub(crate) fn ignore_benign(result: Result<(), ReplyOrIdError>) -> Result<(), ReplyOrIdError> {
    match result {
        Err(ReplyOrIdError::X11Error(e)) if is_ignorable(&e) => {
            log::debug!("Ignoring {:?} from {:?}", e.error_kind, e.request_name);
            Ok(())
        }
        other => other,
    }
}

/// `None` if the reply is an ignorable error, usually because the window went away
pub(crate) fn ignore_vanished<T>(result: Result<T, ReplyError>) -> Result<Option<T>, ReplyError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ReplyError::X11Error(e)) if is_ignorable(&e) => {
            log::debug!("Ignoring {:?} from {:?}", e.error_kind, e.request_name);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// `Some` for the X error inside, if there is one
pub(crate) fn x11_error(error: &ReplyError) -> Option<&X11Error> {
    match error {
        ReplyError::X11Error(e) => Some(e),
        ReplyError::ConnectionError(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use x11rb::protocol::xproto::MAP_WINDOW_REQUEST;

    use super::*;

    fn error(error_kind: ErrorKind, major_opcode: u8) -> X11Error {
        X11Error {
            error_kind,
            error_code: 0,
            sequence: 0,
            bad_value: 0,
            minor_opcode: 0,
            major_opcode,
            extension_name: None,
            request_name: None,
        }
    }

    #[test]
    fn whitelist() {
        assert!(is_ignorable(&error(ErrorKind::Window, MAP_WINDOW_REQUEST)));
        assert!(is_ignorable(&error(ErrorKind::Match, SET_INPUT_FOCUS_REQUEST)));
        assert!(is_ignorable(&error(ErrorKind::Drawable, COPY_AREA_REQUEST)));
        assert!(is_ignorable(&error(ErrorKind::Access, GRAB_KEY_REQUEST)));

        assert!(!is_ignorable(&error(ErrorKind::Match, MAP_WINDOW_REQUEST)));
        assert!(!is_ignorable(&error(ErrorKind::Access, MAP_WINDOW_REQUEST)));
        assert!(!is_ignorable(&error(ErrorKind::Alloc, GRAB_KEY_REQUEST)));
    }

    #[test]
    fn vanished_windows_read_as_nothing() {
        let gone = ReplyError::X11Error(error(ErrorKind::Window, MAP_WINDOW_REQUEST));
        assert_eq!(ignore_vanished::<u32>(Err(gone)).ok(), Some(None));
        assert_eq!(ignore_vanished(Ok(3)).ok(), Some(Some(3)));
        let bad = ReplyError::X11Error(error(ErrorKind::Alloc, MAP_WINDOW_REQUEST));
        assert!(ignore_vanished::<u32>(Err(bad)).is_err());
    }

    #[test]
    fn benign_errors_become_ok() {
        let benign = ReplyOrIdError::X11Error(error(ErrorKind::Window, MAP_WINDOW_REQUEST));
        assert!(ignore_benign(Err(benign)).is_ok());
        let bad = ReplyOrIdError::X11Error(error(ErrorKind::Value, MAP_WINDOW_REQUEST));
        assert!(ignore_benign(Err(bad)).is_err());
    }
}
