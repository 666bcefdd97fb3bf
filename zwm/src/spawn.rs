//! Starting programs without waiting for them

use std::{
    io,
    os::unix::process::CommandExt,
    process::{Command, Stdio},
};

use nix::{
    sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal},
    unistd::setsid,
};

/// Let the kernel reap our children, nothing ever waits for them
pub(crate) fn ignore_children() -> nix::Result<()> {
    let ignore = SigAction::new(
        SigHandler::SigIgn,
        SaFlags::SA_NOCLDSTOP | SaFlags::SA_NOCLDWAIT | SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // Safety: no handler is installed, only the disposition changes
    unsafe { sigaction(Signal::SIGCHLD, &ignore) }?;
    Ok(())
}

/// Run `program` in its own session.
///
/// The child gets the default SIGCHLD disposition back so it can wait for its own children
pub(crate) fn spawn(program: &str, args: &[&str]) -> io::Result<()> {
    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null());
    // Safety: only async-signal-safe calls between fork and exec
    unsafe {
        command.pre_exec(|| {
            setsid()?;
            let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
            sigaction(Signal::SIGCHLD, &default)?;
            Ok(())
        });
    }
    let child = command.spawn()?;
    log::debug!("Started {} ({})", program, child.id());
    Ok(())
}

/// Run a command line through `/bin/sh -c`
pub(crate) fn spawn_shell(command: &str) -> io::Result<()> {
    spawn("/bin/sh", &["-c", command])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_programs_are_errors() {
        assert!(spawn("/nonexistent/zwm-test-program", &[]).is_err());
    }
}
