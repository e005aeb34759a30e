use std::io;
use std::time::Duration;

use crate::error::FatalError;

use super::registry::ConnectionRegistry;

/// How long one readiness poll may wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollTimeout {
    /// Return immediately whether or not anything is readable (fastest
    /// pacing).
    Immediate,
    /// Block until something is readable, with no time bound (lockstep wait
    /// after the step deadline has passed).
    Infinite,
    /// Block at most this long (real-time pacing: the remainder of the
    /// step).
    Bounded(Duration),
}

impl PollTimeout {
    fn as_millis(self) -> libc::c_int {
        match self {
            PollTimeout::Immediate => 0,
            PollTimeout::Infinite => -1,
            // round up so a nonzero remainder never degenerates to a busy
            // zero-timeout poll
            PollTimeout::Bounded(duration) => {
                let millis = duration.as_millis();
                let millis = if millis == 0 && !duration.is_zero() {
                    1
                } else {
                    millis
                };
                millis.min(libc::c_int::MAX as u128) as libc::c_int
            }
        }
    }
}

/// Readiness of one connection as reported by the poll.
#[derive(Clone, Copy, Debug)]
pub struct Readiness {
    /// Index into the registry at the time of the poll.
    pub index: usize,
    /// Data is available to read.
    pub readable: bool,
    /// The descriptor is in an error state (hangup/invalid) with nothing
    /// left to read; a connection fault.
    pub fault: bool,
    pub revents: i16,
}

/// Outcome of one poll pass.
#[derive(Debug, Default)]
pub struct PollReport {
    pub events: Vec<Readiness>,
    /// The poll was interrupted by a signal before anything became ready;
    /// benign, the caller just re-evaluates its termination condition.
    pub interrupted: bool,
}

/// Polls every registered connection for readable data. An `EINTR` from the
/// kernel is reported as a benign interruption; any other failure of the
/// multiplexing call itself is fatal to the engine, since connection state
/// can no longer be reasoned about.
pub fn poll_connections(
    registry: &ConnectionRegistry,
    timeout: PollTimeout,
) -> Result<PollReport, FatalError> {
    let mut pollfds: Vec<libc::pollfd> = registry
        .raw_fds()
        .into_iter()
        .map(|fd| libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        })
        .collect();

    let rc = unsafe {
        libc::poll(
            pollfds.as_mut_ptr(),
            pollfds.len() as libc::nfds_t,
            timeout.as_millis(),
        )
    };
    if rc < 0 {
        let source = io::Error::last_os_error();
        if source.kind() == io::ErrorKind::Interrupted {
            return Ok(PollReport {
                events: Vec::new(),
                interrupted: true,
            });
        }
        return Err(FatalError::Poll { source });
    }

    let mut events = Vec::new();
    for (index, pollfd) in pollfds.iter().enumerate() {
        let readable = pollfd.revents & libc::POLLIN != 0;
        let broken = pollfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0;
        if readable || broken {
            events.push(Readiness {
                index,
                readable,
                // a hung-up descriptor with readable data still gets drained
                // first; the read path reports the close
                fault: broken && !readable,
                revents: pollfd.revents,
            });
        }
    }
    Ok(PollReport {
        events,
        interrupted: false,
    })
}
