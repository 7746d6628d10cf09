use tokio::task::AbortHandle;

/// Background tasks owned by one session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskKind {
    ConnectAttempt,
    ReadLoop,
    Supervisor,
}

/// Abort handles of the running tasks, at most one of each kind.
#[derive(Default)]
pub(crate) struct SessionTasks {
    connect_attempt: Option<AbortHandle>,
    read_loop: Option<AbortHandle>,
    supervisor: Option<AbortHandle>,
}

impl SessionTasks {
    fn slot(&mut self, kind: TaskKind) -> &mut Option<AbortHandle> {
        match kind {
            TaskKind::ConnectAttempt => &mut self.connect_attempt,
            TaskKind::ReadLoop => &mut self.read_loop,
            TaskKind::Supervisor => &mut self.supervisor,
        }
    }

    /// Register a freshly spawned task. A task already in the slot is aborted.
    pub fn set(&mut self, kind: TaskKind, handle: AbortHandle) {
        if let Some(previous) = self.slot(kind).replace(handle) {
            previous.abort();
        }
    }

    /// Cancel the task of `kind`. Returns whether one was running.
    pub fn abort(&mut self, kind: TaskKind) -> bool {
        match self.slot(kind).take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Forget the task of `kind` without cancelling it.
    ///
    /// Used by a task that is finishing on its own and must not cancel itself
    /// halfway through its last transition.
    pub fn release(&mut self, kind: TaskKind) {
        self.slot(kind).take();
    }

    pub fn abort_all(&mut self) {
        for kind in [
            TaskKind::ConnectAttempt,
            TaskKind::ReadLoop,
            TaskKind::Supervisor,
        ] {
            self.abort(kind);
        }
    }
}
