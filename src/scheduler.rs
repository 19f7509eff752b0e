use std::time::Duration;

use slotmap::SlotMap;

slotmap::new_key_type!(
    /// Token for a scheduled interval timer or animation frame.
    pub struct TaskId;
);

slotmap::new_key_type!(
    /// Token for an attached input listener.
    pub struct ListenerId;
);

/// Kinds of input a game can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key,
    Pointer,
}

#[derive(Debug)]
enum Task {
    Interval { period: Duration, elapsed: Duration },
    Frame { due: bool },
}

/// Cooperative scheduler standing in for the host's timer and frame loop.
///
/// Every timer, frame request and listener is identified by a token. Tokens
/// stay live until cancelled (or, for frames, until claimed once), and a
/// cancelled token is never reported again.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: SlotMap<TaskId, Task>,
    listeners: SlotMap<ListenerId, Input>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a repeating timer that fires once per `period`.
    pub fn every(&mut self, period: Duration) -> TaskId {
        let period = period.max(Duration::from_millis(1));
        self.tasks.insert(Task::Interval {
            period,
            elapsed: Duration::ZERO,
        })
    }

    /// Request a single callback on the next frame.
    pub fn request_frame(&mut self) -> TaskId {
        self.tasks.insert(Task::Frame { due: false })
    }

    /// Cancel a timer or frame. Returns false if the token was already gone.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.remove(id).is_some()
    }

    #[cfg(test)]
    pub fn is_live(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn listen(&mut self, input: Input) -> ListenerId {
        self.listeners.insert(input)
    }

    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    pub fn is_listening(&self, input: Input) -> bool {
        self.listeners.values().any(|l| *l == input)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Advance the clock and collect the tokens that became due.
    ///
    /// Intervals fire at most once per call and carry over the remainder
    /// below one period. Every frame requested before this call is due.
    /// Frames requested while the returned batch is being delivered wait for
    /// the next call.
    pub fn advance(&mut self, dt: Duration) -> Vec<TaskId> {
        let mut due = Vec::new();
        for (id, task) in self.tasks.iter_mut() {
            match task {
                Task::Interval { period, elapsed } => {
                    *elapsed += dt;
                    if *elapsed >= *period {
                        let rest = elapsed.as_nanos() % period.as_nanos();
                        *elapsed = Duration::from_nanos(rest as u64);
                        due.push(id);
                    }
                }
                Task::Frame { due: is_due } => {
                    *is_due = true;
                    due.push(id);
                }
            }
        }
        due
    }

    /// Confirm that a due token may still be delivered.
    ///
    /// Must be called right before delivery: a token cancelled by an earlier
    /// callback in the same batch is rejected here. Frames are consumed.
    pub fn claim(&mut self, id: TaskId) -> bool {
        match self.tasks.get(id) {
            Some(Task::Interval { .. }) => true,
            Some(Task::Frame { due: true }) => {
                self.tasks.remove(id);
                true
            }
            Some(Task::Frame { due: false }) | None => false,
        }
    }
}
