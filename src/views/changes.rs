use tokio::sync::broadcast;
use tracing::debug;

use crate::models::StudentId;

const CHANGE_CAPACITY: usize = 64;

/// Something a view confirmed with the service that sibling views may be
/// showing an older copy of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Courses,
    Enrollments {
        student_id: StudentId,
        course_name: String,
    },
}

/// One-way notification channel between views.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<Change>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, change: Change) {
        debug!("publishing {:?}", change);
        // no subscribers is fine
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ChangeSubscription {
    rx: broadcast::Receiver<Change>,
}

impl ChangeSubscription {
    /// Drain everything queued so far and report whether any of it matters
    /// to the caller. A lagged receiver has lost events, so it always counts.
    pub fn any(&mut self, relevant: impl Fn(&Change) -> bool) -> bool {
        let mut hit = false;
        loop {
            match self.rx.try_recv() {
                Ok(change) => hit |= relevant(&change),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    debug!("change subscription lagged by {}", n);
                    hit = true;
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
        hit
    }
}
