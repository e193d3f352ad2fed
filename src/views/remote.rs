use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tracing::debug;

use crate::api::CourseApi;
use crate::error::ApiError;
use crate::views::{BoxFuture, Message, Task};

/// Identifies one read request. Only the most recently issued token may
/// change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Result of a read together with the token it was issued under.
#[derive(Debug)]
pub struct Fetched<T> {
    pub token: RequestToken,
    pub result: Result<T, ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

pub type ReadFn<K, T> = fn(Arc<dyn CourseApi>, K) -> BoxFuture<Result<T, ApiError>>;
pub type WrapFn<T> = fn(Fetched<T>) -> Message;

/// One remotely owned value mirrored by a view.
///
/// Moves through `Idle -> Loading -> Ready | Failed`. Local data only ever
/// comes from a confirmed read: mutations go through [`Remote::mutate`] and
/// the view reloads once they succeed.
pub struct Remote<K, T> {
    api: Arc<dyn CourseApi>,
    read: ReadFn<K, T>,
    wrap: WrapFn<T>,
    key: Option<K>,
    data: Option<T>,
    phase: Phase,
    issued: u64,
    fetched_at: Option<DateTime<Utc>>,
}

impl<K, T> Remote<K, T>
where
    K: Clone + PartialEq + Send + 'static,
    T: Send + 'static,
{
    pub fn new(api: Arc<dyn CourseApi>, read: ReadFn<K, T>, wrap: WrapFn<T>) -> Self {
        Self {
            api,
            read,
            wrap,
            key: None,
            data: None,
            phase: Phase::Idle,
            issued: 0,
            fetched_at: None,
        }
    }

    /// Start a read for `key` and return its token. Switching to a different
    /// key drops the data held for the old one.
    pub fn begin(&mut self, key: K) -> RequestToken {
        if self.key.as_ref() != Some(&key) {
            self.data = None;
            self.fetched_at = None;
        }
        self.key = Some(key);
        self.issued += 1;
        self.phase = Phase::Loading;
        RequestToken(self.issued)
    }

    /// Apply a read result. Responses to superseded requests are ignored.
    /// A failure keeps data already held for the current key.
    pub fn resolve(&mut self, fetched: Fetched<T>) -> Resolution {
        if fetched.token != RequestToken(self.issued) {
            debug!(
                "discarding stale response (token {:?}, latest {})",
                fetched.token, self.issued
            );
            return Resolution::Stale;
        }

        match fetched.result {
            Ok(data) => {
                self.data = Some(data);
                self.fetched_at = Some(Utc::now());
                self.phase = Phase::Ready;
            }
            Err(e) => {
                self.phase = Phase::Failed(e.user_message().to_string());
            }
        }
        Resolution::Applied
    }

    /// Issue the read for `key`.
    pub fn fetch(&mut self, key: K) -> Task {
        let token = self.begin(key.clone());
        let future = (self.read)(self.api.clone(), key);
        let wrap = self.wrap;
        Task::new(async move {
            let result = future.await;
            wrap(Fetched { token, result })
        })
    }

    /// Re-read the current key, if there is one.
    pub fn reload(&mut self) -> Option<Task> {
        let key = self.key.clone()?;
        Some(self.fetch(key))
    }

    /// Run a write against the service. The outcome is reported through
    /// `wrap`; nothing held here changes until the view reloads.
    pub fn mutate<R, F, W>(&self, op: F, wrap: W) -> Task
    where
        R: Send + 'static,
        F: FnOnce(Arc<dyn CourseApi>) -> BoxFuture<Result<R, ApiError>>,
        W: FnOnce(Result<R, ApiError>) -> Message + Send + 'static,
    {
        let future = op(self.api.clone());
        Task::new(async move { wrap(future.await) })
    }

    /// Forget the key and data. In-flight reads become stale.
    pub fn clear(&mut self) {
        self.issued += 1;
        self.key = None;
        self.data = None;
        self.fetched_at = None;
        self.phase = Phase::Idle;
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// When the held data was last confirmed by the service.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// `updated HH:MM:SS` in local time, once data has been confirmed.
    pub fn updated_label(&self) -> Option<String> {
        self.fetched_at
            .map(|at| format!("updated {}", at.with_timezone(&Local).format("%H:%M:%S")))
    }

    pub fn api(&self) -> &Arc<dyn CourseApi> {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryCourseApi;
    use crate::models::Course;

    fn read_courses(api: Arc<dyn CourseApi>, _: ()) -> BoxFuture<Result<Vec<Course>, ApiError>> {
        Box::pin(async move { api.list_courses().await })
    }

    fn remote() -> Remote<(), Vec<Course>> {
        Remote::new(Arc::new(InMemoryCourseApi::new()), read_courses, Message::CoursesLoaded)
    }

    fn course(name: &str) -> Course {
        Course {
            course_name: name.to_string(),
            instructor_id: None,
            instructor_name: "Ada".to_string(),
            instructor_email: None,
            duration: 10,
        }
    }

    #[test]
    fn older_token_cannot_overwrite_newer_response() {
        let mut remote = remote();
        let first = remote.begin(());
        let second = remote.begin(());

        let applied = remote.resolve(Fetched { token: second, result: Ok(vec![course("new")]) });
        assert_eq!(applied, Resolution::Applied);

        let stale = remote.resolve(Fetched { token: first, result: Ok(vec![course("old")]) });
        assert_eq!(stale, Resolution::Stale);
        assert_eq!(remote.data().unwrap()[0].course_name, "new");
        assert_eq!(remote.phase(), &Phase::Ready);
    }

    #[test]
    fn failed_reload_keeps_data_for_same_key() {
        let mut remote = remote();
        let token = remote.begin(());
        remote.resolve(Fetched { token, result: Ok(vec![course("CS101")]) });

        let token = remote.begin(());
        remote.resolve(Fetched {
            token,
            result: Err(ApiError::Transport("Service unavailable".to_string())),
        });

        assert_eq!(remote.phase(), &Phase::Failed("Service unavailable".to_string()));
        assert_eq!(remote.data().map(Vec::len), Some(1));
    }

    #[test]
    fn fetched_at_tracks_the_last_confirmed_read() {
        let mut remote = remote();
        assert!(remote.updated_label().is_none());

        let before = Utc::now();
        let token = remote.begin(());
        remote.resolve(Fetched { token, result: Ok(vec![course("CS101")]) });
        let confirmed = remote.fetched_at().expect("set by a successful read");
        assert!(confirmed >= before);

        let token = remote.begin(());
        remote.resolve(Fetched {
            token,
            result: Err(ApiError::Transport("Service unavailable".to_string())),
        });
        assert_eq!(remote.fetched_at(), Some(confirmed));
        assert!(remote.updated_label().unwrap().starts_with("updated "));

        remote.clear();
        assert!(remote.fetched_at().is_none());
    }

    #[test]
    fn clear_invalidates_in_flight_reads() {
        let mut remote = remote();
        let token = remote.begin(());
        remote.clear();
        assert_eq!(
            remote.resolve(Fetched { token, result: Ok(Vec::new()) }),
            Resolution::Stale
        );
        assert_eq!(remote.phase(), &Phase::Idle);
    }
}
