//! In-memory backend used by the controller, composer and runtime tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use shared::{
    domain::{Metrics, Person, SessionState},
    protocol::Resource,
};
use tokio::sync::Notify;

use crate::{api::DashboardApi, error::SyncError};

pub(crate) fn person(initials: &str, table_index: u32) -> Person {
    Person {
        name: format!("Guest {initials}"),
        initials: initials.to_string(),
        table_index,
    }
}

pub(crate) fn metrics(round_time_minutes: f64, break_time_minutes: f64) -> Metrics {
    Metrics {
        strangers_num: 10.0,
        current_round: 1,
        total_rounds: 4,
        round_time_minutes,
        break_time_minutes,
    }
}

pub(crate) struct FakeApi {
    metrics: Mutex<Metrics>,
    people: Mutex<Vec<Person>>,
    session: Mutex<SessionState>,
    failing: Mutex<Option<Resource>>,
    session_gate: Mutex<Option<Arc<Notify>>>,
    pub(crate) gate_entered: Notify,
    session_calls: AtomicUsize,
}

impl FakeApi {
    pub(crate) fn new(metrics: Metrics, people: Vec<Person>, session_started: bool) -> Self {
        Self {
            metrics: Mutex::new(metrics),
            people: Mutex::new(people),
            session: Mutex::new(SessionState { session_started }),
            failing: Mutex::new(None),
            session_gate: Mutex::new(None),
            gate_entered: Notify::new(),
            session_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_people(&self, people: Vec<Person>) {
        *self.people.lock().expect("people lock") = people;
    }

    pub(crate) fn set_metrics(&self, metrics: Metrics) {
        *self.metrics.lock().expect("metrics lock") = metrics;
    }

    pub(crate) fn set_session_started(&self, session_started: bool) {
        self.session.lock().expect("session lock").session_started = session_started;
    }

    pub(crate) fn fail(&self, resource: Option<Resource>) {
        *self.failing.lock().expect("failing lock") = resource;
    }

    /// The next `/ready` fetch parks until the returned notify fires.
    pub(crate) fn hold_next_session(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.session_gate.lock().expect("gate lock") = Some(gate.clone());
        gate
    }

    pub(crate) fn cycles(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    fn check(&self, resource: Resource) -> Result<(), SyncError> {
        if *self.failing.lock().expect("failing lock") == Some(resource) {
            return Err(SyncError::Status {
                resource,
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn fetch_metrics(&self) -> Result<Metrics, SyncError> {
        self.check(Resource::Metrics)?;
        Ok(self.metrics.lock().expect("metrics lock").clone())
    }

    async fn fetch_people(&self) -> Result<Vec<Person>, SyncError> {
        self.check(Resource::Users)?;
        Ok(self.people.lock().expect("people lock").clone())
    }

    async fn fetch_session(&self) -> Result<SessionState, SyncError> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.session_gate.lock().expect("gate lock").take();
        if let Some(gate) = gate {
            self.gate_entered.notify_one();
            gate.notified().await;
        }
        self.check(Resource::Ready)?;
        Ok(*self.session.lock().expect("session lock"))
    }
}
