//! Sending one query through a rotating list of hosts.
//!
//! The first host gets the query on the next tick. If it has not answered
//! within `rotate`, the next host is tried while the first one may still
//! answer. After the last host, the query waits `timeout` for stragglers
//! and then fails.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use iconify_core::IconSet;

use crate::config::ApiConfig;
use crate::modules::{ApiModule, ApiQuery, QueryResponse};
use crate::scheduler::Scheduler;

/// Final (or late) result reported to the caller of [`send_query`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Success(IconSet),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Pending,
    Completed,
    Failed,
    Aborted,
}

type DoneCallback = Box<dyn FnMut(QueryOutcome)>;

struct QueryState {
    config: Rc<RefCell<ApiConfig>>,
    module: Rc<dyn ApiModule>,
    scheduler: Rc<dyn Scheduler>,
    query: ApiQuery,
    resources: VecDeque<String>,
    status: QueryStatus,
    /// Sends still waiting for an answer.
    in_flight: Vec<u64>,
    next_send: u64,
    /// Armed timer. Firing timers with another id are stale.
    timer: Option<u64>,
    next_timer: u64,
    queries_sent: usize,
    done: Option<DoneCallback>,
}

impl QueryState {
    fn reset_timer(&mut self) {
        self.timer = None;
    }

    fn arm_timer(&mut self) -> u64 {
        let id = self.next_timer;
        self.next_timer += 1;
        self.timer = Some(id);
        id
    }

    /// Disarm the timer if `id` is the armed one.
    fn fire_timer(&mut self, id: u64) -> bool {
        if self.timer == Some(id) {
            self.timer = None;
            true
        } else {
            false
        }
    }
}

/// Handle of a running query.
#[derive(Clone)]
pub struct QueryHandle {
    state: Rc<RefCell<QueryState>>,
}

impl QueryHandle {
    pub fn status(&self) -> QueryStatus {
        self.state.borrow().status
    }

    /// Number of hosts the query was sent to so far.
    pub fn queries_sent(&self) -> usize {
        self.state.borrow().queries_sent
    }

    pub fn query(&self) -> ApiQuery {
        self.state.borrow().query.clone()
    }

    /// Stop the query. Pending answers are ignored and `done` is not called.
    pub fn abort(&self) {
        let mut state = self.state.borrow_mut();
        if state.status == QueryStatus::Pending {
            state.status = QueryStatus::Aborted;
        }
        state.reset_timer();
        state.in_flight.clear();
    }
}

impl std::fmt::Debug for QueryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("QueryHandle")
            .field("query", &state.query)
            .field("status", &state.status)
            .field("queries_sent", &state.queries_sent)
            .finish()
    }
}

/// Host order for one query.
fn resource_order(config: &ApiConfig) -> VecDeque<String> {
    let count = config.resources.len();
    if count == 0 {
        return VecDeque::new();
    }
    let start = if config.random {
        random_index(count)
    } else {
        config.index % count
    };
    config.resources[start..]
        .iter()
        .chain(config.resources[..start].iter())
        .cloned()
        .collect()
}

/// Start host for randomized configs, seeded from the clock.
fn random_index(count: usize) -> usize {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    nanos as usize % count
}

/// Send `query` using the hosts of `config`.
///
/// `done` receives [`QueryOutcome::Success`] once a host returns data, or
/// [`QueryOutcome::Failed`] when every host failed. With
/// `data_after_timeout`, a late success may follow a failure.
pub fn send_query(
    config: Rc<RefCell<ApiConfig>>,
    module: Rc<dyn ApiModule>,
    scheduler: Rc<dyn Scheduler>,
    query: ApiQuery,
    done: DoneCallback,
) -> QueryHandle {
    let resources = resource_order(&config.borrow());
    let state = Rc::new(RefCell::new(QueryState {
        config,
        module,
        scheduler: scheduler.clone(),
        query,
        resources,
        status: QueryStatus::Pending,
        in_flight: Vec::new(),
        next_send: 0,
        timer: None,
        next_timer: 0,
        queries_sent: 0,
        done: Some(done),
    }));

    let start = state.clone();
    scheduler.schedule(Duration::ZERO, Box::new(move || exec_next(&start)));
    QueryHandle { state }
}

/// Send to the next host, or wait for stragglers if none is left.
fn exec_next(this: &Rc<RefCell<QueryState>>) {
    let (module, host, query, send_id) = {
        let mut state = this.borrow_mut();
        if state.status != QueryStatus::Pending {
            return;
        }
        state.reset_timer();

        let Some(host) = state.resources.pop_front() else {
            if state.in_flight.is_empty() {
                drop(state);
                fail_query(this);
                return;
            }
            let timer = state.arm_timer();
            let timeout = state.config.borrow().timeout_interval();
            let scheduler = state.scheduler.clone();
            drop(state);
            let owner = this.clone();
            scheduler.schedule(
                timeout,
                Box::new(move || {
                    let expired = {
                        let mut state = owner.borrow_mut();
                        state.fire_timer(timer) && state.status == QueryStatus::Pending
                    };
                    if expired {
                        owner.borrow_mut().in_flight.clear();
                        fail_query(&owner);
                    }
                }),
            );
            return;
        };

        let send_id = state.next_send;
        state.next_send += 1;
        state.in_flight.push(send_id);
        state.queries_sent += 1;

        let timer = state.arm_timer();
        let rotate = state.config.borrow().rotate_interval();
        let owner = this.clone();
        state.scheduler.schedule(
            rotate,
            Box::new(move || {
                let due = owner.borrow_mut().fire_timer(timer);
                if due {
                    exec_next(&owner);
                }
            }),
        );

        (state.module.clone(), host, state.query.clone(), send_id)
    };

    tracing::debug!(
        target: "iconify_api::redundancy",
        "Sending query for {}:{} ({} icons) to {}",
        query.provider,
        query.prefix,
        query.icons.len(),
        host
    );

    let owner = this.clone();
    let responding_host = host.clone();
    module.send(
        &host,
        &query,
        Box::new(move |response| module_response(&owner, send_id, &responding_host, response)),
    );
}

fn module_response(this: &Rc<RefCell<QueryState>>, send_id: u64, host: &str, response: QueryResponse) {
    let is_error = !matches!(response, QueryResponse::Success(_));
    {
        let mut state = this.borrow_mut();
        state.in_flight.retain(|id| *id != send_id);
        match state.status {
            QueryStatus::Pending => {}
            QueryStatus::Failed => {
                if is_error || !state.config.borrow().data_after_timeout {
                    return;
                }
            }
            QueryStatus::Completed | QueryStatus::Aborted => return,
        }
    }

    match response {
        QueryResponse::Abort => {
            tracing::debug!(target: "iconify_api::redundancy", "Host {} aborted the query", host);
            fail_query(this);
        }
        QueryResponse::Next => {
            let (idle, exhausted) = {
                let state = this.borrow();
                (state.in_flight.is_empty(), state.resources.is_empty())
            };
            tracing::debug!(target: "iconify_api::redundancy", "Host {} failed", host);
            if idle {
                if exhausted {
                    fail_query(this);
                } else {
                    exec_next(this);
                }
            }
        }
        QueryResponse::Success(data) => {
            {
                let mut state = this.borrow_mut();
                state.reset_timer();
                state.in_flight.clear();
                let mut config = state.config.borrow_mut();
                if !config.random {
                    if let Some(index) = config.resources.iter().position(|r| r == host) {
                        if index != config.index {
                            tracing::debug!(
                                target: "iconify_api::redundancy",
                                "Promoting {} to primary host",
                                host
                            );
                            config.index = index;
                        }
                    }
                }
                drop(config);
                state.status = QueryStatus::Completed;
            }
            call_done(this, QueryOutcome::Success(data));
        }
    }
}

fn fail_query(this: &Rc<RefCell<QueryState>>) {
    {
        let mut state = this.borrow_mut();
        state.status = QueryStatus::Failed;
        state.reset_timer();
    }
    call_done(this, QueryOutcome::Failed);
}

/// Run `done` without holding a borrow, so it may inspect the query.
fn call_done(this: &Rc<RefCell<QueryState>>, outcome: QueryOutcome) {
    let callback = this.borrow_mut().done.take();
    if let Some(mut callback) = callback {
        callback(outcome);
        let mut state = this.borrow_mut();
        if state.done.is_none() {
            state.done = Some(callback);
        }
    }
}
