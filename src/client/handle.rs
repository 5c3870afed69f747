//! Request handles: immediate requests with refresh, and deferred (lazy) requests

use super::BlestClient;
use super::view::{Binding, OutcomeView, binding};
use crate::core::types::{RequestId, RequestOptions, RequestOutcome};
use futures::Stream;
use serde_json::Value;
use std::sync::Arc;

/// Handle to an immediate request.
///
/// Follows the id of the latest issue of the call; `refresh` re-issues the
/// same route, parameters and options under a fresh id.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    client: BlestClient,
    route: String,
    parameters: Option<Value>,
    options: RequestOptions,
    binding: Binding,
    view: OutcomeView,
}

impl RequestHandle {
    pub(crate) fn issue(
        client: BlestClient,
        route: String,
        parameters: Option<Value>,
        options: RequestOptions,
    ) -> Self {
        let binding = binding(None);
        let view = OutcomeView::new(client.engine().subscribe(), binding.clone());
        let handle = Self {
            client,
            route,
            parameters,
            options,
            binding,
            view,
        };
        if !handle.options.skip {
            handle.refresh();
        }
        handle
    }

    /// Re-issue the call under a new id and follow it. Returns the new id.
    pub fn refresh(&self) -> RequestId {
        let id = self.client.next_id();
        self.binding.store(Some(Arc::new(id.clone())));
        self.client
            .submit(id.clone(), &self.route, self.parameters.clone(), &self.options);
        id
    }

    /// Id currently followed; `None` for a skipped request never refreshed
    pub fn id(&self) -> Option<RequestId> {
        self.view.id()
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn current(&self) -> RequestOutcome {
        self.view.current()
    }

    /// See [`OutcomeView::next`]
    pub async fn next(&mut self) -> Option<RequestOutcome> {
        self.view.next().await
    }

    /// See [`OutcomeView::settled`]
    pub async fn settled(&mut self) -> Option<RequestOutcome> {
        self.view.settled().await
    }

    /// A separate view following the same request (including future refreshes)
    pub fn view(&self) -> OutcomeView {
        OutcomeView::new(self.client.engine().subscribe(), self.binding.clone())
    }

    pub fn into_stream(self) -> impl Stream<Item = RequestOutcome> + Send + 'static {
        self.view.into_stream()
    }
}

/// Trigger half of a deferred request.
///
/// Each `execute` issues the call under a new id and re-points the paired
/// view at it.
#[derive(Debug, Clone)]
pub struct LazyRequest {
    client: BlestClient,
    route: String,
    options: RequestOptions,
    binding: Binding,
}

impl LazyRequest {
    pub(crate) fn new(
        client: BlestClient,
        route: String,
        options: RequestOptions,
    ) -> (Self, OutcomeView) {
        let binding = binding(None);
        let view = OutcomeView::new(client.engine().subscribe(), binding.clone());
        (
            Self {
                client,
                route,
                options,
                binding,
            },
            view,
        )
    }

    /// Issue the call with `parameters`. Returns the new id.
    pub fn execute(&self, parameters: Option<Value>) -> RequestId {
        let id = self.client.next_id();
        self.binding.store(Some(Arc::new(id.clone())));
        self.client
            .submit(id.clone(), &self.route, parameters, &self.options);
        id
    }

    /// Id of the latest execution, if any
    pub fn id(&self) -> Option<RequestId> {
        self.binding.load_full().map(|id| (*id).clone())
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// Another view following this trigger's latest execution
    pub fn view(&self) -> OutcomeView {
        OutcomeView::new(self.client.engine().subscribe(), self.binding.clone())
    }
}
