//! In-memory transport for unit tests: canned responses per route, every
//! request recorded in order.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::error::TransportError;

struct Route {
    method: Method,
    url: String,
    responses: VecDeque<ApiResponse>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: RefCell<Vec<Route>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method url`. Queued responses are consumed in
    /// order; the last one repeats once the queue is down to it.
    pub fn on(self, method: Method, url: &str, status: u16, body: &str) -> Self {
        {
            let mut routes = self.routes.borrow_mut();
            match routes.iter_mut().find(|r| r.method == method && r.url == url) {
                Some(route) => route.responses.push_back(ApiResponse::new(status, body)),
                None => routes.push(Route {
                    method,
                    url: url.to_string(),
                    responses: VecDeque::from([ApiResponse::new(status, body)]),
                }),
            }
        }
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    /// Recorded calls as "METHOD url"
    pub fn calls(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url))
            .collect()
    }

    pub fn count(&self, method: Method, url: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());

        let mut routes = self.routes.borrow_mut();
        let route = routes
            .iter_mut()
            .find(|r| r.method == request.method && r.url == request.url);

        match route {
            Some(route) if route.responses.len() > 1 => Ok(route
                .responses
                .pop_front()
                .expect("queue has more than one response")),
            Some(route) => Ok(route.responses[0].clone()),
            None => Ok(ApiResponse::new(404, r#"{"message":"Not Found"}"#)),
        }
    }
}
