//! Transport-facing data the pipeline passes between actions.
//!
//! All of it is opaque to the core: the transport adapter fills a [Request]
//! from whatever protocol and URL parsing it does, and turns the final
//! [Response] back into wire format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One incoming unit of work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub path: String,
    /// Named parameters extracted by the transport (query, path segments)
    #[serde(default)]
    pub params: HashMap<String, JsonValue>,
    #[serde(default)]
    pub body: Option<JsonValue>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Request {
        Request {
            method: method.into(),
            path: path.into(),
            params: HashMap::new(),
            body: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: JsonValue) -> Request {
        self.params.insert(name.into(), value);
        self
    }

    pub fn with_body(mut self, body: JsonValue) -> Request {
        self.body = Some(body);
        self
    }
}

/// Response produced by a terminal action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub body: JsonValue,
}

impl Response {
    pub fn ok(body: JsonValue) -> Response {
        Response { status: 200, body }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Response {
        Response {
            status,
            body: serde_json::json!({ "error": message.into() }),
        }
    }
}

/// A matched route: which controller binding handles the request and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Binding key of the controller
    pub controller: String,
    /// Operation name handed to the controller
    pub operation: String,
    /// Argument names parse-args pulls from the request, in call order
    pub args: Vec<String>,
}

impl Route {
    pub fn new(controller: impl Into<String>, operation: impl Into<String>) -> Route {
        Route {
            controller: controller.into(),
            operation: operation.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: &[&str]) -> Route {
        self.args = args.iter().map(|a| a.to_string()).collect();
        self
    }
}

/// Positional invocation arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Args(pub Vec<JsonValue>);
