//! Request routing.
//!
//! The route table is a static list fixed at compile time. Resolution runs
//! in two passes so that exact paths always beat prefixes:
//!
//! ```text
//!   "/"            exact   → Home
//!   "/hello"       exact   → Hello
//!   "/user-agent"  exact   → UserAgent
//!   "/echo/"       prefix  → Echo(remainder)
//!   "/file/"       prefix  → File(remainder)
//!   anything else          → NotFound
//! ```
//!
//! Prefixes are tried in table order and the first match wins.

pub mod file;
pub mod handlers;

use std::path::PathBuf;

use crate::http::request::Request;
use crate::http::response::Response;

use self::file::FileResponder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Home,
    Hello,
    UserAgent,
    Echo,
    File,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Exact(&'static str),
    /// Matches any path starting with the prefix; the rest is the argument.
    Prefix(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub pattern: Pattern,
    pub handler: Handler,
}

impl Route {
    pub const fn exact(path: &'static str, handler: Handler) -> Self {
        Self {
            pattern: Pattern::Exact(path),
            handler,
        }
    }

    pub const fn prefix(prefix: &'static str, handler: Handler) -> Self {
        Self {
            pattern: Pattern::Prefix(prefix),
            handler,
        }
    }
}

pub static ROUTES: &[Route] = &[
    Route::exact("/", Handler::Home),
    Route::exact("/hello", Handler::Hello),
    Route::exact("/user-agent", Handler::UserAgent),
    Route::prefix("/echo/", Handler::Echo),
    Route::prefix("/file/", Handler::File),
];

/// Result of matching a path against the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub handler: Handler,
    /// Path remainder after a prefix; empty for exact routes.
    pub param: &'a str,
}

pub fn resolve(path: &str) -> RouteMatch<'_> {
    let exact = ROUTES.iter().find_map(|route| match route.pattern {
        Pattern::Exact(p) if p == path => Some(RouteMatch {
            handler: route.handler,
            param: "",
        }),
        _ => None,
    });
    if let Some(found) = exact {
        return found;
    }

    let prefixed = ROUTES.iter().find_map(|route| match route.pattern {
        Pattern::Prefix(p) => path.strip_prefix(p).map(|param| RouteMatch {
            handler: route.handler,
            param,
        }),
        _ => None,
    });

    prefixed.unwrap_or(RouteMatch {
        handler: Handler::NotFound,
        param: "",
    })
}

/// Dispatches requests to handlers. Read-only once built, shared across
/// connections behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Router {
    files: FileResponder,
}

impl Router {
    pub fn new(files_dir: impl Into<PathBuf>) -> Self {
        Self {
            files: FileResponder::new(files_dir),
        }
    }

    pub async fn dispatch(&self, request: &Request) -> Response {
        let matched = resolve(&request.path);
        tracing::debug!(
            path = %request.path,
            handler = ?matched.handler,
            param = matched.param,
            "Route resolved"
        );

        match matched.handler {
            Handler::Home => handlers::home(),
            Handler::Hello => handlers::hello(),
            Handler::UserAgent => handlers::user_agent(request),
            Handler::Echo => handlers::echo(matched.param),
            Handler::File if matched.param.is_empty() => handlers::missing_file_name(),
            Handler::File => self.files.serve(matched.param).await,
            Handler::NotFound => handlers::not_found(),
        }
    }
}
