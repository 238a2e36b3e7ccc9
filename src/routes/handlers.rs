use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

pub const HOME_BODY: &str = "<html><h1><b>Hello World!</b></h1></html>";
pub const HELLO_BODY: &str = "<html>Hello!</html>";

pub fn home() -> Response {
    Response::html(StatusCode::Ok, HOME_BODY)
}

pub fn hello() -> Response {
    Response::html(StatusCode::Ok, HELLO_BODY)
}

/// Echoes the path remainder back as plain text.
pub fn echo(text: &str) -> Response {
    if text.is_empty() {
        return Response::html(StatusCode::BadRequest, "<html>No body found</html>");
    }
    Response::plain(StatusCode::Ok, text)
}

pub fn user_agent(request: &Request) -> Response {
    match request.user_agent() {
        Some(agent) => Response::plain(StatusCode::Ok, agent),
        None => Response::plain(StatusCode::NotFound, "User-Agent header not found"),
    }
}

pub fn missing_file_name() -> Response {
    Response::html(StatusCode::BadRequest, "<html>No filename specified</html>")
}

pub fn not_found() -> Response {
    Response::not_found()
}
