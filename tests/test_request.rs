use courier::http::request::{Method, RequestBuilder};

#[test]
fn test_request_header_retrieval() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("Host", "example.com")
        .header("Content-Type", "application/json")
        .build()
        .unwrap();

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_lookup_is_case_insensitive() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("user-AGENT", "curl/8.0")
        .build()
        .unwrap();

    assert_eq!(req.header("User-Agent"), Some("curl/8.0"));
    assert_eq!(req.user_agent(), Some("curl/8.0"));
}

#[test]
fn test_request_repeated_header_first_wins() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("X-Tag", "first")
        .header("x-tag", "second")
        .build()
        .unwrap();

    assert_eq!(req.header("X-Tag"), Some("first"));
    assert_eq!(req.headers.len(), 2);
}

#[test]
fn test_request_empty_user_agent_is_absent() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/user-agent")
        .header("User-Agent", "")
        .build()
        .unwrap();

    assert_eq!(req.header("User-Agent"), Some(""));
    assert_eq!(req.user_agent(), None);
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).path("").build().is_err());
}

#[test]
fn test_request_method_parse() {
    assert_eq!(Method::parse("GET"), Method::GET);
    assert_eq!(Method::parse("POST"), Method::POST);
    assert_eq!(Method::parse("get"), Method::Other("get".to_string())); // Case-sensitive
}

#[test]
fn test_request_method_display_round_trips_token() {
    for token in ["GET", "DELETE", "PROPFIND"] {
        assert_eq!(Method::parse(token).to_string(), token);
    }
}
