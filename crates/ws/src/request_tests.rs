// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[test]
fn builds_request_with_headers() {
    let request = StaticUrlRequest::new("ws://127.0.0.1:9000/feed")
        .header("x-token", "secret")
        .headers([("x-client", "tether")])
        .create()
        .unwrap();

    assert_eq!(request.uri().path(), "/feed");
    assert_eq!(request.headers()["x-token"], "secret");
    assert_eq!(request.headers()["x-client"], "tether");
    // Handshake headers are still generated.
    assert!(request.headers().contains_key("sec-websocket-key"));
}

#[test]
fn repeated_headers_are_kept() {
    let request = StaticUrlRequest::new("ws://localhost/")
        .header("x-tag", "a")
        .header("x-tag", "b")
        .create()
        .unwrap();
    let values: Vec<_> = request.headers().get_all("x-tag").iter().collect();
    assert_eq!(values, vec!["a", "b"]);
}

#[parameterized(
    not_a_url = { StaticUrlRequest::new("not a url") },
    bad_header_name = { StaticUrlRequest::new("ws://localhost/").header("bad header", "x") },
    bad_header_value = { StaticUrlRequest::new("ws://localhost/").header("x-ok", "line\nbreak") },
)]
fn invalid_requests_are_rejected(request: StaticUrlRequest) {
    let err = request.create().unwrap_err();
    assert!(matches!(err, TransportError::InvalidRequest(_)), "{err:?}");
}
