//! Request header building and response header parsing.

use std::collections::HashMap;

/// `Authorization: Token <token>`. A missing token is sent as an empty credential.
pub fn auth_headers(token: Option<&str>) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert(
        "Authorization".to_string(),
        format!("Token {}", token.unwrap_or("").trim()),
    );
    headers
}

/// `Content-Length` of a single raw header line, if that is what the line is.
pub fn content_length(line: &str) -> Option<u64> {
    let (name, value) = line.trim().split_once(':')?;
    if name.trim().eq_ignore_ascii_case("content-length") {
        value.trim().parse::<u64>().ok()
    } else {
        None
    }
}
