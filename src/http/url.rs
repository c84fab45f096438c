use std::fmt::Write;

/// `https://athena.<region>.amazonaws.com/`, unless an override is given.
pub(crate) fn construct_endpoint(region: &str, endpoint: Option<&str>) -> String {
    match endpoint {
        Some(url) if url.ends_with('/') => url.to_string(),
        Some(url) => format!("{url}/"),
        None => format!("https://athena.{region}.amazonaws.com/"),
    }
}

/// Splits an absolute URL into its host (with port, if any) and path.
pub(crate) fn split_host_and_path(url: &str) -> Option<(&str, &str)> {
    let (_, rest) = url.split_once("://")?;
    let (host, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, "/"),
    };

    if host.is_empty() {
        None
    } else {
        Some((host, path))
    }
}

/// URI-encodes each segment of `path`, leaving the separators alone.
pub(crate) fn encode_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut encoded = String::with_capacity(path.len());
    for (i, segment) in path.split('/').enumerate() {
        if i > 0 {
            encoded.push('/');
        }
        // Writing into a String cannot fail.
        let _ = encode_into(&mut encoded, segment);
    }

    encoded
}

fn encode_into(buffer: &mut String, input: &str) -> Result<(), std::fmt::Error> {
    for b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                buffer.push(*b as char);
            }
            _ => {
                write!(buffer, "%{:02X}", b)?;
            }
        }
    }

    Ok(())
}
