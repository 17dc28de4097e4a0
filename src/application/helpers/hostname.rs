/// Maximum total hostname length (RFC 1035).
const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of a single label.
const MAX_LABEL_LEN: usize = 63;

/// Normalize tenant-supplied domain input to a bare hostname: lowercase,
/// no scheme, no leading `www.`, no trailing slashes, no surrounding
/// whitespace.
///
/// Runs to a fixed point, so the function is idempotent for every input
/// (including pathological ones like `www.www.example.com`).
pub fn normalize_hostname(raw: &str) -> String {
    let mut host = raw.to_ascii_lowercase();
    loop {
        let before = host.clone();
        host = host.trim().trim_end_matches('/').to_string();
        for prefix in ["http://", "https://", "www."] {
            if let Some(rest) = host.strip_prefix(prefix) {
                host = rest.to_string();
            }
        }
        if host == before {
            return host;
        }
    }
}

/// Validate an already-normalized hostname: dot-separated labels of
/// alphanumerics and hyphens (no edge hyphens), at least two labels, and a
/// TLD of at least two characters.
pub fn is_valid_hostname(host: &str) -> bool {
    if host.is_empty() || host.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let tld = labels[labels.len() - 1];
    if tld.len() < 2 {
        return false;
    }

    labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    })
}
