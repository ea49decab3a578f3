//! Placeholder substitution for labels and detail rows.
//!
//! `{key}` is replaced when a value for `key` is supplied; anything else is copied
//! through untouched. Substituted text is never re-scanned.

/// Replace `{key}` for each `(key, Some(value))` pair. `None` values leave the placeholder.
pub fn format_named(template: &str, args: &[(&str, Option<&str>)]) -> String {
    substitute(template, |key| {
        args.iter()
            .find_map(|&(k, v)| if k == key { v } else { None })
    })
}

/// Replace `{0}`, `{1}`, … by position, skipping `None` arguments.
pub fn format_positional(template: &str, args: &[Option<&str>]) -> String {
    substitute(template, |key| {
        let idx: usize = key.parse().ok()?;
        if idx.to_string() != key {
            return None;
        }
        args.get(idx).copied().flatten()
    })
}

fn substitute<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        match tail.find('}') {
            Some(close) if !tail[..close].contains('{') => {
                let key = &tail[..close];
                match lookup(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &tail[close + 1..];
            }
            _ => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
