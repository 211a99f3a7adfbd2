use crate::SqlText;

pub fn separated_by<T, F>(
    out: &mut SqlText,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut SqlText, T),
{
    let mut first = true;
    for v in values {
        if !first {
            out.push_str(separator);
        }
        first = false;
        f(out, v);
    }
}

/// Collapses every run of whitespace outside quotes into a single space and trims the ends.
pub fn normalize_whitespace(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut quote = None;
    let mut pending = false;
    for c in value.trim().chars() {
        match quote {
            Some(q) => {
                result.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => pending = true,
            None => {
                if pending {
                    result.push(' ');
                    pending = false;
                }
                if matches!(c, '\'' | '"' | '`') {
                    quote = Some(c);
                }
                result.push(c);
            }
        }
    }
    result
}

/// Finds `needle` outside quoted regions and parentheses, ASCII case insensitive.
pub fn find_top_level(haystack: &str, needle: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let needle = needle.as_bytes();
    let mut quote = None;
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                b'\'' | b'"' | b'`' => quote = Some(c),
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                _ if depth == 0
                    && bytes.len() - i >= needle.len()
                    && bytes[i..i + needle.len()].eq_ignore_ascii_case(needle) =>
                {
                    return Some(i);
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Longest prefix of `value` not exceeding `max` bytes that ends on a char boundary.
pub fn truncate_at(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncate_at(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
        assert_eq!(normalize_whitespace("x = '  y  '"), "x = '  y  '");
    }

    #[test]
    fn top_level() {
        assert_eq!(find_top_level("a = 'b = c'", "="), Some(2));
        assert_eq!(find_top_level("f(a = b) = c", "="), Some(9));
        assert_eq!(find_top_level("a is null", "IS NULL"), Some(2));
        assert_eq!(find_top_level("'='", "="), None);
    }
}
