use crate::{Params, Result, Value};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placeholder<'s> {
    Positional,
    Named(&'s str),
}

/// Index right after the quoted region starting at `start`, doubled quotes do not close it.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Calls `f` for every placeholder outside quoted regions, in order.
///
/// Single pass over the bytes, `::` casts are not placeholders.
pub(crate) fn visit<'s>(
    template: &'s str,
    mut f: impl FnMut(Placeholder<'s>, Range<usize>) -> Result<()>,
) -> Result<()> {
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => i = skip_quoted(bytes, i),
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes
                .get(i + 1)
                .is_some_and(|c| c.is_ascii_alphabetic() || *c == b'_') =>
            {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                {
                    end += 1;
                }
                f(Placeholder::Named(&template[start..end]), i..end)?;
                i = end;
            }
            b'?' => {
                f(Placeholder::Positional, i..i + 1)?;
                i += 1;
            }
            _ => i += 1,
        }
    }
    Ok(())
}

/// Replaces `?` and `:name` placeholders with serialized values.
///
/// `positional` is the index of the next positional value, it is advanced for each `?` that was
/// replaced. Placeholders without a value are left as they are.
pub(crate) fn substitute(
    template: &str,
    params: &Params,
    positional: &mut usize,
    serialize: &mut impl FnMut(&Value) -> Result<String>,
) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut copied = 0;
    visit(template, |placeholder, range| {
        let value = match placeholder {
            Placeholder::Named(name) => params.named.get(name),
            Placeholder::Positional => {
                let value = params.positional.get(*positional);
                if value.is_some() {
                    *positional += 1;
                }
                value
            }
        };
        if let Some(value) = value {
            out.push_str(&template[copied..range.start]);
            out.push_str(&serialize(value)?);
            copied = range.end;
        }
        Ok(())
    })?;
    out.push_str(&template[copied..]);
    Ok(out)
}

/// Names of the named placeholders in `template`.
pub(crate) fn names(template: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let _ = visit(template, |placeholder, _| {
        if let Placeholder::Named(name) = placeholder {
            result.push(name);
        }
        Ok(())
    });
    result
}
