use crate::{
    SqlText, find_top_level, normalize_whitespace,
    writer::{Context, SqlWriter},
};

/// Whether a qualifier names an application model rather than a table.
///
/// Models are capitalized or namespaced (`App\User`, `app::User`).
pub fn looks_like_model(token: &str) -> bool {
    token.contains('\\')
        || token.contains("::")
        || token.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Whether `text` reads like a join condition rather than an alias.
///
/// Best effort: any comparison operator or a `LIKE`, `IN`, `IS`, `BETWEEN` keyword outside
/// quotes makes it a condition.
pub fn looks_like_condition(text: &str) -> bool {
    let mut unquoted = String::with_capacity(text.len());
    let mut quote = None;
    for c in text.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(..) => {}
            None if matches!(c, '\'' | '"' | '`') => {
                quote = Some(c);
                unquoted.push(' ');
            }
            None => unquoted.push(c),
        }
    }
    if unquoted.contains(['=', '<', '>']) {
        return true;
    }
    unquoted
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| {
            ["LIKE", "IN", "IS", "BETWEEN"]
                .iter()
                .any(|k| word.eq_ignore_ascii_case(k))
        })
}

fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    for q in ['"', '`', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(q) && trimmed.ends_with(q) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

fn balanced(value: &str) -> bool {
    let mut depth = 0i32;
    let mut quote = None;
    for c in value.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(..) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            },
        }
    }
    depth == 0 && quote.is_none()
}

/// Splits a trailing ` AS alias` or bare-word alias from an already normalized expression.
pub fn split_alias(value: &str) -> (&str, Option<&str>) {
    if let Some(i) = find_top_level(value, " AS ") {
        return (value[..i].trim(), Some(unquote(&value[i + 4..])));
    }
    if let Some((head, tail)) = value.rsplit_once(' ') {
        let head = head.trim_end();
        let is_word = !tail.is_empty()
            && tail.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !tail.chars().next().is_some_and(|c| c.is_ascii_digit());
        let operand_ends = !head.ends_with(|c: char| "+-*/%=<>,|&^!(".contains(c));
        if is_word && operand_ends && !head.is_empty() && balanced(head) && !head.contains(' ') {
            return (head, Some(tail));
        }
        if is_word && operand_ends && head.ends_with(')') && balanced(head) {
            return (head, Some(tail));
        }
    }
    (value, None)
}

/// Whether `value` is a dotted path of identifiers that can be quoted segment by segment.
fn is_plain_path(value: &str) -> bool {
    if value.is_empty()
        || value.parse::<f64>().is_ok()
        || !value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '*' | '$' | '\\' | ':'))
    {
        return false;
    }
    match (value.find('.'), value.rfind("::")) {
        (_, None) => true,
        (Some(dot), Some(cast)) => cast < dot,
        (None, Some(..)) => false,
    }
}

/// Quotes an identifier expression, resolving its qualifier when needed.
///
/// Anything that is not a plain dotted path (function calls, quoted text, arithmetic) is kept
/// verbatim. The qualifier becomes a deferred table piece when `resolving` is set or when it
/// looks like a model, so it can be mapped to a table at render time.
pub fn protect_identifier(
    writer: &dyn SqlWriter,
    context: &mut Context,
    out: &mut SqlText,
    raw: &str,
    alias: Option<&str>,
    resolving: bool,
) {
    let normalized = normalize_whitespace(raw);
    let (expression, alias) = match alias {
        Some(alias) => (normalized.as_str(), Some(alias)),
        None => split_alias(&normalized),
    };
    if !is_plain_path(expression) {
        out.push_str(expression);
    } else {
        match expression.split_once('.') {
            Some((qualifier, column)) if !qualifier.is_empty() && !column.is_empty() => {
                if resolving || looks_like_model(qualifier) {
                    out.push_table(qualifier);
                } else {
                    writer.write_identifier_quoted(context, out, qualifier);
                }
                out.push('.');
                writer.write_identifier_path(context, out, column);
            }
            _ => writer.write_identifier_path(context, out, expression),
        }
    }
    if let Some(alias) = alias {
        writer.write_alias(context, out, alias);
    }
}
