use crate::{Condition, looks_like_condition, normalize_whitespace, split_alias};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// One argument after the joined table: either text (alias or ON expression) or a condition.
#[derive(Debug, Clone)]
pub enum JoinArg {
    Text(String),
    Condition(Condition),
}

/// Alias and/or ON condition of a join, accepted in either order.
///
/// ```rust
/// use strata_core::{Condition, Dialect, JoinArgs};
/// let _: JoinArgs = "p".into();
/// let _: JoinArgs = "p.user_id = u.id".into();
/// let _: JoinArgs = ("p", "p.user_id = u.id").into();
/// let _: JoinArgs = (Condition::new(Dialect::Sqlite), "p").into();
/// ```
#[derive(Default, Debug, Clone)]
pub struct JoinArgs(pub Vec<JoinArg>);

impl From<()> for JoinArgs {
    fn from(_: ()) -> Self {
        Default::default()
    }
}

impl From<&str> for JoinArgs {
    fn from(value: &str) -> Self {
        JoinArgs(vec![JoinArg::Text(value.into())])
    }
}

impl From<String> for JoinArgs {
    fn from(value: String) -> Self {
        JoinArgs(vec![JoinArg::Text(value)])
    }
}

impl From<Condition> for JoinArgs {
    fn from(value: Condition) -> Self {
        JoinArgs(vec![JoinArg::Condition(value)])
    }
}

impl From<(&str, &str)> for JoinArgs {
    fn from((a, b): (&str, &str)) -> Self {
        JoinArgs(vec![JoinArg::Text(a.into()), JoinArg::Text(b.into())])
    }
}

impl From<(&str, Condition)> for JoinArgs {
    fn from((a, b): (&str, Condition)) -> Self {
        JoinArgs(vec![JoinArg::Text(a.into()), JoinArg::Condition(b)])
    }
}

impl From<(Condition, &str)> for JoinArgs {
    fn from((a, b): (Condition, &str)) -> Self {
        JoinArgs(vec![JoinArg::Condition(a), JoinArg::Text(b.into())])
    }
}

/// ON clause of a join before it is turned into a condition.
#[derive(Debug, Clone)]
pub enum JoinOn {
    Expression(String),
    Condition(Condition),
}

/// What the arguments of a join mean.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    pub table: String,
    pub alias: Option<String>,
    pub on: Option<JoinOn>,
}

/// Decides which join argument is the alias and which one is the condition.
///
/// The table may embed its alias (`posts p`, `posts AS p`). Text arguments that look like a
/// comparison are conditions, the others are aliases. Two aliases make the second one a
/// condition anyway, the caller clearly meant one of each.
pub fn disambiguate_join_args(table: &str, args: JoinArgs) -> JoinSpec {
    let normalized = normalize_whitespace(table);
    let (table, embedded) = split_alias(&normalized);
    let mut result = JoinSpec {
        table: table.to_string(),
        alias: embedded.map(str::to_string),
        on: None,
    };
    for arg in args.0 {
        match arg {
            JoinArg::Condition(condition) => result.on = Some(JoinOn::Condition(condition)),
            JoinArg::Text(text) => {
                let text = normalize_whitespace(&text);
                if text.is_empty() {
                    continue;
                }
                let alias = text
                    .strip_prefix("AS ")
                    .or_else(|| text.strip_prefix("as "))
                    .unwrap_or(&text);
                if looks_like_condition(&text) || result.alias.is_some() {
                    result.on = Some(JoinOn::Expression(text));
                } else {
                    result.alias = Some(alias.to_string());
                }
            }
        }
    }
    result
}
