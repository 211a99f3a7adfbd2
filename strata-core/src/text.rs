use crate::{Params, Result, Value, placeholder};
use std::fmt::{self, Write};

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Text(String),
    /// Qualifier whose table is decided when the text is rendered.
    Table(String),
}

/// SQL text under construction.
///
/// Mostly plain text, with deferred table qualifiers kept as separate pieces so that the same
/// fragment can be rendered against different table mappings.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SqlText {
    pieces: Vec<Piece>,
}

impl SqlText {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.iter().all(|v| match v {
            Piece::Text(v) => v.is_empty(),
            Piece::Table(..) => false,
        })
    }

    pub fn push(&mut self, c: char) {
        match self.pieces.last_mut() {
            Some(Piece::Text(v)) => v.push(c),
            _ => self.pieces.push(Piece::Text(c.into())),
        }
    }

    pub fn push_str(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        match self.pieces.last_mut() {
            Some(Piece::Text(v)) => v.push_str(value),
            _ => self.pieces.push(Piece::Text(value.into())),
        }
    }

    pub fn push_table(&mut self, name: &str) {
        self.pieces.push(Piece::Table(name.into()));
    }

    pub fn append(&mut self, other: SqlText) {
        for piece in other.pieces {
            match piece {
                Piece::Text(v) => self.push_str(&v),
                v => self.pieces.push(v),
            }
        }
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        match self.pieces.last() {
            Some(Piece::Text(v)) => v.ends_with(suffix),
            _ => false,
        }
    }

    /// Deferred qualifiers in order of appearance.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|v| match v {
            Piece::Table(v) => Some(v.as_str()),
            _ => None,
        })
    }

    /// Produces the final text, asking `resolve` for the replacement of every deferred qualifier.
    pub fn render(&self, mut resolve: impl FnMut(&str) -> Result<String>) -> Result<String> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(v) => out.push_str(v),
                Piece::Table(v) => out.push_str(&resolve(v)?),
            }
        }
        Ok(out)
    }

    /// Replaces the placeholders found in the text pieces, deferred qualifiers are left alone.
    pub fn substitute(
        &self,
        params: &Params,
        mut serialize: impl FnMut(&Value) -> Result<String>,
    ) -> Result<SqlText> {
        let mut positional = 0;
        let mut result = SqlText::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(v) => result.push_str(&placeholder::substitute(
                    v,
                    params,
                    &mut positional,
                    &mut serialize,
                )?),
                v => result.pieces.push(v.clone()),
            }
        }
        Ok(result)
    }
}

impl Write for SqlText {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl From<&str> for SqlText {
    fn from(value: &str) -> Self {
        let mut result = SqlText::new();
        result.push_str(value);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_deferred() {
        let mut text = SqlText::from("SELECT ");
        text.push_table("Model");
        text.push_str(".\"id\" FROM x");
        assert_eq!(text.tables().collect::<Vec<_>>(), ["Model"]);
        assert_eq!(
            text.render(|v| Ok(format!("\"{}\"", v.to_lowercase())))
                .unwrap(),
            r#"SELECT "model"."id" FROM x"#
        );
        assert_eq!(
            text.render(|_| Ok("\"accounts\"".into())).unwrap(),
            r#"SELECT "accounts"."id" FROM x"#
        );
    }

    #[test]
    fn substitute_keeps_tables() {
        let mut text = SqlText::from("(");
        text.push_table("Model");
        text.push_str(".\"status\" = :status)");
        let bound = text
            .substitute(&Params::new().with("status", 1), |v| Ok(format!("{:?}", v)))
            .unwrap();
        assert_eq!(
            bound.render(|v| Ok(v.into())).unwrap(),
            "(Model.\"status\" = Int(1))"
        );
        assert_eq!(
            text.render(|v| Ok(v.into())).unwrap(),
            "(Model.\"status\" = :status)"
        );
    }
}
