/// Clause currently being written, some renderings depend on it.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlDeleteFrom,
    SqlInsertInto,
    SqlInsertIntoOnConflict,
    SqlJoin,
    SqlReturning,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectGroupBy,
    SqlSelectOrderBy,
    SqlSelectWhere,
    SqlUpdate,
    SqlUpdateSet,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub fragment: Fragment,
}

impl Context {
    pub fn new(fragment: Fragment) -> Self {
        Self { fragment }
    }
}
