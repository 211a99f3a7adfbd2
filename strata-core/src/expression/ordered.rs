use crate::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    ASC,
    DESC,
}

/// ORDER BY item, without an explicit order the direction is whatever the expression says.
#[derive(Debug, Clone)]
pub struct Ordered {
    pub expression: Column,
    pub order: Option<Order>,
}

impl Ordered {
    pub fn new(expression: impl Into<Column>, order: Option<Order>) -> Self {
        Self {
            expression: expression.into(),
            order,
        }
    }
}
