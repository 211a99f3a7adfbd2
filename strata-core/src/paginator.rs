use crate::{DatabaseError, Query, Result, RowLabeled};
use std::cell::Cell;

/// One page of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub rows: Vec<RowLabeled>,
    /// Page number, from 1.
    pub number: u64,
    pub per_page: u64,
    pub total: u64,
    pub pages: u64,
}

/// Offset and limit of page `page` (from 1) out of `total` rows.
///
/// Reverse pages count from the tail: page 1 holds the last `per_page` rows, rows stay in their
/// natural order. The first reverse page is the short one.
pub fn window(total: u64, per_page: u64, page: u64, reverse: bool) -> Result<(u64, u64)> {
    if page < 1 || per_page < 1 {
        let error = DatabaseError::configuration(format!(
            "Invalid page {} of {} rows per page",
            page, per_page
        ));
        log::error!("{}", error);
        return Err(error.into());
    }
    let skipped = (page - 1).saturating_mul(per_page);
    if !reverse {
        return Ok((skipped, per_page));
    }
    let end = total.saturating_sub(skipped);
    let start = end.saturating_sub(per_page);
    Ok((start, end - start))
}

/// Splits the rows of a SELECT in pages, the total comes from a COUNT run once.
#[derive(Debug)]
pub struct Paginator {
    query: Query,
    per_page: u64,
    reverse: bool,
    total: Cell<Option<u64>>,
}

impl Paginator {
    pub fn new(query: Query, per_page: u64) -> Self {
        Self {
            query,
            per_page,
            reverse: false,
            total: Cell::new(None),
        }
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn total(&self) -> Result<u64> {
        if let Some(total) = self.total.get() {
            return Ok(total);
        }
        let total = self.query.count()?;
        self.total.set(Some(total));
        Ok(total)
    }

    pub fn pages(&self) -> Result<u64> {
        if self.per_page == 0 {
            return Ok(0);
        }
        Ok(self.total()?.div_ceil(self.per_page))
    }

    pub fn page(&self, number: u64) -> Result<Page> {
        let total = self.total()?;
        let (offset, limit) = window(total, self.per_page, number, self.reverse)?;
        let rows = if limit == 0 {
            Vec::new()
        } else {
            self.query
                .clone()
                .limit(limit)
                .offset(offset)
                .select()?
                .collect::<Result<_>>()?
        };
        Ok(Page {
            rows,
            number,
            per_page: self.per_page,
            total,
            pages: self.pages()?,
        })
    }
}
