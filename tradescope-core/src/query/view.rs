//! Borrowed view over a dataset: an ordered list of row indices.

use crate::domain::Record;

/// The rows currently shown, in display order.
///
/// Rows are indices into the owning dataset, so every row of a view is by
/// construction a record of that dataset.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    dataset: &'a [Record],
    rows: &'a [usize],
}

impl<'a> View<'a> {
    /// Build a view over `dataset`, or `None` if any row index is out of
    /// range.
    pub fn new(dataset: &'a [Record], rows: &'a [usize]) -> Option<Self> {
        rows.iter()
            .all(|&r| r < dataset.len())
            .then_some(Self { dataset, rows })
    }

    /// Caller guarantees every index in `rows` is in range.
    pub(crate) fn over(dataset: &'a [Record], rows: &'a [usize]) -> Self {
        debug_assert!(rows.iter().all(|&r| r < dataset.len()));
        Self { dataset, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dataset indices in display order.
    pub fn rows(&self) -> &'a [usize] {
        self.rows
    }

    pub fn get(&self, position: usize) -> Option<&'a Record> {
        self.rows.get(position).map(|&r| &self.dataset[r])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + 'a {
        let dataset = self.dataset;
        self.rows.iter().map(move |&r| &dataset[r])
    }

    /// Column names in first-seen order across the dataset.
    ///
    /// Uses the whole dataset rather than the visible rows so headers stay
    /// put while a filter narrows the view.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in self.dataset {
            for c in record.columns() {
                if !columns.iter().any(|known| known == c) {
                    columns.push(c.to_string());
                }
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_iterates_in_row_order() {
        let dataset = vec![
            Record::new().with("id", 0i64),
            Record::new().with("id", 1i64),
            Record::new().with("id", 2i64).with("extra", "x"),
        ];
        let rows = [2, 0];
        let view = View::new(&dataset, &rows).unwrap();
        let ids: Vec<String> = view.iter().map(|r| r.text("id")).collect();
        assert_eq!(ids, ["2", "0"]);
        assert_eq!(view.get(1).unwrap().text("id"), "0");
        assert!(view.get(2).is_none());
        assert_eq!(view.columns(), ["id", "extra"]);
    }

    #[test]
    fn out_of_range_rows_are_rejected() {
        let dataset = vec![Record::new().with("id", 0i64)];
        assert!(View::new(&dataset, &[0, 1]).is_none());
        assert!(View::new(&dataset, &[]).is_some());
        assert!(View::new(&[], &[0]).is_none());
    }
}
