//! Generic in-memory data table: column descriptors, search, sort and pagination.
//!
//! Every resource screen renders through [`DataTable`]. All rows are resident in
//! memory; there is no server-side paging. Cells are produced by column accessors
//! returning a [`CellValue`], so a malformed or absent field degrades to `N/A`
//! instead of failing the screen.
use std::cmp::Ordering;

use crate::resources::Lookups;

pub const NOT_AVAILABLE: &str = "N/A";

/// A single rendered cell, typed enough to sort sensibly.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Missing,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Money-style number with two decimals.
    pub fn amount(v: f64) -> Self {
        CellValue::Number(v)
    }

    pub fn display(&self) -> String {
        match self {
            CellValue::Missing => NOT_AVAILABLE.to_string(),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{n:.0}"),
            CellValue::Number(n) if n.is_finite() => format!("{n:.2}"),
            CellValue::Number(_) => NOT_AVAILABLE.to_string(),
            CellValue::Text(s) if s.trim().is_empty() => NOT_AVAILABLE.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(true) => "Yes".to_string(),
            CellValue::Bool(false) => "No".to_string(),
        }
    }

    fn searchable_text(&self) -> Option<String> {
        match self {
            CellValue::Missing => None,
            other => Some(other.display().to_lowercase()),
        }
    }

    /// Numbers compare numerically, everything else lexicographically; missing first.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Missing, CellValue::Missing) => Ordering::Equal,
            (CellValue::Missing, _) => Ordering::Less,
            (_, CellValue::Missing) => Ordering::Greater,
            (CellValue::Number(a), CellValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (a, b) => a.display().cmp(&b.display()),
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

pub type Accessor<R> = fn(&R, &Lookups) -> CellValue;

/// Column descriptor: key, header, cell renderer and capabilities.
pub struct Column<R> {
    pub key: &'static str,
    pub header: &'static str,
    pub accessor: Accessor<R>,
    pub sortable: bool,
    /// Preferred width in terminal cells; 0 lets the column share leftover space.
    pub width: u16,
}

impl<R> Column<R> {
    pub fn new(key: &'static str, header: &'static str, accessor: Accessor<R>) -> Self {
        Self {
            key,
            header,
            accessor,
            sortable: false,
            width: 0,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn value(&self, row: &R, lookups: &Lookups) -> CellValue {
        (self.accessor)(row, lookups)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Debug)]
pub struct TableConfig {
    pub searchable: bool,
    /// Column key to search; `None` searches every column.
    pub search_column: Option<&'static str>,
    pub paginated: bool,
    pub page_size_options: Vec<usize>,
    pub empty_message: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            searchable: true,
            search_column: None,
            paginated: true,
            page_size_options: vec![10, 25, 50],
            empty_message: "No records found".to_string(),
        }
    }
}

/// Interactive state of one table instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableState {
    pub query: String,
    pub sort: Option<(usize, SortDirection)>,
    /// Column the sort key acts on.
    pub focused_column: usize,
    pub page: usize,
    pub page_size: usize,
    /// Row index within the current page.
    pub selected: usize,
}

/// What to draw for the current state.
#[derive(Debug)]
pub struct TableView<'a, R> {
    pub rows: Vec<&'a R>,
    /// Size of the filtered set across all pages.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub selected: usize,
    pub loading: bool,
}

impl<R> TableView<'_, R> {
    pub fn is_empty(&self) -> bool {
        !self.loading && self.total == 0
    }
}

pub struct DataTable<R> {
    columns: Vec<Column<R>>,
    config: TableConfig,
    state: TableState,
}

impl<R> DataTable<R> {
    pub fn new(columns: Vec<Column<R>>, config: TableConfig) -> Self {
        let page_size = config.page_size_options.first().copied().unwrap_or(10).max(1);
        Self {
            columns,
            config,
            state: TableState {
                query: String::new(),
                sort: None,
                focused_column: 0,
                page: 0,
                page_size,
                selected: 0,
            },
        }
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
        self.state.page = 0;
        self.state.selected = 0;
    }

    pub fn push_query(&mut self, c: char) {
        let mut q = std::mem::take(&mut self.state.query);
        q.push(c);
        self.set_query(q);
    }

    pub fn pop_query(&mut self) {
        let mut q = std::mem::take(&mut self.state.query);
        q.pop();
        self.set_query(q);
    }

    /// Header click: ascending first, then flip. Non-sortable columns are ignored.
    pub fn toggle_sort(&mut self, column: usize) -> bool {
        if !self.columns.get(column).is_some_and(|c| c.sortable) {
            return false;
        }
        self.state.sort = match self.state.sort {
            Some((c, SortDirection::Asc)) if c == column => Some((column, SortDirection::Desc)),
            Some((c, SortDirection::Desc)) if c == column => Some((column, SortDirection::Asc)),
            _ => Some((column, SortDirection::Asc)),
        };
        self.state.focused_column = column;
        self.state.selected = 0;
        true
    }

    pub fn sort_focused(&mut self) -> bool {
        self.toggle_sort(self.state.focused_column)
    }

    pub fn focus_column(&mut self, forward: bool) {
        let n = self.columns.len();
        if n == 0 {
            return;
        }
        self.state.focused_column = if forward {
            (self.state.focused_column + 1) % n
        } else {
            (self.state.focused_column + n - 1) % n
        };
    }

    fn matches(&self, row: &R, needle: &str, lookups: &Lookups) -> bool {
        let mut candidates = self
            .columns
            .iter()
            .filter(|c| self.config.search_column.is_none_or(|key| key == c.key));
        candidates.any(|c| {
            c.value(row, lookups)
                .searchable_text()
                .is_some_and(|t| t.contains(needle))
        })
    }

    /// Rows matching the current query, in input order.
    pub fn filter<'a>(&self, rows: &'a [R], lookups: &Lookups) -> Vec<&'a R> {
        let needle = self.state.query.trim().to_lowercase();
        if !self.config.searchable || needle.is_empty() {
            return rows.iter().collect();
        }
        rows.iter().filter(|r| self.matches(r, &needle, lookups)).collect()
    }

    /// Filtered and sorted rows. Descending is the exact reverse of ascending.
    pub fn arrange<'a>(&self, rows: &'a [R], lookups: &Lookups) -> Vec<&'a R> {
        let mut out = self.filter(rows, lookups);
        if let Some((idx, dir)) = self.state.sort {
            if let Some(col) = self.columns.get(idx) {
                let mut keyed: Vec<(CellValue, &'a R)> =
                    out.into_iter().map(|r| (col.value(r, lookups), r)).collect();
                keyed.sort_by(|a, b| a.0.compare(&b.0));
                if dir == SortDirection::Desc {
                    keyed.reverse();
                }
                out = keyed.into_iter().map(|(_, r)| r).collect();
            }
        }
        out
    }

    pub fn page_count(&self, total: usize) -> usize {
        if !self.config.paginated {
            return 1;
        }
        total.div_ceil(self.state.page_size.max(1)).max(1)
    }

    pub fn view<'a>(&self, rows: &'a [R], lookups: &Lookups, loading: bool) -> TableView<'a, R> {
        let arranged = self.arrange(rows, lookups);
        let total = arranged.len();
        let page_count = self.page_count(total);
        let page = self.state.page.min(page_count - 1);
        let rows: Vec<&'a R> = if self.config.paginated {
            let size = self.state.page_size.max(1);
            arranged.into_iter().skip(page * size).take(size).collect()
        } else {
            arranged
        };
        let selected = self.state.selected.min(rows.len().saturating_sub(1));
        TableView {
            rows,
            total,
            page,
            page_count,
            selected,
            loading,
        }
    }

    pub fn selected_row<'a>(&self, rows: &'a [R], lookups: &Lookups) -> Option<&'a R> {
        let view = self.view(rows, lookups, false);
        view.rows.get(view.selected).copied()
    }

    pub fn next_page(&mut self, total: usize) {
        let last = self.page_count(total) - 1;
        self.state.page = (self.state.page.min(last) + 1).min(last);
        self.state.selected = 0;
    }

    pub fn prev_page(&mut self) {
        self.state.page = self.state.page.saturating_sub(1);
        self.state.selected = 0;
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.state.page_size = size.max(1);
        self.state.page = 0;
        self.state.selected = 0;
    }

    /// Advance to the next configured page size, wrapping around.
    pub fn cycle_page_size(&mut self) -> usize {
        let opts = &self.config.page_size_options;
        let next = match opts.iter().position(|s| *s == self.state.page_size) {
            Some(i) => opts.get(i + 1).or(opts.first()).copied(),
            None => opts.first().copied(),
        };
        self.set_page_size(next.unwrap_or(self.state.page_size));
        self.state.page_size
    }

    pub fn select_next(&mut self, rows_on_page: usize) {
        if self.state.selected + 1 < rows_on_page {
            self.state.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.state.selected = self.state.selected.saturating_sub(1);
    }

    /// Select the row at `index` of the arranged set, moving to its page.
    pub fn select_absolute(&mut self, index: usize) {
        if self.config.paginated {
            let size = self.state.page_size.max(1);
            self.state.page = index / size;
            self.state.selected = index % size;
        } else {
            self.state.selected = index;
        }
    }

    pub fn cell_text(&self, row: &R, column: usize, lookups: &Lookups) -> String {
        self.columns
            .get(column)
            .map(|c| c.value(row, lookups).display())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: u32,
        name: &'static str,
        amount: Option<f64>,
        note: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, name: "Wanjiru", amount: Some(1500.0), note: "school fees" },
            Row { id: 2, name: "otieno", amount: Some(200.5), note: "Farm inputs" },
            Row { id: 3, name: "Achieng", amount: None, note: "" },
            Row { id: 4, name: "kamau", amount: Some(1500.0), note: "Emergency" },
            Row { id: 5, name: "Njeri", amount: Some(99.0), note: "school uniform" },
        ]
    }

    fn table(search_column: Option<&'static str>, page_size: usize) -> DataTable<Row> {
        DataTable::new(
            vec![
                Column::new("id", "ID", |r: &Row, _| r.id.into()).sortable(),
                Column::new("name", "Name", |r: &Row, _| r.name.into()).sortable(),
                Column::new("amount", "Amount", |r: &Row, _| r.amount.into()).sortable(),
                Column::new("note", "Note", |r: &Row, _| r.note.into()),
            ],
            TableConfig {
                search_column,
                page_size_options: vec![page_size, 50],
                ..TableConfig::default()
            },
        )
    }

    fn ids(rows: &[&Row]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn ascending_then_descending_are_reverses() {
        let data = rows();
        let lk = Lookups::default();
        for col in 0..3 {
            let mut t = table(None, 10);
            assert!(t.toggle_sort(col));
            let asc = ids(&t.arrange(&data, &lk));
            assert!(t.toggle_sort(col));
            assert_eq!(t.state().sort, Some((col, SortDirection::Desc)));
            let mut desc = ids(&t.arrange(&data, &lk));
            desc.reverse();
            assert_eq!(asc, desc, "column {col}");
        }
    }

    #[test]
    fn numeric_columns_sort_numerically_with_missing_first() {
        let data = rows();
        let mut t = table(None, 10);
        t.toggle_sort(2);
        assert_eq!(ids(&t.arrange(&data, &Lookups::default())), vec![3, 5, 2, 1, 4]);
    }

    #[test]
    fn non_sortable_column_is_ignored() {
        let mut t = table(None, 10);
        assert!(!t.toggle_sort(3));
        assert!(!t.toggle_sort(99));
        assert_eq!(t.state().sort, None);
    }

    #[test]
    fn search_is_case_insensitive_subset() {
        let data = rows();
        let lk = Lookups::default();
        let mut t = table(None, 10);
        t.set_query("SCHOOL");
        let hits = t.filter(&data, &lk);
        assert_eq!(ids(&hits), vec![1, 5]);
        for r in &hits {
            assert!(data.contains(r));
        }
        for r in data.iter().filter(|r| !hits.contains(r)) {
            assert!(!r.note.to_lowercase().contains("school"));
            assert!(!r.name.to_lowercase().contains("school"));
        }
    }

    #[test]
    fn designated_search_column_limits_matching() {
        let data = rows();
        let mut t = table(Some("name"), 10);
        t.set_query("o");
        assert_eq!(ids(&t.filter(&data, &Lookups::default())), vec![2]);
        t.set_query("school");
        assert!(t.filter(&data, &Lookups::default()).is_empty());
    }

    #[test]
    fn missing_cells_never_match_na() {
        let data = rows();
        let mut t = table(Some("amount"), 10);
        t.set_query("n/a");
        assert!(t.filter(&data, &Lookups::default()).is_empty());
    }

    #[test]
    fn pages_concatenate_to_full_set() {
        let data = rows();
        let lk = Lookups::default();
        for size in 1..=6 {
            let mut t = table(None, size);
            t.toggle_sort(1);
            let full = ids(&t.arrange(&data, &lk));
            let pages = t.page_count(full.len());
            let mut seen = Vec::new();
            for _ in 0..pages {
                seen.extend(ids(&t.view(&data, &lk, false).rows));
                t.next_page(full.len());
            }
            assert_eq!(seen, full, "page size {size}");
        }
    }

    #[test]
    fn page_is_clamped_when_filter_shrinks_set() {
        let data = rows();
        let lk = Lookups::default();
        let mut t = table(None, 2);
        t.next_page(5);
        t.next_page(5);
        assert_eq!(t.state().page, 2);
        t.state.query = "kamau".into();
        let v = t.view(&data, &lk, false);
        assert_eq!(v.page, 0);
        assert_eq!(ids(&v.rows), vec![4]);
    }

    #[test]
    fn empty_and_loading_states() {
        let data: Vec<Row> = Vec::new();
        let t = table(None, 10);
        let v = t.view(&data, &Lookups::default(), true);
        assert!(v.loading && !v.is_empty());
        let v = t.view(&data, &Lookups::default(), false);
        assert!(v.is_empty());
        assert_eq!(v.page_count, 1);
    }

    #[test]
    fn missing_values_render_as_na() {
        let data = rows();
        let t = table(None, 10);
        assert_eq!(t.cell_text(&data[2], 2, &Lookups::default()), "N/A");
        assert_eq!(t.cell_text(&data[2], 3, &Lookups::default()), "N/A");
        assert_eq!(t.cell_text(&data[1], 2, &Lookups::default()), "200.50");
        assert_eq!(t.cell_text(&data[0], 42, &Lookups::default()), "N/A");
    }

    #[test]
    fn page_size_cycles_through_options() {
        let mut t = table(None, 10);
        assert_eq!(t.cycle_page_size(), 50);
        assert_eq!(t.cycle_page_size(), 10);
    }
}
