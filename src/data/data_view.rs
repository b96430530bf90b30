use std::cell::OnceCell;
use std::sync::Arc;
use tracing::{debug, info};

use crate::data::column_stats::{calculate_table_statistics, ColumnStatistics};
use crate::data::data_exporter::{CsvExport, DataExporter};
use crate::data::datatable::{DataRow, DataTable, DataValue};
use crate::data::datavalue_compare::{compare_for_sort, stable_sort_by, SortDirection};
use crate::data::pagination::{PageWindow, DEFAULT_PAGE_SIZE};
use crate::data::range_filter::{filter_status, CompiledFilter, FilterPanel, FilterSpec};
use crate::data::search_filter::SearchTerm;
use crate::data::value_formatter::{FormattedCell, ValueFormatter};
use crate::error::ViewError;

pub const DEFAULT_IDENTIFIER_COLUMN: &str = "Name";

/// The single active sort column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub column_index: usize,
    pub direction: SortDirection,
}

/// Header cell of a rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub name: String,
    /// Set on the active sort column
    pub sort: Option<SortDirection>,
}

/// Everything a presenter needs to draw the current page
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDescriptor {
    pub generation: u64,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<Vec<FormattedCell>>,
    pub page: usize,
    pub max_page: usize,
    pub total_rows: usize,
    pub dataset_rows: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub page_info: String,
    pub filter_status: String,
    pub search_term: String,
}

/// Search, filter, sort and paginate a loaded dataset.
///
/// The view is derived from (dataset, search term, filter spec, sort spec)
/// and fully recomputed whenever one of them changes, so every mutation
/// leaves the visible rows and the page window consistent before it
/// returns. Search and range filters compose: a row is visible only when it
/// matches the search term AND every active range.
#[derive(Debug)]
pub struct DataView {
    /// The loaded dataset, replaced wholesale on every load
    source: Option<Arc<DataTable>>,

    /// Bumped on every load and reset
    generation: u64,

    search: SearchTerm,
    filters: FilterSpec,
    compiled_filter: CompiledFilter,
    sort: Option<SortSpec>,

    /// Source row indices in view order
    visible_rows: Vec<usize>,
    window: PageWindow,

    identifier_column: String,
    formatter: ValueFormatter,

    /// Computed on first access, dropped on the next load
    statistics: OnceCell<Arc<ColumnStatistics>>,
    filter_panel: Option<FilterPanel>,
}

impl Default for DataView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl DataView {
    /// Create an empty view with the given page size
    pub fn new(page_size: usize) -> Self {
        Self {
            source: None,
            generation: 0,
            search: SearchTerm::default(),
            filters: FilterSpec::default(),
            compiled_filter: CompiledFilter::default(),
            sort: None,
            visible_rows: Vec::new(),
            window: PageWindow::new(page_size),
            identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
            formatter: ValueFormatter::default(),
            statistics: OnceCell::new(),
            filter_panel: None,
        }
    }

    /// Column excluded from range filters
    pub fn with_identifier_column(mut self, column: impl Into<String>) -> Self {
        self.identifier_column = column.into();
        self
    }

    pub fn with_formatter(mut self, formatter: ValueFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Replace the dataset. Search, filters and sort are cleared and the
    /// page goes back to 1.
    pub fn load(&mut self, table: DataTable) {
        info!(
            "Loading dataset '{}' with {} rows and {} columns",
            table.name,
            table.row_count(),
            table.column_count()
        );
        self.source = Some(Arc::new(table));
        self.clear_derived_state();
        self.recompute();
    }

    /// Drop the dataset and return to the empty pre-upload state
    pub fn reset(&mut self) {
        debug!("Resetting data view");
        self.source = None;
        self.clear_derived_state();
        self.recompute();
    }

    fn clear_derived_state(&mut self) {
        self.generation += 1;
        self.search = SearchTerm::default();
        self.filters = FilterSpec::default();
        self.compiled_filter = CompiledFilter::default();
        self.sort = None;
        self.statistics = OnceCell::new();
        self.filter_panel = None;
    }

    pub fn has_data(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<&DataTable> {
        self.source.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn column_names(&self) -> Vec<String> {
        self.source
            .as_ref()
            .map(|table| table.column_names())
            .unwrap_or_default()
    }

    pub fn search_term(&self) -> &str {
        self.search.as_str()
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn sort_spec(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    /// Number of rows in the view (all pages)
    pub fn row_count(&self) -> usize {
        self.visible_rows.len()
    }

    /// Source row indices in view order
    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }

    /// Rows of the view in order, across all pages
    pub fn rows(&self) -> impl Iterator<Item = &DataRow> + '_ {
        let table = self.source.as_deref();
        self.visible_rows
            .iter()
            .filter_map(move |&idx| table.and_then(|t| t.rows.get(idx)))
    }

    /// Rows on the current page
    pub fn page_rows(&self) -> Vec<&DataRow> {
        let range = self.window.range();
        self.rows()
            .skip(range.start)
            .take(range.end - range.start)
            .collect()
    }

    /// Set the search term. An empty term removes the search predicate.
    pub fn set_search_term(&mut self, term: &str) {
        self.search = SearchTerm::new(term);
        debug!("Search term set to '{}'", self.search.as_str());
        self.recompute();
    }

    /// Sort by a column. Clicking the active column flips the direction,
    /// any other column becomes active in ascending order.
    pub fn sort_by(&mut self, column: &str) -> Result<SortDirection, ViewError> {
        let table = self.source.as_ref().ok_or(ViewError::NoDataset)?;
        let column_index = table
            .get_column_index(column)
            .ok_or_else(|| ViewError::UnknownColumn(column.to_string()))?;

        let direction = match &self.sort {
            Some(active) if active.column == column => active.direction.toggled(),
            _ => SortDirection::Ascending,
        };

        debug!("Sorting by '{}' {}", column, direction.as_str());
        self.sort = Some(SortSpec {
            column: column.to_string(),
            column_index,
            direction,
        });
        self.recompute();
        Ok(direction)
    }

    /// Replace the active range filters. An empty spec removes filtering.
    pub fn apply_filters(&mut self, spec: FilterSpec) -> Result<(), ViewError> {
        let table = self.source.as_ref().ok_or(ViewError::NoDataset)?;
        self.compiled_filter = spec.compile(table)?;
        self.filters = spec;
        self.recompute();
        info!("{}", self.filter_status());
        Ok(())
    }

    /// Apply the enabled controls of the filter panel
    pub fn apply_panel_filters(&mut self) -> Result<(), ViewError> {
        let spec = self.filter_panel()?.to_spec();
        self.apply_filters(spec)
    }

    /// Remove all range filters, disable every control and restore its bounds
    pub fn clear_filters(&mut self) {
        if let Some(panel) = self.filter_panel.as_mut() {
            panel.reset();
        }
        self.filters = FilterSpec::default();
        self.compiled_filter = CompiledFilter::default();
        debug!("Filters cleared");
        self.recompute();
    }

    /// Statistics of the numeric columns, computed once per dataset
    pub fn column_statistics(&self) -> Option<Arc<ColumnStatistics>> {
        let table = self.source.as_ref()?;
        Some(
            self.statistics
                .get_or_init(|| Arc::new(calculate_table_statistics(table)))
                .clone(),
        )
    }

    /// Filter controls for the numeric columns, built on first access
    pub fn filter_panel(&mut self) -> Result<&FilterPanel, ViewError> {
        Ok(self.filter_panel_mut()?)
    }

    fn filter_panel_mut(&mut self) -> Result<&mut FilterPanel, ViewError> {
        if self.filter_panel.is_none() {
            let stats = self.column_statistics().ok_or(ViewError::NoDataset)?;
            self.filter_panel = Some(FilterPanel::from_statistics(
                &stats,
                &self.identifier_column,
            ));
        }
        self.filter_panel.as_mut().ok_or(ViewError::NoDataset)
    }

    pub fn set_filter_enabled(&mut self, column: &str, enabled: bool) -> Result<(), ViewError> {
        self.filter_panel_mut()?.set_enabled(column, enabled)
    }

    pub fn set_filter_bounds(&mut self, column: &str, min: f64, max: f64) -> Result<(), ViewError> {
        self.filter_panel_mut()?.set_bounds(column, min, max)
    }

    /// Status line shown next to the filter panel
    pub fn filter_status(&self) -> String {
        filter_status(self.filters.len(), self.row_count())
    }

    /// Jump to a page; out-of-range requests leave the page unchanged
    pub fn set_page(&mut self, page: usize) -> bool {
        let changed = self.window.set_page(page);
        if changed {
            debug!("Page set to {}", page);
        }
        changed
    }

    /// Move relative to the current page; out-of-range moves are ignored
    pub fn change_page(&mut self, delta: isize) -> bool {
        let changed = self.window.change_page(delta);
        if changed {
            debug!("Page changed to {}", self.window.page());
        }
        changed
    }

    /// CSV of the whole view (all pages) in view order
    pub fn export_csv(&self) -> Result<CsvExport, ViewError> {
        if self.visible_rows.is_empty() {
            return Err(ViewError::EmptyExport);
        }
        DataExporter::rows_to_csv(&self.column_names(), self.rows())
    }

    /// Formatted cells and paging details for the current page
    pub fn render(&self) -> RenderDescriptor {
        let columns = self.column_names();
        let headers = columns
            .iter()
            .map(|name| HeaderCell {
                name: name.clone(),
                sort: self
                    .sort
                    .as_ref()
                    .filter(|s| &s.column == name)
                    .map(|s| s.direction),
            })
            .collect();

        let rows = self
            .page_rows()
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(idx, header)| {
                        self.formatter
                            .format(header, row.get(idx).unwrap_or(&DataValue::Null))
                    })
                    .collect()
            })
            .collect();

        RenderDescriptor {
            generation: self.generation,
            headers,
            rows,
            page: self.window.page(),
            max_page: self.window.max_page(),
            total_rows: self.row_count(),
            dataset_rows: self.source.as_ref().map_or(0, |t| t.row_count()),
            has_previous: self.window.has_previous(),
            has_next: self.window.has_next(),
            page_info: self.window.page_info(),
            filter_status: self.filter_status(),
            search_term: self.search.as_str().to_string(),
        }
    }

    /// Rebuild the view: search, then range filters, then sort.
    /// Always returns to page 1.
    fn recompute(&mut self) {
        let Some(table) = self.source.as_ref() else {
            self.visible_rows.clear();
            self.window.reset(0);
            return;
        };

        let mut rows: Vec<usize> = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.search.matches(row) && self.compiled_filter.matches(row))
            .map(|(idx, _)| idx)
            .collect();

        if let Some(sort) = &self.sort {
            let column = sort.column_index;
            let direction = sort.direction;
            stable_sort_by(&mut rows, |&a, &b| {
                let left = table.rows[a].get(column);
                let right = table.rows[b].get(column);
                let ordering = match (left, right) {
                    (Some(l), Some(r)) => compare_for_sort(l, r),
                    (None, None) => std::cmp::Ordering::Equal,
                    (None, Some(_)) => std::cmp::Ordering::Less,
                    (Some(_), None) => std::cmp::Ordering::Greater,
                };
                direction.apply(ordering)
            });
        }

        debug!(
            "View recomputed: {} of {} rows visible",
            rows.len(),
            table.row_count()
        );
        self.visible_rows = rows;
        self.window.reset(self.visible_rows.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::DataColumn;
    use crate::data::range_filter::ColumnRange;

    fn scenario_table() -> DataTable {
        let mut table = DataTable::new("scenario");
        table.add_column(DataColumn::new("Name"));
        table.add_column(DataColumn::new("Price"));
        table.add_column(DataColumn::new("Change%"));
        table
            .add_row(DataRow::new(vec![
                DataValue::String("A".into()),
                DataValue::Integer(10),
                DataValue::Integer(5),
            ]))
            .unwrap();
        table
            .add_row(DataRow::new(vec![
                DataValue::String("B".into()),
                DataValue::Null,
                DataValue::Integer(-3),
            ]))
            .unwrap();
        table
    }

    fn names(view: &DataView) -> Vec<String> {
        view.rows().map(|r| r.values[0].to_string()).collect()
    }

    #[test]
    fn test_empty_view_before_load() {
        let view = DataView::default();
        assert!(!view.has_data());
        assert_eq!(view.row_count(), 0);
        assert_eq!(view.window().page(), 1);
        assert_eq!(view.export_csv(), Err(ViewError::EmptyExport));
        assert!(view.column_statistics().is_none());
    }

    #[test]
    fn test_search_scenario() {
        let mut view = DataView::default();
        view.load(scenario_table());
        view.set_search_term("b");
        assert_eq!(names(&view), vec!["B"]);
    }

    #[test]
    fn test_sort_blank_before_number() {
        let mut view = DataView::default();
        view.load(scenario_table());
        assert_eq!(view.sort_by("Price").unwrap(), SortDirection::Ascending);
        assert_eq!(names(&view), vec!["B", "A"]);
        assert_eq!(view.sort_by("Price").unwrap(), SortDirection::Descending);
        assert_eq!(names(&view), vec!["A", "B"]);
    }

    #[test]
    fn test_filter_scenario() {
        let mut view = DataView::default();
        view.load(scenario_table());
        view.apply_filters(FilterSpec::new().with_range("Price", ColumnRange::between(5.0, 20.0)))
            .unwrap();
        assert_eq!(names(&view), vec!["A"]);
        assert_eq!(view.filter_status(), "1 active filters — 1 rows shown");
    }

    #[test]
    fn test_sort_unknown_column() {
        let mut view = DataView::default();
        assert_eq!(view.sort_by("Price"), Err(ViewError::NoDataset));
        view.load(scenario_table());
        assert_eq!(
            view.sort_by("Volume"),
            Err(ViewError::UnknownColumn("Volume".to_string()))
        );
        assert!(view.sort_spec().is_none());
    }

    #[test]
    fn test_failed_filter_keeps_previous_state() {
        let mut view = DataView::default();
        view.load(scenario_table());
        view.set_search_term("a");
        let bad = FilterSpec::new().with_range("Nope", ColumnRange::default());
        assert!(view.apply_filters(bad).is_err());
        assert!(view.filters().is_empty());
        assert_eq!(names(&view), vec!["A"]);
    }

    #[test]
    fn test_statistics_cached_per_load() {
        let mut view = DataView::default();
        view.load(scenario_table());
        let first = view.column_statistics().unwrap();
        let second = view.column_statistics().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        view.load(scenario_table());
        let third = view.column_statistics().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_render_marks_sort_column() {
        let mut view = DataView::default();
        view.load(scenario_table());
        view.sort_by("Change%").unwrap();
        let render = view.render();

        assert_eq!(render.headers[2].sort, Some(SortDirection::Ascending));
        assert_eq!(render.headers[0].sort, None);
        assert_eq!(render.rows.len(), 2);
        assert_eq!(render.rows[0][2].text, "-3.00%");
        assert_eq!(render.rows[0][1].text, "-");
        assert_eq!(render.page_info, "Page 1 of 1 (2 total items)");
    }
}
