#[cfg(test)]
mod tests {
    use sheet_viewer::data::data_view::DataView;
    use sheet_viewer::data::datatable::{DataColumn, DataRow, DataTable, DataValue};
    use sheet_viewer::data::datavalue_compare::SortDirection;
    use sheet_viewer::data::range_filter::{ColumnRange, FilterSpec};

    /// Small stock screen with a mix of numbers, text and blanks
    fn screen_table() -> DataTable {
        let mut table = DataTable::new("screen");
        table.add_column(DataColumn::new("Name"));
        table.add_column(DataColumn::new("Sector"));
        table.add_column(DataColumn::new("Price"));
        table.add_column(DataColumn::new("Change%"));

        let rows = vec![
            ("Apple", "Technology", DataValue::Float(189.5), DataValue::Float(1.2)),
            ("Exxon", "Energy", DataValue::Float(104.0), DataValue::Float(-0.8)),
            ("Banco", "Financials", DataValue::Null, DataValue::Float(0.0)),
            ("Chevron", "Energy", DataValue::Float(150.25), DataValue::Float(2.4)),
            ("Dell", "Technology", DataValue::Integer(75), DataValue::Null),
        ];
        for (name, sector, price, change) in rows {
            table
                .add_row(DataRow::new(vec![
                    DataValue::String(name.to_string()),
                    DataValue::String(sector.to_string()),
                    price,
                    change,
                ]))
                .unwrap();
        }
        table
    }

    /// Table with `n` rows named R0..Rn-1 and a repeating group column
    fn numbered_table(n: usize) -> DataTable {
        let mut table = DataTable::new("numbered");
        table.add_column(DataColumn::new("Name"));
        table.add_column(DataColumn::new("Group"));
        for i in 0..n {
            table
                .add_row(DataRow::new(vec![
                    DataValue::String(format!("R{}", i)),
                    DataValue::Integer((i % 3) as i64),
                ]))
                .unwrap();
        }
        table
    }

    fn loaded(table: DataTable) -> DataView {
        let mut view = DataView::default();
        view.load(table);
        view
    }

    fn names(view: &DataView) -> Vec<String> {
        view.rows().map(|r| r.values[0].to_string()).collect()
    }

    #[test]
    fn test_search_and_filter_compose() {
        let mut view = loaded(screen_table());

        view.set_search_term("energy");
        assert_eq!(names(&view), vec!["Exxon", "Chevron"]);

        view.apply_filters(
            FilterSpec::new().with_range("Price", ColumnRange::between(120.0, 200.0)),
        )
        .unwrap();
        assert_eq!(names(&view), vec!["Chevron"]);

        // Changing the search keeps the range filter active
        view.set_search_term("");
        assert_eq!(names(&view), vec!["Apple", "Chevron"]);
        assert_eq!(view.filters().len(), 1);

        // And clearing the filters keeps the search term
        view.set_search_term("energy");
        view.clear_filters();
        assert_eq!(view.search_term(), "energy");
        assert_eq!(names(&view), vec!["Exxon", "Chevron"]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_idempotent() {
        let mut view = loaded(screen_table());
        view.set_search_term("TECH");
        let first = names(&view);
        view.set_search_term("TECH");
        assert_eq!(names(&view), first);
        assert_eq!(first, vec!["Apple", "Dell"]);
    }

    #[test]
    fn test_search_matches_number_text() {
        let mut view = loaded(screen_table());
        view.set_search_term("150.25");
        assert_eq!(names(&view), vec!["Chevron"]);
    }

    #[test]
    fn test_filtered_rows_are_ordered_subset() {
        let mut view = loaded(numbered_table(30));
        view.apply_filters(FilterSpec::new().with_range("Group", ColumnRange::between(1.0, 1.0)))
            .unwrap();

        let indices = view.visible_row_indices().to_vec();
        assert_eq!(indices.len(), 10);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(indices.iter().all(|&i| i % 3 == 1));
    }

    #[test]
    fn test_filter_excludes_blank_values() {
        let mut view = loaded(screen_table());
        view.apply_filters(
            FilterSpec::new().with_range("Price", ColumnRange::between(0.0, 1000.0)),
        )
        .unwrap();
        assert!(!names(&view).contains(&"Banco".to_string()));
        assert_eq!(view.row_count(), 4);
    }

    #[test]
    fn test_sort_toggle_and_new_column() {
        let mut view = loaded(screen_table());

        assert_eq!(view.sort_by("Price").unwrap(), SortDirection::Ascending);
        assert_eq!(names(&view), vec!["Banco", "Dell", "Exxon", "Chevron", "Apple"]);

        assert_eq!(view.sort_by("Price").unwrap(), SortDirection::Descending);
        assert_eq!(names(&view), vec!["Apple", "Chevron", "Exxon", "Dell", "Banco"]);

        assert_eq!(view.sort_by("Name").unwrap(), SortDirection::Ascending);
        assert_eq!(names(&view), vec!["Apple", "Banco", "Chevron", "Dell", "Exxon"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut view = loaded(numbered_table(9));
        view.sort_by("Group").unwrap();
        assert_eq!(
            names(&view),
            vec!["R0", "R3", "R6", "R1", "R4", "R7", "R2", "R5", "R8"]
        );

        view.sort_by("Group").unwrap();
        assert_eq!(
            names(&view),
            vec!["R2", "R5", "R8", "R1", "R4", "R7", "R0", "R3", "R6"]
        );
    }

    #[test]
    fn test_sort_mixed_column_does_not_panic() {
        let mut table = DataTable::new("mixed");
        table.add_column(DataColumn::new("Value"));
        for text in ["10", "b", "9", "a", "", "100", "B", "2"] {
            table
                .add_row(DataRow::new(vec![DataValue::from_text(text)]))
                .unwrap();
        }
        let mut view = loaded(table);
        view.sort_by("Value").unwrap();
        assert_eq!(view.row_count(), 8);
        view.sort_by("Value").unwrap();
        assert_eq!(view.row_count(), 8);
    }

    #[test]
    fn test_sort_reads_leading_numbers_in_text() {
        let mut table = DataTable::new("yields");
        table.add_column(DataColumn::new("Name"));
        table.add_column(DataColumn::new("Yield"));
        for (name, value) in [("A", "12.5%"), ("B", "9.1%"), ("C", "100 shares")] {
            table
                .add_row(DataRow::new(vec![
                    DataValue::String(name.to_string()),
                    DataValue::String(value.to_string()),
                ]))
                .unwrap();
        }

        let mut view = loaded(table);
        view.sort_by("Yield").unwrap();
        assert_eq!(names(&view), vec!["B", "A", "C"]);
        view.sort_by("Yield").unwrap();
        assert_eq!(names(&view), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_sort_survives_search() {
        let mut view = loaded(screen_table());
        view.sort_by("Price").unwrap();
        view.sort_by("Price").unwrap();
        view.set_search_term("energy");
        assert_eq!(names(&view), vec!["Chevron", "Exxon"]);
        assert_eq!(view.sort_spec().unwrap().direction, SortDirection::Descending);
    }

    #[test]
    fn test_pagination_bounds() {
        let mut view = loaded(numbered_table(120));
        assert_eq!(view.window().max_page(), 3);
        assert_eq!(view.page_rows().len(), 50);

        assert!(!view.change_page(-1));
        assert_eq!(view.window().page(), 1);

        assert!(view.set_page(3));
        assert_eq!(view.page_rows().len(), 20);
        assert_eq!(view.page_rows()[0].values[0].to_string(), "R100");

        assert!(!view.change_page(1));
        assert!(!view.set_page(4));
        assert!(!view.set_page(0));
        assert_eq!(view.window().page(), 3);
    }

    #[test]
    fn test_every_recompute_resets_page() {
        let mut view = loaded(numbered_table(120));

        view.set_page(2);
        view.sort_by("Group").unwrap();
        assert_eq!(view.window().page(), 1);

        view.set_page(2);
        view.set_search_term("R");
        assert_eq!(view.window().page(), 1);

        view.set_page(2);
        view.apply_filters(FilterSpec::new()).unwrap();
        assert_eq!(view.window().page(), 1);
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let mut view = loaded(screen_table());
        view.set_search_term("no such company");
        assert_eq!(view.row_count(), 0);
        assert_eq!(view.window().max_page(), 1);
        assert_eq!(view.window().page_info(), "Page 1 of 1 (0 total items)");
        assert!(view.page_rows().is_empty());
    }

    #[test]
    fn test_load_replaces_state() {
        let mut view = loaded(screen_table());
        view.set_search_term("energy");
        view.sort_by("Price").unwrap();
        let generation = view.generation();

        view.load(numbered_table(3));
        assert!(view.generation() > generation);
        assert_eq!(view.search_term(), "");
        assert!(view.sort_spec().is_none());
        assert!(view.filters().is_empty());
        assert_eq!(names(&view), vec!["R0", "R1", "R2"]);
    }

    #[test]
    fn test_filter_panel_workflow() {
        let mut view = loaded(screen_table());

        let panel = view.filter_panel().unwrap();
        let columns: Vec<&str> = panel.controls().iter().map(|c| c.column.as_str()).collect();
        assert_eq!(columns, vec!["Price", "Change%"]);
        assert!(panel.controls().iter().all(|c| !c.enabled));

        view.set_filter_bounds("Change%", 0.0, 5.0).unwrap();
        view.apply_panel_filters().unwrap();
        assert_eq!(names(&view), vec!["Apple", "Banco", "Chevron"]);

        view.set_filter_enabled("Change%", false).unwrap();
        view.apply_panel_filters().unwrap();
        assert_eq!(view.row_count(), 5);

        assert!(view.set_filter_bounds("Change%", 5.0, 0.0).is_err());
        assert!(view.set_filter_enabled("Name", true).is_err());
    }
}
