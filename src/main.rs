use anyhow::Result;
use crossterm::style::Stylize;
use reedline::{
    default_emacs_keybindings, Emacs, FileBackedHistory, Prompt, PromptEditMode,
    PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal,
};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use sheet_viewer::commands::{parse_command, Command};
use sheet_viewer::config::Config;
use sheet_viewer::loader::{CsvFileLoader, DatasetLoader, UploadClient};
use sheet_viewer::logging::{init_tracing, LogRingBuffer};
use sheet_viewer::services::{SessionPhase, ViewerSession};
use sheet_viewer::ui::table_renderer::{
    build_filter_panel_table, build_statistics_table, render_cell_detail, render_page,
};

const LOG_LINES_SHOWN: usize = 50;

struct ViewerPrompt {
    phase: SessionPhase,
}

impl Prompt for ViewerPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        match self.phase {
            SessionPhase::UploadPrompt => Cow::Borrowed("upload"),
            SessionPhase::Loading => Cow::Borrowed("loading"),
            SessionPhase::Data => Cow::Borrowed("view"),
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => "> ".into(),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                reedline::PromptViMode::Normal => "N> ".into(),
                reedline::PromptViMode::Insert => "I> ".into(),
            },
            PromptEditMode::Custom(str) => format!("{str}> ").into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

fn print_help() {
    println!("{}", "Sheet viewer - browse uploaded spreadsheets".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  sheet-viewer [OPTIONS] [FILE.xlsx|FILE.csv]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {} - Write a commented config file", "--generate-config".green());
    println!("  {}    - Print the commented config", "--print-config".green());
    println!();
    println!("{}", "Commands:".yellow());
    println!("  {}        - Upload a spreadsheet to the backend", "upload <file.xlsx>".green());
    println!("  {}          - Load a local CSV file", "open <file.csv>".green());
    println!("  {}            - Search all cells (empty clears)", "search <term>".green());
    println!("  {}            - Sort, again to reverse", "sort <column>".green());
    println!("  {} - Set a range filter", "filter <column> <min> <max>".green());
    println!("  {}  - Toggle a range filter", "enable|disable <column>".green());
    println!("  {}                    - Apply the range filters", "apply".green());
    println!("  {}                    - Clear all range filters", "clear".green());
    println!("  {}                    - Column statistics", "stats".green());
    println!("  {}         - Change page", "page <n> | next | prev".green());
    println!("  {}            - Export the whole view as CSV", "export [file]".green());
    println!("  {}       - Full text of a cell on this page", "cell <row> <column>".green());
    println!("  {}                     - Show the current page", "show".green());
    println!("  {}                      - Recent log messages", "log".green());
    println!("  {}                     - Exit", "quit".green());
    println!();
}

struct App {
    config: Config,
    session: ViewerSession,
    upload_client: UploadClient,
    logs: LogRingBuffer,
}

impl App {
    fn new(config: Config, logs: LogRingBuffer) -> Result<Self> {
        let upload_client = UploadClient::new(&config.upload)?;
        let session = ViewerSession::new(config.view.build_view());
        Ok(Self {
            config,
            session,
            upload_client,
            logs,
        })
    }

    fn show_page(&self) {
        if !self.session.view().has_data() {
            println!("{}", "No data loaded. Use 'upload <file.xlsx>' or 'open <file.csv>'.".yellow());
            return;
        }
        println!("{}", render_page(&self.session.view().render()));
    }

    /// Print and clear the error region
    fn show_error(&mut self) {
        if let Some(message) = self.session.error() {
            eprintln!("{}", message.red());
            self.session.dismiss_error();
        }
    }

    fn load_with(&mut self, loader: &dyn DatasetLoader, path: &Path) {
        println!("{}", format!("Loading {}...", path.display()).cyan());
        if self.session.upload_with(loader, path).is_ok() {
            self.show_page();
        }
    }

    fn show_filter_panel(&mut self) -> Result<()> {
        let panel = self.session.view_mut().filter_panel()?;
        println!("{}", build_filter_panel_table(panel));
        println!("{}", "Use 'apply' to filter the table.".dark_grey());
        Ok(())
    }

    fn export(&mut self, path: Option<PathBuf>) -> Result<()> {
        let path =
            path.unwrap_or_else(|| PathBuf::from(&self.config.export.default_filename));
        let summary = match self.session.export_to(&path) {
            Ok(summary) => summary,
            // Already in the error region
            Err(_) if self.session.error().is_some() => return Ok(()),
            Err(e) => return Err(e),
        };
        println!(
            "{}",
            format!(
                "Exported {} rows to {}",
                summary.row_count,
                summary.path.display()
            )
            .green()
        );
        Ok(())
    }

    /// Run one command. Returns false when the user asked to quit.
    fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Upload(path) => {
                let client = self.upload_client.clone();
                self.load_with(&client, &path);
            }
            Command::Open(path) => self.load_with(&CsvFileLoader::new(), &path),
            Command::Search(term) => {
                self.session.view_mut().set_search_term(&term);
                self.show_page();
            }
            Command::Sort(column) => {
                let direction = self.session.view_mut().sort_by(&column)?;
                info!("Sorted by {} {}", column, direction.as_str());
                self.show_page();
            }
            Command::Filter { column, min, max } => {
                self.session
                    .view_mut()
                    .set_filter_bounds(&column, min, max)?;
                self.show_filter_panel()?;
            }
            Command::Enable(column) => {
                self.session.view_mut().set_filter_enabled(&column, true)?;
                self.show_filter_panel()?;
            }
            Command::Disable(column) => {
                self.session.view_mut().set_filter_enabled(&column, false)?;
                self.show_filter_panel()?;
            }
            Command::Apply => {
                self.session.view_mut().apply_panel_filters()?;
                self.show_page();
            }
            Command::Clear => {
                self.session.view_mut().clear_filters();
                self.show_page();
            }
            Command::Stats => match self.session.view().column_statistics() {
                Some(stats) if !stats.is_empty() => println!("{}", build_statistics_table(&stats)),
                Some(_) => println!("{}", "No numeric columns.".yellow()),
                None => self.show_page(),
            },
            Command::Page(n) => {
                if !self.session.view_mut().set_page(n) {
                    println!("{}", format!("No page {}", n).yellow());
                }
                self.show_page();
            }
            Command::Next => {
                self.session.view_mut().change_page(1);
                self.show_page();
            }
            Command::Prev => {
                self.session.view_mut().change_page(-1);
                self.show_page();
            }
            Command::Export(path) => self.export(path)?,
            Command::Show => self.show_page(),
            Command::Cell { row, column } => {
                let descriptor = self.session.view().render();
                match render_cell_detail(&descriptor, row - 1, &column) {
                    Some(detail) => println!("{}", detail),
                    None => println!("{}", "No such cell on this page.".yellow()),
                }
            }
            Command::Log => {
                for entry in self.logs.get_recent(LOG_LINES_SHOWN) {
                    println!("{}", entry.format_for_display());
                }
            }
            Command::Help => print_help(),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }
}

fn write_default_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::create_default_with_comments())?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--print-config") {
        println!("{}", Config::create_default_with_comments());
        return Ok(());
    }
    if args.iter().any(|a| a == "--generate-config") {
        return write_default_config();
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("{:#}; using defaults", e).yellow());
            Config::default()
        }
    };

    let logs = init_tracing(&config.logging.filter, config.logging.buffer_capacity)?;
    info!("Upload endpoint: {}", config.upload.upload_url());

    let mut app = App::new(config, logs)?;
    print_help();

    if let Some(file) = args.iter().find(|a| !a.starts_with("--")) {
        let path = PathBuf::from(file);
        if path.extension().is_some_and(|ext| ext == "csv") {
            app.load_with(&CsvFileLoader::new(), &path);
        } else {
            let client = app.upload_client.clone();
            app.load_with(&client, &path);
        }
        app.show_error();
    }

    let mut line_editor = Reedline::create().with_edit_mode(Box::new(Emacs::new(
        default_emacs_keybindings(),
    )));
    if let Some(history_file) = dirs::data_local_dir().map(|d| d.join("sheet-viewer").join("history")) {
        match FileBackedHistory::with_file(100, history_file) {
            Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
            Err(e) => warn!("History disabled: {}", e),
        }
    }

    loop {
        let prompt = ViewerPrompt {
            phase: app.session.phase(),
        };
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                if buffer.trim().is_empty() {
                    continue;
                }

                let keep_going = match parse_command(&buffer) {
                    Ok(command) => app.handle(command).unwrap_or_else(|e| {
                        eprintln!("{}", format!("Error: {}", e).red());
                        true
                    }),
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        true
                    }
                };
                app.show_error();

                if !keep_going {
                    println!("Goodbye!");
                    break;
                }
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!("\nGoodbye!");
                break;
            }
        }
    }

    Ok(())
}
