// Entry point and high-level CLI flow.
//
// - Option [1] ingests a work-item CSV and prints load diagnostics.
// - Option [2] prints the lead-time percentiles and the per-type table.
// - Option [3] flips one item type's filter flag.
// - Option [4] exports the report table, the cleaned records and a JSON
//   summary to individual files.
// - After showing a report, the user can choose to go back to the menu
//   or exit.
use leadtime_report::{render, util, ColumnMap, MetricsStore};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

// Simple in-memory app state so we only ingest the CSV once but can show
// reports and flip filters many times in a single run. The lock also
// serializes ingestion against report reads.
static STORE: Lazy<Mutex<MetricsStore>> = Lazy::new(|| Mutex::new(MetricsStore::new()));

const DEFAULT_CSV: &str = "work_items.csv";
const COLUMNS_JSON: &str = "columns.json";

const REPORT_CSV: &str = "leadtime_report.csv";
const RECORDS_CSV: &str = "work_items_clean.csv";
const SUMMARY_JSON: &str = "leadtime_summary.json";

/// Pipeline logs stay on stderr so they never interleave with the menu.
/// Warnings only by default; RUST_LOG=info adds the ingest counters.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// The prompt is reused for both the main menu and simple numeric inputs.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Prompt for a file path, falling back to `default` on empty input.
fn read_path(default: &str) -> String {
    print!("CSV path [{}]: ", default);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    let trimmed = buf.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Ask the user whether to go back to the menu after viewing a report.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Column names for the four required roles come from `columns.json` in
/// the working directory when present (any subset of fields may be
/// overridden); otherwise the defaults apply.
fn load_columns() -> ColumnMap {
    match std::fs::read_to_string(COLUMNS_JSON) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(columns) => columns,
            Err(e) => {
                eprintln!("Ignoring {}: {}", COLUMNS_JSON, e);
                ColumnMap::default()
            }
        },
        Err(_) => ColumnMap::default(),
    }
}

/// Handle option [1]: ingest a work-item CSV.
///
/// On success the store now holds the new dataset with all types active,
/// and we print a short textual summary of what happened. On failure the
/// previously loaded dataset (if any) is still there.
fn handle_load() {
    let path = read_path(DEFAULT_CSV);
    let columns = load_columns();
    let mut store = STORE.lock().unwrap();
    match store.ingest_path(&path, &columns) {
        Ok(summary) => {
            println!(
                "Processing dataset... ({} data rows read, {} records loaded)",
                util::format_int(summary.total_rows as i64),
                util::format_int(summary.loaded as i64)
            );
            if summary.skipped_incomplete > 0 {
                println!(
                    "Note: {} rows skipped due to missing required fields.",
                    util::format_int(summary.skipped_incomplete as i64)
                );
            }
            for w in &summary.warnings {
                println!("Warning: {}", w);
            }
            println!(
                "Item types: {}\n",
                store.dataset().item_types().join(", ")
            );
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: print the percentile report and the per-type table.
fn handle_show_report() {
    let store = STORE.lock().unwrap();
    if !store.is_loaded() {
        println!("Error: No data loaded. Please load a CSV file first (option 1).\n");
        return;
    }

    let report = store.report();
    println!("Lead Time Report");
    println!(
        "(Filtered: {} of {} items)\n",
        util::format_int(report.filtered_count as i64),
        util::format_int(store.dataset().len() as i64)
    );
    println!("  85th percentile: {} days", util::format_int(report.p85));
    println!("  95th percentile: {} days", util::format_int(report.p95));

    let rows = render::summary_rows(&report);
    let note = format!("{} item type(s)", rows.len());
    render::preview_table("Per-Type Lead Time Summary", Some(&note), &rows, rows.len());
}

/// Handle option [3]: flip one item type's filter flag.
///
/// Shows the current flags, reads a numeric pick and toggles it. Types
/// come out in the dataset's first-seen order, so the numbering is stable
/// across calls for the same load.
fn handle_toggle_filter() {
    let mut store = STORE.lock().unwrap();
    if !store.is_loaded() {
        println!("Error: No data loaded. Please load a CSV file first (option 1).\n");
        return;
    }

    let types: Vec<String> = store.dataset().item_types().to_vec();
    println!("Item type filters:");
    for (i, t) in types.iter().enumerate() {
        let flag = if store.filters().is_active(t) {
            "active"
        } else {
            "off"
        };
        println!("[{}] {} ({})", i + 1, t, flag);
    }
    println!();

    match read_choice().parse::<usize>() {
        Ok(n) if n >= 1 && n <= types.len() => {
            let name = &types[n - 1];
            // The name came from the current dataset, so the toggle
            // cannot miss.
            if let Some(now_active) = store.toggle_type(name) {
                let state = if now_active { "active" } else { "off" };
                println!("Filter for {} is now {}.\n", name, state);
            }
        }
        _ => {
            println!("Invalid choice. Please enter 1-{}.\n", types.len());
        }
    }
}

/// Handle option [4]: export the report table, the cleaned records and a
/// JSON summary.
///
/// This function is intentionally side-effectful: it writes two CSV files
/// and a JSON file, then prints where everything went.
fn handle_export() {
    let store = STORE.lock().unwrap();
    if !store.is_loaded() {
        println!("Error: No data loaded. Please load a CSV file first (option 1).\n");
        return;
    }

    println!("Exporting reports...\n");

    let report = store.report();
    let rows = render::summary_rows(&report);
    if let Err(e) = render::write_csv(REPORT_CSV, &rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Per-type summary exported to {}", REPORT_CSV);

    if let Err(e) = render::write_csv(RECORDS_CSV, store.dataset().records()) {
        eprintln!("Write error: {}", e);
    }
    println!("Cleaned records exported to {}", RECORDS_CSV);

    if let Err(e) = render::write_json(SUMMARY_JSON, &report) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats ({}):", SUMMARY_JSON);
    println!(
        "{{\"p85\": {}, \"p95\": {}, \"filtered_count\": {}}}\n",
        report.p85, report.p95, report.filtered_count
    );
}

fn main() {
    init_tracing();
    loop {
        println!("Work Item Lead Time Report");
        println!("[1] Load CSV file");
        println!("[2] Show report");
        println!("[3] Toggle type filter");
        println!("[4] Export reports");
        println!("[5] Exit\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_show_report();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                println!();
                handle_toggle_filter();
            }
            "4" => {
                println!();
                handle_export();
            }
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 1-5.\n");
            }
        }
    }
}
