// Entry point and high-level CLI flow.
//
// - Option [1] loads the CSV and the boundary file, printing diagnostics.
// - Option [2] asks for a year/month, binds the aggregate onto the
//   boundaries and writes the exports.
// - After a pass, the user can go back to the selection menu or exit.
//
// Passing `--year` runs one pass without the menu.
mod args;

use args::CliArgs;
use clap::Parser;
use region_choropleth::aggregate::{available_months, available_years, default_period, top_rows};
use region_choropleth::output::{period_suffix, preview_table_rows, write_aggregate_csv, write_json};
use region_choropleth::util::{format_int, format_number};
use region_choropleth::{loader, Session};
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Read a single line of input after printing `prompt`.
///
/// `None` once stdin is closed (or unreadable), so callers can stop asking.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    read_trimmed_line(&mut io::stdin().lock())
}

fn read_trimmed_line<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask the user whether to go back to the selection menu after a pass.
/// End of input counts as `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Ask for a period, offering what the table actually contains. An empty
/// answer takes the default; `None` for an empty table or closed stdin.
fn prompt_period(session: &Session) -> Option<(i32, Option<u32>)> {
    let (def_year, def_month) = default_period(&session.records)?;
    let years = available_years(&session.records);
    let months = available_months(&session.records);
    println!("Years: {:?}", years);
    let year = loop {
        let s = read_line(&format!("Year [{def_year}]: "))?;
        if s.is_empty() {
            break def_year;
        }
        match s.parse::<i32>() {
            Ok(y) => break y,
            Err(_) => println!("Invalid year."),
        }
    };
    if months.is_empty() {
        return Some((year, None));
    }
    println!("Months: {:?}", months);
    let month = loop {
        let s = read_line(&format!("Month [{}]: ", def_month.unwrap_or(1)))?;
        if s.is_empty() {
            break def_month;
        }
        match s.parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => break Some(m),
            _ => println!("Invalid month. Please enter 1-12."),
        }
    };
    Some((year, month))
}

/// Handle option [1]: load both inputs and settle the name field.
fn handle_load(args: &CliArgs) -> Option<Session> {
    let (records, report) = match loader::load_records(&args.csv) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", args.csv.display(), e);
            return None;
        }
    };
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        format_int(report.total_rows),
        format_int(report.loaded_rows)
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to a missing region or period.",
            format_int(report.parse_errors)
        );
    }
    if report.coerced_values > 0 {
        println!(
            "Info: {} non-numeric or negative values counted as 0.",
            format_int(report.coerced_values)
        );
    }

    let url = (!args.offline).then_some(args.geojson_url.as_str());
    let timeout = Duration::from_secs(args.timeout);
    let boundaries = match loader::load_boundaries_or_fetch(url, &args.geojson, timeout) {
        Ok(b) => b,
        Err(e) => {
            eprintln!(
                "Failed to load boundaries {}: {}\nSupply another file with --geojson.\n",
                args.geojson.display(),
                e
            );
            return None;
        }
    };
    match Session::new(
        records,
        boundaries,
        args.name_field.as_deref(),
        args.sample,
        args.strict_schema,
    ) {
        Ok(s) => {
            println!(
                "Boundaries: {} features, name field `{}`\n",
                format_int(s.boundaries.len()),
                s.name_field
            );
            Some(s)
        }
        Err(e) => {
            eprintln!("Error: {e}\nSet the name field manually with --name-field.\n");
            None
        }
    }
}

/// Run one pass, print the top-N preview and write the exports.
fn handle_pass(args: &CliArgs, session: &Session, year: i32, month: Option<u32>) {
    let pass = session.run(year, month);
    let suffix = period_suffix(year, month);
    let label = match month {
        Some(m) => format!("{year}-{m}"),
        None => year.to_string(),
    };

    println!(
        "Total for {}: {}",
        label,
        format_number(pass.total_value, 2)
    );
    println!("\nTop {} districts ({})\n", args.top, label);
    preview_table_rows(&top_rows(&pass.entries, args.top), args.top);

    for w in pass.stats.warnings() {
        println!("Warning: {w}");
    }

    let agg_file = args.out_dir.join(format!("aggregated_{suffix}.csv"));
    if let Err(e) = write_aggregate_csv(&agg_file, &pass.entries) {
        eprintln!("Write error: {}", e);
    }
    let map_file = args.out_dir.join(format!("choropleth_{suffix}.geojson"));
    if let Err(e) = write_json(&map_file, &pass.annotated) {
        eprintln!("Write error: {}", e);
    }
    let summary_file = args.out_dir.join(format!("summary_{suffix}.json"));
    if let Err(e) = write_json(&summary_file, &pass.summary(&session.name_field)) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "\nOutputs saved to {}, {}, {}\n",
        agg_file.display(),
        map_file.display(),
        summary_file.display()
    );
}

fn run_menu(args: &CliArgs) {
    let mut session: Option<Session> = None;
    loop {
        println!("Select:");
        println!("[1] Load the files");
        println!("[2] Build Choropleth\n");
        let Some(choice) = read_line("Enter choice: ") else {
            println!("Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Some(s) = handle_load(args) {
                    session = Some(s);
                }
            }
            "2" => {
                let Some(s) = session.as_ref() else {
                    println!("Error: No data loaded. Please load the files first (option 1).\n");
                    continue;
                };
                if s.records.is_empty() {
                    println!("Error: the loaded table has no rows.\n");
                    continue;
                }
                let Some((year, month)) = prompt_period(s) else {
                    println!("Exiting the program.");
                    break;
                };
                println!();
                handle_pass(args, s, year, month);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = CliArgs::parse();
    std::fs::create_dir_all(&args.out_dir)?;

    match args.year {
        Some(year) => {
            let session = handle_load(&args)
                .ok_or_else(|| anyhow::anyhow!("could not prepare the inputs"))?;
            handle_pass(&args, &session, year, args.month);
        }
        None => run_menu(&args),
    }
    Ok(())
}
