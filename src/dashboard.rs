use log::{debug, info, warn};

use snafu::{prelude::*, ErrorCompat, Snafu};
use survey_analytics::normalizer::parse_date_text;
use survey_analytics::session::DashboardSession;
use survey_analytics::*;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dashboard::config_reader::*;

mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

const DEFAULT_DASHBOARD_NAME: &str = "Customer Satisfaction Dashboard";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("The spreadsheet {path} is empty"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find worksheet {worksheet_name:?} in {path}"))]
    MissingWorksheet {
        path: String,
        worksheet_name: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error formatting the summary"))]
    FormattingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Unknown input type {provider:?} (expected xlsx, xls, ods, csv or sample)"))]
    UnknownProvider { provider: String },
    #[snafu(display("Invalid filter"))]
    InvalidFilter { source: DashboardErrors },
    #[snafu(display("Cannot understand the reference time {now:?}"))]
    InvalidNow { now: String },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashboardError>;

/// Renders an error followed by all its causes: `outer: cause: root cause`.
pub fn error_report(e: &DashboardError) -> String {
    let mut messages: Vec<String> = ErrorCompat::iter_chain(e)
        .map(|cause| cause.to_string())
        .collect();
    // Wrappers such as csv::Error display the same text as their source.
    messages.dedup();
    messages.join(": ")
}

/// Where the responses come from, after resolution of the command line and the
/// configuration file.
#[derive(Eq, PartialEq, Debug, Clone)]
enum InputPlan {
    Sample,
    Files(Vec<DataSource>),
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn opt_js(x: Option<f64>) -> JSValue {
    json!(x.map(round2))
}

fn format_date(d: &Option<NaiveDateTime>) -> JSValue {
    json!(d.map(|x| x.format(DATE_FORMAT).to_string()))
}

fn attribute_scores_to_json(l: &[(Attribute, f64)]) -> Vec<JSValue> {
    l.iter()
        .map(|(a, avg)| json!({"attribute": a.label(), "average": round2(*avg)}))
        .collect()
}

fn insights_to_json(insights: &Option<Insights>) -> JSValue {
    match insights {
        None => JSValue::Null,
        Some(i) => json!({
            "topPerforming": attribute_scores_to_json(&i.top_performing),
            "improvementAreas": attribute_scores_to_json(&i.improvement_areas),
            "allAreasPerformingWell": i.all_areas_performing_well(),
            "recommendations": i.recommendations,
        }),
    }
}

fn summary_to_json(res: &DashboardResult) -> JSValue {
    let s = &res.summary;
    let nps = match s.nps {
        Some(n) => json!({
            "score": n.score,
            "promoters": n.promoters,
            "passives": n.passives,
            "detractors": n.detractors,
        }),
        None => JSValue::Null,
    };
    let distribution: Vec<JSValue> = s
        .distribution
        .iter()
        .map(|(level, count)| json!({"level": level.label(), "count": count}))
        .collect();
    let attributes: Vec<JSValue> = s
        .attributes
        .iter()
        .map(|st| {
            json!({
                "attribute": st.attribute.label(),
                "responses": st.responses,
                "average": opt_js(st.average),
                "satisfiedRate": opt_js(st.satisfied_rate),
                "priority": st.priority.map(|p| p.label()),
                "trend": st.trend.map(|t| t.label()),
            })
        })
        .collect();
    let trend: Vec<JSValue> = s
        .monthly_trend
        .iter()
        .map(|p| {
            json!({
                "month": p.month.key(),
                "label": p.month.label(),
                "averageScore": round2(p.average_score),
                "responses": p.responses,
            })
        })
        .collect();
    let comments: Vec<JSValue> = s
        .recent_comments
        .iter()
        .map(|c| {
            json!({
                "id": c.record_id,
                "date": format_date(&c.date),
                "satisfaction": c.satisfaction.label(),
                "text": c.text,
            })
        })
        .collect();
    json!({
        "metrics": {
            "totalRecords": res.total_records,
            "responses": s.responses,
            "overallScore": opt_js(s.overall_score),
            "performance": s.performance.map(|p| p.label()),
            "satisfactionRate": opt_js(s.satisfaction_rate),
            "nps": nps,
        },
        "distribution": distribution,
        "attributes": attributes,
        "trend": trend,
        "insights": insights_to_json(&res.insights),
        "comments": comments,
    })
}

fn build_summary_js(config: &OutputConfig, res: &DashboardResult) -> JSValue {
    let mut js = summary_to_json(res);
    js["config"] = json!(config);
    js
}

/// Guesses the type of a file from its extension.
fn guess_provider(path: &str) -> DashResult<String> {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" | "csv" => Ok(ext),
        _ => UnknownProviderSnafu { provider: ext }.fail(),
    }
}

fn resolve_path(root: &Option<PathBuf>, file_path: &str) -> String {
    match root {
        Some(r) => r.join(file_path).display().to_string(),
        None => file_path.to_string(),
    }
}

fn plan_inputs(
    args: &Args,
    config: &DashboardConfig,
    root: &Option<PathBuf>,
) -> DashResult<InputPlan> {
    if args.input_type.as_deref() == Some("sample") {
        return Ok(InputPlan::Sample);
    }
    if let Some(input) = args.input.clone() {
        let provider = match args.input_type.clone() {
            Some(p) => p,
            None => guess_provider(&input)?,
        };
        return Ok(InputPlan::Files(vec![DataSource {
            provider,
            file_path: input,
            excel_worksheet_name: args.excel_worksheet_name.clone(),
        }]));
    }
    if config.data_sources.is_empty() {
        return Ok(InputPlan::Sample);
    }
    let sources = config
        .data_sources
        .iter()
        .map(|ds| DataSource {
            provider: ds.provider.clone(),
            file_path: resolve_path(root, &ds.file_path),
            excel_worksheet_name: args
                .excel_worksheet_name
                .clone()
                .or_else(|| ds.excel_worksheet_name.clone()),
        })
        .collect();
    Ok(InputPlan::Files(sources))
}

fn read_source(source: &DataSource) -> DashResult<Vec<RawRow>> {
    info!(
        "Attempting to read {} file {:?}",
        source.provider, source.file_path
    );
    match source.provider.to_lowercase().as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" | "excel" => io_excel::read_excel_rows(
            &source.file_path,
            source.excel_worksheet_name.as_deref(),
        ),
        "csv" => io_csv::read_csv_rows(&source.file_path),
        "sample" => whatever!(
            "{:?}: sample data is not read from a file, use the sampleData section instead",
            source.file_path
        ),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

/// Reads all the sources. A single failure fails the whole read.
fn read_sources(sources: &[DataSource]) -> DashResult<Vec<RawRow>> {
    let mut data: Vec<RawRow> = Vec::new();
    for source in sources.iter() {
        let mut rows = read_source(source)?;
        data.append(&mut rows);
    }
    Ok(data)
}

fn parse_now(now: &Option<String>) -> DashResult<NaiveDateTime> {
    match now {
        Some(s) => parse_date_text(s).context(InvalidNowSnafu { now: s.clone() }),
        None => Ok(chrono::Local::now().naive_local()),
    }
}

fn write_output(out: &Option<String>, pretty_js: &str) -> DashResult<()> {
    match out.as_deref() {
        None | Some("") | Some("stdout") => {
            println!("{}", pretty_js);
            Ok(())
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty_js).context(WritingOutputSnafu { path })
        }
    }
}

fn check_reference(reference_path: &str, result_js: &JSValue) -> DashResult<()> {
    let summary_ref = read_reference_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(FormattingJsonSnafu {})?;
    let pretty_js_stats =
        serde_json::to_string_pretty(result_js).context(FormattingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats.as_ref(),
            "\n",
        );
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {:?}", reference_path);
    Ok(())
}

/// Runs the dashboard from the command line arguments: loads the responses,
/// computes the statistics of the filtered view and writes the summary.
pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let (config, root) = match args.config.clone() {
        Some(config_path) => {
            let config = read_config(&config_path)?;
            let root = Path::new(&config_path).parent().map(|p| p.to_path_buf());
            (config, root)
        }
        None => (DashboardConfig::default(), None),
    };
    info!("config: {:?}", config);

    let now = parse_now(&args.now)?;
    let date_range = args
        .date_range
        .clone()
        .or_else(|| config.filters.date_range.clone())
        .unwrap_or_default();
    let rating = args
        .rating
        .clone()
        .or_else(|| config.filters.rating.clone())
        .unwrap_or_default();
    let filter = FilterSpec::parse(&date_range, &rating).context(InvalidFilterSnafu {})?;

    let mode = match args.seed.or(config.sample_data.seed) {
        Some(seed) => RandomMode::Seeded(seed),
        None => RandomMode::Entropy,
    };
    let mut session = DashboardSession::new(mode);

    match plan_inputs(args, &config, &root)? {
        InputPlan::Sample => {
            let count = args
                .sample_count
                .or(config.sample_data.count)
                .unwrap_or(DEFAULT_SAMPLE_SIZE);
            session.load_sample(count, now);
        }
        InputPlan::Files(sources) => {
            debug!("sources: {:?}", sources);
            session.try_load(|| read_sources(&sources), now)?;
        }
    }
    if session.records().is_empty() {
        warn!("No response found in the input");
    }

    session.set_filter(filter);
    let result = session.refresh(now);
    debug!("result: {:?}", result);

    let output_config = OutputConfig {
        dashboard: config
            .output_settings
            .dashboard_name
            .clone()
            .unwrap_or_else(|| DEFAULT_DASHBOARD_NAME.to_string()),
        date_range: filter.date_range.name().to_string(),
        rating: filter.rating.name(),
        now: now.format(DATE_FORMAT).to_string(),
    };

    // Assemble the final json
    let result_js = build_summary_js(&output_config, &result);
    let pretty_js_stats =
        serde_json::to_string_pretty(&result_js).context(FormattingJsonSnafu {})?;

    let out = args.out.clone().or_else(|| {
        config
            .output_settings
            .output_path
            .as_ref()
            .map(|p| resolve_path(&root, p))
    });
    write_output(&out, &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(reference_path) = args.reference.clone() {
        check_reference(&reference_path, &result_js)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "surveydash-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn args() -> Args {
        Args {
            config: None,
            reference: None,
            out: None,
            input: None,
            input_type: None,
            excel_worksheet_name: None,
            sample_count: None,
            seed: Some(1),
            date_range: None,
            rating: None,
            now: Some("2024-06-15 12:00:00".to_string()),
            verbose: false,
        }
    }

    const CSV_DATA: &str = "\
Date,Customer ID,Food Quality,Service Quality,Hygiene,Value for Money,Overall Satisfaction,Comments,NPS Score
2024-06-01,C001,5,5,5,5,Excellent,Perfect evening,10
2024-05-20,C002,abc,3,4,2,Dissatisfied,,4
2023-01-10,C003,4,4,4,4,Satisfied,Nice,8
,,,,,,,,
";

    #[test]
    fn csv_to_summary() {
        init();
        let dir = test_dir("csv");
        let input = dir.join("responses.csv");
        let out = dir.join("summary.json");
        fs::write(&input, CSV_DATA).unwrap();

        let mut a = args();
        a.input = Some(input.display().to_string());
        a.out = Some(out.display().to_string());
        a.date_range = Some("last-90".to_string());
        run_dashboard(&a).unwrap();

        let js: JSValue = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(js["config"]["dateRange"], json!("last-90"));
        assert_eq!(js["metrics"]["totalRecords"], json!(3));
        assert_eq!(js["metrics"]["responses"], json!(2));
        assert_eq!(js["metrics"]["satisfactionRate"], json!(50.0));
        assert_eq!(js["metrics"]["nps"]["score"], json!(0));
        // "abc" is read as a neutral 3.
        assert_eq!(js["attributes"][0]["average"], json!(4.0));
        assert_eq!(js["comments"][0]["text"], json!("Perfect evening"));
        assert_eq!(js["trend"][0]["month"], json!("2024-05"));
    }

    #[test]
    fn empty_view_is_null() {
        init();
        let dir = test_dir("empty");
        let input = dir.join("responses.csv");
        let out = dir.join("summary.json");
        fs::write(&input, CSV_DATA).unwrap();

        let mut a = args();
        a.input = Some(input.display().to_string());
        a.out = Some(out.display().to_string());
        a.rating = Some("highly-dissatisfied".to_string());
        run_dashboard(&a).unwrap();

        let js: JSValue = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(js["metrics"]["responses"], json!(0));
        assert_eq!(js["metrics"]["overallScore"], JSValue::Null);
        assert_eq!(js["metrics"]["nps"], JSValue::Null);
        assert_eq!(js["insights"], JSValue::Null);
        assert_eq!(js["attributes"][0]["average"], JSValue::Null);
    }

    #[test]
    fn config_file_with_sample_data_and_reference() {
        init();
        let dir = test_dir("config");
        let config_path = dir.join("dashboard.json");
        fs::write(
            &config_path,
            r#"{
                "outputSettings": { "dashboardName": "Test", "outputPath": "summary.json" },
                "sampleData": { "count": 30, "seed": 9 },
                "filters": { "dateRange": "last-year" }
            }"#,
        )
        .unwrap();

        let mut a = args();
        a.seed = None;
        a.config = Some(config_path.display().to_string());
        run_dashboard(&a).unwrap();

        let summary_path = dir.join("summary.json");
        let js: JSValue =
            serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(js["config"]["dashboard"], json!("Test"));
        assert_eq!(js["metrics"]["totalRecords"], json!(30));

        // The same seed gives the same summary.
        a.reference = Some(summary_path.display().to_string());
        a.out = Some(dir.join("again.json").display().to_string());
        run_dashboard(&a).unwrap();

        // Another seed does not.
        a.seed = Some(10);
        let res = run_dashboard(&a);
        assert!(matches!(res, Err(DashboardError::ReferenceMismatch {})));
    }

    #[test]
    fn failures() {
        init();
        let mut a = args();
        a.input = Some("/nonexistent/responses.csv".to_string());
        assert!(matches!(
            run_dashboard(&a),
            Err(DashboardError::CsvOpen { .. })
        ));

        a.input = Some("responses.txt".to_string());
        assert!(matches!(
            run_dashboard(&a),
            Err(DashboardError::UnknownProvider { .. })
        ));

        let mut a = args();
        a.date_range = Some("yesterday".to_string());
        assert!(matches!(
            run_dashboard(&a),
            Err(DashboardError::InvalidFilter { .. })
        ));

        let mut a = args();
        a.now = Some("soon".to_string());
        assert!(matches!(
            run_dashboard(&a),
            Err(DashboardError::InvalidNow { .. })
        ));
    }

    #[test]
    fn error_report_includes_the_causes() {
        init();
        let mut a = args();
        a.input = Some("/nonexistent/responses.csv".to_string());
        let e = run_dashboard(&a).unwrap_err();
        let report = error_report(&e);
        assert!(report.starts_with("Error opening CSV file /nonexistent/responses.csv: "));
        // The io error of the csv reader comes after the context.
        assert!(report.contains("os error"), "{}", report);
        assert!(report.len() > e.to_string().len());
    }

    #[test]
    fn malformed_config_names_the_file() {
        init();
        let dir = test_dir("badconfig");
        let config_path = dir.join("dashboard.json");
        fs::write(&config_path, r#"{ "sampleData": { "count": 3, "#).unwrap();

        let mut a = args();
        a.config = Some(config_path.display().to_string());
        let e = run_dashboard(&a).unwrap_err();
        assert!(matches!(e, DashboardError::ParsingJson { .. }));
        let report = error_report(&e);
        assert!(report.contains(&config_path.display().to_string()), "{}", report);
        assert!(report.contains("EOF"), "{}", report);
    }

    #[test]
    fn csv_serial_dates() {
        init();
        let dir = test_dir("serial");
        let input = dir.join("responses.csv");
        let out = dir.join("summary.json");
        fs::write(
            &input,
            "Date,Overall Satisfaction,Comments\n45292,Satisfied,Good\n45444.5,Neutral,\n",
        )
        .unwrap();

        let mut a = args();
        a.input = Some(input.display().to_string());
        a.out = Some(out.display().to_string());
        run_dashboard(&a).unwrap();

        let js: JSValue = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(js["trend"][0]["month"], json!("2024-01"));
        assert_eq!(js["trend"][1]["month"], json!("2024-06"));
        assert_eq!(js["comments"][0]["date"], json!("2024-01-01 00:00:00"));
    }

    #[test]
    fn several_sources_are_concatenated() {
        init();
        let dir = test_dir("multi");
        fs::write(dir.join("a.csv"), CSV_DATA).unwrap();
        fs::write(
            dir.join("b.csv"),
            "overall satisfaction,nps\nvery satisfied,9\n",
        )
        .unwrap();
        let sources = vec![
            DataSource {
                provider: "csv".to_string(),
                file_path: dir.join("a.csv").display().to_string(),
                excel_worksheet_name: None,
            },
            DataSource {
                provider: "CSV".to_string(),
                file_path: dir.join("b.csv").display().to_string(),
                excel_worksheet_name: None,
            },
        ];
        let rows = read_sources(&sources).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[3].get(FIELD_OVERALL_SATISFACTION),
            Some(&RawValue::from("very satisfied"))
        );

        let mut bad = sources.clone();
        bad.push(DataSource {
            provider: "csv".to_string(),
            file_path: dir.join("missing.csv").display().to_string(),
            excel_worksheet_name: None,
        });
        assert!(read_sources(&bad).is_err());
    }
}
