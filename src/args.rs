use clap::Parser;

/// This is a dashboard for customer satisfaction surveys.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the dashboard configuration, in JSON format.
    /// See the documentation of the survey_analytics::manual module for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing a dashboard summary in JSON format. If provided,
    /// surveydash will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file with the survey responses. Setting this option overrides the data
    /// sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx, xls, ods, csv or sample) The type of the input. By default, it is guessed from the
    /// extension of the input file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: the first worksheet) When using a spreadsheet, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 150) The number of responses to generate with the sample input.
    #[clap(long, value_parser)]
    pub sample_count: Option<usize>,

    /// (number) If specified, the random draws (sample data, missing NPS scores) are reproducible.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// (all, last-30, last-90 or last-year) The date range of the responses to include.
    #[clap(long, value_parser)]
    pub date_range: Option<String>,

    /// (all or a satisfaction level such as highly-satisfied) The responses to include.
    #[clap(long, value_parser)]
    pub rating: Option<String>,

    /// (date, default: the current time) The reference time for the date filters,
    /// for example 2024-06-30 or 2024-06-30T12:00:00.
    #[clap(long, value_parser)]
    pub now: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
