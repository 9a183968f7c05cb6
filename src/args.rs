use clap::Parser;

/// This is a mock election program: it validates voter submissions, counts them and reports live results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election configuration in JSON format: candidates,
    /// admin actions, live results and submission sources. Without it, the default roster is used.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the expected summary of the election in JSON format.
    /// If provided, mockvote will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file with the voter submissions. Setting this option overrides the
    /// submission sources of the configuration file.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or json) The type of the input. Defaults to the extension of the input file, then csv.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// If passed as an argument, the live results are printed while the submissions are processed.
    #[clap(long, takes_value = false)]
    pub live: bool,

    /// (seconds) The refresh interval of the live results. Overrides the configuration file.
    #[clap(long, value_parser)]
    pub refresh_seconds: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
