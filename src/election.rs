use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use vote_ledger::live::{DisplaySink, LiveRefresh, DEFAULT_REFRESH_INTERVAL};
use vote_ledger::*;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
pub mod intake;
mod io_csv;
mod io_json;
pub mod roster;

use crate::election::config_reader::*;
use crate::election::intake::{validate_submission, IntakeChannel, IntakeRejection};
use crate::election::roster::{apply_admin_actions, CandidateRoster};

#[derive(Debug, Snafu)]
pub enum ElectionError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error reading the header of the CSV file"))]
    CsvHeader { source: csv::Error },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("The CSV file has no column named {column}"))]
    CsvMissingColumn { column: String },
    #[snafu(display("Unknown intake channel {channel:?} for submission {position}"))]
    UnknownChannel { channel: String, position: usize },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Ledger failure"))]
    Ledger { source: VotingErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ElectionResult<T> = Result<T, ElectionError>;

/// A voter submission, as read from an input file.
/// This is before any validation: all the fields are kept as typed by the voter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Submission {
    pub channel: IntakeChannel,
    pub name: String,
    pub id: String,
    /// The identifier typed again on the confirmation form (postal and assistance channels).
    pub confirm_id: Option<String>,
    pub address: Option<String>,
    pub zip: String,
    pub state: Option<String>,
    pub age: String,
    pub candidate: String,
}

/// What happened to the submissions of a session.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct IntakeStats {
    pub accepted: u64,
    /// Submissions refused because the identifier had already voted.
    pub duplicates: u64,
    /// Submissions refused by the intake validation.
    pub invalid: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SessionOptions {
    pub config_path: Option<String>,
    pub input_path: Option<String>,
    pub input_type: Option<String>,
    pub out_path: Option<String>,
    pub reference_path: Option<String>,
    pub live: bool,
    pub refresh_seconds: Option<u64>,
}

/// Prints the live results on the standard output.
struct StdoutDisplay;

impl DisplaySink for StdoutDisplay {
    fn publish(&self, report: String) {
        println!("---- live results ----\n{}", report);
    }
}

/// Runs every submission through the intake validation and the ledger.
pub fn process_submissions(
    ledger: &VoteLedger,
    roster: &CandidateRoster,
    submissions: &[Submission],
) -> ElectionResult<IntakeStats> {
    let mut stats = IntakeStats::default();
    for (idx, sub) in submissions.iter().enumerate() {
        let ballot = match validate_submission(sub, roster, ledger) {
            Ok(b) => b,
            Err(IntakeRejection::AlreadyVoted) => {
                info!(
                    "submission {}: identifier {:?} has already been used to vote",
                    idx, sub.id
                );
                stats.duplicates += 1;
                continue;
            }
            Err(r) => {
                info!("submission {}: rejected: {}", idx, r);
                stats.invalid += 1;
                continue;
            }
        };
        match ledger.try_cast_vote(&ballot) {
            Ok(()) => {
                info!("{} voting for {}", sub.channel.label(), ballot.candidate);
                stats.accepted += 1;
            }
            Err(VotingErrors::DuplicateIdentifier(id)) => {
                info!("submission {}: identifier {:?} has already voted", idx, id);
                stats.duplicates += 1;
            }
            Err(VotingErrors::UnderAge(age)) => {
                warn!("submission {}: age {} refused by the ledger", idx, age);
                stats.invalid += 1;
            }
            Err(e) => return Err(ElectionError::Ledger { source: e }),
        }
    }
    debug!("process_submissions: {:?}", stats);
    Ok(stats)
}

/// The JSON summary of a session.
pub fn build_summary_js(contest: &str, snapshot: &LedgerSnapshot, stats: &IntakeStats) -> JSValue {
    let mut candidates: JSMap<String, JSValue> = JSMap::new();
    for (name, count) in snapshot.candidate_totals.iter() {
        candidates.insert(name.clone(), json!(count.to_string()));
    }

    let mut ages: JSMap<String, JSValue> = JSMap::new();
    for bracket in AgeBracket::ALL {
        ages.insert(
            bracket.label().to_string(),
            json!(snapshot.age_demographics.count(bracket).to_string()),
        );
    }

    let mut states: JSMap<String, JSValue> = JSMap::new();
    for (state, _) in snapshot.state_totals.iter() {
        states.insert(
            state.clone(),
            json!(snapshot.state_total(state).to_string()),
        );
    }

    json!({
        "config": { "contest": contest },
        "results": {
            "candidates": candidates,
            "ageDemographics": ages,
            "states": states,
        },
        "intake": {
            "accepted": stats.accepted,
            "duplicates": stats.duplicates,
            "invalid": stats.invalid,
        }
    })
}

fn read_submissions(path: &str, input_type: Option<&str>) -> ElectionResult<Vec<Submission>> {
    let provider = match input_type {
        Some(t) => t.to_string(),
        None => match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("json") => "json".to_string(),
            _ => "csv".to_string(),
        },
    };
    info!("Attempting to read submission file {:?} ({})", path, provider);
    match provider.as_str() {
        "csv" => io_csv::read_csv_file(path),
        "json" => io_json::read_json_file(path),
        x => whatever!("Input type not implemented {:?}", x),
    }
}

fn write_summary(out: &str, pretty: &str) -> ElectionResult<()> {
    if out == "stdout" {
        println!("{}", pretty);
        return Ok(());
    }
    info!("Writing summary to {}", out);
    fs::write(out, pretty).context(WritingSummarySnafu { path: out })
}

pub fn run_session(opts: &SessionOptions) -> ElectionResult<()> {
    let config: Option<ElectionConfig> = match &opts.config_path {
        Some(p) => Some(read_config(p)?),
        None => None,
    };
    debug!("config: {:?}", config);
    let root_p: PathBuf = match &opts.config_path {
        Some(p) => Path::new(p)
            .parent()
            .context(MissingParentDirSnafu {})?
            .to_path_buf(),
        None => PathBuf::new(),
    };

    let mut roster = match &config {
        Some(c) => CandidateRoster::new(c.candidates.iter().map(|c| c.name.clone())),
        None => CandidateRoster::default(),
    };
    if let Some(admin) = config.as_ref().and_then(|c| c.admin.as_ref()) {
        apply_admin_actions(&mut roster, admin);
    }
    info!("Candidates: {:?}", roster.names());

    let mut submissions: Vec<Submission> = Vec::new();
    if let Some(input) = &opts.input_path {
        submissions = read_submissions(input, opts.input_type.as_deref())?;
    } else if let Some(c) = &config {
        for source in c.submission_sources.iter() {
            let p: PathBuf = root_p.join(&source.file_path);
            let mut data =
                read_submissions(&p.display().to_string(), Some(source.provider.as_str()))?;
            submissions.append(&mut data);
        }
    }
    if submissions.is_empty() {
        whatever!("No submissions to process: pass an input file or configure submission sources")
    }
    info!("Processing {} submissions", submissions.len());

    let ledger = Arc::new(VoteLedger::new());
    let live_handle = if opts.live {
        let interval = opts
            .refresh_seconds
            .map(Duration::from_secs)
            .or_else(|| config.as_ref().and_then(|c| c.refresh_interval()))
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);
        let handle = LiveRefresh::spawn(
            Arc::clone(&ledger),
            Arc::new(StdoutDisplay),
            interval,
            ReportStyle::PlainText,
        )
        .context(LedgerSnafu {})?;
        Some(handle)
    } else {
        None
    };

    let res = process_submissions(&ledger, &roster, &submissions);
    if let Some(h) = live_handle {
        h.stop();
    }
    let stats = res?;
    info!("Intake done: {:?}", stats);

    // End of session summary
    let report = ledger
        .render_with(ReportStyle::PlainText)
        .context(LedgerSnafu {})?;
    println!("{}", report);

    let contest = config
        .as_ref()
        .map(|c| c.output_settings.contest_name.clone())
        .unwrap_or_else(|| DEFAULT_CONTEST_NAME.to_string());
    let snapshot = ledger.snapshot().context(LedgerSnafu {})?;
    let result_js = build_summary_js(&contest, &snapshot, &stats);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out_path: Option<String> = opts.out_path.clone().or_else(|| {
        config
            .as_ref()
            .and_then(|c| c.output_settings.output_directory.clone())
            .map(|d| root_p.join(d).join("summary.json").display().to_string())
    });
    if let Some(out) = out_path {
        write_summary(&out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &opts.reference_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}
