use crate::election::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// Contest name used when no configuration file is given.
pub const DEFAULT_CONTEST_NAME: &str = "Voting application 2024";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ConfigCandidate {
    pub name: String,
}

/// Roster changes requested by the administrator.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AdminSettings {
    pub username: String,
    pub password: String,
    #[serde(rename = "addCandidates", default)]
    pub add_candidates: Vec<String>,
    #[serde(rename = "removeCandidates", default)]
    pub remove_candidates: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LiveResultsSettings {
    /// Number of seconds, as a number or a string.
    #[serde(rename = "refreshIntervalSeconds")]
    pub refresh_interval_seconds: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionSource {
    /// csv or json
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub candidates: Vec<ConfigCandidate>,
    pub admin: Option<AdminSettings>,
    #[serde(rename = "liveResults")]
    pub live_results: Option<LiveResultsSettings>,
    #[serde(rename = "submissionSources", default)]
    pub submission_sources: Vec<SubmissionSource>,
}

impl ElectionConfig {
    /// The refresh interval of the live results, if it is set and valid.
    pub fn refresh_interval(&self) -> Option<Duration> {
        let js = self
            .live_results
            .as_ref()
            .and_then(|l| l.refresh_interval_seconds.clone());
        match read_js_int(&js) {
            Ok(0) => {
                warn!("Ignoring a refresh interval of 0 seconds");
                None
            }
            Ok(secs) => Some(Duration::from_secs(secs as u64)),
            Err(_) if js.is_some() => {
                warn!("Could not understand refreshIntervalSeconds: {:?}", js);
                None
            }
            Err(_) => None,
        }
    }
}

pub fn read_config(path: &str) -> ElectionResult<ElectionConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: ElectionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> ElectionResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Reads an integer that may be written as a JSON number or as a string.
pub fn read_js_int(x: &Option<JSValue>) -> ElectionResult<usize> {
    match x {
        Some(JSValue::Number(n)) => match n.as_u64() {
            Some(v) => Ok(v as usize),
            None => whatever!("Not a positive integer: {}", n),
        },
        Some(JSValue::String(s)) => match s.trim().parse::<usize>() {
            Ok(v) => Ok(v),
            Err(_) => whatever!("Not a positive integer: {:?}", s),
        },
        _ => whatever!("Missing integer value"),
    }
}
