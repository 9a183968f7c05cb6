// Primitives for reading CSV files.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use csv::StringRecord;

use crate::election::*;

pub fn read_csv_file(path: &str) -> ElectionResult<Vec<Submission>> {
    let file = File::open(path).context(OpeningFileSnafu { path })?;
    read_csv_submissions(file)
}

pub fn read_csv_submissions<R: Read>(input: R) -> ElectionResult<Vec<Submission>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    read_records(rdr)
}

fn read_records<R: Read>(mut rdr: csv::Reader<R>) -> ElectionResult<Vec<Submission>> {
    let headers: HashMap<String, usize> = rdr
        .headers()
        .context(CsvHeaderSnafu {})?
        .iter()
        .enumerate()
        .map(|(idx, h)| (h.to_string(), idx))
        .collect();
    debug!("read_records: headers: {:?}", headers);
    for required in ["id", "candidate"] {
        ensure!(
            headers.contains_key(required),
            CsvMissingColumnSnafu { column: required }
        );
    }

    let mut res: Vec<Submission> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is the first line.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_records: lineno: {:?} row: {:?}", lineno, line);
        let field = |name: &str| get_field(&line, &headers, name);
        let channel_s = field("channel");
        let channel = IntakeChannel::parse(&channel_s).context(UnknownChannelSnafu {
            channel: channel_s.clone(),
            position: lineno,
        })?;
        res.push(Submission {
            channel,
            name: field("name"),
            id: field("id"),
            confirm_id: non_empty(field("confirmId")),
            address: non_empty(field("address")),
            zip: field("zip"),
            state: non_empty(field("state")),
            age: field("age"),
            candidate: field("candidate"),
        });
    }
    Ok(res)
}

fn get_field(line: &StringRecord, headers: &HashMap<String, usize>, name: &str) -> String {
    headers
        .get(name)
        .and_then(|idx| line.get(*idx))
        .unwrap_or("")
        .to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_all_channels() {
        let data = "channel,name,id,confirmId,address,zip,state,age,candidate\n\
                    online,Bob,id1,,,10000,,25,Alice\n\
                    postal, Jan Novak ,id2,id2,Hlavna 12,81101,Slovakia,45,Bob\n\
                    ,Eve,id3,,,20000,Germany,33,Alice\n";
        let subs = read_csv_submissions(data.as_bytes()).unwrap();
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0].channel, IntakeChannel::Online);
        assert_eq!(subs[0].state, None);
        assert_eq!(subs[0].confirm_id, None);
        assert_eq!(subs[1].channel, IntakeChannel::Postal);
        assert_eq!(subs[1].name, "Jan Novak");
        assert_eq!(subs[1].address, Some("Hlavna 12".to_string()));
        assert_eq!(subs[2].channel, IntakeChannel::Online);
        assert_eq!(subs[2].state, Some("Germany".to_string()));
    }

    #[test]
    fn optional_columns_may_be_missing() {
        let data = "id,age,candidate,name,zip\nid1,40,Alice,Bob,123\n";
        let subs = read_csv_submissions(data.as_bytes()).unwrap();
        assert_eq!(subs[0].channel, IntakeChannel::Online);
        assert_eq!(subs[0].age, "40");
        assert_eq!(subs[0].address, None);
    }

    #[test]
    fn missing_id_column() {
        let data = "name,candidate\nBob,Alice\n";
        let err = read_csv_submissions(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ElectionError::CsvMissingColumn { .. }));
    }

    #[test]
    fn unknown_channel() {
        let data = "channel,id,candidate\nfax,id1,Alice\n";
        let err = read_csv_submissions(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ElectionError::UnknownChannel { position: 2, .. }
        ));
    }
}
