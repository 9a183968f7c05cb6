// Submissions stored as a JSON array.

use serde::Deserialize;

use crate::election::*;

#[derive(PartialEq, Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct JsonSubmission {
    channel: Option<String>,
    name: Option<String>,
    id: Option<JSValue>,
    #[serde(rename = "confirmId")]
    confirm_id: Option<JSValue>,
    address: Option<String>,
    zip: Option<JSValue>,
    state: Option<String>,
    age: Option<JSValue>,
    candidate: Option<String>,
}

// Numbers are accepted where a voter would type digits.
fn js_text(x: &Option<JSValue>) -> String {
    match x {
        Some(JSValue::String(s)) => s.clone(),
        Some(JSValue::Number(n)) => n.to_string(),
        Some(JSValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn opt_text(x: &Option<String>) -> Option<String> {
    x.clone().filter(|s| !s.trim().is_empty())
}

pub fn read_json_file(path: &str) -> ElectionResult<Vec<Submission>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    read_json_submissions(&contents)
}

pub fn read_json_submissions(contents: &str) -> ElectionResult<Vec<Submission>> {
    let raw: Vec<JsonSubmission> = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    let mut res: Vec<Submission> = Vec::new();
    for (idx, js) in raw.iter().enumerate() {
        let channel_s = js.channel.clone().unwrap_or_default();
        let channel = IntakeChannel::parse(&channel_s).context(UnknownChannelSnafu {
            channel: channel_s.clone(),
            position: idx + 1,
        })?;
        let confirm_id = js_text(&js.confirm_id);
        res.push(Submission {
            channel,
            name: js.name.clone().unwrap_or_default(),
            id: js_text(&js.id),
            confirm_id: if confirm_id.is_empty() {
                None
            } else {
                Some(confirm_id)
            },
            address: opt_text(&js.address),
            zip: js_text(&js.zip),
            state: opt_text(&js.state),
            age: js_text(&js.age),
            candidate: js.candidate.clone().unwrap_or_default(),
        });
    }
    debug!("read_json_submissions: {} submissions", res.len());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_strings() {
        let subs = read_json_submissions(
            r#"[
                {"name": "Bob", "id": "id1", "zip": 10000, "age": 25, "candidate": "Alice"},
                {"channel": "assistance", "name": "Anna", "id": 42, "confirmId": "42",
                 "address": "Dlha 3", "zip": "04001", "state": "Slovakia", "age": "70",
                 "candidate": "Bob"}
            ]"#,
        )
        .unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].channel, IntakeChannel::Online);
        assert_eq!(subs[0].zip, "10000");
        assert_eq!(subs[0].age, "25");
        assert_eq!(subs[0].state, None);
        assert_eq!(subs[1].id, "42");
        assert_eq!(subs[1].confirm_id, Some("42".to_string()));
        assert_eq!(subs[1].zip, "04001");
    }

    #[test]
    fn not_an_array() {
        let err = read_json_submissions(r#"{"name": "Bob"}"#).unwrap_err();
        assert!(matches!(err, ElectionError::ParsingJson { .. }));
    }

    #[test]
    fn unknown_channel() {
        let err = read_json_submissions(r#"[{"channel": "pigeon"}]"#).unwrap_err();
        assert!(matches!(err, ElectionError::UnknownChannel { position: 1, .. }));
    }
}
