//! Field checks performed by the intake forms before a vote reaches the ledger.

use std::fmt::Display;

use vote_ledger::{Ballot, VoteLedger, MINIMUM_VOTING_AGE};

use crate::election::roster::CandidateRoster;
use crate::election::Submission;

/// Oldest age accepted by the online form.
pub const MAXIMUM_ONLINE_AGE: u32 = 120;

/// The ways a voter can submit a vote.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum IntakeChannel {
    Online,
    /// A postal voting form is requested first, then the vote is confirmed.
    Postal,
    /// Voting with assistance for people with special needs. Same flow as postal.
    Assistance,
}

impl IntakeChannel {
    /// Parses the channel column of the inputs. An empty value means online.
    pub fn parse(s: &str) -> Option<IntakeChannel> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "online" => Some(IntakeChannel::Online),
            "postal" => Some(IntakeChannel::Postal),
            "assistance" => Some(IntakeChannel::Assistance),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IntakeChannel::Online => "Online",
            IntakeChannel::Postal => "Postal",
            IntakeChannel::Assistance => "Assisted",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum IntakeRejection {
    Incomplete,
    InvalidName,
    InvalidZipCode,
    InvalidAddress,
    InvalidAge,
    UnderAge,
    IdMismatch,
    UnknownCandidate(String),
    AlreadyVoted,
}

impl Display for IntakeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeRejection::Incomplete => write!(f, "All fields must be filled out."),
            IntakeRejection::InvalidName => {
                write!(f, "Name must contain only letters and spaces.")
            }
            IntakeRejection::InvalidZipCode => write!(f, "Zip code must be numeric."),
            IntakeRejection::InvalidAddress => {
                write!(f, "Address must contain only letters, digits and spaces.")
            }
            IntakeRejection::InvalidAge => write!(f, "Please enter a valid age."),
            IntakeRejection::UnderAge => write!(
                f,
                "You must be at least {} years old to vote.",
                MINIMUM_VOTING_AGE
            ),
            IntakeRejection::IdMismatch => {
                write!(f, "The ID does not match the ID entered initially.")
            }
            IntakeRejection::UnknownCandidate(c) => write!(f, "Unknown candidate {:?}.", c),
            IntakeRejection::AlreadyVoted => write!(f, "This ID has already been used to vote."),
        }
    }
}

/// Only letters and whitespace, at least one character.
pub fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
}

pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Letters, digits and whitespace only, for example `Stara Cesta 5`.
pub fn is_valid_address(s: &str) -> bool {
    !s.trim().is_empty()
        && s
            .chars()
            .all(|c| c.is_alphabetic() || c.is_ascii_digit() || c.is_whitespace())
}

fn parse_zip(zip: &str) -> Result<u32, IntakeRejection> {
    if !is_numeric(zip) {
        return Err(IntakeRejection::InvalidZipCode);
    }
    zip.parse::<u32>()
        .map_err(|_| IntakeRejection::InvalidZipCode)
}

fn parse_age(age: &str) -> Result<u32, IntakeRejection> {
    let age: i64 = age.parse().map_err(|_| IntakeRejection::InvalidAge)?;
    if age < 0 {
        return Err(IntakeRejection::InvalidAge);
    }
    if age < MINIMUM_VOTING_AGE as i64 {
        return Err(IntakeRejection::UnderAge);
    }
    u32::try_from(age).map_err(|_| IntakeRejection::InvalidAge)
}

fn check_candidate(candidate: &str, roster: &CandidateRoster) -> Result<(), IntakeRejection> {
    if roster.contains(candidate) {
        Ok(())
    } else {
        Err(IntakeRejection::UnknownCandidate(candidate.to_string()))
    }
}

fn trimmed(s: &Option<String>) -> Option<String> {
    s.as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validates a submission and turns it into a ballot for the ledger.
///
/// The postal and assistance channels check the ledger first, so that a voter
/// who already voted does not fill the confirmation form. This check is only
/// advisory: the ledger checks the identifier again when the vote is cast.
pub fn validate_submission(
    sub: &Submission,
    roster: &CandidateRoster,
    ledger: &VoteLedger,
) -> Result<Ballot, IntakeRejection> {
    let name = sub.name.trim();
    let id = sub.id.trim();
    let zip = sub.zip.trim();
    let candidate = sub.candidate.trim();
    let state = trimmed(&sub.state);

    let age = match sub.channel {
        IntakeChannel::Online => {
            if name.is_empty() || id.is_empty() || zip.is_empty() || candidate.is_empty() {
                return Err(IntakeRejection::Incomplete);
            }
            let age = parse_age(sub.age.trim())?;
            if age > MAXIMUM_ONLINE_AGE {
                return Err(IntakeRejection::InvalidAge);
            }
            if !is_alpha(name) {
                return Err(IntakeRejection::InvalidName);
            }
            age
        }
        IntakeChannel::Postal | IntakeChannel::Assistance => {
            // Request form
            if ledger.has_already_voted(id) {
                return Err(IntakeRejection::AlreadyVoted);
            }
            let address = trimmed(&sub.address);
            if name.is_empty()
                || id.is_empty()
                || zip.is_empty()
                || address.is_none()
                || state.is_none()
            {
                return Err(IntakeRejection::Incomplete);
            }
            if !is_alpha(name) {
                return Err(IntakeRejection::InvalidName);
            }
            if !is_numeric(zip) {
                return Err(IntakeRejection::InvalidZipCode);
            }
            if !address.as_deref().map(is_valid_address).unwrap_or(false) {
                return Err(IntakeRejection::InvalidAddress);
            }
            // Confirmation form
            let confirm_id = trimmed(&sub.confirm_id);
            let confirm_age = sub.age.trim();
            if confirm_id.is_none() || confirm_age.is_empty() || candidate.is_empty() {
                return Err(IntakeRejection::Incomplete);
            }
            if confirm_id.as_deref() != Some(id) {
                return Err(IntakeRejection::IdMismatch);
            }
            parse_age(confirm_age)?
        }
    };

    let zip_code = parse_zip(zip)?;
    check_candidate(candidate, roster)?;

    Ok(Ballot {
        candidate: candidate.to_string(),
        voter_name: name.to_string(),
        age,
        state,
        identifier: id.to_string(),
        zip_code,
    })
}
