// The list of candidates a voter can choose from.

use log::{info, warn};
use std::fmt::Display;

use crate::election::config_reader::AdminSettings;
use crate::election::intake::is_alpha;

pub const DEFAULT_CANDIDATES: [&str; 2] = ["Ivan Prvy", "Alexander Pekny"];

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RosterError {
    EmptyName,
    /// Candidate names only contain letters and spaces.
    InvalidName,
    Duplicate,
}

impl Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::EmptyName => write!(f, "Candidate name must not be empty."),
            RosterError::InvalidName => write!(f, "Candidate name must not include numbers."),
            RosterError::Duplicate => write!(f, "This candidate is already added."),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateRoster {
    candidates: Vec<String>,
}

impl Default for CandidateRoster {
    fn default() -> Self {
        CandidateRoster::new(DEFAULT_CANDIDATES.iter().map(|s| s.to_string()))
    }
}

impl CandidateRoster {
    /// A roster with the given names, in order. Repeated names are kept once.
    pub fn new<I: IntoIterator<Item = String>>(names: I) -> CandidateRoster {
        let mut candidates: Vec<String> = Vec::new();
        for n in names {
            if candidates.contains(&n) {
                warn!("Ignoring repeated candidate {:?}", n);
            } else {
                candidates.push(n);
            }
        }
        CandidateRoster { candidates }
    }

    pub fn names(&self) -> &[String] {
        &self.candidates
    }

    pub fn contains(&self, name: &str) -> bool {
        self.candidates.iter().any(|c| c == name)
    }

    pub fn add(&mut self, name: &str) -> Result<(), RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if !is_alpha(name) {
            return Err(RosterError::InvalidName);
        }
        if self.contains(name) {
            return Err(RosterError::Duplicate);
        }
        self.candidates.push(name.to_string());
        Ok(())
    }

    /// Returns false if the candidate was not on the roster.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.candidates.len();
        self.candidates.retain(|c| c != name);
        before != self.candidates.len()
    }
}

pub fn is_admin(username: &str, password: &str) -> bool {
    username == ADMIN_USERNAME && password == ADMIN_PASSWORD
}

/// Applies the roster changes of the administrator, if the credentials are valid.
pub fn apply_admin_actions(roster: &mut CandidateRoster, admin: &AdminSettings) {
    if !is_admin(&admin.username, &admin.password) {
        warn!("Invalid admin credentials: roster changes are ignored");
        return;
    }
    for name in admin.add_candidates.iter() {
        match roster.add(name) {
            Ok(()) => info!("Admin added candidate {:?}", name),
            Err(e) => warn!("Admin could not add candidate {:?}: {}", name, e),
        }
    }
    for name in admin.remove_candidates.iter() {
        if roster.remove(name) {
            info!("Admin removed candidate {:?}", name);
        } else {
            warn!("Admin could not remove candidate {:?}: not on the roster", name);
        }
    }
}
