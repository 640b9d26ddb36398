use std::collections::BTreeSet;
use std::fs;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::records::{
    CitizenRecord, FollowRecord, PoapHolderRecord, ReferralRecord, ScoreRecord,
    TokenHolderRecord, TransferRecord, TrustedSeedRecord,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Citizens,
    TokenHolders,
    Scores,
    TrustedSeeds,
    PoapHolders,
    Follows,
    Referrals,
    Transfers,
}

impl SourceKind {
    pub const ALL: [Self; 8] = [
        Self::Citizens,
        Self::TokenHolders,
        Self::Scores,
        Self::TrustedSeeds,
        Self::PoapHolders,
        Self::Follows,
        Self::Referrals,
        Self::Transfers,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Citizens => "CitizensWithoutFarcasterDataField.json",
            Self::TokenHolders => "TECHolders.json",
            Self::Scores => "RegenScore.json",
            Self::TrustedSeeds => "TrustedSeed.json",
            Self::PoapHolders => "RegenPOAP.json",
            Self::Follows => "CitizensFarcasterConnections.json",
            Self::Referrals => "BadgeHolders.json",
            Self::Transfers => "citizenTransactions.json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Citizens => "citizens",
            Self::TokenHolders => "token holders",
            Self::Scores => "scores",
            Self::TrustedSeeds => "trusted seeds",
            Self::PoapHolders => "POAP holders",
            Self::Follows => "follows",
            Self::Referrals => "referrals",
            Self::Transfers => "transfers",
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum SourcePayload {
    Citizens(Vec<CitizenRecord>),
    TokenHolders(Vec<TokenHolderRecord>),
    Scores(Vec<ScoreRecord>),
    TrustedSeeds(Vec<TrustedSeedRecord>),
    PoapHolders(Vec<PoapHolderRecord>),
    Follows(Vec<FollowRecord>),
    Referrals(Vec<ReferralRecord>),
    Transfers(Vec<TransferRecord>),
}

impl SourcePayload {
    #[cfg(test)]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Citizens(_) => SourceKind::Citizens,
            Self::TokenHolders(_) => SourceKind::TokenHolders,
            Self::Scores(_) => SourceKind::Scores,
            Self::TrustedSeeds(_) => SourceKind::TrustedSeeds,
            Self::PoapHolders(_) => SourceKind::PoapHolders,
            Self::Follows(_) => SourceKind::Follows,
            Self::Referrals(_) => SourceKind::Referrals,
            Self::Transfers(_) => SourceKind::Transfers,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Citizens(records) => records.len(),
            Self::TokenHolders(records) => records.len(),
            Self::Scores(records) => records.len(),
            Self::TrustedSeeds(records) => records.len(),
            Self::PoapHolders(records) => records.len(),
            Self::Follows(records) => records.len(),
            Self::Referrals(records) => records.len(),
            Self::Transfers(records) => records.len(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceSet {
    pub citizens: Option<Vec<CitizenRecord>>,
    pub token_holders: Option<Vec<TokenHolderRecord>>,
    pub scores: Option<Vec<ScoreRecord>>,
    pub trusted_seeds: Option<Vec<TrustedSeedRecord>>,
    pub poap_holders: Option<Vec<PoapHolderRecord>>,
    pub follows: Option<Vec<FollowRecord>>,
    pub referrals: Option<Vec<ReferralRecord>>,
    pub transfers: Option<Vec<TransferRecord>>,
}

impl SourceSet {
    pub fn insert(&mut self, payload: SourcePayload) {
        match payload {
            SourcePayload::Citizens(records) => self.citizens = Some(records),
            SourcePayload::TokenHolders(records) => self.token_holders = Some(records),
            SourcePayload::Scores(records) => self.scores = Some(records),
            SourcePayload::TrustedSeeds(records) => self.trusted_seeds = Some(records),
            SourcePayload::PoapHolders(records) => self.poap_holders = Some(records),
            SourcePayload::Follows(records) => self.follows = Some(records),
            SourcePayload::Referrals(records) => self.referrals = Some(records),
            SourcePayload::Transfers(records) => self.transfers = Some(records),
        }
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SourceError> {
    let raw = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_source(data_dir: &Path, kind: SourceKind) -> Result<SourcePayload, SourceError> {
    let path = data_dir.join(kind.file_name());
    let payload = match kind {
        SourceKind::Citizens => SourcePayload::Citizens(read_records(&path)?),
        SourceKind::TokenHolders => SourcePayload::TokenHolders(read_records(&path)?),
        SourceKind::Scores => SourcePayload::Scores(read_records(&path)?),
        SourceKind::TrustedSeeds => SourcePayload::TrustedSeeds(read_records(&path)?),
        SourceKind::PoapHolders => SourcePayload::PoapHolders(read_records(&path)?),
        SourceKind::Follows => SourcePayload::Follows(read_records(&path)?),
        SourceKind::Referrals => SourcePayload::Referrals(read_records(&path)?),
        SourceKind::Transfers => SourcePayload::Transfers(read_records(&path)?),
    };
    Ok(payload)
}

#[derive(Debug)]
pub struct LoadMessage {
    pub generation: u64,
    pub kind: SourceKind,
    pub result: Result<SourcePayload, SourceError>,
}

pub fn spawn_source_loads(data_dir: &Path, generation: u64, tx: &Sender<LoadMessage>) {
    info!(generation, data_dir = %data_dir.display(), "loading citizen sources");

    for kind in SourceKind::ALL {
        let data_dir = data_dir.to_path_buf();
        let tx = tx.clone();
        thread::spawn(move || {
            let result = load_source(&data_dir, kind);
            let _ = tx.send(LoadMessage {
                generation,
                kind,
                result,
            });
        });
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFailure {
    pub kind: SourceKind,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedSources {
    pub generation: u64,
    pub sources: SourceSet,
    pub failures: Vec<SourceFailure>,
}

/// Collects per-source results for the newest load and releases them only once
/// every source has settled. Results from superseded loads are discarded.
#[derive(Debug, Default)]
pub struct LoadTracker {
    generation: u64,
    pending: BTreeSet<SourceKind>,
    sources: SourceSet,
    failures: Vec<SourceFailure>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.pending = SourceKind::ALL.into_iter().collect();
        self.sources = SourceSet::default();
        self.failures.clear();
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn accept(&mut self, message: LoadMessage) -> Option<LoadedSources> {
        if message.generation != self.generation {
            debug!(
                stale = message.generation,
                current = self.generation,
                kind = ?message.kind,
                "discarding superseded source result"
            );
            return None;
        }

        if !self.pending.remove(&message.kind) {
            return None;
        }

        match message.result {
            Ok(payload) => {
                debug!(kind = ?message.kind, records = payload.len(), "source loaded");
                self.sources.insert(payload);
            }
            Err(error) => {
                warn!(kind = ?message.kind, %error, "source failed to load");
                self.failures.push(SourceFailure {
                    kind: message.kind,
                    message: error.to_string(),
                });
            }
        }

        if !self.pending.is_empty() {
            return None;
        }

        Some(LoadedSources {
            generation: self.generation,
            sources: mem::take(&mut self.sources),
            failures: mem::take(&mut self.failures),
        })
    }
}
