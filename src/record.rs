//! Record identity - stable keys for linguistic records
//!
//! Format: `<kind>:<guid>`
//!
//! Examples:
//! - `entry:9c5b4c12-7a1e-4d6f-9f20-3f5b8e2a1c44`
//! - `part-of-speech:e2a7d3b0-11cc-4c55-8d2e-0a9b6f41d7a3`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Record kinds the importer understands.
///
/// One variant per linguistic object type in the stores. The accessor layer
/// dispatches per-type behavior on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    /// A lexical entry (headword plus its owned material)
    Entry,
    /// A sense of an entry
    Sense,
    /// An example sentence owned by a sense
    Example,
    /// A pronunciation owned by an entry
    Pronunciation,
    /// A semantic domain (shared taxonomy node)
    SemanticDomain,
    /// A part of speech (shared grammatical category)
    PartOfSpeech,
    /// A writing system definition
    WritingSystem,
    /// A publication a record can be included in
    Publication,
    /// An analyst/agent that produced or approved a record
    Agent,
}

impl RecordKind {
    /// Get the string representation of the record kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Entry => "entry",
            RecordKind::Sense => "sense",
            RecordKind::Example => "example",
            RecordKind::Pronunciation => "pronunciation",
            RecordKind::SemanticDomain => "semantic-domain",
            RecordKind::PartOfSpeech => "part-of-speech",
            RecordKind::WritingSystem => "writing-system",
            RecordKind::Publication => "publication",
            RecordKind::Agent => "agent",
        }
    }

    /// Get all record kinds
    pub fn all() -> &'static [RecordKind] {
        &[
            RecordKind::Entry,
            RecordKind::Sense,
            RecordKind::Example,
            RecordKind::Pronunciation,
            RecordKind::SemanticDomain,
            RecordKind::PartOfSpeech,
            RecordKind::WritingSystem,
            RecordKind::Publication,
            RecordKind::Agent,
        ]
    }

    /// Check if records of this kind are shared leaves rather than owned material.
    ///
    /// Shared kinds are typically reached by reference edges and already
    /// present in most targets.
    pub fn is_shared(&self) -> bool {
        matches!(
            self,
            RecordKind::SemanticDomain
                | RecordKind::PartOfSpeech
                | RecordKind::WritingSystem
                | RecordKind::Publication
                | RecordKind::Agent
        )
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "entry" | "lexentry" => Ok(RecordKind::Entry),
            "sense" => Ok(RecordKind::Sense),
            "example" | "example-sentence" => Ok(RecordKind::Example),
            "pronunciation" | "pron" => Ok(RecordKind::Pronunciation),
            "semantic-domain" | "semanticdomain" | "domain" => Ok(RecordKind::SemanticDomain),
            "part-of-speech" | "partofspeech" | "pos" => Ok(RecordKind::PartOfSpeech),
            "writing-system" | "writingsystem" | "ws" => Ok(RecordKind::WritingSystem),
            "publication" => Ok(RecordKind::Publication),
            "agent" => Ok(RecordKind::Agent),
            _ => Err(Error::InvalidRef(format!("Unknown record kind: {}", s))),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stable reference to a record: its kind plus a store-independent GUID.
///
/// The GUID is the identity key used to recognize "the same object" across
/// source and target stores; it is never reused for a different record.
/// This reference serves as the primary key for:
/// - Graph nodes
/// - Edges
/// - Change records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordRef {
    /// The record's type tag
    pub kind: RecordKind,
    /// Store-independent identity
    pub guid: Uuid,
}

impl RecordRef {
    /// Create a new RecordRef
    pub fn new(kind: RecordKind, guid: Uuid) -> Self {
        Self { kind, guid }
    }

    /// Create a RecordRef with a fresh random GUID
    pub fn random(kind: RecordKind) -> Self {
        Self {
            kind,
            guid: Uuid::new_v4(),
        }
    }

    /// Parse a reference string into a RecordRef
    ///
    /// Expected format: `<kind>:<guid>`
    pub fn parse(s: &str) -> Result<Self> {
        let (kind_str, guid_str) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidRef(format!("missing ':' in record ref: {}", s)))?;

        let kind = RecordKind::from_str(kind_str)?;
        let guid = Uuid::parse_str(guid_str)
            .map_err(|_| Error::InvalidRef(format!("invalid GUID: {}", guid_str)))?;

        Ok(Self { kind, guid })
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.guid)
    }
}

impl FromStr for RecordRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for RecordRef {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordRef {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordRef::parse(&s).map_err(serde::de::Error::custom)
    }
}
