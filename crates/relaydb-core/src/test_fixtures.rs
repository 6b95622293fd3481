//! Shared record fixtures for unit tests.

use serde::{Deserialize, Serialize};

///
/// Person
/// Simple key, one indexed field, one plain field.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub age: i64,
    pub name: String,
}

record! {
    Person in "people" key [id] {
        @pk id,
        @index age,
        name,
    }
}

impl Person {
    pub fn new(id: i64, age: i64, name: &str) -> Self {
        Self {
            id,
            age,
            name: name.to_string(),
        }
    }
}

///
/// Shipment
/// Compound key (region, seq).
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub region: String,
    pub seq: u64,
    pub contents: String,
}

record! {
    Shipment in "shipments" key [region, seq] {
        @pk region,
        @pk seq,
        contents,
    }
}

///
/// Track
/// Field renamed on the wire (`plays` travels as `playCount`).
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    #[serde(rename = "playCount")]
    pub plays: u64,
    pub title: String,
}

record! {
    Track in "tracks" key [id] {
        @pk id,
        @index plays as "playCount",
        title,
    }
}

impl Track {
    pub fn new(id: i64, plays: u64, title: &str) -> Self {
        Self {
            id,
            plays,
            title: title.to_string(),
        }
    }
}
