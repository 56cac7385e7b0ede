use crate::reveal::RevealItem;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

static CONTENT_DIR: Dir = include_dir!("src/content");

/// One pane of the horizontally scrolling pillar strip.
#[derive(Deserialize, Clone, Debug)]
pub struct Pillar {
    pub title: String,
    pub subtitle: String,
    pub copy: String,
}

/// A count-up statistic shown in the footer section.
#[derive(Deserialize, Clone, Debug)]
pub struct StatCounter {
    pub label: String,
    pub value: u64,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
}

/// An outbound link with its keybinding.
#[derive(Deserialize, Clone, Debug)]
pub struct LinkEntry {
    pub key: char,
    pub label: String,
    pub url: String,
}

/// Everything the showcase displays, fixed at build time.
#[derive(Deserialize, Clone, Debug)]
pub struct Deck {
    pub name: String,
    pub headline: Vec<String>,
    pub tagline: String,
    pub terminal_title: String,
    pub terminal: Vec<RevealItem>,
    pub pillars: Vec<Pillar>,
    pub stats: Vec<StatCounter>,
    pub links: Vec<LinkEntry>,
    pub hint: String,
}

impl Deck {
    pub fn new(file_name: &str) -> Self {
        read_deck_from_file(format!("{file_name}.json")).unwrap()
    }
}

fn read_deck_from_file(file_name: String) -> Result<Deck, Box<dyn Error>> {
    let file = CONTENT_DIR.get_file(file_name).expect("Deck file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    let deck = from_str(file_as_str).expect("Unable to deserialize deck json");

    Ok(deck)
}
