//! services/adm/src/web/render.rs
//!
//! HTML rendering of a `RecordingSet`. Templates are compiled once at startup;
//! `.html` templates auto-escape, so transcripts and languages are safe to embed.

use audio_debug_core::domain::{Recording, RecordingSet};
use chrono::TimeDelta;
use minijinja::{context, Environment};
use serde::Serialize;

const BASE_TEMPLATE: &str = include_str!("../../templates/base.html");
const RECORDINGS_TEMPLATE: &str = include_str!("../../templates/recordings.html");

/// One table row on the recordings page.
#[derive(Debug, Serialize)]
struct RecordingView {
    date: String,
    relative_time: String,
    url: String,
    language: String,
    transcript: String,
}

impl From<&Recording> for RecordingView {
    fn from(recording: &Recording) -> Self {
        Self {
            date: recording.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            relative_time: format_age(recording.age),
            url: recording.url.clone(),
            language: recording.language.clone(),
            transcript: recording.transcript.clone(),
        }
    }
}

pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", BASE_TEMPLATE)?;
        env.add_template("recordings.html", RECORDINGS_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn recordings_page(&self, set: &RecordingSet) -> Result<String, minijinja::Error> {
        let recordings: Vec<RecordingView> =
            set.recordings.iter().map(RecordingView::from).collect();
        self.env
            .get_template("recordings.html")?
            .render(context! { uid => set.uid, recordings => recordings })
    }
}

/// Formats an age like `1h2m3s`, dropping leading zero units.
pub fn format_age(age: TimeDelta) -> String {
    let total = age.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}{}h{}m{}s", sign, hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}{}m{}s", sign, minutes, seconds)
    } else {
        format!("{}{}s", sign, seconds)
    }
}
