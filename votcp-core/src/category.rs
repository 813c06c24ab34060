//! Stop-category filter and padding resolution.
//!
//! Requested phone symbols are vetted against the IPA stop inventory by their
//! first character. Padding values arrive in milliseconds and are clamped to
//! [`MAX_PADDING_MS`] either way.

use std::collections::BTreeSet;

/// Largest accepted padding magnitude in milliseconds.
pub const MAX_PADDING_MS: i32 = 25;

/// Stop sounds recognized by the IPA, including ejectives and implosives.
pub const IPA_STOPS: &[&str] = &[
    "p", "b", "t", "d", "ʈ", "ɖ", "c", "ɟ", "k", "g", "q", "ɢ", "ʔ", "p'", "t'", "k'", "ɓ", "ɗ",
    "ʄ", "ɠ", "ʛ",
];

/// Voiceless stops, including ejectives and geminates.
pub const VOICELESS_STOPS: &[&str] = &[
    "p", "t", "ʈ", "c", "k", "q", "ʔ", "p'", "t'", "k'", "pp", "tt", "ʈʈ", "cc", "kk", "qq", "ʔʔ",
];

/// Voiced stops; the predictor model is not trained on these.
pub const VOICED_STOPS: &[&str] = &["b", "d", "ɖ", "ɟ", "g", "ɢ", "ɓ", "ɗ", "ʄ", "ɠ", "ʛ"];

/// Lower-cased first character of a symbol.
fn first_char_lower(symbol: &str) -> Option<String> {
    symbol.chars().next().map(|c| c.to_lowercase().collect())
}

fn first_char_in(symbol: &str, inventory: &[&str]) -> bool {
    first_char_lower(symbol).is_some_and(|first| inventory.contains(&first.as_str()))
}

/// Whether a symbol starts with an IPA stop.
pub fn is_stop_symbol(symbol: &str) -> bool {
    first_char_in(symbol, IPA_STOPS)
}

/// Whether a label starts with a voiced stop.
pub fn is_voiced_stop(label: &str) -> bool {
    first_char_in(label, VOICED_STOPS)
}

/// Boundary offsets in seconds applied to every selected interval.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Padding {
    /// Offset added to interval starts
    pub start: f64,
    /// Offset added to interval ends
    pub end: f64,
}

impl Padding {
    pub const ZERO: Self = Self {
        start: 0.0,
        end: 0.0,
    };

    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Clamp millisecond paddings to ±25 ms and convert to seconds.
    pub fn from_millis(start_ms: i32, end_ms: i32) -> Self {
        Self {
            start: clamp_padding(start_ms, "A startPadding"),
            end: clamp_padding(end_ms, "An endPadding"),
        }
    }
}

fn clamp_padding(ms: i32, what: &str) -> f64 {
    if ms > MAX_PADDING_MS {
        tracing::warn!(
            "{what} of {ms} ms exceeds the maximum. It was adjusted to {MAX_PADDING_MS} ms."
        );
        f64::from(MAX_PADDING_MS) / 1000.0
    } else if ms < -MAX_PADDING_MS {
        tracing::warn!(
            "{what} of {ms} ms exceeds the minimum. It was adjusted to -{MAX_PADDING_MS} ms."
        );
        -f64::from(MAX_PADDING_MS) / 1000.0
    } else {
        f64::from(ms) / 1000.0
    }
}

/// Accepted phone labels.
#[derive(Clone, Debug, PartialEq)]
pub struct StopFilter {
    labels: BTreeSet<String>,
}

impl StopFilter {
    /// Filter accepting every voiceless stop.
    pub fn voiceless() -> Self {
        Self::from_symbols(VOICELESS_STOPS.iter().copied())
    }

    fn from_symbols<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            labels: symbols.into_iter().map(str::to_string).collect(),
        }
    }

    /// Vet requested symbols, falling back to [`StopFilter::voiceless`].
    ///
    /// Symbols whose first character is not an IPA stop are dropped with a
    /// message naming `file`. An empty request, or one where every symbol is
    /// dropped, yields the voiceless inventory.
    pub fn resolve(requested: &[String], file: &str) -> Self {
        if requested.is_empty() {
            tracing::debug!("no stops requested, analyzing all voiceless stops");
            return Self::voiceless();
        }

        let (vetted, rejected): (Vec<&String>, Vec<&String>) =
            requested.iter().partition(|symbol| is_stop_symbol(symbol));

        match rejected.as_slice() {
            [] => {}
            [single] => tracing::info!(
                "'{single}' is not (or does not start with) a stop sound. This symbol will be ignored in file {file}."
            ),
            many => tracing::info!(
                "'{}' are not (or do not start with) stop sounds. These symbols will be ignored in file {file}.",
                many.iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join("', '")
            ),
        }

        if !vetted.is_empty() {
            return Self::from_symbols(vetted.into_iter().map(String::as_str));
        }

        match requested.len() {
            1 => tracing::warn!("The sound you entered is not classified as a stop sound by the IPA."),
            2 => tracing::warn!(
                "Neither of the sounds you entered is classified as a stop sound by the IPA."
            ),
            _ => tracing::warn!(
                "None of the sounds you entered is classified as a stop sound by the IPA."
            ),
        }
        tracing::info!(
            "The program will continue by analyzing all voiceless stops recognized by the IPA."
        );

        Self::voiceless()
    }

    /// Whether a phone label is selected, verbatim or lower-cased.
    pub fn accepts(&self, label: &str) -> bool {
        self.labels.contains(label) || self.labels.contains(&label.to_lowercase())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
