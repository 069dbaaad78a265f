use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One row of the question file, keyed by the header text found in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub data: BTreeMap<String, String>,
}

impl Record {
    pub fn new(data: BTreeMap<String, String>) -> Self {
        Self { data }
    }

    /// Looks the field up under any of its accepted header names.
    pub fn get(&self, field: InputField) -> Option<&str> {
        field
            .headers()
            .iter()
            .find_map(|header| self.data.get(*header))
            .map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Columns of the question file. Both the English names and the headers of
/// Swedish spreadsheet exports are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    Category,
    Prompt,
    LowerBound2,
    LowerBound3,
    LowerBound4,
    LowerBound6,
    CorrectAnswer,
    UpperBound6,
    UpperBound4,
    UpperBound3,
    UpperBound2,
    Comment,
    Source,
}

impl InputField {
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            InputField::Category => &["Category", "Kategori"],
            InputField::Prompt => &["Prompt", "Fråga"],
            InputField::LowerBound2 => &["LowerBound2", "Lägre gräns 2p"],
            InputField::LowerBound3 => &["LowerBound3", "Lägre gräns 3p"],
            InputField::LowerBound4 => &["LowerBound4", "Lägre gräns 4p"],
            InputField::LowerBound6 => &["LowerBound6", "Lägre gräns 6p"],
            InputField::CorrectAnswer => &["CorrectAnswer", "Rätt svar"],
            InputField::UpperBound6 => &["UpperBound6", "Övre gräns 6p"],
            InputField::UpperBound4 => &["UpperBound4", "Övre gräns 4p"],
            InputField::UpperBound3 => &["UpperBound3", "Övre gräns 3p"],
            InputField::UpperBound2 => &["UpperBound2", "Övre gräns 2p"],
            InputField::Comment => &["Comment", "Kommentar"],
            InputField::Source => &["Source", "Källa"],
        }
    }
}

/// A parsed score boundary. Whether a boundary is whole decides if the
/// non-overlap adjustment applies to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericBoundary {
    Integer(i128),
    Fractional(f64),
}

impl NumericBoundary {
    /// Accepts `.` or `,` as decimal separator. Empty, unparseable and
    /// non-finite input is treated as absent.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().replace(',', ".");
        if normalized.is_empty() {
            return None;
        }
        let value: f64 = normalized.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        // Whole values outside the i128 range keep their float form.
        if value == value.trunc() && value.abs() < i128::MAX as f64 {
            Some(NumericBoundary::Integer(value as i128))
        } else {
            Some(NumericBoundary::Fractional(value))
        }
    }

    /// Shifts integer boundaries by `delta`; fractional ones are returned unchanged.
    pub fn adjust(self, delta: i64) -> Self {
        match self {
            NumericBoundary::Integer(n) => {
                NumericBoundary::Integer(n.saturating_add(i128::from(delta)))
            }
            fractional => fractional,
        }
    }
}

/// Shortest round-trip form; exponents below -4 or from 16 up switch to
/// scientific notation with a signed two-digit exponent (`1e-05`, `2.5e+40`).
fn format_fractional(x: f64) -> String {
    let scientific = format!("{:e}", x);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return x.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return x.to_string();
    };
    if (-4..16).contains(&exponent) {
        x.to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

impl fmt::Display for NumericBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericBoundary::Integer(n) => write!(f, "{}", n),
            NumericBoundary::Fractional(x) => f.write_str(&format_fractional(*x)),
        }
    }
}

/// The eight raw boundary positions of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoundaryKey {
    Lower2,
    Lower3,
    Lower4,
    Lower6,
    Upper6,
    Upper4,
    Upper3,
    Upper2,
}

impl BoundaryKey {
    pub const ALL: [BoundaryKey; 8] = [
        BoundaryKey::Lower2,
        BoundaryKey::Lower3,
        BoundaryKey::Lower4,
        BoundaryKey::Lower6,
        BoundaryKey::Upper6,
        BoundaryKey::Upper4,
        BoundaryKey::Upper3,
        BoundaryKey::Upper2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryKey::Lower2 => "2_l",
            BoundaryKey::Lower3 => "3_l",
            BoundaryKey::Lower4 => "4_l",
            BoundaryKey::Lower6 => "6_l",
            BoundaryKey::Upper6 => "6_ö",
            BoundaryKey::Upper4 => "4_ö",
            BoundaryKey::Upper3 => "3_ö",
            BoundaryKey::Upper2 => "2_ö",
        }
    }

    pub fn input_field(self) -> InputField {
        match self {
            BoundaryKey::Lower2 => InputField::LowerBound2,
            BoundaryKey::Lower3 => InputField::LowerBound3,
            BoundaryKey::Lower4 => InputField::LowerBound4,
            BoundaryKey::Lower6 => InputField::LowerBound6,
            BoundaryKey::Upper6 => InputField::UpperBound6,
            BoundaryKey::Upper4 => InputField::UpperBound4,
            BoundaryKey::Upper3 => InputField::UpperBound3,
            BoundaryKey::Upper2 => InputField::UpperBound2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Boundaries([Option<NumericBoundary>; 8]);

impl Boundaries {
    pub fn from_record(record: &Record) -> Self {
        let mut values = [None; 8];
        for key in BoundaryKey::ALL {
            values[key as usize] = record
                .get(key.input_field())
                .and_then(NumericBoundary::parse);
        }
        Self(values)
    }

    pub fn get(&self, key: BoundaryKey) -> Option<NumericBoundary> {
        self.0[key as usize]
    }

    pub fn set(&mut self, key: BoundaryKey, value: Option<NumericBoundary>) {
        self.0[key as usize] = value;
    }
}

/// The seven displayed ranges, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntervalLabel {
    #[serde(rename = "2_l")]
    Lower2,
    #[serde(rename = "3_l")]
    Lower3,
    #[serde(rename = "4_l")]
    Lower4,
    #[serde(rename = "6")]
    Center6,
    #[serde(rename = "4_ö")]
    Upper4,
    #[serde(rename = "3_ö")]
    Upper3,
    #[serde(rename = "2_ö")]
    Upper2,
}

impl IntervalLabel {
    pub const ALL: [IntervalLabel; 7] = [
        IntervalLabel::Lower2,
        IntervalLabel::Lower3,
        IntervalLabel::Lower4,
        IntervalLabel::Center6,
        IntervalLabel::Upper4,
        IntervalLabel::Upper3,
        IntervalLabel::Upper2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IntervalLabel::Lower2 => "2_l",
            IntervalLabel::Lower3 => "3_l",
            IntervalLabel::Lower4 => "4_l",
            IntervalLabel::Center6 => "6",
            IntervalLabel::Upper4 => "4_ö",
            IntervalLabel::Upper3 => "3_ö",
            IntervalLabel::Upper2 => "2_ö",
        }
    }
}

impl fmt::Display for IntervalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display strings for all seven labels. Always complete: a label whose
/// endpoints are missing holds a sentinel string instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intervals([String; 7]);

impl Intervals {
    pub fn new(entries: [String; 7]) -> Self {
        Self(entries)
    }

    pub fn get(&self, label: IntervalLabel) -> &str {
        &self.0[label as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (IntervalLabel, &str)> + '_ {
        IntervalLabel::ALL
            .into_iter()
            .map(move |label| (label, self.get(label)))
    }
}

impl Serialize for Intervals {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(label, text)| (label.as_str(), text)))
    }
}

/// A question built once from its input row and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub category: String,
    pub prompt: String,
    pub correct_answer: String,
    pub comment: String,
    pub source: String,
    pub raw: Record,
    pub boundaries: Boundaries,
    pub intervals: Intervals,
}

/// Axis-aligned rectangle in template pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Inclusive RGB bounds selecting one placeholder colour on the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorRange {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, rgb: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= rgb[c] && rgb[c] <= self.upper[c])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSpec {
    pub label: String,
    pub range: ColorRange,
}

/// How rectangles sharing a label are ordered; index 0 receives the lower
/// interval of a tier and index 1 the upper one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxOrder {
    #[default]
    LeftToRight,
    TopToBottom,
    BottomToTop,
}

/// Detected placeholder rectangles per region label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionMap {
    regions: BTreeMap<String, Vec<Rect>>,
}

impl RegionMap {
    pub fn insert(&mut self, label: impl Into<String>, rects: Vec<Rect>) {
        self.regions.insert(label.into(), rects);
    }

    pub fn rects(&self, label: &str) -> &[Rect] {
        self.regions.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, label: &str, index: usize) -> Option<Rect> {
        self.rects(label).get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rect])> + '_ {
        self.regions
            .iter()
            .map(|(label, rects)| (label.as_str(), rects.as_slice()))
    }
}

/// One positioned line of text; `y` is the top of the line box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    pub font_size: u32,
    pub line_height: i32,
    pub lines: Vec<LayoutLine>,
}

/// A text slot on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    Category,
    Prompt,
    Interval(IntervalLabel),
}

impl CardField {
    pub const DRAW_ORDER: [CardField; 9] = [
        CardField::Category,
        CardField::Prompt,
        CardField::Interval(IntervalLabel::Center6),
        CardField::Interval(IntervalLabel::Lower2),
        CardField::Interval(IntervalLabel::Upper2),
        CardField::Interval(IntervalLabel::Lower3),
        CardField::Interval(IntervalLabel::Upper3),
        CardField::Interval(IntervalLabel::Lower4),
        CardField::Interval(IntervalLabel::Upper4),
    ];

    /// Region label and rectangle index the field is drawn into.
    pub fn slot(self) -> (&'static str, usize) {
        match self {
            CardField::Category => ("category", 0),
            CardField::Prompt => ("question", 0),
            CardField::Interval(label) => match label {
                IntervalLabel::Center6 => ("6", 0),
                IntervalLabel::Lower2 => ("2", 0),
                IntervalLabel::Upper2 => ("2", 1),
                IntervalLabel::Lower3 => ("3", 0),
                IntervalLabel::Upper3 => ("3", 1),
                IntervalLabel::Lower4 => ("4", 0),
                IntervalLabel::Upper4 => ("4", 1),
            },
        }
    }

    pub fn text(self, question: &Question) -> &str {
        match self {
            CardField::Category => &question.category,
            CardField::Prompt => &question.prompt,
            CardField::Interval(label) => question.intervals.get(label),
        }
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardField::Category => f.write_str("category"),
            CardField::Prompt => f.write_str("prompt"),
            CardField::Interval(label) => write!(f, "interval {}", label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    MissingRegion { label: String, index: usize },
    PaddingExceedsBox,
    NoFit,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingRegion { label, index } => {
                write!(f, "no rectangle #{} for region '{}'", index, label)
            }
            SkipReason::PaddingExceedsBox => f.write_str("padding exceeds box"),
            SkipReason::NoFit => f.write_str("text does not fit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedField {
    pub field: CardField,
    pub reason: SkipReason,
}

/// A rendered, encoded card waiting to be persisted.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub index: usize,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub question: Question,
    pub skipped: Vec<SkippedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardOutcome {
    pub index: usize,
    pub path: String,
    pub category: String,
    pub prompt: String,
    pub correct_answer: String,
    pub intervals: Intervals,
    pub skipped: Vec<SkippedField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub cards: Vec<CardOutcome>,
}

impl RunSummary {
    pub fn skipped_field_count(&self) -> usize {
        self.cards.iter().map(|card| card.skipped.len()).sum()
    }
}
