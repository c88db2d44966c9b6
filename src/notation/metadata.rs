//! Game metadata tags.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::piece::Color;
use crate::error::NotationError;
use crate::rules::wincond::Conclusion;

/// `"<startSeconds>+<incrementSeconds>"`, or `"-"` for untimed games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ClockValue {
    Untimed,
    Timed { start_secs: u64, increment_secs: u64 },
}

impl fmt::Display for ClockValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockValue::Untimed => f.write_str("-"),
            ClockValue::Timed {
                start_secs,
                increment_secs,
            } => write!(f, "{start_secs}+{increment_secs}"),
        }
    }
}

impl FromStr for ClockValue {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(ClockValue::Untimed);
        }
        let bad = || NotationError::Tag(format!("TimeControl {s:?}"));
        let (start, inc) = s.split_once('+').ok_or_else(bad)?;
        Ok(ClockValue::Timed {
            start_secs: start.parse().map_err(|_| bad())?,
            increment_secs: inc.parse().map_err(|_| bad())?,
        })
    }
}

impl From<ClockValue> for String {
    fn from(c: ClockValue) -> String {
        c.to_string()
    }
}

impl TryFrom<String> for ClockValue {
    type Error = NotationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultTag {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
    #[serde(rename = "0-0")]
    Aborted,
}

impl ResultTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultTag::WhiteWins => "1-0",
            ResultTag::BlackWins => "0-1",
            ResultTag::Draw => "1/2-1/2",
            ResultTag::Aborted => "0-0",
        }
    }

    /// Tag for a concluded game. Wins by colors other than white and black have no tag.
    pub fn from_conclusion(c: &Conclusion) -> Option<ResultTag> {
        match c.victor {
            None => Some(ResultTag::Draw),
            Some(Color::White) => Some(ResultTag::WhiteWins),
            Some(Color::Black) => Some(ResultTag::BlackWins),
            Some(_) => None,
        }
    }
}

impl FromStr for ResultTag {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1-0" => Ok(ResultTag::WhiteWins),
            "0-1" => Ok(ResultTag::BlackWins),
            "1/2-1/2" => Ok(ResultTag::Draw),
            "0-0" => Ok(ResultTag::Aborted),
            other => Err(NotationError::Tag(format!("Result {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "Event", default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(rename = "Site", default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(rename = "Round", default, skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
    #[serde(rename = "Variant", default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(rename = "White", default, skip_serializing_if = "Option::is_none")]
    pub white: Option<String>,
    #[serde(rename = "Black", default, skip_serializing_if = "Option::is_none")]
    pub black: Option<String>,
    #[serde(rename = "TimeControl", default, skip_serializing_if = "Option::is_none")]
    pub time_control: Option<ClockValue>,
    #[serde(rename = "UTCDate", default, skip_serializing_if = "Option::is_none")]
    pub utc_date: Option<String>,
    #[serde(rename = "UTCTime", default, skip_serializing_if = "Option::is_none")]
    pub utc_time: Option<String>,
    #[serde(rename = "Result", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultTag>,
    #[serde(rename = "Termination", default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<String>,
    /// Any other tag, passed through unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Metadata {
    /// Tags in emission order: the known tags first, then extras alphabetically.
    pub fn tags(&self) -> Vec<(String, String)> {
        let known = [
            ("Event", self.event.clone()),
            ("Site", self.site.clone()),
            ("Round", self.round.clone()),
            ("Variant", self.variant.clone()),
            ("White", self.white.clone()),
            ("Black", self.black.clone()),
            ("TimeControl", self.time_control.map(|c| c.to_string())),
            ("UTCDate", self.utc_date.clone()),
            ("UTCTime", self.utc_time.clone()),
            ("Result", self.result.map(|r| r.as_str().to_string())),
            ("Termination", self.termination.clone()),
        ];
        known
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
            .chain(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }

    pub fn set_tag(&mut self, name: &str, value: String) -> Result<(), NotationError> {
        match name {
            "Event" => self.event = Some(value),
            "Site" => self.site = Some(value),
            "Round" => self.round = Some(value),
            "Variant" => self.variant = Some(value),
            "White" => self.white = Some(value),
            "Black" => self.black = Some(value),
            "TimeControl" => self.time_control = Some(value.parse()?),
            "UTCDate" => self.utc_date = Some(value),
            "UTCTime" => self.utc_time = Some(value),
            "Result" => self.result = Some(value.parse()?),
            "Termination" => self.termination = Some(value),
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Fills `Result` and `Termination` from a conclusion.
    pub fn record_conclusion(&mut self, c: &Conclusion) {
        self.result = ResultTag::from_conclusion(c);
        self.termination = Some(c.termination.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_values() {
        assert_eq!("-".parse::<ClockValue>().unwrap(), ClockValue::Untimed);
        let c: ClockValue = "600+5".parse().unwrap();
        assert_eq!(
            c,
            ClockValue::Timed {
                start_secs: 600,
                increment_secs: 5
            }
        );
        assert_eq!(c.to_string(), "600+5");
        assert!("10".parse::<ClockValue>().is_err());
    }

    #[test]
    fn unknown_tags_pass_through_json() {
        let m: Metadata =
            serde_json::from_str(r#"{ "Variant": "Classical", "Result": "0-1", "Rated": "yes" }"#)
                .unwrap();
        assert_eq!(m.variant.as_deref(), Some("Classical"));
        assert_eq!(m.result, Some(ResultTag::BlackWins));
        assert_eq!(m.extra.get("Rated").map(String::as_str), Some("yes"));
        let back = serde_json::to_value(&m).unwrap();
        assert_eq!(back["Rated"], "yes");
    }
}
