//! Variant rules: turn order, win conditions, promotion, slide limit and move rule.
//!
//! The JSON shape goes through [`RawGameRules`] so every rules object in the crate has been
//! validated: unknown win conditions and malformed slide limits are rejected with the offending
//! field named.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::piece::{Color, PieceKind, PieceType};
use crate::error::RulesError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WinCondition {
    Checkmate,
    RoyalCapture,
    AllRoyalsCaptured,
    AllPiecesCaptured,
    /// Win by delivering this many checks.
    NCheck(u32),
    KingOfTheHill,
}

impl fmt::Display for WinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinCondition::Checkmate => f.write_str("checkmate"),
            WinCondition::RoyalCapture => f.write_str("royalcapture"),
            WinCondition::AllRoyalsCaptured => f.write_str("allroyalscaptured"),
            WinCondition::AllPiecesCaptured => f.write_str("allpiecescaptured"),
            WinCondition::NCheck(3) => f.write_str("threecheck"),
            WinCondition::NCheck(n) => write!(f, "{n}check"),
            WinCondition::KingOfTheHill => f.write_str("koth"),
        }
    }
}

impl FromStr for WinCondition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "checkmate" => WinCondition::Checkmate,
            "royalcapture" => WinCondition::RoyalCapture,
            "allroyalscaptured" => WinCondition::AllRoyalsCaptured,
            "allpiecescaptured" => WinCondition::AllPiecesCaptured,
            "threecheck" => WinCondition::NCheck(3),
            "koth" => WinCondition::KingOfTheHill,
            other => {
                let n: u32 = other
                    .strip_suffix("check")
                    .and_then(|n| n.parse().ok())
                    .ok_or(())?;
                if n == 0 {
                    return Err(());
                }
                WinCondition::NCheck(n)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RawGameRules", try_from = "RawGameRules")]
pub struct GameRules {
    pub turn_order: Vec<Color>,
    pub win_conditions: BTreeMap<Color, Vec<WinCondition>>,
    /// Promotion ranks on each color's forward axis. Colors without ranks never promote.
    pub promotion_ranks: BTreeMap<Color, Vec<i64>>,
    pub promotions_allowed: BTreeMap<Color, Vec<PieceKind>>,
    /// Longest slide in steps; `None` is unbounded.
    pub slide_limit: Option<u64>,
    /// Plies without capture or pawn move that draw the game.
    pub move_rule: Option<u32>,
}

impl GameRules {
    /// Standard two-player rules: checkmate, promotion on the 8th/1st rank, 100-ply move rule.
    pub fn classical() -> Self {
        let allowed = vec![
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Knight,
        ];
        Self {
            turn_order: vec![Color::White, Color::Black],
            win_conditions: BTreeMap::from([
                (Color::White, vec![WinCondition::Checkmate]),
                (Color::Black, vec![WinCondition::Checkmate]),
            ]),
            promotion_ranks: BTreeMap::from([(Color::White, vec![8]), (Color::Black, vec![1])]),
            promotions_allowed: BTreeMap::from([
                (Color::White, allowed.clone()),
                (Color::Black, allowed),
            ]),
            slide_limit: None,
            move_rule: Some(100),
        }
    }

    /// Replaces every color's win conditions with `conditions`.
    pub fn with_win_conditions(mut self, conditions: &[WinCondition]) -> Self {
        for c in self.colors() {
            self.win_conditions.insert(c, conditions.to_vec());
        }
        self
    }

    /// Distinct colors of the turn order, first appearance first.
    pub fn colors(&self) -> Vec<Color> {
        let mut out = Vec::new();
        for &c in &self.turn_order {
            if !out.contains(&c) {
                out.push(c);
            }
        }
        out
    }

    pub fn opponents(&self, color: Color) -> impl Iterator<Item = Color> + '_ {
        self.colors().into_iter().filter(move |&c| c != color)
    }

    pub fn win_conditions_of(&self, color: Color) -> &[WinCondition] {
        self.win_conditions.get(&color).map_or(&[], Vec::as_slice)
    }

    pub fn promotion_ranks_of(&self, color: Color) -> &[i64] {
        self.promotion_ranks.get(&color).map_or(&[], Vec::as_slice)
    }

    pub fn promotes(&self, color: Color) -> bool {
        !self.promotion_ranks_of(color).is_empty()
    }

    pub fn may_promote_to(&self, color: Color, ty: PieceType) -> bool {
        ty.color == color
            && self
                .promotions_allowed
                .get(&color)
                .is_some_and(|kinds| kinds.contains(&ty.kind))
    }

    /// Every kind a pawn can turn into, across colors.
    pub fn promotion_kinds(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.promotions_allowed.values().flatten().copied()
    }

    /// Index into the turn order of `color`'s first turn.
    pub fn turn_index(&self, color: Color) -> Option<usize> {
        self.turn_order.iter().position(|&c| c == color)
    }

    /// Color to move `plies` half-moves after a ply where `start` was to move.
    pub fn turn_after(&self, start: Color, plies: usize) -> Color {
        let i = self.turn_index(start).unwrap_or(0);
        self.turn_order[(i + plies) % self.turn_order.len()]
    }

    /// Color that moved just before `color` in the turn order.
    pub fn previous_turn(&self, color: Color) -> Color {
        let n = self.turn_order.len();
        let i = self.turn_index(color).unwrap_or(0);
        self.turn_order[(i + n - 1) % n]
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.turn_order.is_empty() {
            return Err(RulesError::EmptyTurnOrder);
        }
        if self.turn_order.contains(&Color::Neutral) {
            return Err(RulesError::NeutralInTurnOrder);
        }
        if self.slide_limit == Some(0) {
            return Err(RulesError::InvalidSlideLimit {
                value: "0".to_string(),
            });
        }
        if self.move_rule == Some(0) {
            return Err(RulesError::InvalidMoveRule("0".to_string()));
        }
        Ok(())
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::classical()
    }
}

fn default_turn_order() -> Vec<Color> {
    vec![Color::White, Color::Black]
}

/// Wire shape of [`GameRules`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGameRules {
    #[serde(default = "default_turn_order")]
    pub turn_order: Vec<Color>,
    #[serde(default)]
    pub win_conditions: BTreeMap<Color, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_ranks: Option<BTreeMap<Color, Vec<i64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotions_allowed: Option<BTreeMap<Color, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_limit: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_rule: Option<u32>,
}

fn parse_slide_limit(v: &Value) -> Result<Option<u64>, RulesError> {
    match v {
        Value::Null => Ok(None),
        Value::String(s) if s == "Infinity" => Ok(None),
        Value::Number(n) => match n.as_u64() {
            Some(l) if l > 0 => Ok(Some(l)),
            _ => Err(RulesError::InvalidSlideLimit {
                value: n.to_string(),
            }),
        },
        other => Err(RulesError::InvalidSlideLimit {
            value: other.to_string(),
        }),
    }
}

impl TryFrom<RawGameRules> for GameRules {
    type Error = RulesError;

    fn try_from(raw: RawGameRules) -> Result<Self, Self::Error> {
        let mut win_conditions = BTreeMap::new();
        for (color, names) in raw.win_conditions {
            let mut parsed = Vec::with_capacity(names.len());
            for name in names {
                let wc = name
                    .parse::<WinCondition>()
                    .map_err(|()| RulesError::UnsupportedWinCondition {
                        color,
                        condition: name.clone(),
                    })?;
                if !parsed.contains(&wc) {
                    parsed.push(wc);
                }
            }
            win_conditions.insert(color, parsed);
        }

        let mut rules = GameRules {
            turn_order: raw.turn_order,
            win_conditions,
            promotion_ranks: raw
                .promotion_ranks
                .unwrap_or_default()
                .into_iter()
                .filter(|(_, ranks)| !ranks.is_empty())
                .collect(),
            promotions_allowed: BTreeMap::new(),
            slide_limit: raw.slide_limit.as_ref().map(parse_slide_limit).transpose()?.flatten(),
            move_rule: raw.move_rule,
        };

        for (color, names) in raw.promotions_allowed.unwrap_or_default() {
            let kinds = names
                .iter()
                .map(|n| PieceKind::from_name(n).ok_or_else(|| RulesError::UnknownPieceKind(n.clone())))
                .collect::<Result<Vec<_>, _>>()?;
            if !kinds.is_empty() {
                rules.promotions_allowed.insert(color, kinds);
            }
        }

        for c in rules.colors() {
            rules
                .win_conditions
                .entry(c)
                .or_insert_with(|| vec![WinCondition::Checkmate]);
        }
        rules.validate()?;
        Ok(rules)
    }
}

impl From<GameRules> for RawGameRules {
    fn from(rules: GameRules) -> Self {
        RawGameRules {
            turn_order: rules.turn_order,
            win_conditions: rules
                .win_conditions
                .into_iter()
                .map(|(c, wcs)| (c, wcs.iter().map(ToString::to_string).collect()))
                .collect(),
            promotion_ranks: (!rules.promotion_ranks.is_empty()).then_some(rules.promotion_ranks),
            promotions_allowed: (!rules.promotions_allowed.is_empty()).then(|| {
                rules
                    .promotions_allowed
                    .into_iter()
                    .map(|(c, kinds)| (c, kinds.iter().map(|k| k.name().to_string()).collect()))
                    .collect()
            }),
            slide_limit: rules.slide_limit.map(Value::from),
            move_rule: rules.move_rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_condition_names_round_trip() {
        for wc in [
            WinCondition::Checkmate,
            WinCondition::RoyalCapture,
            WinCondition::AllRoyalsCaptured,
            WinCondition::AllPiecesCaptured,
            WinCondition::NCheck(3),
            WinCondition::NCheck(5),
            WinCondition::KingOfTheHill,
        ] {
            assert_eq!(wc.to_string().parse::<WinCondition>(), Ok(wc));
        }
        assert!("0check".parse::<WinCondition>().is_err());
        assert!("stalemate".parse::<WinCondition>().is_err());
    }

    #[test]
    fn bad_slide_limit_names_the_field() {
        let err = serde_json::from_str::<GameRules>(r#"{ "slideLimit": "far" }"#).unwrap_err();
        assert!(err.to_string().contains("slideLimit"));
        let ok: GameRules = serde_json::from_str(r#"{ "slideLimit": "Infinity" }"#).unwrap();
        assert_eq!(ok.slide_limit, None);
    }

    #[test]
    fn unknown_win_condition_is_rejected_per_color() {
        let err = serde_json::from_str::<GameRules>(
            r#"{ "winConditions": { "white": ["checkmate"], "black": ["tea"] } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("tea"));
        assert!(err.to_string().contains("black"));
    }
}
