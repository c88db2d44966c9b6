//! ICN: the compact text form of a [`LongFormat`].
//!
//! Whitespace-separated sections, in order:
//!
//! - `[Tag "Value"]` metadata tags
//! - turn letter (`w`, `b`, `r`, `g`)
//! - optional en passant square `x,y`
//! - optional `ply/limit` move-rule counter
//! - full-move number
//! - optional promotions `(8;Q,R,B,N|1;q,r,b,n)`, one segment per turn-order color
//! - win conditions, `checkmate` when shared or `(checkmate|royalcapture,koth)` per color
//! - optional `{json}` extras: `slideLimit` and a non-default `turnOrder`
//! - optional position `K5,1+|P1,2+|...` (`+` marks a special right)
//! - moves, `|`-separated, optionally one `N. a | b` line per full move

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chess::game_rules::{GameRules, RawGameRules, WinCondition};
use crate::chess::variants;
use crate::core::coord::Coord;
use crate::core::piece::{Color, PieceType};
use crate::error::NotationError;

use super::long_format::{piece_prefix_len, LongFormat, MoveRecord};
use super::metadata::Metadata;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IcnOptions {
    /// Drop piece prefixes, capture marks and check marks from moves.
    pub compact: bool,
    /// One line per tag and per full move.
    pub multiline: bool,
    /// Leave the position out when the `Variant` tag names a built-in variant with the same setup.
    pub omit_variant_position: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Extras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slide_limit: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    turn_order: Option<Vec<Color>>,
}

fn default_turn_order() -> Vec<Color> {
    vec![Color::White, Color::Black]
}

pub fn encode(lf: &LongFormat, opts: &IcnOptions) -> Result<String, NotationError> {
    let rules = &lf.game_rules;
    let colors = rules.colors();
    let tag_sep = if opts.multiline { "\n" } else { " " };

    let mut out = String::new();
    for (name, value) in lf.metadata.tags() {
        out.push_str(&format!("[{name} \"{value}\"]{tag_sep}"));
    }

    let mut header = vec![lf.turn.letter().to_string()];
    if let Some(ep) = lf.enpassant {
        header.push(ep.to_string());
    }
    if let Some(limit) = rules.move_rule {
        header.push(format!("{}/{limit}", lf.move_rule.unwrap_or(0)));
    }
    header.push(lf.full_move.to_string());

    if colors
        .iter()
        .any(|&c| rules.promotes(c) || rules.promotions_allowed.contains_key(&c))
    {
        let segments: Vec<String> = colors
            .iter()
            .map(|&c| promotion_segment(rules, c))
            .collect();
        header.push(format!("({})", segments.join("|")));
    }

    let per_color: Vec<String> = colors
        .iter()
        .map(|&c| {
            rules
                .win_conditions_of(c)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();
    let shared = per_color.windows(2).all(|w| w[0] == w[1]);
    match per_color.first() {
        Some(first) if shared && !first.is_empty() => header.push(first.clone()),
        _ => header.push(format!("({})", per_color.join("|"))),
    }

    let extras = Extras {
        slide_limit: rules.slide_limit.map(Value::from),
        turn_order: (rules.turn_order != default_turn_order()).then(|| rules.turn_order.clone()),
    };
    if extras.slide_limit.is_some() || extras.turn_order.is_some() {
        header.push(serde_json::to_string(&extras)?);
    }
    out.push_str(&header.join(" "));

    if let Some(position) = lf.starting_position.as_ref().filter(|p| {
        !(opts.omit_variant_position && matches_variant(&lf.metadata, p, &lf.special_rights))
    }) {
        if !position.is_empty() {
            out.push(if opts.multiline { '\n' } else { ' ' });
            out.push_str(&encode_position(position, &lf.special_rights));
        }
    }

    if !lf.moves.is_empty() {
        let tokens: Vec<String> = lf
            .moves
            .iter()
            .map(|m| if opts.compact { m.compact() } else { *m }.to_string())
            .collect();
        if opts.multiline {
            out.push('\n');
            out.push_str(&numbered_lines(lf, &tokens));
        } else {
            out.push(' ');
            out.push_str(&tokens.join("|"));
        }
    }
    Ok(out)
}

/// `ranks;kinds`, either side possibly empty; empty when the color has neither.
fn promotion_segment(rules: &GameRules, color: Color) -> String {
    let ranks: Vec<String> = rules
        .promotion_ranks_of(color)
        .iter()
        .map(ToString::to_string)
        .collect();
    let kinds: Vec<String> = rules
        .promotions_allowed
        .get(&color)
        .into_iter()
        .flatten()
        .map(|&k| PieceType::new(k, color).to_string())
        .collect();
    if ranks.is_empty() && kinds.is_empty() {
        return String::new();
    }
    format!("{};{}", ranks.join(","), kinds.join(","))
}

fn matches_variant(
    metadata: &Metadata,
    position: &BTreeMap<Coord, PieceType>,
    rights: &BTreeSet<Coord>,
) -> bool {
    metadata
        .variant
        .as_deref()
        .and_then(variants::lookup)
        .is_some_and(|v| &v.position == position && &v.special_rights == rights)
}

pub fn encode_position(position: &BTreeMap<Coord, PieceType>, rights: &BTreeSet<Coord>) -> String {
    position
        .iter()
        .map(|(c, ty)| {
            let mark = if rights.contains(c) { "+" } else { "" };
            format!("{ty}{c}{mark}")
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// `N. a | b` lines, numbered from the starting full move and turn.
fn numbered_lines(lf: &LongFormat, tokens: &[String]) -> String {
    let rules = &lf.game_rules;
    let n = rules.turn_order.len().max(1);
    let offset = rules.turn_index(lf.turn).unwrap_or(0);

    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut number = lf.full_move;
    for (i, tok) in tokens.iter().enumerate() {
        current.push(tok);
        if (offset + i + 1) % n == 0 {
            lines.push(format!("{number}. {}", current.join(" | ")));
            current.clear();
            number += 1;
        }
    }
    if !current.is_empty() {
        lines.push(format!("{number}. {}", current.join(" | ")));
    }
    lines.join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Tag(&'a str, &'a str),
    Json(&'a str),
    Word(&'a str),
}

impl Token<'_> {
    fn text(&self) -> String {
        match self {
            Token::Tag(n, v) => format!("[{n} \"{v}\"]"),
            Token::Json(s) | Token::Word(s) => s.to_string(),
        }
    }
}

fn unexpected(token: &Token<'_>, expected: &'static str) -> NotationError {
    NotationError::UnexpectedToken {
        token: token.text(),
        expected,
    }
}

fn tokenize(s: &str) -> Result<Vec<Token<'_>>, NotationError> {
    let mut out = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix('[') {
            let end = body
                .find("\"]")
                .ok_or_else(|| NotationError::Tag(body.chars().take(40).collect()))?;
            let (name, value) = body[..end]
                .split_once('"')
                .ok_or_else(|| NotationError::Tag(body[..end].to_string()))?;
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(NotationError::Tag(body[..end].to_string()));
            }
            out.push(Token::Tag(name, value));
            rest = &body[end + 2..];
        } else if rest.starts_with('{') {
            let mut depth = 0usize;
            let mut end = None;
            for (i, ch) in rest.char_indices() {
                match ch {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            end = Some(i);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            let end = end.ok_or_else(|| NotationError::UnexpectedToken {
                token: rest.chars().take(40).collect(),
                expected: "a closing '}'",
            })?;
            out.push(Token::Json(&rest[..=end]));
            rest = &rest[end + 1..];
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            out.push(Token::Word(&rest[..end]));
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }
    Ok(out)
}

fn parse_position_entry(entry: &str) -> Result<(Coord, PieceType, bool), NotationError> {
    let (body, right) = match entry.strip_suffix('+') {
        Some(b) => (b, true),
        None => (entry, false),
    };
    let prefix = piece_prefix_len(body);
    if prefix == 0 {
        return Err(NotationError::UnexpectedToken {
            token: entry.to_string(),
            expected: "a position entry like K5,1+",
        });
    }
    let ty: PieceType = body[..prefix].parse()?;
    let c: Coord = body[prefix..].parse()?;
    Ok((c, ty, right))
}

pub fn decode_position(
    s: &str,
) -> Result<(BTreeMap<Coord, PieceType>, BTreeSet<Coord>), NotationError> {
    let mut position = BTreeMap::new();
    let mut rights = BTreeSet::new();
    for entry in s.split('|').filter(|e| !e.is_empty()) {
        let (c, ty, right) = parse_position_entry(entry)?;
        position.insert(c, ty);
        if right {
            rights.insert(c);
        }
    }
    Ok((position, rights))
}

fn looks_like_position(word: &str) -> bool {
    word.split('|')
        .next()
        .is_some_and(|e| parse_position_entry(e).is_ok())
}

/// An empty group is a color with no win conditions.
fn parse_win_conditions(s: &str) -> Option<Vec<String>> {
    if s.is_empty() {
        return Some(Vec::new());
    }
    let names: Vec<String> = s.split(',').map(str::to_string).collect();
    names
        .iter()
        .all(|n| n.parse::<WinCondition>().is_ok())
        .then_some(names)
}

enum WinSpec {
    Shared(Vec<String>),
    PerColor(Vec<Vec<String>>),
}

pub fn decode(s: &str) -> Result<LongFormat, NotationError> {
    let tokens = tokenize(s)?;
    let mut i = 0;

    let mut metadata = Metadata::default();
    while let Some(Token::Tag(name, value)) = tokens.get(i) {
        metadata.set_tag(name, value.to_string())?;
        i += 1;
    }

    let turn = match tokens.get(i) {
        Some(Token::Word(w)) => {
            let mut chars = w.chars();
            match (chars.next().and_then(Color::from_letter), chars.next()) {
                (Some(c), None) if c != Color::Neutral => c,
                _ => return Err(unexpected(&tokens[i], "a turn letter (w, b, r, g)")),
            }
        }
        Some(t) => return Err(unexpected(t, "a turn letter (w, b, r, g)")),
        None => {
            return Err(NotationError::UnexpectedToken {
                token: String::new(),
                expected: "a turn letter (w, b, r, g)",
            })
        }
    };
    i += 1;

    let mut enpassant = None;
    if let Some(Token::Word(w)) = tokens.get(i) {
        if let Ok(c) = w.parse::<Coord>() {
            enpassant = Some(c);
            i += 1;
        }
    }

    let mut move_rule = None;
    let mut move_rule_limit = None;
    if let Some(Token::Word(w)) = tokens.get(i) {
        if let Some((ply, limit)) = w.split_once('/') {
            let bad = || unexpected(&tokens[i], "a move-rule counter like 0/100");
            move_rule = Some(ply.parse::<u32>().map_err(|_| bad())?);
            move_rule_limit = Some(limit.parse::<u32>().map_err(|_| bad())?);
            i += 1;
        }
    }

    let full_move = match tokens.get(i) {
        Some(Token::Word(w)) => w
            .parse::<u32>()
            .map_err(|_| unexpected(&tokens[i], "the full-move number"))?,
        Some(t) => return Err(unexpected(t, "the full-move number")),
        None => {
            return Err(NotationError::UnexpectedToken {
                token: String::new(),
                expected: "the full-move number",
            })
        }
    };
    i += 1;

    let mut promotions: Option<Vec<&str>> = None;
    if let Some(Token::Word(w)) = tokens.get(i) {
        if w.starts_with('(') && w.contains(';') {
            let inner = w
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .ok_or_else(|| unexpected(&tokens[i], "promotions like (8;Q,R|1;q,r)"))?;
            promotions = Some(inner.split('|').collect());
            i += 1;
        }
    }

    let mut wins = None;
    if let Some(Token::Word(w)) = tokens.get(i) {
        if let Some(inner) = w.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            let per_color = inner
                .split('|')
                .map(parse_win_conditions)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| unexpected(&tokens[i], "per-color win conditions"))?;
            wins = Some(WinSpec::PerColor(per_color));
            i += 1;
        } else if let Some(names) = parse_win_conditions(w).filter(|n| !n.is_empty()) {
            wins = Some(WinSpec::Shared(names));
            i += 1;
        }
    }

    let mut extras = Extras::default();
    if let Some(Token::Json(j)) = tokens.get(i) {
        extras = serde_json::from_str(j)?;
        i += 1;
    }

    let mut starting_position = None;
    let mut special_rights = BTreeSet::new();
    if let Some(Token::Word(w)) = tokens.get(i) {
        if looks_like_position(w) {
            let (p, r) = decode_position(w)?;
            starting_position = Some(p);
            special_rights = r;
            i += 1;
        }
    }

    let mut moves = Vec::new();
    for t in &tokens[i..] {
        let Token::Word(w) = t else {
            return Err(unexpected(t, "a move"));
        };
        for part in w.split('|').filter(|p| !p.is_empty()) {
            if is_move_number(part) {
                continue;
            }
            moves.push(part.parse::<MoveRecord>()?);
        }
    }

    let turn_order = extras.turn_order.unwrap_or_else(default_turn_order);
    let mut colors: Vec<Color> = Vec::new();
    for &c in &turn_order {
        if !colors.contains(&c) {
            colors.push(c);
        }
    }

    let mut raw = RawGameRules {
        turn_order,
        win_conditions: BTreeMap::new(),
        promotion_ranks: None,
        promotions_allowed: None,
        slide_limit: extras.slide_limit,
        move_rule: move_rule_limit,
    };
    match wins {
        Some(WinSpec::Shared(names)) => {
            for &c in &colors {
                raw.win_conditions.insert(c, names.clone());
            }
        }
        Some(WinSpec::PerColor(per_color)) => {
            if per_color.len() != colors.len() {
                return Err(NotationError::UnexpectedToken {
                    token: format!("{} win-condition groups", per_color.len()),
                    expected: "one win-condition group per turn-order color",
                });
            }
            raw.win_conditions = colors.iter().copied().zip(per_color).collect();
        }
        None => {}
    }
    if let Some(segments) = promotions {
        let (ranks, allowed) = decode_promotions(&segments, &colors)?;
        raw.promotion_ranks = Some(ranks);
        raw.promotions_allowed = Some(allowed);
    }

    Ok(LongFormat {
        metadata,
        turn,
        enpassant,
        move_rule,
        full_move,
        starting_position,
        special_rights,
        moves,
        game_rules: GameRules::try_from(raw)?,
    })
}

fn is_move_number(s: &str) -> bool {
    s.strip_suffix('.')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

type Promotions = (BTreeMap<Color, Vec<i64>>, BTreeMap<Color, Vec<String>>);

fn decode_promotions(segments: &[&str], colors: &[Color]) -> Result<Promotions, NotationError> {
    if segments.len() != colors.len() {
        return Err(NotationError::UnexpectedToken {
            token: segments.join("|"),
            expected: "one promotion segment per turn-order color",
        });
    }
    let mut ranks = BTreeMap::new();
    let mut allowed = BTreeMap::new();
    for (&color, seg) in colors.iter().zip(segments) {
        if seg.is_empty() {
            continue;
        }
        let bad = || NotationError::UnexpectedToken {
            token: seg.to_string(),
            expected: "a promotion segment like 8;Q,R,B,N",
        };
        let (rank_list, kind_list) = seg.split_once(';').ok_or_else(bad)?;
        let rs = rank_list
            .split(',')
            .filter(|r| !r.is_empty())
            .map(|r| r.parse::<i64>().map_err(|_| bad()))
            .collect::<Result<Vec<_>, _>>()?;
        let kinds = kind_list
            .split(',')
            .filter(|k| !k.is_empty())
            .map(|k| k.parse::<PieceType>().map(|t| t.kind.name().to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        if !rs.is_empty() {
            ranks.insert(color, rs);
        }
        if !kinds.is_empty() {
            allowed.insert(color, kinds);
        }
    }
    Ok((ranks, allowed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_keeps_tag_values_and_json_whole() {
        let toks = tokenize(r#"[Event "Casual game"] w {"slideLimit": 4} 1,2>1,3"#).unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Tag("Event", "Casual game"),
                Token::Word("w"),
                Token::Json(r#"{"slideLimit": 4}"#),
                Token::Word("1,2>1,3"),
            ]
        );
    }

    #[test]
    fn move_numbers_are_recognised() {
        assert!(is_move_number("12."));
        assert!(!is_move_number("."));
        assert!(!is_move_number("1,2>1,3"));
    }
}
