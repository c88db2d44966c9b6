//! Upgrade of legacy gamefile JSON to the current [`LongFormat`] schema.
//!
//! Legacy documents are recognised by any of:
//!
//! - a top-level `variant` key
//! - `promotionRanks` as a `[blackRank, whiteRank]` array
//! - moves as (nested) arrays of `{ type, startCoords, endCoords }` objects
//! - win conditions as `{ condition: "both" | "white" | "black" }`
//! - plural piece names with a color suffix (`pawnsW`)
//! - a combined local `Date` metadata field
//!
//! [`upgrade_in`] rewrites the document in place and then deserializes it like any other game.

use chrono::{LocalResult, NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

use crate::chess::variants;
use crate::core::coord::Coord;
use crate::core::piece::{Color, PieceKind, PieceType};
use crate::error::NotationError;

use super::long_format::{LongFormat, MoveRecord};

const LEGACY_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// `pawnsW` style names: plural kind name plus a one-letter color suffix.
pub fn parse_legacy_type(s: &str) -> Option<PieceType> {
    let suffix = s.chars().last()?;
    let color = match suffix {
        'W' => Color::White,
        'B' => Color::Black,
        'R' => Color::Red,
        'G' => Color::Green,
        'N' => Color::Neutral,
        _ => return None,
    };
    let kind = plural_kind(&s[..s.len() - 1])?;
    Some(PieceType::new(kind, color))
}

fn plural_kind(s: &str) -> Option<PieceKind> {
    s.strip_suffix('s').and_then(PieceKind::from_name)
}

fn is_legacy_type(v: &Value) -> bool {
    v.as_str().is_some_and(|s| parse_legacy_type(s).is_some())
}

/// Whether `doc` uses any legacy field shape.
pub fn is_legacy(doc: &Value) -> bool {
    let Some(obj) = doc.as_object() else {
        return false;
    };
    let rules = obj.get("gameRules");

    let top_variant = obj.contains_key("variant");
    let array_ranks = obj.get("promotionRanks").is_some_and(Value::is_array)
        || rules
            .and_then(|r| r.get("promotionRanks"))
            .is_some_and(Value::is_array);
    let structured_moves = obj
        .get("moves")
        .and_then(Value::as_array)
        .is_some_and(|ms| ms.iter().any(|m| m.is_array() || m.is_object()));
    let enum_wins = rules
        .and_then(|r| r.get("winConditions"))
        .and_then(Value::as_object)
        .is_some_and(|w| w.values().any(Value::is_string));
    let plural_names = obj
        .get("startingPosition")
        .and_then(Value::as_object)
        .is_some_and(|p| p.values().any(is_legacy_type));
    let combined_date = obj
        .get("metadata")
        .is_some_and(|m| m.get("Date").is_some());

    top_variant || array_ranks || structured_moves || enum_wins || plural_names || combined_date
}

/// Reads current or legacy game JSON, upgrading legacy documents with local-time dates.
pub fn load_json(s: &str) -> Result<LongFormat, NotationError> {
    let doc: Value = serde_json::from_str(s)?;
    if is_legacy(&doc) {
        upgrade_in(doc, &chrono::Local)
    } else {
        Ok(serde_json::from_value(doc)?)
    }
}

/// Upgrades a legacy document, reading its `Date` as a wall-clock time in `tz`.
pub fn upgrade_in<Tz: TimeZone>(mut doc: Value, tz: &Tz) -> Result<LongFormat, NotationError> {
    let kind = doc_kind(&doc);
    let Some(obj) = doc.as_object_mut() else {
        return Err(NotationError::UnexpectedToken {
            token: kind,
            expected: "a JSON object",
        });
    };

    upgrade_metadata(obj, tz)?;
    upgrade_coords(obj);
    upgrade_move_rule(obj)?;
    upgrade_position(obj);
    upgrade_moves(obj)?;
    upgrade_game_rules(obj)?;

    let has_wins = obj
        .get("gameRules")
        .and_then(|r| r.get("winConditions"))
        .is_some();
    if !has_wins {
        tracing::error!("legacy upgrade produced no gameRules.winConditions");
        return Err(NotationError::UpgradeInvariant {
            field: "gameRules.winConditions",
        });
    }
    Ok(serde_json::from_value(doc)?)
}

fn doc_kind(v: &Value) -> String {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
    .to_string()
}

fn upgrade_metadata<Tz: TimeZone>(obj: &mut Map<String, Value>, tz: &Tz) -> Result<(), NotationError> {
    let variant = obj.remove("variant");
    let meta = obj
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(meta) = meta.as_object_mut() else {
        return Err(NotationError::Tag("metadata is not an object".to_string()));
    };

    if let Some(Value::String(v)) = variant {
        meta.entry("Variant").or_insert(Value::String(v));
    }
    // Every tag is a string in the current schema.
    for value in meta.values_mut() {
        if !value.is_string() {
            let text = value.to_string();
            *value = Value::String(text);
        }
    }

    if let Some(date) = meta.remove("Date") {
        let text = date.as_str().unwrap_or_default().to_string();
        if !meta.contains_key("UTCDate") {
            let (d, t) = split_legacy_date(&text, tz)?;
            meta.insert("UTCDate".to_string(), Value::String(d));
            meta.insert("UTCTime".to_string(), Value::String(t));
        }
    }
    Ok(())
}

/// `"YYYY/MM/DD HH:MM:SS"` wall-clock time in `tz` to `("YYYY.MM.DD", "HH:MM:SS")` in UTC.
pub fn split_legacy_date<Tz: TimeZone>(text: &str, tz: &Tz) -> Result<(String, String), NotationError> {
    let naive = NaiveDateTime::parse_from_str(text, LEGACY_DATE_FORMAT)
        .map_err(|_| NotationError::Date(text.to_string()))?;
    let utc = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => {
            tracing::warn!(date = text, "ambiguous local time, using the earlier instant");
            earliest.with_timezone(&Utc)
        }
        LocalResult::None => {
            tracing::warn!(date = text, "nonexistent local time, reading it as UTC");
            Utc.from_utc_datetime(&naive)
        }
    };
    Ok((
        utc.format("%Y.%m.%d").to_string(),
        utc.format("%H:%M:%S").to_string(),
    ))
}

/// `[x, y]` arrays to `"x,y"` strings.
fn coord_value(v: &Value) -> Option<Value> {
    match v {
        Value::String(_) => Some(v.clone()),
        Value::Array(a) if a.len() == 2 => {
            let (x, y) = (a[0].as_i64()?, a[1].as_i64()?);
            Some(Value::String(Coord::new(x, y).to_string()))
        }
        _ => None,
    }
}

fn upgrade_coords(obj: &mut Map<String, Value>) {
    if let Some(ep) = obj.get("enpassant").and_then(coord_value) {
        obj.insert("enpassant".to_string(), ep);
    }
    let squares: Option<Vec<Value>> = match obj.get("specialRights") {
        Some(Value::Object(rights)) => Some(
            rights
                .iter()
                .filter(|(_, v)| v.as_bool().unwrap_or(false))
                .map(|(k, _)| Value::String(k.clone()))
                .collect(),
        ),
        _ => None,
    };
    if let Some(squares) = squares {
        obj.insert("specialRights".to_string(), Value::Array(squares));
    }
}

/// `"ply/limit"` splits into the counter and `gameRules.moveRule`.
fn upgrade_move_rule(obj: &mut Map<String, Value>) -> Result<(), NotationError> {
    let Some(Value::String(s)) = obj.get("moveRule").cloned() else {
        return Ok(());
    };
    let bad = || NotationError::UnexpectedToken {
        token: s.clone(),
        expected: "a move rule like 0/100",
    };
    let (ply, limit) = s.split_once('/').ok_or_else(bad)?;
    let ply: u32 = ply.parse().map_err(|_| bad())?;
    let limit: u32 = limit.parse().map_err(|_| bad())?;
    obj.insert("moveRule".to_string(), json!(ply));
    let rules = obj.entry("gameRules").or_insert_with(|| json!({}));
    if let Some(r) = rules.as_object_mut() {
        r.entry("moveRule").or_insert(json!(limit));
    }
    Ok(())
}

fn upgrade_position(obj: &mut Map<String, Value>) {
    let Some(Value::Object(position)) = obj.get_mut("startingPosition") else {
        return;
    };
    for value in position.values_mut() {
        if let Some(ty) = value.as_str().and_then(parse_legacy_type) {
            *value = Value::String(ty.to_string());
        }
    }
}

fn legacy_move(m: &Value) -> Result<Value, NotationError> {
    if m.is_string() {
        return Ok(m.clone());
    }
    let bad = || NotationError::Move(m.to_string());
    let start = m.get("startCoords").and_then(coord_value).ok_or_else(bad)?;
    let end = m.get("endCoords").and_then(coord_value).ok_or_else(bad)?;
    let piece_type = |key: &str| {
        m.get(key).and_then(Value::as_str).and_then(|s| {
            parse_legacy_type(s).or_else(|| s.parse::<PieceType>().ok())
        })
    };
    let record = MoveRecord {
        piece: piece_type("type"),
        start: start.as_str().unwrap_or_default().parse()?,
        end: end.as_str().unwrap_or_default().parse()?,
        capture: m.get("captured").is_some_and(|c| !c.is_null()),
        promotion: piece_type("promotion"),
        mark: None,
    };
    Ok(Value::String(record.to_string()))
}

/// Flattens per-full-move arrays and turns move objects into move strings.
fn upgrade_moves(obj: &mut Map<String, Value>) -> Result<(), NotationError> {
    let Some(Value::Array(moves)) = obj.get("moves") else {
        return Ok(());
    };
    let mut flat = Vec::new();
    for m in moves {
        match m {
            Value::Array(inner) => {
                for x in inner {
                    flat.push(legacy_move(x)?);
                }
            }
            other => flat.push(legacy_move(other)?),
        }
    }
    obj.insert("moves".to_string(), Value::Array(flat));
    Ok(())
}

fn upgrade_game_rules(obj: &mut Map<String, Value>) -> Result<(), NotationError> {
    let top_ranks = obj.remove("promotionRanks");
    let variant_rules = obj
        .get("metadata")
        .and_then(|m| m.get("Variant"))
        .and_then(Value::as_str)
        .and_then(variants::lookup)
        .map(|v| v.rules);

    let rules = obj.entry("gameRules").or_insert_with(|| json!({}));
    let kind = doc_kind(rules);
    let Some(rules) = rules.as_object_mut() else {
        return Err(NotationError::UnexpectedToken {
            token: kind,
            expected: "a gameRules object",
        });
    };

    if let Some(ranks) = top_ranks {
        rules.entry("promotionRanks").or_insert(ranks);
    }
    if let Some(Value::Array(ranks)) = rules.get("promotionRanks").cloned() {
        let mut per_color = Map::new();
        for (color, rank) in [Color::Black, Color::White].into_iter().zip(ranks) {
            if !rank.is_null() {
                per_color.insert(color.name().to_string(), json!([rank]));
            }
        }
        rules.insert("promotionRanks".to_string(), Value::Object(per_color));
    }

    if let Some(Value::Object(allowed)) = rules.get_mut("promotionsAllowed") {
        for kinds in allowed.values_mut() {
            if let Value::Array(list) = kinds {
                for k in list.iter_mut() {
                    if let Some(kind) = k.as_str().and_then(plural_kind) {
                        *k = Value::String(kind.name().to_string());
                    }
                }
            }
        }
    }

    if let Some(Value::Object(wins)) = rules.get("winConditions").cloned() {
        if wins.values().any(Value::is_string) {
            let mut per_color: Map<String, Value> = Map::new();
            for (condition, who) in wins {
                let colors: &[Color] = match who.as_str() {
                    Some("both") => &[Color::White, Color::Black],
                    Some("white") => &[Color::White],
                    Some("black") => &[Color::Black],
                    _ => {
                        return Err(NotationError::UnexpectedToken {
                            token: format!("{condition}: {who}"),
                            expected: "\"both\", \"white\" or \"black\"",
                        })
                    }
                };
                for c in colors {
                    let list = per_color
                        .entry(c.name().to_string())
                        .or_insert_with(|| json!([]));
                    if let Value::Array(l) = list {
                        l.push(Value::String(condition.clone()));
                    }
                }
            }
            rules.insert("winConditions".to_string(), Value::Object(per_color));
        }
    }

    if !rules.contains_key("winConditions") {
        if let Some(vr) = variant_rules {
            let derived = serde_json::to_value(vr)?;
            if let Some(w) = derived.get("winConditions") {
                rules.insert("winConditions".to_string(), w.clone());
            }
            for key in ["promotionRanks", "promotionsAllowed", "turnOrder"] {
                if let Some(v) = derived.get(key) {
                    rules.entry(key).or_insert_with(|| v.clone());
                }
            }
        }
    }
    Ok(())
}
