use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings key the eat & drink guide lives under.
pub const EAT_DRINK_KEY: &str = "eat_drink_spots";

pub const CATEGORIES: &[&str] = &["restaurant", "cafe", "bar", "bakery", "dessert"];
pub const VIBES: &[&str] = &["casual", "upscale", "family", "lively", "cozy"];
pub const BUDGETS: &[&str] = &["$", "$$", "$$$"];

const DEFAULT_CATEGORY: &str = "restaurant";
const DEFAULT_VIBE: &str = "casual";
const DEFAULT_BUDGET: &str = "$$";

/// A single eat & drink listing. Enum-like fields are plain strings kept
/// inside the allowed sets by `normalize`; writes never reach the blob
/// without passing through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: String,
    pub name: String,
    pub category: String,
    pub vibe: String,
    pub budget: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    pub up_votes: u64,
    pub down_votes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EatDrinkSettings {
    pub spots: Vec<Spot>,
    pub featured_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

/// Build a structurally valid `Spot` out of arbitrary JSON. Total: every
/// missing or out-of-set field gets a default, so a malformed write can
/// never corrupt a later read. `index` is the spot's position in the
/// incoming list, used for placeholder names.
pub fn normalize(raw: &Value, index: usize) -> Spot {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Spot {}", index + 1));

    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| slugify(&name));

    Spot {
        id,
        name,
        category: pick(raw, "category", CATEGORIES, DEFAULT_CATEGORY),
        vibe: pick(raw, "vibe", VIBES, DEFAULT_VIBE),
        budget: pick(raw, "budget", BUDGETS, DEFAULT_BUDGET),
        description: text_field(raw, "description"),
        address: text_field(raw, "address"),
        up_votes: count_field(raw, "upVotes"),
        down_votes: count_field(raw, "downVotes"),
    }
}

/// Normalize a whole blob: every spot through `normalize`, duplicate ids
/// suffixed with their position, `featuredIds` deduplicated in order.
pub fn normalize_settings(raw: &Value) -> EatDrinkSettings {
    let mut spots: Vec<Spot> = raw
        .get("spots")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| normalize(item, i))
                .collect()
        })
        .unwrap_or_default();

    let mut seen_ids: Vec<String> = Vec::with_capacity(spots.len());
    for (i, spot) in spots.iter_mut().enumerate() {
        if seen_ids.iter().any(|id| id == &spot.id) {
            spot.id = format!("{}-{}", spot.id, i + 1);
        }
        seen_ids.push(spot.id.clone());
    }

    let mut featured_ids: Vec<String> = Vec::new();
    if let Some(ids) = raw.get("featuredIds").and_then(Value::as_array) {
        for id in ids.iter().filter_map(Value::as_str) {
            let id = id.trim();
            if !id.is_empty() && !featured_ids.iter().any(|seen| seen == id) {
                featured_ids.push(id.to_string());
            }
        }
    }

    EatDrinkSettings { spots, featured_ids }
}

/// Bump one vote counter on the spot with the given id. Returns the updated
/// counters, or `None` when no spot matches.
pub fn apply_vote(
    settings: &mut EatDrinkSettings,
    id: &str,
    direction: VoteDirection,
) -> Option<(u64, u64)> {
    let spot = settings.spots.iter_mut().find(|s| s.id == id)?;
    match direction {
        VoteDirection::Up => spot.up_votes += 1,
        VoteDirection::Down => spot.down_votes += 1,
    }
    Some((spot.up_votes, spot.down_votes))
}

fn pick(raw: &Value, field: &str, allowed: &[&str], default: &str) -> String {
    raw.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default)
        .to_string()
}

fn text_field(raw: &Value, field: &str) -> String {
    raw.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn count_field(raw: &Value, field: &str) -> u64 {
    // Negative numbers, floats, and non-numbers all collapse to zero
    raw.get(field).and_then(Value::as_u64).unwrap_or(0)
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "spot".to_string()
    } else {
        slug
    }
}
