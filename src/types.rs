use crate::error::BattleError;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Damage multiplier applied when the attacker's type is listed by the defender's chart entry.
pub const SUPER_EFFECTIVE: f32 = 1.5;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl ElementType {
    pub const ALL: [ElementType; 18] = [
        ElementType::Normal,
        ElementType::Fire,
        ElementType::Water,
        ElementType::Electric,
        ElementType::Grass,
        ElementType::Ice,
        ElementType::Fighting,
        ElementType::Poison,
        ElementType::Ground,
        ElementType::Flying,
        ElementType::Psychic,
        ElementType::Bug,
        ElementType::Rock,
        ElementType::Ghost,
        ElementType::Dragon,
        ElementType::Dark,
        ElementType::Steel,
        ElementType::Fairy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElementType::Normal => "Normal",
            ElementType::Fire => "Fire",
            ElementType::Water => "Water",
            ElementType::Electric => "Electric",
            ElementType::Grass => "Grass",
            ElementType::Ice => "Ice",
            ElementType::Fighting => "Fighting",
            ElementType::Poison => "Poison",
            ElementType::Ground => "Ground",
            ElementType::Flying => "Flying",
            ElementType::Psychic => "Psychic",
            ElementType::Bug => "Bug",
            ElementType::Rock => "Rock",
            ElementType::Ghost => "Ghost",
            ElementType::Dragon => "Dragon",
            ElementType::Dark => "Dark",
            ElementType::Steel => "Steel",
            ElementType::Fairy => "Fairy",
        }
    }
}

static TYPE_NAMES: phf::Map<&'static str, ElementType> = phf_map! {
    "normal" => ElementType::Normal,
    "fire" => ElementType::Fire,
    "water" => ElementType::Water,
    "electric" => ElementType::Electric,
    "grass" => ElementType::Grass,
    "ice" => ElementType::Ice,
    "fighting" => ElementType::Fighting,
    "poison" => ElementType::Poison,
    "ground" => ElementType::Ground,
    "flying" => ElementType::Flying,
    "psychic" => ElementType::Psychic,
    "bug" => ElementType::Bug,
    "rock" => ElementType::Rock,
    "ghost" => ElementType::Ghost,
    "dragon" => ElementType::Dragon,
    "dark" => ElementType::Dark,
    "steel" => ElementType::Steel,
    "fairy" => ElementType::Fairy,
};

impl FromStr for ElementType {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TYPE_NAMES
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| BattleError::UnknownType(s.to_string()))
    }
}

impl TryFrom<String> for ElementType {
    type Error = BattleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementType> for String {
    fn from(value: ElementType) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use ElementType::*;

// Each entry lists the types that are strong against the key type.
static DEFAULT_CHART: phf::Map<&'static str, &'static [ElementType]> = phf_map! {
    "Normal" => &[Fighting],
    "Fire" => &[Water, Rock],
    "Water" => &[Electric, Grass],
    "Electric" => &[Ground],
    "Grass" => &[Fire, Ice, Poison, Flying, Bug],
    "Ice" => &[Fire, Fighting, Rock, Steel],
    "Fighting" => &[Flying, Psychic, Fairy],
    "Poison" => &[Ground, Psychic],
    "Ground" => &[Water, Grass, Ice],
    "Flying" => &[Electric, Ice, Rock],
    "Psychic" => &[Bug, Ghost, Dark],
    "Bug" => &[Fire, Flying, Rock],
    "Rock" => &[Water, Grass, Fighting, Ground, Steel],
    "Ghost" => &[Ghost, Dark],
    "Dragon" => &[Ice, Dragon, Fairy],
    "Dark" => &[Fighting, Bug, Fairy],
    "Steel" => &[Fire, Fighting, Ground],
    "Fairy" => &[Poison, Steel],
};

/// Read-only type-effectiveness table shared by the resolver and the draft.
///
/// `weaknesses_of(Y)` lists every type `X` that beats `Y`. The relation is not
/// symmetric and a type may list itself (Ghost, Dragon).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeChart {
    entries: HashMap<ElementType, Vec<ElementType>>,
}

impl Default for TypeChart {
    fn default() -> Self {
        let entries = ElementType::ALL
            .iter()
            .map(|&t| {
                let listed = DEFAULT_CHART.get(t.name()).copied().unwrap_or(&[]);
                (t, listed.to_vec())
            })
            .collect();
        TypeChart { entries }
    }
}

impl TypeChart {
    pub fn new(entries: HashMap<ElementType, Vec<ElementType>>) -> Self {
        TypeChart { entries }
    }

    /// Builds a chart from type names, as found in a config file.
    pub fn from_names(raw: &HashMap<String, Vec<String>>) -> Result<Self, BattleError> {
        let mut entries = HashMap::with_capacity(raw.len());
        for (defender, attackers) in raw {
            let defender: ElementType = defender.parse()?;
            let attackers = attackers
                .iter()
                .map(|name| name.parse())
                .collect::<Result<Vec<ElementType>, _>>()?;
            entries.insert(defender, attackers);
        }
        Ok(TypeChart { entries })
    }

    pub fn weaknesses_of(&self, element: ElementType) -> &[ElementType] {
        self.entries
            .get(&element)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Name-based lookup; names that are not one of the 18 tags list nothing.
    pub fn weaknesses_of_name(&self, name: &str) -> &[ElementType] {
        match name.parse::<ElementType>() {
            Ok(element) => self.weaknesses_of(element),
            Err(_) => &[],
        }
    }

    pub fn beats(&self, attacker: ElementType, defender: ElementType) -> bool {
        self.weaknesses_of(defender).contains(&attacker)
    }

    pub fn effectiveness(&self, attacker: ElementType, defender: ElementType) -> f32 {
        if self.beats(attacker, defender) {
            SUPER_EFFECTIVE
        } else {
            1.0
        }
    }
}
