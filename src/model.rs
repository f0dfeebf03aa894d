use crate::error::BattleError;
use crate::types::ElementType;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fmt;

pub const MAX_MOVES: usize = 4;

/// `floor(level * 3.3)` in integer arithmetic so level 100 lands on 330.
pub fn max_health_for_level(level: u32) -> u32 {
    (u64::from(level) * 33 / 10).min(u64::from(u32::MAX)) as u32
}

/// Unvalidated combatant as written in a pool file.
#[derive(Debug, Clone, Deserialize)]
pub struct CombatantSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub element: ElementType,
    pub level: u32,
    #[serde(default)]
    pub moves: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CombatantSpec")]
pub struct Combatant {
    name: String,
    element: ElementType,
    level: u32,
    max_health: u32,
    current_health: u32,
    moves: Vec<String>,
}

impl TryFrom<CombatantSpec> for Combatant {
    type Error = BattleError;

    fn try_from(spec: CombatantSpec) -> Result<Self, Self::Error> {
        Combatant::new(spec.name, spec.element, spec.level, spec.moves)
    }
}

impl Combatant {
    pub fn new(
        name: impl Into<String>,
        element: ElementType,
        level: u32,
        moves: Vec<String>,
    ) -> Result<Self, BattleError> {
        let name = name.into();
        if level == 0 {
            return Err(BattleError::InvalidCombatant {
                name,
                reason: "level must be positive".to_string(),
            });
        }
        if moves.is_empty() || moves.len() > MAX_MOVES {
            return Err(BattleError::InvalidCombatant {
                name,
                reason: format!("expected 1..={MAX_MOVES} moves, got {}", moves.len()),
            });
        }
        let max_health = max_health_for_level(level);
        Ok(Combatant {
            name,
            element,
            level,
            max_health,
            current_health: max_health,
            moves,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element(&self) -> ElementType {
        self.element
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn current_health(&self) -> u32 {
        self.current_health
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Case-insensitive lookup returning the canonical move name.
    pub fn find_move(&self, text: &str) -> Option<&str> {
        let wanted = text.trim();
        self.moves
            .iter()
            .find(|m| m.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }

    /// Subtracts `round(amount * multiplier)`, clamping at zero. Returns the health actually lost.
    pub fn apply_damage(&mut self, amount: u32, multiplier: f32) -> u32 {
        let scaled = (amount as f64 * multiplier.max(0.0) as f64).round();
        let scaled = if scaled >= u32::MAX as f64 {
            u32::MAX
        } else {
            scaled as u32
        };
        let before = self.current_health;
        self.current_health = self.current_health.saturating_sub(scaled);
        before - self.current_health
    }

    pub fn take_hit(&mut self, amount: u32) -> u32 {
        self.apply_damage(amount, 1.0)
    }

    pub fn is_fainted(&self) -> bool {
        self.current_health == 0
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - Level {}", self.name, self.element, self.level)
    }
}

/// One side's remaining combatants. Index 0 is the active one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: VecDeque<Combatant>,
}

impl Roster {
    pub fn new(members: Vec<Combatant>) -> Self {
        Roster {
            members: members.into(),
        }
    }

    pub fn active(&self) -> Option<&Combatant> {
        self.members.front()
    }

    pub fn active_mut(&mut self) -> Option<&mut Combatant> {
        self.members.front_mut()
    }

    /// Removes the active combatant; the next one in switch-in order takes its place.
    pub fn advance(&mut self) -> Option<Combatant> {
        self.members.pop_front()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.members.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(Combatant::name).collect()
    }
}

impl FromIterator<Combatant> for Roster {
    fn from_iter<I: IntoIterator<Item = Combatant>>(iter: I) -> Self {
        Roster {
            members: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PoolFile {
    pub pool: Vec<Combatant>,
}

fn legendary(name: &str, element: ElementType, moves: [&str; 4]) -> Combatant {
    let moves = moves.iter().map(|m| m.to_string()).collect();
    Combatant {
        name: name.to_string(),
        element,
        level: 100,
        max_health: max_health_for_level(100),
        current_health: max_health_for_level(100),
        moves,
    }
}

/// The ten level-100 creatures offered when no pool file is given.
pub fn default_pool() -> Vec<Combatant> {
    use ElementType::*;
    vec![
        legendary("Mewtwo", Psychic, ["Psycho Cut", "Close Combat", "Psychic", "Shadow Ball"]),
        legendary("Tornadus", Flying, ["Omnious Wind", "Hurricane", "Blackwind Storm", "Air Slash"]),
        legendary("Moltres", Fire, ["Flamethrower", "Overheat", "AncientPower", "Heat Wave"]),
        legendary("Lucario", Fighting, ["Shadow Claw", "Close Combat", "Aura Sphere", "Giga Impact"]),
        legendary("Groudon", Ground, ["Eruption", "Crunch", "Earthquake", "Earth Power"]),
        legendary("Kyogre", Water, ["Hydro Pump", "Water Spout", "Muddy Water", "Surf"]),
        legendary("Zapdos", Electric, ["Thunder", "Fly", "Thunderbolt", "Discharge"]),
        legendary("Giratina", Ghost, ["Shadow Ball", "Dark Pulse", "Psychic", "Earthquake"]),
        legendary("Torterra", Grass, ["Thunder", "Solar Beam", "Leaf Storm", "Energy Ball"]),
        legendary("Articuno", Ice, ["Ice Beam", "Blizzard", "Aerial Ace", "Sky Attack"]),
    ]
}
