use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(PokedexId, u32);
id_newtype!(TeamId, String);

impl Copy for PokedexId {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

/// Elemental type labels used for filtering and color-coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryTag {
    #[serde(alias = "Normal")]
    Normal,
    #[serde(alias = "Fire")]
    Fire,
    #[serde(alias = "Water")]
    Water,
    #[serde(alias = "Electric")]
    Electric,
    #[serde(alias = "Grass")]
    Grass,
    #[serde(alias = "Ice")]
    Ice,
    #[serde(alias = "Fighting")]
    Fighting,
    #[serde(alias = "Poison")]
    Poison,
    #[serde(alias = "Ground")]
    Ground,
    #[serde(alias = "Flying")]
    Flying,
    #[serde(alias = "Psychic")]
    Psychic,
    #[serde(alias = "Bug")]
    Bug,
    #[serde(alias = "Rock")]
    Rock,
    #[serde(alias = "Ghost")]
    Ghost,
    #[serde(alias = "Dragon")]
    Dragon,
    #[serde(alias = "Dark")]
    Dark,
    #[serde(alias = "Steel")]
    Steel,
    #[serde(alias = "Fairy")]
    Fairy,
}

impl CategoryTag {
    pub const ALL: [CategoryTag; 18] = [
        CategoryTag::Normal,
        CategoryTag::Fire,
        CategoryTag::Water,
        CategoryTag::Electric,
        CategoryTag::Grass,
        CategoryTag::Ice,
        CategoryTag::Fighting,
        CategoryTag::Poison,
        CategoryTag::Ground,
        CategoryTag::Flying,
        CategoryTag::Psychic,
        CategoryTag::Bug,
        CategoryTag::Rock,
        CategoryTag::Ghost,
        CategoryTag::Dragon,
        CategoryTag::Dark,
        CategoryTag::Steel,
        CategoryTag::Fairy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryTag::Normal => "normal",
            CategoryTag::Fire => "fire",
            CategoryTag::Water => "water",
            CategoryTag::Electric => "electric",
            CategoryTag::Grass => "grass",
            CategoryTag::Ice => "ice",
            CategoryTag::Fighting => "fighting",
            CategoryTag::Poison => "poison",
            CategoryTag::Ground => "ground",
            CategoryTag::Flying => "flying",
            CategoryTag::Psychic => "psychic",
            CategoryTag::Bug => "bug",
            CategoryTag::Rock => "rock",
            CategoryTag::Ghost => "ghost",
            CategoryTag::Dragon => "dragon",
            CategoryTag::Dark => "dark",
            CategoryTag::Steel => "steel",
            CategoryTag::Fairy => "fairy",
        }
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryTag {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        CategoryTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == needle)
            .ok_or_else(|| UnknownName {
                kind: "category tag",
                value: s.to_string(),
            })
    }
}

/// The six base stats.
///
/// Display names and wire names are kept as two separate tables; they only
/// happen to agree for some stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::SpecialAttack,
        Stat::SpecialDefense,
        Stat::Speed,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Stat::Hp => "hp",
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::SpecialAttack => "special-attack",
            Stat::SpecialDefense => "special-defense",
            Stat::Speed => "speed",
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Stat::Hp => "hp",
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::SpecialAttack => "special_attack",
            Stat::SpecialDefense => "special_defense",
            Stat::Speed => "speed",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Stat {
    type Err = UnknownName;

    /// Accepts either vocabulary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Stat::ALL
            .into_iter()
            .find(|stat| stat.display_name() == needle || stat.wire_name() == needle)
            .ok_or_else(|| UnknownName {
                kind: "stat",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatBlock {
    #[serde(default)]
    pub hp: u32,
    #[serde(default)]
    pub attack: u32,
    #[serde(default)]
    pub defense: u32,
    #[serde(default)]
    pub special_attack: u32,
    #[serde(default)]
    pub special_defense: u32,
    #[serde(default)]
    pub speed: u32,
}

impl StatBlock {
    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpecialAttack => self.special_attack,
            Stat::SpecialDefense => self.special_defense,
            Stat::Speed => self.speed,
        }
    }

    pub fn set(&mut self, stat: Stat, value: u32) {
        let slot = match stat {
            Stat::Hp => &mut self.hp,
            Stat::Attack => &mut self.attack,
            Stat::Defense => &mut self.defense,
            Stat::SpecialAttack => &mut self.special_attack,
            Stat::SpecialDefense => &mut self.special_defense,
            Stat::Speed => &mut self.speed,
        };
        *slot = value;
    }

    pub fn total(&self) -> u32 {
        Stat::ALL.into_iter().map(|stat| self.get(stat)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, u32)> + '_ {
        Stat::ALL.into_iter().map(|stat| (stat, self.get(stat)))
    }
}
