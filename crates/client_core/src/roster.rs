use std::collections::BTreeMap;

use shared::{
    domain::{CategoryTag, PokedexId, StatBlock, TeamId},
    protocol::{CatalogEntity, TeamMemberPayload, TeamPayload},
};

use crate::error::ClientError;

pub const ROSTER_SIZE: usize = 6;
pub const MAX_MOVES: usize = 4;
pub const MAX_STAT_POINTS: u32 = 252;
pub const MAX_TOTAL_POINTS: u32 = 510;
const UNTITLED_TEAM: &str = "Untitled team";

/// Per-member customization chosen in the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberBuild {
    pub nickname: Option<String>,
    pub item: Option<String>,
    pub ability: Option<String>,
    pub nature: Option<String>,
    pub tera_type: Option<String>,
    pub moves: Vec<String>,
    pub training_points: StatBlock,
}

impl MemberBuild {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.moves.len() > MAX_MOVES {
            return Err(ClientError::validation(format!(
                "a member knows at most {MAX_MOVES} moves, got {}",
                self.moves.len()
            )));
        }
        if let Some((stat, points)) = self
            .training_points
            .iter()
            .find(|(_, points)| *points > MAX_STAT_POINTS)
        {
            return Err(ClientError::validation(format!(
                "{stat} has {points} training points, limit is {MAX_STAT_POINTS}"
            )));
        }
        let total = self.training_points.total();
        if total > MAX_TOTAL_POINTS {
            return Err(ClientError::validation(format!(
                "{total} training points allocated, limit is {MAX_TOTAL_POINTS}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterMember {
    pub entity: CatalogEntity,
    pub build: MemberBuild,
}

impl RosterMember {
    pub fn new(entity: CatalogEntity) -> Self {
        Self {
            entity,
            build: MemberBuild::default(),
        }
    }

    fn to_payload(&self) -> TeamMemberPayload {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let evs: BTreeMap<String, u32> = self
            .build
            .training_points
            .iter()
            .filter(|(_, points)| *points > 0)
            .map(|(stat, points)| (stat.wire_name().to_string(), points))
            .collect();

        TeamMemberPayload {
            base_pokemon: self.entity.name.clone(),
            nickname: non_empty(&self.build.nickname),
            item: non_empty(&self.build.item),
            ability: non_empty(&self.build.ability),
            tera_type: non_empty(&self.build.tera_type),
            nature: non_empty(&self.build.nature),
            moves: self
                .build
                .moves
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            evs,
        }
    }
}

/// A team of up to six members held in fixed slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    slots: [Option<RosterMember>; ROSTER_SIZE],
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[Option<RosterMember>] {
        &self.slots
    }

    pub fn get(&self, slot: usize) -> Option<&RosterMember> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn build_mut(&mut self, slot: usize) -> Result<&mut MemberBuild, ClientError> {
        self.slots
            .get_mut(slot)
            .ok_or(ClientError::InvalidSlot(slot))?
            .as_mut()
            .map(|member| &mut member.build)
            .ok_or_else(|| ClientError::validation(format!("slot {slot} is empty")))
    }

    pub fn members(&self) -> impl Iterator<Item = &RosterMember> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.members().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == ROSTER_SIZE
    }

    /// Puts `entity` into `slot` with a fresh build, returning whatever was
    /// there before.
    pub fn place(
        &mut self,
        slot: usize,
        entity: CatalogEntity,
    ) -> Result<Option<RosterMember>, ClientError> {
        let target = self.slots.get_mut(slot).ok_or(ClientError::InvalidSlot(slot))?;
        Ok(target.replace(RosterMember::new(entity)))
    }

    /// Fills the first empty slot and returns its index.
    pub fn add(&mut self, entity: CatalogEntity) -> Result<usize, ClientError> {
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(ClientError::RosterFull)?;
        self.slots[slot] = Some(RosterMember::new(entity));
        Ok(slot)
    }

    pub fn remove(&mut self, slot: usize) -> Result<Option<RosterMember>, ClientError> {
        let target = self.slots.get_mut(slot).ok_or(ClientError::InvalidSlot(slot))?;
        Ok(target.take())
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    pub fn member_ids(&self) -> Vec<PokedexId> {
        self.members().map(|m| m.entity.pokedex_id).collect()
    }

    /// Sum of all base stats across members.
    pub fn team_power(&self) -> u32 {
        self.members()
            .map(|m| m.entity.stats_or_default().total())
            .sum()
    }

    /// Most frequent category tag; ties go to the tag seen first in slot order.
    pub fn dominant_type(&self) -> Option<CategoryTag> {
        let mut counts: Vec<(CategoryTag, usize)> = Vec::new();
        for tag in self.members().flat_map(|m| m.entity.types.iter().copied()) {
            match counts.iter_mut().find(|(seen, _)| *seen == tag) {
                Some((_, count)) => *count += 1,
                None => counts.push((tag, 1)),
            }
        }

        let mut best: Option<(CategoryTag, usize)> = None;
        for (tag, count) in counts {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((tag, count));
            }
        }
        best.map(|(tag, _)| tag)
    }

    pub fn to_team_payload(
        &self,
        name: &str,
        description: Option<&str>,
        format: &str,
        team_id: Option<TeamId>,
    ) -> Result<TeamPayload, ClientError> {
        if self.is_empty() {
            return Err(ClientError::validation("team has no members"));
        }
        for member in self.members() {
            member.build.validate()?;
        }

        let name = name.trim();
        Ok(TeamPayload {
            team_id,
            team_name: if name.is_empty() {
                UNTITLED_TEAM.to_string()
            } else {
                name.to_string()
            },
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            format: format.trim().to_string(),
            team_members: self.members().map(RosterMember::to_payload).collect(),
        })
    }
}

#[cfg(test)]
#[path = "tests/roster_tests.rs"]
mod tests;
