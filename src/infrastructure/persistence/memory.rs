//! In-memory repositories, used by the `memory` storage backend and by tests

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::application::ports::outbound::{
    CharacterRepositoryPort, HouseFilter, HouseRepositoryPort, RepoError,
};
use crate::domain::entities::{Character, House};
use crate::domain::value_objects::{CharacterId, HouseId};

#[derive(Default)]
pub struct InMemoryHouseRepository {
    houses: RwLock<HashMap<HouseId, House>>,
}

impl InMemoryHouseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw access, including soft-deleted houses
    #[cfg(test)]
    pub async fn stored(&self, id: HouseId) -> Option<House> {
        self.houses.read().await.get(&id).cloned()
    }
}

fn name_taken(houses: &HashMap<HouseId, House>, name: &str, owner: HouseId) -> bool {
    houses
        .values()
        .any(|h| h.id != owner && !h.is_deleted() && h.name == name)
}

#[async_trait]
impl HouseRepositoryPort for InMemoryHouseRepository {
    async fn insert(&self, house: &House) -> Result<(), RepoError> {
        let mut houses = self.houses.write().await;
        if name_taken(&houses, &house.name, house.id) {
            return Err(RepoError::constraint(format!(
                "house name already in use: {}",
                house.name
            )));
        }
        houses.insert(house.id, house.clone());
        Ok(())
    }

    async fn list(&self, filter: &HouseFilter) -> Result<Vec<House>, RepoError> {
        let houses = self.houses.read().await;
        let mut live: Vec<House> = houses
            .values()
            .filter(|h| !h.is_deleted())
            .filter(|h| filter.name.as_deref().map_or(true, |name| h.name == name))
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(live
            .into_iter()
            .skip(filter.page.offset as usize)
            .take(filter.page.limit as usize)
            .collect())
    }

    async fn get(&self, id: HouseId) -> Result<Option<House>, RepoError> {
        let houses = self.houses.read().await;
        Ok(houses.get(&id).filter(|h| !h.is_deleted()).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<House>, RepoError> {
        let houses = self.houses.read().await;
        Ok(houses
            .values()
            .find(|h| !h.is_deleted() && h.name == name)
            .cloned())
    }

    async fn update(&self, house: &House) -> Result<(), RepoError> {
        let mut houses = self.houses.write().await;
        if name_taken(&houses, &house.name, house.id) {
            return Err(RepoError::constraint(format!(
                "house name already in use: {}",
                house.name
            )));
        }
        match houses.get_mut(&house.id) {
            Some(existing) if !existing.is_deleted() => {
                *existing = house.clone();
                Ok(())
            }
            _ => Err(RepoError::not_found("House", house.id)),
        }
    }

    async fn soft_delete(&self, id: HouseId, at: DateTime<Utc>) -> Result<(), RepoError> {
        let mut houses = self.houses.write().await;
        match houses.get_mut(&id) {
            Some(house) if !house.is_deleted() => {
                house.deleted_at = Some(at);
                Ok(())
            }
            _ => Err(RepoError::not_found("House", id)),
        }
    }

    async fn clear_lord_references(
        &self,
        lord_id: CharacterId,
        at: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        let mut houses = self.houses.write().await;
        let mut cleared = 0;
        for house in houses.values_mut() {
            if house.current_lord == Some(lord_id) {
                house.clear_lord(at);
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

#[derive(Default)]
pub struct InMemoryCharacterRepository {
    characters: RwLock<HashMap<CharacterId, Character>>,
}

impl InMemoryCharacterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CharacterRepositoryPort for InMemoryCharacterRepository {
    async fn insert(&self, character: &Character) -> Result<(), RepoError> {
        self.characters
            .write()
            .await
            .insert(character.id, character.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Character>, RepoError> {
        let characters = self.characters.read().await;
        let mut live: Vec<Character> = characters
            .values()
            .filter(|c| !c.is_deleted())
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(live)
    }

    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        let characters = self.characters.read().await;
        Ok(characters.get(&id).filter(|c| !c.is_deleted()).cloned())
    }

    async fn get_including_deleted(
        &self,
        id: CharacterId,
    ) -> Result<Option<Character>, RepoError> {
        Ok(self.characters.read().await.get(&id).cloned())
    }

    async fn update(&self, character: &Character) -> Result<(), RepoError> {
        let mut characters = self.characters.write().await;
        match characters.get_mut(&character.id) {
            Some(existing) if !existing.is_deleted() => {
                *existing = character.clone();
                Ok(())
            }
            _ => Err(RepoError::not_found("Character", character.id)),
        }
    }

    async fn soft_delete(&self, id: CharacterId, at: DateTime<Utc>) -> Result<(), RepoError> {
        let mut characters = self.characters.write().await;
        match characters.get_mut(&id) {
            Some(character) if !character.is_deleted() => {
                character.deleted_at = Some(at);
                Ok(())
            }
            _ => Err(RepoError::not_found("Character", id)),
        }
    }
}
