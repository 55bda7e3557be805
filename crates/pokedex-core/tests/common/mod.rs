//! Scripted in-memory service and fixtures shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pokedex_core::{CatalogStore, PokedexService, ServiceError, SharedCatalog};
use pokedex_types::{
    CreatureId, CreatureRecord, GameStartRecord, ImagesRecord, InfoRecord, MoveRecord, PlayerId,
    SessionId, SideHealthRecord, TurnRecord, TurnResultsRecord,
};
use tokio::sync::Notify;

pub const CATALOG: &str = "Bulbasaur:bulbasaur\nCharmander:charmander\nSquirtle:squirtle\n\nCharizard:charizard\nPikachu:pikachu\n";

/// A [`PokedexService`] that answers from queues filled by the test.
#[derive(Default)]
pub struct ScriptedService {
    pub catalog: Mutex<Option<Result<String, ServiceError>>>,
    pub creatures: Mutex<BTreeMap<CreatureId, CreatureRecord>>,
    pub starts: Mutex<VecDeque<Result<GameStartRecord, ServiceError>>>,
    pub turns: Mutex<VecDeque<Result<TurnRecord, ServiceError>>>,
    /// Every `(guid, pid, movename)` submitted, in order.
    pub submitted: Mutex<Vec<(String, String, String)>>,
    /// Every creature a battle was started with.
    pub started_with: Mutex<Vec<CreatureId>>,
    /// When set, each move submission waits for a notification first.
    pub gate: Option<Arc<Notify>>,
    /// When set, each battle start waits for a notification first.
    pub start_gate: Option<Arc<Notify>>,
    /// When set, each move submission sleeps this long first.
    pub delay: Option<Duration>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(self, body: &str) -> Self {
        *self.catalog.lock().unwrap() = Some(Ok(body.to_owned()));
        self
    }

    pub fn with_creature(self, record: CreatureRecord) -> Self {
        self.creatures
            .lock()
            .unwrap()
            .insert(record.shortname.clone(), record);
        self
    }

    pub fn push_start(&self, response: Result<GameStartRecord, ServiceError>) {
        self.starts.lock().unwrap().push_back(response);
    }

    pub fn push_turn(&self, response: Result<TurnRecord, ServiceError>) {
        self.turns.lock().unwrap().push_back(response);
    }

    pub fn submitted_moves(&self) -> Vec<String> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, m)| m.clone())
            .collect()
    }
}

fn exhausted() -> ServiceError {
    ServiceError::Transport(String::from("script exhausted"))
}

impl PokedexService for ScriptedService {
    async fn fetch_catalog(&self) -> Result<String, ServiceError> {
        self.catalog.lock().unwrap().clone().unwrap_or_else(|| Err(exhausted()))
    }

    async fn fetch_creature(&self, id: &CreatureId) -> Result<CreatureRecord, ServiceError> {
        self.creatures
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::Status {
                status: 400,
                message: format!("no such creature: {id}"),
            })
    }

    async fn start_game(&self, creature: &CreatureId) -> Result<GameStartRecord, ServiceError> {
        self.started_with.lock().unwrap().push(creature.clone());
        if let Some(gate) = &self.start_gate {
            gate.notified().await;
        }
        let next = self.starts.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(exhausted()))
    }

    async fn submit_move(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
        move_name: &str,
    ) -> Result<TurnRecord, ServiceError> {
        self.submitted.lock().unwrap().push((
            session_id.to_string(),
            player_id.to_string(),
            move_name.to_owned(),
        ));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.turns.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(exhausted()))
    }
}

pub fn moves(names: &[(&str, Option<u32>)]) -> Vec<MoveRecord> {
    names
        .iter()
        .map(|(name, dp)| MoveRecord {
            name: (*name).to_owned(),
            dp: *dp,
            type_tag: String::from("normal"),
        })
        .collect()
}

pub fn creature_record(shortname: &str, name: &str, hp: u32) -> CreatureRecord {
    CreatureRecord {
        name: name.to_owned(),
        shortname: CreatureId::from(shortname),
        hp,
        current_hp: None,
        info: InfoRecord {
            description: format!("{name} description"),
            type_tag: String::from("normal"),
            weakness: String::from("fighting"),
        },
        images: ImagesRecord {
            photo: format!("images/{shortname}.jpg"),
            type_icon: String::from("icons/normal.jpg"),
            weakness_icon: String::from("icons/fighting.jpg"),
        },
        moves: moves(&[("Fire  Blast", Some(110)), ("Tackle", Some(40)), ("Growl", None)]),
    }
}

pub fn charmander() -> CreatureRecord {
    creature_record("charmander", "Charmander", 60)
}

pub fn start(guid: &str, opponent: CreatureRecord) -> GameStartRecord {
    GameStartRecord {
        guid: SessionId::from(guid),
        pid: PlayerId::from(format!("pid-{guid}")),
        p1: None,
        p2: opponent,
    }
}

pub fn turn(guid: &str, player: (u32, u32), opponent: (u32, u32)) -> TurnRecord {
    TurnRecord {
        guid: SessionId::from(guid),
        pid: Some(PlayerId::from(format!("pid-{guid}"))),
        results: TurnResultsRecord {
            p1_move: Some(String::from("fireblast")),
            p1_result: Some(String::from("hit")),
            p2_move: Some(String::from("tackle")),
            p2_result: Some(String::from("hit")),
        },
        p1: SideHealthRecord {
            shortname: None,
            hp: player.0,
            current_hp: player.1,
        },
        p2: SideHealthRecord {
            shortname: None,
            hp: opponent.0,
            current_hp: opponent.1,
        },
    }
}

pub fn store() -> CatalogStore {
    CatalogStore::from_summaries(pokedex_core::catalog::parse_catalog(CATALOG).unwrap())
}

pub fn shared_store() -> SharedCatalog {
    store().into_shared()
}
