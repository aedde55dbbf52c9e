//! The object registry: sole owner of every simulated object.
//!
//! Identity, lookup and bulk teardown all live here. Storage is an
//! insertion-ordered slot vector plus an id index; deletion tombstones
//! the slot and only compacts the vector once no scan is in progress, so
//! ranks and ids observed earlier in the same tick stay valid for the
//! rest of that tick even though the object is already logically gone.
//!
//! # Ownership
//!
//! The registry exclusively owns every [`Object`]. Everything else -
//! scripts, tasks, automatons, radar results - stores an [`ObjectId`]
//! and re-resolves it here at the top of each tick's work.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::effects::GeometryFactory;
use crate::error::{GameError, Result};
use crate::events::DestructionKind;
use crate::math::Fixed;
use crate::object::{Capabilities, Object, ObjectCreateParams, ObjectId};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    object: Object,
    dead: bool,
}

/// Owner of all objects, single source of truth for identity.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ObjectRegistry {
    /// Insertion-ordered storage; dead slots await compaction.
    slots: Vec<Slot>,
    /// Live id -> slot position.
    index: HashMap<ObjectId, usize>,
    /// Next id to assign.
    next_id: u32,
    /// Number of scans currently in progress; gates compaction.
    #[serde(skip)]
    scan_depth: u32,
    /// Whether any tombstones await compaction.
    #[serde(skip)]
    dirty: bool,
}

impl ObjectRegistry {
    /// Create an empty registry. Ids start at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object and register it under its id.
    ///
    /// An unset `params.id` assigns the next monotonic id; a supplied id
    /// is adopted and the monotonic counter advances past it. The energy
    /// parameter is clamped into [0, 1] before the geometry factory
    /// runs. If the factory cannot build the type, nothing is
    /// registered.
    ///
    /// # Panics
    ///
    /// Supplying an id that is already live is a programming error and
    /// asserts.
    pub fn create_object(
        &mut self,
        params: ObjectCreateParams,
        factory: &mut dyn GeometryFactory,
    ) -> Result<ObjectId> {
        let mut params = params;
        params.energy = params.energy.clamp(Fixed::ZERO, Fixed::from_num(1));

        let id = match params.id {
            Some(id) => {
                assert!(
                    !self.index.contains_key(&id),
                    "object id {id} is already live"
                );
                self.next_id = self.next_id.max(id.as_u32() + 1);
                id
            }
            None => {
                let id = ObjectId::new(self.next_id);
                self.next_id += 1;
                id
            }
        };

        factory.build(&params)?;

        let object = Object::from_params(id, &params);
        tracing::debug!(object = %id, object_type = ?params.object_type, "object created");
        self.index.insert(id, self.slots.len());
        self.slots.push(Slot {
            object,
            dead: false,
        });
        Ok(id)
    }

    /// Look up a live object by id. Deleted and unknown ids are
    /// "not found", never an error.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.index.get(&id).map(|&i| &self.slots[i].object)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.slots[i].object),
            None => None,
        }
    }

    /// The rank-th live object in registry iteration order.
    ///
    /// Legacy positional addressing for scripts. Iteration order is
    /// insertion order and is NOT stable across deletions; callers
    /// relying on rank stability across ticks are on a deprecated path.
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<&Object> {
        self.iter().nth(rank)
    }

    /// Iterate live objects in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.slots.iter().filter(|s| !s.dead).map(|s| &s.object)
    }

    /// Live ids in registry order, snapshotted for tick processing.
    #[must_use]
    pub fn live_ids(&self) -> Vec<ObjectId> {
        self.iter().map(|o| o.id).collect()
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no live objects exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Delete an object: teardown, cascade to carried cargo, then
    /// tombstone the slot. Returns false for unknown/already-deleted
    /// ids.
    ///
    /// Safe to call while a scan is in progress: lookups report the
    /// object gone immediately, storage is reclaimed once the last scan
    /// ends.
    pub fn delete_object(&mut self, id: ObjectId) -> bool {
        let Some(&slot_idx) = self.index.get(&id) else {
            return false;
        };

        let cargo = self.slots[slot_idx].object.cargo;
        let transporter = self.slots[slot_idx].object.transporter;

        // Detach from a carrier still holding us.
        if let Some(carrier) = transporter {
            if let Some(carrier) = self.get_mut(carrier) {
                carrier.cargo = None;
            }
        }

        self.index.remove(&id);
        self.slots[slot_idx].dead = true;
        self.dirty = true;
        tracing::debug!(object = %id, "object deleted");

        // Anything we were carrying goes down with us.
        if let Some(cargo) = cargo {
            self.delete_object(cargo);
        }

        self.compact_if_idle();
        true
    }

    /// Tear down every object and reset id assignment to 0.
    ///
    /// Full-world reset for a new mission.
    pub fn delete_all(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.next_id = 0;
        self.dirty = false;
        tracing::debug!("registry cleared");
    }

    /// Enter a scan: compaction is deferred until every scan has ended.
    pub fn begin_scan(&mut self) {
        self.scan_depth += 1;
    }

    /// Leave a scan, compacting tombstones once no scan remains.
    pub fn end_scan(&mut self) {
        debug_assert!(self.scan_depth > 0, "end_scan without begin_scan");
        self.scan_depth = self.scan_depth.saturating_sub(1);
        self.compact_if_idle();
    }

    fn compact_if_idle(&mut self) {
        if self.scan_depth > 0 || !self.dirty {
            return;
        }
        self.slots.retain(|s| !s.dead);
        self.index = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, s)| (s.object.id, i))
            .collect();
        self.dirty = false;
    }

    /// Ids of every live object belonging to a team.
    #[must_use]
    pub fn objects_of_team(&self, team: u8) -> Vec<ObjectId> {
        self.iter()
            .filter(|o| o.team == team)
            .map(|o| o.id)
            .collect()
    }

    /// Whether any live object belongs to the team.
    #[must_use]
    pub fn team_exists(&self, team: u8) -> bool {
        self.iter().any(|o| o.team == team)
    }

    /// Count live objects implementing all the given capabilities.
    #[must_use]
    pub fn count_implementing(&self, caps: Capabilities) -> usize {
        self.iter().filter(|o| o.implements(caps)).count()
    }

    /// Wipe out a whole team.
    ///
    /// Objects implementing `DESTROYABLE` get the destruction effect
    /// (reported back for the presentation layer); the rest are
    /// hard-deleted. Team 0 can never be targeted.
    pub fn destroy_team(
        &mut self,
        team: u8,
        kind: DestructionKind,
    ) -> Result<Vec<(ObjectId, DestructionKind)>> {
        if team == 0 {
            return Err(GameError::NeutralTeam);
        }

        let doomed = self.objects_of_team(team);
        let mut effects = Vec::new();
        for id in doomed {
            let destroyable = self
                .get(id)
                .is_some_and(|o| o.implements(Capabilities::DESTROYABLE));
            if destroyable {
                effects.push((id, kind));
            }
            self.delete_object(id);
        }
        Ok(effects)
    }

    /// Hash of the registry state, for determinism checks.
    ///
    /// Two registries that went through identical operation sequences
    /// produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.next_id.hash(&mut hasher);
        self.len().hash(&mut hasher);

        let mut ids = self.live_ids();
        ids.sort_unstable();
        for id in ids {
            if let Some(obj) = self.get(id) {
                id.hash(&mut hasher);
                obj.object_type.hash(&mut hasher);
                obj.team.hash(&mut hasher);
                obj.position.x.to_bits().hash(&mut hasher);
                obj.position.y.to_bits().hash(&mut hasher);
                obj.position.z.to_bits().hash(&mut hasher);
                obj.rotation.to_bits().hash(&mut hasher);
                obj.locked.hash(&mut hasher);
                obj.energy.to_bits().hash(&mut hasher);
            }
        }

        hasher.finish()
    }

    /// Serialize the whole registry for save or replay.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("failed to serialize registry: {e}")))
    }

    /// Deserialize a registry. Tombstones present in the snapshot are
    /// compacted away immediately.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut registry: Self = bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("failed to deserialize registry: {e}")))?;
        registry.dirty = registry.slots.iter().any(|s| s.dead);
        registry.compact_if_idle();
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{FailingGeometry, NullGeometry};
    use crate::object_type::ObjectType;

    fn spawn(registry: &mut ObjectRegistry, object_type: ObjectType) -> ObjectId {
        registry
            .create_object(ObjectCreateParams::of(object_type), &mut NullGeometry)
            .unwrap()
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut registry = ObjectRegistry::new();
        let a = spawn(&mut registry, ObjectType::WheeledGrabber);
        let b = spawn(&mut registry, ObjectType::TitaniumCube);
        assert_eq!(a, ObjectId::new(0));
        assert_eq!(b, ObjectId::new(1));
    }

    #[test]
    fn test_adopted_id_advances_counter() {
        let mut registry = ObjectRegistry::new();
        let adopted = registry
            .create_object(
                ObjectCreateParams {
                    id: Some(ObjectId::new(10)),
                    ..ObjectCreateParams::of(ObjectType::TitaniumCube)
                },
                &mut NullGeometry,
            )
            .unwrap();
        assert_eq!(adopted, ObjectId::new(10));

        let next = spawn(&mut registry, ObjectType::TitaniumCube);
        assert_eq!(next, ObjectId::new(11));
    }

    #[test]
    #[should_panic(expected = "already live")]
    fn test_duplicate_live_id_asserts() {
        let mut registry = ObjectRegistry::new();
        let id = spawn(&mut registry, ObjectType::TitaniumCube);
        let _ = registry.create_object(
            ObjectCreateParams {
                id: Some(id),
                ..ObjectCreateParams::of(ObjectType::TitaniumCube)
            },
            &mut NullGeometry,
        );
    }

    #[test]
    fn test_deleted_id_is_gone_forever() {
        let mut registry = ObjectRegistry::new();
        let id = spawn(&mut registry, ObjectType::TitaniumCube);
        assert!(registry.delete_object(id));
        assert!(registry.get(id).is_none());
        assert!(!registry.delete_object(id));

        // A new object never resurrects the old id.
        let fresh = spawn(&mut registry, ObjectType::TitaniumCube);
        assert_ne!(fresh, id);
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_creation_failure_registers_nothing() {
        let mut registry = ObjectRegistry::new();
        let result = registry.create_object(
            ObjectCreateParams::of(ObjectType::WheeledGrabber),
            &mut FailingGeometry,
        );
        assert!(matches!(result, Err(GameError::CreateFailed(_))));
        assert!(registry.is_empty());

        // The failed attempt must not burn an id either.
        let id = spawn(&mut registry, ObjectType::TitaniumCube);
        assert_eq!(id, ObjectId::new(0));
    }

    #[test]
    fn test_energy_is_clamped() {
        let mut registry = ObjectRegistry::new();
        let id = registry
            .create_object(
                ObjectCreateParams {
                    energy: Fixed::from_num(7),
                    ..ObjectCreateParams::of(ObjectType::WheeledGrabber)
                },
                &mut NullGeometry,
            )
            .unwrap();
        assert_eq!(registry.get(id).unwrap().energy, Fixed::from_num(1));
    }

    #[test]
    fn test_rank_lookup() {
        let mut registry = ObjectRegistry::new();
        let a = spawn(&mut registry, ObjectType::WheeledGrabber);
        let b = spawn(&mut registry, ObjectType::TitaniumCube);
        assert_eq!(registry.get_by_rank(0).unwrap().id, a);
        assert_eq!(registry.get_by_rank(1).unwrap().id, b);
        assert!(registry.get_by_rank(2).is_none());

        registry.delete_object(a);
        assert_eq!(registry.get_by_rank(0).unwrap().id, b);
    }

    #[test]
    fn test_deferred_compaction_keeps_ranks_stable() {
        let mut registry = ObjectRegistry::new();
        let a = spawn(&mut registry, ObjectType::WheeledGrabber);
        let b = spawn(&mut registry, ObjectType::TitaniumCube);
        let c = spawn(&mut registry, ObjectType::UraniumOre);

        registry.begin_scan();
        registry.delete_object(b);

        // Logically gone at once...
        assert!(registry.get(b).is_none());
        assert_eq!(registry.len(), 2);
        // ...but ranks observed during the scan stay coherent.
        assert_eq!(registry.get_by_rank(0).unwrap().id, a);
        assert_eq!(registry.get_by_rank(1).unwrap().id, c);

        registry.end_scan();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_by_rank(1).unwrap().id, c);
    }

    #[test]
    fn test_cascade_deletes_cargo() {
        let mut registry = ObjectRegistry::new();
        let carrier = spawn(&mut registry, ObjectType::WheeledGrabber);
        let cargo = spawn(&mut registry, ObjectType::TitaniumCube);
        registry.get_mut(carrier).unwrap().cargo = Some(cargo);
        registry.get_mut(cargo).unwrap().transporter = Some(carrier);

        registry.delete_object(carrier);
        assert!(registry.get(carrier).is_none());
        assert!(registry.get(cargo).is_none());
    }

    #[test]
    fn test_delete_all_resets_ids() {
        let mut registry = ObjectRegistry::new();
        spawn(&mut registry, ObjectType::WheeledGrabber);
        spawn(&mut registry, ObjectType::TitaniumCube);
        registry.delete_all();
        assert!(registry.is_empty());

        let id = spawn(&mut registry, ObjectType::TitaniumCube);
        assert_eq!(id, ObjectId::new(0));
    }

    #[test]
    fn test_team_queries() {
        let mut registry = ObjectRegistry::new();
        for team in [1, 1, 2] {
            registry
                .create_object(
                    ObjectCreateParams {
                        team,
                        ..ObjectCreateParams::of(ObjectType::WheeledGrabber)
                    },
                    &mut NullGeometry,
                )
                .unwrap();
        }
        assert_eq!(registry.objects_of_team(1).len(), 2);
        assert!(registry.team_exists(2));
        assert!(!registry.team_exists(3));
        assert_eq!(
            registry.count_implementing(Capabilities::MOVABLE | Capabilities::CARRIER),
            3
        );
    }

    #[test]
    fn test_destroy_team_rejects_neutral() {
        let mut registry = ObjectRegistry::new();
        assert!(matches!(
            registry.destroy_team(0, DestructionKind::Explosion),
            Err(GameError::NeutralTeam)
        ));
    }

    #[test]
    fn test_destroy_team_prefers_effects() {
        let mut registry = ObjectRegistry::new();
        let bot = registry
            .create_object(
                ObjectCreateParams {
                    team: 2,
                    ..ObjectCreateParams::of(ObjectType::WheeledGrabber)
                },
                &mut NullGeometry,
            )
            .unwrap();
        // A marker is not destroyable; it gets hard-deleted.
        registry
            .create_object(
                ObjectCreateParams {
                    team: 2,
                    ..ObjectCreateParams::of(ObjectType::Marker)
                },
                &mut NullGeometry,
            )
            .unwrap();

        let effects = registry
            .destroy_team(2, DestructionKind::Explosion)
            .unwrap();
        assert_eq!(effects, vec![(bot, DestructionKind::Explosion)]);
        assert!(!registry.team_exists(2));
    }

    #[test]
    fn test_state_hash_tracks_operations() {
        let mut a = ObjectRegistry::new();
        let mut b = ObjectRegistry::new();
        spawn(&mut a, ObjectType::WheeledGrabber);
        spawn(&mut b, ObjectType::WheeledGrabber);
        assert_eq!(a.state_hash(), b.state_hash());

        spawn(&mut a, ObjectType::TitaniumCube);
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut registry = ObjectRegistry::new();
        spawn(&mut registry, ObjectType::WheeledGrabber);
        let doomed = spawn(&mut registry, ObjectType::TitaniumCube);
        spawn(&mut registry, ObjectType::BotFactory);
        registry.delete_object(doomed);

        let bytes = registry.serialize().unwrap();
        let restored = ObjectRegistry::deserialize(&bytes).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.state_hash(), registry.state_hash());
        assert!(restored.get(doomed).is_none());

        // Id assignment continues past the snapshot's high-water mark.
        let mut restored = restored;
        let fresh = spawn(&mut restored, ObjectType::TitaniumCube);
        assert!(fresh.as_u32() >= 3);
    }
}
