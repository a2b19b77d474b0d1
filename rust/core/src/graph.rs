// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model Graph - owner of every decoded entity
//!
//! Built in one pass: decode every record (optionally on the rayon pool),
//! then index DE positions. The graph is read-only afterwards; pointers are
//! followed on demand through [`ModelGraph::resolve`].

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::config::{ErrorPolicy, GraphConfig};
use crate::decoder;
use crate::entity::{Entity, EntityVariant};
use crate::error::{Error, Result};
use crate::record::{DeRef, EntityRecord};
use crate::schema::EntityKind;

/// Decoded entities in file order plus the DE index
#[derive(Debug, Clone, Default)]
pub struct ModelGraph {
    entities: Vec<Entity>,
    /// DE position -> offset into `entities`
    index: FxHashMap<DeRef, usize>,
}

impl ModelGraph {
    /// Build with the default configuration
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = EntityRecord>,
    {
        Self::build(records, &GraphConfig::default())
    }

    /// Decode every record and index the results
    ///
    /// Under [`ErrorPolicy::Strict`] the decode failure earliest in file order
    /// aborts the build, serial or parallel;
    /// under [`ErrorPolicy::Lenient`] the failing entity becomes a malformed
    /// placeholder. Duplicate DE positions always fail.
    pub fn build<I>(records: I, config: &GraphConfig) -> Result<Self>
    where
        I: IntoIterator<Item = EntityRecord>,
    {
        let records: Vec<EntityRecord> = records.into_iter().collect();
        let parallel = config.use_parallel(records.len());
        let policy = config.error_policy;

        tracing::debug!(records = records.len(), parallel, "Decoding parameter records");

        let entities = if parallel {
            // Collect every result first so a strict build reports the
            // earliest failing record in file order
            records
                .into_par_iter()
                .map(|record| decode_record(record, policy))
                .collect::<Vec<_>>()
                .into_iter()
                .collect::<Result<Vec<_>>>()?
        } else {
            records
                .into_iter()
                .map(|record| decode_record(record, policy))
                .collect::<Result<Vec<_>>>()?
        };

        Self::from_entities(entities)
    }

    fn from_entities(entities: Vec<Entity>) -> Result<Self> {
        let mut index = FxHashMap::with_capacity_and_hasher(entities.len(), Default::default());
        for (offset, entity) in entities.iter().enumerate() {
            if index.insert(entity.de(), offset).is_some() {
                return Err(Error::DuplicateEntry(entity.de()));
            }
        }

        let graph = Self { entities, index };
        let counts = graph.kind_counts();
        let unsupported = counts.get(&EntityKind::Unsupported).copied().unwrap_or(0);
        let malformed = counts.get(&EntityKind::Malformed).copied().unwrap_or(0);
        if unsupported > 0 {
            let mut codes: Vec<u16> = graph
                .entities_of_kind(EntityKind::Unsupported)
                .map(Entity::type_code)
                .collect();
            codes.sort_unstable();
            codes.dedup();
            tracing::debug!(count = unsupported, ?codes, "Unsupported entity types kept raw");
        }
        tracing::info!(
            entities = graph.len(),
            unsupported,
            malformed,
            "Model graph built"
        );

        Ok(graph)
    }

    /// Follow a pointer
    #[inline]
    pub fn resolve(&self, de: DeRef) -> Result<&Entity> {
        self.get(de).ok_or(Error::UnresolvedReference(de))
    }

    /// Follow a pointer that must land on a specific variant
    pub fn resolve_as<T: EntityVariant>(&self, de: DeRef) -> Result<&T> {
        self.resolve(de)?.expect_variant::<T>()
    }

    /// Follow a nullable pointer; `None` stays `None`
    pub fn resolve_optional(&self, de: Option<DeRef>) -> Result<Option<&Entity>> {
        de.map(|de| self.resolve(de)).transpose()
    }

    /// Follow every pointer in order, failing on the first dangling one
    pub fn resolve_all(&self, refs: &[DeRef]) -> Result<Vec<&Entity>> {
        refs.iter().map(|&de| self.resolve(de)).collect()
    }

    /// Non-failing lookup
    #[inline]
    pub fn get(&self, de: DeRef) -> Option<&Entity> {
        self.index.get(&de).map(|&offset| &self.entities[offset])
    }

    #[inline]
    pub fn contains(&self, de: DeRef) -> bool {
        self.index.contains_key(&de)
    }

    /// Entities in file order
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities of one kind, in file order
    pub fn entities_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().filter(move |entity| entity.kind() == kind)
    }

    /// Entities of one variant with their typed data, in file order
    pub fn entities_of<'a, T: EntityVariant + 'a>(
        &'a self,
    ) -> impl Iterator<Item = (&'a Entity, &'a T)> + 'a {
        self.entities
            .iter()
            .filter_map(|entity| entity.as_variant::<T>().map(|data| (entity, data)))
    }

    /// Entity count per kind
    pub fn kind_counts(&self) -> FxHashMap<EntityKind, usize> {
        let mut counts = FxHashMap::default();
        for entity in &self.entities {
            *counts.entry(entity.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Placeholders left by a lenient build, with their decode errors
    pub fn malformed(&self) -> impl Iterator<Item = (&Entity, &Error)> + '_ {
        self.entities
            .iter()
            .filter_map(|entity| entity.decode_error().map(|error| (entity, error)))
    }
}

impl<'a> IntoIterator for &'a ModelGraph {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Decode one record under the given policy
fn decode_record(record: EntityRecord, policy: ErrorPolicy) -> Result<Entity> {
    let EntityRecord {
        directory,
        parameters,
    } = record;

    if let Ok(code) = parameters.type_code() {
        if code != directory.type_code {
            tracing::warn!(
                de = directory.de.get(),
                directory_type = directory.type_code,
                parameter_type = code,
                "Parameter record type number disagrees with directory entry"
            );
        }
    }

    match decoder::decode(&directory, &parameters) {
        Ok(decoded) => Ok(Entity::decoded(directory, parameters, decoded)),
        Err(error) => {
            let error = error.in_entity(directory.de, directory.type_code);
            match policy {
                ErrorPolicy::Strict => Err(error),
                ErrorPolicy::Lenient => {
                    tracing::warn!(
                        de = directory.de.get(),
                        type_code = directory.type_code,
                        error = %error,
                        "Entity failed to decode, keeping placeholder"
                    );
                    Ok(Entity::malformed(directory, parameters, error))
                }
            }
        }
    }
}
