//! Transitive dependency collection.
//!
//! Starting from a seed set, walks requirements with an explicit worklist and
//! a visited set keyed by `(kind, slug)`, so cycles terminate and duplicate
//! seeds are no-ops. A dependency that cannot be resolved or loaded is logged,
//! recorded as a warning and left out of the result: the outcome is
//! best-effort, not a completeness guarantee.
//!
//! Seeds are only part of [`ResolvedDependencies`] when another visited
//! schema requires them.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use color_schema_core::{
    DependencyNode, ExtractOptions, Requirement, ResolvedDependencies, SchemaDocument, SchemaKey,
    SchemaKind, SchemaReference, extract_requirements, resolve_reference, resolve_reference_as,
};
use tracing::{debug, warn};

use crate::config::BundlerConfig;
use crate::inline::{InlineOptions, inline_schema};
use crate::store::SchemaStore;

/// Result of one collection pass.
#[derive(Debug, Clone, Default)]
pub struct CollectOutcome {
    /// Schemas reached through requirements, in traversal order.
    pub dependencies: ResolvedDependencies,
    /// Every schema that loaded during the walk, seeds included.
    pub documents: BTreeMap<SchemaKey, SchemaDocument>,
    /// Non-fatal problems met during the walk.
    pub warnings: Vec<String>,
}

/// Walks the dependency graph of a schema store.
///
/// The [`ExtractOptions`] are fixed for the collector's lifetime, so every
/// document in one walk is interpreted with the same rules.
#[derive(Debug, Clone, Copy)]
pub struct DependencyCollector<'a> {
    store: &'a SchemaStore,
    config: &'a BundlerConfig,
    options: ExtractOptions,
}

impl<'a> DependencyCollector<'a> {
    /// Creates a collector over `store`.
    pub fn new(store: &'a SchemaStore, config: &'a BundlerConfig, options: ExtractOptions) -> Self {
        Self {
            store,
            config,
            options,
        }
    }

    /// Returns the extraction rules used by this collector.
    pub fn options(&self) -> ExtractOptions {
        self.options
    }

    /// Collects the transitive dependencies of `seeds`.
    pub fn collect(&self, seeds: &[SchemaKey]) -> CollectOutcome {
        self.collect_preloaded(seeds, BTreeMap::new())
    }

    /// Like [`collect`](Self::collect), but schemas already present in
    /// `preloaded` are taken from it instead of being inlined again.
    pub fn collect_preloaded(
        &self,
        seeds: &[SchemaKey],
        mut preloaded: BTreeMap<SchemaKey, SchemaDocument>,
    ) -> CollectOutcome {
        let mut outcome = CollectOutcome::default();
        let mut loaded: HashMap<SchemaKey, bool> = HashMap::new();
        let mut resolved: HashSet<SchemaKey> = HashSet::new();
        let mut queue: VecDeque<(SchemaKey, bool)> =
            seeds.iter().cloned().map(|key| (key, false)).collect();

        while let Some((key, required)) = queue.pop_front() {
            if !loaded.contains_key(&key) {
                let ok = self.visit(&key, preloaded.remove(&key), &mut queue, &mut outcome);
                loaded.insert(key.clone(), ok);
            }

            if required && loaded.get(&key) == Some(&true) && resolved.insert(key.clone()) {
                match key.kind {
                    SchemaKind::Type => outcome.dependencies.types.push(key.slug),
                    SchemaKind::Function => outcome.dependencies.functions.push(key.slug),
                }
            }
        }

        debug!(
            seeds = seeds.len(),
            types = outcome.dependencies.types.len(),
            functions = outcome.dependencies.functions.len(),
            "collected dependencies"
        );
        outcome
    }

    /// Collects dependencies for raw identifiers (URIs, partial URIs or bare
    /// slugs). Identifiers that cannot be resolved become warnings.
    pub fn collect_identifiers(&self, identifiers: &[&str]) -> CollectOutcome {
        let mut warnings = Vec::new();
        let mut seeds = Vec::new();
        for identifier in identifiers {
            match resolve_reference(identifier, &self.config.base_url) {
                Some(reference) => seeds.push(SchemaKey::new(reference.kind, reference.slug)),
                None => warnings.push(unresolvable_warning(identifier, None)),
            }
        }

        let mut outcome = self.collect(&seeds);
        warnings.append(&mut outcome.warnings);
        outcome.warnings = warnings;
        outcome
    }

    /// Returns the direct dependencies of `doc` as a [`DependencyNode`].
    ///
    /// Unresolvable references are skipped; duplicates are dropped.
    pub fn dependency_node(&self, key: &SchemaKey, doc: &SchemaDocument) -> DependencyNode {
        let mut seen = HashSet::new();
        let dependencies = extract_requirements(doc, self.options)
            .iter()
            .filter_map(|requirement| self.resolve(requirement))
            .map(|reference| SchemaKey::new(reference.kind, reference.slug).to_string())
            .filter(|dep| seen.insert(dep.clone()))
            .collect();
        DependencyNode {
            slug: key.slug.clone(),
            kind: key.kind,
            dependencies,
        }
    }

    fn visit(
        &self,
        key: &SchemaKey,
        preloaded: Option<SchemaDocument>,
        queue: &mut VecDeque<(SchemaKey, bool)>,
        outcome: &mut CollectOutcome,
    ) -> bool {
        let loaded = match preloaded {
            Some(doc) => Ok(doc),
            None => inline_schema(
                &self.store.schema_dir(key),
                InlineOptions::with_base_url(&self.config.base_url),
            ),
        };
        let doc = match loaded {
            Ok(doc) => doc,
            Err(err) => {
                warn!(schema = %key, error = %err, "skipping dependency that failed to load");
                outcome.warnings.push(format!("failed to load {key}: {err}"));
                return false;
            }
        };

        for requirement in extract_requirements(&doc, self.options) {
            match self.resolve(&requirement) {
                Some(reference) => {
                    queue.push_back((SchemaKey::new(reference.kind, reference.slug), true));
                }
                None => {
                    let message = unresolvable_warning(&requirement.identifier, Some(key));
                    warn!("{message}");
                    outcome.warnings.push(message);
                }
            }
        }

        outcome.documents.insert(key.clone(), doc);
        true
    }

    fn resolve(&self, requirement: &Requirement) -> Option<SchemaReference> {
        match requirement.kind_hint {
            Some(kind) => resolve_reference_as(&requirement.identifier, kind, &self.config.base_url),
            None => resolve_reference(&requirement.identifier, &self.config.base_url),
        }
    }
}

fn unresolvable_warning(identifier: &str, from: Option<&SchemaKey>) -> String {
    match from {
        Some(key) => format!("cannot resolve reference '{identifier}' in {key}"),
        None => format!("cannot resolve reference '{identifier}'"),
    }
}
