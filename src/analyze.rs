//! Dependency closure analysis - unmet dependencies and unneeded packages

use std::collections::HashSet;

use tracing::debug;

use crate::status::{DepKind, PackageId, PackageIndex};

/// A dependency group no installed package satisfies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmetDependency {
    /// Name of the package requiring the group
    pub package: String,
    pub kind: DepKind,
    /// Original alternative names in declared order, `" | "`-joined
    pub requires: String,
}

/// Result of one diagnosis run
#[derive(Debug, Default)]
pub struct Diagnosis {
    pub unmet: Vec<UnmetDependency>,
    /// Installed packages outside the closure, as (name, installed size in
    /// bytes), sorted by name
    pub unneeded: Vec<(String, u64)>,
}

/// Walks the dependency graph of a read-only package snapshot
pub struct Analyzer<'a> {
    index: &'a PackageIndex,
}

impl<'a> Analyzer<'a> {
    pub fn new(index: &'a PackageIndex) -> Self {
        Analyzer { index }
    }

    /// Compute the closure of every manually installed package and derive
    /// the unmet-dependency and unneeded-package reports
    pub fn run(&self) -> Diagnosis {
        let mut installed = HashSet::new();
        let mut needed = HashSet::new();
        let mut unmet = Vec::new();

        for (id, pkg) in self.index.iter() {
            if pkg.is_installed() {
                installed.insert(id);
                if pkg.manually_installed() {
                    self.add_recursive(id, &mut needed, &mut unmet);
                }
            }
        }

        let mut unneeded: Vec<(String, u64)> = installed
            .difference(&needed)
            .map(|&id| {
                let pkg = self.index.get(id);
                let size = pkg
                    .installed
                    .as_ref()
                    .map(|v| v.installed_size)
                    .unwrap_or(0);
                (pkg.name.clone(), size)
            })
            .collect();
        // difference() iterates in hash order; fix it here so the result is
        // deterministic before the formatter ever sees it
        unneeded.sort();

        debug!(
            installed = installed.len(),
            needed = needed.len(),
            unmet = unmet.len(),
            "diagnosis complete"
        );

        Diagnosis {
            unmet,
            unneeded,
        }
    }

    /// The concrete package treated as satisfying a dependency on `target`
    ///
    /// Never fails: if nothing satisfies the dependency the target comes
    /// back unchanged and the caller re-checks its install state.
    pub fn resolve_provider(&self, target: PackageId) -> PackageId {
        let pkg = self.index.get(target);
        if pkg.is_installed() {
            return target;
        }
        if !pkg.providers.is_empty() {
            for &provider in &pkg.providers {
                if self.index.get(provider).is_installed() {
                    return provider;
                }
            }
            if !pkg.has_version() {
                // purely virtual with no installed provider: fall back to
                // the first declared provider; the caller sees it is not
                // installed and reports accordingly
                return pkg.providers[0];
            }
        }
        target
    }

    /// Mark `id` and everything transitively needed to satisfy its
    /// Depends/Pre-Depends/Recommends groups
    pub fn add_recursive(
        &self,
        id: PackageId,
        needed: &mut HashSet<PackageId>,
        unmet: &mut Vec<UnmetDependency>,
    ) {
        if !needed.insert(id) {
            return;
        }
        let Some(installed) = self.index.get(id).installed.as_ref() else {
            return;
        };

        for group in &installed.depends {
            if !DepKind::CLOSURE_KINDS.contains(&group.kind) {
                continue;
            }

            // at least one alternative has to be installed to satisfy the
            // group; expand the first that is
            let mut found = false;
            for &target in &group.alternatives {
                let resolved = self.resolve_provider(target);
                if self.index.get(resolved).is_installed() {
                    self.add_recursive(resolved, needed, unmet);
                    found = true;
                    break;
                }
            }
            if !found {
                unmet.push(UnmetDependency {
                    package: self.index.get(id).name.clone(),
                    kind: group.kind,
                    requires: group
                        .alternatives
                        .iter()
                        .map(|&t| self.index.get(t).name.as_str())
                        .collect::<Vec<_>>()
                        .join(" | "),
                });
            }
        }
    }
}
