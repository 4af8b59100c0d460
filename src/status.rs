//! dpkg status database - reading the package snapshot

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::error::{DoctorError, Result};

/// Detect the dpkg administrative directory on this system
pub fn admin_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DPKG_ADMINDIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from("/var/lib/dpkg")
}

/// Detect the apt state directory (holds extended_states)
pub fn apt_state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("APT_STATE_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from("/var/lib/apt")
}

/// Index of a package inside a [`PackageIndex`] snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(u32);

impl PackageId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Dependency relationship kinds recorded by dpkg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepKind {
    Depends,
    PreDepends,
    Recommends,
    Suggests,
    Breaks,
    Conflicts,
    Enhances,
    Replaces,
}

impl DepKind {
    /// Kinds that pull packages into the dependency closure.
    /// Everything else is informational and never drives traversal.
    pub const CLOSURE_KINDS: [DepKind; 3] =
        [DepKind::Depends, DepKind::PreDepends, DepKind::Recommends];

    pub fn short_code(self) -> &'static str {
        match self {
            DepKind::Depends => "dep",
            DepKind::PreDepends => "pre",
            DepKind::Recommends => "rec",
            DepKind::Suggests => "sug",
            DepKind::Breaks => "bre",
            DepKind::Conflicts => "con",
            DepKind::Enhances => "enh",
            DepKind::Replaces => "rep",
        }
    }

    fn from_field(name: &str) -> Option<DepKind> {
        match name {
            "Depends" => Some(DepKind::Depends),
            "Pre-Depends" => Some(DepKind::PreDepends),
            "Recommends" => Some(DepKind::Recommends),
            "Suggests" => Some(DepKind::Suggests),
            "Breaks" => Some(DepKind::Breaks),
            "Conflicts" => Some(DepKind::Conflicts),
            "Enhances" => Some(DepKind::Enhances),
            "Replaces" => Some(DepKind::Replaces),
            _ => None,
        }
    }
}

/// Two-character dpkg state code (want + state), as shown by `dpkg -l`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCode {
    pub want: char,
    pub state: char,
}

impl StateCode {
    pub fn code(&self) -> String {
        format!("{}{}", self.want, self.state)
    }

    /// Removed, but configuration files remain on disk
    pub fn is_residual(&self) -> bool {
        self.want == 'r' && self.state == 'c'
    }

    /// Unpacked and configured
    pub fn is_installed(&self) -> bool {
        self.state == 'i'
    }

    /// The ordinary `ii` state
    pub fn is_fully_installed(&self) -> bool {
        self.want == 'i' && self.state == 'i'
    }

    fn parse(field: &str) -> Result<StateCode> {
        let mut words = field.split_whitespace();
        let (want, _eflag, state) = match (words.next(), words.next(), words.next()) {
            (Some(w), Some(e), Some(s)) => (w, e, s),
            _ => {
                return Err(DoctorError::MalformedDatabase(format!(
                    "bad Status field: {field:?}"
                )));
            }
        };
        let want = match want {
            "unknown" => 'u',
            "install" => 'i',
            "hold" => 'h',
            "deinstall" => 'r',
            "purge" => 'p',
            other => {
                return Err(DoctorError::MalformedDatabase(format!(
                    "unknown selection state: {other:?}"
                )));
            }
        };
        let state = match state {
            "not-installed" => 'n',
            "config-files" => 'c',
            "half-installed" => 'H',
            "unpacked" => 'U',
            "half-configured" => 'F',
            "triggers-awaited" => 'W',
            "triggers-pending" => 't',
            "installed" => 'i',
            other => {
                return Err(DoctorError::MalformedDatabase(format!(
                    "unknown package state: {other:?}"
                )));
            }
        };
        Ok(StateCode { want, state })
    }
}

/// One OR-group of dependency alternatives on an installed version
#[derive(Debug, Clone)]
pub struct DependencyGroup {
    pub kind: DepKind,
    /// Alternatives in declared order; satisfying any one satisfies the group
    pub alternatives: Vec<PackageId>,
}

/// Data recorded for the currently installed version of a package
#[derive(Debug, Clone)]
pub struct InstalledVersion {
    pub version: String,
    /// Installed-Size converted from KiB to bytes
    pub installed_size: u64,
    pub depends: Vec<DependencyGroup>,
}

/// A package known to the snapshot
///
/// Purely virtual names (mentioned only as a dependency or Provides target)
/// get an entry with no state, no version and no installed record.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub state: Option<StateCode>,
    /// Version from the stanza, recorded for any state (residual packages
    /// keep the version their config files came from)
    pub version: Option<String>,
    pub installed: Option<InstalledVersion>,
    pub auto_installed: bool,
    /// Packages whose Provides field names this package, in encounter order
    pub providers: Vec<PackageId>,
}

impl Package {
    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    /// Installed and not flagged Auto-Installed by apt
    pub fn manually_installed(&self) -> bool {
        self.is_installed() && !self.auto_installed
    }

    /// A concrete version exists; false means the name is purely virtual
    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }
}

/// Read-only snapshot of the package database
pub struct PackageIndex {
    packages: Vec<Package>,
    by_name: HashMap<String, PackageId>,
}

impl PackageIndex {
    /// Load the system databases from the standard locations
    /// (or their environment overrides)
    pub fn load() -> Result<Self> {
        Self::load_from(&admin_dir(), &apt_state_dir())
    }

    /// Load from explicit directories: `<admindir>/status` plus an optional
    /// `<apt_state>/extended_states`
    pub fn load_from(admindir: &Path, apt_state: &Path) -> Result<Self> {
        let status_path = admindir.join("status");
        let status = fs::read_to_string(&status_path)
            .with_context(|| format!("Failed to read status database: {}", status_path.display()))?;

        // extended_states is absent on systems where apt never marked
        // anything automatic; every package is then manual
        let extended = fs::read_to_string(apt_state.join("extended_states")).ok();

        Self::parse(&status, extended.as_deref())
    }

    /// Build a snapshot from in-memory database contents
    pub fn parse(status: &str, extended_states: Option<&str>) -> Result<Self> {
        let mut index = PackageIndex {
            packages: Vec::new(),
            by_name: HashMap::new(),
        };

        for stanza in split_stanzas(status) {
            index.add_stanza(&stanza)?;
        }

        if let Some(extended) = extended_states {
            for name in auto_installed_names(extended) {
                if let Some(id) = index.lookup(&name) {
                    index.packages[id.idx()].auto_installed = true;
                }
            }
        }

        debug!(packages = index.packages.len(), "parsed package database");
        Ok(index)
    }

    pub fn get(&self, id: PackageId) -> &Package {
        &self.packages[id.idx()]
    }

    pub fn lookup(&self, name: &str) -> Option<PackageId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// All packages in id order (the deterministic scan order)
    pub fn iter(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, p)| (PackageId(i as u32), p))
    }

    fn intern(&mut self, name: &str) -> PackageId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = PackageId(self.packages.len() as u32);
        self.packages.push(Package {
            name: name.to_string(),
            state: None,
            version: None,
            installed: None,
            auto_installed: false,
            providers: Vec::new(),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn add_stanza(&mut self, fields: &[(String, String)]) -> Result<()> {
        let name = match field(fields, "Package") {
            Some(name) => name.to_string(),
            None => {
                return Err(DoctorError::MalformedDatabase(
                    "stanza without a Package field".into(),
                ));
            }
        };
        let state = match field(fields, "Status") {
            Some(value) => StateCode::parse(value)?,
            None => {
                return Err(DoctorError::MalformedDatabase(format!(
                    "{name}: stanza without a Status field"
                )));
            }
        };
        let version = field(fields, "Version").map(str::to_string);

        let id = self.intern(&name);

        // Multi-arch: a later stanza for the same name never downgrades an
        // installed record to a non-installed one
        if self.packages[id.idx()].is_installed() && state.state != 'i' {
            return Ok(());
        }

        self.packages[id.idx()].state = Some(state);
        if version.is_some() {
            self.packages[id.idx()].version = version.clone();
        }

        if state.state == 'i' {
            let installed_size = match field(fields, "Installed-Size") {
                Some(raw) => {
                    let kib: u64 = raw.trim().parse().map_err(|_| {
                        DoctorError::MalformedDatabase(format!(
                            "{name}: bad Installed-Size: {raw:?}"
                        ))
                    })?;
                    kib * 1024
                }
                None => 0,
            };

            let mut depends = Vec::new();
            for (key, value) in fields {
                if let Some(kind) = DepKind::from_field(key) {
                    for group in parse_target_list(value) {
                        let alternatives =
                            group.iter().map(|alt| self.intern(alt)).collect();
                        depends.push(DependencyGroup { kind, alternatives });
                    }
                }
            }

            self.packages[id.idx()].installed = Some(InstalledVersion {
                version: version.unwrap_or_default(),
                installed_size,
                depends,
            });
        }

        if let Some(provides) = field(fields, "Provides") {
            for target in provides.split(',') {
                let target = target_name(target);
                if target.is_empty() {
                    continue;
                }
                let target_id = self.intern(&target);
                if !self.packages[target_id.idx()].providers.contains(&id) {
                    self.packages[target_id.idx()].providers.push(id);
                }
            }
        }

        Ok(())
    }
}

fn field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Split an RFC-822-style database into stanzas of (field, value) pairs,
/// folding continuation lines into the preceding field
fn split_stanzas(contents: &str) -> Vec<Vec<(String, String)>> {
    let mut stanzas = Vec::new();
    let mut current: Vec<(String, String)> = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                stanzas.push(std::mem::take(&mut current));
            }
            continue;
        }
        if (line.starts_with(' ') || line.starts_with('\t'))
            && let Some((_, value)) = current.last_mut()
        {
            value.push(' ');
            value.push_str(line.trim());
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            current.push((key.trim().to_string(), value.trim().to_string()));
        }
        // lines without a colon that are not continuations are skipped
    }
    if !current.is_empty() {
        stanzas.push(current);
    }
    stanzas
}

/// Parse a dependency field value into OR-groups of target names
fn parse_target_list(value: &str) -> Vec<Vec<String>> {
    value
        .split(',')
        .filter_map(|group| {
            let alternatives: Vec<String> = group
                .split('|')
                .map(target_name)
                .filter(|name| !name.is_empty())
                .collect();
            if alternatives.is_empty() {
                None
            } else {
                Some(alternatives)
            }
        })
        .collect()
}

/// Extract the bare package name from one dependency alternative,
/// dropping version restrictions, architecture qualifiers and build profiles
fn target_name(alternative: &str) -> String {
    let alternative = alternative.trim();
    let end = alternative
        .find(|c: char| c.is_whitespace() || c == '(' || c == '[' || c == '<')
        .unwrap_or(alternative.len());
    let name = &alternative[..end];
    name.split(':').next().unwrap_or(name).to_string()
}

/// Names flagged Auto-Installed in apt's extended_states file
fn auto_installed_names(contents: &str) -> Vec<String> {
    let mut names = Vec::new();
    for stanza in split_stanzas(contents) {
        let auto = field(&stanza, "Auto-Installed")
            .map(|v| v.trim() == "1")
            .unwrap_or(false);
        if auto && let Some(name) = field(&stanza, "Package") {
            names.push(name.to_string());
        }
    }
    names
}
