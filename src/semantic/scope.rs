//! Cross-file reference scope.
//!
//! A skin pack is rooted at the nearest ancestor directory holding a
//! `skin.xml`. Scope iteration visits the queried file first, then its
//! include graph depth-first, then every other file of the pack; imports
//! (`<Import url="@pack"/>`) splice another pack's root and includes in.
//! Files included under a foreign namespace are skipped unless the query
//! allows them.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::base::Location;
use crate::documents::DocumentManager;
use crate::model::{AttrTypeMask, ClassModel};
use crate::project::{Clock, FileSystem, RepoConfig};
use crate::syntax::NodeId;

use super::definitions::{DefinitionKind, ExternalPattern};
use super::file_info::SkinFileInfo;
use super::variables::VariableResolver;

/// Options steering a scope query.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeOptions {
    /// Visit files brought in under other namespaces too (completion).
    pub allow_foreign_namespaces: bool,
    /// Variable lookups match whole names only.
    pub force_exact: bool,
    /// Keep names fully qualified in results (`form.name` completion).
    pub force_qualified: bool,
}

impl ScopeOptions {
    pub fn foreign() -> Self {
        Self {
            allow_foreign_namespaces: true,
            ..Self::default()
        }
    }
}

/// One definition found in scope.
#[derive(Debug, Clone)]
pub struct FoundDefinition {
    pub name: String,
    pub kind: DefinitionKind,
    pub location: Location,
    pub is_override: bool,
    /// Synthesized from an `<External>` pattern match.
    pub external: bool,
}

/// A name matched by an external pattern but not strictly defined;
/// reported at the skin root if still unresolved.
#[derive(Debug, Clone)]
pub struct ExternalRequest {
    pub name: String,
    pub kind: DefinitionKind,
    /// The attribute value that requested the name.
    pub location: Location,
    /// The `<External>` element whose pattern matched.
    pub pattern_location: Location,
}

/// Owns every per-file index and answers scope queries.
pub struct ScopeResolver {
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    platform: Option<String>,
    repo_root: Option<PathBuf>,
    config: RepoConfig,
    files: HashMap<Arc<str>, SkinFileInfo>,
    skin_root_cache: HashMap<PathBuf, Option<PathBuf>>,
    regex_cache: HashMap<String, Regex>,
    pub external_requests: Vec<ExternalRequest>,
}

impl ScopeResolver {
    pub fn new(fs: Arc<dyn FileSystem>, clock: Arc<dyn Clock>, platform: Option<String>) -> Self {
        Self {
            fs,
            clock,
            platform,
            repo_root: None,
            config: RepoConfig::default(),
            files: HashMap::new(),
            skin_root_cache: HashMap::new(),
            regex_cache: HashMap::new(),
            external_requests: Vec::new(),
        }
    }

    pub fn set_repo(&mut self, root: Option<PathBuf>, config: RepoConfig) {
        self.repo_root = root;
        self.config = config;
        self.skin_root_cache.clear();
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    pub fn info(&self, uri: &str) -> Option<&SkinFileInfo> {
        self.files.get(uri)
    }

    /// Directory of the skin pack containing `uri` (nearest ancestor with
    /// a `skin.xml`).
    pub fn skin_root_dir(&mut self, uri: &str) -> Option<PathBuf> {
        let start = Path::new(uri).parent()?.to_path_buf();
        if let Some(cached) = self.skin_root_cache.get(&start) {
            return cached.clone();
        }
        let mut result = None;
        let mut dir = Some(start.clone());
        while let Some(d) = dir {
            if self.fs.exists(&d.join("skin.xml")) {
                result = Some(d);
                break;
            }
            dir = d.parent().map(Path::to_path_buf);
        }
        self.skin_root_cache.insert(start, result.clone());
        result
    }

    /// Build or refresh one file's index. Refreshes are gated to once per
    /// 500 ms and skipped when the document version is unchanged.
    pub fn ensure_info(
        &mut self,
        uri: &str,
        namespace: Option<String>,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) {
        let now = self.clock.now();
        if let Some(existing) = self.files.get_mut(uri) {
            if let Some(ns) = namespace {
                if existing.namespace != ns {
                    existing.namespace = ns;
                }
            }
            if !existing.refresh_due(now) {
                return;
            }
            let Some(state) = docs.get(uri) else {
                return;
            };
            if state.version == existing.version {
                existing.last_refresh = Some(now);
                return;
            }
            let ns = existing.namespace.clone();
            let mut info =
                SkinFileInfo::build(&state, ns, self.platform.as_deref(), model);
            info.last_refresh = Some(now);
            tracing::debug!("reindexed {uri}");
            self.files.insert(info.uri.clone(), info);
            return;
        }

        let Some(state) = docs.get(uri) else {
            return;
        };
        let mut info = SkinFileInfo::build(
            &state,
            namespace.unwrap_or_default(),
            self.platform.as_deref(),
            model,
        );
        info.last_refresh = Some(now);
        self.files.insert(info.uri.clone(), info);
    }

    /// Namespace the pack assigns to a file (empty for the root).
    pub fn namespace_of(
        &mut self,
        uri: &str,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> String {
        if let Some(info) = self.files.get(uri) {
            return info.namespace.clone();
        }
        self.scope_uris(uri, &ScopeOptions::foreign(), docs, model);
        self.files
            .get(uri)
            .map(|i| i.namespace.clone())
            .unwrap_or_default()
    }

    /// Namespace-qualify a value. Values already containing `/` stay; a
    /// leading `/` selects the empty namespace explicitly; colors and
    /// fonts never qualify.
    pub fn qualify_name(kind: DefinitionKind, value: &str, namespace: &str) -> String {
        if !kind.is_qualifiable() {
            return value.to_string();
        }
        if let Some(rest) = value.strip_prefix('/') {
            return rest.to_string();
        }
        if value.contains('/') || namespace.is_empty() {
            return value.to_string();
        }
        format!("{namespace}/{value}")
    }

    /// Ordered URIs in scope of `uri`: the file itself, its include graph
    /// depth-first, then the rest of its pack (root graph included).
    pub fn scope_uris(
        &mut self,
        uri: &str,
        options: &ScopeOptions,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> Vec<Arc<str>> {
        let uri_key: Arc<str> = Arc::from(uri);
        let Some(root_dir) = self.skin_root_dir(uri) else {
            self.ensure_info(uri, None, docs, model);
            return if self.files.contains_key(uri) {
                vec![uri_key]
            } else {
                Vec::new()
            };
        };

        // Root-first walk assigns namespaces to every reachable file.
        let root_uri = path_to_uri(&root_dir.join("skin.xml"));
        let mut pack_order: Vec<Arc<str>> = Vec::new();
        let mut pack_visited: HashSet<Arc<str>> = HashSet::new();
        self.walk_includes(
            &root_uri,
            String::new(),
            &root_dir,
            &mut pack_order,
            &mut pack_visited,
            docs,
            model,
        );
        for path in self.xml_files_under(&root_dir) {
            let file_uri = path_to_uri(&path);
            if !pack_visited.contains(&file_uri) {
                self.ensure_info(&file_uri, Some(String::new()), docs, model);
                if self.files.contains_key(&file_uri) {
                    pack_visited.insert(file_uri.clone());
                    pack_order.push(file_uri);
                }
            }
        }

        // The queried file first, then its own include graph.
        let mut order: Vec<Arc<str>> = Vec::new();
        let mut visited: HashSet<Arc<str>> = HashSet::new();
        self.ensure_info(uri, None, docs, model);
        let own_namespace = self
            .files
            .get(uri)
            .map(|i| i.namespace.clone())
            .unwrap_or_default();
        self.walk_includes(
            &uri_key,
            own_namespace.clone(),
            &root_dir,
            &mut order,
            &mut visited,
            docs,
            model,
        );
        for file_uri in pack_order {
            if visited.insert(file_uri.clone()) {
                order.push(file_uri);
            }
        }

        if !options.allow_foreign_namespaces && !own_namespace.is_empty() {
            // From inside a namespace, sibling namespaces are foreign; the
            // base namespace (and the root's view of everything) is not.
            order.retain(|u| {
                self.files
                    .get(u)
                    .map(|info| {
                        info.namespace.is_empty() || info.namespace == own_namespace
                    })
                    .unwrap_or(false)
            });
        }
        order
    }

    /// Whether a file is reachable from its pack root's include graph
    /// (the root itself counts).
    pub fn is_in_include_graph(
        &mut self,
        uri: &str,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> bool {
        let Some(root_dir) = self.skin_root_dir(uri) else {
            return false;
        };
        let root_uri = path_to_uri(&root_dir.join("skin.xml"));
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        self.walk_includes(
            &root_uri,
            String::new(),
            &root_dir,
            &mut order,
            &mut visited,
            docs,
            model,
        );
        visited.iter().any(|u| u.as_ref() == uri)
    }

    /// Depth-first include/import traversal from one file.
    #[allow(clippy::too_many_arguments)]
    fn walk_includes(
        &mut self,
        uri: &Arc<str>,
        namespace: String,
        pack_root: &Path,
        order: &mut Vec<Arc<str>>,
        visited: &mut HashSet<Arc<str>>,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) {
        if !visited.insert(uri.clone()) {
            return;
        }
        self.ensure_info(uri, Some(namespace.clone()), docs, model);
        let Some(info) = self.files.get(uri.as_ref()) else {
            return;
        };
        order.push(uri.clone());
        let includes = info.includes.clone();

        for include in includes {
            let resolved = if include.imported {
                self.resolve_import_url(&include.url)
            } else {
                self.resolve_include_url(&include.url, pack_root)
            };
            let Some(path) = resolved else {
                // Missing imported files contribute nothing to scope.
                continue;
            };
            if !self.fs.exists(&path) {
                continue;
            }
            let child_namespace = if include.namespace.is_empty() {
                namespace.clone()
            } else {
                include.namespace.clone()
            };
            let child_root = if include.imported {
                path.parent().map(Path::to_path_buf)
            } else {
                None
            };
            let child_uri = path_to_uri(&path);
            self.walk_includes(
                &child_uri,
                child_namespace,
                child_root.as_deref().unwrap_or(pack_root),
                order,
                visited,
                docs,
                model,
            );
        }
    }

    fn xml_files_under(&self, dir: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let mut stack = vec![(dir.to_path_buf(), 0usize)];
        while let Some((dir, depth)) = stack.pop() {
            if depth > 16 {
                continue;
            }
            let Ok(entries) = self.fs.read_dir(&dir) else {
                continue;
            };
            for entry in entries {
                if self.fs.is_dir(&entry) {
                    stack.push((entry, depth + 1));
                } else if entry.extension().map(|e| e == "xml").unwrap_or(false) {
                    out.push(entry);
                }
            }
        }
        out.sort();
        out
    }

    // ========================================================================
    // URI RESOLUTION
    // ========================================================================

    /// Resolve an include URL: `@pack` goes through the configured skins
    /// locations, anything else is pack-root relative with `../` collapsed.
    pub fn resolve_include_url(&mut self, url: &str, pack_root: &Path) -> Option<PathBuf> {
        if let Some(pack) = url.strip_prefix('@') {
            return self.resolve_pack(pack);
        }
        Some(normalize_path(&pack_root.join(url)))
    }

    fn resolve_import_url(&mut self, url: &str) -> Option<PathBuf> {
        match url.strip_prefix('@') {
            Some(pack) => self.resolve_pack(pack),
            None => self.resolve_pack(url),
        }
    }

    /// `<skins location>/<pack>/skin.xml`, first existing location wins.
    pub fn resolve_pack(&self, pack: &str) -> Option<PathBuf> {
        let root = self.repo_root.as_deref()?;
        for location in self.config.skins_locations(root) {
            let candidate = location.join(pack).join("skin.xml");
            if self.fs.exists(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Resolve a Uri-typed attribute value against the referencing file.
    pub fn resolve_value_uri(&self, value: &str, base_uri: &str) -> Option<PathBuf> {
        if let Some(pack) = value.strip_prefix('@') {
            return self.resolve_pack(pack);
        }
        let base = Path::new(base_uri).parent()?;
        Some(normalize_path(&base.join(value)))
    }

    /// Skin-pack names available under the configured skins locations.
    pub fn available_packs(&self) -> Vec<String> {
        let Some(root) = self.repo_root.as_deref() else {
            return Vec::new();
        };
        let mut packs = Vec::new();
        for location in self.config.skins_locations(root) {
            let Ok(entries) = self.fs.read_dir(&location) else {
                continue;
            };
            for entry in entries {
                if self.fs.exists(&entry.join("skin.xml")) {
                    if let Some(name) = entry.file_name().and_then(|n| n.to_str()) {
                        if !packs.iter().any(|p| p == name) {
                            packs.push(name.to_string());
                        }
                    }
                }
            }
        }
        packs.sort();
        packs
    }

    // ========================================================================
    // DEFINITION QUERIES
    // ========================================================================

    /// Locate the definition(s) of a value. With several hits and exactly
    /// one `override="true"`, the override wins. Unmatched values fall
    /// back to the pack's external patterns.
    #[allow(clippy::too_many_arguments)]
    pub fn lookup_definition(
        &mut self,
        kind: DefinitionKind,
        value: &str,
        uri: &str,
        node: Option<NodeId>,
        options: &ScopeOptions,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> Vec<FoundDefinition> {
        self.lookup_inner(kind, value, uri, node, options, true, false, docs, model)
    }

    pub fn is_defined(
        &mut self,
        kind: DefinitionKind,
        value: &str,
        uri: &str,
        node: Option<NodeId>,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> bool {
        !self
            .lookup_inner(
                kind,
                value,
                uri,
                node,
                &ScopeOptions::default(),
                true,
                true,
                docs,
                model,
            )
            .is_empty()
    }

    pub fn is_defined_strict(
        &mut self,
        kind: DefinitionKind,
        value: &str,
        uri: &str,
        node: Option<NodeId>,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> bool {
        !self
            .lookup_inner(
                kind,
                value,
                uri,
                node,
                &ScopeOptions::default(),
                false,
                true,
                docs,
                model,
            )
            .is_empty()
    }

    #[allow(clippy::too_many_arguments)]
    fn lookup_inner(
        &mut self,
        kind: DefinitionKind,
        value: &str,
        uri: &str,
        node: Option<NodeId>,
        options: &ScopeOptions,
        use_externals: bool,
        first_only: bool,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> Vec<FoundDefinition> {
        if kind == DefinitionKind::Variable {
            let Some(node) = node else {
                return Vec::new();
            };
            let locations = VariableResolver::new(self, docs, model).find_define_sites(
                uri,
                node,
                value,
                options.force_exact,
            );
            return locations
                .into_iter()
                .map(|location| FoundDefinition {
                    name: value.to_string(),
                    kind,
                    location,
                    is_override: false,
                    external: false,
                })
                .collect();
        }

        let own_namespace = self.namespace_of(uri, docs, model);
        let qualified = Self::qualify_name(kind, value, &own_namespace);
        let uris = self.scope_uris(uri, options, docs, model);

        let mut results = Vec::new();
        for file_uri in uris {
            let Some(info) = self.files.get(&file_uri) else {
                continue;
            };
            if kind == DefinitionKind::Color {
                if let Some(range) = info.lookup_color_range(value) {
                    results.push(FoundDefinition {
                        name: value.to_string(),
                        kind,
                        location: Location::new(file_uri.clone(), range),
                        is_override: false,
                        external: false,
                    });
                    if first_only {
                        return results;
                    }
                    continue;
                }
            }
            if let Some(entry) = info.lookup(kind, &qualified) {
                results.push(FoundDefinition {
                    name: qualified.clone(),
                    kind,
                    location: Location::new(file_uri.clone(), entry.range),
                    is_override: entry.is_override,
                    external: false,
                });
                if first_only {
                    return results;
                }
            }
        }

        if results.len() > 1 && results.iter().filter(|r| r.is_override).count() == 1 {
            results.retain(|r| r.is_override);
        }

        if results.is_empty() && use_externals {
            for (pattern, regex) in self.external_patterns(uri, docs, model) {
                if regex.is_match(value) {
                    results.push(FoundDefinition {
                        name: value.to_string(),
                        kind,
                        location: pattern.location.clone(),
                        is_override: false,
                        external: true,
                    });
                    break;
                }
            }
        }
        results
    }

    /// Deduplicated `(name, kind)` pairs for completion. Names in the
    /// querying file's own namespace lose their prefix unless qualification
    /// is forced.
    pub fn find_definitions(
        &mut self,
        kinds: &[DefinitionKind],
        uri: &str,
        options: &ScopeOptions,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> Vec<(String, DefinitionKind)> {
        let own_namespace = self.namespace_of(uri, docs, model);
        let uris = self.scope_uris(uri, options, docs, model);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for file_uri in uris {
            let Some(info) = self.files.get(&file_uri) else {
                continue;
            };
            for &kind in kinds {
                for name in info.definition_names(kind) {
                    let qualified = if !kind.is_qualifiable() || info.namespace.is_empty() {
                        name.to_string()
                    } else {
                        format!("{}/{}", info.namespace, name)
                    };
                    let display = if options.force_qualified {
                        qualified
                    } else if own_namespace.is_empty() {
                        qualified
                    } else {
                        match qualified.strip_prefix(&format!("{own_namespace}/")) {
                            Some(rest) => rest.to_string(),
                            None => qualified,
                        }
                    };
                    if seen.insert((display.clone(), kind)) {
                        out.push((display, kind));
                    }
                }
            }
        }
        out
    }

    /// Names another namespace defines for an unqualified value, rendered
    /// qualified — drives "Did you mean NS/Name?".
    pub fn find_qualified_candidates(
        &mut self,
        kind: DefinitionKind,
        bare: &str,
        uri: &str,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> Vec<String> {
        let uris = self.scope_uris(uri, &ScopeOptions::foreign(), docs, model);
        let mut out = Vec::new();
        for file_uri in uris {
            let Some(info) = self.files.get(&file_uri) else {
                continue;
            };
            if info.definition_names(kind).iter().any(|n| *n == bare) {
                let qualified = if info.namespace.is_empty() {
                    bare.to_string()
                } else {
                    format!("{}/{}", info.namespace, bare)
                };
                if !out.contains(&qualified) {
                    out.push(qualified);
                }
            }
        }
        out
    }

    /// Every site in the pack that instantiates the named form.
    pub fn instantiation_sites(
        &mut self,
        uri: &str,
        form_name: &str,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> Vec<(Arc<str>, NodeId)> {
        let own_namespace = self.namespace_of(uri, docs, model);
        let form_qualified =
            Self::qualify_name(DefinitionKind::Form, form_name, &own_namespace);
        let uris = self.scope_uris(uri, &ScopeOptions::foreign(), docs, model);

        let mut out = Vec::new();
        for file_uri in uris {
            let Some(info) = self.files.get(&file_uri) else {
                continue;
            };
            for (key, instantiations) in &info.view_instantiations {
                if Self::qualify_name(DefinitionKind::Form, key, &info.namespace)
                    == form_qualified
                {
                    for inst in instantiations {
                        out.push((file_uri.clone(), inst.node));
                    }
                }
            }
        }
        out
    }

    // ========================================================================
    // EXTERNAL PATTERNS
    // ========================================================================

    /// Compiled external patterns of the pack containing `uri`.
    pub fn external_patterns(
        &mut self,
        uri: &str,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) -> Vec<(ExternalPattern, Regex)> {
        let Some(root_dir) = self.skin_root_dir(uri) else {
            return Vec::new();
        };
        let root_uri = path_to_uri(&root_dir.join("skin.xml"));
        self.ensure_info(&root_uri, Some(String::new()), docs, model);
        let patterns = self
            .files
            .get(root_uri.as_ref())
            .map(|info| info.externals.clone())
            .unwrap_or_default();
        patterns
            .into_iter()
            .filter_map(|p| {
                let regex = self.compiled_glob(&p.pattern)?;
                Some((p, regex))
            })
            .collect()
    }

    fn compiled_glob(&mut self, pattern: &str) -> Option<Regex> {
        if let Some(regex) = self.regex_cache.get(pattern) {
            return Some(regex.clone());
        }
        let regex = Regex::new(&glob_to_regex(pattern)).ok()?;
        self.regex_cache.insert(pattern.to_string(), regex.clone());
        Some(regex)
    }

    /// Scan the whole pack for attribute values matched by an external
    /// pattern but not strictly defined; the checker reports what remains
    /// unresolved when validating the root.
    pub fn scan_external_requests(
        &mut self,
        uri: &str,
        docs: &mut DocumentManager,
        model: Option<&ClassModel>,
    ) {
        self.external_requests.clear();
        let Some(model_ref) = model else {
            return;
        };
        let patterns = self.external_patterns(uri, docs, model);
        if patterns.is_empty() {
            return;
        }
        let uris = self.scope_uris(uri, &ScopeOptions::foreign(), docs, model);

        let mut pending: Vec<(DefinitionKind, String, Arc<str>, Location, Location)> =
            Vec::new();
        for file_uri in uris {
            let Some(state) = docs.get(&file_uri) else {
                continue;
            };
            let doc = state.document.clone();
            for id in doc.all_nodes() {
                let node = doc.node(id);
                if !node.is_element() {
                    continue;
                }
                for attr in &node.attrs {
                    if attr.value.is_empty() {
                        continue;
                    }
                    let Some(ty) = model_ref.find_attribute_type(&node.name, &attr.name)
                    else {
                        continue;
                    };
                    let Some(kind) = definition_kind_for_mask(ty.mask) else {
                        continue;
                    };
                    let matched = patterns
                        .iter()
                        .find(|(_, regex)| regex.is_match(&attr.value));
                    if let Some((pattern, _)) = matched {
                        pending.push((
                            kind,
                            attr.value.clone(),
                            file_uri.clone(),
                            Location::new(
                                file_uri.clone(),
                                state.range_at(attr.value_start, attr.value_end),
                            ),
                            pattern.location.clone(),
                        ));
                    }
                }
            }
        }

        for (kind, value, file_uri, location, pattern_location) in pending {
            if self.is_defined_strict(kind, &value, &file_uri, None, docs, model) {
                continue;
            }
            if self
                .external_requests
                .iter()
                .any(|r| r.name == value && r.kind == kind)
            {
                continue;
            }
            self.external_requests.push(ExternalRequest {
                name: value,
                kind,
                location,
                pattern_location,
            });
        }
    }
}

/// The definition kind a value-typed attribute references, if any.
fn definition_kind_for_mask(mask: AttrTypeMask) -> Option<DefinitionKind> {
    if mask.intersects(AttrTypeMask::STYLE | AttrTypeMask::STYLE_ARRAY) {
        Some(DefinitionKind::Style)
    } else if mask.contains(AttrTypeMask::IMAGE) {
        Some(DefinitionKind::Image)
    } else if mask.contains(AttrTypeMask::SHAPE) {
        Some(DefinitionKind::Shape)
    } else if mask.contains(AttrTypeMask::FONT) {
        Some(DefinitionKind::Font)
    } else if mask.contains(AttrTypeMask::FORM) {
        Some(DefinitionKind::Form)
    } else if mask.contains(AttrTypeMask::COLOR) {
        Some(DefinitionKind::Color)
    } else {
        None
    }
}

/// Glob → anchored regex; `*` is the only wildcard, everything else is
/// literal. Patterns for `$`-variables stay open-ended at the end.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '?' | '|' | '\\'
            | '-' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    if !pattern.starts_with('$') {
        out.push('$');
    }
    out
}

/// Collapse `.` and `..` components without touching the filesystem.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn path_to_uri(path: &Path) -> Arc<str> {
    Arc::from(path.to_string_lossy().as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{NoOverlay, OsFileSystem, SystemClock};
    use std::fs;

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn setup(clock: Arc<dyn Clock>) -> (tempfile::TempDir, ScopeResolver, DocumentManager) {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ScopeResolver::new(Arc::new(OsFileSystem), clock, None);
        let docs = DocumentManager::new(Arc::new(OsFileSystem), Arc::new(NoOverlay));
        (dir, resolver, docs)
    }

    #[test]
    fn test_glob_to_regex() {
        assert_eq!(glob_to_regex("dyn.*"), "^dyn\\..*$");
        assert_eq!(glob_to_regex("$var*"), "^\\$var.*");
        let regex = Regex::new(&glob_to_regex("dynamic.*")).unwrap();
        assert!(regex.is_match("dynamic.one"));
        assert!(!regex.is_match("dynamicXone"));
        assert!(!regex.is_match("prefix dynamic.one"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./d.xml")),
            PathBuf::from("/a/c/d.xml")
        );
    }

    #[test]
    fn test_scope_and_namespaces() {
        let (dir, mut resolver, mut docs) = setup(Arc::new(SystemClock));
        let pack = dir.path().join("MyPack");
        write(
            &pack.join("skin.xml"),
            r#"<Skin>
                 <Include name="NS" url="sub/extra.xml"/>
                 <Styles><Style name="RootStyle"/></Styles>
               </Skin>"#,
        );
        write(
            &pack.join("sub/extra.xml"),
            r#"<Skin><Styles><Style name="SubStyle"/></Styles></Skin>"#,
        );

        let root_uri = pack.join("skin.xml").to_string_lossy().to_string();
        let sub_uri = pack.join("sub/extra.xml").to_string_lossy().to_string();

        let uris = resolver.scope_uris(&root_uri, &ScopeOptions::foreign(), &mut docs, None);
        assert_eq!(uris.len(), 2);
        assert_eq!(resolver.namespace_of(&sub_uri, &mut docs, None), "NS");

        // Qualified lookup from the root reaches into the namespace.
        let hits = resolver.lookup_definition(
            DefinitionKind::Style,
            "NS/SubStyle",
            &root_uri,
            None,
            &ScopeOptions::default(),
            &mut docs,
            None,
        );
        assert_eq!(hits.len(), 1);

        // From inside the namespace the bare name resolves.
        let hits = resolver.lookup_definition(
            DefinitionKind::Style,
            "SubStyle",
            &sub_uri,
            None,
            &ScopeOptions::default(),
            &mut docs,
            None,
        );
        assert_eq!(hits.len(), 1);

        // From inside a namespace, root definitions need the explicit
        // empty-namespace prefix.
        assert!(resolver.is_defined(
            DefinitionKind::Style,
            "/RootStyle",
            &sub_uri,
            None,
            &mut docs,
            None
        ));
        assert!(!resolver.is_defined_strict(
            DefinitionKind::Style,
            "RootStyle",
            &sub_uri,
            None,
            &mut docs,
            None
        ));
    }

    #[test]
    fn test_override_wins() {
        let (dir, mut resolver, mut docs) = setup(Arc::new(SystemClock));
        let pack = dir.path().join("Pack");
        write(
            &pack.join("skin.xml"),
            r#"<Skin>
                 <Include url="a.xml"/>
                 <Include url="b.xml"/>
               </Skin>"#,
        );
        write(
            &pack.join("a.xml"),
            r#"<Skin><Styles><Style name="X"/></Styles></Skin>"#,
        );
        write(
            &pack.join("b.xml"),
            r#"<Skin><Styles><Style name="X" override="true"/></Styles></Skin>"#,
        );

        let root_uri = pack.join("skin.xml").to_string_lossy().to_string();
        let hits = resolver.lookup_definition(
            DefinitionKind::Style,
            "X",
            &root_uri,
            None,
            &ScopeOptions::default(),
            &mut docs,
            None,
        );
        assert_eq!(hits.len(), 1);
        assert!(hits[0].is_override);
        assert!(hits[0].location.uri.ends_with("b.xml"));
    }

    #[test]
    fn test_external_pattern_fallback() {
        let (dir, mut resolver, mut docs) = setup(Arc::new(SystemClock));
        let pack = dir.path().join("Pack");
        write(
            &pack.join("skin.xml"),
            r#"<Skin><Externals><External name="dynamic.*"/></Externals></Skin>"#,
        );

        let root_uri = pack.join("skin.xml").to_string_lossy().to_string();
        let hits = resolver.lookup_definition(
            DefinitionKind::Style,
            "dynamic.header",
            &root_uri,
            None,
            &ScopeOptions::default(),
            &mut docs,
            None,
        );
        assert_eq!(hits.len(), 1);
        assert!(hits[0].external);

        assert!(resolver.is_defined(
            DefinitionKind::Style,
            "dynamic.header",
            &root_uri,
            None,
            &mut docs,
            None
        ));
        assert!(!resolver.is_defined_strict(
            DefinitionKind::Style,
            "dynamic.header",
            &root_uri,
            None,
            &mut docs,
            None
        ));
    }

    #[test]
    fn test_import_splices_other_pack() {
        let (dir, mut resolver, mut docs) = setup(Arc::new(SystemClock));
        let skins = dir.path().join("skins");
        write(
            &skins.join("Main/skin.xml"),
            r#"<Skin><Import url="@Common"/></Skin>"#,
        );
        write(
            &skins.join("Common/skin.xml"),
            r#"<Skin><Styles><Style name="Shared"/></Styles></Skin>"#,
        );
        write(&dir.path().join("repo.json"), r#"{ "skins": ["skins/"] }"#);

        resolver.set_repo(Some(dir.path().to_path_buf()), RepoConfig::default());
        let root_uri = skins.join("Main/skin.xml").to_string_lossy().to_string();
        assert!(resolver.is_defined(
            DefinitionKind::Style,
            "Shared",
            &root_uri,
            None,
            &mut docs,
            None
        ));
    }

    #[test]
    fn test_available_packs() {
        let (dir, mut resolver, _docs) = setup(Arc::new(SystemClock));
        let skins = dir.path().join("skins");
        write(&skins.join("A/skin.xml"), "<Skin></Skin>");
        write(&skins.join("B/skin.xml"), "<Skin></Skin>");
        write(&skins.join("NotAPack/other.xml"), "<Skin></Skin>");

        resolver.set_repo(Some(dir.path().to_path_buf()), RepoConfig::default());
        assert_eq!(resolver.available_packs(), vec!["A", "B"]);
    }
}
