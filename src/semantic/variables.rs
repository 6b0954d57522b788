//! `$variable` expansion.
//!
//! A value like `Row_$i` expands to the set of concrete strings reachable
//! from the query site: `<define>` attributes, `<foreach>` loop variables
//! and `<styleselector>` selections in the enclosing scope, crossing form
//! boundaries backwards through every site that instantiates the enclosing
//! form. Termination: a visited set over `(uri, element offset)` during
//! the scope walk, a refusal to substitute a variable by a value containing
//! that same variable, and a hard round cap as backstop.

use std::collections::HashSet;
use std::sync::Arc;

use crate::base::Location;
use crate::core::text_utils::is_variable_character;
use crate::documents::DocumentManager;
use crate::model::ClassModel;
use crate::syntax::NodeId;

use super::definitions::DefineValue;
use super::scope::ScopeResolver;

/// Variables the runtime provides everywhere; never reported as missing.
pub const WELL_KNOWN_GLOBALS: &[&str] = &[
    "frame", "APPNAME", "APPVERSION", "LANGUAGE", "PLATFORM", "LOCALE", "index", "this",
    "parent",
];

/// URL placeholder variables, stripped from Uri-typed values.
pub const WELL_KNOWN_URL_LOCATIONS: &[&str] =
    &["SYSTEM", "TEMP", "HOME", "APPDATA", "RESOURCES", "CACHE"];

/// One variable-defining site found during the scope walk.
#[derive(Debug, Clone)]
struct DefineSite {
    name: String,
    values: Vec<DefineValue>,
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Concrete(String),
    Variable(String),
}

/// Expands `$` tokens against the lexical scope of a query site.
pub struct VariableResolver<'a> {
    scope: &'a mut ScopeResolver,
    docs: &'a mut DocumentManager,
    model: Option<&'a ClassModel>,
}

impl<'a> VariableResolver<'a> {
    pub fn new(
        scope: &'a mut ScopeResolver,
        docs: &'a mut DocumentManager,
        model: Option<&'a ClassModel>,
    ) -> Self {
        Self { scope, docs, model }
    }

    /// All concrete expansions of `value` at the query site. When the
    /// expansion cannot complete, the original value is returned alone so
    /// callers can decide to accept it silently.
    pub fn resolve(&mut self, uri: &str, node: NodeId, value: &str) -> Vec<String> {
        if !value.contains('$') {
            return vec![value.to_string()];
        }
        let sites = self.collect_sites(uri, node);

        let mut worlds = vec![tokenize(value)];
        let mut complete: Vec<String> = Vec::new();
        let mut rounds = 0usize;

        while let Some(world) = worlds.pop() {
            rounds += 1;
            if rounds > 4096 {
                tracing::debug!("variable expansion aborted for {value}");
                break;
            }
            let var_at = world
                .iter()
                .position(|t| matches!(t, Tok::Variable(_)));
            let Some(index) = var_at else {
                let rendered = render(&world);
                if !complete.contains(&rendered) {
                    complete.push(rendered);
                }
                continue;
            };
            let Tok::Variable(name) = world[index].clone() else {
                continue;
            };

            let needle = format!("${name}");
            let candidates: Vec<(String, String)> = self
                .candidates_for(&sites, &name)
                .into_iter()
                .filter(|(value, _, _)| !value.contains(&needle))
                .map(|(value, postfix, _)| (value, postfix))
                .collect();
            if candidates.is_empty() {
                continue;
            }
            for (value, postfix) in candidates {
                let mut next = world[..index].to_vec();
                next.extend(tokenize(&format!("{value}{postfix}")));
                next.extend_from_slice(&world[index + 1..]);
                if worlds.len() < 256 {
                    worlds.push(next);
                }
            }
        }

        if complete.is_empty() {
            vec![value.to_string()]
        } else {
            complete
        }
    }

    /// Variable names visible at the query site whose name starts with
    /// `prefix` (the text typed after the last `$`). Includes the theme
    /// metric tree as `Theme.<metric>`.
    pub fn variables_in_scope(&mut self, uri: &str, node: NodeId, prefix: &str) -> Vec<String> {
        let sites = self.collect_sites(uri, node);
        let mut names: Vec<String> = Vec::new();
        for site in &sites {
            if site.name.starts_with(prefix) && !names.contains(&site.name) {
                names.push(site.name.clone());
            }
        }
        if let Some(model) = self.model {
            for metric in model.theme_metric_names() {
                let name = format!("Theme.{metric}");
                if name.starts_with(prefix) && !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names.sort();
        names
    }

    /// Locations of the define sites matching a `$token`. With
    /// `force_exact`, only whole-name matches count; otherwise the usual
    /// longest-name (minimum postfix) rule applies.
    pub fn find_define_sites(
        &mut self,
        uri: &str,
        node: NodeId,
        token: &str,
        force_exact: bool,
    ) -> Vec<Location> {
        let name = token.trim_start_matches('$');
        let sites = self.collect_sites(uri, node);
        let mut locations = Vec::new();
        if force_exact {
            for site in &sites {
                if site.name == name {
                    for value in &site.values {
                        if !locations.contains(&value.location) {
                            locations.push(value.location.clone());
                        }
                    }
                }
            }
        } else {
            for (_, _, location) in self.candidates_for(&sites, name) {
                if let Some(location) = location {
                    if !locations.contains(&location) {
                        locations.push(location);
                    }
                }
            }
        }
        locations
    }

    /// Candidate expansions of one variable name: `(value, concrete
    /// postfix, defining location)`, already reduced to the minimum-postfix
    /// group.
    fn candidates_for(
        &self,
        sites: &[DefineSite],
        name: &str,
    ) -> Vec<(String, String, Option<Location>)> {
        let mut candidates: Vec<(String, String, Option<Location>)> = Vec::new();
        for site in sites {
            let postfix = if site.name == name {
                String::new()
            } else if let Some(rest) = name.strip_prefix(site.name.as_str()) {
                rest.to_string()
            } else {
                continue;
            };
            for value in &site.values {
                candidates.push((
                    value.value.clone(),
                    postfix.clone(),
                    Some(value.location.clone()),
                ));
            }
        }
        if let Some(model) = self.model {
            if let Some(rest) = name.strip_prefix("Theme.") {
                // Longest metric name wins.
                for metric in model.theme_metric_names() {
                    if let Some(postfix) = rest.strip_prefix(metric) {
                        if let Some(value) = model.theme_metric(metric) {
                            candidates.push((value.to_string(), postfix.to_string(), None));
                        }
                        break;
                    }
                }
            }
        }

        let Some(min) = candidates.iter().map(|(_, p, _)| p.len()).min() else {
            return candidates;
        };
        candidates.retain(|(_, p, _)| p.len() == min);
        candidates
    }

    /// Walk the scope chain collecting define sites: preceding-sibling
    /// `<define>`s at every level, enclosing `<foreach>`/`<styleselector>`
    /// elements, and — at a `<Form>` boundary — every site in the pack
    /// that instantiates the form.
    fn collect_sites(&mut self, uri: &str, node: NodeId) -> Vec<DefineSite> {
        let mut sites: Vec<DefineSite> = Vec::new();
        let mut visited: HashSet<(Arc<str>, usize)> = HashSet::new();
        let mut work: Vec<(Arc<str>, NodeId)> = vec![(Arc::from(uri), node)];

        while let Some((uri, node)) = work.pop() {
            let Some(state) = self.docs.get(&uri) else {
                continue;
            };
            let doc = state.document.clone();
            if node.index() >= doc.node_count() {
                continue;
            }
            if !visited.insert((uri.clone(), doc.node(node).start)) {
                continue;
            }
            let namespace = self.scope.namespace_of(&uri, self.docs, self.model);

            let mut current = node;
            loop {
                for &sibling in doc.preceding_siblings(current).iter().rev() {
                    let sib = doc.node(sibling);
                    if sib.is_element() && sib.name == "define" {
                        for attr in &sib.attrs {
                            push_site(
                                &mut sites,
                                attr.name.clone(),
                                DefineValue {
                                    value: wrap_expression_markers(&attr.value),
                                    location: Location::new(
                                        uri.clone(),
                                        state.range_at(attr.value_start, attr.value_end),
                                    ),
                                },
                            );
                        }
                    }
                }

                let Some(parent) = doc.node(current).parent else {
                    break;
                };
                let p = doc.node(parent);
                if p.is_element() {
                    match p.name.as_str() {
                        "foreach" => {
                            let location = Location::new(
                                uri.clone(),
                                state.range_at(p.start, p.open_end),
                            );
                            if let Some(var) = p.attr_value("variable") {
                                let name = var.trim_start_matches('$').to_string();
                                for value in foreach_values(
                                    p.attr_value("in"),
                                    p.attr_value("start"),
                                    p.attr_value("count"),
                                ) {
                                    push_site(
                                        &mut sites,
                                        name.clone(),
                                        DefineValue {
                                            value,
                                            location: location.clone(),
                                        },
                                    );
                                }
                            }
                        }
                        "styleselector" => {
                            let location = Location::new(
                                uri.clone(),
                                state.range_at(p.start, p.open_end),
                            );
                            if let Some(var) = p.attr_value("variable") {
                                let name = var.trim_start_matches('$').to_string();
                                for style in
                                    p.attr_value("styles").unwrap_or("").split_whitespace()
                                {
                                    let qualified =
                                        if style.contains('/') || namespace.is_empty() {
                                            style.to_string()
                                        } else {
                                            format!("{namespace}/{style}")
                                        };
                                    push_site(
                                        &mut sites,
                                        name.clone(),
                                        DefineValue {
                                            value: qualified,
                                            location: location.clone(),
                                        },
                                    );
                                }
                            }
                        }
                        "Form" => {
                            if let Some(form_name) = p.attr_value("name") {
                                let instantiations = self.scope.instantiation_sites(
                                    &uri, form_name, self.docs, self.model,
                                );
                                for site in instantiations {
                                    work.push(site);
                                }
                            }
                        }
                        _ => {}
                    }
                }
                current = parent;
            }
        }

        sites
    }
}

fn push_site(sites: &mut Vec<DefineSite>, name: String, value: DefineValue) {
    match sites.iter_mut().find(|s| s.name == name) {
        Some(site) => {
            if !site.values.contains(&value) {
                site.values.push(value);
            }
        }
        None => sites.push(DefineSite {
            name,
            values: vec![value],
        }),
    }
}

/// Values a `<foreach>` binds its variable to.
fn foreach_values(
    list: Option<&str>,
    start: Option<&str>,
    count: Option<&str>,
) -> Vec<String> {
    if let Some(list) = list {
        return list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let (Some(start), Some(count)) = (start, count) {
        if let (Ok(s), Ok(c)) = (start.trim().parse::<i64>(), count.trim().parse::<i64>()) {
            if (0..=100).contains(&c) {
                return (0..c).map(|i| (s + i).to_string()).collect();
            }
        }
        return vec![format!("@foreach:({start},{count})")];
    }
    Vec::new()
}

/// `@eval:`/`@select:` expressions get parentheses when missing, so later
/// substitution keeps the expression a single unit.
fn wrap_expression_markers(value: &str) -> String {
    for marker in ["@eval:", "@select:"] {
        if let Some(rest) = value.strip_prefix(marker) {
            if !rest.starts_with('(') {
                return format!("{marker}({rest})");
            }
        }
    }
    value.to_string()
}

fn tokenize(value: &str) -> Vec<Tok> {
    let bytes = value.as_bytes();
    let mut toks = Vec::new();
    let mut concrete_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let name_start = i + 1;
            let mut end = name_start;
            while end < bytes.len() && is_variable_character(bytes[end] as char) {
                end += 1;
            }
            if end > name_start {
                if concrete_start < i {
                    toks.push(Tok::Concrete(value[concrete_start..i].to_string()));
                }
                toks.push(Tok::Variable(value[name_start..end].to_string()));
                concrete_start = end;
                i = end;
                continue;
            }
        }
        i += 1;
    }
    if concrete_start < bytes.len() {
        toks.push(Tok::Concrete(value[concrete_start..].to_string()));
    }
    toks
}

fn render(world: &[Tok]) -> String {
    world
        .iter()
        .map(|t| match t {
            Tok::Concrete(s) => s.as_str(),
            Tok::Variable(_) => "",
        })
        .collect()
}
