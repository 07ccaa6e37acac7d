//! Loading `.thrift` source trees into a [`Schema`].
//!
//! Includes are resolved relative to the including file, then against the
//! configured search paths. Include cycles are rejected. A module's name is
//! its file stem (`shared.thrift` → `shared`), which is also the qualifier
//! for cross-module references (`shared.Person`).

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use thriftrun_core::Schema;

use crate::{
    error::{IdlError, ResolveError, ResolveErrors},
    lex::tokenize,
    parser::parse_document,
    resolver::{ModuleSource, resolve_modules},
};

/// Loads a root IDL file and its transitive includes, producing a [`Schema`].
#[derive(Debug, Default)]
pub struct Loader {
    search_paths: Vec<PathBuf>,
    allow_legacy_negative_ids: bool,
    warnings: Vec<String>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additional directories consulted when a relative include is not found
    /// next to the including file.
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Accept explicit non-positive field ids instead of rejecting them.
    pub fn allow_legacy_negative_ids(mut self, allow: bool) -> Self {
        self.allow_legacy_negative_ids = allow;
        self
    }

    /// Warnings collected by the most recent load (auto-assigned field ids).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Load a root `.thrift` file and everything it includes.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Schema, IdlError> {
        let mut loading = Loading {
            loader: self,
            modules: Vec::new(),
            seen: HashSet::new(),
            chain: Vec::new(),
        };
        loading.load_file(path.as_ref())?;
        let modules = loading.modules;
        self.finish(modules)
    }

    /// Load IDL from an in-memory string. `name` is the module name;
    /// includes are resolved against the search paths only.
    pub fn load_str(&mut self, name: &str, text: &str) -> Result<Schema, IdlError> {
        let mut loading = Loading {
            loader: self,
            modules: Vec::new(),
            seen: HashSet::new(),
            chain: Vec::new(),
        };
        loading.load_source(name, None, text)?;
        let modules = loading.modules;
        self.finish(modules)
    }

    fn finish(&mut self, modules: Vec<ModuleSource>) -> Result<Schema, IdlError> {
        let (schema, warnings) = resolve_modules(&modules, self.allow_legacy_negative_ids)?;
        self.warnings = warnings;
        Ok(schema)
    }
}

/// State for one recursive load.
struct Loading<'a> {
    loader: &'a Loader,
    /// Postorder: includes land before their includers.
    modules: Vec<ModuleSource>,
    seen: HashSet<String>,
    chain: Vec<String>,
}

impl Loading<'_> {
    fn load_file(&mut self, path: &Path) -> Result<(), IdlError> {
        let name = module_name(path);
        if self.seen.contains(&name) {
            if self.chain.contains(&name) {
                let mut chain = self.chain.clone();
                chain.push(name);
                return Err(ResolveErrors::from(ResolveError::IncludeCycle { chain }).into());
            }
            return Ok(());
        }
        let text = std::fs::read_to_string(path)?;
        self.load_source(&name, Some(path.to_path_buf()), &text)
    }

    fn load_source(
        &mut self,
        name: &str,
        path: Option<PathBuf>,
        text: &str,
    ) -> Result<(), IdlError> {
        let file = path
            .as_deref()
            .map_or_else(|| name.to_string(), |p| p.display().to_string());

        self.seen.insert(name.to_string());
        self.chain.push(name.to_string());

        let tokens = tokenize(text).map_err(|source| IdlError::Lex {
            file: file.clone(),
            source,
        })?;
        let doc = parse_document(&tokens).map_err(|source| IdlError::Parse {
            file: file.clone(),
            source,
        })?;

        let mut includes = Vec::new();
        for include in doc.includes() {
            let target = self.find_include(include, path.as_deref()).ok_or_else(|| {
                ResolveErrors::from(ResolveError::IncludeNotFound {
                    path: include.to_string(),
                    from: file.clone(),
                })
            })?;
            includes.push(module_name(&target));
            self.load_file(&target)?;
        }

        self.chain.pop();
        self.modules.push(ModuleSource {
            name: name.to_string(),
            path,
            doc,
            includes,
        });
        Ok(())
    }

    /// Relative to the including file first, then the search paths.
    fn find_include(&self, include: &str, from: Option<&Path>) -> Option<PathBuf> {
        if let Some(dir) = from.and_then(Path::parent) {
            let candidate = dir.join(include);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        for dir in &self.loader.search_paths {
            let candidate = dir.join(include);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
