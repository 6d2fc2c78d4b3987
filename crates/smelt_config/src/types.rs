//! Configuration types deserialized from `smelt.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use smelt_deps::{CyclePolicy, GraphOptions, MissingPolicy, DEFAULT_MAX_DEPTH};
use std::collections::BTreeMap;
use std::path::Path;

/// The top-level project configuration parsed from `smelt.toml`.
///
/// Every table is optional; a missing table takes the same values as
/// [`ProjectConfig::default`], which is also what a project without a
/// `smelt.toml` builds with.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata and source discovery settings.
    #[serde(default)]
    pub project: ProjectMeta,
    /// Compiler program per source extension (without the leading dot).
    #[serde(default = "default_compilers")]
    pub compilers: BTreeMap<String, String>,
    /// Extra compile flags per compiler program.
    #[serde(default)]
    pub compiler_args: BTreeMap<String, Vec<String>>,
    /// Link step settings.
    #[serde(default)]
    pub link: LinkConfig,
    /// Include-dependency tracking policies.
    #[serde(default)]
    pub deps: DepsConfig,
}

/// Project metadata and source discovery settings.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name, used in status output.
    #[serde(default)]
    pub name: String,
    /// Main entry file, relative to the project root. The executable is
    /// written next to it with the extension removed.
    #[serde(default = "default_main")]
    pub main: String,
    /// Extensions of translation units to discover (e.g. `"cpp"`).
    #[serde(
        default = "default_sources",
        deserialize_with = "deserialize_string_or_vec"
    )]
    pub sources: Vec<String>,
    /// Glob patterns for paths to leave out of discovery. A pattern ending
    /// in `/` excludes everything below that directory.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub excludes: Vec<String>,
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            main: default_main(),
            sources: default_sources(),
            excludes: Vec::new(),
        }
    }
}

/// Settings for the final link step.
#[derive(Debug, Default, Deserialize)]
pub struct LinkConfig {
    /// Arguments appended after the object files (e.g. `-lm`).
    #[serde(default)]
    pub args: Vec<String>,
}

/// Include-dependency tracking policies.
#[derive(Debug, Deserialize)]
pub struct DepsConfig {
    /// Maximum include depth before a build is aborted.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// How include cycles are handled.
    #[serde(default)]
    pub cycles: CyclePolicy,
    /// How missing headers are handled.
    #[serde(default)]
    pub missing: MissingPolicy,
}

impl Default for DepsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            cycles: CyclePolicy::default(),
            missing: MissingPolicy::default(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project: ProjectMeta::default(),
            compilers: default_compilers(),
            compiler_args: BTreeMap::new(),
            link: LinkConfig::default(),
            deps: DepsConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Returns the compiler configured for `path`'s extension, if any.
    ///
    /// Keys may be written with or without a leading dot.
    pub fn compiler_for(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?;
        self.compilers
            .get(ext)
            .or_else(|| self.compilers.get(&format!(".{ext}")))
            .map(String::as_str)
    }

    /// Returns the extra compile flags configured for `compiler`.
    pub fn compiler_args_for(&self, compiler: &str) -> &[String] {
        self.compiler_args
            .get(compiler)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Converts the `[deps]` table into dependency graph options.
    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            max_depth: self.deps.max_depth,
            cycles: self.deps.cycles,
            missing: self.deps.missing,
        }
    }
}

fn default_main() -> String {
    "main.cpp".to_string()
}

fn default_sources() -> Vec<String> {
    vec!["cpp".to_string()]
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_compilers() -> BTreeMap<String, String> {
    [("cpp", "g++"), ("c++", "g++"), ("c", "gcc")]
        .into_iter()
        .map(|(ext, cc)| (ext.to_string(), cc.to_string()))
        .collect()
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `sources = "cpp"` as shorthand for `sources = ["cpp"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
