use crate::error::{Error, Result as DefinitionResult};
use crate::model::{Application, ConfigurableAttribute, ConfigurableClass, Flag};
use crate::value::Value;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Loader for application manifests.
///
/// A manifest describes one application (its classes, attributes, aliases and flags) for
/// one named documentation target. YAML (`.yaml`, `.yml`) and JSON (`.json`) are accepted.
///
/// # Example
///
/// ```no_run
/// use config_docgen::manifest::ManifestLoader;
/// use std::path::Path;
///
/// let loaded = ManifestLoader::load_file(Path::new("docs/terminal.yaml")).unwrap();
/// println!("{} documents {} classes", loaded.name, loaded.application.definitions().len());
/// ```
pub struct ManifestLoader;

/// Supported manifest encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// Picks the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Some(ManifestFormat::Yaml),
            Some("json") => Some(ManifestFormat::Json),
            _ => None,
        }
    }
}

/// A manifest loaded from disk and validated into an [`Application`].
#[derive(Debug)]
pub struct LoadedManifest {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Target name: the manifest's `name`, or the file stem
    pub name: String,
    pub preamble: Option<String>,
    pub application: Application,
}

/// Raw manifest document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    /// The application's own class name
    pub application: String,
    #[serde(default)]
    pub preamble: Option<String>,
    /// Component classes, in declaration order
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub definitions: Vec<ClassManifest>,
    /// Alias token -> `Class.attribute`
    #[serde(default)]
    pub aliases: OrderedMap<String, String>,
    #[serde(default)]
    pub flags: OrderedMap<String, FlagManifest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassManifest {
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub attributes: OrderedMap<String, AttributeManifest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeManifest {
    pub kind: String,
    #[serde(default)]
    pub help: String,
    /// Missing means unset; an explicit `null` is the null value
    #[serde(default, deserialize_with = "present_value")]
    pub default: Option<Value>,
    #[serde(default)]
    pub choices: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagManifest {
    /// Class name -> attribute name -> value
    pub config: OrderedMap<String, OrderedMap<String, Value>>,
    #[serde(default)]
    pub help: String,
}

/// A map that keeps its entries in document order.
///
/// A repeated key keeps its first position and takes the last value.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<K, V>(pub Vec<(K, V)>);

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        OrderedMap(Vec::new())
    }
}

impl<K: PartialEq, V> OrderedMap<K, V> {
    fn insert(&mut self, key: K, value: V) {
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }
}

impl<'de, K, V> Deserialize<'de> for OrderedMap<K, V>
where
    K: Deserialize<'de> + PartialEq,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedMapVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for OrderedMapVisitor<K, V>
        where
            K: Deserialize<'de> + PartialEq,
            V: Deserialize<'de>,
        {
            type Value = OrderedMap<K, V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OrderedMap::default())
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = OrderedMap(Vec::with_capacity(map.size_hint().unwrap_or(0)));
                while let Some((key, value)) = map.next_entry()? {
                    entries.insert(key, value);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Manifest {
    /// Registers every definition, alias and flag and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Definition`] if the described application is inconsistent.
    pub fn into_application(self) -> DefinitionResult<Application> {
        let mut builder = Application::builder(self.application);

        for class in self.definitions {
            let mut definition = ConfigurableClass::new(class.name);
            for parent in class.parents {
                definition = definition.with_parent(parent);
            }
            for (name, attribute) in class.attributes.0 {
                definition = definition.with_attribute(ConfigurableAttribute {
                    name,
                    kind: attribute.kind,
                    help: attribute.help,
                    default: attribute.default,
                    choices: attribute.choices,
                });
            }
            builder = builder.define(definition);
        }

        for component in self.classes {
            builder = builder.component(component);
        }

        for (token, target) in self.aliases.0 {
            builder = builder.alias(token, target);
        }

        for (token, flag) in self.flags.0 {
            let mut built = Flag::new(token).with_help(flag.help);
            for (class, settings) in flag.config.0 {
                for (attribute, value) in settings.0 {
                    built = built.set(class.clone(), attribute, value);
                }
            }
            builder = builder.flag(built);
        }

        builder.build()
    }
}

impl ManifestLoader {
    /// Parses manifest text in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestError`] if the text is not a well-formed manifest.
    pub fn parse_str(content: &str, format: ManifestFormat) -> DefinitionResult<Manifest> {
        let manifest = match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content)?,
            ManifestFormat::Json => serde_json::from_str(content)?,
        };
        Ok(manifest)
    }

    /// Loads and validates a single manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file extension is not a known manifest format
    /// - The file cannot be read
    /// - The content is not a well-formed manifest
    /// - The described application is inconsistent
    pub fn load_file(path: &Path) -> Result<LoadedManifest> {
        debug!("Loading manifest: {}", path.display());

        let format = ManifestFormat::from_path(path)
            .with_context(|| format!("Unsupported manifest extension: {}", path.display()))?;

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

        let manifest = Self::parse_str(&content, format).map_err(|e| match e {
            Error::ManifestError { message, .. } => Error::ManifestError {
                file: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        let name = match &manifest.name {
            Some(name) => name.clone(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .with_context(|| format!("Cannot derive a target name from {}", path.display()))?,
        };
        let preamble = manifest.preamble.clone();

        let application = manifest
            .into_application()
            .with_context(|| format!("Invalid application in manifest: {}", path.display()))?;

        debug!(
            "Loaded manifest {} for application {}",
            path.display(),
            application.name()
        );

        Ok(LoadedManifest {
            path: path.to_path_buf(),
            name,
            preamble,
            application,
        })
    }

    /// Loads multiple manifest files, continuing past failures.
    ///
    /// Returns one result per input path, in input order.
    pub fn load_files(paths: &[PathBuf]) -> Vec<Result<LoadedManifest>> {
        debug!("Loading {} manifests", paths.len());

        let results: Vec<Result<LoadedManifest>> = paths
            .iter()
            .map(|path| {
                let result = Self::load_file(path);
                if let Err(e) = &result {
                    warn!("Failed to load {}: {:#}", path.display(), e);
                }
                result
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Loading complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    const YAML_MANIFEST: &str = r#"
application: App
classes: [Shell]
definitions:
  - name: Shell
    attributes:
      zeta:
        kind: Int
        default: 3
      alpha:
        kind: Unicode
        default: null
      beta:
        kind: List
  - name: App
    parents: [Shell]
aliases:
  z: Shell.zeta
  alpha: Shell.alpha
flags:
  debug:
    config:
      Shell: {zeta: true}
    help: Turn on debugging.
"#;

    #[test]
    fn test_parse_yaml_manifest_preserves_order() {
        let manifest = ManifestLoader::parse_str(YAML_MANIFEST, ManifestFormat::Yaml).unwrap();

        assert_eq!(manifest.application, "App");
        let attribute_names: Vec<&str> = manifest.definitions[0]
            .attributes
            .0
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(attribute_names, vec!["zeta", "alpha", "beta"]);

        let tokens: Vec<&str> = manifest.aliases.0.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, vec!["z", "alpha"]);
    }

    #[test]
    fn test_default_null_differs_from_missing() {
        let manifest = ManifestLoader::parse_str(YAML_MANIFEST, ManifestFormat::Yaml).unwrap();
        let attributes = &manifest.definitions[0].attributes.0;

        assert_eq!(attributes[0].1.default, Some(Value::Int(3)));
        assert_eq!(attributes[1].1.default, Some(Value::Null));
        assert_eq!(attributes[2].1.default, None);
    }

    #[test]
    fn test_into_application() {
        let manifest = ManifestLoader::parse_str(YAML_MANIFEST, ManifestFormat::Yaml).unwrap();
        let app = manifest.into_application().unwrap();

        assert_eq!(app.component_classes(), ["App".to_string(), "Shell".to_string()]);
        assert_eq!(app.aliases().len(), 2);
        assert_eq!(app.flags()[0].name, "debug");
        assert_eq!(app.flags()[0].help, "Turn on debugging.");
        assert!(app.flags()[0].config[0].1[0].1.is_true());
    }

    #[test]
    fn test_parse_json_manifest() {
        let json = r#"{
            "application": "Kernel",
            "definitions": [
                {"name": "Kernel", "attributes": {
                    "ports": {"kind": "Tuple", "default": {"$tuple": [1, 2]}}
                }}
            ]
        }"#;
        let app = ManifestLoader::parse_str(json, ManifestFormat::Json)
            .unwrap()
            .into_application()
            .unwrap();

        let kernel = app.class("Kernel").unwrap();
        assert_eq!(
            kernel.attributes()[0].default,
            Some(Value::Tuple(vec![Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result =
            ManifestLoader::parse_str("application: App\nbogus: 1\n", ManifestFormat::Yaml);
        assert!(matches!(result, Err(Error::ManifestError { .. })));
    }

    #[test]
    fn test_repeated_alias_key_takes_last_target() {
        let json = r#"{
            "application": "App",
            "aliases": {"v": "App.x", "q": "App.q", "v": "App.y"}
        }"#;
        let app = ManifestLoader::parse_str(json, ManifestFormat::Json)
            .unwrap()
            .into_application()
            .unwrap();
        assert_eq!(
            app.aliases(),
            [
                ("v".to_string(), "App.y".to_string()),
                ("q".to_string(), "App.q".to_string()),
            ]
        );

        let yaml = "application: App\naliases:\n  v: App.x\n  v: App.y\n";
        let manifest = ManifestLoader::parse_str(yaml, ManifestFormat::Yaml).unwrap();
        assert_eq!(manifest.aliases.0, vec![("v".to_string(), "App.y".to_string())]);
    }

    #[test]
    fn test_repeated_flag_setting_takes_last_value() {
        let json = r#"{
            "application": "App",
            "definitions": [{"name": "App", "attributes": {"pdb": {"kind": "Bool"}}}],
            "flags": {"pdb": {"config": {"App": {"pdb": false, "pdb": true}}}}
        }"#;
        let app = ManifestLoader::parse_str(json, ManifestFormat::Json)
            .unwrap()
            .into_application()
            .unwrap();

        let flag = &app.flags()[0];
        assert_eq!(flag.config[0].1, vec![("pdb".to_string(), Value::Bool(true))]);
        assert_eq!(
            crate::aliases::AliasResolver::promoted_target(flag),
            Some("App.pdb".to_string())
        );
    }

    #[test]
    fn test_load_file_uses_file_stem_as_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(&temp_dir, "terminal.yaml", YAML_MANIFEST);

        let loaded = ManifestLoader::load_file(&path).unwrap();
        assert_eq!(loaded.name, "terminal");
        assert_eq!(loaded.path, path);
        assert!(loaded.preamble.is_none());
    }

    #[test]
    fn test_load_file_prefers_manifest_name() {
        let temp_dir = TempDir::new().unwrap();
        let content = "name: kernel\npreamble: Hello.\napplication: App\n";
        let path = create_temp_file(&temp_dir, "whatever.yml", content);

        let loaded = ManifestLoader::load_file(&path).unwrap();
        assert_eq!(loaded.name, "kernel");
        assert_eq!(loaded.preamble.as_deref(), Some("Hello."));
    }

    #[test]
    fn test_load_file_reports_path_on_syntax_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(&temp_dir, "broken.json", "{ not json");

        let err = ManifestLoader::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_load_file_rejects_invalid_definition() {
        let temp_dir = TempDir::new().unwrap();
        let content = "application: App\nclasses: [Missing]\n";
        let path = create_temp_file(&temp_dir, "bad.yaml", content);

        let err = ManifestLoader::load_file(&path).unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("component class 'Missing' is not defined"));
    }

    #[test]
    fn test_load_file_rejects_unknown_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(&temp_dir, "app.toml", "application = 'App'");
        assert!(ManifestLoader::load_file(&path).is_err());
    }

    #[test]
    fn test_load_files_continues_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_temp_file(&temp_dir, "good.yaml", "application: App\n");
        let bad = create_temp_file(&temp_dir, "bad.yaml", "application: [\n");

        let results = ManifestLoader::load_files(&[bad, good]);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
    }
}
