//! Application object model: configurable classes, their attributes, aliases and flags.
//!
//! There is no runtime introspection to discover what an application can be configured
//! with, so every class is registered explicitly through an [`ApplicationBuilder`], either
//! in code or from a manifest (see [`crate::manifest`]). [`ApplicationBuilder::build`]
//! validates the definition once; everything downstream can rely on a consistent
//! [`Application`].
//!
//! # Example
//!
//! ```
//! use config_docgen::model::{Application, ConfigurableAttribute, ConfigurableClass, Flag};
//! use config_docgen::value::Value;
//!
//! let app = Application::builder("App")
//!     .define(
//!         ConfigurableClass::new("App").with_attribute(
//!             ConfigurableAttribute::new("verbose", "Bool")
//!                 .with_help("Print more output.")
//!                 .with_default(false),
//!         ),
//!     )
//!     .flag(Flag::new("v").set("App", "verbose", Value::Bool(true)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(app.component_classes(), ["App".to_string()]);
//! ```

use crate::error::{Error, Result};
use crate::value::Value;
use log::debug;
use std::collections::{HashMap, HashSet};

/// A single configurable attribute declared on a class.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurableAttribute {
    /// Attribute name, unique within its class
    pub name: String,
    /// Type tag, e.g. `Unicode`, `Int`, `CaselessStrEnum`
    pub kind: String,
    /// Free-form help text
    pub help: String,
    /// Default value; `None` means the default is unset
    pub default: Option<Value>,
    /// Legal values, only for enumerated kinds
    pub choices: Option<Vec<Value>>,
}

impl ConfigurableAttribute {
    /// Create an attribute with no help, no default and no choices
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            help: String::new(),
            default: None,
            choices: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Whether the type tag names an enumerated kind (`Enum`, `CaselessStrEnum`, ...)
    pub fn is_enumerated(&self) -> bool {
        self.kind.contains("Enum")
    }
}

/// A class that may declare configurable attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurableClass {
    /// Class name, unique within an application
    pub name: String,
    /// Direct parent classes, in declaration order
    pub parents: Vec<String>,
    attributes: Vec<ConfigurableAttribute>,
}

impl ConfigurableClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn with_attribute(mut self, attribute: ConfigurableAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Attributes declared directly on this class, in declaration order
    pub fn attributes(&self) -> &[ConfigurableAttribute] {
        &self.attributes
    }

    /// Attributes declared directly on this class, sorted by name
    pub fn sorted_attributes(&self) -> Vec<&ConfigurableAttribute> {
        let mut sorted: Vec<&ConfigurableAttribute> = self.attributes.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
    }

    /// Fully-qualified `Class.attribute` name
    pub fn qualified_name(&self, attribute: &ConfigurableAttribute) -> String {
        format!("{}.{}", self.name, attribute.name)
    }
}

/// A command-line switch that applies a partial configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    /// The switch token, without dashes
    pub name: String,
    /// Payload: class name -> attribute name -> value, in declaration order
    pub config: Vec<(String, Vec<(String, Value)>)>,
    /// Help text; its first line is logged when aliases are resolved
    pub help: String,
}

impl Flag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Vec::new(),
            help: String::new(),
        }
    }

    /// Add `class.attribute = value` to the payload.
    ///
    /// Setting the same attribute again replaces the earlier value in place.
    pub fn set(
        mut self,
        class: impl Into<String>,
        attribute: impl Into<String>,
        value: Value,
    ) -> Self {
        let class = class.into();
        let attribute = attribute.into();
        match self.config.iter_mut().find(|(name, _)| *name == class) {
            Some((_, settings)) => match settings.iter_mut().find(|(name, _)| *name == attribute) {
                Some((_, existing)) => *existing = value,
                None => settings.push((attribute, value)),
            },
            None => self.config.push((class, vec![(attribute, value)])),
        }
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// First non-blank line of the help text, or `no help` when there is none
    pub fn summary(&self) -> &str {
        self.help
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("no help")
    }
}

/// A validated application definition.
#[derive(Debug, Clone)]
pub struct Application {
    name: String,
    components: Vec<String>,
    definitions: Vec<ConfigurableClass>,
    index: HashMap<String, usize>,
    aliases: Vec<(String, String)>,
    flags: Vec<Flag>,
}

impl Application {
    /// Start registering an application whose own class is called `name`
    pub fn builder(name: impl Into<String>) -> ApplicationBuilder {
        ApplicationBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classes the application is configured through, in documentation root order.
    ///
    /// The application's own class comes first when it is itself a registered class.
    pub fn component_classes(&self) -> &[String] {
        &self.components
    }

    /// Look up a registered class by name
    pub fn class(&self, name: &str) -> Option<&ConfigurableClass> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    /// All registered classes, in registration order
    pub fn definitions(&self) -> &[ConfigurableClass] {
        &self.definitions
    }

    /// Explicit alias table: token -> `Class.attribute`
    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }
}

/// Collects class definitions, aliases and flags and validates them into an [`Application`].
#[derive(Debug, Clone)]
pub struct ApplicationBuilder {
    name: String,
    components: Vec<String>,
    definitions: Vec<ConfigurableClass>,
    aliases: Vec<(String, String)>,
    flags: Vec<Flag>,
}

impl ApplicationBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            definitions: Vec::new(),
            aliases: Vec::new(),
            flags: Vec::new(),
        }
    }

    /// Register a class definition
    pub fn define(mut self, class: ConfigurableClass) -> Self {
        self.definitions.push(class);
        self
    }

    /// Declare a component class the application is configured through
    pub fn component(mut self, class_name: impl Into<String>) -> Self {
        self.components.push(class_name.into());
        self
    }

    /// Declare an alias token for a `Class.attribute` target.
    ///
    /// A token declared again is retargeted and keeps its original position.
    pub fn alias(mut self, token: impl Into<String>, target: impl Into<String>) -> Self {
        let token = token.into();
        let target = target.into();
        match self.aliases.iter_mut().find(|(existing, _)| *existing == token) {
            Some((_, existing)) => {
                debug!("Alias {} redefined: {} -> {}", token, existing, target);
                *existing = target;
            }
            None => self.aliases.push((token, target)),
        }
        self
    }

    /// Declare a flag; a flag with the same token replaces the earlier one
    pub fn flag(mut self, flag: Flag) -> Self {
        match self.flags.iter_mut().find(|existing| existing.name == flag.name) {
            Some(existing) => {
                debug!("Flag {} redefined", flag.name);
                *existing = flag;
            }
            None => self.flags.push(flag),
        }
        self
    }

    /// Validate the collected definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Definition`] if:
    /// - two classes share a name, or a class declares the same attribute twice
    /// - a parent or component class is not registered
    /// - the parent relation contains a cycle
    /// - an enumerated attribute lacks choices, a plain attribute has choices, or a choice
    ///   has no literal representation
    pub fn build(self) -> Result<Application> {
        debug!(
            "Validating application {} with {} classes",
            self.name,
            self.definitions.len()
        );

        let mut index = HashMap::new();
        for (i, class) in self.definitions.iter().enumerate() {
            if index.insert(class.name.clone(), i).is_some() {
                return Err(Error::Definition(format!(
                    "class '{}' is defined more than once",
                    class.name
                )));
            }
        }

        for class in &self.definitions {
            for parent in &class.parents {
                if !index.contains_key(parent) {
                    return Err(Error::Definition(format!(
                        "class '{}' inherits from undefined class '{}'",
                        class.name, parent
                    )));
                }
            }
            Self::validate_attributes(class)?;
        }

        for component in &self.components {
            if !index.contains_key(component) {
                return Err(Error::Definition(format!(
                    "component class '{}' is not defined",
                    component
                )));
            }
        }

        Self::check_acyclic(&self.definitions, &index)?;

        let mut components = self.components;
        if index.contains_key(&self.name) && !components.contains(&self.name) {
            components.insert(0, self.name.clone());
        }

        Ok(Application {
            name: self.name,
            components,
            definitions: self.definitions,
            index,
            aliases: self.aliases,
            flags: self.flags,
        })
    }

    fn validate_attributes(class: &ConfigurableClass) -> Result<()> {
        let mut names = HashSet::new();
        for attribute in class.attributes() {
            let fullname = class.qualified_name(attribute);
            if !names.insert(attribute.name.as_str()) {
                return Err(Error::Definition(format!(
                    "attribute '{}' is declared more than once",
                    fullname
                )));
            }

            match (&attribute.choices, attribute.is_enumerated()) {
                (None, true) => {
                    return Err(Error::Definition(format!(
                        "enumerated attribute '{}' has no choices",
                        fullname
                    )))
                }
                (Some(_), false) => {
                    return Err(Error::Definition(format!(
                        "attribute '{}' of kind {} cannot declare choices",
                        fullname, attribute.kind
                    )))
                }
                (Some(choices), true) => {
                    for choice in choices {
                        choice.literal().map_err(|e| {
                            Error::Definition(format!("choice of '{}': {}", fullname, e))
                        })?;
                    }
                }
                (None, false) => {}
            }
        }
        Ok(())
    }

    /// Depth-first search over parent links.
    ///
    /// A class met again while still on the stack closes a cycle.
    fn check_acyclic(
        definitions: &[ConfigurableClass],
        index: &HashMap<String, usize>,
    ) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            i: usize,
            definitions: &[ConfigurableClass],
            index: &HashMap<String, usize>,
            marks: &mut [Mark],
        ) -> Result<()> {
            match marks[i] {
                Mark::Done => return Ok(()),
                Mark::InProgress => {
                    return Err(Error::Definition(format!(
                        "class '{}' inherits from itself",
                        definitions[i].name
                    )))
                }
                Mark::Unvisited => {}
            }
            marks[i] = Mark::InProgress;
            for parent in &definitions[i].parents {
                if let Some(&p) = index.get(parent) {
                    visit(p, definitions, index, marks)?;
                }
            }
            marks[i] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; definitions.len()];
        for i in 0..definitions.len() {
            visit(i, definitions, index, &mut marks)?;
        }
        Ok(())
    }
}
