use crate::error::{Error, Result};
use crate::model::{Application, ConfigurableClass};
use log::debug;
use std::collections::HashSet;

/// Hierarchy walker for ordering the classes an application is configured through.
///
/// Starting from each of [`Application::component_classes`] in turn, the walker emits the
/// class's ancestors depth-first (parents in declaration order) and then the class itself.
/// Every class is emitted once, at its first appearance, so ancestors always precede their
/// descendants and the order depends only on the application definition.
pub struct HierarchyWalker;

impl HierarchyWalker {
    /// Returns the ordered, de-duplicated classes to document for `app`.
    ///
    /// An application without component classes yields an empty sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Definition`] if a component or parent class is not registered.
    /// [`crate::model::ApplicationBuilder::build`] already rejects such definitions.
    pub fn walk(app: &Application) -> Result<Vec<&ConfigurableClass>> {
        debug!(
            "Walking class hierarchy of {} from {} root classes",
            app.name(),
            app.component_classes().len()
        );

        let mut seen = HashSet::new();
        let mut ordered = Vec::new();

        for root in app.component_classes() {
            Self::visit(app, root, &mut seen, &mut ordered)?;
        }

        debug!("Hierarchy walk produced {} classes", ordered.len());
        Ok(ordered)
    }

    fn visit<'a>(
        app: &'a Application,
        name: &str,
        seen: &mut HashSet<&'a str>,
        ordered: &mut Vec<&'a ConfigurableClass>,
    ) -> Result<()> {
        let class = app
            .class(name)
            .ok_or_else(|| Error::Definition(format!("class '{}' is not defined", name)))?;

        if !seen.insert(class.name.as_str()) {
            return Ok(());
        }

        for parent in &class.parents {
            Self::visit(app, parent, seen, ordered)?;
        }

        ordered.push(class);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConfigurableAttribute;

    fn names(classes: &[&ConfigurableClass]) -> Vec<String> {
        classes.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_empty_application() {
        let app = Application::builder("App").build().unwrap();
        let classes = HierarchyWalker::walk(&app).unwrap();
        assert!(classes.is_empty());
    }

    #[test]
    fn test_parents_before_children() {
        let app = Application::builder("App")
            .define(ConfigurableClass::new("Configurable"))
            .define(ConfigurableClass::new("SingletonConfigurable").with_parent("Configurable"))
            .define(ConfigurableClass::new("Application").with_parent("SingletonConfigurable"))
            .define(ConfigurableClass::new("App").with_parent("Application"))
            .build()
            .unwrap();

        let classes = HierarchyWalker::walk(&app).unwrap();
        assert_eq!(
            names(&classes),
            vec!["Configurable", "SingletonConfigurable", "Application", "App"]
        );
    }

    #[test]
    fn test_shared_ancestors_emitted_once() {
        let app = Application::builder("App")
            .define(ConfigurableClass::new("Configurable"))
            .define(ConfigurableClass::new("App").with_parent("Configurable"))
            .define(ConfigurableClass::new("Shell").with_parent("Configurable"))
            .define(ConfigurableClass::new("History").with_parent("Configurable"))
            .component("Shell")
            .component("History")
            .component("Shell")
            .build()
            .unwrap();

        let classes = HierarchyWalker::walk(&app).unwrap();
        assert_eq!(names(&classes), vec!["Configurable", "App", "Shell", "History"]);
    }

    #[test]
    fn test_multiple_inheritance_diamond() {
        let app = Application::builder("App")
            .define(ConfigurableClass::new("Base"))
            .define(ConfigurableClass::new("Left").with_parent("Base"))
            .define(ConfigurableClass::new("Right").with_parent("Base"))
            .define(ConfigurableClass::new("App").with_parent("Left").with_parent("Right"))
            .build()
            .unwrap();

        let classes = HierarchyWalker::walk(&app).unwrap();
        assert_eq!(names(&classes), vec!["Base", "Left", "Right", "App"]);
    }

    #[test]
    fn test_unreferenced_classes_are_skipped() {
        let app = Application::builder("App")
            .define(ConfigurableClass::new("App"))
            .define(
                ConfigurableClass::new("Unused")
                    .with_attribute(ConfigurableAttribute::new("x", "Int")),
            )
            .build()
            .unwrap();

        let classes = HierarchyWalker::walk(&app).unwrap();
        assert_eq!(names(&classes), vec!["App"]);
    }

    #[test]
    fn test_walk_is_stable() {
        let app = Application::builder("App")
            .define(ConfigurableClass::new("Base"))
            .define(ConfigurableClass::new("A").with_parent("Base"))
            .define(ConfigurableClass::new("B").with_parent("Base"))
            .component("B")
            .component("A")
            .build()
            .unwrap();

        let first = names(&HierarchyWalker::walk(&app).unwrap());
        let second = names(&HierarchyWalker::walk(&app).unwrap());
        assert_eq!(first, second);
        assert_eq!(first, vec!["Base", "B", "A"]);
    }
}
