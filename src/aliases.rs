use crate::model::{Application, Flag};
use log::debug;
use std::collections::HashMap;

/// Reverse index from fully-qualified attribute name to its command-line tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasIndex {
    entries: HashMap<String, Vec<String>>,
}

impl AliasIndex {
    /// Tokens that set `fullname` (`Class.attribute`), in discovery order.
    ///
    /// An attribute without aliases yields an empty slice.
    pub fn get(&self, fullname: &str) -> &[String] {
        self.entries.get(fullname).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of attributes with at least one alias
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, fullname: String, token: String) {
        self.entries.entry(fullname).or_default().push(token);
    }
}

/// Alias resolver that merges explicit aliases with flags acting as boolean aliases.
pub struct AliasResolver;

impl AliasResolver {
    /// Builds the alias index for `app`.
    ///
    /// Explicit aliases come first, in alias-table order, followed by every flag that
    /// qualifies as an alias (see [`AliasResolver::promoted_target`]), in flag-table order.
    /// Other flags are left out.
    pub fn resolve(app: &Application) -> AliasIndex {
        let mut index = AliasIndex::default();

        for (token, target) in app.aliases() {
            index.push(target.clone(), token.clone());
        }

        for flag in app.flags() {
            match Self::promoted_target(flag) {
                Some(target) => {
                    debug!(
                        "Flag {} documented as alias of {} ({})",
                        flag.name,
                        target,
                        flag.summary()
                    );
                    index.push(target, flag.name.clone());
                }
                None => debug!(
                    "Flag {} does not set a single attribute to True ({})",
                    flag.name,
                    flag.summary()
                ),
            }
        }

        index
    }

    /// The `Class.attribute` a flag stands for, if its payload touches exactly one class,
    /// exactly one attribute on it, and sets that attribute to `True`.
    pub fn promoted_target(flag: &Flag) -> Option<String> {
        match flag.config.as_slice() {
            [(class, settings)] => match settings.as_slice() {
                [(attribute, value)] if value.is_true() => {
                    Some(format!("{}.{}", class, attribute))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConfigurableAttribute, ConfigurableClass};
    use crate::value::Value;

    fn app_with(aliases: &[(&str, &str)], flags: Vec<Flag>) -> Application {
        let mut builder = Application::builder("App").define(
            ConfigurableClass::new("App")
                .with_attribute(ConfigurableAttribute::new("verbose", "Bool"))
                .with_attribute(ConfigurableAttribute::new("log_level", "Int")),
        );
        for (token, target) in aliases {
            builder = builder.alias(*token, *target);
        }
        for flag in flags {
            builder = builder.flag(flag);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_explicit_aliases_in_declaration_order() {
        let app = app_with(
            &[("log-level", "App.log_level"), ("l", "App.log_level"), ("x", "Shell.x")],
            vec![],
        );
        let index = AliasResolver::resolve(&app);

        assert_eq!(index.get("App.log_level"), ["log-level".to_string(), "l".to_string()]);
        assert_eq!(index.get("Shell.x"), ["x".to_string()]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_missing_attribute_yields_empty_slice() {
        let index = AliasResolver::resolve(&app_with(&[], vec![]));
        assert!(index.get("App.verbose").is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_single_true_flag_is_promoted() {
        let app = app_with(&[], vec![Flag::new("v").set("App", "verbose", Value::Bool(true))]);
        let index = AliasResolver::resolve(&app);
        assert_eq!(index.get("App.verbose"), ["v".to_string()]);
    }

    #[test]
    fn test_flags_follow_explicit_aliases_and_keep_duplicates() {
        let app = app_with(
            &[("verbose", "App.verbose")],
            vec![
                Flag::new("verbose").set("App", "verbose", Value::Bool(true)),
                Flag::new("v").set("App", "verbose", Value::Bool(true)),
            ],
        );
        let index = AliasResolver::resolve(&app);
        assert_eq!(
            index.get("App.verbose"),
            ["verbose".to_string(), "verbose".to_string(), "v".to_string()]
        );
    }

    #[test]
    fn test_flag_reset_to_true_is_promoted() {
        let flag = Flag::new("pdb")
            .set("App", "verbose", Value::Bool(false))
            .set("App", "verbose", Value::Bool(true));
        assert_eq!(AliasResolver::promoted_target(&flag), Some("App.verbose".to_string()));

        let index = AliasResolver::resolve(&app_with(&[], vec![flag]));
        assert_eq!(index.get("App.verbose"), ["pdb".to_string()]);
    }

    #[test]
    fn test_repeated_alias_token_lists_only_last_target() {
        let app = app_with(&[("v", "App.verbose"), ("v", "App.log_level")], vec![]);
        let index = AliasResolver::resolve(&app);

        assert!(index.get("App.verbose").is_empty());
        assert_eq!(index.get("App.log_level"), ["v".to_string()]);
    }

    #[test]
    fn test_flag_setting_false_is_not_promoted() {
        let flag = Flag::new("quiet").set("App", "verbose", Value::Bool(false));
        assert_eq!(AliasResolver::promoted_target(&flag), None);
    }

    #[test]
    fn test_flag_setting_truthy_non_bool_is_not_promoted() {
        let one = Flag::new("one").set("App", "verbose", Value::Int(1));
        let text = Flag::new("text").set("App", "verbose", Value::from("True"));
        assert_eq!(AliasResolver::promoted_target(&one), None);
        assert_eq!(AliasResolver::promoted_target(&text), None);
    }

    #[test]
    fn test_flag_with_two_attributes_is_not_promoted() {
        let flag = Flag::new("debug")
            .set("App", "verbose", Value::Bool(true))
            .set("App", "log_level", Value::Int(10));
        assert_eq!(AliasResolver::promoted_target(&flag), None);
    }

    #[test]
    fn test_flag_with_two_classes_is_not_promoted() {
        let flag = Flag::new("debug")
            .set("App", "verbose", Value::Bool(true))
            .set("Shell", "verbose", Value::Bool(true));
        assert_eq!(AliasResolver::promoted_target(&flag), None);

        let app = app_with(&[], vec![flag]);
        assert!(AliasResolver::resolve(&app).is_empty());
    }

    #[test]
    fn test_empty_flag_is_not_promoted() {
        assert_eq!(AliasResolver::promoted_target(&Flag::new("noop")), None);
    }
}
