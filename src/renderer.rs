//! reStructuredText rendering of configurable attributes.
//!
//! Each attribute becomes one `configtrait` directive:
//!
//! ```text
//! .. configtrait:: Shell.colors
//!
//!     Set the color scheme.
//!
//!     :options: ``'neutral'``, ``'linux'``
//!     :default: ``'neutral'``
//!     :CLI option: ``--colors``
//! ```
//!
//! Blocks are separated by exactly one blank line. Classes come in
//! [`HierarchyWalker`] order and attributes within a class are sorted by name.

use crate::aliases::{AliasIndex, AliasResolver};
use crate::error::Result;
use crate::model::{Application, ConfigurableAttribute, ConfigurableClass};
use crate::value::Value;
use crate::walker::HierarchyWalker;
use log::debug;

/// Default literals longer than this many characters are truncated
pub const MAX_DEFAULT_WIDTH: usize = 64;

/// Characters kept from a truncated default literal, before the ellipsis
const TRUNCATED_WIDTH: usize = 61;

const INDENT: &str = "    ";

/// Placeholder for attributes without help text
pub const NO_DESCRIPTION: &str = "No description";

/// What an attribute accepts: an enumerated set of literals, or a type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeLine {
    /// Literal representations of the legal values, in declaration order
    Choices(Vec<String>),
    /// The attribute's type tag
    Kind(String),
}

/// The rendered unit of output for one configurable attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentationBlock {
    /// `Class.attribute`
    pub fullname: String,
    /// Cleaned help text
    pub description: String,
    pub type_line: TypeLine,
    /// Escaped, possibly truncated default literal; `None` when not shown
    pub default: Option<String>,
    /// Alias tokens without dashes
    pub aliases: Vec<String>,
}

impl DocumentationBlock {
    /// Renders the block as a `configtrait` directive terminated by a newline.
    pub fn to_markup(&self) -> String {
        let mut lines = vec![format!(".. configtrait:: {}", self.fullname), String::new()];
        lines.push(indent(&self.description));
        lines.push(String::new());

        match &self.type_line {
            TypeLine::Choices(choices) => {
                let options: Vec<String> = choices.iter().map(|c| format!("``{}``", c)).collect();
                lines.push(format!("{}:options: {}", INDENT, options.join(", ")));
            }
            TypeLine::Kind(kind) => lines.push(format!("{}:trait type: {}", INDENT, kind)),
        }

        if let Some(default) = &self.default {
            lines.push(format!("{}:default: ``{}``", INDENT, default));
        }

        if !self.aliases.is_empty() {
            lines.push(format!("{}:CLI option: {}", INDENT, format_aliases(&self.aliases)));
        }

        let mut markup = lines.join("\n");
        markup.push('\n');
        markup
    }
}

/// Builds documentation blocks for the classes of one application.
pub struct DocRenderer<'a> {
    aliases: &'a AliasIndex,
}

impl<'a> DocRenderer<'a> {
    pub fn new(aliases: &'a AliasIndex) -> Self {
        Self { aliases }
    }

    /// Builds the documentation block for `attribute`, declared on `class`.
    pub fn block(
        &self,
        class: &ConfigurableClass,
        attribute: &ConfigurableAttribute,
    ) -> DocumentationBlock {
        let fullname = class.qualified_name(attribute);

        let type_line = match &attribute.choices {
            Some(choices) if attribute.is_enumerated() => TypeLine::Choices(
                choices
                    .iter()
                    // unrepresentable choices are rejected by ApplicationBuilder::build
                    .filter_map(|choice| choice.literal().ok())
                    .collect(),
            ),
            _ => TypeLine::Kind(attribute.kind.clone()),
        };

        let default = format_default(&fullname, attribute.default.as_ref());
        let aliases = self.aliases.get(&fullname).to_vec();

        DocumentationBlock {
            description: clean_help(&attribute.help),
            fullname,
            type_line,
            default,
            aliases,
        }
    }

    /// Renders every attribute declared directly on `class`, sorted by name.
    ///
    /// Returns an empty string for a class without attributes of its own.
    pub fn render_class(&self, class: &ConfigurableClass) -> String {
        class
            .sorted_attributes()
            .into_iter()
            .map(|attribute| self.block(class, attribute).to_markup())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Renders the complete documentation for `app`.
///
/// The document starts with a newline, then the optional preamble followed by a blank
/// line, then the blocks of every class in hierarchy order.
///
/// # Errors
///
/// Returns [`crate::error::Error::Definition`] if the class hierarchy cannot be walked.
/// Problems with individual attributes never fail the document.
pub fn render_document(app: &Application, preamble: Option<&str>) -> Result<String> {
    let classes = HierarchyWalker::walk(app)?;
    let aliases = AliasResolver::resolve(app);
    let renderer = DocRenderer::new(&aliases);

    let mut document = String::from("\n");
    if let Some(preamble) = preamble {
        document.push_str(preamble);
        document.push_str("\n\n");
    }

    for class in classes {
        if class.attributes().is_empty() {
            debug!("Class {} declares no configurable attributes", class.name);
            continue;
        }
        debug!(
            "Rendering {} attributes of class {}",
            class.attributes().len(),
            class.name
        );
        document.push_str(&renderer.render_class(class));
        document.push('\n');
    }

    Ok(document)
}

/// Normalizes help text for display; empty help becomes [`NO_DESCRIPTION`].
///
/// Tabs expand to 8 columns, the first line loses its leading whitespace, the common
/// indentation of the following lines is removed, and leading and trailing blank lines are
/// dropped.
pub fn clean_help(help: &str) -> String {
    let help = help.trim_end();
    if help.is_empty() {
        return NO_DESCRIPTION.to_string();
    }

    let mut lines: Vec<String> = help.split('\n').map(expand_tabs).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min();

    lines[0] = lines[0].trim_start().to_string();
    if let Some(margin) = margin {
        for line in lines.iter_mut().skip(1) {
            *line = line.chars().skip(margin).collect();
        }
    }

    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => NO_DESCRIPTION.to_string(),
    }
}

fn expand_tabs(line: &str) -> String {
    let mut expanded = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        match c {
            '\t' => {
                let pad = 8 - column % 8;
                expanded.push_str(&" ".repeat(pad));
                column += pad;
            }
            '\r' => {
                expanded.push(c);
                column = 0;
            }
            _ => {
                expanded.push(c);
                column += 1;
            }
        }
    }
    expanded
}

/// Indents every non-blank line; blank lines stay empty.
fn indent(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", INDENT, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The default literal to show for an attribute, if any.
///
/// Unset and boring defaults are skipped, as are defaults without a literal
/// representation. Long literals are cut to [`MAX_DEFAULT_WIDTH`] characters and every
/// backslash-n pair is doubled so the markup shows it verbatim.
pub fn format_default(fullname: &str, default: Option<&Value>) -> Option<String> {
    let value = default?;
    if !value.is_interesting() {
        return None;
    }

    let literal = match value.literal() {
        Ok(literal) => literal,
        Err(e) => {
            debug!("Omitting default of {}: {}", fullname, e);
            return None;
        }
    };

    let literal = if literal.chars().count() > MAX_DEFAULT_WIDTH {
        let mut truncated: String = literal.chars().take(TRUNCATED_WIDTH).collect();
        truncated.push_str("...");
        truncated
    } else {
        literal
    };

    Some(literal.replace("\\n", "\\\\n"))
}

/// Formats alias tokens as inline literals: `-x` for one character, `--name` otherwise.
pub fn format_aliases(aliases: &[String]) -> String {
    aliases
        .iter()
        .map(|alias| {
            let dashes = if alias.chars().count() == 1 { "-" } else { "--" };
            format!("``{}{}``", dashes, alias)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
