//! Minification options
//!
//! Every transform is independently toggleable. Options deserialize from camelCase JSON
//! and any omitted field takes its default.

use serde::{Deserialize, Serialize};

use crate::renamer::RenameOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveAnnotationsOptions {
    pub remove_variable_annotations: bool,
    pub remove_return_annotations: bool,
    pub remove_argument_annotations: bool,
    pub remove_class_attribute_annotations: bool,
}

impl Default for RemoveAnnotationsOptions {
    fn default() -> Self {
        RemoveAnnotationsOptions {
            remove_variable_annotations: true,
            remove_return_annotations: true,
            remove_argument_annotations: true,
            remove_class_attribute_annotations: false,
        }
    }
}

impl RemoveAnnotationsOptions {
    pub fn disabled() -> Self {
        RemoveAnnotationsOptions {
            remove_variable_annotations: false,
            remove_return_annotations: false,
            remove_argument_annotations: false,
            remove_class_attribute_annotations: false,
        }
    }

    pub fn any(&self) -> bool {
        self.remove_variable_annotations
            || self.remove_return_annotations
            || self.remove_argument_annotations
            || self.remove_class_attribute_annotations
    }
}

/// Which bare literal statements to drop.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveLiteralStatementsOptions {
    pub remove_module_docstring: bool,
    pub remove_function_docstrings: bool,
    pub remove_class_docstrings: bool,
    /// Literal statements that are not docstrings.
    pub remove_other_literals: bool,
}

impl RemoveLiteralStatementsOptions {
    pub fn all() -> Self {
        RemoveLiteralStatementsOptions {
            remove_module_docstring: true,
            remove_function_docstrings: true,
            remove_class_docstrings: true,
            remove_other_literals: true,
        }
    }

    pub fn any(&self) -> bool {
        self.remove_module_docstring
            || self.remove_function_docstrings
            || self.remove_class_docstrings
            || self.remove_other_literals
    }
}

/// Inclusive range of language versions the output must run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetVersions {
    pub minimum: (u8, u8),
    pub maximum: (u8, u8),
}

impl Default for TargetVersions {
    fn default() -> Self {
        TargetVersions {
            minimum: (3, 0),
            maximum: (3, 14),
        }
    }
}

impl TargetVersions {
    /// Nested f-strings may reuse quotes and contain backslashes from 3.12 on.
    pub fn legacy_fstrings(&self) -> bool {
        self.minimum < (3, 12)
    }

    /// `f'{name=}'` self-documenting expressions arrived in 3.8.
    pub fn fstring_debug(&self) -> bool {
        self.minimum >= (3, 8)
    }

    /// `return *a, b` and `yield *a, b` without brackets are accepted from 3.8.
    pub fn bare_return_unpacking(&self) -> bool {
        self.minimum >= (3, 8)
    }

    /// `for x in *a, b:` without brackets is accepted from 3.9.
    pub fn bare_iterable_unpacking(&self) -> bool {
        self.minimum >= (3, 9)
    }

    /// A bare walrus as a set display element is accepted from 3.9.
    pub fn bare_walrus_in_set(&self) -> bool {
        self.minimum >= (3, 9)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinifyOptions {
    pub remove_literal_statements: RemoveLiteralStatementsOptions,
    pub remove_annotations: RemoveAnnotationsOptions,
    pub remove_pass: bool,
    pub remove_object_base: bool,
    pub remove_asserts: bool,
    pub remove_debug: bool,
    pub remove_version_guards: bool,
    pub remove_explicit_return_none: bool,
    pub remove_builtin_exception_brackets: bool,
    pub combine_imports: bool,
    pub constant_folding: bool,
    pub hoist_literals: bool,
    pub convert_posargs_to_args: bool,
    pub rename_locals: bool,
    pub preserve_locals: Vec<String>,
    pub rename_globals: bool,
    pub preserve_globals: Vec<String>,
    pub preserve_shebang: bool,
    pub target_versions: TargetVersions,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        MinifyOptions {
            remove_literal_statements: RemoveLiteralStatementsOptions::default(),
            remove_annotations: RemoveAnnotationsOptions::default(),
            remove_pass: true,
            remove_object_base: true,
            remove_asserts: false,
            remove_debug: false,
            remove_version_guards: true,
            remove_explicit_return_none: true,
            remove_builtin_exception_brackets: true,
            combine_imports: true,
            constant_folding: true,
            hoist_literals: true,
            convert_posargs_to_args: true,
            rename_locals: true,
            preserve_locals: Vec::new(),
            rename_globals: false,
            preserve_globals: Vec::new(),
            preserve_shebang: true,
            target_versions: TargetVersions::default(),
        }
    }
}

impl MinifyOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Print-only profile: every rewrite disabled.
    pub fn print_only() -> Self {
        MinifyOptions {
            remove_literal_statements: RemoveLiteralStatementsOptions::default(),
            remove_annotations: RemoveAnnotationsOptions::disabled(),
            remove_pass: false,
            remove_object_base: false,
            remove_asserts: false,
            remove_debug: false,
            remove_version_guards: false,
            remove_explicit_return_none: false,
            remove_builtin_exception_brackets: false,
            combine_imports: false,
            constant_folding: false,
            hoist_literals: false,
            convert_posargs_to_args: false,
            rename_locals: false,
            preserve_locals: Vec::new(),
            rename_globals: false,
            preserve_globals: Vec::new(),
            preserve_shebang: true,
            target_versions: TargetVersions::default(),
        }
    }

    pub fn rename_options(&self, exported: &[String]) -> RenameOptions {
        let mut preserve_globals = self.preserve_globals.clone();
        for name in exported {
            if !preserve_globals.contains(name) {
                preserve_globals.push(name.clone());
            }
        }
        RenameOptions {
            rename_locals: self.rename_locals,
            rename_globals: self.rename_globals,
            preserve_locals: self.preserve_locals.clone(),
            preserve_globals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let options = MinifyOptions::from_json("{}").unwrap();
        assert_eq!(options, MinifyOptions::default());
        assert!(options.rename_locals);
        assert!(!options.rename_globals);
        assert!(options.remove_annotations.remove_argument_annotations);
        assert!(!options.remove_annotations.remove_class_attribute_annotations);
    }

    #[test]
    fn test_camel_case_fields() {
        let options = MinifyOptions::from_json(
            r#"{"renameGlobals": true, "preserveGlobals": ["keep"], "hoistLiterals": false,
                "targetVersions": {"minimum": [3, 12], "maximum": [3, 13]}}"#,
        )
        .unwrap();
        assert!(options.rename_globals);
        assert_eq!(options.preserve_globals, vec!["keep".to_string()]);
        assert!(!options.hoist_literals);
        assert!(!options.target_versions.legacy_fstrings());
    }

    #[test]
    fn test_nested_partial_options() {
        let options = MinifyOptions::from_json(
            r#"{"removeLiteralStatements": {"removeModuleDocstring": true}}"#,
        )
        .unwrap();
        assert!(options.remove_literal_statements.remove_module_docstring);
        assert!(!options.remove_literal_statements.remove_function_docstrings);
    }

    #[test]
    fn test_legacy_fstrings_by_default() {
        assert!(TargetVersions::default().legacy_fstrings());
    }

    #[test]
    fn test_newer_syntax_follows_minimum() {
        let at = |minimum| TargetVersions {
            minimum,
            maximum: (3, 14),
        };
        assert!(!at((3, 7)).fstring_debug());
        assert!(at((3, 8)).fstring_debug());
        assert!(!at((3, 7)).bare_return_unpacking());
        assert!(at((3, 8)).bare_return_unpacking());
        assert!(!at((3, 8)).bare_iterable_unpacking());
        assert!(!at((3, 8)).bare_walrus_in_set());
        assert!(at((3, 9)).bare_walrus_in_set());
        assert!(at((3, 9)).bare_iterable_unpacking());
    }

    #[test]
    fn test_exported_names_are_preserved() {
        let options = MinifyOptions::default();
        let rename = options.rename_options(&["api".to_string()]);
        assert_eq!(rename.preserve_globals, vec!["api".to_string()]);
    }
}
