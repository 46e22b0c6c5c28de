use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Stable identifier of a symbol (assigned by the parsing stage)
pub type SymbolId = String;

/// Stable identifier of a source file
pub type FileId = String;

/// Kind of program symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Interface,
    Trait,
    Enum,
    Method,
    Constructor,
    Function,
    Property,
    Field,
    Constant,
    Variable,
    Module,
    Namespace,
    TypeAlias,
}

impl SymbolKind {
    /// Class-like kinds that own members
    pub fn is_type_like(&self) -> bool {
        matches!(
            self,
            SymbolKind::Class | SymbolKind::Interface | SymbolKind::Trait | SymbolKind::Enum
        )
    }

    /// Kinds that can be the target of a call
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            SymbolKind::Method | SymbolKind::Constructor | SymbolKind::Function
        )
    }
}

/// Visibility modifiers for symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
}

/// Programming language of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Language {
    #[serde(rename = "javascript")]
    #[strum(serialize = "javascript")]
    JavaScript,
    #[serde(rename = "typescript")]
    #[strum(serialize = "typescript")]
    TypeScript,
    Vue,
    Php,
    #[serde(rename = "csharp")]
    #[strum(serialize = "csharp")]
    CSharp,
    Python,
    Java,
    Go,
    Rust,
    Unknown,
}

impl Language {
    /// Languages sharing the browser runtime (script and single-file component variants)
    pub const FRONT_END: &'static [Language] =
        &[Language::JavaScript, Language::TypeScript, Language::Vue];

    pub fn is_front_end(&self) -> bool {
        Self::FRONT_END.contains(self)
    }
}

/// A named program entity produced by the parsing stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct Symbol {
    /// Unique identifier for the symbol
    pub id: SymbolId,

    /// Identifier of the file declaring the symbol
    pub file_id: FileId,

    /// Simple (unqualified) name
    pub name: String,

    /// Fully scoped name, e.g. `App\Models\User::save` or `UserService.getUser`
    #[builder(default = "None")]
    #[serde(default)]
    pub qualified_name: Option<String>,

    pub kind: SymbolKind,

    /// First declared line (1-based)
    #[builder(default = "1")]
    #[serde(default = "default_line")]
    pub start_line: u32,

    /// Last declared line (1-based, inclusive)
    #[builder(default = "1")]
    #[serde(default = "default_line")]
    pub end_line: u32,

    #[builder(default = "false")]
    #[serde(default)]
    pub exported: bool,

    #[builder(default = "None")]
    #[serde(default)]
    pub visibility: Option<Visibility>,

    /// Textual signature as written in source
    #[builder(default = "None")]
    #[serde(default)]
    pub signature: Option<String>,
}

fn default_line() -> u32 {
    1
}

impl Symbol {
    /// Whether `line` falls inside this symbol's declared range
    pub fn spans_line(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line.max(self.start_line)
    }
}

/// Dependency (and edge) types between symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DependencyType {
    Calls,
    Imports,
    Exports,
    Inherits,
    Implements,
    Contains,
    References,
}

impl DependencyType {
    /// INHERITS and IMPLEMENTS both describe a type hierarchy link
    pub fn is_hierarchy(&self) -> bool {
        matches!(self, DependencyType::Inherits | DependencyType::Implements)
    }
}

/// A raw, unresolved reference from one symbol to a named target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub from_symbol: String,
    pub to_symbol: String,
    pub dependency_type: DependencyType,
    pub line: u32,
    #[serde(default)]
    pub qualified_context: Option<String>,
    #[serde(default)]
    pub resolved_class: Option<String>,
    #[serde(default)]
    pub calling_object: Option<String>,
    #[serde(default)]
    pub parameter_types: Vec<String>,
    #[serde(default)]
    pub call_instance_id: Option<String>,
}

impl Dependency {
    pub fn new(
        from_symbol: impl Into<String>,
        to_symbol: impl Into<String>,
        dependency_type: DependencyType,
        line: u32,
    ) -> Self {
        Self {
            from_symbol: from_symbol.into(),
            to_symbol: to_symbol.into(),
            dependency_type,
            line,
            qualified_context: None,
            resolved_class: None,
            calling_object: None,
            parameter_types: Vec::new(),
            call_instance_id: None,
        }
    }

    pub fn with_resolved_class(mut self, class: impl Into<String>) -> Self {
        self.resolved_class = Some(class.into());
        self
    }

    pub fn with_qualified_context(mut self, context: impl Into<String>) -> Self {
        self.qualified_context = Some(context.into());
        self
    }

    pub fn with_calling_object(mut self, object: impl Into<String>) -> Self {
        self.calling_object = Some(object.into());
        self
    }

    /// Whether any class-disambiguation hint was supplied
    pub fn has_class_hint(&self) -> bool {
        self.resolved_class.as_deref().is_some_and(|s| !s.is_empty())
            || self
                .qualified_context
                .as_deref()
                .is_some_and(|s| !s.is_empty())
    }
}

/// How an import binds names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImportKind {
    Named,
    Default,
    Namespace,
}

/// A single name bound by an import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedName {
    /// Name as exported by the source (for namespace imports, the binding itself)
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

impl ImportedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// Name visible inside the importing file
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// An import declaration (`import { a as b } from './x'`, `use App\Models\User;`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub source: String,
    pub kind: ImportKind,
    #[serde(default)]
    pub names: Vec<ImportedName>,
}

impl ImportDecl {
    pub fn named(source: impl Into<String>, names: Vec<ImportedName>) -> Self {
        Self {
            source: source.into(),
            kind: ImportKind::Named,
            names,
        }
    }

    pub fn default_import(source: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: ImportKind::Default,
            names: vec![ImportedName::new(local)],
        }
    }

    pub fn namespace(source: impl Into<String>, binding: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: ImportKind::Namespace,
            names: vec![ImportedName::new(binding)],
        }
    }

    /// Find the imported name bound locally as `local`
    pub fn binding(&self, local: &str) -> Option<&ImportedName> {
        self.names.iter().find(|n| n.local_name() == local)
    }
}

/// An export declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDecl {
    /// Name visible to importers
    pub name: String,
    /// Local symbol name when re-exported under a different name
    #[serde(default)]
    pub local_name: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl ExportDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_name: None,
            is_default: false,
        }
    }

    pub fn default_export(local: impl Into<String>) -> Self {
        Self {
            name: "default".to_string(),
            local_name: Some(local.into()),
            is_default: true,
        }
    }

    /// Name of the declaring symbol inside the exporting file
    pub fn symbol_name(&self) -> &str {
        self.local_name.as_deref().unwrap_or(&self.name)
    }
}

/// File identity as seen by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: FileId,
    /// Repository-relative path using `/` separators
    pub path: String,
    pub language: Language,
}

impl SourceFile {
    pub fn new(id: impl Into<String>, path: impl Into<String>, language: Language) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            language,
        }
    }
}

/// Everything the parsing stage produced for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub file: SourceFile,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub imports: Vec<ImportDecl>,
    #[serde(default)]
    pub exports: Vec<ExportDecl>,
}

impl ParsedFile {
    pub fn new(file: SourceFile) -> Self {
        Self {
            file,
            symbols: Vec::new(),
            dependencies: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
        }
    }
}

/// Scan input: all parse results of one repository pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanInput {
    pub files: Vec<ParsedFile>,
}
