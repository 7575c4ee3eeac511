//! Bindings: renameable name slots and their byte-cost model.

use num_bigint::BigInt;
use tracing::trace;

use crate::tree::{ExprContext, Literal, NodeId, NodeKind, SyntaxTree};

// ═══════════════════════════════════════════════════════════════════════════════
// BINDING TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Hash key for a hoisted literal: value and exact type. `1`, `1.0` and `True` are three
/// different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralKey {
    None,
    Bool(bool),
    Int(BigInt),
    Float(u64),
    Complex(u64),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
}

impl LiteralKey {
    pub fn of(literal: &Literal) -> Self {
        match literal {
            Literal::None => LiteralKey::None,
            Literal::Bool(b) => LiteralKey::Bool(*b),
            Literal::Int(i) => LiteralKey::Int(i.clone()),
            Literal::Float(f) => LiteralKey::Float(f.to_bits()),
            Literal::Complex(f) => LiteralKey::Complex(f.to_bits()),
            Literal::Str(s) => LiteralKey::Str(s.clone()),
            Literal::Bytes(b) => LiteralKey::Bytes(b.clone()),
            Literal::Ellipsis => LiteralKey::Ellipsis,
        }
    }

    pub fn literal(&self) -> Literal {
        match self {
            LiteralKey::None => Literal::None,
            LiteralKey::Bool(b) => Literal::Bool(*b),
            LiteralKey::Int(i) => Literal::Int(i.clone()),
            LiteralKey::Float(bits) => Literal::Float(f64::from_bits(*bits)),
            LiteralKey::Complex(bits) => Literal::Complex(f64::from_bits(*bits)),
            LiteralKey::Str(s) => Literal::Str(s.clone()),
            LiteralKey::Bytes(b) => Literal::Bytes(b.clone()),
            LiteralKey::Ellipsis => Literal::Ellipsis,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind {
    /// Introduced by an assignment, def, class, import, parameter, handler or pattern.
    Declared,
    /// A builtin referenced but never declared; renaming injects `new=old`.
    ImplicitBuiltin,
    /// A deduplicated literal; renaming injects `new=<literal>`.
    HoistedLiteral(LiteralKey),
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    pub references: Vec<NodeId>,
    pub allow_rename: bool,
    /// A name that must stay valid in the reservation scope even after a rename.
    pub reserved: Option<String>,
}

/// Address of a binding: the owning namespace node and its position in that scope's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingRef {
    pub scope: NodeId,
    pub index: usize,
}

impl Binding {
    pub fn declared(name: &str) -> Self {
        Binding {
            name: name.to_string(),
            kind: BindingKind::Declared,
            references: Vec::new(),
            allow_rename: true,
            reserved: None,
        }
    }

    pub fn builtin(name: &str) -> Self {
        Binding {
            name: name.to_string(),
            kind: BindingKind::ImplicitBuiltin,
            references: Vec::new(),
            allow_rename: true,
            reserved: None,
        }
    }

    pub fn hoisted(key: LiteralKey) -> Self {
        Binding {
            name: String::new(),
            kind: BindingKind::HoistedLiteral(key),
            references: Vec::new(),
            allow_rename: true,
            reserved: None,
        }
    }

    pub fn disallow_rename(&mut self) {
        self.allow_rename = false;
    }

    /// Length of what every reference currently spells.
    fn current_len(&self) -> usize {
        match &self.kind {
            BindingKind::HoistedLiteral(key) => crate::literal::literal_text(&key.literal()).len(),
            _ => self.name.len(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REFERENCE SITES
// ═══════════════════════════════════════════════════════════════════════════════

/// How a single reference site is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// Plain identifier field: names, def/class names, handlers, pattern captures.
    Identifier,
    /// Entry in a `global`/`nonlocal` name list.
    NameList,
    /// Import alias that already has an `as` clause.
    AliasedImport,
    /// Import without an `as` clause; renaming introduces one.
    UnaliasedImport,
    /// Positional-only, `*args` or `**kwargs`: safe to rename where declared.
    InPlaceParameter,
    /// Parameter callable by keyword: keeps its name, the body gains `new=old`.
    KeywordParameter,
    /// Hoisted literal occurrence, replaced by a load of the new name.
    Literal,
}

pub fn site_kind(tree: &SyntaxTree, site: NodeId) -> SiteKind {
    match tree.kind(site) {
        NodeKind::Global { .. } | NodeKind::Nonlocal { .. } => SiteKind::NameList,
        NodeKind::Alias { asname: Some(_), .. } => SiteKind::AliasedImport,
        NodeKind::Alias { asname: None, .. } => SiteKind::UnaliasedImport,
        NodeKind::Arg { .. } => {
            if parameter_renames_in_place(tree, site) {
                SiteKind::InPlaceParameter
            } else {
                SiteKind::KeywordParameter
            }
        }
        NodeKind::Constant { .. } => SiteKind::Literal,
        _ => SiteKind::Identifier,
    }
}

/// Positional-only parameters and the `*`/`**` collectors can't be named by a caller.
pub fn parameter_renames_in_place(tree: &SyntaxTree, arg: NodeId) -> bool {
    let Some(arguments) = tree.parent(arg) else {
        return false;
    };
    match tree.kind(arguments) {
        NodeKind::Arguments {
            posonlyargs,
            vararg,
            kwarg,
            ..
        } => posonlyargs.contains(&arg) || *vararg == Some(arg) || *kwarg == Some(arg),
        _ => false,
    }
}

/// The function or lambda that declares a parameter.
pub fn parameter_owner(tree: &SyntaxTree, arg: NodeId) -> Option<NodeId> {
    tree.parent(arg).and_then(|arguments| tree.parent(arguments))
}

// ═══════════════════════════════════════════════════════════════════════════════
// COST MODEL
// ═══════════════════════════════════════════════════════════════════════════════

/// Mentions of the old and new name after a rename, plus extra bytes it introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenameCost {
    pub old_mentions: usize,
    pub new_mentions: usize,
    pub overhead: usize,
}

impl RenameCost {
    fn add(&mut self, old: usize, new: usize, overhead: usize) {
        self.old_mentions += old;
        self.new_mentions += new;
        self.overhead += overhead;
    }
}

impl Binding {
    pub fn rename_cost(&self, tree: &SyntaxTree) -> RenameCost {
        let mut cost = RenameCost::default();
        match &self.kind {
            BindingKind::Declared => {
                let mut alias_owners: Vec<NodeId> = Vec::new();
                for &site in &self.references {
                    match site_kind(tree, site) {
                        SiteKind::UnaliasedImport => cost.add(1, 1, " as ".len()),
                        SiteKind::KeywordParameter => {
                            cost.add(1, 0, 0);
                            if let Some(owner) = parameter_owner(tree, site) {
                                if !alias_owners.contains(&owner) {
                                    alias_owners.push(owner);
                                }
                            }
                        }
                        _ => cost.add(0, 1, 0),
                    }
                }
                // one `new=old` statement per owning function
                for _ in alias_owners {
                    cost.add(1, 1, 2);
                }
            }
            BindingKind::ImplicitBuiltin => {
                cost.add(0, self.references.len(), 0);
                cost.add(1, 1, 2);
            }
            BindingKind::HoistedLiteral(key) => {
                let repr = crate::literal::literal_text(&key.literal());
                cost.add(0, self.references.len() + 1, "=".len() + repr.len() + 1);
            }
        }
        cost
    }

    /// Byte cost of the binding as currently spelled.
    pub fn current_cost(&self) -> usize {
        self.current_len() * self.references.len()
    }

    pub fn should_rename(&self, tree: &SyntaxTree, new_name: &str) -> bool {
        if new_name == self.name {
            return false;
        }
        let cost = self.rename_cost(tree);
        let old_len = self.current_len();
        let rename_cost =
            cost.old_mentions * old_len + cost.new_mentions * new_name.len() + cost.overhead;
        rename_cost < self.current_cost()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// APPLYING A RENAME
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteEdit {
    pub site: NodeId,
    pub kind: SiteKind,
}

/// Where the alias statement goes: the body of this module or function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    pub owner: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AliasValue {
    Name(String),
    Literal(Literal),
}

/// A rename is decided once per binding and then applied as one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum RenamePlan {
    RenameInPlace(Vec<SiteEdit>),
    RenameViaAlias {
        edits: Vec<SiteEdit>,
        at: InsertionPoint,
        value: AliasValue,
    },
}

pub fn plan_rename(tree: &SyntaxTree, at: BindingRef) -> RenamePlan {
    let binding = &tree.scope(at.scope).bindings[at.index];
    let edits: Vec<SiteEdit> = binding
        .references
        .iter()
        .map(|&site| SiteEdit {
            site,
            kind: site_kind(tree, site),
        })
        .collect();

    match &binding.kind {
        BindingKind::ImplicitBuiltin => RenamePlan::RenameViaAlias {
            edits,
            at: InsertionPoint {
                owner: tree.statement_scope(at.scope),
            },
            value: AliasValue::Name(binding.name.clone()),
        },
        BindingKind::HoistedLiteral(key) => RenamePlan::RenameViaAlias {
            edits,
            at: InsertionPoint {
                owner: tree.statement_scope(at.scope),
            },
            value: AliasValue::Literal(key.literal()),
        },
        BindingKind::Declared => {
            let owner = edits
                .iter()
                .find(|edit| edit.kind == SiteKind::KeywordParameter)
                .and_then(|edit| parameter_owner(tree, edit.site));
            match owner {
                Some(owner) => RenamePlan::RenameViaAlias {
                    edits,
                    at: InsertionPoint { owner },
                    value: AliasValue::Name(binding.name.clone()),
                },
                None => RenamePlan::RenameInPlace(edits),
            }
        }
    }
}

fn apply_edit(tree: &mut SyntaxTree, edit: SiteEdit, old_name: &str, new_name: &str) {
    match edit.kind {
        SiteKind::KeywordParameter => {}
        SiteKind::Literal => {
            tree.replace_kind(
                edit.site,
                NodeKind::Name {
                    id: new_name.to_string(),
                    ctx: ExprContext::Load,
                },
            );
        }
        SiteKind::NameList => match tree.kind_mut(edit.site) {
            NodeKind::Global { names } | NodeKind::Nonlocal { names } => {
                for name in names.iter_mut() {
                    if name == old_name {
                        *name = new_name.to_string();
                    }
                }
            }
            other => panic!("name-list edit on {}", other.name()),
        },
        SiteKind::AliasedImport | SiteKind::UnaliasedImport => match tree.kind_mut(edit.site) {
            NodeKind::Alias { name, asname } => {
                if name == new_name {
                    *asname = None;
                } else {
                    *asname = Some(new_name.to_string());
                }
            }
            other => panic!("import edit on {}", other.name()),
        },
        SiteKind::InPlaceParameter | SiteKind::Identifier => {
            let name_slot: &mut String = match tree.kind_mut(edit.site) {
                NodeKind::Name { id, .. } => id,
                NodeKind::FunctionDef { name, .. } | NodeKind::ClassDef { name, .. } => name,
                NodeKind::Arg { arg, .. } => arg,
                NodeKind::ExceptHandler { name: Some(name), .. }
                | NodeKind::MatchAs { name: Some(name), .. }
                | NodeKind::MatchStar { name: Some(name) }
                | NodeKind::MatchMapping {
                    rest: Some(name), ..
                } => name,
                other => panic!("binding reference on unnamed {} node", other.name()),
            };
            *name_slot = new_name.to_string();
        }
    }
}

/// Rewrite every reference of a binding to `new_name`, injecting the alias statement when
/// the binding can't be renamed in place.
pub fn rename(tree: &mut SyntaxTree, at: BindingRef, new_name: &str) {
    let plan = plan_rename(tree, at);
    let old_name = tree.scope(at.scope).bindings[at.index].name.clone();

    match plan {
        RenamePlan::RenameInPlace(edits) => {
            for edit in edits {
                apply_edit(tree, edit, &old_name, new_name);
            }
        }
        RenamePlan::RenameViaAlias { edits, at: point, value } => {
            for edit in edits {
                apply_edit(tree, edit, &old_name, new_name);
            }
            let value = match value {
                AliasValue::Name(name) => tree.name(&name, ExprContext::Load),
                AliasValue::Literal(literal) => tree.constant(literal),
            };
            let statement = tree.assign(new_name, value);
            tree.insert_statements(point.owner, vec![statement]);
        }
    }

    trace!(from = %old_name, to = %new_name, "renamed binding");
    tree.scope_mut(at.scope).bindings[at.index].name = new_name.to_string();
}
