// scope.rs — Lexical scope tree
//
// Scopes live in an arena owned by the analysis record and form a tree
// through parent indices, so neither scopes nor bindings hold owning
// back-references. A scope maps names to variable or function bindings;
// function scopes (the virtual blocks of function definitions) cut off
// visibility of outer variables while leaving outer functions reachable.

use std::collections::HashMap;

use crate::ast::TypeName;
use crate::id::VarId;

/// Index of a scope in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

/// A name binding inside one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeEntry {
    Variable(Variable),
    Function(Function),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub id: VarId,
    pub ty: TypeName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub arguments: Vec<TypeName>,
    pub returns: Vec<TypeName>,
}

#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<ScopeId>,
    /// True for the virtual block of a function definition.
    function_scope: bool,
    entries: HashMap<String, ScopeEntry>,
}

/// Arena of scopes; the tree is encoded by parent IDs.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    next_var: u32,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_scope(&mut self, parent: Option<ScopeId>, function_scope: bool) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            function_scope,
            entries: HashMap::new(),
        });
        id
    }

    fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope(id).parent
    }

    /// Bind a variable in `scope`. `None` if the name is already taken
    /// there.
    pub fn register_variable(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: TypeName,
    ) -> Option<VarId> {
        let var_id = VarId(self.next_var);
        let entries = &mut self.scopes[scope.0 as usize].entries;
        if entries.contains_key(name) {
            return None;
        }
        entries.insert(
            name.to_string(),
            ScopeEntry::Variable(Variable { id: var_id, ty }),
        );
        self.next_var += 1;
        Some(var_id)
    }

    /// Bind a function in `scope`. False if the name is already taken
    /// there.
    pub fn register_function(
        &mut self,
        scope: ScopeId,
        name: &str,
        arguments: Vec<TypeName>,
        returns: Vec<TypeName>,
    ) -> bool {
        let entries = &mut self.scopes[scope.0 as usize].entries;
        if entries.contains_key(name) {
            return false;
        }
        entries.insert(
            name.to_string(),
            ScopeEntry::Function(Function {
                arguments,
                returns,
            }),
        );
        true
    }

    /// Look up a name along the parent chain. Once the walk crosses a
    /// function-scope boundary, variable bindings further out are
    /// invisible; function bindings stay visible.
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<&ScopeEntry> {
        let mut crossed_function_boundary = false;
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(entry) = scope.entries.get(name) {
                if crossed_function_boundary && matches!(entry, ScopeEntry::Variable(_)) {
                    return None;
                }
                return Some(entry);
            }
            if scope.function_scope {
                crossed_function_boundary = true;
            }
            current = scope.parent;
        }
        None
    }

    /// Look up a name in one scope only, ignoring the chain.
    pub fn entry_in(&self, scope: ScopeId, name: &str) -> Option<&ScopeEntry> {
        self.scope(scope).entries.get(name)
    }

    /// The `VarId` of a variable bound directly in `scope`, if any.
    pub fn variable_id(&self, scope: ScopeId, name: &str) -> Option<VarId> {
        match self.entry_in(scope, name) {
            Some(ScopeEntry::Variable(var)) => Some(var.id),
            _ => None,
        }
    }

    /// Number of variables bound directly in `scope`.
    pub fn num_variables(&self, scope: ScopeId) -> usize {
        self.scope(scope)
            .entries
            .values()
            .filter(|entry| matches!(entry, ScopeEntry::Variable(_)))
            .count()
    }

    /// True if `scope` or any ancestor is a function scope.
    pub fn inside_function(&self, from: ScopeId) -> bool {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.scope(id);
            if scope.function_scope {
                return true;
            }
            current = scope.parent;
        }
        false
    }
}
