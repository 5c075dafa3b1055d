// scope_fill.rs — Scope-construction pre-pass
//
// Walks the AST once before analysis, creating one scope per block and
// one virtual-block scope per function definition, and binding declared
// variables and functions. Functions are hoisted: every function defined
// directly in a block is registered before any statement of that block is
// visited, so calls may precede definitions.
//
// Preconditions: `info` is fresh (or at least has no scopes for this tree).
// Postconditions: `info.block_scopes` maps every block to its scope and
//                 `info.virtual_blocks` every function definition to its
//                 parameter/return scope.
// Failure modes: duplicate names in a scope produce declaration errors;
//                the walk continues and returns false.
// Side effects: appends scopes to the arena inside `info`.

use log::debug;

use crate::analyze::AnalysisInfo;
use crate::ast::{Block, FunctionDefinition, Statement, StatementKind, TypeName};
use crate::diag::{Fatal, Reporter};
use crate::scope::ScopeId;

pub struct ScopeFiller<'a> {
    info: &'a mut AnalysisInfo,
    reporter: &'a mut Reporter,
    current: Option<ScopeId>,
}

impl<'a> ScopeFiller<'a> {
    pub fn new(info: &'a mut AnalysisInfo, reporter: &'a mut Reporter) -> Self {
        ScopeFiller {
            info,
            reporter,
            current: None,
        }
    }

    /// Build the scope tree for `block` and everything below it.
    pub fn fill(&mut self, block: &Block) -> Result<bool, Fatal> {
        debug!("scope fill: root block {:?}", block.id);
        self.block(block)
    }

    fn block(&mut self, block: &Block) -> Result<bool, Fatal> {
        let scope = self.info.scopes.new_scope(self.current, false);
        self.info.block_scopes.insert(block.id, scope);
        self.current = Some(scope);

        let mut success = true;
        // Hoist function definitions so calls may precede them.
        for statement in &block.statements {
            if let StatementKind::FunctionDefinition(fun) = &statement.kind {
                if !self.register_function(fun, statement)? {
                    success = false;
                }
            }
        }
        for statement in &block.statements {
            if !self.statement(statement)? {
                success = false;
            }
        }

        self.current = self.info.scopes.parent(scope);
        Ok(success)
    }

    fn statement(&mut self, statement: &Statement) -> Result<bool, Fatal> {
        match &statement.kind {
            StatementKind::VariableDeclaration(decl) => {
                let mut success = true;
                for variable in &decl.variables {
                    if !self.register_variable(statement, &variable.name, &variable.ty)? {
                        success = false;
                    }
                }
                Ok(success)
            }
            StatementKind::FunctionDefinition(fun) => self.function_definition(statement, fun),
            StatementKind::If(if_stmt) => self.block(&if_stmt.body),
            StatementKind::Switch(switch) => {
                let mut success = true;
                for case in &switch.cases {
                    if !self.block(&case.body)? {
                        success = false;
                    }
                }
                Ok(success)
            }
            StatementKind::ForLoop(for_loop) => {
                let mut success = self.block(&for_loop.pre)?;
                // Condition, body, and post live in the pre-block's scope.
                let outer = self.current;
                self.current = self.info.block_scopes.get(&for_loop.pre.id).copied();
                if !self.block(&for_loop.body)? {
                    success = false;
                }
                if !self.block(&for_loop.post)? {
                    success = false;
                }
                self.current = outer;
                Ok(success)
            }
            StatementKind::Block(block) => self.block(block),
            StatementKind::Expression(_)
            | StatementKind::Assignment(_)
            | StatementKind::Break
            | StatementKind::Continue
            | StatementKind::Leave => Ok(true),
        }
    }

    fn function_definition(
        &mut self,
        statement: &Statement,
        fun: &FunctionDefinition,
    ) -> Result<bool, Fatal> {
        let virtual_block = self.info.scopes.new_scope(self.current, true);
        self.info.virtual_blocks.insert(statement.id, virtual_block);

        let outer = self.current;
        self.current = Some(virtual_block);
        let mut success = true;
        for variable in fun.parameters.iter().chain(fun.returns.iter()) {
            if !self.register_variable(statement, &variable.name, &variable.ty)? {
                success = false;
            }
        }
        if !self.block(&fun.body)? {
            success = false;
        }
        self.current = outer;
        Ok(success)
    }

    fn register_variable(
        &mut self,
        statement: &Statement,
        name: &str,
        ty: &TypeName,
    ) -> Result<bool, Fatal> {
        let scope = self.current_scope();
        if self
            .info
            .scopes
            .register_variable(scope, name, ty.clone())
            .is_none()
        {
            self.reporter.declaration_error(
                statement.span,
                format!("Variable name {} already taken in this scope.", name),
            )?;
            return Ok(false);
        }
        Ok(true)
    }

    fn register_function(
        &mut self,
        fun: &FunctionDefinition,
        statement: &Statement,
    ) -> Result<bool, Fatal> {
        let arguments = fun.parameters.iter().map(|p| p.ty.clone()).collect();
        let returns = fun.returns.iter().map(|r| r.ty.clone()).collect();
        let scope = self.current_scope();
        if !self
            .info
            .scopes
            .register_function(scope, &fun.name.name, arguments, returns)
        {
            self.reporter.declaration_error(
                statement.span,
                format!(
                    "Function name {} already taken in this scope.",
                    fun.name.name
                ),
            )?;
            return Ok(false);
        }
        Ok(true)
    }

    fn current_scope(&self) -> ScopeId {
        self.current
            .expect("internal: scope filler outside any scope")
    }
}
