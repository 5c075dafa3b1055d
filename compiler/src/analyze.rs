// analyze.rs — Semantic analysis for silt inline assembly
//
// Walks a parsed tree after scope filling and checks name usage against
// the scope chain, types against the dialect, stack balance at block and
// function boundaries, and builtin-specific constraints. Records the
// abstract stack height after every analyzed node for downstream code
// generation.
//
// Preconditions: `block` is a shape-valid tree; the dialect and EVM
//                version describe the compilation target.
// Postconditions: `AnalysisInfo` holds the scope tree, the virtual-block
//                 scopes, and one stack-height entry per analyzed node.
// Failure modes: every violation produces a typed diagnostic; handlers
//                report and keep walking siblings so one run yields all
//                diagnostics. The only non-local exit is the reporter's
//                capacity condition, converted into a clean failure.
// Side effects: none outside `info` and the reporter.

use std::collections::{HashMap, HashSet};

use log::debug;
use num_bigint::BigUint;

use crate::ast::{
    u256_max, Assignment, Block, Expression, ExpressionKind, ForLoop, FunctionCall,
    FunctionDefinition, Identifier, If, Literal, LiteralKind, Span, Statement, StatementKind,
    Switch, TypeName, VariableDeclaration,
};
use crate::diag::{Fatal, Reporter};
use crate::dialect::{Dialect, EvmDialect};
use crate::evm::{EvmVersion, Instruction};
use crate::id::{NodeId, VarId};
use crate::scope::{ScopeArena, ScopeEntry, ScopeId};
use crate::scope_fill::ScopeFiller;

// ── Public types ────────────────────────────────────────────────────────────

/// Output of semantic analysis, consumed by later code-generation phases.
/// Populated even when analysis fails; callers must treat it as invalid
/// whenever any diagnostic was reported.
#[derive(Debug, Default)]
pub struct AnalysisInfo {
    /// Scope tree, owned here; scopes reference each other by ID.
    pub scopes: ScopeArena,
    /// Block node → its scope.
    pub block_scopes: HashMap<NodeId, ScopeId>,
    /// Function-definition node → the scope holding its parameters and
    /// return variables.
    pub virtual_blocks: HashMap<NodeId, ScopeId>,
    /// Node → abstract stack height after analyzing that node.
    pub stack_heights: HashMap<NodeId, i64>,
}

/// Position in which the external resolver saw an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierContext {
    LValue,
    RValue,
    VariableDeclaration,
}

/// Callback resolving identifiers the scope chain does not know, supplied
/// by the embedding compiler. Returns the stack size the identifier
/// occupies, or `None` when the name is unknown. The callback may record
/// its own diagnostics through the reporter; the analyzer then suppresses
/// its generic one.
pub type Resolver<'a> =
    Box<dyn FnMut(&Identifier, IdentifierContext, bool, &mut Reporter) -> Option<usize> + 'a>;

// ── Analyzer ────────────────────────────────────────────────────────────────

pub struct Analyzer<'a> {
    info: &'a mut AnalysisInfo,
    reporter: &'a mut Reporter,
    dialect: &'a dyn Dialect,
    resolver: Option<Resolver<'a>>,
    /// Names of data objects usable by literal-argument builtins.
    data_names: HashSet<String>,
    evm_version: EvmVersion,
    current_scope: Option<ScopeId>,
    stack_height: i64,
    /// Types produced by the most recently analyzed expression. Possibly
    /// empty or n-ary for multi-value calls.
    expression_types: Vec<TypeName>,
    /// Variables whose declaration the walk has passed.
    active_variables: HashSet<VarId>,
    current_for_loop: Option<NodeId>,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        info: &'a mut AnalysisInfo,
        reporter: &'a mut Reporter,
        dialect: &'a dyn Dialect,
        evm_version: EvmVersion,
    ) -> Self {
        Analyzer {
            info,
            reporter,
            dialect,
            resolver: None,
            data_names: HashSet::new(),
            evm_version,
            current_scope: None,
            stack_height: 0,
            expression_types: Vec::new(),
            active_variables: HashSet::new(),
            current_for_loop: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Resolver<'a>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_data_names(mut self, data_names: HashSet<String>) -> Self {
        self.data_names = data_names;
        self
    }

    /// Run the scope filler, then the full semantic walk. True iff the
    /// program is valid; false implies at least one recorded diagnostic.
    pub fn analyze(&mut self, block: &Block) -> bool {
        debug!("semantic analysis: root block {:?}", block.id);
        match self.analyze_inner(block) {
            Ok(success) => {
                if !success {
                    debug_assert!(self.reporter.has_errors(), "no success but no error");
                }
                success && !self.reporter.has_errors()
            }
            Err(Fatal) => {
                debug_assert!(
                    self.reporter.has_errors(),
                    "fatal condition but no error reported"
                );
                false
            }
        }
    }

    fn analyze_inner(&mut self, block: &Block) -> Result<bool, Fatal> {
        if !ScopeFiller::new(&mut *self.info, &mut *self.reporter).fill(block)? {
            return Ok(false);
        }
        self.block(block)
    }

    // ── Statements ──────────────────────────────────────────────────────

    fn statement(&mut self, statement: &Statement) -> Result<bool, Fatal> {
        match &statement.kind {
            StatementKind::Expression(expression) => {
                self.expression_statement(statement, expression)
            }
            StatementKind::Assignment(assignment) => self.assignment(statement, assignment),
            StatementKind::VariableDeclaration(decl) => {
                self.variable_declaration(statement, decl)
            }
            StatementKind::FunctionDefinition(fun) => self.function_definition(statement, fun),
            StatementKind::If(if_stmt) => self.if_statement(statement, if_stmt),
            StatementKind::Switch(switch) => self.switch_statement(statement, switch),
            StatementKind::ForLoop(for_loop) => self.for_loop(statement, for_loop),
            StatementKind::Break | StatementKind::Continue | StatementKind::Leave => {
                self.record_height(statement.id);
                Ok(true)
            }
            StatementKind::Block(block) => self.block(block),
        }
    }

    fn expression_statement(
        &mut self,
        statement: &Statement,
        expression: &Expression,
    ) -> Result<bool, Fatal> {
        let initial_height = self.stack_height;
        let mut success = self.expression(expression)?;
        if success && self.stack_height != initial_height {
            let deposit = self.stack_height - initial_height;
            self.reporter.type_error(
                statement.span,
                format!(
                    "Top-level expressions are not supposed to return values (this expression \
                     returns {} value{}). Use ``pop()`` or assign them.",
                    deposit,
                    if deposit == 1 { "" } else { "s" }
                ),
            )?;
            success = false;
        }
        self.record_height(statement.id);
        Ok(success)
    }

    fn assignment(&mut self, statement: &Statement, assignment: &Assignment) -> Result<bool, Fatal> {
        let expected_items = assignment.targets.len() as i64;
        debug_assert!(expected_items >= 1);
        let initial_height = self.stack_height;
        let mut success = self.expression(&assignment.value)?;

        if self.stack_height - initial_height != expected_items {
            self.reporter.declaration_error(
                statement.span,
                format!(
                    "Variable count does not match number of values ({} vs. {})",
                    expected_items,
                    self.stack_height - initial_height
                ),
            )?;
            self.record_height(statement.id);
            return Ok(false);
        }

        for (i, target) in assignment.targets.iter().enumerate() {
            let given_type = self
                .expression_types
                .get(i)
                .cloned()
                .unwrap_or_else(|| self.dialect.default_type().clone());
            if !self.check_assignment(target, given_type)? {
                success = false;
            }
        }
        self.record_height(statement.id);
        Ok(success)
    }

    fn variable_declaration(
        &mut self,
        statement: &Statement,
        decl: &VariableDeclaration,
    ) -> Result<bool, Fatal> {
        let num_variables = decl.variables.len() as i64;
        if self.resolver.is_some() {
            // Let the resolver report shadowing of externally known names.
            for variable in &decl.variables {
                let identifier = Identifier {
                    name: variable.name.clone(),
                    span: variable.span,
                };
                self.resolve_external(&identifier, IdentifierContext::VariableDeclaration);
            }
        }

        let mut success = true;
        if let Some(value) = &decl.value {
            let initial_height = self.stack_height;
            success = self.expression(value)?;
            let num_values = self.stack_height - initial_height;
            if num_values != num_variables {
                self.reporter.declaration_error(
                    statement.span,
                    format!(
                        "Variable count mismatch: {} variables and {} values.",
                        num_variables, num_values
                    ),
                )?;
                // Keep the declared variables on the abstract stack so
                // later checks see a plausible height.
                self.stack_height += num_variables - num_values;
                self.record_height(statement.id);
                return Ok(false);
            }
        } else {
            self.stack_height += num_variables;
        }

        for (i, variable) in decl.variables.iter().enumerate() {
            let given_type = self
                .expression_types
                .get(i)
                .cloned()
                .unwrap_or_else(|| self.dialect.default_type().clone());
            self.expect_valid_type(&variable.ty, variable.span)?;
            if variable.ty != given_type {
                self.reporter.type_error(
                    variable.span,
                    format!(
                        "Assigning value of type \"{}\" to variable of type \"{}.",
                        given_type, variable.ty
                    ),
                )?;
                success = false;
            }
            if let Some(var_id) = self
                .current_scope
                .and_then(|scope| self.info.scopes.variable_id(scope, &variable.name))
            {
                self.active_variables.insert(var_id);
            }
        }
        self.record_height(statement.id);
        Ok(success)
    }

    fn function_definition(
        &mut self,
        statement: &Statement,
        fun: &FunctionDefinition,
    ) -> Result<bool, Fatal> {
        debug_assert!(!fun.name.name.is_empty());
        let virtual_block = *self
            .info
            .virtual_blocks
            .get(&statement.id)
            .expect("internal: virtual block scope not present");

        for variable in fun.parameters.iter().chain(fun.returns.iter()) {
            self.expect_valid_type(&variable.ty, variable.span)?;
            if let Some(var_id) = self.info.scopes.variable_id(virtual_block, &variable.name) {
                self.active_variables.insert(var_id);
            }
        }

        // The body starts from its own baseline: parameters and return
        // variables are already on the stack.
        let outer_height = self.stack_height;
        self.stack_height = (fun.parameters.len() + fun.returns.len()) as i64;

        let success = self.block(&fun.body)?;

        self.stack_height = outer_height;
        self.record_height(statement.id);
        Ok(success)
    }

    fn if_statement(&mut self, statement: &Statement, if_stmt: &If) -> Result<bool, Fatal> {
        let mut success = true;
        let initial_height = self.stack_height;

        if !self.expect_expression(&if_stmt.condition)? {
            success = false;
        } else {
            let condition_type = self
                .expression_types
                .first()
                .cloned()
                .unwrap_or_else(|| self.dialect.default_type().clone());
            let bool_type = self.dialect.bool_type().clone();
            if !self.expect_type(&bool_type, &condition_type, if_stmt.condition.span)? {
                success = false;
            }
        }

        // The condition is consumed before the body runs.
        self.stack_height = initial_height;

        if !self.block(&if_stmt.body)? {
            success = false;
        }
        self.record_height(statement.id);
        Ok(success)
    }

    fn switch_statement(&mut self, statement: &Statement, switch: &Switch) -> Result<bool, Fatal> {
        let mut success = true;
        let initial_height = self.stack_height;

        if !self.expect_expression(&switch.expression)? {
            success = false;
        }
        let mut value_type = self.dialect.default_type().clone();
        if success {
            value_type = self
                .expression_types
                .first()
                .cloned()
                .unwrap_or(value_type);
        }

        for case in &switch.cases {
            if let Some(value) = &case.value {
                if let ExpressionKind::Literal(literal) = &value.kind {
                    let literal_type = literal.ty.clone();
                    if !self.expect_type(&value_type, &literal_type, value.span)? {
                        success = false;
                    }
                }
            }
        }

        let mut seen_cases: HashSet<BigUint> = HashSet::new();
        for case in &switch.cases {
            if let Some(value) = &case.value {
                let case_height = self.stack_height;
                let mut case_value_valid = true;
                if !self.expression(value)? {
                    case_value_valid = false;
                    success = false;
                }
                self.expect_deposit(1, case_height, value.span)?;
                self.stack_height -= 1;

                debug_assert!(
                    case_value_valid || self.reporter.has_errors(),
                    "invalid case value but no error"
                );
                if case_value_valid {
                    if let ExpressionKind::Literal(literal) = &value.kind {
                        if let Some(case_value) = literal.value() {
                            if !seen_cases.insert(case_value) {
                                self.reporter.declaration_error(
                                    case.span,
                                    "Duplicate case defined.".to_string(),
                                )?;
                                success = false;
                            }
                        }
                    }
                }
            }
            if !self.block(&case.body)? {
                success = false;
            }
        }

        self.stack_height = initial_height;
        self.record_height(statement.id);
        Ok(success)
    }

    fn for_loop(&mut self, statement: &Statement, for_loop: &ForLoop) -> Result<bool, Fatal> {
        let outer_scope = self.current_scope;
        let initial_height = self.stack_height;

        let mut success = self.block(&for_loop.pre)?;

        // The pre-block was closed, but condition, body, and post share
        // its scope: re-open it and put its variables back on the stack.
        let pre_scope = self.scope_of(&for_loop.pre);
        self.stack_height += self.info.scopes.num_variables(pre_scope) as i64;
        self.current_scope = Some(pre_scope);

        if !self.expect_expression(&for_loop.condition)? {
            success = false;
        } else {
            let condition_type = self
                .expression_types
                .first()
                .cloned()
                .unwrap_or_else(|| self.dialect.default_type().clone());
            let bool_type = self.dialect.bool_type().clone();
            if !self.expect_type(&bool_type, &condition_type, for_loop.condition.span)? {
                success = false;
            }
        }
        self.stack_height -= 1;

        let outer_for_loop = self.current_for_loop;
        self.current_for_loop = Some(statement.id);

        if !self.block(&for_loop.body)? {
            success = false;
        }
        if !self.block(&for_loop.post)? {
            success = false;
        }

        self.stack_height = initial_height;
        self.record_height(statement.id);
        self.current_scope = outer_scope;
        self.current_for_loop = outer_for_loop;
        Ok(success)
    }

    fn block(&mut self, block: &Block) -> Result<bool, Fatal> {
        let mut success = true;
        let previous_scope = self.current_scope;
        let scope = self.scope_of(block);
        self.current_scope = Some(scope);

        let initial_height = self.stack_height;

        for statement in &block.statements {
            if !self.statement(statement)? {
                success = false;
            }
        }

        // Variables declared in the block go out of scope here.
        self.stack_height -= self.info.scopes.num_variables(scope) as i64;

        let stack_diff = self.stack_height - initial_height;
        if success && stack_diff != 0 {
            self.reporter.declaration_error(
                block.span,
                format!(
                    "Unbalanced stack at the end of a block: {}",
                    if stack_diff > 0 {
                        format!("{} surplus item(s).", stack_diff)
                    } else {
                        format!("{} missing item(s).", -stack_diff)
                    }
                ),
            )?;
            success = false;
        }

        self.record_height(block.id);
        self.current_scope = previous_scope;
        Ok(success)
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn expression(&mut self, expression: &Expression) -> Result<bool, Fatal> {
        match &expression.kind {
            ExpressionKind::Literal(literal) => self.literal(expression, literal),
            ExpressionKind::Identifier(identifier) => self.identifier(expression, identifier),
            ExpressionKind::FunctionCall(call) => self.function_call(expression, call),
        }
    }

    fn literal(&mut self, expression: &Expression, literal: &Literal) -> Result<bool, Fatal> {
        let mut success = true;
        self.expect_valid_type(&literal.ty, expression.span)?;
        self.stack_height += 1;

        match literal.kind {
            LiteralKind::String if literal.value.len() > 32 => {
                self.reporter.type_error(
                    expression.span,
                    format!("String literal too long ({} > 32)", literal.value.len()),
                )?;
                success = false;
            }
            LiteralKind::Number => {
                if literal.value().is_some_and(|value| value > u256_max()) {
                    self.reporter.type_error(
                        expression.span,
                        "Number literal too large (> 256 bits)".to_string(),
                    )?;
                    success = false;
                }
            }
            LiteralKind::Boolean => {
                debug_assert!(literal.value == "true" || literal.value == "false");
            }
            LiteralKind::String => {}
        }

        let dialect = self.dialect;
        if !dialect.valid_type_for_literal(literal.kind, &literal.value, &literal.ty) {
            self.reporter.type_error(
                expression.span,
                format!(
                    "Invalid type \"{}\" for literal \"{}\".",
                    literal.ty, literal.value
                ),
            )?;
            success = false;
        }

        self.record_height(expression.id);
        self.expression_types = vec![literal.ty.clone()];
        Ok(success)
    }

    fn identifier(
        &mut self,
        expression: &Expression,
        identifier: &Identifier,
    ) -> Result<bool, Fatal> {
        debug_assert!(!identifier.name.is_empty());
        let errors_before = self.reporter.diagnostics().len();
        let mut success = true;

        self.expression_types = vec![self.dialect.default_type().clone()];
        match self.lookup(&identifier.name) {
            Some(ScopeEntry::Variable(variable)) => {
                if !self.active_variables.contains(&variable.id) {
                    self.reporter.declaration_error(
                        identifier.span,
                        format!(
                            "Variable {} used before it was declared.",
                            identifier.name
                        ),
                    )?;
                    success = false;
                }
                self.expression_types = vec![variable.ty];
                self.stack_height += 1;
            }
            Some(ScopeEntry::Function(_)) => {
                self.reporter.type_error(
                    identifier.span,
                    format!("Function {} used without being called.", identifier.name),
                )?;
                success = false;
            }
            None => {
                match self.resolve_external(identifier, IdentifierContext::RValue) {
                    Some(stack_size) => self.stack_height += stack_size as i64,
                    None => {
                        // Only add an error message if the callback did not.
                        if self.reporter.diagnostics().len() == errors_before {
                            self.reporter.declaration_error(
                                identifier.span,
                                "Identifier not found.".to_string(),
                            )?;
                        }
                        success = false;
                        self.stack_height += 1;
                    }
                }
            }
        }
        self.record_height(expression.id);
        Ok(success)
    }

    fn function_call(
        &mut self,
        expression: &Expression,
        call: &FunctionCall,
    ) -> Result<bool, Fatal> {
        debug_assert!(!call.name.name.is_empty());
        let mut success = true;
        let mut parameter_types: Option<Vec<TypeName>> = None;
        let mut return_types: Option<Vec<TypeName>> = None;
        let mut needs_literal_arguments = false;

        let dialect = self.dialect;
        if let Some(builtin) = dialect.builtin(&call.name.name) {
            parameter_types = Some(builtin.parameters.clone());
            return_types = Some(builtin.returns.clone());
            needs_literal_arguments = builtin.literal_arguments;
        } else {
            match self.lookup(&call.name.name) {
                Some(ScopeEntry::Variable(_)) => {
                    self.reporter.type_error(
                        call.name.span,
                        "Attempt to call variable instead of function.".to_string(),
                    )?;
                    success = false;
                }
                Some(ScopeEntry::Function(function)) => {
                    parameter_types = Some(function.arguments);
                    return_types = Some(function.returns);
                }
                None => {
                    if !self.warn_on_instruction_name(&call.name.name, call.name.span)? {
                        self.reporter.declaration_error(
                            call.name.span,
                            "Function not found.".to_string(),
                        )?;
                    }
                    success = false;
                }
            }
        }

        if success {
            let parameters = parameter_types
                .as_ref()
                .expect("internal: resolved call without parameter types");
            if call.arguments.len() != parameters.len() {
                self.reporter.type_error(
                    call.name.span,
                    format!(
                        "Function expects {} arguments but got {}.",
                        parameters.len(),
                        call.arguments.len()
                    ),
                )?;
                success = false;
            }
        }

        // Arguments are analyzed right to left so the recorded stack
        // heights mirror the order the code generator pushes them.
        let mut argument_types = Vec::with_capacity(call.arguments.len());
        for argument in call.arguments.iter().rev() {
            if !self.expect_expression(argument)? {
                success = false;
                continue;
            }
            let argument_type = self
                .expression_types
                .first()
                .cloned()
                .unwrap_or_else(|| self.dialect.default_type().clone());
            argument_types.push(argument_type);

            if needs_literal_arguments {
                match &argument.kind {
                    ExpressionKind::Literal(literal) => {
                        if !self.data_names.contains(literal.value.as_str()) {
                            self.reporter.type_error(
                                call.name.span,
                                format!("Unknown data object \"{}\".", literal.value),
                            )?;
                        }
                    }
                    _ => {
                        self.reporter.type_error(
                            call.name.span,
                            "Function expects direct literals as arguments.".to_string(),
                        )?;
                    }
                }
            }
        }
        argument_types.reverse();

        if success {
            let parameters = parameter_types
                .as_ref()
                .expect("internal: resolved call without parameter types");
            debug_assert_eq!(parameters.len(), argument_types.len());
            for (i, (expected, given)) in
                parameters.iter().zip(argument_types.iter()).enumerate()
            {
                let expected = expected.clone();
                let given = given.clone();
                if !self.expect_type(&expected, &given, call.arguments[i].span)? {
                    success = false;
                }
            }
        }

        // Use the argument count rather than the parameter count so one
        // arity error does not cascade into stack-balance errors.
        let num_returns = return_types.as_ref().map_or(0, |returns| returns.len());
        self.stack_height += num_returns as i64 - call.arguments.len() as i64;
        self.record_height(expression.id);

        self.expression_types = if success {
            return_types.expect("internal: resolved call without return types")
        } else {
            vec![self.dialect.default_type().clone(); num_returns]
        };
        Ok(success)
    }

    // ── Shared checks ───────────────────────────────────────────────────

    /// Analyze an expression and require it to deposit exactly one item.
    fn expect_expression(&mut self, expression: &Expression) -> Result<bool, Fatal> {
        let mut success = true;
        let initial_height = self.stack_height;
        if !self.expression(expression)? {
            success = false;
        }
        if success && !self.expect_deposit(1, initial_height, expression.span)? {
            success = false;
        }
        Ok(success)
    }

    fn expect_deposit(
        &mut self,
        deposit: i64,
        old_height: i64,
        span: Span,
    ) -> Result<bool, Fatal> {
        if self.stack_height - old_height != deposit {
            self.reporter.type_error(
                span,
                format!(
                    "Expected expression to return one item to the stack, but did return {} items.",
                    self.stack_height - old_height
                ),
            )?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Resolve an assignment target and charge one stack slot for it.
    fn check_assignment(
        &mut self,
        variable: &Identifier,
        value_type: TypeName,
    ) -> Result<bool, Fatal> {
        debug_assert!(!variable.name.is_empty());
        let mut success = true;
        let errors_before = self.reporter.diagnostics().len();
        let mut variable_size: Option<usize> = None;
        let mut variable_type = self.dialect.default_type().clone();

        match self.lookup(&variable.name) {
            Some(ScopeEntry::Variable(var)) => {
                if !self.active_variables.contains(&var.id) {
                    self.reporter.declaration_error(
                        variable.span,
                        format!("Variable {} used before it was declared.", variable.name),
                    )?;
                    success = false;
                } else {
                    variable_type = var.ty;
                }
                variable_size = Some(1);
            }
            Some(ScopeEntry::Function(_)) => {
                self.reporter
                    .type_error(variable.span, "Assignment requires variable.".to_string())?;
                success = false;
                variable_size = Some(1);
            }
            None => {
                variable_size = self.resolve_external(variable, IdentifierContext::LValue);
            }
        }

        if variable_size.is_none() {
            // Only add a message if the callback did not.
            if self.reporter.diagnostics().len() == errors_before {
                self.reporter.declaration_error(
                    variable.span,
                    "Variable not found or variable not lvalue.".to_string(),
                )?;
            }
            success = false;
        }

        self.stack_height -= 1;

        if let Some(size) = variable_size {
            if size != 1 {
                self.reporter.type_error(
                    variable.span,
                    format!("Variable size ({}) and value size (1) do not match.", size),
                )?;
                success = false;
            }
        }

        if success && variable_type != value_type {
            self.reporter.type_error(
                variable.span,
                format!(
                    "Assigning a value of type \"{}\" to a variable of type \"{}\".",
                    value_type, variable_type
                ),
            )?;
            success = false;
        }

        Ok(success)
    }

    fn expect_valid_type(&mut self, ty: &TypeName, span: Span) -> Result<(), Fatal> {
        let dialect = self.dialect;
        if !dialect.valid_type(ty) {
            self.reporter.type_error(
                span,
                format!(
                    "\"{}\" is not a valid type (user defined types are not yet supported).",
                    ty
                ),
            )?;
        }
        Ok(())
    }

    fn expect_type(
        &mut self,
        expected: &TypeName,
        given: &TypeName,
        span: Span,
    ) -> Result<bool, Fatal> {
        if expected != given {
            // The missing closing quote is part of the stable message text.
            self.reporter.type_error(
                span,
                format!("Expected a value of type \"{}\" but got \"{}", expected, given),
            )?;
            return Ok(false);
        }
        Ok(true)
    }

    // ── Legacy instruction guards ───────────────────────────────────────

    /// Classify a call name the dialect and scope chain both rejected.
    /// True iff a version guard or jump diagnostic fired, in which case
    /// the generic "Function not found." message is suppressed.
    fn warn_on_instruction_name(&mut self, name: &str, span: Span) -> Result<bool, Fatal> {
        match EvmDialect::reference()
            .builtin(name)
            .and_then(|builtin| builtin.instruction)
        {
            Some(instruction) => self.warn_on_instruction(instruction, span),
            None => Ok(false),
        }
    }

    fn warn_on_instruction(
        &mut self,
        instruction: Instruction,
        span: Span,
    ) -> Result<bool, Fatal> {
        // Returndata access and staticcall arrive together, as do bitwise
        // shifts and create2.
        debug_assert_eq!(
            self.evm_version.supports_returndata(),
            self.evm_version.has_static_call()
        );
        debug_assert_eq!(
            self.evm_version.has_bitwise_shifting(),
            self.evm_version.has_create2()
        );

        let version = self.evm_version;
        let guard = |kind_message: &str| {
            // The doubled space is part of the stable message text.
            format!(
                "The \"{}\" instruction is {} VMs  (you are currently compiling for \"{}\").",
                instruction.name().to_lowercase(),
                kind_message,
                version
            )
        };

        match instruction {
            Instruction::ReturnDataCopy | Instruction::ReturnDataSize
                if !version.supports_returndata() =>
            {
                let message = guard("only available for Byzantium-compatible");
                self.reporter.type_error(span, message)?;
            }
            Instruction::StaticCall if !version.has_static_call() => {
                let message = guard("only available for Byzantium-compatible");
                self.reporter.type_error(span, message)?;
            }
            Instruction::Shl | Instruction::Shr | Instruction::Sar
                if !version.has_bitwise_shifting() =>
            {
                let message = guard("only available for Constantinople-compatible");
                self.reporter.type_error(span, message)?;
            }
            Instruction::Create2 if !version.has_create2() => {
                let message = guard("only available for Constantinople-compatible");
                self.reporter.type_error(span, message)?;
            }
            Instruction::ExtCodeHash if !version.has_ext_code_hash() => {
                let message = guard("only available for Constantinople-compatible");
                self.reporter.type_error(span, message)?;
            }
            Instruction::ChainId if !version.has_chain_id() => {
                let message = guard("only available for Istanbul-compatible");
                self.reporter.type_error(span, message)?;
            }
            Instruction::SelfBalance if !version.has_self_balance() => {
                let message = guard("only available for Istanbul-compatible");
                self.reporter.type_error(span, message)?;
            }
            Instruction::Jump | Instruction::JumpI | Instruction::JumpDest => {
                self.reporter.syntax_error(
                    span,
                    "Jump instructions and labels are low-level EVM features that can lead to \
                     incorrect stack access. Because of that they are disallowed in strict \
                     assembly. Use functions, \"switch\", \"if\" or \"for\" statements instead."
                        .to_string(),
                )?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn lookup(&self, name: &str) -> Option<ScopeEntry> {
        let scope = self.current_scope?;
        self.info.scopes.lookup(scope, name).cloned()
    }

    fn resolve_external(
        &mut self,
        identifier: &Identifier,
        context: IdentifierContext,
    ) -> Option<usize> {
        let inside_function = self
            .current_scope
            .is_some_and(|scope| self.info.scopes.inside_function(scope));
        let resolver = self.resolver.as_mut()?;
        resolver(identifier, context, inside_function, self.reporter)
    }

    fn scope_of(&self, block: &Block) -> ScopeId {
        *self
            .info
            .block_scopes
            .get(&block.id)
            .expect("internal: scope requested but not present")
    }

    fn record_height(&mut self, node: NodeId) {
        let previous = self.info.stack_heights.insert(node, self.stack_height);
        debug_assert!(
            previous.is_none(),
            "stack height recorded twice for {:?}",
            node
        );
    }
}
