// dialect.rs — Target dialect contract and the EVM dialects
//
// A dialect describes the target machine surface the analyzer checks
// against: which primitive types exist, which type is boolean, which
// builtin functions are callable with what signatures, and which literals
// are admissible at which types. The analyzer only ever talks to the
// `Dialect` trait; concrete EVM dialects live here so the embedding
// compiler and the tests have real instances to hand it.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::ast::{LiteralKind, TypeName};
use crate::evm::{EvmVersion, Instruction};

// ── Builtin descriptor ───────────────────────────────────────────────────

/// Signature and constraints of one dialect builtin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinFunction {
    pub name: String,
    pub parameters: Vec<TypeName>,
    pub returns: Vec<TypeName>,
    /// The builtin requires syntactic literals as arguments, checked
    /// against the known data names (e.g. `datasize`).
    pub literal_arguments: bool,
    /// The machine instruction this builtin lowers to, when it is a plain
    /// instruction wrapper.
    pub instruction: Option<Instruction>,
}

// ── Dialect contract ─────────────────────────────────────────────────────

/// Description of the target machine's primitive types and builtins.
pub trait Dialect {
    /// The type assumed where none is written.
    fn default_type(&self) -> &TypeName;

    /// The type condition expressions must produce.
    fn bool_type(&self) -> &TypeName;

    /// Whether `ty` names a primitive type of this dialect.
    fn valid_type(&self, ty: &TypeName) -> bool;

    fn builtin(&self, name: &str) -> Option<&BuiltinFunction>;

    /// Whether a literal of the given kind and value is admissible at the
    /// given declared type.
    fn valid_type_for_literal(&self, kind: LiteralKind, value: &str, ty: &TypeName) -> bool;
}

// ── Untyped strict-assembly EVM dialect ──────────────────────────────────

/// The untyped strict-assembly dialect: a single (empty) type, builtins
/// generated from the instruction table and gated on the target fork.
#[derive(Debug)]
pub struct EvmDialect {
    version: EvmVersion,
    default_type: TypeName,
    bool_type: TypeName,
    types: HashSet<TypeName>,
    builtins: BTreeMap<String, BuiltinFunction>,
}

impl EvmDialect {
    fn new(version: EvmVersion, object_access: bool, ungated: bool) -> Self {
        let default_type = TypeName::default();
        let mut builtins = BTreeMap::new();
        for &instruction in Instruction::ALL {
            if instruction.is_jump() && !ungated {
                continue;
            }
            if !ungated && !version.has_opcode(instruction) {
                continue;
            }
            let info = instruction.info();
            let name = info.name.to_lowercase();
            builtins.insert(
                name.clone(),
                BuiltinFunction {
                    name,
                    parameters: vec![default_type.clone(); info.args],
                    returns: vec![default_type.clone(); info.rets],
                    literal_arguments: false,
                    instruction: Some(instruction),
                },
            );
        }
        if object_access {
            for accessor in ["datasize", "dataoffset"] {
                builtins.insert(
                    accessor.to_string(),
                    BuiltinFunction {
                        name: accessor.to_string(),
                        parameters: vec![default_type.clone()],
                        returns: vec![default_type.clone()],
                        literal_arguments: true,
                        instruction: None,
                    },
                );
            }
            builtins.insert(
                "datacopy".to_string(),
                BuiltinFunction {
                    name: "datacopy".to_string(),
                    parameters: vec![default_type.clone(); 3],
                    returns: Vec::new(),
                    literal_arguments: false,
                    instruction: None,
                },
            );
        }
        EvmDialect {
            version,
            bool_type: default_type.clone(),
            types: HashSet::from([default_type.clone()]),
            default_type,
            builtins,
        }
    }

    /// The strict-assembly dialect for a fork, without object access.
    pub fn strict_assembly_for_evm(version: EvmVersion) -> &'static EvmDialect {
        &instances()[&(version, false)]
    }

    /// The strict-assembly dialect for a fork, with the `datasize` /
    /// `dataoffset` / `datacopy` object accessors.
    pub fn strict_assembly_for_evm_objects(version: EvmVersion) -> &'static EvmDialect {
        &instances()[&(version, true)]
    }

    /// Ungated newest-fork instance used to classify names the compilation
    /// dialect rejected: it knows the jump family and every version-gated
    /// opcode, so guards can name the instruction in their diagnostic.
    pub fn reference() -> &'static EvmDialect {
        static REFERENCE: Lazy<EvmDialect> =
            Lazy::new(|| EvmDialect::new(EvmVersion::Berlin, true, true));
        &REFERENCE
    }

    pub fn version(&self) -> EvmVersion {
        self.version
    }
}

fn instances() -> &'static BTreeMap<(EvmVersion, bool), EvmDialect> {
    static INSTANCES: Lazy<BTreeMap<(EvmVersion, bool), EvmDialect>> = Lazy::new(|| {
        let mut map = BTreeMap::new();
        for &version in EvmVersion::ALL {
            map.insert((version, false), EvmDialect::new(version, false, false));
            map.insert((version, true), EvmDialect::new(version, true, false));
        }
        map
    });
    &INSTANCES
}

impl Dialect for EvmDialect {
    fn default_type(&self) -> &TypeName {
        &self.default_type
    }

    fn bool_type(&self) -> &TypeName {
        &self.bool_type
    }

    fn valid_type(&self, ty: &TypeName) -> bool {
        self.types.contains(ty)
    }

    fn builtin(&self, name: &str) -> Option<&BuiltinFunction> {
        self.builtins.get(name)
    }

    fn valid_type_for_literal(&self, _kind: LiteralKind, _value: &str, ty: &TypeName) -> bool {
        ty == &self.default_type
    }
}

// ── Typed EVM dialect ────────────────────────────────────────────────────

/// Typed strict-assembly dialect with `u256` (default) and `bool`.
/// Comparison builtins produce `bool`, condition-consuming positions
/// require it, and `popbool` discards one.
#[derive(Debug)]
pub struct EvmDialectTyped {
    default_type: TypeName,
    bool_type: TypeName,
    types: HashSet<TypeName>,
    builtins: BTreeMap<String, BuiltinFunction>,
}

impl EvmDialectTyped {
    fn new(version: EvmVersion) -> Self {
        let u256: TypeName = "u256".into();
        let boolean: TypeName = "bool".into();
        let mut builtins = BTreeMap::new();
        for &instruction in Instruction::ALL {
            if instruction.is_jump() || !version.has_opcode(instruction) {
                continue;
            }
            let info = instruction.info();
            let name = info.name.to_lowercase();
            let returns = match instruction {
                Instruction::IsZero
                | Instruction::Lt
                | Instruction::Gt
                | Instruction::SLt
                | Instruction::SGt
                | Instruction::Eq => vec![boolean.clone()],
                _ => vec![u256.clone(); info.rets],
            };
            builtins.insert(
                name.clone(),
                BuiltinFunction {
                    name,
                    parameters: vec![u256.clone(); info.args],
                    returns,
                    literal_arguments: false,
                    instruction: Some(instruction),
                },
            );
        }
        builtins.insert(
            "popbool".to_string(),
            BuiltinFunction {
                name: "popbool".to_string(),
                parameters: vec![boolean.clone()],
                returns: Vec::new(),
                literal_arguments: false,
                instruction: Some(Instruction::Pop),
            },
        );
        EvmDialectTyped {
            types: HashSet::from([u256.clone(), boolean.clone()]),
            default_type: u256,
            bool_type: boolean,
            builtins,
        }
    }

    pub fn instance(version: EvmVersion) -> &'static EvmDialectTyped {
        static INSTANCES: Lazy<BTreeMap<EvmVersion, EvmDialectTyped>> = Lazy::new(|| {
            EvmVersion::ALL
                .iter()
                .map(|&v| (v, EvmDialectTyped::new(v)))
                .collect()
        });
        &INSTANCES[&version]
    }
}

impl Dialect for EvmDialectTyped {
    fn default_type(&self) -> &TypeName {
        &self.default_type
    }

    fn bool_type(&self) -> &TypeName {
        &self.bool_type
    }

    fn valid_type(&self, ty: &TypeName) -> bool {
        self.types.contains(ty)
    }

    fn builtin(&self, name: &str) -> Option<&BuiltinFunction> {
        self.builtins.get(name)
    }

    fn valid_type_for_literal(&self, kind: LiteralKind, _value: &str, ty: &TypeName) -> bool {
        match kind {
            LiteralKind::Boolean => ty == &self.bool_type,
            LiteralKind::Number | LiteralKind::String => ty == &self.default_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untyped_dialect_exposes_gated_builtins() {
        let homestead = EvmDialect::strict_assembly_for_evm(EvmVersion::Homestead);
        assert!(homestead.builtin("add").is_some());
        assert!(homestead.builtin("staticcall").is_none());
        assert!(homestead.builtin("shl").is_none());

        let istanbul = EvmDialect::strict_assembly_for_evm(EvmVersion::Istanbul);
        assert!(istanbul.builtin("staticcall").is_some());
        assert!(istanbul.builtin("selfbalance").is_some());
    }

    #[test]
    fn jumps_are_never_compilation_builtins() {
        let istanbul = EvmDialect::strict_assembly_for_evm(EvmVersion::Istanbul);
        assert!(istanbul.builtin("jump").is_none());
        assert!(istanbul.builtin("jumpi").is_none());
        assert!(istanbul.builtin("jumpdest").is_none());
    }

    #[test]
    fn reference_dialect_knows_everything() {
        let reference = EvmDialect::reference();
        for name in ["jump", "jumpi", "jumpdest", "shl", "create2", "chainid"] {
            assert!(reference.builtin(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn object_access_builtins() {
        let dialect = EvmDialect::strict_assembly_for_evm_objects(EvmVersion::Istanbul);
        let datasize = dialect.builtin("datasize").unwrap();
        assert!(datasize.literal_arguments);
        assert_eq!(datasize.parameters.len(), 1);
        assert_eq!(datasize.returns.len(), 1);
        assert_eq!(dialect.builtin("datacopy").unwrap().parameters.len(), 3);
        assert!(
            EvmDialect::strict_assembly_for_evm(EvmVersion::Istanbul)
                .builtin("datasize")
                .is_none()
        );
    }

    #[test]
    fn builtin_arities_match_instruction_table() {
        let dialect = EvmDialect::strict_assembly_for_evm(EvmVersion::Istanbul);
        let call = dialect.builtin("call").unwrap();
        assert_eq!(call.parameters.len(), 7);
        assert_eq!(call.returns.len(), 1);
        assert_eq!(call.instruction, Some(Instruction::Call));
    }

    #[test]
    fn typed_dialect_types_and_literals() {
        let dialect = EvmDialectTyped::instance(EvmVersion::Istanbul);
        assert_eq!(dialect.bool_type().as_str(), "bool");
        assert_eq!(dialect.default_type().as_str(), "u256");
        assert!(dialect.valid_type(&"bool".into()));
        assert!(!dialect.valid_type(&"u128".into()));
        assert!(dialect.valid_type_for_literal(LiteralKind::Boolean, "true", &"bool".into()));
        assert!(!dialect.valid_type_for_literal(LiteralKind::Boolean, "true", &"u256".into()));
        assert!(dialect.valid_type_for_literal(LiteralKind::Number, "1", &"u256".into()));
        assert_eq!(
            dialect.builtin("lt").unwrap().returns,
            vec![TypeName::from("bool")]
        );
        assert_eq!(
            dialect.builtin("popbool").unwrap().parameters,
            vec![TypeName::from("bool")]
        );
    }
}
