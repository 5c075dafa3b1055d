// evm.rs — EVM instruction and hard-fork version model
//
// The subset of the EVM instruction set the dialects expose as builtins,
// with stack arities, plus the hard-fork feature flags the analyzer
// consults when guarding version-gated instructions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Instructions ─────────────────────────────────────────────────────────

/// EVM opcodes surfaced through dialect builtins. Stack-manipulation
/// opcodes (`DUP*`, `SWAP*`, `PUSH*`) are never exposed and are omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    Stop,
    Add,
    Sub,
    Mul,
    Div,
    SDiv,
    Mod,
    SMod,
    Exp,
    Not,
    Lt,
    Gt,
    SLt,
    SGt,
    Eq,
    IsZero,
    And,
    Or,
    Xor,
    Byte,
    Shl,
    Shr,
    Sar,
    AddMod,
    MulMod,
    SignExtend,
    Keccak256,
    Address,
    Balance,
    Origin,
    Caller,
    CallValue,
    CallDataLoad,
    CallDataSize,
    CallDataCopy,
    CodeSize,
    CodeCopy,
    GasPrice,
    ExtCodeSize,
    ExtCodeCopy,
    ReturnDataSize,
    ReturnDataCopy,
    ExtCodeHash,
    BlockHash,
    Coinbase,
    Timestamp,
    Number,
    Difficulty,
    GasLimit,
    ChainId,
    SelfBalance,
    Pop,
    MLoad,
    MStore,
    MStore8,
    SLoad,
    SStore,
    Jump,
    JumpI,
    JumpDest,
    Pc,
    MSize,
    Gas,
    Log0,
    Log1,
    Log2,
    Log3,
    Log4,
    Create,
    Call,
    CallCode,
    Return,
    DelegateCall,
    Create2,
    StaticCall,
    Revert,
    Invalid,
    SelfDestruct,
}

/// Mnemonic and stack arity of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionInfo {
    pub name: &'static str,
    pub args: usize,
    pub rets: usize,
}

const fn info(name: &'static str, args: usize, rets: usize) -> InstructionInfo {
    InstructionInfo { name, args, rets }
}

impl Instruction {
    /// Every instruction, in opcode order. Dialects iterate this to build
    /// their builtin tables.
    pub const ALL: &'static [Instruction] = &[
        Instruction::Stop,
        Instruction::Add,
        Instruction::Sub,
        Instruction::Mul,
        Instruction::Div,
        Instruction::SDiv,
        Instruction::Mod,
        Instruction::SMod,
        Instruction::Exp,
        Instruction::Not,
        Instruction::Lt,
        Instruction::Gt,
        Instruction::SLt,
        Instruction::SGt,
        Instruction::Eq,
        Instruction::IsZero,
        Instruction::And,
        Instruction::Or,
        Instruction::Xor,
        Instruction::Byte,
        Instruction::Shl,
        Instruction::Shr,
        Instruction::Sar,
        Instruction::AddMod,
        Instruction::MulMod,
        Instruction::SignExtend,
        Instruction::Keccak256,
        Instruction::Address,
        Instruction::Balance,
        Instruction::Origin,
        Instruction::Caller,
        Instruction::CallValue,
        Instruction::CallDataLoad,
        Instruction::CallDataSize,
        Instruction::CallDataCopy,
        Instruction::CodeSize,
        Instruction::CodeCopy,
        Instruction::GasPrice,
        Instruction::ExtCodeSize,
        Instruction::ExtCodeCopy,
        Instruction::ReturnDataSize,
        Instruction::ReturnDataCopy,
        Instruction::ExtCodeHash,
        Instruction::BlockHash,
        Instruction::Coinbase,
        Instruction::Timestamp,
        Instruction::Number,
        Instruction::Difficulty,
        Instruction::GasLimit,
        Instruction::ChainId,
        Instruction::SelfBalance,
        Instruction::Pop,
        Instruction::MLoad,
        Instruction::MStore,
        Instruction::MStore8,
        Instruction::SLoad,
        Instruction::SStore,
        Instruction::Jump,
        Instruction::JumpI,
        Instruction::JumpDest,
        Instruction::Pc,
        Instruction::MSize,
        Instruction::Gas,
        Instruction::Log0,
        Instruction::Log1,
        Instruction::Log2,
        Instruction::Log3,
        Instruction::Log4,
        Instruction::Create,
        Instruction::Call,
        Instruction::CallCode,
        Instruction::Return,
        Instruction::DelegateCall,
        Instruction::Create2,
        Instruction::StaticCall,
        Instruction::Revert,
        Instruction::Invalid,
        Instruction::SelfDestruct,
    ];

    pub fn info(&self) -> InstructionInfo {
        match self {
            Instruction::Stop => info("STOP", 0, 0),
            Instruction::Add => info("ADD", 2, 1),
            Instruction::Sub => info("SUB", 2, 1),
            Instruction::Mul => info("MUL", 2, 1),
            Instruction::Div => info("DIV", 2, 1),
            Instruction::SDiv => info("SDIV", 2, 1),
            Instruction::Mod => info("MOD", 2, 1),
            Instruction::SMod => info("SMOD", 2, 1),
            Instruction::Exp => info("EXP", 2, 1),
            Instruction::Not => info("NOT", 1, 1),
            Instruction::Lt => info("LT", 2, 1),
            Instruction::Gt => info("GT", 2, 1),
            Instruction::SLt => info("SLT", 2, 1),
            Instruction::SGt => info("SGT", 2, 1),
            Instruction::Eq => info("EQ", 2, 1),
            Instruction::IsZero => info("ISZERO", 1, 1),
            Instruction::And => info("AND", 2, 1),
            Instruction::Or => info("OR", 2, 1),
            Instruction::Xor => info("XOR", 2, 1),
            Instruction::Byte => info("BYTE", 2, 1),
            Instruction::Shl => info("SHL", 2, 1),
            Instruction::Shr => info("SHR", 2, 1),
            Instruction::Sar => info("SAR", 2, 1),
            Instruction::AddMod => info("ADDMOD", 3, 1),
            Instruction::MulMod => info("MULMOD", 3, 1),
            Instruction::SignExtend => info("SIGNEXTEND", 2, 1),
            Instruction::Keccak256 => info("KECCAK256", 2, 1),
            Instruction::Address => info("ADDRESS", 0, 1),
            Instruction::Balance => info("BALANCE", 1, 1),
            Instruction::Origin => info("ORIGIN", 0, 1),
            Instruction::Caller => info("CALLER", 0, 1),
            Instruction::CallValue => info("CALLVALUE", 0, 1),
            Instruction::CallDataLoad => info("CALLDATALOAD", 1, 1),
            Instruction::CallDataSize => info("CALLDATASIZE", 0, 1),
            Instruction::CallDataCopy => info("CALLDATACOPY", 3, 0),
            Instruction::CodeSize => info("CODESIZE", 0, 1),
            Instruction::CodeCopy => info("CODECOPY", 3, 0),
            Instruction::GasPrice => info("GASPRICE", 0, 1),
            Instruction::ExtCodeSize => info("EXTCODESIZE", 1, 1),
            Instruction::ExtCodeCopy => info("EXTCODECOPY", 4, 0),
            Instruction::ReturnDataSize => info("RETURNDATASIZE", 0, 1),
            Instruction::ReturnDataCopy => info("RETURNDATACOPY", 3, 0),
            Instruction::ExtCodeHash => info("EXTCODEHASH", 1, 1),
            Instruction::BlockHash => info("BLOCKHASH", 1, 1),
            Instruction::Coinbase => info("COINBASE", 0, 1),
            Instruction::Timestamp => info("TIMESTAMP", 0, 1),
            Instruction::Number => info("NUMBER", 0, 1),
            Instruction::Difficulty => info("DIFFICULTY", 0, 1),
            Instruction::GasLimit => info("GASLIMIT", 0, 1),
            Instruction::ChainId => info("CHAINID", 0, 1),
            Instruction::SelfBalance => info("SELFBALANCE", 0, 1),
            Instruction::Pop => info("POP", 1, 0),
            Instruction::MLoad => info("MLOAD", 1, 1),
            Instruction::MStore => info("MSTORE", 2, 0),
            Instruction::MStore8 => info("MSTORE8", 2, 0),
            Instruction::SLoad => info("SLOAD", 1, 1),
            Instruction::SStore => info("SSTORE", 2, 0),
            Instruction::Jump => info("JUMP", 1, 0),
            Instruction::JumpI => info("JUMPI", 2, 0),
            Instruction::JumpDest => info("JUMPDEST", 0, 0),
            Instruction::Pc => info("PC", 0, 1),
            Instruction::MSize => info("MSIZE", 0, 1),
            Instruction::Gas => info("GAS", 0, 1),
            Instruction::Log0 => info("LOG0", 2, 0),
            Instruction::Log1 => info("LOG1", 3, 0),
            Instruction::Log2 => info("LOG2", 4, 0),
            Instruction::Log3 => info("LOG3", 5, 0),
            Instruction::Log4 => info("LOG4", 6, 0),
            Instruction::Create => info("CREATE", 3, 1),
            Instruction::Call => info("CALL", 7, 1),
            Instruction::CallCode => info("CALLCODE", 7, 1),
            Instruction::Return => info("RETURN", 2, 0),
            Instruction::DelegateCall => info("DELEGATECALL", 6, 1),
            Instruction::Create2 => info("CREATE2", 4, 1),
            Instruction::StaticCall => info("STATICCALL", 6, 1),
            Instruction::Revert => info("REVERT", 2, 0),
            Instruction::Invalid => info("INVALID", 0, 0),
            Instruction::SelfDestruct => info("SELFDESTRUCT", 1, 0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// True if this is one of the low-level control-flow opcodes that
    /// strict assembly never exposes as builtins.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            Instruction::Jump | Instruction::JumpI | Instruction::JumpDest
        )
    }
}

// ── Hard-fork versions ───────────────────────────────────────────────────

/// Target hard fork. Variant order is chronological, so feature checks
/// reduce to ordering comparisons.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum EvmVersion {
    Homestead,
    TangerineWhistle,
    SpuriousDragon,
    Byzantium,
    Constantinople,
    Petersburg,
    Istanbul,
    Berlin,
}

impl Default for EvmVersion {
    fn default() -> Self {
        EvmVersion::Istanbul
    }
}

impl EvmVersion {
    /// Every supported fork, oldest first.
    pub const ALL: &'static [EvmVersion] = &[
        EvmVersion::Homestead,
        EvmVersion::TangerineWhistle,
        EvmVersion::SpuriousDragon,
        EvmVersion::Byzantium,
        EvmVersion::Constantinople,
        EvmVersion::Petersburg,
        EvmVersion::Istanbul,
        EvmVersion::Berlin,
    ];

    pub fn supports_returndata(&self) -> bool {
        *self >= EvmVersion::Byzantium
    }

    pub fn has_static_call(&self) -> bool {
        *self >= EvmVersion::Byzantium
    }

    pub fn has_bitwise_shifting(&self) -> bool {
        *self >= EvmVersion::Constantinople
    }

    pub fn has_create2(&self) -> bool {
        *self >= EvmVersion::Constantinople
    }

    pub fn has_ext_code_hash(&self) -> bool {
        *self >= EvmVersion::Constantinople
    }

    pub fn has_chain_id(&self) -> bool {
        *self >= EvmVersion::Istanbul
    }

    pub fn has_self_balance(&self) -> bool {
        *self >= EvmVersion::Istanbul
    }

    /// Whether the given instruction exists on this fork.
    pub fn has_opcode(&self, instruction: Instruction) -> bool {
        match instruction {
            Instruction::ReturnDataCopy | Instruction::ReturnDataSize => {
                self.supports_returndata()
            }
            Instruction::StaticCall => self.has_static_call(),
            Instruction::Shl | Instruction::Shr | Instruction::Sar => {
                self.has_bitwise_shifting()
            }
            Instruction::Create2 => self.has_create2(),
            Instruction::ExtCodeHash => self.has_ext_code_hash(),
            Instruction::ChainId => self.has_chain_id(),
            Instruction::SelfBalance => self.has_self_balance(),
            _ => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EvmVersion::Homestead => "homestead",
            EvmVersion::TangerineWhistle => "tangerineWhistle",
            EvmVersion::SpuriousDragon => "spuriousDragon",
            EvmVersion::Byzantium => "byzantium",
            EvmVersion::Constantinople => "constantinople",
            EvmVersion::Petersburg => "petersburg",
            EvmVersion::Istanbul => "istanbul",
            EvmVersion::Berlin => "berlin",
        }
    }
}

impl fmt::Display for EvmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when parsing an unknown version name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEvmVersion(pub String);

impl fmt::Display for UnknownEvmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown EVM version '{}'", self.0)
    }
}

impl std::error::Error for UnknownEvmVersion {}

impl FromStr for EvmVersion {
    type Err = UnknownEvmVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "homestead" => Ok(EvmVersion::Homestead),
            "tangerineWhistle" => Ok(EvmVersion::TangerineWhistle),
            "spuriousDragon" => Ok(EvmVersion::SpuriousDragon),
            "byzantium" => Ok(EvmVersion::Byzantium),
            "constantinople" => Ok(EvmVersion::Constantinople),
            "petersburg" => Ok(EvmVersion::Petersburg),
            "istanbul" => Ok(EvmVersion::Istanbul),
            "berlin" => Ok(EvmVersion::Berlin),
            _ => Err(UnknownEvmVersion(s.to_string())),
        }
    }
}
