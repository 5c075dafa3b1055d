// siltc — semantic analysis for silt inline assembly
//
// Library root. The analyzer validates parsed assembly trees against a
// target dialect and records the per-node results downstream phases use.

pub mod analyze;
pub mod ast;
pub mod diag;
pub mod dialect;
pub mod evm;
pub mod id;
pub mod object;
pub mod scope;
pub mod scope_fill;
