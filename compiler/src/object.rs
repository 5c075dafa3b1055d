// object.rs — Code-and-data object containers
//
// An object bundles an assembly block with named data blobs and nested
// sub-objects. Literal-argument builtins (`datasize`, `dataoffset`,
// `datacopy`) refer to these by name, so analysis of an object's code
// receives the set of names visible from it.

use std::collections::HashSet;

use crate::analyze::{AnalysisInfo, Analyzer};
use crate::ast::Block;
use crate::diag::Reporter;
use crate::dialect::Dialect;
use crate::evm::EvmVersion;

/// A named data blob referenced by literal-argument builtins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Either a nested object or a plain data blob.
#[derive(Debug)]
pub enum ObjectNode {
    Object(Object),
    Data(Data),
}

impl ObjectNode {
    pub fn name(&self) -> &str {
        match self {
            ObjectNode::Object(object) => &object.name,
            ObjectNode::Data(data) => &data.name,
        }
    }
}

/// A named assembly block with its attached data and sub-objects.
#[derive(Debug)]
pub struct Object {
    pub name: String,
    pub code: Block,
    pub sub_objects: Vec<ObjectNode>,
}

impl Object {
    /// Data names visible from this object's code: its own name plus the
    /// name of every direct sub-object. The empty name is not valid.
    pub fn data_names(&self) -> HashSet<String> {
        let mut names: HashSet<String> = HashSet::new();
        names.insert(self.name.clone());
        for sub_object in &self.sub_objects {
            names.insert(sub_object.name().to_string());
        }
        names.remove("");
        names
    }
}

/// Analyze an object the caller knows to be valid, asserting success and
/// zero diagnostics. Returns the populated analysis record.
///
/// # Panics
///
/// Panics if the object's code does not analyze cleanly.
pub fn analyze_strict_assert_correct(dialect: &dyn Dialect, object: &Object) -> AnalysisInfo {
    let mut info = AnalysisInfo::default();
    let mut reporter = Reporter::new();
    let success = Analyzer::new(&mut info, &mut reporter, dialect, EvmVersion::default())
        .with_data_names(object.data_names())
        .analyze(&object.code);
    assert!(
        success && reporter.diagnostics().is_empty(),
        "invalid assembly code: {:?}",
        reporter.diagnostics()
    );
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::AstBuilder;
    use crate::dialect::EvmDialect;

    fn data(name: &str) -> ObjectNode {
        ObjectNode::Data(Data {
            name: name.to_string(),
            contents: vec![0xde, 0xad],
        })
    }

    #[test]
    fn data_names_cover_self_and_sub_objects() {
        let mut b = AstBuilder::new();
        let code = b.block(vec![]);
        let mut sub_builder = AstBuilder::new();
        let sub = Object {
            name: "runtime".to_string(),
            code: sub_builder.block(vec![]),
            sub_objects: Vec::new(),
        };
        let object = Object {
            name: "wrapper".to_string(),
            code,
            sub_objects: vec![ObjectNode::Object(sub), data("table"), data("")],
        };

        let names = object.data_names();
        assert_eq!(
            names,
            HashSet::from([
                "wrapper".to_string(),
                "runtime".to_string(),
                "table".to_string()
            ])
        );
    }

    #[test]
    fn strict_analysis_returns_the_record() {
        let mut b = AstBuilder::new();
        let runtime_ref = b.string("runtime");
        let size = b.call("datasize", vec![runtime_ref]);
        let decl = b.declaration(&["size"], Some(size));
        let code = b.block(vec![decl]);
        let mut sub_builder = AstBuilder::new();
        let runtime = Object {
            name: "runtime".to_string(),
            code: sub_builder.block(vec![]),
            sub_objects: Vec::new(),
        };
        let object = Object {
            name: "wrapper".to_string(),
            code,
            sub_objects: vec![ObjectNode::Object(runtime)],
        };

        let dialect = EvmDialect::strict_assembly_for_evm_objects(EvmVersion::default());
        let info = analyze_strict_assert_correct(dialect, &object);
        assert_eq!(info.stack_heights[&object.code.id], 0);
    }

    #[test]
    #[should_panic(expected = "invalid assembly code")]
    fn strict_analysis_panics_on_bad_code() {
        let mut b = AstBuilder::new();
        let call = b.call("no_such_function", vec![]);
        let stmt = b.expression_statement(call);
        let object = Object {
            name: "wrapper".to_string(),
            code: b.block(vec![stmt]),
            sub_objects: Vec::new(),
        };
        let dialect = EvmDialect::strict_assembly_for_evm(EvmVersion::default());
        analyze_strict_assert_correct(dialect, &object);
    }
}
