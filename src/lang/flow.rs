use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use super::value::Value;

/// Ordered sequence of blocks. Order is execution order.
pub type FlowTree = Vec<Block>;

/// Instruction prefix of a `storein2_<name>` composite opcode.
const STORE_IN: &str = "storein2";
/// Instruction prefix of a `nameddo_<name>` composite opcode.
const NAMED_DO: &str = "nameddo";
/// Type prefix of a `bool_<true|false>` typed literal.
const BOOL_PREFIX: &str = "bool";
/// Type prefix of a `box_<name>` local-variable reference.
const BOX_PREFIX: &str = "box";

/// Head of a block, decoded once from its opcode string.
#[derive(Debug, Clone, PartialEq)]
pub enum Head {
    /// Plain opcode, resolved later against the control constructs and
    /// lookup tables.
    Op(String),

    /// `storein2_<name>`: declare a local variable.
    StoreIn(String),

    /// `nameddo_<name>`: invoke a user-defined action.
    NamedDo(String),
}

impl Head {
    pub fn decode(opcode: &str) -> Head {
        match opcode.split_once('_') {
            Some((STORE_IN, name)) => Head::StoreIn(name.to_string()),
            Some((NAMED_DO, name)) => Head::NamedDo(name.to_string()),
            _ => Head::Op(opcode.to_string()),
        }
    }

    /// Reconstruct the opcode text, as the editor wrote it.
    pub fn opcode(&self) -> String {
        match self {
            Head::Op(op) => op.clone(),
            Head::StoreIn(name) => format!("{}_{}", STORE_IN, name),
            Head::NamedDo(name) => format!("{}_{}", NAMED_DO, name),
        }
    }
}

/// Block argument tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Null,

    /// Scalar literal, including decoded `bool_` literals.
    Literal(Value),

    /// Reference to a local variable (`box_<name>`).
    LocalRef(String),

    /// Nested expression block: `[opcode, [args...]]`.
    Expr { opcode: String, args: Vec<Arg> },
}

impl Arg {
    pub fn expr(opcode: &str, args: Vec<Arg>) -> Arg {
        Arg::Expr {
            opcode: opcode.to_string(),
            args,
        }
    }

    fn decode_str(s: &str) -> Arg {
        match s.split_once('_') {
            Some((BOOL_PREFIX, val)) => Arg::Literal(Value::Bool(val == "true")),
            Some((BOX_PREFIX, name)) => Arg::LocalRef(name.to_string()),
            _ => Arg::Literal(Value::String(s.to_string())),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Arg::Null,
            other => Arg::Literal(other),
        }
    }
}

/// A single block: `[opcode, args?, body?, elseBody?]`.
///
/// For `switch` the body holds the case list; for `case` and `defaultcase`
/// the args hold the case value.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub head: Head,
    pub args: Vec<Arg>,
    pub body: Option<FlowTree>,
    pub else_body: Option<FlowTree>,
}

impl Block {
    pub fn new(opcode: &str, args: Vec<Arg>) -> Self {
        Block {
            head: Head::decode(opcode),
            args,
            body: None,
            else_body: None,
        }
    }

    pub fn with_body(mut self, body: FlowTree) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_else(mut self, else_body: FlowTree) -> Self {
        self.else_body = Some(else_body);
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    #[error("flow error: expected a list of blocks, got {0}")]
    NotAFlow(String),

    #[error("flow error: expected a block tuple, got {0}")]
    NotABlock(String),

    #[error("flow error: block has no opcode")]
    MissingOpcode,

    #[error("flow error: opcode must be a string, got {0}")]
    OpcodeNotString(String),

    #[error("flow error: arguments of '{opcode}' must be a list, got {found}")]
    ArgsNotList { opcode: String, found: String },

    #[error("flow error: unsupported argument in '{opcode}': {found}")]
    BadArg { opcode: String, found: String },

    #[error("flow error: invalid project: {0}")]
    BadProject(String),
}

/// Decode a JSON flow (`[[opcode, args?, body?, elseBody?], ...]`).
pub fn decode_flow(json: &serde_json::Value) -> Result<FlowTree, FlowError> {
    match json {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(items) => items.iter().map(decode_block).collect(),
        other => Err(FlowError::NotAFlow(other.to_string())),
    }
}

pub fn decode_block(json: &serde_json::Value) -> Result<Block, FlowError> {
    let items = match json {
        serde_json::Value::Array(items) => items,
        other => return Err(FlowError::NotABlock(other.to_string())),
    };

    let opcode = match items.first() {
        Some(serde_json::Value::String(s)) => s.as_str(),
        Some(other) => return Err(FlowError::OpcodeNotString(other.to_string())),
        None => return Err(FlowError::MissingOpcode),
    };

    let args = match items.get(1) {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(args)) => decode_args(opcode, args)?,
        Some(other) => {
            return Err(FlowError::ArgsNotList {
                opcode: opcode.to_string(),
                found: other.to_string(),
            });
        }
    };

    let body = decode_body(items.get(2))?;
    let else_body = decode_body(items.get(3))?;

    Ok(Block {
        head: Head::decode(opcode),
        args,
        body,
        else_body,
    })
}

fn decode_body(json: Option<&serde_json::Value>) -> Result<Option<FlowTree>, FlowError> {
    match json {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(flow) => decode_flow(flow).map(Some),
    }
}

fn decode_args(opcode: &str, args: &[serde_json::Value]) -> Result<Vec<Arg>, FlowError> {
    args.iter().map(|a| decode_arg(opcode, a)).collect()
}

pub fn decode_arg(opcode: &str, json: &serde_json::Value) -> Result<Arg, FlowError> {
    match json {
        serde_json::Value::String(s) => Ok(Arg::decode_str(s)),
        serde_json::Value::Array(items) => {
            let inner = match items.first() {
                Some(serde_json::Value::String(s)) => s.as_str(),
                _ => {
                    return Err(FlowError::BadArg {
                        opcode: opcode.to_string(),
                        found: json.to_string(),
                    });
                }
            };
            let args = match items.get(1) {
                None | Some(serde_json::Value::Null) => Vec::new(),
                Some(serde_json::Value::Array(args)) => decode_args(inner, args)?,
                Some(other) => {
                    return Err(FlowError::ArgsNotList {
                        opcode: inner.to_string(),
                        found: other.to_string(),
                    });
                }
            };
            Ok(Arg::expr(inner, args))
        }
        other => Value::from_json(other)
            .map(Arg::from)
            .ok_or_else(|| FlowError::BadArg {
                opcode: opcode.to_string(),
                found: other.to_string(),
            }),
    }
}

/// Several flows exported together: named actions and mouse programs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Project {
    pub actions: IndexMap<String, FlowTree>,
    pub mice: Vec<FlowTree>,
}

#[derive(Deserialize)]
struct RawProject {
    #[serde(default)]
    actions: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    mice: Vec<serde_json::Value>,
}

impl Project {
    pub fn from_json(json: &serde_json::Value) -> Result<Project, FlowError> {
        let raw = RawProject::deserialize(json)
            .map_err(|e| FlowError::BadProject(e.to_string()))?;

        let mut actions = IndexMap::new();
        for (name, flow) in &raw.actions {
            actions.insert(name.clone(), decode_flow(flow)?);
        }

        let mice = raw
            .mice
            .iter()
            .map(decode_flow)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Project { actions, mice })
    }
}
