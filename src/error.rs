use std::{fmt, error::Error};
use crate::Face;

#[derive(Debug, Clone, PartialEq)]
pub enum FlowError {
    ProbabilitiesEmpty,
    ProbabilitiesLength { expected: usize, found: usize },
    ProbabilityInvalid(f64),
    ProbabilitiesSum(f64),
    WeightsZero,
    CoefficientsEmpty,
    CoefficientsLength { expected: usize, found: usize },
    RateInvalid(String),
    TimingUnknown(String),

    InputOutOfRange { input: usize, inputs: usize },
    OutputOutOfRange { output: usize, outputs: usize },
    QueueEmpty(usize),
    CompletionPending,
    UnexpectedTimer,

    ScriptEmpty,
    ScriptMultiple,
    ScriptNotADict,
    ScriptKeyNotString,
    ScriptEntryInvalid(String),
    NodeNameDup(String),
    NodeMissing(String),
    ArcInvalid(String),
    ArcCount { node: String, face: Face, expected: usize, found: usize },
    InitialInputInvalid { node: String, input: usize, inputs: usize },
    InNode(String, Box<FlowError>),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use FlowError::*;

        match self {
            ProbabilitiesLength { expected, found } => write!(
                f,
                "Expected {} probabilit{}, found {}",
                expected,
                if *expected == 1 { "y" } else { "ies" },
                found
            ),
            ProbabilityInvalid(p) => write!(f, "Invalid probability {}", p),
            ProbabilitiesSum(sum) => write!(f, "Probabilities sum up to {} instead of 1", sum),
            CoefficientsLength { expected, found } => write!(
                f,
                "Expected {} coefficient{}, found {}",
                expected,
                if *expected == 1 { "" } else { "s" },
                found
            ),
            RateInvalid(desc) => write!(f, "Invalid rate {}", desc),
            TimingUnknown(desc) => write!(f, "Unknown timing \"{}\"", desc),
            InputOutOfRange { input, inputs } => {
                write!(f, "Arrival on input {} of a node with {} input(s)", input, inputs)
            }
            OutputOutOfRange { output, outputs } => {
                write!(f, "Forward on output {} of a node with {} output(s)", output, outputs)
            }
            QueueEmpty(input) => write!(f, "Queue of input {} is empty at completion", input),
            ScriptEntryInvalid(key) => write!(f, "Invalid entry \"{}\" in network description", key),
            NodeNameDup(name) => write!(f, "Duplicated node name \"{}\"", name),
            NodeMissing(name) => write!(f, "Arc refers to an undeclared node \"{}\"", name),
            ArcInvalid(desc) => write!(f, "Invalid arc \"{}\"", desc),
            ArcCount { node, face, expected, found } => write!(
                f,
                "Node \"{}\" has {} {} arc(s), expected {}",
                node,
                found,
                if *face == Face::Tx { "outbound" } else { "inbound" },
                expected
            ),
            InitialInputInvalid { node, input, inputs } => write!(
                f,
                "Initial token put on input {} of node \"{}\" with {} input(s)",
                input, node, inputs
            ),
            InNode(node, err) => write!(f, "{} in node \"{}\"", err, node),
            _ => write!(f, "{}", self.description()),
        }
    }
}

impl Error for FlowError {
    fn description(&self) -> &str {
        use FlowError::*;

        match self {
            ProbabilitiesEmpty => "Empty probability vector",
            ProbabilitiesLength { .. } => "Probability vector length mismatch",
            ProbabilityInvalid(_) => "Invalid probability",
            ProbabilitiesSum(_) => "Probabilities don't sum up to 1",
            WeightsZero => "Firing weights sum up to zero",
            CoefficientsEmpty => "Empty coefficient vector",
            CoefficientsLength { .. } => "Coefficient vector length mismatch",
            RateInvalid(_) => "Invalid rate",
            TimingUnknown(_) => "Unknown timing",

            InputOutOfRange { .. } => "Input index out of range",
            OutputOutOfRange { .. } => "Output index out of range",
            QueueEmpty(_) => "Input queue is empty at completion",
            CompletionPending => "Completion timer is already pending",
            UnexpectedTimer => "Timer fired without a matching owner",

            ScriptEmpty => "Network description is empty",
            ScriptMultiple => "Multiple network descriptions",
            ScriptNotADict => "Bad network description (not a dictionary)",
            ScriptKeyNotString => "Non-string key in network description",
            ScriptEntryInvalid(_) => "Invalid entry in network description",
            NodeNameDup(_) => "Duplicated node name",
            NodeMissing(_) => "Arc refers to an undeclared node",
            ArcInvalid(_) => "Invalid arc",
            ArcCount { .. } => "Arc count mismatch",
            InitialInputInvalid { .. } => "Initial token on a missing input",
            InNode(..) => "Invalid node",
        }
    }
}

impl FlowError {
    /// Returns `true` for errors detected while building a node or a
    /// network, i.e. before any event is delivered.
    pub fn is_configuration_error(&self) -> bool {
        use FlowError::*;

        if let InNode(_, err) = self {
            return err.is_configuration_error()
        }

        !matches!(
            self,
            InputOutOfRange { .. }
                | OutputOutOfRange { .. }
                | QueueEmpty(_)
                | CompletionPending
                | UnexpectedTimer
        )
    }
}
