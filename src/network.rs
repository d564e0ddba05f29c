use std::{collections::HashMap, path::Path, error::Error};
use crate::{Node, Token, Face, FlowError, NodeIndex, VirtualTime, yaml_script::YamlNetwork};

/// Receiving end of an arc.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Port {
    pub node:  NodeIndex,
    pub input: usize,
}

#[derive(Debug)]
pub(crate) struct NodeEntry {
    pub(crate) name:       String,
    pub(crate) node:       Node,
    pub(crate) outputs:    Vec<Port>,
    pub(crate) num_inputs: usize,
}

/// A token-flow network: named nodes wired by arcs.
///
/// Ports are numbered in the order arcs are connected: the `j`-th arc
/// leaving a node is attached to its output `j`, and the `i`-th arc
/// entering a node is attached to its input `i`.
#[derive(Default, Debug)]
pub struct Network {
    name:    Option<String>,
    entries: Vec<NodeEntry>,
    ids:     HashMap<String, NodeIndex>,
    initial: Vec<(NodeIndex, usize, Token)>,
    seed:    Option<u64>,
    horizon: Option<VirtualTime>,
}

impl Network {
    pub fn new() -> Self {
        Default::default()
    }

    /// Loads a network from a YAML description; see
    /// [`Network::from_yaml()`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let script = std::fs::read_to_string(path)?;

        Self::from_yaml(script)
    }

    /// Builds and validates a network from a YAML description.
    ///
    /// Every node is constructed, hence every configuration error is
    /// reported, before this returns.
    pub fn from_yaml<S: AsRef<str>>(script: S) -> Result<Self, Box<dyn Error>> {
        let network = YamlNetwork::from_str(script)?.into_network()?;

        Ok(network)
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = Some(name.into());
    }

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Run parameters suggested by the description of this network.
    pub fn set_defaults(&mut self, seed: Option<u64>, horizon: Option<VirtualTime>) {
        self.seed = seed;
        self.horizon = horizon;
    }

    pub fn get_default_seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn get_default_horizon(&self) -> Option<VirtualTime> {
        self.horizon
    }

    pub fn add_node<S, N>(&mut self, name: S, node: N) -> Result<NodeIndex, FlowError>
    where
        S: AsRef<str>,
        N: Into<Node>,
    {
        let name = name.as_ref();

        if self.ids.contains_key(name) {
            return Err(FlowError::NodeNameDup(name.to_owned()))
        }

        let index = self.entries.len();

        self.entries.push(NodeEntry {
            name:       name.to_owned(),
            node:       node.into(),
            outputs:    Vec::new(),
            num_inputs: 0,
        });
        self.ids.insert(name.to_owned(), index);

        Ok(index)
    }

    /// Adds an arc from the next free output of `tx_name` to the next
    /// free input of `rx_name`.
    pub fn connect<S, T>(&mut self, tx_name: S, rx_name: T) -> Result<Port, FlowError>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let tx = self.require_index(tx_name)?;
        let rx = self.require_index(rx_name)?;

        let port = Port { node: rx, input: self.entries[rx].num_inputs };

        self.entries[rx].num_inputs += 1;
        self.entries[tx].outputs.push(port);

        Ok(port)
    }

    /// Puts a token on `input` of a node at time zero.
    ///
    /// Transitions only accept initial tokens on one of their inputs.
    /// Other nodes ignore the input index.
    pub fn add_initial_token<S: AsRef<str>>(
        &mut self,
        name: S,
        input: usize,
        token: Token,
    ) -> Result<(), FlowError> {
        let index = self.require_index(&name)?;

        if let Some(inputs) = self.entries[index].node.num_inputs() {
            if input >= inputs {
                return Err(FlowError::InitialInputInvalid {
                    node: name.as_ref().to_owned(),
                    input,
                    inputs,
                })
            }
        }

        self.initial.push((index, input, token));

        Ok(())
    }

    /// Checks that arcs match what each node was configured for.
    pub fn validate(&self) -> Result<(), FlowError> {
        for entry in self.entries.iter() {
            let num_outputs = entry.outputs.len();

            if entry.node.num_outputs() != num_outputs {
                return Err(FlowError::ArcCount {
                    node:     entry.name.clone(),
                    face:     Face::Tx,
                    expected: entry.node.num_outputs(),
                    found:    num_outputs,
                })
            }

            if let Some(expected) = entry.node.num_inputs() {
                if expected != entry.num_inputs {
                    return Err(FlowError::ArcCount {
                        node: entry.name.clone(),
                        face: Face::Rx,
                        expected,
                        found: entry.num_inputs,
                    })
                }
            }
        }

        Ok(())
    }

    pub fn get_index<S: AsRef<str>>(&self, name: S) -> Option<NodeIndex> {
        self.ids.get(name.as_ref()).copied()
    }

    fn require_index<S: AsRef<str>>(&self, name: S) -> Result<NodeIndex, FlowError> {
        self.get_index(&name).ok_or_else(|| FlowError::NodeMissing(name.as_ref().to_owned()))
    }

    pub fn get_node(&self, index: NodeIndex) -> Option<&Node> {
        self.entries.get(index).map(|e| &e.node)
    }

    pub fn get_node_name(&self, index: NodeIndex) -> Option<&str> {
        self.entries.get(index).map(|e| e.name.as_str())
    }

    pub fn get_outputs(&self, index: NodeIndex) -> Option<&[Port]> {
        self.entries.get(index).map(|e| e.outputs.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [NodeEntry] {
        self.entries.as_mut_slice()
    }

    pub(crate) fn take_initial(&mut self) -> Vec<(NodeIndex, usize, Token)> {
        std::mem::take(&mut self.initial)
    }
}
