use std::{collections::HashMap, error::Error};
use regex::Regex;
use yaml_rust::{Yaml, YamlLoader};
use crate::{
    Network, Node, Place, Transition, ImmediateTransform, Rate, Token, FlowError, VirtualTime,
    WeightedSelector,
};

/// Node configuration, as declared, before arcs are counted.
#[derive(Clone, Debug)]
enum NodeSpec {
    Place { probabilities: Option<Vec<f64>>, weights: Option<Vec<f64>> },
    Transition { rate: Rate, coefficients: Option<Vec<f64>> },
    Immediate { coefficients: Option<Vec<f64>> },
}

impl NodeSpec {
    fn build(self, num_inputs: usize, num_outputs: usize) -> Result<Node, FlowError> {
        match self {
            NodeSpec::Place { probabilities, weights } => {
                if let Some(weights) = weights {
                    if weights.len() != num_outputs {
                        return Err(FlowError::ProbabilitiesLength {
                            expected: num_outputs,
                            found:    weights.len(),
                        })
                    }

                    if num_outputs == 0 {
                        Ok(Place::sink().into())
                    } else {
                        Ok(Place::with_selector(WeightedSelector::from_weights(&weights)?).into())
                    }
                } else if let Some(probabilities) = probabilities {
                    Ok(Place::new(probabilities, num_outputs)?.into())
                } else if num_outputs == 1 {
                    Ok(Place::new(vec![1.0], 1)?.into())
                } else {
                    Ok(Place::new(Vec::new(), num_outputs)?.into())
                }
            }
            NodeSpec::Transition { rate, coefficients } => {
                let coefficients = coefficients.unwrap_or_else(|| vec![1.0; num_outputs]);

                Ok(Transition::new(coefficients, num_inputs, num_outputs, rate)?.into())
            }
            NodeSpec::Immediate { coefficients } => {
                let coefficients = coefficients.unwrap_or_else(|| vec![1.0]);

                Ok(ImmediateTransform::new(&coefficients)?.into())
            }
        }
    }
}

fn as_number(yaml: &Yaml) -> Option<f64> {
    match yaml {
        Yaml::Real(s) => s.parse().ok(),
        Yaml::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

/// Accepts a YAML list of numbers, a single number, or numbers
/// separated by whitespace in a string (e.g. `"0.3 0.7"`).
fn as_vector(key: &str, yaml: &Yaml) -> Result<Vec<f64>, FlowError> {
    let invalid = || FlowError::ScriptEntryInvalid(key.to_owned());

    match yaml {
        Yaml::Array(values) => values.iter().map(|v| as_number(v).ok_or_else(invalid)).collect(),
        Yaml::String(s) => s.split_whitespace().map(|v| v.parse().map_err(|_| invalid())).collect(),
        other => as_number(other).map(|v| vec![v]).ok_or_else(invalid),
    }
}

fn as_rate(yaml: &Yaml) -> Result<Rate, FlowError> {
    match yaml {
        Yaml::String(s) | Yaml::Real(s) => s.parse(),
        Yaml::Integer(i) => Rate::fixed(*i as f64),
        _ => Err(FlowError::ScriptEntryInvalid("rate".to_owned())),
    }
}

fn parse_arc<S: AsRef<str>>(description: S) -> Result<(String, String), FlowError> {
    lazy_static! {
        // Node names may contain whitespace, but not the arrow.
        static ref ARC_RE: Regex = Regex::new(r"^\s*([^<>]*[^<>\s-])\s*-?>\s*([^<>]*[^<>\s])\s*$").unwrap();
    }

    if let Some(cap) = ARC_RE.captures(description.as_ref()) {
        Ok((cap[1].to_owned(), cap[2].to_owned()))
    } else {
        Err(FlowError::ArcInvalid(description.as_ref().to_owned()))
    }
}

/// Splits an `initial` key into a node name and an input index: `"t"`
/// stands for input 0 of `t`, and `"t[2]"` for its input 2.
fn parse_initial_key(key: &str) -> Result<(String, usize), FlowError> {
    lazy_static! {
        static ref INPUT_RE: Regex = Regex::new(r"^(.*[^\s])\s*\[\s*(\d+)\s*\]$").unwrap();
    }

    if let Some(cap) = INPUT_RE.captures(key) {
        let input = cap[2].parse().map_err(|_| FlowError::ScriptEntryInvalid(key.to_owned()))?;

        Ok((cap[1].to_owned(), input))
    } else if key.contains(|c: char| c == '[' || c == ']') {
        Err(FlowError::ScriptEntryInvalid(key.to_owned()))
    } else {
        Ok((key.to_owned(), 0))
    }
}

/// Intermediate representation of a network description.
///
/// This is returned by the parser of YAML-formatted strings and then
/// turned into a [`Network`], which is when nodes get constructed and
/// validated.
#[derive(Default, Debug)]
pub(crate) struct YamlNetwork {
    name:    Option<String>,
    seed:    Option<u64>,
    horizon: Option<f64>,
    nodes:   Vec<(String, NodeSpec)>,
    arcs:    Vec<(String, String)>,
    initial: Vec<(String, usize, Vec<f64>)>,
}

impl YamlNetwork {
    fn add_nodes<F>(&mut self, section: &str, value: &Yaml, parse_spec: F) -> Result<(), FlowError>
    where
        F: Fn(&Yaml) -> Result<NodeSpec, FlowError>,
    {
        match value {
            Yaml::Hash(dict) => {
                for (key, value) in dict {
                    let name = key.as_str().ok_or(FlowError::ScriptKeyNotString)?.trim();
                    let spec = parse_spec(value).map_err(|err| FlowError::InNode(name.to_owned(), Box::new(err)))?;

                    self.nodes.push((name.to_owned(), spec));
                }
                Ok(())
            }
            Yaml::Null => Ok(()),
            _ => Err(FlowError::ScriptEntryInvalid(section.to_owned())),
        }
    }

    fn add_arcs(&mut self, value: &Yaml) -> Result<(), FlowError> {
        match value {
            Yaml::Array(arcs) => {
                for arc in arcs {
                    let description =
                        arc.as_str().ok_or_else(|| FlowError::ScriptEntryInvalid("arcs".to_owned()))?;

                    self.arcs.push(parse_arc(description)?);
                }
                Ok(())
            }
            Yaml::Null => Ok(()),
            _ => Err(FlowError::ScriptEntryInvalid("arcs".to_owned())),
        }
    }

    fn add_initial(&mut self, value: &Yaml) -> Result<(), FlowError> {
        if let Yaml::Hash(dict) = value {
            for (key, value) in dict {
                let key = key.as_str().ok_or(FlowError::ScriptKeyNotString)?.trim();
                let (name, input) = parse_initial_key(key)?;

                self.initial.push((name, input, as_vector("initial", value)?));
            }
            Ok(())
        } else {
            Err(FlowError::ScriptEntryInvalid("initial".to_owned()))
        }
    }

    fn add_entry(&mut self, key: &Yaml, value: &Yaml) -> Result<(), FlowError> {
        let key = key.as_str().ok_or(FlowError::ScriptKeyNotString)?.trim();
        let invalid = || FlowError::ScriptEntryInvalid(key.to_owned());

        match key {
            "name" => {
                self.name = Some(value.as_str().ok_or_else(invalid)?.trim().to_owned());
                Ok(())
            }
            "seed" => {
                let seed = value.as_i64().filter(|&s| s >= 0).ok_or_else(invalid)?;

                self.seed = Some(seed as u64);
                Ok(())
            }
            "until" => {
                self.horizon = Some(as_number(value).filter(|h| *h >= 0.0).ok_or_else(invalid)?);
                Ok(())
            }
            "places" => self.add_nodes(key, value, |spec| {
                let probabilities = Self::optional_vector(spec, "probabilities")?;
                let weights = Self::optional_vector(spec, "weights")?;

                Ok(NodeSpec::Place { probabilities, weights })
            }),
            "transitions" => self.add_nodes(key, value, |spec| {
                let rate = match spec["rate"] {
                    Yaml::BadValue => return Err(FlowError::ScriptEntryInvalid("rate".to_owned())),
                    ref rate => as_rate(rate)?,
                };
                let coefficients = Self::optional_vector(spec, "coeffs")?;

                Ok(NodeSpec::Transition { rate, coefficients })
            }),
            "immediate" => self.add_nodes(key, value, |spec| {
                let coefficients = Self::optional_vector(spec, "coeffs")?;

                Ok(NodeSpec::Immediate { coefficients })
            }),
            "arcs" => self.add_arcs(value),
            "initial" => self.add_initial(value),
            _ => Err(invalid()),
        }
    }

    fn optional_vector(spec: &Yaml, key: &str) -> Result<Option<Vec<f64>>, FlowError> {
        match spec[key] {
            Yaml::BadValue | Yaml::Null => Ok(None),
            ref value => as_vector(key, value).map(Some),
        }
    }

    fn from_yaml(yaml: &Yaml) -> Result<Self, FlowError> {
        if let Yaml::Hash(ref dict) = yaml {
            let mut result = Self::default();

            for (key, value) in dict {
                result.add_entry(key, value)?;
            }

            Ok(result)
        } else {
            Err(FlowError::ScriptNotADict)
        }
    }

    pub(crate) fn from_str<S: AsRef<str>>(script: S) -> Result<Self, Box<dyn Error>> {
        let docs = YamlLoader::load_from_str(script.as_ref())?;

        if docs.is_empty() {
            Err(Box::new(FlowError::ScriptEmpty))
        } else if docs.len() == 1 {
            let result = Self::from_yaml(&docs[0])?;
            Ok(result)
        } else {
            Err(Box::new(FlowError::ScriptMultiple))
        }
    }

    pub(crate) fn into_network(self) -> Result<Network, FlowError> {
        let mut num_inputs: HashMap<&str, usize> = HashMap::new();
        let mut num_outputs: HashMap<&str, usize> = HashMap::new();

        for (tx, rx) in self.arcs.iter() {
            if !self.nodes.iter().any(|(name, _)| name == tx) {
                return Err(FlowError::NodeMissing(tx.clone()))
            }
            if !self.nodes.iter().any(|(name, _)| name == rx) {
                return Err(FlowError::NodeMissing(rx.clone()))
            }
            *num_outputs.entry(tx.as_str()).or_default() += 1;
            *num_inputs.entry(rx.as_str()).or_default() += 1;
        }

        let mut network = Network::new();

        if let Some(name) = self.name.as_ref() {
            network.set_name(name.as_str());
        }
        network.set_defaults(self.seed, self.horizon.and_then(VirtualTime::new));

        for (name, spec) in self.nodes.iter() {
            let num_in = num_inputs.get(name.as_str()).copied().unwrap_or(0);
            let num_out = num_outputs.get(name.as_str()).copied().unwrap_or(0);
            let node = spec
                .clone()
                .build(num_in, num_out)
                .map_err(|err| FlowError::InNode(name.clone(), Box::new(err)))?;

            debug!("Node {} ({}): {} input(s), {} output(s)", name, node.kind(), num_in, num_out);
            network.add_node(name, node)?;
        }

        for (tx, rx) in self.arcs.iter() {
            network.connect(tx, rx)?;
        }

        for (name, input, sizes) in self.initial.iter() {
            for (k, &size) in sizes.iter().enumerate() {
                let identifier = if *input == 0 {
                    format!("{}-{}", name, k)
                } else {
                    format!("{}[{}]-{}", name, input, k)
                };
                let token = Token::new(identifier, size, VirtualTime::ZERO);

                network.add_initial_token(name, *input, token)?;
            }
        }

        network.validate()?;

        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use crate::Face;
    use super::*;

    const CACHE: &str = r#"
name: cache
seed: 7
until: 20
places:
  request: { weights: [7, 3] }
  done:
transitions:
  source: { rate: "EXP(2)", coeffs: [1.0] }
  hit: { rate: 0.1, coeffs: "1" }
  miss: { rate: "UNI(1, 2)", coeffs: [1.5] }
arcs:
  - source > request
  - request > hit
  - request > miss
  - hit > done
  - miss > done
"#;

    #[test]
    fn test_parse_arc() {
        assert_eq!(parse_arc("a > b").unwrap(), ("a".to_owned(), "b".to_owned()));
        assert_eq!(parse_arc("cache hit->sink").unwrap(), ("cache hit".to_owned(), "sink".to_owned()));
        assert!(matches!(parse_arc("a < b"), Err(FlowError::ArcInvalid(_))));
        assert!(matches!(parse_arc("> b"), Err(FlowError::ArcInvalid(_))));
    }

    #[test]
    fn test_cache_network() {
        let net = Network::from_yaml(CACHE).unwrap();

        assert_eq!(net.get_name(), Some("cache"));
        assert_eq!(net.get_default_seed(), Some(7));
        assert_eq!(net.get_default_horizon(), VirtualTime::new(20.0));
        assert_eq!(net.len(), 5);

        let request = net.get_index("request").unwrap();
        match net.get_node(request) {
            Some(Node::Place(place)) => {
                let probabilities = place.get_selector().unwrap().get_probabilities();
                assert!((probabilities[0] - 0.7).abs() < 1e-12);
            }
            other => panic!("Unexpected {:?}", other),
        }

        let outputs = net.get_outputs(request).unwrap();
        assert_eq!(outputs[0].node, net.get_index("hit").unwrap());
        assert_eq!(outputs[1].node, net.get_index("miss").unwrap());

        let done = net.get_index("done").unwrap();
        assert_eq!(net.get_outputs(net.get_index("miss").unwrap()).unwrap()[0].input, 1);
        assert_eq!(net.get_node(done).unwrap().num_outputs(), 0);

        match net.get_node(net.get_index("miss").unwrap()) {
            Some(Node::Transition(t)) => assert_eq!(t.get_rate(), Rate::Uniform { low: 1.0, high: 2.0 }),
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_configuration_errors() {
        let err = Network::from_yaml(
            "places: { p: { probabilities: [0.5, 0.2] } }\n\
             transitions: { a: { rate: 1 }, b: { rate: 1 } }\n\
             arcs: [p > a, p > b]",
        )
        .unwrap_err();
        match err.downcast_ref::<FlowError>() {
            Some(FlowError::InNode(name, inner)) => {
                assert_eq!(name, "p");
                assert!(matches!(**inner, FlowError::ProbabilitiesSum(_)));
            }
            other => panic!("Unexpected {:?}", other),
        }

        let err = Network::from_yaml(
            "transitions: { t: { rate: 1, coeffs: [1, 2] } }\nplaces: { s: ~ }\narcs: [t > s]",
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<FlowError>(),
            Some(&FlowError::InNode(
                "t".to_owned(),
                Box::new(FlowError::CoefficientsLength { expected: 1, found: 2 })
            ))
        );

        let err = Network::from_yaml("transitions: { t: { rate: \"NORM(1)\" } }").unwrap_err();
        assert!(matches!(err.downcast_ref::<FlowError>(), Some(FlowError::InNode(..))));

        let err = Network::from_yaml("places: { s: ~ }\narcs: [s > x]").unwrap_err();
        assert_eq!(err.downcast_ref::<FlowError>(), Some(&FlowError::NodeMissing("x".to_owned())));

        let err = Network::from_yaml("places: { s: ~ }\ncolor: red").unwrap_err();
        assert_eq!(
            err.downcast_ref::<FlowError>(),
            Some(&FlowError::ScriptEntryInvalid("color".to_owned()))
        );
    }

    #[test]
    fn test_immediate_arity() {
        let err = Network::from_yaml("immediate: { i: { coeffs: [2] } }\nplaces: { a: ~, b: ~ }\narcs: [i > a, i > b]")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlowError>(),
            Some(FlowError::ArcCount { face: Face::Tx, expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn test_script_shape() {
        assert!(matches!(
            Network::from_yaml("").unwrap_err().downcast_ref::<FlowError>(),
            Some(FlowError::ScriptEmpty)
        ));
        assert!(matches!(
            Network::from_yaml("- a\n- b").unwrap_err().downcast_ref::<FlowError>(),
            Some(FlowError::ScriptNotADict)
        ));
        assert!(matches!(
            Network::from_yaml("name: a\n---\nname: b").unwrap_err().downcast_ref::<FlowError>(),
            Some(FlowError::ScriptMultiple)
        ));
    }

    #[test]
    fn test_initial_tokens() {
        let mut net = Network::from_yaml(
            "places: { p: ~, s: ~ }\narcs: [p > s]\ninitial: { p: [2.0, 3.5] }",
        )
        .unwrap();
        let initial = net.take_initial();

        assert_eq!(initial.len(), 2);
        assert_eq!(initial[1].0, net.get_index("p").unwrap());
        assert_eq!(initial[1].2, Token::new("p-1", 3.5, VirtualTime::ZERO));
    }

    #[test]
    fn test_initial_tokens_on_inputs() {
        let mut net = Network::from_yaml(
            "transitions: { join: { rate: 1 } }\nplaces: { a: ~, b: ~, s: ~ }\n\
             arcs: [a > join, b > join, join > s]\ninitial: { join: [1], \"join[1]\": [2, 3] }",
        )
        .unwrap();
        let join = net.get_index("join").unwrap();
        let initial = net.take_initial();

        assert_eq!(initial.len(), 3);
        assert_eq!((initial[0].0, initial[0].1), (join, 0));
        assert_eq!((initial[2].0, initial[2].1), (join, 1));
        assert_eq!(initial[2].2, Token::new("join[1]-1", 3.0, VirtualTime::ZERO));
    }

    #[test]
    fn test_initial_tokens_need_an_input() {
        let err = Network::from_yaml(
            "transitions: { gen: { rate: 1, coeffs: [1] } }\nplaces: { s: ~ }\n\
             arcs: [gen > s]\ninitial: { gen: [1.0] }",
        )
        .unwrap_err();
        let err = err.downcast_ref::<FlowError>().unwrap();

        assert_eq!(
            err,
            &FlowError::InitialInputInvalid { node: "gen".to_owned(), input: 0, inputs: 0 }
        );
        assert!(err.is_configuration_error());

        let err = Network::from_yaml(
            "transitions: { t: { rate: 1 } }\nplaces: { a: ~, s: ~ }\n\
             arcs: [a > t, t > s]\ninitial: { \"t[1]\": [1.0] }",
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlowError>(),
            Some(FlowError::InitialInputInvalid { input: 1, inputs: 1, .. })
        ));

        let err = Network::from_yaml("places: { p: ~ }\ninitial: { \"p[x]\": [1.0] }").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlowError>(),
            Some(FlowError::ScriptEntryInvalid(_))
        ));
    }

    #[test]
    fn test_demos() {
        for script in &[
            include_str!("../demos/cache.yaml"),
            include_str!("../demos/fork_join.yaml"),
            include_str!("../demos/retry.yaml"),
        ] {
            let net = Network::from_yaml(script).unwrap();
            assert!(net.get_default_horizon().is_some());
        }
    }
}
