// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::network::err::{NetworkError, NetworkLoaderError};
use crate::network::generator::Generator;
use crate::network::house::{Consumption, House};
use crate::network::net::Network;
use grid_balance_core::prelude::Power;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read, Write},
    path::Path,
};

/// Parses the line-oriented declarative network format:
///
/// ```text
/// generateur(name,capacity).
/// maison(name,CONSUMPTION).
/// connexion(houseName,generatorName).
/// ```
///
/// Declarations must appear grouped in that order. Every violation is
/// reported with the originating line number; loading aborts on the first
/// error and no partial network is returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkLoader {
    penalty: f64,
}

impl Default for NetworkLoader {
    fn default() -> Self {
        Self { penalty: 50.0 }
    }
}

impl NetworkLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overload penalty coefficient of the loaded network; the format
    /// itself does not carry one.
    #[inline]
    pub fn penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn from_bufread<R: BufRead>(&self, reader: R) -> Result<Network, NetworkLoaderError> {
        let mut network = Network::new(self.penalty).map_err(NetworkLoaderError::Setup)?;

        let mut houses_started = false;
        let mut connections_started = false;

        for (index, line) in reader.lines().enumerate() {
            let number = index + 1;
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match declaration_keyword(line, number)? {
                "generateur" => {
                    if houses_started || connections_started {
                        return Err(NetworkLoaderError::GeneratorAfterOthers { line: number });
                    }
                    let args = arguments(line, number)?;
                    let capacity = parse_capacity(args[1], number)?;
                    let generator = Generator::new(args[0], Power::new(capacity)).map_err(|e| {
                        NetworkLoaderError::Network {
                            line: number,
                            source: e.into(),
                        }
                    })?;
                    network
                        .add_generator(generator)
                        .map_err(|source| NetworkLoaderError::Network {
                            line: number,
                            source,
                        })?;
                }
                "maison" => {
                    if connections_started {
                        return Err(NetworkLoaderError::HouseAfterConnections { line: number });
                    }
                    houses_started = true;
                    let args = arguments(line, number)?;
                    let consumption = Consumption::from_label(args[1]).ok_or_else(|| {
                        NetworkLoaderError::UnknownConsumption {
                            line: number,
                            label: args[1].to_string(),
                        }
                    })?;
                    network
                        .add_house(House::new(args[0], consumption))
                        .map_err(|source| NetworkLoaderError::Network {
                            line: number,
                            source,
                        })?;
                }
                "connexion" => {
                    connections_started = true;
                    let args = arguments(line, number)?;
                    // Endpoint order is forgiving: either (house, generator)
                    // or (generator, house).
                    let forward = (network.house_index(args[0]), network.generator_index(args[1]));
                    let (house, generator, house_name) = match forward {
                        (Some(h), Some(g)) => (h, g, args[0]),
                        _ => match (network.house_index(args[1]), network.generator_index(args[0]))
                        {
                            (Some(h), Some(g)) => (h, g, args[1]),
                            _ => {
                                return Err(NetworkLoaderError::UnknownEndpoint {
                                    line: number,
                                    first: args[0].to_string(),
                                    second: args[1].to_string(),
                                });
                            }
                        },
                    };
                    if network.assign(house, generator).is_err() {
                        return Err(NetworkLoaderError::HouseAlreadyConnected {
                            line: number,
                            house: house_name.to_string(),
                        });
                    }
                }
                keyword => {
                    return Err(NetworkLoaderError::UnknownDeclaration {
                        line: number,
                        keyword: keyword.to_string(),
                    });
                }
            }
        }

        network.recompute_cost();
        Ok(network)
    }

    #[inline]
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<Network, NetworkLoaderError> {
        let file = File::open(path).map_err(NetworkLoaderError::Io)?;
        self.from_bufread(BufReader::new(file))
    }

    #[inline]
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Network, NetworkLoaderError> {
        self.from_bufread(BufReader::new(reader))
    }

    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Network, NetworkLoaderError> {
        self.from_reader(s.as_bytes())
    }
}

#[inline]
fn declaration_keyword(line: &str, number: usize) -> Result<&str, NetworkLoaderError> {
    match line.find('(') {
        Some(open) => Ok(line[..open].trim()),
        None => Err(NetworkLoaderError::MissingParentheses { line: number }),
    }
}

/// Extracts the two comma-separated parameters of `type(a,b).`, trimmed.
fn arguments(line: &str, number: usize) -> Result<Vec<&str>, NetworkLoaderError> {
    if !line.ends_with('.') {
        return Err(NetworkLoaderError::MissingPeriod { line: number });
    }
    let open = line
        .find('(')
        .ok_or(NetworkLoaderError::MissingParentheses { line: number })?;
    let close = line
        .rfind(')')
        .ok_or(NetworkLoaderError::MissingParentheses { line: number })?;
    if open >= close {
        return Err(NetworkLoaderError::MisplacedParentheses { line: number });
    }
    let args: Vec<&str> = line[open + 1..close].split(',').map(str::trim).collect();
    if args.len() != 2 {
        return Err(NetworkLoaderError::WrongArity {
            line: number,
            found: args.len(),
            expected: 2,
        });
    }
    Ok(args)
}

#[inline]
fn parse_capacity(token: &str, number: usize) -> Result<i64, NetworkLoaderError> {
    let capacity = token
        .parse::<i64>()
        .map_err(|_| NetworkLoaderError::CapacityNotInteger {
            line: number,
            token: token.to_string(),
        })?;
    if capacity <= 0 {
        return Err(NetworkLoaderError::CapacityNotPositive {
            line: number,
            capacity,
        });
    }
    Ok(capacity)
}

/// Serializes a network back into the declarative format: all generators,
/// then all houses, then one connexion line per connected house, each group
/// in registration order. Unconnected houses emit no connexion line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkWriter;

impl NetworkWriter {
    pub fn to_string(&self, network: &Network) -> String {
        let mut out = String::new();
        for generator in network.generators() {
            out.push_str(&format!(
                "generateur({},{}).\n",
                generator.name(),
                generator.capacity().value()
            ));
        }
        for house in network.houses() {
            out.push_str(&format!(
                "maison({},{}).\n",
                house.name(),
                house.consumption().label()
            ));
        }
        for (i, house) in network.houses().iter().enumerate() {
            if let Some(generator) =
                network.assigned_generator(crate::network::house::HouseIndex::new(i))
            {
                out.push_str(&format!(
                    "connexion({},{}).\n",
                    house.name(),
                    network.generator(generator).name()
                ));
            }
        }
        out
    }

    #[inline]
    pub fn to_writer<W: Write>(&self, network: &Network, mut writer: W) -> std::io::Result<()> {
        writer.write_all(self.to_string(network).as_bytes())
    }

    #[inline]
    pub fn to_path(&self, network: &Network, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_string(network))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_OK: &str = "\
generateur(g1,100).
generateur(g2,50).

maison(m1,NORMAL).
maison(m2,BASSE).
maison(m3,FORTE).
connexion(m1,g1).
connexion(g2,m3).
";

    #[test]
    fn test_loads_minimal_network() {
        let net = NetworkLoader::new().from_str(SMALL_OK).unwrap();
        assert_eq!(net.generators().len(), 2);
        assert_eq!(net.houses().len(), 3);
        assert_eq!(net.penalty(), 50.0);

        // m1 connected to g1, m3 to g2 (reversed endpoint order), m2 free.
        let m1 = net.house_index("m1").unwrap();
        let m2 = net.house_index("m2").unwrap();
        let m3 = net.house_index("m3").unwrap();
        assert_eq!(net.assigned_generator(m1), net.generator_index("g1"));
        assert_eq!(net.assigned_generator(m2), None);
        assert_eq!(net.assigned_generator(m3), net.generator_index("g2"));

        // The loader leaves a fresh cost snapshot behind.
        assert!(net.cost() >= 0.0);
    }

    #[test]
    fn test_penalty_override() {
        let net = NetworkLoader::new()
            .penalty(7.5)
            .from_str("generateur(g1,10).\n")
            .unwrap();
        assert_eq!(net.penalty(), 7.5);
    }

    #[test]
    fn test_consumption_labels_are_case_insensitive() {
        let net = NetworkLoader::new()
            .from_str("generateur(g1,100).\nmaison(m1,forte).\n")
            .unwrap();
        let m1 = net.house_index("m1").unwrap();
        assert_eq!(net.house(m1).consumption(), Consumption::High);
    }

    #[test]
    fn test_missing_period() {
        let err = NetworkLoader::new()
            .from_str("generateur(g1,100)\n")
            .unwrap_err();
        assert!(matches!(err, NetworkLoaderError::MissingPeriod { line: 1 }));
    }

    #[test]
    fn test_missing_parentheses() {
        let err = NetworkLoader::new().from_str("generateur g1.\n").unwrap_err();
        assert!(matches!(
            err,
            NetworkLoaderError::MissingParentheses { line: 1 }
        ));
    }

    #[test]
    fn test_wrong_arity() {
        let err = NetworkLoader::new()
            .from_str("generateur(g1,100,2).\n")
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkLoaderError::WrongArity {
                line: 1,
                found: 3,
                expected: 2
            }
        ));
    }

    #[test]
    fn test_unknown_declaration() {
        let err = NetworkLoader::new()
            .from_str("generateur(g1,100).\ncentrale(c1,5).\n")
            .unwrap_err();
        match err {
            NetworkLoaderError::UnknownDeclaration { line, keyword } => {
                assert_eq!(line, 2);
                assert_eq!(keyword, "centrale");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_group_order_enforced() {
        let err = NetworkLoader::new()
            .from_str("generateur(g1,100).\nmaison(m1,BASSE).\ngenerateur(g2,50).\n")
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkLoaderError::GeneratorAfterOthers { line: 3 }
        ));

        let err = NetworkLoader::new()
            .from_str(
                "generateur(g1,100).\nmaison(m1,BASSE).\nconnexion(m1,g1).\nmaison(m2,BASSE).\n",
            )
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkLoaderError::HouseAfterConnections { line: 4 }
        ));
    }

    #[test]
    fn test_capacity_must_be_positive_integer() {
        let err = NetworkLoader::new()
            .from_str("generateur(g1,beaucoup).\n")
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkLoaderError::CapacityNotInteger { line: 1, .. }
        ));

        let err = NetworkLoader::new().from_str("generateur(g1,0).\n").unwrap_err();
        assert!(matches!(
            err,
            NetworkLoaderError::CapacityNotPositive {
                line: 1,
                capacity: 0
            }
        ));
    }

    #[test]
    fn test_unknown_consumption_label() {
        let err = NetworkLoader::new()
            .from_str("generateur(g1,100).\nmaison(m1,MOYENNE).\n")
            .unwrap_err();
        match err {
            NetworkLoaderError::UnknownConsumption { line, label } => {
                assert_eq!(line, 2);
                assert_eq!(label, "MOYENNE");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_connexion_endpoint() {
        let err = NetworkLoader::new()
            .from_str("generateur(g1,100).\nmaison(m1,BASSE).\nconnexion(m1,g9).\n")
            .unwrap_err();
        assert!(matches!(
            err,
            NetworkLoaderError::UnknownEndpoint { line: 3, .. }
        ));
    }

    #[test]
    fn test_house_already_connected() {
        let err = NetworkLoader::new()
            .from_str(
                "generateur(g1,100).\ngenerateur(g2,50).\nmaison(m1,BASSE).\nconnexion(m1,g1).\nconnexion(m1,g2).\n",
            )
            .unwrap_err();
        match err {
            NetworkLoaderError::HouseAlreadyConnected { line, house } => {
                assert_eq!(line, 5);
                assert_eq!(house, "m1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_structural_errors_carry_line_numbers() {
        // Demand above registered capacity surfaces as a wrapped network
        // error with the house's line number.
        let err = NetworkLoader::new()
            .from_str("generateur(g1,25).\nmaison(m1,NORMAL).\nmaison(m2,BASSE).\n")
            .unwrap_err();
        match err {
            NetworkLoaderError::Network { line, source } => {
                assert_eq!(line, 3);
                assert!(matches!(source, NetworkError::CapacityExceeded(_)));
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = NetworkLoader::new()
            .from_str("generateur(g1,100).\ngenerateur(g1,50).\n")
            .unwrap_err();
        match err {
            NetworkLoaderError::Network { line, source } => {
                assert_eq!(line, 2);
                assert!(matches!(source, NetworkError::DuplicateGenerator(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_writer_groups_declarations_in_order() {
        let net = NetworkLoader::new().from_str(SMALL_OK).unwrap();
        let out = NetworkWriter.to_string(&net);
        assert_eq!(
            out,
            "generateur(g1,100).\n\
             generateur(g2,50).\n\
             maison(m1,NORMAL).\n\
             maison(m2,BASSE).\n\
             maison(m3,FORTE).\n\
             connexion(m1,g1).\n\
             connexion(m3,g2).\n"
        );
    }

    #[test]
    fn test_writer_round_trip() {
        let net = NetworkLoader::new().from_str(SMALL_OK).unwrap();
        let reloaded = NetworkLoader::new()
            .from_str(&NetworkWriter.to_string(&net))
            .unwrap();
        assert_eq!(reloaded.houses().len(), net.houses().len());
        assert_eq!(reloaded.generators().len(), net.generators().len());
        for (i, house) in net.houses().iter().enumerate() {
            let ix = crate::network::house::HouseIndex::new(i);
            let expected = net
                .assigned_generator(ix)
                .map(|g| net.generator(g).name().to_string());
            let actual = reloaded
                .assigned_generator(ix)
                .map(|g| reloaded.generator(g).name().to_string());
            assert_eq!(actual, expected, "house {}", house.name());
        }
    }
}
