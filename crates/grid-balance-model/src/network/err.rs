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

use crate::network::generator::GeneratorIndex;
use crate::network::house::HouseIndex;
use grid_balance_core::prelude::Power;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NegativeCapacityError {
    name: String,
    capacity: Power,
}

impl NegativeCapacityError {
    pub fn new(name: impl Into<String>, capacity: Power) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> Power {
        self.capacity
    }
}

impl std::fmt::Display for NegativeCapacityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Generator {} has a negative capacity ({})",
            self.name, self.capacity
        )
    }
}

impl std::error::Error for NegativeCapacityError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativePenaltyError {
    penalty: f64,
}

impl NegativePenaltyError {
    pub fn new(penalty: f64) -> Self {
        Self { penalty }
    }

    pub fn penalty(&self) -> f64 {
        self.penalty
    }
}

impl std::fmt::Display for NegativePenaltyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "The overload penalty coefficient must be a non-negative number, got {}",
            self.penalty
        )
    }
}

impl std::error::Error for NegativePenaltyError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateHouseError {
    name: String,
}

impl DuplicateHouseError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for DuplicateHouseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A house named {} is already registered", self.name)
    }
}

impl std::error::Error for DuplicateHouseError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateGeneratorError {
    name: String,
}

impl DuplicateGeneratorError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for DuplicateGeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A generator named {} is already registered", self.name)
    }
}

impl std::error::Error for DuplicateGeneratorError {}

/// Registering this house would push total committed demand above total
/// registered capacity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapacityExceededError {
    house: String,
    demand: Power,
    committed: Power,
    capacity: Power,
}

impl CapacityExceededError {
    pub fn new(house: impl Into<String>, demand: Power, committed: Power, capacity: Power) -> Self {
        Self {
            house: house.into(),
            demand,
            committed,
            capacity,
        }
    }

    pub fn house(&self) -> &str {
        &self.house
    }

    pub fn demand(&self) -> Power {
        self.demand
    }

    pub fn committed(&self) -> Power {
        self.committed
    }

    pub fn capacity(&self) -> Power {
        self.capacity
    }
}

impl std::fmt::Display for CapacityExceededError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Registering house {} ({}) would raise committed demand to {} which exceeds the total capacity of {}; register a generator first",
            self.house,
            self.demand,
            self.committed + self.demand,
            self.capacity
        )
    }
}

impl std::error::Error for CapacityExceededError {}

/// Structural precondition violations during network setup. The offending
/// entity is never added.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    NegativeCapacity(NegativeCapacityError),
    NegativePenalty(NegativePenaltyError),
    DuplicateHouse(DuplicateHouseError),
    DuplicateGenerator(DuplicateGeneratorError),
    CapacityExceeded(CapacityExceededError),
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::NegativeCapacity(e) => write!(f, "{}", e),
            NetworkError::NegativePenalty(e) => write!(f, "{}", e),
            NetworkError::DuplicateHouse(e) => write!(f, "{}", e),
            NetworkError::DuplicateGenerator(e) => write!(f, "{}", e),
            NetworkError::CapacityExceeded(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<NegativeCapacityError> for NetworkError {
    fn from(err: NegativeCapacityError) -> Self {
        NetworkError::NegativeCapacity(err)
    }
}

impl From<NegativePenaltyError> for NetworkError {
    fn from(err: NegativePenaltyError) -> Self {
        NetworkError::NegativePenalty(err)
    }
}

impl From<DuplicateHouseError> for NetworkError {
    fn from(err: DuplicateHouseError) -> Self {
        NetworkError::DuplicateHouse(err)
    }
}

impl From<DuplicateGeneratorError> for NetworkError {
    fn from(err: DuplicateGeneratorError) -> Self {
        NetworkError::DuplicateGenerator(err)
    }
}

impl From<CapacityExceededError> for NetworkError {
    fn from(err: CapacityExceededError) -> Self {
        NetworkError::CapacityExceeded(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlreadyAssignedError {
    house: HouseIndex,
    current: GeneratorIndex,
}

impl AlreadyAssignedError {
    pub fn new(house: HouseIndex, current: GeneratorIndex) -> Self {
        Self { house, current }
    }

    pub fn house(&self) -> HouseIndex {
        self.house
    }

    pub fn current(&self) -> GeneratorIndex {
        self.current
    }
}

impl std::fmt::Display for AlreadyAssignedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "House {} is already assigned to generator {}",
            self.house, self.current
        )
    }
}

impl std::error::Error for AlreadyAssignedError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotAssignedToError {
    house: HouseIndex,
    expected: GeneratorIndex,
    actual: Option<GeneratorIndex>,
}

impl NotAssignedToError {
    pub fn new(house: HouseIndex, expected: GeneratorIndex, actual: Option<GeneratorIndex>) -> Self {
        Self {
            house,
            expected,
            actual,
        }
    }

    pub fn house(&self) -> HouseIndex {
        self.house
    }

    pub fn expected(&self) -> GeneratorIndex {
        self.expected
    }

    pub fn actual(&self) -> Option<GeneratorIndex> {
        self.actual
    }
}

impl std::fmt::Display for NotAssignedToError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.actual {
            Some(actual) => write!(
                f,
                "House {} is assigned to generator {}, not {}",
                self.house, actual, self.expected
            ),
            None => write!(
                f,
                "House {} is not assigned to any generator (expected {})",
                self.house, self.expected
            ),
        }
    }
}

impl std::error::Error for NotAssignedToError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotLengthError {
    expected: usize,
    found: usize,
}

impl SnapshotLengthError {
    pub fn new(expected: usize, found: usize) -> Self {
        Self { expected, found }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn found(&self) -> usize {
        self.found
    }
}

impl std::fmt::Display for SnapshotLengthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Assignment snapshot covers {} houses but the network has {}",
            self.found, self.expected
        )
    }
}

impl std::error::Error for SnapshotLengthError {}

/// Contract violations of the assignment operations. These indicate a bug
/// in the calling algorithm rather than bad user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentError {
    AlreadyAssigned(AlreadyAssignedError),
    NotAssignedTo(NotAssignedToError),
    SnapshotLength(SnapshotLengthError),
}

impl std::fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentError::AlreadyAssigned(e) => write!(f, "{}", e),
            AssignmentError::NotAssignedTo(e) => write!(f, "{}", e),
            AssignmentError::SnapshotLength(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AssignmentError {}

impl From<AlreadyAssignedError> for AssignmentError {
    fn from(err: AlreadyAssignedError) -> Self {
        AssignmentError::AlreadyAssigned(err)
    }
}

impl From<NotAssignedToError> for AssignmentError {
    fn from(err: NotAssignedToError) -> Self {
        AssignmentError::NotAssignedTo(err)
    }
}

impl From<SnapshotLengthError> for AssignmentError {
    fn from(err: SnapshotLengthError) -> Self {
        AssignmentError::SnapshotLength(err)
    }
}

/// Errors while parsing the persisted network format. Every parse-level
/// variant carries the 1-based line number of the offending declaration;
/// loading aborts on the first error and no partial network is returned.
#[derive(Debug)]
pub enum NetworkLoaderError {
    Io(std::io::Error),
    Setup(NetworkError),
    MissingPeriod {
        line: usize,
    },
    MissingParentheses {
        line: usize,
    },
    MisplacedParentheses {
        line: usize,
    },
    WrongArity {
        line: usize,
        found: usize,
        expected: usize,
    },
    UnknownDeclaration {
        line: usize,
        keyword: String,
    },
    GeneratorAfterOthers {
        line: usize,
    },
    HouseAfterConnections {
        line: usize,
    },
    CapacityNotInteger {
        line: usize,
        token: String,
    },
    CapacityNotPositive {
        line: usize,
        capacity: i64,
    },
    UnknownConsumption {
        line: usize,
        label: String,
    },
    UnknownEndpoint {
        line: usize,
        first: String,
        second: String,
    },
    HouseAlreadyConnected {
        line: usize,
        house: String,
    },
    Network {
        line: usize,
        source: NetworkError,
    },
}

impl From<std::io::Error> for NetworkLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl std::fmt::Display for NetworkLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use NetworkLoaderError::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            Setup(e) => write!(f, "invalid loader setup: {e}"),
            MissingPeriod { line } => write!(f, "line {line}: missing terminating period"),
            MissingParentheses { line } => write!(f, "line {line}: missing parentheses"),
            MisplacedParentheses { line } => write!(f, "line {line}: misplaced parentheses"),
            WrongArity {
                line,
                found,
                expected,
            } => write!(
                f,
                "line {line}: wrong number of parameters: {found} found, {expected} expected"
            ),
            UnknownDeclaration { line, keyword } => write!(
                f,
                "line {line}: unknown declaration {keyword}; expected generateur, maison or connexion"
            ),
            GeneratorAfterOthers { line } => write!(
                f,
                "line {line}: generators must be declared before houses and connexions"
            ),
            HouseAfterConnections { line } => write!(
                f,
                "line {line}: houses must be declared before connexions"
            ),
            CapacityNotInteger { line, token } => {
                write!(f, "line {line}: capacity must be an integer, got {token}")
            }
            CapacityNotPositive { line, capacity } => {
                write!(f, "line {line}: capacity must be greater than 0, got {capacity}")
            }
            UnknownConsumption { line, label } => write!(
                f,
                "line {line}: consumption must be BASSE, NORMAL or FORTE, got {label}"
            ),
            UnknownEndpoint {
                line,
                first,
                second,
            } => write!(
                f,
                "line {line}: unknown house and/or generator: {first}, {second}"
            ),
            HouseAlreadyConnected { line, house } => {
                write!(f, "line {line}: house {house} is already connected")
            }
            Network { line, source } => write!(f, "line {line}: {source}"),
        }
    }
}

impl std::error::Error for NetworkLoaderError {}
